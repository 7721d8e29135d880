use serde::{Deserialize, Serialize};

use super::permission::SystemRole;

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user_id)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// JWT ID, recorded on audit events
    pub jti: String,

    /// System roles at the time the token was issued
    pub roles: Vec<SystemRole>,

    /// User must change password before using anything but /auth/me and /auth/change-password
    pub password_change_required: bool,
}
