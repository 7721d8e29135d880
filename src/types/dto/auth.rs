use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::coordinators::auth_coordinator::LoginTokens;
use crate::providers::AccessProfile;
use crate::providers::token_provider::IssuedJwt;
use crate::types::dto::roles::RoleSummary;
use crate::types::dto::users::ScopeResponse;
use crate::types::internal::permission::SystemRole;

/// Request model for user login
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username for authentication
    pub username: String,

    /// Password for authentication
    pub password: String,
}

/// Response model containing authentication tokens
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// JWT access token for API authentication
    pub access_token: String,

    /// Refresh token for obtaining new access tokens
    pub refresh_token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Number of seconds until the access token expires
    pub expires_in: i64,

    /// When true only /auth/me and /auth/change-password are usable
    pub password_change_required: bool,
}

impl From<LoginTokens> for TokenResponse {
    fn from(tokens: LoginTokens) -> Self {
        Self {
            access_token: tokens.access.token,
            refresh_token: tokens.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: tokens.access.expires_in,
            password_change_required: tokens.password_change_required,
        }
    }
}

/// Request model for token refresh
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token to exchange for a new access token
    pub refresh_token: String,
}

/// Response model for token refresh
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// New JWT access token for API authentication
    pub access_token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Number of seconds until the access token expires
    pub expires_in: i64,
}

impl From<IssuedJwt> for RefreshResponse {
    fn from(jwt: IssuedJwt) -> Self {
        Self {
            access_token: jwt.token,
            token_type: "Bearer".to_string(),
            expires_in: jwt.expires_in,
        }
    }
}

/// Request model for logout
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LogoutRequest {
    /// Refresh token to revoke
    pub refresh_token: String,
}

/// Request model for password change
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    /// Current password for verification
    pub old_password: String,

    /// New password to set
    pub new_password: String,
}

/// The caller's account, effective permissions and scopes
#[derive(Object, Debug)]
pub struct MeResponse {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub member_id: Option<String>,
    pub roles: Vec<SystemRole>,
    pub custom_roles: Vec<RoleSummary>,
    /// Dependency-expanded permission tags
    pub permissions: Vec<String>,
    pub scopes: Vec<ScopeResponse>,
    /// False when the caller sees members in every region
    pub scope_restricted: bool,
    pub password_change_required: bool,
}

impl From<AccessProfile> for MeResponse {
    fn from(profile: AccessProfile) -> Self {
        Self {
            id: profile.user.id,
            username: profile.user.username,
            full_name: profile.user.full_name,
            email: profile.user.email,
            member_id: profile.user.member_id,
            roles: profile.system_roles,
            custom_roles: profile.custom_roles.into_iter().map(RoleSummary::from).collect(),
            permissions: profile.permissions.iter().map(|p| p.as_str().to_string()).collect(),
            scopes: profile.scopes.into_iter().map(ScopeResponse::from).collect(),
            scope_restricted: profile.scope_restricted,
            password_change_required: profile.user.password_change_required,
        }
    }
}
