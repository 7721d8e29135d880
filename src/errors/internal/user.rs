use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserError {
    #[error("User already exists: {username}")]
    DuplicateUsername { username: String },

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: String },

    #[error("Invalid scope: {reason}")]
    InvalidScope { reason: String },

    #[error("An administrator already exists")]
    AlreadyBootstrapped,
}

impl UserError {
    pub fn invalid_scope(reason: impl Into<String>) -> Self {
        Self::InvalidScope { reason: reason.into() }
    }
}
