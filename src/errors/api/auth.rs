use crate::errors::internal::{AccessError, CredentialError, InternalError};
use crate::types::dto::common::ErrorResponse;
use poem_openapi::{ApiResponse, payload::Json};
use std::fmt;

/// Authentication error types
#[derive(ApiResponse, Debug)]
pub enum AuthError {
    /// Invalid username or password
    #[oai(status = 401)]
    InvalidCredentials(Json<ErrorResponse>),

    /// Current password is incorrect (for password change)
    #[oai(status = 401)]
    IncorrectPassword(Json<ErrorResponse>),

    /// Password validation failed
    #[oai(status = 400)]
    PasswordValidationFailed(Json<ErrorResponse>),

    /// Invalid or malformed token
    #[oai(status = 401)]
    InvalidToken(Json<ErrorResponse>),

    /// Token has expired
    #[oai(status = 401)]
    ExpiredToken(Json<ErrorResponse>),

    /// Account is deactivated
    #[oai(status = 403)]
    AccountInactive(Json<ErrorResponse>),

    /// Only administrators may sign in while maintenance mode is enabled
    #[oai(status = 503)]
    MaintenanceMode(Json<ErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

impl AuthError {
    /// Create an InvalidCredentials error
    pub fn invalid_credentials() -> Self {
        AuthError::InvalidCredentials(Json(ErrorResponse::new(
            "invalid_credentials",
            "Invalid username or password",
            401,
        )))
    }

    /// Create an IncorrectPassword error
    pub fn incorrect_password() -> Self {
        AuthError::IncorrectPassword(Json(ErrorResponse::new(
            "incorrect_password",
            "Current password is incorrect",
            401,
        )))
    }

    /// Create a PasswordValidationFailed error
    pub fn password_validation_failed(reason: &str) -> Self {
        AuthError::PasswordValidationFailed(Json(ErrorResponse::new(
            "password_validation_failed",
            format!("Password validation failed: {}", reason),
            400,
        )))
    }

    /// Create an InvalidToken error
    pub fn invalid_token() -> Self {
        AuthError::InvalidToken(Json(ErrorResponse::new(
            "invalid_token",
            "Invalid or malformed token",
            401,
        )))
    }

    /// Create an ExpiredToken error
    pub fn expired_token() -> Self {
        AuthError::ExpiredToken(Json(ErrorResponse::new(
            "expired_token",
            "Token has expired",
            401,
        )))
    }

    pub fn account_inactive() -> Self {
        AuthError::AccountInactive(Json(ErrorResponse::new(
            "account_inactive",
            "User account is inactive",
            403,
        )))
    }

    pub fn maintenance_mode() -> Self {
        AuthError::MaintenanceMode(Json(ErrorResponse::new(
            "maintenance_mode",
            "The system is in maintenance mode, please try again later",
            503,
        )))
    }

    /// Convert InternalError to AuthError
    ///
    /// This is the explicit conversion point from internal errors to API errors.
    /// Internal error details are logged but not exposed to clients.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            InternalError::Credential(CredentialError::InvalidCredentials) => {
                Self::invalid_credentials()
            }
            InternalError::Credential(CredentialError::IncorrectPassword) => {
                Self::incorrect_password()
            }
            InternalError::Credential(CredentialError::PasswordValidationFailed(reason)) => {
                Self::password_validation_failed(reason)
            }
            InternalError::Credential(CredentialError::InvalidToken { token_type, reason }) => {
                tracing::debug!("Invalid {} token: {}", token_type, reason);
                Self::invalid_token()
            }
            InternalError::Credential(CredentialError::ExpiredToken(_)) => Self::expired_token(),
            InternalError::Credential(CredentialError::MaintenanceMode) => Self::maintenance_mode(),
            InternalError::Access(AccessError::UserInactive) => Self::account_inactive(),
            // A token for a user that no longer resolves is just an invalid token
            InternalError::Access(AccessError::Unauthenticated)
            | InternalError::User(crate::errors::internal::UserError::UserNotFound { .. }) => {
                Self::invalid_token()
            }
            _ => {
                tracing::error!("Unexpected error in auth operation: {}", err);
                Self::internal_server_error()
            }
        }
    }

    fn internal_server_error() -> Self {
        AuthError::InternalError(Json(ErrorResponse::new(
            "internal_error",
            "An internal error occurred",
            500,
        )))
    }

    fn body(&self) -> &ErrorResponse {
        match self {
            AuthError::InvalidCredentials(json)
            | AuthError::IncorrectPassword(json)
            | AuthError::PasswordValidationFailed(json)
            | AuthError::InvalidToken(json)
            | AuthError::ExpiredToken(json)
            | AuthError::AccountInactive(json)
            | AuthError::MaintenanceMode(json)
            | AuthError::InternalError(json) => &json.0,
        }
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        self.body().message.clone()
    }

    /// Get the HTTP status code from the error variant
    pub fn status_code(&self) -> u16 {
        self.body().status_code
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
