#[cfg(test)]
mod tests {
    use crate::errors::AuthError;
    use crate::errors::internal::{AccessError, CredentialError, InternalError, UserError};
    use sea_orm::DbErr;

    #[test]
    fn test_database_error_converts_to_internal_server_error() {
        let db_err = DbErr::RecordNotFound("test".to_string());
        let internal_err = InternalError::database("get_user", db_err);
        let auth_err = AuthError::from_internal_error(internal_err);

        assert_eq!(auth_err.message(), "An internal error occurred");
        assert_eq!(auth_err.status_code(), 500);
    }

    #[test]
    fn test_transaction_error_converts_to_internal_server_error() {
        let db_err = DbErr::Custom("locked".to_string());
        let internal_err = InternalError::transaction_begin(db_err);
        let auth_err = AuthError::from_internal_error(internal_err);

        assert_eq!(auth_err.message(), "An internal error occurred");
    }

    #[test]
    fn test_invalid_credentials_converts_correctly() {
        let internal_err = InternalError::Credential(CredentialError::InvalidCredentials);
        let auth_err = AuthError::from_internal_error(internal_err);

        assert_eq!(auth_err.message(), "Invalid username or password");
        assert_eq!(auth_err.status_code(), 401);
    }

    #[test]
    fn test_incorrect_password_converts_correctly() {
        let internal_err = InternalError::Credential(CredentialError::IncorrectPassword);
        let auth_err = AuthError::from_internal_error(internal_err);

        assert!(matches!(auth_err, AuthError::IncorrectPassword(_)));
    }

    #[test]
    fn test_password_validation_failed_keeps_reason() {
        let internal_err = InternalError::Credential(CredentialError::PasswordValidationFailed(
            "must contain a number".to_string(),
        ));
        let auth_err = AuthError::from_internal_error(internal_err);

        assert_eq!(auth_err.status_code(), 400);
        assert!(auth_err.message().contains("must contain a number"));
    }

    #[test]
    fn test_invalid_token_hides_reason() {
        let internal_err =
            InternalError::Credential(CredentialError::invalid_token("refresh_token", "not found"));
        let auth_err = AuthError::from_internal_error(internal_err);

        assert_eq!(auth_err.message(), "Invalid or malformed token");
    }

    #[test]
    fn test_expired_token_converts_correctly() {
        let internal_err = InternalError::Credential(CredentialError::ExpiredToken("jwt".to_string()));
        let auth_err = AuthError::from_internal_error(internal_err);

        assert_eq!(auth_err.message(), "Token has expired");
    }

    #[test]
    fn test_maintenance_mode_converts_to_service_unavailable() {
        let internal_err = InternalError::Credential(CredentialError::MaintenanceMode);
        let auth_err = AuthError::from_internal_error(internal_err);

        assert!(matches!(auth_err, AuthError::MaintenanceMode(_)));
        assert_eq!(auth_err.status_code(), 503);
    }

    #[test]
    fn test_inactive_user_converts_to_forbidden() {
        let auth_err = AuthError::from_internal_error(AccessError::UserInactive.into());

        assert_eq!(auth_err.status_code(), 403);
    }

    #[test]
    fn test_vanished_user_is_an_invalid_token() {
        let internal_err = InternalError::User(UserError::UserNotFound {
            user_id: "gone".to_string(),
        });
        let auth_err = AuthError::from_internal_error(internal_err);

        assert!(matches!(auth_err, AuthError::InvalidToken(_)));
    }
}
