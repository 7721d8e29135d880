use crate::errors::internal::{
    AccessError, CredentialError, DuesError, FileError, InternalError, MemberError,
    PanelApplicationError, RegionError, RoleError, SettingError, UserError,
};
use crate::types::dto::common::ErrorResponse;
use poem_openapi::{ApiResponse, payload::Json};
use std::fmt;

/// Error responses shared by every administrative endpoint
///
/// Variants are grouped by HTTP status; the `error` field of the body carries
/// the machine readable code (for example `role_in_use` or `out_of_scope`).
#[derive(ApiResponse, Debug)]
pub enum AdminError {
    /// Request failed validation
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),

    /// Missing or invalid credentials
    #[oai(status = 401)]
    Unauthorized(Json<ErrorResponse>),

    /// Caller lacks a permission, is out of scope or must change password
    #[oai(status = 403)]
    Forbidden(Json<ErrorResponse>),

    /// Resource not found
    #[oai(status = 404)]
    NotFound(Json<ErrorResponse>),

    /// Request conflicts with the current state of a resource
    #[oai(status = 409)]
    Conflict(Json<ErrorResponse>),

    /// Uploaded file is too large
    #[oai(status = 413)]
    PayloadTooLarge(Json<ErrorResponse>),

    /// Uploaded file type is not allowed
    #[oai(status = 415)]
    UnsupportedMediaType(Json<ErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

impl AdminError {
    pub fn bad_request(error: &str, message: impl Into<String>) -> Self {
        AdminError::BadRequest(Json(ErrorResponse::new(error, message, 400)))
    }

    pub fn unauthorized(error: &str, message: impl Into<String>) -> Self {
        AdminError::Unauthorized(Json(ErrorResponse::new(error, message, 401)))
    }

    pub fn forbidden(error: &str, message: impl Into<String>) -> Self {
        AdminError::Forbidden(Json(ErrorResponse::new(error, message, 403)))
    }

    pub fn not_found(error: &str, message: impl Into<String>) -> Self {
        AdminError::NotFound(Json(ErrorResponse::new(error, message, 404)))
    }

    pub fn conflict(error: &str, message: impl Into<String>) -> Self {
        AdminError::Conflict(Json(ErrorResponse::new(error, message, 409)))
    }

    /// Create an Unauthorized error for a missing or unusable token
    pub fn invalid_token() -> Self {
        Self::unauthorized("invalid_token", "Invalid or expired token")
    }

    /// Create a PasswordChangeRequired error
    pub fn password_change_required() -> Self {
        Self::forbidden(
            "password_change_required",
            "Password change required. Please change your password at /api/auth/change-password",
        )
    }

    /// Convert InternalError to AdminError
    ///
    /// This is the explicit conversion point from internal errors to API errors.
    /// Internal error details are logged but not exposed to clients.
    pub fn from_internal_error(err: InternalError) -> Self {
        match err {
            // Infrastructure errors - always log and return generic error
            InternalError::Database(ref db_err) => {
                tracing::error!("Database error: {}", db_err);
                Self::internal_server_error()
            }
            InternalError::Parse { ref value_type, .. } => {
                tracing::error!("Parse error for {}: {}", value_type, err);
                Self::internal_server_error()
            }
            InternalError::Crypto { ref operation, .. } => {
                tracing::error!("Crypto error in {}: {}", operation, err);
                Self::internal_server_error()
            }
            InternalError::Audit(ref audit_err) => {
                tracing::error!("Audit error: {}", audit_err);
                Self::internal_server_error()
            }

            InternalError::Credential(e) => Self::from_credential_error(e),
            InternalError::Access(e) => Self::from_access_error(e),
            InternalError::User(e) => Self::from_user_error(e),
            InternalError::Role(e) => Self::from_role_error(e),
            InternalError::Member(e) => Self::from_member_error(e),
            InternalError::Application(e) => Self::from_application_error(e),
            InternalError::Dues(e) => Self::from_dues_error(e),
            InternalError::Region(e) => Self::from_region_error(e),
            InternalError::Setting(e) => Self::from_setting_error(e),
            InternalError::File(e) => Self::from_file_error(e),
        }
    }

    fn from_credential_error(err: CredentialError) -> Self {
        let message = err.to_string();
        match err {
            CredentialError::PasswordValidationFailed(_) => {
                Self::bad_request("password_validation_failed", message)
            }
            CredentialError::IncorrectPassword => Self::bad_request("incorrect_password", message),
            CredentialError::InvalidCredentials => Self::unauthorized("invalid_credentials", message),
            CredentialError::InvalidToken { .. } | CredentialError::ExpiredToken(_) => {
                tracing::debug!("Token rejected: {}", message);
                Self::invalid_token()
            }
            CredentialError::MaintenanceMode => Self::forbidden("maintenance_mode", message),
        }
    }

    fn from_access_error(err: AccessError) -> Self {
        let message = err.to_string();
        match err {
            AccessError::Unauthenticated => Self::unauthorized("unauthenticated", message),
            AccessError::UserInactive => Self::unauthorized("account_inactive", message),
            AccessError::MissingPermission(_) => Self::forbidden("forbidden", message),
            AccessError::OutOfScope => Self::forbidden("out_of_scope", message),
            AccessError::AdminRoleRequired => Self::forbidden("admin_role_required", message),
            AccessError::SelfModification { .. } => {
                Self::forbidden("self_modification_denied", message)
            }
            AccessError::PasswordChangeRequired => Self::password_change_required(),
        }
    }

    fn from_user_error(err: UserError) -> Self {
        let message = err.to_string();
        match err {
            UserError::DuplicateUsername { .. } => Self::conflict("duplicate_username", message),
            UserError::UserNotFound { .. } => Self::not_found("user_not_found", message),
            UserError::InvalidScope { .. } => Self::bad_request("invalid_scope", message),
            UserError::AlreadyBootstrapped => Self::conflict("already_bootstrapped", message),
        }
    }

    fn from_role_error(err: RoleError) -> Self {
        let message = err.to_string();
        match err {
            RoleError::UnknownPermission(_) => Self::bad_request("unknown_permission", message),
            RoleError::RoleNotFound(_) => Self::not_found("role_not_found", message),
            RoleError::DuplicateName(_) => Self::conflict("duplicate_role_name", message),
            RoleError::RoleInUse(_) => Self::conflict("role_in_use", message),
            RoleError::RoleInactive(_) => Self::bad_request("role_inactive", message),
            RoleError::ScopeRequired { .. } => Self::bad_request("scope_required", message),
        }
    }

    fn from_member_error(err: MemberError) -> Self {
        let message = err.to_string();
        match err {
            MemberError::NotFound(_) => Self::not_found("member_not_found", message),
            MemberError::DuplicateNationalId => Self::conflict("duplicate_national_id", message),
            MemberError::InvalidNationalId => Self::bad_request("invalid_national_id", message),
            MemberError::InvalidBirthDate(_) => Self::bad_request("invalid_birth_date", message),
            MemberError::InvalidTransition { .. } => {
                Self::conflict("invalid_status_transition", message)
            }
            MemberError::NotDeletable(_) => Self::conflict("member_not_deletable", message),
            MemberError::ReasonRequired => Self::bad_request("reason_required", message),
            MemberError::NotActive => Self::conflict("member_not_active", message),
            MemberError::RegistrationNumbersExhausted(_) => {
                Self::conflict("registration_numbers_exhausted", message)
            }
        }
    }

    fn from_application_error(err: PanelApplicationError) -> Self {
        let message = err.to_string();
        match err {
            PanelApplicationError::NotFound(_) => Self::not_found("application_not_found", message),
            PanelApplicationError::AlreadyReviewed(_) => {
                Self::conflict("already_reviewed", message)
            }
            PanelApplicationError::PendingExists => {
                Self::conflict("pending_application_exists", message)
            }
            PanelApplicationError::NoteRequired => Self::bad_request("note_required", message),
        }
    }

    fn from_dues_error(err: DuesError) -> Self {
        let message = err.to_string();
        match err {
            DuesError::NotFound(_) => Self::not_found("dues_not_found", message),
            DuesError::DuplicatePeriod(_) => Self::conflict("duplicate_period", message),
            DuesError::InvalidPeriod(_) => Self::bad_request("invalid_period", message),
            DuesError::InvalidAmount => Self::bad_request("invalid_amount", message),
        }
    }

    fn from_region_error(err: RegionError) -> Self {
        let message = err.to_string();
        match err {
            RegionError::ProvinceNotFound(_) => Self::not_found("province_not_found", message),
            RegionError::DistrictNotFound(_) => Self::not_found("district_not_found", message),
            RegionError::BranchNotFound(_) => Self::not_found("branch_not_found", message),
            RegionError::InstitutionNotFound(_) => {
                Self::not_found("institution_not_found", message)
            }
            RegionError::DistrictProvinceMismatch { .. } => {
                Self::bad_request("district_province_mismatch", message)
            }
            RegionError::DuplicateCode(_) => Self::conflict("duplicate_code", message),
            RegionError::InUse(_) => Self::conflict("region_in_use", message),
        }
    }

    fn from_setting_error(err: SettingError) -> Self {
        let message = err.to_string();
        match err {
            SettingError::NotFound(_) => Self::not_found("setting_not_found", message),
            SettingError::NotEditable(_) => Self::forbidden("setting_not_editable", message),
            SettingError::InvalidValue { .. } => Self::bad_request("invalid_setting_value", message),
        }
    }

    fn from_file_error(err: FileError) -> Self {
        let message = err.to_string();
        match err {
            FileError::NotFound(_) => Self::not_found("file_not_found", message),
            FileError::TooLarge { .. } => {
                AdminError::PayloadTooLarge(Json(ErrorResponse::new("file_too_large", message, 413)))
            }
            FileError::UnsupportedType(_) => AdminError::UnsupportedMediaType(Json(
                ErrorResponse::new("unsupported_file_type", message, 415),
            )),
            FileError::Io { ref operation, .. } => {
                tracing::error!("File storage error in {}: {}", operation, message);
                Self::internal_server_error()
            }
        }
    }

    /// Create an InternalError
    fn internal_server_error() -> Self {
        AdminError::InternalError(Json(ErrorResponse::new(
            "internal_error",
            "An internal error occurred",
            500,
        )))
    }

    fn body(&self) -> &ErrorResponse {
        match self {
            AdminError::BadRequest(json)
            | AdminError::Unauthorized(json)
            | AdminError::Forbidden(json)
            | AdminError::NotFound(json)
            | AdminError::Conflict(json)
            | AdminError::PayloadTooLarge(json)
            | AdminError::UnsupportedMediaType(json)
            | AdminError::InternalError(json) => &json.0,
        }
    }

    /// Machine readable error code
    pub fn code(&self) -> &str {
        &self.body().error
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

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
