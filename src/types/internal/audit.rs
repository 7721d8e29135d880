use std::collections::HashMap;
use std::fmt;

/// Event types for the activity log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    LoginSuccess,
    LoginFailure,
    Logout,
    TokenRefreshed,
    PasswordChanged,
    UserCreated,
    UserUpdated,
    UserDeactivated,
    UserRolesAssigned,
    UserScopesChanged,
    RoleCreated,
    RoleUpdated,
    RoleDeleted,
    MemberCreated,
    MemberUpdated,
    MemberDeleted,
    MemberStatusChanged,
    DuesRecorded,
    DuesUpdated,
    DuesDeleted,
    RegionChanged,
    SettingUpdated,
    FileUploaded,
    FileDeleted,
    ApplicationCreated,
    ApplicationApproved,
    ApplicationRejected,
    CliSessionStart,
    CliSessionEnd,
    Custom(String),
}

impl EventType {
    /// Convert EventType to string representation for database storage
    pub fn as_str(&self) -> &str {
        match self {
            Self::LoginSuccess => "login_success",
            Self::LoginFailure => "login_failure",
            Self::Logout => "logout",
            Self::TokenRefreshed => "token_refreshed",
            Self::PasswordChanged => "password_changed",
            Self::UserCreated => "user_created",
            Self::UserUpdated => "user_updated",
            Self::UserDeactivated => "user_deactivated",
            Self::UserRolesAssigned => "user_roles_assigned",
            Self::UserScopesChanged => "user_scopes_changed",
            Self::RoleCreated => "role_created",
            Self::RoleUpdated => "role_updated",
            Self::RoleDeleted => "role_deleted",
            Self::MemberCreated => "member_created",
            Self::MemberUpdated => "member_updated",
            Self::MemberDeleted => "member_deleted",
            Self::MemberStatusChanged => "member_status_changed",
            Self::DuesRecorded => "dues_recorded",
            Self::DuesUpdated => "dues_updated",
            Self::DuesDeleted => "dues_deleted",
            Self::RegionChanged => "region_changed",
            Self::SettingUpdated => "setting_updated",
            Self::FileUploaded => "file_uploaded",
            Self::FileDeleted => "file_deleted",
            Self::ApplicationCreated => "panel_user_application_created",
            Self::ApplicationApproved => "panel_user_application_approved",
            Self::ApplicationRejected => "panel_user_application_rejected",
            Self::CliSessionStart => "cli_session_start",
            Self::CliSessionEnd => "cli_session_end",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        EventType::Custom(s.to_string())
    }
}

/// Audit event structure for building and storing activity log entries
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub event_type: EventType,
    pub user_id: String,
    pub ip_address: Option<String>,
    pub jwt_id: Option<String>,
    pub data: HashMap<String, serde_json::Value>,
}

impl AuditEvent {
    /// Create a new audit event with the specified event type
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            user_id: "unknown".to_string(),
            ip_address: None,
            jwt_id: None,
            data: HashMap::new(),
        }
    }
}
