use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoleError {
    #[error("Unknown permission: {0}")]
    UnknownPermission(String),

    #[error("Role not found: {0}")]
    RoleNotFound(String),

    #[error("Role name already exists: {0}")]
    DuplicateName(String),

    #[error("Role is assigned to users or pending applications: {0}")]
    RoleInUse(String),

    #[error("Role is inactive: {0}")]
    RoleInactive(String),

    #[error("Role {role} is restricted to {level} scopes: {reason}")]
    ScopeRequired {
        role: String,
        level: String,
        reason: String,
    },
}
