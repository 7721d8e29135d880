use thiserror::Error;

use crate::types::internal::permission::Permission;

#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("User account is inactive")]
    UserInactive,

    #[error("Missing permission: {0}")]
    MissingPermission(Permission),

    #[error("Record is outside of your assigned regions")]
    OutOfScope,

    #[error("Only administrators can grant the ADMIN role")]
    AdminRoleRequired,

    #[error("You cannot {action} your own account")]
    SelfModification { action: String },

    #[error("Password change required")]
    PasswordChangeRequired,
}
