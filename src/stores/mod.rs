// Stores layer - Data access and repository pattern
pub mod application_store;
pub mod audit_store;
pub mod dues_store;
pub mod file_store;
pub mod member_store;
pub mod region_store;
pub mod role_store;
pub mod scope_store;
pub mod settings_store;
pub mod token_store;
pub mod user_store;

pub use application_store::ApplicationStore;
pub use audit_store::AuditStore;
pub use dues_store::DuesStore;
pub use file_store::FileStore;
pub use member_store::MemberStore;
pub use region_store::RegionStore;
pub use role_store::RoleStore;
pub use scope_store::ScopeStore;
pub use settings_store::SettingsStore;
pub use token_store::TokenStore;
pub use user_store::UserStore;

use sea_orm::{DbErr, SqlErr};

/// Whether an insert or update failed on a UNIQUE constraint
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
