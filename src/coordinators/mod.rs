// Coordinators layer - Workflow orchestration
//
// Coordinators compose stores and providers for specific API endpoints:
// they authorize the caller, open transactions, and write activity log
// entries. Rules live in providers and entity types.

pub mod activity_log_coordinator;
pub mod application_coordinator;
pub mod auth_coordinator;
pub mod dues_coordinator;
pub mod file_coordinator;
pub mod member_coordinator;
pub mod region_coordinator;
pub mod role_coordinator;
pub mod settings_coordinator;
pub mod user_coordinator;

pub use activity_log_coordinator::ActivityLogCoordinator;
pub use application_coordinator::ApplicationCoordinator;
pub use auth_coordinator::AuthCoordinator;
pub use dues_coordinator::DuesCoordinator;
pub use file_coordinator::FileCoordinator;
pub use member_coordinator::MemberCoordinator;
pub use region_coordinator::RegionCoordinator;
pub use role_coordinator::RoleCoordinator;
pub use settings_coordinator::SettingsCoordinator;
pub use user_coordinator::UserCoordinator;

use crate::app_data::AppData;
use crate::errors::InternalError;
use crate::errors::internal::AccessError;
use crate::providers::AccessProfile;
use crate::types::internal::context::RequestContext;
use crate::types::internal::permission::Permission;

/// Load the caller's profile and require a permission
///
/// The profile is rebuilt from the database on every request, so role or
/// account changes apply without waiting for the token to expire.
pub(crate) async fn authorize(
    app_data: &AppData,
    ctx: &RequestContext,
    permission: Permission,
) -> Result<AccessProfile, InternalError> {
    let profile = load_caller(app_data, ctx).await?;
    profile.require(permission)?;
    Ok(profile)
}

/// Load the caller's profile without checking a permission
pub(crate) async fn load_caller(app_data: &AppData, ctx: &RequestContext) -> Result<AccessProfile, InternalError> {
    let user_id = ctx.user_id().ok_or(AccessError::Unauthenticated)?;
    app_data
        .access_provider
        .load_profile(&app_data.connections.main, user_id)
        .await
}
