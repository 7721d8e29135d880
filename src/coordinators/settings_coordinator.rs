use std::sync::Arc;

use crate::app_data::AppData;
use crate::coordinators::authorize;
use crate::errors::InternalError;
use crate::stores::settings_store::MAINTENANCE_MODE;
use crate::types::db::system_setting;
use crate::types::internal::audit::EventType;
use crate::types::internal::context::RequestContext;
use crate::types::internal::permission::Permission;

pub struct SettingsCoordinator {
    app_data: Arc<AppData>,
}

impl SettingsCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        category: Option<&str>,
    ) -> Result<Vec<system_setting::Model>, InternalError> {
        authorize(&self.app_data, ctx, Permission::SystemSettingsView).await?;
        self.app_data
            .settings_store
            .list(&self.app_data.connections.main, category)
            .await
    }

    pub async fn get(&self, ctx: &RequestContext, key: &str) -> Result<system_setting::Model, InternalError> {
        authorize(&self.app_data, ctx, Permission::SystemSettingsView).await?;
        self.app_data
            .settings_store
            .get(&self.app_data.connections.main, key)
            .await
    }

    /// Settings flagged public, readable without a token
    pub async fn public(&self) -> Result<Vec<system_setting::Model>, InternalError> {
        self.app_data
            .settings_store
            .list_public(&self.app_data.connections.main)
            .await
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        key: &str,
        value: &str,
    ) -> Result<system_setting::Model, InternalError> {
        authorize(&self.app_data, ctx, Permission::SystemSettingsManage).await?;
        let db = &self.app_data.connections.main;
        let previous = self.app_data.settings_store.get(db, key).await?;
        let setting = self.app_data.settings_store.update_value(db, key, value).await?;

        if key == MAINTENANCE_MODE && previous.value != setting.value {
            tracing::warn!(enabled = %setting.value, "Maintenance mode changed");
        }
        self.app_data
            .audit_logger
            .builder(EventType::SettingUpdated)
            .with_context(ctx)
            .add_field("key", key)
            .add_field("previous_value", &previous.value)
            .add_field("value", &setting.value)
            .emit()
            .await;

        Ok(setting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::internal::{AccessError, SettingError};
    use crate::stores::settings_store::{MAX_UPLOAD_SIZE_MB, SITE_NAME};
    use crate::test::utils::{context_for, create_test_user_with_roles, setup_test_app_data};
    use crate::types::internal::permission::SystemRole;

    #[tokio::test]
    async fn test_update_checks_type_and_editability() {
        let app_data = setup_test_app_data().await;
        let admin = create_test_user_with_roles(&app_data, "root", &[SystemRole::Admin]).await;
        let coordinator = SettingsCoordinator::new(app_data);
        let ctx = context_for(&admin);

        let updated = coordinator.update(&ctx, MAX_UPLOAD_SIZE_MB, "25").await.unwrap();
        assert_eq!(updated.value, "25");

        let wrong_type = coordinator.update(&ctx, MAX_UPLOAD_SIZE_MB, "lots").await;
        assert!(matches!(wrong_type, Err(InternalError::Setting(SettingError::InvalidValue { .. }))));

        let locked = coordinator.update(&ctx, "schema_version", "2").await;
        assert!(matches!(locked, Err(InternalError::Setting(SettingError::NotEditable(_)))));

        let unknown = coordinator.update(&ctx, "no_such_key", "1").await;
        assert!(matches!(unknown, Err(InternalError::Setting(SettingError::NotFound(_)))));
    }

    #[tokio::test]
    async fn test_moderator_can_view_not_manage() {
        let app_data = setup_test_app_data().await;
        let moderator = create_test_user_with_roles(&app_data, "mod", &[SystemRole::Moderator]).await;
        let coordinator = SettingsCoordinator::new(app_data);
        let ctx = context_for(&moderator);

        assert!(!coordinator.list(&ctx, None).await.unwrap().is_empty());
        let result = coordinator.update(&ctx, SITE_NAME, "Union").await;
        assert!(matches!(
            result,
            Err(InternalError::Access(AccessError::MissingPermission(Permission::SystemSettingsManage)))
        ));
    }

    #[tokio::test]
    async fn test_public_settings_exclude_private_ones() {
        let app_data = setup_test_app_data().await;
        let coordinator = SettingsCoordinator::new(app_data);

        let public = coordinator.public().await.unwrap();
        assert!(public.iter().all(|s| s.is_public));
        assert!(public.iter().any(|s| s.key == SITE_NAME));
        assert!(!public.iter().any(|s| s.key == MAX_UPLOAD_SIZE_MB));
    }
}
