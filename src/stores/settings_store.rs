use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::errors::InternalError;
use crate::errors::internal::SettingError;
use crate::types::db::system_setting;

pub const SITE_NAME: &str = "site_name";
pub const MAINTENANCE_MODE: &str = "maintenance_mode";
pub const MEMBERSHIP_AUTO_APPROVE: &str = "membership_auto_approve";
pub const PASSWORD_MIN_LENGTH: &str = "password_min_length";
pub const PASSWORD_REQUIRE_UPPERCASE: &str = "password_require_uppercase";
pub const PASSWORD_REQUIRE_LOWERCASE: &str = "password_require_lowercase";
pub const PASSWORD_REQUIRE_NUMBER: &str = "password_require_number";
pub const PASSWORD_REQUIRE_SPECIAL: &str = "password_require_special";
pub const MAX_UPLOAD_SIZE_MB: &str = "max_upload_size_mb";
pub const ALLOWED_UPLOAD_TYPES: &str = "allowed_upload_types";
pub const ACTIVITY_LOG_RETENTION_DAYS: &str = "activity_log_retention_days";

/// Runtime settings stored in the `system_settings` table
///
/// Rows are seeded by the migration. Typed getters fall back to the given
/// default when a key is missing or holds an unparsable value, so a broken
/// row never takes the service down.
pub struct SettingsStore;

impl SettingsStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn list(
        &self,
        conn: &impl ConnectionTrait,
        category: Option<&str>,
    ) -> Result<Vec<system_setting::Model>, InternalError> {
        let mut query = system_setting::Entity::find();
        if let Some(category) = category {
            query = query.filter(system_setting::Column::Category.eq(category));
        }
        query
            .order_by_asc(system_setting::Column::Category)
            .order_by_asc(system_setting::Column::Key)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_settings", e))
    }

    pub async fn list_public(&self, conn: &impl ConnectionTrait) -> Result<Vec<system_setting::Model>, InternalError> {
        system_setting::Entity::find()
            .filter(system_setting::Column::IsPublic.eq(true))
            .order_by_asc(system_setting::Column::Key)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_public_settings", e))
    }

    pub async fn find(&self, conn: &impl ConnectionTrait, key: &str) -> Result<Option<system_setting::Model>, InternalError> {
        system_setting::Entity::find_by_id(key.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_setting", e))
    }

    pub async fn get(&self, conn: &impl ConnectionTrait, key: &str) -> Result<system_setting::Model, InternalError> {
        self.find(conn, key)
            .await?
            .ok_or_else(|| SettingError::NotFound(key.to_string()).into())
    }

    /// Change a setting value
    ///
    /// # Errors
    /// * `SettingError::NotFound` for an unknown key
    /// * `SettingError::NotEditable` for a locked key
    /// * `SettingError::InvalidValue` when the value does not parse as the declared type
    pub async fn update_value(
        &self,
        conn: &impl ConnectionTrait,
        key: &str,
        value: &str,
    ) -> Result<system_setting::Model, InternalError> {
        let setting = self.get(conn, key).await?;
        if !setting.is_editable {
            return Err(SettingError::NotEditable(key.to_string()).into());
        }
        if !setting.value_type.accepts(value) {
            return Err(SettingError::InvalidValue {
                key: key.to_string(),
                expected: setting.value_type,
            }
            .into());
        }

        let mut active: system_setting::ActiveModel = setting.into();
        active.value = Set(value.trim().to_string());
        active.updated_at = Set(Utc::now().timestamp());
        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("update_setting", e))
    }

    pub async fn get_bool(&self, conn: &impl ConnectionTrait, key: &str, default: bool) -> Result<bool, InternalError> {
        Ok(match self.find(conn, key).await? {
            Some(setting) => match setting.value.as_str() {
                "true" => true,
                "false" => false,
                other => {
                    tracing::warn!("Setting {} holds non-boolean value {:?}", key, other);
                    default
                }
            },
            None => default,
        })
    }

    pub async fn get_u64(&self, conn: &impl ConnectionTrait, key: &str, default: u64) -> Result<u64, InternalError> {
        Ok(match self.find(conn, key).await? {
            Some(setting) => setting.value.trim().parse().unwrap_or_else(|_| {
                tracing::warn!("Setting {} holds non-numeric value {:?}", key, setting.value);
                default
            }),
            None => default,
        })
    }

    pub async fn get_string(&self, conn: &impl ConnectionTrait, key: &str, default: &str) -> Result<String, InternalError> {
        Ok(self
            .find(conn, key)
            .await?
            .map(|setting| setting.value)
            .unwrap_or_else(|| default.to_string()))
    }

    /// Comma separated list, blank entries dropped
    pub async fn get_list(&self, conn: &impl ConnectionTrait, key: &str) -> Result<Vec<String>, InternalError> {
        Ok(self
            .get_string(conn, key, "")
            .await?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect())
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_test_db;
    use crate::types::db::system_setting::SettingValueType;

    #[tokio::test]
    async fn test_seeded_defaults() {
        let db = setup_test_db().await;
        let store = SettingsStore::new();

        assert_eq!(store.get_u64(&db, PASSWORD_MIN_LENGTH, 0).await.unwrap(), 8);
        assert!(!store.get_bool(&db, MAINTENANCE_MODE, true).await.unwrap());
        assert_eq!(
            store.get_list(&db, ALLOWED_UPLOAD_TYPES).await.unwrap(),
            vec!["image/png", "image/jpeg", "application/pdf"]
        );
    }

    #[tokio::test]
    async fn test_update_validates_declared_type() {
        let db = setup_test_db().await;
        let store = SettingsStore::new();

        let result = store.update_value(&db, PASSWORD_MIN_LENGTH, "twelve").await;
        assert!(matches!(
            result,
            Err(InternalError::Setting(SettingError::InvalidValue { expected: SettingValueType::Number, .. }))
        ));

        let updated = store.update_value(&db, PASSWORD_MIN_LENGTH, "12").await.unwrap();
        assert_eq!(updated.value, "12");
        assert_eq!(store.get_u64(&db, PASSWORD_MIN_LENGTH, 0).await.unwrap(), 12);
    }

    #[tokio::test]
    async fn test_locked_and_unknown_keys() {
        let db = setup_test_db().await;
        let store = SettingsStore::new();

        let locked = store.update_value(&db, "schema_version", "2").await;
        assert!(matches!(locked, Err(InternalError::Setting(SettingError::NotEditable(_)))));

        let unknown = store.update_value(&db, "does_not_exist", "1").await;
        assert!(matches!(unknown, Err(InternalError::Setting(SettingError::NotFound(_)))));
    }

    #[tokio::test]
    async fn test_public_settings_only() {
        let db = setup_test_db().await;
        let public = SettingsStore::new().list_public(&db).await.unwrap();

        assert!(public.iter().all(|s| s.is_public));
        assert!(public.iter().any(|s| s.key == SITE_NAME));
        assert!(!public.iter().any(|s| s.key == PASSWORD_MIN_LENGTH));
    }

    #[tokio::test]
    async fn test_missing_key_uses_default() {
        let db = setup_test_db().await;
        let store = SettingsStore::new();
        assert!(store.get_bool(&db, "nope", true).await.unwrap());
        assert_eq!(store.get_u64(&db, "nope", 7).await.unwrap(), 7);
    }
}
