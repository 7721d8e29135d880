use poem_openapi::Object;

use crate::types::db::system_setting::{self, SettingValueType};

#[derive(Object, Debug)]
pub struct SettingResponse {
    pub key: String,
    pub value: String,
    pub value_type: SettingValueType,
    pub category: String,
    pub description: Option<String>,
    pub is_editable: bool,
    pub is_public: bool,
    pub updated_at: i64,
}

impl From<system_setting::Model> for SettingResponse {
    fn from(setting: system_setting::Model) -> Self {
        Self {
            key: setting.key,
            value: setting.value,
            value_type: setting.value_type,
            category: setting.category,
            description: setting.description,
            is_editable: setting.is_editable,
            is_public: setting.is_public,
            updated_at: setting.updated_at,
        }
    }
}

/// Key/value pair exposed without authentication
#[derive(Object, Debug)]
pub struct PublicSettingResponse {
    pub key: String,
    pub value: String,
    pub value_type: SettingValueType,
}

impl From<system_setting::Model> for PublicSettingResponse {
    fn from(setting: system_setting::Model) -> Self {
        Self {
            key: setting.key,
            value: setting.value,
            value_type: setting.value_type,
        }
    }
}

#[derive(Object, Debug)]
pub struct UpdateSettingRequest {
    /// Must parse as the setting's value type
    pub value: String,
}
