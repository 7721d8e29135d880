use thiserror::Error;

use crate::types::db::system_setting::SettingValueType;

#[derive(Error, Debug)]
pub enum SettingError {
    #[error("Setting not found: {0}")]
    NotFound(String),

    #[error("Setting is not editable: {0}")]
    NotEditable(String),

    #[error("Setting {key} expects a {expected:?} value")]
    InvalidValue {
        key: String,
        expected: SettingValueType,
    },
}
