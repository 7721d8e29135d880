use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Declared type of a setting value; updates must parse as this type
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, poem_openapi::Enum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[oai(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettingValueType {
    #[sea_orm(string_value = "STRING")]
    String,
    #[sea_orm(string_value = "NUMBER")]
    Number,
    #[sea_orm(string_value = "BOOLEAN")]
    Boolean,
}

impl SettingValueType {
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::String => true,
            Self::Number => value.trim().parse::<f64>().is_ok(),
            Self::Boolean => matches!(value, "true" | "false"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "system_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub value: String,
    pub value_type: SettingValueType,
    pub category: String,
    pub description: Option<String>,
    pub is_editable: bool,
    pub is_public: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::SettingValueType;

    #[test]
    fn test_value_type_validation() {
        assert!(SettingValueType::Number.accepts("10"));
        assert!(SettingValueType::Number.accepts("2.5"));
        assert!(!SettingValueType::Number.accepts("ten"));
        assert!(SettingValueType::Boolean.accepts("false"));
        assert!(!SettingValueType::Boolean.accepts("yes"));
        assert!(SettingValueType::String.accepts(""));
    }
}
