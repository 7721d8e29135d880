use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::InternalError;
use crate::types::internal::scope::ScopeRef;

/// Review status of a panel user application
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, poem_openapi::Enum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[oai(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "panel_user_applications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub member_id: String,
    pub requested_username: String,
    pub requested_role_id: String,

    // Requested scopes (JSON array of ScopeRef)
    pub scopes: String,

    pub note: Option<String>,
    pub status: ApplicationStatus,
    pub created_by: String,
    pub reviewed_by: Option<String>,
    pub review_note: Option<String>,
    pub created_user_id: Option<String>,
    pub created_at: i64,
    pub reviewed_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn scope_refs(&self) -> Result<Vec<ScopeRef>, InternalError> {
        serde_json::from_str(&self.scopes)
            .map_err(|e| InternalError::parse("panel_user_application.scopes", e.to_string()))
    }
}
