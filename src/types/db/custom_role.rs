use std::collections::BTreeSet;

use sea_orm::entity::prelude::*;

use crate::errors::InternalError;
use crate::types::internal::permission::Permission;
use crate::types::internal::scope::ScopeLevel;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "custom_roles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,

    // Dependency-closed permission set (JSON array of tags)
    pub permissions: String,

    // When set, holders only act inside their own scopes
    pub scope_level: Option<ScopeLevel>,

    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decode the JSON permission column
    pub fn permission_set(&self) -> Result<BTreeSet<Permission>, InternalError> {
        serde_json::from_str(&self.permissions)
            .map_err(|e| InternalError::parse("custom_role.permissions", e.to_string()))
    }
}

/// Encode a permission set for the JSON permission column
pub fn encode_permissions(permissions: &BTreeSet<Permission>) -> Result<String, InternalError> {
    serde_json::to_string(permissions)
        .map_err(|e| InternalError::parse("custom_role.permissions", e.to_string()))
}
