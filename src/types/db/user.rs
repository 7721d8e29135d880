use sea_orm::entity::prelude::*;

use crate::errors::InternalError;
use crate::types::internal::permission::SystemRole;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub email: Option<String>,

    // System roles (JSON array of role tags)
    pub roles: String,

    // Member this account was promoted from
    pub member_id: Option<String>,

    pub is_active: bool,
    pub password_change_required: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decode the JSON role column
    pub fn system_roles(&self) -> Result<Vec<SystemRole>, InternalError> {
        serde_json::from_str(&self.roles)
            .map_err(|e| InternalError::parse("user.roles", e.to_string()))
    }

    pub fn has_role(&self, role: SystemRole) -> bool {
        self.system_roles().map(|roles| roles.contains(&role)).unwrap_or(false)
    }
}

/// Encode system roles for the JSON role column
pub fn encode_roles(roles: &[SystemRole]) -> Result<String, InternalError> {
    serde_json::to_string(roles).map_err(|e| InternalError::parse("user.roles", e.to_string()))
}
