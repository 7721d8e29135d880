use std::collections::{BTreeSet, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::RoleError;
use crate::stores::is_unique_violation;
use crate::types::db::custom_role::{self, encode_permissions};
use crate::types::db::user_custom_role;
use crate::types::internal::permission::Permission;
use crate::types::internal::scope::ScopeLevel;

#[derive(Debug, Clone)]
pub struct NewRole {
    pub name: String,
    pub description: Option<String>,
    /// Must already be dependency-closed
    pub permissions: BTreeSet<Permission>,
    pub scope_level: Option<ScopeLevel>,
}

/// Partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct RoleChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub permissions: Option<BTreeSet<Permission>>,
    pub scope_level: Option<Option<ScopeLevel>>,
    pub is_active: Option<bool>,
}

/// Repository for custom roles and their assignment to users
pub struct RoleStore;

impl RoleStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn list(&self, conn: &impl ConnectionTrait) -> Result<Vec<custom_role::Model>, InternalError> {
        custom_role::Entity::find()
            .order_by_asc(custom_role::Column::Name)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_roles", e))
    }

    pub async fn get(&self, conn: &impl ConnectionTrait, role_id: &str) -> Result<custom_role::Model, InternalError> {
        custom_role::Entity::find_by_id(role_id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_role", e))?
            .ok_or_else(|| RoleError::RoleNotFound(role_id.to_string()).into())
    }

    /// Fetch several roles, failing on the first id that does not exist
    pub async fn get_many(
        &self,
        conn: &impl ConnectionTrait,
        role_ids: &[String],
    ) -> Result<Vec<custom_role::Model>, InternalError> {
        let unique: BTreeSet<&String> = role_ids.iter().collect();
        let roles = custom_role::Entity::find()
            .filter(custom_role::Column::Id.is_in(unique.iter().map(|id| id.as_str())))
            .all(conn)
            .await
            .map_err(|e| InternalError::database("get_roles", e))?;

        let found: HashSet<&str> = roles.iter().map(|role| role.id.as_str()).collect();
        if let Some(missing) = unique.iter().find(|id| !found.contains(id.as_str())) {
            return Err(RoleError::RoleNotFound((*missing).clone()).into());
        }

        Ok(roles)
    }

    pub async fn create(&self, conn: &impl ConnectionTrait, new_role: NewRole) -> Result<custom_role::Model, InternalError> {
        let now = Utc::now().timestamp();
        let name = new_role.name.clone();

        custom_role::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(new_role.name),
            description: Set(new_role.description),
            permissions: Set(encode_permissions(&new_role.permissions)?),
            scope_level: Set(new_role.scope_level),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RoleError::DuplicateName(name).into()
            } else {
                InternalError::database("create_role", e)
            }
        })
    }

    pub async fn update(
        &self,
        conn: &impl ConnectionTrait,
        role_id: &str,
        changes: RoleChanges,
    ) -> Result<custom_role::Model, InternalError> {
        let mut active: custom_role::ActiveModel = self.get(conn, role_id).await?.into();
        let mut renamed_to = None;

        if let Some(name) = changes.name {
            renamed_to = Some(name.clone());
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(permissions) = changes.permissions {
            active.permissions = Set(encode_permissions(&permissions)?);
        }
        if let Some(scope_level) = changes.scope_level {
            active.scope_level = Set(scope_level);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().timestamp());

        active.update(conn).await.map_err(|e| match renamed_to {
            Some(name) if is_unique_violation(&e) => RoleError::DuplicateName(name).into(),
            _ => InternalError::database("update_role", e),
        })
    }

    pub async fn delete(&self, conn: &impl ConnectionTrait, role_id: &str) -> Result<(), InternalError> {
        let result = custom_role::Entity::delete_by_id(role_id.to_string())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_role", e))?;

        if result.rows_affected == 0 {
            return Err(RoleError::RoleNotFound(role_id.to_string()).into());
        }
        Ok(())
    }

    /// Number of users holding the role
    pub async fn count_assignments(&self, conn: &impl ConnectionTrait, role_id: &str) -> Result<u64, InternalError> {
        user_custom_role::Entity::find()
            .filter(user_custom_role::Column::RoleId.eq(role_id))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_role_assignments", e))
    }

    /// Custom roles assigned to a user, active or not
    pub async fn roles_for_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Vec<custom_role::Model>, InternalError> {
        let role_ids: Vec<String> = user_custom_role::Entity::find()
            .filter(user_custom_role::Column::UserId.eq(user_id))
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_user_role_ids", e))?
            .into_iter()
            .map(|assignment| assignment.role_id)
            .collect();

        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        custom_role::Entity::find()
            .filter(custom_role::Column::Id.is_in(role_ids))
            .order_by_asc(custom_role::Column::Name)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_user_roles", e))
    }

    /// Replace the user's role assignments with exactly `role_ids`
    pub async fn replace_user_roles(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        role_ids: &[String],
    ) -> Result<(), InternalError> {
        user_custom_role::Entity::delete_many()
            .filter(user_custom_role::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("clear_user_roles", e))?;

        let unique: BTreeSet<&String> = role_ids.iter().collect();
        for role_id in unique {
            self.assign_role(conn, user_id, role_id).await?;
        }
        Ok(())
    }

    pub async fn assign_role(&self, conn: &impl ConnectionTrait, user_id: &str, role_id: &str) -> Result<(), InternalError> {
        user_custom_role::ActiveModel {
            user_id: Set(user_id.to_string()),
            role_id: Set(role_id.to_string()),
            created_at: Set(Utc::now().timestamp()),
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("assign_role", e))?;
        Ok(())
    }
}

impl Default for RoleStore {
    fn default() -> Self {
        Self::new()
    }
}
