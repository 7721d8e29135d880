use std::sync::Arc;

use crate::app_data::AppData;
use crate::config::{begin_transaction, commit_transaction};
use crate::coordinators::authorize;
use crate::errors::InternalError;
use crate::errors::internal::RoleError;
use crate::providers::permission_provider::{self, CatalogEntry};
use crate::stores::role_store::{NewRole, RoleChanges};
use crate::types::db::custom_role;
use crate::types::internal::audit::EventType;
use crate::types::internal::context::RequestContext;
use crate::types::internal::permission::Permission;
use crate::types::internal::scope::ScopeLevel;

#[derive(Debug, Clone)]
pub struct CreateRoleInput {
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<String>,
    pub scope_level: Option<ScopeLevel>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateRoleInput {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub permissions: Option<Vec<String>>,
    pub scope_level: Option<Option<ScopeLevel>>,
    pub is_active: Option<bool>,
}

/// Custom role management
///
/// Permission lists are validated against the universe and stored
/// dependency-closed, so a role never holds a permission it cannot use.
pub struct RoleCoordinator {
    app_data: Arc<AppData>,
}

impl RoleCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }

    pub async fn catalog(&self, ctx: &RequestContext) -> Result<Vec<CatalogEntry>, InternalError> {
        authorize(&self.app_data, ctx, Permission::RoleList).await?;
        Ok(permission_provider::catalog())
    }

    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<custom_role::Model>, InternalError> {
        authorize(&self.app_data, ctx, Permission::RoleList).await?;
        self.app_data.role_store.list(&self.app_data.connections.main).await
    }

    pub async fn get(&self, ctx: &RequestContext, role_id: &str) -> Result<custom_role::Model, InternalError> {
        authorize(&self.app_data, ctx, Permission::RoleView).await?;
        self.app_data.role_store.get(&self.app_data.connections.main, role_id).await
    }

    pub async fn create(&self, ctx: &RequestContext, input: CreateRoleInput) -> Result<custom_role::Model, InternalError> {
        authorize(&self.app_data, ctx, Permission::RoleCreate).await?;
        let requested = permission_provider::parse_permissions(&input.permissions)?;
        let permissions = permission_provider::expand(requested.iter());

        let role = self
            .app_data
            .role_store
            .create(
                &self.app_data.connections.main,
                NewRole {
                    name: input.name.trim().to_string(),
                    description: input.description,
                    permissions,
                    scope_level: input.scope_level,
                },
            )
            .await?;

        self.app_data
            .audit_logger
            .builder(EventType::RoleCreated)
            .with_context(ctx)
            .add_field("role_id", &role.id)
            .add_field("name", &role.name)
            .add_field("permissions", &role.permissions)
            .emit()
            .await;

        Ok(role)
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        role_id: &str,
        input: UpdateRoleInput,
    ) -> Result<custom_role::Model, InternalError> {
        authorize(&self.app_data, ctx, Permission::RoleUpdate).await?;
        let db = &self.app_data.connections.main;

        // Holders' scopes were checked against the current level
        if let Some(scope_level) = input.scope_level {
            let current = self.app_data.role_store.get(db, role_id).await?;
            if current.scope_level != scope_level {
                let assignments = self.app_data.role_store.count_assignments(db, role_id).await?;
                let pending = self.app_data.application_store.count_pending_for_role(db, role_id).await?;
                if assignments > 0 || pending > 0 {
                    return Err(RoleError::RoleInUse(current.name).into());
                }
            }
        }

        let permissions = match &input.permissions {
            Some(tags) => {
                let requested = permission_provider::parse_permissions(tags)?;
                Some(permission_provider::expand(requested.iter()))
            }
            None => None,
        };

        let changes = RoleChanges {
            name: input.name.map(|name| name.trim().to_string()),
            description: input.description,
            permissions,
            scope_level: input.scope_level,
            is_active: input.is_active,
        };
        let role = self
            .app_data
            .role_store
            .update(db, role_id, changes)
            .await?;

        self.app_data
            .audit_logger
            .builder(EventType::RoleUpdated)
            .with_context(ctx)
            .add_field("role_id", &role.id)
            .add_field("permissions", &role.permissions)
            .add_field("is_active", role.is_active)
            .emit()
            .await;

        Ok(role)
    }

    /// Delete a role nobody holds and no pending application requests
    pub async fn delete(&self, ctx: &RequestContext, role_id: &str) -> Result<(), InternalError> {
        authorize(&self.app_data, ctx, Permission::RoleDelete).await?;

        let txn = begin_transaction(&self.app_data.connections.main).await?;
        let role = self.app_data.role_store.get(&txn, role_id).await?;
        let assignments = self.app_data.role_store.count_assignments(&txn, role_id).await?;
        let pending = self.app_data.application_store.count_pending_for_role(&txn, role_id).await?;
        if assignments > 0 || pending > 0 {
            return Err(RoleError::RoleInUse(role.name).into());
        }
        self.app_data.role_store.delete(&txn, role_id).await?;
        commit_transaction(txn).await?;

        self.app_data
            .audit_logger
            .builder(EventType::RoleDeleted)
            .with_context(ctx)
            .add_field("role_id", role_id)
            .add_field("name", &role.name)
            .emit()
            .await;

        Ok(())
    }
}
