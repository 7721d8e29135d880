use poem_openapi::Object;
use poem_openapi::types::MaybeUndefined;

use crate::coordinators::role_coordinator::{CreateRoleInput, UpdateRoleInput};
use crate::providers::permission_provider::CatalogEntry;
use crate::types::db::custom_role;
use crate::types::dto::into_change;
use crate::types::internal::permission::Permission;
use crate::types::internal::scope::ScopeLevel;

fn tags<'a>(permissions: impl IntoIterator<Item = &'a Permission>) -> Vec<String> {
    permissions.into_iter().map(|p| p.as_str().to_string()).collect()
}

/// Short form used inside user and profile responses
#[derive(Object, Debug, Clone)]
pub struct RoleSummary {
    pub id: String,
    pub name: String,
    pub is_active: bool,
}

impl From<custom_role::Model> for RoleSummary {
    fn from(role: custom_role::Model) -> Self {
        Self {
            id: role.id,
            name: role.name,
            is_active: role.is_active,
        }
    }
}

#[derive(Object, Debug, Clone)]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Stored dependency-closed
    pub permissions: Vec<String>,
    /// Holders are limited to their own scopes at this level
    pub scope_level: Option<ScopeLevel>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<custom_role::Model> for RoleResponse {
    fn from(role: custom_role::Model) -> Self {
        let permissions = role.permission_set().map(|set| tags(&set)).unwrap_or_else(|e| {
            tracing::error!(role_id = %role.id, "Unreadable permission column: {}", e);
            Vec::new()
        });
        Self {
            id: role.id,
            name: role.name,
            description: role.description,
            permissions,
            scope_level: role.scope_level,
            is_active: role.is_active,
            created_at: role.created_at,
            updated_at: role.updated_at,
        }
    }
}

#[derive(Object, Debug)]
pub struct CreateRoleRequest {
    #[oai(validator(min_length = 1, max_length = 100))]
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<String>,
    pub scope_level: Option<ScopeLevel>,
}

impl From<CreateRoleRequest> for CreateRoleInput {
    fn from(request: CreateRoleRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            permissions: request.permissions,
            scope_level: request.scope_level,
        }
    }
}

#[derive(Object, Debug, Default)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub description: MaybeUndefined<String>,
    pub permissions: Option<Vec<String>>,
    pub scope_level: MaybeUndefined<ScopeLevel>,
    pub is_active: Option<bool>,
}

impl From<UpdateRoleRequest> for UpdateRoleInput {
    fn from(request: UpdateRoleRequest) -> Self {
        Self {
            name: request.name,
            description: into_change(request.description),
            permissions: request.permissions,
            scope_level: into_change(request.scope_level),
            is_active: request.is_active,
        }
    }
}

/// One permission with what it pulls in
#[derive(Object, Debug)]
pub struct PermissionResponse {
    pub permission: String,
    pub description: String,
    pub direct_dependencies: Vec<String>,
    pub all_dependencies: Vec<String>,
}

impl From<CatalogEntry> for PermissionResponse {
    fn from(entry: CatalogEntry) -> Self {
        Self {
            permission: entry.permission.as_str().to_string(),
            description: entry.description.to_string(),
            direct_dependencies: tags(&entry.direct_dependencies),
            all_dependencies: tags(&entry.all_dependencies),
        }
    }
}
