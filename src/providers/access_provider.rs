use std::collections::BTreeSet;
use std::sync::Arc;

use sea_orm::ConnectionTrait;

use crate::errors::InternalError;
use crate::errors::internal::{AccessError, RoleError};
use crate::providers::permission_provider;
use crate::stores::{RoleStore, ScopeStore, UserStore};
use crate::types::db::{custom_role, user};
use crate::types::internal::permission::{Permission, SystemRole};
use crate::types::internal::scope::{MemberScope, ScopeLevel, ScopeRef};

/// What an authenticated user may do, and where
#[derive(Debug, Clone)]
pub struct AccessProfile {
    pub user: user::Model,
    pub system_roles: Vec<SystemRole>,
    /// Active custom roles only
    pub custom_roles: Vec<custom_role::Model>,
    pub permissions: BTreeSet<Permission>,
    pub scopes: Vec<ScopeRef>,
    pub scope_restricted: bool,
}

impl AccessProfile {
    /// Combine system roles, active custom roles and scopes
    ///
    /// Inactive custom roles contribute nothing. The result is dependency
    /// expanded. Admins are never scope restricted.
    pub fn build(
        user: user::Model,
        custom_roles: Vec<custom_role::Model>,
        scopes: Vec<ScopeRef>,
    ) -> Result<Self, InternalError> {
        let system_roles = user.system_roles()?;
        let custom_roles: Vec<custom_role::Model> = custom_roles.into_iter().filter(|r| r.is_active).collect();

        let mut granted: BTreeSet<Permission> = system_roles
            .iter()
            .flat_map(|role| role.default_permissions().iter().copied())
            .collect();
        for role in &custom_roles {
            granted.extend(role.permission_set()?);
        }
        let permissions = permission_provider::expand(granted.iter());

        let is_admin = system_roles.contains(&SystemRole::Admin);
        let scope_restricted = !is_admin && custom_roles.iter().any(|r| r.scope_level.is_some());

        Ok(Self {
            user,
            system_roles,
            custom_roles,
            permissions,
            scopes,
            scope_restricted,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.system_roles.contains(&SystemRole::Admin)
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn require(&self, permission: Permission) -> Result<(), InternalError> {
        if self.has(permission) {
            Ok(())
        } else {
            Err(AccessError::MissingPermission(permission).into())
        }
    }

    pub fn require_admin(&self) -> Result<(), InternalError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AccessError::AdminRoleRequired.into())
        }
    }

    /// Member visibility for list queries
    pub fn member_scope(&self) -> MemberScope {
        if self.scope_restricted {
            MemberScope::from_scopes(&self.scopes)
        } else {
            MemberScope::Unrestricted
        }
    }

    /// Fail unless a member at this location is inside the user's scope
    pub fn ensure_in_scope(&self, province_id: &str, district_id: Option<&str>) -> Result<(), InternalError> {
        if self.member_scope().allows(province_id, district_id) {
            Ok(())
        } else {
            Err(AccessError::OutOfScope.into())
        }
    }
}

/// Scopes must fit the level of every scoped role, and a scoped role needs at least one
pub fn check_role_scopes(roles: &[custom_role::Model], scopes: &[ScopeRef]) -> Result<(), InternalError> {
    for role in roles {
        let Some(level) = role.scope_level else {
            continue;
        };
        let reason = if scopes.is_empty() {
            "at least one scope is required"
        } else if !scopes.iter().all(|scope| level.accepts(scope)) {
            match level {
                ScopeLevel::Province => "scopes must cover whole provinces",
                ScopeLevel::District => "scopes must name a district",
            }
        } else {
            continue;
        };
        return Err(RoleError::ScopeRequired {
            role: role.name.clone(),
            level: level.as_str().to_string(),
            reason: reason.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Loads access profiles for authenticated requests
pub struct AccessProvider {
    user_store: Arc<UserStore>,
    role_store: Arc<RoleStore>,
    scope_store: Arc<ScopeStore>,
}

impl AccessProvider {
    pub fn new(user_store: Arc<UserStore>, role_store: Arc<RoleStore>, scope_store: Arc<ScopeStore>) -> Self {
        Self {
            user_store,
            role_store,
            scope_store,
        }
    }

    /// Load the current profile of a token's subject
    ///
    /// # Errors
    /// * `AccessError::Unauthenticated` when the user no longer exists
    /// * `AccessError::UserInactive` when the user was deactivated after the token was issued
    pub async fn load_profile(&self, conn: &impl ConnectionTrait, user_id: &str) -> Result<AccessProfile, InternalError> {
        let user = self
            .user_store
            .find_by_id(conn, user_id)
            .await?
            .ok_or(AccessError::Unauthenticated)?;
        if !user.is_active {
            return Err(AccessError::UserInactive.into());
        }

        let custom_roles = self.role_store.roles_for_user(conn, user_id).await?;
        let scopes = self.scope_store.scopes_for_user(conn, user_id).await?;
        AccessProfile::build(user, custom_roles, scopes)
    }
}
