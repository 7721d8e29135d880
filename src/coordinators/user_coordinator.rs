use std::sync::Arc;

use crate::app_data::AppData;
use crate::config::{begin_transaction, commit_transaction};
use crate::coordinators::authorize;
use crate::errors::InternalError;
use crate::errors::internal::{AccessError, UserError};
use crate::providers::AccessProfile;
use crate::providers::access_provider::check_role_scopes;
use crate::stores::user_store::{NewUser, UserChanges, UserFilter};
use crate::types::db::{custom_role, user};
use crate::types::dto::common::PageRequest;
use crate::types::internal::audit::EventType;
use crate::types::internal::context::RequestContext;
use crate::types::internal::permission::{Permission, SystemRole};
use crate::types::internal::scope::{ScopeInput, ScopeRef};

#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: Option<String>,
    pub roles: Vec<SystemRole>,
    pub custom_role_ids: Vec<String>,
    pub scopes: Vec<ScopeInput>,
}

/// A user with assigned custom roles and scopes
#[derive(Debug, Clone)]
pub struct UserDetails {
    pub user: user::Model,
    pub custom_roles: Vec<custom_role::Model>,
    pub scopes: Vec<ScopeRef>,
}

/// Panel user management
pub struct UserCoordinator {
    app_data: Arc<AppData>,
}

impl UserCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }

    async fn details(&self, user: user::Model) -> Result<UserDetails, InternalError> {
        let db = &self.app_data.connections.main;
        let custom_roles = self.app_data.role_store.roles_for_user(db, &user.id).await?;
        let scopes = self.app_data.scope_store.scopes_for_user(db, &user.id).await?;
        Ok(UserDetails {
            user,
            custom_roles,
            scopes,
        })
    }

    /// Granting or revoking ADMIN is reserved for administrators
    fn check_admin_change(caller: &AccessProfile, old: &[SystemRole], new: &[SystemRole]) -> Result<(), InternalError> {
        let had = old.contains(&SystemRole::Admin);
        let has = new.contains(&SystemRole::Admin);
        if had != has {
            caller.require_admin()?;
        }
        Ok(())
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<(Vec<user::Model>, u64), InternalError> {
        authorize(&self.app_data, ctx, Permission::UserList).await?;
        self.app_data
            .user_store
            .list(&self.app_data.connections.main, filter, page)
            .await
    }

    pub async fn get(&self, ctx: &RequestContext, user_id: &str) -> Result<UserDetails, InternalError> {
        authorize(&self.app_data, ctx, Permission::UserView).await?;
        let user = self
            .app_data
            .user_store
            .get_by_id(&self.app_data.connections.main, user_id)
            .await?;
        self.details(user).await
    }

    /// Create a user with roles and scopes in one transaction
    pub async fn create(&self, ctx: &RequestContext, input: CreateUserInput) -> Result<UserDetails, InternalError> {
        let caller = authorize(&self.app_data, ctx, Permission::UserCreate).await?;
        Self::check_admin_change(&caller, &[], &input.roles)?;
        if !input.custom_role_ids.is_empty() {
            caller.require(Permission::UserAssignRole)?;
        }
        if !input.scopes.is_empty() {
            caller.require(Permission::UserManageScope)?;
        }

        let username = input.username.trim().to_string();
        let txn = begin_transaction(&self.app_data.connections.main).await?;

        self.app_data
            .password_policy
            .validate(&txn, &input.password, Some(&username))
            .await?;
        if self
            .app_data
            .application_store
            .pending_username_exists(&txn, &username)
            .await?
        {
            return Err(UserError::DuplicateUsername { username }.into());
        }
        let custom_roles = self.app_data.role_store.get_many(&txn, &input.custom_role_ids).await?;
        let scopes = self.app_data.region_store.resolve_scopes(&txn, &input.scopes).await?;
        check_role_scopes(&custom_roles, &scopes)?;

        let user = self
            .app_data
            .user_store
            .create(
                &txn,
                NewUser {
                    username,
                    password_hash: self.app_data.crypto_provider.hash_password(&input.password)?,
                    full_name: input.full_name,
                    email: input.email,
                    roles: input.roles.clone(),
                    member_id: None,
                    password_change_required: false,
                },
            )
            .await?;
        self.app_data
            .role_store
            .replace_user_roles(&txn, &user.id, &input.custom_role_ids)
            .await?;
        self.app_data.scope_store.replace_for_user(&txn, &user.id, &scopes).await?;
        commit_transaction(txn).await?;

        self.app_data
            .audit_logger
            .builder(EventType::UserCreated)
            .with_context(ctx)
            .add_field("target_user_id", &user.id)
            .add_field("username", &user.username)
            .add_field("roles", &input.roles)
            .emit()
            .await;

        self.details(user).await
    }

    pub async fn update(&self, ctx: &RequestContext, user_id: &str, changes: UserChanges) -> Result<UserDetails, InternalError> {
        let caller = authorize(&self.app_data, ctx, Permission::UserUpdate).await?;
        let db = &self.app_data.connections.main;
        let target = self.app_data.user_store.get_by_id(db, user_id).await?;

        if let Some(roles) = &changes.roles {
            Self::check_admin_change(&caller, &target.system_roles()?, roles)?;
        }
        if changes.is_active == Some(false) {
            caller.require(Permission::UserDeactivate)?;
            if caller.user_id() == user_id {
                return Err(AccessError::SelfModification {
                    action: "deactivate".to_string(),
                }
                .into());
            }
        }

        let deactivating = changes.is_active == Some(false) && target.is_active;
        let updated = self.app_data.user_store.update(db, user_id, changes).await?;
        if deactivating {
            self.app_data.token_store.revoke_all_for_user(db, user_id).await?;
        }

        self.app_data
            .audit_logger
            .builder(EventType::UserUpdated)
            .with_context(ctx)
            .add_field("target_user_id", user_id)
            .add_field("is_active", updated.is_active)
            .emit()
            .await;

        self.details(updated).await
    }

    /// Replace the user's custom roles; every id must exist and fit the current scopes
    pub async fn assign_roles(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        role_ids: Vec<String>,
    ) -> Result<UserDetails, InternalError> {
        authorize(&self.app_data, ctx, Permission::UserAssignRole).await?;

        let txn = begin_transaction(&self.app_data.connections.main).await?;
        let user = self.app_data.user_store.get_by_id(&txn, user_id).await?;
        let roles = self.app_data.role_store.get_many(&txn, &role_ids).await?;
        let scopes = self.app_data.scope_store.scopes_for_user(&txn, user_id).await?;
        check_role_scopes(&roles, &scopes)?;
        self.app_data.role_store.replace_user_roles(&txn, user_id, &role_ids).await?;
        commit_transaction(txn).await?;

        self.app_data
            .audit_logger
            .builder(EventType::UserRolesAssigned)
            .with_context(ctx)
            .add_field("target_user_id", user_id)
            .add_field("role_ids", &role_ids)
            .emit()
            .await;

        self.details(user).await
    }

    /// Replace the user's scopes; each one is validated against the region
    /// tables and the scope level of the roles the user holds
    pub async fn replace_scopes(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        inputs: Vec<ScopeInput>,
    ) -> Result<UserDetails, InternalError> {
        authorize(&self.app_data, ctx, Permission::UserManageScope).await?;

        let txn = begin_transaction(&self.app_data.connections.main).await?;
        let user = self.app_data.user_store.get_by_id(&txn, user_id).await?;
        let scopes = self.app_data.region_store.resolve_scopes(&txn, &inputs).await?;
        let roles = self.app_data.role_store.roles_for_user(&txn, user_id).await?;
        check_role_scopes(&roles, &scopes)?;
        self.app_data.scope_store.replace_for_user(&txn, user_id, &scopes).await?;
        commit_transaction(txn).await?;

        self.app_data
            .audit_logger
            .builder(EventType::UserScopesChanged)
            .with_context(ctx)
            .add_field("target_user_id", user_id)
            .add_field("scopes", &scopes)
            .emit()
            .await;

        self.details(user).await
    }

    /// Deactivate another user and revoke their refresh tokens
    pub async fn deactivate(&self, ctx: &RequestContext, user_id: &str) -> Result<UserDetails, InternalError> {
        let caller = authorize(&self.app_data, ctx, Permission::UserDeactivate).await?;
        if caller.user_id() == user_id {
            return Err(AccessError::SelfModification {
                action: "deactivate".to_string(),
            }
            .into());
        }

        let txn = begin_transaction(&self.app_data.connections.main).await?;
        let changes = UserChanges {
            is_active: Some(false),
            ..Default::default()
        };
        let user = self.app_data.user_store.update(&txn, user_id, changes).await?;
        self.app_data.token_store.revoke_all_for_user(&txn, user_id).await?;
        commit_transaction(txn).await?;

        self.app_data
            .audit_logger
            .builder(EventType::UserDeactivated)
            .with_context(ctx)
            .add_field("target_user_id", user_id)
            .emit()
            .await;

        self.details(user).await
    }
}
