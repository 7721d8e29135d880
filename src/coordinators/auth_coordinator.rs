use std::sync::Arc;

use chrono::Utc;

use crate::app_data::AppData;
use crate::config::{begin_transaction, commit_transaction};
use crate::coordinators::load_caller;
use crate::errors::InternalError;
use crate::errors::internal::{AccessError, CredentialError};
use crate::providers::AccessProfile;
use crate::providers::token_provider::IssuedJwt;
use crate::stores::settings_store::MAINTENANCE_MODE;
use crate::types::internal::audit::EventType;
use crate::types::internal::context::RequestContext;
use crate::types::internal::permission::SystemRole;

/// Tokens handed out by a successful login
#[derive(Debug, Clone)]
pub struct LoginTokens {
    pub access: IssuedJwt,
    pub refresh_token: String,
    pub password_change_required: bool,
}

/// Authentication coordinator that orchestrates login, refresh, logout and password changes
pub struct AuthCoordinator {
    app_data: Arc<AppData>,
}

impl AuthCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }

    /// Verify credentials and issue an access/refresh token pair
    ///
    /// Unknown users, wrong passwords and inactive accounts all fail with the
    /// same `InvalidCredentials` error; the real reason only goes to the
    /// activity log. During maintenance only administrators get through.
    pub async fn login(&self, ctx: &RequestContext, username: &str, password: &str) -> Result<LoginTokens, InternalError> {
        let db = &self.app_data.connections.main;
        let logger = &self.app_data.audit_logger;

        let Some(user) = self.app_data.user_store.find_by_username(db, username).await? else {
            logger.log_login_failure(ctx, username, "unknown_user").await;
            return Err(CredentialError::InvalidCredentials.into());
        };

        if !self.app_data.crypto_provider.verify_password(password, &user.password_hash)? {
            logger.log_login_failure(ctx, username, "wrong_password").await;
            return Err(CredentialError::InvalidCredentials.into());
        }

        if !user.is_active {
            logger.log_login_failure(ctx, username, "account_inactive").await;
            return Err(CredentialError::InvalidCredentials.into());
        }

        let roles = user.system_roles()?;
        let maintenance = self.app_data.settings_store.get_bool(db, MAINTENANCE_MODE, false).await?;
        if maintenance && !roles.contains(&SystemRole::Admin) {
            logger.log_login_failure(ctx, username, "maintenance_mode").await;
            return Err(CredentialError::MaintenanceMode.into());
        }

        let access = self
            .app_data
            .token_provider
            .generate_jwt(&user.id, roles, user.password_change_required)?;
        let refresh_token = self.app_data.crypto_provider.generate_refresh_token();
        let token_hash = self.app_data.crypto_provider.hmac_sha256_token(&refresh_token)?;
        self.app_data
            .token_store
            .save_refresh_token(db, token_hash, &user.id, self.app_data.token_provider.refresh_token_expiration())
            .await?;

        logger.log_login_success(ctx, &user.id, &access.jti).await;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginTokens {
            access,
            refresh_token,
            password_change_required: user.password_change_required,
        })
    }

    /// Exchange a refresh token for a new access token
    ///
    /// The refresh token itself stays valid until it expires or is revoked.
    pub async fn refresh(&self, ctx: &RequestContext, refresh_token: &str) -> Result<IssuedJwt, InternalError> {
        let db = &self.app_data.connections.main;
        let token_hash = self.app_data.crypto_provider.hmac_sha256_token(refresh_token)?;

        let stored = self
            .app_data
            .token_store
            .find_refresh_token(db, &token_hash)
            .await?
            .ok_or_else(|| CredentialError::invalid_token("refresh", "not found"))?;

        if stored.expires_at < Utc::now().timestamp() {
            self.app_data
                .token_store
                .revoke_for_user(db, &token_hash, &stored.user_id)
                .await?;
            return Err(CredentialError::ExpiredToken("refresh".to_string()).into());
        }

        let user = self.app_data.user_store.get_by_id(db, &stored.user_id).await?;
        if !user.is_active {
            return Err(AccessError::UserInactive.into());
        }

        let access = self.app_data.token_provider.generate_jwt(
            &user.id,
            user.system_roles()?,
            user.password_change_required,
        )?;

        self.app_data
            .audit_logger
            .builder(EventType::TokenRefreshed)
            .with_context(ctx)
            .user_id(&user.id)
            .jwt_id(&access.jti)
            .emit()
            .await;

        Ok(access)
    }

    /// Revoke the caller's own refresh token
    ///
    /// A token belonging to someone else is left untouched; the call still succeeds.
    pub async fn logout(&self, ctx: &RequestContext, refresh_token: &str) -> Result<(), InternalError> {
        let user_id = ctx.user_id().ok_or(AccessError::Unauthenticated)?;
        let token_hash = self.app_data.crypto_provider.hmac_sha256_token(refresh_token)?;

        let revoked = self
            .app_data
            .token_store
            .revoke_for_user(&self.app_data.connections.main, &token_hash, user_id)
            .await?;

        self.app_data
            .audit_logger
            .builder(EventType::Logout)
            .with_context(ctx)
            .add_field("revoked", revoked > 0)
            .emit()
            .await;

        Ok(())
    }

    /// Current profile with effective permissions and scopes
    pub async fn me(&self, ctx: &RequestContext) -> Result<AccessProfile, InternalError> {
        load_caller(&self.app_data, ctx).await
    }

    /// Change the caller's password
    ///
    /// Clears `password_change_required` and revokes every refresh token of the user.
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), InternalError> {
        let profile = load_caller(&self.app_data, ctx).await?;
        let user = &profile.user;

        if !self.app_data.crypto_provider.verify_password(old_password, &user.password_hash)? {
            return Err(CredentialError::IncorrectPassword.into());
        }
        if old_password == new_password {
            return Err(CredentialError::PasswordValidationFailed(
                "New password must differ from the current password".to_string(),
            )
            .into());
        }

        let txn = begin_transaction(&self.app_data.connections.main).await?;
        self.app_data
            .password_policy
            .validate(&txn, new_password, Some(&user.username))
            .await?;
        let hash = self.app_data.crypto_provider.hash_password(new_password)?;
        self.app_data.user_store.set_password(&txn, &user.id, hash, false).await?;
        let revoked = self.app_data.token_store.revoke_all_for_user(&txn, &user.id).await?;
        commit_transaction(txn).await?;

        self.app_data
            .audit_logger
            .builder(EventType::PasswordChanged)
            .with_context(ctx)
            .add_field("target_user_id", &user.id)
            .add_field("revoked_refresh_tokens", revoked)
            .emit()
            .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::user_store::UserChanges;
    use crate::test::utils::{TEST_PASSWORD, context_for, create_test_user_with_roles, setup_test_app_data};

    #[tokio::test]
    async fn test_login_issues_tokens() {
        let app_data = setup_test_app_data().await;
        create_test_user_with_roles(&app_data, "alice", &[SystemRole::Moderator]).await;
        let coordinator = AuthCoordinator::new(app_data.clone());

        let tokens = coordinator.login(&RequestContext::new(), "alice", TEST_PASSWORD).await.unwrap();
        let claims = app_data.token_provider.validate_jwt(&tokens.access.token).unwrap();
        assert_eq!(claims.roles, vec![SystemRole::Moderator]);
        assert!(!tokens.refresh_token.is_empty());
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let app_data = setup_test_app_data().await;
        let user = create_test_user_with_roles(&app_data, "alice", &[SystemRole::Moderator]).await;
        let coordinator = AuthCoordinator::new(app_data.clone());
        let ctx = RequestContext::new();

        let unknown = coordinator.login(&ctx, "bob", TEST_PASSWORD).await;
        let wrong = coordinator.login(&ctx, "alice", "Wrong-password1").await;
        assert!(matches!(unknown, Err(InternalError::Credential(CredentialError::InvalidCredentials))));
        assert!(matches!(wrong, Err(InternalError::Credential(CredentialError::InvalidCredentials))));

        let changes = UserChanges {
            is_active: Some(false),
            ..Default::default()
        };
        app_data.user_store.update(&app_data.connections.main, &user.id, changes).await.unwrap();
        let inactive = coordinator.login(&ctx, "alice", TEST_PASSWORD).await;
        assert!(matches!(inactive, Err(InternalError::Credential(CredentialError::InvalidCredentials))));
    }

    #[tokio::test]
    async fn test_maintenance_mode_admits_only_admins() {
        let app_data = setup_test_app_data().await;
        create_test_user_with_roles(&app_data, "admin", &[SystemRole::Admin]).await;
        create_test_user_with_roles(&app_data, "clerk", &[SystemRole::Moderator]).await;
        app_data
            .settings_store
            .update_value(&app_data.connections.main, MAINTENANCE_MODE, "true")
            .await
            .unwrap();
        let coordinator = AuthCoordinator::new(app_data);
        let ctx = RequestContext::new();

        assert!(coordinator.login(&ctx, "admin", TEST_PASSWORD).await.is_ok());
        let blocked = coordinator.login(&ctx, "clerk", TEST_PASSWORD).await;
        assert!(matches!(blocked, Err(InternalError::Credential(CredentialError::MaintenanceMode))));
    }

    #[tokio::test]
    async fn test_refresh_and_logout() {
        let app_data = setup_test_app_data().await;
        let user = create_test_user_with_roles(&app_data, "alice", &[SystemRole::Moderator]).await;
        let coordinator = AuthCoordinator::new(app_data);
        let tokens = coordinator.login(&RequestContext::new(), "alice", TEST_PASSWORD).await.unwrap();

        let refreshed = coordinator.refresh(&RequestContext::new(), &tokens.refresh_token).await.unwrap();
        assert_ne!(refreshed.jti, tokens.access.jti);

        coordinator.logout(&context_for(&user), &tokens.refresh_token).await.unwrap();
        let after_logout = coordinator.refresh(&RequestContext::new(), &tokens.refresh_token).await;
        assert!(matches!(after_logout, Err(InternalError::Credential(CredentialError::InvalidToken { .. }))));
    }

    #[tokio::test]
    async fn test_logout_cannot_revoke_someone_elses_token() {
        let app_data = setup_test_app_data().await;
        create_test_user_with_roles(&app_data, "alice", &[SystemRole::Moderator]).await;
        let mallory = create_test_user_with_roles(&app_data, "mallory", &[SystemRole::Moderator]).await;
        let coordinator = AuthCoordinator::new(app_data);
        let tokens = coordinator.login(&RequestContext::new(), "alice", TEST_PASSWORD).await.unwrap();

        coordinator.logout(&context_for(&mallory), &tokens.refresh_token).await.unwrap();
        assert!(coordinator.refresh(&RequestContext::new(), &tokens.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_change_password_revokes_refresh_tokens() {
        let app_data = setup_test_app_data().await;
        let user = create_test_user_with_roles(&app_data, "alice", &[SystemRole::Moderator]).await;
        let coordinator = AuthCoordinator::new(app_data.clone());
        let tokens = coordinator.login(&RequestContext::new(), "alice", TEST_PASSWORD).await.unwrap();
        let ctx = context_for(&user);

        let wrong_old = coordinator.change_password(&ctx, "Nope12345", "Brand-new-pass9").await;
        assert!(matches!(wrong_old, Err(InternalError::Credential(CredentialError::IncorrectPassword))));

        let weak = coordinator.change_password(&ctx, TEST_PASSWORD, "short").await;
        assert!(matches!(weak, Err(InternalError::Credential(CredentialError::PasswordValidationFailed(_)))));

        coordinator.change_password(&ctx, TEST_PASSWORD, "Brand-new-pass9").await.unwrap();
        assert!(coordinator.refresh(&RequestContext::new(), &tokens.refresh_token).await.is_err());
        assert!(coordinator.login(&RequestContext::new(), "alice", "Brand-new-pass9").await.is_ok());
    }
}
