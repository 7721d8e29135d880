// Bootstrap command implementation
// Creates the first administrator so the HTTP API becomes usable

use crate::app_data::AppData;
use crate::config::{begin_transaction, commit_transaction};
use crate::errors::InternalError;
use crate::errors::internal::UserError;
use crate::stores::user_store::NewUser;
use crate::types::db::user;
use crate::types::internal::audit::EventType;
use crate::types::internal::context::RequestContext;
use crate::types::internal::permission::SystemRole;

#[derive(Debug, Clone)]
pub struct BootstrapRequest {
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct BootstrapOutcome {
    pub user: user::Model,
    /// Set when the password was generated and must be shown to the operator
    pub generated_password: Option<String>,
}

/// Create the first ADMIN account and print its credentials
///
/// Wrapped in CLI session start/end activity log entries.
pub async fn bootstrap_admin(app_data: &AppData, request: BootstrapRequest) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = RequestContext::for_cli("bootstrap");

    if let Err(audit_err) = app_data
        .audit_logger
        .log_cli_session_start(&ctx, "bootstrap", vec![format!("--username={}", request.username)])
        .await
    {
        tracing::warn!("Failed to log CLI session start: {}", audit_err);
    }

    let result = create_first_admin(app_data, &ctx, request).await;

    let (success, error_message) = match &result {
        Ok(_) => (true, None),
        Err(e) => (false, Some(e.to_string())),
    };
    if let Err(audit_err) = app_data
        .audit_logger
        .log_cli_session_end(&ctx, "bootstrap", success, error_message)
        .await
    {
        tracing::warn!("Failed to log CLI session end: {}", audit_err);
    }

    let outcome = result?;
    println!("\n=== Bootstrap Complete ===");
    println!("  Username: {}", outcome.user.username);
    if let Some(password) = &outcome.generated_password {
        println!("  Password: {}", password);
        println!("  Password change required on first login");
    }
    Ok(())
}

/// Insert the administrator unless one already exists
///
/// A supplied password must satisfy the password policy; a generated one
/// forces a change at first login.
pub async fn create_first_admin(
    app_data: &AppData,
    ctx: &RequestContext,
    request: BootstrapRequest,
) -> Result<BootstrapOutcome, InternalError> {
    let db = &app_data.connections.main;

    let txn = begin_transaction(db).await?;
    if app_data.user_store.count_with_role(&txn, SystemRole::Admin).await? > 0 {
        return Err(UserError::AlreadyBootstrapped.into());
    }
    if app_data.user_store.username_exists(&txn, &request.username).await? {
        return Err(UserError::DuplicateUsername {
            username: request.username,
        }
        .into());
    }

    let (password, generated) = match request.password {
        Some(password) => {
            app_data
                .password_policy
                .validate(&txn, &password, Some(&request.username))
                .await?;
            (password, false)
        }
        None => (app_data.crypto_provider.generate_secure_password(), true),
    };
    let password_hash = app_data.crypto_provider.hash_password(&password)?;

    let user = app_data
        .user_store
        .create(
            &txn,
            NewUser {
                username: request.username,
                password_hash,
                full_name: request.full_name,
                email: request.email,
                roles: vec![SystemRole::Admin],
                member_id: None,
                password_change_required: generated,
            },
        )
        .await?;
    commit_transaction(txn).await?;

    tracing::info!(user_id = %user.id, "Bootstrap administrator created");
    app_data
        .audit_logger
        .builder(EventType::UserCreated)
        .with_context(ctx)
        .add_field("target_user_id", &user.id)
        .add_field("roles", vec![SystemRole::Admin.as_str()])
        .add_field("bootstrap", true)
        .emit()
        .await;

    Ok(BootstrapOutcome {
        user,
        generated_password: generated.then_some(password),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::internal::CredentialError;
    use crate::test::utils::setup_test_app_data;

    fn request(username: &str, password: Option<&str>) -> BootstrapRequest {
        BootstrapRequest {
            username: username.to_string(),
            full_name: "Root Admin".to_string(),
            email: None,
            password: password.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_generated_password_requires_change() {
        let app_data = setup_test_app_data().await;
        let ctx = RequestContext::for_cli("bootstrap");

        let outcome = create_first_admin(&app_data, &ctx, request("root", None)).await.unwrap();

        let password = outcome.generated_password.unwrap();
        assert!(outcome.user.password_change_required);
        assert!(app_data
            .crypto_provider
            .verify_password(&password, &outcome.user.password_hash)
            .unwrap());
    }

    #[tokio::test]
    async fn test_supplied_password_is_validated() {
        let app_data = setup_test_app_data().await;
        let ctx = RequestContext::for_cli("bootstrap");

        let result = create_first_admin(&app_data, &ctx, request("root", Some("short"))).await;
        assert!(matches!(
            result,
            Err(InternalError::Credential(CredentialError::PasswordValidationFailed(_)))
        ));

        let outcome = create_first_admin(&app_data, &ctx, request("root", Some("Sunflower7")))
            .await
            .unwrap();
        assert!(outcome.generated_password.is_none());
        assert!(!outcome.user.password_change_required);
    }

    #[tokio::test]
    async fn test_second_bootstrap_is_refused() {
        let app_data = setup_test_app_data().await;
        let ctx = RequestContext::for_cli("bootstrap");

        create_first_admin(&app_data, &ctx, request("root", None)).await.unwrap();
        let result = create_first_admin(&app_data, &ctx, request("other", None)).await;

        assert!(matches!(result, Err(InternalError::User(UserError::AlreadyBootstrapped))));
        assert_eq!(
            app_data
                .user_store
                .count_with_role(&app_data.connections.main, SystemRole::Admin)
                .await
                .unwrap(),
            1
        );
    }
}
