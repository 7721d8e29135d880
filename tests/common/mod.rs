// Common test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use migration::{AuditMigrator, MainMigrator, MigratorTrait};
use poem::test::TestClient;
use poem::Route;
use sea_orm::{Database, DatabaseConnection};
use serde_json::json;
use uuid::Uuid;

use union_admin_backend::api;
use union_admin_backend::app_data::AppData;
use union_admin_backend::cli::bootstrap::{BootstrapRequest, create_first_admin};
use union_admin_backend::config::{DatabaseConnections, SecretManager};
use union_admin_backend::types::internal::context::RequestContext;

pub const ADMIN_USERNAME: &str = "root";
pub const ADMIN_PASSWORD: &str = "Sunflower7";

/// Creates a test main database with migrations applied
pub async fn setup_test_main_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    MainMigrator::up(&db, None)
        .await
        .expect("Failed to run main migrations");

    db
}

/// Creates a test audit database with migrations applied
pub async fn setup_test_audit_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create audit database");

    AuditMigrator::up(&db, None)
        .await
        .expect("Failed to run audit migrations");

    db
}

/// AppData over fresh in-memory databases with fixed secrets
pub async fn setup_app_data() -> Arc<AppData> {
    let connections = DatabaseConnections {
        main: setup_test_main_db().await,
        audit: setup_test_audit_db().await,
    };
    let secrets = Arc::new(SecretManager::new(
        "integration-secret-minimum-32-characters",
        "integration-pepper-value",
    ));
    let upload_dir = std::env::temp_dir().join(format!("union-admin-it-{}", Uuid::new_v4()));
    Arc::new(AppData::with_secrets(connections, secrets, upload_dir))
}

/// AppData with a bootstrapped administrator and a client over the full route tree
pub async fn setup_client() -> (Arc<AppData>, TestClient<Route>) {
    let app_data = setup_app_data().await;
    create_first_admin(
        &app_data,
        &RequestContext::for_cli("bootstrap"),
        BootstrapRequest {
            username: ADMIN_USERNAME.to_string(),
            full_name: "Root Admin".to_string(),
            email: None,
            password: Some(ADMIN_PASSWORD.to_string()),
        },
    )
    .await
    .expect("Failed to bootstrap administrator");

    let client = TestClient::new(api::routes(app_data.clone(), "http://localhost:3000"));
    (app_data, client)
}

/// Log in over HTTP and return the access token
pub async fn login(client: &TestClient<Route>, username: &str, password: &str) -> String {
    let resp = client
        .post("/api/auth/login")
        .body_json(&json!({ "username": username, "password": password }))
        .send()
        .await;
    resp.assert_status_is_ok();

    let json = resp.json().await;
    json.value().object().get("access_token").string().to_string()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Helper to manage environment variables in tests
///
/// Cleans up specified environment variables on creation and drop,
/// ensuring test isolation when dealing with global environment state.
pub struct EnvGuard {
    vars: Vec<String>,
}

impl EnvGuard {
    pub fn new(vars: Vec<&str>) -> Self {
        for var in &vars {
            unsafe {
                std::env::remove_var(var);
            }
        }
        Self {
            vars: vars.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for var in &self.vars {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }
}

/// Global mutex for tests that modify environment variables
///
/// Environment variables are process-global, so tests that modify them
/// must run serially to avoid race conditions.
pub static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());
