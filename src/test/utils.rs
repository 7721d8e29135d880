// Test utilities shared across unit tests
// Only compiled when running tests

use std::sync::Arc;

use chrono::Utc;
use migration::{AuditMigrator, MainMigrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use uuid::Uuid;

use crate::app_data::AppData;
use crate::config::{DatabaseConnections, SecretManager};
use crate::types::db::member::{self, MemberStatus};
use crate::types::db::user::{self, encode_roles};
use crate::types::db::province;
use crate::types::internal::auth::Claims;
use crate::types::internal::context::RequestContext;
use crate::types::internal::permission::SystemRole;

pub const TEST_JWT_SECRET: &str = "test-secret-key-minimum-32-characters-long";
pub const TEST_PEPPER: &str = "test-pepper-for-unit-tests";
pub const TEST_PASSWORD: &str = "Sunflower7";

/// In-memory main database with every migration applied
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    MainMigrator::up(&db, None)
        .await
        .expect("Failed to run main migrations");
    db
}

/// In-memory audit database with the activity log table
pub async fn setup_test_audit_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create audit database");
    AuditMigrator::up(&db, None)
        .await
        .expect("Failed to run audit migrations");
    db
}

pub fn test_secret_manager() -> Arc<SecretManager> {
    Arc::new(SecretManager::new(TEST_JWT_SECRET, TEST_PEPPER))
}

/// Fully wired AppData over fresh in-memory databases
///
/// Uploads go to a per-call temp directory that lives as long as the process.
pub async fn setup_test_app_data() -> Arc<AppData> {
    let connections = DatabaseConnections {
        main: setup_test_db().await,
        audit: setup_test_audit_db().await,
    };
    let upload_dir = std::env::temp_dir().join(format!("union-admin-test-{}", Uuid::new_v4()));
    Arc::new(AppData::with_secrets(connections, test_secret_manager(), upload_dir))
}

/// Plain MEMBER account with an unusable password hash
pub async fn create_test_user(db: &DatabaseConnection, username: &str) -> user::Model {
    insert_user(db, username, "not-a-real-hash".to_string(), &[SystemRole::Member]).await
}

/// Account with a real hash of [`TEST_PASSWORD`] and the given system roles
pub async fn create_test_user_with_roles(app_data: &AppData, username: &str, roles: &[SystemRole]) -> user::Model {
    let hash = app_data
        .crypto_provider
        .hash_password(TEST_PASSWORD)
        .expect("Failed to hash test password");
    insert_user(&app_data.connections.main, username, hash, roles).await
}

async fn insert_user(db: &DatabaseConnection, username: &str, password_hash: String, roles: &[SystemRole]) -> user::Model {
    let now = Utc::now().timestamp();
    user::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        full_name: Set(format!("{} Test", username)),
        email: Set(None),
        roles: Set(encode_roles(roles).expect("Failed to encode roles")),
        member_id: Set(None),
        is_active: Set(true),
        password_change_required: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to create test user")
}

pub async fn create_test_province(db: &DatabaseConnection, code: &str) -> province::Model {
    province::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        code: Set(code.to_string()),
        name: Set(format!("Province {}", code)),
        created_at: Set(Utc::now().timestamp()),
    }
    .insert(db)
    .await
    .expect("Failed to create test province")
}

/// ACTIVE member with a random 11 digit national id
pub async fn create_test_member(db: &DatabaseConnection, province_id: &str, district_id: Option<&str>) -> member::Model {
    let now = Utc::now().timestamp();
    let digits = format!("{:011}", Uuid::new_v4().as_u128() % 100_000_000_000);
    member::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        registration_number: Set(format!("T-{}", Uuid::new_v4().simple())),
        national_id: Set(digits),
        first_name: Set("Test".to_string()),
        last_name: Set("Member".to_string()),
        email: Set(None),
        phone: Set(None),
        birth_date: Set(None),
        province_id: Set(province_id.to_string()),
        district_id: Set(district_id.map(str::to_string)),
        branch_id: Set(None),
        institution_id: Set(None),
        status: Set(MemberStatus::Active),
        status_reason: Set(None),
        created_by: Set("test".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to create test member")
}

/// Authenticated API context for a user, as the bearer-auth layer would build it
pub fn context_for(user: &user::Model) -> RequestContext {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.id.clone(),
        exp: now + 900,
        iat: now,
        jti: Uuid::new_v4().to_string(),
        roles: user.system_roles().unwrap_or_default(),
        password_change_required: user.password_change_required,
    };
    RequestContext::new().with_ip_address("127.0.0.1").with_auth(claims)
}
