use std::path::PathBuf;
use std::sync::Arc;

use crate::audit::AuditLogger;
use crate::config::{BootstrapSettings, DatabaseConnections, SecretManager};
use crate::errors::InternalError;
use crate::providers::{AccessProvider, CryptoProvider, PasswordPolicyProvider, TokenProvider};
use crate::stores::{
    ApplicationStore, AuditStore, DuesStore, FileStore, MemberStore, RegionStore, RoleStore,
    ScopeStore, SettingsStore, TokenStore, UserStore,
};

/// Centralized application data following the main-owned stores pattern
///
/// All dependencies are created once at startup and shared across
/// coordinators behind an `Arc<AppData>`.
///
/// ```text
/// main.rs
///   ↓
/// AppData::init(connections, settings)
///   ├─ connections (main + audit DatabaseConnection)
///   ├─ secret_manager
///   ├─ stores (one per aggregate)
///   ├─ providers (crypto, tokens, access, password policy)
///   └─ audit_logger
///   ↓ wrapped in Arc<AppData>
///   ↓ passed to coordinators
/// ```
pub struct AppData {
    pub connections: DatabaseConnections,
    pub secret_manager: Arc<SecretManager>,

    pub audit_store: Arc<AuditStore>,
    pub user_store: Arc<UserStore>,
    pub token_store: Arc<TokenStore>,
    pub role_store: Arc<RoleStore>,
    pub scope_store: Arc<ScopeStore>,
    pub region_store: Arc<RegionStore>,
    pub member_store: Arc<MemberStore>,
    pub dues_store: Arc<DuesStore>,
    pub application_store: Arc<ApplicationStore>,
    pub settings_store: Arc<SettingsStore>,
    pub file_store: Arc<FileStore>,

    pub crypto_provider: Arc<CryptoProvider>,
    pub token_provider: Arc<TokenProvider>,
    pub access_provider: Arc<AccessProvider>,
    pub password_policy: Arc<PasswordPolicyProvider>,

    pub audit_logger: AuditLogger,
}

impl AppData {
    /// Initialize all application data from the environment
    ///
    /// Database connections should be connected and migrated before calling this.
    ///
    /// # Errors
    /// Returns `InternalError` when the secrets are missing or too short
    pub async fn init(connections: DatabaseConnections, settings: &BootstrapSettings) -> Result<Self, InternalError> {
        tracing::info!("Initializing AppData...");

        tracing::debug!("Initializing secret manager...");
        let secret_manager = Arc::new(
            SecretManager::init()
                .map_err(|e| InternalError::parse("secret_manager", format!("Secret manager init failed: {}", e)))?,
        );

        let app_data = Self::with_secrets(connections, secret_manager, settings.upload_dir().to_path_buf());
        tracing::info!("AppData initialization complete");
        Ok(app_data)
    }

    /// Wire stores and providers around already loaded secrets
    pub fn with_secrets(
        connections: DatabaseConnections,
        secret_manager: Arc<SecretManager>,
        upload_dir: PathBuf,
    ) -> Self {
        tracing::debug!("Creating stores...");
        let audit_store = Arc::new(AuditStore::new(connections.audit.clone()));
        let user_store = Arc::new(UserStore::new());
        let role_store = Arc::new(RoleStore::new());
        let scope_store = Arc::new(ScopeStore::new());
        let settings_store = Arc::new(SettingsStore::new());

        let access_provider = Arc::new(AccessProvider::new(
            user_store.clone(),
            role_store.clone(),
            scope_store.clone(),
        ));

        Self {
            audit_logger: AuditLogger::new(audit_store.clone()),
            crypto_provider: Arc::new(CryptoProvider::new(secret_manager.clone())),
            token_provider: Arc::new(TokenProvider::new(secret_manager.clone())),
            password_policy: Arc::new(PasswordPolicyProvider::new(settings_store.clone())),
            access_provider,
            connections,
            secret_manager,
            audit_store,
            user_store,
            token_store: Arc::new(TokenStore::new()),
            role_store,
            scope_store,
            region_store: Arc::new(RegionStore::new()),
            member_store: Arc::new(MemberStore::new()),
            dues_store: Arc::new(DuesStore::new()),
            application_store: Arc::new(ApplicationStore::new()),
            settings_store,
            file_store: Arc::new(FileStore::new(upload_dir)),
        }
    }
}
