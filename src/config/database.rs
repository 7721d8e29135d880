use migration::{AuditMigrator, MainMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::config::BootstrapSettings;
use crate::errors::InternalError;

/// Connections to the main and the audit database
///
/// Activity-log rows live in their own database so that pruning or
/// locking it never blocks the business tables.
#[derive(Clone)]
pub struct DatabaseConnections {
    pub main: DatabaseConnection,
    pub audit: DatabaseConnection,
}

impl DatabaseConnections {
    /// Connect to both databases
    ///
    /// Does NOT run migrations - call `migrate()` separately.
    pub async fn connect(settings: &BootstrapSettings) -> Result<Self, InternalError> {
        let main = Database::connect(settings.database_url())
            .await
            .map_err(|e| InternalError::database("connect_database", e))?;
        tracing::debug!("Connected to main database: {}", settings.database_url());

        let audit = Database::connect(settings.audit_database_url())
            .await
            .map_err(|e| InternalError::database("connect_audit_database", e))?;
        tracing::debug!("Connected to audit database: {}", settings.audit_database_url());

        Ok(Self { main, audit })
    }

    pub async fn migrate(&self) -> Result<(), InternalError> {
        migrate_main_database(&self.main).await?;
        migrate_audit_database(&self.audit).await?;
        Ok(())
    }
}

/// Run all pending migrations on the main database
pub async fn migrate_main_database(db: &DatabaseConnection) -> Result<(), InternalError> {
    MainMigrator::up(db, None)
        .await
        .map_err(|e| InternalError::database("run_migrations", e))?;

    tracing::debug!("Main database migrations completed");
    Ok(())
}

/// Run all pending migrations on the audit database
pub async fn migrate_audit_database(audit_db: &DatabaseConnection) -> Result<(), InternalError> {
    AuditMigrator::up(audit_db, None)
        .await
        .map_err(|e| InternalError::database("run_audit_migrations", e))?;

    tracing::debug!("Audit database migrations completed");
    Ok(())
}

pub async fn begin_transaction(db: &DatabaseConnection) -> Result<DatabaseTransaction, InternalError> {
    db.begin().await.map_err(InternalError::transaction_begin)
}

pub async fn commit_transaction(txn: DatabaseTransaction) -> Result<(), InternalError> {
    txn.commit().await.map_err(InternalError::transaction_commit)
}
