use crate::config::{BootstrapSettings, DatabaseConnections};
use crate::errors::InternalError;

/// Connect to the main and audit databases and run all pending migrations
///
/// Does not initialize AppData, so it works before secrets are configured.
pub async fn run_migrations(settings: &BootstrapSettings) -> Result<DatabaseConnections, InternalError> {
    tracing::info!("Running database migrations...");

    tracing::info!("Connecting to {} and audit database...", settings.database_url());
    let connections = DatabaseConnections::connect(settings).await?;

    connections.migrate().await?;
    tracing::info!("All migrations completed successfully");

    Ok(connections)
}
