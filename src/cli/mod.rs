// CLI module for administrative operations requiring server access

pub mod bootstrap;
pub mod migrate;
pub mod prune_logs;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::app_data::AppData;

/// Union administration backend
#[derive(Parser)]
#[command(name = "union-admin")]
#[command(about = "Union administration backend server and CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Apply pending migrations to the main and audit databases
    Migrate,

    /// Create the first administrator account
    Bootstrap {
        /// Login name of the administrator
        #[arg(long)]
        username: String,

        /// Display name, defaults to the username
        #[arg(long)]
        full_name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// Initial password; a temporary one is generated when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Delete activity log entries older than `activity_log_retention_days`
    PruneLogs,
}

/// Execute a one-shot CLI command
///
/// `Serve` and `Migrate` are handled by `main` before AppData exists.
pub async fn execute_command(command: Commands, app_data: &Arc<AppData>) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Bootstrap {
            username,
            full_name,
            email,
            password,
        } => {
            let request = bootstrap::BootstrapRequest {
                full_name: full_name.unwrap_or_else(|| username.clone()),
                username,
                email,
                password,
            };
            bootstrap::bootstrap_admin(app_data, request).await?;
        }
        Commands::PruneLogs => {
            prune_logs::prune_logs(app_data).await?;
        }
        Commands::Serve | Commands::Migrate => {
            tracing::debug!("Command handled before AppData initialization");
        }
    }

    Ok(())
}
