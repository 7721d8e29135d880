use std::sync::Arc;

use clap::Parser;
use poem::{Server, listener::TcpListener};

use union_admin_backend::api;
use union_admin_backend::app_data::AppData;
use union_admin_backend::cli::{self, Cli, Commands};
use union_admin_backend::config::{BootstrapSettings, LoggingConfig, init_logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_logging(&LoggingConfig::from_env())?;

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve);

    let settings = BootstrapSettings::from_env()?;
    let connections = cli::migrate::run_migrations(&settings).await?;
    if matches!(command, Commands::Migrate) {
        return Ok(());
    }

    let app_data = Arc::new(AppData::init(connections, &settings).await?);

    match command {
        Commands::Serve => serve(app_data, &settings).await?,
        command => cli::execute_command(command, &app_data).await?,
    }

    Ok(())
}

async fn serve(app_data: Arc<AppData>, settings: &BootstrapSettings) -> Result<(), std::io::Error> {
    let address = settings.server_address();
    let server_url = format!("http://{}", address);
    let app = api::routes(app_data, &server_url);

    tracing::info!("Starting server on {}", server_url);
    tracing::info!("Swagger UI available at {}/swagger", server_url);
    tracing::info!("API endpoints available at {}/api", server_url);

    Server::new(TcpListener::bind(address)).run(app).await
}
