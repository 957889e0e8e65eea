//! Start the HTTP server.

use clap::Args;

use booble_core::config::AppConfig;
use booble_core::error::AppError;
use booble_database::migration::run_migrations;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the configured bind port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Skip applying pending migrations at startup
    #[arg(long)]
    pub skip_migrations: bool,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, mut config: AppConfig) -> Result<(), AppError> {
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let pool = super::create_db_pool(&config).await?;
    if !args.skip_migrations {
        run_migrations(&pool).await?;
    }

    booble_api::app::run_server(config, pool).await
}
