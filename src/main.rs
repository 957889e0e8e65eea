//! BoobleDrive Server: personal file storage and sharing.
//!
//! Main entry point that loads configuration, prepares the database,
//! and starts the HTTP server.

use tracing_subscriber::{EnvFilter, fmt};

use booble_core::config::{AppConfig, LogFormat};
use booble_core::error::AppError;
use booble_database::DatabasePool;
use booble_database::migration::run_migrations;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `BOOBLE_CONFIG_DIR` for the `BOOBLE_ENV` environment.
fn load_configuration() -> Result<AppConfig, AppError> {
    let dir = std::env::var("BOOBLE_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("BOOBLE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load_from(&dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting BoobleDrive v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db_pool = DatabasePool::connect(&config.database).await?.into_pool();

    tracing::info!("Running database migrations...");
    run_migrations(&db_pool).await?;
    tracing::info!("Database migrations complete");

    // ── Step 2: Build and start HTTP server ──────────────────────
    booble_api::app::run_server(config, db_pool).await
}
