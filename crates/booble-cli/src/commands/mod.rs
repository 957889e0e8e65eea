//! CLI command definitions and dispatch.

pub mod files;
pub mod migrate;
pub mod serve;
pub mod tags;
pub mod tokens;
pub mod uploads;
pub mod user;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use sqlx::PgPool;

use booble_auth::jwt::{JwtEncoder, RevocationList};
use booble_core::config::AppConfig;
use booble_core::error::AppError;
use booble_database::DatabasePool;
use booble_database::repositories::{RefreshTokenRepository, UserRepository};
use booble_service::UserService;

use crate::output::OutputFormat;

/// BoobleDrive: personal file storage and sharing
#[derive(Debug, Parser)]
#[command(name = "booble", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `default.toml` and environment overlays
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Environment overlay to apply on top of the defaults
    #[arg(short, long, env = "BOOBLE_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the BoobleDrive server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// User management
    User(user::UserArgs),
    /// Refresh token maintenance
    Tokens(tokens::TokensArgs),
    /// Chunked upload maintenance
    Uploads(uploads::UploadsArgs),
    /// File maintenance
    Files(files::FilesArgs),
    /// Tag maintenance
    Tags(tags::TagsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load_from(&self.config, &self.env)?;

        match &self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Migrate(args) => migrate::execute(args, &config, self.format).await,
            Commands::User(args) => user::execute(args, &config, self.format).await,
            Commands::Tokens(args) => tokens::execute(args, &config).await,
            Commands::Uploads(args) => uploads::execute(args, &config).await,
            Commands::Files(args) => files::execute(args, &config).await,
            Commands::Tags(args) => tags::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: create database pool from config
pub async fn create_db_pool(config: &AppConfig) -> Result<PgPool, AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    Ok(pool.into_pool())
}

/// Helper: build a user service on top of `pool`
pub fn user_service(config: &AppConfig, pool: &PgPool) -> UserService {
    let encoder = Arc::new(JwtEncoder::new(&config.auth));
    let revocations = RevocationList::new(encoder.access_ttl());
    UserService::new(
        Arc::new(UserRepository::new(pool.clone())),
        Arc::new(RefreshTokenRepository::new(pool.clone())),
        encoder,
        revocations,
        &config.auth,
        &config.storage,
    )
}

/// Ask for confirmation unless `force` is set.
pub fn confirm(prompt: &str, force: bool) -> Result<bool, AppError> {
    if force {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}
