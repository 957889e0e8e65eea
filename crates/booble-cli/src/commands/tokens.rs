//! Refresh token maintenance.

use clap::{Args, Subcommand};

use booble_core::config::AppConfig;
use booble_core::error::AppError;

use crate::output;

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokensArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokensCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokensCommand {
    /// Delete expired and revoked refresh tokens
    Purge,
}

/// Execute token commands
pub async fn execute(args: &TokensArgs, config: &AppConfig) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let users = super::user_service(config, &pool);

    match &args.command {
        TokensCommand::Purge => {
            let purged = users.purge_refresh_tokens().await?;
            output::print_success(&format!("Purged {purged} refresh token(s)"));
        }
    }

    Ok(())
}
