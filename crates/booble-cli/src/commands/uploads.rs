//! Chunked upload maintenance.

use std::path::Path;
use std::time::Duration;

use clap::{Args, Subcommand};

use booble_core::config::AppConfig;
use booble_core::error::AppError;
use booble_service::file::upload::clean_stale_dirs;

use crate::output;

/// Arguments for upload commands
#[derive(Debug, Args)]
pub struct UploadsArgs {
    /// Upload subcommand
    #[command(subcommand)]
    pub command: UploadsCommand,
}

/// Upload subcommands
#[derive(Debug, Subcommand)]
pub enum UploadsCommand {
    /// Remove chunk directories left behind by abandoned uploads
    Clean {
        /// Only remove directories untouched for this many minutes
        /// (defaults to the configured session TTL)
        #[arg(long)]
        older_than_minutes: Option<u64>,
    },
}

/// Execute upload commands
pub async fn execute(args: &UploadsArgs, config: &AppConfig) -> Result<(), AppError> {
    match &args.command {
        UploadsCommand::Clean { older_than_minutes } => {
            let minutes = older_than_minutes
                .unwrap_or_else(|| config.upload.session_ttl_minutes.max(0) as u64);
            let max_age = stale_after(minutes)?;
            let base = Path::new(&config.upload.temp_dir);
            if !base.exists() {
                output::print_warning(&format!(
                    "Upload directory '{}' does not exist",
                    base.display()
                ));
                return Ok(());
            }

            let removed = clean_stale_dirs(base, max_age).await?;
            for dir in &removed {
                println!("  removed {}", dir.display());
            }
            output::print_success(&format!(
                "Removed {} stale upload director{}",
                removed.len(),
                if removed.len() == 1 { "y" } else { "ies" }
            ));
        }
    }

    Ok(())
}

/// Idle time after which an upload directory counts as abandoned.
fn stale_after(minutes: u64) -> Result<Duration, AppError> {
    minutes
        .checked_mul(60)
        .map(Duration::from_secs)
        .ok_or_else(|| {
            AppError::validation(format!("--older-than-minutes {minutes} is out of range"))
        })
}
