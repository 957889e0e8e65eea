//! File maintenance.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use clap::{Args, Subcommand};

use booble_core::config::AppConfig;
use booble_core::error::AppError;
use booble_database::repositories::{
    FileRepository, ShareRepository, TagRepository, UserRepository,
};
use booble_service::FileService;

use crate::output;

/// Arguments for file commands
#[derive(Debug, Args)]
pub struct FilesArgs {
    /// File subcommand
    #[command(subcommand)]
    pub command: FilesCommand,
}

/// File subcommands
#[derive(Debug, Subcommand)]
pub enum FilesCommand {
    /// Permanently remove files soft-deleted more than N days ago
    PurgeDeleted {
        /// Age in days of the deletion
        #[arg(long, default_value_t = 30)]
        older_than_days: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

/// Execute file commands
pub async fn execute(args: &FilesArgs, config: &AppConfig) -> Result<(), AppError> {
    match &args.command {
        FilesCommand::PurgeDeleted {
            older_than_days,
            force,
        } => {
            let cutoff = purge_cutoff(Utc::now(), *older_than_days)?;
            let prompt = format!(
                "Permanently delete files removed more than {older_than_days} day(s) ago?"
            );
            if !super::confirm(&prompt, *force)? {
                println!("Cancelled.");
                return Ok(());
            }

            let pool = super::create_db_pool(config).await?;
            let files = FileService::new(
                Arc::new(FileRepository::new(pool.clone())),
                Arc::new(ShareRepository::new(pool.clone())),
                Arc::new(TagRepository::new(pool.clone())),
                Arc::new(UserRepository::new(pool)),
                config.storage.clone(),
            );

            let purged = files.purge_deleted(cutoff).await?;
            output::print_success(&format!("Purged {purged} deleted file(s)"));
        }
    }

    Ok(())
}

/// Deletion timestamp before which files are purged.
fn purge_cutoff(now: DateTime<Utc>, older_than_days: i64) -> Result<DateTime<Utc>, AppError> {
    if older_than_days < 0 {
        return Err(AppError::validation("--older-than-days cannot be negative"));
    }
    Duration::try_days(older_than_days)
        .and_then(|age| now.checked_sub_signed(age))
        .ok_or_else(|| {
            AppError::validation(format!("--older-than-days {older_than_days} is out of range"))
        })
}
