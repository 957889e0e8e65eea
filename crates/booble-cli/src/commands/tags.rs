//! Tag maintenance.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use booble_core::config::AppConfig;
use booble_core::error::AppError;
use booble_database::repositories::TagRepository;
use booble_service::TagService;

use crate::output::{self, OutputFormat};

/// Arguments for tag commands
#[derive(Debug, Args)]
pub struct TagsArgs {
    /// Tag subcommand
    #[command(subcommand)]
    pub command: TagsCommand,
}

/// Tag subcommands
#[derive(Debug, Subcommand)]
pub enum TagsCommand {
    /// List every tag name
    List,
    /// Delete tags that no file carries anymore
    Prune,
}

#[derive(Debug, Serialize, Tabled)]
struct TagRow {
    name: String,
}

/// Execute tag commands
pub async fn execute(
    args: &TagsArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let tags = TagService::new(Arc::new(TagRepository::new(pool)));

    match &args.command {
        TagsCommand::List => {
            let rows: Vec<TagRow> = tags
                .list_all()
                .await?
                .into_iter()
                .map(|name| TagRow { name })
                .collect();
            output::print_list(&rows, format);
        }
        TagsCommand::Prune => {
            let pruned = tags.prune_unused().await?;
            output::print_success(&format!("Pruned {pruned} unused tag(s)"));
        }
    }

    Ok(())
}
