//! User management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use booble_core::config::AppConfig;
use booble_core::error::AppError;
use booble_core::types::pagination::PageRequest;
use booble_service::user::{RegisterRequest, UserDto};

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List users, newest first
    List {
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Users per page
        #[arg(long, default_value_t = 50)]
        per_page: u64,
    },
    /// Create a user
    Create {
        /// Email address
        email: String,
        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
        /// First name
        #[arg(long)]
        first_name: String,
        /// Last name
        #[arg(long)]
        last_name: String,
    },
    /// Reactivate a user
    Activate {
        /// Email address
        email: String,
    },
    /// Deactivate a user and revoke their refresh tokens
    Deactivate {
        /// Email address
        email: String,
    },
    /// Change a user's storage quota
    Quota {
        /// Email address
        email: String,
        /// New quota in bytes
        #[arg(long)]
        bytes: i64,
    },
    /// Recompute a user's storage usage from their files
    RecalculateStorage {
        /// Email address
        email: String,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: String,
    email: String,
    name: String,
    used: String,
    quota: String,
    active: bool,
    created_at: String,
}

impl From<UserDto> for UserRow {
    fn from(u: UserDto) -> Self {
        Self {
            id: u.id.to_string(),
            email: u.email,
            name: format!("{} {}", u.first_name, u.last_name),
            used: format_bytes(u.total_storage_used),
            quota: format_bytes(u.storage_quota),
            active: u.is_active,
            created_at: u.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Render a byte count with a binary unit suffix.
fn format_bytes(bytes: i64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes.max(0) as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let users = super::user_service(config, &pool);

    match &args.command {
        UserCommand::List { page, per_page } => {
            let result = users.list_users(PageRequest::new(*page, *per_page)).await?;
            if format == OutputFormat::Table {
                output::print_kv(
                    "Users",
                    &format!(
                        "{} (page {} of {})",
                        result.total_items,
                        result.page,
                        result.total_pages.max(1)
                    ),
                );
            }
            let rows: Vec<UserRow> = result.items.into_iter().map(UserRow::from).collect();
            output::print_list(&rows, format);
        }
        UserCommand::Create {
            email,
            password,
            first_name,
            last_name,
        } => {
            let password = match password {
                Some(pw) => pw.clone(),
                None => dialoguer::Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords do not match")
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?,
            };

            let user = users
                .create_user(RegisterRequest {
                    email: email.clone(),
                    password,
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                })
                .await?;

            output::print_item(&UserRow::from(user), format);
            output::print_success(&format!("User '{email}' created"));
        }
        UserCommand::Activate { email } => {
            let user = users.get_user_by_email(email).await?;
            users.set_active(user.id, true).await?;
            output::print_success(&format!("User '{email}' activated"));
        }
        UserCommand::Deactivate { email } => {
            let user = users.get_user_by_email(email).await?;
            users.set_active(user.id, false).await?;
            output::print_success(&format!("User '{email}' deactivated"));
        }
        UserCommand::Quota { email, bytes } => {
            let user = users.get_user_by_email(email).await?;
            users.set_quota(user.id, *bytes).await?;
            if user.total_storage_used > *bytes {
                output::print_warning(&format!(
                    "'{email}' already uses {}; new uploads will be refused",
                    format_bytes(user.total_storage_used)
                ));
            }
            output::print_success(&format!(
                "Quota for '{email}' set to {}",
                format_bytes(*bytes)
            ));
        }
        UserCommand::RecalculateStorage { email } => {
            let user = users.get_user_by_email(email).await?;
            let used = users.recalculate_storage(user.id).await?;
            output::print_kv("Before", &format_bytes(user.total_storage_used));
            output::print_kv("After", &format_bytes(used));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.0 GiB");
    }
}
