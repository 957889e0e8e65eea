//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod auth;
pub mod database;
pub mod logging;
pub mod server;
pub mod storage;
pub mod thumbnail;

use serde::{Deserialize, Serialize};

pub use self::auth::AuthConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::{LogFormat, LoggingConfig};
pub use self::server::{CorsConfig, ServerConfig};
pub use self::storage::{StorageConfig, UploadConfig};
pub use self::thumbnail::ThumbnailConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Deserialization target for the merged configuration sources
/// (default.toml + environment overlay + `BOOBLE__*` variables).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Quota and file size settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Chunked upload settings.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Thumbnail generation settings.
    #[serde(default)]
    pub thumbnail: ThumbnailConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    ///
    /// Merges `config/default`, an environment-specific overlay
    /// `config/{env}` and environment variables prefixed with `BOOBLE__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Load configuration from an explicit directory.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("BOOBLE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject configurations that cannot work at runtime.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.len() < 32 {
            return Err(AppError::configuration(
                "auth.jwt_secret must be at least 32 characters",
            ));
        }
        if self.upload.max_chunk_size_bytes == 0 {
            return Err(AppError::configuration(
                "upload.max_chunk_size_bytes must be positive",
            ));
        }
        if self.thumbnail.size == 0 {
            return Err(AppError::configuration("thumbnail.size must be positive"));
        }
        Ok(())
    }
}
