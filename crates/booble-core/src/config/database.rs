//! PostgreSQL settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// `[database]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://` URL; credentials are redacted before logging.
    pub url: String,
    /// Pool ceiling.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Connections kept open while idle. Clamped to `max_connections`.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// How long a request waits for a pooled connection.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connections above `min_connections` close after this long.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Server-side `statement_timeout`; unset leaves the server default.
    #[serde(default)]
    pub statement_timeout_seconds: Option<u64>,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_seconds)
    }

    /// Idle floor that never exceeds the ceiling.
    pub fn effective_min_connections(&self) -> u32 {
        self.min_connections.min(self.max_connections)
    }
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}
