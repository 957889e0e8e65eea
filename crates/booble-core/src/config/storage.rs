//! Quota and chunked upload configuration.

use serde::{Deserialize, Serialize};

/// Per-user storage limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Quota assigned to newly registered users, in bytes.
    #[serde(default = "default_quota")]
    pub default_quota_bytes: i64,
    /// Largest single file accepted, in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: i64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            default_quota_bytes: default_quota(),
            max_file_size_bytes: default_max_file_size(),
        }
    }
}

/// Chunked upload session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory where in-progress chunks are written.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: String,
    /// Largest accepted chunk, in bytes.
    #[serde(default = "default_max_chunk")]
    pub max_chunk_size_bytes: usize,
    /// Sessions idle longer than this are discarded.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_minutes: i64,
    /// How often the server sweeps expired sessions.
    #[serde(default = "default_purge_interval")]
    pub purge_interval_seconds: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            max_chunk_size_bytes: default_max_chunk(),
            session_ttl_minutes: default_session_ttl(),
            purge_interval_seconds: default_purge_interval(),
        }
    }
}

fn default_quota() -> i64 {
    5_000_000_000
}

fn default_max_file_size() -> i64 {
    // 2 GB
    2 * 1024 * 1024 * 1024
}

fn default_temp_dir() -> String {
    std::env::temp_dir()
        .join("BoobleDriveUploads")
        .to_string_lossy()
        .into_owned()
}

fn default_max_chunk() -> usize {
    // 10 MB
    10 * 1024 * 1024
}

fn default_session_ttl() -> i64 {
    120
}

fn default_purge_interval() -> u64 {
    300
}
