//! In-memory chunked upload session.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Server-side state for one chunked upload.
///
/// Chunk numbers are kept ordered so assembly can walk them directly.
#[derive(Debug, Clone, Serialize)]
pub struct UploadSession {
    /// Opaque identifier (32 lowercase hex characters).
    pub upload_id: String,
    /// Final file name.
    pub file_name: String,
    /// Declared content type.
    pub content_type: String,
    /// Declared total size in bytes.
    pub file_size: i64,
    /// Uploading user.
    pub user_id: Uuid,
    /// Directory holding `{n}.chunk` files.
    #[serde(skip)]
    pub temp_dir: PathBuf,
    /// When the session was created.
    pub started_at: DateTime<Utc>,
    /// When the last chunk arrived.
    pub last_activity_at: DateTime<Utc>,
    /// Received chunk number -> chunk length.
    pub chunks: BTreeMap<u32, u64>,
}

impl UploadSession {
    /// Start a new session for `user_id`, rooted under `base_dir`.
    pub fn new(
        user_id: Uuid,
        file_name: String,
        content_type: String,
        file_size: i64,
        base_dir: &std::path::Path,
    ) -> Self {
        let upload_id = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        Self {
            temp_dir: base_dir.join(&upload_id),
            upload_id,
            file_name,
            content_type,
            file_size,
            user_id,
            started_at: now,
            last_activity_at: now,
            chunks: BTreeMap::new(),
        }
    }

    /// Path of chunk `n` inside the session directory.
    pub fn chunk_path(&self, chunk_number: u32) -> PathBuf {
        self.temp_dir.join(format!("{chunk_number}.chunk"))
    }

    /// Total bytes received so far. A re-sent chunk replaces its predecessor.
    pub fn received_bytes(&self) -> u64 {
        self.chunks.values().sum()
    }

    /// Bytes received if chunk `n` were (re)written with `len` bytes.
    pub fn received_with(&self, chunk_number: u32, len: u64) -> u64 {
        self.received_bytes() - self.chunks.get(&chunk_number).copied().unwrap_or(0) + len
    }

    /// Record a stored chunk.
    pub fn record_chunk(&mut self, chunk_number: u32, len: u64) {
        self.chunks.insert(chunk_number, len);
        self.last_activity_at = Utc::now();
    }

    /// Check if the session has been idle longer than `ttl`.
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.last_activity_at > ttl
    }

    /// Whether the session belongs to `user_id`.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}
