//! File version model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use booble_core::AppError;

/// Metadata of one stored revision of a file. The bytes are loaded separately.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileVersion {
    /// Unique version identifier.
    pub id: Uuid,
    /// The file this version belongs to.
    pub file_id: Uuid,
    /// 1-based, strictly increasing per file.
    pub version_number: i32,
    /// Size in bytes.
    pub size: i64,
    /// Lowercase hex SHA-256 of the content.
    pub hash: String,
    /// When the version was stored.
    pub created_at: DateTime<Utc>,
}

/// Data for appending a version to an existing file.
#[derive(Debug, Clone)]
pub struct CreateFileVersion {
    /// Target file.
    pub file_id: Uuid,
    /// Number this version will carry.
    pub version_number: i32,
    /// File bytes.
    pub content: Vec<u8>,
    /// Lowercase hex SHA-256 of `content`.
    pub hash: String,
}

impl CreateFileVersion {
    /// Size in bytes of the content.
    pub fn size(&self) -> i64 {
        self.content.len() as i64
    }

    /// Enforce non-empty content and a positive version number.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.content.is_empty() {
            return Err(AppError::validation("Version content cannot be empty"));
        }
        if self.version_number <= 0 {
            return Err(AppError::validation("Version number must be positive"));
        }
        Ok(())
    }
}
