//! File views returned to API callers.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use booble_entity::file::{DriveFile, FileVersion, FileVisibility};

/// A file as seen by one caller.
#[derive(Debug, Clone, Serialize)]
pub struct FileDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub content_type: String,
    pub size: i64,
    pub hash: String,
    pub owner_id: Uuid,
    pub owner_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub visibility: FileVisibility,
    pub version_count: i64,
    pub tags: Vec<String>,
    pub is_favorite: bool,
}

impl FileDto {
    /// Combine a file row with the per-caller details.
    pub fn from_parts(
        file: DriveFile,
        owner_name: String,
        version_count: i64,
        tags: Vec<String>,
        is_favorite: bool,
    ) -> Self {
        Self {
            id: file.id,
            name: file.name,
            description: file.description,
            content_type: file.content_type,
            size: file.size,
            hash: file.hash,
            owner_id: file.owner_id,
            owner_name,
            created_at: file.created_at,
            updated_at: file.updated_at,
            visibility: file.visibility,
            // Every live file has at least its first version.
            version_count: version_count.max(1),
            tags,
            is_favorite,
        }
    }
}

/// Version metadata without content.
#[derive(Debug, Clone, Serialize)]
pub struct FileVersionDto {
    pub version_number: i32,
    pub size: i64,
    pub hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<FileVersion> for FileVersionDto {
    fn from(v: FileVersion) -> Self {
        Self {
            version_number: v.version_number,
            size: v.size,
            hash: v.hash,
            created_at: v.created_at,
        }
    }
}

/// File bytes ready to be streamed to the client.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    /// Name to put in `Content-Disposition`.
    pub name: String,
    /// MIME type to put in `Content-Type`.
    pub content_type: String,
    /// File content.
    pub data: Bytes,
}
