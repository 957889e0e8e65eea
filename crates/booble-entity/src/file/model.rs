//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use booble_core::AppError;

use super::visibility::FileVisibility;

/// Longest accepted file name.
pub const MAX_NAME_LENGTH: usize = 255;
/// Longest accepted description.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// A file stored in BoobleDrive. Content lives in `file_versions`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DriveFile {
    /// Unique file identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Normalized MIME type.
    pub content_type: String,
    /// Size of the current version in bytes.
    pub size: i64,
    /// Lowercase hex SHA-256 of the current version.
    pub hash: String,
    /// Owning user.
    pub owner_id: Uuid,
    /// Visibility to users without a share.
    pub visibility: FileVisibility,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file metadata or content last changed.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl DriveFile {
    /// Check if the file is soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Check if the given user owns this file.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// Fail when a mutation targets a deleted file.
    pub fn ensure_not_deleted(&self) -> Result<(), AppError> {
        if self.is_deleted() {
            Err(AppError::validation("Cannot modify a deleted file"))
        } else {
            Ok(())
        }
    }
}

/// Data required to create a new file together with its first version.
#[derive(Debug, Clone)]
pub struct CreateFile {
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Normalized MIME type.
    pub content_type: String,
    /// Lowercase hex SHA-256 of `content`.
    pub hash: String,
    /// Owning user.
    pub owner_id: Uuid,
    /// File bytes for version 1.
    pub content: Vec<u8>,
}

impl CreateFile {
    /// Size in bytes of the initial content.
    pub fn size(&self) -> i64 {
        self.content.len() as i64
    }

    /// Enforce the invariants of a new file.
    pub fn validate(&self) -> Result<(), AppError> {
        validate_name(&self.name)?;
        validate_description(self.description.as_deref())?;
        if self.content.is_empty() {
            return Err(AppError::validation("File size must be positive"));
        }
        if self.hash.trim().is_empty() {
            return Err(AppError::validation("File hash cannot be empty"));
        }
        if self.owner_id.is_nil() {
            return Err(AppError::validation("Owner ID cannot be empty"));
        }
        Ok(())
    }
}

/// Metadata changes; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFileMetadata {
    /// New display name.
    pub name: Option<String>,
    /// New description. An empty string clears it.
    pub description: Option<String>,
}

impl UpdateFileMetadata {
    /// Validate the provided fields.
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        validate_description(self.description.as_deref())
    }
}

/// Reject blank or oversized file names.
pub fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::validation("File name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "File name cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(AppError::validation(
            "File name cannot contain path separators",
        ));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<(), AppError> {
    match description {
        Some(d) if d.chars().count() > MAX_DESCRIPTION_LENGTH => Err(AppError::validation(
            format!("Description cannot exceed {MAX_DESCRIPTION_LENGTH} characters"),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create() -> CreateFile {
        CreateFile {
            name: "report.pdf".to_string(),
            description: None,
            content_type: "application/pdf".to_string(),
            hash: "abc123".to_string(),
            owner_id: Uuid::new_v4(),
            content: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_create_file_valid() {
        let c = create();
        assert!(c.validate().is_ok());
        assert_eq!(c.size(), 3);
    }

    #[test]
    fn test_create_file_invariants() {
        let mut c = create();
        c.content.clear();
        assert!(c.validate().is_err());

        let mut c = create();
        c.name = "  ".to_string();
        assert!(c.validate().is_err());

        let mut c = create();
        c.hash = String::new();
        assert!(c.validate().is_err());

        let mut c = create();
        c.owner_id = Uuid::nil();
        assert!(c.validate().is_err());

        let mut c = create();
        c.name = "../etc/passwd".to_string();
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_update_rejects_long_description() {
        let update = UpdateFileMetadata {
            name: None,
            description: Some("x".repeat(MAX_DESCRIPTION_LENGTH + 1)),
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_deleted_file_is_immutable() {
        let file = DriveFile {
            id: Uuid::new_v4(),
            name: "a.txt".to_string(),
            description: None,
            content_type: "text/plain".to_string(),
            size: 1,
            hash: "h".to_string(),
            owner_id: Uuid::new_v4(),
            visibility: FileVisibility::Private,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: Some(Utc::now()),
        };
        assert!(file.is_deleted());
        assert!(file.ensure_not_deleted().is_err());
    }
}
