//! Per-user file share model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use booble_core::AppError;

use super::permission::FilePermission;

/// A grant of a permission on a file to another user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileShare {
    /// Unique share identifier.
    pub id: Uuid,
    /// Shared file.
    pub file_id: Uuid,
    /// Recipient user.
    pub user_id: Uuid,
    /// Granted permission.
    pub permission: FilePermission,
    /// When the share was created or last updated.
    pub created_at: DateTime<Utc>,
    /// Optional expiration.
    pub expires_at: Option<DateTime<Utc>>,
}

impl FileShare {
    /// Check if the share has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp < now)
    }
}

/// Data for creating or replacing a share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShare {
    /// Shared file.
    pub file_id: Uuid,
    /// Recipient user.
    pub user_id: Uuid,
    /// Granted permission.
    pub permission: FilePermission,
    /// Optional expiration.
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateShare {
    /// Validate the grant against the file's owner.
    pub fn validate(&self, owner_id: Uuid) -> Result<(), AppError> {
        if self.user_id == owner_id {
            return Err(AppError::validation("Cannot share file with its owner"));
        }
        if !self.permission.is_grantable() {
            return Err(AppError::validation(
                "Owner permission cannot be granted through a share",
            ));
        }
        if self.expires_at.is_some_and(|exp| exp <= Utc::now()) {
            return Err(AppError::validation("Share expiration must be in the future"));
        }
        Ok(())
    }
}
