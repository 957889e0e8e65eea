//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use booble_core::AppError;

/// Quota assigned when no configuration overrides it (5 GB).
pub const DEFAULT_STORAGE_QUOTA: i64 = 5_000_000_000;

/// Longest accepted first or last name.
pub const MAX_NAME_LENGTH: usize = 100;

/// A registered BoobleDrive user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Normalized (lowercase) email address, unique.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Bytes occupied by the user's live files.
    pub total_storage_used: i64,
    /// Byte budget for live files.
    pub storage_quota: i64,
    /// Whether the account can sign in.
    pub is_active: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// `"First Last"`, as shown next to files the user owns.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Bytes still available under the quota.
    pub fn remaining_quota(&self) -> i64 {
        (self.storage_quota - self.total_storage_used).max(0)
    }

    /// Whether `size` more bytes fit under the quota.
    pub fn can_store(&self, size: i64) -> bool {
        self.total_storage_used.saturating_add(size) <= self.storage_quota
    }

    /// Fail with a validation error when `size` more bytes do not fit.
    pub fn ensure_capacity(&self, size: i64) -> Result<(), AppError> {
        if self.can_store(size) {
            Ok(())
        } else {
            Err(AppError::validation("Storage quota exceeded"))
        }
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Normalized email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Starting quota in bytes.
    pub storage_quota: i64,
}

impl CreateUser {
    /// Check name lengths before the row reaches the database.
    pub fn validate(&self) -> Result<(), AppError> {
        for (label, value) in [("First name", &self.first_name), ("Last name", &self.last_name)] {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("{label} is required")));
            }
            if value.chars().count() > MAX_NAME_LENGTH {
                return Err(AppError::validation(format!(
                    "{label} cannot exceed {MAX_NAME_LENGTH} characters"
                )));
            }
        }
        if self.storage_quota < 0 {
            return Err(AppError::validation("Storage quota cannot be negative"));
        }
        Ok(())
    }
}
