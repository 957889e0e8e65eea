//! Public link model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An unauthenticated capability URL for a single file.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PublicLink {
    /// Unique link identifier.
    pub id: Uuid,
    /// URL-safe random token.
    pub token: String,
    /// Linked file.
    pub file_id: Uuid,
    /// Argon2 hash of the optional access password.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Optional expiration.
    pub expires_at: Option<DateTime<Utc>>,
    /// When the link was created.
    pub created_at: DateTime<Utc>,
}

impl PublicLink {
    /// Check if the link is usable at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|exp| exp > now)
    }

    /// Check if the link is usable.
    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    /// Whether a password must accompany the token.
    pub fn requires_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Relative URL that resolves the link.
    pub fn url(&self) -> String {
        format!("/p/{}", self.token)
    }
}

/// Data for creating a public link.
#[derive(Debug, Clone)]
pub struct CreatePublicLink {
    /// Generated token.
    pub token: String,
    /// Linked file.
    pub file_id: Uuid,
    /// Pre-hashed password.
    pub password_hash: Option<String>,
    /// Optional expiration.
    pub expires_at: Option<DateTime<Utc>>,
}
