//! Refresh token model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An opaque, single-use credential exchanged for a new access token.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    /// Unique token row identifier.
    pub id: Uuid,
    /// Owner of the token.
    pub user_id: Uuid,
    /// Random token value.
    #[serde(skip_serializing)]
    pub token: String,
    /// Expiration time.
    pub expires_at: DateTime<Utc>,
    /// Issue time.
    pub created_at: DateTime<Utc>,
    /// When the token was revoked, if ever.
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    /// Not revoked and not yet expired at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }

    /// Not revoked and not yet expired.
    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }
}

/// Data for persisting a newly issued refresh token.
#[derive(Debug, Clone)]
pub struct CreateRefreshToken {
    /// Owner of the token.
    pub user_id: Uuid,
    /// Random token value.
    pub token: String,
    /// Expiration time.
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_active_states() {
        let now = Utc::now();
        let mut token = RefreshToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token: "t".to_string(),
            expires_at: now + Duration::days(7),
            created_at: now,
            revoked_at: None,
        };
        assert!(token.is_active_at(now));
        assert!(!token.is_active_at(now + Duration::days(8)));

        token.revoked_at = Some(now);
        assert!(!token.is_active_at(now));
    }
}
