//! In-process revocation of outstanding access tokens.
//!
//! Logout and deactivation record a per-user cutoff; access tokens issued
//! before it are rejected. Entries outlive every token they can affect
//! because they are kept for one access-token lifetime.

use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use tracing::debug;
use uuid::Uuid;

/// Per-user "tokens issued before this instant are invalid" markers.
#[derive(Clone)]
pub struct RevocationList {
    cutoffs: Cache<Uuid, i64>,
}

impl std::fmt::Debug for RevocationList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevocationList")
            .field("entries", &self.cutoffs.entry_count())
            .finish()
    }
}

impl RevocationList {
    /// Creates a list whose entries live for `token_ttl`.
    pub fn new(token_ttl: chrono::Duration) -> Self {
        let ttl = token_ttl.to_std().unwrap_or(Duration::from_secs(3600));
        Self {
            cutoffs: Cache::builder()
                .max_capacity(100_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Invalidate every token of `user_id` issued before `at`.
    pub async fn revoke_user(&self, user_id: Uuid, at: DateTime<Utc>) {
        self.cutoffs.insert(user_id, at.timestamp()).await;
        debug!(user_id = %user_id, cutoff = %at, "Access tokens revoked");
    }

    /// Whether a token issued at `issued_at` (seconds) was revoked.
    pub async fn is_revoked(&self, user_id: Uuid, issued_at: i64) -> bool {
        self.cutoffs
            .get(&user_id)
            .await
            .is_some_and(|cutoff| issued_at < cutoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_revocation_cutoff() {
        let list = RevocationList::new(chrono::Duration::minutes(5));
        let user = Uuid::new_v4();
        let now = Utc::now();

        assert!(!list.is_revoked(user, now.timestamp() - 10).await);

        list.revoke_user(user, now).await;
        assert!(list.is_revoked(user, now.timestamp() - 10).await);
        assert!(!list.is_revoked(user, now.timestamp()).await);
        assert!(!list.is_revoked(Uuid::new_v4(), now.timestamp() - 10).await);
    }
}
