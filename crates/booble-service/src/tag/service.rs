//! Tag listing and autocomplete.

use std::sync::Arc;

use booble_core::error::AppError;
use booble_database::repositories::TagRepository;
use tracing::info;

/// Suggestions returned when the caller gives no limit.
pub const DEFAULT_SEARCH_LIMIT: i64 = 10;
/// Upper bound on suggestions per request.
pub const MAX_SEARCH_LIMIT: i64 = 50;

/// Tag names and their housekeeping.
#[derive(Debug, Clone)]
pub struct TagService {
    tag_repo: Arc<TagRepository>,
}

impl TagService {
    /// Creates a new tag service.
    pub fn new(tag_repo: Arc<TagRepository>) -> Self {
        Self { tag_repo }
    }

    /// Every tag name, sorted.
    pub async fn list_all(&self) -> Result<Vec<String>, AppError> {
        self.tag_repo.list_names().await
    }

    /// Tag names containing `query`, case-insensitively.
    pub async fn search(&self, query: &str, limit: Option<i64>) -> Result<Vec<String>, AppError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        self.tag_repo
            .search_names(&needle, clamp_limit(limit))
            .await
    }

    /// Deletes tags no longer attached to any file.
    pub async fn prune_unused(&self) -> Result<u64, AppError> {
        let pruned = self.tag_repo.delete_unused().await?;
        info!(pruned, "Pruned unused tags");
        Ok(pruned)
    }
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), 10);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(25)), 25);
        assert_eq!(clamp_limit(Some(500)), 50);
    }
}
