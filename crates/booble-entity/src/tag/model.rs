//! Tag entity model and normalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use booble_core::AppError;

/// Longest accepted tag name.
pub const MAX_TAG_LENGTH: usize = 50;

/// A lowercase label attached to files.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    /// Unique tag identifier.
    pub id: Uuid,
    /// Normalized, unique name.
    pub name: String,
    /// When the tag was first used.
    pub created_at: DateTime<Utc>,
}

/// Trim, lowercase, and de-duplicate tag names, preserving first occurrence.
///
/// Blank entries are dropped; names longer than [`MAX_TAG_LENGTH`] are rejected.
pub fn normalize_tags<I, S>(raw: I) -> Result<Vec<String>, AppError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in raw {
        let name = tag.as_ref().trim().to_lowercase();
        if name.is_empty() {
            continue;
        }
        if name.chars().count() > MAX_TAG_LENGTH {
            return Err(AppError::validation(format!(
                "Tag name cannot exceed {MAX_TAG_LENGTH} characters"
            )));
        }
        if !out.contains(&name) {
            out.push(name);
        }
    }
    Ok(out)
}
