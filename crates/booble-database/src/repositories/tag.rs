//! Tag repository implementation.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use booble_core::error::{AppError, ErrorKind};
use booble_core::result::AppResult;
use booble_entity::tag::Tag;

/// Repository for tags and file-tag assignments.
#[derive(Debug, Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    /// Create a new tag repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every tag name, alphabetically.
    pub async fn list_names(&self) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT name FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tags", e))
    }

    /// Tag names containing `needle`, alphabetically.
    pub async fn search_names(&self, needle: &str, limit: i64) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT name FROM tags WHERE STRPOS(name, LOWER($1)) > 0 ORDER BY name LIMIT $2",
        )
        .bind(needle)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to search tags", e))
    }

    /// Tag names per file for a batch of files.
    pub async fn names_for_files(&self, file_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<String>>> {
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT ft.file_id, t.name FROM file_tags ft JOIN tags t ON t.id = ft.tag_id \
             WHERE ft.file_id = ANY($1) ORDER BY t.name",
        )
        .bind(file_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load file tags", e))?;

        let mut map: HashMap<Uuid, Vec<String>> = HashMap::new();
        for (file_id, name) in rows {
            map.entry(file_id).or_default().push(name);
        }
        Ok(map)
    }

    /// Replace a file's tag set with `names`, creating unknown tags.
    ///
    /// `names` must already be normalized.
    pub async fn replace_for_file(&self, file_id: Uuid, names: &[String]) -> AppResult<Vec<Tag>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let ids: Vec<Uuid> = names.iter().map(|_| Uuid::now_v7()).collect();
        sqlx::query(
            "INSERT INTO tags (id, name) SELECT * FROM UNNEST($1::UUID[], $2::TEXT[]) \
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(&ids)
        .bind(names)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create tags", e))?;

        let tags = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE name = ANY($1) ORDER BY name")
            .bind(names)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load tags", e))?;

        sqlx::query("DELETE FROM file_tags WHERE file_id = $1")
            .bind(file_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear file tags", e)
            })?;

        let tag_ids: Vec<Uuid> = tags.iter().map(|t| t.id).collect();
        sqlx::query(
            "INSERT INTO file_tags (file_id, tag_id) SELECT $1, UNNEST($2::UUID[])",
        )
        .bind(file_id)
        .bind(&tag_ids)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to assign tags", e))?;

        sqlx::query("UPDATE files SET updated_at = NOW() WHERE id = $1")
            .bind(file_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to touch file", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit tag update", e)
        })?;
        Ok(tags)
    }

    /// Delete tags no file uses anymore.
    pub async fn delete_unused(&self) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM tags t WHERE NOT EXISTS (SELECT 1 FROM file_tags ft WHERE ft.tag_id = t.id)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to prune tags", e))?;
        Ok(result.rows_affected())
    }
}
