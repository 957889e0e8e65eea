//! File share repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use booble_core::error::{AppError, ErrorKind};
use booble_core::result::AppResult;
use booble_entity::share::{CreateShare, FileShare};

/// Repository for per-user file shares.
#[derive(Debug, Clone)]
pub struct ShareRepository {
    pool: PgPool,
}

impl ShareRepository {
    /// Create a new share repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The share a specific user holds on a file, if any.
    pub async fn find(&self, file_id: Uuid, user_id: Uuid) -> AppResult<Option<FileShare>> {
        sqlx::query_as::<_, FileShare>(
            "SELECT * FROM file_shares WHERE file_id = $1 AND user_id = $2",
        )
        .bind(file_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find share", e))
    }

    /// Create a share, or replace the permission and expiry of an existing one.
    pub async fn upsert(&self, data: &CreateShare) -> AppResult<FileShare> {
        sqlx::query_as::<_, FileShare>(
            "INSERT INTO file_shares (id, file_id, user_id, permission, expires_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (file_id, user_id) DO UPDATE \
               SET permission = EXCLUDED.permission, \
                   expires_at = EXCLUDED.expires_at, \
                   created_at = NOW() \
             RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.file_id)
        .bind(data.user_id)
        .bind(data.permission)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save share", e))
    }

    /// Remove a user's share. Returns whether a row was deleted.
    pub async fn delete(&self, file_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM file_shares WHERE file_id = $1 AND user_id = $2")
            .bind(file_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete share", e))?;
        Ok(result.rows_affected() > 0)
    }
}
