//! Public link repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use booble_core::error::{AppError, ErrorKind};
use booble_core::result::AppResult;
use booble_entity::share::{CreatePublicLink, PublicLink};

/// Repository for public links.
#[derive(Debug, Clone)]
pub struct PublicLinkRepository {
    pool: PgPool,
}

impl PublicLinkRepository {
    /// Create a new public link repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new link.
    pub async fn create(&self, data: &CreatePublicLink) -> AppResult<PublicLink> {
        sqlx::query_as::<_, PublicLink>(
            "INSERT INTO public_links (id, token, file_id, password_hash, expires_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&data.token)
        .bind(data.file_id)
        .bind(&data.password_hash)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("public_links_token_key") =>
            {
                AppError::conflict("Link token collision, retry")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create public link", e),
        })
    }

    /// Look a link up by token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<PublicLink>> {
        sqlx::query_as::<_, PublicLink>("SELECT * FROM public_links WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find public link", e)
            })
    }

    /// Links of a file, newest first.
    pub async fn find_by_file(&self, file_id: Uuid) -> AppResult<Vec<PublicLink>> {
        sqlx::query_as::<_, PublicLink>(
            "SELECT * FROM public_links WHERE file_id = $1 ORDER BY created_at DESC",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list public links", e))
    }

    /// Remove every link of a file. Returns the number removed.
    pub async fn delete_by_file(&self, file_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM public_links WHERE file_id = $1")
            .bind(file_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete public links", e)
            })?;
        Ok(result.rows_affected())
    }
}
