//! File repository implementation.
//!
//! File rows, their version blobs, favorites, and the owner's storage
//! counter are kept consistent by running multi-step changes inside a
//! single transaction.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use booble_core::error::{AppError, ErrorKind};
use booble_core::result::AppResult;
use booble_core::types::pagination::{PageRequest, PageResponse};
use booble_entity::file::{
    CreateFile, CreateFileVersion, DriveFile, FileTypeFilter, FileVersion, FileVisibility,
    UpdateFileMetadata,
};

/// Shared `FROM`/`WHERE` clause for file searches.
///
/// `$1` caller, `$2` scope, `$3` ILIKE pattern or NULL, `$4` required tag names.
const SEARCH_FILTER: &str = "\
    FROM files f \
    WHERE f.deleted_at IS NULL \
      AND ( \
        ($2 IN ('own', 'all') AND f.owner_id = $1) \
        OR ($2 IN ('shared', 'all') AND EXISTS ( \
            SELECT 1 FROM file_shares s \
            WHERE s.file_id = f.id AND s.user_id = $1 \
              AND (s.expires_at IS NULL OR s.expires_at > NOW()))) \
        OR ($2 = 'favorites' \
            AND EXISTS (SELECT 1 FROM file_favorites fav \
                        WHERE fav.file_id = f.id AND fav.user_id = $1) \
            AND (f.owner_id = $1 OR f.visibility = 'public' OR EXISTS ( \
                SELECT 1 FROM file_shares s \
                WHERE s.file_id = f.id AND s.user_id = $1 \
                  AND (s.expires_at IS NULL OR s.expires_at > NOW())))) \
      ) \
      AND ($3::TEXT IS NULL OR f.name ILIKE $3 OR f.description ILIKE $3) \
      AND (CARDINALITY($4::TEXT[]) = 0 OR ( \
            SELECT COUNT(DISTINCT t.name) FROM file_tags ft \
            JOIN tags t ON t.id = ft.tag_id \
            WHERE ft.file_id = f.id AND t.name = ANY($4)) = CARDINALITY($4::TEXT[]))";

/// Criteria for listing the files visible to a user.
#[derive(Debug, Clone)]
pub struct FileQuery<'a> {
    /// The user performing the search.
    pub user_id: Uuid,
    /// Which files to consider.
    pub scope: FileTypeFilter,
    /// Case-insensitive substring of name or description.
    pub term: Option<&'a str>,
    /// Normalized tag names; a file must carry all of them.
    pub tags: &'a [String],
}

/// Repository for file, version, and favorite persistence.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a file by ID, including soft-deleted ones.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<DriveFile>> {
        sqlx::query_as::<_, DriveFile>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    /// Search files visible to a user, newest change first.
    pub async fn search(
        &self,
        query: &FileQuery<'_>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<DriveFile>> {
        let pattern = query
            .term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(like_pattern);

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {SEARCH_FILTER}"))
            .bind(query.user_id)
            .bind(query.scope.as_str())
            .bind(pattern.as_deref())
            .bind(query.tags)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count files", e))?;

        let files = sqlx::query_as::<_, DriveFile>(&format!(
            "SELECT f.* {SEARCH_FILTER} ORDER BY f.updated_at DESC, f.id LIMIT $5 OFFSET $6"
        ))
        .bind(query.user_id)
        .bind(query.scope.as_str())
        .bind(pattern.as_deref())
        .bind(query.tags)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to search files", e))?;

        Ok(PageResponse::new(
            files,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Insert a file with its first version and charge the owner's quota.
    pub async fn create(&self, data: &CreateFile) -> AppResult<DriveFile> {
        data.validate()?;
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        adjust_storage(&mut tx, data.owner_id, data.size()).await?;

        let file = sqlx::query_as::<_, DriveFile>(
            "INSERT INTO files (id, name, description, content_type, size, hash, owner_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.name.trim())
        .bind(&data.description)
        .bind(&data.content_type)
        .bind(data.size())
        .bind(&data.hash)
        .bind(data.owner_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create file", e))?;

        let version = CreateFileVersion {
            file_id: file.id,
            version_number: 1,
            content: data.content.clone(),
            hash: data.hash.clone(),
        };
        insert_version(&mut tx, &version).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit file creation", e)
        })?;

        Ok(file)
    }

    /// Append a new version, making it the file's current content.
    ///
    /// The owner's usage is adjusted by the size difference.
    pub async fn append_version(
        &self,
        file_id: Uuid,
        content: Vec<u8>,
        hash: String,
    ) -> AppResult<DriveFile> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let current = sqlx::query_as::<_, DriveFile>(
            "SELECT * FROM files WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(file_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock file", e))?
        .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;

        let next: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(version_number), 0) + 1 FROM file_versions WHERE file_id = $1",
        )
        .bind(file_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to compute version number", e)
        })?;

        let version = CreateFileVersion {
            file_id,
            version_number: next,
            content,
            hash,
        };
        version.validate()?;

        adjust_storage(&mut tx, current.owner_id, version.size() - current.size).await?;
        insert_version(&mut tx, &version).await?;

        let updated = sqlx::query_as::<_, DriveFile>(
            "UPDATE files SET size = $2, hash = $3, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(file_id)
        .bind(version.size())
        .bind(&version.hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update file", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit new version", e)
        })?;

        Ok(updated)
    }

    /// Content of the highest-numbered version.
    pub async fn find_latest_content(&self, file_id: Uuid) -> AppResult<Option<Vec<u8>>> {
        sqlx::query_scalar::<_, Vec<u8>>(
            "SELECT content FROM file_versions WHERE file_id = $1 \
             ORDER BY version_number DESC LIMIT 1",
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load file content", e))
    }

    /// Content of a specific version.
    pub async fn find_version_content(
        &self,
        file_id: Uuid,
        version_number: i32,
    ) -> AppResult<Option<Vec<u8>>> {
        sqlx::query_scalar::<_, Vec<u8>>(
            "SELECT content FROM file_versions WHERE file_id = $1 AND version_number = $2",
        )
        .bind(file_id)
        .bind(version_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load version content", e)
        })
    }

    /// Version metadata, newest first.
    pub async fn list_versions(&self, file_id: Uuid) -> AppResult<Vec<FileVersion>> {
        sqlx::query_as::<_, FileVersion>(
            "SELECT id, file_id, version_number, size, hash, created_at \
             FROM file_versions WHERE file_id = $1 ORDER BY version_number DESC",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list versions", e))
    }

    /// Number of versions per file.
    pub async fn version_counts(&self, file_ids: &[Uuid]) -> AppResult<HashMap<Uuid, i64>> {
        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            "SELECT file_id, COUNT(*) FROM file_versions \
             WHERE file_id = ANY($1) GROUP BY file_id",
        )
        .bind(file_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count versions", e))?;
        Ok(rows.into_iter().collect())
    }

    /// Update name and/or description of a live file.
    pub async fn update_metadata(
        &self,
        id: Uuid,
        data: &UpdateFileMetadata,
    ) -> AppResult<DriveFile> {
        sqlx::query_as::<_, DriveFile>(
            "UPDATE files SET name = COALESCE($2, name), \
                              description = CASE WHEN $3::TEXT IS NULL THEN description \
                                                 WHEN $3 = '' THEN NULL ELSE $3 END, \
                              updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .bind(data.name.as_deref().map(str::trim))
        .bind(data.description.as_deref().map(str::trim))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update file", e))?
        .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    /// Change a file's visibility.
    pub async fn set_visibility(&self, id: Uuid, visibility: FileVisibility) -> AppResult<DriveFile> {
        sqlx::query_as::<_, DriveFile>(
            "UPDATE files SET visibility = $2, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .bind(visibility)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update visibility", e))?
        .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    /// Soft-delete a file and release its bytes from the owner's usage.
    pub async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let (owner_id, size) = sqlx::query_as::<_, (Uuid, i64)>(
            "UPDATE files SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING owner_id, size",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))?
        .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;

        adjust_storage(&mut tx, owner_id, -size).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit file deletion", e)
        })
    }

    /// Undo a soft delete, charging the owner's quota again.
    pub async fn restore(&self, id: Uuid) -> AppResult<DriveFile> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let file = sqlx::query_as::<_, DriveFile>(
            "UPDATE files SET deleted_at = NULL, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NOT NULL RETURNING *",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to restore file", e))?
        .ok_or_else(|| AppError::not_found(format!("Deleted file {id} not found")))?;

        adjust_storage(&mut tx, file.owner_id, file.size).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit file restore", e)
        })?;
        Ok(file)
    }

    /// Hand a file to another user: usage moves with it and every share is dropped.
    pub async fn transfer_ownership(&self, id: Uuid, new_owner_id: Uuid) -> AppResult<DriveFile> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let current = sqlx::query_as::<_, DriveFile>(
            "SELECT * FROM files WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock file", e))?
        .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;

        adjust_storage(&mut tx, current.owner_id, -current.size).await?;
        adjust_storage(&mut tx, new_owner_id, current.size).await?;

        sqlx::query("DELETE FROM file_shares WHERE file_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clear shares", e))?;

        let updated = sqlx::query_as::<_, DriveFile>(
            "UPDATE files SET owner_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(new_owner_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to transfer file", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit ownership transfer", e)
        })?;
        Ok(updated)
    }

    /// Mark a file as favorite. Repeated calls are no-ops.
    pub async fn add_favorite(&self, file_id: Uuid, user_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO file_favorites (file_id, user_id) VALUES ($1, $2) \
             ON CONFLICT (file_id, user_id) DO NOTHING",
        )
        .bind(file_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add favorite", e))?;
        Ok(())
    }

    /// Remove a favorite mark.
    pub async fn remove_favorite(&self, file_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM file_favorites WHERE file_id = $1 AND user_id = $2")
            .bind(file_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to remove favorite", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Which of `file_ids` the user has marked as favorite.
    pub async fn favorite_ids(&self, user_id: Uuid, file_ids: &[Uuid]) -> AppResult<HashSet<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT file_id FROM file_favorites WHERE user_id = $1 AND file_id = ANY($2)",
        )
        .bind(user_id)
        .bind(file_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load favorites", e))?;
        Ok(ids.into_iter().collect())
    }

    /// Permanently remove files soft-deleted before `cutoff`.
    pub async fn purge_deleted_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM files WHERE deleted_at IS NOT NULL AND deleted_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to purge deleted files", e)
            })?;
        Ok(result.rows_affected())
    }
}

async fn insert_version(conn: &mut PgConnection, version: &CreateFileVersion) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO file_versions (id, file_id, version_number, content, size, hash) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(Uuid::now_v7())
    .bind(version.file_id)
    .bind(version.version_number)
    .bind(&version.content)
    .bind(version.size())
    .bind(&version.hash)
    .execute(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err)
            if db_err.constraint() == Some("file_versions_file_id_version_number_key") =>
        {
            AppError::conflict("File was modified concurrently, retry the upload")
        }
        _ => AppError::with_source(ErrorKind::Database, "Failed to store file version", e),
    })?;
    Ok(())
}

/// Add `delta` bytes to a user's usage. Growth beyond the quota is refused.
async fn adjust_storage(conn: &mut PgConnection, user_id: Uuid, delta: i64) -> AppResult<()> {
    if delta == 0 {
        return Ok(());
    }
    let result = sqlx::query(
        "UPDATE users SET total_storage_used = GREATEST(total_storage_used + $2, 0), \
                          updated_at = NOW() \
         WHERE id = $1 AND ($2 < 0 OR total_storage_used + $2 <= storage_quota)",
    )
    .bind(user_id)
    .bind(delta)
    .execute(conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update storage usage", e))?;

    if result.rows_affected() == 0 {
        return Err(AppError::validation("Storage quota exceeded"));
    }
    Ok(())
}

/// Build an ILIKE pattern matching `term` anywhere, with wildcards escaped.
fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}
