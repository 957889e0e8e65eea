//! File CRUD, versions, sharing, tags, and favorites with permission checks.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use booble_auth::acl::FileAccessChecker;
use booble_core::config::StorageConfig;
use booble_core::error::AppError;
use booble_core::types::pagination::{PageRequest, PageResponse};
use booble_database::repositories::{
    FileQuery, FileRepository, ShareRepository, TagRepository, UserRepository,
};
use booble_entity::file::{
    CreateFile, DriveFile, FileTypeFilter, FileVisibility, MimeType, UpdateFileMetadata,
};
use booble_entity::share::{CreateShare, FilePermission, FileShare};
use booble_entity::tag::normalize_tags;
use booble_entity::user::User;

use crate::context::RequestContext;

use super::dto::{DownloadedFile, FileDto, FileVersionDto};
use super::hashing::sha256_hex_blocking;

/// Handles file operations on behalf of an authenticated caller.
#[derive(Clone)]
pub struct FileService {
    file_repo: Arc<FileRepository>,
    share_repo: Arc<ShareRepository>,
    tag_repo: Arc<TagRepository>,
    user_repo: Arc<UserRepository>,
    checker: FileAccessChecker,
    config: StorageConfig,
}

impl std::fmt::Debug for FileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileService")
            .field("max_file_size_bytes", &self.config.max_file_size_bytes)
            .finish()
    }
}

/// Filters for listing and searching files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilesRequest {
    /// Case-insensitive substring of name or description.
    pub search_term: Option<String>,
    /// Tags the file must all carry.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Which files to search.
    #[serde(default)]
    pub file_type: FileTypeFilter,
}

/// A complete file received in one request.
#[derive(Debug, Clone)]
pub struct UploadFileRequest {
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Declared content type.
    pub content_type: String,
    /// File bytes.
    pub content: Bytes,
}

/// Data for updating a file's metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFileRequest {
    /// New file name.
    pub name: Option<String>,
    /// New description; empty clears it.
    pub description: Option<String>,
}

/// Data for sharing a file with another user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareFileRequest {
    /// Recipient.
    pub user_id: Uuid,
    /// Granted permission.
    pub permission: FilePermission,
    /// Optional expiration.
    pub expires_at: Option<DateTime<Utc>>,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        file_repo: Arc<FileRepository>,
        share_repo: Arc<ShareRepository>,
        tag_repo: Arc<TagRepository>,
        user_repo: Arc<UserRepository>,
        config: StorageConfig,
    ) -> Self {
        Self {
            file_repo,
            share_repo,
            tag_repo,
            user_repo,
            checker: FileAccessChecker::new(),
            config,
        }
    }

    /// Largest accepted file in bytes.
    pub fn max_file_size(&self) -> i64 {
        self.config.max_file_size_bytes
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Gets a single file the caller can read.
    pub async fn get_file(&self, ctx: &RequestContext, file_id: Uuid) -> Result<FileDto, AppError> {
        let file = self.authorize(ctx, file_id, FilePermission::Read).await?;
        self.describe(Some(ctx.user_id), file).await
    }

    /// Searches the caller's files, newest change first.
    pub async fn search(
        &self,
        ctx: &RequestContext,
        req: &SearchFilesRequest,
        page: PageRequest,
    ) -> Result<PageResponse<FileDto>, AppError> {
        let tags = normalize_tags(&req.tags)?;
        let query = FileQuery {
            user_id: ctx.user_id,
            scope: req.file_type,
            term: req.search_term.as_deref(),
            tags: &tags,
        };

        let result = self.file_repo.search(&query, &page).await?;
        let items = self.to_dtos(Some(ctx.user_id), result.items).await?;
        Ok(PageResponse::new(
            items,
            result.page,
            result.page_size,
            result.total_items,
        ))
    }

    /// The caller's own files.
    pub async fn list_files(
        &self,
        ctx: &RequestContext,
        tags: Vec<String>,
        page: PageRequest,
    ) -> Result<PageResponse<FileDto>, AppError> {
        let req = SearchFilesRequest {
            search_term: None,
            tags,
            file_type: FileTypeFilter::Own,
        };
        self.search(ctx, &req, page).await
    }

    /// Files shared with the caller through unexpired shares.
    pub async fn list_shared(
        &self,
        ctx: &RequestContext,
        tags: Vec<String>,
        page: PageRequest,
    ) -> Result<PageResponse<FileDto>, AppError> {
        let req = SearchFilesRequest {
            search_term: None,
            tags,
            file_type: FileTypeFilter::Shared,
        };
        self.search(ctx, &req, page).await
    }

    /// The caller's favorites that are still accessible.
    pub async fn list_favorites(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<PageResponse<FileDto>, AppError> {
        let req = SearchFilesRequest {
            file_type: FileTypeFilter::Favorites,
            ..Default::default()
        };
        self.search(ctx, &req, page).await
    }

    /// Lists stored versions, newest first.
    pub async fn list_versions(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
    ) -> Result<Vec<FileVersionDto>, AppError> {
        self.authorize(ctx, file_id, FilePermission::Read).await?;
        let versions = self.file_repo.list_versions(file_id).await?;
        Ok(versions.into_iter().map(FileVersionDto::from).collect())
    }

    /// Downloads the latest content.
    pub async fn download(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
    ) -> Result<DownloadedFile, AppError> {
        let file = self.authorize(ctx, file_id, FilePermission::Read).await?;
        info!(user_id = %ctx.user_id, file_id = %file_id, "File downloaded");
        self.read_content(&file).await
    }

    /// Downloads a specific version.
    pub async fn download_version(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        version_number: i32,
    ) -> Result<DownloadedFile, AppError> {
        let file = self.authorize(ctx, file_id, FilePermission::Read).await?;
        let data = self
            .file_repo
            .find_version_content(file_id, version_number)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Version {version_number} of file {file_id} not found"))
            })?;

        Ok(DownloadedFile {
            name: file.name,
            content_type: file.content_type,
            data: Bytes::from(data),
        })
    }

    // ── Uploads ──────────────────────────────────────────────────────

    /// Stores a complete file as version 1, charging the caller's quota.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        req: UploadFileRequest,
    ) -> Result<FileDto, AppError> {
        let mime = MimeType::parse(&req.content_type)?;
        self.check_size(req.content.len() as i64)?;
        let (content, hash) = sha256_hex_blocking(Vec::from(req.content)).await?;
        self.create_hashed(ctx, req.name, req.description, &mime, content, hash)
            .await
    }

    /// Stores content whose hash is already known.
    pub(crate) async fn create_hashed(
        &self,
        ctx: &RequestContext,
        name: String,
        description: Option<String>,
        mime: &MimeType,
        content: Vec<u8>,
        hash: String,
    ) -> Result<FileDto, AppError> {
        if content.is_empty() {
            return Err(AppError::validation("File cannot be empty"));
        }
        self.owner(ctx.user_id)
            .await?
            .ensure_capacity(content.len() as i64)?;

        let data = CreateFile {
            name: name.trim().to_string(),
            description: description.filter(|d| !d.trim().is_empty()),
            content_type: mime.as_str().to_string(),
            hash,
            owner_id: ctx.user_id,
            content,
        };
        let file = self.file_repo.create(&data).await?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file.id,
            name = %file.name,
            size = file.size,
            "File uploaded"
        );

        self.describe(Some(ctx.user_id), file).await
    }

    /// Adds a new version; the owner's quota is charged for the size delta.
    pub async fn upload_version(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        content: Bytes,
    ) -> Result<FileDto, AppError> {
        let file = self.authorize(ctx, file_id, FilePermission::Write).await?;
        file.ensure_not_deleted()?;
        if content.is_empty() {
            return Err(AppError::validation("File cannot be empty"));
        }
        let size = content.len() as i64;
        self.check_size(size)?;
        self.owner(file.owner_id)
            .await?
            .ensure_capacity(size - file.size)?;

        let (content, hash) = sha256_hex_blocking(Vec::from(content)).await?;
        let updated = self.file_repo.append_version(file_id, content, hash).await?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file_id,
            size = updated.size,
            "New file version uploaded"
        );

        self.describe(Some(ctx.user_id), updated).await
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Renames a file or changes its description.
    pub async fn update_metadata(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        req: UpdateFileRequest,
    ) -> Result<FileDto, AppError> {
        self.authorize(ctx, file_id, FilePermission::Write).await?;

        let update = UpdateFileMetadata {
            name: req.name.map(|n| n.trim().to_string()),
            description: req.description,
        };
        update.validate()?;
        let file = self.file_repo.update_metadata(file_id, &update).await?;

        info!(user_id = %ctx.user_id, file_id = %file_id, "File metadata updated");
        self.describe(Some(ctx.user_id), file).await
    }

    /// Soft-deletes a file and releases its bytes from the owner's quota.
    pub async fn delete(&self, ctx: &RequestContext, file_id: Uuid) -> Result<(), AppError> {
        self.authorize(ctx, file_id, FilePermission::Delete).await?;
        self.file_repo.soft_delete(file_id).await?;
        info!(user_id = %ctx.user_id, file_id = %file_id, "File deleted");
        Ok(())
    }

    /// Restores a soft-deleted file. Owner only.
    pub async fn restore(&self, ctx: &RequestContext, file_id: Uuid) -> Result<FileDto, AppError> {
        let file = self.load(file_id).await?;
        if !file.is_owned_by(ctx.user_id) {
            return Err(AppError::not_found(format!("File {file_id} not found")));
        }
        if !file.is_deleted() {
            return Err(AppError::validation("File is not deleted"));
        }
        self.owner(ctx.user_id).await?.ensure_capacity(file.size)?;

        let restored = self.file_repo.restore(file_id).await?;
        info!(user_id = %ctx.user_id, file_id = %file_id, "File restored");
        self.describe(Some(ctx.user_id), restored).await
    }

    /// Grants or updates another user's permission on a file.
    pub async fn share(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        req: ShareFileRequest,
    ) -> Result<FileShare, AppError> {
        let file = self.authorize(ctx, file_id, FilePermission::Share).await?;

        let target = self
            .user_repo
            .find_by_id(req.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {} not found", req.user_id)))?;
        if !target.is_active {
            return Err(AppError::validation("Cannot share with an inactive user"));
        }

        let data = CreateShare {
            file_id,
            user_id: req.user_id,
            permission: req.permission,
            expires_at: req.expires_at,
        };
        data.validate(file.owner_id)?;
        let share = self.share_repo.upsert(&data).await?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file_id,
            target_user_id = %req.user_id,
            permission = %req.permission,
            "File shared"
        );
        Ok(share)
    }

    /// Removes another user's share.
    pub async fn revoke_share(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        target_user_id: Uuid,
    ) -> Result<(), AppError> {
        self.authorize(ctx, file_id, FilePermission::Share).await?;
        if !self.share_repo.delete(file_id, target_user_id).await? {
            return Err(AppError::not_found("Share not found"));
        }
        info!(
            user_id = %ctx.user_id,
            file_id = %file_id,
            target_user_id = %target_user_id,
            "File share revoked"
        );
        Ok(())
    }

    /// Makes a file public or private.
    pub async fn set_visibility(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        visibility: FileVisibility,
    ) -> Result<FileDto, AppError> {
        self.authorize(ctx, file_id, FilePermission::Share).await?;
        let file = self.file_repo.set_visibility(file_id, visibility).await?;
        info!(
            user_id = %ctx.user_id,
            file_id = %file_id,
            visibility = %visibility,
            "File visibility changed"
        );
        self.describe(Some(ctx.user_id), file).await
    }

    /// Hands the file to another user; every share is dropped.
    pub async fn transfer_ownership(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        new_owner_id: Uuid,
    ) -> Result<FileDto, AppError> {
        let file = self.authorize(ctx, file_id, FilePermission::Owner).await?;
        if new_owner_id == ctx.user_id {
            return Err(AppError::validation("You already own this file"));
        }

        let new_owner = self
            .user_repo
            .find_by_id(new_owner_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {new_owner_id} not found")))?;
        if !new_owner.is_active {
            return Err(AppError::validation("Cannot transfer to an inactive user"));
        }
        new_owner.ensure_capacity(file.size)?;

        let updated = self
            .file_repo
            .transfer_ownership(file_id, new_owner_id)
            .await?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file_id,
            new_owner_id = %new_owner_id,
            "File ownership transferred"
        );
        self.describe(Some(ctx.user_id), updated).await
    }

    /// Replaces the file's tag set.
    pub async fn update_tags(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        tags: Vec<String>,
    ) -> Result<FileDto, AppError> {
        self.authorize(ctx, file_id, FilePermission::Write).await?;
        let names = normalize_tags(&tags)?;
        self.tag_repo.replace_for_file(file_id, &names).await?;

        info!(user_id = %ctx.user_id, file_id = %file_id, tags = ?names, "File tags updated");
        let file = self.load(file_id).await?;
        self.describe(Some(ctx.user_id), file).await
    }

    /// Marks a readable file as favorite.
    pub async fn add_favorite(&self, ctx: &RequestContext, file_id: Uuid) -> Result<(), AppError> {
        self.authorize(ctx, file_id, FilePermission::Read).await?;
        self.file_repo.add_favorite(file_id, ctx.user_id).await
    }

    /// Clears a favorite mark.
    pub async fn remove_favorite(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
    ) -> Result<(), AppError> {
        self.authorize(ctx, file_id, FilePermission::Read).await?;
        self.file_repo.remove_favorite(file_id, ctx.user_id).await?;
        Ok(())
    }

    /// Permanently removes files soft-deleted before `cutoff`.
    pub async fn purge_deleted(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let purged = self.file_repo.purge_deleted_before(cutoff).await?;
        info!(purged, cutoff = %cutoff, "Purged deleted files");
        Ok(purged)
    }

    // ── Helpers ──────────────────────────────────────────────────────

    /// Loads a file row, including soft-deleted ones.
    pub(crate) async fn load(&self, file_id: Uuid) -> Result<DriveFile, AppError> {
        self.file_repo
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    /// Loads a file and checks the caller holds at least `required` on it.
    pub(crate) async fn authorize(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        required: FilePermission,
    ) -> Result<DriveFile, AppError> {
        let file = self.load(file_id).await?;
        let shares: Vec<FileShare> = if file.is_owned_by(ctx.user_id) {
            Vec::new()
        } else {
            self.share_repo
                .find(file_id, ctx.user_id)
                .await?
                .into_iter()
                .collect()
        };
        self.checker
            .require(&file, ctx.user_id, &shares, required)?;
        Ok(file)
    }

    /// Reads the latest content of an already-authorized file.
    pub(crate) async fn read_content(&self, file: &DriveFile) -> Result<DownloadedFile, AppError> {
        let data = self
            .file_repo
            .find_latest_content(file.id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Content of file {} not found", file.id)))?;

        Ok(DownloadedFile {
            name: file.name.clone(),
            content_type: file.content_type.clone(),
            data: Bytes::from(data),
        })
    }

    /// Builds the DTO for one file.
    pub(crate) async fn describe(
        &self,
        viewer: Option<Uuid>,
        file: DriveFile,
    ) -> Result<FileDto, AppError> {
        let file_id = file.id;
        self.to_dtos(viewer, vec![file])
            .await?
            .pop()
            .ok_or_else(|| AppError::internal(format!("File {file_id} vanished while mapping")))
    }

    /// Maps files to DTOs with one query per related table.
    async fn to_dtos(
        &self,
        viewer: Option<Uuid>,
        files: Vec<DriveFile>,
    ) -> Result<Vec<FileDto>, AppError> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = files.iter().map(|f| f.id).collect();
        let mut owner_ids: Vec<Uuid> = files.iter().map(|f| f.owner_id).collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();

        let owners: HashMap<Uuid, String> = self
            .user_repo
            .find_by_ids(&owner_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.full_name()))
            .collect();
        let version_counts = self.file_repo.version_counts(&ids).await?;
        let mut tags = self.tag_repo.names_for_files(&ids).await?;
        let favorites = match viewer {
            Some(user_id) => self.file_repo.favorite_ids(user_id, &ids).await?,
            None => Default::default(),
        };

        Ok(files
            .into_iter()
            .map(|file| {
                let id = file.id;
                let owner_name = owners.get(&file.owner_id).cloned().unwrap_or_default();
                FileDto::from_parts(
                    file,
                    owner_name,
                    version_counts.get(&id).copied().unwrap_or(1),
                    tags.remove(&id).unwrap_or_default(),
                    favorites.contains(&id),
                )
            })
            .collect())
    }

    async fn owner(&self, user_id: Uuid) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    fn check_size(&self, size: i64) -> Result<(), AppError> {
        if size > self.config.max_file_size_bytes {
            return Err(AppError::payload_too_large(format!(
                "File exceeds the maximum size of {} bytes",
                self.config.max_file_size_bytes
            )));
        }
        Ok(())
    }
}
