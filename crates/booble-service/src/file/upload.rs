//! Chunked upload sessions.
//!
//! A session lives in process memory and owns a directory under the
//! configured temp dir. Each chunk is written to `{n}.chunk`; completion
//! concatenates the chunks in ascending order, verifies the optional client
//! hash, and hands the bytes to [`FileService`]. Nothing survives a restart.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration as StdDuration, SystemTime};

use bytes::Bytes;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use booble_core::config::UploadConfig;
use booble_core::error::{AppError, ErrorKind};
use booble_database::repositories::UserRepository;
use booble_entity::file::MimeType;
use booble_entity::file::model::validate_name;
use booble_entity::upload::UploadSession;

use crate::context::RequestContext;

use super::dto::FileDto;
use super::hashing::{hashes_match, sha256_hex_blocking};
use super::service::FileService;

const INVALID_SESSION: &str = "Invalid upload session.";
const HASH_MISMATCH: &str = "File integrity check failed. Hashes do not match.";

/// Tracks in-flight chunked uploads.
#[derive(Clone)]
pub struct UploadService {
    sessions: Arc<DashMap<String, UploadSession>>,
    file_service: Arc<FileService>,
    user_repo: Arc<UserRepository>,
    config: UploadConfig,
}

impl std::fmt::Debug for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService")
            .field("active_sessions", &self.sessions.len())
            .field("temp_dir", &self.config.temp_dir)
            .finish()
    }
}

/// Request for initiating a chunked upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiateUploadRequest {
    /// Final file name.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// Total file size in bytes.
    pub file_size: i64,
}

/// Response from initiating a chunked upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiateUploadResponse {
    /// Session identifier for subsequent chunk requests.
    pub upload_id: String,
    /// Largest chunk the server accepts.
    pub max_chunk_size: usize,
}

/// Progress after a chunk was stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkReceived {
    pub upload_id: String,
    pub chunk_number: u32,
    pub received_bytes: u64,
    pub file_size: i64,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        file_service: Arc<FileService>,
        user_repo: Arc<UserRepository>,
        config: UploadConfig,
    ) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            file_service,
            user_repo,
            config,
        }
    }

    /// Number of sessions currently held in memory.
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Idle time after which a session is discarded.
    pub fn session_ttl(&self) -> Duration {
        Duration::minutes(self.config.session_ttl_minutes)
    }

    /// Opens a session after validating the declared file.
    pub async fn initiate(
        &self,
        ctx: &RequestContext,
        req: InitiateUploadRequest,
    ) -> Result<InitiateUploadResponse, AppError> {
        validate_name(&req.file_name)?;
        let mime = MimeType::parse(&req.content_type)?;

        if req.file_size <= 0 {
            return Err(AppError::validation("File size must be positive"));
        }
        let max = self.file_service.max_file_size();
        if req.file_size > max {
            return Err(AppError::payload_too_large(format!(
                "File exceeds the maximum size of {max} bytes"
            )));
        }

        let user = self
            .user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {} not found", ctx.user_id)))?;
        user.ensure_capacity(req.file_size)?;

        let session = UploadSession::new(
            ctx.user_id,
            req.file_name.trim().to_string(),
            mime.as_str().to_string(),
            req.file_size,
            Path::new(&self.config.temp_dir),
        );

        tokio::fs::create_dir_all(&session.temp_dir)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    "Failed to create upload directory",
                    e,
                )
            })?;

        let upload_id = session.upload_id.clone();
        info!(
            user_id = %ctx.user_id,
            upload_id = %upload_id,
            file_name = %session.file_name,
            file_size = session.file_size,
            "Chunked upload initiated"
        );
        self.sessions.insert(upload_id.clone(), session);

        Ok(InitiateUploadResponse {
            upload_id,
            max_chunk_size: self.config.max_chunk_size_bytes,
        })
    }

    /// Stores one chunk. A chunk sent again replaces the earlier copy.
    pub async fn upload_chunk(
        &self,
        ctx: &RequestContext,
        upload_id: &str,
        chunk_number: u32,
        data: Bytes,
    ) -> Result<ChunkReceived, AppError> {
        if data.is_empty() {
            return Err(AppError::validation("Chunk cannot be empty"));
        }
        if data.len() > self.config.max_chunk_size_bytes {
            return Err(AppError::payload_too_large(format!(
                "Chunk exceeds the maximum size of {} bytes",
                self.config.max_chunk_size_bytes
            )));
        }

        let len = data.len() as u64;
        let path = {
            let session = self.owned_session(ctx, upload_id)?;
            check_declared_size(&session, chunk_number, len)?;
            session.chunk_path(chunk_number)
        };

        tokio::fs::write(&path, &data).await?;

        // Another chunk may have been recorded while this one was written.
        let outcome = match self.sessions.get_mut(upload_id) {
            Some(mut session) if session.is_owned_by(ctx.user_id) => {
                match check_declared_size(&session, chunk_number, len) {
                    Ok(()) => {
                        session.record_chunk(chunk_number, len);
                        Ok((session.received_bytes(), session.file_size))
                    }
                    Err(e) => {
                        session.chunks.remove(&chunk_number);
                        Err(e)
                    }
                }
            }
            _ => Err(AppError::validation(INVALID_SESSION)),
        };

        let (received_bytes, file_size) = match outcome {
            Ok(progress) => progress,
            Err(e) => {
                let _ = tokio::fs::remove_file(&path).await;
                return Err(e);
            }
        };

        Ok(ChunkReceived {
            upload_id: upload_id.to_string(),
            chunk_number,
            received_bytes,
            file_size,
        })
    }

    /// Assembles the chunks into a stored file and ends the session.
    pub async fn complete(
        &self,
        ctx: &RequestContext,
        upload_id: &str,
        expected_hash: Option<&str>,
    ) -> Result<FileDto, AppError> {
        let session = self.take_owned_session(ctx, upload_id)?;
        let result = self.finish(ctx, &session, expected_hash).await;
        remove_session_dir(&session.temp_dir).await;

        match &result {
            Ok(file) => info!(
                user_id = %ctx.user_id,
                upload_id = %upload_id,
                file_id = %file.id,
                "Chunked upload completed"
            ),
            Err(e) => warn!(
                user_id = %ctx.user_id,
                upload_id = %upload_id,
                error = %e,
                "Chunked upload failed"
            ),
        }
        result
    }

    /// Abandons a session and removes its chunks.
    pub async fn cancel(&self, ctx: &RequestContext, upload_id: &str) -> Result<(), AppError> {
        let session = self.take_owned_session(ctx, upload_id)?;
        remove_session_dir(&session.temp_dir).await;
        info!(user_id = %ctx.user_id, upload_id = %upload_id, "Chunked upload cancelled");
        Ok(())
    }

    /// Drops sessions idle longer than the configured TTL.
    pub async fn purge_expired(&self) -> usize {
        let ttl = self.session_ttl();
        let now = Utc::now();
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|entry| entry.value().is_expired(ttl, now))
            .map(|entry| entry.key().clone())
            .collect();

        let mut purged = 0;
        for upload_id in expired {
            if let Some((_, session)) = self
                .sessions
                .remove_if(&upload_id, |_, s| s.is_expired(ttl, now))
            {
                remove_session_dir(&session.temp_dir).await;
                purged += 1;
            }
        }

        if purged > 0 {
            info!(purged, "Purged expired upload sessions");
        }
        purged
    }

    async fn finish(
        &self,
        ctx: &RequestContext,
        session: &UploadSession,
        expected_hash: Option<&str>,
    ) -> Result<FileDto, AppError> {
        let received = session.received_bytes();
        if received != session.file_size as u64 {
            return Err(AppError::validation(format!(
                "Upload incomplete: received {received} of {} bytes",
                session.file_size
            )));
        }

        let mut content = Vec::with_capacity(received as usize);
        for chunk_number in session.chunks.keys() {
            let chunk = tokio::fs::read(session.chunk_path(*chunk_number)).await?;
            content.extend_from_slice(&chunk);
        }

        let (content, hash) = sha256_hex_blocking(content).await?;
        if let Some(expected) = expected_hash.filter(|h| !h.trim().is_empty()) {
            if !hashes_match(expected, &hash) {
                return Err(AppError::validation(HASH_MISMATCH));
            }
        }

        let mime = MimeType::parse(&session.content_type)?;
        self.file_service
            .create_hashed(ctx, session.file_name.clone(), None, &mime, content, hash)
            .await
    }

    fn owned_session(
        &self,
        ctx: &RequestContext,
        upload_id: &str,
    ) -> Result<dashmap::mapref::one::Ref<'_, String, UploadSession>, AppError> {
        match self.sessions.get(upload_id) {
            Some(s) if s.is_owned_by(ctx.user_id) => Ok(s),
            _ => Err(AppError::validation(INVALID_SESSION)),
        }
    }

    fn take_owned_session(
        &self,
        ctx: &RequestContext,
        upload_id: &str,
    ) -> Result<UploadSession, AppError> {
        self.sessions
            .remove_if(upload_id, |_, s| s.is_owned_by(ctx.user_id))
            .map(|(_, s)| s)
            .ok_or_else(|| AppError::validation(INVALID_SESSION))
    }
}

fn check_declared_size(
    session: &UploadSession,
    chunk_number: u32,
    len: u64,
) -> Result<(), AppError> {
    let total = session.received_with(chunk_number, len);
    if total > session.file_size as u64 {
        return Err(AppError::validation(format!(
            "Received {total} bytes, more than the declared {} bytes",
            session.file_size
        )));
    }
    Ok(())
}

async fn remove_session_dir(dir: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(dir).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(dir = %dir.display(), error = %e, "Failed to remove upload directory");
        }
    }
}

/// Removes session directories under `base` untouched for `older_than`.
///
/// Used by operator tooling when no server holds the sessions in memory.
pub async fn clean_stale_dirs(
    base: &Path,
    older_than: StdDuration,
) -> Result<Vec<PathBuf>, AppError> {
    let mut removed = Vec::new();
    let mut entries = match tokio::fs::read_dir(base).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(removed),
        Err(e) => return Err(e.into()),
    };

    let cutoff = SystemTime::now()
        .checked_sub(older_than)
        .unwrap_or(SystemTime::UNIX_EPOCH);

    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_dir() {
            continue;
        }
        if metadata.modified()? <= cutoff {
            let path = entry.path();
            tokio::fs::remove_dir_all(&path).await?;
            removed.push(path);
        }
    }
    Ok(removed)
}
