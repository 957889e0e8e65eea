//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use booble_auth::jwt::JwtDecoder;
use booble_core::config::AppConfig;
use booble_service::{
    FileService, PublicLinkService, TagService, ThumbnailService, UploadService, UserService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// When the process started serving
    pub started_at: DateTime<Utc>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL connection pool
    pub db_pool: PgPool,

    // ── Auth ─────────────────────────────────────────────────
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    /// Accounts and tokens
    pub user_service: Arc<UserService>,
    /// File CRUD, versions, and sharing
    pub file_service: Arc<FileService>,
    /// Chunked uploads
    pub upload_service: Arc<UploadService>,
    /// Public links
    pub link_service: Arc<PublicLinkService>,
    /// Thumbnails
    pub thumbnail_service: Arc<ThumbnailService>,
    /// Tags
    pub tag_service: Arc<TagService>,
}
