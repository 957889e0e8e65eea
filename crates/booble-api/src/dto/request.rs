//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use booble_entity::file::{FileTypeFilter, FileVisibility};
use booble_entity::share::FilePermission;
use booble_service::file::{
    InitiateUploadRequest as SvcInitiateUpload, ShareFileRequest as SvcShareFile,
    UpdateFileRequest as SvcUpdateFile,
};
use booble_service::share::CreateLinkRequest;
use booble_service::user::{LoginRequest as SvcLogin, RegisterRequest as SvcRegister};

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address.
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    /// Password. Strength is checked by the user service.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// First name.
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    /// Last name.
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
}

impl From<RegisterRequest> for SvcRegister {
    fn from(req: RegisterRequest) -> Self {
        Self {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl From<LoginRequest> for SvcLogin {
    fn from(req: LoginRequest) -> Self {
        Self {
            email: req.email,
            password: req.password,
        }
    }
}

/// Token refresh request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshRequest {
    /// Refresh token.
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Query string for `GET /files`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilesQuery {
    /// Case-insensitive match against name and description.
    pub search_term: Option<String>,
    /// Comma-separated tag names; files must carry all of them.
    pub tags: Option<String>,
    /// Which files to search.
    #[serde(default)]
    pub file_type: FileTypeFilter,
}

/// Query string for `GET /files/shared`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SharedFilesQuery {
    /// Comma-separated tag names.
    pub tags: Option<String>,
}

/// Split a comma-separated tag list, dropping blanks.
pub fn split_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

/// Update file metadata request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateFileRequest {
    /// New name.
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    /// New description. An empty string clears it.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

impl From<UpdateFileRequest> for SvcUpdateFile {
    fn from(req: UpdateFileRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
        }
    }
}

/// Share a file with another user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ShareFileRequest {
    /// Recipient.
    pub user_id: Uuid,
    /// Granted permission.
    pub permission: FilePermission,
    /// Optional expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<ShareFileRequest> for SvcShareFile {
    fn from(req: ShareFileRequest) -> Self {
        Self {
            user_id: req.user_id,
            permission: req.permission,
            expires_at: req.expires_at,
        }
    }
}

/// Change visibility request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetVisibilityRequest {
    /// New visibility.
    pub visibility: FileVisibility,
}

/// Transfer ownership request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransferOwnershipRequest {
    /// The user who becomes the owner.
    pub new_owner_id: Uuid,
}

/// Create public link request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateShareLinkRequest {
    /// Optional password protecting the link.
    #[validate(length(max = 128))]
    pub password: Option<String>,
    /// Optional expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<CreateShareLinkRequest> for CreateLinkRequest {
    fn from(req: CreateShareLinkRequest) -> Self {
        Self {
            password: req.password,
            expires_at: req.expires_at,
        }
    }
}

/// Replace tags request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateTagsRequest {
    /// The full new tag set.
    #[validate(length(max = 50, message = "A file can carry at most 50 tags"))]
    pub tags: Vec<String>,
}

/// Initiate chunked upload request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InitiateUploadRequest {
    /// Final file name.
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    /// MIME type.
    #[validate(length(min = 1, max = 255))]
    pub content_type: String,
    /// Total size in bytes.
    #[validate(range(min = 1, message = "File size must be positive"))]
    pub file_size: i64,
}

impl From<InitiateUploadRequest> for SvcInitiateUpload {
    fn from(req: InitiateUploadRequest) -> Self {
        Self {
            file_name: req.file_name,
            content_type: req.content_type,
            file_size: req.file_size,
        }
    }
}

/// Complete chunked upload request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CompleteUploadRequest {
    /// Expected SHA-256 of the assembled file, hex encoded.
    #[validate(length(equal = 64, message = "File hash must be a 64 character SHA-256 hex digest"))]
    pub file_hash: Option<String>,
}

/// Query string for `POST /uploads/{upload_id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkQuery {
    /// Chunk index, when not sent as a form field.
    pub chunk_number: Option<u32>,
}

/// Query string for `GET /tags/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagSearchQuery {
    /// Case-insensitive prefix.
    #[serde(default)]
    pub q: String,
    /// Maximum number of results.
    pub limit: Option<i64>,
}
