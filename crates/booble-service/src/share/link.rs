//! Public capability links.
//!
//! A link is a random token that grants read access to one file without
//! signing in. Links may expire and may require a password, which is stored
//! only as an argon2 hash.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use booble_auth::password::PasswordHasher;
use booble_auth::token::generate_secure_token;
use booble_core::error::AppError;
use booble_database::repositories::PublicLinkRepository;
use booble_entity::file::DriveFile;
use booble_entity::share::{CreatePublicLink, FilePermission, PublicLink};

use crate::context::RequestContext;
use crate::file::dto::{DownloadedFile, FileDto};
use crate::file::service::FileService;

/// Creates, removes, and resolves public links.
#[derive(Clone)]
pub struct PublicLinkService {
    link_repo: Arc<PublicLinkRepository>,
    file_service: Arc<FileService>,
    hasher: PasswordHasher,
}

impl std::fmt::Debug for PublicLinkService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicLinkService").finish()
    }
}

/// Options for a new link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateLinkRequest {
    /// Optional password; blank means none.
    pub password: Option<String>,
    /// Optional expiration.
    pub expires_at: Option<DateTime<Utc>>,
}

/// A link as returned to its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicLinkDto {
    pub token: String,
    pub url: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub requires_password: bool,
    pub created_at: DateTime<Utc>,
}

impl From<PublicLink> for PublicLinkDto {
    fn from(link: PublicLink) -> Self {
        Self {
            url: link.url(),
            requires_password: link.requires_password(),
            token: link.token,
            expires_at: link.expires_at,
            created_at: link.created_at,
        }
    }
}

impl PublicLinkService {
    /// Creates a new public link service.
    pub fn new(link_repo: Arc<PublicLinkRepository>, file_service: Arc<FileService>) -> Self {
        Self {
            link_repo,
            file_service,
            hasher: PasswordHasher::new(),
        }
    }

    /// Creates a link for a file the caller owns.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        req: CreateLinkRequest,
    ) -> Result<PublicLinkDto, AppError> {
        self.file_service
            .authorize(ctx, file_id, FilePermission::Owner)
            .await?;

        if req.expires_at.is_some_and(|exp| exp <= Utc::now()) {
            return Err(AppError::validation("Link expiration must be in the future"));
        }

        let password_hash = match supplied_password(req.password.as_deref()) {
            Some(pw) => Some(self.hasher.hash_password(pw)?),
            None => None,
        };

        let link = self
            .link_repo
            .create(&CreatePublicLink {
                token: generate_secure_token(),
                file_id,
                password_hash,
                expires_at: req.expires_at,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file_id,
            protected = link.requires_password(),
            "Public link created"
        );
        Ok(link.into())
    }

    /// Lists the links of a file the caller owns.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
    ) -> Result<Vec<PublicLinkDto>, AppError> {
        self.file_service
            .authorize(ctx, file_id, FilePermission::Owner)
            .await?;
        let links = self.link_repo.find_by_file(file_id).await?;
        Ok(links.into_iter().map(PublicLinkDto::from).collect())
    }

    /// Removes every link of a file the caller owns.
    pub async fn delete(&self, ctx: &RequestContext, file_id: Uuid) -> Result<u64, AppError> {
        self.file_service
            .authorize(ctx, file_id, FilePermission::Owner)
            .await?;

        let removed = self.link_repo.delete_by_file(file_id).await?;
        if removed == 0 {
            return Err(AppError::not_found("File has no public link"));
        }
        info!(user_id = %ctx.user_id, file_id = %file_id, removed, "Public links deleted");
        Ok(removed)
    }

    /// Resolves a token to its live file, checking expiry and password.
    pub async fn resolve(
        &self,
        token: &str,
        password: Option<&str>,
    ) -> Result<(PublicLink, DriveFile), AppError> {
        let link = self
            .link_repo
            .find_by_token(token)
            .await?
            .filter(PublicLink::is_active)
            .ok_or_else(|| AppError::not_found("Public link not found or expired"))?;

        if let Some(hash) = &link.password_hash {
            let supplied = supplied_password(password)
                .ok_or_else(|| AppError::authorization("This link is password protected"))?;
            if !self.hasher.verify_password(supplied, hash)? {
                return Err(AppError::authorization("Invalid link password"));
            }
        }

        let file = self.file_service.load(link.file_id).await?;
        if file.is_deleted() {
            return Err(AppError::not_found("Public link not found or expired"));
        }
        Ok((link, file))
    }

    /// Metadata of a linked file.
    pub async fn public_file(
        &self,
        token: &str,
        password: Option<&str>,
    ) -> Result<FileDto, AppError> {
        let (_, file) = self.resolve(token, password).await?;
        self.file_service.describe(None, file).await
    }

    /// Content of a linked file.
    pub async fn public_download(
        &self,
        token: &str,
        password: Option<&str>,
    ) -> Result<DownloadedFile, AppError> {
        let (link, file) = self.resolve(token, password).await?;
        info!(link_id = %link.id, file_id = %file.id, "Public download");
        self.file_service.read_content(&file).await
    }
}

/// A link password as given, or `None` when it is missing or blank.
///
/// Surrounding whitespace is kept so the same string opens the link later.
fn supplied_password(raw: Option<&str>) -> Option<&str> {
    raw.filter(|pw| !pw.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_password_means_unprotected() {
        assert_eq!(supplied_password(None), None);
        assert_eq!(supplied_password(Some("")), None);
        assert_eq!(supplied_password(Some("   ")), None);
    }

    #[test]
    fn test_padded_password_opens_its_link() {
        let hasher = PasswordHasher::new();
        let stored = supplied_password(Some(" s3cret ")).unwrap();
        let hash = hasher.hash_password(stored).unwrap();

        let offered = supplied_password(Some(" s3cret ")).unwrap();
        assert!(hasher.verify_password(offered, &hash).unwrap());
        assert!(!hasher.verify_password("s3cret", &hash).unwrap());
    }

    #[test]
    fn test_dto_exposes_url_not_hash() {
        let link = PublicLink {
            id: Uuid::new_v4(),
            token: "abc".to_string(),
            file_id: Uuid::new_v4(),
            password_hash: Some("$argon2id$...".to_string()),
            expires_at: None,
            created_at: Utc::now(),
        };
        let dto = PublicLinkDto::from(link);
        assert_eq!(dto.url, "/p/abc");
        assert!(dto.requires_password);
    }
}
