//! User accounts and token issuance.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use booble_auth::jwt::{JwtEncoder, RevocationList};
use booble_auth::password::{PasswordHasher, PasswordValidator};
use booble_auth::token::generate_secure_token;
use booble_core::config::{AuthConfig, StorageConfig};
use booble_core::error::AppError;
use booble_core::types::pagination::{PageRequest, PageResponse};
use booble_database::repositories::{RefreshTokenRepository, UserRepository};
use booble_entity::token::CreateRefreshToken;
use booble_entity::user::{CreateUser, Email, User};

use crate::context::RequestContext;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Handles registration, login, token refresh, and account status.
#[derive(Clone)]
pub struct UserService {
    user_repo: Arc<UserRepository>,
    token_repo: Arc<RefreshTokenRepository>,
    hasher: PasswordHasher,
    validator: PasswordValidator,
    encoder: Arc<JwtEncoder>,
    revocations: RevocationList,
    refresh_ttl: Duration,
    default_quota: i64,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService")
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// New account details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Login credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A user as exposed over the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub total_storage_used: i64,
    pub storage_quota: i64,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            total_storage_used: u.total_storage_used,
            storage_quota: u.storage_quota,
            created_at: u.created_at,
            last_login_at: u.last_login_at,
            is_active: u.is_active,
        }
    }
}

/// Access and refresh tokens for a signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
    pub user: UserDto,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        token_repo: Arc<RefreshTokenRepository>,
        encoder: Arc<JwtEncoder>,
        revocations: RevocationList,
        auth: &AuthConfig,
        storage: &StorageConfig,
    ) -> Self {
        Self {
            user_repo,
            token_repo,
            hasher: PasswordHasher::new(),
            validator: PasswordValidator::new(auth),
            encoder,
            revocations,
            refresh_ttl: Duration::days(auth.refresh_token_ttl_days),
            default_quota: storage.default_quota_bytes,
        }
    }

    /// Validates and stores a new account.
    pub async fn create_user(&self, req: RegisterRequest) -> Result<UserDto, AppError> {
        let email = Email::parse(&req.email)?;
        self.validator.validate(
            &req.password,
            &[email.as_str(), &req.first_name, &req.last_name],
        )?;

        if self.user_repo.exists_by_email(email.as_str()).await? {
            return Err(AppError::conflict("User with this email already exists"));
        }

        let data = CreateUser {
            email: email.into(),
            password_hash: self.hasher.hash_password(&req.password)?,
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            storage_quota: self.default_quota,
        };
        data.validate()?;

        let user = self.user_repo.create(&data).await?;
        info!(user_id = %user.id, email = %user.email, "User registered");
        Ok(user.into())
    }

    /// Registers an account and signs it in.
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthTokens, AppError> {
        let dto = self.create_user(req).await?;
        let user = self
            .user_repo
            .find_by_id(dto.id)
            .await?
            .ok_or_else(|| AppError::internal("Registered user disappeared"))?;
        self.issue_tokens(user).await
    }

    /// Verifies credentials and issues a token pair.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthTokens, AppError> {
        let email = req.email.trim().to_lowercase();
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::authentication(INVALID_CREDENTIALS))?;

        if !user.is_active {
            warn!(user_id = %user.id, "Login attempt on inactive account");
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }
        if !self.hasher.verify_password(&req.password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }

        self.user_repo.record_login(user.id).await?;
        info!(user_id = %user.id, "User logged in");

        let user = User {
            last_login_at: Some(Utc::now()),
            ..user
        };
        self.issue_tokens(user).await
    }

    /// Rotates a refresh token into a fresh pair.
    pub async fn refresh(&self, token: &str) -> Result<AuthTokens, AppError> {
        let stored = self
            .token_repo
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid refresh token"))?;

        if !stored.is_active() {
            return Err(AppError::authentication("Refresh token is inactive"));
        }
        // Losing the race to another refresh with the same token counts as inactive.
        if !self.token_repo.revoke(stored.id).await? {
            return Err(AppError::authentication("Refresh token is inactive"));
        }

        let user = self
            .user_repo
            .find_by_id(stored.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::authentication("Invalid refresh token"))?;

        info!(user_id = %user.id, "Refresh token rotated");
        self.issue_tokens(user).await
    }

    /// Revokes every refresh token and outstanding access token of the caller.
    pub async fn logout(&self, ctx: &RequestContext) -> Result<(), AppError> {
        let revoked = self.token_repo.revoke_all_for_user(ctx.user_id).await?;
        self.revocations.revoke_user(ctx.user_id, Utc::now()).await;
        info!(user_id = %ctx.user_id, revoked, "User logged out");
        Ok(())
    }

    /// Looks up a user by ID.
    pub async fn get_user(&self, user_id: Uuid) -> Result<UserDto, AppError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .map(UserDto::from)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    /// Looks up a user by email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<UserDto, AppError> {
        let email = Email::parse(email)?;
        self.user_repo
            .find_by_email(email.as_str())
            .await?
            .map(UserDto::from)
            .ok_or_else(|| AppError::not_found(format!("User {email} not found")))
    }

    /// Deactivates an account. Callers may only deactivate themselves.
    pub async fn deactivate(&self, ctx: &RequestContext, user_id: Uuid) -> Result<(), AppError> {
        if user_id != ctx.user_id {
            return Err(AppError::authorization(
                "You can only deactivate your own account",
            ));
        }
        self.set_active(user_id, false).await
    }

    /// Activates or deactivates any account. Deactivation signs the user out.
    pub async fn set_active(&self, user_id: Uuid, active: bool) -> Result<(), AppError> {
        self.user_repo.set_active(user_id, active).await?;
        if !active {
            self.token_repo.revoke_all_for_user(user_id).await?;
            self.revocations.revoke_user(user_id, Utc::now()).await;
        }
        info!(user_id = %user_id, active, "User status changed");
        Ok(())
    }

    /// Changes a user's storage quota. Usage above the new quota is kept.
    pub async fn set_quota(&self, user_id: Uuid, quota: i64) -> Result<(), AppError> {
        if quota < 0 {
            return Err(AppError::validation("Quota cannot be negative"));
        }
        self.user_repo.set_quota(user_id, quota).await?;
        info!(user_id = %user_id, quota, "Storage quota changed");
        Ok(())
    }

    /// Recomputes a user's usage from their live files.
    pub async fn recalculate_storage(&self, user_id: Uuid) -> Result<i64, AppError> {
        let used = self.user_repo.recalculate_storage(user_id).await?;
        info!(user_id = %user_id, used, "Storage usage recalculated");
        Ok(used)
    }

    /// Lists users, newest first.
    pub async fn list_users(&self, page: PageRequest) -> Result<PageResponse<UserDto>, AppError> {
        let result = self.user_repo.find_all(&page).await?;
        Ok(PageResponse::new(
            result.items.into_iter().map(UserDto::from).collect(),
            result.page,
            result.page_size,
            result.total_items,
        ))
    }

    /// Deletes expired and revoked refresh tokens.
    pub async fn purge_refresh_tokens(&self) -> Result<u64, AppError> {
        let purged = self.token_repo.purge_inactive().await?;
        info!(purged, "Purged inactive refresh tokens");
        Ok(purged)
    }

    async fn issue_tokens(&self, user: User) -> Result<AuthTokens, AppError> {
        let (access_token, expires_at) =
            self.encoder.generate_access_token(user.id, &user.email)?;

        let refresh_expires_at = Utc::now() + self.refresh_ttl;
        let refresh = self
            .token_repo
            .create(&CreateRefreshToken {
                user_id: user.id,
                token: generate_secure_token(),
                expires_at: refresh_expires_at,
            })
            .await?;

        Ok(AuthTokens {
            access_token,
            token_type: "Bearer".to_string(),
            expires_at,
            refresh_token: refresh.token,
            refresh_expires_at,
            user: user.into(),
        })
    }
}
