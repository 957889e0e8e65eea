//! Thumbnail handlers.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use uuid::Uuid;

use booble_core::error::AppError;
use booble_service::file::Thumbnail;

use crate::error::ApiError;
use crate::extractors::{AuthUser, LinkPassword};
use crate::state::AppState;

fn image_response(thumb: Thumbnail) -> Result<Response, ApiError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, thumb.content_type)
        .header(header::CACHE_CONTROL, "private, max-age=3600")
        .header(header::CONTENT_LENGTH, thumb.data.len())
        .body(Body::from(thumb.data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")).into())
}

/// GET /api/v1/thumbnails/{file_id}
pub async fn get_thumbnail(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(file_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let thumb = state.thumbnail_service.thumbnail(&auth, file_id).await?;
    image_response(thumb)
}

/// GET /api/v1/thumbnails/public/{token}
pub async fn public_thumbnail(
    State(state): State<AppState>,
    Path(token): Path<String>,
    password: LinkPassword,
) -> Result<Response, ApiError> {
    let thumb = state
        .thumbnail_service
        .public_thumbnail(&token, password.as_deref())
        .await?;
    image_response(thumb)
}
