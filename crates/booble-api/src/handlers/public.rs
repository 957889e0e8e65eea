//! Unauthenticated access through public links.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::Response;

use booble_service::file::FileDto;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::LinkPassword;
use crate::state::AppState;

use super::attachment;

/// GET /api/v1/public/{token}
pub async fn public_file(
    State(state): State<AppState>,
    Path(token): Path<String>,
    password: LinkPassword,
) -> Result<Json<ApiResponse<FileDto>>, ApiError> {
    let file = state
        .link_service
        .public_file(&token, password.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// GET /api/v1/public/{token}/download
pub async fn public_download(
    State(state): State<AppState>,
    Path(token): Path<String>,
    password: LinkPassword,
) -> Result<Response, ApiError> {
    let file = state
        .link_service
        .public_download(&token, password.as_deref())
        .await?;
    attachment(file)
}
