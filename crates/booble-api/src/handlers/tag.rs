//! Tag handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::request::TagSearchQuery;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{ApiQuery, AuthUser};
use crate::state::AppState;

/// GET /api/v1/tags
pub async fn list_tags(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let tags = state.tag_service.list_all().await?;
    Ok(Json(ApiResponse::ok(tags)))
}

/// GET /api/v1/tags/search?q=&limit=
pub async fn search_tags(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(query): ApiQuery<TagSearchQuery>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let tags = state.tag_service.search(&query.q, query.limit).await?;
    Ok(Json(ApiResponse::ok(tags)))
}
