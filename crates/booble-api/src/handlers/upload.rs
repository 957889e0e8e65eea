//! Chunked upload handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use bytes::Bytes;

use booble_core::error::AppError;
use booble_service::file::{ChunkReceived, FileDto, InitiateUploadResponse};

use crate::dto::request::{ChunkQuery, CompleteUploadRequest, InitiateUploadRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{ApiMultipart, ApiQuery, AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/v1/uploads/initiate
pub async fn initiate_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<InitiateUploadRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InitiateUploadResponse>>), ApiError> {
    let session = state.upload_service.initiate(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(session))))
}

/// POST /api/v1/uploads/{upload_id} (multipart: `chunk`, `chunk_number`)
///
/// `chunk_number` may also be passed as a query parameter.
pub async fn upload_chunk(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(upload_id): Path<String>,
    ApiQuery(query): ApiQuery<ChunkQuery>,
    ApiMultipart(mut multipart): ApiMultipart,
) -> Result<Json<ApiResponse<ChunkReceived>>, ApiError> {
    let mut chunk_number = query.chunk_number;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "chunk" | "file" => data = Some(field.bytes().await?),
            "chunk_number" => {
                let raw = field.text().await?;
                let number = raw
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| AppError::validation(format!("Invalid chunk_number: {raw}")))?;
                chunk_number = Some(number);
            }
            _ => {}
        }
    }

    let data = data
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::validation("No file chunk provided"))?;
    let chunk_number =
        chunk_number.ok_or_else(|| AppError::validation("chunk_number is required"))?;

    let received = state
        .upload_service
        .upload_chunk(&auth, &upload_id, chunk_number, data)
        .await?;
    Ok(Json(ApiResponse::ok(received)))
}

/// POST /api/v1/uploads/{upload_id}/complete
pub async fn complete_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(upload_id): Path<String>,
    ValidatedJson(req): ValidatedJson<CompleteUploadRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FileDto>>), ApiError> {
    let file = state
        .upload_service
        .complete(&auth, &upload_id, req.file_hash.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(file))))
}

/// DELETE /api/v1/uploads/{upload_id}
pub async fn cancel_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(upload_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.upload_service.cancel(&auth, &upload_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
