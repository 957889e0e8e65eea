//! File CRUD, upload, download, sharing, and tagging handlers.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use bytes::Bytes;
use uuid::Uuid;

use booble_core::error::AppError;
use booble_core::types::pagination::PageResponse;
use booble_entity::file::FileTypeFilter;
use booble_entity::share::FileShare;
use booble_service::file::{FileDto, FileVersionDto, SearchFilesRequest, UploadFileRequest};
use booble_service::share::PublicLinkDto;

use crate::dto::request::{
    CreateShareLinkRequest, SearchFilesQuery, SetVisibilityRequest, ShareFileRequest,
    SharedFilesQuery, TransferOwnershipRequest, UpdateFileRequest, UpdateTagsRequest, split_tags,
};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{
    ApiMultipart, ApiQuery, AuthUser, PaginationParams, ValidatedJson,
};
use crate::state::AppState;

use super::attachment;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// GET /api/v1/files?search_term=&tags=&file_type=&page=&per_page=
pub async fn search_files(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(params): ApiQuery<PaginationParams>,
    ApiQuery(query): ApiQuery<SearchFilesQuery>,
) -> Result<Json<ApiResponse<PageResponse<FileDto>>>, ApiError> {
    let search_term = query.search_term.filter(|t| !t.trim().is_empty());
    let tags = split_tags(query.tags.as_deref());
    let page_request = params.into_page_request();

    let page = match (search_term, query.file_type) {
        (None, FileTypeFilter::Own) => {
            state
                .file_service
                .list_files(&auth, tags, page_request)
                .await?
        }
        (search_term, file_type) => {
            let req = SearchFilesRequest {
                search_term,
                tags,
                file_type,
            };
            state.file_service.search(&auth, &req, page_request).await?
        }
    };
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/v1/files/shared
pub async fn shared_files(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(params): ApiQuery<PaginationParams>,
    ApiQuery(query): ApiQuery<SharedFilesQuery>,
) -> Result<Json<ApiResponse<PageResponse<FileDto>>>, ApiError> {
    let page = state
        .file_service
        .list_shared(
            &auth,
            split_tags(query.tags.as_deref()),
            params.into_page_request(),
        )
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/v1/files/favorites
pub async fn favorite_files(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<FileDto>>>, ApiError> {
    let page = state
        .file_service
        .list_favorites(&auth, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// Fields of a single-file upload form.
#[derive(Debug, Default)]
struct UploadForm {
    content: Option<(Bytes, Option<String>, Option<String>)>,
    name: Option<String>,
    description: Option<String>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(String::from);
                let content_type = field.content_type().map(String::from);
                let data = field.bytes().await?;
                form.content = Some((data, file_name, content_type));
            }
            "name" => form.name = Some(field.text().await?),
            "description" => form.description = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(form)
}

/// POST /api/v1/files/upload (multipart: `file`, `name?`, `description?`)
pub async fn upload_file(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<(StatusCode, Json<ApiResponse<FileDto>>), ApiError> {
    let form = read_upload_form(multipart).await?;
    let (content, file_name, content_type) = form
        .content
        .ok_or_else(|| AppError::validation("No file provided"))?;

    let name = form
        .name
        .filter(|n| !n.trim().is_empty())
        .or(file_name)
        .ok_or_else(|| AppError::validation("File name is required"))?;

    let file = state
        .file_service
        .upload(
            &auth,
            UploadFileRequest {
                name,
                description: form.description.filter(|d| !d.trim().is_empty()),
                content_type: content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
                content,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(file))))
}

/// GET /api/v1/files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FileDto>>, ApiError> {
    let file = state.file_service.get_file(&auth, id).await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// PUT /api/v1/files/{id}
pub async fn update_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateFileRequest>,
) -> Result<Json<ApiResponse<FileDto>>, ApiError> {
    let file = state
        .file_service
        .update_metadata(&auth, id, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// DELETE /api/v1/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.file_service.delete(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/files/{id}/restore
pub async fn restore_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FileDto>>, ApiError> {
    let file = state.file_service.restore(&auth, id).await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// GET /api/v1/files/{id}/download
pub async fn download_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let file = state.file_service.download(&auth, id).await?;
    attachment(file)
}

/// GET /api/v1/files/{id}/versions
pub async fn list_versions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<FileVersionDto>>>, ApiError> {
    let versions = state.file_service.list_versions(&auth, id).await?;
    Ok(Json(ApiResponse::ok(versions)))
}

/// POST /api/v1/files/{id}/versions (multipart: `file`)
pub async fn upload_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<(StatusCode, Json<ApiResponse<FileDto>>), ApiError> {
    let (content, _, _) = read_upload_form(multipart)
        .await?
        .content
        .ok_or_else(|| AppError::validation("No file provided"))?;

    let file = state.file_service.upload_version(&auth, id, content).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(file))))
}

/// GET /api/v1/files/{id}/versions/{version}/download
pub async fn download_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, version)): Path<(Uuid, i32)>,
) -> Result<Response, ApiError> {
    let file = state
        .file_service
        .download_version(&auth, id, version)
        .await?;
    attachment(file)
}

/// POST /api/v1/files/{id}/share
pub async fn share_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ShareFileRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FileShare>>), ApiError> {
    let share = state.file_service.share(&auth, id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(share))))
}

/// DELETE /api/v1/files/{id}/share/{user_id}
pub async fn revoke_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state.file_service.revoke_share(&auth, id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/files/{id}/visibility
pub async fn set_visibility(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<SetVisibilityRequest>,
) -> Result<Json<ApiResponse<FileDto>>, ApiError> {
    let file = state
        .file_service
        .set_visibility(&auth, id, req.visibility)
        .await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// POST /api/v1/files/{id}/transfer-ownership
pub async fn transfer_ownership(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<TransferOwnershipRequest>,
) -> Result<Json<ApiResponse<FileDto>>, ApiError> {
    let file = state
        .file_service
        .transfer_ownership(&auth, id, req.new_owner_id)
        .await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// GET /api/v1/files/{id}/share-link
pub async fn list_share_links(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<PublicLinkDto>>>, ApiError> {
    let links = state.link_service.list(&auth, id).await?;
    Ok(Json(ApiResponse::ok(links)))
}

/// POST /api/v1/files/{id}/share-link
pub async fn create_share_link(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<CreateShareLinkRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PublicLinkDto>>), ApiError> {
    let link = state.link_service.create(&auth, id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(link))))
}

/// DELETE /api/v1/files/{id}/share-link
pub async fn delete_share_links(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let removed = state.link_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(format!(
        "{removed} public link(s) deleted"
    )))))
}

/// PUT /api/v1/files/{id}/tags
pub async fn update_tags(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateTagsRequest>,
) -> Result<Json<ApiResponse<FileDto>>, ApiError> {
    let file = state.file_service.update_tags(&auth, id, req.tags).await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// POST /api/v1/files/{id}/favorite
pub async fn add_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.file_service.add_favorite(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/files/{id}/favorite
pub async fn remove_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.file_service.remove_favorite(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
