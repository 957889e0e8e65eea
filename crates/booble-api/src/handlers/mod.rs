//! Request handlers, one module per resource.

pub mod file;
pub mod health;
pub mod public;
pub mod tag;
pub mod thumbnail;
pub mod upload;
pub mod user;

use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::Response;

use booble_core::error::AppError;
use booble_service::file::DownloadedFile;

use crate::error::ApiError;

/// Builds an attachment response for downloaded content.
pub(crate) fn attachment(file: DownloadedFile) -> Result<Response, ApiError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", disposition_name(&file.name)),
        )
        .header(header::CONTENT_LENGTH, file.data.len())
        .body(Body::from(file.data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")).into())
}

/// Header-safe rendition of a file name for `Content-Disposition`.
fn disposition_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_control() || !c.is_ascii() => '_',
            c => c,
        })
        .collect()
}
