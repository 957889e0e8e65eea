//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use booble_core::error::{AppError, ErrorKind};

/// Message returned in place of internal error details.
const INTERNAL_MESSAGE: &str = "An unexpected error occurred";

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Optional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error type returned by every handler.
///
/// Wraps [`AppError`] so the HTTP mapping can live in this crate.
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    details: Option<serde_json::Value>,
}

impl ApiError {
    /// Attaches structured details to the response body.
    pub fn with_details(error: AppError, details: serde_json::Value) -> Self {
        Self {
            error,
            details: Some(details),
        }
    }

    /// Builds a validation error from field-level `validator` failures.
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let error = AppError::validation(format!("Validation failed: {errors}"));
        match serde_json::to_value(&errors) {
            Ok(details) => Self::with_details(error, details),
            Err(_) => error.into(),
        }
    }

    /// The category of the wrapped error.
    pub fn kind(&self) -> ErrorKind {
        self.error.kind
    }

    /// The wrapped error.
    pub fn inner(&self) -> &AppError {
        &self.error
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self {
            error,
            details: None,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation(format!("Invalid JSON body: {}", rejection.body_text())).into()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation(format!("Invalid query string: {}", rejection.body_text())).into()
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::payload_too_large("Request body exceeds the configured limit").into();
        }
        AppError::validation(format!("Invalid multipart body: {}", err.body_text())).into()
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::validation(format!("Invalid multipart body: {}", rejection.body_text())).into()
    }
}

/// HTTP status for an error category.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
        ErrorKind::Authorization => StatusCode::FORBIDDEN,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.error.kind);

        let body = if self.error.kind.is_server_side() {
            tracing::error!(
                kind = %self.error.kind,
                error = %self.error.message,
                source = ?self.error.source,
                "Internal server error"
            );
            ApiErrorResponse {
                error: self.error.kind.code().to_string(),
                message: INTERNAL_MESSAGE.to_string(),
                details: None,
            }
        } else {
            ApiErrorResponse {
                error: self.error.kind.code().to_string(),
                message: self.error.message,
                details: self.details,
            }
        };

        (status, Json(body)).into_response()
    }
}
