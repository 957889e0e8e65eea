//! Access log line per request.

use std::time::Instant;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;

/// Records method, path, status, and latency once the response is ready.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = redact_link_tokens(request.uri().path());
    let started = Instant::now();

    let response = next.run(request).await;

    let status: StatusCode = response.status();
    let duration_ms = started.elapsed().as_millis() as u64;
    if status.is_server_error() {
        tracing::warn!(%method, %path, status = status.as_u16(), duration_ms, "Request failed");
    } else {
        tracing::info!(%method, %path, status = status.as_u16(), duration_ms, "Request served");
    }

    response
}

/// Public link tokens are bearer secrets; keep them out of the logs.
fn redact_link_tokens(path: &str) -> String {
    let mut redact_next = false;
    path.split('/')
        .map(|segment| {
            let out = if redact_next { "***" } else { segment };
            redact_next = segment == "public";
            out
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_tokens_are_redacted() {
        assert_eq!(
            redact_link_tokens("/api/v1/public/abc123/download"),
            "/api/v1/public/***/download"
        );
        assert_eq!(
            redact_link_tokens("/api/v1/thumbnails/public/abc123"),
            "/api/v1/thumbnails/public/***"
        );
        assert_eq!(redact_link_tokens("/api/v1/files/42"), "/api/v1/files/42");
    }
}
