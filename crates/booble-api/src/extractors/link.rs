//! Password supplied for a protected public link.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;

use crate::error::ApiError;

/// Header carrying a public link password.
pub const LINK_PASSWORD_HEADER: &str = "x-link-password";

/// Link password from the `X-Link-Password` header or the `password` query
/// parameter. The header wins when both are present.
#[derive(Debug, Clone, Default)]
pub struct LinkPassword(pub Option<String>);

impl LinkPassword {
    /// Borrow the password, if any.
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[derive(Debug, Deserialize)]
struct PasswordQuery {
    password: Option<String>,
}

impl<S> FromRequestParts<S> for LinkPassword
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(LINK_PASSWORD_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if header.is_some() {
            return Ok(Self(header));
        }

        let Query(query) = Query::<PasswordQuery>::from_request_parts(parts, state).await?;
        Ok(Self(query.password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> LinkPassword {
        let (mut parts, _) = req.into_parts();
        LinkPassword::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_header_takes_precedence() {
        let req = Request::builder()
            .uri("/public/abc?password=query")
            .header(LINK_PASSWORD_HEADER, "header")
            .body(())
            .unwrap();
        assert_eq!(extract(req).await.as_deref(), Some("header"));
    }

    #[tokio::test]
    async fn test_query_fallback() {
        let req = Request::builder()
            .uri("/public/abc?password=s3cret")
            .body(())
            .unwrap();
        assert_eq!(extract(req).await.as_deref(), Some("s3cret"));
    }

    #[tokio::test]
    async fn test_absent() {
        let req = Request::builder().uri("/public/abc").body(()).unwrap();
        assert_eq!(extract(req).await.as_deref(), None);
    }
}
