//! Multipart extractor with JSON rejections.

use axum::extract::{FromRequest, Multipart, Request};

use crate::error::ApiError;

/// `Multipart` whose rejection (wrong content type, missing boundary) is an
/// [`ApiError`]. Errors while reading fields convert through `?` as usual.
pub struct ApiMultipart(pub Multipart);

impl<S> FromRequest<S> for ApiMultipart
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(Multipart::from_request(req, state).await?))
    }
}
