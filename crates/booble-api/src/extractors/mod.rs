//! Custom Axum extractors.

pub mod auth;
pub mod link;
pub mod multipart;
pub mod pagination;
pub mod query;
pub mod validated;

pub use auth::AuthUser;
pub use link::LinkPassword;
pub use multipart::ApiMultipart;
pub use pagination::PaginationParams;
pub use query::ApiQuery;
pub use validated::ValidatedJson;
