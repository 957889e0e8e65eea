//! # booble-service
//!
//! Business logic service layer for BoobleDrive. Each service orchestrates
//! repositories, hashing, and authentication to implement application-level
//! use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod file;
pub mod share;
pub mod tag;
pub mod user;

pub use context::RequestContext;
pub use file::{FileService, ThumbnailService, UploadService};
pub use share::PublicLinkService;
pub use tag::TagService;
pub use user::UserService;
