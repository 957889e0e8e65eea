//! Per-user shares, permission levels, and public links.

pub mod link;
pub mod model;
pub mod permission;

pub use link::{CreatePublicLink, PublicLink};
pub use model::{CreateShare, FileShare};
pub use permission::FilePermission;
