//! Public link management and resolution.

pub mod link;

pub use link::{CreateLinkRequest, PublicLinkDto, PublicLinkService};
