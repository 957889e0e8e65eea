//! Repository implementations for all BoobleDrive entities.

pub mod file;
pub mod link;
pub mod refresh_token;
pub mod share;
pub mod tag;
pub mod user;

pub use file::{FileQuery, FileRepository};
pub use link::PublicLinkRepository;
pub use refresh_token::RefreshTokenRepository;
pub use share::ShareRepository;
pub use tag::TagRepository;
pub use user::UserRepository;
