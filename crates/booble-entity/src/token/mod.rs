//! Refresh tokens.

pub mod refresh;

pub use refresh::{CreateRefreshToken, RefreshToken};
