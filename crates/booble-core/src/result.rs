//! Convenience result type alias for BoobleDrive.

use crate::error::AppError;

/// A specialized `Result` type for BoobleDrive operations.
pub type AppResult<T> = Result<T, AppError>;
