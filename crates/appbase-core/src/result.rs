//! Convenience result type alias for Appbase.

use crate::error::AppError;

/// A specialized `Result` type for Appbase operations.
pub type AppResult<T> = Result<T, AppError>;
