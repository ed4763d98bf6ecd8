//! Convenience result type alias for crowdstore.

use crate::error::AppError;

/// A specialized `Result` type for crowdstore operations.
pub type AppResult<T> = Result<T, AppError>;
