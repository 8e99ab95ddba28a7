//! Custom error types for the data-access layer

use common::BackendError;
use thiserror::Error;

/// Custom error type for data-access operations
#[derive(Error, Debug)]
pub enum ApiError {
    /// Input rejected before any backend call
    #[error("Validation error: {0}")]
    Validation(String),

    /// File type other than "image" or "video"
    #[error("Invalid File Type: {0}")]
    InvalidFileType(String),

    /// Failure reported by the backend
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ApiError {
    /// True when the backend reported that nobody is signed in
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Backend(err) if err.is_unauthorized())
    }
}

/// Type alias for data-access results
pub type ApiResult<T> = Result<T, ApiError>;
