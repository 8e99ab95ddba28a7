//! Custom error types for the common library
//!
//! Every failure reported by the remote backend, or by the code talking to
//! it, is one of the [`BackendError`] kinds below.

use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Closed set of failures for backend operations
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend rejected the request payload (HTTP 400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// No valid session, or bad credentials (HTTP 401)
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// The session lacks the permission for this resource (HTTP 403)
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource does not exist (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other non-success status
    #[error("Backend error ({code}): {message}")]
    Server { code: u16, message: String },

    /// Transport failure before a response was received
    #[error("Network error: {0}")]
    Network(#[source] ReqwestError),

    /// Response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl BackendError {
    /// Map an HTTP status and the backend's error message onto an error kind
    pub fn from_status(code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            400 => BackendError::Validation(message),
            401 => BackendError::Unauthorized(message),
            403 => BackendError::Forbidden(message),
            404 => BackendError::NotFound(message),
            409 => BackendError::Conflict(message),
            _ => BackendError::Server { code, message },
        }
    }

    /// True when the failure means nobody is signed in
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BackendError::Unauthorized(_))
    }
}

impl From<ReqwestError> for BackendError {
    fn from(err: ReqwestError) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Network(err)
        }
    }
}

/// Type alias for Result with BackendError
pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_known_codes() {
        assert!(matches!(
            BackendError::from_status(400, "bad"),
            BackendError::Validation(_)
        ));
        assert!(BackendError::from_status(401, "no session").is_unauthorized());
        assert!(matches!(
            BackendError::from_status(403, "denied"),
            BackendError::Forbidden(_)
        ));
        assert!(matches!(
            BackendError::from_status(404, "missing"),
            BackendError::NotFound(_)
        ));
        assert!(matches!(
            BackendError::from_status(409, "exists"),
            BackendError::Conflict(_)
        ));
    }

    #[test]
    fn test_from_status_keeps_unknown_code() {
        let err = BackendError::from_status(503, "maintenance");
        match err {
            BackendError::Server { code, message } => {
                assert_eq!(code, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }
}
