//! Error types for search collaborators.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for collaborator operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while talking to a search backend.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The backend rejected or failed the request.
    #[error("Search backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// Request timed out.
    #[error("Search request timed out after {0:?}")]
    Timeout(Duration),

    /// A row range was requested that the view cannot provide.
    #[error("Rows {start}..{end} are not available")]
    NotLoaded { start: usize, end: usize },

    /// The catalog backing an in-memory service is malformed.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// The request was dropped before a response was produced.
    #[error("Search request was abandoned")]
    Abandoned,

    /// IO error while reading a catalog.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error while decoding a catalog.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Check if this error is transient and a later query may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Abandoned => true,
            Self::Backend { status, .. } => Self::is_transient_status(*status),
            Self::NotLoaded { .. } | Self::InvalidCatalog(_) | Self::Io(_) | Self::Json(_) => {
                false
            }
        }
    }

    /// Check if a backend status code describes a transient failure.
    ///
    /// Transient: 429, 502, 503, 504. Everything else is treated as a
    /// permanent answer for the given query.
    pub fn is_transient_status(status: u16) -> bool {
        matches!(status, 429 | 502 | 503 | 504)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_transient() {
        let err = ClientError::Timeout(Duration::from_secs(1));
        assert!(err.is_transient());
    }

    #[test]
    fn test_backend_status_classification() {
        let err = ClientError::Backend {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert!(err.is_transient());

        let err = ClientError::Backend {
            status: 400,
            message: "bad query".to_string(),
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn test_catalog_errors_are_permanent() {
        assert!(!ClientError::InvalidCatalog("empty uid".to_string()).is_transient());
        assert!(!ClientError::NotLoaded { start: 0, end: 5 }.is_transient());
    }

    #[test]
    fn test_error_messages() {
        let err = ClientError::Backend {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Search backend error (500): boom");
        assert_eq!(
            ClientError::NotLoaded { start: 10, end: 20 }.to_string(),
            "Rows 10..20 are not available"
        );
    }
}
