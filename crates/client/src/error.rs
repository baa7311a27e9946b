//! Error types for the transport layer.

use thiserror::Error;

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the control plane.
#[derive(Error, Debug)]
pub enum Error {
    /// Required configuration is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// The remote resource does not exist (HTTP 404).
    ///
    /// Callers use this to distinguish "deleted" from "failed"; the deletion
    /// refresh path reinterprets it as a terminal state.
    #[error("resource not found: {path}")]
    NotFound { path: String },

    /// The control plane rejected the request (non-2xx other than 404).
    #[error("request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    /// HTTP error from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint URL could not be parsed.
    #[error("invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// I/O error while loading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a request-failed error.
    pub fn request_failed(status: u16, body: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            body: body.into(),
        }
    }

    /// Whether this error is the distinguished 404 kind.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_predicate() {
        assert!(Error::not_found("api/v4/p1/loadbalancers/1/").is_not_found());
        assert!(!Error::request_failed(500, "boom").is_not_found());
    }

    #[test]
    fn test_request_failed_display() {
        let err = Error::request_failed(503, "maintenance");
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("maintenance"));
    }
}
