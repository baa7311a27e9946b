//! Error types for the convergence poller.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for convergence operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while waiting for a resource to converge.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Polling exceeded the configured deadline while still pending.
    #[error("timed out after {waited:?} waiting for target state (last state: '{last_state}')")]
    Timeout { last_state: String, waited: Duration },

    /// The refresh source observed a state in the declared error set.
    #[error("resource entered error state '{state}'")]
    ErrorState { state: String },

    /// The refresh source observed a state outside every declared set.
    #[error("unexpected state '{state}' not in pending, target, or error sets")]
    UnexpectedState { state: String },

    /// The wait was aborted through its stop handle.
    #[error("wait was stopped before reaching a target state")]
    Stopped,

    /// The refresh source itself failed.
    #[error("refresh failed: {reason}")]
    Refresh { reason: String },
}

impl Error {
    /// Create a timeout error.
    pub fn timeout(last_state: impl Into<String>, waited: Duration) -> Self {
        Self::Timeout {
            last_state: last_state.into(),
            waited,
        }
    }

    /// Create an error-state error.
    pub fn error_state(state: impl Into<String>) -> Self {
        Self::ErrorState {
            state: state.into(),
        }
    }

    /// Create an unexpected-state error.
    pub fn unexpected_state(state: impl Into<String>) -> Self {
        Self::UnexpectedState {
            state: state.into(),
        }
    }

    /// Create a refresh error.
    pub fn refresh(reason: impl Into<String>) -> Self {
        Self::Refresh {
            reason: reason.into(),
        }
    }

    /// Whether this error is a convergence timeout.
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether the remote rejected the operation via an error state.
    pub const fn is_error_state(&self) -> bool {
        matches!(self, Self::ErrorState { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display_carries_last_state() {
        let err = Error::timeout("BUILD", Duration::from_secs(900));
        assert!(err.to_string().contains("BUILD"));
        assert!(err.is_timeout());
        assert!(!err.is_error_state());
    }

    #[test]
    fn test_error_state_is_distinct_from_timeout() {
        let err = Error::error_state("ERROR");
        assert!(err.is_error_state());
        assert!(!err.is_timeout());
    }
}
