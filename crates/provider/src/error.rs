//! Error types for resource lifecycles.
//!
//! Every failure bubbles to the orchestrator call boundary with the
//! operation, resource, and platform attached. Nothing is silently
//! swallowed; the one intentional translation (404 during a deletion wait
//! becoming the `DELETED` state) happens in the refresh source, not here.

use thiserror::Error;

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a resource lifecycle.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration or transport failure outside any single operation.
    #[error(transparent)]
    Client(#[from] apigw_client::Error),

    /// A transport call issued by a lifecycle operation failed.
    #[error("{op} of load balancer '{resource}' on {platform} failed: {source}")]
    Transport {
        op: &'static str,
        resource: String,
        platform: String,
        #[source]
        source: apigw_client::Error,
    },

    /// A convergence wait issued by a lifecycle operation failed.
    #[error("load balancer '{resource}' on {platform} did not converge during {op}: {source}")]
    Converge {
        op: &'static str,
        resource: String,
        platform: String,
        #[source]
        source: apigw_converge::Error,
    },

    /// The remote returned a body the codec could not interpret.
    #[error("failed to decode {context}: {reason}")]
    Decode {
        context: &'static str,
        reason: String,
    },

    /// A request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// The base resource was created but a follow-up step failed.
    ///
    /// The remote ID is already committed; the host should record it and
    /// resume with an update rather than re-create.
    #[error("load balancer {id} on {platform} was created but applying members failed: {source}")]
    CreateIncomplete {
        id: u64,
        platform: String,
        #[source]
        source: Box<Error>,
    },

    /// A lookup filter failed validation before any request was made.
    #[error("invalid lookup filter: {reason}")]
    InvalidFilter { reason: String },

    /// A lookup matched no resource by name.
    #[error("no load balancer named '{name}' on {platform}")]
    LookupMiss { name: String, platform: String },
}

impl Error {
    /// Create a transport error with operation context.
    pub fn transport(
        op: &'static str,
        resource: impl Into<String>,
        platform: impl Into<String>,
        source: apigw_client::Error,
    ) -> Self {
        Self::Transport {
            op,
            resource: resource.into(),
            platform: platform.into(),
            source,
        }
    }

    /// Create a convergence error with operation context.
    pub fn converge(
        op: &'static str,
        resource: impl Into<String>,
        platform: impl Into<String>,
        source: apigw_converge::Error,
    ) -> Self {
        Self::Converge {
            op,
            resource: resource.into(),
            platform: platform.into(),
            source,
        }
    }

    /// Create a decode error.
    pub fn decode(context: &'static str, reason: impl Into<String>) -> Self {
        Self::Decode {
            context,
            reason: reason.into(),
        }
    }

    /// Create a partial-creation error carrying the committed remote ID.
    pub fn create_incomplete(id: u64, platform: impl Into<String>, source: Self) -> Self {
        Self::CreateIncomplete {
            id,
            platform: platform.into(),
            source: Box::new(source),
        }
    }

    /// Create an invalid-filter error.
    pub fn invalid_filter(reason: impl Into<String>) -> Self {
        Self::InvalidFilter {
            reason: reason.into(),
        }
    }

    /// Create a lookup-miss error.
    pub fn lookup_miss(name: impl Into<String>, platform: impl Into<String>) -> Self {
        Self::LookupMiss {
            name: name.into(),
            platform: platform.into(),
        }
    }

    /// Whether the underlying cause is the distinguished 404 kind.
    ///
    /// Hosts use this on Read to treat the resource as no longer existing.
    pub const fn is_not_found(&self) -> bool {
        match self {
            Self::Client(source) | Self::Transport { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Whether a convergence wait timed out.
    pub const fn is_converge_timeout(&self) -> bool {
        matches!(
            self,
            Self::Converge { source, .. } if source.is_timeout()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_context_in_message() {
        let err = Error::transport(
            "create",
            "lb1",
            "p1",
            apigw_client::Error::request_failed(500, "boom"),
        );
        let message = err.to_string();
        assert!(message.contains("create"));
        assert!(message.contains("lb1"));
        assert!(message.contains("p1"));
    }

    #[test]
    fn test_not_found_passes_through_context() {
        let err = Error::transport(
            "read",
            "7",
            "p1",
            apigw_client::Error::not_found("api/v4/p1/loadbalancers/7/"),
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn test_converge_timeout_predicate() {
        let err = Error::converge(
            "create",
            "7",
            "p1",
            apigw_converge::Error::timeout("BUILD", std::time::Duration::from_secs(900)),
        );
        assert!(err.is_converge_timeout());
        assert!(!err.is_not_found());
    }
}
