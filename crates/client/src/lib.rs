#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # apigw-client
//!
//! Transport client and provider configuration for the apigw control plane.
//!
//! This crate owns the lowest layer of the provider: building authenticated
//! HTTP requests against the remote REST API and classifying responses into
//! typed errors. It performs no retries and holds no per-resource state; a
//! configured [`ApigwClient`] is read-only and safe to share across tasks.
//!
//! ## Example
//!
//! ```ignore
//! use apigw_client::{ApigwClient, ProviderConfig};
//!
//! let config = ProviderConfig::from_env();
//! let client = ApigwClient::new(config)?;
//! let body = client
//!     .request("p1", "api/v4/p1/loadbalancers/", reqwest::Method::GET, None)
//!     .await?;
//! ```

pub mod config;
pub mod error;
pub mod transport;

// Re-export commonly used items
pub use config::ProviderConfig;
pub use error::{Error, Result};
pub use reqwest::Method;
pub use transport::ApigwClient;
