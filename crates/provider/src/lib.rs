#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # apigw-provider
//!
//! Declarative CRUD lifecycle driver for apigw cloud resources.
//!
//! This crate turns desired-state declarations into REST calls against the
//! control plane and blocks until the remote side confirms convergence or
//! failure. The load balancer is the representative resource: it carries a
//! nested member list and monitor block, each with independent diffing and
//! partial-update semantics.
//!
//! ## Layers
//!
//! - **Model**: strongly-typed attribute structs per resource kind
//!   ([`LoadBalancerSpec`], [`LoadBalancer`], [`Member`], [`Monitor`]).
//! - **Codec**: explicit bidirectional mapping between attribute structs
//!   and wire JSON, including diff suppression for reordered member lists.
//! - **Lifecycle**: the per-resource Create/Read/Update/Delete driver that
//!   sequences codec calls, transport calls, and convergence waits.
//! - **Registry**: thin glue binding resource kinds to their lifecycles.
//!
//! ## Example
//!
//! ```ignore
//! use apigw_provider::{LoadBalancerSpec, Member, Provider, ProviderConfig};
//!
//! let provider = Provider::configure(ProviderConfig::from_env())?;
//! let lifecycle = provider.loadbalancers("p1");
//!
//! let spec = LoadBalancerSpec::new("lb1", "ROUND_ROBIN", "HTTP", 80, "net1")
//!     .with_member(Member::new("10.0.0.1").with_port(8080));
//! let created = lifecycle.create(&spec).await?;
//! println!("load balancer {} is {}", created.id, created.status);
//! ```

pub mod error;
pub mod loadbalancer;
pub mod registry;
pub mod schema;

// Re-export commonly used items
pub use apigw_client::{ApigwClient, Method, ProviderConfig};
pub use error::{Error, Result};
pub use loadbalancer::lifecycle::{LoadBalancerLifecycle, OperationTimeouts};
pub use loadbalancer::lookup::LookupFilter;
pub use loadbalancer::members::members_equivalent;
pub use loadbalancer::model::{LoadBalancer, LoadBalancerChanges, LoadBalancerSpec, Member, Monitor};
pub use registry::Provider;
pub use schema::{loadbalancer_schema, AttrBehavior, AttrKind, AttrSpec, ResourceSchema};
