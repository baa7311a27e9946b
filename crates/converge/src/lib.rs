#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # apigw-converge
//!
//! Generic state-convergence poller for asynchronous control-plane
//! resources.
//!
//! Remote resources transition through operational states after an API call
//! (`BUILD` → `ACTIVE`, `DELETING` → gone, ...). This crate drives that
//! convergence: it repeatedly invokes a refresh source, classifies the
//! returned status string against declared state sets, and resolves to
//! success, failure, or timeout.
//!
//! ## State sets
//!
//! - **Pending**: keep waiting; sleep one interval and refresh again.
//! - **Target**: success; the last observation is returned.
//! - **Error**: the remote rejected the operation; surfaced distinctly from
//!   a timeout so callers can tell "remote rejected" from "took too long".
//!
//! A status in none of the three sets fails with an unexpected-state error,
//! which indicates API contract drift.
//!
//! ## Example
//!
//! ```ignore
//! use apigw_converge::{StateSource, StateWaiter, WaitConfig};
//!
//! let config = WaitConfig::new(["BUILD"], ["ACTIVE", "DOWN"])
//!     .with_error_states(["ERROR"]);
//! let waiter = StateWaiter::new(config);
//! let observation = waiter.wait(&mut source).await?;
//! ```

pub mod error;
pub mod waiter;

// Re-export commonly used items
pub use error::{Error, Result};
pub use waiter::{Observation, StateSource, StateWaiter, StopHandle, WaitConfig};
