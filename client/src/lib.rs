//! Client for the laboratory dashboard GraphQL API.
//!
//! The crate has two layers:
//! - [`api`] and [`LabClient`]: one typed operation per query or mutation of the schema, executed over HTTP.
//! - [`orchestration`]: screen-level view models that track action state, share a query cache
//!   and drive the experiment script workflow.

/// Current laboratory client API.
pub mod api;
mod client;
/// Errors returned by the laboratory client.
pub mod errors;
pub mod orchestration;

#[cfg(any(test, feature = "testing"))]
pub use client::{InjectedFailure, LabTestClient, LabTestState, TestAccount};
pub use client::{LabClient, LabClientConfig};
