//! Client side of the new control-plane's administrative API.
//!
//! Entities are assembled with the fluent builders in [`builder`] and committed
//! through an [`AdminClient`], which hands back the identifier the control-plane
//! assigned.
pub mod builder;
pub mod client;
pub mod dry_run;
pub mod http;
pub mod types;

#[cfg(test)]
mod testutils;

pub use builder::{ApiBuilder, ClusterBuilder, ServerBuilder};
pub use client::{AdminClient, AdminError};
pub use dry_run::DryRunClient;
pub use http::HttpAdminClient;
pub use types::Id;
