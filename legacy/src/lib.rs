pub mod consul;
pub mod etcd;
pub mod model;
pub mod store;

#[cfg(test)]
mod testutils;

pub use store::{LegacyStore, StoreError, open};
