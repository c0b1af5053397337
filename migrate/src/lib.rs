pub mod config;
pub mod errors;
pub mod ids;
pub mod pipeline;

#[cfg(test)]
mod testutils;

pub use errors::MigrateError;
pub use pipeline::{Migration, PhaseReport, Summary};
