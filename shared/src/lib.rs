pub mod http;
pub mod logging;
#[cfg(feature = "testutils")]
pub mod testutils;
