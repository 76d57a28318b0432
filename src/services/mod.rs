//! Asynchronous services and external integrations
//!
//! Listing backends and, for the binary, logging setup.

pub mod listing;
#[cfg(feature = "runtime")]
pub mod tracing_setup;
