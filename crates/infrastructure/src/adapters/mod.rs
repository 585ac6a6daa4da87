//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod tracing_error_reporter;

pub use tracing_error_reporter::TracingErrorReporter;
