//! Logging infrastructure
//!
//! Structured logging through `tracing` and `tracing-subscriber`.

mod subscriber;

pub use subscriber::{TelemetryError, build_filter, init_tracing};
