//! Error reporter that writes recovered failures to the tracing pipeline

use std::sync::atomic::{AtomicU64, Ordering};

use application::{error::ApplicationError, ports::ErrorReporterPort};
use tracing::error;

/// `ErrorReporterPort` implementation emitting structured `error!` events
#[derive(Debug, Default)]
pub struct TracingErrorReporter {
    reported: AtomicU64,
}

impl TracingErrorReporter {
    /// Create a new reporter
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reported: AtomicU64::new(0),
        }
    }

    /// Number of errors reported so far
    pub fn reported(&self) -> u64 {
        self.reported.load(Ordering::Relaxed)
    }
}

impl ErrorReporterPort for TracingErrorReporter {
    fn report(&self, error: &ApplicationError, context: &str) {
        self.reported.fetch_add(1, Ordering::Relaxed);
        error!(
            context,
            error = %error,
            retryable = error.is_retryable(),
            "Recovered error"
        );
    }
}
