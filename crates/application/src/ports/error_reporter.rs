//! Error reporting port
//!
//! The external structured logger that receives failures the core recovers
//! from locally instead of returning to the caller.

#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for reporting recovered errors with a context tag
#[cfg_attr(test, automock)]
pub trait ErrorReporterPort: Send + Sync {
    /// Report an error together with the component it came from
    fn report(&self, error: &ApplicationError, context: &str);
}
