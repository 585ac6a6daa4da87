//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Durable storage failed (unavailable, quota exceeded, corrupt)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Network request failed
    #[error("Network error: {0}")]
    Network(String),

    /// Operation not valid in the current lifecycle state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApplicationError::Storage(_) | ApplicationError::Network(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_and_network_errors_are_retryable() {
        assert!(ApplicationError::Storage("quota exceeded".into()).is_retryable());
        assert!(ApplicationError::Network("connection reset".into()).is_retryable());
    }

    #[test]
    fn state_errors_are_not_retryable() {
        assert!(!ApplicationError::InvalidState("not waiting".into()).is_retryable());
        assert!(!ApplicationError::Configuration("bad manifest".into()).is_retryable());
    }

    #[test]
    fn domain_error_is_transparent() {
        let err: ApplicationError = DomainError::InvalidRequestMethod("BREW".into()).into();
        assert_eq!(err.to_string(), "Invalid request method: BREW");
    }
}
