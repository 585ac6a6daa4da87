//! Shared error mapping for the SQLite persistence layer

use std::fmt::Display;

use application::error::ApplicationError;
use tokio::task::JoinError;

/// Map a pool, SQLite or serialization error to an application-layer error
pub(crate) fn storage_error(e: impl Display) -> ApplicationError {
    ApplicationError::Storage(e.to_string())
}

/// Map a failed blocking task to an application-layer error
pub(crate) fn join_error(e: JoinError) -> ApplicationError {
    ApplicationError::Internal(format!("Blocking database task failed: {e}"))
}
