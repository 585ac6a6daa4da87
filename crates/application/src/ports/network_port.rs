//! Network port
//!
//! The fetch primitive the offline cache falls back to on a miss.

use async_trait::async_trait;
use domain::{ResourceRequest, ResourceResponse};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for performing network requests
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NetworkPort: Send + Sync {
    /// Perform the request and capture the full response
    ///
    /// Non-2xx statuses are returned as responses, not errors. Errors are
    /// reserved for transport failures (DNS, connection, timeout).
    async fn fetch(&self, request: &ResourceRequest) -> Result<ResourceResponse, ApplicationError>;
}
