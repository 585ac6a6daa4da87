//! Cache storage port
//!
//! A set of named caches, each mapping GET requests to captured responses.
//! Mirrors the cache-storage primitive of the hosting platform so the
//! offline cache service can run against SQLite, memory or a test fake.

use async_trait::async_trait;
use domain::{ResourceRequest, ResourceResponse};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for named response caches
///
/// Implementations must be safe for concurrent reads and inserts.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CacheStoragePort: Send + Sync {
    /// Open a cache, creating it if absent
    async fn open(&self, cache_name: &str) -> Result<(), ApplicationError>;

    /// Whether a cache with this name exists
    async fn has(&self, cache_name: &str) -> Result<bool, ApplicationError>;

    /// Names of all existing caches, in creation order
    async fn keys(&self) -> Result<Vec<String>, ApplicationError>;

    /// Delete a cache and all of its entries
    ///
    /// # Returns
    /// true if the cache existed
    async fn delete(&self, cache_name: &str) -> Result<bool, ApplicationError>;

    /// Look a request up across every cache, in creation order
    async fn match_any(
        &self,
        request: &ResourceRequest,
    ) -> Result<Option<ResourceResponse>, ApplicationError>;

    /// Look a request up in a single cache
    async fn match_in(
        &self,
        cache_name: &str,
        request: &ResourceRequest,
    ) -> Result<Option<ResourceResponse>, ApplicationError>;

    /// Store a response, opening the cache if needed
    ///
    /// Only GET requests are accepted.
    async fn put(
        &self,
        cache_name: &str,
        request: &ResourceRequest,
        response: &ResourceResponse,
    ) -> Result<(), ApplicationError>;

    /// Store several responses atomically: either all entries are written or none
    async fn put_all(
        &self,
        cache_name: &str,
        entries: &[(ResourceRequest, ResourceResponse)],
    ) -> Result<(), ApplicationError>;

    /// Number of entries in a cache (0 if it does not exist)
    async fn entry_count(&self, cache_name: &str) -> Result<usize, ApplicationError>;
}
