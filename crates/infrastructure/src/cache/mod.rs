//! Cache storage implementations
//!
//! Provides `CacheStoragePort` adapters for the offline cache service:
//! - `MokaCacheStorage`: bounded in-memory caches, lost on exit
//! - `SqliteCacheStorage`: durable caches in the application database
//! - `OriginScopedCacheStorage`: resolves request URLs against the origin
//!   before delegating to either of the above

mod moka_cache_storage;
mod origin_scoped_storage;
mod sqlite_cache_storage;

use application::error::ApplicationError;
use domain::{DomainError, ResourceRequest};

pub use moka_cache_storage::MokaCacheStorage;
pub use origin_scoped_storage::OriginScopedCacheStorage;
pub use sqlite_cache_storage::SqliteCacheStorage;

/// Generate a cache key from components using blake3 hash
///
/// This ensures consistent key generation across the application
/// and handles variable-length inputs efficiently.
#[must_use]
pub fn generate_cache_key(prefix: &str, components: &[&str]) -> String {
    let mut hasher = blake3::Hasher::new();
    for component in components {
        hasher.update(component.as_bytes());
        hasher.update(b"|"); // Separator to avoid collisions
    }
    let hash = hasher.finalize();
    format!("{}:{}", prefix, hash.to_hex())
}

/// Cache key of a request: method and URL
#[must_use]
pub fn request_cache_key(request: &ResourceRequest) -> String {
    generate_cache_key("resource", &[request.method.as_str(), &request.url])
}

/// Reject requests that can never be stored
fn ensure_storable(request: &ResourceRequest) -> Result<(), ApplicationError> {
    if request.is_cacheable() {
        Ok(())
    } else {
        Err(DomainError::InvalidRequestMethod(format!(
            "{} requests cannot be cached",
            request.method
        ))
        .into())
    }
}
