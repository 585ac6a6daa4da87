//! Moka in-memory cache storage
//!
//! Each named cache is a moka cache keyed by request. Cache names are kept in
//! creation order so lookups across caches are deterministic.

use std::fmt;

use application::{error::ApplicationError, ports::CacheStoragePort};
use async_trait::async_trait;
use domain::{ResourceRequest, ResourceResponse};
use moka::future::Cache;
use parking_lot::RwLock;
use tracing::{debug, instrument};

use super::{ensure_storable, request_cache_key};

#[derive(Clone)]
struct NamedCache {
    name: String,
    entries: Cache<String, ResourceResponse>,
}

/// Moka-based in-memory cache storage
///
/// Caches are unbounded unless registered with
/// [`MokaCacheStorage::with_runtime_bound`]; only that cache is subject to
/// moka's size-based eviction. Nothing expires by time.
pub struct MokaCacheStorage {
    caches: RwLock<Vec<NamedCache>>,
    runtime_bound: Option<(String, u64)>,
}

impl fmt::Debug for MokaCacheStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.caches.read().iter().map(|c| c.name.clone()).collect();
        f.debug_struct("MokaCacheStorage")
            .field("caches", &names)
            .field("runtime_bound", &self.runtime_bound)
            .finish()
    }
}

impl Default for MokaCacheStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MokaCacheStorage {
    /// Create an empty storage with no size bounds
    #[must_use]
    pub fn new() -> Self {
        Self {
            caches: RwLock::new(Vec::new()),
            runtime_bound: None,
        }
    }

    /// Bound the named runtime cache to `max_entries`
    ///
    /// Precaches stay unbounded so an installed shell is never partially
    /// evicted.
    #[must_use]
    pub fn with_runtime_bound(mut self, cache_name: impl Into<String>, max_entries: u64) -> Self {
        self.runtime_bound = Some((cache_name.into(), max_entries.max(1)));
        self
    }

    fn find(&self, cache_name: &str) -> Option<Cache<String, ResourceResponse>> {
        self.caches
            .read()
            .iter()
            .find(|c| c.name == cache_name)
            .map(|c| c.entries.clone())
    }

    fn find_or_create(&self, cache_name: &str) -> Cache<String, ResourceResponse> {
        let mut caches = self.caches.write();
        if let Some(existing) = caches.iter().find(|c| c.name == cache_name) {
            return existing.entries.clone();
        }
        let entries = match &self.runtime_bound {
            Some((name, max_entries)) if name == cache_name => {
                Cache::builder().max_capacity(*max_entries).build()
            },
            _ => Cache::builder().build(),
        };
        caches.push(NamedCache {
            name: cache_name.to_string(),
            entries: entries.clone(),
        });
        debug!(cache = %cache_name, "Opened cache");
        entries
    }
}

#[async_trait]
impl CacheStoragePort for MokaCacheStorage {
    #[instrument(skip(self), level = "debug")]
    async fn open(&self, cache_name: &str) -> Result<(), ApplicationError> {
        self.find_or_create(cache_name);
        Ok(())
    }

    async fn has(&self, cache_name: &str) -> Result<bool, ApplicationError> {
        Ok(self.find(cache_name).is_some())
    }

    async fn keys(&self) -> Result<Vec<String>, ApplicationError> {
        Ok(self.caches.read().iter().map(|c| c.name.clone()).collect())
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, cache_name: &str) -> Result<bool, ApplicationError> {
        let removed = {
            let mut caches = self.caches.write();
            caches
                .iter()
                .position(|c| c.name == cache_name)
                .map(|index| caches.remove(index))
        };

        let Some(cache) = removed else {
            return Ok(false);
        };
        cache.entries.invalidate_all();
        debug!(cache = %cache_name, "Deleted cache");
        Ok(true)
    }

    #[instrument(skip(self), level = "debug", fields(url = %request.url))]
    async fn match_any(
        &self,
        request: &ResourceRequest,
    ) -> Result<Option<ResourceResponse>, ApplicationError> {
        let key = request_cache_key(request);
        let caches: Vec<NamedCache> = self.caches.read().clone();

        for cache in caches {
            if let Some(response) = cache.entries.get(&key).await {
                debug!(cache = %cache.name, "Cache hit");
                return Ok(Some(response));
            }
        }
        Ok(None)
    }

    async fn match_in(
        &self,
        cache_name: &str,
        request: &ResourceRequest,
    ) -> Result<Option<ResourceResponse>, ApplicationError> {
        match self.find(cache_name) {
            Some(entries) => Ok(entries.get(&request_cache_key(request)).await),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, response), level = "debug", fields(url = %request.url))]
    async fn put(
        &self,
        cache_name: &str,
        request: &ResourceRequest,
        response: &ResourceResponse,
    ) -> Result<(), ApplicationError> {
        ensure_storable(request)?;
        let entries = self.find_or_create(cache_name);
        entries
            .insert(request_cache_key(request), response.clone())
            .await;
        Ok(())
    }

    #[instrument(skip(self, entries), level = "debug", fields(count = entries.len()))]
    async fn put_all(
        &self,
        cache_name: &str,
        entries: &[(ResourceRequest, ResourceResponse)],
    ) -> Result<(), ApplicationError> {
        for (request, _) in entries {
            ensure_storable(request)?;
        }
        let cache = self.find_or_create(cache_name);
        for (request, response) in entries {
            cache
                .insert(request_cache_key(request), response.clone())
                .await;
        }
        Ok(())
    }

    async fn entry_count(&self, cache_name: &str) -> Result<usize, ApplicationError> {
        let Some(entries) = self.find(cache_name) else {
            return Ok(0);
        };
        entries.run_pending_tasks().await;
        Ok(usize::try_from(entries.entry_count()).unwrap_or(usize::MAX))
    }
}
