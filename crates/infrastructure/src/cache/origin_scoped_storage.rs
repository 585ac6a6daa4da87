//! Origin-scoped cache storage
//!
//! Requests reach the cache with whatever URL the caller used: a path such
//! as `/index.html` or the same resource spelled as an absolute URL. This
//! wrapper resolves every request URL against the application origin before
//! delegating, so both spellings share one entry.

use std::sync::Arc;

use application::{error::ApplicationError, ports::CacheStoragePort};
use async_trait::async_trait;
use domain::{ResourceRequest, ResourceResponse};
use reqwest::Url;

use crate::http::resolve_url;

/// `CacheStoragePort` decorator keying entries by absolute URL
pub struct OriginScopedCacheStorage {
    inner: Arc<dyn CacheStoragePort>,
    origin: Url,
}

impl std::fmt::Debug for OriginScopedCacheStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OriginScopedCacheStorage")
            .field("origin", &self.origin.as_str())
            .finish_non_exhaustive()
    }
}

impl OriginScopedCacheStorage {
    /// Wrap a storage, resolving relative URLs against `origin`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `origin` is not an absolute URL.
    pub fn new(inner: Arc<dyn CacheStoragePort>, origin: &str) -> Result<Self, ApplicationError> {
        let origin = Url::parse(origin).map_err(|e| {
            ApplicationError::Configuration(format!("invalid origin {origin}: {e}"))
        })?;
        Ok(Self { inner, origin })
    }

    /// Request with its URL in canonical absolute form
    ///
    /// URLs that cannot be resolved are passed on unchanged.
    fn scoped(&self, request: &ResourceRequest) -> ResourceRequest {
        match resolve_url(&self.origin, &request.url) {
            Some(url) => ResourceRequest::new(request.method, url.as_str()),
            None => request.clone(),
        }
    }
}

#[async_trait]
impl CacheStoragePort for OriginScopedCacheStorage {
    async fn open(&self, cache_name: &str) -> Result<(), ApplicationError> {
        self.inner.open(cache_name).await
    }

    async fn has(&self, cache_name: &str) -> Result<bool, ApplicationError> {
        self.inner.has(cache_name).await
    }

    async fn keys(&self) -> Result<Vec<String>, ApplicationError> {
        self.inner.keys().await
    }

    async fn delete(&self, cache_name: &str) -> Result<bool, ApplicationError> {
        self.inner.delete(cache_name).await
    }

    async fn match_any(
        &self,
        request: &ResourceRequest,
    ) -> Result<Option<ResourceResponse>, ApplicationError> {
        self.inner.match_any(&self.scoped(request)).await
    }

    async fn match_in(
        &self,
        cache_name: &str,
        request: &ResourceRequest,
    ) -> Result<Option<ResourceResponse>, ApplicationError> {
        self.inner.match_in(cache_name, &self.scoped(request)).await
    }

    async fn put(
        &self,
        cache_name: &str,
        request: &ResourceRequest,
        response: &ResourceResponse,
    ) -> Result<(), ApplicationError> {
        self.inner
            .put(cache_name, &self.scoped(request), response)
            .await
    }

    async fn put_all(
        &self,
        cache_name: &str,
        entries: &[(ResourceRequest, ResourceResponse)],
    ) -> Result<(), ApplicationError> {
        let scoped: Vec<_> = entries
            .iter()
            .map(|(request, response)| (self.scoped(request), response.clone()))
            .collect();
        self.inner.put_all(cache_name, &scoped).await
    }

    async fn entry_count(&self, cache_name: &str) -> Result<usize, ApplicationError> {
        self.inner.entry_count(cache_name).await
    }
}
