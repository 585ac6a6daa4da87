//! Service wiring
//!
//! Builds the SQLite pool once and hands out the adapters and services the
//! commands need.

use std::sync::Arc;

use anyhow::Context;
use application::{AutosaveService, ErrorReporterPort, OfflineCacheService, ports::CacheStoragePort};
use infrastructure::{
    AppConfig, CacheBackend, ConnectionPool, MokaCacheStorage, NetworkClientConfig,
    OriginScopedCacheStorage, ReqwestNetworkAdapter, SqliteCacheStorage, SqliteDraftStore,
    SqlitePromptQueue, TracingErrorReporter, create_pool,
};
use tracing::debug;

/// Configured adapters sharing one connection pool
#[derive(Debug)]
pub struct App {
    config: AppConfig,
    pool: Arc<ConnectionPool>,
}

impl App {
    /// Open the database and run migrations
    pub fn open(config: AppConfig) -> anyhow::Result<Self> {
        let pool = create_pool(&config.database)
            .with_context(|| format!("failed to open database {}", config.database.path))?;
        debug!(path = %config.database.path, "Database ready");
        Ok(Self {
            config,
            pool: Arc::new(pool),
        })
    }

    /// Loaded configuration
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Draft autosave service over the SQLite draft store
    pub fn autosave(&self) -> AutosaveService {
        let reporter: Arc<dyn ErrorReporterPort> = Arc::new(TracingErrorReporter::new());
        AutosaveService::new(
            Arc::new(SqliteDraftStore::new(Arc::clone(&self.pool))),
            reporter,
            self.config.autosave.to_settings(),
        )
    }

    /// Offline prompt queue
    pub fn prompt_queue(&self) -> Arc<SqlitePromptQueue> {
        Arc::new(SqlitePromptQueue::new(Arc::clone(&self.pool)))
    }

    /// Cache storage for the configured backend
    pub fn cache_storage(&self) -> Arc<dyn CacheStoragePort> {
        match self.config.offline_cache.backend {
            CacheBackend::Memory => Arc::new(MokaCacheStorage::new().with_runtime_bound(
                self.config.offline_cache.generation().runtime_name(),
                self.config.offline_cache.max_runtime_entries,
            )),
            CacheBackend::Sqlite => Arc::new(SqliteCacheStorage::new(Arc::clone(&self.pool))),
        }
    }

    /// Offline cache service over the configured storage and origin
    ///
    /// Cache entries are keyed by absolute URL, so a path and the same
    /// resource spelled against the origin are one entry.
    pub fn offline_cache(&self) -> anyhow::Result<OfflineCacheService> {
        let cache_config = &self.config.offline_cache;
        let network = ReqwestNetworkAdapter::new(
            &NetworkClientConfig::new(&cache_config.origin)
                .with_timeout(cache_config.request_timeout()),
        )?;

        let storage = OriginScopedCacheStorage::new(self.cache_storage(), &cache_config.origin)?;

        Ok(OfflineCacheService::new(
            Arc::new(storage),
            Arc::new(network),
            self.prompt_queue(),
            cache_config.to_settings(),
        ))
    }
}
