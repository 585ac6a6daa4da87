//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: SQLite persistence,
//! response cache storage, the HTTP network client, error reporting,
//! configuration loading and logging setup.

pub mod adapters;
pub mod cache;
pub mod config;
pub mod http;
pub mod persistence;
pub mod telemetry;

pub use adapters::TracingErrorReporter;
pub use cache::{
    MokaCacheStorage, OriginScopedCacheStorage, SqliteCacheStorage, generate_cache_key,
    request_cache_key,
};
pub use config::{
    AppConfig, AutosaveAppConfig, CacheBackend, DatabaseConfig, OfflineCacheAppConfig,
    TelemetryAppConfig,
};
pub use http::{NetworkClientConfig, ReqwestNetworkAdapter};
pub use persistence::{
    ConnectionPool, DatabaseError, SqliteDraftStore, SqlitePromptQueue, create_pool,
};
pub use telemetry::{TelemetryError, init_tracing};
