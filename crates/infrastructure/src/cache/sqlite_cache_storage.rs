//! SQLite cache storage
//!
//! Named caches live in the `caches` table; their entries in
//! `cache_entries`, keyed by the blake3 request key. Deleting a cache
//! cascades to its entries. Creation order is the `caches.id` order.

use std::sync::Arc;

use application::{error::ApplicationError, ports::CacheStoragePort};
use async_trait::async_trait;
use chrono::Utc;
use domain::{ResourceRequest, ResourceResponse};
use rusqlite::{Connection, OptionalExtension, Row, params, types::Type};
use tokio::task;
use tracing::{debug, instrument};

use super::{ensure_storable, request_cache_key};
use crate::persistence::{
    ConnectionPool,
    error::{join_error, storage_error},
};

/// SQLite-based cache storage
#[derive(Debug, Clone)]
pub struct SqliteCacheStorage {
    pool: Arc<ConnectionPool>,
}

/// A request/response pair flattened for the blocking task
struct EntryRow {
    key: String,
    method: String,
    url: String,
    status: u16,
    headers: String,
    body: Vec<u8>,
}

impl EntryRow {
    fn new(request: &ResourceRequest, response: &ResourceResponse) -> Result<Self, ApplicationError> {
        Ok(Self {
            key: request_cache_key(request),
            method: request.method.to_string(),
            url: request.url.clone(),
            status: response.status,
            headers: serde_json::to_string(&response.headers).map_err(storage_error)?,
            body: response.body.clone(),
        })
    }
}

impl SqliteCacheStorage {
    /// Create a new SQLite cache storage
    #[must_use]
    pub const fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    async fn write_entries(
        &self,
        cache_name: &str,
        rows: Vec<EntryRow>,
    ) -> Result<(), ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let cache_name = cache_name.to_string();

        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(storage_error)?;
            let tx = conn.transaction().map_err(storage_error)?;
            let cache_id = open_cache(&tx, &cache_name)?;
            let stored_at = Utc::now().timestamp_millis();
            {
                let mut stmt = tx
                    .prepare_cached(
                        "INSERT OR REPLACE INTO cache_entries
                         (cache_id, request_key, method, url, status, headers, body, stored_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    )
                    .map_err(storage_error)?;
                for row in &rows {
                    stmt.execute(params![
                        cache_id, row.key, row.method, row.url, row.status, row.headers, row.body,
                        stored_at
                    ])
                    .map_err(storage_error)?;
                }
            }
            tx.commit().map_err(storage_error)?;
            debug!(cache = %cache_name, count = rows.len(), "Stored cache entries");
            Ok(())
        })
        .await
        .map_err(join_error)?
    }
}

/// Create the cache if needed and return its id
fn open_cache(conn: &Connection, cache_name: &str) -> Result<i64, ApplicationError> {
    conn.execute(
        "INSERT OR IGNORE INTO caches (name) VALUES (?1)",
        [cache_name],
    )
    .map_err(storage_error)?;
    conn.query_row(
        "SELECT id FROM caches WHERE name = ?1",
        [cache_name],
        |row| row.get(0),
    )
    .map_err(storage_error)
}

fn row_to_response(row: &Row<'_>) -> rusqlite::Result<ResourceResponse> {
    let headers_json: String = row.get(1)?;
    Ok(ResourceResponse {
        status: row.get(0)?,
        headers: serde_json::from_str(&headers_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?,
        body: row.get(2)?,
    })
}

#[async_trait]
impl CacheStoragePort for SqliteCacheStorage {
    #[instrument(skip(self))]
    async fn open(&self, cache_name: &str) -> Result<(), ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let cache_name = cache_name.to_string();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(storage_error)?;
            open_cache(&conn, &cache_name).map(|_| ())
        })
        .await
        .map_err(join_error)?
    }

    #[instrument(skip(self))]
    async fn has(&self, cache_name: &str) -> Result<bool, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let cache_name = cache_name.to_string();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(storage_error)?;
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM caches WHERE name = ?1)",
                [&cache_name],
                |row| row.get(0),
            )
            .map_err(storage_error)
        })
        .await
        .map_err(join_error)?
    }

    #[instrument(skip(self))]
    async fn keys(&self) -> Result<Vec<String>, ApplicationError> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(storage_error)?;
            let mut stmt = conn
                .prepare("SELECT name FROM caches ORDER BY id ASC")
                .map_err(storage_error)?;
            let names = stmt
                .query_map([], |row| row.get(0))
                .map_err(storage_error)?
                .collect::<Result<Vec<String>, _>>()
                .map_err(storage_error)?;
            Ok(names)
        })
        .await
        .map_err(join_error)?
    }

    #[instrument(skip(self))]
    async fn delete(&self, cache_name: &str) -> Result<bool, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let cache_name = cache_name.to_string();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(storage_error)?;
            let deleted = conn
                .execute("DELETE FROM caches WHERE name = ?1", [&cache_name])
                .map_err(storage_error)?;
            debug!(cache = %cache_name, deleted = deleted > 0, "Deleted cache");
            Ok(deleted > 0)
        })
        .await
        .map_err(join_error)?
    }

    #[instrument(skip(self), fields(url = %request.url))]
    async fn match_any(
        &self,
        request: &ResourceRequest,
    ) -> Result<Option<ResourceResponse>, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let key = request_cache_key(request);

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(storage_error)?;
            conn.query_row(
                "SELECT e.status, e.headers, e.body
                 FROM cache_entries e JOIN caches c ON c.id = e.cache_id
                 WHERE e.request_key = ?1
                 ORDER BY c.id ASC LIMIT 1",
                [&key],
                row_to_response,
            )
            .optional()
            .map_err(storage_error)
        })
        .await
        .map_err(join_error)?
    }

    #[instrument(skip(self), fields(url = %request.url))]
    async fn match_in(
        &self,
        cache_name: &str,
        request: &ResourceRequest,
    ) -> Result<Option<ResourceResponse>, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let cache_name = cache_name.to_string();
        let key = request_cache_key(request);

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(storage_error)?;
            conn.query_row(
                "SELECT e.status, e.headers, e.body
                 FROM cache_entries e JOIN caches c ON c.id = e.cache_id
                 WHERE c.name = ?1 AND e.request_key = ?2",
                [&cache_name, &key],
                row_to_response,
            )
            .optional()
            .map_err(storage_error)
        })
        .await
        .map_err(join_error)?
    }

    #[instrument(skip(self, response), fields(url = %request.url, status = response.status))]
    async fn put(
        &self,
        cache_name: &str,
        request: &ResourceRequest,
        response: &ResourceResponse,
    ) -> Result<(), ApplicationError> {
        ensure_storable(request)?;
        let row = EntryRow::new(request, response)?;
        self.write_entries(cache_name, vec![row]).await
    }

    #[instrument(skip(self, entries), fields(count = entries.len()))]
    async fn put_all(
        &self,
        cache_name: &str,
        entries: &[(ResourceRequest, ResourceResponse)],
    ) -> Result<(), ApplicationError> {
        let rows = entries
            .iter()
            .map(|(request, response)| {
                ensure_storable(request)?;
                EntryRow::new(request, response)
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.write_entries(cache_name, rows).await
    }

    #[instrument(skip(self))]
    async fn entry_count(&self, cache_name: &str) -> Result<usize, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let cache_name = cache_name.to_string();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(storage_error)?;
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM cache_entries e JOIN caches c ON c.id = e.cache_id
                     WHERE c.name = ?1",
                    [&cache_name],
                    |row| row.get(0),
                )
                .map_err(storage_error)?;
            usize::try_from(count).map_err(storage_error)
        })
        .await
        .map_err(join_error)?
    }
}

#[cfg(test)]
mod tests {
    use domain::RequestMethod;

    use super::*;
    use crate::{config::DatabaseConfig, persistence::create_pool};

    fn create_test_storage() -> SqliteCacheStorage {
        let pool = create_pool(&DatabaseConfig::in_memory()).unwrap();
        SqliteCacheStorage::new(Arc::new(pool))
    }

    #[tokio::test]
    async fn keys_follow_creation_order() {
        let storage = create_test_storage();
        for name in ["precache-v1", "runtime", "precache-v2"] {
            storage.open(name).await.unwrap();
        }
        storage.open("runtime").await.unwrap();

        assert_eq!(
            storage.keys().await.unwrap(),
            vec!["precache-v1", "runtime", "precache-v2"]
        );
    }

    #[tokio::test]
    async fn stored_response_round_trips_headers_and_body() {
        let storage = create_test_storage();
        let request = ResourceRequest::get("/manifest.json");
        let response = ResourceResponse::ok(br#"{"name":"studio"}"#.to_vec())
            .with_header("Content-Type", "application/json")
            .with_header("ETag", "\"abc\"");

        storage.put("runtime", &request, &response).await.unwrap();

        let found = storage.match_in("runtime", &request).await.unwrap();
        assert_eq!(found, Some(response));
    }

    #[tokio::test]
    async fn put_replaces_existing_entry() {
        let storage = create_test_storage();
        let request = ResourceRequest::get("/");
        storage
            .put("runtime", &request, &ResourceResponse::ok("old"))
            .await
            .unwrap();
        storage
            .put("runtime", &request, &ResourceResponse::ok("new"))
            .await
            .unwrap();

        assert_eq!(storage.entry_count("runtime").await.unwrap(), 1);
        let found = storage.match_any(&request).await.unwrap().unwrap();
        assert_eq!(found.body, b"new");
    }

    #[tokio::test]
    async fn match_any_searches_caches_in_creation_order() {
        let storage = create_test_storage();
        let request = ResourceRequest::get("/");
        storage.open("first").await.unwrap();
        storage
            .put("second", &request, &ResourceResponse::ok("two"))
            .await
            .unwrap();
        storage
            .put("first", &request, &ResourceResponse::ok("one"))
            .await
            .unwrap();

        let found = storage.match_any(&request).await.unwrap().unwrap();

        assert_eq!(found.body, b"one");
    }

    #[tokio::test]
    async fn delete_cascades_to_entries() {
        let storage = create_test_storage();
        let request = ResourceRequest::get("/");
        storage
            .put("stale", &request, &ResourceResponse::ok("x"))
            .await
            .unwrap();

        assert!(storage.delete("stale").await.unwrap());
        assert!(!storage.delete("stale").await.unwrap());
        assert!(!storage.has("stale").await.unwrap());
        assert_eq!(storage.match_any(&request).await.unwrap(), None);
        assert_eq!(storage.entry_count("stale").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn put_all_is_atomic() {
        let storage = create_test_storage();
        let entries = vec![
            (ResourceRequest::get("/"), ResourceResponse::ok("a")),
            (
                ResourceRequest::new(RequestMethod::Delete, "/b"),
                ResourceResponse::ok("b"),
            ),
        ];

        assert!(storage.put_all("precache", &entries).await.is_err());
        assert!(!storage.has("precache").await.unwrap());
    }

    #[tokio::test]
    async fn put_all_writes_every_entry() {
        let storage = create_test_storage();
        let entries: Vec<_> = ["/", "/index.html", "/manifest.json"]
            .into_iter()
            .map(|url| (ResourceRequest::get(url), ResourceResponse::ok(url)))
            .collect();

        storage.put_all("precache", &entries).await.unwrap();

        assert_eq!(storage.entry_count("precache").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn caches_survive_a_new_storage_handle() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("cache.db").to_string_lossy().into_owned(),
            max_connections: 2,
            run_migrations: true,
        };
        let request = ResourceRequest::get("/index.html");
        {
            let storage = SqliteCacheStorage::new(Arc::new(create_pool(&config).unwrap()));
            storage
                .put("precache-v1", &request, &ResourceResponse::ok("shell"))
                .await
                .unwrap();
        }

        let reopened = SqliteCacheStorage::new(Arc::new(create_pool(&config).unwrap()));

        assert!(reopened.has("precache-v1").await.unwrap());
        assert!(reopened.match_any(&request).await.unwrap().is_some());
    }
}
