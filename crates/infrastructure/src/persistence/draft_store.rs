//! SQLite draft store implementation
//!
//! Implements the `DraftStorePort` for persisting autosaved drafts.

use std::sync::Arc;

use application::{error::ApplicationError, ports::DraftStorePort};
use async_trait::async_trait;
use domain::{Draft, DraftId, DraftOptions, NewDraft, datetime_from_millis};
use rusqlite::{OptionalExtension, Row, params, params_from_iter, types::Type};
use tokio::task;
use tracing::{debug, instrument};

use super::{
    connection::ConnectionPool,
    error::{join_error, storage_error},
};

/// SQLite-based draft store
#[derive(Debug, Clone)]
pub struct SqliteDraftStore {
    pool: Arc<ConnectionPool>,
}

impl SqliteDraftStore {
    /// Create a new SQLite draft store
    #[must_use]
    pub const fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    async fn query_drafts(
        &self,
        sql: &'static str,
        limit: usize,
    ) -> Result<Vec<Draft>, ApplicationError> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(storage_error)?;
            let mut stmt = conn.prepare(sql).map_err(storage_error)?;
            let drafts = stmt
                .query_map([limit], row_to_draft)
                .map_err(storage_error)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(storage_error)?;
            Ok(drafts)
        })
        .await
        .map_err(join_error)?
    }
}

#[async_trait]
impl DraftStorePort for SqliteDraftStore {
    #[instrument(skip(self, draft), fields(input_len = draft.input.len()))]
    async fn insert(&self, draft: &NewDraft) -> Result<DraftId, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let input = draft.input.clone();
        let options = serde_json::to_string(&draft.options).map_err(storage_error)?;
        let timestamp = draft.timestamp_millis();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(storage_error)?;

            conn.execute(
                "INSERT INTO drafts (input, options, timestamp) VALUES (?1, ?2, ?3)",
                params![input, options, timestamp],
            )
            .map_err(storage_error)?;

            let id = DraftId::new(conn.last_insert_rowid());
            debug!(draft_id = %id, "Saved draft");
            Ok(id)
        })
        .await
        .map_err(join_error)?
    }

    #[instrument(skip(self))]
    async fn count(&self) -> Result<usize, ApplicationError> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(storage_error)?;
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM drafts", [], |row| row.get(0))
                .map_err(storage_error)?;
            usize::try_from(count).map_err(storage_error)
        })
        .await
        .map_err(join_error)?
    }

    #[instrument(skip(self))]
    async fn oldest_ids(&self, limit: usize) -> Result<Vec<DraftId>, ApplicationError> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(storage_error)?;
            let mut stmt = conn
                .prepare("SELECT id FROM drafts ORDER BY timestamp ASC, id ASC LIMIT ?1")
                .map_err(storage_error)?;
            let ids = stmt
                .query_map([limit], |row| row.get::<_, i64>(0).map(DraftId::new))
                .map_err(storage_error)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(storage_error)?;
            Ok(ids)
        })
        .await
        .map_err(join_error)?
    }

    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    async fn bulk_delete(&self, ids: &[DraftId]) -> Result<usize, ApplicationError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let pool = Arc::clone(&self.pool);
        let ids: Vec<i64> = ids.iter().map(DraftId::as_i64).collect();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(storage_error)?;
            let placeholders = vec!["?"; ids.len()].join(", ");
            let deleted = conn
                .execute(
                    &format!("DELETE FROM drafts WHERE id IN ({placeholders})"),
                    params_from_iter(ids.iter()),
                )
                .map_err(storage_error)?;

            debug!(deleted, "Deleted drafts");
            Ok(deleted)
        })
        .await
        .map_err(join_error)?
    }

    #[instrument(skip(self))]
    async fn list_recent(&self, limit: usize) -> Result<Vec<Draft>, ApplicationError> {
        let drafts = self
            .query_drafts(
                "SELECT id, input, options, timestamp FROM drafts
                 ORDER BY timestamp DESC, id DESC LIMIT ?1",
                limit,
            )
            .await?;
        debug!(count = drafts.len(), "Listed recent drafts");
        Ok(drafts)
    }

    #[instrument(skip(self))]
    async fn latest(&self) -> Result<Option<Draft>, ApplicationError> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(storage_error)?;
            conn.query_row(
                "SELECT id, input, options, timestamp FROM drafts
                 ORDER BY timestamp DESC, id DESC LIMIT 1",
                [],
                row_to_draft,
            )
            .optional()
            .map_err(storage_error)
        })
        .await
        .map_err(join_error)?
    }
}

/// Convert a database row to a `Draft`
fn row_to_draft(row: &Row<'_>) -> rusqlite::Result<Draft> {
    let id: i64 = row.get(0)?;
    let input: String = row.get(1)?;
    let options_json: String = row.get(2)?;
    let timestamp_millis: i64 = row.get(3)?;

    let options: DraftOptions = serde_json::from_str(&options_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    let timestamp = datetime_from_millis(timestamp_millis)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Integer, Box::new(e)))?;

    Ok(Draft {
        id: DraftId::new(id),
        input,
        options,
        timestamp,
    })
}
