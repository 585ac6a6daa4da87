//! SQLite prompt queue implementation
//!
//! Holds prompts submitted while offline until background sync reads them.

use std::sync::Arc;

use application::{error::ApplicationError, ports::PromptQueuePort};
use async_trait::async_trait;
use chrono::Utc;
use domain::{DraftOptions, QueuedPrompt, datetime_from_millis};
use rusqlite::{Row, params, types::Type};
use tokio::task;
use tracing::{debug, instrument};

use super::{
    connection::ConnectionPool,
    error::{join_error, storage_error},
};

/// SQLite-based offline prompt queue
#[derive(Debug, Clone)]
pub struct SqlitePromptQueue {
    pool: Arc<ConnectionPool>,
}

impl SqlitePromptQueue {
    /// Create a new SQLite prompt queue
    #[must_use]
    pub const fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PromptQueuePort for SqlitePromptQueue {
    #[instrument(skip(self, input, options), fields(input_len = input.len()))]
    async fn enqueue(&self, input: &str, options: &DraftOptions) -> Result<i64, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let input = input.to_string();
        let options = serde_json::to_string(options).map_err(storage_error)?;
        let queued_at = Utc::now().timestamp_millis();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(storage_error)?;
            conn.execute(
                "INSERT INTO prompt_queue (input, options, queued_at) VALUES (?1, ?2, ?3)",
                params![input, options, queued_at],
            )
            .map_err(storage_error)?;

            let id = conn.last_insert_rowid();
            debug!(prompt_id = id, "Queued prompt");
            Ok(id)
        })
        .await
        .map_err(join_error)?
    }

    #[instrument(skip(self))]
    async fn pending(&self) -> Result<Vec<QueuedPrompt>, ApplicationError> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(storage_error)?;
            let mut stmt = conn
                .prepare(
                    "SELECT id, input, options, queued_at FROM prompt_queue ORDER BY id ASC",
                )
                .map_err(storage_error)?;
            let prompts = stmt
                .query_map([], row_to_prompt)
                .map_err(storage_error)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(storage_error)?;
            Ok(prompts)
        })
        .await
        .map_err(join_error)?
    }
}

fn row_to_prompt(row: &Row<'_>) -> rusqlite::Result<QueuedPrompt> {
    let options_json: String = row.get(2)?;
    let queued_at: i64 = row.get(3)?;

    Ok(QueuedPrompt {
        id: row.get(0)?,
        input: row.get(1)?,
        options: serde_json::from_str(&options_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?,
        queued_at: datetime_from_millis(queued_at)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Integer, Box::new(e)))?,
    })
}
