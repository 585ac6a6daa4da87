//! Persistence module
//!
//! SQLite-based storage for drafts, the offline prompt queue and named
//! response caches.

pub mod connection;
pub mod draft_store;
pub(crate) mod error;
pub mod migrations;
pub mod prompt_queue;

pub use connection::{ConnectionPool, DatabaseError, PooledConn, create_pool};
pub use draft_store::SqliteDraftStore;
pub use prompt_queue::SqlitePromptQueue;
