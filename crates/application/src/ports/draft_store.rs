//! Draft storage port
//!
//! Defines the generic durable store the autosave service persists drafts
//! through. Retention is driven by the caller through `count`,
//! `oldest_ids` and `bulk_delete`; the store itself never trims.

use async_trait::async_trait;
use domain::{Draft, DraftId, NewDraft};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for draft persistence
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DraftStorePort: Send + Sync {
    /// Insert a new draft
    ///
    /// # Returns
    /// The store-assigned id, strictly greater than any id handed out before
    async fn insert(&self, draft: &NewDraft) -> Result<DraftId, ApplicationError>;

    /// Count persisted drafts
    async fn count(&self) -> Result<usize, ApplicationError>;

    /// Ids of the `limit` oldest drafts, ordered by timestamp ascending
    ///
    /// Drafts sharing a timestamp are ordered by id.
    async fn oldest_ids(&self, limit: usize) -> Result<Vec<DraftId>, ApplicationError>;

    /// Delete the given drafts
    ///
    /// # Returns
    /// The number of drafts actually deleted
    async fn bulk_delete(&self, ids: &[DraftId]) -> Result<usize, ApplicationError>;

    /// List drafts, newest first
    async fn list_recent(&self, limit: usize) -> Result<Vec<Draft>, ApplicationError>;

    /// The most recently captured draft, if any
    async fn latest(&self) -> Result<Option<Draft>, ApplicationError>;
}
