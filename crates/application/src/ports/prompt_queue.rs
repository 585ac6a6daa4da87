//! Offline prompt queue port
//!
//! Prompts submitted while offline are queued locally until a background
//! sync picks them up.

use async_trait::async_trait;
use domain::{DraftOptions, QueuedPrompt};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for the local queue of prompts awaiting sync
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PromptQueuePort: Send + Sync {
    /// Queue a prompt, returning its id
    async fn enqueue(&self, input: &str, options: &DraftOptions) -> Result<i64, ApplicationError>;

    /// All queued prompts, oldest first
    async fn pending(&self) -> Result<Vec<QueuedPrompt>, ApplicationError>;
}
