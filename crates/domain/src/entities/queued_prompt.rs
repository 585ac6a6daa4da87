//! Prompts queued locally while offline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::draft::DraftOptions;

/// A prompt submitted while offline, waiting for background sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedPrompt {
    /// Store-assigned identifier
    pub id: i64,
    /// Prompt text
    pub input: String,
    /// Enhancement settings chosen at submission
    pub options: DraftOptions,
    /// When the prompt was queued
    pub queued_at: DateTime<Utc>,
}
