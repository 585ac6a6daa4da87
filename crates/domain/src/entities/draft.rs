//! Draft entity - a recoverable snapshot of the user's prompt input

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{errors::DomainError, value_objects::DraftId};

/// Opaque bag of enhancement settings active when a draft was captured
///
/// The core never inspects these values; they are stored and handed back
/// exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftOptions(serde_json::Value);

impl DraftOptions {
    /// Wrap an arbitrary JSON value
    pub const fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Borrow the underlying JSON value
    pub const fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Consume and return the underlying JSON value
    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

impl Default for DraftOptions {
    fn default() -> Self {
        Self(serde_json::Value::Object(serde_json::Map::new()))
    }
}

impl From<serde_json::Value> for DraftOptions {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Whether an input counts as empty for persistence purposes
pub fn is_blank(input: &str) -> bool {
    input.trim().is_empty()
}

/// Convert a millisecond Unix timestamp into a UTC datetime
///
/// # Errors
/// Returns `InvalidTimestamp` when the value is out of range
pub fn datetime_from_millis(millis: i64) -> Result<DateTime<Utc>, DomainError> {
    DateTime::from_timestamp_millis(millis).ok_or(DomainError::InvalidTimestamp(millis))
}

/// A draft that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDraft {
    /// Raw text being drafted
    pub input: String,
    /// Enhancement settings at capture time
    pub options: DraftOptions,
    /// Capture time
    pub timestamp: DateTime<Utc>,
}

impl NewDraft {
    /// Capture a draft at the current time
    pub fn new(input: impl Into<String>, options: DraftOptions) -> Self {
        Self::at(input, options, Utc::now())
    }

    /// Capture a draft at an explicit time
    pub fn at(input: impl Into<String>, options: DraftOptions, timestamp: DateTime<Utc>) -> Self {
        Self {
            input: input.into(),
            options,
            timestamp,
        }
    }

    /// Whether this draft would be rejected by the persistence rules
    pub fn is_blank(&self) -> bool {
        is_blank(&self.input)
    }

    /// Capture time in milliseconds since the Unix epoch
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// Attach the store-assigned id
    #[must_use]
    pub fn into_draft(self, id: DraftId) -> Draft {
        Draft {
            id,
            input: self.input,
            options: self.options,
            timestamp: self.timestamp,
        }
    }
}

/// A persisted draft
///
/// Drafts are append-only: every save produces a new record and records are
/// only ever removed by retention trimming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    /// Store-assigned identifier
    pub id: DraftId,
    /// Raw text being drafted
    pub input: String,
    /// Enhancement settings at capture time
    pub options: DraftOptions,
    /// Capture time, used for retention ordering
    pub timestamp: DateTime<Utc>,
}

impl Draft {
    /// Capture time in milliseconds since the Unix epoch
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// Short single-line preview of the input for listings
    pub fn preview(&self, max_chars: usize) -> String {
        let line = self.input.trim().lines().next().unwrap_or_default();
        if line.chars().count() > max_chars {
            let truncated: String = line.chars().take(max_chars).collect();
            format!("{truncated}…")
        } else {
            line.to_string()
        }
    }
}
