//! Observable autosave status

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of the autosave state machine
///
/// `Idle` is initial. Any change moves to `Saving`; a save then settles in
/// `Saved` or `Error`, both of which go back to `Saving` on the next change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutosaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error,
}

impl fmt::Display for AutosaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Saving => "saving",
            Self::Saved => "saved",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Snapshot exposed to UI collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AutosaveState {
    /// Current status
    pub status: AutosaveStatus,
    /// Time of the last successful save
    pub last_saved: Option<DateTime<Utc>>,
}

impl AutosaveState {
    /// State after a change was recorded
    #[must_use]
    pub const fn saving(self) -> Self {
        Self {
            status: AutosaveStatus::Saving,
            last_saved: self.last_saved,
        }
    }

    /// State after a successful save at `at`
    #[must_use]
    pub const fn saved(at: DateTime<Utc>) -> Self {
        Self {
            status: AutosaveStatus::Saved,
            last_saved: Some(at),
        }
    }

    /// State after a failed save; the previous `last_saved` is kept
    #[must_use]
    pub const fn failed(self) -> Self {
        Self {
            status: AutosaveStatus::Error,
            last_saved: self.last_saved,
        }
    }
}
