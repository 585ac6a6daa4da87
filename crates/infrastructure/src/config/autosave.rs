//! Draft autosave configuration.

use std::time::Duration;

use application::AutosaveSettings;
use serde::{Deserialize, Serialize};

/// Autosave timing and retention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutosaveAppConfig {
    /// Quiet window after the last change before a save, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Interval of the unconditional periodic save, in milliseconds
    #[serde(default = "default_periodic_interval_ms")]
    pub periodic_interval_ms: u64,

    /// Number of drafts kept; older ones are trimmed after each save
    #[serde(default = "default_max_drafts")]
    pub max_drafts: usize,
}

const fn default_debounce_ms() -> u64 {
    2000
}

const fn default_periodic_interval_ms() -> u64 {
    30_000
}

const fn default_max_drafts() -> usize {
    10
}

impl Default for AutosaveAppConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            periodic_interval_ms: default_periodic_interval_ms(),
            max_drafts: default_max_drafts(),
        }
    }
}

impl AutosaveAppConfig {
    /// Convert to the service settings
    ///
    /// Zero values are raised to the smallest usable setting: a zero-length
    /// interval cannot be scheduled and retention must keep the draft just
    /// written.
    pub fn to_settings(&self) -> AutosaveSettings {
        AutosaveSettings {
            debounce: Duration::from_millis(self.debounce_ms.max(1)),
            periodic_interval: Duration::from_millis(self.periodic_interval_ms.max(1)),
            max_drafts: self.max_drafts.max(1),
        }
    }
}
