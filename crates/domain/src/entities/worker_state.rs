//! Offline cache worker lifecycle

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of the offline cache worker
///
/// ```text
/// Parsed -> Installing -> Waiting -> Active
///               |
///               +-> Redundant (install failed, may be retried)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    /// Constructed, nothing installed yet
    #[default]
    Parsed,
    /// Precache population in progress
    Installing,
    /// Installed, eligible for activation
    Waiting,
    /// Controlling clients and intercepting fetches
    Active,
    /// Install failed; the generation never went live
    Redundant,
}

impl WorkerState {
    /// Whether `install` may be started from this state
    pub const fn can_install(&self) -> bool {
        matches!(self, Self::Parsed | Self::Redundant)
    }

    /// Whether fetches are intercepted in this state
    pub const fn intercepts_fetches(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Redundant => "redundant",
        };
        f.write_str(s)
    }
}
