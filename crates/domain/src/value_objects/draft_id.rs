//! Draft identifier assigned by the draft store

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a persisted draft
///
/// Ids are assigned by the store on insert and grow monotonically within a
/// single store, so a larger id always denotes a later insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftId(i64);

impl DraftId {
    /// Wrap a store-assigned row id
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw row id
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Parse a draft ID from a string
    ///
    /// # Errors
    /// Returns an error if the string is not a valid integer
    pub fn parse(s: &str) -> Result<Self, std::num::ParseIntError> {
        Ok(Self(s.trim().parse()?))
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for DraftId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}
