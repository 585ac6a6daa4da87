//! Cache generation naming
//!
//! A generation is the pair of cache names that belong to one deployed
//! version: the versioned precache and the runtime cache.

use serde::{Deserialize, Serialize};

/// Names of the caches that make up the live generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheGeneration {
    precache: String,
    runtime: String,
}

impl CacheGeneration {
    /// Derive the generation names from a prefix and a version tag
    ///
    /// `("prompt-studio", "v2")` yields `prompt-studio-precache-v2` and
    /// `prompt-studio-runtime`. The runtime name is unversioned so runtime
    /// entries survive version bumps.
    pub fn new(prefix: &str, version: &str) -> Self {
        Self {
            precache: format!("{prefix}-precache-{version}"),
            runtime: format!("{prefix}-runtime"),
        }
    }

    /// Build a generation from explicit cache names
    pub fn from_names(precache: impl Into<String>, runtime: impl Into<String>) -> Self {
        Self {
            precache: precache.into(),
            runtime: runtime.into(),
        }
    }

    /// Name of the versioned precache
    pub fn precache_name(&self) -> &str {
        &self.precache
    }

    /// Name of the runtime cache
    pub fn runtime_name(&self) -> &str {
        &self.runtime
    }

    /// Whether a cache belongs to this generation and must survive activation
    pub fn is_current(&self, cache_name: &str) -> bool {
        cache_name == self.precache || cache_name == self.runtime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_names_from_prefix_and_version() {
        let generation = CacheGeneration::new("prompt-studio", "v2");
        assert_eq!(generation.precache_name(), "prompt-studio-precache-v2");
        assert_eq!(generation.runtime_name(), "prompt-studio-runtime");
    }

    #[test]
    fn current_names_are_recognised() {
        let generation = CacheGeneration::from_names("P2", "R1");
        assert!(generation.is_current("P2"));
        assert!(generation.is_current("R1"));
        assert!(!generation.is_current("P1"));
        assert!(!generation.is_current("r1"));
    }
}
