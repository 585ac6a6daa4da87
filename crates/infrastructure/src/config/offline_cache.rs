//! Offline resource cache configuration.

use std::{fmt, str::FromStr, time::Duration};

use application::{DEFAULT_SHELL_MANIFEST, OfflineCacheSettings};
use domain::CacheGeneration;
use serde::{Deserialize, Serialize};

/// Where cached responses are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process-local moka caches, lost on exit
    Memory,
    /// SQLite tables in the application database
    #[default]
    Sqlite,
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "sqlite" | "db" => Ok(Self::Sqlite),
            _ => Err(format!("Invalid cache backend: {s}. Use 'memory' or 'sqlite'")),
        }
    }
}

/// Offline cache generation, shell manifest and storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineCacheAppConfig {
    /// Prefix shared by every cache name of this application
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Deployed version; bumping it starts a new cache generation
    #[serde(default = "default_version")]
    pub version: String,

    /// Base URL that origin-relative paths resolve against
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Shell resources written to the precache on install
    #[serde(default = "default_manifest")]
    pub manifest: Vec<String>,

    /// Cache storage backend
    #[serde(default)]
    pub backend: CacheBackend,

    /// Entry bound per cache for the memory backend
    #[serde(default = "default_max_runtime_entries")]
    pub max_runtime_entries: u64,

    /// Network request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_cache_prefix() -> String {
    "prompt-studio".to_string()
}

fn default_version() -> String {
    "v1".to_string()
}

fn default_origin() -> String {
    "http://localhost:8080".to_string()
}

fn default_manifest() -> Vec<String> {
    DEFAULT_SHELL_MANIFEST
        .iter()
        .map(ToString::to_string)
        .collect()
}

const fn default_max_runtime_entries() -> u64 {
    1_000
}

const fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for OfflineCacheAppConfig {
    fn default() -> Self {
        Self {
            cache_prefix: default_cache_prefix(),
            version: default_version(),
            origin: default_origin(),
            manifest: default_manifest(),
            backend: CacheBackend::default(),
            max_runtime_entries: default_max_runtime_entries(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl OfflineCacheAppConfig {
    /// Cache names for the configured version
    pub fn generation(&self) -> CacheGeneration {
        CacheGeneration::new(&self.cache_prefix, &self.version)
    }

    /// Network request timeout
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Convert to the service settings
    pub fn to_settings(&self) -> OfflineCacheSettings {
        OfflineCacheSettings {
            generation: self.generation(),
            manifest: self.manifest.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_service_defaults() {
        assert_eq!(
            OfflineCacheAppConfig::default().to_settings(),
            OfflineCacheSettings::default()
        );
    }

    #[test]
    fn version_selects_generation() {
        let config = OfflineCacheAppConfig {
            version: "v2".to_string(),
            ..OfflineCacheAppConfig::default()
        };
        let generation = config.generation();
        assert_eq!(generation.precache_name(), "prompt-studio-precache-v2");
        assert_eq!(generation.runtime_name(), "prompt-studio-runtime");
    }

    #[test]
    fn backend_parsing() {
        assert_eq!("memory".parse::<CacheBackend>(), Ok(CacheBackend::Memory));
        assert_eq!("SQLite".parse::<CacheBackend>(), Ok(CacheBackend::Sqlite));
        assert!("redis".parse::<CacheBackend>().is_err());
    }

    #[test]
    fn backend_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&CacheBackend::Memory).unwrap(),
            "\"memory\""
        );
    }
}
