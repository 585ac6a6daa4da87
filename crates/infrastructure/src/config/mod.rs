//! Application configuration
//!
//! Split into focused sub-modules:
//! - `database`: SQLite database settings
//! - `autosave`: debounce, periodic interval and draft retention
//! - `offline_cache`: cache generation, shell manifest and storage backend
//! - `telemetry`: log filter and output format

mod autosave;
mod database;
mod offline_cache;
mod telemetry;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use autosave::AutosaveAppConfig;
pub use database::DatabaseConfig;
pub use offline_cache::{CacheBackend, OfflineCacheAppConfig};
pub use telemetry::TelemetryAppConfig;

/// Environment variable prefix, e.g. `PROMPT_STUDIO_AUTOSAVE__DEBOUNCE_MS`
pub const ENV_PREFIX: &str = "PROMPT_STUDIO";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Draft autosave configuration
    #[serde(default)]
    pub autosave: AutosaveAppConfig,

    /// Offline resource cache configuration
    #[serde(default)]
    pub offline_cache: OfflineCacheAppConfig,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryAppConfig,
}

impl AppConfig {
    /// Load configuration from defaults, an optional file and the environment
    ///
    /// Without an explicit path, `config.{toml,yaml,json}` in the working
    /// directory is used when present. Environment variables take precedence
    /// over the file.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        let builder = config::Config::builder()
            .add_source(file)
            // e.g. PROMPT_STUDIO_DATABASE__PATH
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("offline_cache.manifest"),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        debug!(
            database = %config.database.path,
            backend = %config.offline_cache.backend,
            "Configuration loaded"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.database.path, "prompt-studio.db");
        assert_eq!(config.autosave.debounce_ms, 2000);
        assert_eq!(config.autosave.periodic_interval_ms, 30_000);
        assert_eq!(config.autosave.max_drafts, 10);
        assert_eq!(config.offline_cache.backend, CacheBackend::Sqlite);
        assert_eq!(
            config.offline_cache.manifest,
            vec!["/", "/index.html", "/manifest.json"]
        );
    }

    #[test]
    fn empty_document_deserializes_to_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"autosave": {"max_drafts": 3}}"#).unwrap();
        assert_eq!(config.autosave.max_drafts, 3);
        assert_eq!(config.autosave.debounce_ms, 2000);
    }

    #[test]
    fn load_reads_explicit_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [database]
            path = ":memory:"
            max_connections = 1

            [offline_cache]
            version = "v7"
            backend = "memory"
            "#
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.database.path, ":memory:");
        assert_eq!(config.database.max_connections, 1);
        assert_eq!(config.offline_cache.version, "v7");
        assert_eq!(config.offline_cache.backend, CacheBackend::Memory);
        assert_eq!(config.autosave.max_drafts, 10);
    }

    #[test]
    fn load_fails_for_missing_explicit_file() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/prompt-studio.toml")));
        assert!(result.is_err());
    }
}
