//! Application services - Use case implementations

mod autosave_service;
mod offline_cache_service;

pub use autosave_service::{
    AUTOSAVE_CONTEXT, AutosaveService, AutosaveSettings, DEFAULT_DEBOUNCE, DEFAULT_MAX_DRAFTS,
    DEFAULT_PERIODIC_INTERVAL,
};
pub use offline_cache_service::{
    ActivationReport, DEFAULT_SHELL_MANIFEST, FetchOutcome, FetchStats, InstallReport,
    OfflineCacheService, OfflineCacheSettings, SYNC_PROMPTS_TAG,
};
