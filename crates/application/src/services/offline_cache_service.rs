//! Offline cache service - cache-first resource serving with generation lifecycle
//!
//! Serves the application shell and previously seen resources while offline.
//! The lifecycle follows the worker model of the hosting platform:
//!
//! 1. `install` fetches the shell manifest and writes it to the versioned
//!    precache, all or nothing.
//! 2. `activate` deletes every cache that is not part of the current
//!    generation and starts intercepting fetches.
//! 3. `handle_fetch` answers GET requests cache-first and fills the runtime
//!    cache from successful network responses.
//!
//! There is no freshness check: entries only go away when a new generation
//! activates.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use domain::{CacheGeneration, ResourceRequest, ResourceResponse, WorkerState};
use futures::future::try_join_all;
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{CacheStoragePort, NetworkPort, PromptQueuePort},
};

/// Background sync tag that flushes the offline prompt queue
pub const SYNC_PROMPTS_TAG: &str = "sync-prompts";

/// Shell resources cached at install time
pub const DEFAULT_SHELL_MANIFEST: &[&str] = &["/", "/index.html", "/manifest.json"];

/// Cache names and shell manifest for one deployed version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineCacheSettings {
    /// Precache and runtime cache names
    pub generation: CacheGeneration,
    /// Resources written to the precache on install
    pub manifest: Vec<String>,
}

impl Default for OfflineCacheSettings {
    fn default() -> Self {
        Self {
            generation: CacheGeneration::new("prompt-studio", "v1"),
            manifest: DEFAULT_SHELL_MANIFEST
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// How an intercepted fetch was answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not intercepted; the caller performs the request itself
    Passthrough,
    /// Served from a cache without touching the network
    Cached(ResourceResponse),
    /// Served from the network
    Network(ResourceResponse),
}

impl FetchOutcome {
    /// The response, unless the request was passed through
    pub const fn response(&self) -> Option<&ResourceResponse> {
        match self {
            Self::Passthrough => None,
            Self::Cached(response) | Self::Network(response) => Some(response),
        }
    }

    /// Whether the response came from a cache
    pub const fn is_cached(&self) -> bool {
        matches!(self, Self::Cached(_))
    }
}

/// Result of a successful install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Precache that was populated
    pub cache_name: String,
    /// Number of shell resources written
    pub cached: usize,
    /// Whether immediate takeover was requested
    pub skip_waiting: bool,
}

/// Result of a successful activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    /// Caches deleted because they belong to older generations
    pub deleted: Vec<String>,
    /// Whether open clients were claimed immediately
    pub clients_claimed: bool,
}

/// Fetch interception counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// GETs served from a cache
    pub hits: u64,
    /// GETs that went to the network
    pub misses: u64,
    /// Network responses written to the runtime cache
    pub fills: u64,
    /// Requests not intercepted
    pub passthrough: u64,
}

/// Offline resource cache
pub struct OfflineCacheService {
    storage: Arc<dyn CacheStoragePort>,
    network: Arc<dyn NetworkPort>,
    prompts: Arc<dyn PromptQueuePort>,
    settings: OfflineCacheSettings,
    state: RwLock<WorkerState>,
    clients_claimed: AtomicBool,
    hits: AtomicU64,
    misses: AtomicU64,
    fills: AtomicU64,
    passthrough: AtomicU64,
}

impl fmt::Debug for OfflineCacheService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OfflineCacheService")
            .field("settings", &self.settings)
            .field("state", &*self.state.read())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl OfflineCacheService {
    /// Create a new offline cache service
    pub fn new(
        storage: Arc<dyn CacheStoragePort>,
        network: Arc<dyn NetworkPort>,
        prompts: Arc<dyn PromptQueuePort>,
        settings: OfflineCacheSettings,
    ) -> Self {
        Self {
            storage,
            network,
            prompts,
            settings,
            state: RwLock::new(WorkerState::Parsed),
            clients_claimed: AtomicBool::new(false),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            fills: AtomicU64::new(0),
            passthrough: AtomicU64::new(0),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> WorkerState {
        *self.state.read()
    }

    /// Settings this service was built with
    pub const fn settings(&self) -> &OfflineCacheSettings {
        &self.settings
    }

    /// Whether open clients have been claimed
    pub fn clients_claimed(&self) -> bool {
        self.clients_claimed.load(Ordering::Relaxed)
    }

    /// Interception counters
    pub fn stats(&self) -> FetchStats {
        FetchStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            fills: self.fills.load(Ordering::Relaxed),
            passthrough: self.passthrough.load(Ordering::Relaxed),
        }
    }

    /// Populate the precache with the shell manifest
    ///
    /// Every manifest resource must be fetched with a 2xx status before
    /// anything is written. On failure the state becomes `Redundant` and
    /// install may be attempted again.
    #[instrument(skip(self), fields(cache = %self.settings.generation.precache_name()))]
    pub async fn install(&self) -> Result<InstallReport, ApplicationError> {
        {
            let mut state = self.state.write();
            if !state.can_install() {
                return Err(ApplicationError::InvalidState(format!(
                    "cannot install while {}",
                    *state
                )));
            }
            *state = WorkerState::Installing;
        }

        match self.populate_precache().await {
            Ok(cached) => {
                *self.state.write() = WorkerState::Waiting;
                info!(cached, "Precache populated, requesting immediate activation");
                Ok(InstallReport {
                    cache_name: self.settings.generation.precache_name().to_string(),
                    cached,
                    skip_waiting: true,
                })
            },
            Err(e) => {
                *self.state.write() = WorkerState::Redundant;
                warn!(error = %e, "Install failed, precache left untouched");
                Err(e)
            },
        }
    }

    async fn populate_precache(&self) -> Result<usize, ApplicationError> {
        let fetches = self
            .settings
            .manifest
            .iter()
            .map(|url| self.fetch_shell_resource(url));
        let entries = try_join_all(fetches).await?;

        // put_all creates the cache, so a failed fetch leaves nothing behind
        let precache = self.settings.generation.precache_name();
        self.storage.put_all(precache, &entries).await?;
        Ok(entries.len())
    }

    async fn fetch_shell_resource(
        &self,
        url: &str,
    ) -> Result<(ResourceRequest, ResourceResponse), ApplicationError> {
        let request = ResourceRequest::get(url);
        let response = self.network.fetch(&request).await?;
        if !response.is_success() {
            return Err(ApplicationError::Network(format!(
                "precache request for {url} returned status {}",
                response.status
            )));
        }
        Ok((request, response))
    }

    /// Make the installed generation live
    ///
    /// Deletes every cache that is neither the current precache nor the
    /// runtime cache, then claims open clients.
    #[instrument(skip(self))]
    pub async fn activate(&self) -> Result<ActivationReport, ApplicationError> {
        let state = self.state();
        if state != WorkerState::Waiting {
            return Err(ApplicationError::InvalidState(format!(
                "cannot activate while {state}"
            )));
        }

        let generation = &self.settings.generation;
        let mut deleted = Vec::new();
        for name in self.storage.keys().await? {
            if generation.is_current(&name) {
                continue;
            }
            if self.storage.delete(&name).await? {
                debug!(cache = %name, "Deleted stale cache");
                deleted.push(name);
            }
        }

        *self.state.write() = WorkerState::Active;
        self.clients_claimed.store(true, Ordering::Relaxed);

        info!(
            precache = %generation.precache_name(),
            runtime = %generation.runtime_name(),
            deleted = deleted.len(),
            "Offline cache activated"
        );

        Ok(ActivationReport {
            deleted,
            clients_claimed: true,
        })
    }

    /// Go straight to `Active` when the current precache already exists
    ///
    /// A generation activated in an earlier process stays live across
    /// restarts, just like an installed worker survives a page reload.
    ///
    /// # Returns
    /// true if the service is now active
    #[instrument(skip(self))]
    pub async fn resume(&self) -> Result<bool, ApplicationError> {
        if self.state() == WorkerState::Active {
            return Ok(true);
        }
        if self.state() != WorkerState::Parsed {
            return Ok(false);
        }

        let precache = self.settings.generation.precache_name();
        if !self.storage.has(precache).await? {
            debug!(cache = %precache, "No live generation to resume");
            return Ok(false);
        }

        *self.state.write() = WorkerState::Active;
        self.clients_claimed.store(true, Ordering::Relaxed);
        info!(cache = %precache, "Resumed live generation");
        Ok(true)
    }

    /// Answer an intercepted request
    ///
    /// Non-GET requests, and every request while the service is not active,
    /// are passed through without touching any cache. A GET is served from
    /// any cache when present; otherwise it goes to the network and an exact
    /// `200` response is copied into the runtime cache. Network errors on a
    /// miss propagate to the caller.
    #[instrument(skip(self), fields(method = %request.method, url = %request.url))]
    pub async fn handle_fetch(
        &self,
        request: &ResourceRequest,
    ) -> Result<FetchOutcome, ApplicationError> {
        if !request.is_cacheable() || !self.state().intercepts_fetches() {
            self.passthrough.fetch_add(1, Ordering::Relaxed);
            return Ok(FetchOutcome::Passthrough);
        }

        match self.storage.match_any(request).await {
            Ok(Some(cached)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache hit");
                return Ok(FetchOutcome::Cached(cached));
            },
            Ok(None) => debug!("Cache miss"),
            Err(e) => warn!(error = %e, "Cache lookup failed, falling back to network"),
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let response = self.network.fetch(request).await?;

        if response.is_runtime_cacheable() {
            let runtime = self.settings.generation.runtime_name();
            match self.storage.put(runtime, request, &response).await {
                Ok(()) => {
                    self.fills.fetch_add(1, Ordering::Relaxed);
                    debug!(cache = %runtime, "Stored network response");
                },
                Err(e) => warn!(error = %e, "Failed to store network response"),
            }
        } else {
            debug!(status = response.status, "Response not cacheable");
        }

        Ok(FetchOutcome::Network(response))
    }

    /// Handle a background sync event
    ///
    /// Only `sync-prompts` is understood: the queued prompts are read and
    /// counted. Other tags are ignored and yield `None`.
    #[instrument(skip(self))]
    pub async fn handle_sync(&self, tag: &str) -> Result<Option<usize>, ApplicationError> {
        if tag != SYNC_PROMPTS_TAG {
            debug!("Ignoring unknown sync tag");
            return Ok(None);
        }

        let pending = self.prompts.pending().await?;
        info!(count = pending.len(), "Prompts waiting for sync");
        Ok(Some(pending.len()))
    }
}
