//! Autosave service - debounced and periodic draft persistence
//!
//! Keeps the user's in-progress prompt recoverable without blocking input:
//!
//! - every change re-arms a debounce timer, so only the state after a quiet
//!   period is saved;
//! - an independent periodic tick saves whatever non-empty input exists, which
//!   bounds data loss even while the user never stops typing;
//! - after each insert the store is trimmed to the newest `max_drafts` drafts.
//!
//! Save failures are reported with the `"AutoSave"` context and reflected in
//! the observable status; they never propagate to the caller.

use std::{fmt, sync::Arc, time::Duration};

use chrono::Utc;
use domain::{AutosaveState, Draft, DraftId, DraftOptions, NewDraft, is_blank};
use tokio::{
    sync::{Mutex as AsyncMutex, watch},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{DraftStorePort, ErrorReporterPort},
};

/// Context tag attached to reported save failures
pub const AUTOSAVE_CONTEXT: &str = "AutoSave";

/// Default quiet period before a change is saved
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(2000);

/// Default interval of the periodic safety-net save
pub const DEFAULT_PERIODIC_INTERVAL: Duration = Duration::from_millis(30_000);

/// Default number of drafts kept by retention
pub const DEFAULT_MAX_DRAFTS: usize = 10;

/// Timing and retention settings for the autosave service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveSettings {
    /// Quiet period after the last change before saving
    pub debounce: Duration,
    /// Interval of the periodic save
    pub periodic_interval: Duration,
    /// Maximum number of drafts kept in the store
    pub max_drafts: usize,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            periodic_interval: DEFAULT_PERIODIC_INTERVAL,
            max_drafts: DEFAULT_MAX_DRAFTS,
        }
    }
}

/// The input and options the next save will persist
#[derive(Debug, Clone, Default)]
struct Snapshot {
    input: String,
    options: DraftOptions,
}

/// State shared between the service handle and its timer tasks
struct AutosaveCore {
    store: Arc<dyn DraftStorePort>,
    reporter: Arc<dyn ErrorReporterPort>,
    settings: AutosaveSettings,
    snapshot: parking_lot::Mutex<Snapshot>,
    state: watch::Sender<AutosaveState>,
    /// Held for the duration of a save; overlapping triggers queue behind it
    save_gate: AsyncMutex<()>,
}

impl AutosaveCore {
    async fn save_draft(&self) {
        let _in_flight = self.save_gate.lock().await;
        self.save_snapshot().await;
    }

    /// Persist the current snapshot; the caller holds `save_gate`
    async fn save_snapshot(&self) {
        let snapshot = self.snapshot.lock().clone();
        if is_blank(&snapshot.input) {
            debug!("Input is empty, skipping draft save");
            return;
        }

        let draft = NewDraft::new(snapshot.input, snapshot.options);
        match self.persist(&draft).await {
            Ok(id) => {
                self.state.send_replace(AutosaveState::saved(Utc::now()));
                debug!(draft_id = %id, input_len = draft.input.len(), "Draft saved");
            },
            Err(e) => {
                warn!(error = %e, "Draft save failed");
                self.reporter.report(&e, AUTOSAVE_CONTEXT);
                self.state.send_modify(|state| *state = state.failed());
            },
        }
    }

    async fn persist(&self, draft: &NewDraft) -> Result<DraftId, ApplicationError> {
        let id = self.store.insert(draft).await?;

        let count = self.store.count().await?;
        if count > self.settings.max_drafts {
            let excess = count - self.settings.max_drafts;
            let stale = self.store.oldest_ids(excess).await?;
            let removed = self.store.bulk_delete(&stale).await?;
            debug!(removed, kept = self.settings.max_drafts, "Trimmed old drafts");
        }

        Ok(id)
    }

    /// Periodic save; skipped while another save is still running
    async fn tick(&self) {
        let Ok(_in_flight) = self.save_gate.try_lock() else {
            debug!("Save still in flight, skipping periodic tick");
            return;
        };
        let has_input = !is_blank(&self.snapshot.lock().input);
        if has_input {
            debug!("Periodic autosave tick");
            self.save_snapshot().await;
        }
    }
}

/// Draft persistence manager
///
/// Owns the debounce and periodic timers. Dropping the service (or calling
/// [`AutosaveService::shutdown`]) cancels both timers; a save that already
/// started keeps running to completion.
pub struct AutosaveService {
    core: Arc<AutosaveCore>,
    debounce_timer: parking_lot::Mutex<Option<JoinHandle<()>>>,
    periodic_timer: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for AutosaveService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutosaveService")
            .field("settings", &self.core.settings)
            .field("state", &*self.core.state.borrow())
            .finish_non_exhaustive()
    }
}

impl AutosaveService {
    /// Create a new autosave service
    pub fn new(
        store: Arc<dyn DraftStorePort>,
        reporter: Arc<dyn ErrorReporterPort>,
        settings: AutosaveSettings,
    ) -> Self {
        let (state, _) = watch::channel(AutosaveState::default());
        Self {
            core: Arc::new(AutosaveCore {
                store,
                reporter,
                settings,
                snapshot: parking_lot::Mutex::new(Snapshot::default()),
                state,
                save_gate: AsyncMutex::new(()),
            }),
            debounce_timer: parking_lot::Mutex::new(None),
            periodic_timer: parking_lot::Mutex::new(None),
        }
    }

    /// Settings this service was built with
    pub fn settings(&self) -> AutosaveSettings {
        self.core.settings
    }

    /// Current observable state
    pub fn state(&self) -> AutosaveState {
        *self.core.state.borrow()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<AutosaveState> {
        self.core.state.subscribe()
    }

    /// Input the next save would persist
    pub fn current_input(&self) -> String {
        self.core.snapshot.lock().input.clone()
    }

    /// Record an input or options change
    ///
    /// Publishes `Saving` immediately and (re-)arms the debounce timer. Must
    /// be called from within a Tokio runtime.
    pub fn record_change(&self, input: impl Into<String>, options: DraftOptions) {
        *self.core.snapshot.lock() = Snapshot {
            input: input.into(),
            options,
        };
        self.core.state.send_modify(|state| *state = state.saving());

        let core = Arc::clone(&self.core);
        let delay = self.core.settings.debounce;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached so that cancelling the timer never interrupts a running save
            tokio::spawn(async move { core.save_draft().await });
        });

        if let Some(previous) = self.debounce_timer.lock().replace(timer) {
            previous.abort();
        }
    }

    /// Start the periodic safety-net save
    ///
    /// The first tick fires one full interval after this call. Calling
    /// `start` again restarts the interval.
    pub fn start(&self) {
        let core = Arc::clone(&self.core);
        let period = self.core.settings.periodic_interval;

        info!(
            interval_ms = period.as_millis(),
            debounce_ms = self.core.settings.debounce.as_millis(),
            max_drafts = self.core.settings.max_drafts,
            "Starting autosave"
        );

        let timer = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let core = Arc::clone(&core);
                tokio::spawn(async move { core.tick().await });
            }
        });

        if let Some(previous) = self.periodic_timer.lock().replace(timer) {
            previous.abort();
        }
    }

    /// Run one periodic tick: save now if the input is non-empty
    ///
    /// Does nothing while a save is in flight, so a stalled store never
    /// accumulates queued periodic saves.
    pub async fn tick(&self) {
        self.core.tick().await;
    }

    /// Persist the current input as a new draft
    ///
    /// No-op for empty input. Failures are reported, never returned.
    #[instrument(skip(self))]
    pub async fn save_draft(&self) {
        self.core.save_draft().await;
    }

    /// Seed the current input from the newest persisted draft
    ///
    /// Used on startup to recover text from a previous session. The status
    /// is left untouched.
    #[instrument(skip(self))]
    pub async fn restore_latest(&self) -> Result<Option<Draft>, ApplicationError> {
        let latest = self.core.store.latest().await?;
        if let Some(draft) = &latest {
            *self.core.snapshot.lock() = Snapshot {
                input: draft.input.clone(),
                options: draft.options.clone(),
            };
            debug!(draft_id = %draft.id, "Restored latest draft");
        }
        Ok(latest)
    }

    /// Historical drafts, newest first
    pub async fn recent_drafts(&self, limit: usize) -> Result<Vec<Draft>, ApplicationError> {
        self.core.store.list_recent(limit).await
    }

    /// Cancel the debounce and periodic timers
    pub fn shutdown(&self) {
        if let Some(timer) = self.debounce_timer.lock().take() {
            timer.abort();
        }
        if let Some(timer) = self.periodic_timer.lock().take() {
            timer.abort();
            debug!("Autosave timers cancelled");
        }
    }
}

impl Drop for AutosaveService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use domain::AutosaveStatus;
    use proptest::prelude::*;
    use serde_json::json;
    use tokio::time::sleep;

    use super::*;
    use crate::ports::{MockDraftStorePort, MockErrorReporterPort};

    /// In-memory draft store that records concurrency and can be slowed down
    #[derive(Default)]
    struct InMemoryDraftStore {
        drafts: parking_lot::Mutex<Vec<Draft>>,
        next_id: AtomicI64,
        completed_inserts: AtomicUsize,
        active_inserts: AtomicUsize,
        max_active_inserts: AtomicUsize,
        insert_delay: Option<Duration>,
    }

    impl InMemoryDraftStore {
        fn slow(delay: Duration) -> Self {
            Self {
                insert_delay: Some(delay),
                ..Self::default()
            }
        }

        fn insert_count(&self) -> usize {
            self.completed_inserts.load(Ordering::SeqCst)
        }

        fn inputs(&self) -> Vec<String> {
            self.drafts.lock().iter().map(|d| d.input.clone()).collect()
        }
    }

    #[async_trait]
    impl DraftStorePort for InMemoryDraftStore {
        async fn insert(&self, draft: &NewDraft) -> Result<DraftId, ApplicationError> {
            let active = self.active_inserts.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active_inserts.fetch_max(active, Ordering::SeqCst);

            if let Some(delay) = self.insert_delay {
                sleep(delay).await;
            }

            let id = DraftId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
            self.drafts.lock().push(draft.clone().into_draft(id));
            self.active_inserts.fetch_sub(1, Ordering::SeqCst);
            self.completed_inserts.fetch_add(1, Ordering::SeqCst);
            Ok(id)
        }

        async fn count(&self) -> Result<usize, ApplicationError> {
            Ok(self.drafts.lock().len())
        }

        async fn oldest_ids(&self, limit: usize) -> Result<Vec<DraftId>, ApplicationError> {
            let mut drafts = self.drafts.lock().clone();
            drafts.sort_by_key(|d| (d.timestamp, d.id));
            Ok(drafts.into_iter().take(limit).map(|d| d.id).collect())
        }

        async fn bulk_delete(&self, ids: &[DraftId]) -> Result<usize, ApplicationError> {
            let mut drafts = self.drafts.lock();
            let before = drafts.len();
            drafts.retain(|d| !ids.contains(&d.id));
            Ok(before - drafts.len())
        }

        async fn list_recent(&self, limit: usize) -> Result<Vec<Draft>, ApplicationError> {
            let mut drafts = self.drafts.lock().clone();
            drafts.sort_by_key(|d| std::cmp::Reverse((d.timestamp, d.id)));
            drafts.truncate(limit);
            Ok(drafts)
        }

        async fn latest(&self) -> Result<Option<Draft>, ApplicationError> {
            Ok(self.list_recent(1).await?.into_iter().next())
        }
    }

    /// Reporter that records every report
    #[derive(Default)]
    struct RecordingReporter {
        reports: parking_lot::Mutex<Vec<(String, String)>>,
    }

    impl ErrorReporterPort for RecordingReporter {
        fn report(&self, error: &ApplicationError, context: &str) {
            self.reports
                .lock()
                .push((error.to_string(), context.to_string()));
        }
    }

    fn service_with(store: Arc<InMemoryDraftStore>) -> AutosaveService {
        AutosaveService::new(
            store,
            Arc::new(RecordingReporter::default()),
            AutosaveSettings::default(),
        )
    }

    /// Set the snapshot without arming the debounce timer
    fn stage(service: &AutosaveService, input: &str) {
        *service.core.snapshot.lock() = Snapshot {
            input: input.to_string(),
            options: DraftOptions::default(),
        };
    }

    #[test]
    fn default_settings_match_documented_values() {
        let settings = AutosaveSettings::default();
        assert_eq!(settings.debounce, Duration::from_millis(2000));
        assert_eq!(settings.periodic_interval, Duration::from_millis(30_000));
        assert_eq!(settings.max_drafts, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn initial_state_is_idle() {
        let service = service_with(Arc::new(InMemoryDraftStore::default()));
        assert_eq!(service.state(), AutosaveState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn record_change_publishes_saving_immediately() {
        let service = service_with(Arc::new(InMemoryDraftStore::default()));
        let mut rx = service.subscribe();

        service.record_change("draft a prompt", DraftOptions::default());

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().status, AutosaveStatus::Saving);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_changes_collapses_into_one_save() {
        let store = Arc::new(InMemoryDraftStore::default());
        let service = service_with(Arc::clone(&store));

        for i in 0..5 {
            service.record_change(format!("draft {i}"), DraftOptions::default());
            sleep(Duration::from_millis(300)).await;
        }
        assert_eq!(store.insert_count(), 0);

        // 300ms already elapsed since the last change
        sleep(Duration::from_millis(1600)).await;
        assert_eq!(store.insert_count(), 0);

        sleep(Duration::from_millis(200)).await;
        assert_eq!(store.insert_count(), 1);
        assert_eq!(store.inputs(), vec!["draft 4".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_save_updates_status_and_last_saved() {
        let store = Arc::new(InMemoryDraftStore::default());
        let service = service_with(store);

        service.record_change("explain monads", DraftOptions::default());
        sleep(Duration::from_millis(2100)).await;

        let state = service.state();
        assert_eq!(state.status, AutosaveStatus::Saved);
        assert!(state.last_saved.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn options_are_persisted_unchanged() {
        let store = Arc::new(InMemoryDraftStore::default());
        let service = service_with(Arc::clone(&store));
        let options = DraftOptions::new(json!({"style": "socratic", "length": 3}));

        service.record_change("teach me", options.clone());
        sleep(Duration::from_millis(2100)).await;

        let drafts = store.list_recent(10).await.unwrap();
        assert_eq!(drafts[0].options, options);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_input_is_a_no_op() {
        let store = Arc::new(InMemoryDraftStore::default());
        let service = service_with(Arc::clone(&store));
        stage(&service, "   \n ");

        service.save_draft().await;

        assert_eq!(store.insert_count(), 0);
        assert_eq!(service.state().status, AutosaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_input_keeps_previous_status() {
        let store = Arc::new(InMemoryDraftStore::default());
        let service = service_with(Arc::clone(&store));
        stage(&service, "real text");
        service.save_draft().await;
        let saved = service.state();

        stage(&service, "");
        service.save_draft().await;

        assert_eq!(service.state(), saved);
        assert_eq!(store.insert_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_tick_saves_during_continuous_typing() {
        let store = Arc::new(InMemoryDraftStore::default());
        let service = service_with(Arc::clone(&store));
        service.start();

        // A change every 500ms keeps re-arming the 2s debounce
        for i in 0..62 {
            service.record_change(format!("typing {i}"), DraftOptions::default());
            sleep(Duration::from_millis(500)).await;
        }

        assert_eq!(store.insert_count(), 1);
        assert!(store.inputs()[0].starts_with("typing"));
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_tick_skips_empty_input() {
        let store = Arc::new(InMemoryDraftStore::default());
        let service = service_with(Arc::clone(&store));
        service.start();

        sleep(Duration::from_millis(65_000)).await;

        assert_eq!(store.insert_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn tick_saves_regardless_of_pending_debounce() {
        let store = Arc::new(InMemoryDraftStore::default());
        let service = service_with(Arc::clone(&store));

        service.record_change("pending", DraftOptions::default());
        service.tick().await;

        assert_eq!(store.insert_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retention_keeps_newest_ten() {
        let store = Arc::new(InMemoryDraftStore::default());
        let service = service_with(Arc::clone(&store));

        for i in 0..13 {
            stage(&service, &format!("draft {i}"));
            service.save_draft().await;
        }

        let expected: Vec<String> = (3..13).map(|i| format!("draft {i}")).collect();
        assert_eq!(store.inputs(), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn retention_respects_custom_limit() {
        let store = Arc::new(InMemoryDraftStore::default());
        let service = AutosaveService::new(
            Arc::clone(&store) as Arc<dyn DraftStorePort>,
            Arc::new(RecordingReporter::default()),
            AutosaveSettings {
                max_drafts: 3,
                ..AutosaveSettings::default()
            },
        );

        for i in 0..5 {
            stage(&service, &format!("draft {i}"));
            service.save_draft().await;
        }

        assert_eq!(store.inputs(), vec!["draft 2", "draft 3", "draft 4"]);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_reported_with_context_and_sets_error() {
        let mut store = MockDraftStorePort::new();
        store
            .expect_insert()
            .times(1)
            .returning(|_| Err(ApplicationError::Storage("quota exceeded".into())));
        store.expect_count().never();

        let mut reporter = MockErrorReporterPort::new();
        reporter
            .expect_report()
            .withf(|error, context| {
                context == AUTOSAVE_CONTEXT && error.to_string().contains("quota exceeded")
            })
            .times(1)
            .return_const(());

        let service = AutosaveService::new(
            Arc::new(store),
            Arc::new(reporter),
            AutosaveSettings::default(),
        );
        stage(&service, "will not fit");

        service.save_draft().await;

        let state = service.state();
        assert_eq!(state.status, AutosaveStatus::Error);
        assert!(state.last_saved.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn retention_failure_is_reported() {
        let mut store = MockDraftStorePort::new();
        store.expect_insert().returning(|_| Ok(DraftId::new(11)));
        store.expect_count().returning(|| Ok(11));
        store
            .expect_oldest_ids()
            .withf(|limit| *limit == 1)
            .returning(|_| Err(ApplicationError::Storage("store is corrupt".into())));
        store.expect_bulk_delete().never();

        let reporter = Arc::new(RecordingReporter::default());
        let service = AutosaveService::new(
            Arc::new(store),
            Arc::clone(&reporter) as Arc<dyn ErrorReporterPort>,
            AutosaveSettings::default(),
        );
        stage(&service, "eleventh draft");

        service.save_draft().await;

        assert_eq!(service.state().status, AutosaveStatus::Error);
        let reports = reporter.reports.lock();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].1, "AutoSave");
    }

    #[tokio::test(start_paused = true)]
    async fn error_returns_to_saving_on_next_change() {
        let mut store = MockDraftStorePort::new();
        store
            .expect_insert()
            .returning(|_| Err(ApplicationError::Storage("unavailable".into())));
        let service = AutosaveService::new(
            Arc::new(store),
            Arc::new(RecordingReporter::default()),
            AutosaveSettings::default(),
        );
        stage(&service, "text");
        service.save_draft().await;
        assert_eq!(service.state().status, AutosaveStatus::Error);

        service.record_change("more text", DraftOptions::default());

        assert_eq!(service.state().status, AutosaveStatus::Saving);
        service.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_saves_are_serialized() {
        let store = Arc::new(InMemoryDraftStore::slow(Duration::from_millis(500)));
        let service = service_with(Arc::clone(&store));
        stage(&service, "racing");

        tokio::join!(service.save_draft(), service.save_draft());

        assert_eq!(store.insert_count(), 2);
        assert_eq!(store.max_active_inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_during_a_stalled_save_are_skipped() {
        let store = Arc::new(InMemoryDraftStore::slow(Duration::from_secs(100)));
        let service = service_with(Arc::clone(&store));
        stage(&service, "slow disk");
        service.start();

        // Ticks at 30s, 60s, 90s and 120s; the first save runs until 130s
        sleep(Duration::from_secs(125)).await;
        service.shutdown();
        sleep(Duration::from_secs(1000)).await;

        assert_eq!(store.insert_count(), 1);
        assert_eq!(store.max_active_inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn tick_is_skipped_while_a_save_runs() {
        let store = Arc::new(InMemoryDraftStore::slow(Duration::from_millis(500)));
        let service = service_with(Arc::clone(&store));
        stage(&service, "busy");

        tokio::join!(service.save_draft(), async {
            sleep(Duration::from_millis(100)).await;
            service.tick().await;
        });

        assert_eq!(store.insert_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_timers() {
        let store = Arc::new(InMemoryDraftStore::default());
        let service = service_with(Arc::clone(&store));
        service.start();
        service.record_change("never saved", DraftOptions::default());

        service.shutdown();
        sleep(Duration::from_millis(65_000)).await;

        assert_eq!(store.insert_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_save_completes_after_shutdown() {
        let store = Arc::new(InMemoryDraftStore::slow(Duration::from_millis(1000)));
        let service = service_with(Arc::clone(&store));

        service.record_change("almost there", DraftOptions::default());
        // Debounce fires at 2000ms; the insert is still running at 2500ms
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(store.insert_count(), 0);

        service.shutdown();
        sleep(Duration::from_millis(1000)).await;

        assert_eq!(store.insert_count(), 1);
        assert_eq!(service.state().status, AutosaveStatus::Saved);
    }

    #[tokio::test(start_paused = true)]
    async fn restore_latest_seeds_input_without_status_change() {
        let store = Arc::new(InMemoryDraftStore::default());
        store
            .insert(&NewDraft::new("older", DraftOptions::default()))
            .await
            .unwrap();
        store
            .insert(&NewDraft::new("newest", DraftOptions::default()))
            .await
            .unwrap();
        let service = service_with(Arc::clone(&store));

        let restored = service.restore_latest().await.unwrap();

        assert_eq!(restored.map(|d| d.input), Some("newest".to_string()));
        assert_eq!(service.current_input(), "newest");
        assert_eq!(service.state().status, AutosaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn restore_latest_on_empty_store_returns_none() {
        let service = service_with(Arc::new(InMemoryDraftStore::default()));
        assert!(service.restore_latest().await.unwrap().is_none());
        assert_eq!(service.current_input(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn recent_drafts_are_newest_first() {
        let store = Arc::new(InMemoryDraftStore::default());
        let service = service_with(Arc::clone(&store));
        for input in ["one", "two", "three"] {
            stage(&service, input);
            service.save_draft().await;
        }

        let recent = service.recent_drafts(2).await.unwrap();

        let inputs: Vec<_> = recent.into_iter().map(|d| d.input).collect();
        assert_eq!(inputs, vec!["three", "two"]);
    }

    proptest! {
        #[test]
        fn retention_invariant_holds_for_any_save_sequence(
            inputs in proptest::collection::vec("[ a-z]{0,12}", 1..40)
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                let store = Arc::new(InMemoryDraftStore::default());
                let service = service_with(Arc::clone(&store));
                let mut persisted = Vec::new();

                for input in &inputs {
                    stage(&service, input);
                    service.save_draft().await;
                    if !is_blank(input) {
                        persisted.push(input.clone());
                    }
                    prop_assert!(store.count().await.unwrap() <= DEFAULT_MAX_DRAFTS);
                }

                let keep_from = persisted.len().saturating_sub(DEFAULT_MAX_DRAFTS);
                prop_assert_eq!(store.inputs(), persisted[keep_from..].to_vec());
                Ok(())
            })?;
        }
    }
}
