//! Command handlers
//!
//! Each handler drives one of the services and prints a short report.

use anyhow::{Context, bail};
use application::{FetchOutcome, SYNC_PROMPTS_TAG, ports::PromptQueuePort};
use chrono::{DateTime, Local, Utc};
use domain::{AutosaveStatus, Draft, DraftOptions, RequestMethod, ResourceRequest, is_blank};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::app::App;

/// Characters of draft text shown in listings
const PREVIEW_CHARS: usize = 60;

/// Parse `--options` JSON, defaulting to an empty object
pub fn parse_options(raw: Option<&str>) -> anyhow::Result<DraftOptions> {
    match raw {
        None => Ok(DraftOptions::default()),
        Some(text) => {
            let value: serde_json::Value =
                serde_json::from_str(text).context("--options must be valid JSON")?;
            Ok(DraftOptions::new(value))
        },
    }
}

/// Local wall-clock rendering of a timestamp
pub fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// One listing line: id, time and first line of the input
pub fn format_draft_line(draft: &Draft) -> String {
    format!(
        "#{:<5} {}  {}",
        draft.id.as_i64(),
        format_time(draft.timestamp),
        draft.preview(PREVIEW_CHARS)
    )
}

/// Short description of how a fetch was answered
pub fn describe_outcome(outcome: &FetchOutcome) -> String {
    match outcome {
        FetchOutcome::Passthrough => "passthrough (not intercepted)".to_string(),
        FetchOutcome::Cached(response) => {
            format!("cache hit, HTTP {}, {} bytes", response.status, response.body.len())
        },
        FetchOutcome::Network(response) => {
            format!("network, HTTP {}, {} bytes", response.status, response.body.len())
        },
    }
}

/// Save one draft immediately
pub async fn draft_save(app: &App, input: String, options: DraftOptions) -> anyhow::Result<()> {
    if is_blank(&input) {
        bail!("Nothing to save: input is empty");
    }

    let service = app.autosave();
    service.record_change(input, options);
    service.save_draft().await;

    let state = service.state();
    match (state.status, state.last_saved) {
        (AutosaveStatus::Saved, Some(at)) => {
            println!("✅ Draft saved at {}", format_time(at));
            Ok(())
        },
        (status, _) => bail!("Draft was not saved (status: {status})"),
    }
}

/// List recent drafts, newest first
pub async fn draft_list(app: &App, limit: usize) -> anyhow::Result<()> {
    let drafts = app.autosave().recent_drafts(limit).await?;
    if drafts.is_empty() {
        println!("No drafts saved yet");
        return Ok(());
    }
    for draft in &drafts {
        println!("{}", format_draft_line(draft));
    }
    Ok(())
}

/// Print the newest draft in full
pub async fn draft_restore(app: &App) -> anyhow::Result<()> {
    let service = app.autosave();
    match service.restore_latest().await? {
        Some(draft) => {
            println!("{}", draft.input);
            if draft.options != DraftOptions::default() {
                println!("---");
                println!("{}", serde_json::to_string_pretty(draft.options.as_value())?);
            }
        },
        None => println!("No drafts saved yet"),
    }
    Ok(())
}

/// Autosave stdin as it is typed
///
/// Each line extends the draft and counts as a change; the debounce and
/// periodic timers decide when drafts are written. A final save runs at
/// end of input.
pub async fn autosave_stdin(app: &App, options: DraftOptions, restore: bool) -> anyhow::Result<()> {
    let service = app.autosave();
    let mut text = String::new();

    if restore && let Some(draft) = service.restore_latest().await? {
        text = draft.input;
        println!("↩️  Restored draft #{} from {}", draft.id, format_time(draft.timestamp));
    }

    let mut status = service.subscribe();
    let watcher = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let state = *status.borrow_and_update();
            match state.status {
                AutosaveStatus::Saved => {
                    if let Some(at) = state.last_saved {
                        println!("💾 saved {}", format_time(at));
                    }
                },
                AutosaveStatus::Error => println!("❌ autosave failed"),
                AutosaveStatus::Idle | AutosaveStatus::Saving => {},
            }
        }
    });

    service.start();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&line);
        service.record_change(text.clone(), options.clone());
    }

    service.shutdown();
    service.save_draft().await;
    drop(service);
    // The sender is gone once the service is dropped, which ends the watcher
    watcher.await?;

    info!(chars = text.len(), "Input closed");
    Ok(())
}

/// Install the shell and activate the generation
pub async fn cache_install(app: &App) -> anyhow::Result<()> {
    let service = app.offline_cache()?;
    let install = service.install().await?;
    println!("📦 Precached {} resources into {}", install.cached, install.cache_name);

    let activation = service.activate().await?;
    for name in &activation.deleted {
        println!("🧹 Deleted stale cache {name}");
    }
    println!("✅ Offline cache active");
    Ok(())
}

/// Fetch one resource through the offline cache
pub async fn cache_fetch(
    app: &App,
    url: String,
    method: RequestMethod,
    show_body: bool,
) -> anyhow::Result<()> {
    let service = app.offline_cache()?;
    if !service.resume().await? {
        println!("⚠️  No active generation, run `cache install` first");
    }

    let outcome = service
        .handle_fetch(&ResourceRequest::new(method, url))
        .await?;
    println!("{}", describe_outcome(&outcome));

    if show_body && let Some(response) = outcome.response() {
        println!("{}", String::from_utf8_lossy(&response.body));
    }
    Ok(())
}

/// List caches and their sizes
pub async fn cache_status(app: &App) -> anyhow::Result<()> {
    let storage = app.cache_storage();
    let generation = app.config().offline_cache.generation();
    let names = storage.keys().await?;
    if names.is_empty() {
        println!("No caches");
        return Ok(());
    }
    for name in names {
        let marker = if generation.is_current(&name) { "*" } else { " " };
        let count = storage.entry_count(&name).await?;
        println!("{marker} {name} ({count} entries)");
    }
    Ok(())
}

/// Deliver a background sync event
pub async fn cache_sync(app: &App, tag: &str) -> anyhow::Result<()> {
    let service = app.offline_cache()?;
    match service.handle_sync(tag).await? {
        Some(count) => println!("🔄 {count} prompt(s) waiting for sync"),
        None => println!("Ignored sync tag {tag} (only {SYNC_PROMPTS_TAG} is handled)"),
    }
    Ok(())
}

/// Queue a prompt for later sync
pub async fn prompt_queue(app: &App, input: &str, options: &DraftOptions) -> anyhow::Result<()> {
    if is_blank(input) {
        bail!("Nothing to queue: input is empty");
    }
    let id = app.prompt_queue().enqueue(input, options).await?;
    println!("📨 Queued prompt #{id}");
    Ok(())
}
