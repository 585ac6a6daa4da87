//! Prompt Studio CLI
//!
//! Saves and restores prompt drafts and drives the offline resource cache.

#![allow(clippy::print_stdout)]

mod app;
mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use domain::RequestMethod;
use infrastructure::{AppConfig, init_tracing};

use crate::app::App;

/// Prompt Studio CLI
#[derive(Parser)]
#[command(name = "prompt-studio")]
#[command(author, version, about = "Prompt Studio drafts and offline cache", long_about = None)]
struct Cli {
    /// Verbosity level (overrides the configured log filter)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (default: ./config.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides the configuration)
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage saved drafts
    #[command(subcommand)]
    Draft(DraftCommands),

    /// Autosave prompt text read from stdin
    ///
    /// Lines are appended to the draft as they arrive. Drafts are written
    /// after a quiet period and periodically while input keeps coming.
    /// Example: prompt-studio autosave --restore
    Autosave {
        /// Enhancement options as a JSON object
        #[arg(long)]
        options: Option<String>,

        /// Continue from the newest saved draft
        #[arg(long)]
        restore: bool,
    },

    /// Drive the offline resource cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Manage prompts waiting for sync
    #[command(subcommand)]
    Prompt(PromptCommands),
}

#[derive(Subcommand)]
enum DraftCommands {
    /// Save a draft now
    Save {
        /// Prompt text
        input: String,

        /// Enhancement options as a JSON object
        #[arg(long)]
        options: Option<String>,
    },

    /// List recent drafts, newest first
    List {
        /// Maximum number of drafts to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Print the newest draft
    Restore,
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Precache the application shell and activate this version
    Install,

    /// Fetch a resource through the cache
    ///
    /// Example: prompt-studio cache fetch /index.html --body
    Fetch {
        /// Resource URL, absolute or relative to the configured origin
        url: String,

        /// HTTP method
        #[arg(short, long, default_value = "GET")]
        method: RequestMethod,

        /// Print the response body
        #[arg(long)]
        body: bool,
    },

    /// List caches and entry counts
    Status,

    /// Deliver a background sync event
    Sync {
        /// Sync tag
        #[arg(short, long, default_value = application::SYNC_PROMPTS_TAG)]
        tag: String,
    },
}

#[derive(Subcommand)]
enum PromptCommands {
    /// Queue a prompt for the next sync
    Queue {
        /// Prompt text
        input: String,

        /// Enhancement options as a JSON object
        #[arg(long)]
        options: Option<String>,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(filter) = log_filter_from_verbosity(cli.verbose) {
        config.telemetry.log_filter = filter.to_string();
    }
    if let Some(path) = cli.database {
        config.database.path = path;
    }
    init_tracing(&config.telemetry)?;

    let app = App::open(config)?;

    match cli.command {
        Commands::Draft(command) => match command {
            DraftCommands::Save { input, options } => {
                let options = commands::parse_options(options.as_deref())?;
                commands::draft_save(&app, input, options).await?;
            },
            DraftCommands::List { limit } => commands::draft_list(&app, limit).await?,
            DraftCommands::Restore => commands::draft_restore(&app).await?,
        },

        Commands::Autosave { options, restore } => {
            let options = commands::parse_options(options.as_deref())?;
            commands::autosave_stdin(&app, options, restore).await?;
        },

        Commands::Cache(command) => match command {
            CacheCommands::Install => commands::cache_install(&app).await?,
            CacheCommands::Fetch { url, method, body } => {
                commands::cache_fetch(&app, url, method, body).await?;
            },
            CacheCommands::Status => commands::cache_status(&app).await?,
            CacheCommands::Sync { tag } => commands::cache_sync(&app, &tag).await?,
        },

        Commands::Prompt(PromptCommands::Queue { input, options }) => {
            let options = commands::parse_options(options.as_deref())?;
            commands::prompt_queue(&app, &input, &options).await?;
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verbosity_overrides_log_filter() {
        assert_eq!(log_filter_from_verbosity(0), None);
        assert_eq!(log_filter_from_verbosity(1), Some("info"));
        assert_eq!(log_filter_from_verbosity(2), Some("debug"));
        assert_eq!(log_filter_from_verbosity(3), Some("trace"));
        assert_eq!(log_filter_from_verbosity(255), Some("trace"));
    }

    #[test]
    fn fetch_parses_method() {
        let cli = Cli::try_parse_from(["prompt-studio", "cache", "fetch", "/api", "-m", "post"])
            .unwrap();
        match cli.command {
            Commands::Cache(CacheCommands::Fetch { url, method, body }) => {
                assert_eq!(url, "/api");
                assert_eq!(method, RequestMethod::Post);
                assert!(!body);
            },
            _ => panic!("expected cache fetch"),
        }
    }

    #[test]
    fn sync_defaults_to_prompt_tag() {
        let cli = Cli::try_parse_from(["prompt-studio", "cache", "sync"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Cache(CacheCommands::Sync { tag }) if tag == application::SYNC_PROMPTS_TAG
        ));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "prompt-studio",
            "draft",
            "list",
            "-vv",
            "--database",
            "/tmp/drafts.db",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.database.as_deref(), Some("/tmp/drafts.db"));
    }
}
