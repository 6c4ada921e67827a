//! # Weekly Digest
//!
//! A scheduled digest generator that walks a list of RSS/Atom feeds one source
//! per run, summarizes that source's latest articles, and publishes them into a
//! cumulative static HTML archive.
//!
//! ## Usage
//!
//! ```sh
//! weekly_digest --feeds feeds.txt --output-dir docs
//! ```
//!
//! ## Architecture
//!
//! Each invocation is one pass through a small state machine:
//! 1. **Rotation**: Load the last processed index and pick the next source
//! 2. **Selection**: Fetch the feed and keep the first recent articles
//! 3. **Summarization**: One best-effort summarizer call per article
//! 4. **Archive**: Prepend the new week, render the page, commit state
//!
//! A run that finds no article writes nothing, so the same source is retried
//! next time.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod api;
mod archive;
mod cli;
mod config;
mod feeds;
mod models;
mod outputs;
mod pipeline;
mod rotation;
mod selector;
mod sources;
mod store;
mod summarize;
mod utils;

use api::HfSummarizer;
use cli::Cli;
use config::DigestConfig;
use feeds::HttpFeedReader;
use pipeline::{run_once, RunOutcome, RunSettings};
use sources::SourceList;
use store::{DigestStore, FileStore, MemoryStore};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("weekly_digest starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = DigestConfig::resolve(&args).await?;
    info!(
        feeds = %config.feeds_file.display(),
        output_dir = %config.output_dir.display(),
        window_days = config.window_days,
        max_articles = config.max_articles,
        "Configuration resolved"
    );

    let sources = SourceList::load(&config.feeds_file).await?;

    // Early check: ensure output dir is writable
    if !args.dry_run {
        if let Err(e) = ensure_writable_dir(&config.output_dir).await {
            error!(
                path = %config.output_dir.display(),
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    let reader = HttpFeedReader::new(config.feed_timeout())?;
    let summarizer = HfSummarizer::new(config.summarizer.url.clone(), config.summarizer_timeout())?;
    let settings = RunSettings {
        window_days: config.window_days,
        max_articles: config.max_articles,
    };
    let now = Local::now().fixed_offset();
    let file_store = FileStore::new(&config.output_dir);

    let outcome = if args.dry_run {
        let loaded = file_store.peek().await;
        let scratch = MemoryStore::with_state(loaded.rotation.into_value(), loaded.archive.into_value());
        info!("Dry run: nothing will be written");
        run_once(&settings, &sources, &scratch, &reader, &summarizer, now).await?
    } else {
        run_once(&settings, &sources, &file_store, &reader, &summarizer, now).await?
    };

    match &outcome {
        RunOutcome::Empty { index, source } => {
            info!(position = index + 1, %source, "No new articles; page and state left as they were");
        }
        RunOutcome::Published {
            index,
            source_name,
            articles,
            degraded,
            weeks,
            total_articles,
            next_source,
        } => {
            info!(
                position = index + 1,
                %source_name,
                articles,
                degraded,
                weeks,
                total_articles,
                page = %file_store.page_path().display(),
                "Digest complete"
            );
            info!(%next_source, "Next run will read this source");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
