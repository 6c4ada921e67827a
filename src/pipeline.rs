//! One run of the digest, from loading state to committing it.
//!
//! ```text
//! LOAD_STATE → COMPUTE_INDEX → FETCH_AND_SELECT ─┬─ no articles → EMPTY (nothing written)
//!                                                └─ SUMMARIZE → MERGE → RENDER
//!                                                   → WRITE_PAGE → COMMIT → DONE
//! ```
//!
//! An empty run leaves the store exactly as it found it, so the same source is
//! retried on the next invocation. A successful run adds exactly one week at
//! the front of the archive and advances the rotation by one, in a single
//! commit that happens only after the page was written.

use crate::api::Summarize;
use crate::archive::Archive;
use crate::feeds::FetchFeed;
use crate::models::WeekEntry;
use crate::outputs::html::render_archive;
use crate::rotation::RotationState;
use crate::selector::fetch_and_select;
use crate::sources::SourceList;
use crate::store::{DigestStore, Snapshot};
use crate::summarize::attach_summaries;
use chrono::{DateTime, Datelike, FixedOffset};
use std::error::Error;
use tracing::{info, instrument, warn};

/// Knobs of a single run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSettings {
    pub window_days: i64,
    pub max_articles: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            window_days: 7,
            max_articles: 2,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// No qualifying article; nothing was written.
    Empty { index: usize, source: String },
    /// A new week was published.
    Published {
        index: usize,
        source_name: String,
        articles: usize,
        degraded: usize,
        weeks: usize,
        total_articles: usize,
        next_source: String,
    },
}

/// Execute one run against `store`.
///
/// # Errors
///
/// Feed and summarizer failures are absorbed. Errors writing the page or
/// committing state are returned; in both cases the rotation has not advanced.
#[instrument(level = "info", skip_all, fields(sources = sources.len()))]
pub async fn run_once<S, F, Z>(
    settings: &RunSettings,
    sources: &SourceList,
    store: &S,
    reader: &F,
    summarizer: &Z,
    now: DateTime<FixedOffset>,
) -> Result<RunOutcome, Box<dyn Error>>
where
    S: DigestStore,
    F: FetchFeed,
    Z: Summarize,
{
    let loaded = store.load().await;
    if let Some(reason) = loaded.rotation.corruption() {
        warn!(%reason, "Rotation state unreadable; restarting rotation from the first source");
    }
    if let Some(reason) = loaded.archive.corruption() {
        warn!(%reason, "Archive unreadable; starting a new archive");
    }
    let rotation: RotationState = loaded.rotation.into_value();
    let archive: Archive = loaded.archive.into_value();

    let index = rotation.next_index(sources.len());
    let source = sources.get(index);
    info!(
        configured = sources.len(),
        position = index + 1,
        %source,
        week = now.iso_week().week(),
        "Source for this run"
    );

    let selected = fetch_and_select(reader, source, settings.window_days, settings.max_articles, now).await;
    if selected.articles.is_empty() {
        warn!(%source, "No articles this time; keeping the current page and state");
        return Ok(RunOutcome::Empty {
            index,
            source: source.to_string(),
        });
    }

    let attached = attach_summaries(summarizer, selected.articles).await;
    let article_count = attached.articles.len();
    let week = WeekEntry::for_run(&now, selected.source_title.clone(), attached.articles);
    let archive = archive.merge(week);

    let html = render_archive(&archive, &now);
    store.write_page(&html).await?;

    let snapshot = Snapshot {
        rotation: RotationState::advance(index, now),
        archive,
    };
    store.commit(&snapshot).await?;

    let next_source = sources.get(index + 1).to_string();
    info!(
        weeks = snapshot.archive.week_count(),
        articles = snapshot.archive.article_count(),
        %next_source,
        "Digest published"
    );

    Ok(RunOutcome::Published {
        index,
        source_name: selected.source_title,
        articles: article_count,
        degraded: attached.degraded,
        weeks: snapshot.archive.week_count(),
        total_articles: snapshot.archive.article_count(),
        next_source,
    })
}
