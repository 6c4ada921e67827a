//! Article selection: which entries of a feed make it into this week's digest.
//!
//! Entries are taken in feed order. An entry is dropped only when it carries a
//! parsable publication date older than the recency window; undated entries
//! cannot be excluded and are kept. The first `cap` survivors win, which is
//! not necessarily the `cap` most recent ones.

use crate::feeds::FetchFeed;
use crate::models::{CandidateArticle, FeedEntry, UNKNOWN_DATE};
use crate::utils::{truncate_chars, truncate_for_log};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime};
use tracing::{error, info, instrument};

/// Only this many entries from the top of a feed are ever examined.
pub const SCAN_LIMIT: usize = 30;

/// Bound on the stored feed description, in characters.
pub const DESCRIPTION_CHARS: usize = 800;

/// Result of filtering one feed's entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub articles: Vec<CandidateArticle>,
    /// Entries looked at (at most [`SCAN_LIMIT`]).
    pub examined: usize,
    /// Entries inside the recency window, before the cap.
    pub qualifying: usize,
}

/// Articles chosen for this run plus the name to file them under.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedSource {
    pub articles: Vec<CandidateArticle>,
    pub source_title: String,
}

/// Parse the date formats feeds commonly use.
///
/// Date-only and zone-less values are read as UTC.
pub fn parse_published(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Filter and cap a feed's entries.
///
/// A window too large to subtract from `now` means no cutoff at all.
pub fn select_articles(
    entries: &[FeedEntry],
    window_days: i64,
    cap: usize,
    now: DateTime<FixedOffset>,
) -> Selection {
    let cutoff = Duration::try_days(window_days).and_then(|window| now.checked_sub_signed(window));
    let mut articles = Vec::with_capacity(cap.min(entries.len()));
    let mut examined = 0;
    let mut qualifying = 0;

    for entry in entries.iter().take(SCAN_LIMIT) {
        examined += 1;
        let published = entry.published.as_deref();
        if let (Some(date), Some(cutoff)) = (published.and_then(parse_published), cutoff) {
            if date < cutoff {
                continue;
            }
        }
        qualifying += 1;
        if articles.len() < cap {
            articles.push(CandidateArticle {
                title: entry.title.clone(),
                link: entry.link.clone(),
                summary_raw: truncate_chars(&entry.summary, DESCRIPTION_CHARS).to_string(),
                published_display: published.unwrap_or(UNKNOWN_DATE).to_string(),
            });
        }
    }

    Selection {
        articles,
        examined,
        qualifying,
    }
}

/// Fetch `url` and select its articles.
///
/// Never fails: a feed that cannot be fetched or parsed yields no articles,
/// titled with the URL, and the run ends as an empty one.
#[instrument(level = "info", skip(reader, now))]
pub async fn fetch_and_select<F: FetchFeed>(
    reader: &F,
    url: &str,
    window_days: i64,
    cap: usize,
    now: DateTime<FixedOffset>,
) -> SelectedSource {
    info!(%url, "Reading feed");
    let feed = match reader.fetch(url).await {
        Ok(feed) => feed,
        Err(e) => {
            error!(%url, error = %e, "Feed could not be read");
            return SelectedSource {
                articles: Vec::new(),
                source_title: url.to_string(),
            };
        }
    };

    let source_title = feed.title.clone().unwrap_or_else(|| url.to_string());
    let selection = select_articles(&feed.entries, window_days, cap, now);

    for article in &selection.articles {
        info!(title = %truncate_for_log(&article.title, 60), "Selected article");
    }
    info!(
        selected = selection.articles.len(),
        available = selection.qualifying,
        examined = selection.examined,
        "{} articles selected out of {} available",
        selection.articles.len(),
        selection.qualifying
    );

    SelectedSource {
        articles: selection.articles,
        source_title,
    }
}
