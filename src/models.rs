//! Data models for feed entries, selected articles and archived weeks.
//!
//! This module defines the core data structures used throughout the application:
//! - [`RawFeed`] / [`FeedEntry`]: What the feed reader hands back for one URL
//! - [`CandidateArticle`]: An entry that survived selection, before summarization
//! - [`FinalizedArticle`]: A candidate with its summary attached
//! - [`WeekEntry`]: One run's worth of articles, as stored in the archive
//!
//! Field names of the serialized types are the persisted JSON keys, so renaming
//! a field is a breaking change for existing `archive.json` files.

use chrono::{DateTime, Datelike, TimeZone};
use serde::{Deserialize, Serialize};

/// Placeholder shown when an entry carries no publication date at all.
pub const UNKNOWN_DATE: &str = "unknown";

/// A feed as returned by the feed reader.
///
/// # Fields
///
/// * `title` - The feed's declared title, if any
/// * `entries` - Entries in feed-native order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFeed {
    pub title: Option<String>,
    pub entries: Vec<FeedEntry>,
}

/// A single raw feed entry.
///
/// `summary` is already reduced to plain text by the reader. `published` is the
/// date string exactly as the feed wrote it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: Option<String>,
}

/// An article selected from a feed, waiting for its summary.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CandidateArticle {
    /// The article title/headline.
    pub title: String,
    /// Link to the full article.
    pub link: String,
    /// The feed's description of the article, bounded in length.
    pub summary_raw: String,
    /// The publication date as the feed wrote it, or [`UNKNOWN_DATE`].
    pub published_display: String,
}

/// A candidate article with its summary attached.
///
/// The summary is either the summarizer's output or the truncation fallback;
/// both land in the same field so the renderer never has to tell them apart.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FinalizedArticle {
    pub title: String,
    pub link: String,
    pub summary_raw: String,
    pub published_display: String,
    pub summary: String,
}

impl FinalizedArticle {
    /// Attach a summary to a candidate.
    pub fn from_candidate(candidate: CandidateArticle, summary: String) -> Self {
        Self {
            title: candidate.title,
            link: candidate.link,
            summary_raw: candidate.summary_raw,
            published_display: candidate.published_display,
            summary,
        }
    }
}

/// The articles published by one successful run.
///
/// Immutable once written to the archive.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WeekEntry {
    /// ISO week number of the run.
    pub week_number: u32,
    /// Display name of the source (feed title, or its URL).
    pub source_name: String,
    /// Run date formatted as `dd/mm/YYYY`.
    pub date_label: String,
    /// Articles in feed order.
    pub articles: Vec<FinalizedArticle>,
}

impl WeekEntry {
    /// Build the entry for a run happening at `now`.
    pub fn for_run<Tz>(now: &DateTime<Tz>, source_name: String, articles: Vec<FinalizedArticle>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Self {
            week_number: now.iso_week().week(),
            source_name,
            date_label: now.format("%d/%m/%Y").to_string(),
            articles,
        }
    }
}
