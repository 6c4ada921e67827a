//! The ordered list of feeds the digest rotates through.
//!
//! The list is a plain text file, one feed URL per line. Blank lines and lines
//! starting with `#` are ignored; every other line keeps its position, because
//! the rotation state stores an index into this list.

use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};
use url::Url;

/// Non-empty, index-addressable list of feed identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceList {
    feeds: Vec<String>,
}

impl SourceList {
    /// Parse the newline-delimited source list format.
    ///
    /// # Errors
    ///
    /// Returns an error when no feed remains after dropping blanks and comments.
    pub fn parse(text: &str) -> Result<Self, Box<dyn Error>> {
        let feeds: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();

        if feeds.is_empty() {
            return Err("source list contains no feeds".into());
        }

        for feed in &feeds {
            if Url::parse(feed).is_err() {
                warn!(%feed, "Source list entry is not an absolute URL; keeping it in rotation");
            }
        }

        Ok(Self { feeds })
    }

    /// Read and parse the source list file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = fs::read_to_string(path)
            .await
            .map_err(|e| format!("cannot read source list {}: {e}", path.display()))?;
        let list = Self::parse(&text)?;
        info!(count = list.len(), "Loaded source list");
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    /// Feed at `index`, taken modulo the list length.
    pub fn get(&self, index: usize) -> &str {
        &self.feeds[index % self.feeds.len()]
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.feeds.iter().map(String::as_str)
    }
}
