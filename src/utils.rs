//! Utility functions for string manipulation and file system operations.
//!
//! This module provides helper functions used throughout the application:
//! - Character-safe truncation for payload bounds and log previews
//! - Reduction of feed HTML snippets to plain text
//! - File system validation of the output directory
//! - Atomic (temp file + rename) writes

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use std::error::Error;
use std::fs as stdfs;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Keep at most `max` characters of `s`.
///
/// Operates on `char` boundaries, so multi-byte text is never split.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_chars("héllo", 2), "hé");
/// assert_eq!(truncate_chars("abc", 10), "abc");
/// ```
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let cut = truncate_chars(s, max);
    if cut.len() == s.len() {
        s.to_string()
    } else {
        format!("{cut}…")
    }
}

/// Reduce an HTML snippet (as found in RSS descriptions) to plain text.
///
/// Tags are dropped, entities decoded and whitespace runs collapsed into a
/// single space.
pub fn html_to_text(snippet: &str) -> String {
    if !snippet.contains('<') && !snippet.contains('&') {
        return collapse_whitespace(snippet);
    }
    let fragment = Html::parse_fragment(snippet);
    let text = fragment.root_element().text().collect::<String>();
    collapse_whitespace(&text)
}

fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s.trim(), " ").into_owned()
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}

/// Sibling path used while a file is being rewritten.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `contents` to a temp sibling of `path`, flushed to disk, without
/// touching `path` itself. Returns the temp path so the caller decides when
/// to rename it into place.
pub async fn write_temp(path: &Path, contents: &[u8]) -> Result<PathBuf, Box<dyn Error>> {
    let tmp = temp_path_for(path);
    fs::write(&tmp, contents).await?;
    fs::File::open(&tmp).await?.sync_all().await?;
    debug!(path = %tmp.display(), bytes = contents.len(), "Wrote temp file");
    Ok(tmp)
}

/// Replace `path` with `contents` atomically (temp file + rename).
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), Box<dyn Error>> {
    let tmp = write_temp(path, contents).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
