//! Runtime configuration.
//!
//! Values come from three layers, later ones winning:
//! 1. built-in defaults ([`DigestConfig::default`])
//! 2. an optional YAML file (`--config digest.yaml`)
//! 3. command-line flags and their environment variables
//!
//! # Example file
//!
//! ```yaml
//! feeds_file: feeds.txt
//! output_dir: docs
//! window_days: 7
//! max_articles: 2
//! feed_timeout_secs: 30
//! summarizer:
//!   url: https://api-inference.huggingface.co/models/facebook/bart-large-cnn
//!   timeout_secs: 30
//! ```

use crate::api::DEFAULT_SUMMARIZER_URL;
use crate::cli::Cli;
use serde::Deserialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DigestConfig {
    /// Newline-delimited list of feed URLs.
    pub feeds_file: PathBuf,
    /// Directory holding `state.json`, `archive.json` and `index.html`.
    pub output_dir: PathBuf,
    /// Recency window for article selection.
    pub window_days: i64,
    /// Articles kept per run.
    pub max_articles: usize,
    /// Wait bound for downloading a feed.
    pub feed_timeout_secs: u64,
    pub summarizer: SummarizerConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SummarizerConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            feeds_file: PathBuf::from("feeds.txt"),
            output_dir: PathBuf::from("docs"),
            window_days: 7,
            max_articles: 2,
            feed_timeout_secs: 30,
            summarizer: SummarizerConfig::default(),
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SUMMARIZER_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl DigestConfig {
    /// Parse a YAML document; missing keys keep their defaults.
    pub fn from_yaml(text: &str) -> Result<Self, Box<dyn Error>> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
        let config = Self::from_yaml(&text)?;
        info!("Loaded configuration file");
        Ok(config)
    }

    /// Overlay the flags that were given on the command line.
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(feeds) = &cli.feeds {
            self.feeds_file = feeds.clone();
        }
        if let Some(dir) = &cli.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(days) = cli.window_days {
            self.window_days = days;
        }
        if let Some(max) = cli.max_articles {
            self.max_articles = max;
        }
        if let Some(secs) = cli.feed_timeout_secs {
            self.feed_timeout_secs = secs;
        }
        if let Some(url) = &cli.summarizer_url {
            self.summarizer.url = url.clone();
        }
        if let Some(secs) = cli.summarizer_timeout_secs {
            self.summarizer.timeout_secs = secs;
        }
        self
    }

    /// Resolve the final configuration for this invocation.
    pub async fn resolve(cli: &Cli) -> Result<Self, Box<dyn Error>> {
        let base = match &cli.config {
            Some(path) => Self::load(path).await?,
            None => Self::default(),
        };
        let config = base.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.window_days < 0 {
            return Err(format!("window_days must not be negative (got {})", self.window_days).into());
        }
        if self.feed_timeout_secs == 0 || self.summarizer.timeout_secs == 0 {
            return Err("timeouts must be at least one second".into());
        }
        Ok(())
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }

    pub fn summarizer_timeout(&self) -> Duration {
        Duration::from_secs(self.summarizer.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let config = DigestConfig::default();
        assert_eq!(config.window_days, 7);
        assert_eq!(config.max_articles, 2);
        assert_eq!(config.summarizer.timeout_secs, 30);
        assert_eq!(config.output_dir, PathBuf::from("docs"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = DigestConfig::from_yaml("max_articles: 3\nsummarizer:\n  timeout_secs: 10\n").unwrap();
        assert_eq!(config.max_articles, 3);
        assert_eq!(config.window_days, 7);
        assert_eq!(config.summarizer.timeout_secs, 10);
        assert_eq!(config.summarizer.url, DEFAULT_SUMMARIZER_URL);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(DigestConfig::from_yaml("").unwrap(), DigestConfig::default());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(DigestConfig::from_yaml("max_article: 3\n").is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let cli = Cli::parse_from([
            "weekly_digest",
            "--max-articles",
            "5",
            "--output-dir",
            "/tmp/site",
        ]);
        let config = DigestConfig::from_yaml("max_articles: 3\nwindow_days: 14\n")
            .unwrap()
            .apply_cli(&cli);

        assert_eq!(config.max_articles, 5);
        assert_eq!(config.window_days, 14);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/site"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = DigestConfig::default();
        config.window_days = -1;
        assert!(config.validate().is_err());

        let mut config = DigestConfig::default();
        config.summarizer.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_resolve_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("digest.yaml");
        std::fs::write(&path, "feeds_file: sources.txt\nfeed_timeout_secs: 5\n").unwrap();

        let cli = Cli::parse_from(["weekly_digest", "--config", path.to_str().unwrap()]);
        let config = DigestConfig::resolve(&cli).await.unwrap();

        assert_eq!(config.feeds_file, PathBuf::from("sources.txt"));
        assert_eq!(config.feed_timeout(), Duration::from_secs(5));
    }
}
