//! Command-line interface definitions for the weekly digest.
//!
//! Every flag is optional: anything left out falls back to the YAML config file
//! (if `--config` is given) and then to the built-in defaults.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the weekly digest.
///
/// # Examples
///
/// ```sh
/// # Defaults: feeds.txt in, docs/ out
/// weekly_digest
///
/// # Explicit paths and a bigger digest
/// weekly_digest --feeds feeds.txt --output-dir site --max-articles 3
///
/// # Settings from a file, one override
/// weekly_digest --config digest.yaml --window-days 14
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Newline-delimited list of feed URLs
    #[arg(short, long)]
    pub feeds: Option<PathBuf>,

    /// Directory for index.html, archive.json and state.json
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only keep articles published within this many days
    #[arg(long)]
    pub window_days: Option<i64>,

    /// Maximum number of articles per run
    #[arg(long)]
    pub max_articles: Option<usize>,

    /// Timeout for downloading a feed, in seconds
    #[arg(long)]
    pub feed_timeout_secs: Option<u64>,

    /// Summarization endpoint URL
    #[arg(long, env = "SUMMARIZER_URL")]
    pub summarizer_url: Option<String>,

    /// Timeout for one summarization call, in seconds
    #[arg(long)]
    pub summarizer_timeout_secs: Option<u64>,

    /// Run against a scratch copy of the state and write nothing
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "weekly_digest",
            "--feeds",
            "./feeds.txt",
            "--output-dir",
            "./docs",
            "--window-days",
            "10",
        ]);

        assert_eq!(cli.feeds, Some(PathBuf::from("./feeds.txt")));
        assert_eq!(cli.output_dir, Some(PathBuf::from("./docs")));
        assert_eq!(cli.window_days, Some(10));
        assert_eq!(cli.max_articles, None);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["weekly_digest", "-f", "/tmp/f.txt", "-o", "/tmp/site", "-c", "d.yaml"]);

        assert_eq!(cli.feeds, Some(PathBuf::from("/tmp/f.txt")));
        assert_eq!(cli.output_dir, Some(PathBuf::from("/tmp/site")));
        assert_eq!(cli.config, Some(PathBuf::from("d.yaml")));
    }

    #[test]
    fn test_cli_rejects_non_numeric_cap() {
        assert!(Cli::try_parse_from(["weekly_digest", "--max-articles", "two"]).is_err());
    }
}
