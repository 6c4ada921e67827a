//! Attach a summary to every selected article.
//!
//! The summarizer is best-effort. When it fails for any reason the article
//! gets a truncation of its own text instead, stored in the same field, and
//! the reason is kept in [`SummaryOutcome`] for diagnostics.

use crate::api::{Summarize, SummarizeError};
use crate::models::{CandidateArticle, FinalizedArticle};
use crate::utils::{truncate_chars, truncate_for_log};
use futures::stream::{self, StreamExt};
use tracing::{info, instrument, warn};

/// Bound on the text submitted to the summarizer, in characters.
pub const INPUT_CHARS: usize = 1000;

/// Characters kept by the truncation fallback.
pub const FALLBACK_CHARS: usize = 200;

/// Marker appended to fallback summaries.
pub const ELLIPSIS: &str = "...";

/// Summary text plus how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryOutcome {
    Generated(String),
    Fallback { text: String, reason: SummarizeError },
}

impl SummaryOutcome {
    #[cfg(test)]
    pub fn text(&self) -> &str {
        match self {
            SummaryOutcome::Generated(text) | SummaryOutcome::Fallback { text, .. } => text.as_str(),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            SummaryOutcome::Generated(text) | SummaryOutcome::Fallback { text, .. } => text,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, SummaryOutcome::Fallback { .. })
    }
}

/// Text submitted for an article: `"{title}. {description}"`, bounded.
pub fn summary_input(article: &CandidateArticle) -> String {
    let full = format!("{}. {}", article.title, article.summary_raw);
    truncate_chars(&full, INPUT_CHARS).to_string()
}

/// Deterministic stand-in summary.
pub fn fallback_summary(input: &str) -> String {
    format!("{}{ELLIPSIS}", truncate_chars(input, FALLBACK_CHARS))
}

/// Summarize one article, falling back on failure.
pub async fn summarize_article<S: Summarize>(
    summarizer: &S,
    article: &CandidateArticle,
) -> SummaryOutcome {
    let input = summary_input(article);
    match summarizer.summarize(&input).await {
        Ok(summary) => SummaryOutcome::Generated(summary),
        Err(reason) => SummaryOutcome::Fallback {
            text: fallback_summary(&input),
            reason,
        },
    }
}

/// Finalized articles, in input order, and how many fell back.
#[derive(Debug, Clone, PartialEq)]
pub struct Attached {
    pub articles: Vec<FinalizedArticle>,
    pub degraded: usize,
}

/// Summarize each article, one at a time.
#[instrument(level = "info", skip_all, fields(count = articles.len()))]
pub async fn attach_summaries<S: Summarize>(
    summarizer: &S,
    articles: Vec<CandidateArticle>,
) -> Attached {
    let outcomes: Vec<(CandidateArticle, SummaryOutcome)> = stream::iter(articles)
        .then(|article| async move {
            let outcome = summarize_article(summarizer, &article).await;
            match &outcome {
                SummaryOutcome::Generated(_) => {
                    info!(title = %truncate_for_log(&article.title, 50), "Summarized article")
                }
                SummaryOutcome::Fallback { reason, .. } => warn!(
                    title = %truncate_for_log(&article.title, 50),
                    reason = %reason,
                    "Using truncated text as summary"
                ),
            }
            (article, outcome)
        })
        .collect()
        .await;

    let degraded = outcomes.iter().filter(|(_, o)| o.is_degraded()).count();
    let articles = outcomes
        .into_iter()
        .map(|(article, outcome)| FinalizedArticle::from_candidate(article, outcome.into_text()))
        .collect();

    Attached { articles, degraded }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct AlwaysFails;

    impl Summarize for AlwaysFails {
        async fn summarize(&self, _text: &str) -> Result<String, SummarizeError> {
            Err(SummarizeError::Status(503))
        }
    }

    /// Echoes a prefix and records what it was asked.
    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<String>>,
    }

    impl Summarize for Recording {
        async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
            self.seen.lock().unwrap().push(text.to_string());
            Ok(format!("summary of {}", truncate_chars(text, 10)))
        }
    }

    fn candidate(title: &str, body: &str) -> CandidateArticle {
        CandidateArticle {
            title: title.to_string(),
            link: "https://example.com/a".to_string(),
            summary_raw: body.to_string(),
            published_display: "unknown".to_string(),
        }
    }

    #[test]
    fn test_summary_input_is_bounded() {
        let article = candidate("Title", &"x".repeat(2000));
        let input = summary_input(&article);

        assert!(input.starts_with("Title. xxx"));
        assert_eq!(input.chars().count(), INPUT_CHARS);
    }

    #[test]
    fn test_fallback_summary_shape() {
        assert_eq!(fallback_summary("short"), "short...");
        let long = "é".repeat(500);
        let fallback = fallback_summary(&long);
        assert_eq!(fallback, format!("{}...", "é".repeat(FALLBACK_CHARS)));
    }

    #[tokio::test]
    async fn test_failing_summarizer_falls_back_for_every_article() {
        let articles = vec![
            candidate("First", &"lorem ipsum ".repeat(40)),
            candidate("Second", "tiny"),
        ];
        let attached = attach_summaries(&AlwaysFails, articles.clone()).await;

        assert_eq!(attached.degraded, 2);
        for (finalized, original) in attached.articles.iter().zip(&articles) {
            let input = format!("{}. {}", original.title, original.summary_raw);
            let expected = format!("{}...", input.chars().take(200).collect::<String>());
            assert_eq!(finalized.summary, expected);
        }
        assert_eq!(attached.articles[1].summary, "Second. tiny...");
    }

    #[tokio::test]
    async fn test_generated_summary_used_verbatim_in_order() {
        let summarizer = Recording::default();
        let attached = attach_summaries(
            &summarizer,
            vec![candidate("One", "body one"), candidate("Two", "body two")],
        )
        .await;

        assert_eq!(attached.degraded, 0);
        assert_eq!(attached.articles[0].summary, "summary of One. body ");
        assert_eq!(attached.articles[1].summary, "summary of Two. body ");
        assert_eq!(
            *summarizer.seen.lock().unwrap(),
            vec!["One. body one".to_string(), "Two. body two".to_string()]
        );
    }

    #[tokio::test]
    async fn test_outcome_keeps_reason() {
        let outcome = summarize_article(&AlwaysFails, &candidate("T", "b")).await;
        assert!(outcome.is_degraded());
        assert_eq!(outcome.text(), "T. b...");
        assert!(matches!(
            outcome,
            SummaryOutcome::Fallback { reason: SummarizeError::Status(503), .. }
        ));
    }
}
