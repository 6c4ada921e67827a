//! Remote summarization API.
//!
//! The summarizer is a Hugging Face style inference endpoint: it accepts
//! `{"inputs": "<text>"}` and answers with `[{"summary_text": "..."}]`.
//!
//! Every call is a single attempt bounded by a timeout. Failures are reported
//! as a typed [`SummarizeError`] so callers can tell *why* they had to degrade;
//! retrying is deliberately left out.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{instrument, warn};

/// Default summarization model endpoint.
pub const DEFAULT_SUMMARIZER_URL: &str =
    "https://api-inference.huggingface.co/models/facebook/bart-large-cnn";

/// Why a summarization attempt produced no usable summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummarizeError {
    /// No answer within the configured wait.
    Timeout,
    /// The endpoint answered with a non-success status.
    Status(u16),
    /// The answer did not contain a usable `summary_text`.
    Malformed(String),
    /// Connection-level failure.
    Transport(String),
}

impl fmt::Display for SummarizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummarizeError::Timeout => write!(f, "summarizer timed out"),
            SummarizeError::Status(code) => write!(f, "summarizer returned HTTP {code}"),
            SummarizeError::Malformed(why) => write!(f, "malformed summarizer response: {why}"),
            SummarizeError::Transport(why) => write!(f, "summarizer unreachable: {why}"),
        }
    }
}

impl Error for SummarizeError {}

/// Something that can shorten a text.
pub trait Summarize {
    /// Summarize `text` in one attempt.
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError>;
}

#[derive(Debug, Serialize)]
struct SummaryRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct SummaryItem {
    summary_text: Option<String>,
}

/// [`Summarize`] against an inference HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HfSummarizer {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HfSummarizer {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, Box<dyn Error>> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }
}

/// Extract the summary from a response body.
pub fn parse_summary_response(body: &str) -> Result<String, SummarizeError> {
    let items: Vec<SummaryItem> =
        serde_json::from_str(body).map_err(|e| SummarizeError::Malformed(e.to_string()))?;
    items
        .into_iter()
        .next()
        .and_then(|item| item.summary_text)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| SummarizeError::Malformed("no summary_text".to_string()))
}

impl Summarize for HfSummarizer {
    #[instrument(level = "info", skip_all, fields(endpoint = %self.endpoint, chars = text.chars().count()))]
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        let t0 = Instant::now();
        let result: Result<String, SummarizeError> = async {
            let response = self
                .client
                .post(&self.endpoint)
                .timeout(self.timeout)
                .json(&SummaryRequest { inputs: text })
                .send()
                .await
                .map_err(classify)?;

            let status = response.status();
            if !status.is_success() {
                return Err(SummarizeError::Status(status.as_u16()));
            }
            let body = response.text().await.map_err(classify)?;
            parse_summary_response(&body)
        }
        .await;

        if let Err(e) = &result {
            warn!(elapsed_ms = t0.elapsed().as_millis() as u64, error = %e, "Summarizer call failed");
        }
        result
    }
}

fn classify(e: reqwest::Error) -> SummarizeError {
    if e.is_timeout() {
        SummarizeError::Timeout
    } else {
        SummarizeError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_summary_response_ok() {
        let body = r#"[{"summary_text": " Rust ships a new release.\n"}]"#;
        assert_eq!(parse_summary_response(body).unwrap(), " Rust ships a new release.\n");
    }

    #[test]
    fn test_parse_summary_response_uses_first_item() {
        let body = r#"[{"summary_text": "first"}, {"summary_text": "second"}]"#;
        assert_eq!(parse_summary_response(body).unwrap(), "first");
    }

    #[test]
    fn test_parse_summary_response_malformed() {
        for body in [
            "[]",
            r#"[{"generated_text": "x"}]"#,
            r#"[{"summary_text": "   "}]"#,
            r#"{"error": "Model is currently loading", "estimated_time": 20.0}"#,
            "not json",
        ] {
            assert!(
                matches!(parse_summary_response(body), Err(SummarizeError::Malformed(_))),
                "body: {body}"
            );
        }
    }

    #[test]
    fn test_error_display() {
        assert_eq!(SummarizeError::Status(503).to_string(), "summarizer returned HTTP 503");
        assert_eq!(SummarizeError::Timeout.to_string(), "summarizer timed out");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Port 9 on localhost is never an inference server.
        let summarizer = HfSummarizer::new("http://127.0.0.1:9/summarize", Duration::from_secs(2)).unwrap();
        let result = summarizer.summarize("text").await;
        assert!(matches!(
            result,
            Err(SummarizeError::Transport(_)) | Err(SummarizeError::Timeout)
        ));
    }
}
