//! Feed reader: download a feed URL and turn it into a [`RawFeed`].
//!
//! RSS 2.0 (`<rss><channel><item>`) and Atom (`<feed><entry>`) documents are
//! both accepted. Entry descriptions are reduced to plain text here so that
//! everything downstream works on readable text.

use crate::models::{FeedEntry, RawFeed};
use crate::utils::html_to_text;
use quick_xml::de::from_str;
use reqwest::Client;
use serde::Deserialize;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, instrument};

/// Source of raw feed entries.
pub trait FetchFeed {
    /// Fetch and parse the feed at `url`.
    async fn fetch(&self, url: &str) -> Result<RawFeed, Box<dyn Error>>;
}

/// [`FetchFeed`] over HTTP with a bounded wait.
#[derive(Debug, Clone)]
pub struct HttpFeedReader {
    client: Client,
}

impl HttpFeedReader {
    pub fn new(timeout: Duration) -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl FetchFeed for HttpFeedReader {
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, url: &str) -> Result<RawFeed, Box<dyn Error>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        debug!(bytes = body.len(), "Downloaded feed");
        parse_feed(&body)
    }
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    title: Option<String>,
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<String>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    summary: Option<String>,
    content: Option<String>,
    published: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

impl AtomEntry {
    fn alternate_link(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or_else(|| self.links.first())
            .and_then(|l| l.href.as_deref())
    }
}

/// Parse an RSS 2.0 or Atom document.
pub fn parse_feed(xml: &str) -> Result<RawFeed, Box<dyn Error>> {
    let xml = scrub_html_entities_for_xml(xml);

    match from_str::<Rss>(&xml) {
        Ok(rss) => return Ok(from_rss(rss)),
        Err(rss_err) => {
            if let Ok(atom) = from_str::<AtomFeed>(&xml) {
                if !atom.entries.is_empty() || atom.title.is_some() {
                    return Ok(from_atom(atom));
                }
            }
            Err(format!("not an RSS or Atom feed: {rss_err}").into())
        }
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn from_rss(rss: Rss) -> RawFeed {
    RawFeed {
        title: non_blank(rss.channel.title),
        entries: rss
            .channel
            .items
            .into_iter()
            .map(|item| FeedEntry {
                title: html_to_text(item.title.as_deref().unwrap_or_default()),
                link: item.link.unwrap_or_default().trim().to_string(),
                summary: html_to_text(item.description.as_deref().unwrap_or_default()),
                published: non_blank(item.pub_date),
            })
            .collect(),
    }
}

fn from_atom(atom: AtomFeed) -> RawFeed {
    RawFeed {
        title: non_blank(atom.title),
        entries: atom
            .entries
            .into_iter()
            .map(|entry| {
                let link = entry.alternate_link().unwrap_or_default().trim().to_string();
                let summary = entry.summary.as_deref().or(entry.content.as_deref()).unwrap_or_default();
                FeedEntry {
                    title: html_to_text(entry.title.as_deref().unwrap_or_default()),
                    link,
                    summary: html_to_text(summary),
                    published: non_blank(entry.published).or(non_blank(entry.updated)),
                }
            })
            .collect(),
    }
}

/// XML only knows five named entities; feeds routinely use HTML ones.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", "&#160;")
        .replace("&ndash;", "&#8211;")
        .replace("&mdash;", "&#8212;")
        .replace("&ldquo;", "&#8220;")
        .replace("&rdquo;", "&#8221;")
        .replace("&lsquo;", "&#8216;")
        .replace("&rsquo;", "&#8217;")
        .replace("&hellip;", "&#8230;")
}
