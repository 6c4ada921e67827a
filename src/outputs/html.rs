//! HTML rendering of the full archive.
//!
//! The page is self-contained (inline CSS, no scripts beyond the back-to-top
//! button) and fully regenerated on every successful run.

use crate::archive::Archive;
use crate::models::{FinalizedArticle, WeekEntry};
use chrono::{DateTime, FixedOffset};
use html_escape::{encode_double_quoted_attribute, encode_text};
use itertools::Itertools;

const STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Ubuntu, sans-serif; line-height: 1.6; color: #333; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); min-height: 100vh; padding: 20px; }
.container { max-width: 1000px; margin: 0 auto; background: white; border-radius: 20px; box-shadow: 0 20px 60px rgba(0,0,0,0.3); overflow: hidden; }
.header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 40px 30px; text-align: center; }
.header h1 { font-size: 2.5em; margin-bottom: 10px; }
.subtitle { font-size: 1.1em; opacity: 0.95; margin-top: 5px; }
.stats-bar { background: rgba(255,255,255,0.1); padding: 15px; margin-top: 20px; border-radius: 10px; display: flex; justify-content: center; gap: 40px; flex-wrap: wrap; }
.stat-number { font-size: 2em; font-weight: bold; }
.stat-label { font-size: 0.9em; opacity: 0.9; }
.content { padding: 40px 30px; }
.week-section { margin-bottom: 50px; padding-bottom: 30px; border-bottom: 2px solid #e0e0e0; }
.week-section:last-child { border-bottom: none; }
.week-header { text-align: center; margin-bottom: 30px; padding: 20px; background: linear-gradient(135deg, #667eea15 0%, #764ba215 100%); border-radius: 15px; }
.week-header h2 { color: #667eea; font-size: 1.8em; margin-bottom: 10px; }
.badge-new { background: #ff6b6b; color: white; padding: 4px 12px; border-radius: 12px; font-size: 0.5em; margin-left: 10px; vertical-align: middle; }
.week-source { color: #666; font-size: 1.1em; font-weight: 500; }
.articles-grid { display: grid; gap: 25px; }
.article-card { background: #f8f9fa; border-radius: 15px; padding: 25px; position: relative; border-left: 5px solid #667eea; }
.article-number { position: absolute; top: 15px; right: 15px; background: #667eea; color: white; width: 35px; height: 35px; border-radius: 50%; display: flex; align-items: center; justify-content: center; font-weight: bold; }
.article-title { font-size: 1.3em; margin-bottom: 10px; color: #2c3e50; padding-right: 50px; }
.article-title a { color: inherit; text-decoration: none; }
.article-title a:hover { color: #667eea; }
.article-date { color: #7f8c8d; font-size: 0.9em; margin-bottom: 12px; }
.article-summary { color: #555; line-height: 1.8; margin-bottom: 15px; }
.read-more { display: inline-block; color: #667eea; text-decoration: none; font-weight: 600; padding: 6px 12px; border-radius: 6px; }
.read-more:hover { background: #667eea; color: white; }
.footer { text-align: center; padding: 30px; background: #f8f9fa; color: #666; }
.back-to-top { position: fixed; bottom: 30px; right: 30px; background: #667eea; color: white; width: 50px; height: 50px; border-radius: 50%; display: flex; align-items: center; justify-content: center; cursor: pointer; font-size: 1.5em; }
@media (max-width: 768px) { .header h1 { font-size: 1.8em; } .article-card { padding: 20px; } .stats-bar { gap: 20px; } }
"#;

fn render_article(position: usize, article: &FinalizedArticle) -> String {
    let href = encode_double_quoted_attribute(&article.link);
    format!(
        r#"
            <article class="article-card">
                <div class="article-number">#{position}</div>
                <h3 class="article-title"><a href="{href}" target="_blank" rel="noopener">{title}</a></h3>
                <p class="article-date">📅 {date}</p>
                <div class="article-summary">{summary}</div>
                <a href="{href}" target="_blank" rel="noopener" class="read-more">Read the full article →</a>
            </article>"#,
        title = encode_text(&article.title),
        date = encode_text(&article.published_display),
        summary = encode_text(&article.summary),
    )
}

fn render_week(is_newest: bool, week: &WeekEntry) -> String {
    let badge = if is_newest {
        r#"<span class="badge-new">✨ NEW</span>"#
    } else {
        ""
    };
    let articles = week
        .articles
        .iter()
        .enumerate()
        .map(|(i, article)| render_article(i + 1, article))
        .join("");

    format!(
        r#"
        <section class="week-section">
            <div class="week-header">
                <h2>📅 Week {number} - {date} {badge}</h2>
                <div class="week-source">📡 Source: {source}</div>
            </div>
            <div class="articles-grid">{articles}
            </div>
        </section>"#,
        number = week.week_number,
        date = encode_text(&week.date_label),
        source = encode_text(&week.source_name),
    )
}

/// Render the whole archive, newest week first.
pub fn render_archive(archive: &Archive, generated_at: &DateTime<FixedOffset>) -> String {
    let weeks = archive
        .weeks()
        .iter()
        .enumerate()
        .map(|(i, week)| render_week(i == 0, week))
        .join("");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Weekly Tech Digest - Full Archive</title>
    <style>{STYLE}</style>
</head>
<body>
    <div class="container">
        <header class="header">
            <h1>🚀 Weekly Tech Digest</h1>
            <p class="subtitle">A few articles a week • one different source each time</p>
            <p class="subtitle">📚 Complete archive since the beginning</p>
            <div class="stats-bar">
                <div class="stat-item">
                    <div class="stat-number">{week_count}</div>
                    <div class="stat-label">Weeks</div>
                </div>
                <div class="stat-item">
                    <div class="stat-number">{article_count}</div>
                    <div class="stat-label">Articles</div>
                </div>
            </div>
        </header>
        <main class="content">{weeks}
        </main>
        <footer class="footer">
            <p>🤖 Automatically updated on {updated}</p>
            <p style="margin-top: 10px; font-size: 0.9em; color: #999;">Permanent archive • every article is kept</p>
        </footer>
    </div>
    <div class="back-to-top" onclick="window.scrollTo({{top: 0, behavior: 'smooth'}})">↑</div>
</body>
</html>
"#,
        week_count = archive.week_count(),
        article_count = archive.article_count(),
        updated = generated_at.format("%d/%m/%Y at %H:%M"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article(title: &str, link: &str) -> FinalizedArticle {
        FinalizedArticle {
            title: title.to_string(),
            link: link.to_string(),
            summary_raw: String::new(),
            published_display: "unknown".to_string(),
            summary: "A <short> summary".to_string(),
        }
    }

    fn generated_at() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 10, 7, 5, 0)
            .unwrap()
    }

    fn sample() -> Archive {
        Archive::default()
            .merge(WeekEntry {
                week_number: 10,
                source_name: "Old Source".to_string(),
                date_label: "03/03/2025".to_string(),
                articles: vec![article("Old", "https://old.example/1")],
            })
            .merge(WeekEntry {
                week_number: 11,
                source_name: "New & Shiny".to_string(),
                date_label: "10/03/2025".to_string(),
                articles: vec![
                    article("Rust <3", "https://new.example/1?a=1&b=\"2\""),
                    article("Second", "https://new.example/2"),
                ],
            })
    }

    #[test]
    fn test_render_counters_and_order() {
        let html = render_archive(&sample(), &generated_at());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<div class="stat-number">2</div>"#));
        assert!(html.contains(r#"<div class="stat-number">3</div>"#));
        let newest = html.find("Week 11").unwrap();
        let oldest = html.find("Week 10").unwrap();
        assert!(newest < oldest);
        assert_eq!(html.matches("badge-new\">").count(), 1);
        assert!(html.contains("10/03/2025 at 07:05"));
    }

    #[test]
    fn test_render_escapes_text_and_links() {
        let html = render_archive(&sample(), &generated_at());

        assert!(html.contains("Rust &lt;3"));
        assert!(html.contains("New &amp; Shiny"));
        assert!(html.contains("A &lt;short&gt; summary"));
        assert!(html.contains(r#"href="https://new.example/1?a=1&amp;b=&quot;2&quot;""#));
        assert!(!html.contains("Rust <3"));
    }

    #[test]
    fn test_render_numbers_articles_per_week() {
        let html = render_archive(&sample(), &generated_at());
        assert_eq!(html.matches(r#"<div class="article-number">#1</div>"#).count(), 2);
        assert_eq!(html.matches(r#"<div class="article-number">#2</div>"#).count(), 1);
    }

    #[test]
    fn test_render_empty_archive() {
        let html = render_archive(&Archive::default(), &generated_at());
        assert_eq!(html.matches(r#"<div class="stat-number">0</div>"#).count(), 2);
        assert!(!html.contains("week-section\">"));
    }
}
