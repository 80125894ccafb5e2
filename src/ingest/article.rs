// src/ingest/article.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

use crate::ingest::clean_text;
use crate::ingest::error::InvalidArticle;

/// Maximum summary length, in characters, when derived from content.
pub const SUMMARY_MAX_CHARS: usize = 200;
pub const TRUNCATION_MARKER: &str = "...";

/// Listed security an item refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub code: String,
    #[serde(default)]
    pub name: String,
}

/// A normalized news/announcement item. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    id: String,
    title: String,
    content: String,
    summary: String,
    source: String,
    category: String,
    url: String,
    #[serde(default)]
    symbols: Vec<Symbol>,
    published_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl Article {
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn content(&self) -> &str {
        &self.content
    }
    pub fn summary(&self) -> &str {
        &self.summary
    }
    pub fn source(&self) -> &str {
        &self.source
    }
    pub fn category(&self) -> &str {
        &self.category
    }
    pub fn url(&self) -> &str {
        &self.url
    }
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Composite key sinks use to tell records apart across sources.
    pub fn key(&self) -> (String, String) {
        (self.source.clone(), self.id.clone())
    }
}

/// Adapter-side builder. Fields are raw provider values; `into_article`
/// cleans them and enforces the `Article` invariants.
#[derive(Debug, Clone, Default)]
pub struct ArticleDraft {
    pub id: String,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub category: String,
    pub url: String,
    pub symbols: Vec<Symbol>,
    /// `None` when the upstream time was missing or unparseable.
    pub published_at: Option<DateTime<Utc>>,
}

impl ArticleDraft {
    pub fn into_article(
        self,
        source: &str,
        fallback_published_at: DateTime<Utc>,
    ) -> Result<Article, InvalidArticle> {
        let id = self.id.trim().to_string();
        let source = source.trim().to_string();
        let title = clean_text(&self.title);
        let content = clean_text(&self.content);

        if id.is_empty() {
            return Err(InvalidArticle::MissingField("id"));
        }
        if source.is_empty() {
            return Err(InvalidArticle::MissingField("source"));
        }
        if title.is_empty() {
            return Err(InvalidArticle::MissingField("title"));
        }

        let summary = match self.summary.as_deref().map(clean_text) {
            Some(s) if !s.is_empty() => s,
            _ => truncate_summary(&content, SUMMARY_MAX_CHARS),
        };

        Ok(Article {
            id,
            title,
            content,
            summary,
            source,
            category: self.category,
            url: self.url,
            symbols: self.symbols,
            published_at: self.published_at.unwrap_or(fallback_published_at),
            created_at: monotonic_now(),
        })
    }
}

/// First `max_chars` characters plus the marker; unchanged when short enough.
pub fn truncate_summary(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        None => content.to_string(),
        Some((cut, _)) => format!("{}{}", &content[..cut], TRUNCATION_MARKER),
    }
}

static LAST_STAMP_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Wall clock clamped so it never goes backwards within the process.
pub fn monotonic_now() -> DateTime<Utc> {
    let now = Utc::now();
    let micros = now.timestamp_micros();
    let prev = LAST_STAMP_MICROS.fetch_max(micros, Ordering::SeqCst);
    if prev > micros {
        DateTime::from_timestamp_micros(prev).unwrap_or(now)
    } else {
        now
    }
}
