// src/ingest/sink.rs
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::AsyncWriteExt;

use crate::config::{SinkConfig, SinkKind};
use crate::ingest::article::Article;
use crate::ingest::error::SinkError;
use crate::ingest::types::RecordSink;

/// Logs each article and stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait::async_trait]
impl RecordSink for LogSink {
    async fn write(&self, article: &Article) -> Result<(), SinkError> {
        tracing::info!(
            target: "ingest",
            source = article.source(),
            id = article.id(),
            published_at = %article.published_at(),
            "crawled: {}",
            article.title()
        );
        Ok(())
    }
}

/// Records kept by a `MemorySink` when no capacity is given.
pub const DEFAULT_MEMORY_CAPACITY: usize = 10_000;

/// In-memory store keyed by `(source, id)`. Re-writing a key replaces the
/// stored record in place; past `capacity` distinct keys the oldest
/// inserted one is evicted.
#[derive(Debug)]
pub struct MemorySink {
    capacity: usize,
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    map: HashMap<(String, String), Article>,
    order: VecDeque<(String, String)>,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(MemoryInner::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, source: &str, id: &str) -> Option<Article> {
        let inner = self.inner.lock();
        inner.map.get(&(source.to_string(), id.to_string())).cloned()
    }

    /// Newest first, by `published_at`; `category` narrows when given.
    pub fn latest(&self, category: Option<&str>, limit: usize) -> Vec<Article> {
        let inner = self.inner.lock();
        let mut all: Vec<Article> = inner
            .map
            .values()
            .filter(|a| category.map_or(true, |c| a.category() == c))
            .cloned()
            .collect();
        all.sort_by(|a, b| b.published_at().cmp(&a.published_at()));
        all.truncate(limit);
        all
    }
}

#[async_trait::async_trait]
impl RecordSink for MemorySink {
    async fn write(&self, article: &Article) -> Result<(), SinkError> {
        let mut inner = self.inner.lock();
        let key = article.key();
        if inner.map.insert(key.clone(), article.clone()).is_none() {
            inner.order.push_back(key);
            while inner.map.len() > self.capacity {
                let Some(oldest) = inner.order.pop_front() else {
                    break;
                };
                inner.map.remove(&oldest);
            }
        }
        Ok(())
    }
}

/// Appends one JSON object per line. No deduplication.
#[derive(Debug)]
pub struct JsonlSink {
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }
}

#[async_trait::async_trait]
impl RecordSink for JsonlSink {
    async fn write(&self, article: &Article) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(article)?;
        line.push(b'\n');

        let _guard = self.lock.lock().await;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

pub fn build_sink(cfg: &SinkConfig) -> Arc<dyn RecordSink> {
    match cfg.kind {
        SinkKind::Log => Arc::new(LogSink),
        SinkKind::Memory => Arc::new(MemorySink::with_capacity(cfg.capacity)),
        SinkKind::Jsonl => Arc::new(JsonlSink::new(&cfg.path)),
    }
}
