// src/ingest/types.rs
use crate::ingest::article::Article;
use crate::ingest::error::{AdapterError, SinkError};

/// One upstream provider: fetch raw content and turn it into articles.
///
/// Implementations own their HTTP client and hold no shared mutable state.
/// An `Err` means the adapter produced nothing this cycle (transport, status
/// or whole-body decode failure); item-level problems are recovered inside.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch_and_parse(&self) -> Result<Vec<Article>, AdapterError>;
}

/// Storage collaborator. Called once per article per cycle.
#[async_trait::async_trait]
pub trait RecordSink: Send + Sync {
    async fn write(&self, article: &Article) -> Result<(), SinkError>;
}
