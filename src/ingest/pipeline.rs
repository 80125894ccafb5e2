// src/ingest/pipeline.rs
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use metrics::{counter, gauge, histogram};

use crate::ingest::ensure_metrics_described;
use crate::ingest::types::{RecordSink, SourceAdapter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterFailure {
    pub source: &'static str,
    pub kind: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub source: String,
    pub id: String,
    pub reason: String,
}

/// Outcome of one cycle, handed to logging; not retained.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub adapters_attempted: usize,
    pub adapter_failures: Vec<AdapterFailure>,
    pub articles_forwarded: usize,
    pub write_failures: Vec<WriteFailure>,
}

impl CycleReport {
    pub fn is_clean(&self) -> bool {
        self.adapter_failures.is_empty() && self.write_failures.is_empty()
    }

    pub fn log(&self) {
        for f in &self.adapter_failures {
            tracing::warn!(
                target: "ingest",
                source = f.source,
                kind = f.kind,
                error = %f.reason,
                "adapter crawl error"
            );
        }
        for f in &self.write_failures {
            tracing::warn!(
                target: "ingest",
                source = %f.source,
                id = %f.id,
                error = %f.reason,
                "sink write error"
            );
        }
        tracing::info!(
            target: "ingest",
            started_at = %self.started_at.to_rfc3339(),
            adapters = self.adapters_attempted,
            failed_adapters = self.adapter_failures.len(),
            forwarded = self.articles_forwarded,
            failed_writes = self.write_failures.len(),
            elapsed_ms = self.elapsed.as_millis() as u64,
            "crawling completed"
        );
    }
}

/// One fetch-and-forward pass over a fixed set of adapters.
#[derive(Clone)]
pub struct IngestPipeline {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    sink: Arc<dyn RecordSink>,
}

impl IngestPipeline {
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>, sink: Arc<dyn RecordSink>) -> Self {
        Self { adapters, sink }
    }

    pub fn adapter_names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    pub async fn run_cycle(&self) -> CycleReport {
        ensure_metrics_described();

        let started_at = Utc::now();
        let t0 = Instant::now();
        tracing::debug!(target: "ingest", adapters = self.adapters.len(), "starting crawling");

        // Fan-out is bounded by the adapter list; each outcome stands alone.
        let outcomes = join_all(self.adapters.iter().map(|adapter| async move {
            let t = Instant::now();
            let res = adapter.fetch_and_parse().await;
            histogram!("crawl_fetch_ms", "source" => adapter.name())
                .record(t.elapsed().as_secs_f64() * 1_000.0);
            (adapter.name(), res)
        }))
        .await;

        let mut adapter_failures = Vec::new();
        let mut articles = Vec::new();
        for (name, res) in outcomes {
            match res {
                Ok(mut v) => {
                    counter!("crawl_articles_fetched_total", "source" => name)
                        .increment(v.len() as u64);
                    articles.append(&mut v);
                }
                Err(e) => {
                    counter!("crawl_adapter_errors_total", "source" => name, "kind" => e.kind())
                        .increment(1);
                    adapter_failures.push(AdapterFailure {
                        source: name,
                        kind: e.kind(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let mut articles_forwarded = 0usize;
        let mut write_failures = Vec::new();
        for article in &articles {
            match self.sink.write(article).await {
                Ok(()) => {
                    articles_forwarded += 1;
                    counter!("crawl_articles_forwarded_total", "source" => article.source().to_string())
                        .increment(1);
                }
                Err(e) => {
                    counter!("crawl_sink_errors_total", "source" => article.source().to_string())
                        .increment(1);
                    write_failures.push(WriteFailure {
                        source: article.source().to_string(),
                        id: article.id().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let elapsed = t0.elapsed();
        counter!("crawl_cycles_total").increment(1);
        histogram!("crawl_cycle_ms").record(elapsed.as_secs_f64() * 1_000.0);
        gauge!("crawl_last_cycle_ts").set(Utc::now().timestamp() as f64);

        CycleReport {
            started_at,
            elapsed,
            adapters_attempted: self.adapters.len(),
            adapter_failures,
            articles_forwarded,
            write_failures,
        }
    }
}
