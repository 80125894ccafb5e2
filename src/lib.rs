// src/lib.rs
// Public library surface for the worker binaries and integration tests.

pub mod config;
pub mod ingest;
pub mod telemetry;

use std::sync::Arc;

use crate::config::CrawlerConfig;
use crate::ingest::{providers, sink, IngestPipeline, RecordSink};

/// Wire adapters and the configured sink into a pipeline.
pub fn build_pipeline(cfg: &CrawlerConfig) -> anyhow::Result<IngestPipeline> {
    let adapters = providers::build_adapters(cfg)?;
    let sink: Arc<dyn RecordSink> = sink::build_sink(&cfg.sink);
    Ok(IngestPipeline::new(adapters, sink))
}
