//! newscrawler worker: binary entrypoint.
//! Loads config, wires adapters + sink into the crawl scheduler and runs it
//! until SIGINT/SIGTERM, then waits out the shutdown grace period.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use newscrawler::config::CrawlerConfig;
use newscrawler::ingest::CrawlScheduler;
use newscrawler::telemetry::{init_tracing, Metrics};

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    tracing::info!("starting newscrawler worker");
    let cfg = CrawlerConfig::load_default().context("loading crawler config")?;
    let pipeline = newscrawler::build_pipeline(&cfg)?;
    let token = CancellationToken::new();

    let metrics_task = match cfg.metrics.listen_addr()? {
        Some(addr) => {
            let metrics = Metrics::init(cfg.scheduler.interval_secs, pipeline.adapter_names().len())?;
            let token = token.clone();
            Some(tokio::spawn(async move {
                if let Err(e) = metrics.serve(addr, token).await {
                    tracing::error!(error = ?e, "metrics endpoint failed");
                }
            }))
        }
        None => None,
    };

    let scheduler = CrawlScheduler::new(pipeline, cfg.scheduler.interval());
    let handle = scheduler.spawn(token.clone());

    shutdown_signal().await;
    tracing::info!("shutting down worker...");
    token.cancel();

    let grace = cfg.scheduler.shutdown_grace();
    match tokio::time::timeout(grace, handle.join()).await {
        Ok(Ok(cycles)) => tracing::info!(cycles, "collector finished"),
        Ok(Err(e)) => tracing::error!(error = %e, "collector task failed"),
        Err(_) => tracing::warn!(
            grace_secs = grace.as_secs(),
            "in-flight cycle did not finish within grace period"
        ),
    }
    if let Some(task) = metrics_task {
        task.abort();
    }

    tracing::info!("worker exited");
    Ok(())
}
