//! Runs a single ingestion cycle with the configured adapters and sink, then
//! prints the cycle report. Exits non-zero when any adapter or write failed.

use newscrawler::config::CrawlerConfig;
use newscrawler::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = CrawlerConfig::load_default()?;
    let pipeline = newscrawler::build_pipeline(&cfg)?;
    let report = pipeline.run_cycle().await;
    report.log();

    println!(
        "adapters={} failed={} forwarded={} failed_writes={} elapsed_ms={}",
        report.adapters_attempted,
        report.adapter_failures.len(),
        report.articles_forwarded,
        report.write_failures.len(),
        report.elapsed.as_millis()
    );
    for f in &report.adapter_failures {
        println!("  {} [{}]: {}", f.source, f.kind, f.reason);
    }

    if !report.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}
