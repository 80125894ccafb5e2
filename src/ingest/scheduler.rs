// src/ingest/scheduler.rs
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::ingest::pipeline::IngestPipeline;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    /// Cancellation observed while a cycle was in flight.
    Stopping,
    Stopped,
}

/// Drives the pipeline: one cycle right away, then one per tick.
pub struct CrawlScheduler {
    pipeline: IngestPipeline,
    interval: Duration,
    state: watch::Sender<SchedulerState>,
}

impl CrawlScheduler {
    /// Panics if `interval` is zero.
    pub fn new(pipeline: IngestPipeline, interval: Duration) -> Self {
        assert!(!interval.is_zero(), "crawl interval must be non-zero");
        let (state, _) = watch::channel(SchedulerState::Idle);
        Self {
            pipeline,
            interval,
            state,
        }
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    pub fn spawn(self, token: CancellationToken) -> SchedulerHandle {
        let state = self.state.subscribe();
        let task = tokio::spawn(self.run(token));
        SchedulerHandle { task, state }
    }

    /// Returns the number of cycles run once cancelled.
    pub async fn run(self, token: CancellationToken) -> u64 {
        self.state.send_replace(SchedulerState::Running);
        tracing::info!(
            target: "ingest",
            interval_secs = self.interval.as_secs(),
            adapters = ?self.pipeline.adapter_names(),
            "collector started"
        );

        // First tick of a tokio interval completes immediately.
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut cycles = 0u64;
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let cycle = self.pipeline.run_cycle();
            tokio::pin!(cycle);
            let report = tokio::select! {
                report = &mut cycle => report,
                _ = token.cancelled() => {
                    self.state.send_replace(SchedulerState::Stopping);
                    tracing::info!(target: "ingest", "cancellation received, finishing in-flight cycle");
                    cycle.await
                }
            };
            report.log();
            cycles += 1;

            if token.is_cancelled() {
                break;
            }
        }

        self.state.send_replace(SchedulerState::Stopping);
        drop(ticker);
        self.state.send_replace(SchedulerState::Stopped);
        tracing::info!(target: "ingest", cycles, "collector stopped");
        cycles
    }
}

pub struct SchedulerHandle {
    task: JoinHandle<u64>,
    state: watch::Receiver<SchedulerState>,
}

impl SchedulerHandle {
    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<SchedulerState> {
        self.state.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the loop to exit; yields the cycle count.
    pub async fn join(self) -> Result<u64, tokio::task::JoinError> {
        self.task.await
    }
}
