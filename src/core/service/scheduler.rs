//! Scheduler: startup dead-letter drain, initial run, periodic ticks.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::core::dlq::DeadLetterQueue;
use crate::core::domain::FailedExtraction;
use crate::core::time::Clock;

use super::runner::{ExtractionRunner, RecoveryOutcome};
use super::ShutdownToken;

/// Drives the extraction runner until shutdown. Runs never overlap: an
/// in-flight extraction delays the next tick, and ticks missed during a long
/// run coalesce into a single one.
pub struct Scheduler {
    runner: Arc<ExtractionRunner>,
    dlq: Arc<dyn DeadLetterQueue>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    shutdown: ShutdownToken,
}

impl Scheduler {
    pub fn new(
        runner: Arc<ExtractionRunner>,
        dlq: Arc<dyn DeadLetterQueue>,
        clock: Arc<dyn Clock>,
        interval: Duration,
        shutdown: ShutdownToken,
    ) -> Self {
        Self {
            runner,
            dlq,
            clock,
            interval,
            shutdown,
        }
    }

    /// Run until the shutdown token fires. Business failures never end the
    /// loop; they are logged and the next tick proceeds.
    pub async fn run(&self) {
        info!(interval_secs = self.interval.as_secs(), "Scheduler starting");

        self.drain_dlq().await;
        if self.shutdown.is_cancelled() {
            info!("Scheduler stopping");
            return;
        }

        self.run_once().await;

        let mut ticker =
            tokio::time::interval_at(tokio::time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Scheduler stopping");
                    return;
                }
                _ = ticker.tick() => {
                    self.run_once().await;
                }
            }
        }
    }

    async fn run_once(&self) {
        if let Err(err) = self.runner.run(self.clock.now_utc(), &self.shutdown).await {
            error!(error = %err, "Extraction run failed");
        }
    }

    /// Atomically take every dead-letter entry and replay it, oldest first.
    /// A failed replay re-enqueues the entry with an incremented retry count;
    /// shutdown re-enqueues whatever is left untouched and stops.
    async fn drain_dlq(&self) {
        let entries = match self.dlq.dequeue_all() {
            Ok(entries) => entries,
            Err(err) => {
                error!(error = %err, "Failed to drain dead-letter queue");
                return;
            }
        };
        if entries.is_empty() {
            return;
        }

        info!(entries = entries.len(), "Draining dead-letter queue");

        let mut pending = entries.into_iter();
        while let Some(entry) = pending.next() {
            if self.shutdown.is_cancelled() {
                self.requeue_unprocessed(entry, pending);
                return;
            }

            match self.runner.run_recovery(&entry, &self.shutdown).await {
                RecoveryOutcome::Recovered => {}
                RecoveryOutcome::Failed => {
                    let requeued = FailedExtraction::new(
                        entry.extraction_time_utc,
                        self.clock.now_utc(),
                        entry.retry_count + 1,
                        entry.last_error.clone(),
                    );
                    if let Err(err) = self.dlq.enqueue(requeued) {
                        error!(error = %err, "Failed to re-enqueue dead-letter entry");
                    }
                }
                RecoveryOutcome::Cancelled => {
                    self.requeue_unprocessed(entry, pending);
                    return;
                }
            }
        }
    }

    /// Put an interrupted entry and the rest of the drain back, unchanged.
    fn requeue_unprocessed(
        &self,
        current: FailedExtraction,
        rest: impl Iterator<Item = FailedExtraction>,
    ) {
        for entry in std::iter::once(current).chain(rest) {
            if let Err(err) = self.dlq.enqueue(entry) {
                error!(error = %err, "Failed to re-enqueue dead-letter entry on shutdown");
            }
        }
    }
}
