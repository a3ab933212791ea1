//! Extraction runner: one extraction from fetch to audit, with bounded retry.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{error, info, warn};

use crate::core::aggregate::{aggregate, AggregationError};
use crate::core::dlq::DeadLetterQueue;
use crate::core::domain::{ExtractionStatus, FailedExtraction, PERIODS_PER_DAY};
use crate::core::sink::{AuditRecord, AuditSink, ReportSink};
use crate::core::source::TradeSource;
use crate::core::time::{Clock, TradingCalendar};
use crate::error::{Error, Result};

use super::ShutdownToken;

/// Environment variable consulted for a per-extraction run-time override.
pub const RUNTIME_OVERRIDE_ENV: &str = "DOTNET_RUNTIME";

/// Message recorded on a dead-letter entry when the retry budget runs out.
const EXHAUSTED_MESSAGE: &str = "All retry attempts exhausted";

/// Result of replaying one dead-letter entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    Recovered,
    Failed,
    Cancelled,
}

impl RecoveryOutcome {
    #[must_use]
    pub const fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered)
    }
}

enum AttemptOutcome {
    Success,
    Cancelled,
    Failed(Error),
}

/// Runs one extraction: resolve the effective run time, fetch, aggregate,
/// write the snapshot, and always leave exactly one audit row per attempt.
pub struct ExtractionRunner {
    source: Arc<dyn TradeSource>,
    report: Arc<dyn ReportSink>,
    audit: Arc<dyn AuditSink>,
    dlq: Arc<dyn DeadLetterQueue>,
    clock: Arc<dyn Clock>,
    calendar: TradingCalendar,
    retry_attempts: u32,
    retry_delay: Duration,
    run_time_override: Option<DateTime<Utc>>,
}

impl ExtractionRunner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Arc<dyn TradeSource>,
        report: Arc<dyn ReportSink>,
        audit: Arc<dyn AuditSink>,
        dlq: Arc<dyn DeadLetterQueue>,
        clock: Arc<dyn Clock>,
        calendar: TradingCalendar,
        retry_attempts: u32,
        retry_delay: Duration,
        run_time_override: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            source,
            report,
            audit,
            dlq,
            clock,
            calendar,
            retry_attempts,
            retry_delay,
            run_time_override,
        }
    }

    /// Run a scheduled extraction at `at`, retrying up to the configured
    /// budget and enqueueing a dead-letter entry on exhaustion.
    ///
    /// Only a dead-letter enqueue failure escapes; everything else is
    /// terminal inside the runner.
    pub async fn run(&self, at: DateTime<Utc>, shutdown: &ShutdownToken) -> Result<()> {
        let extraction_time = self.effective_run_time(at);
        let target_date = self.calendar.date_of(extraction_time);
        info!(%extraction_time, %target_date, "Extraction starting");

        for attempt in 1..=self.retry_attempts {
            let is_final = attempt == self.retry_attempts;
            let outcome = self
                .attempt(extraction_time, target_date, attempt, is_final, false, shutdown)
                .await;

            match outcome {
                AttemptOutcome::Success => return Ok(()),
                AttemptOutcome::Cancelled => {
                    info!(attempt, "Extraction cancelled");
                    return Ok(());
                }
                AttemptOutcome::Failed(err) if !is_final => {
                    warn!(attempt, error = %err, "Attempt failed, retrying after delay");
                    if !self.sleep_between_attempts(shutdown).await {
                        info!("Shutdown during retry delay, abandoning extraction");
                        return Ok(());
                    }
                }
                AttemptOutcome::Failed(err) => {
                    error!(attempt, error = %err, "Retry budget exhausted, enqueueing dead-letter entry");
                    let entry = FailedExtraction::new(
                        extraction_time,
                        self.clock.now_utc(),
                        self.retry_attempts,
                        EXHAUSTED_MESSAGE,
                    );
                    self.dlq.enqueue(entry)?;
                }
            }
        }

        Ok(())
    }

    /// Replay a dead-letter entry: a single attempt at the saved extraction
    /// time, with the audit attempt counter continuing past the original
    /// retry budget.
    pub async fn run_recovery(
        &self,
        entry: &FailedExtraction,
        shutdown: &ShutdownToken,
    ) -> RecoveryOutcome {
        let target_date = self.calendar.date_of(entry.extraction_time_utc);
        let attempt = entry.retry_count + 1;
        info!(
            extraction_time = %entry.extraction_time_utc,
            %target_date,
            attempt,
            "Replaying dead-letter entry"
        );

        match self
            .attempt(entry.extraction_time_utc, target_date, attempt, true, true, shutdown)
            .await
        {
            AttemptOutcome::Success => RecoveryOutcome::Recovered,
            AttemptOutcome::Cancelled => RecoveryOutcome::Cancelled,
            AttemptOutcome::Failed(err) => {
                warn!(error = %err, "Dead-letter replay failed");
                RecoveryOutcome::Failed
            }
        }
    }

    /// Override priority: environment variable, then configured run time,
    /// then the scheduler-supplied wall time. The environment is read fresh
    /// per extraction so operators can retarget a live service.
    fn effective_run_time(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        if let Ok(raw) = std::env::var(RUNTIME_OVERRIDE_ENV) {
            match DateTime::parse_from_rfc3339(&raw) {
                Ok(parsed) => {
                    let utc = parsed.with_timezone(&Utc);
                    info!(%utc, "Using runtime override from environment");
                    return utc;
                }
                Err(err) => {
                    warn!(raw = %raw, error = %err, "Ignoring unparseable runtime override");
                }
            }
        }
        if let Some(configured) = self.run_time_override {
            return configured;
        }
        at
    }

    /// One attempt plus its audit row; the row is always emitted and audit
    /// failures never escape.
    async fn attempt(
        &self,
        extraction_time: DateTime<Utc>,
        target_date: NaiveDate,
        attempt: u32,
        is_final: bool,
        recovery: bool,
        shutdown: &ShutdownToken,
    ) -> AttemptOutcome {
        let start_local = self.calendar.to_local(self.clock.now_utc());
        let result = self
            .attempt_pipeline(extraction_time, target_date, shutdown)
            .await;
        let end_local = self.calendar.to_local(self.clock.now_utc());

        let (status, error_message, report_file_name) = match &result {
            Ok(path) => {
                let status = if recovery {
                    ExtractionStatus::RecoveredFromDlq
                } else {
                    ExtractionStatus::Done
                };
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned());
                (status, None, file_name)
            }
            Err(Error::Cancelled) => (
                ExtractionStatus::Cancelled,
                Some(Error::Cancelled.to_string()),
                None,
            ),
            Err(err) => {
                let status = if is_final {
                    ExtractionStatus::Failed
                } else {
                    ExtractionStatus::RetryAttempt
                };
                (status, Some(err.to_string()), None)
            }
        };

        let record = AuditRecord {
            start_local,
            end_local,
            target_date,
            status,
            attempt,
            error_message,
            report_file_name,
        };
        if let Err(err) = self.audit.log_attempt(&record) {
            warn!(error = %err, "Failed to append audit row");
        }

        match result {
            Ok(_) => AttemptOutcome::Success,
            Err(Error::Cancelled) => AttemptOutcome::Cancelled,
            Err(err) => AttemptOutcome::Failed(err),
        }
    }

    /// Fetch, aggregate, assert full period coverage, write the snapshot.
    async fn attempt_pipeline(
        &self,
        extraction_time: DateTime<Utc>,
        target_date: NaiveDate,
        shutdown: &ShutdownToken,
    ) -> Result<PathBuf> {
        let trades = tokio::select! {
            _ = shutdown.cancelled() => return Err(Error::Cancelled),
            trades = self.source.fetch(target_date) => trades?,
        };

        if shutdown.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let positions = aggregate(&trades, target_date, &self.calendar)?;
        if positions.len() != PERIODS_PER_DAY {
            return Err(AggregationError::IncompletePositions {
                count: positions.len(),
            }
            .into());
        }

        if shutdown.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let extraction_local = self.calendar.to_local(extraction_time);
        self.report.write(&positions, &extraction_local)
    }

    /// Returns false when the delay was interrupted by shutdown.
    async fn sleep_between_attempts(&self, shutdown: &ShutdownToken) -> bool {
        tokio::select! {
            _ = shutdown.cancelled() => false,
            () = tokio::time::sleep(self.retry_delay) => true,
        }
    }
}
