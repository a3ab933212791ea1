//! Capability wiring and service lifecycle.
//!
//! Builds the capability graph the engine consumes and hands it to the
//! scheduler. Nothing outside these seams is shared between components.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::app::config::Config;
use crate::core::dlq::{DeadLetterQueue, FileDeadLetterQueue};
use crate::core::service::{shutdown_channel, ExtractionRunner, Scheduler, ShutdownToken};
use crate::core::sink::{AuditSink, CsvAuditLog, CsvReportWriter, ReportSink};
use crate::core::source::{SimulatedTradeSource, TradeSource};
use crate::core::time::{Clock, SystemClock, TradingCalendar};
use crate::error::Result;

/// Main application orchestrator.
pub struct Orchestrator;

impl Orchestrator {
    /// Run until the process is signalled.
    pub async fn run(config: Config) -> Result<()> {
        let (_trigger, shutdown) = shutdown_channel();
        Self::run_with_shutdown(config, shutdown).await
    }

    pub async fn run_with_shutdown(config: Config, shutdown: ShutdownToken) -> Result<()> {
        let calendar = TradingCalendar::new(config.time_zone()?);
        info!(
            zone = %config.time_zone_id,
            interval_minutes = config.interval_minutes,
            retry_attempts = config.retry_attempts,
            "Starting powerpos"
        );

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let source: Arc<dyn TradeSource> =
            Arc::new(SimulatedTradeSource::new(config.source.trades));
        let report: Arc<dyn ReportSink> = Arc::new(CsvReportWriter::new(&config.output_directory)?);
        let audit: Arc<dyn AuditSink> = Arc::new(CsvAuditLog::new(&config.audit_directory)?);
        let dlq: Arc<dyn DeadLetterQueue> = Arc::new(FileDeadLetterQueue::new(&config.dlq_directory)?);

        let runner = Arc::new(ExtractionRunner::new(
            source,
            report,
            audit,
            Arc::clone(&dlq),
            Arc::clone(&clock),
            calendar,
            config.retry_attempts,
            Duration::from_secs(config.retry_delay_seconds),
            config.run_time,
        ));

        let scheduler = Scheduler::new(
            runner,
            dlq,
            clock,
            Duration::from_secs(config.interval_minutes * 60),
            shutdown,
        );
        scheduler.run().await;

        Ok(())
    }
}

/// Outcome of probing the static configuration before startup: one named
/// result per probe, `Err` carrying the reason.
#[derive(Debug)]
pub struct HealthReport {
    pub checks: Vec<(&'static str, std::result::Result<(), String>)>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.checks.iter().all(|(_, result)| result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.checks
            .iter()
            .filter_map(|(name, result)| result.as_ref().err().map(|reason| (*name, reason.as_str())))
    }
}

/// Probe everything the service needs before it would refuse to start.
pub fn health_check(config: &Config) -> HealthReport {
    fn require_dir(value: &str) -> std::result::Result<(), String> {
        if value.trim().is_empty() {
            Err("path is empty".to_string())
        } else {
            Ok(())
        }
    }

    fn require_positive(value: u64, what: &str) -> std::result::Result<(), String> {
        if value == 0 {
            Err(format!("{what} must be at least 1"))
        } else {
            Ok(())
        }
    }

    HealthReport {
        checks: vec![
            ("output_directory", require_dir(&config.output_directory)),
            ("audit_directory", require_dir(&config.audit_directory)),
            ("dlq_directory", require_dir(&config.dlq_directory)),
            (
                "time_zone",
                config.time_zone().map(|_| ()).map_err(|err| err.to_string()),
            ),
            (
                "schedule",
                require_positive(config.interval_minutes, "interval_minutes"),
            ),
            (
                "retry_budget",
                require_positive(u64::from(config.retry_attempts), "retry_attempts")
                    .and_then(|()| require_positive(config.retry_delay_seconds, "retry_delay_seconds")),
            ),
        ],
    }
}
