use std::fs;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tempfile::TempDir;

use powerpos::core::dlq::{DeadLetterQueue, FileDeadLetterQueue};
use powerpos::core::service::{ExtractionRunner, Scheduler, ShutdownToken};
use powerpos::core::sink::{AuditSink, CsvAuditLog, CsvReportWriter, ReportSink};
use powerpos::core::source::TradeSource;
use powerpos::core::time::{Clock, TradingCalendar};

use super::clock::FixedClock;
use super::source::ScriptedTradeSource;

pub const DEFAULT_NOW: &str = "2025-12-10T14:05:00Z";

pub struct RigOptions {
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    pub run_time: Option<DateTime<Utc>>,
    pub now: DateTime<Utc>,
}

impl Default for RigOptions {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            retry_delay: Duration::from_millis(20),
            run_time: None,
            now: DEFAULT_NOW.parse().unwrap(),
        }
    }
}

/// A fully wired extraction engine over temp directories and test doubles.
pub struct Rig {
    pub temp: TempDir,
    pub source: Arc<ScriptedTradeSource>,
    pub clock: Arc<FixedClock>,
    pub dlq: Arc<FileDeadLetterQueue>,
    pub runner: Arc<ExtractionRunner>,
}

impl Rig {
    pub fn new(source: ScriptedTradeSource, options: RigOptions) -> Self {
        let temp = tempfile::tempdir().expect("create temp dir");
        let calendar = TradingCalendar::new("Europe/London".parse().unwrap());

        let source = Arc::new(source);
        let clock = Arc::new(FixedClock::at(options.now));
        let report: Arc<dyn ReportSink> =
            Arc::new(CsvReportWriter::new(temp.path().join("reports")).unwrap());
        let audit: Arc<dyn AuditSink> =
            Arc::new(CsvAuditLog::new(temp.path().join("audit")).unwrap());
        let dlq = Arc::new(FileDeadLetterQueue::new(temp.path().join("dlq")).unwrap());

        let runner = Arc::new(ExtractionRunner::new(
            Arc::clone(&source) as Arc<dyn TradeSource>,
            report,
            audit,
            Arc::clone(&dlq) as Arc<dyn DeadLetterQueue>,
            Arc::clone(&clock) as Arc<dyn Clock>,
            calendar,
            options.retry_attempts,
            options.retry_delay,
            options.run_time,
        ));

        Self {
            temp,
            source,
            clock,
            dlq,
            runner,
        }
    }

    pub fn scheduler(&self, interval: Duration, shutdown: ShutdownToken) -> Scheduler {
        Scheduler::new(
            Arc::clone(&self.runner),
            Arc::clone(&self.dlq) as Arc<dyn DeadLetterQueue>,
            Arc::clone(&self.clock) as Arc<dyn Clock>,
            interval,
            shutdown,
        )
    }

    /// Names of snapshot files written so far, sorted.
    pub fn report_files(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = fs::read_dir(self.temp.path().join("reports")) {
            for entry in entries.flatten() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        names
    }

    pub fn report_content(&self, file_name: &str) -> String {
        fs::read_to_string(self.temp.path().join("reports").join(file_name)).unwrap()
    }

    /// All audit data rows across every daily file, in file order.
    pub fn audit_rows(&self) -> Vec<String> {
        let mut rows = Vec::new();
        let mut files = Vec::new();
        if let Ok(entries) = fs::read_dir(self.temp.path().join("audit")) {
            for entry in entries.flatten() {
                files.push(entry.path());
            }
        }
        files.sort();
        for path in files {
            let content = fs::read_to_string(path).unwrap();
            rows.extend(content.lines().skip(1).map(str::to_string));
        }
        rows
    }
}
