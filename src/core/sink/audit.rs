//! Execution audit sink.
//!
//! One CSV file per local calendar day, keyed on the attempt's end time.
//! Rows are append-only; the header is written once when the file is created.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use parking_lot::Mutex;
use tracing::debug;

use crate::core::domain::ExtractionStatus;
use crate::core::sink::escape_field;
use crate::error::{ConfigError, Error, Result};

const AUDIT_HEADER: &str =
    "StartTimeLocal,EndTimeLocal,TargetDate,DurationSeconds,Status,Attempt,ErrorMessage,ReportFileName";

/// One extraction attempt, as recorded in the audit trail.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub start_local: DateTime<Tz>,
    pub end_local: DateTime<Tz>,
    pub target_date: NaiveDate,
    pub status: ExtractionStatus,
    /// 1-based attempt counter; recovery attempts continue past the retry
    /// budget.
    pub attempt: u32,
    pub error_message: Option<String>,
    pub report_file_name: Option<String>,
}

/// Capability consumed by the extraction runner: record one attempt.
pub trait AuditSink: Send + Sync {
    fn log_attempt(&self, record: &AuditRecord) -> Result<()>;
}

/// Appending CSV audit log with daily rotation.
#[derive(Debug)]
pub struct CsvAuditLog {
    audit_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvAuditLog {
    /// Create the log, ensuring the audit directory exists.
    pub fn new(audit_dir: impl AsRef<Path>) -> Result<Self> {
        let audit_dir = audit_dir.as_ref();
        if audit_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "audit_directory",
            }
            .into());
        }
        fs::create_dir_all(audit_dir)?;

        Ok(Self {
            audit_dir: audit_dir.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    fn format_row(record: &AuditRecord) -> String {
        let duration_seconds =
            (record.end_local - record.start_local).num_milliseconds() as f64 / 1000.0;

        let fields = [
            record.start_local.format("%Y-%m-%d %H:%M:%S").to_string(),
            record.end_local.format("%Y-%m-%d %H:%M:%S").to_string(),
            record.target_date.format("%Y-%m-%d").to_string(),
            format!("{duration_seconds:.2}"),
            record.status.to_string(),
            record.attempt.to_string(),
            record.error_message.clone().unwrap_or_default(),
            record.report_file_name.clone().unwrap_or_default(),
        ];

        fields
            .iter()
            .map(|f| escape_field(f).into_owned())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl AuditSink for CsvAuditLog {
    fn log_attempt(&self, record: &AuditRecord) -> Result<()> {
        if record.attempt < 1 {
            return Err(Error::InvalidArgument {
                field: "attempt",
                reason: "must be at least 1".to_string(),
            });
        }

        let filename = format!("ExecutionAudit_{}.csv", record.end_local.format("%Y%m%d"));
        let path = self.audit_dir.join(filename);
        let row = Self::format_row(record);

        {
            let _guard = self.write_lock.lock();
            let is_new = !path.exists();
            let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
            if is_new {
                writeln!(file, "{AUDIT_HEADER}")?;
            }
            writeln!(file, "{row}")?;
        }

        debug!(path = %path.display(), status = %record.status, attempt = record.attempt, "Audit row appended");
        Ok(())
    }
}
