//! Extraction lifecycle types: audit status taxonomy and dead-letter entries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal status of a single extraction attempt.
///
/// Every attempt emits exactly one audit row carrying one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStatus {
    /// Normal success.
    Done,
    /// Success while replaying a dead-letter entry.
    RecoveredFromDlq,
    /// Non-final attempt failed with a retryable error.
    RetryAttempt,
    /// Final attempt failed.
    Failed,
    /// Cancellation observed during the attempt.
    Cancelled,
}

impl ExtractionStatus {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Done | Self::RecoveredFromDlq)
    }
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Done => "Done",
            Self::RecoveredFromDlq => "RecoveredFromDLQ",
            Self::RetryAttempt => "RetryAttempt",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

/// A persisted record of an extraction that exhausted its retry budget.
///
/// Serialized field names are the canonical spellings of the queue document;
/// aliases accept the camelCase and lowercase variants older writers used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedExtraction {
    /// The effective run time of the failed extraction. Identifies the entry:
    /// the queue holds at most one record per extraction time.
    #[serde(
        rename = "ExtractionTimeUtc",
        alias = "extractionTimeUtc",
        alias = "extractiontimeutc"
    )]
    pub extraction_time_utc: DateTime<Utc>,

    /// When the final attempt failed.
    #[serde(rename = "FailedAtUtc", alias = "failedAtUtc", alias = "failedatutc")]
    pub failed_at_utc: DateTime<Utc>,

    /// Attempts consumed so far, across the original run and any replays.
    #[serde(rename = "RetryCount", alias = "retryCount", alias = "retrycount")]
    pub retry_count: u32,

    /// Message of the last failure.
    #[serde(rename = "LastError", alias = "lastError", alias = "lasterror")]
    pub last_error: String,
}

impl FailedExtraction {
    #[must_use]
    pub fn new(
        extraction_time_utc: DateTime<Utc>,
        failed_at_utc: DateTime<Utc>,
        retry_count: u32,
        last_error: impl Into<String>,
    ) -> Self {
        Self {
            extraction_time_utc,
            failed_at_utc,
            retry_count,
            last_error: last_error.into(),
        }
    }
}
