//! Snapshot report sink.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use chrono_tz::Tz;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::core::domain::{Position, PERIODS_PER_DAY};
use crate::error::{ConfigError, Result};

/// Capability consumed by the extraction runner: persist one snapshot.
pub trait ReportSink: Send + Sync {
    /// Write the positions as a snapshot stamped with the extraction's local
    /// time; returns the path written. Re-runs within the same minute
    /// overwrite the previous snapshot.
    fn write(&self, positions: &[Position], extraction_local: &DateTime<Tz>) -> Result<PathBuf>;
}

/// CSV snapshot writer: `PowerPosition_<YYYYMMDD>_<HHMM>.csv` with a
/// `LocalTime,Volume` header and one two-decimal row per position.
#[derive(Debug)]
pub struct CsvReportWriter {
    output_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvReportWriter {
    /// Create the writer, ensuring the output directory exists.
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref();
        if output_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "output_directory",
            }
            .into());
        }
        fs::create_dir_all(output_dir)?;

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }
}

impl ReportSink for CsvReportWriter {
    fn write(&self, positions: &[Position], extraction_local: &DateTime<Tz>) -> Result<PathBuf> {
        if positions.len() != PERIODS_PER_DAY {
            warn!(
                positions = positions.len(),
                "Writing report with unexpected position count"
            );
        }

        let filename = format!("PowerPosition_{}.csv", extraction_local.format("%Y%m%d_%H%M"));
        let path = self.output_dir.join(filename);

        let mut content = String::from("LocalTime,Volume\n");
        for position in positions {
            content.push_str(&format!("{},{:.2}\n", position.local_time, position.volume));
        }

        {
            let _guard = self.write_lock.lock();
            fs::write(&path, content)?;
        }

        info!(path = %path.display(), positions = positions.len(), "Report written");
        Ok(path)
    }
}
