//! Persistent dead-letter queue for exhausted extractions.
//!
//! The whole queue is one JSON array in `FailedExtractions.json`. Every write
//! serializes to a sibling `.tmp` file and renames over the target, so a
//! crash leaves either the old or the new queue intact, never a partial one.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::core::domain::FailedExtraction;
use crate::error::{ConfigError, Result};

/// File name of the queue document inside the DLQ directory.
pub const DLQ_FILE_NAME: &str = "FailedExtractions.json";

/// Capability consumed by the runner and scheduler.
pub trait DeadLetterQueue: Send + Sync {
    /// Add an entry, replacing any existing entry with the same
    /// `extraction_time_utc`; the queue stays sorted ascending by that time.
    fn enqueue(&self, entry: FailedExtraction) -> Result<()>;

    /// Return all entries sorted ascending by `extraction_time_utc` and
    /// atomically empty the store.
    fn dequeue_all(&self) -> Result<Vec<FailedExtraction>>;

    fn count(&self) -> Result<usize>;

    /// All entries, sorted, without removing them.
    fn peek_all(&self) -> Result<Vec<FailedExtraction>>;

    /// Remove the entry with the given extraction time; returns whether one
    /// was removed.
    fn remove(&self, extraction_time_utc: DateTime<Utc>) -> Result<bool>;
}

/// Single-file JSON queue.
#[derive(Debug)]
pub struct FileDeadLetterQueue {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileDeadLetterQueue {
    /// Create the queue, ensuring the DLQ directory exists.
    pub fn new(dlq_dir: impl AsRef<Path>) -> Result<Self> {
        let dlq_dir = dlq_dir.as_ref();
        if dlq_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "dlq_directory",
            }
            .into());
        }
        fs::create_dir_all(dlq_dir)?;

        Ok(Self {
            path: dlq_dir.join(DLQ_FILE_NAME),
            lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current queue. A missing, empty, or malformed file reads as
    /// an empty queue; recovery is best-effort.
    fn load(&self) -> Vec<FailedExtraction> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Failed to read DLQ file, treating as empty");
                return Vec::new();
            }
        };

        if content.trim().is_empty() {
            warn!(path = %self.path.display(), "DLQ file is empty, treating as empty queue");
            return Vec::new();
        }

        match serde_json::from_str::<Vec<FailedExtraction>>(&content) {
            Ok(mut entries) => {
                entries.sort_by_key(|e| e.extraction_time_utc);
                entries
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "DLQ file is malformed, treating as empty queue");
                Vec::new()
            }
        }
    }

    /// Persist the queue atomically: write `.tmp`, fsync, rename.
    fn save(&self, entries: &[FailedExtraction]) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;

        let temp_path = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path)?;

        let cleanup_and_err = |e| {
            let _ = fs::remove_file(&temp_path);
            e
        };

        file.write_all(json.as_bytes()).map_err(cleanup_and_err)?;
        file.sync_all().map_err(cleanup_and_err)?;
        fs::rename(&temp_path, &self.path).map_err(cleanup_and_err)?;

        Ok(())
    }
}

impl DeadLetterQueue for FileDeadLetterQueue {
    fn enqueue(&self, entry: FailedExtraction) -> Result<()> {
        let _guard = self.lock.lock();

        let mut entries = self.load();
        entries.retain(|e| e.extraction_time_utc != entry.extraction_time_utc);
        entries.push(entry);
        entries.sort_by_key(|e| e.extraction_time_utc);

        self.save(&entries)?;
        debug!(count = entries.len(), "DLQ entry enqueued");
        Ok(())
    }

    fn dequeue_all(&self) -> Result<Vec<FailedExtraction>> {
        let _guard = self.lock.lock();

        let entries = self.load();
        if !entries.is_empty() {
            self.save(&[])?;
        }
        Ok(entries)
    }

    fn count(&self) -> Result<usize> {
        let _guard = self.lock.lock();
        Ok(self.load().len())
    }

    fn peek_all(&self) -> Result<Vec<FailedExtraction>> {
        let _guard = self.lock.lock();
        Ok(self.load())
    }

    fn remove(&self, extraction_time_utc: DateTime<Utc>) -> Result<bool> {
        let _guard = self.lock.lock();

        let mut entries = self.load();
        let before = entries.len();
        entries.retain(|e| e.extraction_time_utc != extraction_time_utc);

        if entries.len() == before {
            return Ok(false);
        }
        self.save(&entries)?;
        Ok(true)
    }
}
