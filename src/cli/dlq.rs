//! `dlq` subcommand: operator inspection of the dead-letter queue.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::app::Config;
use crate::core::dlq::{DeadLetterQueue, FileDeadLetterQueue};

use super::DlqCommand;

pub fn run(config: &Config, command: &DlqCommand) -> Result<()> {
    let dlq = FileDeadLetterQueue::new(&config.dlq_directory)?;

    match command {
        DlqCommand::List => list(&dlq),
        DlqCommand::Count => {
            println!("{}", dlq.count()?);
            Ok(())
        }
        DlqCommand::Remove { extraction_time } => remove(&dlq, *extraction_time),
    }
}

fn list(dlq: &FileDeadLetterQueue) -> Result<()> {
    let entries = dlq.peek_all()?;
    if entries.is_empty() {
        println!("dead-letter queue is empty");
        return Ok(());
    }

    for entry in entries {
        println!(
            "{}  retries={}  failed_at={}  {}",
            entry.extraction_time_utc.to_rfc3339(),
            entry.retry_count,
            entry.failed_at_utc.to_rfc3339(),
            entry.last_error,
        );
    }
    Ok(())
}

fn remove(dlq: &FileDeadLetterQueue, extraction_time: DateTime<Utc>) -> Result<()> {
    if dlq.remove(extraction_time)? {
        println!("removed {}", extraction_time.to_rfc3339());
        Ok(())
    } else {
        anyhow::bail!("no entry with extraction time {}", extraction_time.to_rfc3339());
    }
}
