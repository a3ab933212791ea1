//! Command-line interface definitions.

pub mod check;
pub mod dlq;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

/// Powerpos - intra-day power position extraction and reporting.
#[derive(Parser, Debug)]
#[command(name = "powerpos")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the extraction service (foreground)
    Run,

    /// Validate the configuration and print a health report
    Check,

    /// Inspect the dead-letter queue
    #[command(subcommand)]
    Dlq(DlqCommand),
}

#[derive(Subcommand, Debug)]
pub enum DlqCommand {
    /// Print every queued entry
    List,

    /// Print the number of queued entries
    Count,

    /// Remove the entry with the given extraction time (RFC 3339 UTC)
    Remove { extraction_time: DateTime<Utc> },
}
