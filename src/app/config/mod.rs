//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file. Keys use snake_case; PascalCase
//! spellings are accepted as aliases for compatibility with existing settings
//! files.

mod logging;

pub use logging::LoggingConfig;

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Simulated trade source settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// How many full-day trades to generate per extraction.
    #[serde(default = "default_trades")]
    pub trades: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            trades: default_trades(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Minutes between scheduled extractions.
    #[serde(default = "default_interval_minutes", alias = "IntervalMinutes")]
    pub interval_minutes: u64,

    /// Directory snapshot reports are written to.
    #[serde(default, alias = "OutputDirectory")]
    pub output_directory: String,

    /// Directory daily audit files are appended in.
    #[serde(default, alias = "AuditDirectory")]
    pub audit_directory: String,

    /// Directory holding the dead-letter queue document.
    #[serde(default, alias = "DlqDirectory")]
    pub dlq_directory: String,

    /// IANA zone the trading day is anchored in.
    #[serde(default = "default_time_zone_id", alias = "TimeZoneId")]
    pub time_zone_id: String,

    /// Optional fixed run time, overriding the scheduler's wall clock.
    #[serde(default, alias = "RunTime")]
    pub run_time: Option<DateTime<Utc>>,

    /// Attempts per extraction before it goes to the dead-letter queue.
    #[serde(default = "default_retry_attempts", alias = "RetryAttempts")]
    pub retry_attempts: u32,

    /// Delay between attempts.
    #[serde(default = "default_retry_delay_seconds", alias = "RetryDelaySeconds")]
    pub retry_delay_seconds: u64,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_interval_minutes() -> u64 {
    5
}

fn default_time_zone_id() -> String {
    "Europe/London".to_string()
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_seconds() -> u64 {
    10
}

fn default_trades() -> u32 {
    2
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            output_directory: String::new(),
            audit_directory: String::new(),
            dlq_directory: String::new(),
            time_zone_id: default_time_zone_id(),
            run_time: None,
            retry_attempts: default_retry_attempts(),
            retry_delay_seconds: default_retry_delay_seconds(),
            source: SourceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "interval_minutes",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.output_directory.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "output_directory",
            }
            .into());
        }
        if self.audit_directory.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "audit_directory",
            }
            .into());
        }
        if self.dlq_directory.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "dlq_directory",
            }
            .into());
        }
        self.time_zone()?;
        if self.retry_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry_attempts",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if self.retry_delay_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry_delay_seconds",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if self.source.trades == 0 {
            return Err(ConfigError::InvalidValue {
                field: "source.trades",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// The configured trading zone, resolved.
    pub fn time_zone(&self) -> Result<Tz> {
        self.time_zone_id
            .parse::<Tz>()
            .map_err(|err| {
                ConfigError::InvalidValue {
                    field: "time_zone_id",
                    reason: err.to_string(),
                }
                .into()
            })
    }
}
