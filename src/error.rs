use thiserror::Error;

use crate::core::aggregate::AggregationError;
use crate::core::time::TimeError;

/// Configuration loading and validation errors.
///
/// The only fatal error class: the service refuses to start on any of these.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required config field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Trade source error: {0}")]
    Source(String),

    #[error("Aggregation error: {0}")]
    Aggregation(#[from] AggregationError),

    #[error("Time error: {0}")]
    Time(#[from] TimeError),

    #[error("Invalid argument for {field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// Whether this error terminates the current attempt without feeding the
    /// retry loop or the dead-letter queue.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
