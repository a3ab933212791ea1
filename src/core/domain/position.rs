//! Aggregated position output type.

use serde::Serialize;

/// An aggregated hourly position, one per period of the trading day.
///
/// `local_time` is the wall-clock label of the period start in the configured
/// zone. On daylight-saving transition days labels may repeat or skip an hour
/// while the period index stays unique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    /// Wall-clock period start, `HH:MM`.
    pub local_time: String,
    /// Summed volume across all trades for this period.
    pub volume: f64,
    /// Period index, `1..=24`.
    pub period: u32,
}

impl Position {
    #[must_use]
    pub fn new(local_time: String, volume: f64, period: u32) -> Self {
        Self {
            local_time,
            volume,
            period,
        }
    }
}
