//! Trade input types.
//!
//! Trades arrive from the trade source as opaque records; the engine never
//! interprets trade identity, it only sums per-period volumes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One hourly period entry within a trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradePeriod {
    /// Period index within the trading day, `1..=24`.
    pub period: u32,
    /// Traded volume for this period. Negative volumes are permitted.
    pub volume: f64,
}

impl TradePeriod {
    #[must_use]
    pub const fn new(period: u32, volume: f64) -> Self {
        Self { period, volume }
    }
}

/// A trade for a single trading date with an ordered list of periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// The trading date the trade belongs to.
    pub date: NaiveDate,
    /// Per-period volume entries, in source order.
    pub periods: Vec<TradePeriod>,
}

impl Trade {
    #[must_use]
    pub fn new(date: NaiveDate, periods: Vec<TradePeriod>) -> Self {
        Self { date, periods }
    }

    /// A trade covering every period of the trading day with equal volume.
    #[must_use]
    pub fn flat(date: NaiveDate, volume: f64) -> Self {
        let periods = (1..=super::PERIODS_PER_DAY as u32)
            .map(|period| TradePeriod::new(period, volume))
            .collect();
        Self { date, periods }
    }
}
