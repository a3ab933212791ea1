//! Hourly aggregation of trades into per-period positions.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::core::domain::{Position, Trade, PERIODS_PER_DAY};
use crate::core::time::TradingCalendar;
use crate::error::Result;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("Expected period count to be a multiple of 24, got {count} periods")]
    InvalidPeriodCount { count: usize },

    #[error("Expected 24 positions for the trading day, got {count}")]
    IncompletePositions { count: usize },
}

/// Sum all trades' period volumes into one position per period, labelled with
/// the wall-clock start of the period on `target_date`'s trading day.
///
/// The total number of period records across all trades must be a positive
/// multiple of 24. Volumes sum with plain `f64` addition in input order;
/// negative volumes are permitted and nothing is rounded here.
pub fn aggregate(
    trades: &[Trade],
    target_date: NaiveDate,
    calendar: &TradingCalendar,
) -> Result<Vec<Position>> {
    let count: usize = trades.iter().map(|t| t.periods.len()).sum();
    if count == 0 || count % PERIODS_PER_DAY != 0 {
        return Err(AggregationError::InvalidPeriodCount { count }.into());
    }

    let mut volumes: BTreeMap<u32, f64> = BTreeMap::new();
    for entry in trades.iter().flat_map(|t| &t.periods) {
        *volumes.entry(entry.period).or_insert(0.0) += entry.volume;
    }

    let start = calendar.day_start(target_date);
    let mut positions = Vec::with_capacity(volumes.len());
    for (period, volume) in volumes {
        let wall_clock = calendar.period_to_wall_clock(start, period)?;
        positions.push(Position::new(
            calendar.format_hhmm(&wall_clock),
            volume,
            period,
        ));
    }

    Ok(positions)
}
