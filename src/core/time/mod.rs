//! Trading-day calendar arithmetic over an IANA time zone.
//!
//! A trading day for date `d` is the 24-hour window starting at 23:00 local
//! on `d - 1`. Period arithmetic uses physical durations so that periods map
//! to actual elapsed hours across daylight-saving transitions, while labels
//! reflect observed wall-clock time (which may repeat or skip an hour).

mod clock;

pub use clock::{Clock, SystemClock};

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;
use tracing::warn;

use crate::core::domain::PERIODS_PER_DAY;

/// Local wall-clock hour a trading day starts at, on the preceding date.
const DAY_START_HOUR: u32 = 23;

/// Longest naive span scanned past a daylight-saving gap. Covers even a
/// date-line change that removes a whole calendar day.
const MAX_GAP_SCAN_MINUTES: i64 = 26 * 60;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("period {period} is out of range 1..=24")]
    PeriodOutOfRange { period: u32 },
}

/// Calendar for one configured trading zone.
#[derive(Debug, Clone, Copy)]
pub struct TradingCalendar {
    zone: Tz,
}

impl TradingCalendar {
    #[must_use]
    pub const fn new(zone: Tz) -> Self {
        Self { zone }
    }

    #[must_use]
    pub const fn zone(&self) -> Tz {
        self.zone
    }

    /// The zoned start of the trading day for `date`: 23:00 on the preceding
    /// calendar day.
    ///
    /// An ambiguous wall-clock (fall-back overlap) resolves to the earlier
    /// mapping; a skipped wall-clock (spring-forward gap) resolves to the
    /// first valid instant after the gap. Both are logged.
    #[must_use]
    pub fn day_start(&self, date: NaiveDate) -> DateTime<Tz> {
        let eve = date.pred_opt().expect("trading date out of calendar range");
        let naive = eve
            .and_hms_opt(DAY_START_HOUR, 0, 0)
            .expect("23:00 is a valid wall-clock time");

        match self.zone.from_local_datetime(&naive) {
            LocalResult::Single(start) => start,
            LocalResult::Ambiguous(earlier, later) => {
                warn!(
                    %date,
                    wall_clock = %naive,
                    earlier = %earlier,
                    later = %later,
                    "Trading day start is ambiguous, using earlier mapping"
                );
                earlier
            }
            LocalResult::None => {
                let start = self.first_instant_after_gap(naive);
                warn!(
                    %date,
                    wall_clock = %naive,
                    resolved = %start,
                    "Trading day start falls in a daylight-saving gap, using first instant after it"
                );
                start
            }
        }
    }

    /// Scan forward from a non-existent wall-clock time to the first instant
    /// the zone can represent.
    fn first_instant_after_gap(&self, skipped: NaiveDateTime) -> DateTime<Tz> {
        for minutes in 1..=MAX_GAP_SCAN_MINUTES {
            let probe = skipped + Duration::minutes(minutes);
            match self.zone.from_local_datetime(&probe) {
                LocalResult::Single(dt) => return dt,
                LocalResult::Ambiguous(earlier, _) => return earlier,
                LocalResult::None => continue,
            }
        }
        // No real zone has a gap this wide; interpret as UTC rather than die.
        warn!(wall_clock = %skipped, "Gap scan exhausted, interpreting wall-clock as UTC");
        self.zone.from_utc_datetime(&skipped)
    }

    /// Map a period index onto the wall clock: `start + (k - 1)` physical
    /// hours, re-localized in the zone.
    pub fn period_to_wall_clock(
        &self,
        start: DateTime<Tz>,
        period: u32,
    ) -> Result<DateTime<Tz>, TimeError> {
        if period < 1 || period as usize > PERIODS_PER_DAY {
            return Err(TimeError::PeriodOutOfRange { period });
        }
        Ok(start + Duration::hours(i64::from(period) - 1))
    }

    /// Two-digit 24-hour local hour and minute.
    #[must_use]
    pub fn format_hhmm(&self, zoned: &DateTime<Tz>) -> String {
        zoned.format("%H:%M").to_string()
    }

    /// Convert a UTC instant into the configured zone.
    #[must_use]
    pub fn to_local(&self, utc: DateTime<Utc>) -> DateTime<Tz> {
        utc.with_timezone(&self.zone)
    }

    /// The trading date a UTC instant belongs to: its calendar date in the
    /// configured zone.
    #[must_use]
    pub fn date_of(&self, utc: DateTime<Utc>) -> NaiveDate {
        self.to_local(utc).date_naive()
    }
}
