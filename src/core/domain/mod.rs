//! Core domain types for powerpos.
//!
//! ## Input Types
//!
//! - [`Trade`] - An opaque trade with per-period volumes
//! - [`TradePeriod`] - A single hourly period entry within a trade
//!
//! ## Output Types
//!
//! - [`Position`] - An aggregated hourly position row
//!
//! ## Recovery Types
//!
//! - [`FailedExtraction`] - A persisted dead-letter queue entry
//! - [`ExtractionStatus`] - Per-attempt audit status taxonomy

mod extraction;
mod position;
mod trade;

pub use extraction::{ExtractionStatus, FailedExtraction};
pub use position::Position;
pub use trade::{Trade, TradePeriod};

/// Number of hourly periods in a trading day.
pub const PERIODS_PER_DAY: usize = 24;
