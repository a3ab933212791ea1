//! Trade source capability.
//!
//! The real trading API lives outside this service; the engine consumes it
//! through one operation and treats every failure as opaque and retryable.

mod simulated;

pub use simulated::SimulatedTradeSource;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::core::domain::Trade;
use crate::error::Result;

#[async_trait]
pub trait TradeSource: Send + Sync {
    /// Fetch all trades for the given trading date. An empty list is a valid
    /// answer.
    async fn fetch(&self, target_date: NaiveDate) -> Result<Vec<Trade>>;
}
