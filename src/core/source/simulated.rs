//! Simulated trade source.
//!
//! Stand-in for the external trading API: produces a configurable number of
//! full-day trades with randomized volumes so the service can run end to end
//! without upstream connectivity.

use async_trait::async_trait;
use chrono::NaiveDate;
use rand::Rng;
use tracing::debug;

use crate::core::domain::{Trade, TradePeriod, PERIODS_PER_DAY};
use crate::error::Result;

use super::TradeSource;

/// Volume range the simulator draws from, in MW.
const VOLUME_RANGE: std::ops::Range<f64> = -500.0..1500.0;

pub struct SimulatedTradeSource {
    trade_count: u32,
}

impl SimulatedTradeSource {
    #[must_use]
    pub const fn new(trade_count: u32) -> Self {
        Self { trade_count }
    }
}

#[async_trait]
impl TradeSource for SimulatedTradeSource {
    async fn fetch(&self, target_date: NaiveDate) -> Result<Vec<Trade>> {
        let mut rng = rand::thread_rng();
        let trades: Vec<Trade> = (0..self.trade_count)
            .map(|_| {
                let periods = (1..=PERIODS_PER_DAY as u32)
                    .map(|period| TradePeriod::new(period, rng.gen_range(VOLUME_RANGE)))
                    .collect();
                Trade::new(target_date, periods)
            })
            .collect();

        debug!(%target_date, trades = trades.len(), "Simulated trades generated");
        Ok(trades)
    }
}
