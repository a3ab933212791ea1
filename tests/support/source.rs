use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;

use powerpos::core::domain::Trade;
use powerpos::core::source::TradeSource;
use powerpos::error::{Error, Result};

/// One scripted answer to a `fetch` call.
#[derive(Debug, Clone)]
pub enum ScriptedFetch {
    Trades(Vec<Trade>),
    Fail(String),
}

/// Deterministic test double for the trade source.
///
/// Answers `fetch` calls from a script, then repeats the fallback once the
/// script is exhausted. Records every requested target date.
pub struct ScriptedTradeSource {
    script: Mutex<VecDeque<ScriptedFetch>>,
    fallback: ScriptedFetch,
    requests: Mutex<Vec<NaiveDate>>,
}

impl ScriptedTradeSource {
    pub fn new(fallback: ScriptedFetch) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A source that always succeeds with the given trades.
    pub fn always(trades: Vec<Trade>) -> Self {
        Self::new(ScriptedFetch::Trades(trades))
    }

    /// A source that always fails with the given message.
    pub fn always_failing(message: &str) -> Self {
        Self::new(ScriptedFetch::Fail(message.to_string()))
    }

    /// Queue one answer ahead of the fallback.
    pub fn push(&self, fetch: ScriptedFetch) {
        self.script.lock().push_back(fetch);
    }

    pub fn fetch_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requested_dates(&self) -> Vec<NaiveDate> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl TradeSource for ScriptedTradeSource {
    async fn fetch(&self, target_date: NaiveDate) -> Result<Vec<Trade>> {
        self.requests.lock().push(target_date);

        let next = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match next {
            ScriptedFetch::Trades(trades) => Ok(trades),
            ScriptedFetch::Fail(message) => Err(Error::Source(message)),
        }
    }
}
