use std::collections::VecDeque;

use serde::Serialize;

pub const CANDLE_PERIOD_MS: u64 = 1_000;
pub const DEFAULT_CANDLE_HISTORY: usize = 300;

/// OHLC candle over one period of mid prices.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Candle {
    /// Start of the period, epoch milliseconds.
    pub open_ms: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    fn opened_at(open_ms: u64, price: f64) -> Self {
        Self {
            open_ms,
            open: price,
            high: price,
            low: price,
            close: price,
        }
    }

    fn update(&mut self, price: f64) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
    }
}

/// Builds fixed-period candles from a stream of timestamped mid prices.
///
/// Closed candles are kept in a bounded history (oldest evicted first).
/// Samples that arrive late, for a period that is already closed, are folded
/// into the open candle rather than reopening history.
pub struct CandleBuilder {
    period_ms: u64,
    capacity: usize,
    current: Option<Candle>,
    history: VecDeque<Candle>,
}

impl Default for CandleBuilder {
    fn default() -> Self {
        Self::new(CANDLE_PERIOD_MS, DEFAULT_CANDLE_HISTORY)
    }
}

impl CandleBuilder {
    pub fn new(period_ms: u64, capacity: usize) -> Self {
        Self {
            period_ms: period_ms.max(1),
            capacity: capacity.max(1),
            current: None,
            history: VecDeque::new(),
        }
    }

    /// Add a sample. Returns the candle that was closed by it, if any.
    pub fn push(&mut self, ts_ms: u64, price: f64) -> Option<Candle> {
        let bucket = ts_ms - ts_ms % self.period_ms;

        if let Some(candle) = self.current.as_mut()
            && bucket <= candle.open_ms
        {
            candle.update(price);
            return None;
        }

        let closed = self.current.replace(Candle::opened_at(bucket, price))?;

        self.history.push_back(closed.clone());
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }

        Some(closed)
    }

    pub fn current(&self) -> Option<&Candle> {
        self.current.as_ref()
    }

    /// Closed candles, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Candle> {
        self.history.iter()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
