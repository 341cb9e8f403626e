use serde::de::{self, Deserializer};
use serde::ser::{SerializeTuple, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Single `(price, size)` level of an order book side.
///
/// On the wire a level is an array whose first two entries are price and size,
/// either as strings (`["100.0", "1.0"]`) or numbers. Venues that append extra
/// entries (liquidated orders, order count) are accepted; the extras are dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceLevel {
    pub price: f64,
    pub size: f64,
}

impl PriceLevel {
    pub fn new(price: f64, size: f64) -> Self {
        Self { price, size }
    }
}

impl Serialize for PriceLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(2)?;
        tup.serialize_element(&self.price)?;
        tup.serialize_element(&self.size)?;
        tup.end()
    }
}

impl<'de> Deserialize<'de> for PriceLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Vec<Value> = Vec::deserialize(deserializer)?;

        if raw.len() < 2 {
            return Err(de::Error::invalid_length(raw.len(), &"a [price, size] pair"));
        }

        let price = numeric(&raw[0]).ok_or_else(|| de::Error::custom("price is not numeric"))?;
        let size = numeric(&raw[1]).ok_or_else(|| de::Error::custom("size is not numeric"))?;

        if !price.is_finite() || price <= 0.0 {
            return Err(de::Error::custom(format!("price must be positive, got {price}")));
        }
        if !size.is_finite() || size < 0.0 {
            return Err(de::Error::custom(format!("size must be non-negative, got {size}")));
        }

        Ok(PriceLevel { price, size })
    }
}

fn numeric(v: &Value) -> Option<f64> {
    match v {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "timestamp must be a string or number, got {other}"
        ))),
    }
}

/// Full L2 order book as published by the market-data feed.
///
/// All five fields are required; a message missing any of them fails to
/// deserialize and is never published. Sides are kept in the order received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    #[serde(deserialize_with = "text_or_number")]
    pub timestamp: String,
    pub exchange: String,
    pub symbol: String,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl OrderBookSnapshot {
    /// Highest bid.
    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids
            .iter()
            .copied()
            .max_by(|a, b| a.price.total_cmp(&b.price))
    }

    /// Lowest ask.
    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks
            .iter()
            .copied()
            .min_by(|a, b| a.price.total_cmp(&b.price))
    }

    /// Midpoint of best bid and best ask. `None` while either side is empty.
    pub fn mid_price(&self) -> Option<f64> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        Some((bid.price + ask.price) / 2.0)
    }

    /// Best ask minus best bid.
    pub fn spread(&self) -> Option<f64> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        Some(ask.price - bid.price)
    }

    /// Top `n` bids, best (highest) first.
    pub fn top_bids(&self, n: usize) -> Vec<PriceLevel> {
        let mut levels = self.bids.clone();
        levels.sort_by(|a, b| b.price.total_cmp(&a.price));
        levels.truncate(n);
        levels
    }

    /// Top `n` asks, best (lowest) first.
    pub fn top_asks(&self, n: usize) -> Vec<PriceLevel> {
        let mut levels = self.asks.clone();
        levels.sort_by(|a, b| a.price.total_cmp(&b.price));
        levels.truncate(n);
        levels
    }
}
