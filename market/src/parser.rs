//! Order book message parser
//!
//! Turns one raw text frame from the depth stream into an
//! [`OrderBookSnapshot`]. A frame is accepted only when it is a JSON object
//! carrying `timestamp`, `exchange`, `symbol`, `bids` and `asks`, and every
//! level is a well-formed `(price, size)` pair. Anything else is reported as a
//! [`MessageError`] so the feed can log and drop it.
//!
//! The parser is stateless; it never touches the published snapshot.

use corelib::OrderBookSnapshot;
use serde_json::Value;

use crate::error::MessageError;

pub const REQUIRED_FIELDS: [&str; 5] = ["timestamp", "exchange", "symbol", "bids", "asks"];

pub fn parse_order_book(raw: &str) -> Result<OrderBookSnapshot, MessageError> {
    let json: Value = serde_json::from_str(raw).map_err(MessageError::Json)?;

    let Some(obj) = json.as_object() else {
        return Err(MessageError::NotAnObject);
    };

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !obj.contains_key(*field))
        .collect();

    if !missing.is_empty() {
        return Err(MessageError::MissingFields(missing));
    }

    serde_json::from_value(json).map_err(MessageError::Invalid)
}
