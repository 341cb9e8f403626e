use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Transport-level failures. All of them are recovered inside the feed by
/// backing off and reconnecting; none reach `latest()` callers.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("no pong received within {0:?}")]
    KeepAliveTimeout(Duration),

    /// For [`OrderBookSource`](crate::source::OrderBookSource) implementations
    /// that fail without a websocket error of their own.
    #[error("market data source unavailable: {0}")]
    Unavailable(String),
}

/// Reasons an inbound message is discarded instead of published.
#[derive(Error, Debug)]
pub enum MessageError {
    #[error("payload is not valid json: {0}")]
    Json(#[source] serde_json::Error),

    #[error("payload is not a json object")]
    NotAnObject,

    #[error("missing required fields: {0:?}")]
    MissingFields(Vec<&'static str>),

    #[error("malformed order book: {0}")]
    Invalid(#[source] serde_json::Error),
}
