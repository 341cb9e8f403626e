pub mod ws;

use async_trait::async_trait;

use crate::error::FeedError;

pub use ws::{KeepAlive, WsOrderBookSource};

/// Something the feed can connect to and read depth frames from.
///
/// One call to [`OrderBookSource::connect`] opens one session; reconnect
/// policy belongs to the feed, not to the source.
#[async_trait]
pub trait OrderBookSource: Send + Sync + 'static {
    /// Human-readable endpoint, used in logs.
    fn endpoint(&self) -> &str;

    async fn connect(&self) -> Result<Box<dyn FrameStream>, FeedError>;
}

/// An open session yielding raw text payloads.
#[async_trait]
pub trait FrameStream: Send {
    /// Next text payload. `Ok(None)` when the peer closed the session cleanly.
    async fn next_text(&mut self) -> Result<Option<String>, FeedError>;
}
