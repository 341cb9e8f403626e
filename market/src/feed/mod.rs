//! OrderBookFeed
//!
//! Keeps exactly one current order book snapshot fresh from a streaming
//! source. Responsibilities:
//!   • Drive the connection state machine (connect, consume, back off, retry)
//!   • Parse each inbound frame and publish the valid ones
//!   • Drop malformed frames without touching the published snapshot
//!   • Expose the latest snapshot to any number of readers
//!
//! The feed is a cheap `Clone` handle around shared state; the background
//! task and all readers point at the same snapshot cell.

mod cell;
mod counters;
mod state;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use corelib::OrderBookSnapshot;
use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::config::FeedConfig;
use crate::parser::parse_order_book;
use crate::source::{FrameStream, KeepAlive, OrderBookSource, WsOrderBookSource};

use cell::SnapshotCell;
use counters::FeedCounters;

pub use counters::FeedStats;
pub use state::{ConnectionEvent, ConnectionState};

#[derive(Clone)]
pub struct OrderBookFeed {
    inner: Arc<FeedInner>,
}

struct FeedInner {
    source: Arc<dyn OrderBookSource>,
    reconnect_backoff: Duration,
    started: AtomicBool,
    state: RwLock<ConnectionState>,
    cell: SnapshotCell,
    counters: FeedCounters,
}

impl OrderBookFeed {
    pub fn new(source: impl OrderBookSource, reconnect_backoff: Duration) -> Self {
        Self {
            inner: Arc::new(FeedInner {
                source: Arc::new(source),
                reconnect_backoff,
                started: AtomicBool::new(false),
                state: RwLock::new(ConnectionState::Disconnected),
                cell: SnapshotCell::default(),
                counters: FeedCounters::default(),
            }),
        }
    }

    /// Websocket-backed feed built from configuration.
    pub fn from_config(config: &FeedConfig) -> Self {
        let source = WsOrderBookSource::new(
            config.url.clone(),
            KeepAlive {
                interval: config.ping_interval,
                timeout: config.ping_timeout,
            },
        );

        Self::new(source, config.reconnect_backoff)
    }

    /// Spawn the background connection task on the current tokio runtime.
    ///
    /// Only the first call on a feed (or any of its clones) spawns; later
    /// calls return `None`.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        if self
            .inner
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("order book feed already running");
            return None;
        }

        let inner = Arc::clone(&self.inner);
        Some(tokio::spawn(inner.run()))
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::Acquire)
    }

    /// Most recently published snapshot, or `None` while awaiting data.
    pub fn latest(&self) -> Option<Arc<OrderBookSnapshot>> {
        self.inner.cell.latest()
    }

    /// Wait up to `timeout` for a snapshot to exist.
    pub async fn wait_for_snapshot(&self, timeout: Duration) -> Option<Arc<OrderBookSnapshot>> {
        tokio::time::timeout(timeout, self.inner.cell.wait())
            .await
            .ok()
    }

    /// Handle one raw inbound message. Returns whether it was published.
    pub fn ingest(&self, raw: &str) -> bool {
        self.inner.ingest(raw)
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.inner.state.read()
    }

    pub fn stats(&self) -> FeedStats {
        self.inner.counters.stats()
    }

    pub fn endpoint(&self) -> &str {
        self.inner.source.endpoint()
    }
}

impl FeedInner {
    /// Single controlling loop. Runs until the runtime shuts down.
    #[instrument(name = "order_book_feed", skip(self), fields(endpoint = %self.source.endpoint()))]
    async fn run(self: Arc<Self>) {
        info!(backoff = ?self.reconnect_backoff, "order book feed started");

        let mut state = ConnectionState::Disconnected;
        let mut session: Option<Box<dyn FrameStream>> = None;

        loop {
            *self.state.write() = state;

            let event = match state {
                ConnectionState::Disconnected => ConnectionEvent::Start,

                ConnectionState::Connecting => match self.source.connect().await {
                    Ok(stream) => {
                        FeedCounters::incr(&self.counters.connects);
                        info!("order book stream connected");
                        session = Some(stream);
                        ConnectionEvent::Connected
                    }
                    Err(e) => {
                        error!(error = %e, "order book stream connection failed");
                        ConnectionEvent::ConnectFailed
                    }
                },

                ConnectionState::Connected => {
                    if let Some(mut stream) = session.take() {
                        self.consume(&mut *stream).await;
                    }
                    FeedCounters::incr(&self.counters.disconnects);
                    ConnectionEvent::ConnectionLost
                }

                ConnectionState::Backoff => {
                    warn!(
                        delay = ?self.reconnect_backoff,
                        "disconnected; reconnecting after backoff"
                    );
                    tokio::time::sleep(self.reconnect_backoff).await;
                    ConnectionEvent::BackoffElapsed
                }
            };

            let next = state.on(event);
            debug!(from = ?state, ?event, to = ?next, "feed state transition");
            state = next;
        }
    }

    /// Read frames until the session ends for any reason.
    async fn consume(&self, stream: &mut dyn FrameStream) {
        loop {
            match stream.next_text().await {
                Ok(Some(raw)) => {
                    self.ingest(&raw);
                }
                Ok(None) => {
                    warn!("order book stream closed by peer");
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "order book stream failed");
                    return;
                }
            }
        }
    }

    fn ingest(&self, raw: &str) -> bool {
        // Only log raw payloads at TRACE level; full books are large.
        tracing::trace!(raw = %raw, "received order book frame");

        match parse_order_book(raw) {
            Ok(snapshot) => {
                debug!(
                    ts = %snapshot.timestamp,
                    bids = snapshot.bids.len(),
                    asks = snapshot.asks.len(),
                    "order book snapshot published"
                );
                self.cell.publish(snapshot);
                FeedCounters::incr(&self.counters.published);
                true
            }
            Err(e) => {
                warn!(error = %e, "discarding malformed order book message");
                FeedCounters::incr(&self.counters.discarded);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use async_trait::async_trait;
    use serde_json::json;
    use tracing_test::traced_test;

    struct NeverConnects;

    #[async_trait]
    impl OrderBookSource for NeverConnects {
        fn endpoint(&self) -> &str {
            "mock://never"
        }

        async fn connect(&self) -> Result<Box<dyn FrameStream>, FeedError> {
            std::future::pending().await
        }
    }

    fn feed() -> OrderBookFeed {
        OrderBookFeed::new(NeverConnects, Duration::from_secs(5))
    }

    fn okx(bid: &str, ask: &str) -> String {
        json!({
            "timestamp": "2025-05-04T10:39:13Z",
            "exchange": "OKX",
            "symbol": "BTC-USDT-SWAP",
            "bids": [[bid, "1.0"]],
            "asks": [[ask, "1.0"]]
        })
        .to_string()
    }

    #[test]
    fn awaiting_data_before_first_message() {
        let feed = feed();
        assert!(feed.latest().is_none());
        assert_eq!(feed.connection_state(), ConnectionState::Disconnected);
        assert!(!feed.is_started());
    }

    #[test]
    fn valid_message_becomes_latest() {
        let feed = feed();

        assert!(feed.ingest(&okx("100.0", "101.0")));

        let book = feed.latest().unwrap();
        assert_eq!(book.exchange, "OKX");
        assert_eq!(book.symbol, "BTC-USDT-SWAP");
        assert_eq!(book.mid_price(), Some(100.5));
        assert_eq!(feed.stats().published, 1);
    }

    #[test]
    #[traced_test]
    fn malformed_message_keeps_previous_snapshot() {
        let feed = feed();
        feed.ingest(&okx("100.0", "101.0"));

        let published = feed.ingest(r#"{"bids": [["1.0", "1.0"]]}"#);

        assert!(!published);
        assert_eq!(feed.latest().unwrap().bids[0].price, 100.0);
        assert_eq!(feed.stats().discarded, 1);
        assert!(logs_contain("discarding malformed order book message"));
    }

    #[test]
    fn clones_share_the_same_snapshot() {
        let feed = feed();
        let reader = feed.clone();

        feed.ingest(&okx("200.0", "202.0"));
        assert_eq!(reader.latest().unwrap().mid_price(), Some(201.0));
    }

    #[tokio::test]
    async fn start_is_idempotent_across_clones() {
        let feed = feed();
        let other = feed.clone();

        let first = feed.start();
        assert!(first.is_some());
        assert!(other.start().is_none());
        assert!(feed.start().is_none());
        assert!(other.is_started());

        if let Some(handle) = first {
            handle.abort();
        }
    }
}
