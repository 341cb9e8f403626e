use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use market::source::{FrameStream, OrderBookSource};
use market::{ConnectionState, FeedError, OrderBookFeed};

/// One scripted connect outcome: either a session yielding these frames and
/// then closing, or a refused connection.
enum Session {
    Frames(Vec<String>),
    Refused,
}

/// Source that plays back sessions in order, then hangs on connect forever.
#[derive(Clone)]
struct ScriptedSource {
    sessions: Arc<Mutex<VecDeque<Session>>>,
    connects: Arc<AtomicUsize>,
}

impl ScriptedSource {
    fn new(sessions: Vec<Session>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(sessions.into())),
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

struct ScriptedStream {
    frames: VecDeque<String>,
}

#[async_trait]
impl FrameStream for ScriptedStream {
    async fn next_text(&mut self) -> Result<Option<String>, FeedError> {
        Ok(self.frames.pop_front())
    }
}

#[async_trait]
impl OrderBookSource for ScriptedSource {
    fn endpoint(&self) -> &str {
        "mock://scripted"
    }

    async fn connect(&self) -> Result<Box<dyn FrameStream>, FeedError> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        let next = self.sessions.lock().pop_front();
        match next {
            Some(Session::Frames(frames)) => Ok(Box::new(ScriptedStream {
                frames: frames.into(),
            })),
            Some(Session::Refused) => Err(FeedError::Unavailable("scripted refusal".into())),
            None => std::future::pending().await,
        }
    }
}

fn book(ts: &str, bid: &str, ask: &str) -> String {
    json!({
        "timestamp": ts,
        "exchange": "OKX",
        "symbol": "BTC-USDT-SWAP",
        "bids": [[bid, "1.0"]],
        "asks": [[ask, "1.0"]]
    })
    .to_string()
}

const BACKOFF: Duration = Duration::from_secs(5);

#[tokio::test(start_paused = true)]
async fn publishes_valid_frames_and_skips_malformed_ones() {
    let source = ScriptedSource::new(vec![Session::Frames(vec![
        book("t1", "100.0", "101.0"),
        r#"{"bids": [["1.0", "1.0"]]}"#.to_string(),
        "not json at all".to_string(),
    ])]);

    let feed = OrderBookFeed::new(source.clone(), BACKOFF);
    assert!(feed.latest().is_none());

    feed.start();

    let first = feed.wait_for_snapshot(Duration::from_secs(1)).await.unwrap();
    assert_eq!(first.timestamp, "t1");

    // Let the session drain.
    tokio::time::sleep(Duration::from_millis(10)).await;

    let latest = feed.latest().unwrap();
    assert_eq!(latest.timestamp, "t1");
    assert_eq!(latest.mid_price(), Some(100.5));

    let stats = feed.stats();
    assert_eq!(stats.published, 1);
    assert_eq!(stats.discarded, 2);
}

#[tokio::test(start_paused = true)]
async fn reconnects_after_fixed_backoff_and_keeps_stale_snapshot() {
    let source = ScriptedSource::new(vec![Session::Frames(vec![book("t1", "100.0", "101.0")])]);

    let feed = OrderBookFeed::new(source.clone(), BACKOFF);
    feed.start();
    feed.wait_for_snapshot(Duration::from_secs(1)).await.unwrap();

    // Session closed right after the frame; the feed is now backing off.
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(source.connects(), 1);
    assert_eq!(feed.connection_state(), ConnectionState::Backoff);
    assert_eq!(feed.latest().unwrap().timestamp, "t1");

    // Past the 5s mark the feed reconnects (and the script hangs the attempt).
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(source.connects(), 2);
    assert_eq!(feed.connection_state(), ConnectionState::Connecting);
    assert_eq!(feed.latest().unwrap().timestamp, "t1");

    let stats = feed.stats();
    assert_eq!(stats.connects, 1);
    assert_eq!(stats.disconnects, 1);
}

#[tokio::test(start_paused = true)]
async fn refused_connections_are_retried_until_data_flows() {
    let source = ScriptedSource::new(vec![
        Session::Frames(vec![book("t1", "100.0", "101.0")]),
        Session::Refused,
        Session::Refused,
        Session::Frames(vec![book("t2", "200.0", "202.0")]),
    ]);

    let feed = OrderBookFeed::new(source.clone(), BACKOFF);
    feed.start();

    // connect #1 at 0s, #2 at 5s, #3 at 10s, #4 at 15s, #5 (hangs) at 20s
    tokio::time::sleep(Duration::from_secs(16)).await;

    assert_eq!(source.connects(), 4);
    let latest = feed.latest().unwrap();
    assert_eq!(latest.timestamp, "t2");
    assert_eq!(latest.mid_price(), Some(201.0));

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(source.connects(), 5);
}

#[tokio::test(start_paused = true)]
async fn second_start_does_not_open_another_connection() {
    let source = ScriptedSource::new(vec![]);
    let feed = OrderBookFeed::new(source.clone(), BACKOFF);

    assert!(feed.start().is_some());
    assert!(feed.clone().start().is_none());

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(source.connects(), 1);
    assert_eq!(feed.connection_state(), ConnectionState::Connecting);
}

#[tokio::test(start_paused = true)]
async fn wait_for_snapshot_times_out_without_data() {
    let source = ScriptedSource::new(vec![Session::Refused]);
    let feed = OrderBookFeed::new(source, BACKOFF);
    feed.start();

    assert!(feed.wait_for_snapshot(Duration::from_secs(3)).await.is_none());
    assert!(feed.latest().is_none());
}
