use std::time::Duration;

use tracing::warn;

pub const DEFAULT_FEED_URL: &str =
    "wss://ws.gomarket-cpp.goquant.io/ws/l2-orderbook/okx/BTC-USDT-SWAP";

#[derive(Clone, Debug)]
pub struct FeedConfig {
    /// Websocket endpoint streaming full L2 snapshots for a single pair.
    pub url: String,

    /// Fixed delay between a lost connection and the next connect attempt.
    /// There is no retry limit and no exponential growth.
    pub reconnect_backoff: Duration,

    /// How often a keep-alive ping is sent on an open connection.
    pub ping_interval: Duration,

    /// How long to wait for the matching pong before the connection is
    /// considered dead.
    pub ping_timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
            reconnect_backoff: Duration::from_secs(5),
            ping_interval: Duration::from_secs(20),
            ping_timeout: Duration::from_secs(10),
        }
    }
}

impl FeedConfig {
    /// Defaults overridden by `FEED_URL`, `FEED_RECONNECT_SECS`,
    /// `FEED_PING_INTERVAL_SECS` and `FEED_PING_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            url: std::env::var("FEED_URL").unwrap_or(defaults.url),
            reconnect_backoff: secs_or(
                "FEED_RECONNECT_SECS",
                std::env::var("FEED_RECONNECT_SECS").ok(),
                defaults.reconnect_backoff,
            ),
            ping_interval: secs_or(
                "FEED_PING_INTERVAL_SECS",
                std::env::var("FEED_PING_INTERVAL_SECS").ok(),
                defaults.ping_interval,
            ),
            ping_timeout: secs_or(
                "FEED_PING_TIMEOUT_SECS",
                std::env::var("FEED_PING_TIMEOUT_SECS").ok(),
                defaults.ping_timeout,
            ),
        }
    }
}

fn secs_or(key: &str, raw: Option<String>, default: Duration) -> Duration {
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            warn!(key, value = %raw, ?default, "ignoring invalid duration override");
            default
        }
    }
}
