use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, sleep_until};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, instrument, trace};

use super::{FrameStream, OrderBookSource};
use crate::error::FeedError;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Keep-alive policy for an open websocket.
#[derive(Clone, Copy, Debug)]
pub struct KeepAlive {
    pub interval: Duration,
    pub timeout: Duration,
}

/// Websocket implementation of [`OrderBookSource`].
pub struct WsOrderBookSource {
    url: String,
    keep_alive: KeepAlive,
}

impl WsOrderBookSource {
    pub fn new(url: impl Into<String>, keep_alive: KeepAlive) -> Self {
        Self {
            url: url.into(),
            keep_alive,
        }
    }
}

#[async_trait]
impl OrderBookSource for WsOrderBookSource {
    fn endpoint(&self) -> &str {
        &self.url
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn connect(&self) -> Result<Box<dyn FrameStream>, FeedError> {
        debug!("opening websocket");
        let (socket, response) = connect_async(self.url.as_str()).await?;
        debug!(status = %response.status(), "websocket handshake complete");

        Ok(Box::new(WsFrameStream::new(socket, self.keep_alive)))
    }
}

/// One websocket session.
///
/// Pings go out every `interval`; a ping that is not answered within
/// `timeout` ends the session with [`FeedError::KeepAliveTimeout`]. Server
/// pings are answered by tungstenite itself.
struct WsFrameStream {
    socket: Socket,
    ping_ticker: Interval,
    pong_deadline: Option<Instant>,
    timeout: Duration,
}

impl WsFrameStream {
    fn new(socket: Socket, keep_alive: KeepAlive) -> Self {
        let mut ping_ticker =
            interval_at(Instant::now() + keep_alive.interval, keep_alive.interval);
        ping_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            socket,
            ping_ticker,
            pong_deadline: None,
            timeout: keep_alive.timeout,
        }
    }
}

#[async_trait]
impl FrameStream for WsFrameStream {
    async fn next_text(&mut self) -> Result<Option<String>, FeedError> {
        loop {
            let deadline = self.pong_deadline;

            tokio::select! {
                _ = self.ping_ticker.tick() => {
                    // Only one ping in flight; the deadline branch owns the timeout.
                    if self.pong_deadline.is_none() {
                        trace!("sending keep-alive ping");
                        self.socket.send(Message::Ping(Vec::new().into())).await?;
                        self.pong_deadline = Some(Instant::now() + self.timeout);
                    }
                }

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    return Err(FeedError::KeepAliveTimeout(self.timeout));
                }

                frame = self.socket.next() => match frame {
                    None => return Ok(None),
                    Some(Err(e)) => return Err(e.into()),
                    Some(Ok(Message::Text(text))) => return Ok(Some(text.as_str().to_owned())),
                    Some(Ok(Message::Pong(_))) => {
                        trace!("keep-alive pong received");
                        self.pong_deadline = None;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        debug!(?frame, "server closed websocket");
                        return Ok(None);
                    }
                    Some(Ok(other)) => {
                        trace!(len = other.len(), "ignoring non-text frame");
                    }
                },
            }
        }
    }
}
