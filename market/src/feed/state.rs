/// Connection lifecycle of the order book feed.
///
/// ```text
/// Disconnected --Start--> Connecting --Connected--> Connected
///                             |                        |
///                       ConnectFailed            ConnectionLost
///                             v                        v
///                          Backoff <-------------------+
///                             |
///                      BackoffElapsed --> Connecting
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Feed not started yet.
    Disconnected,
    /// Connect attempt in flight.
    Connecting,
    /// Session open, frames being consumed.
    Connected,
    /// Waiting out the fixed reconnect delay.
    Backoff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    Start,
    Connected,
    ConnectFailed,
    /// Peer close, transport error or keep-alive timeout.
    ConnectionLost,
    BackoffElapsed,
}

impl ConnectionState {
    /// Pure transition function. Events that make no sense for the current
    /// state leave it unchanged.
    pub fn on(self, event: ConnectionEvent) -> ConnectionState {
        use ConnectionEvent as E;
        use ConnectionState as S;

        match (self, event) {
            (S::Disconnected, E::Start) => S::Connecting,
            (S::Connecting, E::Connected) => S::Connected,
            (S::Connecting, E::ConnectFailed) => S::Backoff,
            (S::Connected, E::ConnectionLost) => S::Backoff,
            (S::Backoff, E::BackoffElapsed) => S::Connecting,
            (state, _) => state,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}
