pub mod candles;
pub mod config;
pub mod error;
pub mod feed;
pub mod parser;
pub mod source;

pub use config::FeedConfig;
pub use error::{FeedError, MessageError};
pub use feed::{ConnectionEvent, ConnectionState, FeedStats, OrderBookFeed};
