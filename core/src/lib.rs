pub mod models;

pub use models::execution::{CostMetrics, ExecutionParameters};
pub use models::fees::{FeeSchedule, FeeTier};
pub use models::order_book::{OrderBookSnapshot, PriceLevel};
