use serde::{Deserialize, Serialize};

/// Almgren-Chriss model inputs for a single solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionParameters {
    /// Number of decision steps. Must be at least 2.
    pub time_steps: usize,
    /// Inventory to liquidate, in whole units.
    pub total_shares: usize,
    pub risk_aversion: f64,
    /// Temporary impact exponent.
    pub alpha: f64,
    /// Permanent impact exponent.
    pub beta: f64,
    /// Permanent impact coefficient.
    pub gamma: f64,
    /// Temporary impact coefficient.
    pub eta: f64,
    /// Decimal fraction (0.025 == 2.5%).
    pub volatility: f64,
}

impl Default for ExecutionParameters {
    fn default() -> Self {
        Self {
            time_steps: 50,
            total_shares: 100,
            risk_aversion: 0.001,
            alpha: 1.0,
            beta: 1.0,
            gamma: 0.05,
            eta: 0.05,
            volatility: 0.025,
        }
    }
}

/// Cost breakdown for a hypothetical market order, in quote currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostMetrics {
    pub slippage: f64,
    pub fees: f64,
    pub market_impact: f64,
    /// `slippage + fees + market_impact`.
    pub net_cost: f64,
    pub maker_taker_ratio: f64,
    /// Time spent computing this estimate, in milliseconds.
    pub latency: f64,
}
