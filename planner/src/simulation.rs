use corelib::{CostMetrics, ExecutionParameters, FeeTier, OrderBookSnapshot, PriceLevel};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::almgren_chriss::{SolverResult, optimal_execution};
use crate::cost::estimate;
use crate::error::SimulationError;

/// Levels shown per side in a market summary.
pub const DEFAULT_DEPTH_LEVELS: usize = 20;

/// Inputs of one "simulate trade" action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationRequest {
    /// Order size in quote currency (USD).
    pub quantity: f64,
    /// Volatility in percent (2.5 == 2.5%).
    pub volatility_percent: f64,
    pub fee_tier: FeeTier,
    pub time_steps: usize,
    pub risk_aversion: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub eta: f64,
    pub depth_levels: usize,
}

impl Default for SimulationRequest {
    fn default() -> Self {
        let model = ExecutionParameters::default();

        Self {
            quantity: 100.0,
            volatility_percent: 2.5,
            fee_tier: FeeTier::Regular,
            time_steps: model.time_steps,
            risk_aversion: model.risk_aversion,
            alpha: model.alpha,
            beta: model.beta,
            gamma: model.gamma,
            eta: model.eta,
            depth_levels: DEFAULT_DEPTH_LEVELS,
        }
    }
}

impl SimulationRequest {
    /// Solver inputs: the quantity is truncated to whole units and the
    /// volatility converted from percent to a fraction.
    pub fn execution_parameters(&self) -> Result<ExecutionParameters, SimulationError> {
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(SimulationError::InvalidQuantity(self.quantity));
        }

        Ok(ExecutionParameters {
            time_steps: self.time_steps,
            total_shares: self.quantity.trunc() as usize,
            risk_aversion: self.risk_aversion,
            alpha: self.alpha,
            beta: self.beta,
            gamma: self.gamma,
            eta: self.eta,
            volatility: self.volatility_percent / 100.0,
        })
    }
}

/// Top-of-book view of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    pub exchange: String,
    pub symbol: String,
    pub timestamp: String,
    pub best_bid: Option<PriceLevel>,
    pub best_ask: Option<PriceLevel>,
    pub mid_price: Option<f64>,
    pub spread: Option<f64>,
    pub top_bids: Vec<PriceLevel>,
    pub top_asks: Vec<PriceLevel>,
}

impl MarketSummary {
    pub fn from_snapshot(snapshot: &OrderBookSnapshot, depth: usize) -> Self {
        Self {
            exchange: snapshot.exchange.clone(),
            symbol: snapshot.symbol.clone(),
            timestamp: snapshot.timestamp.clone(),
            best_bid: snapshot.best_bid(),
            best_ask: snapshot.best_ask(),
            mid_price: snapshot.mid_price(),
            spread: snapshot.spread(),
            top_bids: snapshot.top_bids(depth),
            top_asks: snapshot.top_asks(depth),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub market: MarketSummary,
    pub metrics: CostMetrics,
    pub execution: SolverResult,
}

/// Run the cost estimate and the execution solver against the latest book.
///
/// Fails with [`SimulationError::AwaitingData`] until the feed has published
/// a snapshot. Nothing is computed on failure.
#[instrument(
    target = "planner",
    skip_all,
    fields(quantity = request.quantity, tier = %request.fee_tier)
)]
pub fn simulate(
    latest: Option<&OrderBookSnapshot>,
    request: &SimulationRequest,
) -> Result<SimulationReport, SimulationError> {
    let snapshot = latest.ok_or(SimulationError::AwaitingData)?;
    let params = request.execution_parameters()?;

    let execution = optimal_execution(&params)?;
    let metrics = estimate(
        snapshot,
        request.quantity,
        request.volatility_percent,
        request.fee_tier,
    );
    let market = MarketSummary::from_snapshot(snapshot, request.depth_levels);

    info!(
        symbol = %market.symbol,
        mid = ?market.mid_price,
        net_cost = metrics.net_cost,
        executed = execution.executed(),
        "trade simulated"
    );

    Ok(SimulationReport {
        market,
        metrics,
        execution,
    })
}
