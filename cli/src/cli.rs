use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use corelib::{ExecutionParameters, FeeTier};
use market::FeedConfig;
use planner::SimulationRequest;
use planner::simulation::DEFAULT_DEPTH_LEVELS;
use tracing::warn;

#[derive(Debug, Parser)]
#[clap(name = "trade-sim", version)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[clap(long, global = true, env = "TRADE_SIM_JSON_LOGS")]
    pub json_logs: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stream the order book and log mid price candles
    Watch {
        #[clap(flatten)]
        feed: FeedArgs,
    },

    /// Wait for a live snapshot, then estimate costs and solve the schedule
    Simulate {
        #[clap(flatten)]
        feed: FeedArgs,

        #[clap(flatten)]
        trade: TradeArgs,

        #[clap(flatten)]
        model: ModelArgs,

        /// Seconds to wait for the first snapshot
        #[clap(long, default_value = "15")]
        wait_secs: u64,

        /// Order book levels reported per side
        #[clap(long, default_value_t = DEFAULT_DEPTH_LEVELS)]
        depth: usize,
    },

    /// Solve the execution schedule offline
    Solve {
        #[clap(flatten)]
        model: ModelArgs,

        /// Units to liquidate
        #[clap(long, default_value = "100")]
        total_shares: usize,

        /// Volatility in percent
        #[clap(long, default_value = "2.5")]
        volatility: f64,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Watch { .. } => "watch",
            Command::Simulate { .. } => "simulate",
            Command::Solve { .. } => "solve",
        }
    }
}

/// Feed settings; unset flags fall back to `FEED_*` environment variables.
#[derive(Debug, Args)]
pub struct FeedArgs {
    /// Websocket endpoint of the L2 order book stream
    #[clap(long)]
    pub url: Option<String>,

    /// Seconds between a dropped connection and the next attempt
    #[clap(long)]
    pub reconnect_secs: Option<u64>,
}

impl FeedArgs {
    pub fn config(&self) -> FeedConfig {
        let mut cfg = FeedConfig::from_env();

        if let Some(url) = &self.url {
            cfg.url = url.clone();
        }
        if let Some(secs) = self.reconnect_secs.filter(|s| *s > 0) {
            cfg.reconnect_backoff = Duration::from_secs(secs);
        }

        cfg
    }
}

#[derive(Debug, Args)]
pub struct TradeArgs {
    /// Order size in USD
    #[clap(long, default_value = "100.0")]
    pub quantity: f64,

    /// Volatility in percent
    #[clap(long, default_value = "2.5")]
    pub volatility: f64,

    /// Fee tier: Regular, VIP 1, VIP 2
    #[clap(long, default_value = "Regular")]
    pub fee_tier: String,
}

#[derive(Debug, Args)]
pub struct ModelArgs {
    #[clap(long, default_value = "50")]
    pub time_steps: usize,

    #[clap(long, default_value = "0.001")]
    pub risk_aversion: f64,

    /// Temporary impact exponent
    #[clap(long, default_value = "1.0")]
    pub alpha: f64,

    /// Permanent impact exponent
    #[clap(long, default_value = "1.0")]
    pub beta: f64,

    /// Permanent impact coefficient
    #[clap(long, default_value = "0.05")]
    pub gamma: f64,

    /// Temporary impact coefficient
    #[clap(long, default_value = "0.05")]
    pub eta: f64,
}

/// Resolve a fee tier label, falling back to Regular on unknown input.
pub(crate) fn resolve_fee_tier(label: &str) -> FeeTier {
    FeeTier::try_from_label(label).unwrap_or_else(|| {
        warn!(label, fallback = %FeeTier::default(), "unknown fee tier");
        FeeTier::default()
    })
}

pub(crate) fn simulation_request(
    trade: &TradeArgs,
    model: &ModelArgs,
    depth: usize,
) -> SimulationRequest {
    SimulationRequest {
        quantity: trade.quantity,
        volatility_percent: trade.volatility,
        fee_tier: resolve_fee_tier(&trade.fee_tier),
        time_steps: model.time_steps,
        risk_aversion: model.risk_aversion,
        alpha: model.alpha,
        beta: model.beta,
        gamma: model.gamma,
        eta: model.eta,
        depth_levels: depth,
    }
}

pub(crate) fn execution_parameters(
    model: &ModelArgs,
    total_shares: usize,
    volatility_percent: f64,
) -> ExecutionParameters {
    ExecutionParameters {
        time_steps: model.time_steps,
        total_shares,
        risk_aversion: model.risk_aversion,
        alpha: model.alpha,
        beta: model.beta,
        gamma: model.gamma,
        eta: model.eta,
        volatility: volatility_percent / 100.0,
    }
}
