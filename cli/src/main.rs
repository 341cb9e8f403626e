pub mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use common::logger::{LogFormat, TraceId, child_span, init_logger, root_span};
use common::time::now_ms;
use market::candles::CandleBuilder;
use market::{FeedConfig, OrderBookFeed};
use planner::{SimulationError, optimal_execution, simulate};
use serde_json::json;
use tracing::{Instrument, info, warn};

use cli::*;

const WATCH_POLL: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_logger("trade-sim", "info", format);

    let span = root_span(cli.command.name(), &TraceId::default());
    let result = run(cli.command).instrument(span.clone()).await;
    span.record("outcome", if result.is_ok() { "ok" } else { "error" });

    result
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Watch { feed } => watch(feed.config()).await,

        Command::Simulate {
            feed,
            trade,
            model,
            wait_secs,
            depth,
        } => {
            let request = simulation_request(&trade, &model, depth);
            let wait = Duration::from_secs(wait_secs);

            let feed = OrderBookFeed::from_config(&feed.config());
            feed.start();

            let latest = feed.wait_for_snapshot(wait).await;
            if latest.is_none() {
                warn!(?wait, endpoint = feed.endpoint(), "no order book received in time");
            }

            let report = simulate(latest.as_deref(), &request).map_err(|e| match e {
                SimulationError::AwaitingData => {
                    anyhow::anyhow!("awaiting order book data from {}", feed.endpoint())
                }
                other => anyhow::Error::new(other).context("simulation failed"),
            })?;

            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }

        Command::Solve {
            model,
            total_shares,
            volatility,
        } => {
            let params = execution_parameters(&model, total_shares, volatility);

            let result = child_span("optimal_execution")
                .in_scope(|| optimal_execution(&params))
                .context("invalid solver configuration")?;

            let out = json!({
                "inventory_path": result.inventory_path,
                "optimal_trajectory": result.optimal_trajectory,
                "residual": result.residual(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }
    }
}

/// Run the feed until Ctrl+C, logging each new mid price and closed candle.
async fn watch(config: FeedConfig) -> anyhow::Result<()> {
    let feed = OrderBookFeed::from_config(&config);
    feed.start();

    let mut candles = CandleBuilder::default();
    let mut last_seen = None;
    let mut ticker = tokio::time::interval(WATCH_POLL);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            res = &mut shutdown => {
                res.context("failed to listen for shutdown signal")?;
                info!(
                    stats = ?feed.stats(),
                    connected = feed.connection_state().is_connected(),
                    candles = candles.len(),
                    "shutdown signal received"
                );
                return Ok(());
            }

            _ = ticker.tick() => {
                let Some(book) = feed.latest() else { continue };
                if last_seen.as_ref().is_some_and(|prev| Arc::ptr_eq(prev, &book)) {
                    continue;
                }

                if let Some(mid) = book.mid_price() {
                    info!(ts = %book.timestamp, mid, spread = ?book.spread(), "order book update");

                    if let Some(c) = candles.push(now_ms(), mid) {
                        info!(
                            open_ms = c.open_ms,
                            open = c.open,
                            high = c.high,
                            low = c.low,
                            close = c.close,
                            "candle closed"
                        );
                    }
                }

                last_seen = Some(book);
            }
        }
    }
}
