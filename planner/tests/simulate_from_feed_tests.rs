use market::{FeedConfig, OrderBookFeed};
use planner::{SimulationError, SimulationRequest, simulate};
use serde_json::json;

fn okx_frame(ts: &str, bids: serde_json::Value, asks: serde_json::Value) -> String {
    json!({
        "timestamp": ts,
        "exchange": "OKX",
        "symbol": "BTC-USDT-SWAP",
        "bids": bids,
        "asks": asks
    })
    .to_string()
}

/// Feed that is never started; frames are pushed through `ingest`.
fn idle_feed() -> OrderBookFeed {
    OrderBookFeed::from_config(&FeedConfig::default())
}

#[test]
fn simulate_reports_awaiting_data_until_first_snapshot() {
    let feed = idle_feed();
    let request = SimulationRequest::default();

    let err = simulate(feed.latest().as_deref(), &request).unwrap_err();
    assert_eq!(err, SimulationError::AwaitingData);

    assert!(feed.ingest(&okx_frame(
        "2025-05-04T10:39:13Z",
        json!([["95445.5", "9.06"], ["95448.0", "2.0"]]),
        json!([["95450.5", "1.5"], ["95449.6", "0.1"]]),
    )));

    let report = simulate(feed.latest().as_deref(), &request).unwrap();

    assert_eq!(report.market.symbol, "BTC-USDT-SWAP");
    assert_eq!(report.market.best_bid.map(|l| l.price), Some(95448.0));
    assert_eq!(report.market.best_ask.map(|l| l.price), Some(95449.6));
    assert_eq!(report.execution.executed() + report.execution.residual(), 100);
}

#[test]
fn malformed_frame_does_not_change_simulation_input() {
    let feed = idle_feed();
    feed.ingest(&okx_frame("t1", json!([["100.0", "1.0"]]), json!([["101.0", "1.0"]])));
    feed.ingest(r#"{"bids": [["1.0", "1.0"]]}"#);

    let report = simulate(feed.latest().as_deref(), &SimulationRequest::default()).unwrap();

    assert_eq!(report.market.timestamp, "t1");
    assert_eq!(report.market.mid_price, Some(100.5));
}

#[test]
fn simulation_uses_the_newest_snapshot() {
    let feed = idle_feed();
    feed.ingest(&okx_frame("t1", json!([["100.0", "1.0"]]), json!([["101.0", "1.0"]])));
    feed.ingest(&okx_frame("t2", json!([["200.0", "1.0"]]), json!([["202.0", "1.0"]])));

    let request = SimulationRequest {
        quantity: 20.0,
        time_steps: 5,
        ..SimulationRequest::default()
    };
    let report = simulate(feed.latest().as_deref(), &request).unwrap();

    assert_eq!(report.market.timestamp, "t2");
    assert_eq!(report.market.mid_price, Some(201.0));
    assert_eq!(report.execution.inventory_path[0], 20);
}

#[test]
fn empty_book_side_still_simulates() {
    let feed = idle_feed();
    feed.ingest(&okx_frame("t1", json!([]), json!([["101.0", "1.0"]])));

    let report = simulate(feed.latest().as_deref(), &SimulationRequest::default()).unwrap();

    assert!(report.market.best_bid.is_none());
    assert!(report.market.mid_price.is_none());
    assert!(report.metrics.net_cost > 0.0);
}
