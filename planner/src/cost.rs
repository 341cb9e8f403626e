//! Pre-trade cost estimate for a market order.
//!
//! All quantities are quote-currency notional. The estimate is pure
//! arithmetic: it never fails and never validates ranges, so callers are
//! expected to constrain inputs upstream. Only `latency` varies between calls
//! with identical inputs.

use std::time::Instant;

use corelib::{CostMetrics, FeeTier, OrderBookSnapshot};
use tracing::trace;

/// Slippage per unit of notional at zero volatility.
pub const SLIPPAGE_COEFFICIENT: f64 = 0.01;

/// Impact per square-root unit of notional.
pub const IMPACT_COEFFICIENT: f64 = 0.005;

pub fn estimate(
    snapshot: &OrderBookSnapshot,
    quantity: f64,
    volatility_percent: f64,
    fee_tier: FeeTier,
) -> CostMetrics {
    let started = Instant::now();
    let schedule = fee_tier.schedule();

    let slippage = SLIPPAGE_COEFFICIENT * quantity * (1.0 + volatility_percent / 10.0);
    let fees = schedule.fee_rate * quantity;
    let market_impact = IMPACT_COEFFICIENT * quantity.sqrt();
    let net_cost = slippage + fees + market_impact;

    let latency = started.elapsed().as_secs_f64() * 1_000.0;

    trace!(
        symbol = %snapshot.symbol,
        quantity,
        volatility_percent,
        tier = %fee_tier,
        net_cost,
        "cost estimate computed"
    );

    CostMetrics {
        slippage,
        fees,
        market_impact,
        net_cost,
        maker_taker_ratio: schedule.maker_taker_ratio,
        latency,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn book() -> OrderBookSnapshot {
        OrderBookSnapshot {
            timestamp: "t".into(),
            exchange: "OKX".into(),
            symbol: "BTC-USDT-SWAP".into(),
            bids: vec![],
            asks: vec![],
        }
    }

    fn tier() -> impl Strategy<Value = FeeTier> {
        prop::sample::select(FeeTier::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]
        #[test]
        fn estimate_invariants(
            quantity in 0.0..1_000_000.0f64,
            volatility in 0.0..10.0f64,
            fee_tier in tier(),
        ) {
            let a = estimate(&book(), quantity, volatility, fee_tier);
            let b = estimate(&book(), quantity, volatility, fee_tier);

            // --- Deterministic apart from latency ---
            prop_assert_eq!(a.slippage, b.slippage);
            prop_assert_eq!(a.fees, b.fees);
            prop_assert_eq!(a.market_impact, b.market_impact);
            prop_assert_eq!(a.net_cost, b.net_cost);
            prop_assert_eq!(a.maker_taker_ratio, b.maker_taker_ratio);
            prop_assert!(a.latency >= 0.0);

            // --- Net cost is the exact sum ---
            prop_assert_eq!(a.net_cost, a.slippage + a.fees + a.market_impact);

            // --- Ratio comes from the tier table ---
            prop_assert!([0.6, 0.7, 0.8].contains(&a.maker_taker_ratio));
        }

        #[test]
        fn slippage_increases_with_both_inputs(
            quantity in 1.0..100_000.0f64,
            volatility in 0.0..10.0f64,
        ) {
            let base = estimate(&book(), quantity, volatility, FeeTier::Regular);
            let more_qty = estimate(&book(), quantity * 1.5, volatility, FeeTier::Regular);
            let more_vol = estimate(&book(), quantity, volatility + 1.0, FeeTier::Regular);

            prop_assert!(more_qty.slippage > base.slippage);
            prop_assert!(more_vol.slippage > base.slippage);
        }
    }
}
