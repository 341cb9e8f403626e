//! Almgren-Chriss optimal execution over a discrete (time, inventory) grid.
//!
//! Costs are carried multiplicatively as `exp(H)` so the per-step objective
//! composes by product along a path. Exponents are clamped before `exp`;
//! products of clamped weights may still reach infinity, which compares
//! consistently and never produces NaN for finite inputs.

use corelib::ExecutionParameters;
use serde::Serialize;
use tracing::{Span, debug, field, instrument, warn};

use crate::error::PlannerError;
use crate::matrix::Matrix;

/// Duration of one decision step.
pub const TIME_STEP_SIZE: f64 = 0.5;

/// Bound applied to exponents before `exp`.
pub const EXP_CLAMP: f64 = 700.0;

/// Upper bound on `time_steps * (total_shares + 1)`.
pub const MAX_STATE_CELLS: usize = 10_000_000;

/// Largest triangular weight table kept in memory (entries).
const WEIGHT_TABLE_BUDGET: usize = 4_000_000;

/// Output of a solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverResult {
    /// Cost-to-go, shape `(time_steps, total_shares + 1)`.
    pub value_function: Matrix<f64>,
    /// Units to sell in each state, same shape as `value_function`.
    pub best_moves: Matrix<usize>,
    /// Inventory held at each step; starts at `total_shares`.
    pub inventory_path: Vec<usize>,
    /// Units sold at each step after the first, `time_steps - 1` entries.
    pub optimal_trajectory: Vec<usize>,
}

impl SolverResult {
    /// Inventory left unsold after the last step.
    pub fn residual(&self) -> usize {
        self.inventory_path.last().copied().unwrap_or_default()
    }

    pub fn executed(&self) -> usize {
        self.optimal_trajectory.iter().sum()
    }
}

pub fn temporary_impact(volume: f64, alpha: f64, eta: f64) -> f64 {
    eta * volume.powf(alpha)
}

pub fn permanent_impact(volume: f64, beta: f64, gamma: f64) -> f64 {
    gamma * volume.powf(beta)
}

/// Risk-adjusted cost of selling `sell_amount` out of `inventory` in one step
/// of length `time_step`.
pub fn hamiltonian(
    inventory: f64,
    sell_amount: f64,
    params: &ExecutionParameters,
    time_step: f64,
) -> f64 {
    let lambda = params.risk_aversion;
    let rate = sell_amount / time_step;
    let held = inventory - sell_amount;

    let permanent = lambda * sell_amount * permanent_impact(rate, params.beta, params.gamma);
    let temporary = lambda * held * time_step * temporary_impact(rate, params.alpha, params.eta);
    let risk = 0.5 * lambda.powi(2) * params.volatility.powi(2) * time_step * held.powi(2);

    permanent + temporary + risk
}

/// `exp` with the exponent clamped to `[-EXP_CLAMP, EXP_CLAMP]`.
pub fn safe_exp(x: f64) -> f64 {
    x.clamp(-EXP_CLAMP, EXP_CLAMP).exp()
}

/// Solve for the cost-minimising liquidation schedule.
///
/// Backward induction fills `value_function` and `best_moves` from the last
/// step to the first; a forward pass then walks `best_moves` from
/// `total_shares` to produce the path. For each state "sell everything" is the
/// initial candidate and a partial sale replaces it only when strictly cheaper.
#[instrument(
    target = "planner",
    skip(params),
    fields(
        time_steps = params.time_steps,
        total_shares = params.total_shares,
        executed = field::Empty
    )
)]
pub fn optimal_execution(params: &ExecutionParameters) -> Result<SolverResult, PlannerError> {
    validate(params)?;

    let steps = params.time_steps;
    let shares = params.total_shares;
    let last = steps - 1;

    let mut value_function: Matrix<f64> = Matrix::new(steps, shares + 1);
    let mut best_moves: Matrix<usize> = Matrix::new(steps, shares + 1);

    // Terminal step: whatever is left is sold at once.
    for s in 0..=shares {
        let held = s as f64;
        let cost = held * temporary_impact(held / TIME_STEP_SIZE, params.alpha, params.eta);
        value_function[(last, s)] = safe_exp(cost);
        best_moves[(last, s)] = s;
    }

    let weights = StepWeights::new(params);
    let mut scratch = Vec::new();

    for t in (0..last).rev() {
        let (row, next) = value_function.row_with_next(t);
        let moves = best_moves.row_mut(t);

        for s in 0..=shares {
            let w = weights.row(s, &mut scratch);

            let mut best_value = next[0] * w[s];
            let mut best_n = s;

            for n in 0..s {
                let candidate = next[s - n] * w[n];
                if candidate < best_value {
                    best_value = candidate;
                    best_n = n;
                }
            }

            row[s] = best_value;
            moves[s] = best_n;
        }
    }

    let mut inventory_path = Vec::with_capacity(steps);
    let mut optimal_trajectory = Vec::with_capacity(last);
    inventory_path.push(shares);

    for t in 1..steps {
        let held = inventory_path[t - 1];
        let sold = best_moves[(t, held)];
        inventory_path.push(held - sold);
        optimal_trajectory.push(sold);
    }

    let result = SolverResult {
        value_function,
        best_moves,
        inventory_path,
        optimal_trajectory,
    };

    Span::current().record("executed", result.executed());
    debug!(residual = result.residual(), "execution schedule solved");

    Ok(result)
}

fn validate(params: &ExecutionParameters) -> Result<(), PlannerError> {
    if params.time_steps < 2 {
        return Err(PlannerError::InvalidTimeSteps(params.time_steps));
    }

    let cells = params
        .total_shares
        .checked_add(1)
        .and_then(|cols| cols.checked_mul(params.time_steps));

    if cells.is_none_or(|c| c > MAX_STATE_CELLS) {
        return Err(PlannerError::StateSpaceTooLarge {
            time_steps: params.time_steps,
            total_shares: params.total_shares,
        });
    }

    let named = [
        ("risk_aversion", params.risk_aversion),
        ("alpha", params.alpha),
        ("beta", params.beta),
        ("gamma", params.gamma),
        ("eta", params.eta),
        ("volatility", params.volatility),
    ];

    for (name, value) in named {
        if !value.is_finite() {
            return Err(PlannerError::InvalidParameter { name, value });
        }
    }

    Ok(())
}

/// `safe_exp(H(s, n))` for `n <= s`. The weight does not depend on the time
/// step, so when the triangle fits the budget it is computed once up front.
struct StepWeights<'a> {
    params: &'a ExecutionParameters,
    table: Option<Vec<f64>>,
}

impl<'a> StepWeights<'a> {
    fn new(params: &'a ExecutionParameters) -> Self {
        let rows = params.total_shares + 1;
        let entries = rows.saturating_mul(rows + 1) / 2;

        let table = if entries <= WEIGHT_TABLE_BUDGET {
            let mut table = Vec::with_capacity(entries);
            for s in 0..rows {
                table.extend((0..=s).map(|n| weight(params, s, n)));
            }
            Some(table)
        } else {
            warn!(
                target: "planner",
                entries,
                budget = WEIGHT_TABLE_BUDGET,
                "weight table over budget; evaluating per step"
            );
            None
        };

        Self { params, table }
    }

    /// Weights for inventory `s`, indexed by sell amount `0..=s`.
    fn row<'b>(&'b self, s: usize, scratch: &'b mut Vec<f64>) -> &'b [f64] {
        match &self.table {
            Some(table) => {
                let start = s * (s + 1) / 2;
                &table[start..=start + s]
            }
            None => {
                scratch.clear();
                scratch.extend((0..=s).map(|n| weight(self.params, s, n)));
                scratch
            }
        }
    }
}

fn weight(params: &ExecutionParameters, inventory: usize, sell_amount: usize) -> f64 {
    safe_exp(hamiltonian(
        inventory as f64,
        sell_amount as f64,
        params,
        TIME_STEP_SIZE,
    ))
}
