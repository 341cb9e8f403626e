use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum PlannerError {
    #[error("time_steps must be at least 2, got {0}")]
    InvalidTimeSteps(usize),

    #[error("state space of {time_steps} steps x {total_shares} shares exceeds the solver limit")]
    StateSpaceTooLarge {
        time_steps: usize,
        total_shares: usize,
    },

    #[error("parameter `{name}` must be finite, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

#[derive(Error, Debug, PartialEq)]
pub enum SimulationError {
    #[error("awaiting order book data")]
    AwaitingData,

    #[error("quantity must be a finite non-negative amount, got {0}")]
    InvalidQuantity(f64),

    #[error(transparent)]
    Planner(#[from] PlannerError),
}
