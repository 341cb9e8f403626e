pub mod almgren_chriss;
pub mod cost;
pub mod error;
pub mod matrix;
pub mod simulation;

pub use almgren_chriss::{SolverResult, optimal_execution};
pub use cost::estimate;
pub use error::{PlannerError, SimulationError};
pub use matrix::Matrix;
pub use simulation::{MarketSummary, SimulationReport, SimulationRequest, simulate};
