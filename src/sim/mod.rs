/// Dispatch cost evaluator.
pub mod evaluator;
/// Reporting-only SOC model.
pub mod soc_trace;
pub mod state;
pub mod types;

pub use evaluator::DispatchSimulator;
pub use soc_trace::SocTraceCalculator;
pub use state::SimulationState;
pub use types::{CostBreakdown, Evaluation, HourRecord, Solution};
