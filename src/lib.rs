//! Microgrid battery sizing and dispatch evaluation under stochastic scenarios.

pub mod config;
pub mod error;
/// Multi-trial harness with per-algorithm fault isolation.
pub mod harness;
pub mod io {
    pub mod export;
}
/// Search boundary and reference metaheuristics.
pub mod optim;
pub mod random;
pub mod scenario;
/// Dispatch cost evaluator, SOC trace and result types.
pub mod sim;
pub mod stats;
pub mod telemetry;
