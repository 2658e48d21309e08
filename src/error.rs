//! Error types shared across the evaluator, the optimizer boundary and the harness.

use thiserror::Error;

/// Shape or bound problems detected before a simulation runs.
///
/// These are configuration errors: the caller handed the evaluator or the
/// adapter something it can never evaluate, so they are reported instead of
/// being folded into a cost.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("solution has {actual} entries, expected {expected} (capacity + one dispatch per hour)")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("bounds have mismatched lengths: {lower} lower vs {upper} upper")]
    BoundsLength { lower: usize, upper: usize },
    #[error("invalid bounds at dimension {index}: lower {lower} > upper {upper} or not finite")]
    InvalidBounds { index: usize, lower: f64, upper: f64 },
    #[error("battery capacity must be > 0, got {0}")]
    NonPositiveCapacity(f64),
    #[error("scenario series `{series}` has {actual} hours, expected {expected}")]
    SeriesLength {
        series: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("scenario series `{series}` is negative or not finite at hour {hour}")]
    InvalidSeriesValue { series: &'static str, hour: usize },
}

/// Failures raised while a search strategy runs.
///
/// The trial harness records every variant as a failed (infinite-cost) trial
/// for the offending algorithm and keeps going.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("{algorithm} failed: {reason}")]
    AlgorithmFailure { algorithm: String, reason: String },
    #[error("{algorithm} produced a non-finite cost ({cost})")]
    NumericAnomaly { algorithm: String, cost: f64 },
    #[error("{algorithm} returned a {actual}-dimensional solution, expected {expected}")]
    MalformedSolution {
        algorithm: String,
        expected: usize,
        actual: usize,
    },
    #[error(transparent)]
    Eval(#[from] EvalError),
}
