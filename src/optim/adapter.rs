//! Uniform wrapper around a strategy run.

use tracing::debug;

use crate::config::SearchConfig;
use crate::error::{EvalError, SearchError};
use crate::sim::Solution;

use super::{Bounds, Objective, SearchProblem, SearchStrategy};

/// Result of one normalised optimizer run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub best_solution: Solution,
    pub best_cost: f64,
    /// Best-so-far cost per reported step; never empty, never increasing.
    pub history: Vec<f64>,
}

/// Runs a [`SearchStrategy`] over fixed bounds and budgets and hides the
/// differences in how strategies report convergence.
///
/// History is taken from the strategy's own record when present, else from
/// the values pushed to the observer, else synthesised as `[best_cost]`.
/// A running minimum is applied in every case, floored at the re-evaluated
/// best cost.
#[derive(Debug, Clone)]
pub struct OptimizerAdapter {
    bounds: Bounds,
    population: usize,
    max_iterations: usize,
}

impl OptimizerAdapter {
    pub fn new(bounds: Bounds, population: usize, max_iterations: usize) -> Self {
        Self {
            bounds,
            population,
            max_iterations,
        }
    }

    /// Adapter for a horizon of `hours` using the configured search box.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] if the configured capacity or dispatch limits
    /// do not form a valid box.
    pub fn from_config(hours: usize, search: &SearchConfig) -> Result<Self, EvalError> {
        Ok(Self::new(
            Bounds::for_horizon(hours, search)?,
            search.population,
            search.max_iterations,
        ))
    }

    /// Same bounds and iteration budget with a different population size.
    pub fn with_population(&self, population: usize) -> Self {
        Self {
            population,
            ..self.clone()
        }
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn hours(&self) -> usize {
        self.bounds.dimension().saturating_sub(1)
    }

    /// Runs `strategy` on `objective` with its own random stream seeded by `seed`.
    ///
    /// # Errors
    ///
    /// Propagates strategy errors, and returns
    /// [`SearchError::MalformedSolution`] for a wrong-length best vector or
    /// [`SearchError::NumericAnomaly`] when the best vector re-evaluates to a
    /// non-finite cost.
    ///
    /// The reported cost is the objective re-evaluated at the best vector, and
    /// the history always ends on it.
    pub fn run(
        &self,
        strategy: &dyn SearchStrategy,
        objective: &Objective<'_>,
        seed: u64,
    ) -> Result<RunOutput, SearchError> {
        let problem = SearchProblem {
            objective,
            bounds: &self.bounds,
            population: self.population,
            max_iterations: self.max_iterations,
            seed,
        };
        let mut observed = Vec::new();
        let outcome = strategy.search(&problem, &mut |c| observed.push(c))?;

        let name = strategy.name();
        if outcome.best.len() != self.bounds.dimension() {
            return Err(SearchError::MalformedSolution {
                algorithm: name.to_string(),
                expected: self.bounds.dimension(),
                actual: outcome.best.len(),
            });
        }
        let best_cost = problem.cost(&outcome.best);
        if !best_cost.is_finite() {
            return Err(SearchError::NumericAnomaly {
                algorithm: name.to_string(),
                cost: best_cost,
            });
        }
        if best_cost != outcome.best_cost {
            debug!(
                algorithm = name,
                reported = outcome.best_cost,
                best_cost,
                "reported best cost differs from re-evaluation"
            );
        }

        let raw = if !outcome.history.is_empty() {
            outcome.history
        } else if !observed.is_empty() {
            observed
        } else {
            vec![best_cost]
        };
        let history = settle_on(running_min(raw), best_cost);
        debug!(
            algorithm = name,
            best_cost,
            steps = history.len(),
            "optimizer run finished"
        );

        Ok(RunOutput {
            best_solution: Solution::from_vector(&outcome.best, self.hours())?,
            best_cost,
            history,
        })
    }
}

/// Floors a best-so-far history at `best_cost` and makes it end there.
fn settle_on(mut history: Vec<f64>, best_cost: f64) -> Vec<f64> {
    for v in &mut history {
        *v = v.max(best_cost);
    }
    if history.last() != Some(&best_cost) {
        history.push(best_cost);
    }
    history
}

/// Best-so-far transform. NaN entries carry the previous minimum forward.
fn running_min(values: Vec<f64>) -> Vec<f64> {
    let mut best = f64::INFINITY;
    values
        .into_iter()
        .map(|v| {
            if v < best {
                best = v;
            }
            best
        })
        .collect()
}
