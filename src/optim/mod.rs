//! Optimizer boundary: box constraints, the strategy trait and reference
//! metaheuristics.
//!
//! Every search algorithm implements [`SearchStrategy`]. The
//! [`OptimizerAdapter`](adapter::OptimizerAdapter) wraps a strategy run and
//! normalises its convergence reporting, so the harness never needs to know
//! which convention a given algorithm uses.

pub mod adapter;
/// Flower pollination algorithm.
pub mod fpa;
/// Real-coded genetic algorithm.
pub mod ga;
/// Grey wolf optimizer.
pub mod gwo;
/// Hybrid grey-wolf / whale optimizer with Lévy and chaotic moves.
pub mod gwwoa;
/// Harmony search.
pub mod hs;
pub mod levy;
/// Particle swarm optimization.
pub mod pso;
pub mod registry;
/// Whale optimization algorithm.
pub mod woa;

use rand::Rng;

use crate::config::SearchConfig;
use crate::error::{EvalError, SearchError};

pub use adapter::{OptimizerAdapter, RunOutput};
pub use registry::AlgorithmRegistry;

/// Cost function handed to strategies. Lower is better.
pub type Objective<'a> = dyn Fn(&[f64]) -> f64 + Sync + 'a;

/// Per-dimension lower/upper limits of the feasible search region.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Bounds {
    /// Creates bounds after checking shape and ordering.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::BoundsLength`] for mismatched lengths and
    /// [`EvalError::InvalidBounds`] for a non-finite or inverted pair.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self, EvalError> {
        if lower.len() != upper.len() {
            return Err(EvalError::BoundsLength {
                lower: lower.len(),
                upper: upper.len(),
            });
        }
        for (index, (&lo, &hi)) in lower.iter().zip(&upper).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(EvalError::InvalidBounds {
                    index,
                    lower: lo,
                    upper: hi,
                });
            }
        }
        Ok(Self { lower, upper })
    }

    /// Box for a horizon of `hours`: capacity first, then one dispatch
    /// fraction per hour.
    ///
    /// # Errors
    ///
    /// Propagates [`Bounds::new`] errors for inverted configured limits.
    pub fn for_horizon(hours: usize, search: &SearchConfig) -> Result<Self, EvalError> {
        let mut lower = Vec::with_capacity(hours + 1);
        let mut upper = Vec::with_capacity(hours + 1);
        lower.push(search.capacity_min_kwh);
        upper.push(search.capacity_max_kwh);
        lower.extend(std::iter::repeat_n(-search.dispatch_limit, hours));
        upper.extend(std::iter::repeat_n(search.dispatch_limit, hours));
        Self::new(lower, upper)
    }

    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Width of dimension `j`.
    pub fn span(&self, j: usize) -> f64 {
        self.upper[j] - self.lower[j]
    }

    /// Projects `x` back into the box. NaN coordinates land on the lower bound.
    pub fn clamp(&self, x: &mut [f64]) {
        for (j, v) in x.iter_mut().enumerate() {
            *v = if v.is_nan() {
                self.lower[j]
            } else {
                v.clamp(self.lower[j], self.upper[j])
            };
        }
    }

    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.dimension()
            && x
                .iter()
                .enumerate()
                .all(|(j, v)| (self.lower[j]..=self.upper[j]).contains(v))
    }

    /// Uniform random point inside the box.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        (0..self.dimension())
            .map(|j| self.lower[j] + rng.random::<f64>() * self.span(j))
            .collect()
    }

    /// Coordinate `j` of a uniform random point.
    pub fn sample_dim<R: Rng + ?Sized>(&self, rng: &mut R, j: usize) -> f64 {
        self.lower[j] + rng.random::<f64>() * self.span(j)
    }

    pub(crate) fn random_population<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Vec<Vec<f64>> {
        (0..n).map(|_| self.sample(rng)).collect()
    }
}

/// Everything a strategy gets for one run.
pub struct SearchProblem<'a> {
    pub objective: &'a Objective<'a>,
    pub bounds: &'a Bounds,
    pub population: usize,
    pub max_iterations: usize,
    /// Seed for the strategy's own random stream.
    pub seed: u64,
}

impl SearchProblem<'_> {
    pub fn dimension(&self) -> usize {
        self.bounds.dimension()
    }

    /// Evaluates `x`, mapping NaN to `+inf` so comparisons stay total.
    pub fn cost(&self, x: &[f64]) -> f64 {
        let c = (self.objective)(x);
        if c.is_nan() { f64::INFINITY } else { c }
    }

    pub(crate) fn costs(&self, population: &[Vec<f64>]) -> Vec<f64> {
        population.iter().map(|x| self.cost(x)).collect()
    }
}

/// What a strategy returns in its own convention.
///
/// `history` may be empty for strategies that only report the final value
/// or report progress through the observer callback instead.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeOutcome {
    pub best: Vec<f64>,
    pub best_cost: f64,
    pub history: Vec<f64>,
}

/// A pluggable search algorithm minimizing an [`Objective`] over [`Bounds`].
pub trait SearchStrategy: Send + Sync {
    /// Short display name (e.g. `"GWO"`).
    fn name(&self) -> &str;

    /// Runs the search.
    ///
    /// Strategies may report their per-iteration best through `observer`
    /// instead of filling [`NativeOutcome::history`].
    ///
    /// # Errors
    ///
    /// Returns a [`SearchError`] when the algorithm cannot complete.
    fn search(
        &self,
        problem: &SearchProblem<'_>,
        observer: &mut dyn FnMut(f64),
    ) -> Result<NativeOutcome, SearchError>;
}

/// Best point seen so far.
#[derive(Debug, Clone)]
pub(crate) struct Incumbent {
    pub position: Vec<f64>,
    pub cost: f64,
}

impl Incumbent {
    pub fn from_population(population: &[Vec<f64>], costs: &[f64]) -> Self {
        let i = best_index(costs);
        Self {
            position: population[i].clone(),
            cost: costs[i],
        }
    }

    /// Replaces the incumbent if `cost` is strictly better.
    pub fn offer(&mut self, position: &[f64], cost: f64) -> bool {
        if cost < self.cost {
            self.position.clear();
            self.position.extend_from_slice(position);
            self.cost = cost;
            true
        } else {
            false
        }
    }

    pub fn into_outcome(self, history: Vec<f64>) -> NativeOutcome {
        NativeOutcome {
            best: self.position,
            best_cost: self.cost,
            history,
        }
    }
}

/// Index of the lowest cost. Costs are NaN-free (see [`SearchProblem::cost`]).
pub(crate) fn best_index(costs: &[f64]) -> usize {
    costs
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

pub(crate) fn worst_index(costs: &[f64]) -> usize {
    costs
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Fails fast on a population too small for the algorithm.
pub(crate) fn require_population(
    algorithm: &str,
    problem: &SearchProblem<'_>,
    min: usize,
) -> Result<(), SearchError> {
    if problem.population < min {
        return Err(SearchError::AlgorithmFailure {
            algorithm: algorithm.to_string(),
            reason: format!("population {} below minimum {min}", problem.population),
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Shifted sphere in a small box; optimum 0 at `x = 0.25`.
    pub fn sphere(x: &[f64]) -> f64 {
        x.iter().map(|v| (v - 0.25).powi(2)).sum()
    }

    pub fn unit_bounds(dim: usize) -> Bounds {
        Bounds::new(vec![-1.0; dim], vec![1.0; dim]).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Runs `strategy` on the sphere and returns the outcome plus observed values.
    pub fn run_on_sphere(
        strategy: &dyn SearchStrategy,
        seed: u64,
    ) -> (NativeOutcome, Vec<f64>) {
        let bounds = unit_bounds(5);
        let problem = SearchProblem {
            objective: &sphere,
            bounds: &bounds,
            population: 20,
            max_iterations: 60,
            seed,
        };
        let mut observed = Vec::new();
        let outcome = strategy
            .search(&problem, &mut |c| observed.push(c))
            .unwrap_or_else(|e| panic!("{e}"));
        (outcome, observed)
    }

    /// Checks the invariants every reference strategy must satisfy.
    pub fn assert_well_behaved(strategy: &dyn SearchStrategy) {
        let (outcome, observed) = run_on_sphere(strategy, 3);
        let bounds = unit_bounds(5);
        assert_eq!(outcome.best.len(), 5);
        assert!(bounds.contains(&outcome.best), "{}: best escaped bounds", strategy.name());
        assert!(
            (sphere(&outcome.best) - outcome.best_cost).abs() < 1e-12,
            "{}: reported cost does not match best point",
            strategy.name()
        );
        assert!(
            outcome.best_cost < 0.1,
            "{}: did not approach optimum, cost {}",
            strategy.name(),
            outcome.best_cost
        );
        let progress = if outcome.history.is_empty() { observed } else { outcome.history.clone() };
        assert!(!progress.is_empty(), "{}: no progress reported", strategy.name());
        for w in progress.windows(2) {
            assert!(w[1] <= w[0], "{}: best-so-far increased", strategy.name());
        }

        let (again, _) = run_on_sphere(strategy, 3);
        assert_eq!(outcome, again, "{}: not deterministic for a fixed seed", strategy.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizon_bounds_layout() {
        let b = Bounds::for_horizon(24, &SearchConfig::default()).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(b.dimension(), 25);
        assert_eq!(b.lower()[0], 1.0);
        assert_eq!(b.upper()[0], 2000.0);
        assert!(b.lower()[1..].iter().all(|v| *v == -0.5));
        assert!(b.upper()[1..].iter().all(|v| *v == 0.5));
    }

    #[test]
    fn rejects_inverted_and_mismatched_bounds() {
        assert_eq!(
            Bounds::new(vec![0.0, 2.0], vec![1.0, 1.0]),
            Err(EvalError::InvalidBounds {
                index: 1,
                lower: 2.0,
                upper: 1.0
            })
        );
        assert_eq!(
            Bounds::new(vec![0.0], vec![1.0, 1.0]),
            Err(EvalError::BoundsLength { lower: 1, upper: 2 })
        );
    }

    #[test]
    fn clamp_projects_into_box() {
        let b = Bounds::new(vec![0.0, -1.0], vec![1.0, 1.0]).unwrap_or_else(|e| panic!("{e}"));
        let mut x = vec![5.0, f64::NAN];
        b.clamp(&mut x);
        assert_eq!(x, vec![1.0, -1.0]);
    }

    #[test]
    fn samples_stay_inside() {
        let b = Bounds::for_horizon(24, &SearchConfig::default()).unwrap_or_else(|e| panic!("{e}"));
        let mut rng = crate::random::seeded(0);
        for _ in 0..100 {
            assert!(b.contains(&b.sample(&mut rng)));
        }
    }

    #[test]
    fn nan_objective_is_treated_as_infinite() {
        let bounds = test_support::unit_bounds(1);
        let objective = |_: &[f64]| f64::NAN;
        let problem = SearchProblem {
            objective: &objective,
            bounds: &bounds,
            population: 4,
            max_iterations: 1,
            seed: 0,
        };
        assert_eq!(problem.cost(&[0.0]), f64::INFINITY);
    }
}
