//! Multi-trial comparison of search strategies with per-run fault isolation.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, SizingConfig};
use crate::optim::{AlgorithmRegistry, Objective, OptimizerAdapter, SearchStrategy};
use crate::random::algorithm_seed;
use crate::scenario::{Scenario, ScenarioGenerator};
use crate::sim::{DispatchSimulator, Solution};

/// Outcome of one algorithm on one trial scenario.
///
/// A failed run has `cost == +inf`, an empty history and no solution.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    pub trial: usize,
    pub algorithm: String,
    pub cost: f64,
    pub history: Vec<f64>,
    pub solution: Option<Solution>,
}

impl TrialResult {
    fn failed(trial: usize, algorithm: &str) -> Self {
        Self {
            trial,
            algorithm: algorithm.to_string(),
            cost: f64::INFINITY,
            history: Vec::new(),
            solution: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.cost.is_finite()
    }
}

/// Every trial of one algorithm, in trial order.
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmResults {
    pub name: String,
    pub trials: Vec<TrialResult>,
}

impl AlgorithmResults {
    pub fn costs(&self) -> Vec<f64> {
        self.trials.iter().map(|t| t.cost).collect()
    }

    /// Lowest-cost successful trial.
    pub fn best(&self) -> Option<&TrialResult> {
        self.trials
            .iter()
            .filter(|t| t.is_success())
            .min_by(|a, b| a.cost.total_cmp(&b.cost))
    }
}

/// Aggregated harness output.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialReport {
    /// One entry per registered algorithm, in registry order.
    pub algorithms: Vec<AlgorithmResults>,
    pub completed_trials: usize,
    /// Whether cancellation stopped the run before all trials started.
    pub cancelled: bool,
}

impl TrialReport {
    pub fn get(&self, name: &str) -> Option<&AlgorithmResults> {
        self.algorithms.iter().find(|a| a.name == name)
    }
}

/// Shared flag that stops the harness from launching further trials.
///
/// Trials already running finish normally.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Algorithm swept by the sensitivity study when it is registered.
pub const DEFAULT_SENSITIVITY_ALGORITHM: &str = "GWWOA";

/// Population sizes swept by the sensitivity study.
pub const SENSITIVITY_POPULATIONS: [usize; 4] = [20, 30, 50, 70];

/// Final cost of one algorithm for one population size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensitivityPoint {
    pub population: usize,
    pub cost: f64,
}

/// Runs every registered algorithm against a fresh scenario per trial.
pub struct TrialHarness<'r> {
    generator: ScenarioGenerator,
    simulator: DispatchSimulator,
    adapter: OptimizerAdapter,
    registry: &'r AlgorithmRegistry,
    threads: usize,
    cancellation: CancellationToken,
}

impl<'r> TrialHarness<'r> {
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] reported by
    /// [`SizingConfig::validate`]; nothing runs on an invalid configuration.
    pub fn new(config: &SizingConfig, registry: &'r AlgorithmRegistry) -> Result<Self, ConfigError> {
        if let Some(err) = config.validate().into_iter().next() {
            return Err(err);
        }
        let adapter = OptimizerAdapter::from_config(config.horizon.hours, &config.search)
            .map_err(|e| ConfigError::new("search", e.to_string()))?;
        Ok(Self {
            generator: ScenarioGenerator::from_config(config),
            simulator: DispatchSimulator::from_config(config),
            adapter,
            registry,
            threads: config.harness.threads,
            cancellation: CancellationToken::new(),
        })
    }

    /// Uses an externally owned cancellation flag.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn scenario(&self, trial: usize) -> Scenario {
        self.generator.generate(trial as u64)
    }

    /// Runs trials `0..n`, sequentially for `threads == 1` and on a rayon
    /// pool otherwise. Statistics only ever include trials that ran to
    /// completion.
    pub fn run_trials(&self, n: usize) -> TrialReport {
        info!(
            trials = n,
            algorithms = self.registry.len(),
            names = ?self.registry.names(),
            threads = self.threads,
            "starting trial harness"
        );

        let per_trial: Vec<Option<Vec<TrialResult>>> = if self.threads == 1 {
            (0..n).map(|t| self.run_trial_unless_cancelled(t)).collect()
        } else {
            match ThreadPoolBuilder::new().num_threads(self.threads).build() {
                Ok(pool) => pool.install(|| {
                    (0..n)
                        .into_par_iter()
                        .map(|t| self.run_trial_unless_cancelled(t))
                        .collect()
                }),
                Err(e) => {
                    warn!(error = %e, "could not build thread pool, running sequentially");
                    (0..n).map(|t| self.run_trial_unless_cancelled(t)).collect()
                }
            }
        };

        let mut algorithms: Vec<AlgorithmResults> = self
            .registry
            .names()
            .into_iter()
            .map(|name| AlgorithmResults {
                name: name.to_string(),
                trials: Vec::new(),
            })
            .collect();
        let mut completed_trials = 0;
        for results in per_trial.into_iter().flatten() {
            completed_trials += 1;
            for (slot, result) in results.into_iter().enumerate() {
                algorithms[slot].trials.push(result);
            }
        }

        let cancelled = completed_trials < n;
        if cancelled {
            info!(completed_trials, requested = n, "trial harness cancelled");
        }
        TrialReport {
            algorithms,
            completed_trials,
            cancelled,
        }
    }

    fn run_trial_unless_cancelled(&self, trial: usize) -> Option<Vec<TrialResult>> {
        if self.cancellation.is_cancelled() {
            return None;
        }
        Some(self.run_trial(trial))
    }

    /// One trial: a single scenario seeded by `trial`, shared by every
    /// registered algorithm. Results come back in registry order.
    pub fn run_trial(&self, trial: usize) -> Vec<TrialResult> {
        let scenario = self.scenario(trial);
        let objective = |x: &[f64]| self.simulator.cost(&scenario, x).unwrap_or(f64::INFINITY);
        let results: Vec<TrialResult> = self
            .registry
            .iter()
            .enumerate()
            .map(|(slot, strategy)| {
                self.run_algorithm(&self.adapter, strategy, &objective, trial, slot)
            })
            .collect();
        let successes = results.iter().filter(|r| r.is_success()).count();
        info!(trial, successes, total = results.len(), "trial complete");
        results
    }

    /// Runs one strategy with every failure mode mapped to an infinite cost.
    fn run_algorithm(
        &self,
        adapter: &OptimizerAdapter,
        strategy: &dyn SearchStrategy,
        objective: &Objective<'_>,
        trial: usize,
        slot: usize,
    ) -> TrialResult {
        let name = strategy.name();
        let seed = algorithm_seed(trial, slot);
        let run = panic::catch_unwind(AssertUnwindSafe(|| adapter.run(strategy, objective, seed)));
        match run {
            Ok(Ok(output)) => {
                debug!(trial, algorithm = name, cost = output.best_cost, "algorithm finished");
                TrialResult {
                    trial,
                    algorithm: name.to_string(),
                    cost: output.best_cost,
                    history: output.history,
                    solution: Some(output.best_solution),
                }
            }
            Ok(Err(e)) => {
                warn!(trial, algorithm = name, error = %e, "algorithm failed");
                TrialResult::failed(trial, name)
            }
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                warn!(trial, algorithm = name, reason = %reason, "algorithm panicked");
                TrialResult::failed(trial, name)
            }
        }
    }

    /// [`DEFAULT_SENSITIVITY_ALGORITHM`] if registered, else the first
    /// registered algorithm.
    pub fn default_sensitivity_algorithm(&self) -> Option<&str> {
        self.registry
            .get(DEFAULT_SENSITIVITY_ALGORITHM)
            .or_else(|| self.registry.iter().next())
            .map(|s| s.name())
    }

    /// Runs `algorithm` on the scenario of `trial` once per population size.
    ///
    /// Failed runs are reported with an infinite cost.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `algorithm` is not registered.
    pub fn population_sensitivity(
        &self,
        algorithm: &str,
        populations: &[usize],
        trial: usize,
    ) -> Result<Vec<SensitivityPoint>, ConfigError> {
        let (slot, strategy) = self
            .registry
            .iter()
            .enumerate()
            .find(|(_, s)| s.name() == algorithm)
            .ok_or_else(|| {
                ConfigError::new("algorithm", format!("\"{algorithm}\" is not registered"))
            })?;
        let scenario = self.scenario(trial);
        let objective = |x: &[f64]| self.simulator.cost(&scenario, x).unwrap_or(f64::INFINITY);

        Ok(populations
            .iter()
            .map(|&population| {
                let adapter = self.adapter.with_population(population);
                let result = self.run_algorithm(&adapter, strategy, &objective, trial, slot);
                info!(algorithm, population, cost = result.cost, "population sensitivity");
                SensitivityPoint {
                    population,
                    cost: result.cost,
                }
            })
            .collect())
    }
}
