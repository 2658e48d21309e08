//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use microgrid_sizing::config::SizingConfig;
use microgrid_sizing::error::SearchError;
use microgrid_sizing::optim::{NativeOutcome, SearchProblem, SearchStrategy};
use microgrid_sizing::scenario::{HourlySeries, Scenario};

/// Horizon used by every fixture.
pub const HOURS: usize = 24;

/// Fault-free 24-hour scenario with constant generation, demand and price.
pub fn flat_scenario(generation_kw: f64, demand_kw: f64, price: f64) -> Scenario {
    Scenario::new(HourlySeries::constant(HOURS, generation_kw, demand_kw, price))
        .unwrap_or_else(|e| panic!("fixture scenario is valid: {e}"))
}

/// Flat solution vector: `capacity` followed by `u` for every hour.
pub fn flat_solution(capacity: f64, u: f64) -> Vec<f64> {
    let mut v = vec![u; HOURS + 1];
    v[0] = capacity;
    v
}

/// Cost of an idle 100 kWh battery under a flat 80 kW load at 0.2/kWh with
/// no generation.
pub fn idle_closed_form() -> f64 {
    500.0 * 100.0
        + 24.0 * 80.0 * 0.2
        + 24.0 * 80.0 * 0.487 * 2.0
        + 100.0 * 1.0_f64.sin().abs()
        + 0.85 * 1e4
}

/// Tiny search budget so harness tests stay fast.
pub fn tiny_config() -> SizingConfig {
    let mut cfg = SizingConfig::quick();
    cfg.search.population = 6;
    cfg.search.max_iterations = 4;
    cfg.harness.trials = 3;
    cfg
}

/// Strategy that always reports an algorithm failure.
pub struct AlwaysFails;

impl SearchStrategy for AlwaysFails {
    fn name(&self) -> &str {
        "fails"
    }

    fn search(
        &self,
        _problem: &SearchProblem<'_>,
        _observer: &mut dyn FnMut(f64),
    ) -> Result<NativeOutcome, SearchError> {
        Err(SearchError::AlgorithmFailure {
            algorithm: self.name().to_string(),
            reason: "solver diverged".to_string(),
        })
    }
}

/// Strategy that returns the box midpoint without any history.
pub struct Midpoint;

impl SearchStrategy for Midpoint {
    fn name(&self) -> &str {
        "midpoint"
    }

    fn search(
        &self,
        problem: &SearchProblem<'_>,
        _observer: &mut dyn FnMut(f64),
    ) -> Result<NativeOutcome, SearchError> {
        let best: Vec<f64> = problem
            .bounds
            .lower()
            .iter()
            .zip(problem.bounds.upper())
            .map(|(lo, hi)| 0.5 * (lo + hi))
            .collect();
        let best_cost = problem.cost(&best);
        Ok(NativeOutcome {
            best,
            best_cost,
            history: Vec::new(),
        })
    }
}

/// Returns the box midpoint but claims a zero cost and a zero history.
pub struct Overclaiming;

impl SearchStrategy for Overclaiming {
    fn name(&self) -> &str {
        "overclaiming"
    }

    fn search(
        &self,
        problem: &SearchProblem<'_>,
        observer: &mut dyn FnMut(f64),
    ) -> Result<NativeOutcome, SearchError> {
        let outcome = Midpoint.search(problem, observer)?;
        Ok(NativeOutcome {
            best_cost: 0.0,
            history: vec![1.0, 0.0],
            ..outcome
        })
    }
}
