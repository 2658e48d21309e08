//! Integration tests for the optimizer adapter, the trial harness and stats.

mod common;

use microgrid_sizing::config::{SearchConfig, ALGORITHM_NAMES};
use microgrid_sizing::harness::{CancellationToken, TrialHarness};
use microgrid_sizing::optim::{AlgorithmRegistry, OptimizerAdapter};
use microgrid_sizing::sim::DispatchSimulator;
use microgrid_sizing::stats::{mean_convergence, summarize};

#[test]
fn failing_algorithm_is_isolated() {
    let cfg = common::tiny_config();
    let mut registry = AlgorithmRegistry::new();
    registry.register(Box::new(common::AlwaysFails));
    registry.register(Box::new(common::Midpoint));
    let harness = TrialHarness::new(&cfg, &registry).unwrap_or_else(|e| panic!("{e}"));

    let report = harness.run_trials(4);
    assert_eq!(report.completed_trials, 4);

    let failed = report.get("fails").unwrap_or_else(|| panic!("missing algorithm"));
    assert_eq!(failed.costs(), vec![f64::INFINITY; 4]);
    assert!(failed.trials.iter().all(|t| t.history.is_empty() && t.solution.is_none()));

    let ok = report.get("midpoint").unwrap_or_else(|| panic!("missing algorithm"));
    assert!(ok.trials.iter().all(|t| t.cost.is_finite() && t.solution.is_some()));
    // synthesised single-step history
    assert!(ok.trials.iter().all(|t| t.history == vec![t.cost]));

    let stats = summarize(&report);
    assert_eq!(stats[0].success_rate, 0.0);
    assert!(stats[0].mean.is_nan());
    assert_eq!(stats[1].success_rate, 1.0);
}

#[test]
fn trial_cost_comes_from_the_returned_solution() {
    let cfg = common::tiny_config();
    let mut registry = AlgorithmRegistry::new();
    registry.register(Box::new(common::Overclaiming));
    let harness = TrialHarness::new(&cfg, &registry).unwrap_or_else(|e| panic!("{e}"));
    let report = harness.run_trials(2);

    let sim = DispatchSimulator::from_config(&cfg);
    let results = report.get("overclaiming").unwrap_or_else(|| panic!("missing algorithm"));
    for trial in &results.trials {
        let solution = trial.solution.as_ref().unwrap_or_else(|| panic!("no solution"));
        let actual = sim
            .cost(&harness.scenario(trial.trial), &solution.to_vector())
            .unwrap_or(f64::NAN);
        assert!(actual > 0.0);
        assert_eq!(trial.cost, actual);
        assert_eq!(trial.history.last().copied(), Some(actual));
    }
}

#[test]
fn every_reference_algorithm_completes_a_trial() {
    let cfg = common::tiny_config();
    let registry = AlgorithmRegistry::standard(&cfg.search);
    let harness = TrialHarness::new(&cfg, &registry).unwrap_or_else(|e| panic!("{e}"));
    let report = harness.run_trials(1);

    let names: Vec<&str> = report.algorithms.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ALGORITHM_NAMES.to_vec());
    for algorithm in &report.algorithms {
        let trial = &algorithm.trials[0];
        assert!(trial.cost.is_finite(), "{} failed", algorithm.name);
        assert!(!trial.history.is_empty());
        assert_eq!(trial.history.last().copied(), Some(trial.cost));
        assert!(trial.history.windows(2).all(|w| w[1] <= w[0]));
        assert!(mean_convergence(algorithm).is_some());
    }
}

#[test]
fn harness_is_reproducible() {
    let cfg = common::tiny_config();
    let registry = AlgorithmRegistry::from_names(&["GWO", "HS"], &cfg.search)
        .unwrap_or_else(|e| panic!("{e}"));
    let run = || {
        TrialHarness::new(&cfg, &registry)
            .map(|h| h.run_trials(2))
            .unwrap_or_else(|e| panic!("{e}"))
    };
    assert_eq!(run(), run());
}

#[test]
fn cancellation_keeps_only_completed_trials() {
    let cfg = common::tiny_config();
    let mut registry = AlgorithmRegistry::new();
    registry.register(Box::new(common::Midpoint));
    let token = CancellationToken::new();
    let harness = TrialHarness::new(&cfg, &registry)
        .unwrap_or_else(|e| panic!("{e}"))
        .with_cancellation(token.clone());

    let first = harness.run_trials(2);
    assert_eq!(first.completed_trials, 2);

    token.cancel();
    let second = harness.run_trials(2);
    assert_eq!(second.completed_trials, 0);
    assert!(second.cancelled);
    assert!(summarize(&second)[0].mean.is_nan());
}

#[test]
fn adapter_output_is_reportable_solution() {
    let search = SearchConfig {
        population: 8,
        max_iterations: 3,
        ..SearchConfig::default()
    };
    let adapter = OptimizerAdapter::from_config(common::HOURS, &search)
        .unwrap_or_else(|e| panic!("{e}"));
    let scenario = common::flat_scenario(40.0, 80.0, 0.2);
    let sim = DispatchSimulator::default();
    let objective = |x: &[f64]| sim.cost(&scenario, x).unwrap_or(f64::INFINITY);

    let registry = AlgorithmRegistry::standard(&search);
    let ga = registry.get("GA").unwrap_or_else(|| panic!("GA registered"));
    let out = adapter.run(ga, &objective, 17).unwrap_or_else(|e| panic!("{e}"));

    assert!(!out.history.is_empty());
    assert_eq!(out.best_solution.hours(), common::HOURS);
    assert!(adapter.bounds().contains(&out.best_solution.to_vector()));
    let recomputed = sim
        .cost(&scenario, &out.best_solution.to_vector())
        .unwrap_or(f64::NAN);
    assert_eq!(recomputed, out.best_cost);
}
