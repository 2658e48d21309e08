//! Microgrid sizing entry point: CLI wiring, config loading and the trial run.

mod cli;

use std::process;

use tracing::info;

use microgrid_sizing::config::SizingConfig;
use microgrid_sizing::harness::{SENSITIVITY_POPULATIONS, TrialHarness, TrialReport};
use microgrid_sizing::io::export::{export_dispatch_csv, export_trials_csv};
use microgrid_sizing::optim::AlgorithmRegistry;
use microgrid_sizing::sim::{DispatchSimulator, SocTraceCalculator};
use microgrid_sizing::stats::{mean_convergence, summarize, SummaryTable};
use microgrid_sizing::telemetry::init_tracing;

fn load_config(opts: &cli::CliOptions) -> SizingConfig {
    let loaded = if let Some(ref path) = opts.config {
        SizingConfig::from_toml_file(path)
    } else {
        SizingConfig::from_preset(opts.preset.as_deref().unwrap_or("baseline"))
    };
    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(trials) = opts.trials {
        config.harness.trials = trials;
    }
    if let Some(threads) = opts.threads {
        config.harness.threads = threads;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    config
}

/// Prints the SOC path and the hourly breakdown of the overall best solution.
fn report_best(
    config: &SizingConfig,
    harness: &TrialHarness<'_>,
    report: &TrialReport,
    opts: &cli::CliOptions,
) {
    let best = report
        .algorithms
        .iter()
        .filter_map(|a| a.best())
        .min_by(|a, b| a.cost.total_cmp(&b.cost));
    let Some(best) = best else {
        println!("\nNo algorithm produced a finite cost.");
        return;
    };
    let Some(solution) = best.solution.as_ref() else {
        return;
    };

    println!(
        "\nBest: {} on trial {} (cost {:.2}, capacity {:.1} kWh)",
        best.algorithm, best.trial, best.cost, solution.capacity_kwh
    );
    let simulator = DispatchSimulator::from_config(config);
    let tracer = SocTraceCalculator::from_battery(simulator.battery());
    match tracer.trace(solution, config.horizon.hours) {
        Ok(trace) => {
            let line: Vec<String> = trace.iter().map(|s| format!("{s:.2}")).collect();
            println!("SOC trace: {}", line.join(" "));
        }
        Err(e) => eprintln!("error: could not trace best solution: {e}"),
    }

    let scenario = harness.scenario(best.trial);
    let evaluation = match simulator.evaluate(&scenario, &solution.to_vector()) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("error: could not re-evaluate best solution: {e}");
            return;
        }
    };
    println!("{}", evaluation.breakdown);

    if let Some(ref path) = opts.dispatch_out {
        if let Err(e) = export_dispatch_csv(&evaluation.hours, path) {
            eprintln!("error: failed to write dispatch CSV: {e}");
            process::exit(1);
        }
        eprintln!("Dispatch written to {}", path.display());
    }
}

fn main() {
    let opts = cli::parse_args().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        cli::print_usage();
        process::exit(1);
    });
    init_tracing();

    let config = load_config(&opts);
    let registry = AlgorithmRegistry::from_names(&config.harness.algorithms, &config.search)
        .unwrap_or_else(|e| {
            eprintln!("{e}");
            process::exit(1);
        });
    let harness = TrialHarness::new(&config, &registry).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    let report = harness.run_trials(config.harness.trials);
    info!(completed = report.completed_trials, "trials finished");

    let stats = summarize(&report);
    println!("{}", SummaryTable(&stats));

    for algorithm in &report.algorithms {
        if let Some(curve) = mean_convergence(algorithm) {
            let last = curve.mean.last().copied().unwrap_or(f64::NAN);
            println!(
                "{:<8} mean convergence: {} steps, final {:.2}",
                algorithm.name,
                curve.mean.len(),
                last
            );
        }
    }

    report_best(&config, &harness, &report, &opts);

    if opts.sensitivity {
        let algorithm = opts
            .sensitivity_algorithm
            .as_deref()
            .or_else(|| harness.default_sensitivity_algorithm());
        match algorithm {
            Some(name) => match harness.population_sensitivity(name, &SENSITIVITY_POPULATIONS, 0) {
                Ok(points) => {
                    println!("\nPopulation sensitivity ({name}, trial 0):");
                    for p in points {
                        println!("  {:>4}  {:.2}", p.population, p.cost);
                    }
                }
                Err(e) => eprintln!("{e}"),
            },
            None => eprintln!("no algorithm registered for the sensitivity sweep"),
        }
    }

    if let Some(ref path) = opts.results_out {
        if let Err(e) = export_trials_csv(&report, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Results written to {}", path.display());
    }
}
