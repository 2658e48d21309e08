//! Post-hoc statistics over trial results.

use std::fmt;

use statrs::statistics::Statistics;

use crate::harness::{AlgorithmResults, TrialReport};

/// Cost statistics for one algorithm.
///
/// Computed only over finite costs. With no successful trial every
/// statistic is NaN and `success_rate` is 0.
#[derive(Debug, Clone)]
pub struct AlgorithmStats {
    pub name: String,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// Finite trials divided by all trials.
    pub success_rate: f64,
    pub trials: usize,
}

impl AlgorithmStats {
    pub fn from_results(results: &AlgorithmResults) -> Self {
        let trials = results.trials.len();
        let finite: Vec<f64> = results
            .trials
            .iter()
            .map(|t| t.cost)
            .filter(|c| c.is_finite())
            .collect();

        if finite.is_empty() {
            return Self {
                name: results.name.clone(),
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
                success_rate: 0.0,
                trials,
            };
        }

        Self {
            name: results.name.clone(),
            mean: finite.iter().mean(),
            std: finite.iter().population_std_dev(),
            min: Statistics::min(finite.iter()),
            max: Statistics::max(finite.iter()),
            success_rate: finite.len() as f64 / trials as f64,
            trials,
        }
    }
}

/// Stats for every algorithm in a report, in report order.
pub fn summarize(report: &TrialReport) -> Vec<AlgorithmStats> {
    report.algorithms.iter().map(AlgorithmStats::from_results).collect()
}

/// Element-wise mean and spread of best-so-far curves.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceCurve {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

/// Averages the histories of the successful trials.
///
/// Shorter histories are padded with their last value up to the longest
/// one. Returns `None` when no trial succeeded.
pub fn mean_convergence(results: &AlgorithmResults) -> Option<ConvergenceCurve> {
    let histories: Vec<&[f64]> = results
        .trials
        .iter()
        .filter(|t| t.is_success() && !t.history.is_empty())
        .map(|t| t.history.as_slice())
        .collect();
    let len = histories.iter().map(|h| h.len()).max()?;

    let (mean, std) = (0..len)
        .map(|i| {
            let column: Vec<f64> = histories
                .iter()
                .filter_map(|h| h.get(i).or(h.last()).copied())
                .collect();
            (column.iter().mean(), column.iter().population_std_dev())
        })
        .unzip();
    Some(ConvergenceCurve { mean, std })
}

/// Fixed-width summary table.
pub struct SummaryTable<'a>(pub &'a [AlgorithmStats]);

impl fmt::Display for SummaryTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Algorithm Summary ---")?;
        writeln!(
            f,
            "{:<8} {:>14} {:>12} {:>14} {:>14} {:>8}",
            "Algo", "Mean", "Std", "Min", "Max", "Success"
        )?;
        for s in self.0 {
            writeln!(
                f,
                "{:<8} {:>14.2} {:>12.2} {:>14.2} {:>14.2} {:>7.1}%",
                s.name,
                s.mean,
                s.std,
                s.min,
                s.max,
                100.0 * s.success_rate
            )?;
        }
        Ok(())
    }
}
