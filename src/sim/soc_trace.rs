//! Simplified state-of-charge path for reporting.
//!
//! Unlike the evaluator this model ignores capacity fade and every penalty,
//! so its trace drifts from [`Evaluation::soc_trace`](super::types::Evaluation)
//! on long horizons. It only exists to plot or print a schedule.

use crate::config::BatteryConfig;
use crate::error::EvalError;

use super::types::Solution;

/// Decay-free SOC model with fixed efficiencies.
#[derive(Debug, Clone)]
pub struct SocTraceCalculator {
    pub initial_soc: f64,
    pub eta_charge: f64,
    pub eta_discharge: f64,
    pub soc_min: f64,
    pub soc_max: f64,
}

impl Default for SocTraceCalculator {
    fn default() -> Self {
        Self {
            initial_soc: 0.5,
            eta_charge: 0.95,
            eta_discharge: 0.95,
            soc_min: 0.1,
            soc_max: 0.9,
        }
    }
}

impl SocTraceCalculator {
    /// Uses the efficiencies and SOC limits of a configured battery.
    pub fn from_battery(battery: &BatteryConfig) -> Self {
        Self {
            initial_soc: battery.initial_soc,
            eta_charge: battery.eta_charge,
            eta_discharge: battery.eta_discharge,
            soc_min: battery.soc_min,
            soc_max: battery.soc_max,
        }
    }

    /// Derives the SOC at the start of each of `hours` hours.
    ///
    /// `trace[0]` is the initial SOC; hour `t >= 1` applies the dispatch
    /// `u[t]` of the same index, so `u[0]` never affects the trace.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::NonPositiveCapacity`] for `S <= 0` and
    /// [`EvalError::DimensionMismatch`] if the schedule is shorter than `hours`.
    pub fn trace(&self, solution: &Solution, hours: usize) -> Result<Vec<f64>, EvalError> {
        let capacity = solution.capacity_kwh;
        if !(capacity > 0.0) {
            return Err(EvalError::NonPositiveCapacity(capacity));
        }
        if solution.dispatch.len() < hours {
            return Err(EvalError::DimensionMismatch {
                expected: hours + 1,
                actual: solution.dispatch.len() + 1,
            });
        }
        if hours == 0 {
            return Ok(Vec::new());
        }

        let mut soc = Vec::with_capacity(hours);
        soc.push(self.initial_soc);
        for t in 1..hours {
            let battery_kw = solution.dispatch[t] * capacity;
            let delta = if battery_kw < 0.0 {
                -battery_kw * self.eta_charge / capacity
            } else {
                -battery_kw / (self.eta_discharge * capacity)
            };
            let next = (soc[t - 1] + delta).clamp(self.soc_min, self.soc_max);
            soc.push(next);
        }
        Ok(soc)
    }
}
