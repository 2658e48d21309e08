//! Core dispatch types: candidate solutions, hourly records and cost breakdowns.

use std::fmt;

use serde::Serialize;

use crate::error::EvalError;

/// A candidate battery size plus hourly dispatch schedule.
///
/// The flat optimizer vector is `[capacity_kwh, u_0, .., u_{H-1}]` where
/// `u_t` is the fraction of effective capacity discharged in hour `t`
/// (negative values charge).
///
/// # Examples
///
/// ```
/// use microgrid_sizing::sim::types::Solution;
///
/// let s = Solution::from_vector(&[100.0, 0.1, -0.2], 2).unwrap();
/// assert_eq!(s.capacity_kwh, 100.0);
/// assert_eq!(s.to_vector(), vec![100.0, 0.1, -0.2]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    /// Installed capacity S (kWh).
    pub capacity_kwh: f64,
    /// Dispatch fractions, one per hour.
    pub dispatch: Vec<f64>,
}

impl Solution {
    pub fn new(capacity_kwh: f64, dispatch: Vec<f64>) -> Self {
        Self {
            capacity_kwh,
            dispatch,
        }
    }

    /// Splits a flat optimizer vector into capacity and dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::DimensionMismatch`] unless `vector.len() == hours + 1`.
    pub fn from_vector(vector: &[f64], hours: usize) -> Result<Self, EvalError> {
        check_dimension(vector, hours)?;
        Ok(Self {
            capacity_kwh: vector[0],
            dispatch: vector[1..].to_vec(),
        })
    }

    /// Flattens back into `[capacity, u_0, ..]`.
    pub fn to_vector(&self) -> Vec<f64> {
        let mut v = Vec::with_capacity(self.dispatch.len() + 1);
        v.push(self.capacity_kwh);
        v.extend_from_slice(&self.dispatch);
        v
    }

    pub fn hours(&self) -> usize {
        self.dispatch.len()
    }
}

/// Checks that a flat solution vector matches the horizon.
pub(crate) fn check_dimension(vector: &[f64], hours: usize) -> Result<(), EvalError> {
    if vector.len() != hours + 1 {
        return Err(EvalError::DimensionMismatch {
            expected: hours + 1,
            actual: vector.len(),
        });
    }
    Ok(())
}

/// Additive components of the total dispatch cost.
///
/// Every field is a sum over the horizon (or a one-off term). `total()` is
/// the fitness value reported to optimizers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CostBreakdown {
    /// Up-front capacity cost.
    pub capital: f64,
    /// Emergency shortfall surcharge.
    pub emergency: f64,
    /// Penalty for importing while the grid is down.
    pub grid_outage: f64,
    /// Energy purchased from the grid.
    pub grid_energy: f64,
    /// Battery wear.
    pub degradation: f64,
    /// Carbon cost of net grid exchange (negative while exporting).
    pub carbon: f64,
    /// Over-temperature penalty.
    pub thermal: f64,
    /// Trailing-SOC stability penalty.
    pub soc_stability: f64,
    /// Supply/demand efficiency shortfall.
    pub efficiency: f64,
    /// Periodic capacity regulariser.
    pub regularizer: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.capital
            + self.emergency
            + self.grid_outage
            + self.grid_energy
            + self.degradation
            + self.carbon
            + self.thermal
            + self.soc_stability
            + self.efficiency
            + self.regularizer
    }
}

impl fmt::Display for CostBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "capital        {:>14.2}", self.capital)?;
        writeln!(f, "emergency      {:>14.2}", self.emergency)?;
        writeln!(f, "grid outage    {:>14.2}", self.grid_outage)?;
        writeln!(f, "grid energy    {:>14.2}", self.grid_energy)?;
        writeln!(f, "degradation    {:>14.2}", self.degradation)?;
        writeln!(f, "carbon         {:>14.2}", self.carbon)?;
        writeln!(f, "thermal        {:>14.2}", self.thermal)?;
        writeln!(f, "soc stability  {:>14.2}", self.soc_stability)?;
        writeln!(f, "efficiency     {:>14.2}", self.efficiency)?;
        writeln!(f, "regularizer    {:>14.2}", self.regularizer)?;
        write!(f, "total          {:>14.2}", self.total())
    }
}

/// Complete record of one simulated hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourRecord {
    /// Hour index.
    pub hour: usize,
    /// Capacity after within-horizon fade (kWh).
    pub effective_capacity_kwh: f64,
    /// Renewable generation (kW).
    pub generation_kw: f64,
    /// Demand (kW).
    pub demand_kw: f64,
    /// Battery power (kW; positive = discharge, negative = charge).
    pub battery_kw: f64,
    /// Grid exchange (kW; positive = import, negative = export).
    pub grid_kw: f64,
    /// Cell temperature after this hour (°C).
    pub temperature_c: f64,
    /// SOC after this hour.
    pub soc: f64,
    /// Cost accrued during this hour.
    pub cost: f64,
}

/// Result of one dispatch evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Scalar fitness (sum of the breakdown).
    pub total_cost: f64,
    /// SOC at the end of every hour.
    pub soc_trace: Vec<f64>,
    /// Per-component cost split.
    pub breakdown: CostBreakdown,
    /// Per-hour dispatch detail.
    pub hours: Vec<HourRecord>,
    /// Supply/demand efficiency, `None` when total demand is zero.
    pub efficiency: Option<f64>,
}
