//! Per-evaluation state carried from one hour to the next.

use super::types::{CostBreakdown, HourRecord};

/// Transient state of one `evaluate()` call.
///
/// Created fresh at the start of every evaluation and threaded through the
/// hourly fold by value, so no two evaluations (or threads) ever share it.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Current state of charge.
    pub soc: f64,
    /// Current cell temperature (°C).
    pub temperature_c: f64,
    /// SOC after each processed hour, oldest first.
    pub soc_history: Vec<f64>,
    /// Cost accumulated so far, by component.
    pub cost: CostBreakdown,
    /// Detail of each processed hour.
    pub records: Vec<HourRecord>,
}

impl SimulationState {
    /// Starting state for a horizon of `hours`.
    pub fn initial(soc: f64, temperature_c: f64, capital_cost: f64, hours: usize) -> Self {
        Self {
            soc,
            temperature_c,
            soc_history: Vec::with_capacity(hours),
            cost: CostBreakdown {
                capital: capital_cost,
                ..CostBreakdown::default()
            },
            records: Vec::with_capacity(hours),
        }
    }

    /// Mean of the last `window` SOC values, or `None` if fewer were recorded.
    pub fn trailing_mean(&self, window: usize) -> Option<f64> {
        let n = self.soc_history.len();
        if window == 0 || n < window {
            return None;
        }
        let tail = &self.soc_history[n - window..];
        Some(tail.iter().sum::<f64>() / window as f64)
    }

    /// Running total cost.
    pub fn running_cost(&self) -> f64 {
        self.cost.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_carries_capital_cost() {
        let s = SimulationState::initial(0.5, 25.0, 5_000.0, 24);
        assert_eq!(s.running_cost(), 5_000.0);
        assert!(s.soc_history.is_empty());
    }

    #[test]
    fn trailing_mean_needs_full_window() {
        let mut s = SimulationState::initial(0.5, 25.0, 0.0, 24);
        s.soc_history.extend([0.5, 0.6]);
        assert_eq!(s.trailing_mean(3), None);
        s.soc_history.push(0.7);
        let mean = s.trailing_mean(3).unwrap_or(f64::NAN);
        assert!((mean - 0.6).abs() < 1e-12);
        s.soc_history.push(0.1);
        let mean = s.trailing_mean(3).unwrap_or(f64::NAN);
        assert!((mean - (0.6 + 0.7 + 0.1) / 3.0).abs() < 1e-12);
    }
}
