//! Dispatch cost evaluator: the fitness function shared by every optimizer.

use crate::config::{BatteryConfig, PenaltyConfig, SizingConfig};
use crate::error::EvalError;
use crate::scenario::Scenario;

use super::state::SimulationState;
use super::types::{Evaluation, HourRecord, check_dimension};

/// Pure evaluator of `(scenario, solution) -> cost`.
///
/// Holds only immutable parameters; every call builds its own
/// [`SimulationState`], so a single simulator can be shared across threads
/// and evaluations are bit-for-bit reproducible.
///
/// Out-of-bound solutions are evaluated as given. Keeping capacity and
/// dispatch inside the box constraints is the caller's job.
#[derive(Debug, Clone, Default)]
pub struct DispatchSimulator {
    battery: BatteryConfig,
    penalties: PenaltyConfig,
}

impl DispatchSimulator {
    pub fn new(battery: BatteryConfig, penalties: PenaltyConfig) -> Self {
        Self { battery, penalties }
    }

    pub fn from_config(config: &SizingConfig) -> Self {
        Self::new(config.battery.clone(), config.penalties.clone())
    }

    pub fn battery(&self) -> &BatteryConfig {
        &self.battery
    }

    /// Fraction of nominal capacity usable in hour `t`.
    pub fn capacity_factor(&self, t: usize) -> f64 {
        1.0 - self.battery.fade_per_hour * t as f64
    }

    /// Total cost of `solution` under `scenario`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::DimensionMismatch`] unless the solution has one
    /// capacity entry plus one dispatch entry per scenario hour.
    pub fn cost(&self, scenario: &Scenario, solution: &[f64]) -> Result<f64, EvalError> {
        self.evaluate(scenario, solution).map(|e| e.total_cost)
    }

    /// Simulates the full horizon and returns cost, SOC trace and detail.
    ///
    /// # Arguments
    ///
    /// * `scenario` - Hourly generation, demand, price and fault flags
    /// * `solution` - `[capacity_kwh, u_0, .., u_{H-1}]`
    ///
    /// # Returns
    ///
    /// An [`Evaluation`] whose `total_cost` is the sum of capital, hourly
    /// operating and penalty terms, the efficiency shortfall penalty and the
    /// periodic capacity regulariser.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::DimensionMismatch`] if `solution.len() != hours + 1`.
    pub fn evaluate(&self, scenario: &Scenario, solution: &[f64]) -> Result<Evaluation, EvalError> {
        let hours = scenario.hours();
        check_dimension(solution, hours)?;

        let capacity = solution[0];
        let dispatch = &solution[1..];
        let bat = &self.battery;
        let pen = &self.penalties;

        let initial = SimulationState::initial(
            bat.initial_soc,
            bat.initial_temp_c,
            bat.capital_cost_per_kwh * capacity,
            hours,
        );
        let mut state = (0..hours).fold(initial, |state, t| {
            self.step(state, scenario, capacity, dispatch[t], t)
        });

        let total_demand = scenario.total_demand_kwh();
        let efficiency = if total_demand > 0.0 {
            let delivered: f64 = dispatch.iter().map(|u| u * capacity).sum();
            Some((scenario.total_generation_kwh() + delivered) / total_demand)
        } else {
            None
        };
        if let Some(eff) = efficiency {
            if eff < pen.efficiency_target {
                state.cost.efficiency = (pen.efficiency_target - eff) * pen.efficiency_penalty;
            }
        }

        state.cost.regularizer =
            pen.regularizer_amplitude * (pen.regularizer_frequency * capacity).sin().abs();

        Ok(Evaluation {
            total_cost: state.cost.total(),
            soc_trace: state.soc_history,
            breakdown: state.cost,
            hours: state.records,
            efficiency,
        })
    }

    /// Advances the state by one hour.
    fn step(
        &self,
        mut state: SimulationState,
        scenario: &Scenario,
        capacity: f64,
        u: f64,
        t: usize,
    ) -> SimulationState {
        let bat = &self.battery;
        let pen = &self.penalties;
        let cost_before = state.running_cost();

        let effective_capacity = capacity * self.capacity_factor(t);
        let battery_kw = u * effective_capacity;
        let generation_kw = scenario.generation_kw(t);
        let demand_kw = scenario.demand_kw()[t];
        let grid_kw = demand_kw - generation_kw - battery_kw;

        if scenario.emergency()[t] {
            let required = demand_kw * pen.emergency_demand_factor;
            let shortfall = (required - (generation_kw + battery_kw)).max(0.0);
            state.cost.emergency += shortfall * pen.emergency_shortfall_cost;
        }

        if !scenario.grid_available()[t] && grid_kw > 0.0 {
            state.cost.grid_outage += pen.grid_outage_penalty;
        }

        if grid_kw > 0.0 {
            state.cost.grid_energy += grid_kw * scenario.price()[t];
        }
        state.cost.degradation += bat.degradation_coeff
            * battery_kw.abs().powf(bat.degradation_exponent)
            * (1.0 + state.soc / bat.degradation_soc_ref);
        // Applied to exports too, where it is negative.
        state.cost.carbon += grid_kw * pen.carbon_intensity * pen.carbon_price;

        // Heat only accumulates; there is no cooling term.
        state.temperature_c += (battery_kw / effective_capacity).abs() / bat.heating_c_rate;
        if state.temperature_c > bat.thermal_limit_c {
            let excess = state.temperature_c - bat.thermal_limit_c;
            state.cost.thermal += excess * excess * bat.thermal_penalty;
        }

        let delta = if battery_kw < 0.0 {
            -battery_kw * bat.eta_charge / effective_capacity
        } else {
            -battery_kw / (bat.eta_discharge * effective_capacity)
        };
        state.soc = (state.soc + delta).clamp(bat.soc_min, bat.soc_max);
        state.soc_history.push(state.soc);

        if t >= pen.soc_window {
            if let Some(avg) = state.trailing_mean(pen.soc_window) {
                if (state.soc - avg).abs() > pen.soc_deviation_limit {
                    state.cost.soc_stability += pen.soc_stability_penalty;
                }
            }
        }

        let cost = state.running_cost() - cost_before;
        state.records.push(HourRecord {
            hour: t,
            effective_capacity_kwh: effective_capacity,
            generation_kw,
            demand_kw,
            battery_kw,
            grid_kw,
            temperature_c: state.temperature_c,
            soc: state.soc,
            cost,
        });
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::HourlySeries;

    fn flat_scenario(generation: f64, demand: f64, price: f64) -> Scenario {
        Scenario::new(HourlySeries::constant(24, generation, demand, price))
            .unwrap_or_else(|e| panic!("fixture scenario is valid: {e}"))
    }

    fn idle(capacity: f64) -> Vec<f64> {
        let mut v = vec![0.0; 25];
        v[0] = capacity;
        v
    }

    #[test]
    fn rejects_wrong_dimension() {
        let sim = DispatchSimulator::default();
        let err = sim.evaluate(&flat_scenario(0.0, 80.0, 0.2), &[100.0; 3]).unwrap_err();
        assert_eq!(
            err,
            EvalError::DimensionMismatch {
                expected: 25,
                actual: 3
            }
        );
    }

    #[test]
    fn idle_battery_closed_form() {
        let sim = DispatchSimulator::default();
        let eval = sim
            .evaluate(&flat_scenario(0.0, 80.0, 0.2), &idle(100.0))
            .unwrap_or_else(|e| panic!("{e}"));

        let expected = 500.0 * 100.0
            + 24.0 * 80.0 * 0.2
            + 24.0 * 80.0 * 0.487 * 2.0
            + 100.0 * 1.0_f64.sin().abs()
            // no generation and an idle battery: efficiency 0, shortfall 0.85
            + 0.85 * 1e4;
        assert!(
            (eval.total_cost - expected).abs() < 1e-6,
            "got {}, expected {expected}",
            eval.total_cost
        );
        assert_eq!(eval.breakdown.degradation, 0.0);
        assert_eq!(eval.breakdown.thermal, 0.0);
        assert_eq!(eval.breakdown.soc_stability, 0.0);
        assert_eq!(eval.breakdown.emergency, 0.0);
        assert_eq!(eval.efficiency, Some(0.0));
    }

    #[test]
    fn soc_clamps_at_minimum_when_discharging_hard() {
        let sim = DispatchSimulator::default();
        let mut sol = vec![0.5; 25];
        sol[0] = 100.0;
        let eval = sim
            .evaluate(&flat_scenario(0.0, 80.0, 0.2), &sol)
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(eval.soc_trace.iter().all(|s| (0.1..=0.9).contains(s)));
        assert_eq!(eval.soc_trace.last().copied(), Some(0.1));
    }

    #[test]
    fn charging_delta_uses_charge_efficiency() {
        let sim = DispatchSimulator::default();
        let mut sol = idle(100.0);
        sol[1] = -0.1;
        let eval = sim
            .evaluate(&flat_scenario(0.0, 80.0, 0.2), &sol)
            .unwrap_or_else(|e| panic!("{e}"));
        // hour 0: no fade, delta = 0.1 * 0.95
        assert!((eval.soc_trace[0] - (0.5 + 0.095)).abs() < 1e-12);
    }

    #[test]
    fn temperature_accumulates_without_cooling() {
        let sim = DispatchSimulator::default();
        let mut sol = idle(100.0);
        for u in sol.iter_mut().skip(1) {
            *u = 0.1;
        }
        let eval = sim
            .evaluate(&flat_scenario(0.0, 80.0, 0.2), &sol)
            .unwrap_or_else(|e| panic!("{e}"));
        // +2 °C every hour
        for (t, rec) in eval.hours.iter().enumerate() {
            let expected = 25.0 + 2.0 * (t + 1) as f64;
            assert!((rec.temperature_c - expected).abs() < 1e-9);
        }
        // 25 + 2*24 = 73 °C; penalty from hour 10 onward
        assert!(eval.breakdown.thermal > 0.0);
    }

    #[test]
    fn grid_outage_penalises_import_only() {
        let mut series = HourlySeries::constant(24, 0.0, 80.0, 0.2);
        series.grid_available[5] = false;
        let importing = Scenario::new(series).unwrap_or_else(|e| panic!("{e}"));
        let sim = DispatchSimulator::default();
        let eval = sim
            .evaluate(&importing, &idle(100.0))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(eval.breakdown.grid_outage, 1e6);

        let mut series = HourlySeries::constant(24, 200.0, 80.0, 0.2);
        series.grid_available[5] = false;
        let exporting = Scenario::new(series).unwrap_or_else(|e| panic!("{e}"));
        let eval = sim
            .evaluate(&exporting, &idle(100.0))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(eval.breakdown.grid_outage, 0.0);
    }

    #[test]
    fn carbon_applies_to_export() {
        let sim = DispatchSimulator::default();
        let eval = sim
            .evaluate(&flat_scenario(200.0, 80.0, 0.2), &idle(100.0))
            .unwrap_or_else(|e| panic!("{e}"));
        let expected = 24.0 * (80.0 - 200.0) * 0.487 * 2.0;
        assert!((eval.breakdown.carbon - expected).abs() < 1e-9);
        assert_eq!(eval.breakdown.grid_energy, 0.0);
    }

    #[test]
    fn emergency_shortfall_is_charged() {
        let mut series = HourlySeries::constant(24, 0.0, 80.0, 0.2);
        series.emergency[2] = true;
        let scenario = Scenario::new(series).unwrap_or_else(|e| panic!("{e}"));
        let eval = DispatchSimulator::default()
            .evaluate(&scenario, &idle(100.0))
            .unwrap_or_else(|e| panic!("{e}"));
        assert!((eval.breakdown.emergency - 120.0 * 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn soc_swing_triggers_stability_penalty() {
        let sim = DispatchSimulator::default();
        let mut sol = idle(100.0);
        // charge to the cap, then dump it all in hour 4
        sol[1] = -0.5;
        sol[5] = 0.5;
        let eval = sim
            .evaluate(&flat_scenario(0.0, 80.0, 0.2), &sol)
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(eval.breakdown.soc_stability >= 1e4);
    }

    #[test]
    fn hour_costs_sum_to_operating_cost() {
        let scenario = crate::scenario::ScenarioGenerator::new(24, Default::default()).generate(9);
        let mut sol: Vec<f64> = (0..25).map(|i| ((i as f64) * 0.37).sin() * 0.4).collect();
        sol[0] = 750.0;
        let eval = DispatchSimulator::default()
            .evaluate(&scenario, &sol)
            .unwrap_or_else(|e| panic!("{e}"));
        let hourly: f64 = eval.hours.iter().map(|h| h.cost).sum();
        let b = eval.breakdown;
        let operating = b.total() - b.capital - b.efficiency - b.regularizer;
        assert!((hourly - operating).abs() < 1e-6 * operating.abs().max(1.0));
    }
}
