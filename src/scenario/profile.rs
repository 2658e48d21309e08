//! Smooth diurnal base curves the stochastic scenario is built on.

use std::f64::consts::PI;

use crate::config::ScenarioConfig;

/// Noise-free hourly shapes for solar, wind, demand and price.
///
/// Hour `t` is the hour of day (0 = midnight). Generation curves may dip
/// below zero at night; the generator clips them after noise is applied.
#[derive(Debug, Clone)]
pub struct DiurnalProfile {
    params: ScenarioConfig,
}

impl DiurnalProfile {
    pub fn new(params: ScenarioConfig) -> Self {
        Self { params }
    }

    /// Solar base output: peaks at noon, negative overnight.
    pub fn solar_kw(&self, t: usize) -> f64 {
        let t = t as f64;
        self.params.solar_amp_kw * (PI * (t - 6.0) / 12.0).sin() + self.params.solar_offset_kw
    }

    /// Wind base output on a six-hour half period, strongest around noon and midnight.
    pub fn wind_kw(&self, t: usize) -> f64 {
        let t = t as f64;
        self.params.wind_amp_kw * (PI * (t - 12.0) / 6.0).cos() + self.params.wind_offset_kw
    }

    /// Demand base: minimum early morning, maximum in the evening.
    pub fn demand_kw(&self, t: usize) -> f64 {
        let t = t as f64;
        self.params.demand_base_kw + self.params.demand_amp_kw * (PI * (t + 6.0) / 12.0).sin()
    }

    /// Grid price base ($/kWh), peaking mid afternoon.
    pub fn price(&self, t: usize) -> f64 {
        let t = t as f64;
        self.params.price_base + self.params.price_amp * (PI * (t - 8.0) / 12.0).sin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> DiurnalProfile {
        DiurnalProfile::new(ScenarioConfig::default())
    }

    #[test]
    fn solar_peaks_at_noon() {
        let p = profile();
        assert!((p.solar_kw(12) - 51.0).abs() < 1e-9);
        assert!(p.solar_kw(0) < 0.0);
        for t in 0..24 {
            assert!(p.solar_kw(t) <= p.solar_kw(12) + 1e-9);
        }
    }

    #[test]
    fn wind_matches_closed_form() {
        let p = profile();
        assert!((p.wind_kw(12) - 35.0).abs() < 1e-9);
        assert!((p.wind_kw(18) - (-25.0)).abs() < 1e-9);
    }

    #[test]
    fn demand_range() {
        let p = profile();
        // sin(pi*(t+6)/12) = 1 at t = 0, -1 at t = 12
        assert!((p.demand_kw(0) - 110.0).abs() < 1e-9);
        assert!((p.demand_kw(12) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn price_stays_positive() {
        let p = profile();
        for t in 0..24 {
            let price = p.price(t);
            assert!((0.15..=0.25).contains(&price), "t={t}: {price}");
        }
        assert!((p.price(14) - 0.25).abs() < 1e-9);
    }
}
