//! Stochastic 24-hour microgrid scenarios.
//!
//! A [`Scenario`] is generated once per trial from the trial seed and then
//! shared, read-only, by every algorithm evaluated in that trial.

/// Noise-free diurnal base curves.
pub mod profile;

use rand::Rng;
use rand::seq::index;

use crate::config::{ScenarioConfig, SizingConfig};
use crate::error::EvalError;
use crate::random::{noise_factor, seeded};

pub use profile::DiurnalProfile;

/// Raw hourly series used to assemble a [`Scenario`].
///
/// All vectors must have the same length. Outage flags are `true` when the
/// source is down; `grid_available` is `true` when import is possible.
#[derive(Debug, Clone, Default)]
pub struct HourlySeries {
    pub solar_kw: Vec<f64>,
    pub wind_kw: Vec<f64>,
    pub demand_kw: Vec<f64>,
    pub price: Vec<f64>,
    pub solar_failure: Vec<bool>,
    pub wind_failure: Vec<bool>,
    pub grid_available: Vec<bool>,
    pub emergency: Vec<bool>,
}

impl HourlySeries {
    /// Flat series with constant solar generation, no wind and no faults.
    pub fn constant(hours: usize, generation_kw: f64, demand_kw: f64, price: f64) -> Self {
        Self {
            solar_kw: vec![generation_kw; hours],
            wind_kw: vec![0.0; hours],
            demand_kw: vec![demand_kw; hours],
            price: vec![price; hours],
            solar_failure: vec![false; hours],
            wind_failure: vec![false; hours],
            grid_available: vec![true; hours],
            emergency: vec![false; hours],
        }
    }
}

/// One immutable hourly scenario: renewable output, demand, price and faults.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    solar_kw: Vec<f64>,
    wind_kw: Vec<f64>,
    demand_kw: Vec<f64>,
    price: Vec<f64>,
    solar_failure: Vec<bool>,
    wind_failure: Vec<bool>,
    grid_available: Vec<bool>,
    emergency: Vec<bool>,
}

impl Scenario {
    /// Builds a scenario from raw series.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::SeriesLength`] if the series differ in length and
    /// [`EvalError::InvalidSeriesValue`] if a power or price value is negative
    /// or not finite.
    pub fn new(series: HourlySeries) -> Result<Self, EvalError> {
        let hours = series.demand_kw.len();
        let lengths = [
            ("solar_kw", series.solar_kw.len()),
            ("wind_kw", series.wind_kw.len()),
            ("price", series.price.len()),
            ("solar_failure", series.solar_failure.len()),
            ("wind_failure", series.wind_failure.len()),
            ("grid_available", series.grid_available.len()),
            ("emergency", series.emergency.len()),
        ];
        for (name, len) in lengths {
            if len != hours {
                return Err(EvalError::SeriesLength {
                    series: name,
                    expected: hours,
                    actual: len,
                });
            }
        }
        for (name, values) in [
            ("solar_kw", &series.solar_kw),
            ("wind_kw", &series.wind_kw),
            ("demand_kw", &series.demand_kw),
            ("price", &series.price),
        ] {
            if let Some(hour) = values.iter().position(|v| !v.is_finite() || *v < 0.0) {
                return Err(EvalError::InvalidSeriesValue { series: name, hour });
            }
        }

        Ok(Self {
            solar_kw: series.solar_kw,
            wind_kw: series.wind_kw,
            demand_kw: series.demand_kw,
            price: series.price,
            solar_failure: series.solar_failure,
            wind_failure: series.wind_failure,
            grid_available: series.grid_available,
            emergency: series.emergency,
        })
    }

    /// Number of hours in the scenario.
    pub fn hours(&self) -> usize {
        self.demand_kw.len()
    }

    /// Renewable generation available at hour `t`, zero for any source in outage.
    pub fn generation_kw(&self, t: usize) -> f64 {
        let solar = if self.solar_failure[t] { 0.0 } else { self.solar_kw[t] };
        let wind = if self.wind_failure[t] { 0.0 } else { self.wind_kw[t] };
        solar + wind
    }

    pub fn total_generation_kwh(&self) -> f64 {
        (0..self.hours()).map(|t| self.generation_kw(t)).sum()
    }

    pub fn total_demand_kwh(&self) -> f64 {
        self.demand_kw.iter().sum()
    }

    pub fn solar_kw(&self) -> &[f64] {
        &self.solar_kw
    }

    pub fn wind_kw(&self) -> &[f64] {
        &self.wind_kw
    }

    pub fn demand_kw(&self) -> &[f64] {
        &self.demand_kw
    }

    pub fn price(&self) -> &[f64] {
        &self.price
    }

    pub fn solar_failure(&self) -> &[bool] {
        &self.solar_failure
    }

    pub fn wind_failure(&self) -> &[bool] {
        &self.wind_failure
    }

    pub fn grid_available(&self) -> &[bool] {
        &self.grid_available
    }

    pub fn emergency(&self) -> &[bool] {
        &self.emergency
    }
}

/// Deterministic scenario generator: same seed, same scenario.
///
/// # Examples
///
/// ```
/// use microgrid_sizing::config::ScenarioConfig;
/// use microgrid_sizing::scenario::ScenarioGenerator;
///
/// let generator = ScenarioGenerator::new(24, ScenarioConfig::default());
/// assert_eq!(generator.generate(3), generator.generate(3));
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioGenerator {
    hours: usize,
    params: ScenarioConfig,
    profile: DiurnalProfile,
}

impl ScenarioGenerator {
    /// Creates a generator for `hours` hourly steps.
    ///
    /// # Arguments
    ///
    /// * `hours` - Horizon length; must not be smaller than `params.spike_hours`
    /// * `params` - Base-curve, noise and fault parameters
    pub fn new(hours: usize, params: ScenarioConfig) -> Self {
        Self {
            hours,
            profile: DiurnalProfile::new(params.clone()),
            params,
        }
    }

    /// Creates a generator from a validated run configuration.
    pub fn from_config(config: &SizingConfig) -> Self {
        Self::new(config.horizon.hours, config.scenario.clone())
    }

    pub fn hours(&self) -> usize {
        self.hours
    }

    /// Generates the scenario for `seed`.
    ///
    /// Draw order is fixed (shared noise, outage flags, grid and emergency
    /// flags, demand noise, spike hours, spike factors) so a seed always
    /// reproduces the same scenario.
    pub fn generate(&self, seed: u64) -> Scenario {
        let p = &self.params;
        let h = self.hours;
        let mut rng = seeded(seed);

        let shared: Vec<f64> = (0..h)
            .map(|_| noise_factor(&mut rng, p.shared_noise_std))
            .collect();
        let solar_failure = bernoulli_series(&mut rng, h, p.solar_outage_prob);
        let wind_failure = bernoulli_series(&mut rng, h, p.wind_outage_prob);
        let grid_available = bernoulli_series(&mut rng, h, p.grid_available_prob);
        let emergency = bernoulli_series(&mut rng, h, p.emergency_prob);
        let demand_noise: Vec<f64> = (0..h)
            .map(|_| noise_factor(&mut rng, p.demand_noise_std))
            .collect();

        let solar_kw = (0..h)
            .map(|t| {
                if solar_failure[t] {
                    0.0
                } else {
                    (self.profile.solar_kw(t) * shared[t]).max(0.0)
                }
            })
            .collect();
        let wind_kw = (0..h)
            .map(|t| {
                if wind_failure[t] {
                    0.0
                } else {
                    (self.profile.wind_kw(t) * shared[t]).max(0.0)
                }
            })
            .collect();
        let demand_kw = (0..h)
            .map(|t| (self.profile.demand_kw(t) * shared[t] * demand_noise[t]).max(0.0))
            .collect();

        let mut price: Vec<f64> = (0..h)
            .map(|t| (self.profile.price(t) * shared[t]).max(p.price_floor))
            .collect();
        let spike_count = p.spike_hours.min(h);
        let spike_hours = index::sample(&mut rng, h, spike_count);
        for hour in spike_hours.iter() {
            price[hour] *= rng.random_range(p.spike_min..=p.spike_max);
        }

        Scenario {
            solar_kw,
            wind_kw,
            demand_kw,
            price,
            solar_failure,
            wind_failure,
            grid_available,
            emergency,
        }
    }
}

fn bernoulli_series<R: Rng + ?Sized>(rng: &mut R, hours: usize, p: f64) -> Vec<bool> {
    (0..hours).map(|_| rng.random_bool(p)).collect()
}
