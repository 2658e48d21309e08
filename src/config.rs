//! TOML-based run configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Names of every built-in search strategy, in registry order.
pub const ALGORITHM_NAMES: &[&str] = &["GWWOA", "GWO", "WOA", "CPSO", "GA", "HS", "FPA"];

/// Top-level configuration parsed from TOML.
///
/// All fields have defaults matching the baseline run. Load from TOML with
/// [`SizingConfig::from_toml_file`] or use [`SizingConfig::baseline`] for the
/// built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizingConfig {
    /// Planning horizon.
    #[serde(default)]
    pub horizon: HorizonConfig,
    /// Stochastic scenario parameters.
    #[serde(default)]
    pub scenario: ScenarioConfig,
    /// Battery economics and physics.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Penalty weights of the dispatch cost.
    #[serde(default)]
    pub penalties: PenaltyConfig,
    /// Search-space bounds and optimizer hyperparameters.
    #[serde(default)]
    pub search: SearchConfig,
    /// Multi-trial harness settings.
    #[serde(default)]
    pub harness: HarnessConfig,
}

/// Planning horizon.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HorizonConfig {
    /// Number of hourly dispatch decisions (H).
    pub hours: usize,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self { hours: 24 }
    }
}

/// Diurnal base curves, noise levels and fault probabilities.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Solar sine amplitude (kW).
    pub solar_amp_kw: f64,
    /// Solar constant offset (kW).
    pub solar_offset_kw: f64,
    /// Wind cosine amplitude (kW).
    pub wind_amp_kw: f64,
    /// Wind constant offset (kW).
    pub wind_offset_kw: f64,
    /// Mean demand (kW).
    pub demand_base_kw: f64,
    /// Demand sine amplitude (kW).
    pub demand_amp_kw: f64,
    /// Mean grid price ($/kWh).
    pub price_base: f64,
    /// Grid price sine amplitude ($/kWh).
    pub price_amp: f64,
    /// Relative std of the noise shared by all four series.
    pub shared_noise_std: f64,
    /// Relative std of the extra demand-only noise.
    pub demand_noise_std: f64,
    /// Per-hour probability of a solar outage.
    pub solar_outage_prob: f64,
    /// Per-hour probability of a wind outage.
    pub wind_outage_prob: f64,
    /// Per-hour probability the grid is available.
    pub grid_available_prob: f64,
    /// Per-hour probability of an emergency event.
    pub emergency_prob: f64,
    /// Lower bound applied to the grid price ($/kWh).
    pub price_floor: f64,
    /// Number of distinct hours receiving a price spike.
    pub spike_hours: usize,
    /// Minimum spike multiplier.
    pub spike_min: f64,
    /// Maximum spike multiplier.
    pub spike_max: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            solar_amp_kw: 50.0,
            solar_offset_kw: 1.0,
            wind_amp_kw: 30.0,
            wind_offset_kw: 5.0,
            demand_base_kw: 80.0,
            demand_amp_kw: 30.0,
            price_base: 0.20,
            price_amp: 0.05,
            shared_noise_std: 0.15,
            demand_noise_std: 0.15,
            solar_outage_prob: 0.10,
            wind_outage_prob: 0.15,
            grid_available_prob: 0.80,
            emergency_prob: 0.10,
            price_floor: 0.05,
            spike_hours: 4,
            spike_min: 3.0,
            spike_max: 5.0,
        }
    }
}

/// Battery economics, efficiencies and thermal behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Capital cost per installed kWh ($).
    pub capital_cost_per_kwh: f64,
    /// Degradation cost coefficient.
    pub degradation_coeff: f64,
    /// Exponent applied to |battery power| in the degradation term.
    pub degradation_exponent: f64,
    /// SOC normaliser in the degradation stress factor.
    pub degradation_soc_ref: f64,
    /// Charge efficiency (0.0–1.0).
    pub eta_charge: f64,
    /// Discharge efficiency (0.0–1.0).
    pub eta_discharge: f64,
    /// Lower SOC limit.
    pub soc_min: f64,
    /// Upper SOC limit.
    pub soc_max: f64,
    /// SOC at the start of the horizon.
    pub initial_soc: f64,
    /// Cell temperature at the start of the horizon (°C).
    pub initial_temp_c: f64,
    /// C-rate producing a 1 °C rise per hour.
    pub heating_c_rate: f64,
    /// Temperature above which the thermal penalty applies (°C).
    pub thermal_limit_c: f64,
    /// Thermal penalty per squared degree above the limit.
    pub thermal_penalty: f64,
    /// Linear capacity fade per hour of the horizon.
    pub fade_per_hour: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capital_cost_per_kwh: 500.0,
            degradation_coeff: 0.02,
            degradation_exponent: 1.5,
            degradation_soc_ref: 0.9,
            eta_charge: 0.95,
            eta_discharge: 0.95,
            soc_min: 0.1,
            soc_max: 0.9,
            initial_soc: 0.5,
            initial_temp_c: 25.0,
            heating_c_rate: 0.05,
            thermal_limit_c: 45.0,
            thermal_penalty: 10.0,
            fade_per_hour: 0.005,
        }
    }
}

/// Weights of the soft constraints folded into the cost.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PenaltyConfig {
    /// Multiple of demand that must be served during an emergency.
    pub emergency_demand_factor: f64,
    /// Cost per kW of emergency shortfall.
    pub emergency_shortfall_cost: f64,
    /// Flat penalty for importing while the grid is down.
    pub grid_outage_penalty: f64,
    /// Grid carbon intensity (kg CO2/kWh).
    pub carbon_intensity: f64,
    /// Carbon price ($/kg CO2).
    pub carbon_price: f64,
    /// Trailing SOC window length (hours).
    pub soc_window: usize,
    /// Maximum allowed deviation from the trailing SOC mean.
    pub soc_deviation_limit: f64,
    /// Flat penalty for an SOC-stability violation.
    pub soc_stability_penalty: f64,
    /// Minimum supply/demand efficiency.
    pub efficiency_target: f64,
    /// Penalty per unit of efficiency shortfall.
    pub efficiency_penalty: f64,
    /// Amplitude of the periodic capacity regulariser.
    pub regularizer_amplitude: f64,
    /// Frequency of the periodic capacity regulariser (per kWh).
    pub regularizer_frequency: f64,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            emergency_demand_factor: 1.5,
            emergency_shortfall_cost: 1_000.0,
            grid_outage_penalty: 1e6,
            carbon_intensity: 0.487,
            carbon_price: 2.0,
            soc_window: 3,
            soc_deviation_limit: 0.2,
            soc_stability_penalty: 1e4,
            efficiency_target: 0.85,
            efficiency_penalty: 1e4,
            regularizer_amplitude: 100.0,
            regularizer_frequency: 0.01,
        }
    }
}

/// Box constraints and shared optimizer settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Population (or harmony memory) size.
    pub population: usize,
    /// Iterations per run.
    pub max_iterations: usize,
    /// Smallest battery capacity considered (kWh).
    pub capacity_min_kwh: f64,
    /// Largest battery capacity considered (kWh).
    pub capacity_max_kwh: f64,
    /// Symmetric bound on the hourly dispatch fraction.
    pub dispatch_limit: f64,
    /// Genetic algorithm hyperparameters.
    pub ga: GaConfig,
    /// Particle swarm hyperparameters.
    pub pso: PsoConfig,
    /// Harmony search hyperparameters.
    pub hs: HsConfig,
    /// Flower pollination hyperparameters.
    pub fpa: FpaConfig,
    /// Hybrid grey-wolf/whale hyperparameters.
    pub gwwoa: GwwoaConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population: 30,
            max_iterations: 50,
            capacity_min_kwh: 1.0,
            capacity_max_kwh: 2_000.0,
            dispatch_limit: 0.5,
            ga: GaConfig::default(),
            pso: PsoConfig::default(),
            hs: HsConfig::default(),
            fpa: FpaConfig::default(),
            gwwoa: GwwoaConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GaConfig {
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    /// Mutation std as a fraction of each dimension's span.
    pub mutation_scale: f64,
    pub tournament_size: usize,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            crossover_rate: 0.9,
            mutation_rate: 0.1,
            mutation_scale: 0.1,
            tournament_size: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PsoConfig {
    pub inertia: f64,
    pub cognitive: f64,
    pub social: f64,
}

impl Default for PsoConfig {
    fn default() -> Self {
        Self {
            inertia: 0.8,
            cognitive: 0.5,
            social: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HsConfig {
    /// Harmony memory considering rate.
    pub hmcr: f64,
    /// Pitch adjusting rate.
    pub par: f64,
    /// Pitch bandwidth as a fraction of each dimension's span.
    pub bandwidth: f64,
}

impl Default for HsConfig {
    fn default() -> Self {
        Self {
            hmcr: 0.95,
            par: 0.3,
            bandwidth: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FpaConfig {
    /// Probability of global (Lévy) pollination.
    pub switch_prob: f64,
    /// Lévy stability index.
    pub beta: f64,
}

impl Default for FpaConfig {
    fn default() -> Self {
        Self {
            switch_prob: 0.8,
            beta: 1.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GwwoaConfig {
    pub levy_prob: f64,
    pub chaos_prob: f64,
    pub beta: f64,
}

impl Default for GwwoaConfig {
    fn default() -> Self {
        Self {
            levy_prob: 0.1,
            chaos_prob: 0.1,
            beta: 1.5,
        }
    }
}

/// Multi-trial harness settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Number of independent trials.
    pub trials: usize,
    /// Worker threads: 1 runs trials sequentially, 0 uses every core.
    pub threads: usize,
    /// Algorithms to register, by name.
    pub algorithms: Vec<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            trials: 100,
            threads: 1,
            algorithms: ALGORITHM_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"search.population"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl SizingConfig {
    /// Returns the baseline configuration.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns a small, fast configuration for smoke runs.
    pub fn quick() -> Self {
        Self {
            search: SearchConfig {
                population: 10,
                max_iterations: 10,
                ..SearchConfig::default()
            },
            harness: HarnessConfig {
                trials: 5,
                ..HarnessConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the stress preset: unreliable renewables, frequent grid loss
    /// and emergencies.
    pub fn stress() -> Self {
        Self {
            scenario: ScenarioConfig {
                solar_outage_prob: 0.25,
                wind_outage_prob: 0.30,
                grid_available_prob: 0.6,
                emergency_prob: 0.2,
                shared_noise_std: 0.25,
                spike_hours: 6,
                ..ScenarioConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "quick", "stress"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "quick" => Ok(Self::quick()),
            "stress" => Ok(Self::stress()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let hours = self.horizon.hours;

        if hours == 0 {
            errors.push(ConfigError::new("horizon.hours", "must be > 0"));
        }
        // Effective capacity must stay positive on the last hour.
        let fade = self.battery.fade_per_hour;
        if hours > 0 && (fade < 0.0 || fade * (hours - 1) as f64 >= 1.0) {
            errors.push(ConfigError::new(
                "battery.fade_per_hour",
                "must be >= 0 and leave positive capacity at the end of the horizon",
            ));
        }

        let sc = &self.scenario;
        for (field, p) in [
            ("scenario.solar_outage_prob", sc.solar_outage_prob),
            ("scenario.wind_outage_prob", sc.wind_outage_prob),
            ("scenario.grid_available_prob", sc.grid_available_prob),
            ("scenario.emergency_prob", sc.emergency_prob),
        ] {
            if !(0.0..=1.0).contains(&p) {
                errors.push(ConfigError::new(field, "must be in [0.0, 1.0]"));
            }
        }
        if sc.shared_noise_std < 0.0 || sc.demand_noise_std < 0.0 {
            errors.push(ConfigError::new("scenario.shared_noise_std", "noise std must be >= 0"));
        }
        if sc.price_floor < 0.0 {
            errors.push(ConfigError::new("scenario.price_floor", "must be >= 0"));
        }
        if sc.spike_hours > hours {
            errors.push(ConfigError::new(
                "scenario.spike_hours",
                "must be <= horizon.hours",
            ));
        }
        if !(sc.spike_min > 0.0 && sc.spike_min <= sc.spike_max) {
            errors.push(ConfigError::new(
                "scenario.spike_min",
                "must be > 0 and <= scenario.spike_max",
            ));
        }

        let bat = &self.battery;
        if bat.capital_cost_per_kwh < 0.0 {
            errors.push(ConfigError::new("battery.capital_cost_per_kwh", "must be >= 0"));
        }
        if !(bat.eta_charge > 0.0 && bat.eta_charge <= 1.0) {
            errors.push(ConfigError::new("battery.eta_charge", "must be in (0.0, 1.0]"));
        }
        if !(bat.eta_discharge > 0.0 && bat.eta_discharge <= 1.0) {
            errors.push(ConfigError::new("battery.eta_discharge", "must be in (0.0, 1.0]"));
        }
        if !(0.0 <= bat.soc_min && bat.soc_min < bat.soc_max && bat.soc_max <= 1.0) {
            errors.push(ConfigError::new(
                "battery.soc_min",
                "must satisfy 0 <= soc_min < soc_max <= 1",
            ));
        }
        if !(bat.soc_min..=bat.soc_max).contains(&bat.initial_soc) {
            errors.push(ConfigError::new(
                "battery.initial_soc",
                "must lie within [soc_min, soc_max]",
            ));
        }
        if bat.heating_c_rate <= 0.0 {
            errors.push(ConfigError::new("battery.heating_c_rate", "must be > 0"));
        }
        if bat.degradation_soc_ref <= 0.0 {
            errors.push(ConfigError::new("battery.degradation_soc_ref", "must be > 0"));
        }

        if self.penalties.soc_window == 0 {
            errors.push(ConfigError::new("penalties.soc_window", "must be > 0"));
        }

        let s = &self.search;
        if s.population < 4 {
            errors.push(ConfigError::new("search.population", "must be >= 4"));
        }
        if s.max_iterations == 0 {
            errors.push(ConfigError::new("search.max_iterations", "must be > 0"));
        }
        if !(s.capacity_min_kwh > 0.0 && s.capacity_min_kwh <= s.capacity_max_kwh) {
            errors.push(ConfigError::new(
                "search.capacity_min_kwh",
                "must be > 0 and <= search.capacity_max_kwh",
            ));
        }
        if s.dispatch_limit < 0.0 {
            errors.push(ConfigError::new("search.dispatch_limit", "must be >= 0"));
        }
        for (field, p) in [
            ("search.ga.crossover_rate", s.ga.crossover_rate),
            ("search.ga.mutation_rate", s.ga.mutation_rate),
            ("search.hs.hmcr", s.hs.hmcr),
            ("search.hs.par", s.hs.par),
            ("search.fpa.switch_prob", s.fpa.switch_prob),
            ("search.gwwoa.levy_prob", s.gwwoa.levy_prob),
            ("search.gwwoa.chaos_prob", s.gwwoa.chaos_prob),
        ] {
            if !(0.0..=1.0).contains(&p) {
                errors.push(ConfigError::new(field, "must be in [0.0, 1.0]"));
            }
        }
        if s.ga.mutation_scale < 0.0 || s.hs.bandwidth < 0.0 {
            errors.push(ConfigError::new("search.ga.mutation_scale", "step scales must be >= 0"));
        }
        if s.ga.tournament_size == 0 {
            errors.push(ConfigError::new("search.ga.tournament_size", "must be > 0"));
        }
        if !(s.fpa.beta > 0.0 && s.fpa.beta <= 2.0) || !(s.gwwoa.beta > 0.0 && s.gwwoa.beta <= 2.0)
        {
            errors.push(ConfigError::new("search.fpa.beta", "Lévy beta must be in (0, 2]"));
        }

        for name in &self.harness.algorithms {
            if !ALGORITHM_NAMES.contains(&name.as_str()) {
                errors.push(ConfigError::new(
                    "harness.algorithms",
                    format!(
                        "unknown algorithm \"{name}\", available: {}",
                        ALGORITHM_NAMES.join(", ")
                    ),
                ));
            }
        }

        errors
    }
}
