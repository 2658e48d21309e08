//! Named set of strategies compared by the trial harness.

use crate::config::{ConfigError, SearchConfig, ALGORITHM_NAMES};

use super::fpa::FlowerPollination;
use super::ga::GeneticAlgorithm;
use super::gwo::GreyWolf;
use super::gwwoa::GreyWolfWhale;
use super::hs::HarmonySearch;
use super::pso::ParticleSwarm;
use super::woa::Whale;
use super::SearchStrategy;

/// Builds one of the reference strategies by display name.
///
/// Returns `None` for a name not in [`ALGORITHM_NAMES`].
pub fn build_strategy(name: &str, search: &SearchConfig) -> Option<Box<dyn SearchStrategy>> {
    let strategy: Box<dyn SearchStrategy> = match name {
        "GWWOA" => Box::new(GreyWolfWhale::new(search.gwwoa.clone())),
        "GWO" => Box::new(GreyWolf),
        "WOA" => Box::new(Whale),
        "CPSO" => Box::new(ParticleSwarm::new(search.pso.clone())),
        "GA" => Box::new(GeneticAlgorithm::new(search.ga.clone())),
        "HS" => Box::new(HarmonySearch::new(search.hs.clone())),
        "FPA" => Box::new(FlowerPollination::new(search.fpa.clone())),
        _ => return None,
    };
    Some(strategy)
}

/// Ordered collection of strategies. Order is the reporting order and the
/// slot index used to derive each algorithm's seed.
#[derive(Default)]
pub struct AlgorithmRegistry {
    strategies: Vec<Box<dyn SearchStrategy>>,
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All reference strategies in their canonical order.
    pub fn standard(search: &SearchConfig) -> Self {
        let mut registry = Self::new();
        for name in ALGORITHM_NAMES {
            if let Some(s) = build_strategy(name, search) {
                registry.register(s);
            }
        }
        registry
    }

    /// Strategies for the given names, in the given order.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first unknown algorithm.
    pub fn from_names<S: AsRef<str>>(names: &[S], search: &SearchConfig) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for name in names {
            let name = name.as_ref();
            let strategy = build_strategy(name, search).ok_or_else(|| {
                ConfigError::new(
                    "harness.algorithms",
                    format!(
                        "unknown algorithm \"{name}\", available: {}",
                        ALGORITHM_NAMES.join(", ")
                    ),
                )
            })?;
            registry.register(strategy);
        }
        Ok(registry)
    }

    pub fn register(&mut self, strategy: Box<dyn SearchStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn SearchStrategy> {
        self.strategies.iter().map(|s| &**s)
    }

    pub fn get(&self, name: &str) -> Option<&dyn SearchStrategy> {
        self.iter().find(|s| s.name() == name)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_has_every_algorithm_in_order() {
        let registry = AlgorithmRegistry::standard(&SearchConfig::default());
        assert_eq!(registry.names(), ALGORITHM_NAMES.to_vec());
    }

    #[test]
    fn from_names_respects_order_and_rejects_unknown() {
        let search = SearchConfig::default();
        let registry = AlgorithmRegistry::from_names(&["HS", "GWO"], &search);
        assert_eq!(registry.map(|r| r.names().join(",")).ok(), Some("HS,GWO".to_string()));

        let err = AlgorithmRegistry::from_names(&["GWO", "SA"], &search).err();
        assert!(err.is_some_and(|e| e.message.contains("\"SA\"")));
    }

    #[test]
    fn lookup_by_name() {
        let registry = AlgorithmRegistry::standard(&SearchConfig::default());
        assert_eq!(registry.get("CPSO").map(|s| s.name()), Some("CPSO"));
        assert!(registry.get("cpso").is_none());
        assert!(!registry.is_empty());
    }
}
