use rand::Rng;

use crate::config::HsConfig;
use crate::error::SearchError;
use crate::random::seeded;

use super::{
    require_population, worst_index, Incumbent, NativeOutcome, SearchProblem, SearchStrategy,
};

/// Harmony search. The harmony memory is the population; each iteration
/// improvises `population` new harmonies, each replacing the current worst
/// when it improves on it.
#[derive(Debug, Clone, Default)]
pub struct HarmonySearch {
    config: HsConfig,
}

impl HarmonySearch {
    pub fn new(config: HsConfig) -> Self {
        Self { config }
    }

    fn improvise<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        memory: &[Vec<f64>],
        problem: &SearchProblem<'_>,
    ) -> Vec<f64> {
        let bounds = problem.bounds;
        let mut harmony: Vec<f64> = (0..problem.dimension())
            .map(|j| {
                if rng.random_bool(self.config.hmcr) {
                    let mut note = memory[rng.random_range(0..memory.len())][j];
                    if rng.random_bool(self.config.par) {
                        note += self.config.bandwidth * bounds.span(j) * rng.random_range(-1.0..=1.0_f64);
                    }
                    note
                } else {
                    bounds.sample_dim(rng, j)
                }
            })
            .collect();
        bounds.clamp(&mut harmony);
        harmony
    }
}

impl SearchStrategy for HarmonySearch {
    fn name(&self) -> &str {
        "HS"
    }

    fn search(
        &self,
        problem: &SearchProblem<'_>,
        _observer: &mut dyn FnMut(f64),
    ) -> Result<NativeOutcome, SearchError> {
        require_population(self.name(), problem, 1)?;
        let mut rng = seeded(problem.seed);
        let mut memory = problem.bounds.random_population(&mut rng, problem.population);
        let mut costs = problem.costs(&memory);
        let mut best = Incumbent::from_population(&memory, &costs);

        let mut history = Vec::with_capacity(problem.max_iterations);
        for _ in 0..problem.max_iterations {
            for _ in 0..problem.population {
                let harmony = self.improvise(&mut rng, &memory, problem);
                let c = problem.cost(&harmony);
                let worst = worst_index(&costs);
                if c < costs[worst] {
                    best.offer(&harmony, c);
                    memory[worst] = harmony;
                    costs[worst] = c;
                }
            }
            history.push(best.cost);
        }

        Ok(best.into_outcome(history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optim::test_support::assert_well_behaved;

    #[test]
    fn converges_on_sphere() {
        assert_well_behaved(&HarmonySearch::default());
    }

    #[test]
    fn memory_only_improvisation_stays_in_memory_hull() {
        let hs = HarmonySearch::new(HsConfig {
            hmcr: 1.0,
            par: 0.0,
            bandwidth: 0.0,
        });
        let bounds = crate::optim::test_support::unit_bounds(2);
        let objective = |_: &[f64]| 0.0;
        let problem = SearchProblem {
            objective: &objective,
            bounds: &bounds,
            population: 2,
            max_iterations: 1,
            seed: 0,
        };
        let memory = vec![vec![0.1, 0.2], vec![0.3, 0.4]];
        let mut rng = seeded(9);
        for _ in 0..50 {
            let h = hs.improvise(&mut rng, &memory, &problem);
            assert!(h[0] == 0.1 || h[0] == 0.3);
            assert!(h[1] == 0.2 || h[1] == 0.4);
        }
    }
}
