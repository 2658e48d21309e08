use rand::Rng;

use crate::config::FpaConfig;
use crate::error::SearchError;
use crate::random::seeded;

use super::levy::LevyFlight;
use super::{require_population, Incumbent, NativeOutcome, SearchProblem, SearchStrategy};

/// Flower pollination: Lévy-flight global pollination toward the best
/// flower, or local pollination between two random flowers. A flower only
/// moves when the new position is better.
#[derive(Debug, Clone, Default)]
pub struct FlowerPollination {
    config: FpaConfig,
}

impl FlowerPollination {
    pub fn new(config: FpaConfig) -> Self {
        Self { config }
    }
}

impl SearchStrategy for FlowerPollination {
    fn name(&self) -> &str {
        "FPA"
    }

    fn search(
        &self,
        problem: &SearchProblem<'_>,
        _observer: &mut dyn FnMut(f64),
    ) -> Result<NativeOutcome, SearchError> {
        require_population(self.name(), problem, 2)?;
        let n = problem.population;
        let dim = problem.dimension();
        let levy = LevyFlight::new(self.config.beta);
        let mut rng = seeded(problem.seed);
        let mut flowers = problem.bounds.random_population(&mut rng, n);
        let mut costs = problem.costs(&flowers);
        let mut best = Incumbent::from_population(&flowers, &costs);

        let mut history = Vec::with_capacity(problem.max_iterations);
        for _ in 0..problem.max_iterations {
            for i in 0..n {
                let x = &flowers[i];
                let mut candidate: Vec<f64> = if rng.random_bool(self.config.switch_prob) {
                    let steps = levy.steps(&mut rng, dim);
                    (0..dim)
                        .map(|j| x[j] + steps[j] * (best.position[j] - x[j]))
                        .collect()
                } else {
                    let eps: f64 = rng.random();
                    let a = &flowers[rng.random_range(0..n)];
                    let b = &flowers[rng.random_range(0..n)];
                    (0..dim).map(|j| x[j] + eps * (a[j] - b[j])).collect()
                };
                problem.bounds.clamp(&mut candidate);
                let c = problem.cost(&candidate);
                if c <= costs[i] {
                    best.offer(&candidate, c);
                    flowers[i] = candidate;
                    costs[i] = c;
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
    use crate::optim::test_support::{assert_well_behaved, run_on_sphere};

    #[test]
    fn converges_on_sphere() {
        assert_well_behaved(&FlowerPollination::default());
    }

    #[test]
    fn local_only_pollination_still_improves() {
        let fpa = FlowerPollination::new(FpaConfig {
            switch_prob: 0.0,
            beta: 1.5,
        });
        let (outcome, _) = run_on_sphere(&fpa, 2);
        assert!(outcome.history.first() >= outcome.history.last());
    }
}
