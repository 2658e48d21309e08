use rand::Rng;

use crate::config::PsoConfig;
use crate::error::SearchError;
use crate::random::seeded;

use super::{require_population, Incumbent, NativeOutcome, SearchProblem, SearchStrategy};

/// Velocity limit as a fraction of each dimension's span.
const VELOCITY_CAP: f64 = 0.2;

/// Global-best particle swarm with constant inertia and velocity clamping.
///
/// Records the global best once per iteration, so the history has exactly
/// `max_iterations` entries.
#[derive(Debug, Clone, Default)]
pub struct ParticleSwarm {
    config: PsoConfig,
}

impl ParticleSwarm {
    pub fn new(config: PsoConfig) -> Self {
        Self { config }
    }
}

impl SearchStrategy for ParticleSwarm {
    fn name(&self) -> &str {
        "CPSO"
    }

    fn search(
        &self,
        problem: &SearchProblem<'_>,
        _observer: &mut dyn FnMut(f64),
    ) -> Result<NativeOutcome, SearchError> {
        require_population(self.name(), problem, 1)?;
        let bounds = problem.bounds;
        let dim = problem.dimension();
        let PsoConfig {
            inertia,
            cognitive,
            social,
        } = self.config;
        let mut rng = seeded(problem.seed);

        let mut positions = bounds.random_population(&mut rng, problem.population);
        let mut velocities: Vec<Vec<f64>> = (0..problem.population)
            .map(|_| {
                (0..dim)
                    .map(|j| VELOCITY_CAP * bounds.span(j) * rng.random_range(-1.0..=1.0_f64))
                    .collect()
            })
            .collect();
        let costs = problem.costs(&positions);
        let mut personal = positions.clone();
        let mut personal_cost = costs.clone();
        let mut global = Incumbent::from_population(&positions, &costs);

        let mut history = Vec::with_capacity(problem.max_iterations);
        for _ in 0..problem.max_iterations {
            for (i, (x, v)) in positions.iter_mut().zip(&mut velocities).enumerate() {
                for j in 0..dim {
                    let vmax = VELOCITY_CAP * bounds.span(j);
                    let r1: f64 = rng.random();
                    let r2: f64 = rng.random();
                    v[j] = (inertia * v[j]
                        + cognitive * r1 * (personal[i][j] - x[j])
                        + social * r2 * (global.position[j] - x[j]))
                        .clamp(-vmax, vmax);
                    x[j] += v[j];
                }
                bounds.clamp(x);
                let c = problem.cost(x);
                if c < personal_cost[i] {
                    personal_cost[i] = c;
                    personal[i].copy_from_slice(x);
                }
                global.offer(x, c);
            }
            history.push(global.cost);
        }

        Ok(global.into_outcome(history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optim::test_support::{assert_well_behaved, run_on_sphere};

    #[test]
    fn converges_on_sphere() {
        assert_well_behaved(&ParticleSwarm::default());
    }

    #[test]
    fn history_has_one_entry_per_iteration() {
        let (outcome, observed) = run_on_sphere(&ParticleSwarm::default(), 5);
        assert_eq!(outcome.history.len(), 60);
        assert!(observed.is_empty());
    }
}
