use rand::Rng;

use crate::error::SearchError;
use crate::random::seeded;

use super::{require_population, Incumbent, NativeOutcome, SearchProblem, SearchStrategy};

/// The three best positions seen so far, best first.
#[derive(Debug, Clone)]
pub(super) struct Leaders {
    ranked: [Incumbent; 3],
}

impl Leaders {
    /// Requires at least three members.
    pub fn from_population(population: &[Vec<f64>], costs: &[f64]) -> Self {
        let mut order: Vec<usize> = (0..costs.len()).collect();
        order.sort_by(|&a, &b| costs[a].total_cmp(&costs[b]));
        let pick = |k: usize| Incumbent {
            position: population[order[k]].clone(),
            cost: costs[order[k]],
        };
        Self {
            ranked: [pick(0), pick(1), pick(2)],
        }
    }

    pub fn offer(&mut self, position: &[f64], cost: f64) {
        if let Some(k) = self.ranked.iter().position(|l| cost < l.cost) {
            self.ranked[k..].rotate_right(1);
            self.ranked[k] = Incumbent {
                position: position.to_vec(),
                cost,
            };
        }
    }

    pub fn alpha(&self) -> &Incumbent {
        &self.ranked[0]
    }

    pub fn into_alpha(self) -> Incumbent {
        let [alpha, _, _] = self.ranked;
        alpha
    }
}

/// Moves `x` toward the average of the three leader-guided estimates.
/// `a` decays linearly from 2 to 0 over the run.
pub(super) fn hunt<R: Rng + ?Sized>(rng: &mut R, x: &mut [f64], leaders: &Leaders, a: f64) {
    for j in 0..x.len() {
        let estimate: f64 = leaders
            .ranked
            .iter()
            .map(|leader| {
                let big_a = a * (2.0 * rng.random::<f64>() - 1.0);
                let c = 2.0 * rng.random::<f64>();
                let d = (c * leader.position[j] - x[j]).abs();
                leader.position[j] - big_a * d
            })
            .sum();
        x[j] = estimate / 3.0;
    }
}

/// Linear control parameter shared by the wolf and whale updates.
pub(super) fn control(iteration: usize, max_iterations: usize) -> f64 {
    2.0 - 2.0 * iteration as f64 / max_iterations as f64
}

/// Grey wolf optimizer with alpha/beta/delta leadership.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreyWolf;

impl SearchStrategy for GreyWolf {
    fn name(&self) -> &str {
        "GWO"
    }

    fn search(
        &self,
        problem: &SearchProblem<'_>,
        _observer: &mut dyn FnMut(f64),
    ) -> Result<NativeOutcome, SearchError> {
        require_population(self.name(), problem, 3)?;
        let mut rng = seeded(problem.seed);
        let mut wolves = problem.bounds.random_population(&mut rng, problem.population);
        let costs = problem.costs(&wolves);
        let mut leaders = Leaders::from_population(&wolves, &costs);

        let mut history = Vec::with_capacity(problem.max_iterations);
        for t in 0..problem.max_iterations {
            let a = control(t, problem.max_iterations);
            for wolf in &mut wolves {
                hunt(&mut rng, wolf, &leaders, a);
                problem.bounds.clamp(wolf);
                let c = problem.cost(wolf);
                leaders.offer(wolf, c);
            }
            history.push(leaders.alpha().cost);
        }

        Ok(leaders.into_alpha().into_outcome(history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optim::test_support::assert_well_behaved;

    #[test]
    fn converges_on_sphere() {
        assert_well_behaved(&GreyWolf);
    }

    #[test]
    fn leaders_stay_ranked() {
        let pop = vec![vec![3.0], vec![1.0], vec![2.0], vec![4.0]];
        let costs = vec![3.0, 1.0, 2.0, 4.0];
        let mut leaders = Leaders::from_population(&pop, &costs);
        assert_eq!(leaders.alpha().cost, 1.0);

        leaders.offer(&[1.5], 1.5);
        let ranked: Vec<f64> = leaders.ranked.iter().map(|l| l.cost).collect();
        assert_eq!(ranked, vec![1.0, 1.5, 2.0]);

        leaders.offer(&[9.0], 9.0);
        assert_eq!(leaders.ranked[2].cost, 2.0);

        leaders.offer(&[0.5], 0.5);
        assert_eq!(leaders.into_alpha().position, vec![0.5]);
    }

    #[test]
    fn control_parameter_decays_to_zero() {
        assert_eq!(control(0, 10), 2.0);
        assert!((control(5, 10) - 1.0).abs() < 1e-12);
        assert!(control(9, 10) > 0.0);
    }
}
