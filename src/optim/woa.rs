use std::f64::consts::PI;

use rand::Rng;

use crate::error::SearchError;
use crate::random::seeded;

use super::gwo::control;
use super::{require_population, Incumbent, NativeOutcome, SearchProblem, SearchStrategy};

/// Logarithmic spiral shape constant.
const SPIRAL_B: f64 = 1.0;

/// One whale update: encircle the best, explore around a random peer, or
/// spiral toward the best with equal odds between shrinking and spiralling.
pub(super) fn whale_move<R: Rng + ?Sized>(
    rng: &mut R,
    x: &mut [f64],
    best: &[f64],
    peer: &[f64],
    a: f64,
) {
    let big_a = a * (2.0 * rng.random::<f64>() - 1.0);
    let c = 2.0 * rng.random::<f64>();
    if rng.random_bool(0.5) {
        let target = if big_a.abs() < 1.0 { best } else { peer };
        for j in 0..x.len() {
            let d = (c * target[j] - x[j]).abs();
            x[j] = target[j] - big_a * d;
        }
    } else {
        let l: f64 = rng.random_range(-1.0..=1.0);
        let shape = (SPIRAL_B * l).exp() * (2.0 * PI * l).cos();
        for j in 0..x.len() {
            x[j] = (best[j] - x[j]).abs() * shape + best[j];
        }
    }
}

/// Whale optimization algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct Whale;

impl SearchStrategy for Whale {
    fn name(&self) -> &str {
        "WOA"
    }

    fn search(
        &self,
        problem: &SearchProblem<'_>,
        _observer: &mut dyn FnMut(f64),
    ) -> Result<NativeOutcome, SearchError> {
        require_population(self.name(), problem, 2)?;
        let n = problem.population;
        let mut rng = seeded(problem.seed);
        let mut whales = problem.bounds.random_population(&mut rng, n);
        let costs = problem.costs(&whales);
        let mut best = Incumbent::from_population(&whales, &costs);

        let mut history = Vec::with_capacity(problem.max_iterations);
        for t in 0..problem.max_iterations {
            let a = control(t, problem.max_iterations);
            for i in 0..n {
                let peer = whales[rng.random_range(0..n)].clone();
                let whale = &mut whales[i];
                whale_move(&mut rng, whale, &best.position, &peer, a);
                problem.bounds.clamp(whale);
                let c = problem.cost(whale);
                best.offer(whale, c);
            }
            history.push(best.cost);
        }

        Ok(best.into_outcome(history))
    }
}
