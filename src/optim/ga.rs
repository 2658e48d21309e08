use rand::Rng;

use crate::config::GaConfig;
use crate::error::SearchError;
use crate::random::{gaussian_noise, seeded};

use super::{
    best_index, require_population, Incumbent, NativeOutcome, SearchProblem, SearchStrategy,
};

/// Elitist real-coded GA: tournament selection, blend crossover and
/// per-gene Gaussian mutation.
///
/// Reports progress only through the observer; the returned history is empty.
#[derive(Debug, Clone, Default)]
pub struct GeneticAlgorithm {
    config: GaConfig,
}

impl GeneticAlgorithm {
    pub fn new(config: GaConfig) -> Self {
        Self { config }
    }

    fn tournament<R: Rng + ?Sized>(&self, rng: &mut R, costs: &[f64]) -> usize {
        let mut winner = rng.random_range(0..costs.len());
        for _ in 1..self.config.tournament_size {
            let challenger = rng.random_range(0..costs.len());
            if costs[challenger] < costs[winner] {
                winner = challenger;
            }
        }
        winner
    }

    fn mutate<R: Rng + ?Sized>(&self, rng: &mut R, child: &mut [f64], problem: &SearchProblem<'_>) {
        for (j, gene) in child.iter_mut().enumerate() {
            if rng.random_bool(self.config.mutation_rate) {
                *gene += gaussian_noise(rng, self.config.mutation_scale * problem.bounds.span(j));
            }
        }
        problem.bounds.clamp(child);
    }
}

/// BLX-style blend: each gene is drawn on the segment between the parents,
/// extended by a quarter on both sides.
fn blend<R: Rng + ?Sized>(rng: &mut R, a: &[f64], b: &[f64]) -> (Vec<f64>, Vec<f64>) {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let w: f64 = rng.random_range(-0.25..=1.25);
            (w * x + (1.0 - w) * y, (1.0 - w) * x + w * y)
        })
        .unzip()
}

impl SearchStrategy for GeneticAlgorithm {
    fn name(&self) -> &str {
        "GA"
    }

    fn search(
        &self,
        problem: &SearchProblem<'_>,
        observer: &mut dyn FnMut(f64),
    ) -> Result<NativeOutcome, SearchError> {
        require_population(self.name(), problem, 2)?;
        let n = problem.population;
        let mut rng = seeded(problem.seed);

        let mut population = problem.bounds.random_population(&mut rng, n);
        let mut costs = problem.costs(&population);
        let mut best = Incumbent::from_population(&population, &costs);
        observer(best.cost);

        for _ in 0..problem.max_iterations {
            let mut next = Vec::with_capacity(n);
            next.push(best.position.clone());
            while next.len() < n {
                let a = &population[self.tournament(&mut rng, &costs)];
                let b = &population[self.tournament(&mut rng, &costs)];
                let (mut c1, mut c2) = if rng.random_bool(self.config.crossover_rate) {
                    blend(&mut rng, a, b)
                } else {
                    (a.clone(), b.clone())
                };
                self.mutate(&mut rng, &mut c1, problem);
                self.mutate(&mut rng, &mut c2, problem);
                next.push(c1);
                if next.len() < n {
                    next.push(c2);
                }
            }
            population = next;
            costs = problem.costs(&population);
            let i = best_index(&costs);
            best.offer(&population[i], costs[i]);
            observer(best.cost);
        }

        Ok(best.into_outcome(Vec::new()))
    }
}
