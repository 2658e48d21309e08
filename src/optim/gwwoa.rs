use rand::Rng;

use crate::config::GwwoaConfig;
use crate::error::SearchError;
use crate::random::seeded;

use super::gwo::{control, hunt, Leaders};
use super::levy::LevyFlight;
use super::woa::whale_move;
use super::{require_population, NativeOutcome, SearchProblem, SearchStrategy};

/// Lévy jump length as a fraction of each dimension's span.
const LEVY_SCALE: f64 = 0.05;

/// Hybrid grey-wolf / whale optimizer.
///
/// Each agent takes a Lévy jump around the alpha with probability
/// `levy_prob`, otherwise a logistic-map chaotic move with probability
/// `chaos_prob`, otherwise a wolf hunt or whale move with equal odds.
/// The chaotic radius shrinks with the control parameter.
#[derive(Debug, Clone, Default)]
pub struct GreyWolfWhale {
    config: GwwoaConfig,
}

impl GreyWolfWhale {
    pub fn new(config: GwwoaConfig) -> Self {
        Self { config }
    }
}

/// Logistic map in its fully chaotic regime.
fn logistic(z: f64) -> f64 {
    4.0 * z * (1.0 - z)
}

impl SearchStrategy for GreyWolfWhale {
    fn name(&self) -> &str {
        "GWWOA"
    }

    fn search(
        &self,
        problem: &SearchProblem<'_>,
        _observer: &mut dyn FnMut(f64),
    ) -> Result<NativeOutcome, SearchError> {
        require_population(self.name(), problem, 3)?;
        let n = problem.population;
        let bounds = problem.bounds;
        let levy = LevyFlight::new(self.config.beta);
        let mut rng = seeded(problem.seed);
        let mut agents = bounds.random_population(&mut rng, n);
        let costs = problem.costs(&agents);
        let mut leaders = Leaders::from_population(&agents, &costs);
        // Away from the map's fixed points and their preimages.
        let mut chaos: Vec<f64> = (0..n).map(|_| rng.random_range(0.05..0.95)).collect();

        let mut history = Vec::with_capacity(problem.max_iterations);
        for t in 0..problem.max_iterations {
            let a = control(t, problem.max_iterations);
            for i in 0..n {
                chaos[i] = logistic(chaos[i]);
                let peer = agents[rng.random_range(0..n)].clone();
                let alpha = leaders.alpha().position.clone();
                let agent = &mut agents[i];

                if rng.random_bool(self.config.levy_prob) {
                    for (j, v) in agent.iter_mut().enumerate() {
                        *v = alpha[j] + LEVY_SCALE * bounds.span(j) * levy.step(&mut rng);
                    }
                } else if rng.random_bool(self.config.chaos_prob) {
                    let radius = 0.25 * a;
                    for (j, v) in agent.iter_mut().enumerate() {
                        *v = alpha[j] + radius * bounds.span(j) * (2.0 * chaos[i] - 1.0);
                    }
                } else if rng.random_bool(0.5) {
                    hunt(&mut rng, agent, &leaders, a);
                } else {
                    whale_move(&mut rng, agent, &alpha, &peer, a);
                }

                bounds.clamp(agent);
                let c = problem.cost(agent);
                leaders.offer(agent, c);
            }
            history.push(leaders.alpha().cost);
        }

        Ok(leaders.into_alpha().into_outcome(history))
    }
}
