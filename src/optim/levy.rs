//! Lévy-flight step generator (Mantegna's algorithm).

use std::f64::consts::PI;

use rand::Rng;
use statrs::function::gamma::gamma;

use crate::random::gaussian_noise;

/// Draws heavy-tailed step lengths with stability index `beta`.
#[derive(Debug, Clone, Copy)]
pub struct LevyFlight {
    beta: f64,
    sigma: f64,
}

impl LevyFlight {
    /// # Panics
    ///
    /// Panics if `beta` is outside `(0, 2]`.
    pub fn new(beta: f64) -> Self {
        assert!(beta > 0.0 && beta <= 2.0, "Lévy beta must be in (0, 2]");
        let num = gamma(1.0 + beta) * (PI * beta / 2.0).sin();
        let den = gamma((1.0 + beta) / 2.0) * beta * 2f64.powf((beta - 1.0) / 2.0);
        Self {
            beta,
            sigma: (num / den).powf(1.0 / beta),
        }
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// One scalar step.
    pub fn step<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u = gaussian_noise(rng, self.sigma);
        let v = gaussian_noise(rng, 1.0).abs().max(1e-12);
        u / v.powf(1.0 / self.beta)
    }

    /// A step vector of length `dim`.
    pub fn steps<R: Rng + ?Sized>(&self, rng: &mut R, dim: usize) -> Vec<f64> {
        (0..dim).map(|_| self.step(rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded;

    #[test]
    fn sigma_for_three_halves() {
        // Reference value for beta = 1.5
        let levy = LevyFlight::new(1.5);
        assert!((levy.sigma() - 0.696_574).abs() < 1e-4, "{}", levy.sigma());
    }

    #[test]
    fn steps_are_finite_and_heavy_tailed() {
        let levy = LevyFlight::new(1.5);
        let mut rng = seeded(4);
        let steps = levy.steps(&mut rng, 5_000);
        assert!(steps.iter().all(|s| s.is_finite()));
        let big = steps.iter().filter(|s| s.abs() > 5.0).count();
        assert!(big > 0, "expected occasional long jumps");
    }

    #[test]
    #[should_panic]
    fn rejects_invalid_beta() {
        LevyFlight::new(2.5);
    }
}
