//! Seeded random helpers shared by the scenario generator and the search strategies.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Weyl increment of the splitmix64 generator.
const SPLITMIX_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Creates a deterministic generator for the given seed.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// splitmix64 finaliser; a bijection on `u64`.
fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(SPLITMIX_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Derives the search seed for the algorithm in `slot` during `trial`.
///
/// Seeds are distinct across slots of one trial. Across trials, and against
/// the scenario seeds (the bare trial index), they are hashed apart rather
/// than disjoint by construction.
pub fn algorithm_seed(trial: usize, slot: usize) -> u64 {
    splitmix64(splitmix64(trial as u64) ^ (slot as u64 + 1))
}

/// Draws Gaussian noise using the Box-Muller transform.
///
/// # Arguments
///
/// * `rng` - Random number generator
/// * `std_dev` - Standard deviation of the noise
///
/// # Returns
///
/// Random value from a Gaussian distribution with mean 0 and the given
/// standard deviation. Returns 0.0 when `std_dev <= 0`.
pub fn gaussian_noise<R: Rng + ?Sized>(rng: &mut R, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

/// Multiplicative noise factor with mean 1 and the given relative spread.
pub fn noise_factor<R: Rng + ?Sized>(rng: &mut R, relative_std: f64) -> f64 {
    1.0 + gaussian_noise(rng, relative_std)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn zero_std_gives_zero_noise() {
        let mut rng = seeded(1);
        assert_eq!(gaussian_noise(&mut rng, 0.0), 0.0);
        assert_eq!(gaussian_noise(&mut rng, -1.0), 0.0);
    }

    #[test]
    fn noise_has_roughly_requested_spread() {
        let mut rng = seeded(7);
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| gaussian_noise(&mut rng, 0.15)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.01, "mean drifted: {mean}");
        assert!((var.sqrt() - 0.15).abs() < 0.01, "std off: {}", var.sqrt());
    }

    #[test]
    fn algorithm_seeds_differ_per_slot_and_trial() {
        assert_ne!(algorithm_seed(0, 0), algorithm_seed(0, 1));
        assert_ne!(algorithm_seed(0, 0), algorithm_seed(1, 0));
        assert_ne!(algorithm_seed(3, 0), 3);
        assert_eq!(algorithm_seed(5, 2), algorithm_seed(5, 2));
    }

    #[test]
    fn algorithm_seeds_do_not_collide_on_a_grid() {
        let mut seen = HashSet::new();
        for trial in 0..2_000 {
            for slot in 0..8 {
                assert!(seen.insert(algorithm_seed(trial, slot)), "({trial}, {slot}) collided");
            }
        }
        assert_ne!(algorithm_seed(7_919, 0), algorithm_seed(0, 1));
        assert!((0..16_000u64).all(|scenario_seed| !seen.contains(&scenario_seed)));
    }
}
