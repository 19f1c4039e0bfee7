//! Random number source used by randomization and mutation.
//!
//! Everything is derived from a single uniform [0, 1) draw so that any
//! generator, including a scripted one in tests, can drive the network.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::PI;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seedable generator used by the simulation
pub type SimRng = ChaCha8Rng;

/// Source of uniform and Gaussian draws
pub trait RandomSource {
    /// Uniform double in [0, 1)
    fn uniform01(&mut self) -> f64;

    /// Uniform double in [min, max)
    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        self.uniform01() * (max - min) + min
    }

    /// Uniform integer in [min, max).
    ///
    /// Truncates a continuous draw and rejects anything that rounds up to
    /// `max`. Callers must ensure `min < max`.
    fn uniform_index(&mut self, min: usize, max: usize) -> usize {
        debug_assert!(min < max, "empty index range {}..{}", min, max);
        loop {
            let index = self.uniform(min as f64, max as f64) as usize;
            if index < max {
                return index;
            }
        }
    }

    /// Normal deviate via the Box-Muller transform
    fn gaussian(&mut self, mean: f64, sd: f64) -> f64 {
        // 1 - u lies in (0, 1], keeping the logarithm finite
        let factor = (-2.0 * (1.0 - self.uniform01()).ln()).sqrt();
        let angle = 2.0 * PI * self.uniform01();
        mean + sd * factor * angle.cos()
    }
}

impl RandomSource for ChaCha8Rng {
    #[inline]
    fn uniform01(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

impl RandomSource for rand::rngs::ThreadRng {
    #[inline]
    fn uniform01(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Deterministic generator for a fixed seed
pub fn seeded(seed: u64) -> SimRng {
    SimRng::seed_from_u64(seed)
}

/// Seed taken from the wall clock, for runs that don't ask for one
pub fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_else(|_| rand::thread_rng().gen())
}
