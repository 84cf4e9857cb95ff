//! Randomness used to disguise secondary trips.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform integers for trip randomization.
///
/// Injected so tests can script exact draws.
pub trait RandomSource {
    /// Uniform integer in `[0, bound)`. `bound` is never zero.
    fn below(&mut self, bound: u32) -> u32;

    /// Uniform integer in `[low, high]`.
    fn between(&mut self, low: i64, high: i64) -> i64;
}

/// Thread-local OS-seeded generator for production traffic.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn below(&mut self, bound: u32) -> u32 {
        rand::thread_rng().gen_range(0..bound)
    }

    fn between(&mut self, low: i64, high: i64) -> i64 {
        rand::thread_rng().gen_range(low..=high)
    }
}

/// Reproducible generator.
#[derive(Debug, Clone)]
pub struct SeededRandom(StdRng);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn below(&mut self, bound: u32) -> u32 {
        self.0.gen_range(0..bound)
    }

    fn between(&mut self, low: i64, high: i64) -> i64 {
        self.0.gen_range(low..=high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = SeededRandom::new(7);
        let mut b = SeededRandom::new(7);
        for _ in 0..32 {
            assert_eq!(a.below(1000), b.below(1000));
            assert_eq!(a.between(-10, 10), b.between(-10, 10));
        }
    }

    #[test]
    fn test_ranges_respected() {
        let mut rng = ThreadRandom;
        for _ in 0..500 {
            assert!(rng.below(4) < 4);
            let v = rng.between(-10, 10);
            assert!((-10..=10).contains(&v));
        }
    }
}
