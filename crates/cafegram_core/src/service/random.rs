//! Pluggable randomness for recommendation picks.
//!
//! Any `rand::RngCore` is a [`RandomSource`], so production code uses an
//! entropy-seeded `StdRng` and tests pass `StdRng::seed_from_u64(..)` or a
//! hand-written fixed source.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Source of uniformly distributed indexes.
pub trait RandomSource {
    /// Returns an index in `0..len`. Callers guarantee `len > 0`.
    fn next_index(&mut self, len: usize) -> usize;
}

impl<T: RngCore> RandomSource for T {
    fn next_index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// Default source used when a catalog is built without an explicit one.
pub fn entropy_source() -> Box<dyn RandomSource> {
    Box::new(StdRng::from_entropy())
}

/// Deterministic source for reproducible picks.
pub fn seeded_source(seed: u64) -> Box<dyn RandomSource> {
    Box::new(StdRng::seed_from_u64(seed))
}

#[cfg(test)]
mod tests {
    use super::{seeded_source, RandomSource};

    #[test]
    fn same_seed_gives_same_sequence() {
        let mut first = seeded_source(7);
        let mut second = seeded_source(7);
        let a: Vec<usize> = (0..16).map(|_| first.next_index(10)).collect();
        let b: Vec<usize> = (0..16).map(|_| second.next_index(10)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn indexes_stay_in_range() {
        let mut source = seeded_source(42);
        for len in 1..20 {
            assert!(source.next_index(len) < len);
        }
    }
}
