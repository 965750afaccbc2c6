//! Choice of which resident key a full bucket gives up during displacement.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Picks the resident a full bucket gives up to the key being placed.
pub trait EvictionPolicy {
    /// Index of the key to evict from a full bucket holding `occupied` keys.
    /// Must be below `occupied`.
    fn victim(&mut self, occupied: usize) -> usize;
}

/// Always evicts the key at index 0. Deterministic; for any capacity the
/// displacement chain runs through slot 0 of each bucket it visits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FirstSlot;

impl EvictionPolicy for FirstSlot {
    #[inline]
    fn victim(&mut self, _occupied: usize) -> usize {
        0
    }
}

/// Evicts a uniformly chosen resident from a seeded generator.
#[derive(Debug, Clone)]
pub struct RandomSlot {
    rng: StdRng,
}

impl RandomSlot {
    /// Same seed, same victims.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl EvictionPolicy for RandomSlot {
    fn victim(&mut self, occupied: usize) -> usize {
        debug_assert!(occupied > 0);
        self.rng.gen_range(0..occupied)
    }
}
