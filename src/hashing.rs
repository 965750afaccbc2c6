//! Hash functions for the two tables.
//!
//! Each table addresses keys by the low bits of its own hash, so h1 and h2
//! must be deterministic for the lifetime of the engine and should be
//! uncorrelated: keys that collide under both for many low bits are what
//! drive splits and directory growth.

use core::hash::BuildHasher;

/// Maps a key to the 64-bit hash a table addresses it by.
pub trait KeyHasher {
    fn hash_key(&self, key: i64) -> u64;
}

impl<S: BuildHasher> KeyHasher for S {
    #[inline]
    fn hash_key(&self, key: i64) -> u64 {
        self.hash_one(key)
    }
}

const H1_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

const H2_SEEDS: [u64; 4] = [
    0x4528_21e6_38d0_1377,
    0xbe54_66cf_34e9_0c6c,
    0xc0ac_29b7_c97c_50dd,
    0x3f84_d5b5_b547_0917,
];

/// Default hash for table 1.
pub fn default_h1() -> ahash::RandomState {
    let [a, b, c, d] = H1_SEEDS;
    ahash::RandomState::with_seeds(a, b, c, d)
}

/// Default hash for table 2; seeded independently of [`default_h1`].
pub fn default_h2() -> ahash::RandomState {
    let [a, b, c, d] = H2_SEEDS;
    ahash::RandomState::with_seeds(a, b, c, d)
}
