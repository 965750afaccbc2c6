#![cfg(test)]

// Deterministic hashers for tests that need to choose which keys collide.

use core::hash::{BuildHasher, Hasher};

/// Hashes an `i64` key to its two's-complement bits shifted right by the
/// given amount. `ShiftBuildHasher(0)` is the identity; large shifts make
/// many keys collide on their low bits.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ShiftBuildHasher(pub u32);

pub(crate) struct ShiftHasher {
    shift: u32,
    value: u64,
}

impl BuildHasher for ShiftBuildHasher {
    type Hasher = ShiftHasher;
    fn build_hasher(&self) -> ShiftHasher {
        ShiftHasher {
            shift: self.0,
            value: 0,
        }
    }
}

impl Hasher for ShiftHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.value = self.value.rotate_left(8) ^ u64::from(b);
        }
    }
    fn write_i64(&mut self, i: i64) {
        self.value = i as u64;
    }
    fn finish(&self) -> u64 {
        self.value.checked_shr(self.shift).unwrap_or(0)
    }
}

/// Hashes an `i64` key to its bits times an odd multiplier. The low `d` bits
/// of the result depend only on the low `d` bits of the key, so keys that
/// differ there are told apart at depth `d`, as with the identity.
#[derive(Clone, Copy, Debug)]
pub(crate) struct MulBuildHasher(pub u64);

pub(crate) struct MulHasher {
    factor: u64,
    value: u64,
}

impl BuildHasher for MulBuildHasher {
    type Hasher = MulHasher;
    fn build_hasher(&self) -> MulHasher {
        debug_assert!(self.0 % 2 == 1, "multiplier must be odd");
        MulHasher {
            factor: self.0,
            value: 0,
        }
    }
}

impl Hasher for MulHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.value = self.value.rotate_left(8) ^ u64::from(b);
        }
    }
    fn write_i64(&mut self, i: i64) {
        self.value = i as u64;
    }
    fn finish(&self) -> u64 {
        self.value.wrapping_mul(self.factor)
    }
}

/// Every key hashes to zero.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ConstBuildHasher;

pub(crate) struct ConstHasher;

impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> ConstHasher {
        ConstHasher
    }
}

impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}
