//! Directory: a doubling array of bucket references indexed by low hash bits.
//!
//! Buckets live in a `SlotMap` arena owned by the directory and slots store
//! arena keys. A bucket of depth `d` is referenced by every slot whose low
//! `d` bits equal its canonical id, so up to `2^(depth - d)` slots alias one
//! arena entry. Splitting narrows that aliasing; nothing ever widens it.

use crate::bucket::{Bucket, BucketKey};
use slotmap::SlotMap;
use std::collections::TryReserveError;

/// Why a directory could not make room for a split.
#[derive(Debug)]
pub(crate) enum GrowError {
    DepthLimit,
    Allocation(TryReserveError),
}

/// Low `depth` bits of `hash`.
#[inline]
pub(crate) fn address(hash: u64, depth: u32) -> usize {
    (hash & ((1u64 << depth) - 1)) as usize
}

#[derive(Debug)]
pub(crate) struct Directory {
    slots: Vec<BucketKey>,
    depth: u32,
    buckets: SlotMap<BucketKey, Bucket>,
    bucket_capacity: usize,
}

impl Directory {
    pub(crate) fn new(bucket_capacity: usize) -> Self {
        let mut buckets = SlotMap::with_key();
        let root = buckets.insert(Bucket::new(0, 0, bucket_capacity));
        Self {
            slots: vec![root],
            depth: 0,
            buckets,
            bucket_capacity,
        }
    }

    #[inline]
    pub(crate) fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn bucket_capacity(&self) -> usize {
        self.bucket_capacity
    }

    /// Number of distinct buckets.
    #[inline]
    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub(crate) fn bucket_at(&self, address: usize) -> &Bucket {
        &self.buckets[self.slots[address]]
    }

    #[inline]
    pub(crate) fn bucket_at_mut(&mut self, address: usize) -> &mut Bucket {
        &mut self.buckets[self.slots[address]]
    }

    /// Double the slot array; the upper half aliases the lower half.
    fn grow(&mut self, max_depth: u32) -> Result<(), GrowError> {
        if self.depth >= max_depth {
            return Err(GrowError::DepthLimit);
        }
        let size = self.slots.len();
        self.slots
            .try_reserve_exact(size)
            .map_err(GrowError::Allocation)?;
        self.slots.extend_from_within(..);
        self.depth += 1;
        tracing::debug!(depth = self.depth, slots = self.slots.len(), "directory grown");
        Ok(())
    }

    /// Split the bucket referenced by `address` into itself and a sibling one
    /// level deeper, redistributing its keys with `hash`.
    ///
    /// Either the whole split happens or, on error, nothing changes.
    pub(crate) fn split<F>(&mut self, address: usize, max_depth: u32, hash: F) -> Result<(), GrowError>
    where
        F: Fn(i64) -> u64,
    {
        let target = self.slots[address];
        if self.buckets[target].depth == self.depth {
            self.grow(max_depth)?;
        }

        let (id, depth) = {
            let b = &self.buckets[target];
            (b.id, b.depth)
        };
        let new_depth = depth + 1;
        let sibling_id = (1usize << depth) | id;
        let sibling = self
            .buckets
            .insert(Bucket::new(sibling_id, new_depth, self.bucket_capacity));

        // Slots whose low `new_depth` bits equal the sibling id.
        for a in (sibling_id..self.slots.len()).step_by(1usize << new_depth) {
            self.slots[a] = sibling;
        }

        let bucket = &mut self.buckets[target];
        bucket.depth = new_depth;
        let keys = bucket.take_keys();
        for key in keys {
            let dest = self.slots[address_of(&hash, key, self.depth)];
            debug_assert!(dest == target || dest == sibling);
            let pushed = self.buckets[dest].try_push(key);
            debug_assert!(pushed.is_ok(), "split halves overflowed");
        }
        tracing::debug!(
            bucket = id,
            sibling = sibling_id,
            depth = new_depth,
            "bucket split"
        );
        Ok(())
    }

    /// Keys of every distinct bucket, in canonical-address order.
    pub(crate) fn keys(&self) -> Keys<'_> {
        Keys {
            dir: self,
            slot: 0,
            pos: 0,
        }
    }

    /// Release every distinct bucket exactly once, deduplicating aliased slots
    /// by canonical id, then the slot array. Returns how many were released.
    pub(crate) fn release(mut self) -> usize {
        let mut released = 0;
        for i in (0..self.slots.len()).rev() {
            let k = self.slots[i];
            if self.buckets[k].id == i {
                self.buckets.remove(k);
                released += 1;
            }
        }
        debug_assert!(self.buckets.is_empty(), "bucket not reachable from directory");
        released
    }

    /// Panic unless the aliasing and capacity invariants hold and every key
    /// sits in the bucket `hash` addresses it to.
    #[cfg(test)]
    pub(crate) fn assert_invariants<F>(&self, hash: F)
    where
        F: Fn(i64) -> u64,
    {
        use hashbrown::HashMap;

        assert_eq!(self.slots.len(), 1usize << self.depth);
        let mut refs: HashMap<BucketKey, usize> = HashMap::new();
        for (a, &k) in self.slots.iter().enumerate() {
            let b = &self.buckets[k];
            assert!(b.depth <= self.depth, "bucket deeper than directory");
            assert_eq!(address(a as u64, b.depth), b.id, "slot {} misaligned", a);
            *refs.entry(k).or_insert(0) += 1;
        }
        assert_eq!(refs.len(), self.buckets.len(), "unreachable bucket in arena");
        for (k, b) in self.buckets.iter() {
            assert!(b.id < (1usize << b.depth));
            assert_eq!(refs[&k], 1usize << (self.depth - b.depth));
            assert!(b.len() <= self.bucket_capacity);
            for &key in b.keys() {
                assert_eq!(address(hash(key), b.depth), b.id, "key {} misplaced", key);
            }
        }
    }
}

#[inline]
fn address_of<F: Fn(i64) -> u64>(hash: &F, key: i64, depth: u32) -> usize {
    address(hash(key), depth)
}

/// Iterator over the keys of a directory's distinct buckets.
pub(crate) struct Keys<'a> {
    dir: &'a Directory,
    slot: usize,
    pos: usize,
}

impl<'a> Iterator for Keys<'a> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        while self.slot < self.dir.slots.len() {
            let b = &self.dir.buckets[self.dir.slots[self.slot]];
            if b.id == self.slot && self.pos < b.len() {
                self.pos += 1;
                return Some(b.keys()[self.pos - 1]);
            }
            self.slot += 1;
            self.pos = 0;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn identity(k: i64) -> u64 {
        k as u64
    }

    fn fill(dir: &mut Directory, keys: &[i64]) {
        for &k in keys {
            let a = address(identity(k), dir.depth());
            dir.bucket_at_mut(a).try_push(k).unwrap();
        }
    }

    #[test]
    fn address_takes_low_bits() {
        assert_eq!(address(0b1011_0110, 0), 0);
        assert_eq!(address(0b1011_0110, 3), 0b110);
        assert_eq!(address(u64::MAX, 5), 31);
    }

    /// Invariant: growing doubles the slots and each upper slot aliases the
    /// lower slot it was copied from.
    #[test]
    fn grow_aliases_upper_half() {
        let mut d = Directory::new(1);
        d.grow(8).unwrap();
        d.grow(8).unwrap();
        assert_eq!(d.depth(), 2);
        assert_eq!(d.size(), 4);
        assert_eq!(d.bucket_count(), 1);
        for a in 0..4 {
            assert_eq!(d.slots[a], d.slots[0]);
        }
        d.assert_invariants(identity);
    }

    #[test]
    fn grow_refuses_past_max_depth() {
        let mut d = Directory::new(1);
        d.grow(1).unwrap();
        assert!(matches!(d.grow(1), Err(GrowError::DepthLimit)));
        assert_eq!(d.depth(), 1);
        assert_eq!(d.size(), 2);
    }

    /// Invariant: splitting a full-depth bucket grows the directory first, then
    /// disperses its keys between the bucket and its sibling only.
    #[test]
    fn split_at_full_depth_grows_and_disperses() {
        let mut d = Directory::new(2);
        fill(&mut d, &[4, 7]);
        d.split(0, 8, identity).unwrap();
        assert_eq!(d.depth(), 1);
        assert_eq!(d.bucket_count(), 2);
        assert_eq!(d.bucket_at(0).keys(), &[4]);
        assert_eq!(d.bucket_at(1).keys(), &[7]);
        assert_eq!(d.bucket_at(1).id, 1);
        assert_eq!(d.bucket_at(1).depth, 1);
        d.assert_invariants(identity);
    }

    /// Invariant: splitting a shallow bucket repoints exactly the slots whose
    /// low bits match the sibling id and leaves the directory size alone.
    #[test]
    fn split_shallow_bucket_repoints_matching_slots() {
        let mut d = Directory::new(4);
        fill(&mut d, &[0, 1, 2, 3]);
        d.grow(8).unwrap();
        d.grow(8).unwrap();
        assert_eq!(d.depth(), 2);

        // Bucket has depth 0 and four aliases.
        d.split(2, 8, identity).unwrap();
        assert_eq!(d.depth(), 2);
        assert_eq!(d.slots[0], d.slots[2]);
        assert_eq!(d.slots[1], d.slots[3]);
        assert_ne!(d.slots[0], d.slots[1]);
        assert_eq!(d.bucket_at(0).keys(), &[0, 2]);
        assert_eq!(d.bucket_at(3).keys(), &[1, 3]);
        d.assert_invariants(identity);

        d.split(1, 8, identity).unwrap();
        assert_eq!(d.bucket_at(1).keys(), &[1]);
        assert_eq!(d.bucket_at(3).keys(), &[3]);
        assert_eq!(d.bucket_at(3).id, 3);
        d.assert_invariants(identity);
    }

    /// Invariant: a split that would exceed the depth limit changes nothing.
    #[test]
    fn failed_split_leaves_directory_untouched() {
        let mut d = Directory::new(1);
        fill(&mut d, &[6]);
        assert!(matches!(d.split(0, 0, identity), Err(GrowError::DepthLimit)));
        assert_eq!(d.depth(), 0);
        assert_eq!(d.bucket_count(), 1);
        assert_eq!(d.bucket_at(0).keys(), &[6]);
        assert_eq!(d.bucket_at(0).depth, 0);
    }

    #[test]
    fn keys_visit_each_bucket_once() {
        let mut d = Directory::new(2);
        fill(&mut d, &[8, 5]);
        d.split(0, 8, identity).unwrap();
        d.grow(8).unwrap();
        d.split(0, 8, identity).unwrap();
        let seen: Vec<i64> = d.keys().collect();
        assert_eq!(seen.len(), 2);
        let set: BTreeSet<i64> = seen.into_iter().collect();
        assert_eq!(set, BTreeSet::from([5, 8]));
    }

    /// Invariant: release frees each distinct bucket exactly once no matter how
    /// many slots alias it.
    #[test]
    fn release_counts_distinct_buckets() {
        let mut d = Directory::new(1);
        fill(&mut d, &[1]);
        d.split(0, 8, identity).unwrap();
        d.grow(8).unwrap();
        d.grow(8).unwrap();
        assert_eq!(d.size(), 8);
        assert_eq!(d.release(), 2);
    }
}
