//! One side of the engine: a directory, the hash that addresses it, and a
//! count of the keys it stores.

use crate::directory::{self, Directory, GrowError};
use crate::error::{Error, Result};
use crate::eviction::EvictionPolicy;
use crate::hashing::KeyHasher;
use core::fmt;

/// Which of the two tables: `First` is addressed by h1, `Second` by h2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableId {
    First,
    Second,
}

impl TableId {
    /// The table a key evicted from `self` moves to.
    #[inline]
    pub fn other(self) -> Self {
        match self {
            TableId::First => TableId::Second,
            TableId::Second => TableId::First,
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableId::First => f.write_str("table 1"),
            TableId::Second => f.write_str("table 2"),
        }
    }
}

/// Outcome of offering a key to a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    Stored,
    /// The bucket was full; the key took the place of this one.
    Evicted(i64),
}

#[derive(Debug)]
pub(crate) struct Table<S> {
    id: TableId,
    directory: Directory,
    hasher: S,
    nkeys: usize,
}

impl<S: KeyHasher> Table<S> {
    pub(crate) fn new(id: TableId, hasher: S, bucket_capacity: usize) -> Self {
        Self {
            id,
            directory: Directory::new(bucket_capacity),
            hasher,
            nkeys: 0,
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> TableId {
        self.id
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nkeys
    }

    #[inline]
    pub(crate) fn directory(&self) -> &Directory {
        &self.directory
    }

    #[inline]
    pub(crate) fn address_of(&self, key: i64) -> usize {
        directory::address(self.hasher.hash_key(key), self.directory.depth())
    }

    pub(crate) fn contains(&self, key: i64) -> bool {
        self.directory.bucket_at(self.address_of(key)).contains(key)
    }

    #[inline]
    pub(crate) fn is_full_at(&self, address: usize) -> bool {
        self.directory.bucket_at(address).is_full()
    }

    /// Store `key` at `address`, or evict the resident chosen by `policy` and
    /// put `key` in its slot.
    pub(crate) fn place<E: EvictionPolicy>(
        &mut self,
        address: usize,
        key: i64,
        policy: &mut E,
    ) -> Placement {
        let bucket = self.directory.bucket_at_mut(address);
        match bucket.try_push(key) {
            Ok(()) => {
                self.nkeys += 1;
                Placement::Stored
            }
            Err(key) => {
                let victim = policy.victim(bucket.len());
                debug_assert!(victim < bucket.len(), "eviction index out of range");
                Placement::Evicted(bucket.replace(victim, key))
            }
        }
    }

    /// Reverse a `place` that stored `stored` by evicting `evicted`. Only valid
    /// while the table holds the same keys it held right after that eviction;
    /// splits in between are fine since they only regroup those keys.
    pub(crate) fn undo_eviction(&mut self, stored: i64, evicted: i64) {
        let from = self.address_of(stored);
        let removed = self.directory.bucket_at_mut(from).remove(stored);
        debug_assert!(removed, "{} no longer holds {}", self.id, stored);
        let to = self.address_of(evicted);
        let restored = self.directory.bucket_at_mut(to).try_push(evicted);
        debug_assert!(restored.is_ok(), "no room to restore {}", evicted);
    }

    /// Split the bucket at `address`. `unplaced` is the key the caller will
    /// report as not stored if the directory cannot grow.
    pub(crate) fn split_at(&mut self, address: usize, max_depth: u32, unplaced: i64) -> Result<()> {
        let hasher = &self.hasher;
        match self
            .directory
            .split(address, max_depth, |k| hasher.hash_key(k))
        {
            Ok(()) => Ok(()),
            Err(GrowError::DepthLimit) => {
                tracing::warn!(table = %self.id, max_depth, key = unplaced, "directory depth limit reached");
                Err(Error::DepthLimit {
                    table: self.id,
                    max_depth,
                    unplaced,
                })
            }
            Err(GrowError::Allocation(e)) => Err(Error::Allocation(e)),
        }
    }

    pub(crate) fn stats(&self) -> TableStats {
        TableStats {
            keys: self.nkeys,
            depth: self.directory.depth(),
            slots: self.directory.size(),
            buckets: self.directory.bucket_count(),
        }
    }

    pub(crate) fn release(self) -> usize {
        self.directory.release()
    }

    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        self.directory
            .assert_invariants(|k| self.hasher.hash_key(k));
        assert_eq!(self.directory.keys().count(), self.nkeys, "{} key count drifted", self.id);
    }
}

/// Size figures for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableStats {
    /// Keys stored in this table.
    pub keys: usize,
    /// Directory depth; the directory has `2^depth` slots.
    pub depth: u32,
    /// Directory slots, aliases included.
    pub slots: usize,
    /// Distinct buckets.
    pub buckets: usize,
}
