//! ExtendibleCuckoo: two extendible tables joined by cuckoo displacement.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::eviction::{EvictionPolicy, FirstSlot};
use crate::hashing::{default_h1, default_h2, KeyHasher};
use crate::stats::{Dump, Stats};
use crate::table::{Placement, Table, TableId, TableStats};
use core::fmt;

/// A set of `i64` keys stored across two extendible-hashing tables.
///
/// A key lives in exactly one bucket of exactly one table: the bucket table 1
/// addresses it to under `S1`, or the one table 2 addresses it to under `S2`.
/// Inserting into a full bucket evicts a resident, which moves to its bucket
/// in the other table, and so on. When that chain brings the inserted key
/// back to the table it started in, the contended bucket is split instead of
/// looping again; only that bucket (and, if needed, its directory) grows.
pub struct ExtendibleCuckoo<S1 = ahash::RandomState, S2 = ahash::RandomState, E = FirstSlot> {
    first: Table<S1>,
    second: Table<S2>,
    eviction: E,
    config: Config,
}

/// State carried from one displacement step to the next.
#[derive(Debug, Clone, Copy)]
struct Displacement {
    /// Key currently looking for a bucket.
    key: i64,
    table: TableId,
    /// The key the caller asked to insert.
    record: i64,
    /// Table `record` was first offered to.
    origin: TableId,
    /// Steps since the start or the last split; nonzero means a return of
    /// `record` to `origin` closes a cycle.
    cycle: usize,
    /// Evictions since the start or the last split.
    since_split: usize,
}

impl Displacement {
    fn new(key: i64, origin: TableId) -> Self {
        Self {
            key,
            table: origin,
            record: key,
            origin,
            cycle: 0,
            since_split: 0,
        }
    }

    #[inline]
    fn closed_cycle(&self) -> bool {
        self.key == self.record && self.table == self.origin && self.cycle > 0
    }

    #[inline]
    fn after_split(&mut self) {
        self.cycle = 0;
        self.since_split = 0;
    }
}

/// One eviction made during an insert: `stored` took `evicted`'s place.
#[derive(Debug, Clone, Copy)]
struct Eviction {
    table: TableId,
    stored: i64,
    evicted: i64,
}

impl ExtendibleCuckoo {
    /// Single-key buckets, default hashers and slot-0 eviction.
    pub fn new() -> Self {
        Self::from_parts(Config::default(), default_h1(), default_h2(), FirstSlot)
    }

    /// Buckets holding up to `capacity` keys each.
    pub fn with_bucket_capacity(capacity: usize) -> Result<Self> {
        Self::with_config(Config::default().with_bucket_capacity(capacity))
    }

    /// Default hashers and slot-0 eviction under `config`.
    pub fn with_config(config: Config) -> Result<Self> {
        Self::with_hashers(config, default_h1(), default_h2())
    }
}

impl Default for ExtendibleCuckoo {
    fn default() -> Self {
        Self::new()
    }
}

impl<S1, S2> ExtendibleCuckoo<S1, S2, FirstSlot>
where
    S1: KeyHasher,
    S2: KeyHasher,
{
    /// `h1` addresses table 1 and `h2` table 2; eviction takes slot 0.
    pub fn with_hashers(config: Config, h1: S1, h2: S2) -> Result<Self> {
        Self::with_hashers_and_policy(config, h1, h2, FirstSlot)
    }
}

impl<S1, S2, E> ExtendibleCuckoo<S1, S2, E>
where
    S1: KeyHasher,
    S2: KeyHasher,
    E: EvictionPolicy,
{
    /// Fully injected construction: both hashers and the eviction policy.
    pub fn with_hashers_and_policy(config: Config, h1: S1, h2: S2, eviction: E) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, h1, h2, eviction))
    }

    fn from_parts(config: Config, h1: S1, h2: S2, eviction: E) -> Self {
        Self {
            first: Table::new(TableId::First, h1, config.bucket_capacity),
            second: Table::new(TableId::Second, h2, config.bucket_capacity),
            eviction,
            config,
        }
    }

    /// Settings the engine was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of keys stored in both tables.
    pub fn len(&self) -> usize {
        self.first.len() + self.second.len()
    }

    /// Whether no key is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` is stored. Probes one bucket in each table.
    pub fn contains(&self, key: i64) -> bool {
        self.first.contains(key) || self.second.contains(key)
    }

    /// Insert `key`. Returns `Ok(false)` without changing anything if it is
    /// already present.
    ///
    /// Fails with [`Error::DepthLimit`] when a split would take a directory
    /// past `Config::max_depth`. Every eviction made by the failed insert is
    /// undone first, so `key` is the unplaced key and every previously stored
    /// key remains stored.
    pub fn insert(&mut self, key: i64) -> Result<bool> {
        if self.contains(key) {
            return Ok(false);
        }
        let start = if self.first.len() <= self.second.len() {
            TableId::First
        } else {
            TableId::Second
        };

        let mut state = Displacement::new(key, start);
        let mut evictions: Vec<Eviction> = Vec::new();
        loop {
            let outcome = match state.table {
                TableId::First => {
                    Self::step(&mut self.first, &mut self.eviction, &self.config, &mut state)
                }
                TableId::Second => {
                    Self::step(&mut self.second, &mut self.eviction, &self.config, &mut state)
                }
            };
            let placement = match outcome {
                Ok(placement) => placement,
                Err(err) => {
                    self.roll_back(&evictions);
                    tracing::debug!(key, undone = evictions.len(), "insert rolled back");
                    return Err(err);
                }
            };
            match placement {
                Placement::Stored => return Ok(true),
                Placement::Evicted(evicted) => {
                    tracing::trace!(table = %state.table, evicted, "key displaced");
                    evictions.push(Eviction {
                        table: state.table,
                        stored: state.key,
                        evicted,
                    });
                    state.key = evicted;
                    state.table = state.table.other();
                }
            }
        }
    }

    /// Undo `evictions` newest first. Each table then holds the keys it held
    /// before the insert; splits made meanwhile stay.
    fn roll_back(&mut self, evictions: &[Eviction]) {
        for e in evictions.iter().rev() {
            match e.table {
                TableId::First => self.first.undo_eviction(e.stored, e.evicted),
                TableId::Second => self.second.undo_eviction(e.stored, e.evicted),
            }
        }
    }

    fn step<S: KeyHasher>(
        table: &mut Table<S>,
        eviction: &mut E,
        config: &Config,
        state: &mut Displacement,
    ) -> Result<Placement> {
        let mut address = table.address_of(state.key);
        if state.closed_cycle() {
            tracing::debug!(table = %table.id(), key = state.key, "displacement cycle, splitting");
            table.split_at(address, config.max_depth, state.record)?;
            address = table.address_of(state.key);
            state.after_split();
        } else if state.since_split >= config.max_displacements && table.is_full_at(address) {
            tracing::warn!(
                table = %table.id(),
                key = state.key,
                record = state.record,
                displacements = state.since_split,
                "displacement limit reached, forcing split"
            );
            table.split_at(address, config.max_depth, state.record)?;
            address = table.address_of(state.key);
            state.after_split();
        }
        state.cycle += 1;
        state.since_split += 1;
        Ok(table.place(address, state.key, eviction))
    }

    /// Deletion is not implemented; always returns [`Error::Unsupported`].
    pub fn remove(&mut self, _key: i64) -> Result<bool> {
        Err(Error::Unsupported)
    }

    /// Every stored key exactly once: table 1's buckets, then table 2's.
    pub fn iter(&self) -> Keys<'_> {
        Keys {
            inner: self.first.directory().keys().chain(self.second.directory().keys()),
        }
    }

    /// Size figures for one table.
    pub fn table_stats(&self, table: TableId) -> TableStats {
        match table {
            TableId::First => self.first.stats(),
            TableId::Second => self.second.stats(),
        }
    }

    /// Size figures for both tables; `Display` renders a summary.
    pub fn stats(&self) -> Stats {
        Stats {
            first: self.first.stats(),
            second: self.second.stats(),
        }
    }

    /// Slot-by-slot listing of both directories; see [`Dump`].
    pub fn dump(&self) -> Dump<'_> {
        Dump {
            tables: [
                (TableId::First, self.first.directory()),
                (TableId::Second, self.second.directory()),
            ],
        }
    }

    /// Tear the engine down, releasing each distinct bucket once and then both
    /// directories. Returns how many buckets were released. Dropping the
    /// engine frees the same storage without counting.
    pub fn destroy(self) -> usize {
        self.first.release() + self.second.release()
    }

    /// Panic unless every structural invariant holds for both tables and no
    /// key is stored twice.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        use hashbrown::HashSet;

        self.first.assert_invariants();
        self.second.assert_invariants();
        let mut seen = HashSet::new();
        for k in self.iter() {
            assert!(seen.insert(k), "key {} stored twice", k);
        }
        assert_eq!(seen.len(), self.len());
    }
}

impl<S1, S2, E> fmt::Debug for ExtendibleCuckoo<S1, S2, E>
where
    S1: KeyHasher,
    S2: KeyHasher,
    E: EvictionPolicy,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        f.debug_struct("ExtendibleCuckoo")
            .field("len", &self.len())
            .field("first", &stats.first)
            .field("second", &stats.second)
            .finish()
    }
}

/// Iterator over the keys of an [`ExtendibleCuckoo`].
pub struct Keys<'a> {
    inner: core::iter::Chain<crate::directory::Keys<'a>, crate::directory::Keys<'a>>,
}

impl<'a> Iterator for Keys<'a> {
    type Item = i64;
    #[inline]
    fn next(&mut self) -> Option<i64> {
        self.inner.next()
    }
}

impl<'a, S1, S2, E> IntoIterator for &'a ExtendibleCuckoo<S1, S2, E>
where
    S1: KeyHasher,
    S2: KeyHasher,
    E: EvictionPolicy,
{
    type Item = i64;
    type IntoIter = Keys<'a>;
    fn into_iter(self) -> Keys<'a> {
        self.iter()
    }
}
