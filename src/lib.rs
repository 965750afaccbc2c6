//! extendible-cuckoo: an insert/lookup set of `i64` keys built from two
//! extendible-hashing tables joined by cuckoo displacement.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: cuckoo hashing without whole-table rehashes. A failed
//!   displacement cycle grows one bucket, not the table.
//! - Layers:
//!   - Bucket: up to `capacity` keys plus the trie depth and canonical
//!     address they share.
//!   - Directory: `2^depth` slots of bucket arena keys, addressed by the
//!     low `depth` bits of a hash; owns grow (doubling) and split.
//!   - Table: a directory, the hash that addresses it and its key count.
//!   - ExtendibleCuckoo: two tables (h1, h2), duplicate rejection, the
//!     displacement loop and cycle-triggered splits.
//!
//! Displacement
//! - Insert starts in the table holding fewer keys (ties go to table 1).
//!   A full bucket gives up one resident (chosen by an `EvictionPolicy`,
//!   slot 0 by default), which continues in the other table.
//! - When the inserted key is displaced back into the table it started in,
//!   the chain has closed a cycle. The bucket it addresses there is split,
//!   doubling the directory first if that bucket already uses every
//!   directory bit, and displacement carries on.
//! - Each split deepens the contended bucket by one bit, so colliding keys
//!   are eventually told apart unless both hashes agree on every bit. The
//!   directory depth limit turns that case into `Error::DepthLimit` rather
//!   than an endless loop. A failed insert undoes its own evictions first, so
//!   the key it names is the one passed to `insert` and nothing else moves
//!   out of the set.
//! - A displacement cap forces a split when a chain runs long without
//!   returning to the inserted key, which pluggable eviction policies can
//!   cause.
//!
//! Constraints
//! - Single-threaded; `insert` takes `&mut self`, lookups take `&self`.
//! - Buckets sit in a per-directory `SlotMap`. Aliased directory slots hold
//!   copies of the same arena key, so teardown frees each bucket once.
//!
//! Notes and non-goals
//! - No deletion: `remove` reports `Error::Unsupported`.
//! - No persistence and no keys other than `i64`.

pub mod config;
pub mod error;
pub mod eviction;
pub mod hashing;

mod bucket;
mod directory;
mod engine;
mod engine_proptest;
mod stats;
mod table;
mod test_hashers;

// Public surface
pub use config::Config;
pub use engine::{ExtendibleCuckoo, Keys};
pub use error::{Error, Result};
pub use eviction::{EvictionPolicy, FirstSlot, RandomSlot};
pub use hashing::KeyHasher;
pub use stats::{Dump, Stats};
pub use table::{TableId, TableStats};
