#![cfg(test)]

// Property tests for ExtendibleCuckoo kept inside the crate so they can check
// directory and bucket invariants that are not part of the public API.

use crate::config::Config;
use crate::engine::ExtendibleCuckoo;
use crate::eviction::{EvictionPolicy, RandomSlot};
use crate::hashing::KeyHasher;
use crate::test_hashers::{MulBuildHasher, ShiftBuildHasher};
use proptest::prelude::*;
use std::collections::BTreeSet;

#[derive(Clone, Debug)]
enum Op {
    Insert(i64),
    Contains(i64),
    Iterate,
}

// Small key ranges make duplicates, collisions and splits common; the wide
// range exercises well-spread keys.
fn arb_key() -> impl Strategy<Value = i64> {
    prop_oneof![0i64..64, -512i64..512, any::<i64>()]
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        4 => arb_key().prop_map(Op::Insert),
        2 => arb_key().prop_map(Op::Contains),
        1 => Just(Op::Iterate),
    ];
    proptest::collection::vec(op, 1..200)
}

// Drive `sut` and a BTreeSet model through `ops`. After every operation:
// - `contains` agrees with the model for the touched key;
// - `len` matches the model;
// - every bucket is within capacity, the directory aliasing invariant holds,
//   each key sits where its table's hash addresses it, and no key is stored
//   in both tables or twice in one.
fn run_model<S1, S2, E>(
    mut sut: ExtendibleCuckoo<S1, S2, E>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    S1: KeyHasher,
    S2: KeyHasher,
    E: EvictionPolicy,
{
    let mut model: BTreeSet<i64> = BTreeSet::new();
    for op in ops {
        match op {
            Op::Insert(k) => {
                let fresh = !model.contains(&k);
                let before = sut.stats();
                let inserted = sut.insert(k).expect("insert within depth limit");
                prop_assert_eq!(inserted, fresh, "insert result for {}", k);
                if fresh {
                    model.insert(k);
                } else {
                    prop_assert_eq!(sut.stats(), before, "duplicate insert changed state");
                }
                prop_assert!(sut.contains(k));
            }
            Op::Contains(k) => {
                prop_assert_eq!(sut.contains(k), model.contains(&k));
            }
            Op::Iterate => {
                let keys: BTreeSet<i64> = sut.iter().collect();
                prop_assert_eq!(&keys, &model);
            }
        }
        prop_assert_eq!(sut.len(), model.len());
        sut.assert_invariants();
    }
    for &k in &model {
        prop_assert!(sut.contains(k));
    }
    Ok(())
}

// Keys crowd a handful of hash classes under a shallow depth limit, so
// inserts fail often, through cycle splits and forced splits alike. A failed
// insert must name its own key and leave every stored key in place.
fn run_failing_inserts<E: EvictionPolicy>(
    mut sut: ExtendibleCuckoo<ShiftBuildHasher, ShiftBuildHasher, E>,
    keys: Vec<i64>,
) -> Result<(), TestCaseError> {
    let mut model: BTreeSet<i64> = BTreeSet::new();
    for k in keys {
        match sut.insert(k) {
            Ok(fresh) => {
                prop_assert_eq!(fresh, model.insert(k));
            }
            Err(err) => {
                prop_assert_eq!(err.unplaced_key(), Some(k));
                prop_assert!(!model.contains(&k));
                prop_assert!(!sut.contains(k));
            }
        }
        prop_assert_eq!(sut.len(), model.len());
        for &stored in &model {
            prop_assert!(sut.contains(stored), "lost {} after inserting {}", stored, k);
        }
        sut.assert_invariants();
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_single_key_buckets(ops in arb_ops()) {
        run_model(ExtendibleCuckoo::new(), ops)?;
    }

    #[test]
    fn prop_multi_key_buckets(capacity in 2usize..=6, ops in arb_ops()) {
        run_model(ExtendibleCuckoo::with_bucket_capacity(capacity).unwrap(), ops)?;
    }

    // Weak hashes: h1 is the key itself and h2 an odd multiple of it, so small
    // keys crowd the shallow buckets of both tables and force deep splits.
    #[test]
    fn prop_correlated_hashes(
        capacity in 1usize..=4,
        factor in proptest::sample::select(vec![3u64, 5, 0x9e37_79b9_7f4a_7c15]),
        ops in arb_ops(),
    ) {
        let sut = ExtendibleCuckoo::with_hashers(
            Config::default().with_bucket_capacity(capacity),
            ShiftBuildHasher(0),
            MulBuildHasher(factor),
        ).unwrap();
        run_model(sut, ops)?;
    }

    #[test]
    fn prop_random_eviction(capacity in 1usize..=4, seed in any::<u64>(), ops in arb_ops()) {
        let sut = ExtendibleCuckoo::with_hashers_and_policy(
            Config::default().with_bucket_capacity(capacity).with_max_displacements(16),
            crate::hashing::default_h1(),
            crate::hashing::default_h2(),
            RandomSlot::seeded(seed),
        ).unwrap();
        run_model(sut, ops)?;
    }

    #[test]
    fn prop_failed_inserts_keep_stored_keys(
        capacity in 1usize..=3,
        max_depth in 0u32..=3,
        max_displacements in 1usize..=4,
        seed in any::<u64>(),
        keys in proptest::collection::vec(0i64..256, 1..120),
    ) {
        let config = Config::default()
            .with_bucket_capacity(capacity)
            .with_max_depth(max_depth)
            .with_max_displacements(max_displacements);
        // Shifting away the low bits leaves 4 classes per table at most.
        let sut = ExtendibleCuckoo::with_hashers_and_policy(
            config,
            ShiftBuildHasher(6),
            ShiftBuildHasher(6),
            RandomSlot::seeded(seed),
        ).unwrap();
        run_failing_inserts(sut, keys)?;
    }
}
