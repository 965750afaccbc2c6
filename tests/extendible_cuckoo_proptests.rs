// ExtendibleCuckoo property tests through the public API.
//
// Property 1: membership matches a BTreeSet model.
//  - Operations: insert (fresh or duplicate), lookup of inserted and
//    never-inserted keys.
//  - Invariant: insert returns true iff the key was absent; contains(k)
//    matches the model; len() matches the model; iter() yields the model.
//
// Property 2: re-inserting everything changes nothing.
//  - Invariant: a second pass of inserts returns false for every key and
//    leaves stats() identical.
use extendible_cuckoo::{Config, ExtendibleCuckoo};
use proptest::prelude::*;
use std::collections::BTreeSet;

proptest! {
    #[test]
    fn prop_membership_matches_model(
        capacity in 1usize..=5,
        inserts in proptest::collection::vec(any::<i64>(), 1..300),
        probes in proptest::collection::vec(any::<i64>(), 0..300),
    ) {
        let mut m = ExtendibleCuckoo::with_config(
            Config::default().with_bucket_capacity(capacity),
        ).unwrap();
        let mut model = BTreeSet::new();
        for k in inserts {
            let fresh = model.insert(k);
            prop_assert_eq!(m.insert(k), Ok(fresh));
        }
        prop_assert_eq!(m.len(), model.len());
        for &k in &model {
            prop_assert!(m.contains(k));
        }
        for k in probes {
            prop_assert_eq!(m.contains(k), model.contains(&k));
        }
        let keys: BTreeSet<i64> = m.iter().collect();
        prop_assert_eq!(keys, model);
    }

    #[test]
    fn prop_reinsert_is_noop(
        capacity in 1usize..=5,
        keys in proptest::collection::btree_set(-2_000i64..2_000, 1..400),
    ) {
        let mut m = ExtendibleCuckoo::with_bucket_capacity(capacity).unwrap();
        for &k in &keys {
            prop_assert_eq!(m.insert(k), Ok(true));
        }
        let before = m.stats();
        for &k in &keys {
            prop_assert_eq!(m.insert(k), Ok(false));
        }
        prop_assert_eq!(m.stats(), before);
        prop_assert_eq!(before.keys(), keys.len());
    }
}
