//! Property tests for the erasure coding pipeline.

use proptest::collection::vec;
use proptest::prelude::*;
use proptest::sample::subsequence;

use stripecode_core::{Erasure, ErasureError, ShardData};

fn as_slots(shards: Vec<ShardData>) -> Vec<Option<ShardData>> {
    shards.into_iter().map(Some).collect()
}

/// Valid `(k, m)` pairs kept small enough to exercise many shapes quickly.
fn params() -> impl Strategy<Value = (usize, usize)> {
    (1usize..=12, 1usize..=6)
}

proptest! {
    #[test]
    fn roundtrip(
        (k, m) in params(),
        data in vec(any::<u8>(), 1..2048),
    ) {
        let erasure = Erasure::new(k, m).unwrap();
        let shards = erasure.encode(&data).unwrap();
        prop_assert_eq!(shards.len(), k + m);

        let decoded = erasure.decode(&as_slots(shards), data.len()).unwrap();
        prop_assert_eq!(decoded.as_ref(), data.as_slice());
    }

    #[test]
    fn fault_tolerance_within_limit(
        (k, m) in params(),
        data in vec(any::<u8>(), 1..1024),
        selector in vec(any::<prop::sample::Index>(), 0..6),
    ) {
        let erasure = Erasure::new(k, m).unwrap();
        let shards = erasure.encode(&data).unwrap();

        // Drop up to m distinct shards chosen by the selector indices.
        let mut slots = as_slots(shards);
        let mut dropped = std::collections::HashSet::new();
        for index in selector.iter().take(m) {
            dropped.insert(index.index(k + m));
        }
        for &i in &dropped {
            slots[i] = None;
        }

        let decoded = erasure.decode(&slots, data.len()).unwrap();
        prop_assert_eq!(decoded.as_ref(), data.as_slice());
    }

    #[test]
    fn fault_limit_exceeded(
        (k, m) in params(),
        data in vec(any::<u8>(), 1..256),
    ) {
        let erasure = Erasure::new(k, m).unwrap();
        let shards = erasure.encode(&data).unwrap();

        let mut slots = as_slots(shards);
        for slot in slots.iter_mut().take(m + 1) {
            *slot = None;
        }

        prop_assert_eq!(
            erasure.decode(&slots, data.len()),
            Err(ErasureError::TooManyShardsMissing { missing: m + 1, max: m })
        );
    }

    #[test]
    fn encode_is_deterministic(
        (k, m) in params(),
        data in vec(any::<u8>(), 1..512),
    ) {
        let erasure = Erasure::new(k, m).unwrap();
        prop_assert_eq!(erasure.encode(&data), erasure.encode(&data));
    }

    #[test]
    fn data_shards_are_systematic(
        (k, m) in params(),
        data in vec(any::<u8>(), 1..512),
    ) {
        let erasure = Erasure::new(k, m).unwrap();
        let shards = erasure.encode(&data).unwrap();

        let mut rebuilt = Vec::new();
        for s in &shards[..k] {
            rebuilt.extend_from_slice(&s.data);
        }
        prop_assert_eq!(&rebuilt[..data.len()], data.as_slice());
        prop_assert!(rebuilt[data.len()..].iter().all(|&b| b == 0));
    }

    #[test]
    fn decode_from_any_k_subset(
        data in vec(any::<u8>(), 1..512),
        keep in subsequence((0..8usize).collect::<Vec<_>>(), 5),
    ) {
        // (5, 3): any 5 of the 8 shards suffice.
        let erasure = Erasure::new(5, 3).unwrap();
        let shards = erasure.encode(&data).unwrap();

        let mut slots = as_slots(shards);
        for i in 0..8 {
            if !keep.contains(&i) {
                slots[i] = None;
            }
        }

        let decoded = erasure.decode(&slots, data.len()).unwrap();
        prop_assert_eq!(decoded.as_ref(), data.as_slice());
    }
}
