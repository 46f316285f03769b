mod common;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use common::{json, json_unique_keys};
use json_tree::{Json, MergeStrategy};
use proptest::prelude::*;

fn hash_of(value: &Json) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Reverses the pair order of every object.
fn reverse_keys(value: &Json) -> Json {
    value.transform_up(|_, v| match v {
        Json::Object(entries) => Json::Object(entries.iter().rev().cloned().collect()),
        other => other.clone(),
    })
}

proptest! {
    #[test]
    fn key_order_does_not_affect_equality_or_hash(a in json_unique_keys()) {
        let b = reverse_keys(&a);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(hash_of(&a), hash_of(&b));
        prop_assert_eq!(a.cmp(&b), std::cmp::Ordering::Equal);
    }

    #[test]
    fn kv_flattening_roundtrips(a in json_unique_keys()) {
        prop_assert_eq!(Json::from_kv(a.to_kv())?, a);
    }

    #[test]
    fn text_roundtrips(a in json_unique_keys()) {
        prop_assert_eq!(Json::parse(&a.to_string())?, a.clone());
        prop_assert_eq!(Json::parse(&a.to_string_pretty())?, a);
    }

    #[test]
    fn merge_with_self_is_identity(a in json()) {
        prop_assert_eq!(a.merge(&a), a.clone());
        prop_assert_eq!(a.merge_with(&a, &MergeStrategy::Shallow), a);
    }

    #[test]
    fn partition_splits_leaves(a in json()) {
        let (numbers, rest) = a.partition(Json::is_number);
        let count = |v: &Json| v.query(Json::is_number).size();
        prop_assert_eq!(count(&numbers), count(&a));
        prop_assert_eq!(count(&rest), 0);
    }

    #[test]
    fn sort_keys_preserves_value(a in json()) {
        prop_assert_eq!(a.sort_keys(), a);
    }

    #[test]
    fn dynamic_value_roundtrip(a in json()) {
        prop_assert_eq!(Json::from_dynamic_value(&a.to_dynamic_value()), a);
    }
}
