//! Shared `proptest` strategies for random `Json` trees.

#![allow(dead_code)]

use json_tree::Json;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Small alphabets keep unrelated trees close enough that diffs exercise
/// the finer edit kinds.
fn leaf() -> impl Strategy<Value = Json> {
    prop_oneof![
        Just(Json::Null),
        any::<bool>().prop_map(Json::from),
        (-1000i64..1000).prop_map(Json::from),
        (-100_000i64..100_000, 0u32..4).prop_map(|(m, scale)| Json::from(Decimal::new(m, scale))),
        "[abc\u{e9}]{0,6}".prop_map(Json::from),
    ]
}

fn key() -> impl Strategy<Value = String> {
    "[a-d]"
}

/// Trees whose objects may repeat a key.
pub fn json() -> impl Strategy<Value = Json> {
    leaf().prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Json::Array),
            prop::collection::vec((key(), inner), 0..5).prop_map(Json::Object),
        ]
    })
}

/// Trees whose objects never repeat a key.
pub fn json_unique_keys() -> impl Strategy<Value = Json> {
    leaf().prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Json::Array),
            prop::collection::btree_map(key(), inner, 0..5)
                .prop_map(|m| Json::Object(m.into_iter().collect())),
        ]
    })
}

pub fn j(v: serde_json::Value) -> Json {
    Json::from(v)
}
