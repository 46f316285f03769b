//! Equality, hashing and total ordering of `Json`.
//!
//! Kinds order as `Null < Boolean < Number < String < Array < Object`.
//! Arrays compare element-wise, a proper prefix sorting first. Objects are
//! compared in canonical form: the first occurrence of each key, sorted by
//! key. Two objects holding the same pairs in any order are equal and hash
//! alike.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use super::Json;

/// The entries that take part in comparison: first occurrence per key,
/// sorted by key.
pub(crate) fn canonical_entries(entries: &[(String, Json)]) -> Vec<(&str, &Json)> {
    let mut out: Vec<(&str, &Json)> = entries.iter().map(|(k, v)| (k.as_str(), v)).collect();
    // Stable: among equal keys the first occurrence stays in front.
    out.sort_by(|a, b| a.0.cmp(b.0));
    out.dedup_by(|later, earlier| later.0 == earlier.0);
    out
}

fn compare_objects(a: &[(String, Json)], b: &[(String, Json)]) -> Ordering {
    let a = canonical_entries(a);
    let b = canonical_entries(b);
    a.iter()
        .map(|(k, _)| k)
        .cmp(b.iter().map(|(k, _)| k))
        .then_with(|| a.iter().map(|(_, v)| v).cmp(b.iter().map(|(_, v)| v)))
}

impl Ord for Json {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Json::Null, Json::Null) => Ordering::Equal,
            (Json::Boolean(a), Json::Boolean(b)) => a.cmp(b),
            (Json::Number(a), Json::Number(b)) => a.cmp(b),
            (Json::String(a), Json::String(b)) => a.cmp(b),
            (Json::Array(a), Json::Array(b)) => a.cmp(b),
            (Json::Object(a), Json::Object(b)) => compare_objects(a, b),
            _ => self.json_type().cmp(&other.json_type()),
        }
    }
}

impl PartialOrd for Json {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Json {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Json::Null, Json::Null) => true,
            (Json::Boolean(a), Json::Boolean(b)) => a == b,
            (Json::Number(a), Json::Number(b)) => a == b,
            (Json::String(a), Json::String(b)) => a == b,
            (Json::Array(a), Json::Array(b)) => a == b,
            (Json::Object(a), Json::Object(b)) => canonical_entries(a) == canonical_entries(b),
            _ => false,
        }
    }
}

impl Eq for Json {}

impl Hash for Json {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.json_type().hash(state);
        match self {
            Json::Null => {}
            Json::Boolean(b) => b.hash(state),
            Json::Number(n) => n.hash(state),
            Json::String(s) => s.hash(state),
            Json::Array(items) => items.hash(state),
            Json::Object(entries) => canonical_entries(entries).hash(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(v: &Json) -> u64 {
        let mut h = DefaultHasher::new();
        v.hash(&mut h);
        h.finish()
    }

    #[test]
    fn object_equality_ignores_order() {
        let a = Json::object([("a", Json::from(1)), ("b", Json::from(2))]);
        let b = Json::object([("b", Json::from(2)), ("a", Json::from(1))]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn array_equality_is_positional() {
        assert_ne!(Json::from(json!([1, 2])), Json::from(json!([2, 1])));
    }

    #[test]
    fn duplicate_keys_compare_by_first_occurrence() {
        let dup = Json::object([("a", Json::from(1)), ("a", Json::from(2))]);
        assert_eq!(dup, Json::object([("a", Json::from(1))]));
        assert_ne!(dup, Json::object([("a", Json::from(2))]));
    }

    #[test]
    fn kinds_are_totally_ordered() {
        let ladder = [json!(null), json!(false), json!(0), json!(""), json!([]), json!({})];
        for pair in ladder.windows(2) {
            assert!(Json::from(pair[0].clone()) < Json::from(pair[1].clone()));
        }
    }

    #[test]
    fn shorter_array_prefix_sorts_first() {
        assert!(Json::from(json!([1, 2])) < Json::from(json!([1, 2, 0])));
        assert!(Json::from(json!([1, 3])) > Json::from(json!([1, 2, 0])));
    }

    #[test]
    fn objects_compare_by_sorted_keys_then_values() {
        assert!(Json::from(json!({"a": 9})) < Json::from(json!({"b": 0})));
        assert!(Json::from(json!({"b": 1, "a": 1})) < Json::from(json!({"a": 1, "b": 2})));
    }

    #[test]
    fn numbers_compare_numerically() {
        assert_eq!(Json::from(json!(1.0)), Json::from(json!(1)));
        assert!(Json::from(json!(2)) < Json::from(json!(10)));
    }
}
