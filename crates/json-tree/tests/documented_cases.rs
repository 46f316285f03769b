mod common;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use common::j;
use json_tree::{
    ArrayOp, Json, JsonPatch, JsonPatchMode, JsonSelection, MergeStrategy, ObjectOp, Op, Path,
    PathNode, PrimitiveOp, StringOp,
};
use serde_json::json;

fn strict(patch: &JsonPatch, doc: serde_json::Value) -> Json {
    patch.apply(&j(doc), JsonPatchMode::Strict).unwrap()
}

fn hash_of(value: &Json) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn path(text: &str) -> Path {
    text.parse().unwrap()
}

// ── Equality ──────────────────────────────────────────────────────────────

#[test]
fn objects_ignore_key_order() {
    let ab = Json::Object(vec![("a".into(), Json::from(1)), ("b".into(), Json::from(2))]);
    let ba = Json::Object(vec![("b".into(), Json::from(2)), ("a".into(), Json::from(1))]);
    assert_eq!(ab, ba);
    assert_eq!(hash_of(&ab), hash_of(&ba));
}

#[test]
fn arrays_respect_order() {
    assert_ne!(j(json!([1, 2])), j(json!([2, 1])));
}

// ── Merge ─────────────────────────────────────────────────────────────────

#[test]
fn merge_strategies() {
    let left = j(json!({"a": {"x": 1}}));
    let right = j(json!({"a": {"y": 2}}));
    assert_eq!(left.merge_with(&right, &MergeStrategy::Auto), j(json!({"a": {"x": 1, "y": 2}})));
    assert_eq!(left.merge_with(&right, &MergeStrategy::Shallow), j(json!({"a": {"y": 2}})));

    let (l, r) = (j(json!([1, 2])), j(json!([3, 4])));
    assert_eq!(l.merge_with(&r, &MergeStrategy::Concat), j(json!([1, 2, 3, 4])));
    assert_eq!(l.merge_with(&r, &MergeStrategy::Auto), j(json!([3, 4])));
}

// ── Patch modes ───────────────────────────────────────────────────────────

#[test]
fn set_on_missing_field() {
    let doc = j(json!({"a": 1}));
    let patch = JsonPatch::single(Path::root().field("missing"), Op::Set(Json::from(42)));
    assert!(patch.apply(&doc, JsonPatchMode::Strict).is_err());
    assert_eq!(patch.apply(&doc, JsonPatchMode::Lenient).unwrap(), doc);
}

#[test]
fn clobber_overwrites_existing_keys() {
    let doc = j(json!({"a": 1}));
    let patch = JsonPatch::root(Op::ObjectEdit(vec![ObjectOp::Add {
        key: "a".into(),
        value: Json::from(100),
    }]));
    assert!(patch.apply(&doc, JsonPatchMode::Strict).is_err());
    assert_eq!(patch.apply(&doc, JsonPatchMode::Clobber).unwrap(), j(json!({"a": 100})));
}

#[test]
fn string_edits() {
    let insert = JsonPatch::root(Op::PrimitiveDelta(PrimitiveOp::StringEdit(vec![StringOp::Insert {
        index: 5,
        text: " world".into(),
    }])));
    assert_eq!(strict(&insert, json!("hello")), j(json!("hello world")));

    let delete = JsonPatch::root(Op::PrimitiveDelta(PrimitiveOp::StringEdit(vec![StringOp::Delete {
        index: 5,
        length: 6,
    }])));
    assert_eq!(strict(&delete, json!("hello world")), j(json!("hello")));
}

#[test]
fn array_edits() {
    let insert = JsonPatch::root(Op::ArrayEdit(vec![ArrayOp::Insert {
        index: 1,
        values: vec![Json::from(10)],
    }]));
    assert_eq!(strict(&insert, json!([1, 2])), j(json!([1, 10, 2])));

    let delete = JsonPatch::root(Op::ArrayEdit(vec![ArrayOp::Delete { index: 1, length: 1 }]));
    assert_eq!(strict(&delete, json!([1, 2, 3])), j(json!([1, 3])));
}

// ── Navigation ────────────────────────────────────────────────────────────

#[test]
fn field_and_elements_selection() {
    let obj = j(json!({"a": 1, "b": 2}));
    let field = Path::new(vec![PathNode::Field("a".into())]);
    assert_eq!(obj.get(&field).values().unwrap(), [Json::from(1)]);
    assert!(j(json!([1])).get(&field).values().unwrap().is_empty());

    let arr = j(json!([1, 2, 3]));
    let all = arr.get(&Path::new(vec![PathNode::Elements]));
    assert_eq!(all.values().unwrap(), [Json::from(1), Json::from(2), Json::from(3)]);
}

#[test]
fn selection_failures_propagate() {
    let doc = j(json!({"users": [{"age": 30}, {"age": "old"}]}));
    let ages = doc.get(&path(".users[*].age"));
    let err = ages.decode_all::<u32>().unwrap_err();
    assert_eq!(err.path, path("[1]"));

    let combined = ages.clone().concat(JsonSelection::fail(err.clone())).map(|v| v.clone());
    assert!(combined.is_failure());
    assert_eq!(ages.numbers().size(), 1);
}

// ── Path edits feed patches ───────────────────────────────────────────────

#[test]
fn edits_and_patches_agree() {
    let doc = j(json!({"team": {"members": [{"name": "a"}, {"name": "b"}]}}));
    let renamed = doc.set(&path(".team.members[*].name"), Json::from("x"));
    let inserted = renamed.insert_or_fail(&path(".team.lead"), Json::from("a")).unwrap();
    let trimmed = inserted.delete(&path(".team.members[0]"));

    let patch = doc.diff(&trimmed);
    assert_eq!(doc.patch(&patch, JsonPatchMode::Strict).unwrap(), trimmed);
    assert_eq!(trimmed, j(json!({"team": {"members": [{"name": "x"}], "lead": "a"}})));
}

#[test]
fn text_roundtrip_keeps_numbers_and_order() {
    let text = r#"{"z":1.50,"a":[100,12345678901234567890123]}"#;
    let doc = Json::parse(text).unwrap();
    assert_eq!(doc.to_string(), text);
}
