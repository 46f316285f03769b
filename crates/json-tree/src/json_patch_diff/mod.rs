//! JSON patch diff: generate a [`JsonPatch`] from two document values.
//!
//! The differ descends into containers of the same kind and emits the most
//! specific edit it can: object edits keyed by name, array edits computed
//! with a Myers sequence diff, exact number deltas and character-level
//! string edits. Anything else becomes a `Set`. The resulting patch always
//! applies to `source` under `Strict` mode and yields a value equal to
//! `target`.

use crate::json::{Json, JsonNumber};
use crate::json_patch::types::{ArrayOp, JsonPatch, ObjectOp, Op, PrimitiveOp, StringOp};
use crate::util_inner::diff::myers::{self, Run};

// ── Options ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    /// Emit character-level string edits. When off, a changed string is a
    /// single whole-string `Modify`.
    pub string_edits: bool,
    /// Emit element-level array edits. When off, a changed array is `Set`.
    pub array_edits: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            string_edits: true,
            array_edits: true,
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────

/// Diff with [`DiffOptions::default`].
///
/// ```
/// use json_tree::{Json, JsonPatchMode};
/// use json_tree::json_patch_diff::diff;
///
/// let source = Json::parse(r#"{"name": "ada", "tags": [1, 2], "n": 1}"#).unwrap();
/// let target = Json::parse(r#"{"name": "adam", "tags": [1, 3, 4], "n": 2.5}"#).unwrap();
/// let patch = diff(&source, &target);
/// assert_eq!(patch.apply(&source, JsonPatchMode::Strict).unwrap(), target);
/// assert!(diff(&source, &source).is_empty());
/// ```
pub fn diff(source: &Json, target: &Json) -> JsonPatch {
    diff_with(source, target, &DiffOptions::default())
}

/// Computes a patch from `source` to `target` under `options`.
pub fn diff_with(source: &Json, target: &Json, options: &DiffOptions) -> JsonPatch {
    match diff_op(source, target, options) {
        Some(op) => {
            tracing::trace!(op = op.op_name(), "diff produced a root operation");
            JsonPatch::root(op)
        }
        None => {
            tracing::trace!("diff found equal documents");
            JsonPatch::empty()
        }
    }
}

/// The operation turning `source` into `target`, or `None` if they are
/// equal.
pub fn diff_op(source: &Json, target: &Json, options: &DiffOptions) -> Option<Op> {
    if source == target {
        return None;
    }
    let op = match (source, target) {
        (Json::Object(s), Json::Object(t)) => diff_obj(s, t, options),
        (Json::Array(s), Json::Array(t)) if options.array_edits => diff_arr(s, t, options),
        (Json::Number(s), Json::Number(t)) => {
            diff_num(s, t).unwrap_or_else(|| Op::Set(target.clone()))
        }
        (Json::String(s), Json::String(t)) => diff_str(s, t, options),
        _ => Op::Set(target.clone()),
    };
    Some(op)
}

// ── Containers ────────────────────────────────────────────────────────────

fn first<'a>(entries: &'a [(String, Json)], key: &str) -> Option<&'a Json> {
    entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

/// Removals, then changes to shared keys, then additions. Each key is
/// considered once, at its first occurrence.
fn diff_obj(source: &[(String, Json)], target: &[(String, Json)], options: &DiffOptions) -> Op {
    let mut edits = Vec::new();
    let mut seen: Vec<&str> = Vec::new();
    for (key, _) in source {
        if seen.contains(&key.as_str()) {
            continue;
        }
        seen.push(key);
        if first(target, key).is_none() {
            edits.push(ObjectOp::Remove { key: key.clone() });
        }
    }
    seen.clear();
    for (key, value) in source {
        if seen.contains(&key.as_str()) {
            continue;
        }
        seen.push(key);
        if let Some(op) = first(target, key).and_then(|t| diff_op(value, t, options)) {
            edits.push(ObjectOp::Modify { key: key.clone(), op });
        }
    }
    seen.clear();
    for (key, value) in target {
        if seen.contains(&key.as_str()) {
            continue;
        }
        seen.push(key);
        if first(source, key).is_none() {
            edits.push(ObjectOp::Add {
                key: key.clone(),
                value: value.clone(),
            });
        }
    }
    Op::ObjectEdit(edits)
}

/// Walks the Myers runs, tracking the index each edit sees in the array as
/// it stands after the edits before it. Within a change block, paired
/// elements are modified in place and the surplus is deleted or inserted.
fn diff_arr(source: &[Json], target: &[Json], options: &DiffOptions) -> Op {
    let mut edits = Vec::new();
    let (mut si, mut ti, mut pos) = (0usize, 0usize, 0usize);
    let mut cur_len = source.len();
    for block in blocks(&myers::diff(source, target)) {
        let (d, i) = match block {
            Block::Equal(n) => {
                si += n;
                ti += n;
                pos += n;
                continue;
            }
            Block::Change { deleted, inserted } => (deleted, inserted),
        };
        let paired = d.min(i);
        for k in 0..paired {
            if let Some(op) = diff_op(&source[si + k], &target[ti + k], options) {
                edits.push(ArrayOp::Modify { index: pos + k, op });
            }
        }
        if d > paired {
            edits.push(ArrayOp::Delete {
                index: pos + paired,
                length: d - paired,
            });
        }
        cur_len -= d - paired;
        if i > paired {
            let values = target[ti + paired..ti + i].to_vec();
            if pos + paired == cur_len {
                edits.push(ArrayOp::Append { values });
            } else {
                edits.push(ArrayOp::Insert {
                    index: pos + paired,
                    values,
                });
            }
            cur_len += i - paired;
        }
        si += d;
        ti += i;
        pos += i;
    }
    Op::ArrayEdit(edits)
}

// ── Primitives ────────────────────────────────────────────────────────────

/// A delta only when adding it back reproduces the target text exactly.
fn diff_num(source: &JsonNumber, target: &JsonNumber) -> Option<Op> {
    let delta = target.checked_sub(source)?;
    let replayed = source.checked_add(&delta)?;
    let exact = replayed.as_str() == target.as_str();
    exact.then_some(Op::PrimitiveDelta(PrimitiveOp::NumberDelta(delta)))
}

fn diff_str(source: &str, target: &str, options: &DiffOptions) -> Op {
    if !options.string_edits {
        return Op::PrimitiveDelta(PrimitiveOp::StringEdit(vec![StringOp::Modify {
            index: 0,
            length: source.chars().count(),
            text: target.to_string(),
        }]));
    }
    let src: Vec<char> = source.chars().collect();
    let dst: Vec<char> = target.chars().collect();
    let mut edits = Vec::new();
    let (mut ti, mut pos) = (0usize, 0usize);
    let mut cur_len = src.len();
    for block in blocks(&myers::diff(&src, &dst)) {
        let (d, i) = match block {
            Block::Equal(n) => {
                ti += n;
                pos += n;
                continue;
            }
            Block::Change { deleted, inserted } => (deleted, inserted),
        };
        let text: String = dst[ti..ti + i].iter().collect();
        let edit = match (d, i) {
            (0, _) if pos == cur_len => StringOp::Append { text },
            (0, _) => StringOp::Insert { index: pos, text },
            (_, 0) => StringOp::Delete { index: pos, length: d },
            _ => StringOp::Modify {
                index: pos,
                length: d,
                text,
            },
        };
        edits.push(edit);
        cur_len = cur_len - d + i;
        ti += i;
        pos += i;
    }
    Op::PrimitiveDelta(PrimitiveOp::StringEdit(edits))
}

// ── Run grouping ──────────────────────────────────────────────────────────

enum Block {
    Equal(usize),
    Change { deleted: usize, inserted: usize },
}

/// Pairs each deletion run with the insertion run that follows it.
fn blocks(runs: &[Run]) -> Vec<Block> {
    let mut out = Vec::new();
    let mut iter = runs.iter().peekable();
    while let Some(run) = iter.next() {
        match *run {
            Run::Equal(n) => out.push(Block::Equal(n)),
            Run::Delete(deleted) => {
                let inserted = match iter.next_if(|next| matches!(next, Run::Insert(_))) {
                    Some(Run::Insert(i)) => *i,
                    _ => 0,
                };
                out.push(Block::Change { deleted, inserted });
            }
            Run::Insert(inserted) => out.push(Block::Change { deleted: 0, inserted }),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_patch::types::JsonPatchMode;
    use serde_json::json;

    fn j(v: serde_json::Value) -> Json {
        Json::from(v)
    }

    fn roundtrip(a: serde_json::Value, b: serde_json::Value) -> JsonPatch {
        let (a, b) = (j(a), j(b));
        let patch = diff(&a, &b);
        assert_eq!(patch.apply(&a, JsonPatchMode::Strict).unwrap(), b);
        patch
    }

    fn root_op(patch: &JsonPatch) -> &Op {
        &patch.ops()[0].op
    }

    #[test]
    fn equal_values_give_empty_patch() {
        let nested = j(json!({"a": [1, {"b": null}]}));
        assert!(diff(&nested, &nested.clone()).is_empty());
        assert!(diff(&j(json!({"a": 1, "b": 2})), &j(json!({"b": 2, "a": 1}))).is_empty());
        assert!(diff(&j(json!(1.0)), &j(json!(1))).is_empty());
    }

    #[test]
    fn object_edits_are_grouped() {
        let patch = roundtrip(json!({"a": 1, "b": 2, "c": 3}), json!({"a": 1, "b": 5, "d": 4}));
        let Op::ObjectEdit(edits) = root_op(&patch) else {
            panic!("expected object edit");
        };
        let names: Vec<&str> = edits.iter().map(|e| e.op_name()).collect();
        assert_eq!(names, ["remove", "modify", "add"]);
    }

    #[test]
    fn number_changes_are_deltas() {
        let patch = roundtrip(json!(10), json!(7));
        assert_eq!(
            root_op(&patch),
            &Op::PrimitiveDelta(PrimitiveOp::NumberDelta(JsonNumber::from(-3)))
        );
    }

    #[test]
    fn inexact_number_changes_fall_back_to_set() {
        let patch = roundtrip(json!(1.5), json!(2));
        assert_eq!(root_op(&patch), &Op::Set(Json::from(2)));
    }

    #[test]
    fn string_edits_are_character_level() {
        let patch = roundtrip(json!("hello"), json!("hello world"));
        assert_eq!(
            root_op(&patch),
            &Op::PrimitiveDelta(PrimitiveOp::StringEdit(vec![StringOp::Append {
                text: " world".into(),
            }]))
        );
        let patch = roundtrip(json!("hello world"), json!("hello"));
        assert_eq!(
            root_op(&patch),
            &Op::PrimitiveDelta(PrimitiveOp::StringEdit(vec![StringOp::Delete {
                index: 5,
                length: 6,
            }]))
        );
        roundtrip(json!("kitten"), json!("sitting"));
        roundtrip(json!("\u{e9}t\u{e9}"), json!("\u{e9}tait"));
    }

    #[test]
    fn whole_string_modify_when_string_edits_are_off() {
        let options = DiffOptions {
            string_edits: false,
            ..DiffOptions::default()
        };
        let patch = diff_with(&j(json!("abc")), &j(json!("abd")), &options);
        assert_eq!(
            root_op(&patch),
            &Op::PrimitiveDelta(PrimitiveOp::StringEdit(vec![StringOp::Modify {
                index: 0,
                length: 3,
                text: "abd".into(),
            }]))
        );
    }

    #[test]
    fn array_edits_track_shifting_indices() {
        roundtrip(json!([1, 2, 3]), json!([1, 3]));
        roundtrip(json!([1, 2]), json!([1, 2, 3, 4]));
        roundtrip(json!([1, 2, 3]), json!([0, 1, 2, 3]));
        roundtrip(json!([1, 2, 3, 4, 5]), json!([9, 2, 8, 8, 4]));
        roundtrip(json!([{"a": 1}, {"b": 2}]), json!([{"a": 2}, {"b": 2}, {"c": 3}]));
        roundtrip(json!([]), json!([[1], [2]]));
    }

    #[test]
    fn arrays_are_set_when_array_edits_are_off() {
        let options = DiffOptions {
            array_edits: false,
            ..DiffOptions::default()
        };
        let patch = diff_with(&j(json!([1])), &j(json!([2])), &options);
        assert_eq!(root_op(&patch), &Op::Set(j(json!([2]))));
    }

    #[test]
    fn type_changes_are_set() {
        let patch = roundtrip(json!({"a": 1}), json!([1]));
        assert_eq!(root_op(&patch), &Op::Set(j(json!([1]))));
        roundtrip(json!({"a": true}), json!({"a": null}));
    }

    #[test]
    fn duplicate_keys_use_first_occurrence() {
        let source = Json::Object(vec![("a".into(), Json::from(1)), ("a".into(), Json::from(2))]);
        let target = j(json!({"a": 3}));
        let patch = diff(&source, &target);
        assert_eq!(patch.apply(&source, JsonPatchMode::Strict).unwrap(), target);
    }
}
