//! Core types for the JSON patch module.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use json_tree_path::Path;
use serde::{Deserialize, Serialize};

use crate::error::JsonError;
use crate::json::{Json, JsonNumber};

// ── Mode ──────────────────────────────────────────────────────────────────

/// Failure policy for [`JsonPatch::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonPatchMode {
    /// Any unresolved path, type mismatch or out-of-range edit fails the
    /// whole apply.
    #[default]
    Strict,
    /// Failing operations are skipped; the rest of the patch still applies.
    Lenient,
    /// Like `Strict`, except that `ObjectOp::Add` on an existing key
    /// overwrites it.
    Clobber,
}

impl JsonPatchMode {
    /// The lowercase name used in text and serde.
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonPatchMode::Strict => "strict",
            JsonPatchMode::Lenient => "lenient",
            JsonPatchMode::Clobber => "clobber",
        }
    }
}

impl fmt::Display for JsonPatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JsonPatchMode {
    type Err = JsonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(JsonPatchMode::Strict),
            "lenient" => Ok(JsonPatchMode::Lenient),
            "clobber" => Ok(JsonPatchMode::Clobber),
            other => Err(JsonError::new(format!("unknown patch mode: {other}"))),
        }
    }
}

// ── Operations ────────────────────────────────────────────────────────────

/// Edit of a single character position range. Positions and lengths count
/// Unicode scalar values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringOp {
    Insert { index: usize, text: String },
    Delete { index: usize, length: usize },
    Append { text: String },
    Modify { index: usize, length: usize, text: String },
}

impl StringOp {
    /// The name used by the JSON patch codec.
    pub fn op_name(&self) -> &'static str {
        match self {
            StringOp::Insert { .. } => "insert",
            StringOp::Delete { .. } => "delete",
            StringOp::Append { .. } => "append",
            StringOp::Modify { .. } => "modify",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveOp {
    /// Adds the amount to a number.
    NumberDelta(JsonNumber),
    /// Applies string edits in order.
    StringEdit(Vec<StringOp>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayOp {
    Insert { index: usize, values: Vec<Json> },
    Append { values: Vec<Json> },
    Delete { index: usize, length: usize },
    Modify { index: usize, op: Op },
}

impl ArrayOp {
    pub fn op_name(&self) -> &'static str {
        match self {
            ArrayOp::Insert { .. } => "insert",
            ArrayOp::Append { .. } => "append",
            ArrayOp::Delete { .. } => "delete",
            ArrayOp::Modify { .. } => "modify",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectOp {
    Add { key: String, value: Json },
    Remove { key: String },
    Modify { key: String, op: Op },
}

impl ObjectOp {
    pub fn op_name(&self) -> &'static str {
        match self {
            ObjectOp::Add { .. } => "add",
            ObjectOp::Remove { .. } => "remove",
            ObjectOp::Modify { .. } => "modify",
        }
    }
}

/// What a patch does at one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Set(Json),
    PrimitiveDelta(PrimitiveOp),
    ArrayEdit(Vec<ArrayOp>),
    ObjectEdit(Vec<ObjectOp>),
    /// A whole patch whose paths are relative to this location.
    Nested(JsonPatch),
}

impl Op {
    pub fn op_name(&self) -> &'static str {
        match self {
            Op::Set(_) => "set",
            Op::PrimitiveDelta(PrimitiveOp::NumberDelta(_)) => "number_delta",
            Op::PrimitiveDelta(PrimitiveOp::StringEdit(_)) => "string_edit",
            Op::ArrayEdit(_) => "array_edit",
            Op::ObjectEdit(_) => "object_edit",
            Op::Nested(_) => "nested",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPatchOp {
    pub path: Path,
    pub op: Op,
}

impl JsonPatchOp {
    /// An operation at `path`.
    pub fn new(path: Path, op: Op) -> Self {
        Self { path, op }
    }
}

// ── Patch ─────────────────────────────────────────────────────────────────

/// An ordered edit script. Concatenation (`+`) forms a monoid with
/// [`JsonPatch::empty`] as identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonPatch {
    ops: Vec<JsonPatchOp>,
}

impl JsonPatch {
    /// The patch that changes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A single operation at the root.
    pub fn root(op: Op) -> Self {
        Self::single(Path::root(), op)
    }

    /// A single operation at `path`.
    pub fn single(path: Path, op: Op) -> Self {
        Self {
            ops: vec![JsonPatchOp::new(path, op)],
        }
    }

    /// A patch running `ops` in order.
    pub fn new(ops: Vec<JsonPatchOp>) -> Self {
        Self { ops }
    }

    /// The operations, in application order.
    pub fn ops(&self) -> &[JsonPatchOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<JsonPatchOp> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JsonPatchOp> {
        self.ops.iter()
    }

    /// Appends an operation at `path`.
    pub fn push(&mut self, path: Path, op: Op) {
        self.ops.push(JsonPatchOp::new(path, op));
    }

    /// `self` followed by `other`.
    pub fn concat(mut self, other: JsonPatch) -> JsonPatch {
        self.ops.extend(other.ops);
        self
    }

    /// Applies the operations in order.
    ///
    /// ```
    /// use json_tree::{Json, JsonPatch, JsonPatchMode, Op};
    ///
    /// let patch = JsonPatch::single(".a".parse().unwrap(), Op::Set(Json::from(2)));
    /// let doc = Json::parse(r#"{"a": 1}"#).unwrap();
    /// let patched = patch.apply(&doc, JsonPatchMode::Strict).unwrap();
    /// assert_eq!(patched, Json::parse(r#"{"a": 2}"#).unwrap());
    ///
    /// let miss = JsonPatch::single(".b".parse().unwrap(), Op::Set(Json::from(2)));
    /// assert!(miss.apply(&doc, JsonPatchMode::Strict).is_err());
    /// assert_eq!(miss.apply(&doc, JsonPatchMode::Lenient).unwrap(), doc);
    /// ```
    pub fn apply(&self, doc: &Json, mode: JsonPatchMode) -> Result<Json, JsonError> {
        super::apply::apply_patch(doc, self, mode)
    }

    /// The edit script turning `source` into `target`.
    pub fn diff(source: &Json, target: &Json) -> JsonPatch {
        crate::json_patch_diff::diff(source, target)
    }
}

impl Json {
    /// Shorthand for [`JsonPatch::apply`] on `self`.
    pub fn patch(&self, patch: &JsonPatch, mode: JsonPatchMode) -> Result<Json, JsonError> {
        patch.apply(self, mode)
    }

    /// Shorthand for [`JsonPatch::diff`] from `self` to `target`.
    pub fn diff(&self, target: &Json) -> JsonPatch {
        JsonPatch::diff(self, target)
    }
}

impl Add for JsonPatch {
    type Output = JsonPatch;

    fn add(self, rhs: JsonPatch) -> JsonPatch {
        self.concat(rhs)
    }
}

impl AddAssign for JsonPatch {
    fn add_assign(&mut self, rhs: JsonPatch) {
        self.ops.extend(rhs.ops);
    }
}

impl Sum for JsonPatch {
    fn sum<I: Iterator<Item = JsonPatch>>(iter: I) -> Self {
        iter.fold(JsonPatch::empty(), Add::add)
    }
}

impl Extend<JsonPatchOp> for JsonPatch {
    fn extend<I: IntoIterator<Item = JsonPatchOp>>(&mut self, iter: I) {
        self.ops.extend(iter);
    }
}

impl FromIterator<JsonPatchOp> for JsonPatch {
    fn from_iter<I: IntoIterator<Item = JsonPatchOp>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for JsonPatch {
    type Item = JsonPatchOp;
    type IntoIter = std::vec::IntoIter<JsonPatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<'a> IntoIterator for &'a JsonPatch {
    type Item = &'a JsonPatchOp;
    type IntoIter = std::slice::Iter<'a, JsonPatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(path: &str, n: i64) -> JsonPatch {
        JsonPatch::single(path.parse().unwrap(), Op::Set(Json::from(n)))
    }

    #[test]
    fn mode_text_roundtrip() {
        for mode in [JsonPatchMode::Strict, JsonPatchMode::Lenient, JsonPatchMode::Clobber] {
            assert_eq!(mode.to_string().parse::<JsonPatchMode>().unwrap(), mode);
        }
        assert!("loose".parse::<JsonPatchMode>().is_err());
        assert_eq!(JsonPatchMode::default(), JsonPatchMode::Strict);
    }

    #[test]
    fn mode_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&JsonPatchMode::Clobber).unwrap(), "\"clobber\"");
        let mode: JsonPatchMode = serde_json::from_str("\"lenient\"").unwrap();
        assert_eq!(mode, JsonPatchMode::Lenient);
    }

    #[test]
    fn empty_is_identity_of_concat() {
        let p = set(".a", 1) + set(".b", 2);
        assert_eq!(JsonPatch::empty() + p.clone(), p);
        assert_eq!(p.clone() + JsonPatch::empty(), p);
        assert!(JsonPatch::empty().is_empty());
    }

    #[test]
    fn concat_is_associative() {
        let (a, b, c) = (set(".a", 1), set(".b", 2), set(".c", 3));
        assert_eq!((a.clone() + b.clone()) + c.clone(), a + (b + c));
    }

    #[test]
    fn collection_helpers() {
        let total: JsonPatch = vec![set(".a", 1), set(".b", 2)].into_iter().sum();
        assert_eq!(total.len(), 2);
        let names: Vec<&str> = total.iter().map(|op| op.op.op_name()).collect();
        assert_eq!(names, ["set", "set"]);

        let mut grown = JsonPatch::empty();
        grown.extend(total.clone());
        grown += set(".c", 3);
        assert_eq!(grown.len(), 3);
        let rebuilt: JsonPatch = grown.clone().into_iter().collect();
        assert_eq!(rebuilt, grown);
    }
}
