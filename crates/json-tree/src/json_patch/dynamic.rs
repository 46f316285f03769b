//! Conversion between [`JsonPatch`] and the generic [`DynamicPatch`] model.
//!
//! A `DynamicPatch` describes edits over [`DynamicValue`] trees, so it can
//! also carry patches for typed records. Converting a `JsonPatch` there and
//! back yields a patch that applies with the same result.

use json_tree_path::Path;

use super::types::{ArrayOp, JsonPatch, JsonPatchOp, ObjectOp, Op, PrimitiveOp, StringOp};
use crate::error::JsonError;
use crate::json::{DynamicValue, Json, JsonNumber, PrimitiveValue};

// ── Types ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicPatch {
    pub ops: Vec<DynamicPatchOp>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DynamicPatchOp {
    pub path: Path,
    pub operation: DynamicOperation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DynamicOperation {
    Set(DynamicValue),
    PrimitiveDelta(DynamicPrimitiveOp),
    SequenceEdit(Vec<SeqOp>),
    MapEdit(Vec<MapOp>),
    Patch(DynamicPatch),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DynamicPrimitiveOp {
    IntDelta(i32),
    LongDelta(i64),
    DoubleDelta(f64),
    BigDecimalDelta(JsonNumber),
    StringEdit(Vec<StringOp>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeqOp {
    Insert { index: usize, values: Vec<DynamicValue> },
    Append { values: Vec<DynamicValue> },
    Delete { index: usize, length: usize },
    Modify { index: usize, op: DynamicOperation },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapOp {
    Add { key: DynamicValue, value: DynamicValue },
    Remove { key: DynamicValue },
    Modify { key: DynamicValue, op: DynamicOperation },
}

// ── JsonPatch -> DynamicPatch ─────────────────────────────────────────────

impl JsonPatch {
    pub fn to_dynamic_patch(&self) -> DynamicPatch {
        DynamicPatch {
            ops: self
                .iter()
                .map(|entry| DynamicPatchOp {
                    path: entry.path.clone(),
                    operation: to_operation(&entry.op),
                })
                .collect(),
        }
    }

    /// Fails on map keys that are not strings and on non-finite double
    /// deltas.
    ///
    /// ```
    /// use json_tree::{Json, JsonPatch, JsonPatchMode};
    ///
    /// let source = Json::parse(r#"{"a": [1, 2], "b": "x"}"#).unwrap();
    /// let target = Json::parse(r#"{"a": [1, 3], "c": "x"}"#).unwrap();
    /// let patch = source.diff(&target);
    /// let back = JsonPatch::from_dynamic_patch(&patch.to_dynamic_patch()).unwrap();
    /// assert_eq!(back.apply(&source, JsonPatchMode::Strict).unwrap(), target);
    /// ```
    pub fn from_dynamic_patch(patch: &DynamicPatch) -> Result<JsonPatch, JsonError> {
        patch
            .ops
            .iter()
            .map(|entry| {
                let op = from_operation(&entry.operation).map_err(|e| prefix(e, &entry.path))?;
                Ok(JsonPatchOp::new(entry.path.clone(), op))
            })
            .collect()
    }
}

fn to_operation(op: &Op) -> DynamicOperation {
    match op {
        Op::Set(value) => DynamicOperation::Set(value.to_dynamic_value()),
        Op::PrimitiveDelta(PrimitiveOp::NumberDelta(n)) => {
            let delta = if let Some(i) = n.as_i32() {
                DynamicPrimitiveOp::IntDelta(i)
            } else if let Some(l) = n.as_i64() {
                DynamicPrimitiveOp::LongDelta(l)
            } else {
                DynamicPrimitiveOp::BigDecimalDelta(n.clone())
            };
            DynamicOperation::PrimitiveDelta(delta)
        }
        Op::PrimitiveDelta(PrimitiveOp::StringEdit(edits)) => {
            DynamicOperation::PrimitiveDelta(DynamicPrimitiveOp::StringEdit(edits.clone()))
        }
        Op::ArrayEdit(edits) => DynamicOperation::SequenceEdit(
            edits
                .iter()
                .map(|edit| match edit {
                    ArrayOp::Insert { index, values } => SeqOp::Insert {
                        index: *index,
                        values: values.iter().map(Json::to_dynamic_value).collect(),
                    },
                    ArrayOp::Append { values } => SeqOp::Append {
                        values: values.iter().map(Json::to_dynamic_value).collect(),
                    },
                    ArrayOp::Delete { index, length } => SeqOp::Delete {
                        index: *index,
                        length: *length,
                    },
                    ArrayOp::Modify { index, op } => SeqOp::Modify {
                        index: *index,
                        op: to_operation(op),
                    },
                })
                .collect(),
        ),
        Op::ObjectEdit(edits) => DynamicOperation::MapEdit(
            edits
                .iter()
                .map(|edit| match edit {
                    ObjectOp::Add { key, value } => MapOp::Add {
                        key: DynamicValue::string(key.as_str()),
                        value: value.to_dynamic_value(),
                    },
                    ObjectOp::Remove { key } => MapOp::Remove {
                        key: DynamicValue::string(key.as_str()),
                    },
                    ObjectOp::Modify { key, op } => MapOp::Modify {
                        key: DynamicValue::string(key.as_str()),
                        op: to_operation(op),
                    },
                })
                .collect(),
        ),
        Op::Nested(patch) => DynamicOperation::Patch(patch.to_dynamic_patch()),
    }
}

// ── DynamicPatch -> JsonPatch ─────────────────────────────────────────────

fn from_operation(op: &DynamicOperation) -> Result<Op, JsonError> {
    let op = match op {
        DynamicOperation::Set(value) => Op::Set(Json::from_dynamic_value(value)),
        DynamicOperation::PrimitiveDelta(delta) => Op::PrimitiveDelta(match delta {
            DynamicPrimitiveOp::IntDelta(i) => PrimitiveOp::NumberDelta(JsonNumber::from(*i)),
            DynamicPrimitiveOp::LongDelta(l) => PrimitiveOp::NumberDelta(JsonNumber::from(*l)),
            DynamicPrimitiveOp::DoubleDelta(d) => {
                let amount = JsonNumber::try_from(*d)
                    .map_err(|_| JsonError::new(format!("double delta {d} is not finite")))?;
                PrimitiveOp::NumberDelta(amount)
            }
            DynamicPrimitiveOp::BigDecimalDelta(n) => PrimitiveOp::NumberDelta(n.clone()),
            DynamicPrimitiveOp::StringEdit(edits) => PrimitiveOp::StringEdit(edits.clone()),
        }),
        DynamicOperation::SequenceEdit(edits) => Op::ArrayEdit(
            edits
                .iter()
                .map(|edit| {
                    Ok(match edit {
                        SeqOp::Insert { index, values } => ArrayOp::Insert {
                            index: *index,
                            values: values.iter().map(Json::from_dynamic_value).collect(),
                        },
                        SeqOp::Append { values } => ArrayOp::Append {
                            values: values.iter().map(Json::from_dynamic_value).collect(),
                        },
                        SeqOp::Delete { index, length } => ArrayOp::Delete {
                            index: *index,
                            length: *length,
                        },
                        SeqOp::Modify { index, op } => ArrayOp::Modify {
                            index: *index,
                            op: from_operation(op).map_err(|e| e.at_index(*index))?,
                        },
                    })
                })
                .collect::<Result<_, JsonError>>()?,
        ),
        DynamicOperation::MapEdit(edits) => Op::ObjectEdit(
            edits
                .iter()
                .map(|edit| {
                    Ok(match edit {
                        MapOp::Add { key, value } => ObjectOp::Add {
                            key: string_key(key)?,
                            value: Json::from_dynamic_value(value),
                        },
                        MapOp::Remove { key } => ObjectOp::Remove { key: string_key(key)? },
                        MapOp::Modify { key, op } => {
                            let key = string_key(key)?;
                            let op = from_operation(op).map_err(|e| e.at_field(key.as_str()))?;
                            ObjectOp::Modify { key, op }
                        }
                    })
                })
                .collect::<Result<_, JsonError>>()?,
        ),
        DynamicOperation::Patch(patch) => Op::Nested(JsonPatch::from_dynamic_patch(patch)?),
    };
    Ok(op)
}

fn string_key(key: &DynamicValue) -> Result<String, JsonError> {
    key.as_str()
        .map(str::to_string)
        .ok_or_else(|| JsonError::new(format!("map keys must be strings, found {}", describe(key))))
}

fn describe(value: &DynamicValue) -> &'static str {
    match value {
        DynamicValue::Primitive(PrimitiveValue::Unit) => "unit",
        DynamicValue::Primitive(PrimitiveValue::Boolean(_)) => "boolean",
        DynamicValue::Primitive(PrimitiveValue::Int(_)) => "int",
        DynamicValue::Primitive(PrimitiveValue::Long(_)) => "long",
        DynamicValue::Primitive(PrimitiveValue::Double(_)) => "double",
        DynamicValue::Primitive(PrimitiveValue::BigDecimal(_)) => "big decimal",
        DynamicValue::Primitive(PrimitiveValue::String(_)) => "string",
        DynamicValue::Sequence(_) => "sequence",
        DynamicValue::Record(_) => "record",
        DynamicValue::Map(_) => "map",
        DynamicValue::Variant(..) => "variant",
    }
}

/// Errors inside an operation are reported below the operation's path.
fn prefix(mut err: JsonError, path: &Path) -> JsonError {
    err.path = path.join(&err.path);
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_patch::types::JsonPatchMode;
    use serde_json::json;

    fn j(v: serde_json::Value) -> Json {
        Json::from(v)
    }

    #[test]
    fn number_deltas_pick_narrowest_kind() {
        let delta = |n: JsonNumber| to_operation(&Op::PrimitiveDelta(PrimitiveOp::NumberDelta(n)));
        assert_eq!(
            delta(JsonNumber::from(3)),
            DynamicOperation::PrimitiveDelta(DynamicPrimitiveOp::IntDelta(3))
        );
        assert_eq!(
            delta(JsonNumber::from(5_000_000_000i64)),
            DynamicOperation::PrimitiveDelta(DynamicPrimitiveOp::LongDelta(5_000_000_000))
        );
        let half: JsonNumber = "0.5".parse().unwrap();
        assert_eq!(
            delta(half.clone()),
            DynamicOperation::PrimitiveDelta(DynamicPrimitiveOp::BigDecimalDelta(half))
        );
    }

    #[test]
    fn roundtrip_preserves_apply_result() {
        let source = j(json!({"n": 1, "s": "abc", "xs": [1, {"k": true}], "gone": null}));
        let target = j(json!({
            "n": 2.25,
            "s": "abXc",
            "xs": [{"k": false}, 1, 7],
            "new": {"z": []}
        }));
        let patch = source.diff(&target);
        let back = JsonPatch::from_dynamic_patch(&patch.to_dynamic_patch()).unwrap();
        assert_eq!(back.apply(&source, JsonPatchMode::Strict).unwrap(), target);
    }

    #[test]
    fn nested_patches_convert_recursively() {
        let inner = JsonPatch::single(".x".parse().unwrap(), Op::Set(Json::from(1)));
        let patch = JsonPatch::single(".a".parse().unwrap(), Op::Nested(inner));
        let dynamic = patch.to_dynamic_patch();
        assert!(matches!(dynamic.ops[0].operation, DynamicOperation::Patch(_)));
        assert_eq!(JsonPatch::from_dynamic_patch(&dynamic).unwrap(), patch);
    }

    #[test]
    fn double_deltas_must_be_finite() {
        let patch = DynamicPatch {
            ops: vec![DynamicPatchOp {
                path: Path::root(),
                operation: DynamicOperation::PrimitiveDelta(DynamicPrimitiveOp::DoubleDelta(0.25)),
            }],
        };
        let back = JsonPatch::from_dynamic_patch(&patch).unwrap();
        assert_eq!(back.apply(&Json::from(1), JsonPatchMode::Strict).unwrap(), j(json!(1.25)));

        let mut bad = patch;
        bad.ops[0].operation =
            DynamicOperation::PrimitiveDelta(DynamicPrimitiveOp::DoubleDelta(f64::NAN));
        assert!(JsonPatch::from_dynamic_patch(&bad).is_err());
    }

    #[test]
    fn non_string_map_keys_are_rejected() {
        let patch = DynamicPatch {
            ops: vec![DynamicPatchOp {
                path: ".m".parse().unwrap(),
                operation: DynamicOperation::MapEdit(vec![MapOp::Remove {
                    key: DynamicValue::Primitive(PrimitiveValue::Int(1)),
                }]),
            }],
        };
        let err = JsonPatch::from_dynamic_patch(&patch).unwrap_err();
        assert_eq!(err.message, "map keys must be strings, found int");
        assert_eq!(err.path, ".m".parse::<Path>().unwrap());
    }
}
