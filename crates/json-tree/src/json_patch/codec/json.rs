//! JSON codec for JSON patches.
//!
//! A patch encodes as an array of operation objects:
//!
//! ```text
//! [
//!   {"op": "set", "path": ".a", "value": 1},
//!   {"op": "number_delta", "path": ".n", "value": -2},
//!   {"op": "string_edit", "path": ".s", "edits": [{"op": "insert", "index": 0, "text": "x"}]},
//!   {"op": "array_edit", "path": ".xs",
//!    "edits": [{"op": "modify", "index": 1, "change": {"op": "set", "value": 0}}]},
//!   {"op": "object_edit", "edits": [{"op": "add", "key": "k", "value": true}]},
//!   {"op": "nested", "path": ".o", "patch": [...]}
//! ]
//! ```
//!
//! `path` uses the textual path syntax and defaults to the root when absent.
//! A `change` holds an operation object without a `path`.

use json_tree_path::Path;

use crate::error::JsonError;
use crate::json::{Json, JsonNumber};
use crate::json_patch::types::{
    ArrayOp, JsonPatch, JsonPatchOp, ObjectOp, Op, PrimitiveOp, StringOp,
};

// ── Serialization ─────────────────────────────────────────────────────────

/// Encodes `patch` in the JSON patch format.
pub fn to_json(patch: &JsonPatch) -> Json {
    Json::array(patch.iter().map(|entry| {
        let mut fields = vec![("op".to_string(), Json::from(entry.op.op_name()))];
        if !entry.path.is_root() {
            fields.push(("path".to_string(), Json::from(entry.path.to_string())));
        }
        fields.extend(op_payload(&entry.op));
        Json::Object(fields)
    }))
}

fn op_to_json(op: &Op) -> Json {
    let mut fields = vec![("op".to_string(), Json::from(op.op_name()))];
    fields.extend(op_payload(op));
    Json::Object(fields)
}

fn op_payload(op: &Op) -> Vec<(String, Json)> {
    match op {
        Op::Set(value) => vec![("value".into(), value.clone())],
        Op::PrimitiveDelta(PrimitiveOp::NumberDelta(n)) => {
            vec![("value".into(), Json::Number(n.clone()))]
        }
        Op::PrimitiveDelta(PrimitiveOp::StringEdit(edits)) => {
            vec![("edits".into(), Json::array(edits.iter().map(string_op_to_json)))]
        }
        Op::ArrayEdit(edits) => {
            vec![("edits".into(), Json::array(edits.iter().map(array_op_to_json)))]
        }
        Op::ObjectEdit(edits) => {
            vec![("edits".into(), Json::array(edits.iter().map(object_op_to_json)))]
        }
        Op::Nested(patch) => vec![("patch".into(), to_json(patch))],
    }
}

fn string_op_to_json(edit: &StringOp) -> Json {
    let op = ("op", Json::from(edit.op_name()));
    match edit {
        StringOp::Insert { index, text } => Json::object([
            op,
            ("index", Json::from(*index)),
            ("text", Json::from(text.as_str())),
        ]),
        StringOp::Delete { index, length } => Json::object([
            op,
            ("index", Json::from(*index)),
            ("length", Json::from(*length)),
        ]),
        StringOp::Append { text } => Json::object([op, ("text", Json::from(text.as_str()))]),
        StringOp::Modify { index, length, text } => Json::object([
            op,
            ("index", Json::from(*index)),
            ("length", Json::from(*length)),
            ("text", Json::from(text.as_str())),
        ]),
    }
}

fn array_op_to_json(edit: &ArrayOp) -> Json {
    let op = ("op", Json::from(edit.op_name()));
    match edit {
        ArrayOp::Insert { index, values } => Json::object([
            op,
            ("index", Json::from(*index)),
            ("values", Json::array(values.iter().cloned())),
        ]),
        ArrayOp::Append { values } => {
            Json::object([op, ("values", Json::array(values.iter().cloned()))])
        }
        ArrayOp::Delete { index, length } => Json::object([
            op,
            ("index", Json::from(*index)),
            ("length", Json::from(*length)),
        ]),
        ArrayOp::Modify { index, op: change } => Json::object([
            op,
            ("index", Json::from(*index)),
            ("change", op_to_json(change)),
        ]),
    }
}

fn object_op_to_json(edit: &ObjectOp) -> Json {
    let op = ("op", Json::from(edit.op_name()));
    match edit {
        ObjectOp::Add { key, value } => Json::object([
            op,
            ("key", Json::from(key.as_str())),
            ("value", value.clone()),
        ]),
        ObjectOp::Remove { key } => Json::object([op, ("key", Json::from(key.as_str()))]),
        ObjectOp::Modify { key, op: change } => Json::object([
            op,
            ("key", Json::from(key.as_str())),
            ("change", op_to_json(change)),
        ]),
    }
}

// ── Deserialization ───────────────────────────────────────────────────────

/// Decodes a patch. Error paths point into the encoded document.
///
/// ```
/// use json_tree::Json;
/// use json_tree::json_patch::codec::json::{from_json, to_json};
///
/// let encoded = Json::parse(r#"[{"op": "set", "path": ".a[0]", "value": {"b": 1}}]"#).unwrap();
/// let patch = from_json(&encoded).unwrap();
/// assert_eq!(patch.len(), 1);
/// assert_eq!(to_json(&patch), encoded);
/// ```
pub fn from_json(json: &Json) -> Result<JsonPatch, JsonError> {
    let entries = json.as_array().ok_or_else(|| {
        JsonError::new(format!("patch must be an array, found {}", json.json_type()))
    })?;
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| decode_entry(entry).map_err(|e| e.at_index(i)))
        .collect()
}

fn decode_entry(json: &Json) -> Result<JsonPatchOp, JsonError> {
    let path = match json.get_field("path") {
        None => Path::root(),
        Some(text) => {
            let text: String = text.decode().map_err(|e| e.at_field("path"))?;
            text.parse::<Path>().map_err(|e| JsonError::from(e).at_field("path"))?
        }
    };
    Ok(JsonPatchOp::new(path, decode_op(json)?))
}

fn decode_op(json: &Json) -> Result<Op, JsonError> {
    let name: String = required(json, "op")?;
    let op = match name.as_str() {
        "set" => Op::Set(field(json, "value")?.clone()),
        "number_delta" => {
            let amount: JsonNumber = required(json, "value")?;
            Op::PrimitiveDelta(PrimitiveOp::NumberDelta(amount))
        }
        "string_edit" => {
            Op::PrimitiveDelta(PrimitiveOp::StringEdit(edits(json, decode_string_op)?))
        }
        "array_edit" => Op::ArrayEdit(edits(json, decode_array_op)?),
        "object_edit" => Op::ObjectEdit(edits(json, decode_object_op)?),
        "nested" => {
            let patch = from_json(field(json, "patch")?).map_err(|e| e.at_field("patch"))?;
            Op::Nested(patch)
        }
        other => return Err(unknown("operation", other)),
    };
    Ok(op)
}

fn decode_string_op(json: &Json) -> Result<StringOp, JsonError> {
    let name: String = required(json, "op")?;
    let edit = match name.as_str() {
        "insert" => StringOp::Insert {
            index: required(json, "index")?,
            text: required(json, "text")?,
        },
        "delete" => StringOp::Delete {
            index: required(json, "index")?,
            length: required(json, "length")?,
        },
        "append" => StringOp::Append {
            text: required(json, "text")?,
        },
        "modify" => StringOp::Modify {
            index: required(json, "index")?,
            length: required(json, "length")?,
            text: required(json, "text")?,
        },
        other => return Err(unknown("string edit", other)),
    };
    Ok(edit)
}

fn decode_array_op(json: &Json) -> Result<ArrayOp, JsonError> {
    let name: String = required(json, "op")?;
    let edit = match name.as_str() {
        "insert" => ArrayOp::Insert {
            index: required(json, "index")?,
            values: required(json, "values")?,
        },
        "append" => ArrayOp::Append {
            values: required(json, "values")?,
        },
        "delete" => ArrayOp::Delete {
            index: required(json, "index")?,
            length: required(json, "length")?,
        },
        "modify" => ArrayOp::Modify {
            index: required(json, "index")?,
            op: decode_op(field(json, "change")?).map_err(|e| e.at_field("change"))?,
        },
        other => return Err(unknown("array edit", other)),
    };
    Ok(edit)
}

fn decode_object_op(json: &Json) -> Result<ObjectOp, JsonError> {
    let name: String = required(json, "op")?;
    let edit = match name.as_str() {
        "add" => ObjectOp::Add {
            key: required(json, "key")?,
            value: field(json, "value")?.clone(),
        },
        "remove" => ObjectOp::Remove {
            key: required(json, "key")?,
        },
        "modify" => ObjectOp::Modify {
            key: required(json, "key")?,
            op: decode_op(field(json, "change")?).map_err(|e| e.at_field("change"))?,
        },
        other => return Err(unknown("object edit", other)),
    };
    Ok(edit)
}

// ── Field helpers ─────────────────────────────────────────────────────────

fn field<'a>(json: &'a Json, name: &str) -> Result<&'a Json, JsonError> {
    if !json.is_object() {
        let found = json.json_type();
        return Err(JsonError::new(format!("expected an operation object, found {found}")));
    }
    json.get_field(name)
        .ok_or_else(|| JsonError::new(format!("missing field `{name}`")))
}

fn unknown(kind: &str, name: &str) -> JsonError {
    JsonError::new(format!("unknown {kind}: {name}")).at_field("op")
}

fn required<T: crate::json::FromJson>(json: &Json, name: &str) -> Result<T, JsonError> {
    field(json, name)?.decode().map_err(|e| e.at_field(name))
}

fn edits<T>(json: &Json, decode: fn(&Json) -> Result<T, JsonError>) -> Result<Vec<T>, JsonError> {
    let list = field(json, "edits")?;
    let items = list.as_array().ok_or_else(|| {
        JsonError::new(format!("edits must be an array, found {}", list.json_type()))
            .at_field("edits")
    })?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| decode(item).map_err(|e| e.at_index(i).at_field("edits")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn j(v: serde_json::Value) -> Json {
        Json::from(v)
    }

    #[test]
    fn encodes_every_operation_kind() {
        let patch = JsonPatch::root(Op::ObjectEdit(vec![
            ObjectOp::Add {
                key: "k".into(),
                value: Json::from(true),
            },
            ObjectOp::Remove { key: "gone".into() },
            ObjectOp::Modify {
                key: "xs".into(),
                op: Op::ArrayEdit(vec![
                    ArrayOp::Insert {
                        index: 0,
                        values: vec![Json::Null],
                    },
                    ArrayOp::Append { values: vec![] },
                    ArrayOp::Delete { index: 1, length: 2 },
                    ArrayOp::Modify {
                        index: 0,
                        op: Op::PrimitiveDelta(PrimitiveOp::NumberDelta(JsonNumber::from(-2))),
                    },
                ]),
            },
        ])) + JsonPatch::single(
            ".s".parse().unwrap(),
            Op::PrimitiveDelta(PrimitiveOp::StringEdit(vec![
                StringOp::Insert { index: 0, text: "a".into() },
                StringOp::Delete { index: 1, length: 1 },
                StringOp::Append { text: "z".into() },
                StringOp::Modify { index: 0, length: 1, text: "b".into() },
            ])),
        ) + JsonPatch::single(
            ".o".parse().unwrap(),
            Op::Nested(JsonPatch::single(
                ".p".parse().unwrap(),
                Op::Set(j(json!({"x": [1]}))),
            )),
        );
        let encoded = to_json(&patch);
        assert_eq!(from_json(&encoded).unwrap(), patch);
        assert_eq!(Json::parse(&encoded.to_string()).unwrap(), encoded);
    }

    #[test]
    fn path_defaults_to_root() {
        let patch = from_json(&j(json!([{"op": "set", "value": 1}]))).unwrap();
        assert!(patch.ops()[0].path.is_root());
    }

    #[test]
    fn errors_point_into_the_encoded_patch() {
        let encoded = j(json!([
            {"op": "set", "value": 1},
            {"op": "array_edit", "edits": [{"op": "delete", "index": 0}]}
        ]));
        let err = from_json(&encoded).unwrap_err();
        assert_eq!(err.message, "missing field `length`");
        assert_eq!(err.path.to_string(), "[1].edits[0]");
    }

    #[test]
    fn rejects_unknown_operations_and_bad_paths() {
        assert!(from_json(&j(json!([{"op": "move"}]))).is_err());
        assert!(from_json(&j(json!([{"op": "set", "path": ".a[", "value": 1}]))).is_err());
        assert!(from_json(&j(json!({"op": "set"}))).is_err());
    }
}
