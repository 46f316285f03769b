//! JSON patch apply logic.
//!
//! Operations run in list order, each on the tree produced by the previous
//! one. Under `Strict` and `Clobber` every path must resolve to exactly one
//! location, and a failing operation aborts the apply.
//! Under `Lenient` the smallest failing unit is skipped instead: one matched
//! location, or one string, array or object edit inside an operation.

use json_tree_path::Path;

use super::types::{ArrayOp, JsonPatch, JsonPatchMode, ObjectOp, Op, PrimitiveOp, StringOp};
use crate::error::JsonError;
use crate::json::Json;
use crate::navigate::update_at;

// ── Entry points ──────────────────────────────────────────────────────────

/// Applies `patch` to `doc` under `mode`, returning the patched copy.
pub fn apply_patch(doc: &Json, patch: &JsonPatch, mode: JsonPatchMode) -> Result<Json, JsonError> {
    apply_relative(doc, patch, mode, &Path::root())
}

/// Applies `patch` to `doc`, whose own location in the outermost document
/// is `base`. Error paths are reported from the outermost root.
fn apply_relative(
    doc: &Json,
    patch: &JsonPatch,
    mode: JsonPatchMode,
    base: &Path,
) -> Result<Json, JsonError> {
    let mut current = doc.clone();
    for entry in patch {
        tracing::trace!(
            path = %base.join(&entry.path),
            op = entry.op.op_name(),
            "applying patch op"
        );
        current = apply_entry(current, &entry.path, &entry.op, mode, base)?;
    }
    Ok(current)
}

fn apply_entry(
    doc: Json,
    path: &Path,
    op: &Op,
    mode: JsonPatchMode,
    base: &Path,
) -> Result<Json, JsonError> {
    let mut hits = 0usize;
    let mut trail = base.clone();
    let updated = update_at(&doc, path.nodes(), &mut trail, &mut |loc: &Path, value: &Json| {
        hits += 1;
        if hits > 1 && mode != JsonPatchMode::Lenient {
            return Err(JsonError::at(
                base.join(path),
                "path resolves to more than one location",
            ));
        }
        apply_op(value, op, mode, loc).map(Some)
    });
    match updated {
        Ok(_) if hits == 0 => skip_or_fail(
            mode,
            doc,
            JsonError::at(base.join(path), "path does not resolve to a value"),
        ),
        Ok(Some(next)) => Ok(next),
        Ok(None) => Ok(doc),
        Err(err) => skip_or_fail(mode, doc, err),
    }
}

/// Under `Lenient`, logs `err` and returns `keep`; otherwise fails.
fn skip_or_fail<T>(mode: JsonPatchMode, keep: T, err: JsonError) -> Result<T, JsonError> {
    match mode {
        JsonPatchMode::Lenient => {
            tracing::debug!(
                path = %err.path,
                error = %err.message,
                "skipping failed patch operation"
            );
            Ok(keep)
        }
        JsonPatchMode::Strict | JsonPatchMode::Clobber => Err(err),
    }
}

fn mismatch(loc: &Path, expected: &str, found: &Json) -> JsonError {
    JsonError::at(
        loc.clone(),
        format!("{expected} requires {}, found {}", article(expected), found.json_type()),
    )
}

fn article(op_name: &str) -> &'static str {
    match op_name {
        "number_delta" => "a number",
        "string_edit" => "a string",
        "array_edit" => "an array",
        _ => "an object",
    }
}

// ── Operations ────────────────────────────────────────────────────────────

fn apply_op(value: &Json, op: &Op, mode: JsonPatchMode, loc: &Path) -> Result<Json, JsonError> {
    match op {
        Op::Set(next) => Ok(next.clone()),
        Op::PrimitiveDelta(PrimitiveOp::NumberDelta(amount)) => {
            let Json::Number(n) = value else {
                return skip_or_fail(mode, value.clone(), mismatch(loc, op.op_name(), value));
            };
            match n.checked_add(amount) {
                Some(sum) => Ok(Json::Number(sum)),
                None => skip_or_fail(
                    mode,
                    value.clone(),
                    JsonError::at(loc.clone(), format!("cannot add {amount} to {n} exactly")),
                ),
            }
        }
        Op::PrimitiveDelta(PrimitiveOp::StringEdit(edits)) => {
            let Json::String(s) = value else {
                return skip_or_fail(mode, value.clone(), mismatch(loc, op.op_name(), value));
            };
            let mut chars: Vec<char> = s.chars().collect();
            for edit in edits {
                if let Err(err) = apply_string_op(&mut chars, edit, loc) {
                    skip_or_fail(mode, (), err)?;
                }
            }
            Ok(Json::String(chars.into_iter().collect()))
        }
        Op::ArrayEdit(edits) => {
            let Json::Array(items) = value else {
                return skip_or_fail(mode, value.clone(), mismatch(loc, op.op_name(), value));
            };
            let mut items = items.clone();
            for edit in edits {
                if let Err(err) = apply_array_op(&mut items, edit, mode, loc) {
                    skip_or_fail(mode, (), err)?;
                }
            }
            Ok(Json::Array(items))
        }
        Op::ObjectEdit(edits) => {
            let Json::Object(entries) = value else {
                return skip_or_fail(mode, value.clone(), mismatch(loc, op.op_name(), value));
            };
            let mut entries = entries.clone();
            for edit in edits {
                if let Err(err) = apply_object_op(&mut entries, edit, mode, loc) {
                    skip_or_fail(mode, (), err)?;
                }
            }
            Ok(Json::Object(entries))
        }
        Op::Nested(patch) => apply_relative(value, patch, mode, loc),
    }
}

/// Validates before mutating, so a failed edit leaves `chars` untouched.
fn apply_string_op(chars: &mut Vec<char>, edit: &StringOp, loc: &Path) -> Result<(), JsonError> {
    let len = chars.len();
    let out_of_range = |what: String| {
        JsonError::at(loc.clone(), format!("{what} is out of range for string of length {len}"))
    };
    match edit {
        StringOp::Insert { index, text } => {
            if *index > len {
                return Err(out_of_range(format!("insert position {index}")));
            }
            chars.splice(*index..*index, text.chars());
        }
        StringOp::Delete { index, length } => {
            let end = range_end(*index, *length, len)
                .ok_or_else(|| out_of_range(format!("range {index}+{length}")))?;
            chars.drain(*index..end);
        }
        StringOp::Append { text } => chars.extend(text.chars()),
        StringOp::Modify { index, length, text } => {
            let end = range_end(*index, *length, len)
                .ok_or_else(|| out_of_range(format!("range {index}+{length}")))?;
            chars.splice(*index..end, text.chars());
        }
    }
    Ok(())
}

fn apply_array_op(
    items: &mut Vec<Json>,
    edit: &ArrayOp,
    mode: JsonPatchMode,
    loc: &Path,
) -> Result<(), JsonError> {
    let len = items.len();
    let out_of_range = |what: String| {
        JsonError::at(loc.clone(), format!("{what} is out of range for array of length {len}"))
    };
    match edit {
        ArrayOp::Insert { index, values } => {
            if *index > len {
                return Err(out_of_range(format!("insert position {index}")));
            }
            items.splice(*index..*index, values.iter().cloned());
        }
        ArrayOp::Append { values } => items.extend(values.iter().cloned()),
        ArrayOp::Delete { index, length } => {
            let end = range_end(*index, *length, len)
                .ok_or_else(|| out_of_range(format!("range {index}+{length}")))?;
            items.drain(*index..end);
        }
        ArrayOp::Modify { index, op } => {
            let Some(item) = items.get(*index) else {
                return Err(out_of_range(format!("index {index}")));
            };
            let next = apply_op(item, op, mode, &loc.clone().index(*index))?;
            items[*index] = next;
        }
    }
    Ok(())
}

fn apply_object_op(
    entries: &mut Vec<(String, Json)>,
    edit: &ObjectOp,
    mode: JsonPatchMode,
    loc: &Path,
) -> Result<(), JsonError> {
    let position = |key: &str| entries.iter().position(|(k, _)| k == key);
    match edit {
        ObjectOp::Add { key, value } => match (position(key), mode) {
            (None, _) => entries.push((key.clone(), value.clone())),
            (Some(i), JsonPatchMode::Clobber) => entries[i].1 = value.clone(),
            (Some(_), _) => {
                return Err(JsonError::at(loc.clone().field(key.as_str()), "key already exists"));
            }
        },
        ObjectOp::Remove { key } => {
            if position(key).is_none() {
                return Err(JsonError::at(loc.clone().field(key.as_str()), "key does not exist"));
            }
            entries.retain(|(k, _)| k != key);
        }
        ObjectOp::Modify { key, op } => {
            let Some(i) = position(key) else {
                return Err(JsonError::at(loc.clone().field(key.as_str()), "key does not exist"));
            };
            let next = apply_op(&entries[i].1, op, mode, &loc.clone().field(key.as_str()))?;
            entries[i].1 = next;
        }
    }
    Ok(())
}

fn range_end(index: usize, length: usize, len: usize) -> Option<usize> {
    index.checked_add(length).filter(|&end| end <= len)
}
