//! Command-line tools for diffing and patching JSON documents.
//!
//! Provides the core logic used by the binary entry points:
//! - `json-tree-diff`: print the patch turning one document into another
//! - `json-tree-patch`: apply an encoded patch to a document read from stdin

use std::io;
use std::path::Path as FsPath;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::error::JsonError;
use crate::json::Json;
use crate::json_patch::codec::json::{from_json, to_json};
use crate::json_patch::JsonPatchMode;

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Json(#[from] JsonError),
    #[error("usage: {0}")]
    Usage(String),
}

// ── Setup ─────────────────────────────────────────────────────────────────

/// Logs go to stderr; `RUST_LOG` sets the filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

/// Reads `path` as UTF-8 text.
pub fn read_file(path: impl AsRef<FsPath>) -> Result<String, CliError> {
    Ok(std::fs::read_to_string(path)?)
}

/// Parses the optional mode argument; absent means `strict`.
pub fn parse_mode(arg: Option<&str>) -> Result<JsonPatchMode, CliError> {
    match arg {
        None => Ok(JsonPatchMode::default()),
        Some(text) => Ok(text.parse()?),
    }
}

// ── json-tree-diff ────────────────────────────────────────────────────────

/// Diffs two JSON texts and returns the encoded patch, pretty-printed.
pub fn diff_documents(source: &str, target: &str) -> Result<String, CliError> {
    let source = Json::parse(source)?;
    let target = Json::parse(target)?;
    let patch = source.diff(&target);
    tracing::debug!(ops = patch.len(), "computed diff");
    Ok(to_json(&patch).to_string_pretty())
}

// ── json-tree-patch ───────────────────────────────────────────────────────

/// Applies an encoded patch to a JSON text and returns the result.
pub fn apply_patch_document(
    doc: &str,
    patch: &str,
    mode: JsonPatchMode,
) -> Result<String, CliError> {
    let doc = Json::parse(doc)?;
    let patch = from_json(&Json::parse(patch)?)?;
    let result = doc.patch(&patch, mode)?;
    Ok(result.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_then_patch_reproduces_target() {
        let source = r#"{"a": [1, 2], "b": "x"}"#;
        let target = r#"{"a": [2], "c": null}"#;
        let patch = diff_documents(source, target).unwrap();
        let result = apply_patch_document(source, &patch, JsonPatchMode::Strict).unwrap();
        assert_eq!(Json::parse(&result).unwrap(), Json::parse(target).unwrap());
    }

    #[test]
    fn identical_documents_give_empty_patch() {
        assert_eq!(diff_documents("[1]", "[1]").unwrap(), "[]");
    }

    #[test]
    fn mode_argument() {
        assert_eq!(parse_mode(None).unwrap(), JsonPatchMode::Strict);
        assert_eq!(parse_mode(Some("clobber")).unwrap(), JsonPatchMode::Clobber);
        assert!(matches!(parse_mode(Some("fuzzy")), Err(CliError::Json(_))));
    }

    #[test]
    fn malformed_input_is_a_json_error() {
        let err = apply_patch_document("{", "[]", JsonPatchMode::Strict).unwrap_err();
        assert!(matches!(err, CliError::Json(_)));
    }

    #[test]
    fn lenient_mode_skips_failures() {
        let patch = r#"[{"op": "set", "path": ".missing", "value": 1}]"#;
        assert!(apply_patch_document(r#"{"a": 1}"#, patch, JsonPatchMode::Strict).is_err());
        let result = apply_patch_document(r#"{"a": 1}"#, patch, JsonPatchMode::Lenient).unwrap();
        assert_eq!(result, r#"{"a":1}"#);
    }
}
