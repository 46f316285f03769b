//! json-tree: immutable JSON value trees with path selection, structural
//! transforms, diff and patch.
//!
//! The central type is [`Json`], a closed sum of the six JSON value kinds.
//! Objects keep their pairs in insertion order but compare, hash and look
//! up keys by first occurrence, so `{"a":1,"b":2}` equals `{"b":2,"a":1}`.
//!
//! - [`navigate`]: `get`, `set`, `insert`, `delete` and `modify` along a
//!   [`Path`], fanning out at wildcard steps.
//! - [`selection`]: [`JsonSelection`], the success-or-failure result of a
//!   query, with combinators.
//! - [`transform`]: prune, retain, partition, project, folds and rewrites.
//! - [`json_patch`] and [`json_patch_diff`]: edit scripts between trees.
//!
//! # Example
//!
//! ```
//! use json_tree::{Json, JsonPatchMode};
//!
//! let before = Json::parse(r#"{"user": {"name": "ada", "langs": ["en"]}}"#).unwrap();
//! let after = before.set(&".user.name".parse().unwrap(), Json::from("ada l."));
//!
//! let patch = before.diff(&after);
//! assert_eq!(before.patch(&patch, JsonPatchMode::Strict).unwrap(), after);
//! ```

pub mod error;
pub mod json;
pub mod json_cli;
pub mod json_patch;
pub mod json_patch_diff;
pub mod navigate;
pub mod selection;
pub mod transform;
pub mod util_inner;

pub use error::JsonError;
pub use json::{
    DynamicValue, FromJson, Json, JsonNumber, JsonType, MergeStrategy, PrimitiveValue, ToJson,
    Unwrapped,
};
pub use json_patch::{
    ArrayOp, DynamicPatch, JsonPatch, JsonPatchMode, JsonPatchOp, ObjectOp, Op, PrimitiveOp,
    StringOp,
};
pub use json_patch_diff::DiffOptions;
pub use json_tree_path::{Path, PathNode};
pub use selection::JsonSelection;
