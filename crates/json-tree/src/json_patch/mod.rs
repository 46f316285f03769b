//! JSON patch: edit scripts over [`Json`](crate::Json) trees.
//!
//! A [`JsonPatch`] is an ordered list of `(path, op)` pairs. Operations
//! replace values (`Set`), adjust numbers and strings in place
//! (`PrimitiveDelta`), edit arrays and objects element by element
//! (`ArrayEdit`, `ObjectEdit`) or apply a whole sub-patch below a location
//! (`Nested`). Under `Strict` and `Clobber` a path must resolve to exactly
//! one location. `Lenient` also accepts wildcard paths and applies the
//! operation at every match.
//!
//! Patches are produced by [`JsonPatch::diff`] or built by hand, applied
//! with [`JsonPatch::apply`] under a [`JsonPatchMode`], and combined with
//! `+`.

pub mod apply;
pub mod codec;
pub mod dynamic;
pub mod types;

pub use dynamic::{
    DynamicOperation, DynamicPatch, DynamicPatchOp, DynamicPrimitiveOp, MapOp, SeqOp,
};
pub use types::{
    ArrayOp, JsonPatch, JsonPatchMode, JsonPatchOp, ObjectOp, Op, PrimitiveOp, StringOp,
};
