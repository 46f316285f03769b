//! Encodings of [`JsonPatch`](super::JsonPatch) as data.

pub mod json;
