//! Sequence diff utilities.

pub mod myers;
