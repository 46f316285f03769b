//! Internal helpers shared by the differ and the patch engine.

pub mod diff;
