//! Field path module - Locations inside a resource document.
//!
//! Paths are built incrementally while an overlay is walked and are rendered
//! as JSON Pointers in the emitted patch operations.

mod path;

pub use path::*;
