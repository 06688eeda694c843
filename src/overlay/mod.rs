//! Overlay module - Compiles overlays into JSON Patch operations.
//!
//! The engine walks the overlay and the resource side by side and emits, in
//! document order, the `add` and `replace` operations that make the resource
//! satisfy the overlay. Operations are only emitted against locations the
//! engine has seen in the resource (or whose parent it has seen, for `add`),
//! so the result always applies cleanly to the resource it was computed from.

mod engine;
mod error;
mod list;
mod options;


pub use engine::{apply_overlay, Engine};
pub use error::*;
pub use options::*;
