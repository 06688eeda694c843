//! Patch module - Assembling and applying RFC 6902 JSON Patch documents.

mod apply;
mod operation;

pub use apply::*;
pub use operation::*;
