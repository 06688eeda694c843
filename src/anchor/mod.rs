//! Anchor module - Overlay key syntax and condition matching.
//!
//! Overlay map keys may carry anchors that change how the rest of the
//! overlay object is applied:
//!
//! - `(field)` is a condition; the object applies only where the resource's
//!   `field` matches the condition value
//! - `+(field)` adds `field` only when the resource does not have it
//!
//! Condition values are compared with a small wildcard language in which `*`
//! is the only metacharacter.

mod key;
mod pattern;

pub use key::*;
pub use pattern::*;
