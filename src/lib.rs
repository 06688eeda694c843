//! # Overlay Patch
//!
//! Compiles declarative overlays into RFC 6902 JSON Patches for
//! Kubernetes-style resource documents.
//!
//! An overlay is a partial document describing desired fields. Its map keys
//! may carry anchors: `(field)` makes the enclosing object apply only where
//! the resource's `field` matches a wildcard pattern, and `+(field)` sets a
//! field only when the resource does not have it. The engine walks resource
//! and overlay together and emits the operations that make the resource
//! satisfy the overlay, pairing list elements by content rather than position.
//!
//! ```
//! use overlay_patch::{apply_overlay, value, Path};
//!
//! let resource = value::from_json(r#"{"metadata":{"labels":{"app":"nginx"}}}"#).unwrap();
//! let overlay = value::from_json(r#"{"metadata":{"labels":{"+(app)":"x","+(tier)":"web"}}}"#).unwrap();
//!
//! let ops = apply_overlay(&resource, &overlay, &Path::new()).unwrap();
//! assert_eq!(ops.len(), 1);
//! assert_eq!(ops[0].path(), "/metadata/labels/tier");
//! ```
//!
//! ## Modules
//!
//! - [`value`] - In-memory representation of resource and overlay documents
//! - [`fieldpath`] - Document locations and their JSON Pointer form
//! - [`anchor`] - Anchor key syntax and wildcard condition matching
//! - [`overlay`] - The overlay engine
//! - [`patch`] - JSON Patch assembly and application

pub mod anchor;
pub mod fieldpath;
pub mod overlay;
pub mod patch;
pub mod value;

pub use anchor::Anchor;
pub use fieldpath::{Path, PathElement};
pub use overlay::{
    apply_overlay, ConditionMatch, Engine, ListPairing, OverlayError, OverlayOptions,
};
pub use patch::{apply_patches, join_patches, Patch, PatchOperation};
pub use value::Value;
