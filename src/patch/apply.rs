//! Applying patches to documents.
//!
//! The RFC 6902 semantics come from the `json-patch` crate; this module only
//! moves documents and operations in and out of its representation.

use super::operation::{Patch, PatchOperation};
use crate::overlay::{OverlayError, Result};
use crate::value::Value;

/// Applies `operations`, in order, to a JSON document and returns the
/// patched JSON.
pub fn apply_patches(document: &[u8], operations: &[PatchOperation]) -> Result<Vec<u8>> {
    let mut doc: serde_json::Value = serde_json::from_slice(document)
        .map_err(|e| OverlayError::decode(format!("invalid JSON document: {}", e)))?;

    apply_to_json(&mut doc, operations)?;

    Ok(serde_json::to_vec(&doc)?)
}

/// Applies `operations` to an in-memory document.
pub fn apply_patch_to_value(document: &Value, operations: &[PatchOperation]) -> Result<Value> {
    let mut doc = serde_json::to_value(document)?;
    apply_to_json(&mut doc, operations)?;
    serde_json::from_value(doc).map_err(|e| OverlayError::decode(e.to_string()))
}

fn apply_to_json(doc: &mut serde_json::Value, operations: &[PatchOperation]) -> Result<()> {
    let bytes = Patch::from(operations.to_vec()).to_bytes()?;
    let patch: json_patch::Patch = serde_json::from_slice(&bytes)?;

    json_patch::patch(doc, &patch).map_err(|e| OverlayError::apply(e.to_string()))?;
    tracing::trace!(operations = operations.len(), "applied patch");
    Ok(())
}
