//! JSON Patch operations.

use crate::fieldpath::Path;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// PatchOperation is one RFC 6902 edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: String, value: Value },
    Replace { path: String, value: Value },
    Remove { path: String },
}

impl PatchOperation {
    pub fn add(path: &Path, value: Value) -> Self {
        PatchOperation::Add {
            path: path.to_pointer(),
            value,
        }
    }

    pub fn replace(path: &Path, value: Value) -> Self {
        PatchOperation::Replace {
            path: path.to_pointer(),
            value,
        }
    }

    pub fn remove(path: &Path) -> Self {
        PatchOperation::Remove {
            path: path.to_pointer(),
        }
    }

    /// Returns the operation name as written in the patch document.
    pub fn op(&self) -> &'static str {
        match self {
            PatchOperation::Add { .. } => "add",
            PatchOperation::Replace { .. } => "replace",
            PatchOperation::Remove { .. } => "remove",
        }
    }

    /// Returns the target JSON Pointer.
    pub fn path(&self) -> &str {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Replace { path, .. }
            | PatchOperation::Remove { path } => path,
        }
    }

    /// Returns the value carried by add and replace operations.
    pub fn value(&self) -> Option<&Value> {
        match self {
            PatchOperation::Add { value, .. } | PatchOperation::Replace { value, .. } => Some(value),
            PatchOperation::Remove { .. } => None,
        }
    }

    /// Serializes this operation as a standalone JSON object.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

impl fmt::Display for PatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op(), self.path())
    }
}

/// Joins individually serialized operations into one patch document.
pub fn join_patches(patches: &[Vec<u8>]) -> Vec<u8> {
    if patches.is_empty() {
        return b"[]".to_vec();
    }
    let mut result = b"[\n".to_vec();
    for (i, patch) in patches.iter().enumerate() {
        if i > 0 {
            result.extend_from_slice(b",\n");
        }
        result.extend_from_slice(patch);
    }
    result.extend_from_slice(b"\n]");
    result
}

/// Patch is an ordered list of operations, applied in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch {
    operations: Vec<PatchOperation>,
}

impl Patch {
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn as_slice(&self) -> &[PatchOperation] {
        &self.operations
    }

    /// Serializes the patch as a JSON array document.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        let parts = self
            .operations
            .iter()
            .map(PatchOperation::to_bytes)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(join_patches(&parts))
    }
}

impl From<Vec<PatchOperation>> for Patch {
    fn from(operations: Vec<PatchOperation>) -> Self {
        Patch { operations }
    }
}

impl IntoIterator for Patch {
    type Item = PatchOperation;
    type IntoIter = std::vec::IntoIter<PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}
