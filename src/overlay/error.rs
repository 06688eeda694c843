//! Overlay errors.

use crate::anchor::PatternError;
use crate::fieldpath::{Path, PointerError};
use thiserror::Error;

/// Result alias for overlay operations.
pub type Result<T, E = OverlayError> = std::result::Result<T, E>;

/// OverlayError is returned when an overlay cannot be compiled into a patch,
/// or when a compiled patch cannot be encoded or applied.
///
/// Errors abort the whole computation; no partial patch is ever returned.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// The overlay and the resource disagree in a way that has no coercion,
    /// for example a condition whose value is a list or a map.
    #[error("{path}: type mismatch: {message}")]
    TypeMismatch { path: String, message: String },

    /// An anchor-like key that is ambiguous. Keys that are not exactly
    /// `(name)` or `+(name)` are currently read as plain fields, so this is
    /// never produced by the engine.
    #[error("{path}: malformed anchor {key:?}")]
    MalformedAnchor { path: String, key: String },

    /// The resource cannot structurally host the operation, for example a
    /// starting path that descends through a scalar.
    #[error("{path}: {message}")]
    Structural { path: String, message: String },

    #[error("invalid path: {0}")]
    Pointer(#[from] PointerError),

    #[error("failed to encode patch: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to decode document: {message}")]
    Decode { message: String },

    #[error("failed to apply patch: {message}")]
    Apply { message: String },
}

impl OverlayError {
    /// Creates a type mismatch error.
    pub fn type_mismatch(path: &Path, message: impl Into<String>) -> Self {
        OverlayError::TypeMismatch {
            path: display_path(path),
            message: message.into(),
        }
    }

    /// Creates a structural error.
    pub fn structural(path: &Path, message: impl Into<String>) -> Self {
        OverlayError::Structural {
            path: display_path(path),
            message: message.into(),
        }
    }

    /// Wraps a pattern error raised while evaluating a condition at `path`.
    pub fn from_pattern(path: &Path, err: PatternError) -> Self {
        OverlayError::type_mismatch(path, err.to_string())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        OverlayError::Decode {
            message: message.into(),
        }
    }

    pub fn apply(message: impl Into<String>) -> Self {
        OverlayError::Apply {
            message: message.into(),
        }
    }
}

// The root pointer is the empty string, which reads badly in messages.
fn display_path(path: &Path) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
