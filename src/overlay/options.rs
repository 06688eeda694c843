//! Engine options.

use super::error::{OverlayError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;

/// Which resource list elements a conditioned overlay element is merged into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionMatch {
    /// Only the first element, in resource order, that satisfies every condition.
    #[default]
    First,
    /// Every element that satisfies every condition.
    All,
}

/// How anchor-free overlay list elements find their resource counterparts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListPairing {
    /// Pair with the first unconsumed resource element that has no
    /// conflicting scalar field; append when there is none.
    #[default]
    Structural,
    /// Never pair by structure. Elements without any anchor are appended;
    /// elements whose anchors sit deeper than their top level are applied
    /// to every resource element of the same kind.
    Append,
}

/// OverlayOptions tunes list handling of the overlay engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct OverlayOptions {
    pub condition_match: ConditionMatch,
    pub list_pairing: ListPairing,
}

impl OverlayOptions {
    pub fn new() -> Self {
        OverlayOptions::default()
    }

    /// Sets the condition match mode.
    pub fn condition_match(mut self, mode: ConditionMatch) -> Self {
        self.condition_match = mode;
        self
    }

    /// Sets the list pairing mode.
    pub fn list_pairing(mut self, mode: ListPairing) -> Self {
        self.list_pairing = mode;
        self
    }

    /// Parses options from YAML. JSON is accepted as well.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| OverlayError::decode(format!("invalid overlay options: {}", e)))
    }

    /// Reads options from a YAML or JSON file.
    pub fn from_file(path: impl AsRef<FsPath>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            OverlayError::decode(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }
}
