//! Wildcard matching of condition values.

use crate::value::{Kind, Value};
use glob::{MatchOptions, Pattern};
use thiserror::Error;

/// PatternError is returned when a condition value cannot be used as a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("condition value must be a scalar, got {kind}")]
    NonScalar { kind: Kind },

    #[error("invalid pattern {pattern:?}: {message}")]
    Invalid { pattern: String, message: String },
}

const OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Matches `text` against `pattern`, where `*` matches any run of characters
/// (including none) and every other character matches only itself.
///
/// Matching is anchored at both ends and case-sensitive. A pattern without
/// `*` is an exact comparison.
pub fn wildcard_match(pattern: &str, text: &str) -> Result<bool, PatternError> {
    if !pattern.contains('*') {
        return Ok(pattern == text);
    }

    // glob gives `?` and `[` meaning and rejects `**` outside a path
    // component, so literal runs are escaped and star runs collapsed.
    let mut collapsed = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c == '*' && collapsed.ends_with('*') {
            continue;
        }
        collapsed.push(c);
    }
    let escaped = collapsed
        .split('*')
        .map(Pattern::escape)
        .collect::<Vec<_>>()
        .join("*");

    let compiled = Pattern::new(&escaped).map_err(|e| PatternError::Invalid {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;
    Ok(compiled.matches_with(text, OPTIONS))
}

/// Tests a resource value against a condition value.
///
/// A string condition is matched as a wildcard pattern against a string
/// resource value, or against the rendered text of a number or boolean. Any
/// other scalar condition must equal the resource value. Resource lists and
/// maps never match; a list or map condition is an error.
pub fn matches(pattern: &Value, value: &Value) -> Result<bool, PatternError> {
    match pattern {
        Value::List(_) | Value::Map(_) => Err(PatternError::NonScalar {
            kind: pattern.kind(),
        }),
        Value::String(p) => match value.scalar_text() {
            Some(text) => wildcard_match(p, &text),
            None => Ok(false),
        },
        other => Ok(other == value),
    }
}
