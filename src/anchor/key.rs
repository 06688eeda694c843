//! Anchor classification of overlay map keys.

use crate::value::{Map, Value};

/// Anchor is the meaning of one overlay map key.
///
/// Anchors are recognized only in their exact bracketed forms:
///
/// - `(name)` is a condition over field `name`
/// - `+(name)` adds field `name` only when it is missing
///
/// Every other key, including keys that merely contain parentheses, is a
/// plain field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor<'a> {
    Plain(&'a str),
    Condition(&'a str),
    AddIfAbsent(&'a str),
}

impl<'a> Anchor<'a> {
    /// Classifies a raw overlay key.
    pub fn parse(key: &'a str) -> Anchor<'a> {
        if let Some(name) = key.strip_prefix("+(").and_then(|k| k.strip_suffix(')')) {
            if is_anchor_name(name) {
                return Anchor::AddIfAbsent(name);
            }
        }
        if let Some(name) = key.strip_prefix('(').and_then(|k| k.strip_suffix(')')) {
            if is_anchor_name(name) {
                return Anchor::Condition(name);
            }
        }
        Anchor::Plain(key)
    }

    /// Returns the bare field name.
    pub fn field(&self) -> &'a str {
        match self {
            Anchor::Plain(name) | Anchor::Condition(name) | Anchor::AddIfAbsent(name) => name,
        }
    }

    pub fn is_plain(&self) -> bool {
        matches!(self, Anchor::Plain(_))
    }

    pub fn is_condition(&self) -> bool {
        matches!(self, Anchor::Condition(_))
    }

    pub fn is_add_if_absent(&self) -> bool {
        matches!(self, Anchor::AddIfAbsent(_))
    }
}

// Empty names and nested brackets such as "((a))" stay plain.
fn is_anchor_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(|c| c == '(' || c == ')')
}

/// Returns true if the value or any value nested in it carries an anchor key.
pub fn has_anchors(value: &Value) -> bool {
    match value {
        Value::Map(m) => m
            .iter()
            .any(|(k, v)| !Anchor::parse(k).is_plain() || has_anchors(v)),
        Value::List(items) => items.iter().any(has_anchors),
        _ => false,
    }
}

/// Converts an overlay subtree into a plain value.
///
/// Anchored keys are replaced by their bare field names so the subtree can be
/// inserted where the resource has nothing to test the anchors against. When a
/// plain key and an anchored key name the same field, the plain key wins.
pub fn strip_anchors(value: &Value) -> Value {
    match value {
        Value::Map(m) => Value::Map(strip_map_anchors(m)),
        Value::List(items) => Value::List(items.iter().map(strip_anchors).collect()),
        scalar => scalar.clone(),
    }
}

/// Map form of [`strip_anchors`].
pub fn strip_map_anchors(map: &Map) -> Map {
    let mut out = Map::new();
    for (key, v) in map.iter() {
        let anchor = Anchor::parse(key);
        if !anchor.is_plain() {
            out.fields
                .entry(anchor.field().to_string())
                .or_insert_with(|| strip_anchors(v));
        }
    }
    for (key, v) in map.iter() {
        if Anchor::parse(key).is_plain() {
            out.set(key.clone(), strip_anchors(v));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_json;

    #[test]
    fn test_parse_plain() {
        assert_eq!(Anchor::parse("image"), Anchor::Plain("image"));
        assert_eq!(Anchor::parse("image").field(), "image");
    }

    #[test]
    fn test_parse_condition() {
        assert_eq!(Anchor::parse("(name)"), Anchor::Condition("name"));
        assert_eq!(Anchor::parse("(name)").field(), "name");
    }

    #[test]
    fn test_parse_add_if_absent() {
        assert_eq!(Anchor::parse("+(imagePullPolicy)"), Anchor::AddIfAbsent("imagePullPolicy"));
        assert!(Anchor::parse("+(app)").is_add_if_absent());
    }

    #[test]
    fn test_malformed_anchors_are_plain() {
        for key in [
            "(name", "name)", "()", "+()", "+(name", "+name)", "((name))", "(a)(b)",
            "x(name)", "(name)x", "+ (name)", "-(name)", "", "+",
        ] {
            assert_eq!(Anchor::parse(key), Anchor::Plain(key), "key {:?}", key);
        }
    }

    #[test]
    fn test_has_anchors_nested() {
        let v = from_json(r#"{"spec":{"containers":[{"(name)":"web"}]}}"#).unwrap();
        assert!(has_anchors(&v));
        let v = from_json(r#"{"spec":{"containers":[{"name":"web"}]}}"#).unwrap();
        assert!(!has_anchors(&v));
    }

    #[test]
    fn test_strip_anchors() {
        let overlay = from_json(
            r#"{"labels":{"+(app)":"x","(tier)":"web","plain":"p"},
                "items":[{"(name)":"a","+(port)":80}]}"#,
        )
        .unwrap();
        let expected = from_json(
            r#"{"labels":{"app":"x","tier":"web","plain":"p"},
                "items":[{"name":"a","port":80}]}"#,
        )
        .unwrap();
        assert_eq!(strip_anchors(&overlay), expected);
    }

    #[test]
    fn test_strip_anchors_plain_key_wins() {
        let overlay = from_json(r#"{"+(app)":"anchored","app":"plain","(app)":"cond"}"#).unwrap();
        let expected = from_json(r#"{"app":"plain"}"#).unwrap();
        assert_eq!(strip_anchors(&overlay), expected);
    }
}
