//! Recursive overlay merge.

use super::error::{OverlayError, Result};
use super::options::OverlayOptions;
use crate::anchor::{matches, strip_anchors, strip_map_anchors, Anchor};
use crate::fieldpath::{Path, PathElement};
use crate::patch::{apply_patch_to_value, PatchOperation};
use crate::value::{Map, Value};

/// A condition pulled from an overlay object: field name and condition value.
pub(super) type Condition<'a> = (&'a str, &'a Value);

/// Engine compiles overlays into JSON Patch operations.
///
/// The engine keeps no state between calls; one value can serve any number
/// of concurrent callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Engine {
    pub(super) options: OverlayOptions,
}

/// Computes the operations that make `resource` satisfy `overlay`, using
/// default options. `resource` is the value found at `path`.
pub fn apply_overlay(resource: &Value, overlay: &Value, path: &Path) -> Result<Vec<PatchOperation>> {
    Engine::default().patches(resource, overlay, path)
}

impl Engine {
    pub fn new(options: OverlayOptions) -> Self {
        Engine { options }
    }

    pub fn options(&self) -> &OverlayOptions {
        &self.options
    }

    /// Computes the operations that make `resource` satisfy `overlay`.
    ///
    /// `resource` is the resource subtree found at `path`; every emitted
    /// operation targets `path` or a location below it. On error nothing is
    /// returned, so a partial patch can never be applied.
    pub fn patches(
        &self,
        resource: &Value,
        overlay: &Value,
        path: &Path,
    ) -> Result<Vec<PatchOperation>> {
        let mut ops = Vec::new();
        self.merge_value(Some(resource), overlay, path, &mut ops)?;
        tracing::debug!(path = %path, operations = ops.len(), "compiled overlay");
        Ok(ops)
    }

    /// Like [`Engine::patches`], but `document` is the whole resource and
    /// `path` is resolved inside it first.
    ///
    /// A missing last token is treated as absent, so the overlay is added
    /// there. Any other unresolvable token is a structural error.
    pub fn patches_at(
        &self,
        document: &Value,
        overlay: &Value,
        path: &Path,
    ) -> Result<Vec<PatchOperation>> {
        let resource = resolve(document, path)?;
        let mut ops = Vec::new();
        self.merge_value(resource, overlay, path, &mut ops)?;
        tracing::debug!(path = %path, operations = ops.len(), "compiled overlay");
        Ok(ops)
    }

    /// Computes the patch for the whole document and applies it.
    pub fn apply(&self, document: &Value, overlay: &Value) -> Result<Value> {
        let ops = self.patches(document, overlay, &Path::new())?;
        apply_patch_to_value(document, &ops)
    }

    /// Dispatches on the overlay's kind. `resource` is None where the
    /// resource has nothing at `path`; the parent is known to exist.
    pub(super) fn merge_value(
        &self,
        resource: Option<&Value>,
        overlay: &Value,
        path: &Path,
        ops: &mut Vec<PatchOperation>,
    ) -> Result<()> {
        match overlay {
            Value::Map(overlay_map) => self.merge_map(resource, overlay_map, path, ops),
            Value::List(overlay_items) => match resource {
                Some(Value::List(items)) => self.merge_lists(items, overlay_items, path, ops),
                _ => {
                    put(resource, strip_anchors(overlay), path, ops);
                    Ok(())
                }
            },
            scalar => {
                if resource != Some(scalar) {
                    put(resource, scalar.clone(), path, ops);
                }
                Ok(())
            }
        }
    }

    pub(super) fn merge_map(
        &self,
        resource: Option<&Value>,
        overlay: &Map,
        path: &Path,
        ops: &mut Vec<PatchOperation>,
    ) -> Result<()> {
        // Conditions inside a brand-new subtree have nothing to test.
        let Some(current) = resource else {
            put(None, Value::Map(strip_map_anchors(overlay)), path, ops);
            return Ok(());
        };

        let conditions = conditions_of(overlay, path)?;
        if !conditions.is_empty() && !satisfies(current, &conditions, path)? {
            tracing::debug!(path = %path, "conditions not satisfied, skipping object");
            return Ok(());
        }

        let current = match current {
            Value::Map(m) => m,
            other => {
                put(Some(other), Value::Map(strip_map_anchors(overlay)), path, ops);
                return Ok(());
            }
        };

        for (key, value) in overlay.iter() {
            match Anchor::parse(key) {
                Anchor::Condition(_) => {}
                Anchor::Plain(field) => {
                    self.merge_value(current.get(field), value, &path.with_field(field), ops)?;
                }
                Anchor::AddIfAbsent(field) => {
                    let field_path = path.with_field(field);
                    if current.has(field) {
                        tracing::debug!(path = %field_path, "field present, not adding");
                    } else {
                        put(None, strip_anchors(value), &field_path, ops);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Emits `add` where the resource has nothing and `replace` where it has a
/// value. `replace` keeps list positions stable where `add` would insert.
fn put(resource: Option<&Value>, value: Value, path: &Path, ops: &mut Vec<PatchOperation>) {
    let op = match resource {
        None => PatchOperation::add(path, value),
        Some(_) => PatchOperation::replace(path, value),
    };
    tracing::trace!(operation = %op, "emit");
    ops.push(op);
}

/// Collects the condition anchors of an overlay object. Condition values must
/// be scalars.
pub(super) fn conditions_of<'a>(overlay: &'a Map, path: &Path) -> Result<Vec<Condition<'a>>> {
    let mut conditions = Vec::new();
    for (key, value) in overlay.iter() {
        if let Anchor::Condition(field) = Anchor::parse(key) {
            if !value.is_scalar() {
                return Err(OverlayError::type_mismatch(
                    &path.with_field(key.as_str()),
                    format!("condition value must be a scalar, got {}", value.kind()),
                ));
            }
            conditions.push((field, value));
        }
    }
    Ok(conditions)
}

/// Returns true if `resource` is a map whose fields satisfy every condition.
pub(super) fn satisfies(resource: &Value, conditions: &[Condition<'_>], path: &Path) -> Result<bool> {
    let Value::Map(fields) = resource else {
        return Ok(false);
    };
    for (field, pattern) in conditions {
        let Some(actual) = fields.get(field) else {
            return Ok(false);
        };
        let ok = matches(pattern, actual)
            .map_err(|e| OverlayError::from_pattern(&path.with_field(*field), e))?;
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Finds the value at `path` in `document`. Returns None when only the last
/// token is missing.
fn resolve<'a>(document: &'a Value, path: &Path) -> Result<Option<&'a Value>> {
    let elements = path.as_slice();
    let mut current = document;
    for (i, element) in elements.iter().enumerate() {
        let last = i + 1 == elements.len();
        let here = Path::from_elements(elements[..=i].to_vec());
        let next = match (current, element) {
            (Value::Map(m), element) => m.get(&element.token()),
            (Value::List(items), PathElement::Index(idx)) => {
                if *idx > items.len() || (*idx == items.len() && !last) {
                    return Err(OverlayError::structural(
                        &here,
                        format!("index out of range for list of length {}", items.len()),
                    ));
                }
                items.get(*idx)
            }
            (Value::List(_), PathElement::Append) if last => None,
            (Value::List(_), _) => {
                return Err(OverlayError::structural(&here, "not a valid list index"));
            }
            (other, _) => {
                return Err(OverlayError::structural(
                    &here,
                    format!("cannot descend into {}", other.kind()),
                ));
            }
        };
        match next {
            Some(v) => current = v,
            None if last => return Ok(None),
            None => return Err(OverlayError::structural(&here, "path does not exist")),
        }
    }
    Ok(Some(current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_json;

    fn ops_json(ops: &[PatchOperation]) -> serde_json::Value {
        serde_json::to_value(ops).unwrap()
    }

    #[test]
    fn test_scalar_rules() {
        let path = Path::new().with_field("replicas");
        let engine = Engine::default();

        let ops = engine.patches(&Value::Int(1), &Value::Int(1), &path).unwrap();
        assert!(ops.is_empty());

        let ops = engine.patches(&Value::Int(1), &Value::Int(3), &path).unwrap();
        assert_eq!(ops, vec![PatchOperation::replace(&path, Value::Int(3))]);

        let ops = engine.patches(&Value::from("1"), &Value::Int(1), &path).unwrap();
        assert_eq!(ops, vec![PatchOperation::replace(&path, Value::Int(1))]);
    }

    #[test]
    fn test_plain_fields() {
        let resource = from_json(r#"{"metadata":{"name":"web","labels":{"app":"nginx"}}}"#).unwrap();
        let overlay = from_json(r#"{"metadata":{"name":"web","labels":{"app":"nginx","tier":"front"}},"spec":{"replicas":2}}"#).unwrap();

        let ops = apply_overlay(&resource, &overlay, &Path::new()).unwrap();
        assert_eq!(
            ops_json(&ops),
            serde_json::json!([
                {"op": "add", "path": "/metadata/labels/tier", "value": "front"},
                {"op": "add", "path": "/spec", "value": {"replicas": 2}},
            ])
        );
    }

    #[test]
    fn test_object_over_scalar_is_replaced() {
        let resource = from_json(r#"{"spec":"none"}"#).unwrap();
        let overlay = from_json(r#"{"spec":{"+(replicas)":1}}"#).unwrap();
        let ops = apply_overlay(&resource, &overlay, &Path::new()).unwrap();
        assert_eq!(
            ops_json(&ops),
            serde_json::json!([{"op": "replace", "path": "/spec", "value": {"replicas": 1}}])
        );
    }

    #[test]
    fn test_object_level_condition_gates_whole_object() {
        let resource = from_json(r#"{"metadata":{"name":"web","labels":{"app":"nginx"}}}"#).unwrap();

        let overlay = from_json(r#"{"metadata":{"(name)":"db","labels":{"tier":"data"}}}"#).unwrap();
        assert!(apply_overlay(&resource, &overlay, &Path::new()).unwrap().is_empty());

        let overlay = from_json(r#"{"metadata":{"(name)":"w*","labels":{"tier":"front"}}}"#).unwrap();
        let ops = apply_overlay(&resource, &overlay, &Path::new()).unwrap();
        assert_eq!(
            ops_json(&ops),
            serde_json::json!([{"op": "add", "path": "/metadata/labels/tier", "value": "front"}])
        );

        let overlay = from_json(r#"{"metadata":{"(owner)":"*","labels":{"tier":"front"}}}"#).unwrap();
        assert!(apply_overlay(&resource, &overlay, &Path::new()).unwrap().is_empty());
    }

    #[test]
    fn test_condition_over_scalar_resource_skips() {
        let resource = from_json(r#"{"spec":"none"}"#).unwrap();
        let overlay = from_json(r#"{"spec":{"(kind)":"x","replicas":1}}"#).unwrap();
        assert!(apply_overlay(&resource, &overlay, &Path::new()).unwrap().is_empty());
    }

    #[test]
    fn test_new_subtree_is_stripped() {
        let resource = from_json(r#"{"metadata":{}}"#).unwrap();
        let overlay = from_json(r#"{"metadata":{"labels":{"(app)":"nginx","+(tier)":"web"}}}"#).unwrap();
        let ops = apply_overlay(&resource, &overlay, &Path::new()).unwrap();
        assert_eq!(
            ops_json(&ops),
            serde_json::json!([{"op": "add", "path": "/metadata/labels", "value": {"app": "nginx", "tier": "web"}}])
        );
    }

    #[test]
    fn test_add_if_absent() {
        let resource = from_json(r#"{"labels":{"app":"nginx"}}"#).unwrap();
        let overlay = from_json(r#"{"labels":{"+(app)":"X","+(key1)":"v1"}}"#).unwrap();
        let ops = apply_overlay(&resource, &overlay, &Path::new()).unwrap();
        assert_eq!(
            ops_json(&ops),
            serde_json::json!([{"op": "add", "path": "/labels/key1", "value": "v1"}])
        );
    }

    #[test]
    fn test_non_scalar_condition_is_error() {
        let resource = from_json(r#"{"metadata":{"name":"web"}}"#).unwrap();
        let overlay = from_json(r#"{"metadata":{"(name)":["web"]}}"#).unwrap();
        let err = apply_overlay(&resource, &overlay, &Path::new()).unwrap_err();
        assert!(matches!(err, OverlayError::TypeMismatch { .. }));
        assert_eq!(err.to_string(), "/metadata/(name): type mismatch: condition value must be a scalar, got list");
    }

    #[test]
    fn test_keys_are_escaped() {
        let resource = from_json(r#"{"metadata":{"annotations":{}}}"#).unwrap();
        let overlay = from_json(r#"{"metadata":{"annotations":{"example.com/owner":"team~a"}}}"#).unwrap();
        let ops = apply_overlay(&resource, &overlay, &Path::new()).unwrap();
        assert_eq!(ops[0].path(), "/metadata/annotations/example.com~1owner");
    }

    #[test]
    fn test_patches_at_resolves_path() {
        let document = from_json(r#"{"spec":{"template":{"metadata":{"labels":{"app":"web"}}}}}"#).unwrap();
        let overlay = from_json(r#"{"+(tier)":"front"}"#).unwrap();
        let path = Path::parse("/spec/template/metadata/labels").unwrap();

        let ops = Engine::default().patches_at(&document, &overlay, &path).unwrap();
        assert_eq!(
            ops_json(&ops),
            serde_json::json!([{"op": "add", "path": "/spec/template/metadata/labels/tier", "value": "front"}])
        );
    }

    #[test]
    fn test_patches_at_missing_leaf_is_added() {
        let document = from_json(r#"{"metadata":{"name":"web"}}"#).unwrap();
        let overlay = from_json(r#"{"app":"web"}"#).unwrap();
        let path = Path::parse("/metadata/labels").unwrap();

        let ops = Engine::default().patches_at(&document, &overlay, &path).unwrap();
        assert_eq!(
            ops_json(&ops),
            serde_json::json!([{"op": "add", "path": "/metadata/labels", "value": {"app": "web"}}])
        );
    }

    #[test]
    fn test_patches_at_structural_errors() {
        let document = from_json(r#"{"metadata":{"name":"web"},"items":[1,2]}"#).unwrap();
        let overlay = from_json(r#"{"a":1}"#).unwrap();
        let engine = Engine::default();

        for pointer in ["/metadata/name/x", "/spec/replicas", "/items/5", "/items/2/x", "/items/name"] {
            let path = Path::parse(pointer).unwrap();
            let err = engine.patches_at(&document, &overlay, &path).unwrap_err();
            assert!(matches!(err, OverlayError::Structural { .. }), "{}: {:?}", pointer, err);
        }

        let ops = engine.patches_at(&document, &Value::Int(3), &Path::parse("/items/-").unwrap()).unwrap();
        assert_eq!(ops_json(&ops), serde_json::json!([{"op": "add", "path": "/items/-", "value": 3}]));
    }

    #[test]
    fn test_apply_whole_document() {
        let document = from_json(r#"{"spec":{"replicas":1}}"#).unwrap();
        let overlay = from_json(r#"{"spec":{"replicas":3,"+(paused)":false}}"#).unwrap();
        let patched = Engine::default().apply(&document, &overlay).unwrap();
        assert_eq!(patched, from_json(r#"{"spec":{"replicas":3,"paused":false}}"#).unwrap());
    }
}
