//! Pairing of overlay list elements with resource list elements.
//!
//! List order is not meaningful to the resource owner, so overlay elements
//! are paired with resource elements by content rather than by position:
//!
//! - an element with condition anchors is merged into the resource element(s)
//!   satisfying all of them, and does nothing when none does
//! - any other element is merged into the first resource element not already
//!   paired or condition-matched that has no conflicting scalar field, or
//!   appended when there is none
//!
//! Resource elements never move. New elements land after all existing ones,
//! in overlay order.

use super::engine::{conditions_of, satisfies, Condition, Engine};
use super::error::Result;
use super::options::{ConditionMatch, ListPairing};
use crate::anchor::{has_anchors, strip_anchors, Anchor};
use crate::fieldpath::{Path, PathElement};
use crate::patch::PatchOperation;
use crate::value::{Map, Value};

impl Engine {
    pub(super) fn merge_lists(
        &self,
        resource: &[Value],
        overlay: &[Value],
        path: &Path,
        ops: &mut Vec<PatchOperation>,
    ) -> Result<()> {
        // Each resource element is paired at most once. Condition matches
        // count too, so later elements never pair against stale values.
        let mut consumed = vec![false; resource.len()];

        for (n, element) in overlay.iter().enumerate() {
            if let Value::Map(element_map) = element {
                let conditions = conditions_of(element_map, &path.with_index(n))?;
                if !conditions.is_empty() {
                    self.merge_conditioned(
                        resource,
                        element_map,
                        &conditions,
                        path,
                        &mut consumed,
                        ops,
                    )?;
                    continue;
                }
            }

            match self.options.list_pairing {
                ListPairing::Structural => {
                    let candidate = resource
                        .iter()
                        .enumerate()
                        .find(|(i, item)| !consumed[*i] && compatible(item, element));
                    if let Some((i, item)) = candidate {
                        consumed[i] = true;
                        let item_path = path.with_index(i);
                        tracing::debug!(path = %item_path, "paired list element");
                        self.merge_value(Some(item), element, &item_path, ops)?;
                        continue;
                    }
                }
                ListPairing::Append => {
                    if has_anchors(element) {
                        for (i, item) in resource.iter().enumerate() {
                            if item.kind() == element.kind() {
                                self.merge_value(Some(item), element, &path.with_index(i), ops)?;
                            }
                        }
                        continue;
                    }
                }
            }

            let target = path.with(PathElement::Append);
            tracing::debug!(path = %target, "appending list element");
            ops.push(PatchOperation::add(&target, strip_anchors(element)));
        }
        Ok(())
    }

    fn merge_conditioned(
        &self,
        resource: &[Value],
        element: &Map,
        conditions: &[Condition<'_>],
        path: &Path,
        consumed: &mut [bool],
        ops: &mut Vec<PatchOperation>,
    ) -> Result<()> {
        let body: Map = element
            .iter()
            .filter(|(key, _)| !Anchor::parse(key).is_condition())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let mut matched = false;
        for (i, item) in resource.iter().enumerate() {
            let item_path = path.with_index(i);
            if !satisfies(item, conditions, &item_path)? {
                continue;
            }
            matched = true;
            consumed[i] = true;
            tracing::debug!(path = %item_path, "conditions matched list element");
            self.merge_map(Some(item), &body, &item_path, ops)?;
            if self.options.condition_match == ConditionMatch::First {
                break;
            }
        }

        if !matched {
            tracing::debug!(path = %path, "no list element satisfies the conditions");
        }
        Ok(())
    }
}

/// Returns true if `element` may be merged into `item`.
///
/// Maps are compatible unless a plain scalar field of the overlay element
/// holds a different value in the resource element; sharing no scalar field
/// at all is compatible. Anything else pairs only with an equal value.
fn compatible(item: &Value, element: &Value) -> bool {
    match (element, item) {
        (Value::Map(overlay), Value::Map(resource)) => overlay.iter().all(|(key, value)| {
            let Anchor::Plain(field) = Anchor::parse(key) else {
                return true;
            };
            if !value.is_scalar() {
                return true;
            }
            resource.get(field).map_or(true, |current| current == value)
        }),
        (Value::Map(_), _) => false,
        (element, item) => element == item,
    }
}
