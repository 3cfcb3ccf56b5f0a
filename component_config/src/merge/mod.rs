//! Deep merge of configuration trees.
//!
//! Sources fold left to right. For every key of the incoming source:
//!
//! - keys missing from the accumulator are copied verbatim;
//! - two mappings merge recursively;
//! - two lists concatenate, the incoming entries appended after the
//!   existing ones;
//! - anything else (scalars, or shapes that differ) is replaced wholesale by
//!   the incoming value.
//!
//! Inputs are only ever borrowed, so a merge can never alias or mutate the
//! trees handed to it.

use serde_json::Value;

use crate::value::{ConfigTree, ConfigValue, Shape};

/// Merge `trees` left to right into a fresh tree.
///
/// Zero trees produce an empty tree; a single tree produces a deep copy of
/// it.
///
/// # Examples
///
/// ```rust
/// use component_config::{into_tree, merge};
/// use serde_json::json;
///
/// let base = into_tree(json!({"x": {"a": 1}, "tags": ["one"], "size": 1}));
/// let leaf = into_tree(json!({"x": {"b": 2}, "tags": ["two"], "size": 2}));
///
/// let merged = merge([&base, &leaf]);
/// assert_eq!(
///     serde_json::Value::Object(merged),
///     json!({"x": {"a": 1, "b": 2}, "tags": ["one", "two"], "size": 2})
/// );
/// ```
#[must_use]
pub fn merge<'a, I>(trees: I) -> ConfigTree
where
    I: IntoIterator<Item = &'a ConfigTree>,
{
    let mut merged = ConfigTree::new();
    for tree in trees {
        merge_into(&mut merged, tree);
    }
    merged
}

/// Overlay `layer` onto `target`, updating `target` in place.
///
/// `layer` is left untouched; every value taken from it is cloned.
pub fn merge_into(target: &mut ConfigTree, layer: &ConfigTree) {
    for (key, value) in layer {
        match target.get_mut(key) {
            Some(existing) => merge_value(existing, value),
            None => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Overlay a single `layer` value onto `target`.
///
/// # Examples
///
/// ```rust
/// use component_config::merge_value;
/// use serde_json::json;
///
/// let mut acc = json!({"class": ["hp-link"], "href": "#"});
/// merge_value(&mut acc, &json!({"class": ["hp-toggle"], "href": {"path": "/"}}));
/// assert_eq!(acc, json!({"class": ["hp-link", "hp-toggle"], "href": {"path": "/"}}));
/// ```
pub fn merge_value(target: &mut ConfigValue, layer: &ConfigValue) {
    match (target, layer) {
        (Value::Object(existing), Value::Object(incoming)) => merge_into(existing, incoming),
        (Value::Array(existing), Value::Array(incoming)) => {
            existing.extend(incoming.iter().cloned());
        }
        (existing, incoming) => *existing = incoming.clone(),
    }
}

/// Merge arbitrary values rather than trees.
///
/// Scalar sources are not trees and contribute nothing. The first
/// remaining source fixes the shape of the result, so two list sources
/// concatenate into one list. With no usable source the result is an empty
/// mapping.
///
/// # Examples
///
/// ```rust
/// use component_config::merge_sources;
/// use serde_json::json;
///
/// let merged = merge_sources([&json!(["a", "b"]), &json!("ignored"), &json!(["c"])]);
/// assert_eq!(merged, json!(["a", "b", "c"]));
/// ```
#[must_use]
pub fn merge_sources<'a, I>(values: I) -> ConfigValue
where
    I: IntoIterator<Item = &'a ConfigValue>,
{
    let mut merged: Option<ConfigValue> = None;
    for value in values {
        if Shape::of(value) == Shape::Scalar {
            continue;
        }
        merged = Some(merged.take().map_or_else(
            || value.clone(),
            |mut acc| {
                merge_value(&mut acc, value);
                acc
            },
        ));
    }
    merged.unwrap_or_else(|| Value::Object(ConfigTree::new()))
}
