//! Stable ordering of named entries by an explicit order hint.
//!
//! Contributors attach a numeric order field to the entries they declare
//! (form fields, settings, blocks). Entries without one sort as `0`, and
//! equal orders keep their insertion order, so independent contributors can
//! reserve numeric bands (10, 20, 30) and still get a reproducible layout.

use std::cmp::Ordering;

use serde_json::{Number, Value};

use crate::value::ConfigTree;

/// Field consulted when no other order key is configured.
pub const DEFAULT_ORDER_KEY: &str = "order";

/// A named entry paired with its effective order.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderedEntry {
    /// Entry name within the source mapping.
    pub key: String,
    /// Entry body, with the order field filled in.
    pub value: ConfigTree,
    /// Effective order; `0.0` when the entry declared none.
    pub order: f64,
}

/// Order the mapping entries of `entries` by their `order_key` field.
///
/// Every mapping entry missing the field is assigned `0`, and the field is
/// written into the returned entry. Values that are not mappings cannot carry
/// an order and are left out. Order values that are not numbers count as `0`.
///
/// # Examples
///
/// ```rust
/// use component_config::{into_tree, order_entries};
/// use serde_json::json;
///
/// let entries = into_tree(json!({
///     "p": {},
///     "q": {"order": 5},
///     "r": {"order": 5},
///     "s": {"order": -1},
/// }));
/// let keys: Vec<_> = order_entries(&entries, "order")
///     .into_iter()
///     .map(|entry| entry.key)
///     .collect();
/// assert_eq!(keys, ["s", "p", "q", "r"]);
/// ```
#[must_use]
pub fn order_entries(entries: &ConfigTree, order_key: &str) -> Vec<OrderedEntry> {
    let mut ordered: Vec<OrderedEntry> = entries
        .iter()
        .filter_map(|(key, value)| {
            let mut body = value.as_object()?.clone();
            let order = body.get(order_key).and_then(Value::as_f64).unwrap_or(0.0);
            if !body.contains_key(order_key) {
                body.insert(order_key.to_owned(), Value::Number(Number::from(0)));
            }
            Some(OrderedEntry {
                key: key.clone(),
                value: body,
                order,
            })
        })
        .collect();
    // `sort_by` is stable, so ties keep insertion order.
    ordered.sort_by(|left, right| compare_orders(left.order, right.order));
    ordered
}

/// Rebuild `entries` as a tree laid out in ascending order.
///
/// # Examples
///
/// ```rust
/// use component_config::{into_tree, sort_tree};
/// use serde_json::json;
///
/// let fields = into_tree(json!({
///     "s": {"order": 10},
///     "_category": {"order": 5},
///     "post_type": {"type": "hidden"},
/// }));
/// let sorted = sort_tree(&fields, "order");
/// let keys: Vec<_> = sorted.keys().map(String::as_str).collect();
/// assert_eq!(keys, ["post_type", "_category", "s"]);
/// ```
#[must_use]
pub fn sort_tree(entries: &ConfigTree, order_key: &str) -> ConfigTree {
    order_entries(entries, order_key)
        .into_iter()
        .map(|entry| (entry.key, Value::Object(entry.value)))
        .collect()
}

fn compare_orders(left: f64, right: f64) -> Ordering {
    left.total_cmp(&right)
}
