//! Tree-aware merging for nested named sub-trees ("block trees").
//!
//! A block tree nests named nodes under a tree key, usually `blocks`:
//!
//! ```text
//! blocks:
//!   page_container:
//!     blocks:
//!       page_content: { tag: main, blocks: { page_title: {...} } }
//! ```
//!
//! An override only has to name the node it patches. Wherever that node sits
//! in the parent, the override finds it by depth-first search, so a child
//! template can reach `page_title` without restating `page_container` and
//! `page_content`. Node keys must therefore be unique across a tree; when
//! they are not, the first depth-first match in the override wins.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::merge::merge_into;
use crate::value::{ConfigTree, ConfigValue};


/// Tree key used by templates and block containers.
pub const DEFAULT_TREE_KEY: &str = "blocks";

/// Diagnostic record of a tree merge.
///
/// Missing targets are not errors; callers that need a target to exist can
/// check [`TreeMergeReport::found`] instead.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TreeMergeReport {
    applied: Vec<String>,
    grafted: Vec<String>,
}

impl TreeMergeReport {
    /// Existing parent nodes that received an override, in visit order.
    #[must_use]
    pub fn applied(&self) -> &[String] {
        &self.applied
    }

    /// New nodes added beneath a node that received an override.
    #[must_use]
    pub fn grafted(&self) -> &[String] {
        &self.grafted
    }

    /// Returns `true` when an existing node named `node_key` received an
    /// override.
    #[must_use]
    pub fn found(&self, node_key: &str) -> bool {
        self.applied.iter().any(|key| key == node_key)
    }
}

/// Merge `overrides` into the block tree `parent`.
///
/// With `node_key = None` (whole-subtree mode) every node of `parent` is first
/// patched with the override node of the same name, then the override's
/// remaining top-level fields merge onto the root. With `node_key = Some(k)`
/// (targeted mode) `parent` is the node named `k`, and only the override node
/// found under that name is merged onto it.
///
/// Each override node is applied once. Children declared inside an override
/// node that matched are added beneath it when `parent` has no node of that
/// name. Top-level override nodes that match nothing are dropped.
///
/// # Examples
///
/// ```rust
/// use component_config::{into_tree, merge_tree};
/// use serde_json::json;
///
/// let parent = into_tree(json!({
///     "blocks": {
///         "container": {
///             "tag": "div",
///             "blocks": {
///                 "header": {"tag": "header"},
///                 "footer": {"tag": "footer"}
///             }
///         }
///     }
/// }));
/// let overrides = into_tree(json!({"blocks": {"footer": {"tag": "aside"}}}));
///
/// let merged = merge_tree(&parent, &overrides, "blocks", None);
/// assert_eq!(
///     merged["blocks"]["container"]["blocks"]["footer"],
///     json!({"tag": "aside"})
/// );
/// assert_eq!(
///     merged["blocks"]["container"]["blocks"]["header"],
///     json!({"tag": "header"})
/// );
/// ```
#[must_use]
pub fn merge_tree(
    parent: &ConfigTree,
    overrides: &ConfigTree,
    tree_key: &str,
    node_key: Option<&str>,
) -> ConfigTree {
    merge_tree_with_report(parent, overrides, tree_key, node_key).0
}

/// Same as [`merge_tree`], also reporting which nodes were touched.
///
/// # Examples
///
/// ```rust
/// use component_config::{into_tree, merge_tree_with_report};
/// use serde_json::json;
///
/// let parent = into_tree(json!({"blocks": {"header": {}}}));
/// let overrides = into_tree(json!({"blocks": {"heder": {"tag": "nav"}}}));
///
/// let (merged, report) = merge_tree_with_report(&parent, &overrides, "blocks", None);
/// assert_eq!(merged, parent);
/// assert!(!report.found("heder"));
/// ```
#[must_use]
pub fn merge_tree_with_report(
    parent: &ConfigTree,
    overrides: &ConfigTree,
    tree_key: &str,
    node_key: Option<&str>,
) -> (ConfigTree, TreeMergeReport) {
    let mut merger = TreeMerger {
        overrides,
        tree_key,
        known: node_keys(parent, tree_key),
        report: TreeMergeReport::default(),
    };
    let merged = merger.apply(parent.clone(), node_key);
    (merged, merger.report)
}

/// Find the node named `node_key` anywhere in `tree`.
///
/// The search first follows `tree[tree_key][node_key]`; when a key is
/// missing it descends depth-first into every nested mapping and list,
/// returning the first match.
///
/// # Examples
///
/// ```rust
/// use component_config::{find_node, into_tree};
/// use serde_json::json;
///
/// let tree = into_tree(json!({
///     "blocks": {"container": {"blocks": {"footer": {"tag": "footer"}}}}
/// }));
/// assert_eq!(
///     find_node(&tree, "blocks", "footer"),
///     Some(&json!({"tag": "footer"}))
/// );
/// assert!(find_node(&tree, "blocks", "sidebar").is_none());
/// ```
#[must_use]
pub fn find_node<'a>(tree: &'a ConfigTree, tree_key: &str, node_key: &str) -> Option<&'a ConfigValue> {
    search(tree, &[tree_key, node_key])
}

struct TreeMerger<'a> {
    overrides: &'a ConfigTree,
    tree_key: &'a str,
    known: HashSet<String>,
    report: TreeMergeReport,
}

impl TreeMerger<'_> {
    fn apply(&mut self, mut tree: ConfigTree, node_key: Option<&str>) -> ConfigTree {
        if let Some(Value::Object(children)) = tree.get_mut(self.tree_key) {
            for (child_key, child) in children.iter_mut() {
                if let Value::Object(node) = child {
                    let taken = std::mem::take(node);
                    *node = self.apply(taken, Some(child_key.as_str()));
                }
            }
        }

        let located = match node_key {
            None => Some(self.overrides),
            Some(key) => find_node(self.overrides, self.tree_key, key).and_then(Value::as_object),
        };
        let Some(source) = located else {
            return tree;
        };
        match node_key {
            Some(key) => {
                debug!(node = %key, "applying override to block node");
                self.report.applied.push(key.to_owned());
            }
            None => self.log_unmatched(source),
        }

        // Nested nodes were distributed by the recursion above.
        let fields: ConfigTree = source
            .iter()
            .filter(|(key, _)| key.as_str() != self.tree_key)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        merge_into(&mut tree, &fields);

        if node_key.is_some()
            && let Some(Value::Object(declared)) = source.get(self.tree_key)
        {
            self.graft(&mut tree, declared);
        }
        tree
    }

    fn log_unmatched(&self, source: &ConfigTree) {
        let Some(Value::Object(declared)) = source.get(self.tree_key) else {
            return;
        };
        for key in declared.keys().filter(|key| !self.known.contains(key.as_str())) {
            debug!(node = %key, "override node has no target; skipped");
        }
    }

    fn graft(&mut self, tree: &mut ConfigTree, declared: &ConfigTree) {
        let fresh: Vec<(String, Value)> = declared
            .iter()
            .filter(|(key, value)| value.is_object() && !self.known.contains(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if fresh.is_empty() {
            return;
        }

        let slot = tree
            .entry(self.tree_key)
            .or_insert_with(|| Value::Object(ConfigTree::new()));
        if !slot.is_object() {
            *slot = Value::Object(ConfigTree::new());
        }
        let Value::Object(children) = slot else {
            return;
        };
        for (key, node) in fresh {
            debug!(node = %key, "grafting new block node");
            self.known.insert(key.clone());
            self.report.grafted.push(key.clone());
            children.insert(key, node);
        }
    }
}

fn node_keys(tree: &ConfigTree, tree_key: &str) -> HashSet<String> {
    let mut keys = HashSet::new();
    collect_node_keys(tree, tree_key, &mut keys);
    keys
}

fn collect_node_keys(tree: &ConfigTree, tree_key: &str, keys: &mut HashSet<String>) {
    let Some(Value::Object(children)) = tree.get(tree_key) else {
        return;
    };
    for (key, child) in children {
        if let Value::Object(node) = child {
            keys.insert(key.clone());
            collect_node_keys(node, tree_key, keys);
        }
    }
}

fn search<'a>(tree: &'a ConfigTree, keys: &[&str]) -> Option<&'a ConfigValue> {
    let mut current = tree;
    for (index, key) in keys.iter().enumerate() {
        match current.get(*key) {
            Some(value) if !value.is_null() => {
                if index + 1 == keys.len() {
                    return Some(value);
                }
                if let Value::Object(next) = value {
                    current = next;
                }
            }
            _ => return current.values().find_map(|value| search_value(value, keys)),
        }
    }
    None
}

fn search_value<'a>(value: &'a ConfigValue, keys: &[&str]) -> Option<&'a ConfigValue> {
    match value {
        Value::Object(map) => search(map, keys),
        Value::Array(items) => items.iter().find_map(|item| search_value(item, keys)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => None,
    }
}
