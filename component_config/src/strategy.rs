//! Merge strategies used when folding class chains and instance overrides.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::merge::merge;
use crate::tree::merge_tree;
use crate::value::ConfigTree;

/// How a component family combines configuration layers.
///
/// Plain components (fields, forms, emails) deep merge their layers. Block
/// containers and templates use a tree merge so a layer can patch a single
/// named node anywhere in the inherited block tree.
///
/// Declarations spell the strategy as `"merge"` or `{ tree = "blocks" }`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Deep merge every layer over the accumulator.
    #[default]
    Merge,
    /// Tree merge on the named tree key.
    Tree(String),
}

impl MergeStrategy {
    /// Tree merge on the conventional `blocks` key.
    #[must_use]
    pub fn blocks() -> Self {
        Self::Tree(crate::tree::DEFAULT_TREE_KEY.to_owned())
    }

    /// Returns the tree key when this is a tree strategy.
    #[must_use]
    pub fn tree_key(&self) -> Option<&str> {
        match self {
            Self::Merge => None,
            Self::Tree(key) => Some(key),
        }
    }

    /// Combine `layer` over `accumulated`, producing a fresh tree.
    ///
    /// A tree strategy patches the nodes of `accumulated`. When
    /// `accumulated` holds no block tree yet, such as below an abstract root
    /// template, there is nothing to target and `layer` is deep merged so it
    /// can introduce the first blocks.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use component_config::{MergeStrategy, into_tree};
    /// use serde_json::json;
    ///
    /// let parent = into_tree(json!({"blocks": {"header": {"blocks": {"logo": {"tag": "img"}}}}}));
    /// let child = into_tree(json!({"blocks": {"logo": {"tag": "svg"}}}));
    ///
    /// let merged = MergeStrategy::blocks().apply(&parent, &child);
    /// assert_eq!(merged["blocks"]["header"]["blocks"]["logo"]["tag"], "svg");
    ///
    /// let flat = MergeStrategy::Merge.apply(&parent, &child);
    /// assert_eq!(flat["blocks"]["logo"]["tag"], "svg");
    /// assert_eq!(flat["blocks"]["header"]["blocks"]["logo"]["tag"], "img");
    /// ```
    #[must_use]
    pub fn apply(&self, accumulated: &ConfigTree, layer: &ConfigTree) -> ConfigTree {
        match self {
            Self::Merge => merge([accumulated, layer]),
            Self::Tree(tree_key) if accumulated.get(tree_key.as_str()).is_some_and(Value::is_object) => {
                merge_tree(accumulated, layer, tree_key, None)
            }
            Self::Tree(_) => merge([accumulated, layer]),
        }
    }
}
