//! Configuration value model.
//!
//! Configuration trees are JSON-shaped: every value is a scalar, an ordered
//! list, or an insertion-ordered mapping. [`serde_json::Value`] already is
//! that tagged union, so the crate uses it directly and layers [`Shape`] on
//! top to make the merge decisions explicit.

use serde_json::{Map, Value};

/// A single configuration value: scalar, list, or mapping.
pub type ConfigValue = Value;

/// An insertion-ordered mapping of configuration keys to values.
pub type ConfigTree = Map<String, Value>;

/// Structural classification of a [`ConfigValue`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Shape {
    /// Null, boolean, number, or string.
    Scalar,
    /// Ordered list whose entries accumulate by append.
    List,
    /// Named entries that merge key by key.
    Mapping,
}

impl Shape {
    /// Classify `value`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use component_config::Shape;
    /// use serde_json::json;
    ///
    /// assert_eq!(Shape::of(&json!(1)), Shape::Scalar);
    /// assert_eq!(Shape::of(&json!([1, 2])), Shape::List);
    /// assert_eq!(Shape::of(&json!({"a": 1})), Shape::Mapping);
    /// ```
    #[must_use]
    pub const fn of(value: &ConfigValue) -> Self {
        match value {
            Value::Array(_) => Self::List,
            Value::Object(_) => Self::Mapping,
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Self::Scalar,
        }
    }
}

/// Convert an arbitrary value into a tree.
///
/// Mappings are returned as-is; scalars and lists are not trees and yield an
/// empty tree.
///
/// # Examples
///
/// ```rust
/// use component_config::into_tree;
/// use serde_json::json;
///
/// assert_eq!(into_tree(json!({"a": 1})).len(), 1);
/// assert!(into_tree(json!("not a tree")).is_empty());
/// ```
#[must_use]
pub fn into_tree(value: ConfigValue) -> ConfigTree {
    match value {
        Value::Object(map) => map,
        _ => ConfigTree::new(),
    }
}

/// Follow `path` through nested mappings, returning the value at its end.
///
/// An empty path yields `None`; lists are not traversed.
#[must_use]
pub fn get_path<'a, S: AsRef<str>>(tree: &'a ConfigTree, path: &[S]) -> Option<&'a ConfigValue> {
    let (first, rest) = path.split_first()?;
    let mut current = tree.get(first.as_ref())?;
    for segment in rest {
        current = current.as_object()?.get(segment.as_ref())?;
    }
    Some(current)
}

/// Mutable counterpart of [`get_path`] restricted to mapping targets.
pub(crate) fn get_tree_mut<'a>(tree: &'a mut ConfigTree, path: &[&str]) -> Option<&'a mut ConfigTree> {
    let mut current = tree;
    for segment in path {
        current = current.get_mut(*segment)?.as_object_mut()?;
    }
    Some(current)
}
