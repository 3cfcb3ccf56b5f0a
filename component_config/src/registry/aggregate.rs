//! Folding class chains into resolved metadata.

use tracing::{trace, warn};

use super::ClassDescriptor;
use crate::ordering::{DEFAULT_ORDER_KEY, sort_tree};
use crate::strategy::MergeStrategy;
use crate::value::{ConfigTree, get_path, get_tree_mut};

/// Folds a root-first class chain into one resolved metadata tree.
///
/// The leaf-most declared [`MergeStrategy`] applies to the whole chain. Once
/// the fold completes, every ordered entry path declared anywhere in the
/// chain is sorted a single time, so a descendant that re-orders an
/// inherited entry only has to restate its order field.
#[derive(Clone, Debug)]
pub struct Aggregator {
    order_key: String,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(DEFAULT_ORDER_KEY)
    }
}

impl Aggregator {
    /// Creates an aggregator sorting ordered entries by `order_key`.
    #[must_use]
    pub fn new(order_key: impl Into<String>) -> Self {
        Self {
            order_key: order_key.into(),
        }
    }

    /// Field consulted when sorting ordered entries.
    #[must_use]
    pub fn order_key(&self) -> &str {
        &self.order_key
    }

    /// Resolve `chain`, ordered root first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use component_config::{Aggregator, ClassDescriptor, into_tree};
    /// use serde_json::json;
    ///
    /// let field = ClassDescriptor::new("field")
    ///     .with_metadata(into_tree(json!({"settings": {"required": {"_order": 100}}})))
    ///     .order_entries_in("settings");
    /// let number = ClassDescriptor::new("number")
    ///     .extends("field")
    ///     .with_metadata(into_tree(json!({"settings": {"decimals": {"_order": 20}}})));
    ///
    /// let resolved = Aggregator::new("_order").resolve([&field, &number]);
    /// let settings: Vec<_> = resolved["settings"].as_object().into_iter().flat_map(|s| s.keys()).collect();
    /// assert_eq!(settings, ["decimals", "required"]);
    /// ```
    #[must_use]
    pub fn resolve<'a, I>(&self, chain: I) -> ConfigTree
    where
        I: IntoIterator<Item = &'a ClassDescriptor>,
    {
        let classes: Vec<&ClassDescriptor> = chain.into_iter().collect();
        let strategy = chain_strategy(&classes);

        let mut layers = classes.iter().map(|class| class.metadata());
        let Some(seed) = layers.next() else {
            return ConfigTree::new();
        };
        let mut resolved = seed.clone();
        for layer in layers {
            resolved = strategy.apply(&resolved, layer);
        }

        for path in chain_ordered_paths(&classes) {
            let segments: Vec<&str> = path.split('.').collect();
            let exists = resolved_path_exists(&resolved, &segments);
            match get_tree_mut(&mut resolved, &segments) {
                Some(entries) => {
                    trace!(path = %path, "sorting ordered entries");
                    *entries = sort_tree(entries, &self.order_key);
                }
                None if exists => {
                    warn!(path = %path, "ordered path is not a mapping; left unsorted");
                }
                None => {}
            }
        }
        resolved
    }
}

/// Resolve `chain` with the default order key.
///
/// # Examples
///
/// ```rust
/// use component_config::{ClassDescriptor, into_tree, resolve_class_metadata};
/// use serde_json::json;
///
/// let base = ClassDescriptor::new("base").with_metadata(into_tree(json!({"x": 1, "y": 1})));
/// let mid = ClassDescriptor::new("mid").extends("base").with_metadata(into_tree(json!({"y": 2})));
/// let leaf = ClassDescriptor::new("leaf").extends("mid").with_metadata(into_tree(json!({"z": 3})));
///
/// let resolved = resolve_class_metadata([&base, &mid, &leaf]);
/// assert_eq!(serde_json::Value::Object(resolved), json!({"x": 1, "y": 2, "z": 3}));
/// ```
#[must_use]
pub fn resolve_class_metadata<'a, I>(chain: I) -> ConfigTree
where
    I: IntoIterator<Item = &'a ClassDescriptor>,
{
    Aggregator::default().resolve(chain)
}

/// The leaf-most strategy declared along `chain`.
pub(crate) fn chain_strategy(chain: &[&ClassDescriptor]) -> MergeStrategy {
    chain
        .iter()
        .rev()
        .find_map(|class| class.strategy())
        .cloned()
        .unwrap_or_default()
}

fn chain_ordered_paths<'a>(chain: &[&'a ClassDescriptor]) -> Vec<&'a str> {
    let mut paths: Vec<&str> = Vec::new();
    for path in chain.iter().flat_map(|class| class.ordered_paths()) {
        if !paths.contains(&path.as_str()) {
            paths.push(path);
        }
    }
    paths
}

fn resolved_path_exists(tree: &ConfigTree, segments: &[&str]) -> bool {
    get_path(tree, segments).is_some()
}
