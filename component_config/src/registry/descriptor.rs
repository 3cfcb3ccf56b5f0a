//! Component class descriptors.

use std::fmt;
use std::sync::Arc;

use crate::lifecycle::{DeriveContext, DeriveHook};
use crate::strategy::MergeStrategy;
use crate::value::ConfigTree;

/// A component class: its declared metadata and its place in the hierarchy.
///
/// # Examples
///
/// ```rust
/// use component_config::{ClassDescriptor, MergeStrategy, into_tree};
/// use serde_json::json;
///
/// let number = ClassDescriptor::new("number")
///     .extends("field")
///     .with_metadata(into_tree(json!({
///         "title": "Number",
///         "settings": {"decimals": {"type": "number", "default": 0, "order": 20}}
///     })))
///     .order_entries_in("settings")
///     .derive_with(|tree, _ctx| {
///         tree.insert("step".into(), json!(1));
///     });
///
/// assert_eq!(number.name(), "number");
/// assert_eq!(number.parent(), Some("field"));
/// assert_eq!(number.strategy(), None::<&MergeStrategy>);
/// ```
#[derive(Clone)]
pub struct ClassDescriptor {
    name: String,
    parent: Option<String>,
    metadata: ConfigTree,
    strategy: Option<MergeStrategy>,
    ordered: Vec<String>,
    hook: Option<Arc<dyn DeriveHook>>,
}

impl ClassDescriptor {
    /// Creates a root class with no metadata.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            metadata: ConfigTree::new(),
            strategy: None,
            ordered: Vec::new(),
            hook: None,
        }
    }

    /// Names the immediate parent class.
    #[must_use]
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Sets the class's own declared metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: ConfigTree) -> Self {
        self.metadata = metadata;
        self
    }

    /// Sets the merge strategy for this class and, unless overridden, its
    /// descendants.
    #[must_use]
    pub fn with_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Marks a dot-separated path (`settings`, `meta.settings`) whose named
    /// entries are sorted by their order field once the chain is resolved.
    #[must_use]
    pub fn order_entries_in(mut self, path: impl Into<String>) -> Self {
        let entry_path = path.into();
        if !self.ordered.contains(&entry_path) {
            self.ordered.push(entry_path);
        }
        self
    }

    /// Attaches a derive hook.
    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn DeriveHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Attaches a closure as the derive hook.
    #[must_use]
    pub fn derive_with<F>(self, hook: F) -> Self
    where
        F: Fn(&mut ConfigTree, &DeriveContext) + Send + Sync + 'static,
    {
        self.with_hook(Arc::new(hook))
    }

    pub(crate) fn set_hook(&mut self, hook: Arc<dyn DeriveHook>) {
        self.hook = Some(hook);
    }

    /// Class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Immediate parent, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// The class's own declared metadata, before any inheritance.
    #[must_use]
    pub const fn metadata(&self) -> &ConfigTree {
        &self.metadata
    }

    /// Strategy declared by this class itself.
    #[must_use]
    pub const fn strategy(&self) -> Option<&MergeStrategy> {
        self.strategy.as_ref()
    }

    /// Ordered entry paths declared by this class itself.
    #[must_use]
    pub fn ordered_paths(&self) -> &[String] {
        &self.ordered
    }

    /// The class's derive hook.
    #[must_use]
    pub fn hook(&self) -> Option<&dyn DeriveHook> {
        self.hook.as_deref()
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("metadata", &self.metadata)
            .field("strategy", &self.strategy)
            .field("ordered", &self.ordered)
            .field("hook", &self.hook.as_ref().map(|_| "<hook>"))
            .finish()
    }
}
