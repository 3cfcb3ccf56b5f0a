//! Derive hooks invoked once an instance tree is configured.
//!
//! Hooks compute attributes that depend on other configured fields, such as
//! an input `step` derived from `decimals`, and write them back into the
//! instance tree. They run root class first, so a descendant sees the values
//! its ancestors derived and may overwrite them.

use crate::value::ConfigTree;

/// Hook invoked during the Derived stage of the component lifecycle.
///
/// Closures of the shape `Fn(&mut ConfigTree, &DeriveContext)` implement this
/// trait, so most classes attach a hook with
/// [`crate::ClassDescriptor::derive_with`].
///
/// # Examples
///
/// ```rust
/// use component_config::{ConfigTree, DeriveContext, DeriveHook};
/// use serde_json::json;
///
/// struct RequiredAttribute;
///
/// impl DeriveHook for RequiredAttribute {
///     fn derive(&self, tree: &mut ConfigTree, _ctx: &DeriveContext) {
///         if tree.get("required") == Some(&json!(true)) {
///             tree.insert("attributes".into(), json!({"required": true}));
///         }
///     }
/// }
/// ```
pub trait DeriveHook: Send + Sync {
    /// Adjust the configured instance tree in place.
    ///
    /// Hooks cannot fail. Leave malformed values alone or replace them with
    /// a default.
    fn derive(&self, tree: &mut ConfigTree, ctx: &DeriveContext);
}

impl<F> DeriveHook for F
where
    F: Fn(&mut ConfigTree, &DeriveContext) + Send + Sync,
{
    fn derive(&self, tree: &mut ConfigTree, ctx: &DeriveContext) {
        self(tree, ctx);
    }
}

/// Context provided to derive hooks.
///
/// # Examples
///
/// ```rust
/// use component_config::DeriveContext;
/// use serde_json::json;
///
/// let mut ctx = DeriveContext::new("listing_categories");
/// ctx.with_context(component_config::into_tree(json!({"listing_category_id": 7})));
///
/// assert_eq!(ctx.kind(), "listing_categories");
/// assert_eq!(ctx.context_value("listing_category_id"), Some(&json!(7)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeriveContext {
    kind: String,
    class: String,
    context: ConfigTree,
}

impl DeriveContext {
    /// Creates a context for an instance of `kind`.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        let leaf = kind.into();
        Self {
            class: leaf.clone(),
            kind: leaf,
            context: ConfigTree::new(),
        }
    }

    /// Attaches external context values, such as request-derived ids.
    pub fn with_context(&mut self, context: ConfigTree) -> &mut Self {
        self.context = context;
        self
    }

    pub(crate) fn enter_class(&mut self, class: &str) {
        class.clone_into(&mut self.class);
    }

    /// The component kind being instantiated (the leaf class).
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The class whose hook is currently running.
    ///
    /// Equals [`DeriveContext::kind`] for the leaf hook and names an ancestor
    /// while ancestor hooks run.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// External context supplied when the instance was declared.
    #[must_use]
    pub const fn context(&self) -> &ConfigTree {
        &self.context
    }

    /// Look up a single context value.
    #[must_use]
    pub fn context_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.context.get(key)
    }
}
