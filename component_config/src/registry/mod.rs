//! Component class registry.
//!
//! Classes are registered once, parent before child, through a
//! [`RegistryBuilder`]. The built [`Registry`] is immutable and shared by
//! reference; each class's resolved metadata is folded on first request and
//! memoised for the lifetime of the registry.

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::debug;

use crate::lifecycle::{Component, Declared, ResolvedComponent};
use crate::strategy::MergeStrategy;
use crate::value::ConfigTree;
use crate::{ComposeError, ComposeResult};

mod aggregate;
mod builder;
mod descriptor;

pub use aggregate::{Aggregator, resolve_class_metadata};
pub use builder::RegistryBuilder;
pub use descriptor::ClassDescriptor;

#[cfg(test)]
mod tests;

#[derive(Debug)]
struct ClassEntry {
    descriptor: ClassDescriptor,
    /// Root-first class names, ending with this class.
    chain: Vec<String>,
    resolved: OnceLock<ConfigTree>,
}

impl ClassEntry {
    fn new(descriptor: ClassDescriptor, chain: Vec<String>) -> Self {
        Self {
            descriptor,
            chain,
            resolved: OnceLock::new(),
        }
    }
}

/// Immutable set of component classes.
///
/// # Examples
///
/// ```rust
/// use component_config::{ClassDescriptor, Registry, into_tree};
/// use serde_json::json;
///
/// # fn main() -> component_config::ComposeResult<()> {
/// let registry = Registry::builder()
///     .register(ClassDescriptor::new("field").with_metadata(into_tree(json!({"required": false}))))?
///     .register(
///         ClassDescriptor::new("email")
///             .extends("field")
///             .with_metadata(into_tree(json!({"format": "email"}))),
///     )?
///     .build();
///
/// let email = registry.resolve("email")?;
/// assert_eq!(email.get("required"), Some(&json!(false)));
/// assert_eq!(email.get("format"), Some(&json!("email")));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Registry {
    classes: HashMap<String, ClassEntry>,
    order: Vec<String>,
    aggregator: Aggregator,
}

impl Registry {
    /// Starts an empty [`RegistryBuilder`].
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    fn entry(&self, name: &str) -> ComposeResult<&ClassEntry> {
        self.classes
            .get(name)
            .ok_or_else(|| ComposeError::unknown_class(name))
    }

    /// Returns the descriptor registered as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::UnknownClass`] if `name` is not registered.
    pub fn class(&self, name: &str) -> ComposeResult<&ClassDescriptor> {
        self.entry(name).map(|entry| &entry.descriptor)
    }

    /// Returns the class chain of `name`, root class first and `name` last.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::UnknownClass`] if `name` is not registered.
    pub fn chain(&self, name: &str) -> ComposeResult<Vec<&ClassDescriptor>> {
        let entry = self.entry(name)?;
        entry
            .chain
            .iter()
            .map(|class| self.class(class))
            .collect()
    }

    /// Returns the resolved metadata of `name`, folding its chain on first
    /// use.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::UnknownClass`] if `name` is not registered.
    pub fn resolve(&self, name: &str) -> ComposeResult<&ConfigTree> {
        let entry = self.entry(name)?;
        if let Some(resolved) = entry.resolved.get() {
            return Ok(resolved);
        }
        let chain = self.chain(name)?;
        Ok(entry.resolved.get_or_init(|| {
            debug!(class = %name, depth = chain.len(), "resolving class metadata");
            self.aggregator.resolve(chain)
        }))
    }

    /// Merge strategy in effect for `name`: the leaf-most one declared along
    /// its chain.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::UnknownClass`] if `name` is not registered.
    pub fn strategy(&self, name: &str) -> ComposeResult<MergeStrategy> {
        let chain = self.chain(name)?;
        Ok(aggregate::chain_strategy(&chain))
    }

    /// Field used to sort ordered entries.
    #[must_use]
    pub fn order_key(&self) -> &str {
        self.aggregator.order_key()
    }

    /// Registered class names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Returns `true` when `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Number of registered classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` when no class is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Declares an instance of `kind` with caller overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::UnknownClass`] if `kind` is not registered.
    pub fn declare(
        &self,
        kind: &str,
        overrides: ConfigTree,
    ) -> ComposeResult<Component<'_, Declared<'_>>> {
        let chain = self.chain(kind)?;
        let resolved = self.resolve(kind)?;
        let strategy = aggregate::chain_strategy(&chain);
        debug!(kind = %kind, "declared component instance");
        Ok(Component::declared(kind, chain, resolved, strategy, overrides))
    }

    /// Runs every lifecycle stage for an instance of `kind`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use component_config::{ClassDescriptor, Registry, into_tree};
    /// use serde_json::json;
    ///
    /// # fn main() -> component_config::ComposeResult<()> {
    /// let registry = Registry::builder()
    ///     .register(
    ///         ClassDescriptor::new("toggle")
    ///             .with_metadata(into_tree(json!({"caption": "Off"})))
    ///             .derive_with(|tree, _ctx| {
    ///                 let label = tree.get("caption").cloned().unwrap_or_default();
    ///                 tree.insert("attributes".into(), json!({"aria-label": label}));
    ///             }),
    ///     )?
    ///     .build();
    ///
    /// let toggle = registry.instantiate("toggle", into_tree(json!({"caption": "On"})))?;
    /// assert_eq!(toggle.get_path(&["attributes", "aria-label"]), Some(&json!("On")));
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::UnknownClass`] if `kind` is not registered.
    pub fn instantiate(&self, kind: &str, overrides: ConfigTree) -> ComposeResult<ResolvedComponent> {
        Ok(self.declare(kind, overrides)?.configure().derive().finalize())
    }
}
