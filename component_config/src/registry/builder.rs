//! Builder for [`Registry`].
//!
//! Registration enforces the hierarchy invariants up front: names are
//! unique and a parent is always registered before its children, so class
//! chains are finite and every chain lookup on the built registry succeeds.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use super::{Aggregator, ClassDescriptor, ClassEntry, Registry};
use crate::lifecycle::DeriveHook;
use crate::settings::EngineSettings;
use crate::{ComposeError, ComposeResult};

/// Builder for [`Registry`].
///
/// # Examples
///
/// ```rust
/// use component_config::{ClassDescriptor, Registry};
///
/// # fn main() -> component_config::ComposeResult<()> {
/// // Batches may list children before their parents.
/// let registry = Registry::builder()
///     .register_all([
///         ClassDescriptor::new("number").extends("field"),
///         ClassDescriptor::new("field"),
///     ])?
///     .build();
///
/// let chain: Vec<_> = registry.chain("number")?.iter().map(|c| c.name()).collect();
/// assert_eq!(chain, ["field", "number"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    classes: HashMap<String, ClassEntry>,
    order: Vec<String>,
    aggregator: Aggregator,
}

impl RegistryBuilder {
    /// Creates an empty builder using the default order key.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field used to sort ordered entries.
    #[must_use]
    pub fn order_key(mut self, order_key: impl Into<String>) -> Self {
        self.aggregator = Aggregator::new(order_key);
        self
    }

    /// Applies engine settings.
    #[must_use]
    pub fn with_settings(self, settings: &EngineSettings) -> Self {
        self.order_key(settings.order_key.as_str())
    }

    /// Registers a single class.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::DuplicateClass`] when the name is taken and
    /// [`ComposeError::UnknownParent`] when the parent has not been
    /// registered yet.
    pub fn register(mut self, descriptor: ClassDescriptor) -> ComposeResult<Self> {
        self.insert(descriptor)?;
        Ok(self)
    }

    /// Registers a batch of classes in dependency order.
    ///
    /// Parents may appear after their children within the batch. Every
    /// problem found in the batch is reported together; nothing from the
    /// batch is registered unless all of it is valid.
    ///
    /// # Errors
    ///
    /// Returns the single error, or [`ComposeError::Aggregate`] combining
    /// duplicate names, unknown parents, and inheritance cycles.
    pub fn register_all<I>(mut self, descriptors: I) -> ComposeResult<Self>
    where
        I: IntoIterator<Item = ClassDescriptor>,
    {
        let mut errors: Vec<ComposeError> = Vec::new();
        let mut pending: Vec<ClassDescriptor> = Vec::new();
        let mut batch_names: HashSet<String> = HashSet::new();
        for descriptor in descriptors {
            let name = descriptor.name().to_owned();
            if self.classes.contains_key(&name) || !batch_names.insert(name.clone()) {
                errors.push(ComposeError::DuplicateClass { name });
                continue;
            }
            pending.push(descriptor);
        }

        for descriptor in &pending {
            if let Some(parent) = descriptor.parent()
                && !self.classes.contains_key(parent)
                && !batch_names.contains(parent)
            {
                errors.push(ComposeError::UnknownParent {
                    class: descriptor.name().to_owned(),
                    parent: parent.to_owned(),
                });
            }
        }

        let ordered = topological_order(pending, &self.classes, &mut errors);
        if let Some(err) = ComposeError::try_aggregate(errors) {
            return Err(Arc::new(err));
        }
        for descriptor in ordered {
            self.insert(descriptor)?;
        }
        Ok(self)
    }

    /// Attaches `hook` to the registered class `class`, replacing any hook
    /// it declared.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::UnknownClass`] if `class` is not registered.
    pub fn with_hook(mut self, class: &str, hook: Arc<dyn DeriveHook>) -> ComposeResult<Self> {
        let entry = self
            .classes
            .get_mut(class)
            .ok_or_else(|| ComposeError::unknown_class(class))?;
        entry.descriptor.set_hook(hook);
        Ok(self)
    }

    /// Freezes the builder into a [`Registry`].
    #[must_use]
    pub fn build(self) -> Registry {
        debug!(classes = self.order.len(), "component registry built");
        Registry {
            classes: self.classes,
            order: self.order,
            aggregator: self.aggregator,
        }
    }

    fn insert(&mut self, descriptor: ClassDescriptor) -> ComposeResult<()> {
        let name = descriptor.name().to_owned();
        if self.classes.contains_key(&name) {
            return Err(Arc::new(ComposeError::DuplicateClass { name }));
        }
        let mut chain = match descriptor.parent() {
            None => Vec::new(),
            Some(parent) => self
                .classes
                .get(parent)
                .map(|entry| entry.chain.clone())
                .ok_or_else(|| {
                    Arc::new(ComposeError::UnknownParent {
                        class: name.clone(),
                        parent: parent.to_owned(),
                    })
                })?,
        };
        chain.push(name.clone());
        debug!(class = %name, depth = chain.len(), "registered component class");
        self.order.push(name.clone());
        self.classes.insert(name, ClassEntry::new(descriptor, chain));
        Ok(())
    }
}

/// Orders `pending` so each class follows its parent, otherwise keeping
/// declaration order.
///
/// Classes left over once no further progress is possible either descend
/// from an unknown parent (already reported) or sit on a cycle, which is
/// reported once per cycle.
fn topological_order(
    pending: Vec<ClassDescriptor>,
    registered: &HashMap<String, ClassEntry>,
    errors: &mut Vec<ComposeError>,
) -> Vec<ClassDescriptor> {
    let mut placed: HashSet<String> = HashSet::new();
    let mut ordered = Vec::with_capacity(pending.len());
    let mut remaining = pending;
    loop {
        let before = remaining.len();
        let mut blocked = Vec::new();
        for descriptor in remaining {
            let is_ready = descriptor
                .parent()
                .is_none_or(|parent| registered.contains_key(parent) || placed.contains(parent));
            if is_ready {
                placed.insert(descriptor.name().to_owned());
                ordered.push(descriptor);
            } else {
                blocked.push(descriptor);
            }
        }
        remaining = blocked;
        if remaining.is_empty() || remaining.len() == before {
            break;
        }
    }

    let parents: HashMap<&str, Option<&str>> = remaining
        .iter()
        .map(|descriptor| (descriptor.name(), descriptor.parent()))
        .collect();
    let mut reported: HashSet<&str> = HashSet::new();
    for descriptor in &remaining {
        if reported.contains(descriptor.name()) {
            continue;
        }
        if let Some(cycle) = find_cycle(descriptor.name(), &parents) {
            reported.extend(cycle.iter().copied());
            errors.push(ComposeError::CyclicInheritance {
                cycle: format_cycle(&cycle),
            });
        }
    }
    ordered
}

/// Walks parent links from `start`, returning the cycle it runs into.
fn find_cycle<'a>(start: &'a str, parents: &HashMap<&'a str, Option<&'a str>>) -> Option<Vec<&'a str>> {
    let mut path: Vec<&str> = Vec::new();
    let mut current = start;
    loop {
        if let Some(position) = path.iter().position(|name| *name == current) {
            return Some(path.split_off(position));
        }
        path.push(current);
        current = (*parents.get(current)?)?;
    }
}

fn format_cycle(cycle: &[&str]) -> String {
    let mut names: Vec<&str> = cycle.to_vec();
    if let Some(first) = cycle.first() {
        names.push(first);
    }
    names.join(" -> ")
}
