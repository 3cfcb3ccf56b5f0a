//! Component instance lifecycle.
//!
//! Every component follows the same sequence, enforced by the type of
//! [`Component`]:
//!
//! 1. **Declared**: the kind is known and caller overrides are captured.
//! 2. **Configured**: the class's resolved metadata and the overrides are
//!    combined with the class's merge strategy.
//! 3. **Derived**: each class's derive hook runs, root class first.
//! 4. **Finalized**: the tree is frozen into a [`ResolvedComponent`].
//!
//! Each transition consumes the previous stage, so a stage cannot be
//! repeated or skipped.

use serde::Serialize;
use tracing::trace;

use crate::fingerprint::Fingerprint;
use crate::registry::ClassDescriptor;
use crate::strategy::MergeStrategy;
use crate::value::{ConfigTree, ConfigValue, get_path};

mod hook;

pub use hook::{DeriveContext, DeriveHook};

/// A component instance in lifecycle stage `S`.
#[derive(Debug)]
pub struct Component<'r, S> {
    chain: Vec<&'r ClassDescriptor>,
    ctx: DeriveContext,
    state: S,
}

/// Stage 1: overrides captured, nothing merged yet.
#[derive(Debug)]
pub struct Declared<'r> {
    resolved: &'r ConfigTree,
    strategy: MergeStrategy,
    overrides: ConfigTree,
}

/// Stage 2: overrides applied over the class's resolved metadata.
#[derive(Debug)]
pub struct Configured {
    tree: ConfigTree,
}

/// Stage 3: derive hooks have run.
#[derive(Debug)]
pub struct Derived {
    tree: ConfigTree,
}

impl<'r> Component<'r, Declared<'r>> {
    pub(crate) fn declared(
        kind: &str,
        chain: Vec<&'r ClassDescriptor>,
        resolved: &'r ConfigTree,
        strategy: MergeStrategy,
        overrides: ConfigTree,
    ) -> Self {
        Self {
            chain,
            ctx: DeriveContext::new(kind),
            state: Declared {
                resolved,
                strategy,
                overrides,
            },
        }
    }

    /// Supplies external context for the derive hooks.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use component_config::{ClassDescriptor, ConfigTree, Registry, into_tree};
    /// use serde_json::json;
    ///
    /// # fn main() -> component_config::ComposeResult<()> {
    /// let registry = Registry::builder()
    ///     .register(ClassDescriptor::new("listing_view_block").derive_with(|tree, ctx| {
    ///         if let Some(id) = ctx.context_value("listing_id") {
    ///             tree.insert("listing_id".into(), id.clone());
    ///         }
    ///     }))?
    ///     .build();
    ///
    /// let block = registry
    ///     .declare("listing_view_block", ConfigTree::new())?
    ///     .with_context(into_tree(json!({"listing_id": 42})))
    ///     .configure()
    ///     .derive()
    ///     .finalize();
    /// assert_eq!(block.get("listing_id"), Some(&json!(42)));
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn with_context(mut self, context: ConfigTree) -> Self {
        self.ctx.with_context(context);
        self
    }

    /// Caller overrides captured at declaration.
    #[must_use]
    pub const fn overrides(&self) -> &ConfigTree {
        &self.state.overrides
    }

    /// Applies the overrides over the class's resolved metadata.
    #[must_use]
    pub fn configure(self) -> Component<'r, Configured> {
        let Declared {
            resolved,
            strategy,
            overrides,
        } = self.state;
        let tree = strategy.apply(resolved, &overrides);
        trace!(kind = %self.ctx.kind(), "configured component instance");
        Component {
            chain: self.chain,
            ctx: self.ctx,
            state: Configured { tree },
        }
    }
}

impl<'r> Component<'r, Configured> {
    /// The configured tree, before derivation.
    #[must_use]
    pub const fn tree(&self) -> &ConfigTree {
        &self.state.tree
    }

    /// Runs each class's derive hook, root class first.
    #[must_use]
    pub fn derive(self) -> Component<'r, Derived> {
        let Self {
            chain,
            mut ctx,
            state: Configured { mut tree },
        } = self;
        for class in &chain {
            let Some(hook) = class.hook() else {
                continue;
            };
            ctx.enter_class(class.name());
            trace!(kind = %ctx.kind(), class = %class.name(), "running derive hook");
            hook.derive(&mut tree, &ctx);
        }
        Component {
            chain,
            ctx,
            state: Derived { tree },
        }
    }
}

impl Component<'_, Derived> {
    /// The derived tree.
    #[must_use]
    pub const fn tree(&self) -> &ConfigTree {
        &self.state.tree
    }

    /// Freezes the instance.
    #[must_use]
    pub fn finalize(self) -> ResolvedComponent {
        ResolvedComponent {
            kind: self.ctx.kind().to_owned(),
            tree: self.state.tree,
        }
    }
}

impl<S> Component<'_, S> {
    /// Component kind (the leaf class name).
    #[must_use]
    pub fn kind(&self) -> &str {
        self.ctx.kind()
    }

    /// Root-first class chain of the instance.
    #[must_use]
    pub fn chain(&self) -> &[&ClassDescriptor] {
        &self.chain
    }
}

/// A finalized, read-only component instance.
///
/// Serializes as `{"kind": ..., "tree": {...}}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedComponent {
    kind: String,
    tree: ConfigTree,
}

impl ResolvedComponent {
    /// Component kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The final configuration tree.
    #[must_use]
    pub const fn tree(&self) -> &ConfigTree {
        &self.tree
    }

    /// Top-level value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.tree.get(key)
    }

    /// Value at a nested mapping path.
    #[must_use]
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&ConfigValue> {
        get_path(&self.tree, path)
    }

    /// Fingerprint of the final tree, suitable as a cache key.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.tree)
    }

    /// Consumes the instance, returning its tree.
    #[must_use]
    pub fn into_tree(self) -> ConfigTree {
        self.tree
    }
}
