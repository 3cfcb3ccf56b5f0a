//! Hierarchical configuration merging and component composition.
//!
//! Component classes (blocks, fields, templates, forms, emails) declare
//! partial configuration trees. This crate folds those trees across a class
//! inheritance chain, across nested block hierarchies, and across caller
//! overrides into one resolved tree per component instance:
//!
//! * [`merge`] deep-merges trees: mappings recurse, lists append, anything
//!   else is overwritten by the later value.
//! * [`sort_tree`] stably orders named entries by an explicit order hint.
//! * [`merge_tree`] patches a named node anywhere inside a block tree.
//! * [`Registry`] resolves each class's metadata once and runs the
//!   [`Component`] lifecycle for instances.
//!
//! ```rust
//! use component_config::{ClassDescriptor, MergeStrategy, Registry, into_tree};
//! use serde_json::json;
//!
//! # fn main() -> component_config::ComposeResult<()> {
//! let registry = Registry::builder()
//!     .register(
//!         ClassDescriptor::new("page")
//!             .with_strategy(MergeStrategy::blocks())
//!             .with_metadata(into_tree(json!({
//!                 "blocks": {
//!                     "page_container": {
//!                         "tag": "div",
//!                         "blocks": {"page_title": {"tag": "h1"}}
//!                     }
//!                 }
//!             }))),
//!     )?
//!     .register(
//!         ClassDescriptor::new("listing_view_page")
//!             .extends("page")
//!             .with_metadata(into_tree(json!({"blocks": {"page_title": {"tag": "h2"}}}))),
//!     )?
//!     .build();
//!
//! let page = registry.instantiate("listing_view_page", Default::default())?;
//! assert_eq!(
//!     page.get_path(&["blocks", "page_container", "blocks", "page_title", "tag"]),
//!     Some(&json!("h2"))
//! );
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

mod declarations;
mod error;
mod fingerprint;
mod lifecycle;
mod merge;
mod ordering;
mod registry;
mod result_ext;
mod settings;
mod strategy;
mod tree;
mod value;

pub use declarations::{ClassDeclaration, load_declarations, parse_declarations};
pub use error::{AggregatedErrors, ComposeError};
pub use fingerprint::{Fingerprint, IdCache, MemoryIdCache};
pub use lifecycle::{
    Component, Configured, Declared, DeriveContext, DeriveHook, Derived, ResolvedComponent,
};
pub use merge::{merge, merge_into, merge_sources, merge_value};
pub use ordering::{DEFAULT_ORDER_KEY, OrderedEntry, order_entries, sort_tree};
pub use registry::{Aggregator, ClassDescriptor, Registry, RegistryBuilder, resolve_class_metadata};
pub use result_ext::ComposeResultExt;
pub use settings::{ENV_PREFIX, EngineSettings};
pub use strategy::MergeStrategy;
pub use tree::{DEFAULT_TREE_KEY, TreeMergeReport, find_node, merge_tree, merge_tree_with_report};
pub use value::{ConfigTree, ConfigValue, Shape, get_path, into_tree};

/// Result type shared by fallible operations of this crate.
///
/// Errors are wrapped in an [`Arc`] so they can be cloned cheaply and
/// collected into [`ComposeError::Aggregate`].
pub type ComposeResult<T> = Result<T, Arc<ComposeError>>;
