//! Primary error enum for registry, declaration, and settings flows.

use figment::Error as FigmentError;
use thiserror::Error;

use super::aggregate::AggregatedErrors;

/// Errors raised at the edges of the composition engine.
///
/// Merging, ordering, and tree merging never fail: shape conflicts resolve by
/// overwrite and missing tree targets are no-ops. Only registration, lookup,
/// declaration loading, and settings extraction report errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ComposeError {
    /// A class with the same name is already registered.
    #[error("class '{name}' is already registered")]
    DuplicateClass {
        /// Name of the class registered twice.
        name: String,
    },

    /// No class with the requested name is registered.
    #[error("unknown component class '{name}'")]
    UnknownClass {
        /// Name that failed to resolve.
        name: String,
    },

    /// A class names a parent that is not registered.
    #[error("class '{class}' extends unknown parent '{parent}'")]
    UnknownParent {
        /// Class whose parent is missing.
        class: String,
        /// Parent name that failed to resolve.
        parent: String,
    },

    /// Cycle detected while ordering a batch of declarations.
    #[error("cyclic inheritance detected: {cycle}")]
    CyclicInheritance {
        /// Chain of classes participating in the cycle.
        cycle: String,
    },

    /// A declaration document could not be read or parsed.
    #[error("declaration file error in '{path}': {source}")]
    Declarations {
        /// Path of the offending document.
        path: std::path::PathBuf,
        /// Underlying read or parse failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Engine settings could not be extracted.
    #[error("failed to load engine settings: {0}")]
    Settings(#[from] Box<FigmentError>),

    /// Multiple errors occurred while registering classes.
    #[error("multiple composition errors:\n{0}")]
    Aggregate(Box<AggregatedErrors>),
}
