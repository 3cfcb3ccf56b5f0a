//! Error types for `compose`.

use std::sync::Arc;

use component_config::ComposeError;
use thiserror::Error;

/// Errors surfaced by the `compose` command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading settings or declarations, or resolving a class, failed.
    #[error(transparent)]
    Compose(#[from] Arc<ComposeError>),

    /// A JSON argument did not parse.
    #[error("invalid {what} JSON: {source}")]
    InvalidJson {
        /// Name of the argument, such as `overrides`.
        what: &'static str,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// A JSON argument parsed but was not an object.
    #[error("{what} must be a JSON object")]
    NotAnObject {
        /// Name of the argument, such as `context`.
        what: &'static str,
    },

    /// No block node of the requested name exists in the class.
    #[error("node '{node}' not found in class '{class}'")]
    NodeNotFound {
        /// Class whose resolved metadata was searched.
        class: String,
        /// Node name that was not found.
        node: String,
    },

    /// Output could not be serialized as JSON.
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
