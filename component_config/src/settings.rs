//! Layered engine settings.
//!
//! Settings are read from, in increasing precedence:
//!
//! 1. built-in defaults;
//! 2. an optional TOML file;
//! 3. `COMPONENT_CONFIG_*` environment variables.

use camino::Utf8Path;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ordering::DEFAULT_ORDER_KEY;
use crate::tree::DEFAULT_TREE_KEY;
use crate::{ComposeResult, ComposeResultExt};

/// Prefix of environment variables that override settings.
pub const ENV_PREFIX: &str = "COMPONENT_CONFIG_";

/// Tunables of the composition engine.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Field consulted when sorting ordered entries.
    pub order_key: String,
    /// Tree key used when looking up block nodes.
    pub tree_key: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            order_key: DEFAULT_ORDER_KEY.to_owned(),
            tree_key: DEFAULT_TREE_KEY.to_owned(),
        }
    }
}

impl EngineSettings {
    /// Builds the figment backing [`EngineSettings::load`].
    #[must_use]
    pub fn figment(file: Option<&Utf8Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            debug!(path = %path, "layering engine settings file");
            figment = figment.merge(Toml::file(path.as_std_path()));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Loads settings from defaults, `file`, and the environment.
    ///
    /// A missing `file` is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ComposeError::Settings`] when a layer holds a value of the
    /// wrong type or the file is not valid TOML.
    pub fn load(file: Option<&Utf8Path>) -> ComposeResult<Self> {
        Self::figment(file).extract().into_compose()
    }
}
