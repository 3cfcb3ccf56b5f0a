//! Class declarations described as data.
//!
//! A declaration document lists component classes as `[[class]]` entries:
//!
//! ```toml
//! [[class]]
//! name = "field"
//! ordered = ["settings"]
//!
//! [class.metadata.settings.required]
//! type = "checkbox"
//! order = 100
//!
//! [[class]]
//! name = "page_wide"
//! parent = "page"
//! strategy = { tree = "blocks" }
//! ```
//!
//! Files ending in `.json` hold the same structure as JSON; any other
//! extension is read as TOML. Key order in `metadata` is preserved.

use std::fs;

use camino::Utf8Path;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::registry::ClassDescriptor;
use crate::strategy::MergeStrategy;
use crate::value::ConfigTree;
use crate::{ComposeError, ComposeResult};


/// One `[[class]]` entry of a declaration document.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ClassDeclaration {
    /// Class name.
    pub name: String,
    /// Immediate parent class.
    #[serde(default)]
    pub parent: Option<String>,
    /// Merge strategy declared by this class.
    #[serde(default)]
    pub strategy: Option<MergeStrategy>,
    /// Dot-separated paths of ordered entry mappings.
    #[serde(default)]
    pub ordered: Vec<String>,
    /// The class's own metadata.
    #[serde(default)]
    pub metadata: ConfigTree,
    #[serde(flatten)]
    unknown: ConfigTree,
}

#[derive(Debug, Deserialize)]
struct DeclarationFile {
    #[serde(default, rename = "class")]
    classes: Vec<ClassDeclaration>,
}

impl From<ClassDeclaration> for ClassDescriptor {
    fn from(declaration: ClassDeclaration) -> Self {
        let ClassDeclaration {
            name,
            parent,
            strategy,
            ordered,
            metadata,
            unknown,
        } = declaration;
        for field in unknown.keys() {
            warn!(class = %name, field = %field, "ignoring unknown declaration field");
        }
        let mut descriptor = Self::new(name).with_metadata(metadata);
        if let Some(parent_name) = parent {
            descriptor = descriptor.extends(parent_name);
        }
        if let Some(declared) = strategy {
            descriptor = descriptor.with_strategy(declared);
        }
        ordered
            .into_iter()
            .fold(descriptor, ClassDescriptor::order_entries_in)
    }
}

/// Parse declarations from `data`, choosing the format by `path`'s
/// extension.
///
/// # Errors
///
/// Returns [`ComposeError::Declarations`] when `data` does not parse.
pub fn parse_declarations(path: &Utf8Path, data: &str) -> ComposeResult<Vec<ClassDeclaration>> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let file: DeclarationFile = if is_json {
        serde_json::from_str(data).map_err(|err| ComposeError::declarations(path.as_std_path(), err))?
    } else {
        toml::from_str(data).map_err(|err| ComposeError::declarations(path.as_std_path(), err))?
    };
    debug!(path = %path, classes = file.classes.len(), "parsed class declarations");
    Ok(file.classes)
}

/// Read and parse the declaration document at `path`.
///
/// # Examples
///
/// ```rust,no_run
/// use camino::Utf8Path;
/// use component_config::{Registry, load_declarations};
///
/// # fn run() -> component_config::ComposeResult<()> {
/// let declarations = load_declarations(Utf8Path::new("components.toml"))?;
/// let registry = Registry::builder()
///     .register_all(declarations.into_iter().map(Into::into))?
///     .build();
/// println!("{} classes", registry.len());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`ComposeError::Declarations`] when the file cannot be read or
/// does not parse.
pub fn load_declarations(path: &Utf8Path) -> ComposeResult<Vec<ClassDeclaration>> {
    let data =
        fs::read_to_string(path).map_err(|err| ComposeError::declarations(path.as_std_path(), err))?;
    parse_declarations(path, &data)
}
