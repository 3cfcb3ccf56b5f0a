//! Command-line interface definitions for `compose`.

use camino::Utf8PathBuf;
use clap::{Args as ClapArgs, Parser, Subcommand};

/// Parsed CLI arguments for `compose`.
#[derive(Debug, Parser)]
#[command(name = "compose")]
#[command(about = "Resolve component class declarations and instances")]
#[command(version)]
pub struct Args {
    /// Declaration document to load (repeat for several; TOML or JSON).
    #[arg(long = "declarations", short = 'd', value_name = "path", required = true)]
    pub declarations: Vec<Utf8PathBuf>,
    /// Engine settings file layered under `COMPONENT_CONFIG_*` variables.
    #[arg(long, value_name = "path")]
    pub settings: Option<Utf8PathBuf>,
    /// Emit compact rather than pretty-printed JSON.
    #[arg(long = "compact")]
    pub is_compact: bool,
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// `compose` subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List registered classes with their parents.
    Classes,
    /// Print a class chain, root class first.
    Chain(ClassArgs),
    /// Print the resolved metadata of a class.
    Metadata(ClassArgs),
    /// Run the component lifecycle and print the finalized instance.
    Instance(InstanceArgs),
    /// Print one named block node from a class's resolved metadata.
    Node(NodeArgs),
}

/// Selects a class.
#[derive(Debug, ClapArgs)]
pub struct ClassArgs {
    /// Class name.
    pub class: String,
}

/// Arguments for `compose instance`.
#[derive(Debug, ClapArgs)]
pub struct InstanceArgs {
    /// Component kind to instantiate.
    pub kind: String,
    /// Instance overrides as a JSON object.
    #[arg(long, value_name = "json")]
    pub overrides: Option<String>,
    /// Context passed to derive hooks as a JSON object.
    #[arg(long, value_name = "json")]
    pub context: Option<String>,
}

/// Arguments for `compose node`.
#[derive(Debug, ClapArgs)]
pub struct NodeArgs {
    /// Class whose resolved metadata is searched.
    pub class: String,
    /// Node name to find.
    pub node: String,
}
