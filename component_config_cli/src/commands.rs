//! Command execution for `compose`.

use std::io::Write;

use component_config::{ConfigTree, EngineSettings, Registry, find_node, load_declarations};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::cli::{Args, Command, InstanceArgs, NodeArgs};
use crate::error::CliError;

#[derive(Serialize)]
struct ClassSummary<'a> {
    name: &'a str,
    parent: Option<&'a str>,
}

#[derive(Serialize)]
struct InstanceOutput<'a> {
    kind: &'a str,
    fingerprint: String,
    tree: &'a ConfigTree,
}

/// Loads every declaration document named in `args` into a registry.
///
/// # Errors
///
/// Returns [`CliError::Compose`] when settings or declarations fail to load
/// or the declared classes do not form a valid hierarchy.
pub fn load_registry(args: &Args) -> Result<(Registry, EngineSettings), CliError> {
    let settings = EngineSettings::load(args.settings.as_deref())?;
    let mut declarations = Vec::new();
    for path in &args.declarations {
        let loaded = load_declarations(path)?;
        info!(path = %path, classes = loaded.len(), "loaded declarations");
        declarations.extend(loaded);
    }
    let registry = Registry::builder()
        .with_settings(&settings)
        .register_all(declarations.into_iter().map(Into::into))?
        .build();
    Ok((registry, settings))
}

/// Runs the command selected in `args`, writing JSON to `out`.
///
/// # Errors
///
/// Returns a [`CliError`] when loading, resolution, or output fails.
pub fn run<W: Write>(args: &Args, out: &mut W) -> Result<(), CliError> {
    let (registry, settings) = load_registry(args)?;
    debug!(command = ?args.command, "running command");
    let value = match &args.command {
        Command::Classes => classes(&registry)?,
        Command::Chain(class) => {
            let names: Vec<&str> = registry
                .chain(&class.class)?
                .iter()
                .map(|descriptor| descriptor.name())
                .collect();
            serde_json::to_value(names)?
        }
        Command::Metadata(class) => Value::Object(registry.resolve(&class.class)?.clone()),
        Command::Instance(instance_args) => instance(&registry, instance_args)?,
        Command::Node(node_args) => node(&registry, &settings, node_args)?,
    };
    write_json(out, &value, args.is_compact)
}

fn classes(registry: &Registry) -> Result<Value, CliError> {
    let summaries: Vec<ClassSummary<'_>> = registry
        .names()
        .map(|name| {
            registry.class(name).map(|descriptor| ClassSummary {
                name: descriptor.name(),
                parent: descriptor.parent(),
            })
        })
        .collect::<Result<_, _>>()?;
    Ok(serde_json::to_value(summaries)?)
}

fn instance(registry: &Registry, args: &InstanceArgs) -> Result<Value, CliError> {
    let overrides = parse_tree("overrides", args.overrides.as_deref())?;
    let context = parse_tree("context", args.context.as_deref())?;
    let component = registry
        .declare(&args.kind, overrides)?
        .with_context(context)
        .configure()
        .derive()
        .finalize();
    let output = InstanceOutput {
        kind: component.kind(),
        fingerprint: component.fingerprint().to_string(),
        tree: component.tree(),
    };
    Ok(serde_json::to_value(output)?)
}

fn node(registry: &Registry, settings: &EngineSettings, args: &NodeArgs) -> Result<Value, CliError> {
    let resolved = registry.resolve(&args.class)?;
    find_node(resolved, &settings.tree_key, &args.node)
        .cloned()
        .ok_or_else(|| CliError::NodeNotFound {
            class: args.class.clone(),
            node: args.node.clone(),
        })
}

fn parse_tree(what: &'static str, raw: Option<&str>) -> Result<ConfigTree, CliError> {
    let Some(text) = raw else {
        return Ok(ConfigTree::new());
    };
    match serde_json::from_str::<Value>(text).map_err(|source| CliError::InvalidJson { what, source })? {
        Value::Object(tree) => Ok(tree),
        _ => Err(CliError::NotAnObject { what }),
    }
}

fn write_json<W: Write>(out: &mut W, value: &Value, is_compact: bool) -> Result<(), CliError> {
    if is_compact {
        serde_json::to_writer(&mut *out, value)?;
    } else {
        serde_json::to_writer_pretty(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
