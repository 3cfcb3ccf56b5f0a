//! Integration tests for form field components.
//!
//! Field classes derive their HTML attributes from configured settings. The
//! base field hook runs first, so specialised fields can build on the
//! attributes it sets or replace them.

use anyhow::{Context, Result, ensure};
use component_config::{
    ClassDescriptor, ConfigTree, DeriveContext, Registry, ResolvedComponent, into_tree,
};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

fn set_attribute(tree: &mut ConfigTree, key: &str, value: Value) {
    let attributes = tree
        .entry("attributes")
        .or_insert_with(|| Value::Object(ConfigTree::new()));
    if let Value::Object(map) = attributes {
        map.insert(key.to_owned(), value);
    }
}

fn field_hook(tree: &mut ConfigTree, _ctx: &DeriveContext) {
    if tree.get("required") == Some(&json!(true)) {
        set_attribute(tree, "required", json!(true));
    }
    if let Some(placeholder) = tree.get("placeholder").filter(|value| !value.is_null()).cloned() {
        set_attribute(tree, "placeholder", placeholder);
    }
}

fn number_hook(tree: &mut ConfigTree, _ctx: &DeriveContext) {
    let decimals = tree
        .get("decimals")
        .and_then(Value::as_i64)
        .and_then(|value| i32::try_from(value).ok())
        .unwrap_or(0);
    set_attribute(tree, "step", json!(10_f64.powi(-decimals)));
    for (setting, attribute) in [("min_value", "min"), ("max_value", "max")] {
        if let Some(bound) = tree.get(setting).filter(|value| !value.is_null()).cloned() {
            set_attribute(tree, attribute, bound);
        }
    }
}

fn select_hook(tree: &mut ConfigTree, _ctx: &DeriveContext) {
    let multiple = tree.get("multiple") == Some(&json!(true));
    if multiple {
        set_attribute(tree, "multiple", json!(true));
        // A multiple select has no empty choice.
        if let Some(Value::Object(attributes)) = tree.get_mut("attributes") {
            attributes.retain(|key, _| key != "placeholder");
        }
        return;
    }
    let Some(placeholder) = tree.get("placeholder").cloned() else {
        return;
    };
    let mut options = ConfigTree::new();
    options.insert(String::new(), placeholder);
    if let Some(Value::Object(existing)) = tree.get("options") {
        options.extend(existing.iter().map(|(key, value)| (key.clone(), value.clone())));
    }
    tree.insert("options".into(), Value::Object(options));
}

#[fixture]
fn fields() -> Registry {
    let field = ClassDescriptor::new("field")
        .with_metadata(into_tree(json!({
            "required": false,
            "settings": {
                "required": {"type": "checkbox", "order": 100}
            }
        })))
        .order_entries_in("settings")
        .derive_with(field_hook);
    let number = ClassDescriptor::new("number")
        .extends("field")
        .with_metadata(into_tree(json!({
            "title": "Number",
            "decimals": 0,
            "settings": {
                "placeholder": {"type": "text", "order": 10},
                "decimals": {"type": "number", "default": 0, "min_value": 0, "max_value": 5, "order": 20},
                "min_value": {"type": "number", "order": 30},
                "max_value": {"type": "number", "order": 40}
            }
        })))
        .derive_with(number_hook);
    let select = ClassDescriptor::new("select")
        .extends("field")
        .with_metadata(into_tree(json!({
            "title": "Select",
            "placeholder": "\u{2014}",
            "multiple": false,
            "options": {},
            "settings": {
                "multiple": {"type": "checkbox", "caption": "Allow multiple selection", "order": 10}
            }
        })))
        .derive_with(select_hook);
    let toggle = ClassDescriptor::new("toggle")
        .extends("field")
        .with_metadata(into_tree(json!({"title": "Toggle", "caption": "On"})));

    Registry::builder()
        .register_all([toggle, select, number, field])
        .expect("field classes register")
        .build()
}

fn attributes(component: &ResolvedComponent) -> Result<&ConfigTree> {
    component
        .get("attributes")
        .and_then(Value::as_object)
        .context("attributes are derived")
}

#[rstest]
#[case(0, 1.0)]
#[case(2, 0.01)]
#[case(5, 0.000_01)]
fn number_step_follows_decimals(fields: Registry, #[case] decimals: i64, #[case] step: f64) -> Result<()> {
    let number = fields.instantiate("number", into_tree(json!({"decimals": decimals})))?;
    let derived = attributes(&number)?
        .get("step")
        .and_then(Value::as_f64)
        .context("step is numeric")?;
    ensure!((derived - step).abs() < 1e-12, "step {derived} for {decimals} decimals");
    Ok(())
}

#[rstest]
fn number_bounds_and_ancestor_attributes_combine(fields: Registry) -> Result<()> {
    let number = fields.instantiate(
        "number",
        into_tree(json!({"required": true, "min_value": 1, "max_value": 9, "placeholder": "Qty"})),
    )?;
    let attrs = attributes(&number)?;
    for (key, expected) in [
        ("required", json!(true)),
        ("placeholder", json!("Qty")),
        ("min", json!(1)),
        ("max", json!(9)),
    ] {
        ensure!(attrs.get(key) == Some(&expected), "{key} should be {expected}");
    }
    Ok(())
}

#[rstest]
fn settings_are_ordered_across_the_chain(fields: Registry) -> Result<()> {
    let number = fields.resolve("number")?;
    let settings: Vec<_> = number
        .get("settings")
        .and_then(Value::as_object)
        .map(|settings| settings.keys().cloned().collect())
        .unwrap_or_default();
    ensure!(settings == ["placeholder", "decimals", "min_value", "max_value", "required"]);
    Ok(())
}

#[rstest]
fn select_prepends_the_placeholder_option(fields: Registry) -> Result<()> {
    let select = fields.instantiate(
        "select",
        into_tree(json!({"options": {"red": "Red", "blue": "Blue"}})),
    )?;
    let options = select
        .get("options")
        .and_then(Value::as_object)
        .context("options")?;
    ensure!(options.keys().collect::<Vec<_>>() == ["", "red", "blue"]);
    ensure!(options.get("") == Some(&json!("\u{2014}")));
    ensure!(
        attributes(&select)?.get("placeholder") == Some(&json!("\u{2014}")),
        "the base field hook ran first"
    );
    Ok(())
}

#[rstest]
fn multiple_selects_override_the_inherited_placeholder(fields: Registry) -> Result<()> {
    let select = fields.instantiate(
        "select",
        into_tree(json!({"multiple": true, "options": {"red": "Red"}})),
    )?;
    let attrs = attributes(&select)?;
    ensure!(attrs.get("multiple") == Some(&json!(true)));
    ensure!(attrs.get("placeholder").is_none(), "descendant hooks may undo ancestor output");
    ensure!(select.get_path(&["options", ""]).is_none());
    Ok(())
}

#[rstest]
fn toggles_inherit_without_a_hook_of_their_own(fields: Registry) -> Result<()> {
    let toggle = fields.instantiate("toggle", into_tree(json!({"required": true})))?;
    ensure!(toggle.get("caption") == Some(&json!("On")));
    ensure!(attributes(&toggle)?.get("required") == Some(&json!(true)));

    let optional = fields.instantiate("toggle", ConfigTree::new())?;
    ensure!(optional.get("attributes").is_none());
    Ok(())
}
