//! Integration tests for block template hierarchies loaded from declarations.
//!
//! The fixture declares a small page template family whose descendants patch
//! blocks deep inside the inherited tree without restating their position.

use anyhow::{Context, Result, ensure};
use camino::Utf8PathBuf;
use component_config::{
    ConfigTree, DEFAULT_TREE_KEY, MergeStrategy, Registry, find_node, into_tree, load_declarations,
    merge_tree_with_report,
};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

fn fixture_path(name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[fixture]
fn templates() -> Registry {
    let declarations =
        load_declarations(&fixture_path("templates.toml")).expect("fixture declarations parse");
    Registry::builder()
        .register_all(declarations.into_iter().map(Into::into))
        .expect("fixture declarations register")
        .build()
}

fn keys(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_object)
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}

#[rstest]
fn every_template_inherits_the_tree_strategy(templates: Registry) -> Result<()> {
    for name in templates.names() {
        ensure!(
            templates.strategy(name)? == MergeStrategy::blocks(),
            "{name} should use the block tree merge"
        );
    }
    Ok(())
}

#[rstest]
fn wide_pages_add_content_inside_the_page_container(templates: Registry) -> Result<()> {
    let page = templates.resolve("page_wide")?;
    ensure!(
        keys(page.get("blocks")) == ["page_container"],
        "only the container sits at the root"
    );
    let container = find_node(page, DEFAULT_TREE_KEY, "page_container").context("container")?;
    ensure!(
        keys(container.get(DEFAULT_TREE_KEY)) == ["page_header", "page_footer", "page_content"],
        "content is added beside the inherited header and footer"
    );
    Ok(())
}

#[rstest]
fn descendants_patch_deep_blocks_by_name(templates: Registry) -> Result<()> {
    let page = templates.resolve("listing_category_view_page")?;
    let wide = templates.resolve("page_wide")?;

    let title = find_node(page, DEFAULT_TREE_KEY, "page_title").context("page title")?;
    ensure!(
        *title
            == json!({
                "type": "part",
                "path": "listing-category/view/page/listing-category-name",
                "order": 20
            }),
        "title path is replaced and its other fields kept: {title}"
    );

    let content = find_node(page, DEFAULT_TREE_KEY, "page_content").context("page content")?;
    ensure!(
        content.pointer("/attributes/class")
            == Some(&json!(["hp-page__content", "hp-listing-category--view-page"])),
        "class lists accumulate exactly once"
    );
    ensure!(
        keys(content.get(DEFAULT_TREE_KEY))
            == ["breadcrumb_menu", "page_title", "listing_category_description"],
        "new blocks are grafted where they were declared"
    );

    for untouched in ["page_header", "page_footer", "breadcrumb_menu"] {
        ensure!(
            find_node(page, DEFAULT_TREE_KEY, untouched) == find_node(wide, DEFAULT_TREE_KEY, untouched),
            "{untouched} should be inherited unchanged"
        );
    }
    ensure!(
        page.get("blocks").map(|blocks| keys(Some(blocks))) == Some(vec!["page_container".to_owned()]),
        "patched blocks are not duplicated at the root"
    );
    Ok(())
}

#[rstest]
fn instance_overrides_reach_template_blocks(templates: Registry) -> Result<()> {
    let overrides = into_tree(json!({
        "context": {"listing_category_id": 4},
        "blocks": {
            "listing_category_count": {"order": 5},
            "listing_category_image": {"attributes": {"class": ["hp-image--square"]}}
        }
    }));
    let block = templates.instantiate("listing_category_view_block", overrides)?;

    ensure!(block.get("context") == Some(&json!({"listing_category_id": 4})));
    let count = find_node(block.tree(), DEFAULT_TREE_KEY, "listing_category_count").context("count")?;
    ensure!(count.get("order") == Some(&json!(5)));
    ensure!(
        count.get("filepath") == Some(&json!("listing-category/view/listing-category-count"))
    );
    let image = find_node(block.tree(), DEFAULT_TREE_KEY, "listing_category_image").context("image")?;
    ensure!(image.pointer("/attributes/class") == Some(&json!(["hp-image--square"])));

    let resolved = templates.resolve("listing_category_view_block")?;
    ensure!(
        find_node(resolved, DEFAULT_TREE_KEY, "listing_category_count")
            .and_then(|node| node.get("order"))
            == Some(&json!(20)),
        "instance overrides never leak into class metadata"
    );
    Ok(())
}

#[rstest]
fn identical_instances_share_a_fingerprint(templates: Registry) -> Result<()> {
    let first = templates.instantiate(
        "listing_category_view_block",
        into_tree(json!({"context": {"a": 1, "b": 2}})),
    )?;
    let second = templates.instantiate(
        "listing_category_view_block",
        into_tree(json!({"context": {"b": 2, "a": 1}})),
    )?;
    let other = templates.instantiate(
        "listing_category_view_block",
        into_tree(json!({"context": {"a": 2}})),
    )?;
    ensure!(first.fingerprint() == second.fingerprint());
    ensure!(first.fingerprint() != other.fingerprint());
    Ok(())
}

#[rstest]
fn targeted_merges_patch_one_node_of_a_resolved_template(templates: Registry) -> Result<()> {
    let block = templates.resolve("listing_category_view_block")?;
    let header: ConfigTree = find_node(block, DEFAULT_TREE_KEY, "listing_category_header")
        .and_then(Value::as_object)
        .cloned()
        .context("header")?;

    let overrides = into_tree(json!({
        "blocks": {
            "listing_category_header": {"tag": "div"},
            "listing_category_content": {"tag": "section"}
        }
    }));
    let (patched, report) = merge_tree_with_report(
        &header,
        &overrides,
        DEFAULT_TREE_KEY,
        Some("listing_category_header"),
    );

    ensure!(patched.get("tag") == Some(&json!("div")));
    ensure!(report.applied() == ["listing_category_header"]);
    ensure!(!report.found("listing_category_content"), "siblings are out of reach");
    Ok(())
}
