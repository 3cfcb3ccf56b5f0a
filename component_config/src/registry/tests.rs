//! Unit tests for class registration and chain resolution.

use std::sync::Arc;

use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::value::into_tree;

fn class(name: &str, parent: Option<&str>, metadata: Value) -> ClassDescriptor {
    let descriptor = ClassDescriptor::new(name).with_metadata(into_tree(metadata));
    match parent {
        Some(parent_name) => descriptor.extends(parent_name),
        None => descriptor,
    }
}

#[fixture]
fn chain() -> Registry {
    Registry::builder()
        .register(class("base", None, json!({"x": 1, "y": 1})))
        .and_then(|b| b.register(class("mid", Some("base"), json!({"y": 2}))))
        .and_then(|b| b.register(class("leaf", Some("mid"), json!({"z": 3}))))
        .expect("chain registers")
        .build()
}

#[rstest]
fn later_classes_take_precedence(chain: Registry) {
    let resolved = chain.resolve("leaf").expect("leaf is registered");
    assert_eq!(Value::Object(resolved.clone()), json!({"x": 1, "y": 2, "z": 3}));
}

#[rstest]
fn resolution_is_memoised(chain: Registry) {
    let first = chain.resolve("leaf").expect("leaf is registered");
    let second = chain.resolve("leaf").expect("leaf is registered");
    assert!(std::ptr::eq(first, second));
}

#[rstest]
fn chains_run_root_first(chain: Registry) {
    let names: Vec<_> = chain
        .chain("leaf")
        .expect("leaf is registered")
        .iter()
        .map(|class| class.name())
        .collect();
    assert_eq!(names, ["base", "mid", "leaf"]);
    assert_eq!(chain.names().collect::<Vec<_>>(), ["base", "mid", "leaf"]);
    assert_eq!(chain.len(), 3);
    assert!(chain.contains("mid"));
}

#[rstest]
fn unknown_classes_are_reported(chain: Registry) {
    let err = chain.resolve("sidebar").expect_err("sidebar is not registered");
    assert!(matches!(err.as_ref(), ComposeError::UnknownClass { name } if name == "sidebar"));
    assert!(chain.declare("sidebar", ConfigTree::new()).is_err());
}

#[test]
fn duplicates_are_rejected() {
    let err = Registry::builder()
        .register(ClassDescriptor::new("field"))
        .and_then(|b| b.register(ClassDescriptor::new("field")))
        .expect_err("second registration fails");
    assert!(matches!(err.as_ref(), ComposeError::DuplicateClass { name } if name == "field"));
}

#[test]
fn parents_must_be_registered_first() {
    let err = Registry::builder()
        .register(ClassDescriptor::new("number").extends("field"))
        .expect_err("parent is missing");
    assert!(matches!(
        err.as_ref(),
        ComposeError::UnknownParent { class, parent } if class == "number" && parent == "field"
    ));
}

#[test]
fn batches_are_ordered_by_inheritance() {
    let registry = Registry::builder()
        .register_all([
            class("leaf", Some("mid"), json!({"z": 3})),
            class("mid", Some("base"), json!({"y": 2})),
            class("base", None, json!({"x": 1, "y": 1})),
        ])
        .expect("batch registers")
        .build();
    assert_eq!(registry.names().collect::<Vec<_>>(), ["base", "mid", "leaf"]);
    assert_eq!(
        registry.resolve("leaf").expect("leaf is registered").get("y"),
        Some(&json!(2))
    );
}

#[test]
fn batches_report_every_problem() {
    let err = Registry::builder()
        .register(ClassDescriptor::new("field"))
        .and_then(|b| {
            b.register_all([
                ClassDescriptor::new("field"),
                ClassDescriptor::new("orphan").extends("missing"),
                ClassDescriptor::new("a").extends("b"),
                ClassDescriptor::new("b").extends("a"),
                ClassDescriptor::new("ok").extends("field"),
            ])
        })
        .expect_err("batch is invalid");

    let ComposeError::Aggregate(errors) = err.as_ref() else {
        panic!("expected an aggregate, got {err:?}");
    };
    let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
    assert_eq!(
        messages,
        [
            "class 'field' is already registered",
            "class 'orphan' extends unknown parent 'missing'",
            "cyclic inheritance detected: a -> b -> a",
        ]
    );
}

#[test]
fn self_parenting_is_a_cycle() {
    let err = Registry::builder()
        .register_all([ClassDescriptor::new("loop").extends("loop")])
        .expect_err("class cannot extend itself");
    assert!(matches!(
        err.as_ref(),
        ComposeError::CyclicInheritance { cycle } if cycle == "loop -> loop"
    ));
}

#[test]
fn hooks_attach_after_registration() {
    let registry = Registry::builder()
        .register(ClassDescriptor::new("toggle"))
        .and_then(|b| {
            b.with_hook(
                "toggle",
                Arc::new(|tree: &mut ConfigTree, _ctx: &crate::DeriveContext| {
                    tree.insert("role".into(), json!("switch"));
                }),
            )
        })
        .expect("toggle is registered")
        .build();
    let toggle = registry.instantiate("toggle", ConfigTree::new()).expect("registered");
    assert_eq!(toggle.get("role"), Some(&json!("switch")));

    let err = Registry::builder()
        .with_hook("missing", Arc::new(|_: &mut ConfigTree, _: &crate::DeriveContext| {}))
        .expect_err("missing class");
    assert!(matches!(err.as_ref(), ComposeError::UnknownClass { .. }));
}

#[test]
fn leaf_most_strategy_wins() {
    let registry = Registry::builder()
        .register(ClassDescriptor::new("block"))
        .and_then(|b| {
            b.register(
                ClassDescriptor::new("container")
                    .extends("block")
                    .with_strategy(MergeStrategy::blocks()),
            )
        })
        .and_then(|b| b.register(ClassDescriptor::new("listings").extends("container")))
        .expect("classes register")
        .build();

    assert_eq!(registry.strategy("block").expect("registered"), MergeStrategy::Merge);
    assert_eq!(registry.strategy("listings").expect("registered"), MergeStrategy::blocks());
}

#[test]
fn tree_strategy_folds_the_chain_with_tree_merge() {
    let registry = Registry::builder()
        .register(
            ClassDescriptor::new("page")
                .with_strategy(MergeStrategy::blocks())
                .with_metadata(into_tree(json!({
                    "blocks": {"container": {"blocks": {"title": {"tag": "h1"}}}}
                }))),
        )
        .and_then(|b| {
            b.register(
                ClassDescriptor::new("page_wide")
                    .extends("page")
                    .with_metadata(into_tree(json!({"blocks": {"title": {"tag": "h2"}}}))),
            )
        })
        .expect("classes register")
        .build();

    let resolved = registry.resolve("page_wide").expect("registered");
    assert_eq!(
        Value::Object(resolved.clone()),
        json!({"blocks": {"container": {"blocks": {"title": {"tag": "h2"}}}}})
    );
}

#[test]
fn ordered_paths_sort_once_after_the_fold() {
    let registry = Registry::builder()
        .order_key("_order")
        .register(
            ClassDescriptor::new("field")
                .with_metadata(into_tree(json!({
                    "meta": {"settings": {
                        "required": {"_order": 10},
                        "placeholder": {"_order": 20}
                    }}
                })))
                .order_entries_in("meta.settings"),
        )
        .and_then(|b| {
            b.register(ClassDescriptor::new("select").extends("field").with_metadata(into_tree(
                json!({"meta": {"settings": {
                    "options": {"_order": 15},
                    "required": {"_order": 30}
                }}}),
            )))
        })
        .expect("classes register")
        .build();

    let resolved = registry.resolve("select").expect("registered");
    let keys: Vec<_> = resolved["meta"]["settings"]
        .as_object()
        .into_iter()
        .flat_map(|settings| settings.keys())
        .collect();
    assert_eq!(keys, ["options", "placeholder", "required"]);
    assert_eq!(registry.order_key(), "_order");
}

#[rstest]
#[case::scalar_path(json!({"settings": 3}))]
#[case::missing_path(json!({"other": {}}))]
#[case::list_path(json!({"settings": [{"order": 2}, {"order": 1}]}))]
fn unusable_ordered_paths_are_left_alone(#[case] metadata: Value) {
    let field = ClassDescriptor::new("field")
        .with_metadata(into_tree(metadata.clone()))
        .order_entries_in("settings");
    assert_eq!(Value::Object(resolve_class_metadata([&field])), metadata);
}

#[test]
fn nested_ordered_paths_through_non_mappings_are_left_alone() {
    let field = ClassDescriptor::new("field")
        .with_metadata(into_tree(json!({"meta": ["settings"], "settings": {"b": {"order": 2}, "a": {"order": 1}}})))
        .order_entries_in("meta.settings")
        .order_entries_in("settings");
    let resolved = resolve_class_metadata([&field]);
    assert_eq!(resolved.get("meta"), Some(&json!(["settings"])));
    let keys: Vec<_> = resolved["settings"]
        .as_object()
        .into_iter()
        .flat_map(|settings| settings.keys())
        .collect();
    assert_eq!(keys, ["a", "b"]);
}

#[test]
fn abstract_roots_let_the_first_template_introduce_blocks() {
    let registry = Registry::builder()
        .register(ClassDescriptor::new("template").with_strategy(MergeStrategy::blocks()))
        .and_then(|b| {
            b.register(ClassDescriptor::new("page").extends("template").with_metadata(into_tree(
                json!({"blocks": {"page_container": {"blocks": {"page_title": {"tag": "h1"}}}}}),
            )))
        })
        .and_then(|b| {
            b.register(ClassDescriptor::new("listing_page").extends("page").with_metadata(into_tree(
                json!({"blocks": {
                    "page_title": {"tag": "h2"},
                    "page_sidebar": {"tag": "aside"}
                }}),
            )))
        })
        .expect("classes register")
        .build();

    let resolved = registry.resolve("listing_page").expect("registered");
    assert_eq!(
        Value::Object(resolved.clone()),
        json!({"blocks": {"page_container": {"blocks": {"page_title": {"tag": "h2"}}}}})
    );
}

#[test]
fn empty_chains_resolve_to_empty_trees() {
    let empty: [&ClassDescriptor; 0] = [];
    assert!(Aggregator::default().resolve(empty).is_empty());
}

#[test]
fn settings_choose_the_order_key() {
    let settings = crate::EngineSettings {
        order_key: "weight".to_owned(),
        ..crate::EngineSettings::default()
    };
    let registry = Registry::builder().with_settings(&settings).build();
    assert_eq!(registry.order_key(), "weight");
    assert!(registry.is_empty());
}

const fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn registries_are_shareable_across_threads() {
    assert_send_sync::<Registry>();
    assert_send_sync::<ClassDescriptor>();
}

#[rstest]
fn concurrent_resolution_shares_one_memoised_tree(chain: Registry) {
    let trees: Vec<&ConfigTree> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| chain.resolve("leaf").expect("registered")))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("resolver thread"))
            .collect()
    });

    let first = trees.first().copied().expect("four resolutions");
    assert_eq!(Value::Object(first.clone()), json!({"x": 1, "y": 2, "z": 3}));
    assert!(trees.iter().all(|tree| std::ptr::eq(*tree, first)));
    assert!(std::ptr::eq(first, chain.resolve("leaf").expect("registered")));
}

#[rstest]
fn concurrent_instances_are_structurally_equal(chain: Registry) {
    let instances: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| chain.instantiate("leaf", ConfigTree::new()).expect("registered")))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("instance thread"))
            .collect()
    });

    let first = instances.first().expect("four instances");
    assert!(instances.iter().all(|instance| instance == first));
    assert_eq!(first.fingerprint(), instances.last().expect("four instances").fingerprint());
}
