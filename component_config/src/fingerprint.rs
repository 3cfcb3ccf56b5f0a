//! Deterministic fingerprints of configuration trees and the id cache
//! interface keyed by them.
//!
//! A fingerprint hashes the canonical JSON form of a tree: mapping keys are
//! visited in sorted order and lists in their own order. Two trees holding
//! the same data therefore share a fingerprint even when their keys were
//! inserted in different orders.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::value::ConfigTree;

/// Hex-encoded SHA-256 digest of a tree's canonical form.
///
/// # Examples
///
/// ```rust
/// use component_config::{Fingerprint, into_tree};
/// use serde_json::json;
///
/// let a = into_tree(json!({"x": 1, "y": [1, 2]}));
/// let b = into_tree(json!({"y": [1, 2], "x": 1}));
/// assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
/// assert_eq!(Fingerprint::of(&a).as_str().len(), 64);
/// ```
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint `tree`.
    #[must_use]
    pub fn of(tree: &ConfigTree) -> Self {
        let mut hasher = Sha256::new();
        hash_tree(tree, &mut hasher);
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn hash_tree(tree: &ConfigTree, hasher: &mut Sha256) {
    let mut keys: Vec<&String> = tree.keys().collect();
    keys.sort_unstable();
    hasher.update(b"{");
    for (index, key) in keys.into_iter().enumerate() {
        if index > 0 {
            hasher.update(b",");
        }
        hash_string(key, hasher);
        hasher.update(b":");
        if let Some(value) = tree.get(key) {
            hash_value(value, hasher);
        }
    }
    hasher.update(b"}");
}

fn hash_value(value: &Value, hasher: &mut Sha256) {
    match value {
        Value::Null => hasher.update(b"null"),
        Value::Bool(flag) => hasher.update(if *flag { "true" } else { "false" }),
        Value::Number(number) => hasher.update(number.to_string().as_bytes()),
        Value::String(text) => hash_string(text, hasher),
        Value::Array(items) => {
            hasher.update(b"[");
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    hasher.update(b",");
                }
                hash_value(item, hasher);
            }
            hasher.update(b"]");
        }
        Value::Object(map) => hash_tree(map, hasher),
    }
}

fn hash_string(text: &str, hasher: &mut Sha256) {
    // Display of a string value yields its escaped JSON literal.
    hasher.update(Value::from(text).to_string().as_bytes());
}

/// Storage for record ids computed from a resolved configuration.
///
/// Collaborators that run expensive queries for a component (for example
/// the ids of listings matching a block's filters) cache the result under
/// the component's [`Fingerprint`], grouped so that a whole family of
/// entries can be invalidated when the underlying records change.
pub trait IdCache: Send + Sync {
    /// Cached ids for `fingerprint` within `group`.
    fn get_ids(&self, group: &str, fingerprint: &Fingerprint) -> Option<Vec<u64>>;

    /// Stores `ids` for `fingerprint` within `group`.
    fn set_ids(&self, group: &str, fingerprint: &Fingerprint, ids: Vec<u64>);

    /// Drops every entry of `group`.
    fn clear_group(&self, group: &str);
}

/// In-memory [`IdCache`].
///
/// # Examples
///
/// ```rust
/// use component_config::{Fingerprint, IdCache, MemoryIdCache, into_tree};
/// use serde_json::json;
///
/// let cache = MemoryIdCache::default();
/// let key = Fingerprint::of(&into_tree(json!({"category": 3})));
///
/// cache.set_ids("listing", &key, vec![7, 9]);
/// assert_eq!(cache.get_ids("listing", &key), Some(vec![7, 9]));
///
/// cache.clear_group("listing");
/// assert_eq!(cache.get_ids("listing", &key), None);
/// ```
#[derive(Debug, Default)]
pub struct MemoryIdCache {
    groups: RwLock<HashMap<String, HashMap<Fingerprint, Vec<u64>>>>,
}

impl MemoryIdCache {
    /// Number of cached entries across all groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.read().values().map(HashMap::len).sum()
    }

    /// Returns `true` when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdCache for MemoryIdCache {
    fn get_ids(&self, group: &str, fingerprint: &Fingerprint) -> Option<Vec<u64>> {
        self.groups.read().get(group)?.get(fingerprint).cloned()
    }

    fn set_ids(&self, group: &str, fingerprint: &Fingerprint, ids: Vec<u64>) {
        self.groups
            .write()
            .entry(group.to_owned())
            .or_default()
            .insert(fingerprint.clone(), ids);
    }

    fn clear_group(&self, group: &str) {
        self.groups.write().remove(group);
    }
}
