//! Translation trees and the merge engine.
//!
//! Translation content is a nested mapping from string keys to either a
//! string leaf (UI copy) or a nested subtree. The shape of every value is
//! decided once, at deserialization time, by the `TranslationValue` sum
//! type; the merge engine then operates structurally without re-deriving
//! shape at each step.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Recursion limit for merging. Authored translation trees are shallow;
/// anything deeper than this indicates corrupt or hostile registry content.
const MAX_MERGE_DEPTH: usize = 64;

/// A single value in a translation tree.
///
/// `Other` captures anything that is neither a string leaf nor an object:
/// arrays, numbers, booleans, null. Such values are opaque to the merge
/// engine: an override array replaces a base array wholesale, never
/// element-wise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranslationValue {
    Leaf(String),
    Tree(BTreeMap<String, TranslationValue>),
    Other(serde_json::Value),
}

impl TranslationValue {
    /// Convert an arbitrary JSON value into a tagged translation value.
    pub fn from_json(value: serde_json::Value) -> TranslationValue {
        match value {
            serde_json::Value::String(s) => TranslationValue::Leaf(s),
            serde_json::Value::Object(map) => TranslationValue::Tree(
                map.into_iter()
                    .map(|(k, v)| (k, TranslationValue::from_json(v)))
                    .collect(),
            ),
            other => TranslationValue::Other(other),
        }
    }

    /// Look up a direct child by key. Returns `None` on non-tree values.
    pub fn get(&self, key: &str) -> Option<&TranslationValue> {
        match self {
            TranslationValue::Tree(map) => map.get(key),
            _ => None,
        }
    }

    /// Get the leaf string, if this value is a leaf.
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            TranslationValue::Leaf(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, TranslationValue::Tree(_))
    }
}

/// Merge a base translation value with a sparse override.
///
/// Right-biased recursive merge: override leaves always win, override
/// subtrees are merged key-by-key so a language override can patch one
/// nested string without restating sibling keys. Neither input is mutated.
///
/// Scalar and `null` overrides are treated as "no usable override" and keep
/// the base, matching the absence semantics of an omitted key. Arrays are
/// the exception: an override array replaces a base value wholesale.
pub fn merge(
    base: Option<&TranslationValue>,
    overlay: Option<&TranslationValue>,
) -> Option<TranslationValue> {
    merge_at_depth(base, overlay, 0)
}

fn merge_at_depth(
    base: Option<&TranslationValue>,
    overlay: Option<&TranslationValue>,
    depth: usize,
) -> Option<TranslationValue> {
    match overlay {
        // Absence of a usable override means keep the base. Scalar and null
        // overrides are unusable; arrays are the one opaque value that
        // replaces its base counterpart wholesale.
        None => base.cloned(),
        Some(TranslationValue::Other(serde_json::Value::Array(_))) => overlay.cloned(),
        Some(TranslationValue::Other(_)) => base.cloned(),

        // Override leaves always win.
        Some(leaf @ TranslationValue::Leaf(_)) => Some(leaf.clone()),

        Some(overlay_tree @ TranslationValue::Tree(overlay_map)) => match base {
            Some(TranslationValue::Tree(base_map)) => {
                if depth >= MAX_MERGE_DEPTH {
                    tracing::warn!(
                        depth,
                        "translation tree exceeds merge depth limit, keeping base subtree"
                    );
                    return base.cloned();
                }
                let mut merged = base_map.clone();
                for (key, overlay_value) in overlay_map {
                    if let Some(value) =
                        merge_at_depth(base_map.get(key), Some(overlay_value), depth + 1)
                    {
                        merged.insert(key.clone(), value);
                    }
                }
                Some(TranslationValue::Tree(merged))
            }
            // Base is a leaf or absent: a defined override tree replaces it.
            _ => Some(overlay_tree.clone()),
        },
    }
}

/// Report key paths whose shape (leaf vs. subtree) differs between a base
/// tree and an override tree. Partial translations are expected and fine;
/// a shape conflict usually means a typo in authored content, so callers
/// log these rather than failing.
pub fn shape_mismatches(base: &TranslationValue, overlay: &TranslationValue) -> Vec<String> {
    let mut paths = Vec::new();
    collect_mismatches(base, overlay, String::new(), &mut paths);
    paths
}

fn collect_mismatches(
    base: &TranslationValue,
    overlay: &TranslationValue,
    path: String,
    out: &mut Vec<String>,
) {
    match (base, overlay) {
        (TranslationValue::Tree(base_map), TranslationValue::Tree(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                if let Some(base_value) = base_map.get(key) {
                    let child_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", path, key)
                    };
                    collect_mismatches(base_value, overlay_value, child_path, out);
                }
            }
        }
        (TranslationValue::Tree(_), _) | (_, TranslationValue::Tree(_)) => {
            out.push(path);
        }
        _ => {}
    }
}
