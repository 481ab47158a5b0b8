//! Leaf path enumeration ("token IDs") and path-level comparison of token trees.

use crate::tree::{TokenNode, TokenTree};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_PATH_SEPARATOR: &str = ".";

const METADATA_PREFIX: char = '$';

/// Returns the path of every leaf in `tree`, keys joined with `separator`.
///
/// Empty groups contribute no path. Group metadata (`$type`, `$description` and
/// other `$`-prefixed members) is not a token and is skipped, along with anything below it.
#[must_use]
pub fn leaf_paths(tree: &TokenTree, separator: &str) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();
    visit_leaves(tree, separator, &mut String::new(), &mut |path, _| {
        paths.insert(path.to_string());
    });
    paths
}

/// Flattens `tree` into a map from leaf path to leaf value, skipping group metadata
/// the way [`leaf_paths`] does.
#[must_use]
pub fn flatten(tree: &TokenTree, separator: &str) -> BTreeMap<String, Value> {
    let mut flat = BTreeMap::new();
    visit_leaves(tree, separator, &mut String::new(), &mut |path, value| {
        flat.insert(path.to_string(), value.clone());
    });
    flat
}

/// Paths of `actual` whose leaf value differs from (or is absent in) `baseline`,
/// plus paths that only exist in `baseline`.
#[must_use]
pub fn changed_paths(baseline: &TokenTree, actual: &TokenTree, separator: &str) -> BTreeSet<String> {
    let before = flatten(baseline, separator);
    let after = flatten(actual, separator);

    let mut changed: BTreeSet<String> = after
        .iter()
        .filter(|(path, value)| before.get(*path) != Some(*value))
        .map(|(path, _)| path.clone())
        .collect();
    changed.extend(
        before
            .keys()
            .filter(|path| !after.contains_key(*path))
            .cloned(),
    );
    changed
}

fn visit_leaves<F>(tree: &TokenTree, separator: &str, prefix: &mut String, visit: &mut F)
where
    F: FnMut(&str, &Value),
{
    for (key, node) in tree {
        if key.starts_with(METADATA_PREFIX) {
            continue;
        }
        let restore = prefix.len();
        if !prefix.is_empty() {
            prefix.push_str(separator);
        }
        prefix.push_str(key);
        match node {
            TokenNode::Group(child) => visit_leaves(child, separator, prefix, visit),
            TokenNode::Leaf(value) => visit(prefix, value),
        }
        prefix.truncate(restore);
    }
}
