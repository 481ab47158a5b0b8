use crate::tree::{TokenNode, TokenTree};
use std::collections::btree_map::Entry;

/// Merges token trees left to right into a new tree.
///
/// At every key, two groups are merged recursively; any other pairing is a conflict
/// and the later tree's node replaces the earlier one outright, including when a leaf
/// meets a group. The inputs are never modified.
#[must_use]
pub fn merge<'a, I>(trees: I) -> TokenTree
where
    I: IntoIterator<Item = &'a TokenTree>,
{
    let mut merged = TokenTree::new();
    for tree in trees {
        merge_into(&mut merged, tree);
    }
    merged
}

/// Merges `overlay` on top of `target` in place. This is the pairwise step of [`merge`].
pub fn merge_into(target: &mut TokenTree, overlay: &TokenTree) {
    for (key, incoming) in overlay {
        match target.entry(key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(incoming.clone());
            }
            Entry::Occupied(mut slot) => match (slot.get_mut(), incoming) {
                (TokenNode::Group(existing), TokenNode::Group(child)) => {
                    merge_into(existing, child);
                }
                (current, _) => {
                    *current = incoming.clone();
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::{to_value, tree_from_value};
    use serde_json::{json, Value};

    fn tree(value: Value) -> TokenTree {
        tree_from_value(value).unwrap()
    }

    #[test]
    fn test_empty_sequence_is_empty_tree() {
        assert!(merge(&Vec::<TokenTree>::new()).is_empty());
    }

    #[test]
    fn test_single_tree_is_identity() {
        let a = tree(json!({ "color": { "text": "black", "bg": { "$value": "#fff" } } }));
        assert_eq!(merge(std::slice::from_ref(&a)), a);
    }

    #[test]
    fn test_last_write_wins_on_leaves() {
        let a = tree(json!({ "k": 1 }));
        let b = tree(json!({ "k": 2 }));
        assert_eq!(to_value(&merge(&[a.clone(), b.clone()])), json!({ "k": 2 }));
        assert_eq!(to_value(&merge(&[b, a])), json!({ "k": 1 }));
    }

    #[test]
    fn test_groups_union_recursively() {
        let a = tree(json!({ "a": { "x": 1 } }));
        let b = tree(json!({ "a": { "y": 2 } }));
        assert_eq!(
            to_value(&merge(&[a, b])),
            json!({ "a": { "x": 1, "y": 2 } })
        );
    }

    #[test]
    fn test_later_shape_wins_outright() {
        let group = tree(json!({ "size": { "sm": 4, "lg": 8 } }));
        let leaf = tree(json!({ "size": 12 }));

        assert_eq!(
            to_value(&merge(&[group.clone(), leaf.clone()])),
            json!({ "size": 12 })
        );
        assert_eq!(
            to_value(&merge(&[leaf, group])),
            json!({ "size": { "sm": 4, "lg": 8 } })
        );
    }

    #[test]
    fn test_token_objects_are_not_merged_field_by_field() {
        let a = tree(json!({ "brand": { "$value": "#000", "$description": "ink" } }));
        let b = tree(json!({ "brand": { "$value": "#fff" } }));
        assert_eq!(
            to_value(&merge(&[a, b])),
            json!({ "brand": { "$value": "#fff" } })
        );
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let a = tree(json!({ "a": { "x": 1 } }));
        let b = tree(json!({ "a": { "x": 2, "y": 3 } }));
        let (a_before, b_before) = (a.clone(), b.clone());

        let mut merged = merge(&[a.clone(), b.clone()]);
        merge_into(&mut merged, &tree(json!({ "a": { "z": 4 } })));

        assert_eq!(a, a_before);
        assert_eq!(b, b_before);
    }
}
