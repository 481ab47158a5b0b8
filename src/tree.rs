use std::collections::BTreeMap;

/// One named source's tokens: group and token names mapped to nested groups or leaves.
pub type TokenTree = BTreeMap<String, TokenNode>;

/// Every token source supplied to a resolution, keyed by source name (usually a file name).
pub type TokenMap = BTreeMap<String, TokenTree>;

/// A modifier name mapped to the single value chosen for it, e.g. `theme -> dark`.
pub type ModifierSelection = BTreeMap<String, String>;

/// The member key that marks a JSON object as a token rather than a group.
pub const TOKEN_VALUE_KEY: &str = "$value";

#[derive(Debug, PartialEq, Clone)]
pub enum TokenNode {
    /// A nested group. Merging recurses into these.
    Group(TokenTree),
    /// Anything else: scalars, arrays and `$value` token objects. Merging replaces these wholesale.
    Leaf(serde_json::Value),
}

impl TokenNode {
    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self, TokenNode::Group(_))
    }

    #[must_use]
    pub fn as_group(&self) -> Option<&TokenTree> {
        match self {
            TokenNode::Group(tree) => Some(tree),
            TokenNode::Leaf(_) => None,
        }
    }

    #[must_use]
    pub fn as_leaf(&self) -> Option<&serde_json::Value> {
        match self {
            TokenNode::Leaf(value) => Some(value),
            TokenNode::Group(_) => None,
        }
    }
}

/// Looks up the node at `path`, a sequence of keys from the root.
#[must_use]
pub fn get_node<'a, S: AsRef<str>>(tree: &'a TokenTree, path: &[S]) -> Option<&'a TokenNode> {
    let (first, rest) = path.split_first()?;
    let node = tree.get(first.as_ref())?;
    if rest.is_empty() {
        return Some(node);
    }
    match node {
        TokenNode::Group(child) => get_node(child, rest),
        TokenNode::Leaf(_) => None,
    }
}
