use crate::tree::{TokenNode, TokenTree, TOKEN_VALUE_KEY};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

impl Serialize for TokenNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TokenNode::Group(tree) => tree.serialize(serializer),
            TokenNode::Leaf(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TokenNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(node_from_value)
    }
}

/// Classifies a parsed JSON value: plain objects become groups, everything else
/// (including objects carrying `$value`) stays an opaque leaf.
#[must_use]
pub fn node_from_value(value: Value) -> TokenNode {
    match value {
        Value::Object(members) if !members.contains_key(TOKEN_VALUE_KEY) => {
            TokenNode::Group(tree_from_members(members))
        }
        other => TokenNode::Leaf(other),
    }
}

/// Builds a token tree from a parsed document. Returns `None` when the root is not an object.
#[must_use]
pub fn tree_from_value(value: Value) -> Option<TokenTree> {
    match value {
        Value::Object(members) => Some(tree_from_members(members)),
        _ => None,
    }
}

fn tree_from_members(members: Map<String, Value>) -> TokenTree {
    members
        .into_iter()
        .map(|(key, value)| (key, node_from_value(value)))
        .collect()
}

/// Converts a tree back into plain JSON.
#[must_use]
pub fn to_value(tree: &TokenTree) -> Value {
    Value::Object(
        tree.iter()
            .map(|(key, node)| (key.clone(), node_to_value(node)))
            .collect(),
    )
}

pub(crate) fn node_to_value(node: &TokenNode) -> Value {
    match node {
        TokenNode::Group(tree) => to_value(tree),
        TokenNode::Leaf(value) => value.clone(),
    }
}

/// Short JSON type name used in diagnostics.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dollar_value_objects_are_leaves() {
        let tree = tree_from_value(json!({
            "color": {
                "brand": { "$value": "#0af", "$type": "color" },
                "muted": "#999"
            }
        }))
        .unwrap();

        let color = tree["color"].as_group().unwrap();
        assert_eq!(
            color["brand"],
            TokenNode::Leaf(json!({ "$value": "#0af", "$type": "color" }))
        );
        assert_eq!(color["muted"], TokenNode::Leaf(json!("#999")));
    }

    #[test]
    fn test_non_object_root_is_rejected() {
        assert!(tree_from_value(json!([1, 2])).is_none());
        assert!(tree_from_value(json!("text")).is_none());
    }

    #[test]
    fn test_to_value_preserves_structure() {
        let source = json!({
            "space": { "sm": 4, "lg": [8, 16] },
            "flag": null
        });
        let tree = tree_from_value(source.clone()).unwrap();
        assert_eq!(to_value(&tree), source);
    }

    #[test]
    fn test_serde_round_trip_through_text() {
        let tree: TokenTree =
            serde_json::from_str(r#"{ "a": { "b": { "$value": 1 } }, "c": true }"#).unwrap();
        assert!(tree["a"].is_group());
        let text = serde_json::to_string(&tree).unwrap();
        assert_eq!(text, r#"{"a":{"b":{"$value":1}},"c":true}"#);
    }
}
