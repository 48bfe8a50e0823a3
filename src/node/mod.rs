//! Schema nodes and the compiler that builds them from JSON fragments.
//!
//! A fragment is compiled by shape:
//!
//! - a list becomes an [`OptionsNode`]
//! - an object with `__array__` becomes an [`ArrayNode`]
//! - an object with `__hash__` becomes a [`HashNode`]
//! - an object with `__type__` becomes a [`LeafNode`], or the node described
//!   by `__type__` when it holds a nested fragment
//! - any other object becomes a [`ParentNode`]
//! - a string is a type name and becomes a bare [`LeafNode`]

mod array;
mod base;
mod hash;
mod leaf;
mod options;
mod parent;
mod traits;
mod tree;

pub use array::{ArrayMode, ArrayNode};
pub use base::BaseNode;
pub use hash::HashNode;
pub use leaf::{LeafNode, Scalar};
pub use options::OptionsNode;
pub use parent::ParentNode;
pub use traits::NodeLike;
pub use tree::Tree;

use serde_json::{Map, Value};

use crate::error::{BuildError, CleanError, ValidationResult};
use crate::path::JsonPath;

/// Any compiled schema node.
///
/// # Example
///
/// ```rust
/// use formnode::{Node, NodeLike};
/// use serde_json::json;
///
/// let node = Node::from_value(&json!({
///     "id": "uint",
///     "tags": {"__array__": "unique", "__type__": "string"}
/// }))
/// .unwrap();
///
/// assert_eq!(node.class_name(), "Parent");
/// assert!(node.is_valid(&json!({"id": 3, "tags": ["a", "b"]})));
/// assert!(!node.is_valid(&json!({"id": 3, "tags": ["a", "a"]})));
/// ```
#[derive(Debug, Clone)]
pub enum Node {
    Leaf(LeafNode),
    Array(ArrayNode),
    Hash(HashNode),
    Options(OptionsNode),
    Parent(ParentNode),
}

impl Node {
    /// Compiles a schema fragment.
    pub fn from_value(fragment: &Value) -> Result<Self, BuildError> {
        match fragment {
            Value::Array(items) => OptionsNode::from_list(items).map(Node::Options),
            Value::String(name) => LeafNode::from_type_name(name).map(Node::Leaf),
            Value::Object(details) => Self::from_details(details.clone()),
            other => Err(BuildError::UnrecognizedFragment(other.to_string())),
        }
    }

    /// Parses `text` as JSON and compiles it.
    pub fn from_json(text: &str) -> Result<Self, BuildError> {
        let fragment: Value = serde_json::from_str(text)?;
        Self::from_value(&fragment)
    }

    fn from_details(mut details: Map<String, Value>) -> Result<Self, BuildError> {
        if details.contains_key("__array__") {
            return ArrayNode::from_details(details).map(Node::Array);
        }
        if details.contains_key("__hash__") {
            return HashNode::from_details(details).map(Node::Hash);
        }
        match details.get("__type__") {
            Some(Value::Object(_)) | Some(Value::Array(_)) => {
                if let Some(extra) = details.keys().find(|key| key.as_str() != "__type__") {
                    return Err(BuildError::UnexpectedKey(extra.clone()));
                }
                let nested = details.shift_remove("__type__").unwrap_or(Value::Null);
                Self::from_value(&nested)
            }
            Some(_) => LeafNode::from_details(details).map(Node::Leaf),
            None => ParentNode::from_details(details).map(Node::Parent),
        }
    }

    /// The name of the node variant, as reported in diagnostics.
    pub fn class_name(&self) -> &'static str {
        match self {
            Node::Leaf(_) => "Node",
            Node::Array(_) => "ArrayNode",
            Node::Hash(_) => "HashNode",
            Node::Options(_) => "OptionsNode",
            Node::Parent(_) => "Parent",
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            Node::Leaf(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayNode> {
        match self {
            Node::Array(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&HashNode> {
        match self {
            Node::Hash(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_options(&self) -> Option<&OptionsNode> {
        match self {
            Node::Options(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_parent(&self) -> Option<&ParentNode> {
        match self {
            Node::Parent(node) => Some(node),
            _ => None,
        }
    }

    /// Shared state of the node. Options nodes have none.
    pub fn base(&self) -> Option<&BaseNode> {
        match self {
            Node::Leaf(node) => Some(node.base()),
            Node::Array(node) => Some(node.base()),
            Node::Hash(node) => Some(node.base()),
            Node::Parent(node) => Some(node.base()),
            Node::Options(_) => None,
        }
    }

    pub fn base_mut(&mut self) -> Option<&mut BaseNode> {
        match self {
            Node::Leaf(node) => Some(node.base_mut()),
            Node::Array(node) => Some(node.base_mut()),
            Node::Hash(node) => Some(node.base_mut()),
            Node::Parent(node) => Some(node.base_mut()),
            Node::Options(_) => None,
        }
    }

    /// The special value stored under `name` (without underscores).
    pub fn special(&self, name: &str) -> Option<&Value> {
        self.base().and_then(|base| base.special(name))
    }

    fn inner(&self) -> &dyn NodeLike {
        match self {
            Node::Leaf(node) => node,
            Node::Array(node) => node,
            Node::Hash(node) => node,
            Node::Options(node) => node,
            Node::Parent(node) => node,
        }
    }
}

impl NodeLike for Node {
    fn valid(&self, value: &Value, path: &JsonPath) -> ValidationResult {
        self.inner().valid(value, path)
    }

    fn clean_at(&self, value: &Value, path: &JsonPath) -> Result<Value, CleanError> {
        self.inner().clean_at(value, path)
    }

    fn is_optional(&self) -> bool {
        self.inner().is_optional()
    }

    fn to_value(&self) -> Value {
        self.inner().to_value()
    }
}

/// Short JSON type name of a value, used in `got` details.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Writes the child of a container into the container's fragment.
///
/// Leaf and parent children without their own optional flag or specials are
/// merged into the container's keys. Anything else is nested under
/// `__type__`, so its keys can not be mistaken for the container's. A child
/// that exports no keys at all (an empty parent) is nested too, since the
/// container fragment would otherwise lose its child.
pub(crate) fn export_child(child: &Node, out: &mut Map<String, Value>) {
    let mergeable = match child {
        Node::Leaf(node) => node.base().is_plain(),
        Node::Parent(node) => node.base().is_plain(),
        _ => false,
    };
    match (mergeable, child.to_value()) {
        (true, Value::Object(entries)) if !entries.is_empty() => out.extend(entries),
        (_, exported) => {
            out.insert("__type__".to_string(), exported);
        }
    }
}
