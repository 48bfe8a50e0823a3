//! Hash nodes: maps with dynamic keys.

use serde_json::{Map, Value};
use stillwater::Validation;

use crate::error::{absorb, finish, BuildError, CleanError, ValidationFailure, ValidationResult};
use crate::node::base::BaseNode;
use crate::node::leaf::LeafNode;
use crate::node::traits::NodeLike;
use crate::node::{export_child, value_type_name, Node};
use crate::path::JsonPath;

/// A map whose keys are checked by a leaf node and whose values all match
/// one child node.
///
/// `__hash__` is `true` for plain string keys, a type name, or a full leaf
/// fragment. The remaining keys of the fragment describe the values.
#[derive(Debug, Clone)]
pub struct HashNode {
    base: BaseNode,
    key: LeafNode,
    child: Box<Node>,
}

impl HashNode {
    pub(crate) fn from_details(mut details: Map<String, Value>) -> Result<Self, BuildError> {
        let key = match details.shift_remove("__hash__") {
            Some(Value::Bool(true)) => LeafNode::from_type_name("string")?,
            Some(Value::String(name)) => LeafNode::from_type_name(&name)?,
            Some(fragment @ Value::Object(_)) => LeafNode::from_fragment(&fragment)?,
            Some(other) => {
                return Err(BuildError::invalid(
                    "__hash__",
                    format!("expected true, a type name or a fragment, got {}", other),
                ))
            }
            None => return Err(BuildError::MissingDirective("__hash__".to_string())),
        };

        let base = BaseNode::from_details(&mut details);
        if details.is_empty() {
            return Err(BuildError::MissingDirective(
                "child node of __hash__".to_string(),
            ));
        }
        let child = Node::from_value(&Value::Object(details))?;

        Ok(Self {
            base,
            key,
            child: Box::new(child),
        })
    }

    /// The node every key is checked against.
    pub fn key(&self) -> &LeafNode {
        &self.key
    }

    /// The node every value is checked against.
    pub fn child(&self) -> &Node {
        &self.child
    }

    pub fn base(&self) -> &BaseNode {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut BaseNode {
        &mut self.base
    }
}

impl NodeLike for HashNode {
    fn valid(&self, value: &Value, path: &JsonPath) -> ValidationResult {
        if value.is_null() && self.base.is_optional() {
            return Validation::Success(());
        }

        let map = match value.as_object() {
            Some(map) => map,
            None => {
                return finish(vec![ValidationFailure::new(path.clone(), "not a hash")
                    .with_got(value_type_name(value))])
            }
        };

        let mut failures = Vec::new();
        for (key, item) in map {
            let item_path = path.push_field(key.as_str());
            let key_value = Value::String(key.clone());
            if !self.key.is_valid(&key_value) {
                failures.push(ValidationFailure::new(
                    item_path,
                    format!("invalid key: {}", key),
                ));
                continue;
            }
            absorb(&mut failures, self.child.valid(item, &item_path));
        }
        finish(failures)
    }

    fn clean_at(&self, value: &Value, path: &JsonPath) -> Result<Value, CleanError> {
        if value.is_null() && self.base.is_optional() {
            return Ok(Value::Null);
        }
        let map = value.as_object().ok_or_else(|| CleanError::WrongShape {
            path: path.clone(),
            expected: "hash".to_string(),
            got: value_type_name(value).to_string(),
        })?;

        let mut out = Map::new();
        for (key, item) in map {
            let item_path = path.push_field(key.as_str());
            let key = match self.key.clean_at(&Value::String(key.clone()), &item_path)? {
                Value::String(s) => s,
                other => other.to_string(),
            };
            out.insert(key, self.child.clean_at(item, &item_path)?);
        }
        Ok(Value::Object(out))
    }

    fn is_optional(&self) -> bool {
        self.base.is_optional()
    }

    fn to_value(&self) -> Value {
        let mut out = Map::new();
        let key = if self.key.is_plain() {
            Value::from(self.key.kind().as_str())
        } else {
            self.key.to_value()
        };
        out.insert("__hash__".to_string(), key);
        self.base.export_into(&mut out);
        export_child(&self.child, &mut out);
        Value::Object(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hash(fragment: Value) -> HashNode {
        match Node::from_value(&fragment).unwrap() {
            Node::Hash(node) => node,
            other => panic!("expected a hash node, got {}", other.class_name()),
        }
    }

    #[test]
    fn test_hash_of_hashes() {
        let node = hash(json!({
            "__hash__": "string",
            "__type__": {"__hash__": "string", "__type__": "uint"}
        }));

        assert!(node.is_valid(&json!({
            "test": {"un": 1, "deux": 2, "trois": 3},
            "this": {"one": 1, "two": 2, "three": 3}
        })));

        let failures = node
            .valid(
                &json!({"test": {"un": 1, "deux": 2, "trois": 3}, "me": 1}),
                &JsonPath::root(),
            )
            .into_result()
            .unwrap_err();
        assert_eq!(failures.pairs(), vec![("me".to_string(), "not a hash".to_string())]);
    }

    #[test]
    fn test_true_means_string_keys() {
        let node = hash(json!({"__hash__": true, "__type__": "int"}));
        assert_eq!(node.key().kind(), crate::Kind::String);
        assert!(node.is_valid(&json!({"anything": 1})));
    }

    #[test]
    fn test_invalid_key_skips_value() {
        let node = hash(json!({
            "__hash__": {"__type__": "string", "__regex__": "^[a-z]+$"},
            "__type__": "uint"
        }));
        let failures = node
            .valid(&json!({"Bad": -1, "good": -1}), &JsonPath::from_field("counts"))
            .into_result()
            .unwrap_err();
        assert_eq!(
            failures.pairs(),
            vec![
                ("counts.Bad".to_string(), "invalid key: Bad".to_string()),
                ("counts.good".to_string(), "signed".to_string()),
            ]
        );
    }

    #[test]
    fn test_clean_keys_and_values() {
        let node = hash(json!({"__hash__": "uint", "__type__": "price"}));
        assert_eq!(
            node.clean(&json!({"0x10": 1, "2": "3.5"})).unwrap(),
            json!({"16": "1.00", "2": "3.50"})
        );
        assert!(matches!(
            node.clean(&json!([1])),
            Err(CleanError::WrongShape { .. })
        ));
    }

    #[test]
    fn test_bad_hash_directive() {
        let err = Node::from_value(&json!({"__hash__": 5, "__type__": "int"})).unwrap_err();
        assert!(matches!(err, BuildError::InvalidDirective { .. }));

        let err = Node::from_value(&json!({"__hash__": true})).unwrap_err();
        assert!(matches!(err, BuildError::MissingDirective(_)));
    }

    #[test]
    fn test_export() {
        let node = hash(json!({"__hash__": true, "__optional__": true, "__type__": "uint"}));
        assert_eq!(
            node.to_json(),
            r#"{"__hash__":"string","__optional__":true,"__type__":"uint"}"#
        );

        let node = hash(json!({
            "__hash__": {"__type__": "string", "__options__": ["a", "b"]},
            "__type__": "int"
        }));
        assert_eq!(
            node.to_value(),
            json!({
                "__hash__": {"__type__": "string", "__options__": ["a", "b"]},
                "__type__": "int"
            })
        );
    }
}
