//! Options nodes: one of several alternative shapes.

use serde_json::Value;
use stillwater::Validation;

use crate::error::{fail, BuildError, CleanError, ValidationResult};
use crate::node::traits::NodeLike;
use crate::node::Node;
use crate::path::JsonPath;

/// An ordered list of alternative nodes. A value matches if any alternative
/// accepts it; `clean` uses the first alternative that does.
///
/// # Example
///
/// ```rust
/// use formnode::{Node, NodeLike};
/// use serde_json::json;
///
/// let node = Node::from_value(&json!([
///     {"__type__": "uint"},
///     {"__type__": "string", "__options__": ["hello", "there"]}
/// ]))
/// .unwrap();
///
/// assert_eq!(node.clean(&json!("1")).unwrap(), json!(1));
/// assert_eq!(node.clean(&json!("hello")).unwrap(), json!("hello"));
/// assert!(!node.is_valid(&json!("something")));
/// ```
#[derive(Debug, Clone)]
pub struct OptionsNode {
    alternatives: Vec<Node>,
}

impl OptionsNode {
    pub(crate) fn from_list(items: &[Value]) -> Result<Self, BuildError> {
        if items.is_empty() {
            return Err(BuildError::UnrecognizedFragment(
                "an empty list of options".to_string(),
            ));
        }
        let alternatives = items
            .iter()
            .enumerate()
            .map(|(i, item)| Node::from_value(item).map_err(|e| e.in_field(&format!("[{}]", i))))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { alternatives })
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    /// Always false; an options node has at least one alternative.
    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.alternatives.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.alternatives.iter()
    }

    fn first_match(&self, value: &Value, path: &JsonPath) -> Option<&Node> {
        self.alternatives
            .iter()
            .find(|alternative| alternative.valid(value, path).is_success())
    }
}

impl<'a> IntoIterator for &'a OptionsNode {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.alternatives.iter()
    }
}

impl NodeLike for OptionsNode {
    fn valid(&self, value: &Value, path: &JsonPath) -> ValidationResult {
        if value.is_null() && self.is_optional() {
            return Validation::Success(());
        }
        match self.first_match(value, path) {
            Some(_) => Validation::Success(()),
            None => fail(path, "no valid option"),
        }
    }

    fn clean_at(&self, value: &Value, path: &JsonPath) -> Result<Value, CleanError> {
        if value.is_null() && self.is_optional() {
            return Ok(Value::Null);
        }
        match self.first_match(value, path) {
            Some(alternative) => alternative.clean_at(value, path),
            None => Err(CleanError::NoValidOption { path: path.clone() }),
        }
    }

    /// True only when every alternative is optional.
    fn is_optional(&self) -> bool {
        self.alternatives.iter().all(NodeLike::is_optional)
    }

    fn to_value(&self) -> Value {
        Value::Array(self.alternatives.iter().map(NodeLike::to_value).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options() -> OptionsNode {
        OptionsNode::from_list(&[
            json!({"__type__": "uint"}),
            json!({"__type__": "string", "__options__": ["hello", "there"]}),
        ])
        .unwrap()
    }

    #[test]
    fn test_valid() {
        let node = options();
        for value in [json!(0), json!("0"), json!(1), json!("1"), json!("hello"), json!("there")] {
            assert!(node.is_valid(&value), "{} should be valid", value);
        }
        for value in [json!(-1), json!("-1"), json!("something"), json!("else")] {
            assert!(!node.is_valid(&value), "{} should not be valid", value);
        }
    }

    #[test]
    fn test_single_failure_at_path() {
        let failures = options()
            .valid(&json!("else"), &JsonPath::from_field("choice"))
            .into_result()
            .unwrap_err();
        assert_eq!(
            failures.pairs(),
            vec![("choice".to_string(), "no valid option".to_string())]
        );
    }

    #[test]
    fn test_clean_uses_first_match() {
        let node = options();
        assert_eq!(node.clean(&json!(0)).unwrap(), json!(0));
        assert_eq!(node.clean(&json!("0")).unwrap(), json!(0));
        assert_eq!(node.clean(&json!("1")).unwrap(), json!(1));
        assert_eq!(node.clean(&json!("there")).unwrap(), json!("there"));
        assert_eq!(
            node.clean(&json!("else")).unwrap_err(),
            CleanError::NoValidOption {
                path: JsonPath::root()
            }
        );
    }

    #[test]
    fn test_iterate() {
        let node = options();
        let expected = [
            json!({"__type__": "uint"}),
            json!({"__type__": "string", "__options__": ["hello", "there"]}),
        ];
        assert_eq!(node.len(), 2);
        for (alternative, fragment) in node.iter().zip(expected.iter()) {
            assert_eq!(&alternative.to_value(), fragment);
        }
        assert_eq!(node.get(1).map(Node::class_name), Some("Node"));
        assert!(node.get(2).is_none());
    }

    #[test]
    fn test_optional_only_when_all_are() {
        let mixed = OptionsNode::from_list(&[
            json!({"__type__": "uint", "__optional__": true}),
            json!("string"),
        ])
        .unwrap();
        assert!(!mixed.is_optional());
        // the optional alternative still accepts null
        assert!(mixed.is_valid(&Value::Null));

        let all = OptionsNode::from_list(&[
            json!({"__type__": "uint", "__optional__": true}),
            json!({"__type__": "date", "__optional__": true}),
        ])
        .unwrap();
        assert!(all.is_optional());
        assert_eq!(all.clean(&Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_empty_and_bad_alternatives() {
        assert!(matches!(
            OptionsNode::from_list(&[]),
            Err(BuildError::UnrecognizedFragment(_))
        ));

        let err = OptionsNode::from_list(&[json!("uint"), json!(5)]).unwrap_err();
        assert_eq!(err.to_string(), "in field [1]: unrecognized schema fragment: 5");
    }
}
