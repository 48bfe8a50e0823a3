//! Named root nodes.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{BuildError, CleanError, ValidationResult};
use crate::node::base::STANDARD_FIELD;
use crate::node::parent::ParentNode;
use crate::node::traits::NodeLike;
use crate::node::Node;
use crate::path::JsonPath;

/// A parent node with a name, used as the root of a schema.
///
/// Failures reported by [`Tree::valid`] start with the tree's name.
///
/// # Example
///
/// ```rust
/// use formnode::Tree;
/// use serde_json::json;
///
/// let tree = Tree::from_value(&json!({
///     "__name__": "user",
///     "age": "uint"
/// }))
/// .unwrap();
///
/// let failures = tree.valid(&json!({"age": "old"})).into_result().unwrap_err();
/// assert_eq!(failures.first().path.to_string(), "user.age");
///
/// let failures = tree
///     .valid_with_name(&json!({"age": "old"}), false)
///     .into_result()
///     .unwrap_err();
/// assert_eq!(failures.first().path.to_string(), "age");
/// ```
#[derive(Debug, Clone)]
pub struct Tree {
    name: String,
    parent: ParentNode,
}

impl Tree {
    /// Compiles a tree fragment. `__name__` is required.
    pub fn from_value(fragment: &Value) -> Result<Self, BuildError> {
        Self::compile(fragment, None)
    }

    /// Parses `text` as JSON and compiles it as a tree.
    pub fn from_json(text: &str) -> Result<Self, BuildError> {
        let fragment: Value = serde_json::from_str(text)?;
        Self::from_value(&fragment)
    }

    /// Compiles a tree fragment, using `fallback` when it has no `__name__`.
    pub(crate) fn from_value_or_named(fragment: &Value, fallback: &str) -> Result<Self, BuildError> {
        Self::compile(fragment, Some(fallback))
    }

    fn compile(fragment: &Value, fallback: Option<&str>) -> Result<Self, BuildError> {
        let mut details = match fragment {
            Value::Object(details) => details.clone(),
            other => return Err(BuildError::UnrecognizedFragment(other.to_string())),
        };

        let name = match (details.shift_remove("__name__"), fallback) {
            (Some(Value::String(name)), _) => name,
            (Some(other), _) => {
                return Err(BuildError::invalid(
                    "__name__",
                    format!("expected a string, got {}", other),
                ))
            }
            (None, Some(fallback)) => fallback.to_string(),
            (None, None) => return Err(BuildError::MissingDirective("__name__".to_string())),
        };
        if !STANDARD_FIELD.is_match(&name) {
            return Err(BuildError::invalid(
                "__name__",
                format!("{} is not a valid name", name),
            ));
        }

        let parent = ParentNode::from_details(details)?;
        debug!(tree = %name, fields = parent.len(), "compiled tree");
        Ok(Self { name, parent })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fields of the tree.
    pub fn parent(&self) -> &ParentNode {
        &self.parent
    }

    pub fn parent_mut(&mut self) -> &mut ParentNode {
        &mut self.parent
    }

    /// The node of a top-level field.
    pub fn get(&self, field: &str) -> Option<&Node> {
        self.parent.get(field)
    }

    pub fn class_name(&self) -> &'static str {
        "Tree"
    }

    /// Validates `value`, prefixing failure paths with the tree's name.
    pub fn valid(&self, value: &Value) -> ValidationResult {
        self.valid_with_name(value, true)
    }

    /// Validates `value`; with `include_name` false, paths start at the
    /// tree's fields.
    pub fn valid_with_name(&self, value: &Value, include_name: bool) -> ValidationResult {
        let path = if include_name {
            JsonPath::from_field(self.name.as_str())
        } else {
            JsonPath::root()
        };
        self.parent.valid(value, &path)
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.valid(value).is_success()
    }

    /// Cleans `value`. Error paths start with the tree's name.
    pub fn clean(&self, value: &Value) -> Result<Value, CleanError> {
        self.parent
            .clean_at(value, &JsonPath::from_field(self.name.as_str()))
    }

    /// Exports the tree with `__name__` first.
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        out.insert("__name__".to_string(), Value::String(self.name.clone()));
        self.parent.export_body(&mut out);
        Value::Object(out)
    }

    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}
