//! Parent nodes: a fixed set of named fields.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use stillwater::Validation;

use crate::error::{absorb, finish, BuildError, CleanError, ValidationFailure, ValidationResult};
use crate::node::base::{is_directive, BaseNode, STANDARD_FIELD};
use crate::node::traits::NodeLike;
use crate::node::{value_type_name, Node};
use crate::path::JsonPath;

/// A required field counts as unset when it holds one of these.
const UNSET_SENTINELS: [&str; 3] = ["", "0000-00-00", "0000-00-00 00:00:00"];

fn is_unset(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => UNSET_SENTINELS.contains(&s.as_str()),
        Some(_) => false,
    }
}

fn parse_requires(value: Value) -> Result<IndexMap<String, Vec<String>>, BuildError> {
    let entries = match value {
        Value::Object(entries) => entries,
        other => {
            return Err(BuildError::invalid(
                "__require__",
                format!("expected an object, got {}", other),
            ))
        }
    };

    let mut requires = IndexMap::new();
    for (field, needs) in entries {
        let needs = match needs {
            Value::String(name) => vec![name],
            Value::Array(names) => names
                .into_iter()
                .map(|name| match name {
                    Value::String(name) => Ok(name),
                    other => Err(BuildError::invalid(
                        "__require__",
                        format!("expected a field name, got {}", other),
                    )),
                })
                .collect::<Result<Vec<_>, _>>()?,
            other => {
                return Err(BuildError::invalid(
                    "__require__",
                    format!("expected a field name or a list of them, got {}", other),
                ))
            }
        };
        requires.insert(field, needs);
    }
    Ok(requires)
}

/// A record with a fixed, ordered set of named fields, each bound to a node.
///
/// `__require__` maps a field to the other fields that must be set
/// whenever it is.
///
/// # Example
///
/// ```rust
/// use formnode::{Node, NodeLike, JsonPath};
/// use serde_json::json;
///
/// let node = Node::from_value(&json!({
///     "__require__": {"a": ["b"]},
///     "a": {"__type__": "int", "__optional__": true},
///     "b": {"__type__": "int", "__optional__": true}
/// }))
/// .unwrap();
///
/// let failures = node
///     .valid(&json!({"a": 1}), &JsonPath::root())
///     .into_result()
///     .unwrap_err();
/// assert_eq!(
///     failures.pairs(),
///     vec![("a".to_string(), "requires \"b\" to also be set".to_string())]
/// );
/// assert!(node.is_valid(&json!({"a": 1, "b": 2})));
/// ```
#[derive(Debug, Clone)]
pub struct ParentNode {
    base: BaseNode,
    fields: IndexMap<String, Node>,
    requires: IndexMap<String, Vec<String>>,
}

impl ParentNode {
    pub(crate) fn from_details(mut details: Map<String, Value>) -> Result<Self, BuildError> {
        let requires = match details.shift_remove("__require__") {
            Some(Value::Null) | None => IndexMap::new(),
            Some(value) => parse_requires(value)?,
        };

        let base = BaseNode::from_details(&mut details);

        let mut fields = IndexMap::with_capacity(details.len());
        for (name, fragment) in details {
            if is_directive(&name) {
                return Err(BuildError::UnexpectedDirective(name));
            }
            if !STANDARD_FIELD.is_match(&name) {
                return Err(BuildError::InvalidFieldName(name));
            }
            let node = Node::from_value(&fragment).map_err(|e| e.in_field(&name))?;
            fields.insert(name, node);
        }

        for (field, needs) in &requires {
            if let Some(unknown) = std::iter::once(field)
                .chain(needs.iter())
                .find(|name| !fields.contains_key(name.as_str()))
            {
                return Err(BuildError::UnknownRequiredField(unknown.clone()));
            }
        }

        Ok(Self {
            base,
            fields,
            requires,
        })
    }

    /// The node of a field.
    pub fn get(&self, field: &str) -> Option<&Node> {
        self.fields.get(field)
    }

    /// Fields in declared order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.fields.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The `__require__` table: field to the fields it needs.
    pub fn requires(&self) -> &IndexMap<String, Vec<String>> {
        &self.requires
    }

    pub fn base(&self) -> &BaseNode {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut BaseNode {
        &mut self.base
    }

    /// Writes `__require__` and the fields into `out`.
    pub(crate) fn export_body(&self, out: &mut Map<String, Value>) {
        self.base.export_optional(out);
        if !self.requires.is_empty() {
            let requires = self
                .requires
                .iter()
                .map(|(field, needs)| {
                    let needs = match needs.as_slice() {
                        [single] => Value::String(single.clone()),
                        many => Value::Array(many.iter().cloned().map(Value::String).collect()),
                    };
                    (field.clone(), needs)
                })
                .collect::<Map<String, Value>>();
            out.insert("__require__".to_string(), Value::Object(requires));
        }
        self.base.export_specials(out);
        for (name, node) in &self.fields {
            out.insert(name.clone(), node.to_value());
        }
    }
}

impl NodeLike for ParentNode {
    fn valid(&self, value: &Value, path: &JsonPath) -> ValidationResult {
        if value.is_null() && self.base.is_optional() {
            return Validation::Success(());
        }

        let record = match value.as_object() {
            Some(record) => record,
            None => {
                return finish(vec![ValidationFailure::new(path.clone(), "not an object")
                    .with_got(value_type_name(value))])
            }
        };

        let mut failures = Vec::new();

        for (name, node) in &self.fields {
            let field_path = path.push_field(name.as_str());

            let field_value = match record.get(name) {
                Some(v) if !v.is_null() => v,
                _ => {
                    if !node.is_optional() {
                        failures.push(ValidationFailure::new(field_path, "missing"));
                    }
                    continue;
                }
            };

            if !absorb(&mut failures, node.valid(field_value, &field_path)) {
                continue;
            }

            if let Some(needs) = self.requires.get(name) {
                for other in needs {
                    if is_unset(record.get(other)) {
                        failures.push(ValidationFailure::new(
                            field_path.clone(),
                            format!("requires \"{}\" to also be set", other),
                        ));
                    }
                }
            }
        }

        for key in record.keys() {
            if !self.fields.contains_key(key) {
                failures.push(ValidationFailure::new(
                    path.push_field(key.as_str()),
                    "not a valid node",
                ));
            }
        }

        finish(failures)
    }

    fn clean_at(&self, value: &Value, path: &JsonPath) -> Result<Value, CleanError> {
        if value.is_null() && self.base.is_optional() {
            return Ok(Value::Null);
        }
        let record = value.as_object().ok_or_else(|| CleanError::WrongShape {
            path: path.clone(),
            expected: "object".to_string(),
            got: value_type_name(value).to_string(),
        })?;

        if let Some(unknown) = record.keys().find(|key| !self.fields.contains_key(*key)) {
            return Err(CleanError::UnknownField {
                path: path.clone(),
                field: unknown.clone(),
            });
        }

        let mut out = Map::new();
        for (name, node) in &self.fields {
            match record.get(name) {
                Some(field_value) if !field_value.is_null() => {
                    let cleaned = node.clean_at(field_value, &path.push_field(name.as_str()))?;
                    out.insert(name.clone(), cleaned);
                }
                _ => {}
            }
        }
        Ok(Value::Object(out))
    }

    fn is_optional(&self) -> bool {
        self.base.is_optional()
    }

    fn to_value(&self) -> Value {
        let mut out = Map::new();
        self.export_body(&mut out);
        Value::Object(out)
    }
}
