//! Array nodes: a homogeneous list of one child node.

use std::fmt::{self, Display};

use serde_json::{Map, Value};
use stillwater::Validation;

use crate::error::{absorb, finish, BuildError, CleanError, ValidationFailure, ValidationResult};
use crate::kind::{parse_int, Kind};
use crate::node::base::{optional_flag, BaseNode};
use crate::node::traits::NodeLike;
use crate::node::{export_child, value_type_name, Node};
use crate::path::JsonPath;

/// Whether an array may repeat elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayMode {
    /// Every element must differ from the ones before it.
    #[default]
    Unique,
    /// Repeated elements are allowed.
    Duplicates,
}

impl ArrayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ArrayMode::Unique => "unique",
            ArrayMode::Duplicates => "duplicates",
        }
    }

    /// Reads a mode name. Unknown names fall back to `Unique` with a warning.
    fn parse_lenient(value: &Value) -> Self {
        match value.as_str() {
            Some("unique") => ArrayMode::Unique,
            Some("duplicates") => ArrayMode::Duplicates,
            _ => {
                tracing::warn!(mode = %value, "not a valid __array__ type, assuming unique");
                ArrayMode::Unique
            }
        }
    }
}

impl Display for ArrayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn item_count(directive: &str, value: &Value) -> Result<u64, BuildError> {
    let count = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) if Kind::Int.matches(s) => parse_int(s),
        _ => None,
    };
    match count {
        Some(n) if n >= 0 => Ok(n as u64),
        _ => Err(BuildError::invalid(
            directive,
            format!("{} is not a valid item count", value),
        )),
    }
}

/// A list whose elements all match one child node.
///
/// Built from a fragment holding `__array__`: either a mode string
/// (`"unique"` or `"duplicates"`) or an object
/// `{"type": ..., "minimum": ..., "maximum": ..., "optional": ...}`. The
/// remaining keys of the fragment describe the child.
///
/// # Example
///
/// ```rust
/// use formnode::{Node, NodeLike};
/// use serde_json::json;
///
/// let tags = Node::from_value(&json!({
///     "__array__": {"type": "unique", "maximum": 3},
///     "__type__": "string"
/// }))
/// .unwrap();
///
/// assert!(tags.is_valid(&json!(["a", "b"])));
/// assert!(!tags.is_valid(&json!(["a", "a"])));
/// assert!(!tags.is_valid(&json!(["a", "b", "c", "d"])));
/// ```
#[derive(Debug, Clone)]
pub struct ArrayNode {
    base: BaseNode,
    mode: ArrayMode,
    minimum: Option<u64>,
    maximum: Option<u64>,
    child: Box<Node>,
}

impl ArrayNode {
    pub(crate) fn from_details(mut details: Map<String, Value>) -> Result<Self, BuildError> {
        let mut mode = ArrayMode::Unique;
        let mut minimum = None;
        let mut maximum = None;
        let mut nested_optional = None;

        match details.shift_remove("__array__") {
            Some(Value::Object(settings)) => {
                for (key, value) in settings {
                    match key.as_str() {
                        "type" => mode = ArrayMode::parse_lenient(&value),
                        "minimum" => minimum = Some(value),
                        "maximum" => maximum = Some(value),
                        "optional" => nested_optional = Some(value),
                        _ => return Err(BuildError::UnexpectedKey(format!("__array__.{}", key))),
                    }
                }
            }
            Some(value @ Value::String(_)) => mode = ArrayMode::parse_lenient(&value),
            Some(other) => {
                return Err(BuildError::invalid(
                    "__array__",
                    format!("expected a mode or an object, got {}", other),
                ))
            }
            None => return Err(BuildError::MissingDirective("__array__".to_string())),
        }

        let has_optional = details.contains_key("__optional__");
        let mut base = BaseNode::from_details(&mut details);
        if let (false, Some(flag)) = (has_optional, nested_optional) {
            base.set_optional(optional_flag(&flag));
        }

        if details.is_empty() {
            return Err(BuildError::MissingDirective(
                "child node of __array__".to_string(),
            ));
        }
        let child = Node::from_value(&Value::Object(details))?;

        let mut node = Self {
            base,
            mode,
            minimum: None,
            maximum: None,
            child: Box::new(child),
        };
        let minimum = minimum.filter(|v| !v.is_null());
        let maximum = maximum.filter(|v| !v.is_null());
        if minimum.is_some() || maximum.is_some() {
            node.set_minmax(minimum.as_ref(), maximum.as_ref())?;
        }
        Ok(node)
    }

    pub fn mode(&self) -> ArrayMode {
        self.mode
    }

    pub fn child(&self) -> &Node {
        &self.child
    }

    pub fn base(&self) -> &BaseNode {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut BaseNode {
        &mut self.base
    }

    /// The `(minimum, maximum)` item counts.
    pub fn minmax(&self) -> (Option<u64>, Option<u64>) {
        (self.minimum, self.maximum)
    }

    /// Sets the minimum and/or maximum item count. A `None` side keeps its
    /// current value.
    ///
    /// Counts may be given as non-negative integers or integer strings.
    pub fn set_minmax(
        &mut self,
        minimum: Option<&Value>,
        maximum: Option<&Value>,
    ) -> Result<(), BuildError> {
        let minimum = match minimum {
            Some(value) => Some(item_count("__minimum__", value)?),
            None => self.minimum,
        };
        let maximum = match maximum {
            Some(value) => Some(item_count("__maximum__", value)?),
            None => self.maximum,
        };
        if let (Some(min), Some(max)) = (minimum, maximum) {
            if max < min {
                return Err(BuildError::invalid(
                    "__maximum__",
                    "must not be less than __minimum__",
                ));
            }
        }
        self.minimum = minimum;
        self.maximum = maximum;
        Ok(())
    }
}

impl NodeLike for ArrayNode {
    fn valid(&self, value: &Value, path: &JsonPath) -> ValidationResult {
        if value.is_null() && self.base.is_optional() {
            return Validation::Success(());
        }

        let items = match value.as_array() {
            Some(items) => items,
            None => {
                return finish(vec![ValidationFailure::new(path.clone(), "not a list")
                    .with_got(value_type_name(value))])
            }
        };

        let mut failures = Vec::new();
        let mut seen: Vec<(usize, &Value)> = Vec::new();

        for (i, item) in items.iter().enumerate() {
            let item_path = path.push_index(i);
            if !absorb(&mut failures, self.child.valid(item, &item_path)) {
                continue;
            }
            if self.mode == ArrayMode::Unique {
                if let Some((first, _)) = seen.iter().find(|(_, earlier)| *earlier == item) {
                    let reason = format!("duplicate of {}", path.push_index(*first));
                    failures.push(ValidationFailure::new(item_path, reason));
                    continue;
                }
                seen.push((i, item));
            }
        }

        let count = items.len() as u64;
        if let Some(min) = self.minimum {
            if count < min {
                failures.push(ValidationFailure::new(path.clone(), "did not meet minimum"));
            }
        }
        if let Some(max) = self.maximum {
            if count > max {
                failures.push(ValidationFailure::new(path.clone(), "exceeds maximum"));
            }
        }

        finish(failures)
    }

    fn clean_at(&self, value: &Value, path: &JsonPath) -> Result<Value, CleanError> {
        if value.is_null() && self.base.is_optional() {
            return Ok(Value::Null);
        }
        let items = value.as_array().ok_or_else(|| CleanError::WrongShape {
            path: path.clone(),
            expected: "list".to_string(),
            got: value_type_name(value).to_string(),
        })?;

        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.child.clean_at(item, &path.push_index(i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }

    fn is_optional(&self) -> bool {
        self.base.is_optional()
    }

    fn to_value(&self) -> Value {
        let mut out = Map::new();

        let mode = if self.minimum.is_some() || self.maximum.is_some() {
            let mut settings = Map::new();
            settings.insert("type".to_string(), Value::from(self.mode.as_str()));
            if let Some(min) = self.minimum {
                settings.insert("minimum".to_string(), Value::from(min));
            }
            if let Some(max) = self.maximum {
                settings.insert("maximum".to_string(), Value::from(max));
            }
            Value::Object(settings)
        } else {
            Value::from(self.mode.as_str())
        };
        out.insert("__array__".to_string(), mode);

        self.base.export_into(&mut out);
        export_child(&self.child, &mut out);
        Value::Object(out)
    }
}
