//! State shared by every node except [`OptionsNode`](crate::OptionsNode):
//! the optional flag and the passthrough "special" metadata.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::BuildError;

/// Keys that configure a node. Any other `__xxx__` key is special metadata.
pub(crate) const DIRECTIVES: [&str; 10] = [
    "__array__",
    "__hash__",
    "__maximum__",
    "__minimum__",
    "__name__",
    "__optional__",
    "__options__",
    "__regex__",
    "__require__",
    "__type__",
];

static SPECIAL_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^__([a-z0-9_-]+)__$").expect("special key regex is valid"));

static SPECIAL_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_-]+$").expect("special name regex is valid"));

/// Field names allowed in a parent, and the allowed form of a tree name.
pub(crate) static STANDARD_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^_?[a-zA-Z][a-zA-Z0-9_]*$").expect("standard field regex is valid")
});

pub(crate) fn is_directive(key: &str) -> bool {
    DIRECTIVES.contains(&key)
}

/// Reads an `__optional__` value. Anything but a bool counts as false.
pub(crate) fn optional_flag(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        other => {
            tracing::warn!(value = %other, "__optional__ is not a bool, assuming false");
            false
        }
    }
}

/// The optional flag and special metadata of a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseNode {
    optional: bool,
    special: IndexMap<String, Value>,
}

impl BaseNode {
    /// Removes `__optional__` and every special key from `details`.
    ///
    /// Must run after the concrete node has taken its own directives, so
    /// that only the directive keys it left behind are kept in `details`.
    pub(crate) fn from_details(details: &mut Map<String, Value>) -> Self {
        let optional = details
            .shift_remove("__optional__")
            .map(|value| optional_flag(&value))
            .unwrap_or(false);

        let special_keys: Vec<String> = details
            .keys()
            .filter(|key| !is_directive(key) && SPECIAL_KEY.is_match(key))
            .cloned()
            .collect();

        let mut special = IndexMap::new();
        for key in special_keys {
            if let Some(value) = details.shift_remove(&key) {
                special.insert(key[2..key.len() - 2].to_string(), value);
            }
        }

        Self { optional, special }
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub(crate) fn set_optional(&mut self, optional: bool) {
        self.optional = optional;
    }

    /// The special value stored under `name` (without underscores).
    pub fn special(&self, name: &str) -> Option<&Value> {
        self.special.get(name)
    }

    /// All special values, in the order they were declared.
    pub fn specials(&self) -> &IndexMap<String, Value> {
        &self.special
    }

    /// Stores a special value, replacing any previous one.
    ///
    /// `name` is given without the surrounding underscores and must match
    /// `[a-z0-9_-]+`. Names that would collide with a directive once wrapped
    /// in underscores are refused.
    pub fn set_special(&mut self, name: &str, value: Value) -> Result<(), BuildError> {
        if !SPECIAL_NAME.is_match(name) || is_directive(&format!("__{}__", name)) {
            return Err(BuildError::InvalidSpecialName(name.to_string()));
        }
        self.special.insert(name.to_string(), value);
        Ok(())
    }

    pub(crate) fn export_optional(&self, out: &mut Map<String, Value>) {
        if self.optional {
            out.insert("__optional__".to_string(), Value::Bool(true));
        }
    }

    pub(crate) fn export_specials(&self, out: &mut Map<String, Value>) {
        for (name, value) in &self.special {
            out.insert(format!("__{}__", name), value.clone());
        }
    }

    pub(crate) fn export_into(&self, out: &mut Map<String, Value>) {
        self.export_optional(out);
        self.export_specials(out);
    }

    /// True when neither the optional flag nor any special is set.
    pub(crate) fn is_plain(&self) -> bool {
        !self.optional && self.special.is_empty()
    }
}
