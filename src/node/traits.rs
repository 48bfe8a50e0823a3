//! The capability every node shares.

use serde_json::Value;

use crate::error::{CleanError, ValidationResult};
use crate::path::JsonPath;

/// A compiled schema node that can validate, clean and export itself.
///
/// Implemented by every node variant and by [`Node`](crate::Node), which
/// dispatches to the variant it holds. The `Send + Sync` bounds let a
/// compiled schema be shared between threads; validation never writes to
/// the node.
///
/// # Example
///
/// ```rust
/// use formnode::{Node, NodeLike, JsonPath};
/// use serde_json::json;
///
/// let node = Node::from_value(&json!({"__type__": "uint"})).unwrap();
///
/// assert!(node.valid(&json!(3), &JsonPath::root()).is_success());
/// assert!(node.valid(&json!(-3), &JsonPath::root()).is_failure());
/// assert_eq!(node.clean(&json!("0x10")).unwrap(), json!(16));
/// ```
pub trait NodeLike: Send + Sync {
    /// Checks `value`, reporting every problem found below `path`.
    fn valid(&self, value: &Value, path: &JsonPath) -> ValidationResult;

    /// Converts `value` to its canonical form, reporting errors at `path`.
    fn clean_at(&self, value: &Value, path: &JsonPath) -> Result<Value, CleanError>;

    /// Whether a `null` (absent) value is accepted as is.
    fn is_optional(&self) -> bool;

    /// Exports the node as a schema fragment that compiles back to an
    /// equivalent node.
    fn to_value(&self) -> Value;

    /// Converts `value` to its canonical form.
    fn clean(&self, value: &Value) -> Result<Value, CleanError> {
        self.clean_at(value, &JsonPath::root())
    }

    /// Shorthand for `valid(value, root).is_success()`.
    fn is_valid(&self, value: &Value) -> bool {
        self.valid(value, &JsonPath::root()).is_success()
    }

    /// The exported fragment as compact JSON text.
    fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}
