//! Tree registry for named schema storage.
//!
//! This module provides the [`TreeRegistry`] type that stores compiled
//! trees by name and validates or cleans values against them.

use parking_lot::RwLock;
use rayon::prelude::*;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::{CleanError, ValidationResult};
use crate::node::Tree;

/// Type alias for the tree storage map.
type TreeMap = Arc<RwLock<HashMap<String, Arc<Tree>>>>;

/// A thread-safe registry of compiled trees, keyed by tree name.
///
/// # Thread Safety
///
/// The registry uses `Arc<RwLock<...>>` for thread-safe access:
/// - Multiple threads can validate concurrently (read-only access)
/// - Registration operations are serialized (write access)
///
/// Clones share the same storage.
///
/// # Example
///
/// ```rust
/// use formnode::{TreeRegistry, Tree};
/// use serde_json::json;
///
/// let registry = TreeRegistry::new();
/// registry
///     .register(Tree::from_value(&json!({"__name__": "user", "age": "uint"})).unwrap())
///     .unwrap();
///
/// assert!(registry.validate("user", &json!({"age": 3})).unwrap().is_success());
/// assert!(registry.validate("order", &json!({})).is_err());
/// ```
pub struct TreeRegistry {
    trees: TreeMap,
    parallel_threshold: usize,
}

impl TreeRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            trees: Arc::new(RwLock::new(HashMap::new())),
            parallel_threshold: 16,
        }
    }

    /// Sets the batch size from which [`validate_many`](Self::validate_many)
    /// spreads work over the rayon thread pool. Smaller batches are
    /// validated on the calling thread. The default is 16.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formnode::TreeRegistry;
    ///
    /// let registry = TreeRegistry::new().with_parallel_threshold(1);
    /// assert!(registry.is_empty());
    /// ```
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Registers a tree under its own name.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateName` if the name is already registered.
    pub fn register(&self, tree: Tree) -> Result<(), RegistryError> {
        let mut trees = self.trees.write();

        if trees.contains_key(tree.name()) {
            return Err(RegistryError::DuplicateName(tree.name().to_string()));
        }

        debug!(tree = %tree.name(), "registered tree");
        trees.insert(tree.name().to_string(), Arc::new(tree));
        Ok(())
    }

    /// Retrieves a tree by name.
    pub fn get(&self, name: &str) -> Option<Arc<Tree>> {
        self.trees.read().get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.trees.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.trees.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.read().is_empty()
    }

    fn require(&self, name: &str) -> Result<Arc<Tree>, RegistryError> {
        self.get(name)
            .ok_or_else(|| RegistryError::TreeNotFound(name.to_string()))
    }

    /// Validates a value against a named tree.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::TreeNotFound` if the name is not registered.
    pub fn validate(&self, name: &str, value: &Value) -> Result<ValidationResult, RegistryError> {
        Ok(self.require(name)?.valid(value))
    }

    /// Cleans a value with a named tree.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::TreeNotFound` if the name is not registered,
    /// or `RegistryError::Clean` if the value can not be cleaned.
    pub fn clean(&self, name: &str, value: &Value) -> Result<Value, RegistryError> {
        Ok(self.require(name)?.clean(value)?)
    }

    /// Validates a batch of values against a named tree.
    ///
    /// Results are returned in input order. Batches at or above the
    /// parallel threshold are validated on the rayon thread pool.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formnode::{TreeRegistry, Tree};
    /// use serde_json::json;
    ///
    /// let registry = TreeRegistry::new();
    /// registry
    ///     .register(Tree::from_value(&json!({"__name__": "n", "v": "int"})).unwrap())
    ///     .unwrap();
    ///
    /// let results = registry
    ///     .validate_many("n", &[json!({"v": 1}), json!({"v": "x"})])
    ///     .unwrap();
    /// assert!(results[0].is_success());
    /// assert!(results[1].is_failure());
    /// ```
    pub fn validate_many(
        &self,
        name: &str,
        values: &[Value],
    ) -> Result<Vec<ValidationResult>, RegistryError> {
        let tree = self.require(name)?;
        if values.len() < self.parallel_threshold {
            return Ok(values.iter().map(|value| tree.valid(value)).collect());
        }
        Ok(values.par_iter().map(|value| tree.valid(value)).collect())
    }

    /// Exports every tree, keyed by name in sorted order.
    pub fn to_value(&self) -> Value {
        let trees = self.trees.read();
        let mut names: Vec<&String> = trees.keys().collect();
        names.sort();

        let exported = names
            .into_iter()
            .map(|name| (name.clone(), trees[name].to_value()))
            .collect::<Map<String, Value>>();
        Value::Object(exported)
    }
}

impl Default for TreeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for TreeRegistry {
    fn clone(&self) -> Self {
        Self {
            trees: Arc::clone(&self.trees),
            parallel_threshold: self.parallel_threshold,
        }
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Attempted to register a tree with a name that already exists.
    #[error("tree '{0}' already registered")]
    DuplicateName(String),

    /// Attempted to use a tree name that doesn't exist.
    #[error("tree '{0}' not found")]
    TreeNotFound(String),

    #[error(transparent)]
    Clean(#[from] CleanError),
}
