//! # Formnode
//!
//! A schema-driven validation and normalization engine. A JSON description
//! of a record's shape is compiled once into a tree of typed nodes, which
//! then decide whether values conform (reporting every violation with its
//! path) and coerce loosely typed input into canonical form.
//!
//! ## Overview
//!
//! Validation never stops at the first problem: every failure is collected
//! into a [`ValidationFailures`] list through stillwater's `Validation`
//! type. Cleaning converts a value (`"0x10"` to `16`, `3.1` to `"3.10"` for
//! prices) and stops at the first value it can not convert.
//!
//! ## Core Types
//!
//! - [`Node`]: any compiled schema node, built with [`Node::from_value`]
//! - [`Tree`]: a named root whose failures are prefixed with its name
//! - [`JsonPath`]: where in a value a failure occurred (e.g. `user.tags[1]`)
//! - [`ValidationFailure`]: one failure, with its path and reason
//! - [`TreeRegistry`]: thread-safe storage of trees by name
//!
//! ## Example
//!
//! ```rust
//! use formnode::Tree;
//! use serde_json::json;
//!
//! let tree = Tree::from_value(&json!({
//!     "__name__": "order",
//!     "id": "uint",
//!     "total": "price",
//!     "placed": {"__type__": "datetime", "__optional__": true}
//! }))
//! .unwrap();
//!
//! assert!(tree.is_valid(&json!({"id": 7, "total": "12.5"})));
//!
//! let failures = tree
//!     .valid(&json!({"id": -7, "total": "twelve"}))
//!     .into_result()
//!     .unwrap_err();
//! assert_eq!(failures.len(), 2);
//!
//! assert_eq!(
//!     tree.clean(&json!({"id": "0x10", "total": 12.5})).unwrap(),
//!     json!({"id": 16, "total": "12.50"})
//! );
//! ```

pub mod error;
pub mod kind;
pub mod loading;
pub mod node;
pub mod path;
pub mod registry;

pub use error::{
    BuildError, CleanError, ValidationFailure, ValidationFailures, ValidationResult,
};
pub use kind::{compare_ips, parse_int, Kind};
pub use loading::{load_tree, FileSystem, TreeLoadError};
pub use node::{
    ArrayMode, ArrayNode, BaseNode, HashNode, LeafNode, Node, NodeLike, OptionsNode, ParentNode,
    Scalar, Tree,
};
pub use path::{JsonPath, PathSegment};
pub use registry::{RegistryError, TreeRegistry};
