//! Locations inside a validated value.
//!
//! A [`JsonPath`] is built up while a node tree is walked: parents and hashes
//! push the field or key they descend into, arrays push the element index.
//! Its string form is the path reported next to every validation failure,
//! e.g. `hello.field4[1].field4_1`.

use std::fmt::{self, Display};

/// One step of a [`JsonPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named field of a parent, a key of a hash, or the name of a tree.
    Field(String),
    /// A position in a list.
    Index(usize),
}

impl PathSegment {
    /// Creates a field segment.
    pub fn field(name: impl Into<String>) -> Self {
        PathSegment::Field(name.into())
    }

    /// Creates an index segment.
    pub fn index(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

/// The path from the validation root to a value.
///
/// Paths are immutable: `push_*` returns a new path and leaves the receiver
/// untouched, so a node can hand each child its own extended path.
///
/// # Example
///
/// ```rust
/// use formnode::JsonPath;
///
/// let path = JsonPath::from_field("hello")
///     .push_field("field4")
///     .push_index(1)
///     .push_field("field4_1");
///
/// assert_eq!(path.to_string(), "hello.field4[1].field4_1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    /// The empty path.
    pub fn root() -> Self {
        Self::default()
    }

    /// A path holding a single field segment.
    pub fn from_field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Field(name.into())],
        }
    }

    /// Returns a copy of this path extended by a field segment.
    pub fn push_field(&self, name: impl Into<String>) -> Self {
        self.push(PathSegment::Field(name.into()))
    }

    /// Returns a copy of this path extended by an index segment.
    pub fn push_index(&self, index: usize) -> Self {
        self.push(PathSegment::Index(index))
    }

    fn push(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment);
        Self { segments }
    }

    /// Returns true if the path has no segments.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Same as [`is_root`](Self::is_root).
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Iterates over the segments from the root down.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// The innermost segment, if any.
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// The path as text, or `(root)` for the empty path.
    ///
    /// Used in error messages where an empty string would read poorly.
    pub fn describe(&self) -> String {
        if self.is_root() {
            "(root)".to_string()
        } else {
            self.to_string()
        }
    }
}

impl Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{}", name)?,
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}
