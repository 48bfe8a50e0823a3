//! Validation failure types.
//!
//! A failed `valid` call produces [`ValidationFailures`]: every problem found
//! in the value, each one a [`ValidationFailure`] carrying the path of the
//! offending value and a short reason token such as `"not an integer"`.

use std::fmt::{self, Display};

use stillwater::prelude::*;
use stillwater::Validation;

use crate::path::JsonPath;

/// One problem found while validating a value.
///
/// `reason` is one of a small set of fixed tokens (`"missing"`,
/// `"failed regex (custom)"`, `"not in options"`, ...) or a token built from
/// one (`"duplicate of [0]"`, `"invalid key: 12"`). Callers may match on it.
///
/// # Example
///
/// ```rust
/// use formnode::{JsonPath, ValidationFailure};
///
/// let failure = ValidationFailure::new(JsonPath::from_field("age"), "not an integer")
///     .with_got("\"ten\"");
///
/// assert_eq!(failure.to_string(), "age: not an integer (got: \"ten\")");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailure {
    /// Where the failing value sits.
    pub path: JsonPath,
    /// Why it failed.
    pub reason: String,
    /// The failing value rendered as JSON, when it helps the reader.
    pub got: Option<String>,
}

impl ValidationFailure {
    pub fn new(path: JsonPath, reason: impl Into<String>) -> Self {
        Self {
            path,
            reason: reason.into(),
            got: None,
        }
    }

    /// Attaches the rendered failing value.
    pub fn with_got(mut self, got: impl Into<String>) -> Self {
        self.got = Some(got.into());
        self
    }

    /// The `(path, reason)` pair as plain strings.
    pub fn pair(&self) -> (String, String) {
        (self.path.to_string(), self.reason.clone())
    }
}

impl Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.describe(), self.reason)?;
        if let Some(ref got) = self.got {
            write!(f, " (got: {})", got)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

/// Every failure reported by one validation call, in discovery order.
///
/// Backed by a `NonEmptyVec` so a `Validation::Failure` always carries at
/// least one entry. Combines as a `Semigroup`, which is how container nodes
/// merge the failures of their children.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailures(NonEmptyVec<ValidationFailure>);

impl ValidationFailures {
    pub fn single(failure: ValidationFailure) -> Self {
        Self(NonEmptyVec::singleton(failure))
    }

    /// Wraps a list of failures, or returns `None` when the list is empty.
    pub fn from_vec(failures: Vec<ValidationFailure>) -> Option<Self> {
        NonEmptyVec::from_vec(failures).map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationFailure> {
        self.0.iter()
    }

    pub fn first(&self) -> &ValidationFailure {
        self.0.head()
    }

    /// All failures reported at exactly `path`.
    pub fn at_path(&self, path: &JsonPath) -> Vec<&ValidationFailure> {
        self.0.iter().filter(|f| &f.path == path).collect()
    }

    /// All failures with the given reason.
    pub fn with_reason(&self, reason: &str) -> Vec<&ValidationFailure> {
        self.0.iter().filter(|f| f.reason == reason).collect()
    }

    /// The failures as `(path, reason)` string pairs.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.0.iter().map(ValidationFailure::pair).collect()
    }

    pub fn into_vec(self) -> Vec<ValidationFailure> {
        self.0.into_vec()
    }
}

impl Semigroup for ValidationFailures {
    fn combine(self, other: Self) -> Self {
        ValidationFailures(self.0.combine(other.0))
    }
}

impl Display for ValidationFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "validation failed with {} problem(s):", self.len())?;
        for (i, failure) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailures {}

impl IntoIterator for ValidationFailures {
    type Item = ValidationFailure;
    type IntoIter = std::vec::IntoIter<ValidationFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

/// Outcome of a `valid` call.
pub type ValidationResult = Validation<(), ValidationFailures>;

/// Turns an accumulated failure list into a [`ValidationResult`].
pub(crate) fn finish(failures: Vec<ValidationFailure>) -> ValidationResult {
    match ValidationFailures::from_vec(failures) {
        Some(failures) => Validation::Failure(failures),
        None => Validation::Success(()),
    }
}

/// A failed result holding a single failure.
pub(crate) fn fail(path: &JsonPath, reason: impl Into<String>) -> ValidationResult {
    Validation::Failure(ValidationFailures::single(ValidationFailure::new(
        path.clone(),
        reason,
    )))
}

/// Moves the failures of `result`, if any, onto the end of `failures`.
///
/// Returns whether `result` was a success.
pub(crate) fn absorb(failures: &mut Vec<ValidationFailure>, result: ValidationResult) -> bool {
    match result {
        Validation::Success(()) => true,
        Validation::Failure(found) => {
            failures.extend(found);
            false
        }
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationFailures>();
    assert_sync::<ValidationFailures>();
};

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(field: &str, reason: &str) -> ValidationFailure {
        ValidationFailure::new(JsonPath::from_field(field), reason)
    }

    #[test]
    fn test_display_at_root() {
        let f = ValidationFailure::new(JsonPath::root(), "no valid option");
        assert_eq!(f.to_string(), "(root): no valid option");
    }

    #[test]
    fn test_pair() {
        let f = failure("field1", "not an integer");
        assert_eq!(
            f.pair(),
            ("field1".to_string(), "not an integer".to_string())
        );
    }

    #[test]
    fn test_from_empty_vec_is_none() {
        assert!(ValidationFailures::from_vec(Vec::new()).is_none());
    }

    #[test]
    fn test_combine_keeps_order() {
        let a = ValidationFailures::single(failure("a", "missing"));
        let b = ValidationFailures::single(failure("b", "not in options"));
        let combined = a.combine(b);

        assert_eq!(combined.len(), 2);
        assert_eq!(
            combined.pairs(),
            vec![
                ("a".to_string(), "missing".to_string()),
                ("b".to_string(), "not in options".to_string()),
            ]
        );
    }

    #[test]
    fn test_filters() {
        let failures = ValidationFailures::from_vec(vec![
            failure("a", "missing"),
            failure("a", "not in options"),
            failure("b", "missing"),
        ])
        .unwrap();

        assert_eq!(failures.at_path(&JsonPath::from_field("a")).len(), 2);
        assert_eq!(failures.with_reason("missing").len(), 2);
        assert_eq!(failures.first().reason, "missing");
    }

    #[test]
    fn test_finish_and_absorb() {
        assert!(finish(Vec::new()).is_success());

        let mut collected = Vec::new();
        assert!(absorb(&mut collected, Validation::Success(())));
        assert!(!absorb(&mut collected, fail(&JsonPath::root(), "missing")));
        assert_eq!(collected.len(), 1);
        assert!(finish(collected).is_failure());
    }

    #[test]
    fn test_list_display() {
        let failures = ValidationFailures::single(failure("field2", "failed regex (custom)"));
        let text = failures.to_string();
        assert!(text.contains("1 problem(s)"));
        assert!(text.contains("field2: failed regex (custom)"));
    }
}
