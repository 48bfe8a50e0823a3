//! Leaf nodes: a single scalar value of one primitive [`Kind`].
//!
//! A leaf owns the per-kind rules for converting a loosely typed value into
//! its canonical form (`clean`) and for deciding whether a value is
//! acceptable (`valid`), plus the optional constraints a schema can attach:
//! a custom regex (string kind only), a list of options, or a
//! minimum/maximum pair.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDateTime;
use regex::Regex;
use bigdecimal::{BigDecimal, RoundingMode};
use serde_json::{Map, Number, Value};
use stillwater::Validation;

use crate::error::{BuildError, CleanError, ValidationFailure, ValidationFailures, ValidationResult};
use crate::kind::{compare_ips, parse_int, Kind};
use crate::node::base::{is_directive, BaseNode};
use crate::node::traits::NodeLike;
use crate::path::JsonPath;

const TRUE_STRINGS: [&str; 12] = [
    "true", "True", "TRUE", "t", "T", "yes", "Yes", "YES", "y", "Y", "x", "1",
];

const FALSE_STRINGS: [&str; 11] = [
    "false", "False", "FALSE", "f", "F", "no", "No", "NO", "n", "N", "0",
];

/// A checked value in the representation a kind compares with.
///
/// Options and bounds are stored as scalars, and `valid` converts the input
/// to one before comparing: integers for the integer kinds (and for string
/// lengths), `f64` for float, arbitrary-precision decimals for decimal and
/// price, text for everything else.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i128),
    Float(f64),
    Decimal(BigDecimal),
    Text(String),
}

impl Scalar {
    /// The scalar as it appears in an exported schema fragment.
    pub fn to_value(&self) -> Value {
        match self {
            Scalar::Int(n) => int_value(*n),
            Scalar::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            Scalar::Decimal(d) => Value::String(d.to_plain_string()),
            Scalar::Text(s) => Value::String(s.clone()),
        }
    }

    fn compare(&self, other: &Scalar, kind: Kind) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Int(a), Scalar::Int(b)) => Some(a.cmp(b)),
            (Scalar::Float(a), Scalar::Float(b)) => a.partial_cmp(b),
            (Scalar::Decimal(a), Scalar::Decimal(b)) => Some(a.cmp(b)),
            (Scalar::Text(a), Scalar::Text(b)) if kind == Kind::Ip => Some(compare_ips(a, b)),
            (Scalar::Text(a), Scalar::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

fn parse_decimal(text: &str) -> Option<BigDecimal> {
    BigDecimal::from_str(text).ok()
}

/// A JSON integer, signed or unsigned, widened so both ranges fit.
fn json_int(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

fn int_value(n: i128) -> Value {
    if let Ok(signed) = i64::try_from(n) {
        Value::from(signed)
    } else if let Ok(unsigned) = u64::try_from(n) {
        Value::from(unsigned)
    } else {
        Value::Null
    }
}

/// Text of a scalar JSON value, as a loosely typed caller would expect it.
fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// A node holding a single scalar value.
///
/// # Example
///
/// ```rust
/// use formnode::{LeafNode, NodeLike};
/// use serde_json::json;
///
/// let node = LeafNode::from_fragment(&json!({
///     "__type__": "decimal",
///     "__minimum__": "-10.0",
///     "__maximum__": "10.0"
/// }))
/// .unwrap();
///
/// assert!(node.is_valid(&json!("6.20982")));
/// assert!(!node.is_valid(&json!("-10.00001")));
/// ```
#[derive(Debug, Clone)]
pub struct LeafNode {
    base: BaseNode,
    kind: Kind,
    regex: Option<Regex>,
    options: Option<Vec<Scalar>>,
    minimum: Option<Scalar>,
    maximum: Option<Scalar>,
}

impl LeafNode {
    fn new(kind: Kind) -> Self {
        Self {
            base: BaseNode::default(),
            kind,
            regex: None,
            options: None,
            minimum: None,
            maximum: None,
        }
    }

    /// An unconstrained leaf of the named kind.
    pub fn from_type_name(name: &str) -> Result<Self, BuildError> {
        Ok(Self::new(name.parse()?))
    }

    /// A leaf built from a full fragment such as
    /// `{"__type__": "uint", "__options__": [0, 1, 2]}`.
    pub fn from_fragment(fragment: &Value) -> Result<Self, BuildError> {
        match fragment {
            Value::Object(map) => Self::from_details(map.clone()),
            other => Err(BuildError::UnrecognizedFragment(other.to_string())),
        }
    }

    pub(crate) fn from_details(mut details: Map<String, Value>) -> Result<Self, BuildError> {
        let kind = match details.shift_remove("__type__") {
            Some(Value::String(name)) => name.parse::<Kind>()?,
            Some(other) => {
                return Err(BuildError::invalid(
                    "__type__",
                    format!("expected a type name, got {}", other),
                ))
            }
            None => return Err(BuildError::MissingDirective("__type__".to_string())),
        };
        let mut node = Self::new(kind);

        let mut take = |key: &str| details.shift_remove(key).filter(|v| !v.is_null());
        let regex = take("__regex__");
        let options = take("__options__");
        let minimum = take("__minimum__");
        let maximum = take("__maximum__");

        if options.is_some() {
            let other = if regex.is_some() {
                Some("__regex__")
            } else if minimum.is_some() {
                Some("__minimum__")
            } else if maximum.is_some() {
                Some("__maximum__")
            } else {
                None
            };
            if let Some(other) = other {
                return Err(BuildError::ConflictingDirectives {
                    first: "__options__".to_string(),
                    second: other.to_string(),
                });
            }
        }

        if let Some(regex) = regex {
            match regex {
                Value::String(pattern) => node.set_regex(&pattern)?,
                other => {
                    return Err(BuildError::invalid(
                        "__regex__",
                        format!("expected a string, got {}", other),
                    ))
                }
            }
        }
        if let Some(options) = options {
            node.set_options(&options)?;
        }
        if minimum.is_some() || maximum.is_some() {
            node.set_minmax(minimum.as_ref(), maximum.as_ref())?;
        }

        node.base = BaseNode::from_details(&mut details);

        if let Some(key) = details.keys().next() {
            return Err(if is_directive(key) {
                BuildError::UnexpectedDirective(key.clone())
            } else {
                BuildError::UnexpectedKey(key.clone())
            });
        }

        Ok(node)
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn base(&self) -> &BaseNode {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut BaseNode {
        &mut self.base
    }

    /// The custom pattern, if one is set.
    pub fn regex(&self) -> Option<&str> {
        self.regex.as_ref().map(Regex::as_str)
    }

    pub fn options(&self) -> Option<&[Scalar]> {
        self.options.as_deref()
    }

    /// The `(minimum, maximum)` bounds.
    pub fn minmax(&self) -> (Option<&Scalar>, Option<&Scalar>) {
        (self.minimum.as_ref(), self.maximum.as_ref())
    }

    /// Sets a custom pattern on a string leaf.
    ///
    /// On any other kind the pattern is ignored with a warning.
    pub fn set_regex(&mut self, pattern: &str) -> Result<(), BuildError> {
        if self.kind != Kind::String {
            tracing::warn!(kind = %self.kind, "__regex__ is only used by string nodes, ignoring");
            return Ok(());
        }
        if self.options.is_some() {
            return Err(BuildError::ConflictingDirectives {
                first: "__options__".to_string(),
                second: "__regex__".to_string(),
            });
        }
        let regex =
            Regex::new(pattern).map_err(|e| BuildError::invalid("__regex__", e.to_string()))?;
        self.regex = Some(regex);
        Ok(())
    }

    /// Replaces the list of allowed values.
    ///
    /// Each option is converted to the kind's canonical scalar; duplicates
    /// are dropped with a warning.
    pub fn set_options(&mut self, options: &Value) -> Result<(), BuildError> {
        if !self.kind.supports_options() {
            return Err(BuildError::UnsupportedDirective {
                directive: "__options__".to_string(),
                kind: self.kind.to_string(),
            });
        }
        let conflict = if self.regex.is_some() {
            Some("__regex__")
        } else if self.minimum.is_some() || self.maximum.is_some() {
            Some("__minimum__")
        } else {
            None
        };
        if let Some(second) = conflict {
            return Err(BuildError::ConflictingDirectives {
                first: "__options__".to_string(),
                second: second.to_string(),
            });
        }

        let items = match options {
            Value::Array(items) if !items.is_empty() => items,
            _ => return Err(BuildError::invalid("__options__", "expected a non-empty list")),
        };

        let mut converted: Vec<Scalar> = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let scalar = self.option_scalar(item).ok_or_else(|| {
                BuildError::invalid(
                    &format!("__options__[{}]", i),
                    format!("{} is not a valid {}", item, self.kind),
                )
            })?;
            if converted.contains(&scalar) {
                tracing::warn!(index = i, option = %item, "duplicate option dropped");
                continue;
            }
            converted.push(scalar);
        }

        self.options = Some(converted);
        Ok(())
    }

    fn option_scalar(&self, item: &Value) -> Option<Scalar> {
        match self.kind {
            Kind::Base64
            | Kind::Date
            | Kind::Datetime
            | Kind::Ip
            | Kind::Md5
            | Kind::Time
            | Kind::Uuid => match item {
                Value::String(s) if self.kind.matches(s) => Some(Scalar::Text(s.clone())),
                _ => None,
            },
            Kind::String => stringify(item).map(Scalar::Text),
            _ => self.number_scalar(item),
        }
    }

    /// Converts a bound or option of a numeric kind.
    fn number_scalar(&self, item: &Value) -> Option<Scalar> {
        match self.kind {
            Kind::Int | Kind::Timestamp | Kind::Uint => {
                let n = match item {
                    Value::Number(n) => json_int(n)?,
                    Value::String(s) if Kind::Int.matches(s) => i128::from(parse_int(s)?),
                    _ => return None,
                };
                if self.kind.is_unsigned() && n < 0 {
                    return None;
                }
                Some(Scalar::Int(n))
            }
            Kind::Float => match item {
                Value::Number(n) => n.as_f64().map(Scalar::Float),
                Value::String(s) if Kind::Decimal.matches(s) => s.parse().ok().map(Scalar::Float),
                _ => None,
            },
            Kind::Decimal | Kind::Price => {
                let text = match item {
                    Value::Number(n) => n.to_string(),
                    Value::String(s) => s.clone(),
                    _ => return None,
                };
                if !self.kind.matches(&text) {
                    return None;
                }
                parse_decimal(&text).map(Scalar::Decimal)
            }
            _ => None,
        }
    }

    fn bound_scalar(&self, directive: &str, value: &Value) -> Result<Scalar, BuildError> {
        let scalar = match self.kind {
            Kind::Date | Kind::Datetime | Kind::Ip | Kind::Time => match value {
                Value::String(s) if self.kind.matches(s) => Some(Scalar::Text(s.clone())),
                _ => None,
            },
            Kind::String => {
                // string bounds are lengths
                let n = match value {
                    Value::Number(n) => json_int(n),
                    Value::String(s) if Kind::Int.matches(s) => parse_int(s).map(i128::from),
                    _ => None,
                };
                n.filter(|n| *n >= 0).map(Scalar::Int)
            }
            _ => self.number_scalar(value),
        };
        scalar.ok_or_else(|| {
            BuildError::invalid(
                directive,
                format!("{} is not a valid bound for {}", value, self.kind),
            )
        })
    }

    /// Sets the minimum and/or maximum. A `None` side keeps its current value.
    ///
    /// Bounds use the kind's representation: strings for date, datetime,
    /// time, ip, decimal and price, numbers for the integer kinds and
    /// float, and character counts for string.
    pub fn set_minmax(
        &mut self,
        minimum: Option<&Value>,
        maximum: Option<&Value>,
    ) -> Result<(), BuildError> {
        if !self.kind.supports_minmax() {
            let directive = if minimum.is_some() {
                "__minimum__"
            } else {
                "__maximum__"
            };
            return Err(BuildError::UnsupportedDirective {
                directive: directive.to_string(),
                kind: self.kind.to_string(),
            });
        }
        if self.options.is_some() {
            return Err(BuildError::ConflictingDirectives {
                first: "__options__".to_string(),
                second: "__minimum__".to_string(),
            });
        }

        let minimum = match minimum {
            Some(value) => Some(self.bound_scalar("__minimum__", value)?),
            None => self.minimum.clone(),
        };
        let maximum = match maximum {
            Some(value) => Some(self.bound_scalar("__maximum__", value)?),
            None => self.maximum.clone(),
        };

        if let (Some(min), Some(max)) = (&minimum, &maximum) {
            if min.compare(max, self.kind) == Some(Ordering::Greater) {
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

    /// Checks `value` against the kind, returning the scalar used for the
    /// options and bounds checks, if the kind has one.
    fn accept(&self, value: &Value) -> Result<Option<Scalar>, &'static str> {
        match self.kind {
            Kind::Any => Ok(None),

            Kind::Base64
            | Kind::Date
            | Kind::Datetime
            | Kind::Ip
            | Kind::Md5
            | Kind::Time
            | Kind::Uuid => {
                let text = value.as_str().ok_or("not a string")?;
                if !self.kind.matches(text) {
                    return Err("failed regex (internal)");
                }
                Ok(Some(Scalar::Text(text.to_string())))
            }

            Kind::Bool => match value {
                Value::Bool(_) => Ok(None),
                Value::Number(n) if n.as_u64() == Some(0) || n.as_u64() == Some(1) => Ok(None),
                Value::String(s)
                    if TRUE_STRINGS.contains(&s.as_str()) || FALSE_STRINGS.contains(&s.as_str()) =>
                {
                    Ok(None)
                }
                _ => Err("not a valid bool"),
            },

            Kind::Int | Kind::Timestamp | Kind::Uint => {
                let n = match value {
                    Value::Bool(_) => return Err("is a bool"),
                    Value::Number(n) => json_int(n).ok_or("not an integer")?,
                    Value::String(s) if self.kind.matches(s) => {
                        parse_int(s).map(i128::from).ok_or("not an integer")?
                    }
                    _ => return Err("not an integer"),
                };
                if self.kind.is_unsigned() && n < 0 {
                    return Err("signed");
                }
                Ok(Some(Scalar::Int(n)))
            }

            Kind::Decimal | Kind::Price => {
                let text = match value {
                    Value::Bool(_) => return Err("is a bool"),
                    Value::Number(n) => n.to_string(),
                    Value::String(s) => s.clone(),
                    _ if self.kind == Kind::Decimal => {
                        return Err("can not be converted to decimal")
                    }
                    _ => return Err("not a string"),
                };
                if !self.kind.matches(&text) {
                    return Err("failed regex (internal)");
                }
                parse_decimal(&text)
                    .map(|d| Some(Scalar::Decimal(d)))
                    .ok_or("can not be converted to decimal")
            }

            Kind::Float => match value {
                Value::Bool(_) => Err("is a bool"),
                Value::Number(n) => n
                    .as_f64()
                    .map(|f| Some(Scalar::Float(f)))
                    .ok_or("can not be converted to float"),
                Value::String(s) if Kind::Decimal.matches(s) => s
                    .parse::<f64>()
                    .map(|f| Some(Scalar::Float(f)))
                    .map_err(|_| "can not be converted to float"),
                _ => Err("can not be converted to float"),
            },

            Kind::Json => match value {
                Value::String(s) => serde_json::from_str::<Value>(s)
                    .map(|_| None)
                    .map_err(|_| "can not be decoded from JSON"),
                _ => Ok(None),
            },

            Kind::String => {
                let text = value.as_str().ok_or("not a string")?;
                if let Some(ref regex) = self.regex {
                    if !regex.is_match(text) {
                        return Err("failed regex (custom)");
                    }
                    // bounds do not apply once a custom pattern is set
                    return Ok(None);
                }
                Ok(Some(Scalar::Text(text.to_string())))
            }
        }
    }

    fn check_bounds(&self, scalar: &Scalar) -> Result<(), &'static str> {
        if self.kind == Kind::String {
            if let Scalar::Text(ref text) = scalar {
                let len = text.chars().count() as i128;
                if let Some(Scalar::Int(min)) = self.minimum {
                    if len < min {
                        return Err("not long enough");
                    }
                }
                if let Some(Scalar::Int(max)) = self.maximum {
                    if len > max {
                        return Err("too long");
                    }
                }
            }
            return Ok(());
        }

        if let Some(ref min) = self.minimum {
            if scalar.compare(min, self.kind) == Some(Ordering::Less) {
                return Err("did not meet minimum");
            }
        }
        if let Some(ref max) = self.maximum {
            if scalar.compare(max, self.kind) == Some(Ordering::Greater) {
                return Err("exceeds maximum");
            }
        }
        Ok(())
    }

    fn check(&self, value: &Value) -> Result<(), &'static str> {
        let Some(scalar) = self.accept(value)? else {
            return Ok(());
        };
        if let Some(ref options) = self.options {
            return if options.contains(&scalar) {
                Ok(())
            } else {
                Err("not in options")
            };
        }
        self.check_bounds(&scalar)
    }

    fn unconvertible(&self, value: &Value, path: &JsonPath) -> CleanError {
        CleanError::Unconvertible {
            path: path.clone(),
            kind: self.kind.to_string(),
            got: value.to_string(),
        }
    }

    fn format_datetime(&self, datetime: &NaiveDateTime) -> Value {
        let format = self
            .kind
            .temporal_format()
            .unwrap_or("%Y-%m-%d %H:%M:%S");
        Value::String(datetime.format(format).to_string())
    }

    /// Cleans a date/time value, formatted for the kind first.
    pub fn clean_datetime(&self, datetime: &NaiveDateTime) -> Result<Value, CleanError> {
        self.clean(&self.format_datetime(datetime))
    }

    /// Validates a date/time value, formatted for the kind first.
    pub fn valid_datetime(&self, datetime: &NaiveDateTime, path: &JsonPath) -> ValidationResult {
        self.valid(&self.format_datetime(datetime), path)
    }

    /// True when no constraint, flag or special is set.
    pub(crate) fn is_plain(&self) -> bool {
        self.base.is_plain()
            && self.regex.is_none()
            && self.options.is_none()
            && self.minimum.is_none()
            && self.maximum.is_none()
    }
}

impl NodeLike for LeafNode {
    fn valid(&self, value: &Value, path: &JsonPath) -> ValidationResult {
        if value.is_null() && self.base.is_optional() {
            return Validation::Success(());
        }
        match self.check(value) {
            Ok(()) => Validation::Success(()),
            Err(reason) => Validation::Failure(ValidationFailures::single(
                ValidationFailure::new(path.clone(), reason).with_got(value.to_string()),
            )),
        }
    }

    fn clean_at(&self, value: &Value, path: &JsonPath) -> Result<Value, CleanError> {
        if value.is_null() && self.base.is_optional() {
            return Ok(Value::Null);
        }

        match self.kind {
            Kind::Any => Ok(value.clone()),

            Kind::Base64 | Kind::Ip | Kind::Md5 | Kind::String | Kind::Uuid => stringify(value)
                .map(Value::String)
                .ok_or_else(|| self.unconvertible(value, path)),

            Kind::Bool => Ok(Value::Bool(match value {
                Value::String(s) => TRUE_STRINGS.contains(&s.as_str()),
                other => truthy(other),
            })),

            Kind::Date | Kind::Datetime | Kind::Time | Kind::Decimal => stringify(value)
                .map(Value::String)
                .ok_or_else(|| self.unconvertible(value, path)),

            Kind::Float => {
                let float = match value {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                float
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| self.unconvertible(value, path))
            }

            Kind::Int | Kind::Timestamp | Kind::Uint => {
                let int = match value {
                    Value::Number(n) => json_int(n).or_else(|| {
                        n.as_f64()
                            .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                            .map(|f| f.trunc() as i128)
                    }),
                    Value::String(s) => parse_int(s.trim()).map(i128::from),
                    _ => None,
                };
                int.map(int_value)
                    .ok_or_else(|| self.unconvertible(value, path))
            }

            Kind::Json => match value {
                Value::String(s) => Ok(Value::String(s.clone())),
                other => Ok(Value::String(other.to_string())),
            },

            Kind::Price => {
                let text = match value {
                    Value::Number(n) => n.to_string(),
                    Value::String(s) => s.trim().to_string(),
                    other => return Err(self.unconvertible(other, path)),
                };
                let price = parse_decimal(&text)
                    .ok_or_else(|| self.unconvertible(value, path))?
                    .with_scale_round(2, RoundingMode::HalfUp);
                Ok(Value::String(price.to_plain_string()))
            }
        }
    }

    fn is_optional(&self) -> bool {
        self.base.is_optional()
    }

    fn to_value(&self) -> Value {
        let mut out = Map::new();
        self.base.export_into(&mut out);
        out.insert("__type__".to_string(), Value::String(self.kind.to_string()));
        if let Some(ref regex) = self.regex {
            out.insert("__regex__".to_string(), Value::String(regex.as_str().to_string()));
        }
        if let Some(ref options) = self.options {
            out.insert(
                "__options__".to_string(),
                Value::Array(options.iter().map(Scalar::to_value).collect()),
            );
        }
        if let Some(ref min) = self.minimum {
            out.insert("__minimum__".to_string(), min.to_value());
        }
        if let Some(ref max) = self.maximum {
            out.insert("__maximum__".to_string(), max.to_value());
        }
        Value::Object(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn leaf(fragment: Value) -> LeafNode {
        LeafNode::from_fragment(&fragment).unwrap()
    }

    fn reason(node: &LeafNode, value: Value) -> String {
        match node.valid(&value, &JsonPath::root()) {
            Validation::Failure(failures) => failures.first().reason.clone(),
            Validation::Success(()) => panic!("expected {} to fail", value),
        }
    }

    #[test]
    fn test_from_type_name() {
        let node = LeafNode::from_type_name("md5").unwrap();
        assert_eq!(node.kind(), Kind::Md5);
        assert!(node.is_plain());
        assert!(matches!(
            LeafNode::from_type_name("md4"),
            Err(BuildError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_missing_type() {
        assert_eq!(
            LeafNode::from_fragment(&json!({"__options__": [1]})).unwrap_err(),
            BuildError::MissingDirective("__type__".to_string())
        );
    }

    #[test]
    fn test_leftover_keys_rejected() {
        assert_eq!(
            LeafNode::from_fragment(&json!({"__type__": "int", "__hash__": true})).unwrap_err(),
            BuildError::UnexpectedDirective("__hash__".to_string())
        );
        assert_eq!(
            LeafNode::from_fragment(&json!({"__type__": "int", "name": "x"})).unwrap_err(),
            BuildError::UnexpectedKey("name".to_string())
        );
    }

    #[test]
    fn test_options_conflict_with_bounds() {
        let err = LeafNode::from_fragment(&json!({
            "__type__": "int",
            "__options__": [1, 2],
            "__minimum__": 0
        }))
        .unwrap_err();
        assert!(matches!(err, BuildError::ConflictingDirectives { .. }));
    }

    #[test]
    fn test_options_unsupported_kind() {
        let err = LeafNode::from_fragment(&json!({"__type__": "bool", "__options__": [true]}))
            .unwrap_err();
        assert!(matches!(err, BuildError::UnsupportedDirective { .. }));
    }

    #[test]
    fn test_minmax_unsupported_kind() {
        let err = LeafNode::from_fragment(&json!({"__type__": "md5", "__minimum__": "a"}))
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::UnsupportedDirective {
                directive: "__minimum__".to_string(),
                kind: "md5".to_string(),
            }
        );
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let err = LeafNode::from_fragment(&json!({
            "__type__": "ip",
            "__minimum__": "192.168.1.1",
            "__maximum__": "192.168.0.246"
        }))
        .unwrap_err();
        assert!(matches!(err, BuildError::InvalidDirective { ref directive, .. } if directive == "__maximum__"));
    }

    #[test]
    fn test_unsigned_bound_rejected() {
        let err = LeafNode::from_fragment(&json!({"__type__": "uint", "__minimum__": -1}))
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidDirective { .. }));
    }

    #[test]
    fn test_regex_ignored_on_other_kinds() {
        let node = leaf(json!({"__type__": "int", "__regex__": "^1$"}));
        assert_eq!(node.regex(), None);
        assert!(node.is_valid(&json!(2)));
    }

    #[test]
    fn test_invalid_regex() {
        let err = LeafNode::from_fragment(&json!({"__type__": "string", "__regex__": "("}))
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidDirective { ref directive, .. } if directive == "__regex__"));
    }

    #[test]
    fn test_duplicate_options_dropped() {
        let node = leaf(json!({"__type__": "uint", "__options__": [0, 1, "1", 2]}));
        assert_eq!(
            node.options(),
            Some(&[Scalar::Int(0), Scalar::Int(1), Scalar::Int(2)][..])
        );
    }

    #[test]
    fn test_invalid_option() {
        let err = LeafNode::from_fragment(&json!({"__type__": "date", "__options__": ["2016-13-01"]}))
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidDirective { ref directive, .. } if directive == "__options__[0]"));
    }

    #[test]
    fn test_reasons() {
        assert_eq!(reason(&leaf(json!({"__type__": "md5"})), json!(0)), "not a string");
        assert_eq!(
            reason(&leaf(json!({"__type__": "uuid"})), json!("Hello")),
            "failed regex (internal)"
        );
        assert_eq!(reason(&leaf(json!({"__type__": "int"})), json!("x")), "not an integer");
        assert_eq!(reason(&leaf(json!({"__type__": "int"})), json!(true)), "is a bool");
        assert_eq!(reason(&leaf(json!({"__type__": "uint"})), json!("-1")), "signed");
        assert_eq!(reason(&leaf(json!({"__type__": "bool"})), json!(2)), "not a valid bool");
        assert_eq!(
            reason(&leaf(json!({"__type__": "float"})), json!("0xff")),
            "can not be converted to float"
        );
        assert_eq!(
            reason(&leaf(json!({"__type__": "json"})), json!("{hello:[1]}")),
            "can not be decoded from JSON"
        );
        assert_eq!(
            reason(&leaf(json!({"__type__": "string", "__regex__": "^a"})), json!("b")),
            "failed regex (custom)"
        );
        assert_eq!(
            reason(&leaf(json!({"__type__": "string", "__minimum__": 3})), json!("me")),
            "not long enough"
        );
        assert_eq!(
            reason(&leaf(json!({"__type__": "string", "__maximum__": 3})), json!("four")),
            "too long"
        );
        assert_eq!(
            reason(&leaf(json!({"__type__": "int", "__minimum__": 0})), json!(-1)),
            "did not meet minimum"
        );
        assert_eq!(
            reason(&leaf(json!({"__type__": "int", "__maximum__": 0})), json!(1)),
            "exceeds maximum"
        );
        assert_eq!(
            reason(&leaf(json!({"__type__": "int", "__options__": [1]})), json!(2)),
            "not in options"
        );
    }

    #[test]
    fn test_failure_records_value() {
        let node = leaf(json!({"__type__": "uint"}));
        let failures = node
            .valid(&json!("abc"), &JsonPath::from_field("count"))
            .into_result()
            .unwrap_err();
        let failure = failures.first();
        assert_eq!(failure.path.to_string(), "count");
        assert_eq!(failure.got.as_deref(), Some("\"abc\""));
    }

    #[test]
    fn test_optional_accepts_null() {
        let node = leaf(json!({"__type__": "int", "__optional__": true}));
        assert!(node.is_valid(&Value::Null));
        assert_eq!(node.clean(&Value::Null).unwrap(), Value::Null);

        let required = leaf(json!({"__type__": "int"}));
        assert!(!required.is_valid(&Value::Null));
    }

    #[test]
    fn test_regex_ignores_bounds() {
        let mut node = leaf(json!({"__type__": "string", "__regex__": "^[a-z]+$"}));
        node.set_minmax(Some(&json!(10)), None).unwrap();
        assert!(node.is_valid(&json!("abc")));
    }

    #[test]
    fn test_decimal_exact_bounds() {
        let node = leaf(json!({"__type__": "decimal", "__minimum__": "-10.0", "__maximum__": "10.0"}));
        assert!(node.is_valid(&json!("-10")));
        assert!(node.is_valid(&json!("6.20982")));
        assert!(node.is_valid(&json!(0.1)));
        assert!(!node.is_valid(&json!("-10.00001")));
        assert!(!node.is_valid(&json!("11")));
    }

    #[test]
    fn test_decimal_options_compare_numerically() {
        let node = leaf(json!({"__type__": "decimal", "__options__": ["0.0", "2.0"]}));
        assert!(node.is_valid(&json!("2")));
        assert!(!node.is_valid(&json!("0.06")));
    }

    #[test]
    fn test_price() {
        let node = leaf(json!({"__type__": "price"}));
        assert!(node.is_valid(&json!(1)));
        assert!(node.is_valid(&json!("-0.1")));
        assert!(!node.is_valid(&json!(1.234)));
        assert!(!node.is_valid(&json!("0.234")));
        assert_eq!(reason(&node, json!(true)), "is a bool");
    }

    #[test]
    fn test_clean_price() {
        let node = leaf(json!({"__type__": "price"}));
        assert_eq!(node.clean(&json!(0.0)).unwrap(), json!("0.00"));
        assert_eq!(node.clean(&json!("3.1")).unwrap(), json!("3.10"));
        assert_eq!(node.clean(&json!("-3.14")).unwrap(), json!("-3.14"));
        assert_eq!(node.clean(&json!(3)).unwrap(), json!("3.00"));
        assert_eq!(node.clean(&json!("2.345")).unwrap(), json!("2.35"));
        assert!(node.clean(&json!("abc")).is_err());
    }

    #[test]
    fn test_decimal_beyond_28_digits() {
        let node = leaf(json!({"__type__": "decimal"}));
        assert!(node.is_valid(&json!("123456789012345678901234567890.5")));

        let bounded = leaf(json!({"__type__": "decimal", "__maximum__": "1"}));
        assert!(bounded.is_valid(&json!("1.00000000000000000000000000000")));
        assert_eq!(
            reason(&bounded, json!("1.00000000000000000000000000000001")),
            "exceeds maximum"
        );

        let zero = leaf(json!({"__type__": "decimal", "__options__": ["0"]}));
        assert_eq!(
            reason(&zero, json!("0.0000000000000000000000000000001")),
            "not in options"
        );
    }

    #[test]
    fn test_clean_price_beyond_28_digits() {
        let node = leaf(json!({"__type__": "price"}));
        assert_eq!(
            node.clean(&json!("123456789012345678901234567890.555")).unwrap(),
            json!("123456789012345678901234567890.56")
        );
    }

    #[test]
    fn test_clean_temporal_and_decimal_bools() {
        for kind in ["date", "datetime", "time", "decimal"] {
            let node = leaf(json!({"__type__": kind}));
            assert_eq!(node.clean(&json!(true)).unwrap(), json!("true"), "{}", kind);
            assert!(matches!(
                node.clean(&json!([1])),
                Err(CleanError::Unconvertible { .. })
            ));
        }
    }

    #[test]
    fn test_uint_above_i64() {
        let node = leaf(json!({"__type__": "uint"}));
        let big = json!(18446744073709551615u64);
        assert!(node.is_valid(&big));
        assert_eq!(node.clean(&big).unwrap(), big);

        let bounded = leaf(json!({"__type__": "uint", "__maximum__": 18446744073709551615u64}));
        assert!(bounded.is_valid(&json!(9223372036854775808u64)));
        assert_eq!(bounded.to_value()["__maximum__"], big);

        let int = leaf(json!({"__type__": "int", "__minimum__": 0}));
        assert!(int.is_valid(&big));
    }

    #[test]
    fn test_clean_int_bases() {
        let node = leaf(json!({"__type__": "int"}));
        assert_eq!(node.clean(&json!("0x1f")).unwrap(), json!(31));
        assert_eq!(node.clean(&json!("017")).unwrap(), json!(15));
        assert_eq!(node.clean(&json!("-3")).unwrap(), json!(-3));
        assert_eq!(node.clean(&json!(3.14)).unwrap(), json!(3));
        assert!(matches!(
            node.clean(&json!([1])),
            Err(CleanError::Unconvertible { .. })
        ));
    }

    #[test]
    fn test_clean_bool() {
        let node = leaf(json!({"__type__": "bool"}));
        assert_eq!(node.clean(&json!("Y")).unwrap(), json!(true));
        assert_eq!(node.clean(&json!("0")).unwrap(), json!(false));
        assert_eq!(node.clean(&json!("")).unwrap(), json!(false));
        assert_eq!(node.clean(&json!("nope")).unwrap(), json!(false));
        assert_eq!(node.clean(&json!(0.1)).unwrap(), json!(true));
        assert_eq!(node.clean(&json!(0.0)).unwrap(), json!(false));
    }

    #[test]
    fn test_clean_json() {
        let node = leaf(json!({"__type__": "json"}));
        assert_eq!(node.clean(&json!("\"hello\"")).unwrap(), json!("\"hello\""));
        assert_eq!(node.clean(&json!({"Hello": "there"})).unwrap(), json!("{\"Hello\":\"there\"}"));
        assert_eq!(node.clean(&json!([1, 2, 34])).unwrap(), json!("[1,2,34]"));
    }

    #[test]
    fn test_datetime_values() {
        let dt = NaiveDate::from_ymd_opt(1981, 5, 2)
            .unwrap()
            .and_hms_opt(12, 23, 0)
            .unwrap();

        let date = leaf(json!({"__type__": "date"}));
        let datetime = leaf(json!({"__type__": "datetime"}));
        let time = leaf(json!({"__type__": "time"}));

        assert_eq!(date.clean_datetime(&dt).unwrap(), json!("1981-05-02"));
        assert_eq!(datetime.clean_datetime(&dt).unwrap(), json!("1981-05-02 12:23:00"));
        assert_eq!(time.clean_datetime(&dt).unwrap(), json!("12:23:00"));
        assert!(date.valid_datetime(&dt, &JsonPath::root()).is_success());
        assert!(time.valid_datetime(&dt, &JsonPath::root()).is_success());

        let md5 = leaf(json!({"__type__": "md5"}));
        assert!(md5.valid_datetime(&dt, &JsonPath::root()).is_failure());
    }

    #[test]
    fn test_export_order() {
        let node = leaf(json!({
            "__type__": "date",
            "__mysql__": "MySQL information",
            "__optional__": true,
            "__minimum__": "2016-01-01"
        }));
        assert_eq!(
            node.to_json(),
            r#"{"__optional__":true,"__mysql__":"MySQL information","__type__":"date","__minimum__":"2016-01-01"}"#
        );
    }

    #[test]
    fn test_export_bounds_keep_representation() {
        let node = leaf(json!({"__type__": "decimal", "__minimum__": "-10.0", "__maximum__": 10}));
        assert_eq!(
            node.to_value(),
            json!({"__type__": "decimal", "__minimum__": "-10.0", "__maximum__": "10"})
        );
    }
}
