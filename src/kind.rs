//! The closed set of primitive kinds a leaf node can hold.
//!
//! Each [`Kind`] knows its name, the regular expression its textual form must
//! match (where it has one), and which directives it accepts. The helpers
//! [`parse_int`] and [`compare_ips`] implement the integer literal and IP
//! ordering rules shared by cleaning, validation and bound checks.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::BuildError;

static BASE64: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9+/]{4})+(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?$")
        .expect("base64 regex is valid")
});

static DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(?:0[1-9]|1[0-2])-(?:0[1-9]|[12]\d|3[01])$").expect("date regex is valid")
});

static DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(?:0[1-9]|1[0-2])-(?:0[1-9]|[12]\d|3[01]) (?:[01]\d|2[0-3])(?::[0-5]\d){2}$")
        .expect("datetime regex is valid")
});

static DECIMAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(?:[1-9]\d+|\d)(?:\.\d+)?$").expect("decimal regex is valid")
});

static INT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:0|[+-]?[1-9]\d*|0[xX][0-9a-fA-F]+|0[0-7]+)$").expect("int regex is valid")
});

static IP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9][0-9]|[1-9])",
        r"(?:\.(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9])){2}",
        r"\.(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9][0-9]|[1-9])$"
    ))
    .expect("ip regex is valid")
});

static MD5: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-fA-F0-9]{32}$").expect("md5 regex is valid"));

static PRICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(?:[1-9]\d+|\d)(?:\.\d{1,2})?$").expect("price regex is valid")
});

static TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[01]\d|2[0-3])(?::[0-5]\d){2}$").expect("time regex is valid")
});

static UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-f0-9]{8}-[a-f0-9]{4}-4[a-f0-9]{3}-[89aAbB][a-f0-9]{3}-[a-f0-9]{12}$")
        .expect("uuid regex is valid")
});

/// A primitive kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Any,
    Base64,
    Bool,
    Date,
    Datetime,
    Decimal,
    Float,
    Int,
    Ip,
    Json,
    Md5,
    Price,
    String,
    Time,
    Timestamp,
    Uint,
    Uuid,
}

impl Kind {
    /// Every kind, in alphabetical order.
    pub const ALL: [Kind; 17] = [
        Kind::Any,
        Kind::Base64,
        Kind::Bool,
        Kind::Date,
        Kind::Datetime,
        Kind::Decimal,
        Kind::Float,
        Kind::Int,
        Kind::Ip,
        Kind::Json,
        Kind::Md5,
        Kind::Price,
        Kind::String,
        Kind::Time,
        Kind::Timestamp,
        Kind::Uint,
        Kind::Uuid,
    ];

    /// The name used for this kind in schema fragments.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Any => "any",
            Kind::Base64 => "base64",
            Kind::Bool => "bool",
            Kind::Date => "date",
            Kind::Datetime => "datetime",
            Kind::Decimal => "decimal",
            Kind::Float => "float",
            Kind::Int => "int",
            Kind::Ip => "ip",
            Kind::Json => "json",
            Kind::Md5 => "md5",
            Kind::Price => "price",
            Kind::String => "string",
            Kind::Time => "time",
            Kind::Timestamp => "timestamp",
            Kind::Uint => "uint",
            Kind::Uuid => "uuid",
        }
    }

    /// The built-in pattern a textual value of this kind must match.
    ///
    /// `int`, `uint` and `timestamp` share the integer literal pattern.
    pub fn regex(self) -> Option<&'static Regex> {
        match self {
            Kind::Base64 => Some(&BASE64),
            Kind::Date => Some(&DATE),
            Kind::Datetime => Some(&DATETIME),
            Kind::Decimal => Some(&DECIMAL),
            Kind::Int | Kind::Timestamp | Kind::Uint => Some(&INT),
            Kind::Ip => Some(&IP),
            Kind::Md5 => Some(&MD5),
            Kind::Price => Some(&PRICE),
            Kind::Time => Some(&TIME),
            Kind::Uuid => Some(&UUID),
            _ => None,
        }
    }

    /// Whether `text` matches this kind's built-in pattern.
    ///
    /// Kinds without a pattern match nothing.
    pub fn matches(self, text: &str) -> bool {
        self.regex().is_some_and(|re| re.is_match(text))
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Kind::Int | Kind::Timestamp | Kind::Uint)
    }

    /// Integer kinds that reject negative values.
    pub fn is_unsigned(self) -> bool {
        matches!(self, Kind::Timestamp | Kind::Uint)
    }

    /// Kinds whose canonical form is a formatted date and/or time.
    pub fn is_temporal(self) -> bool {
        matches!(self, Kind::Date | Kind::Datetime | Kind::Time)
    }

    /// Kinds compared with exact decimal arithmetic.
    pub fn is_decimal(self) -> bool {
        matches!(self, Kind::Decimal | Kind::Price)
    }

    /// Whether `__options__` may be set.
    pub fn supports_options(self) -> bool {
        !matches!(self, Kind::Any | Kind::Bool | Kind::Json)
    }

    /// Whether `__minimum__` / `__maximum__` may be set.
    pub fn supports_minmax(self) -> bool {
        matches!(
            self,
            Kind::Date
                | Kind::Datetime
                | Kind::Decimal
                | Kind::Float
                | Kind::Int
                | Kind::Ip
                | Kind::Price
                | Kind::String
                | Kind::Time
                | Kind::Timestamp
                | Kind::Uint
        )
    }

    /// The `chrono` format string of a temporal kind.
    pub fn temporal_format(self) -> Option<&'static str> {
        match self {
            Kind::Date => Some("%Y-%m-%d"),
            Kind::Datetime => Some("%Y-%m-%d %H:%M:%S"),
            Kind::Time => Some("%H:%M:%S"),
            _ => None,
        }
    }
}

impl FromStr for Kind {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| BuildError::UnknownKind(s.to_string()))
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses an integer literal.
///
/// A `0x`/`0X` prefix reads the rest as base 16, a leading `0` followed by
/// more digits as base 8, anything else as base 10. An optional sign is
/// accepted in front of any form. Returns `None` when the text is not a
/// literal in the chosen base or does not fit an `i64`.
///
/// ```rust
/// use formnode::parse_int;
///
/// assert_eq!(parse_int("0x1F"), Some(31));
/// assert_eq!(parse_int("017"), Some(15));
/// assert_eq!(parse_int("-42"), Some(-42));
/// assert_eq!(parse_int("4.2"), None);
/// ```
pub fn parse_int(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Orders two dotted IPv4 addresses octet by octet.
///
/// The first differing octet decides; string ordering would put
/// `192.168.0.246` after `192.168.1.1`.
///
/// ```rust
/// use std::cmp::Ordering;
/// use formnode::compare_ips;
///
/// assert_eq!(compare_ips("192.168.0.1", "192.168.1.1"), Ordering::Less);
/// assert_eq!(compare_ips("192.168.0.246", "192.168.1.1"), Ordering::Less);
/// ```
pub fn compare_ips(first: &str, second: &str) -> Ordering {
    if first == second {
        return Ordering::Equal;
    }
    octets(first).cmp(&octets(second))
}

fn octets(ip: &str) -> Vec<u16> {
    ip.split('.')
        .map(|part| part.trim().parse::<u16>().unwrap_or(0))
        .collect()
}
