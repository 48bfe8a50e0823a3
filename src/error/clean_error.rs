use thiserror::Error;

use crate::path::JsonPath;

/// Errors raised by `clean` when a value can not be brought into canonical
/// form.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CleanError {
    #[error("{}: can not convert {got} to {kind}", .path.describe())]
    Unconvertible {
        path: JsonPath,
        kind: String,
        got: String,
    },

    #[error("{}: expected {expected}, got {got}", .path.describe())]
    WrongShape {
        path: JsonPath,
        expected: String,
        got: String,
    },

    #[error("{}: unknown field {field}", .path.describe())]
    UnknownField { path: JsonPath, field: String },

    #[error("{}: no valid option", .path.describe())]
    NoValidOption { path: JsonPath },
}

impl CleanError {
    /// Where the offending value sits.
    pub fn path(&self) -> &JsonPath {
        match self {
            CleanError::Unconvertible { path, .. }
            | CleanError::WrongShape { path, .. }
            | CleanError::UnknownField { path, .. }
            | CleanError::NoValidOption { path } => path,
        }
    }
}
