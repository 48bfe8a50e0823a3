use thiserror::Error;

/// Errors raised while compiling a schema fragment into nodes.
///
/// Errors from inside a parent or tree are wrapped in [`BuildError::Field`]
/// once per level, so the chain of field names leads to the fragment that
/// could not be compiled.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("unrecognized schema fragment: {0}")]
    UnrecognizedFragment(String),

    #[error("unknown type: {0}")]
    UnknownKind(String),

    #[error("invalid {directive}: {reason}")]
    InvalidDirective { directive: String, reason: String },

    #[error("{directive} is not supported for type {kind}")]
    UnsupportedDirective { directive: String, kind: String },

    #[error("{first} can not be combined with {second}")]
    ConflictingDirectives { first: String, second: String },

    #[error("missing {0}")]
    MissingDirective(String),

    #[error("unexpected key: {0}")]
    UnexpectedKey(String),

    #[error("unexpected directive: {0}")]
    UnexpectedDirective(String),

    #[error("invalid field name: {0}")]
    InvalidFieldName(String),

    #[error("__require__ refers to unknown field: {0}")]
    UnknownRequiredField(String),

    #[error("invalid special name: {0}")]
    InvalidSpecialName(String),

    #[error("malformed JSON: {0}")]
    Json(String),

    #[error("in field {field}: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<BuildError>,
    },
}

impl BuildError {
    pub(crate) fn invalid(directive: &str, reason: impl Into<String>) -> Self {
        BuildError::InvalidDirective {
            directive: directive.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn in_field(self, field: &str) -> Self {
        BuildError::Field {
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with all [`BuildError::Field`] wrappers removed.
    pub fn root_cause(&self) -> &BuildError {
        match self {
            BuildError::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for BuildError {
    fn from(err: serde_json::Error) -> Self {
        BuildError::Json(err.to_string())
    }
}
