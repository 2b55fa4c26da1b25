//! Rule builder error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuleError {
    /// Optional field absent; callers usually skip it
    #[error("field not found: {0}")]
    NotFound(String),

    #[error("field only allowed for the default rule: {0}")]
    OnlyForDefault(&'static str),

    #[error("field not allowed for the default rule: {0}")]
    NotForDefault(&'static str),

    #[error("no rules block found: expected exactly one 'rules_<format>' attribute")]
    MissingRuleFormat,

    #[error("more than one rules block found: {0:?}")]
    MultipleRuleFormats(Vec<String>),

    #[error("unexpected type for {path}: expected {expected}")]
    UnexpectedType { path: String, expected: &'static str },

    #[error("expected single-element list for {path}, got {len} elements")]
    FlattenMultiple { path: String, len: usize },

    #[error("invalid value for {path}: {message}")]
    InvalidValue { path: String, message: String },

    #[error("{kind} entry {index} must hold exactly one item, found {found}")]
    AmbiguousItem {
        kind: &'static str,
        index: usize,
        found: usize,
    },

    #[error("invalid child rule at index {index}: {source}")]
    InvalidChild {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl RuleError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RuleError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;

/// Turn `NotFound` into `None`, keeping every other error
pub(crate) trait OptionalField<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalField<T> for Result<T> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(RuleError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
