//! Error types for sqlforge

use crate::value::Value;
use thiserror::Error;

/// Result type alias for sqlforge operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while building, compiling or rendering a query.
///
/// None of these are recoverable inside the library: each one means the caller
/// handed over an input that cannot be turned into a valid statement.
#[derive(Debug, Error)]
pub enum QueryError {
    /// An item of disallowed shape was admitted into a composition
    #[error("Invalid query item: {item:?}")]
    Composition { item: Value },

    /// A condition used an operator or key in a way that is not allowed
    #[error("Invalid query: {0}")]
    Usage(String),

    /// A mandatory clause is empty at assembly time
    #[error("Missing {clause} in {statement} query")]
    MissingClause {
        clause: &'static str,
        statement: &'static str,
    },

    /// The operator has no keyword in the active dialect
    #[error("Operator {operator} does not exist or is not supported by the {dialect} dialect")]
    UnsupportedOperator {
        operator: &'static str,
        dialect: &'static str,
    },

    /// The active dialect cannot express a construct
    #[error("{feature} is not supported by the {dialect} dialect")]
    Unsupported {
        feature: String,
        dialect: &'static str,
    },

    /// A placeholder was still present when the statement was rendered
    #[error("Unresolved placeholder: {0}")]
    UnresolvedPlaceholder(String),

    /// A value does not fit the type it is escaped as
    #[error("Invalid value {value:?} for type {expected}")]
    InvalidValue { value: Value, expected: String },

    /// A rejected attribute, function or type name
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl QueryError {
    /// Create a composition admission error carrying the offending item
    pub fn composition(item: Value) -> Self {
        Self::Composition { item }
    }

    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Create a dialect-capability error for a non-operator construct
    pub fn unsupported(feature: impl Into<String>, dialect: &'static str) -> Self {
        Self::Unsupported {
            feature: feature.into(),
            dialect,
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(value: Value, expected: impl Into<String>) -> Self {
        Self::InvalidValue {
            value,
            expected: expected.into(),
        }
    }

    /// Create an invalid identifier error
    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::InvalidIdentifier(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is a composition admission error
    pub fn is_composition(&self) -> bool {
        matches!(self, Self::Composition { .. })
    }

    /// Check if this is a usage error
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    /// Check if this is a missing clause error
    pub fn is_missing_clause(&self) -> bool {
        matches!(self, Self::MissingClause { .. })
    }

    /// Check if this error comes from a dialect lacking an operator or construct
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedOperator { .. } | Self::Unsupported { .. }
        )
    }
}

impl From<toml::de::Error> for QueryError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
