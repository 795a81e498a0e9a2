//! Error type for filter conversion.

use thiserror::Error;

/// Everything that can go wrong while building a [`Converter`](crate::Converter)
/// or converting a filter.
///
/// A conversion that returns an error produces no SQL at all, so a caller can
/// never accidentally execute a half-built condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FilterError {
    /// The input bytes are not valid UTF-8 or not a JSON object.
    #[error("malformed filter: {0}")]
    MalformedInput(String),

    /// The JSON is well formed but does not follow the filter grammar.
    #[error("{0}")]
    SchemaViolation(String),

    /// An operator key (`$foo`) that is not supported.
    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    /// A field name that is not a safe SQL identifier.
    #[error("invalid column name: {0:?}")]
    InvalidIdentifier(String),

    /// The column is not permitted by the access policy.
    #[error("column not allowed: {column}")]
    AccessDenied {
        /// The rejected column name.
        column: String,
    },

    /// The converter was configured or called incorrectly.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl FilterError {
    pub(crate) fn schema(msg: impl Into<String>) -> Self {
        Self::SchemaViolation(msg.into())
    }

    pub(crate) fn too_deep(max: usize) -> Self {
        Self::SchemaViolation(format!("filter nesting depth exceeds maximum {max}"))
    }

    /// Short, stable name of the error kind, used in log events.
    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "malformed_input",
            Self::SchemaViolation(_) => "schema_violation",
            Self::UnknownOperator(_) => "unknown_operator",
            Self::InvalidIdentifier(_) => "invalid_identifier",
            Self::AccessDenied { .. } => "access_denied",
            Self::InvalidConfiguration(_) => "invalid_configuration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_display() {
        let err = FilterError::AccessDenied {
            column: "password".into(),
        };
        assert_eq!(err.to_string(), "column not allowed: password");
    }

    #[test]
    fn test_invalid_identifier_display_is_escaped() {
        let err = FilterError::InvalidIdentifier("\"bla = 1 --".into());
        assert_eq!(err.to_string(), r#"invalid column name: "\"bla = 1 --""#);
    }

    #[test]
    fn test_too_deep_display() {
        assert_eq!(
            FilterError::too_deep(32).to_string(),
            "filter nesting depth exceeds maximum 32"
        );
    }

    #[test]
    fn test_schema_violation_display_is_bare() {
        let err = FilterError::schema("empty objects not allowed");
        assert_eq!(err.to_string(), "empty objects not allowed");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(FilterError::MalformedInput(String::new()).kind(), "malformed_input");
        assert_eq!(
            FilterError::InvalidConfiguration(String::new()).kind(),
            "invalid_configuration"
        );
    }
}
