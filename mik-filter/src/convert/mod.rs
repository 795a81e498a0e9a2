//! Filter conversion entry point.

mod order;
mod translate;

pub use order::{SortDir, SortField};

use crate::config::{ConverterBuilder, ConverterConfig};
use crate::{FilterError, FilterValue, Value};
use translate::Translator;

/// Result of a conversion: a condition plus its bound values.
///
/// `values[i]` binds placeholder `$(start + i)`.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
#[must_use = "Conversion must be used to build the query"]
pub struct Conversion {
    /// Boolean SQL expression for a `WHERE` clause.
    pub conditions: String,
    /// Values for the `$N` placeholders, in order.
    pub values: Vec<Value>,
}

impl Conversion {
    /// Split into condition and values.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.conditions, self.values)
    }
}

/// Converts JSON filters into parameterized Postgres conditions.
///
/// Built once with [`Converter::builder`], then shared freely; converting
/// never mutates the converter.
///
/// # Example
///
/// ```
/// use mik_filter::{Converter, Value};
///
/// let converter = Converter::builder()
///     .allow_columns(&["name", "age"])
///     .build()
///     .unwrap();
///
/// let result = converter
///     .convert_str(r#"{"name": "John", "age": {"$gte": 21}}"#, 1)
///     .unwrap();
///
/// assert_eq!(result.conditions, r#"(("age" >= $1) AND ("name" = $2))"#);
/// assert_eq!(result.values, vec![Value::Int(21), Value::String("John".into())]);
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    pub(crate) config: ConverterConfig,
}

impl Converter {
    /// Start configuring a converter.
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::new()
    }

    pub(crate) const fn from_config(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// The validated configuration.
    #[must_use]
    pub const fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert a JSON filter into a condition with placeholders from `$start`.
    ///
    /// Empty input, `null` and `{}` give the configured empty condition.
    ///
    /// # Errors
    ///
    /// - [`FilterError::InvalidConfiguration`] if `start` is 0
    /// - [`FilterError::MalformedInput`] for invalid UTF-8, invalid JSON, or
    ///   JSON that is not an object
    /// - [`FilterError::SchemaViolation`] for filters nested deeper than
    ///   [`ConverterConfig::max_depth`]
    /// - any translation error for the filter itself
    pub fn convert(&self, query: &[u8], start: usize) -> Result<Conversion, FilterError> {
        let result = self.convert_impl(query, start);
        match &result {
            Ok(conversion) => tracing::debug!(
                conditions_len = conversion.conditions.len(),
                values = conversion.values.len(),
                "filter converted"
            ),
            Err(e) => tracing::debug!(error = e.kind(), "filter rejected"),
        }
        result
    }

    /// [`convert`](Self::convert) for string input.
    pub fn convert_str(&self, query: &str, start: usize) -> Result<Conversion, FilterError> {
        self.convert(query.as_bytes(), start)
    }

    fn convert_impl(&self, query: &[u8], start: usize) -> Result<Conversion, FilterError> {
        if start < 1 {
            return Err(FilterError::InvalidConfiguration(
                "start parameter index must be greater than 0".to_string(),
            ));
        }
        if query.is_empty() {
            return Ok(self.empty());
        }

        let text = std::str::from_utf8(query)
            .map_err(|e| FilterError::MalformedInput(e.to_string()))?;
        let json: miniserde::json::Value = miniserde::json::from_str(text)
            .map_err(|_| FilterError::MalformedInput("invalid JSON".to_string()))?;

        let filter = match FilterValue::from_json_with_depth(&json, self.config.max_depth)? {
            FilterValue::Object(filter) if filter.is_empty() => return Ok(self.empty()),
            FilterValue::Object(filter) => filter,
            FilterValue::Null => return Ok(self.empty()),
            other => {
                return Err(FilterError::MalformedInput(format!(
                    "expected a JSON object, got {}",
                    other.type_name()
                )));
            },
        };

        let (conditions, values, _) = Translator::new(&self.config, start).translate(&filter)?;
        Ok(Conversion { conditions, values })
    }

    fn empty(&self) -> Conversion {
        Conversion {
            conditions: self.config.empty_condition.clone(),
            values: Vec::new(),
        }
    }
}
