//! Converter configuration.
//!
//! All options are collected by [`ConverterBuilder`] and validated once in
//! [`ConverterBuilder::build`]. The resulting [`ConverterConfig`] never
//! changes afterwards.

use crate::validate::{AccessPolicy, is_valid_sql_identifier};
use crate::{Converter, FilterError, Value};
use std::fmt::{self, Write as _};
use std::sync::Arc;

/// Condition used for an empty filter unless configured otherwise.
///
/// `FALSE` so that an empty filter never silently matches every row.
pub const DEFAULT_EMPTY_CONDITION: &str = "FALSE";

/// Alias for the unnested element inside `$elemMatch` subqueries.
///
/// Must not be used as a column name in the table or as a key in the JSONB
/// column. Change it with [`ConverterBuilder::placeholder_name`].
pub const DEFAULT_PLACEHOLDER_NAME: &str = "__filter_placeholder";

/// Maximum nesting depth of a filter document unless configured otherwise.
///
/// Counts nested JSON objects and arrays, the root object being depth 1.
/// Real filters rarely go past 10; deeper documents are rejected before
/// translation so recursion stays bounded.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Converts the array operand of `$in` / `$nin` before it is bound.
///
/// Some drivers cannot bind a generic array and need it in a specific shape.
/// Without an encoder the parameter is bound as [`Value::Array`].
pub trait ArrayEncoder: Send + Sync + fmt::Debug {
    /// Turn the array elements into the value that gets bound.
    fn encode(&self, elements: Vec<Value>) -> Value;
}

/// Encodes arrays as Postgres array literal text, e.g. `{"NEW","OPEN",NULL}`.
///
/// For drivers that bind every parameter as text; Postgres casts the literal
/// to the column's array type.
///
/// ```
/// use mik_filter::{ArrayEncoder, PgArrayLiteral, Value};
///
/// let encoded = PgArrayLiteral.encode(vec![Value::String("a\"b".into()), Value::Int(3)]);
/// assert_eq!(encoded, Value::String(r#"{"a\"b",3}"#.into()));
/// ```
#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::exhaustive_structs)] // Unit struct used as a value
pub struct PgArrayLiteral;

impl PgArrayLiteral {
    fn write_element(out: &mut String, value: &Value) {
        match value {
            Value::Null => out.push_str("NULL"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Int(i) => {
                let _ = write!(out, "{i}");
            },
            Value::Float(f) => {
                let _ = write!(out, "{f}");
            },
            Value::String(s) => {
                out.push('"');
                for c in s.chars() {
                    if c == '"' || c == '\\' {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push('"');
            },
            Value::Array(items) => Self::write_array(out, items),
        }
    }

    fn write_array(out: &mut String, items: &[Value]) {
        out.push('{');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            Self::write_element(out, item);
        }
        out.push('}');
    }
}

impl ArrayEncoder for PgArrayLiteral {
    fn encode(&self, elements: Vec<Value>) -> Value {
        let mut out = String::with_capacity(2 + elements.len() * 8);
        Self::write_array(&mut out, &elements);
        Value::String(out)
    }
}

/// Nested JSONB routing: field names map into one JSONB column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedJsonb {
    pub(crate) column: String,
    pub(crate) exemptions: Vec<String>,
}

impl NestedJsonb {
    /// The JSONB column holding the nested fields.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Fields that stay regular columns.
    #[must_use]
    pub fn exemptions(&self) -> &[String] {
        &self.exemptions
    }

    /// Whether `field` lives inside the JSONB column.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        !self.exemptions.iter().any(|e| e == field)
    }
}

/// Validated, read-only converter settings.
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    pub(crate) nested: Option<NestedJsonb>,
    pub(crate) access: AccessPolicy,
    pub(crate) empty_condition: String,
    pub(crate) placeholder_name: String,
    pub(crate) array_encoder: Option<Arc<dyn ArrayEncoder>>,
    pub(crate) max_depth: usize,
}

impl ConverterConfig {
    /// Nested JSONB routing, if configured.
    #[must_use]
    pub const fn nested(&self) -> Option<&NestedJsonb> {
        self.nested.as_ref()
    }

    /// Column access policy.
    #[must_use]
    pub const fn access(&self) -> &AccessPolicy {
        &self.access
    }

    /// Condition returned for an empty filter.
    #[must_use]
    pub fn empty_condition(&self) -> &str {
        &self.empty_condition
    }

    /// Alias used for array elements in `$elemMatch`.
    #[must_use]
    pub fn placeholder_name(&self) -> &str {
        &self.placeholder_name
    }

    /// Encoder applied to `$in` / `$nin` arrays, if any.
    #[must_use]
    pub fn array_encoder(&self) -> Option<&dyn ArrayEncoder> {
        self.array_encoder.as_deref()
    }

    /// Maximum nesting depth of a filter document.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// Builder for [`Converter`].
///
/// At least one access option is required: [`allow_all_columns`](Self::allow_all_columns),
/// [`allow_columns`](Self::allow_columns) or [`nested_jsonb`](Self::nested_jsonb).
///
/// # Example
///
/// ```
/// use mik_filter::Converter;
///
/// let converter = Converter::builder()
///     .nested_jsonb("meta", &["created_at", "updated_at"])
///     .disallow_columns(&["password"])
///     .build()
///     .unwrap();
///
/// assert_eq!(converter.config().nested().map(|n| n.column()), Some("meta"));
/// ```
#[derive(Debug, Clone, Default)]
#[must_use = "call .build() to create the Converter"]
pub struct ConverterBuilder {
    nested: Option<NestedJsonb>,
    access: AccessPolicy,
    empty_condition: Option<String>,
    placeholder_name: Option<String>,
    array_encoder: Option<Arc<dyn ArrayEncoder>>,
    max_depth: Option<usize>,
}

impl ConverterBuilder {
    /// Start with no options set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route all fields into the JSONB `column`, except `exemptions`.
    ///
    /// Implicitly allows every field (JSONB documents have no fixed schema);
    /// [`disallow_columns`](Self::disallow_columns) still applies.
    pub fn nested_jsonb(mut self, column: impl Into<String>, exemptions: &[&str]) -> Self {
        self.nested = Some(NestedJsonb {
            column: column.into(),
            exemptions: exemptions.iter().map(|s| (*s).to_string()).collect(),
        });
        self.access.nested = true;
        self
    }

    /// Allow filtering on any column not explicitly disallowed.
    pub const fn allow_all_columns(mut self) -> Self {
        self.access.allow_all = true;
        self
    }

    /// Allow filtering on these columns (whitelist).
    pub fn allow_columns(mut self, columns: &[&str]) -> Self {
        self.access
            .allowed
            .extend(columns.iter().map(|s| (*s).to_string()));
        self
    }

    /// Never allow filtering on these columns, whatever else is configured.
    pub fn disallow_columns(mut self, columns: &[&str]) -> Self {
        self.access
            .disallowed
            .extend(columns.iter().map(|s| (*s).to_string()));
        self
    }

    /// Condition returned for an empty filter. Defaults to `FALSE`.
    pub fn empty_condition(mut self, condition: impl Into<String>) -> Self {
        self.empty_condition = Some(condition.into());
        self
    }

    /// Alias for array elements in `$elemMatch` subqueries.
    /// Defaults to [`DEFAULT_PLACEHOLDER_NAME`].
    pub fn placeholder_name(mut self, name: impl Into<String>) -> Self {
        self.placeholder_name = Some(name.into());
        self
    }

    /// Encode `$in` / `$nin` arrays before binding.
    pub fn array_encoder(mut self, encoder: impl ArrayEncoder + 'static) -> Self {
        self.array_encoder = Some(Arc::new(encoder));
        self
    }

    /// Set maximum nesting depth of a filter document.
    ///
    /// Deeper filters fail with [`FilterError::SchemaViolation`].
    /// Defaults to [`DEFAULT_MAX_DEPTH`]. Very large values let hostile
    /// input exhaust the stack.
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Validate the options and create the converter.
    ///
    /// Fails with [`FilterError::InvalidConfiguration`] when no access option
    /// was given, the nested column or placeholder is not a valid identifier,
    /// the empty condition is blank, or the maximum depth is 0.
    pub fn build(self) -> Result<Converter, FilterError> {
        if !self.access.grants_access() {
            return Err(FilterError::InvalidConfiguration(
                "need at least one access option: allow_all_columns, allow_columns, nested_jsonb"
                    .to_string(),
            ));
        }

        if let Some(nested) = &self.nested
            && !is_valid_sql_identifier(&nested.column)
        {
            return Err(FilterError::InvalidConfiguration(format!(
                "nested JSONB column {:?} is not a valid identifier",
                nested.column
            )));
        }

        let placeholder_name = self
            .placeholder_name
            .unwrap_or_else(|| DEFAULT_PLACEHOLDER_NAME.to_string());
        if !is_valid_sql_identifier(&placeholder_name) {
            return Err(FilterError::InvalidConfiguration(format!(
                "placeholder name {placeholder_name:?} is not a valid identifier"
            )));
        }

        let empty_condition = self
            .empty_condition
            .unwrap_or_else(|| DEFAULT_EMPTY_CONDITION.to_string());
        if empty_condition.trim().is_empty() {
            return Err(FilterError::InvalidConfiguration(
                "empty condition must not be blank".to_string(),
            ));
        }

        let max_depth = self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
        if max_depth == 0 {
            return Err(FilterError::InvalidConfiguration(
                "max depth must be at least 1".to_string(),
            ));
        }

        Ok(Converter::from_config(ConverterConfig {
            nested: self.nested,
            access: self.access,
            empty_condition,
            placeholder_name,
            array_encoder: self.array_encoder,
            max_depth,
        }))
    }
}
