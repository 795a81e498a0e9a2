//! Decoded filter values and bound SQL parameters.
//!
//! [`FilterValue`] is the typed form of one JSON node of a filter document.
//! [`Value`] is what ends up in [`Conversion::values`](crate::Conversion::values)
//! and gets bound to a `$N` placeholder.

use crate::FilterError;
use crate::config::DEFAULT_MAX_DEPTH;
use miniserde::json::{Number as JsonNumber, Value as JsonValue};
use std::collections::BTreeMap;

/// A JSON number, split by whether it fits an integer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum Number {
    /// Any integer that fits `i64`.
    Int(i64),
    /// Fractional numbers, and integers beyond `i64::MAX`.
    Float(f64),
}

/// One decoded JSON node of a filter document.
///
/// Objects keep their keys in a sorted map, so iterating an object always
/// visits keys in lexicographic order.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FilterValue {
    /// JSON `null`.
    Null,
    /// JSON `true` / `false`.
    Bool(bool),
    /// JSON number.
    Number(Number),
    /// JSON string.
    String(String),
    /// JSON array.
    Array(Vec<FilterValue>),
    /// JSON object.
    Object(BTreeMap<String, FilterValue>),
}

impl FilterValue {
    /// Convert from a miniserde JSON value, nested at most
    /// [`DEFAULT_MAX_DEPTH`] objects and arrays deep.
    ///
    /// # Example
    ///
    /// ```
    /// use mik_filter::{FilterValue, Number};
    /// use miniserde::json::{self, Value as JsonValue};
    ///
    /// let json: JsonValue = json::from_str(r#"{"age": 30}"#).unwrap();
    /// let FilterValue::Object(map) = FilterValue::from_json(&json).unwrap() else {
    ///     panic!("expected an object");
    /// };
    /// assert_eq!(map["age"], FilterValue::Number(Number::Int(30)));
    /// ```
    pub fn from_json(json: &JsonValue) -> Result<Self, FilterError> {
        Self::from_json_with_depth(json, DEFAULT_MAX_DEPTH)
    }

    /// Convert from a miniserde JSON value, nested at most `max_depth`
    /// objects and arrays deep.
    ///
    /// Fails with [`FilterError::SchemaViolation`] on deeper input.
    pub fn from_json_with_depth(json: &JsonValue, max_depth: usize) -> Result<Self, FilterError> {
        Self::from_json_at(json, 1, max_depth)
    }

    fn from_json_at(json: &JsonValue, depth: usize, max_depth: usize) -> Result<Self, FilterError> {
        let value = match json {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(*b),
            JsonValue::Number(n) => Self::Number(match n {
                JsonNumber::I64(i) => Number::Int(*i),
                JsonNumber::U64(u) => {
                    i64::try_from(*u).map_or(Number::Float(*u as f64), Number::Int)
                },
                JsonNumber::F64(f) => Number::Float(*f),
            }),
            JsonValue::String(s) => Self::String(s.clone()),
            JsonValue::Array(_) | JsonValue::Object(_) if depth > max_depth => {
                return Err(FilterError::too_deep(max_depth));
            },
            JsonValue::Array(arr) => Self::Array(
                arr.iter()
                    .map(|v| Self::from_json_at(v, depth + 1, max_depth))
                    .collect::<Result<_, _>>()?,
            ),
            JsonValue::Object(obj) => Self::Object(
                obj.iter()
                    .map(|(k, v)| Ok((k.clone(), Self::from_json_at(v, depth + 1, max_depth)?)))
                    .collect::<Result<_, FilterError>>()?,
            ),
        };
        Ok(value)
    }

    /// Null, boolean, number or string.
    #[inline]
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_)
        )
    }

    /// Whether this is a JSON number.
    #[inline]
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// An array whose elements are all scalars. Empty arrays qualify.
    #[must_use]
    pub fn is_scalar_array(&self) -> bool {
        match self {
            Self::Array(items) => items.iter().all(Self::is_scalar),
            _ => false,
        }
    }

    /// Borrow the members of an array of objects, or `None` if this is not
    /// an array or any member is not an object.
    #[must_use]
    pub fn as_object_array(&self) -> Option<Vec<&BTreeMap<String, Self>>> {
        match self {
            Self::Array(items) => items
                .iter()
                .map(|item| match item {
                    Self::Object(obj) => Some(obj),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    /// Short name of the JSON type, for error messages.
    pub(crate) const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

/// A bound SQL parameter value.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Value {
    /// SQL `NULL`.
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// Double precision float.
    Float(f64),
    /// Text.
    String(String),
    /// Array parameter, as used by `= ANY($N)`.
    Array(Vec<Value>),
}

impl Value {
    /// Convert a scalar filter value into a parameter.
    ///
    /// Returns `None` for arrays and objects.
    ///
    /// ```
    /// use mik_filter::{FilterValue, Value};
    ///
    /// let v = FilterValue::String("John".into());
    /// assert_eq!(Value::from_scalar(&v), Some(Value::String("John".into())));
    /// assert_eq!(Value::from_scalar(&FilterValue::Array(vec![])), None);
    /// ```
    #[must_use]
    pub fn from_scalar(value: &FilterValue) -> Option<Self> {
        match value {
            FilterValue::Null => Some(Self::Null),
            FilterValue::Bool(b) => Some(Self::Bool(*b)),
            FilterValue::Number(Number::Int(i)) => Some(Self::Int(*i)),
            FilterValue::Number(Number::Float(f)) => Some(Self::Float(*f)),
            FilterValue::String(s) => Some(Self::String(s.clone())),
            FilterValue::Array(_) | FilterValue::Object(_) => None,
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use miniserde::json;

    fn parse(s: &str) -> FilterValue {
        let json: JsonValue = json::from_str(s).unwrap();
        FilterValue::from_json(&json).unwrap()
    }

    fn nested_arrays(depth: usize) -> String {
        format!("{}1{}", "[".repeat(depth), "]".repeat(depth))
    }

    #[test]
    fn test_from_json_numbers() {
        assert_eq!(parse("42"), FilterValue::Number(Number::Int(42)));
        assert_eq!(parse("-7"), FilterValue::Number(Number::Int(-7)));
        assert_eq!(parse("2.5"), FilterValue::Number(Number::Float(2.5)));
    }

    #[test]
    fn test_from_json_large_unsigned_becomes_float() {
        let v = parse("18446744073709551615");
        assert!(matches!(v, FilterValue::Number(Number::Float(_))));
    }

    #[test]
    fn test_object_keys_are_sorted() {
        let FilterValue::Object(map) = parse(r#"{"b": 1, "c": 2, "a": 3}"#) else {
            panic!("expected object");
        };
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b", "c"]);
    }

    #[test]
    fn test_scalar_classification() {
        assert!(parse("null").is_scalar());
        assert!(parse("true").is_scalar());
        assert!(parse("1").is_scalar());
        assert!(parse(r#""x""#).is_scalar());
        assert!(!parse("[1]").is_scalar());
        assert!(!parse("{}").is_scalar());
    }

    #[test]
    fn test_numeric_classification() {
        assert!(parse("0").is_numeric());
        assert!(parse("1.5").is_numeric());
        assert!(!parse(r#""1""#).is_numeric());
        assert!(!parse("true").is_numeric());
    }

    #[test]
    fn test_scalar_array() {
        assert!(parse("[]").is_scalar_array());
        assert!(parse(r#"["guest", null, 1, false]"#).is_scalar_array());
        assert!(!parse(r#"[{"hacker": 1}, "OPEN"]"#).is_scalar_array());
        assert!(!parse("[[1]]").is_scalar_array());
        assert!(!parse(r#""text""#).is_scalar_array());
    }

    #[test]
    fn test_object_array() {
        assert_eq!(parse(r#"[{"a": 1}, {}]"#).as_object_array().map(|v| v.len()), Some(2));
        assert!(parse(r#"[{"a": 1}, 2]"#).as_object_array().is_none());
        assert!(parse(r#"{"a": 1}"#).as_object_array().is_none());
    }

    #[test]
    fn test_depth_limit() {
        let at_limit: JsonValue = json::from_str(&nested_arrays(3)).unwrap();
        assert!(FilterValue::from_json_with_depth(&at_limit, 3).is_ok());

        let too_deep: JsonValue = json::from_str(&nested_arrays(4)).unwrap();
        assert_eq!(
            FilterValue::from_json_with_depth(&too_deep, 3),
            Err(FilterError::too_deep(3))
        );

        let objects: JsonValue = json::from_str(r#"{"a": {"b": {"c": 1}}}"#).unwrap();
        assert!(FilterValue::from_json_with_depth(&objects, 3).is_ok());
        assert!(FilterValue::from_json_with_depth(&objects, 2).is_err());
    }

    #[test]
    fn test_very_deep_input_is_rejected() {
        let json: JsonValue = json::from_str(&nested_arrays(100_000)).unwrap();
        assert_eq!(
            FilterValue::from_json(&json),
            Err(FilterError::too_deep(DEFAULT_MAX_DEPTH))
        );
    }

    #[test]
    fn test_scalars_do_not_count_towards_depth() {
        let json: JsonValue = json::from_str("42").unwrap();
        assert!(FilterValue::from_json_with_depth(&json, 1).is_ok());
    }
}
