// =============================================================================
// CRATE-LEVEL QUALITY LINTS (following Tokio/Serde standards)
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION
// =============================================================================
#![allow(clippy::doc_markdown)] // Code items in docs - extensive doc changes needed
#![allow(clippy::missing_errors_doc)] // # Errors sections - doc-heavy
#![allow(clippy::missing_panics_doc)] // # Panics sections - doc-heavy
#![allow(clippy::module_name_repetitions)] // Type names matching module - acceptable
#![allow(clippy::return_self_not_must_use)] // Builder pattern methods return Self
#![allow(clippy::must_use_candidate)] // Builder methods - fluent API doesn't need must_use
#![allow(clippy::match_same_arms)] // Intentional for clarity in some match expressions
#![allow(clippy::format_push_string)] // String building style preference
#![allow(clippy::cast_precision_loss)] // u64 beyond i64::MAX is bound as f64
#![allow(clippy::double_must_use)] // Functions returning must_use types can have their own docs

//! # mik-filter - Mongo-style JSON filters to Postgres conditions
//!
//! Turns a JSON filter document such as
//! `{"status": {"$in": ["NEW", "OPEN"]}, "age": {"$gte": 21}}` into a
//! parameterized boolean expression for a `WHERE` clause, plus the values to
//! bind to its `$N` placeholders. Field names are validated and access-checked,
//! values are never written into the SQL text.
//!
//! ## Quick Start
//!
//! ```
//! use mik_filter::{Converter, Value};
//!
//! let converter = Converter::builder()
//!     .allow_columns(&["name", "status"])
//!     .build()
//!     .unwrap();
//!
//! let result = converter
//!     .convert_str(r#"{"$or": [{"name": "John"}, {"status": {"$in": ["NEW"]}}]}"#, 1)
//!     .unwrap();
//!
//! assert_eq!(result.conditions, r#"(("name" = $1) OR ("status" = ANY($2)))"#);
//! assert_eq!(result.values[0], Value::String("John".into()));
//! ```
//!
//! ## Nested JSONB Columns
//!
//! With [`ConverterBuilder::nested_jsonb`] every field except the exemptions
//! is read from one JSONB column:
//!
//! ```
//! use mik_filter::Converter;
//!
//! let converter = Converter::builder()
//!     .nested_jsonb("meta", &["created_at"])
//!     .build()
//!     .unwrap();
//!
//! let result = converter
//!     .convert_str(r#"{"created_at": {"$gte": "2020-01-01T00:00:00Z"}, "name": "John"}"#, 1)
//!     .unwrap();
//!
//! assert_eq!(
//!     result.conditions,
//!     r#"(("created_at" >= $1) AND ("meta"->>'name' = $2))"#
//! );
//! ```
//!
//! Numeric operands against nested fields compare numerically:
//! `{"score": {"$gt": 5}}` becomes `(("meta"->>'score')::numeric > $1)`.
//!
//! ## Supported Operators
//!
//! | Operator | SQL | Example |
//! |----------|-----|---------|
//! | `$eq` | `=` | `"status": { "$eq": "active" }` |
//! | `$ne` | `!=` | `"status": { "$ne": "deleted" }` |
//! | `$gt` | `>` | `"age": { "$gt": 18 }` |
//! | `$gte` | `>=` | `"age": { "$gte": 21 }` |
//! | `$lt` | `<` | `"price": { "$lt": 100 }` |
//! | `$lte` | `<=` | `"price": { "$lte": 50 }` |
//! | `$regex` | `~*` | `"name": { "$regex": "^jo" }` |
//! | `$in` | `= ANY($1)` | `"status": { "$in": ["a", "b"] }` |
//! | `$nin` | `NOT .. = ANY($1)` | `"status": { "$nin": ["x"] }` |
//! | `$exists` | `jsonb_path_match` | `"name": { "$exists": false }` |
//! | `$elemMatch` | `EXISTS (SELECT 1 FROM unnest(..))` | `"tags": { "$elemMatch": "red" }` |
//! | `$field` | column comparison | `"a": { "$gt": { "$field": "b" } }` |
//! | `$and` `$or` `$nor` | `AND` / `OR` / `NOT (.. OR ..)` | `"$or": [{..}, {..}]` |
//! | `$not` | `NOT COALESCE(.., FALSE)` | `"$not": { "name": "x" }` |
//!
//! Keys of an object are processed in lexicographic order, so the same filter
//! always produces the same SQL.

mod column;
mod config;
mod convert;
mod error;
mod operator;
mod validate;
mod value;

pub use config::{
    ArrayEncoder, ConverterBuilder, ConverterConfig, DEFAULT_EMPTY_CONDITION, DEFAULT_MAX_DEPTH,
    DEFAULT_PLACEHOLDER_NAME, NestedJsonb, PgArrayLiteral,
};
pub use convert::{Conversion, Converter, SortDir, SortField};
pub use error::FilterError;
pub use operator::Operator;
pub use validate::{AccessPolicy, is_valid_sql_identifier};
pub use value::{FilterValue, Number, Value};

/// Re-export miniserde's json module, used to decode filters.
///
/// # Example
///
/// ```
/// use mik_filter::{FilterValue, json};
///
/// let value: json::Value = json::from_str(r#"{"name": "Alice"}"#).unwrap();
/// assert!(matches!(FilterValue::from_json(&value), Ok(FilterValue::Object(_))));
/// ```
pub use miniserde::json;

/// Prelude module for convenient imports.
///
/// ```
/// use mik_filter::prelude::*;
///
/// let converter = Converter::builder().allow_all_columns().build().unwrap();
/// let result = converter.convert(b"{}", 1).unwrap();
/// assert_eq!(result.conditions, DEFAULT_EMPTY_CONDITION);
/// ```
pub mod prelude {
    pub use crate::{
        ArrayEncoder, Conversion, Converter, ConverterBuilder, DEFAULT_EMPTY_CONDITION,
        FilterError, PgArrayLiteral, SortDir, SortField, Value,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readme_example() {
        let converter = Converter::builder()
            .nested_jsonb("meta", &[])
            .build()
            .unwrap();
        let filter = r#"{
            "$or": [
                { "map": { "$regex": "aztec" } },
                { "map": { "$regex": "nuke" } }
            ],
            "password": "",
            "playerCount": { "$gte": 2, "$lt": 10 }
        }"#;

        let result = converter.convert_str(filter, 1).unwrap();

        assert_eq!(
            result.conditions,
            concat!(
                r#"((("meta"->>'map' ~* $1) OR ("meta"->>'map' ~* $2)) AND "#,
                r#"("meta"->>'password' = $3) AND "#,
                r#"((("meta"->>'playerCount')::numeric >= $4) AND (("meta"->>'playerCount')::numeric < $5)))"#,
            )
        );
        assert_eq!(
            result.values,
            vec![
                Value::String("aztec".into()),
                Value::String("nuke".into()),
                Value::String(String::new()),
                Value::Int(2),
                Value::Int(10),
            ]
        );
    }

    #[test]
    fn test_shared_across_threads() {
        let converter = std::sync::Arc::new(
            Converter::builder().allow_all_columns().build().unwrap(),
        );
        let handles: Vec<_> = (1..=4)
            .map(|start| {
                let converter = std::sync::Arc::clone(&converter);
                std::thread::spawn(move || {
                    converter.convert_str(r#"{"a": 1}"#, start).unwrap().conditions
                })
            })
            .collect();
        let results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, ["(\"a\" = $1)", "(\"a\" = $2)", "(\"a\" = $3)", "(\"a\" = $4)"]);
    }
}

// ============================================================================
// API Contract Tests (compile-time assertions)
// ============================================================================
