//! Mapping of filter field names to SQL column references.

use crate::config::ConverterConfig;

/// How a field is stored, which decides how it may be compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnKind {
    /// A regular table column with its native type.
    Plain,
    /// A key of the nested JSONB column, read as text with `->>`.
    Nested,
    /// The unnested array element inside an `$elemMatch` subquery.
    Element,
}

/// A resolved SQL reference for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnRef {
    pub(crate) sql: String,
    pub(crate) kind: ColumnKind,
}

impl ColumnRef {
    pub(crate) const fn is_nested(&self) -> bool {
        matches!(self.kind, ColumnKind::Nested)
    }

    /// The reference, cast with `::numeric` when it is JSONB text.
    pub(crate) fn numeric_if_nested(&self) -> String {
        if self.is_nested() {
            format!("({})::numeric", self.sql)
        } else {
            self.sql.clone()
        }
    }
}

/// Resolves field names against the nested JSONB configuration.
///
/// Field names must already be valid identifiers; they are written into the
/// SQL text as is.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ColumnResolver<'a> {
    config: &'a ConverterConfig,
}

impl<'a> ColumnResolver<'a> {
    pub(crate) const fn new(config: &'a ConverterConfig) -> Self {
        Self { config }
    }

    /// The nested JSONB column name, unless `field` is exempted or nesting is off.
    pub(crate) fn nested_column(&self, field: &str) -> Option<&'a str> {
        self.config
            .nested
            .as_ref()
            .filter(|nested| nested.contains(field))
            .map(|nested| nested.column.as_str())
    }

    /// SQL reference for `field`:
    /// - the `$elemMatch` placeholder: `"<name>"::text`
    /// - plain or exempted fields: `"<field>"`
    /// - nested fields: `"<nested>"->>'<field>'`
    pub(crate) fn resolve(&self, field: &str) -> ColumnRef {
        if field == self.config.placeholder_name {
            return self.element();
        }
        match self.nested_column(field) {
            Some(nested) => ColumnRef {
                sql: format!("\"{nested}\"->>'{field}'"),
                kind: ColumnKind::Nested,
            },
            None => ColumnRef {
                sql: format!("\"{field}\""),
                kind: ColumnKind::Plain,
            },
        }
    }

    /// Reference to the current `$elemMatch` array element, as text.
    pub(crate) fn element(&self) -> ColumnRef {
        ColumnRef {
            sql: format!("\"{}\"::text", self.config.placeholder_name),
            kind: ColumnKind::Element,
        }
    }

    /// `"<nested>"->'<field>'`: the JSONB value itself rather than its text.
    pub(crate) fn nested_json(nested: &str, field: &str) -> String {
        format!("\"{nested}\"->'{field}'")
    }

    /// `jsonb_path_match("<nested>", 'exists($.<field>)')`
    pub(crate) fn key_exists(nested: &str, field: &str) -> String {
        format!("jsonb_path_match(\"{nested}\", 'exists($.{field})')")
    }
}
