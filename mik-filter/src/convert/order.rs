//! ORDER BY lists from sort strings like `"name,-created_at"`.

use super::Converter;
use super::translate::Translator;
use crate::FilterError;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SortDir {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortDir {
    /// SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Sort field with direction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SortField {
    /// Field name as written in the sort string.
    pub field: String,
    /// Direction.
    pub dir: SortDir,
}

impl SortField {
    /// Create a new sort field.
    pub fn new(field: impl Into<String>, dir: SortDir) -> Self {
        Self {
            field: field.into(),
            dir,
        }
    }

    /// Parse a sort string: comma separated fields, `-` prefix for descending.
    ///
    /// Blank entries are skipped. Field names are not validated here.
    ///
    /// ```
    /// use mik_filter::{SortDir, SortField};
    ///
    /// let fields = SortField::parse_list("name, -created_at,");
    /// assert_eq!(fields, vec![
    ///     SortField::new("name", SortDir::Asc),
    ///     SortField::new("created_at", SortDir::Desc),
    /// ]);
    /// ```
    #[must_use]
    pub fn parse_list(sort: &str) -> Vec<Self> {
        sort.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| match part.strip_prefix('-') {
                Some(stripped) => Self::new(stripped, SortDir::Desc),
                None => Self::new(part, SortDir::Asc),
            })
            .collect()
    }
}

impl Converter {
    /// Turn a sort string into an ORDER BY list (without the keywords).
    ///
    /// Fields go through the same identifier, access and nested column
    /// handling as filter fields. An empty sort string gives an empty list.
    ///
    /// ```
    /// use mik_filter::Converter;
    ///
    /// let converter = Converter::builder()
    ///     .nested_jsonb("meta", &["name"])
    ///     .build()
    ///     .unwrap();
    ///
    /// let order = converter.convert_order_by("name,-created_at").unwrap();
    /// assert_eq!(order, r#""name" ASC, "meta"->>'created_at' DESC"#);
    /// ```
    pub fn convert_order_by(&self, sort: &str) -> Result<String, FilterError> {
        let translator = Translator::new(&self.config, 1);
        let mut parts = Vec::new();

        for SortField { field, dir } in SortField::parse_list(sort) {
            let column = translator.user_column(&field).inspect_err(|e| {
                tracing::debug!(error = e.kind(), "sort rejected");
            })?;
            parts.push(format!("{} {}", column.sql, dir.as_sql()));
        }

        Ok(parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        assert_eq!(
            SortField::parse_list("-a,b"),
            vec![SortField::new("a", SortDir::Desc), SortField::new("b", SortDir::Asc)]
        );
        assert!(SortField::parse_list("").is_empty());
        assert!(SortField::parse_list(" , ,").is_empty());
    }

    #[test]
    fn test_order_by_plain_columns() {
        let converter = Converter::builder().allow_all_columns().build().unwrap();
        assert_eq!(
            converter.convert_order_by("-created_at,name").unwrap(),
            r#""created_at" DESC, "name" ASC"#
        );
        assert_eq!(converter.convert_order_by("").unwrap(), "");
    }

    #[test]
    fn test_order_by_keeps_field_order() {
        let converter = Converter::builder().allow_all_columns().build().unwrap();
        assert_eq!(
            converter.convert_order_by("z,a,m").unwrap(),
            r#""z" ASC, "a" ASC, "m" ASC"#
        );
    }

    #[test]
    fn test_order_by_nested() {
        let converter = Converter::builder()
            .nested_jsonb("meta", &["id"])
            .build()
            .unwrap();
        assert_eq!(
            converter.convert_order_by("id,-score").unwrap(),
            r#""id" ASC, "meta"->>'score' DESC"#
        );
    }

    #[test]
    fn test_order_by_rejects_bad_fields() {
        let converter = Converter::builder()
            .allow_columns(&["name"])
            .build()
            .unwrap();
        assert_eq!(
            converter.convert_order_by("name,-password"),
            Err(FilterError::AccessDenied {
                column: "password".into()
            })
        );
        assert!(matches!(
            converter.convert_order_by("name; DROP TABLE users"),
            Err(FilterError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            converter.convert_order_by("--name"),
            Err(FilterError::InvalidIdentifier(_))
        ));
    }
}
