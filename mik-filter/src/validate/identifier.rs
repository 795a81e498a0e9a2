//! Field name validation for SQL injection prevention.
//!
//! Field names are written into the SQL text (values are always bound), so
//! every name must pass this check before it reaches any `format!`.

use crate::FilterError;

/// Validate that a string is a safe SQL identifier.
///
/// A valid identifier:
/// - is not empty
/// - starts with an ASCII letter or underscore
/// - contains only ASCII letters, digits and underscores
///
/// # Examples
///
/// ```
/// use mik_filter::is_valid_sql_identifier;
///
/// assert!(is_valid_sql_identifier("users"));
/// assert!(is_valid_sql_identifier("playerCount"));
/// assert!(is_valid_sql_identifier("_private"));
///
/// assert!(!is_valid_sql_identifier(""));
/// assert!(!is_valid_sql_identifier("123abc"));
/// assert!(!is_valid_sql_identifier("user.id"));
/// assert!(!is_valid_sql_identifier("\"bla = 1 --"));
/// ```
#[inline]
#[must_use]
pub fn is_valid_sql_identifier(s: &str) -> bool {
    let mut chars = s.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {},
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// [`is_valid_sql_identifier`] as a `Result`.
pub(crate) fn check_identifier(s: &str) -> Result<(), FilterError> {
    if is_valid_sql_identifier(s) {
        Ok(())
    } else {
        Err(FilterError::InvalidIdentifier(s.to_string()))
    }
}
