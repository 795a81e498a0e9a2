//! Column access policy.

use crate::FilterError;

/// Which columns a filter may reference.
///
/// Checked in this order:
/// 1. disallowed columns are always rejected
/// 2. `allow_all` permits everything else
/// 3. a nested JSONB mapping permits everything else
/// 4. the allow-list is consulted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    pub(crate) allow_all: bool,
    pub(crate) nested: bool,
    pub(crate) allowed: Vec<String>,
    pub(crate) disallowed: Vec<String>,
}

impl AccessPolicy {
    /// Whether at least one option grants access to some column.
    pub(crate) fn grants_access(&self) -> bool {
        self.allow_all || self.nested || !self.allowed.is_empty()
    }

    /// Whether `column` may be filtered on.
    #[must_use]
    pub fn is_allowed(&self, column: &str) -> bool {
        if self.disallowed.iter().any(|c| c == column) {
            return false;
        }
        if self.allow_all || self.nested {
            return true;
        }
        self.allowed.iter().any(|c| c == column)
    }

    /// [`is_allowed`](Self::is_allowed) as a `Result`.
    pub fn check(&self, column: &str) -> Result<(), FilterError> {
        if self.is_allowed(column) {
            Ok(())
        } else {
            Err(FilterError::AccessDenied {
                column: column.to_string(),
            })
        }
    }

    /// Allow-listed columns.
    #[must_use]
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    /// Deny-listed columns.
    #[must_use]
    pub fn disallowed(&self) -> &[String] {
        &self.disallowed
    }
}
