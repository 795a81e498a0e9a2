//! Security checks applied to every field name in a filter:
//! - identifier validation, so names are safe to write into SQL text
//! - column access policy (allow-all, allow-list, deny-list)

mod access;
mod identifier;

pub use access::AccessPolicy;
pub(crate) use identifier::check_identifier;
pub use identifier::is_valid_sql_identifier;
