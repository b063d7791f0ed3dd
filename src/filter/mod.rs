// Filter validation and transformation: allow-list, renaming, coercion, grammar.
mod coerce;
mod operators;
mod parse;
mod schema;
mod sort;

pub use coerce::{coerce_date, coerce_date_value};
pub use operators::{ALLOWED_OPERATORS, OPERATOR_SIGIL, is_allowed_operator, is_operator_key};
pub use parse::FilterParser;
pub use schema::{FilterSchema, validate_filter};
pub use sort::parse_sort;

pub(crate) use parse::DEFAULT_MAX_DEPTH;
pub(crate) use sort::DEFAULT_MAX_SORT_FIELDS;
