/// Marks a key as an operator rather than a property name.
pub const OPERATOR_SIGIL: char = '$';

/// Every operator key a filter may contain, at any depth.
pub const ALLOWED_OPERATORS: &[&str] = &[
    "$eq", "$gt", "$gte", "$in", "$lt", "$lte", "$ne", "$nin", "$and", "$not", "$nor", "$or",
    "$regex", "$exists", "$size", "$type", "$all", "$elemMatch", "$options",
];

/// Combinators whose operand is an array of nested filters.
pub(crate) const LOGICAL_OPERATORS: &[&str] = &["$and", "$or", "$nor"];

/// Operators whose operands are compared against stored values (and so take coerced values).
pub(crate) const VALUE_OPERATORS: &[&str] =
    &["$eq", "$ne", "$gt", "$gte", "$lt", "$lte", "$in", "$nin", "$all"];

#[must_use]
pub fn is_operator_key(key: &str) -> bool {
    key.starts_with(OPERATOR_SIGIL)
}

#[must_use]
pub fn is_allowed_operator(key: &str) -> bool {
    ALLOWED_OPERATORS.contains(&key)
}
