//! Structural grammar for canonical filter trees.
//!
//! Runs after renaming and coercion, so it never needs to know which property
//! names an entity exposes; it only checks that each clause has a legal shape.
//!
//! ```text
//! Props      := { field: Scalar, ... } | { field: Comparison, ... }
//!             | { field: [Scalar], ... } | { field: Logical, ... }
//!             | { ("$and"|"$or"|"$nor"): [Props], ... }
//! Logical    := { "$not": Comparison }
//! Comparison := { "$regex": string, "$options"?: /^[imxs]*$/ }
//!             | { "$elemMatch": Props }
//!             | { "$size": number >= 0 }
//!             | { "$type": string | number }
//!             | { "$all": [Scalar] }
//!             | { any of $exists,$eq,$ne,$gt,$gte,$lt,$lte,$in,$nin,$not }
//! ```
//!
//! Every entry of one mapping must take the same alternative of `Props`.

use bson::{Bson, Document};

use super::operators::LOGICAL_OPERATORS;
use crate::errors::GateError;

const REGEX_FLAGS: &[char] = &['i', 'm', 'x', 's'];

/// Validates a fully transformed filter. Stateless; one instance can be shared.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterSchema;

impl FilterSchema {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// # Errors
    /// Returns `GateError::SchemaViolation` naming the path of the first illegal clause.
    pub fn validate(&self, filter: &Document) -> Result<(), GateError> {
        props(filter, "filter")
    }
}

/// # Errors
/// See [`FilterSchema::validate`].
pub fn validate_filter(filter: &Document) -> Result<(), GateError> {
    FilterSchema.validate(filter)
}

fn is_field_name(key: &str) -> bool {
    key.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
}

fn is_number(v: &Bson) -> bool {
    matches!(v, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_))
}

// Coerced dates count as scalars.
fn is_scalar(v: &Bson) -> bool {
    is_number(v) || matches!(v, Bson::String(_) | Bson::Boolean(_) | Bson::Null | Bson::DateTime(_))
}

fn is_range_operand(v: &Bson) -> bool {
    is_number(v) || matches!(v, Bson::String(_) | Bson::Document(_) | Bson::DateTime(_))
}

/// The `Props` alternative a single mapping entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clause {
    Combinator,
    Scalar,
    ScalarArray,
    Comparison,
}

impl Clause {
    fn label(self) -> &'static str {
        match self {
            Self::Combinator => "logical combinator",
            Self::Scalar => "scalar",
            Self::ScalarArray => "array",
            Self::Comparison => "comparison",
        }
    }
}

fn classify(key: &str, value: &Bson, at: &str) -> Result<Clause, GateError> {
    if LOGICAL_OPERATORS.contains(&key) {
        return Ok(Clause::Combinator);
    }
    if !is_field_name(key) {
        return Err(GateError::schema(at, "not a field name or logical operator"));
    }
    match value {
        v if is_scalar(v) => Ok(Clause::Scalar),
        Bson::Array(_) => Ok(Clause::ScalarArray),
        Bson::Document(_) => Ok(Clause::Comparison),
        other => Err(GateError::schema(at, format!("unsupported value type {:?}", other.element_type()))),
    }
}

fn props(doc: &Document, path: &str) -> Result<(), GateError> {
    let mut shape: Option<Clause> = None;
    for (key, value) in doc {
        let at = format!("{path}.{key}");
        let clause = classify(key, value, &at)?;
        match shape {
            None => shape = Some(clause),
            Some(first) if first != clause => {
                return Err(GateError::schema(
                    at,
                    format!("cannot mix {} and {} clauses in one filter object", first.label(), clause.label()),
                ));
            }
            Some(_) => {}
        }
        match (clause, value) {
            (Clause::Combinator, Bson::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    let item_at = format!("{at}[{i}]");
                    match item {
                        Bson::Document(d) => props(d, &item_at)?,
                        _ => return Err(GateError::schema(item_at, "expected a filter object")),
                    }
                }
            }
            (Clause::Combinator, _) => return Err(GateError::schema(at, "expected an array of filters")),
            (Clause::ScalarArray, Bson::Array(items)) => scalar_array(items, &at)?,
            (Clause::Comparison, Bson::Document(d)) => comparison(d, &at)?,
            _ => {}
        }
    }
    Ok(())
}

fn scalar_array(items: &[Bson], at: &str) -> Result<(), GateError> {
    match items.iter().position(|v| !is_scalar(v)) {
        Some(i) => Err(GateError::schema(format!("{at}[{i}]"), "expected a scalar")),
        None => Ok(()),
    }
}

fn only_keys(doc: &Document, allowed: &[&str], at: &str) -> Result<(), GateError> {
    match doc.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(k) => Err(GateError::schema(
            format!("{at}.{k}"),
            format!("cannot be combined with {}", allowed.join(", ")),
        )),
        None => Ok(()),
    }
}

fn comparison(doc: &Document, at: &str) -> Result<(), GateError> {
    if let Some(pattern) = doc.get("$regex") {
        only_keys(doc, &["$regex", "$options"], at)?;
        if !matches!(pattern, Bson::String(_)) {
            return Err(GateError::schema(format!("{at}.$regex"), "expected a string"));
        }
        return match doc.get("$options") {
            None => Ok(()),
            Some(Bson::String(flags)) if flags.chars().all(|c| REGEX_FLAGS.contains(&c)) => Ok(()),
            Some(_) => Err(GateError::schema(format!("{at}.$options"), "expected flags from [imxs]")),
        };
    }
    if let Some(inner) = doc.get("$elemMatch") {
        only_keys(doc, &["$elemMatch"], at)?;
        let at = format!("{at}.$elemMatch");
        return match inner {
            Bson::Document(d) => props(d, &at),
            _ => Err(GateError::schema(at, "expected a filter object")),
        };
    }
    if let Some(size) = doc.get("$size") {
        only_keys(doc, &["$size"], at)?;
        let ok = match size {
            Bson::Int32(n) => *n >= 0,
            Bson::Int64(n) => *n >= 0,
            Bson::Double(f) => *f >= 0.0,
            _ => false,
        };
        return if ok { Ok(()) } else { Err(GateError::schema(format!("{at}.$size"), "expected a number >= 0")) };
    }
    if let Some(ty) = doc.get("$type") {
        only_keys(doc, &["$type"], at)?;
        return if matches!(ty, Bson::String(_)) || is_number(ty) {
            Ok(())
        } else {
            Err(GateError::schema(format!("{at}.$type"), "expected a string or number"))
        };
    }
    if doc.contains_key("$all") {
        only_keys(doc, &["$all"], at)?;
    }
    for (key, value) in doc {
        let op_at = format!("{at}.{key}");
        match key.as_str() {
            "$exists" if !matches!(value, Bson::Boolean(_)) => {
                return Err(GateError::schema(op_at, "expected a boolean"));
            }
            "$eq" | "$ne" if !is_scalar(value) => {
                return Err(GateError::schema(op_at, "expected a scalar"));
            }
            "$gt" | "$gte" | "$lt" | "$lte" if !is_range_operand(value) => {
                return Err(GateError::schema(op_at, "expected a string, number or object"));
            }
            "$in" | "$nin" | "$all" => match value {
                Bson::Array(items) => scalar_array(items, &op_at)?,
                _ => return Err(GateError::schema(op_at, "expected an array of scalars")),
            },
            "$not" => match value {
                Bson::Document(d) => comparison(d, &op_at)?,
                _ => return Err(GateError::schema(op_at, "expected a comparison object")),
            },
            "$exists" | "$eq" | "$ne" | "$gt" | "$gte" | "$lt" | "$lte" => {}
            _ => return Err(GateError::schema(op_at, "operator not allowed in a comparison")),
        }
    }
    Ok(())
}
