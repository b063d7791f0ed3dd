use bson::{Bson, Document};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::operators::VALUE_OPERATORS;
use crate::errors::GateError;

// Naive timestamps are read as UTC.
const NAIVE_FORMATS: &[&str] =
    &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// Coerces the value attached to a date-typed property.
///
/// Mappings have every value-bearing operand coerced (recursing through `$not`);
/// arrays have each element coerced; anything else is coerced directly.
///
/// # Errors
/// Returns `GateError::InvalidDate` when a leaf cannot be read as a date.
pub fn coerce_date_value(property: &str, value: &Bson) -> Result<Bson, GateError> {
    match value {
        Bson::Document(doc) => coerce_operands(property, doc).map(Bson::Document),
        Bson::Array(items) => items
            .iter()
            .map(|v| coerce_date(property, v))
            .collect::<Result<Vec<_>, _>>()
            .map(Bson::Array),
        other => coerce_date(property, other),
    }
}

fn coerce_operands(property: &str, doc: &Document) -> Result<Document, GateError> {
    let mut out = Document::new();
    for (key, value) in doc {
        let value = if key == "$not" || VALUE_OPERATORS.contains(&key.as_str()) {
            coerce_date_value(property, value)?
        } else {
            value.clone()
        };
        out.insert(key.clone(), value);
    }
    Ok(out)
}

/// Coerces one leaf. `null`, `"null"` and `""` all mean an explicit null.
///
/// Mappings are returned unchanged; the operator and grammar checks decide
/// what they mean.
///
/// # Errors
/// Returns `GateError::InvalidDate` for unparseable strings and non-date types.
pub fn coerce_date(property: &str, value: &Bson) -> Result<Bson, GateError> {
    let millis = match value {
        Bson::Null => return Ok(Bson::Null),
        Bson::String(s) if s.is_empty() || s == "null" => return Ok(Bson::Null),
        Bson::DateTime(_) | Bson::Document(_) => return Ok(value.clone()),
        Bson::String(s) => parse_date_millis(s.trim()),
        Bson::Int32(n) => Some(i64::from(*n)),
        Bson::Int64(n) => Some(*n),
        #[allow(clippy::cast_possible_truncation)]
        Bson::Double(f) if f.is_finite() => Some(f.trunc() as i64),
        _ => None,
    };
    millis.map(|ms| Bson::DateTime(bson::DateTime::from_millis(ms))).ok_or_else(|| {
        GateError::InvalidDate { property: property.to_string(), value: value.to_string() }
    })
}

fn parse_date_millis(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis());
    }
    DateTime::parse_from_rfc2822(s).ok().map(|dt| dt.timestamp_millis())
}
