//! Transport-side decoding: JSON filter strings and raw query parameters.

use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collector::CollectionQuery;
use crate::config::GateConfig;
use crate::errors::GateError;
use crate::filter::{FilterParser, parse_sort};
use crate::registry::PropertyLookup;

/// Converts a JSON value to BSON node by node.
///
/// No extended-JSON interpretation happens, so `{"$date": ..}` stays an ordinary
/// mapping and is subject to the operator allow-list like any other key.
#[must_use]
pub fn json_to_bson(val: &Value) -> Bson {
    match val {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i32::try_from(i).map_or(Bson::Int64(i), Bson::Int32),
            None => Bson::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        Value::Object(map) => {
            Bson::Document(map.iter().map(|(k, v)| (k.clone(), json_to_bson(v))).collect())
        }
    }
}

/// Decodes a filter sent as a JSON object string.
///
/// # Errors
/// Returns `GateError::Decode` for malformed JSON or a non-object top level.
pub fn decode_filter(json: &str) -> Result<Document, GateError> {
    let val: Value = serde_json::from_str(json).map_err(|e| GateError::Decode(e.to_string()))?;
    match json_to_bson(&val) {
        Bson::Document(doc) => Ok(doc),
        _ => Err(GateError::Decode("expected JSON object".into())),
    }
}

/// Raw paginated-request parameters as they arrive from a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

impl QueryParams {
    /// Decodes, validates and canonicalizes the parameters for one entity.
    ///
    /// # Errors
    /// `Decode` for a malformed filter string, any filter validation error,
    /// `UnsortableProperty` for bad sort fields and `InvalidRequest` for paging
    /// outside `1..=max_limit`.
    pub fn into_query<R: PropertyLookup + ?Sized>(
        self,
        parser: &FilterParser<'_, R>,
        config: &GateConfig,
    ) -> Result<CollectionQuery, GateError> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(GateError::InvalidRequest("page must be at least 1".into()));
        }
        let limit = self.limit.unwrap_or(config.default_limit);
        if limit < 1 || limit > config.max_limit {
            return Err(GateError::InvalidRequest(format!(
                "limit must be between 1 and {}",
                config.max_limit
            )));
        }
        let raw = self.filter.as_deref().map(decode_filter).transpose()?;
        let filter = parser.parse(raw.as_ref())?;
        let sorter = match self.sort.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => {
                Some(parse_sort(s, parser.properties(), config.max_sort_fields)?)
            }
            _ => None,
        };
        Ok(CollectionQuery { filter: Some(filter), sorter, page, limit })
    }
}
