use bson::{Bson, Document};

use super::coerce::coerce_date_value;
use super::operators::{is_allowed_operator, is_operator_key};
use super::schema::FilterSchema;
use crate::config::GateConfig;
use crate::errors::GateError;
use crate::registry::{PropertyLookup, ValueType};

pub(crate) const DEFAULT_MAX_DEPTH: usize = 32;

/// Turns an untrusted filter into a canonical one for a single entity type.
///
/// The tree is rebuilt rather than edited: each property key is resolved through the
/// registry and replaced by its canonical name, date-typed values are coerced, and
/// every operator key is checked against the allow-list. The rebuilt tree is then
/// checked against [`FilterSchema`].
pub struct FilterParser<'a, R: PropertyLookup + ?Sized> {
    props: &'a R,
    schema: FilterSchema,
    max_depth: usize,
}

impl<'a, R: PropertyLookup + ?Sized> FilterParser<'a, R> {
    pub fn new(props: &'a R) -> Self {
        Self { props, schema: FilterSchema::new(), max_depth: DEFAULT_MAX_DEPTH }
    }

    #[must_use]
    pub fn with_config(mut self, config: &GateConfig) -> Self {
        self.max_depth = config.max_filter_depth;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn properties(&self) -> &'a R {
        self.props
    }

    /// Parses a filter. An absent or empty filter yields an empty document.
    ///
    /// # Errors
    /// Returns `UnknownProperty`, `DisallowedOperator`, `InvalidDate` or
    /// `SchemaViolation`; nothing is partially applied.
    pub fn parse(&self, raw: Option<&Document>) -> Result<Document, GateError> {
        let Some(raw) = raw.filter(|d| !d.is_empty()) else {
            return Ok(Document::new());
        };
        let result = self.transform_doc(raw, "filter", 1).and_then(|canonical| {
            self.schema.validate(&canonical)?;
            Ok(canonical)
        });
        if let Err(e) = &result {
            log::warn!(target: "docgate::audit", "filter rejected: {e}");
        }
        result
    }

    fn transform(&self, value: &Bson, path: &str, depth: usize) -> Result<Bson, GateError> {
        match value {
            Bson::Array(items) => {
                self.check_depth(path, depth)?;
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.transform(item, &format!("{path}[{i}]"), depth + 1))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Bson::Array)
            }
            Bson::Document(doc) => self.transform_doc(doc, path, depth).map(Bson::Document),
            other => Ok(other.clone()),
        }
    }

    fn transform_doc(&self, doc: &Document, path: &str, depth: usize) -> Result<Document, GateError> {
        self.check_depth(path, depth)?;
        let mut out = Document::new();
        for (key, value) in doc {
            let at = format!("{path}.{key}");
            if is_operator_key(key) {
                if !is_allowed_operator(key) {
                    return Err(GateError::DisallowedOperator(key.clone()));
                }
                out.insert(key.clone(), self.transform(value, &at, depth + 1)?);
                continue;
            }
            let prop = self
                .props
                .lookup(key)
                .filter(|p| p.filterable)
                .ok_or_else(|| GateError::UnknownProperty(key.clone()))?;
            let value = match prop.value_type {
                ValueType::Date => coerce_date_value(key, value)?,
                ValueType::Plain => value.clone(),
            };
            let value = self.transform(&value, &at, depth + 1)?;
            if out.insert(prop.canonical_name.clone(), value).is_some() {
                return Err(GateError::schema(
                    format!("{path}.{}", prop.canonical_name),
                    "duplicate property",
                ));
            }
        }
        Ok(out)
    }

    fn check_depth(&self, path: &str, depth: usize) -> Result<(), GateError> {
        if depth > self.max_depth {
            return Err(GateError::schema(
                path,
                format!("filter nesting exceeds {} levels", self.max_depth),
            ));
        }
        Ok(())
    }
}
