use bson::Document;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::pagination::Pagination;

pub(crate) const DEFAULT_PAGE_LIMIT: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: Order,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self { field: field.into(), order: Order::Asc }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self { field: field.into(), order: Order::Desc }
    }
}

/// A relation to resolve alongside the matched documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Populate {
    Path(String),
    Nested {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        select: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        populate: Vec<Populate>,
    },
}

impl From<&str> for Populate {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

/// Field projection: `"a b -c"`, `["a", "b"]` or `{"a": 1, "c": 0}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Projection {
    Fields(String),
    List(Vec<String>),
    Map(BTreeMap<String, i32>),
}

/// Options for `find_all`.
///
/// Every option is applied only when present; an absent option leaves the
/// backend's own behaviour untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindOptions {
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub skip: Option<u64>,
    #[serde(default)]
    pub sort: Option<Vec<SortSpec>>,
    #[serde(default)]
    pub populate: Option<Vec<Populate>>,
    #[serde(default)]
    pub select: Option<Projection>,
}

/// A paginated request. `page` and `limit` are both at least 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionQuery {
    #[serde(default)]
    pub filter: Option<Document>,
    #[serde(default)]
    pub sorter: Option<Vec<SortSpec>>,
    pub page: u64,
    pub limit: u64,
}

impl Default for CollectionQuery {
    fn default() -> Self {
        Self { filter: None, sorter: None, page: 1, limit: DEFAULT_PAGE_LIMIT }
    }
}

impl CollectionQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, filter: Document) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn sorter(mut self, sorter: Vec<SortSpec>) -> Self {
        self.sorter = Some(sorter);
        self
    }

    #[must_use]
    pub fn page(mut self, page: u64) -> Self {
        self.page = page.max(1);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit.max(1);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionResponse<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}
