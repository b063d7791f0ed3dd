use bson::{Bson, Document};

use super::model::{CountQuery, FindQuery, QueryModel};
use super::pagination::Pagination;
use super::trace::{CollectorOp, OpTrace};
use super::types::{CollectionQuery, CollectionResponse, FindOptions, Populate, SortSpec};
use crate::config::GateConfig;
use crate::errors::{Capability, GateError};

pub(crate) const DEFAULT_IDENTITY_FIELD: &str = "_id";

/// Conjoins a caller filter with a trusted scope.
///
/// An absent or empty scope returns the caller filter untouched; otherwise the
/// result is `{ "$and": [filter, scope] }`.
#[must_use]
pub fn scoped_filter(user_filter: Document, scope: Option<&Document>) -> Document {
    match scope {
        Some(scope) if !scope.is_empty() => {
            let mut combined = Document::new();
            combined.insert("$and", vec![Bson::Document(user_filter), Bson::Document(scope.clone())]);
            combined
        }
        _ => user_filter,
    }
}

fn is_scoped(scope: Option<&Document>) -> bool {
    scope.is_some_and(|s| !s.is_empty())
}

/// Scoped, paginated access to one collection of a [`QueryModel`].
pub struct DocumentCollector<M> {
    model: M,
    identity_field: String,
}

impl<M: QueryModel> DocumentCollector<M> {
    pub fn new(model: M) -> Self {
        Self { model, identity_field: DEFAULT_IDENTITY_FIELD.to_string() }
    }

    #[must_use]
    pub fn with_config(mut self, config: &GateConfig) -> Self {
        self.identity_field.clone_from(&config.identity_field);
        self
    }

    /// Unique field appended to every sort so page boundaries stay stable.
    #[must_use]
    pub fn with_identity_field(mut self, field: impl Into<String>) -> Self {
        self.identity_field = field.into();
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn identity_field(&self) -> &str {
        &self.identity_field
    }

    #[must_use]
    pub fn scoped_filter(&self, user_filter: Document, scope: Option<&Document>) -> Document {
        scoped_filter(user_filter, scope)
    }

    /// Appends an ascending sort on the identity field unless the request already sorts by it.
    #[must_use]
    pub fn stable_sort(&self, sort: &[SortSpec]) -> Vec<SortSpec> {
        let mut out = sort.to_vec();
        if !sort.iter().any(|s| s.field == self.identity_field) {
            out.push(SortSpec::asc(self.identity_field.clone()));
        }
        out
    }

    /// Fetches one page and the total count for the same scoped filter.
    ///
    /// # Errors
    /// Propagates backend failures unchanged.
    pub async fn find(
        &self,
        query: &CollectionQuery,
        scope: Option<&Document>,
        populate: Option<&[Populate]>,
    ) -> Result<CollectionResponse<M::Item>, GateError> {
        let filter = scoped_filter(query.filter.clone().unwrap_or_default(), scope);
        log::debug!(target: "docgate::collector", "find page={} limit={} filter={}", query.page, query.limit, filter);

        let mut q = self
            .model
            .find(filter.clone())
            .populate(populate.unwrap_or_default())
            .lean()
            .skip(Pagination::offset(query.page, query.limit))
            .limit(query.limit);
        if let Some(sorter) = &query.sorter {
            q = q.sort(&self.stable_sort(sorter));
        }
        let counter = self.model.count_documents(filter);

        let (data, total) = tokio::join!(q.exec(), counter.exec());
        let data = data?;
        let total = total?;
        OpTrace::new(CollectorOp::Find, is_scoped(scope))
            .paged(query.page, query.limit)
            .total(total)
            .returned(data.len())
            .emit();
        Ok(CollectionResponse { data, pagination: Pagination::new(query.page, query.limit, total) })
    }

    /// # Errors
    /// Propagates backend failures unchanged.
    pub async fn count(&self, filter: Document, scope: Option<&Document>) -> Result<u64, GateError> {
        let total = self.model.count_documents(scoped_filter(filter, scope)).exec().await?;
        OpTrace::new(CollectorOp::Count, is_scoped(scope)).total(total).emit();
        Ok(total)
    }

    /// Unpaginated find; each option is applied only when present.
    ///
    /// # Errors
    /// Propagates backend failures unchanged.
    pub async fn find_all(
        &self,
        filter: Document,
        scope: Option<&Document>,
        options: &FindOptions,
    ) -> Result<Vec<M::Item>, GateError> {
        let scoped = is_scoped(scope);
        let filter = scoped_filter(filter, scope);
        log::debug!(target: "docgate::collector", "find_all filter={filter} options={options:?}");

        let mut q = self.model.find(filter).lean();
        if let Some(populate) = &options.populate {
            q = q.populate(populate);
        }
        if let Some(select) = &options.select {
            q = q.select(select);
        }
        if let Some(skip) = options.skip {
            q = q.skip(skip);
        }
        if let Some(limit) = options.limit {
            q = q.limit(limit);
        }
        if let Some(sort) = &options.sort {
            q = q.sort(&self.stable_sort(sort));
        }
        let data = q.exec().await?;
        OpTrace::new(CollectorOp::FindAll, scoped).returned(data.len()).emit();
        Ok(data)
    }

    /// # Errors
    /// Propagates backend failures unchanged.
    pub async fn find_with_limit(
        &self,
        filter: Document,
        limit: u64,
        scope: Option<&Document>,
        populate: Option<Vec<Populate>>,
    ) -> Result<Vec<M::Item>, GateError> {
        let options = FindOptions { limit: Some(limit), populate, ..FindOptions::default() };
        self.find_all(filter, scope, &options).await
    }

    /// First match, or `None`.
    ///
    /// # Errors
    /// Propagates backend failures unchanged.
    pub async fn find_one(
        &self,
        filter: Document,
        scope: Option<&Document>,
        options: &FindOptions,
    ) -> Result<Option<M::Item>, GateError> {
        let options = FindOptions { limit: Some(1), ..options.clone() };
        Ok(self.find_all(filter, scope, &options).await?.into_iter().next())
    }

    /// Counts at most one match.
    ///
    /// # Errors
    /// Propagates backend failures unchanged.
    pub async fn exists(&self, filter: Document, scope: Option<&Document>) -> Result<bool, GateError> {
        let n = self.model.count_documents(scoped_filter(filter, scope)).limit(1).exec().await?;
        OpTrace::new(CollectorOp::Exists, is_scoped(scope)).total(n).emit();
        Ok(n > 0)
    }

    /// # Errors
    /// `CapabilityUnsupported` when the model has no aggregation; backend failures unchanged.
    pub async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>, GateError> {
        let Some(fut) = self.model.aggregate(pipeline) else {
            return Err(GateError::CapabilityUnsupported(Capability::Aggregate));
        };
        let data = fut.await?;
        OpTrace::new(CollectorOp::Aggregate, false).returned(data.len()).emit();
        Ok(data)
    }

    /// # Errors
    /// `CapabilityUnsupported` when the model has no distinct; backend failures unchanged.
    pub async fn distinct(
        &self,
        field: &str,
        filter: Document,
        scope: Option<&Document>,
    ) -> Result<Vec<Bson>, GateError> {
        let Some(fut) = self.model.distinct(field, scoped_filter(filter, scope)) else {
            return Err(GateError::CapabilityUnsupported(Capability::Distinct));
        };
        let values = fut.await?;
        OpTrace::new(CollectorOp::Distinct, is_scoped(scope)).returned(values.len()).emit();
        Ok(values)
    }
}
