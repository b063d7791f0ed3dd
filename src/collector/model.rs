//! The query-execution capability the collector drives.
//!
//! A backend (a database driver adapter, an in-memory store, a test double)
//! implements [`QueryModel`] plus the two chainable builders. Aggregation and
//! distinct are optional: the provided methods return `None`, and the collector
//! reports `CapabilityUnsupported` when it meets one.

use bson::{Bson, Document};
use std::future::Future;
use std::pin::Pin;

use super::types::{Populate, Projection, SortSpec};
use crate::errors::GateError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Chainable find query.
pub trait FindQuery: Sized {
    type Item;

    fn skip(self, n: u64) -> Self;
    fn limit(self, n: u64) -> Self;
    fn sort(self, spec: &[SortSpec]) -> Self;
    fn populate(self, relations: &[Populate]) -> Self;
    fn select(self, projection: &Projection) -> Self;
    /// Return plain documents instead of backend-managed entities.
    fn lean(self) -> Self;
    fn exec(self) -> impl Future<Output = Result<Vec<Self::Item>, GateError>> + Send;
}

/// Chainable count query.
pub trait CountQuery: Sized {
    /// Stop counting after `n` matches.
    fn limit(self, n: u64) -> Self;
    fn exec(self) -> impl Future<Output = Result<u64, GateError>> + Send;
}

pub trait QueryModel {
    type Item;
    type Find: FindQuery<Item = Self::Item>;
    type Count: CountQuery;

    fn count_documents(&self, filter: Document) -> Self::Count;
    fn find(&self, filter: Document) -> Self::Find;

    fn aggregate(
        &self,
        _pipeline: Vec<Document>,
    ) -> Option<BoxFuture<'_, Result<Vec<Document>, GateError>>> {
        None
    }

    fn distinct<'a>(
        &'a self,
        _field: &'a str,
        _filter: Document,
    ) -> Option<BoxFuture<'a, Result<Vec<Bson>, GateError>>> {
        None
    }
}
