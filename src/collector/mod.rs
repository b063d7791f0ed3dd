// Scoped query collection over a pluggable execution backend.
mod core;
mod model;
mod pagination;
mod types;

pub mod trace;

pub use self::core::{DocumentCollector, scoped_filter};
pub use model::{BoxFuture, CountQuery, FindQuery, QueryModel};
pub use pagination::Pagination;
pub use types::{
    CollectionQuery, CollectionResponse, FindOptions, Order, Populate, Projection, SortSpec,
};

pub(crate) use self::core::DEFAULT_IDENTITY_FIELD;
pub(crate) use types::DEFAULT_PAGE_LIMIT;
