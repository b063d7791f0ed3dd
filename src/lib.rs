//! Allow-listed filter validation and scoped query collection.
//!
//! Untrusted callers send a JSON filter; [`filter::FilterParser`] resolves every
//! property through a [`registry::PropertyRegistry`], coerces typed values, checks
//! every operator against a fixed allow-list and validates the result against the
//! filter grammar. [`collector::DocumentCollector`] then conjoins that filter with a
//! trusted scope and drives a pluggable [`collector::QueryModel`] backend.

pub mod collector;
pub mod config;
pub mod errors;
pub mod filter;
pub mod logger;
pub mod registry;
pub mod wire;

pub use collector::{
    CollectionQuery, CollectionResponse, DocumentCollector, FindOptions, Order, Pagination,
    Populate, Projection, QueryModel, SortSpec, scoped_filter,
};
pub use config::GateConfig;
pub use errors::{Capability, GateError};
pub use filter::{FilterParser, FilterSchema};
pub use registry::{Expose, PropertyDescriptor, PropertyLookup, PropertyRegistry, ValueType};
pub use wire::{QueryParams, decode_filter};

/// Loads configuration and installs logging from it.
///
/// # Errors
/// Returns `GateError::Config` when the config cannot be loaded or logging cannot be installed.
pub fn init(config_path: Option<&std::path::Path>) -> Result<GateConfig, GateError> {
    let cfg = GateConfig::load(config_path)?;
    logger::configure_from_config(&cfg.log)?;
    Ok(cfg)
}
