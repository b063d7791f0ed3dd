//! Property exposure registry.
//!
//! Each entity type declares, once, which of its storage fields are visible to
//! callers, under which public name, whether they may appear in a filter, and
//! whether their values need coercion. The parser and the sort parser only read it.

use crate::errors::GateError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    Plain,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub public_name: String,
    pub canonical_name: String,
    pub value_type: ValueType,
    pub filterable: bool,
}

/// Read-only lookup from a public property name to its descriptor.
pub trait PropertyLookup {
    fn lookup(&self, public_name: &str) -> Option<&PropertyDescriptor>;
}

impl<T: PropertyLookup + ?Sized> PropertyLookup for &T {
    fn lookup(&self, public_name: &str) -> Option<&PropertyDescriptor> {
        (**self).lookup(public_name)
    }
}

/// Exposure options for a single storage field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expose {
    alias: Option<String>,
    filterable: bool,
    value_type: ValueType,
}

impl Expose {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    /// Public name callers use instead of the storage field name.
    #[must_use]
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.alias = Some(name.into());
        self
    }

    #[must_use]
    pub fn date(mut self) -> Self {
        self.value_type = ValueType::Date;
        self
    }

    #[must_use]
    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct PropertyRegistry {
    entity: String,
    props: HashMap<String, PropertyDescriptor>,
}

impl PropertyRegistry {
    #[must_use]
    pub fn builder(entity: impl Into<String>) -> RegistryBuilder {
        RegistryBuilder { entity: entity.into(), entries: Vec::new() }
    }

    /// # Errors
    /// Returns `GateError::Config` when two descriptors share a public name.
    pub fn from_descriptors(
        entity: impl Into<String>,
        descriptors: impl IntoIterator<Item = PropertyDescriptor>,
    ) -> Result<Self, GateError> {
        let entity = entity.into();
        let mut props = HashMap::new();
        for d in descriptors {
            if props.contains_key(&d.public_name) {
                return Err(GateError::Config(format!(
                    "entity '{entity}' exposes '{}' more than once",
                    d.public_name
                )));
            }
            props.insert(d.public_name.clone(), d);
        }
        Ok(Self { entity, props })
    }

    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.props.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.props.values()
    }
}

impl PropertyLookup for PropertyRegistry {
    fn lookup(&self, public_name: &str) -> Option<&PropertyDescriptor> {
        self.props.get(public_name)
    }
}

pub struct RegistryBuilder {
    entity: String,
    entries: Vec<PropertyDescriptor>,
}

impl RegistryBuilder {
    /// Exposes the storage field `field` with the given options.
    #[must_use]
    pub fn expose(mut self, field: impl Into<String>, opts: Expose) -> Self {
        let canonical_name = field.into();
        self.entries.push(PropertyDescriptor {
            public_name: opts.alias.unwrap_or_else(|| canonical_name.clone()),
            canonical_name,
            value_type: opts.value_type,
            filterable: opts.filterable,
        });
        self
    }

    /// # Errors
    /// Returns `GateError::Config` when two fields resolve to the same public name.
    pub fn build(self) -> Result<PropertyRegistry, GateError> {
        PropertyRegistry::from_descriptors(self.entity, self.entries)
    }
}
