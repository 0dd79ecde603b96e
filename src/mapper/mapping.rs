//! Built entity mappings.

use std::any::TypeId;

use crate::entity::PropertyRef;

use super::property::PropertyMapping;
use super::resolver::{self, PropertyIndex};
use super::LookupError;

/// Immutable mapping of one entity type to a table.
///
/// Produced by [`MappingBuilder::build`](super::MappingBuilder::build) and
/// shared as `Arc<EntityMapping>` from the registry cache.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMapping {
    entity_type: TypeId,
    entity_name: &'static str,
    schema_name: Option<String>,
    table_name: String,
    properties: Vec<PropertyMapping>,
    index: PropertyIndex,
}

impl EntityMapping {
    pub(crate) fn new(
        entity_type: TypeId,
        entity_name: &'static str,
        schema_name: Option<String>,
        table_name: String,
        properties: Vec<PropertyMapping>,
    ) -> Self {
        let index = PropertyIndex::build(&properties);
        Self {
            entity_type,
            entity_name,
            schema_name,
            table_name,
            properties,
            index,
        }
    }

    pub fn entity_type(&self) -> TypeId {
        self.entity_type
    }

    pub fn entity_name(&self) -> &'static str {
        self.entity_name
    }

    pub fn schema_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Mapped properties in declaration order.
    pub fn properties(&self) -> &[PropertyMapping] {
        &self.properties
    }

    /// Property by name (case-insensitive).
    pub fn property(&self, name: &str) -> Option<&PropertyMapping> {
        self.index.position(name).map(|i| &self.properties[i])
    }

    /// Property by name, or [`LookupError::PropertyNotFound`].
    pub fn resolve(&self, property: &(impl PropertyRef + ?Sized)) -> Result<&PropertyMapping, LookupError> {
        let name = property.property_name();
        self.property(name).ok_or_else(|| LookupError::PropertyNotFound {
            entity: self.entity_name,
            property: name.to_string(),
        })
    }

    /// Resolve several names at once, failing on the first unknown one.
    pub fn resolve_all<P: PropertyRef>(&self, refs: &[P]) -> Result<Vec<&PropertyMapping>, LookupError> {
        resolver::resolve_all(self.entity_name, &self.properties, &self.index, refs)
    }

    pub fn key_properties(&self) -> impl Iterator<Item = &PropertyMapping> {
        self.properties.iter().filter(|p| p.is_key())
    }

    pub fn has_key(&self) -> bool {
        self.properties.iter().any(|p| p.is_key())
    }

    pub fn delete_flag_property(&self) -> Option<&PropertyMapping> {
        self.properties.iter().find(|p| p.is_delete_flag())
    }
}
