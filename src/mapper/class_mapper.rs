//! Mapping builders.
//!
//! [`MappingBuilder`] collects property mappings for one entity type.
//! [`ClassMapper`] wraps it with typed [`Prop`] access for custom
//! [`ClassMap`] implementations, and [`AutoClassMapper`] is the
//! [`DefaultMapper`] used when no custom map is registered.

use std::any::TypeId;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use crate::entity::{Entity, FieldInfo, Prop};

use super::conventions::MappingConventions;
use super::mapping::EntityMapping;
use super::property::{KeyType, PropertyMapping};
use super::{MapResult, MappingError};

/// Untyped mapping builder for one entity type.
#[derive(Debug, Clone)]
pub struct MappingBuilder {
    entity_type: TypeId,
    entity_name: &'static str,
    fields: &'static [FieldInfo],
    schema: Option<String>,
    table: String,
    properties: Vec<PropertyMapping>,
    conventions: MappingConventions,
}

impl MappingBuilder {
    /// Start a builder for `E`; the table name follows the conventions.
    pub fn for_entity<E: Entity>(conventions: &MappingConventions) -> Self {
        Self {
            entity_type: TypeId::of::<E>(),
            entity_name: E::type_name(),
            fields: E::fields(),
            schema: None,
            table: conventions.table_naming.table_name(E::type_name()),
            properties: Vec::new(),
            conventions: conventions.clone(),
        }
    }

    pub fn entity_name(&self) -> &'static str {
        self.entity_name
    }

    pub fn conventions(&self) -> &MappingConventions {
        &self.conventions
    }

    /// Properties mapped so far.
    pub fn properties(&self) -> &[PropertyMapping] {
        &self.properties
    }

    pub fn schema(&mut self, schema: impl Into<String>) -> &mut Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn table(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = table.into();
        self
    }

    /// Map a field by name (case-insensitive).
    pub fn map_name(&mut self, name: &str) -> MapResult<&mut PropertyMapping> {
        let field = self
            .fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| MappingError::UnknownField {
                entity: self.entity_name,
                property: name.to_string(),
            })?;
        self.push(field)
    }

    fn push(&mut self, field: &FieldInfo) -> MapResult<&mut PropertyMapping> {
        if self.properties.iter().any(|p| p.name() == field.name) {
            return Err(MappingError::DuplicateProperty(field.name.to_string()));
        }
        self.properties.push(PropertyMapping::new(field));
        let last = self.properties.len() - 1;
        Ok(&mut self.properties[last])
    }

    /// Map every remaining field by convention.
    pub fn auto_map(&mut self) -> MapResult<&mut Self> {
        self.auto_map_with(|_| true)
    }

    /// Map every remaining field accepted by `can_map`.
    ///
    /// When no key is mapped yet, a field named `id` becomes the key, or
    /// failing that the first field ending in `id`. When no delete flag is
    /// mapped yet, the field named by the conventions becomes the flag.
    pub fn auto_map_with(&mut self, can_map: impl Fn(&FieldInfo) -> bool) -> MapResult<&mut Self> {
        let has_key = self.properties.iter().any(|p| p.is_key());
        let has_flag = self.properties.iter().any(|p| p.is_delete_flag());
        let mut key_at = None;
        let mut flag_at = None;

        for field in self.fields {
            if self
                .properties
                .iter()
                .any(|p| p.name().eq_ignore_ascii_case(field.name))
            {
                continue;
            }
            if !can_map(field) {
                continue;
            }

            let at = self.properties.len();
            self.push(field)?;

            if !has_key {
                if field.name.eq_ignore_ascii_case("id") {
                    key_at = Some(at);
                }
                if key_at.is_none() && field.name.to_ascii_lowercase().ends_with("id") {
                    key_at = Some(at);
                }
            }
            if !has_flag && flag_at.is_none() && self.conventions.is_delete_flag_name(field.name) {
                flag_at = Some(at);
            }
        }

        if let Some(at) = key_at {
            let key_type = KeyType::infer(self.properties[at].field_type());
            self.properties[at].key(key_type)?;
        }
        if let Some(at) = flag_at {
            let property = &self.properties[at];
            let true_value = self
                .conventions
                .delete_flag_true_value(property.field_type())
                .ok_or_else(|| MappingError::DeleteFlagType {
                    property: property.name().to_string(),
                    field_type: property.field_type(),
                })?;
            self.properties[at].delete_flag(true_value)?;
        }
        Ok(self)
    }

    pub fn build(self) -> MapResult<EntityMapping> {
        if self.table.trim().is_empty() {
            return Err(MappingError::EmptyTableName(self.entity_name));
        }
        Ok(EntityMapping::new(
            self.entity_type,
            self.entity_name,
            self.schema,
            self.table,
            self.properties,
        ))
    }
}

/// Typed mapping builder for `E`.
pub struct ClassMapper<E: Entity> {
    builder: MappingBuilder,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> ClassMapper<E> {
    pub fn new(conventions: &MappingConventions) -> Self {
        Self {
            builder: MappingBuilder::for_entity::<E>(conventions),
            _entity: PhantomData,
        }
    }

    /// Map one property for fluent configuration.
    pub fn map(&mut self, prop: Prop<E>) -> MapResult<&mut PropertyMapping> {
        self.builder.map_name(prop.name())
    }

    pub fn build(self) -> MapResult<EntityMapping> {
        self.builder.build()
    }
}

impl<E: Entity> Deref for ClassMapper<E> {
    type Target = MappingBuilder;

    fn deref(&self) -> &MappingBuilder {
        &self.builder
    }
}

impl<E: Entity> DerefMut for ClassMapper<E> {
    fn deref_mut(&mut self) -> &mut MappingBuilder {
        &mut self.builder
    }
}

/// A custom mapping for one entity type.
///
/// ```
/// use tablemap::entity;
/// use tablemap::mapper::{ClassMap, ClassMapper, KeyType, MapResult};
///
/// entity! {
///     #[derive(Debug, Clone, Default)]
///     pub struct Customer {
///         pub customer_no: String,
///         pub name: String,
///     }
/// }
///
/// struct CustomerMap;
///
/// impl ClassMap<Customer> for CustomerMap {
///     fn configure(&self, mapper: &mut ClassMapper<Customer>) -> MapResult<()> {
///         mapper.table("customers");
///         mapper.map(Customer::customer_no)?.key(KeyType::Assigned)?;
///         mapper.map(Customer::name)?.column("full_name")?;
///         Ok(())
///     }
/// }
/// ```
pub trait ClassMap<E: Entity>: Send + Sync {
    fn configure(&self, mapper: &mut ClassMapper<E>) -> MapResult<()>;
}

impl<E, F> ClassMap<E> for F
where
    E: Entity,
    F: Fn(&mut ClassMapper<E>) -> MapResult<()> + Send + Sync,
{
    fn configure(&self, mapper: &mut ClassMapper<E>) -> MapResult<()> {
        self(mapper)
    }
}

/// Builds mappings for entity types without a registered [`ClassMap`].
pub trait DefaultMapper: Send + Sync {
    fn configure(&self, builder: &mut MappingBuilder) -> MapResult<()>;
}

/// Maps every field by convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoClassMapper;

impl DefaultMapper for AutoClassMapper {
    fn configure(&self, builder: &mut MappingBuilder) -> MapResult<()> {
        builder.auto_map().map(|_| ())
    }
}
