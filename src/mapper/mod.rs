//! Entity-to-table mapping.
//!
//! - [`property`] - Per-property mapping and fluent configuration
//! - [`class_mapper`] - Mapping builders, custom class maps and auto-mapping
//! - [`conventions`] - Naming conventions applied by auto-mapping
//! - [`mapping`] - The immutable [`EntityMapping`] produced by a builder
//! - [`registry`] - The concurrent mapping cache
//! - [`resolver`] - Case-insensitive property lookup

pub mod class_mapper;
pub mod conventions;
pub mod mapping;
pub mod property;
pub mod registry;
pub mod resolver;

pub use class_mapper::{AutoClassMapper, ClassMap, ClassMapper, DefaultMapper, MappingBuilder};
pub use conventions::{MappingConventions, TableNaming};
pub use mapping::EntityMapping;
pub use property::{KeyType, PropertyMapping};
pub use registry::{MappingCatalog, MappingOptions, MappingRegistry};
pub use resolver::PropertyIndex;

use crate::value::FieldType;

/// Configuration errors raised while building a mapping.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MappingError {
    #[error("Duplicate mapping for property {0} detected")]
    DuplicateProperty(String),

    #[error("{entity} has no field named '{property}'")]
    UnknownField {
        entity: &'static str,
        property: String,
    },

    #[error("'{property}' is {current} and cannot be made {requested}")]
    ConflictingFlags {
        property: String,
        current: &'static str,
        requested: &'static str,
    },

    #[error("'{property}' of type {field_type} cannot determine true value of delete flag")]
    DeleteFlagType {
        property: String,
        field_type: FieldType,
    },

    #[error("'{0}' should provide a non-null true value to be marked delete flag")]
    MissingDeleteFlagValue(String),

    #[error("Table name of {0} cannot be empty")]
    EmptyTableName(&'static str),

    #[error("Column name of '{0}' cannot be empty")]
    EmptyColumnName(String),
}

/// Per-call lookup failures against a built mapping.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LookupError {
    #[error("Could not find '{property}' in mapping of {entity}")]
    PropertyNotFound {
        entity: &'static str,
        property: String,
    },

    #[error("Could not find key column in mapping of {0}")]
    NoKey(&'static str),

    #[error("Key value for {entity} is missing key property '{property}'")]
    MissingKeyValue {
        entity: &'static str,
        property: String,
    },
}

pub type MapResult<T> = Result<T, MappingError>;
