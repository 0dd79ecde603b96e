//! # tablemap
//!
//! Entity-to-table mapping and parameterized CRUD SQL for several dialects.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Entity (entity! field table + Prop constants)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [mapper]
//! ┌─────────────────────────────────────────────────────────┐
//! │      EntityMapping (cached per type in MappingRegistry)  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [generator + translate]
//! ┌─────────────────────────────────────────────────────────┐
//! │     Column sets, quoted identifiers, WHERE + params      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [statement]
//! ┌─────────────────────────────────────────────────────────┐
//! │          Statement (SQL text + named parameters)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [repository / service]
//! ┌─────────────────────────────────────────────────────────┐
//! │        SqlExecutor -> rows -> entities / DoResult        │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod executor;
pub mod generator;
pub mod key;
pub mod mapper;
pub mod page;
pub mod query;
pub mod repository;
pub mod row;
pub mod service;
pub mod sql;
pub mod statement;
pub mod translate;
pub mod value;

pub use sql::dialect;

pub use config::{Settings, SettingsError};
pub use entity::{Entity, FieldInfo, Prop, PropertyRef};
pub use error::{Error, Result};
pub use executor::{ExecError, SqlExecutor, SqliteExecutor};
pub use generator::{PropertyFilter, SqlGenerator};
pub use key::{Key, KeyDescriptor};
pub use mapper::{MappingRegistry, MappingOptions};
pub use page::PageData;
pub use query::{EntityQuery, OrderBy, SortDirection};
pub use repository::{Repository, UnitOfWork};
pub use row::Row;
pub use service::{CrudService, DoResult, DoResultType};
pub use sql::Dialect;
pub use statement::{Statement, StatementBuilder, StatementKind};
pub use translate::Predicate;
pub use value::{ColumnType, FieldType, Value, ValueError};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::dialect::{Dialect, SqlDialect};
    pub use crate::entity;
    pub use crate::executor::{SqlExecutor, SqliteExecutor};
    pub use crate::mapper::{ClassMap, ClassMapper, MapResult, MappingRegistry};
    pub use crate::query::EntityQuery;
    pub use crate::repository::{Repository, UnitOfWork};
    pub use crate::service::{CrudService, DeriveValidator, DoResult, EntityValidator};
    pub use crate::{Entity, Key, PageData, Predicate, Value};
}
