//! Entity repositories.
//!
//! A [`Repository`] pairs a [`StatementBuilder`] with a borrowed
//! [`SqlExecutor`]: it builds each statement, runs it and materializes rows
//! back into entities. [`UnitOfWork`] scopes several repositories to one
//! transaction.

mod unit_of_work;

pub use unit_of_work::UnitOfWork;

use crate::entity::{Entity, Prop};
use crate::error::{Error, Result};
use crate::executor::SqlExecutor;
use crate::generator::PropertyFilter;
use crate::key::Key;
use crate::mapper::MappingRegistry;
use crate::page::PageData;
use crate::query::EntityQuery;
use crate::row::Row;
use crate::sql::Dialect;
use crate::statement::{Statement, StatementBuilder};
use crate::translate::Predicate;
use crate::value::{ColumnType, Value};

/// CRUD operations for entity `E` over one executor.
pub struct Repository<'a, E> {
    executor: &'a dyn SqlExecutor,
    statements: StatementBuilder<E>,
}

impl<'a, E: Entity> Repository<'a, E> {
    /// Repository using the registry's mapping for `E`.
    pub fn new(executor: &'a dyn SqlExecutor, registry: &MappingRegistry, dialect: Dialect) -> Result<Self> {
        Ok(Self::with_statements(
            executor,
            StatementBuilder::from_registry(registry, dialect)?,
        ))
    }

    pub fn with_statements(executor: &'a dyn SqlExecutor, statements: StatementBuilder<E>) -> Self {
        Self {
            executor,
            statements,
        }
    }

    pub fn statements(&self) -> &StatementBuilder<E> {
        &self.statements
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn get_by_key(&self, key: impl Into<Key>) -> Result<Option<E>> {
        let statement = self.statements.select_by_key(&key.into(), &[])?;
        self.first(&statement)
    }

    /// Entities matching `predicate`, or all of them.
    pub fn query(&self, predicate: Option<&Predicate<E>>, exclude: &[Prop<E>]) -> Result<Vec<E>> {
        let statement = self.statements.select_by_where(predicate, exclude)?;
        self.fetch(&statement)
    }

    /// Entities matching an [`EntityQuery`], in its order.
    pub fn get_list(&self, query: &EntityQuery<E>) -> Result<Vec<E>> {
        let predicate = query.predicate();
        let statement =
            self.statements
                .select_ordered(predicate.as_ref(), query.ignored(), query.order())?;
        self.fetch(&statement)
    }

    /// The first entity matching `predicate`.
    pub fn get_single(&self, predicate: &Predicate<E>) -> Result<Option<E>> {
        let statement = self.statements.select_by_where(Some(predicate), &[])?;
        self.first(&statement)
    }

    /// One page of an [`EntityQuery`]; `page_index` starts at 1.
    pub fn get_page(&self, query: &EntityQuery<E>, page_index: u64, page_size: u64) -> Result<PageData<E>> {
        let predicate = query.predicate();
        let total = self.count(predicate.as_ref())?;
        let statement = self.statements.select_page(
            predicate.as_ref(),
            query.ignored(),
            query.order(),
            page_index.max(1),
            page_size,
        )?;
        let data = self.fetch(&statement)?;
        Ok(PageData::new(page_index.max(1), page_size, total, data))
    }

    pub fn count(&self, predicate: Option<&Predicate<E>>) -> Result<u64> {
        let statement = self.statements.count_where(predicate)?;
        let value = self.executor.scalar(&statement)?;
        Ok(u64::from_value(&value)?)
    }

    /// First column of the first row of `SELECT <select_list>` over the
    /// mapped table, filtered by `predicate` and the delete flag.
    pub fn execute_scalar(&self, select_list: &str, predicate: Option<&Predicate<E>>) -> Result<Value> {
        let statement = self.statements.select_where(select_list, predicate)?;
        Ok(self.executor.scalar(&statement)?)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Insert an entity; returns its key, generated or assigned, when it has one.
    pub fn insert(&self, entity: &E, exclude: &[Prop<E>]) -> Result<Option<Key>> {
        let statement = self.statements.insert(entity, exclude)?;
        match self.executor.insert(&statement)? {
            Some(generated) => Ok(Some(Key::Simple(generated))),
            None if statement.returns_identity => Ok(None),
            None if self.statements.generator().mapping().has_key() => {
                Ok(Some(self.statements.entity_key(entity)?))
            }
            None => Ok(None),
        }
    }

    /// Update the entity's row; an empty `include` updates every column.
    pub fn update(&self, entity: &E, include: &[Prop<E>]) -> Result<u64> {
        let statement = self
            .statements
            .update(entity, &PropertyFilter::include(include))?;
        Ok(self.executor.execute(&statement)?)
    }

    /// Update every column except `ignore`.
    pub fn update_ignore(&self, entity: &E, ignore: &[Prop<E>]) -> Result<u64> {
        let statement = self
            .statements
            .update(entity, &PropertyFilter::exclude(ignore))?;
        Ok(self.executor.execute(&statement)?)
    }

    pub fn update_by_key(&self, key: impl Into<Key>, entity: &E, include: &[Prop<E>]) -> Result<u64> {
        let statement =
            self.statements
                .update_by_key(&key.into(), entity, &PropertyFilter::include(include))?;
        Ok(self.executor.execute(&statement)?)
    }

    pub fn update_ignore_by_key(&self, key: impl Into<Key>, entity: &E, ignore: &[Prop<E>]) -> Result<u64> {
        let statement =
            self.statements
                .update_by_key(&key.into(), entity, &PropertyFilter::exclude(ignore))?;
        Ok(self.executor.execute(&statement)?)
    }

    pub fn update_by_key_values(&self, key: impl Into<Key>, values: &[(Prop<E>, Value)]) -> Result<u64> {
        let statement = self.statements.update_by_key_values(&key.into(), values)?;
        Ok(self.executor.execute(&statement)?)
    }

    pub fn update_by_where(&self, predicate: &Predicate<E>, values: &[(Prop<E>, Value)]) -> Result<u64> {
        let statement = self.statements.update_by_where(predicate, values)?;
        Ok(self.executor.execute(&statement)?)
    }

    pub fn delete_by_key(&self, key: impl Into<Key>) -> Result<u64> {
        let statement = self.statements.delete_by_key(&key.into())?;
        Ok(self.executor.execute(&statement)?)
    }

    pub fn delete(&self, entity: &E) -> Result<u64> {
        let statement = self.statements.delete_entity(entity)?;
        Ok(self.executor.execute(&statement)?)
    }

    pub fn delete_by_where(&self, predicate: &Predicate<E>) -> Result<u64> {
        let statement = self.statements.delete_by_where(predicate)?;
        Ok(self.executor.execute(&statement)?)
    }

    // =========================================================================
    // Materialization
    // =========================================================================

    fn fetch(&self, statement: &Statement) -> Result<Vec<E>> {
        self.executor
            .query(statement)?
            .iter()
            .map(|row| E::from_row(row).map_err(Error::from))
            .collect()
    }

    fn first(&self, statement: &Statement) -> Result<Option<E>> {
        let rows: Vec<Row> = self.executor.query(statement)?;
        match rows.first() {
            Some(row) => Ok(Some(E::from_row(row)?)),
            None => Ok(None),
        }
    }
}
