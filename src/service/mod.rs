//! Service layer over a [`Repository`].
//!
//! [`CrudService`] validates entities before writes and reports every outcome
//! as a [`DoResult`] instead of a bare row count.

mod result;
mod validate;

pub use result::{DoResult, DoResultType};
pub use validate::{DeriveValidator, EntityValidator, NoopValidator, ValidationFailure};

use tracing::debug;

use crate::entity::{Entity, Prop};
use crate::error::Result;
use crate::generator::PropertyFilter;
use crate::key::Key;
use crate::page::PageData;
use crate::query::EntityQuery;
use crate::repository::Repository;
use crate::translate::Predicate;

const INSERT_FAIL: &str = "insert fail";
const UPDATE_FAIL: &str = "update fail";
const DELETE_FAIL: &str = "delete fail";

/// Validated CRUD operations for entity `E`.
pub struct CrudService<'a, E, V = NoopValidator> {
    repository: Repository<'a, E>,
    validator: V,
}

impl<'a, E: Entity> CrudService<'a, E, NoopValidator> {
    /// Service without validation rules.
    pub fn unvalidated(repository: Repository<'a, E>) -> Self {
        Self::new(repository, NoopValidator)
    }
}

impl<'a, E: Entity, V: EntityValidator<E>> CrudService<'a, E, V> {
    pub fn new(repository: Repository<'a, E>, validator: V) -> Self {
        Self {
            repository,
            validator,
        }
    }

    pub fn repository(&self) -> &Repository<'a, E> {
        &self.repository
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn get_by_key(&self, key: impl Into<Key>) -> Result<DoResult<E>> {
        let key = key.into();
        Ok(match self.repository.get_by_key(key.clone())? {
            Some(entity) => DoResult::success(entity),
            None => DoResult::not_found(format!("record not found for key: {key}")),
        })
    }

    pub fn get_single(&self, predicate: &Predicate<E>) -> Result<DoResult<E>> {
        Ok(match self.repository.get_single(predicate)? {
            Some(entity) => DoResult::success(entity),
            None => DoResult::not_found(format!("record not found for: {predicate}")),
        })
    }

    pub fn get_list(&self, query: &EntityQuery<E>) -> Result<DoResult<Vec<E>>> {
        Ok(DoResult::success(self.repository.get_list(query)?))
    }

    pub fn get_page_list(
        &self,
        query: &EntityQuery<E>,
        page_index: u64,
        page_size: u64,
    ) -> Result<DoResult<PageData<E>>> {
        Ok(DoResult::success(
            self.repository.get_page(query, page_index, page_size)?,
        ))
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Validate every property not in `ignore`, then insert.
    ///
    /// Succeeds with the inserted key; an entity without a key reports `Fail`.
    pub fn insert(&self, entity: &E, ignore: &[Prop<E>]) -> Result<DoResult<Key>> {
        if let Some(failed) = self.check(entity, &PropertyFilter::exclude(ignore)) {
            return Ok(failed);
        }
        Ok(match self.repository.insert(entity, ignore)? {
            Some(key) => DoResult::success(key),
            None => DoResult::fail(INSERT_FAIL),
        })
    }

    /// Validate and update the properties in `include`, or all of them.
    pub fn update(&self, entity: &E, include: &[Prop<E>]) -> Result<DoResult<u64>> {
        if let Some(failed) = self.check(entity, &PropertyFilter::include(include)) {
            return Ok(failed);
        }
        let affected = self.repository.update(entity, include)?;
        Ok(affected_result(affected, UPDATE_FAIL))
    }

    /// Validate and update every property except `ignore`.
    pub fn update_ignore(&self, entity: &E, ignore: &[Prop<E>]) -> Result<DoResult<u64>> {
        if let Some(failed) = self.check(entity, &PropertyFilter::exclude(ignore)) {
            return Ok(failed);
        }
        let affected = self.repository.update_ignore(entity, ignore)?;
        Ok(affected_result(affected, UPDATE_FAIL))
    }

    pub fn update_by_key(
        &self,
        key: impl Into<Key>,
        entity: &E,
        include: &[Prop<E>],
    ) -> Result<DoResult<u64>> {
        if let Some(failed) = self.check(entity, &PropertyFilter::include(include)) {
            return Ok(failed);
        }
        let affected = self.repository.update_by_key(key, entity, include)?;
        Ok(affected_result(affected, UPDATE_FAIL))
    }

    pub fn update_ignore_by_key(
        &self,
        key: impl Into<Key>,
        entity: &E,
        ignore: &[Prop<E>],
    ) -> Result<DoResult<u64>> {
        if let Some(failed) = self.check(entity, &PropertyFilter::exclude(ignore)) {
            return Ok(failed);
        }
        let affected = self.repository.update_ignore_by_key(key, entity, ignore)?;
        Ok(affected_result(affected, UPDATE_FAIL))
    }

    pub fn delete_by_key(&self, key: impl Into<Key>) -> Result<DoResult<u64>> {
        let affected = self.repository.delete_by_key(key)?;
        Ok(affected_result(affected, DELETE_FAIL))
    }

    pub fn delete(&self, entity: &E) -> Result<DoResult<u64>> {
        let affected = self.repository.delete(entity)?;
        Ok(affected_result(affected, DELETE_FAIL))
    }

    pub fn delete_by_where(&self, predicate: &Predicate<E>) -> Result<DoResult<u64>> {
        let affected = self.repository.delete_by_where(predicate)?;
        Ok(affected_result(affected, DELETE_FAIL))
    }

    fn check<T>(&self, entity: &E, filter: &PropertyFilter) -> Option<DoResult<T>> {
        let failures = self.validator.validate_filtered(entity, filter);
        if failures.is_empty() {
            return None;
        }
        debug!(
            entity = E::type_name(),
            failures = failures.len(),
            "Validation failed"
        );
        Some(DoResult::validate(failures))
    }
}

fn affected_result(affected: u64, failure: &str) -> DoResult<u64> {
    if affected > 0 {
        DoResult::success(affected)
    } else {
        DoResult::fail(failure)
    }
}
