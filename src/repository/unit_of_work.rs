use tracing::{debug, warn};

use super::Repository;
use crate::entity::Entity;
use crate::error::Result;
use crate::executor::SqlExecutor;
use crate::mapper::MappingRegistry;
use crate::sql::Dialect;

/// A transaction spanning any number of repositories.
///
/// The transaction starts in [`begin`](Self::begin). Dropping the unit of
/// work without [`save_changes`](Self::save_changes) rolls it back.
pub struct UnitOfWork<'a> {
    executor: &'a dyn SqlExecutor,
    registry: &'a MappingRegistry,
    dialect: Dialect,
    completed: bool,
}

impl<'a> UnitOfWork<'a> {
    pub fn begin(executor: &'a dyn SqlExecutor, registry: &'a MappingRegistry, dialect: Dialect) -> Result<Self> {
        executor.begin()?;
        debug!(dialect = %dialect, "Unit of work started");
        Ok(Self {
            executor,
            registry,
            dialect,
            completed: false,
        })
    }

    /// A repository for `E` running inside this transaction.
    pub fn repository<E: Entity>(&self) -> Result<Repository<'a, E>> {
        Repository::new(self.executor, self.registry, self.dialect)
    }

    /// Commit the transaction.
    pub fn save_changes(mut self) -> Result<()> {
        self.executor.commit()?;
        self.completed = true;
        debug!("Unit of work committed");
        Ok(())
    }

    /// Roll the transaction back explicitly.
    pub fn rollback(mut self) -> Result<()> {
        self.completed = true;
        self.executor.rollback()?;
        debug!("Unit of work rolled back");
        Ok(())
    }
}

impl Drop for UnitOfWork<'_> {
    fn drop(&mut self) {
        if self.completed || !self.executor.in_transaction() {
            return;
        }
        warn!("Unit of work dropped without save_changes, rolling back");
        if let Err(e) = self.executor.rollback() {
            warn!(error = %e, "Rollback of abandoned unit of work failed");
        }
    }
}
