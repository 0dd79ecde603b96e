//! Statement execution.
//!
//! [`SqlExecutor`] is the seam between generated statements and a database
//! driver. [`SqliteExecutor`] is the bundled implementation.

mod sqlite;

pub use sqlite::SqliteExecutor;

use crate::row::Row;
use crate::statement::Statement;
use crate::value::{Value, ValueError};

/// Errors that can occur while running a statement.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error("Parameter {0} does not appear in the statement")]
    UnboundParameter(String),

    #[error("No transaction is active")]
    NoTransaction,

    #[error("A transaction is already active")]
    TransactionActive,
}

pub type ExecResult<T> = Result<T, ExecError>;

/// Runs statements against a database connection.
pub trait SqlExecutor {
    /// All rows, labelled by column alias.
    fn query(&self, statement: &Statement) -> ExecResult<Vec<Row>>;

    /// First column of the first row, or `Null` when there is none.
    fn scalar(&self, statement: &Statement) -> ExecResult<Value> {
        Ok(self
            .query(statement)?
            .into_iter()
            .next()
            .and_then(|row| row.into_values().into_iter().next())
            .unwrap_or(Value::Null))
    }

    /// Number of affected rows.
    fn execute(&self, statement: &Statement) -> ExecResult<u64>;

    /// Execute an INSERT; returns the generated key when the statement
    /// [`returns_identity`](Statement::returns_identity) and a row was
    /// inserted.
    fn insert(&self, statement: &Statement) -> ExecResult<Option<Value>>;

    fn begin(&self) -> ExecResult<()>;

    fn commit(&self) -> ExecResult<()>;

    fn rollback(&self) -> ExecResult<()>;

    fn in_transaction(&self) -> bool;
}
