//! SQLite executor backed by `rusqlite`.

use std::path::Path;

use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::Connection;
use tracing::debug;

use super::{ExecError, ExecResult, SqlExecutor};
use crate::row::Row;
use crate::statement::Statement;
use crate::value::Value;

/// [`SqlExecutor`] over a single SQLite connection.
pub struct SqliteExecutor {
    conn: Connection,
}

impl SqliteExecutor {
    pub fn open(path: impl AsRef<Path>) -> ExecResult<Self> {
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> ExecResult<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run raw SQL such as schema setup.
    pub fn execute_batch(&self, sql: &str) -> ExecResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn prepare(&self, statement: &Statement) -> ExecResult<rusqlite::Statement<'_>> {
        debug!(sql = %statement.sql, parameters = statement.parameters.len(), "Executing statement");
        let mut stmt = self.conn.prepare(&statement.sql)?;
        for param in &statement.parameters {
            let index = stmt
                .parameter_index(&param.name)?
                .ok_or_else(|| ExecError::UnboundParameter(param.name.clone()))?;
            stmt.raw_bind_parameter(index, &param.value)?;
        }
        Ok(stmt)
    }
}

impl SqlExecutor for SqliteExecutor {
    fn query(&self, statement: &Statement) -> ExecResult<Vec<Row>> {
        let mut stmt = self.prepare(statement)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.raw_query();
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(from_sql_ref(row.get_ref(i)?)?);
            }
            out.push(Row::new(columns.clone(), values));
        }
        Ok(out)
    }

    fn execute(&self, statement: &Statement) -> ExecResult<u64> {
        let mut stmt = self.prepare(statement)?;
        Ok(stmt.raw_execute()? as u64)
    }

    /// No key is reported when nothing was inserted, e.g. `INSERT OR IGNORE`.
    fn insert(&self, statement: &Statement) -> ExecResult<Option<Value>> {
        let changed = self.execute(statement)?;
        if statement.returns_identity && changed > 0 {
            Ok(Some(Value::Int(self.conn.last_insert_rowid())))
        } else {
            Ok(None)
        }
    }

    fn begin(&self) -> ExecResult<()> {
        if self.in_transaction() {
            return Err(ExecError::TransactionActive);
        }
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&self) -> ExecResult<()> {
        if !self.in_transaction() {
            return Err(ExecError::NoTransaction);
        }
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&self) -> ExecResult<()> {
        if !self.in_transaction() {
            return Err(ExecError::NoTransaction);
        }
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Bool(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
            Value::Int(n) => ToSqlOutput::Owned(SqlValue::Integer(*n)),
            Value::UInt(n) => {
                let n = i64::try_from(*n)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                ToSqlOutput::Owned(SqlValue::Integer(n))
            }
            Value::Float(x) => ToSqlOutput::Owned(SqlValue::Real(*x)),
            Value::String(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            // Stored as text so they compare and sort the way they print
            Value::Uuid(u) => ToSqlOutput::Owned(SqlValue::Text(u.to_string())),
            Value::DateTime(dt) => ToSqlOutput::Owned(SqlValue::Text(dt.to_rfc3339())),
            Value::Bytes(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

fn from_sql_ref(value: ValueRef<'_>) -> ExecResult<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Int(n),
        ValueRef::Real(x) => Value::Float(x),
        ValueRef::Text(t) => Value::String(
            std::str::from_utf8(t)
                .map_err(rusqlite::Error::Utf8Error)?
                .to_string(),
        ),
        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
    })
}
