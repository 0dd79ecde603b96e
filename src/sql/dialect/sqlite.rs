//! SQLite SQL dialect.
//!
//! - ANSI identifier quoting (`"`)
//! - `@name` parameter placeholders (accepted natively by SQLite)
//! - LIMIT ... OFFSET ... for pagination

use super::helpers;
use super::SqlDialect;

/// SQLite SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn parameter_prefix(&self) -> char {
        '@'
    }
}
