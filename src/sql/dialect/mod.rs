//! SQL dialect definitions and formatting rules.
//!
//! Each dialect implements `SqlDialect` to describe the handful of syntax
//! differences that matter for generated CRUD statements:
//!
//! - Identifier quoting: `"` (ANSI/PG/Oracle/SQLite), `` ` `` (MySQL), `[]` (T-SQL)
//! - Parameter placeholders: `@name` (T-SQL/SQLite/MySQL) vs `:name` (ANSI/PG/Oracle)
//! - Table aliases: `table AS t` vs `table t` (Oracle)
//! - Pagination: LIMIT/OFFSET vs OFFSET FETCH
//!
//! # Usage
//!
//! ```
//! use tablemap::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::TSql;
//! assert_eq!(dialect.quote_identifier("user"), "[user]");
//! assert_eq!(dialect.parameter_name("p0"), "@p0");
//! ```

mod ansi;
pub mod helpers;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;
mod tsql;

pub use ansi::Ansi;
pub use mysql::MySql;
pub use oracle::Oracle;
pub use postgres::Postgres;
pub use sqlite::Sqlite;
pub use tsql::TSql;

use super::token::TokenStream;

/// SQL dialect trait - defines how generated statements are rendered.
///
/// The default implementations follow standard SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifiers
    // =========================================================================

    /// Quote an identifier (schema, table, column, alias).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Whether table aliases are introduced with `AS`.
    ///
    /// Oracle rejects `AS` between a table and its alias.
    fn table_alias_uses_as(&self) -> bool {
        true
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Prefix character for named parameter placeholders.
    fn parameter_prefix(&self) -> char {
        ':'
    }

    /// Render a named parameter placeholder, e.g. `@p0` or `:p0`.
    fn parameter_name(&self, name: &str) -> String {
        format!("{}{}", self.parameter_prefix(), name)
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Emit LIMIT/OFFSET or equivalent pagination clause.
    ///
    /// - PostgreSQL/MySQL/SQLite: `LIMIT n OFFSET m` (default)
    /// - ANSI/T-SQL/Oracle: `OFFSET m ROWS FETCH NEXT n ROWS ONLY`
    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_standard(limit, offset)
    }

    /// Whether this dialect requires ORDER BY for OFFSET/LIMIT.
    fn requires_order_by_for_offset(&self) -> bool {
        false
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// Standard SQL, used when no provider-specific dialect matches.
    #[default]
    Ansi,
    TSql,
    MySql,
    Postgres,
    Sqlite,
    Oracle,
}

impl Dialect {
    /// All built-in dialects.
    pub const ALL: [Dialect; 6] = [
        Dialect::Ansi,
        Dialect::TSql,
        Dialect::MySql,
        Dialect::Postgres,
        Dialect::Sqlite,
        Dialect::Oracle,
    ];

    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Ansi => &Ansi,
            Dialect::TSql => &TSql,
            Dialect::MySql => &MySql,
            Dialect::Postgres => &Postgres,
            Dialect::Sqlite => &Sqlite,
            Dialect::Oracle => &Oracle,
        }
    }

    /// Look up a dialect by its display name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Dialect> {
        Dialect::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name.trim()))
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn table_alias_uses_as(&self) -> bool {
        self.dialect().table_alias_uses_as()
    }

    fn parameter_prefix(&self) -> char {
        self.dialect().parameter_prefix()
    }

    fn parameter_name(&self, name: &str) -> String {
        self.dialect().parameter_name(name)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        self.dialect().emit_limit_offset(limit, offset)
    }

    fn requires_order_by_for_offset(&self) -> bool {
        self.dialect().requires_order_by_for_offset()
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
