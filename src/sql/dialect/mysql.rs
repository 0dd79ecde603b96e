//! MySQL SQL dialect.
//!
//! MySQL differences from ANSI:
//! - Backtick identifier quoting (`` `name` ``)
//! - `@name` parameter placeholders (Connector/NET convention)
//! - LIMIT ... OFFSET ... for pagination

use super::helpers;
use super::SqlDialect;

/// MySQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn parameter_prefix(&self) -> char {
        '@'
    }

    // Uses default emit_limit_offset (LIMIT ... OFFSET ...)
}
