//! T-SQL (SQL Server / Azure SQL) dialect.
//!
//! T-SQL differences from ANSI:
//! - Square bracket identifier quoting (`[name]`)
//! - `@name` parameter placeholders
//! - OFFSET FETCH for pagination (requires ORDER BY)

use super::helpers;
use super::SqlDialect;
use crate::sql::token::TokenStream;

/// T-SQL (SQL Server) dialect.
#[derive(Debug, Clone, Copy)]
pub struct TSql;

impl SqlDialect for TSql {
    fn name(&self) -> &'static str {
        "tsql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_bracket(ident)
    }

    fn parameter_prefix(&self) -> char {
        '@'
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_offset_fetch(limit, offset)
    }

    fn requires_order_by_for_offset(&self) -> bool {
        true
    }
}
