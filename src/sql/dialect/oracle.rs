//! Oracle SQL dialect.
//!
//! Oracle differences from ANSI:
//! - Table aliases without `AS` (`FROM "orders" o`)
//! - `:name` bind variables
//! - OFFSET ... ROWS FETCH NEXT ... ROWS ONLY (12c+)

use super::helpers;
use super::SqlDialect;
use crate::sql::token::TokenStream;

/// Oracle SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Oracle;

impl SqlDialect for Oracle {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn table_alias_uses_as(&self) -> bool {
        false
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_offset_fetch(limit, offset)
    }
}
