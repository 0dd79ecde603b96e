//! ANSI SQL dialect.
//!
//! Used as the fallback when a provider has no dedicated dialect:
//! - Double-quoted identifiers
//! - `:name` parameter placeholders
//! - OFFSET ... ROWS FETCH NEXT ... ROWS ONLY pagination

use super::super::token::TokenStream;

use super::helpers;
use super::SqlDialect;

/// ANSI SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Ansi;

impl SqlDialect for Ansi {
    fn name(&self) -> &'static str {
        "ansi"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_offset_fetch(limit, offset)
    }
}
