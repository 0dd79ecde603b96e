//! Shared helper functions for SQL dialect implementations.
//!
//! Reusable building blocks that dialects compose to implement
//! the `SqlDialect` trait with minimal duplication.

use super::super::token::{Token, TokenStream};

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: ANSI, Postgres, SQLite, Oracle
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with backticks.
/// Used by: MySQL
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Quote identifier with square brackets.
/// Used by: T-SQL (SQL Server)
pub fn quote_bracket(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}

// =============================================================================
// Pagination
// =============================================================================

/// Emit LIMIT ... OFFSET ...
/// Used by: Postgres, MySQL, SQLite
pub fn emit_limit_offset_standard(limit: Option<u64>, offset: Option<u64>) -> TokenStream {
    let mut ts = TokenStream::new();

    if let Some(lim) = limit {
        ts.push(Token::Limit).space().push(Token::LitInt(lim));
    }

    if let Some(off) = offset {
        if limit.is_some() {
            ts.space();
        }
        ts.push(Token::Offset).space().push(Token::LitInt(off));
    }

    ts
}

/// Emit OFFSET ... ROWS FETCH NEXT ... ROWS ONLY (SQL:2008 style).
/// Used by: ANSI, T-SQL, Oracle 12c+
///
/// OFFSET is always emitted since FETCH cannot appear on its own.
pub fn emit_offset_fetch(limit: Option<u64>, offset: Option<u64>) -> TokenStream {
    let mut ts = TokenStream::new();

    ts.push(Token::Offset)
        .space()
        .push(Token::LitInt(offset.unwrap_or(0)))
        .space()
        .push(Token::Rows);

    if let Some(lim) = limit {
        ts.space()
            .push(Token::Fetch)
            .space()
            .push(Token::Next)
            .space()
            .push(Token::LitInt(lim))
            .space()
            .push(Token::Rows)
            .space()
            .push(Token::Only);
    }

    ts
}
