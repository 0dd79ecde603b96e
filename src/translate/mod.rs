//! Predicate trees and their translation to parameterized WHERE clauses.
//!
//! - [`expr`] - The [`Expr`] tree, typed [`Predicate`] wrapper and [`Prop`](crate::Prop) builders
//! - [`translator`] - Renders an [`Expr`] against an entity mapping
//! - [`provider`] - Provider name to [`Dialect`](crate::sql::Dialect) lookup

pub mod expr;
pub mod provider;
pub mod translator;

pub use expr::{CompareOp, Expr, LikeKind, Predicate};
pub use provider::ProviderRegistry;
pub use translator::{QuerySql, Translator};

use crate::mapper::LookupError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TranslateError {
    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

pub type TranslateResult<T> = Result<T, TranslateError>;
