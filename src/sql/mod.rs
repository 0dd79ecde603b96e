//! SQL rendering module.
//!
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations
//! - [`params`] - Ordered named parameter bindings

pub mod dialect;
pub mod params;
pub mod token;

pub use dialect::{Dialect, SqlDialect};
pub use params::{ParamList, Parameter};
pub use token::{Token, TokenStream};
