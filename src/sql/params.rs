//! Ordered named parameter bindings.
//!
//! Every constant that reaches generated SQL goes through a [`ParamList`]:
//! the list hands out a placeholder token and records the value, so the
//! SQL text and its bindings stay in the same left-to-right order.

use serde::Serialize;

use super::dialect::{Dialect, SqlDialect};
use super::token::Token;
use crate::value::Value;

/// A single bound parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Placeholder as it appears in the SQL text, e.g. `@p0`.
    pub name: String,
    pub value: Value,
}

/// Parameters collected while rendering one statement.
#[derive(Debug, Clone)]
pub struct ParamList {
    dialect: Dialect,
    params: Vec<Parameter>,
    next_index: usize,
}

impl ParamList {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            params: Vec::new(),
            next_index: 0,
        }
    }

    /// Bind a value under the next positional name (`p0`, `p1`, ...).
    pub fn bind(&mut self, value: Value) -> Token {
        let name = format!("p{}", self.next_index);
        self.next_index += 1;
        self.bind_named(&name, value)
    }

    /// Bind a value under a fixed name.
    ///
    /// Binding the same name twice keeps a single parameter with the latest value.
    pub fn bind_named(&mut self, name: &str, value: Value) -> Token {
        let placeholder = self.dialect.parameter_name(name);
        match self.params.iter_mut().find(|p| p.name == placeholder) {
            Some(existing) => existing.value = value,
            None => self.params.push(Parameter {
                name: placeholder,
                value,
            }),
        }
        Token::Param(name.to_string())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn as_slice(&self) -> &[Parameter] {
        &self.params
    }

    pub fn into_vec(self) -> Vec<Parameter> {
        self.params
    }
}
