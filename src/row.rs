//! Result rows returned by an executor.

use crate::value::{ColumnType, Value, ValueError};

/// One row of a result set, addressable by column label.
///
/// Generated SELECTs alias every renamed column back to its property name,
/// so entities read their fields by property name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Build a row from `(label, value)` pairs.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, Value)>) -> Self {
        let (columns, values) = pairs.into_iter().map(|(c, v)| (c.into(), v)).unzip();
        Self { columns, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Value by position.
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value by column label (case-insensitive).
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .and_then(|i| self.values.get(i))
    }

    /// Typed value by column label; a missing column is an error.
    pub fn get_as<T: ColumnType>(&self, column: &str) -> Result<T, ValueError> {
        match self.get(column) {
            Some(value) => T::from_value(value),
            None => Err(ValueError::MissingColumn(column.to_string())),
        }
    }

    /// Typed value by column label; a missing column yields `T::default()`.
    ///
    /// Entities loaded with excluded columns keep defaults for those fields.
    pub fn get_or_default<T: ColumnType + Default>(&self, column: &str) -> Result<T, ValueError> {
        match self.get(column) {
            Some(value) => T::from_value(value),
            None => Ok(T::default()),
        }
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}
