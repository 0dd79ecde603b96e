//! Property mappings.

use crate::entity::FieldInfo;
use crate::value::{FieldType, Value};

use super::{MapResult, MappingError};

/// Role of a property in row identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyType {
    #[default]
    NotAKey,
    /// Generated by the database on insert.
    Identity,
    Guid,
    /// Supplied by the caller.
    Assigned,
}

impl KeyType {
    pub fn is_key(self) -> bool {
        self != KeyType::NotAKey
    }

    /// Key type implied by a field's underlying type.
    pub fn infer(field_type: FieldType) -> KeyType {
        match field_type {
            t if t.is_integer() => KeyType::Identity,
            FieldType::Uuid => KeyType::Guid,
            _ => KeyType::Assigned,
        }
    }
}

/// Mapping of one entity property to a column.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyMapping {
    name: String,
    column_name: String,
    key_type: KeyType,
    ignored: bool,
    read_only: bool,
    delete_flag: Option<Value>,
    field_type: FieldType,
    nullable: bool,
}

impl PropertyMapping {
    /// Default mapping: column named after the property, no flags.
    pub fn new(field: &FieldInfo) -> Self {
        Self {
            name: field.name.to_string(),
            column_name: field.name.to_string(),
            key_type: KeyType::NotAKey,
            ignored: false,
            read_only: false,
            delete_flag: None,
            field_type: field.field_type,
            nullable: field.nullable,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn is_key(&self) -> bool {
        self.key_type.is_key()
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_delete_flag(&self) -> bool {
        self.delete_flag.is_some()
    }

    /// The value meaning "deleted", when this is the delete flag.
    pub fn delete_flag_true_value(&self) -> Option<&Value> {
        self.delete_flag.as_ref()
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    // =========================================================================
    // Fluent configuration
    // =========================================================================

    /// Set the column name.
    pub fn column(&mut self, column_name: impl Into<String>) -> MapResult<&mut Self> {
        let column_name = column_name.into();
        if column_name.trim().is_empty() {
            return Err(MappingError::EmptyColumnName(self.name.clone()));
        }
        self.column_name = column_name;
        Ok(self)
    }

    /// Set the key type.
    pub fn key(&mut self, key_type: KeyType) -> MapResult<&mut Self> {
        if self.is_delete_flag() {
            return Err(self.conflict("delete flag", "a key field"));
        }
        if self.ignored {
            return Err(self.conflict("ignored", "a key field"));
        }
        if self.read_only {
            return Err(self.conflict("readonly", "a key field"));
        }
        self.key_type = key_type;
        Ok(self)
    }

    /// Exclude from all generated column lists.
    pub fn ignore(&mut self) -> MapResult<&mut Self> {
        if self.is_key() {
            return Err(self.conflict("a key field", "ignored"));
        }
        self.ignored = true;
        Ok(self)
    }

    /// Exclude from INSERT and UPDATE column lists.
    pub fn read_only(&mut self) -> MapResult<&mut Self> {
        if self.is_key() {
            return Err(self.conflict("a key field", "readonly"));
        }
        if self.is_delete_flag() {
            return Err(self.conflict("delete flag", "readonly"));
        }
        self.read_only = true;
        Ok(self)
    }

    /// Mark as the soft-delete indicator. Implies [`ignore`](Self::ignore).
    pub fn delete_flag(&mut self, true_value: impl Into<Value>) -> MapResult<&mut Self> {
        if self.is_key() {
            return Err(self.conflict("a key field", "delete flag"));
        }
        if self.read_only {
            return Err(self.conflict("readonly", "delete flag"));
        }
        let true_value = true_value.into();
        if true_value.is_null() {
            return Err(MappingError::MissingDeleteFlagValue(self.name.clone()));
        }
        self.delete_flag = Some(true_value);
        self.ignore()
    }

    fn conflict(&self, current: &'static str, requested: &'static str) -> MappingError {
        MappingError::ConflictingFlags {
            property: self.name.clone(),
            current,
            requested,
        }
    }
}
