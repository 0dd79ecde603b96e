//! Naming conventions applied by auto-mapping.

use inflector::Inflector;
use serde::{Deserialize, Serialize};

use crate::value::{FieldType, Value};

/// How a default table name is derived from the entity type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableNaming {
    /// `OrderLine` -> `OrderLine`
    #[default]
    TypeName,
    /// `OrderLine` -> `order_line`
    SnakeCase,
    /// `OrderLine` -> `order_lines`
    PluralSnakeCase,
}

impl TableNaming {
    pub fn table_name(self, type_name: &str) -> String {
        match self {
            TableNaming::TypeName => type_name.to_string(),
            TableNaming::SnakeCase => type_name.to_snake_case(),
            TableNaming::PluralSnakeCase => type_name.to_snake_case().to_plural(),
        }
    }
}

/// Conventions shared by every mapping a registry builds.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingConventions {
    /// Property auto-detected as the delete flag (case-insensitive).
    pub delete_flag_property: String,
    /// "Deleted" value for string-typed delete flags.
    pub delete_flag_string_value: String,
    pub table_naming: TableNaming,
}

impl Default for MappingConventions {
    fn default() -> Self {
        Self {
            delete_flag_property: "Is_Del".to_string(),
            delete_flag_string_value: "Y".to_string(),
            table_naming: TableNaming::TypeName,
        }
    }
}

impl MappingConventions {
    /// The "deleted" value for a delete flag of the given type, if the type can hold one.
    pub fn delete_flag_true_value(&self, field_type: FieldType) -> Option<Value> {
        match field_type {
            FieldType::Bool => Some(Value::Bool(true)),
            FieldType::I8 | FieldType::I16 => Some(Value::Int(1)),
            FieldType::U8 | FieldType::U16 => Some(Value::UInt(1)),
            FieldType::String => Some(Value::String(self.delete_flag_string_value.clone())),
            _ => None,
        }
    }

    pub fn is_delete_flag_name(&self, name: &str) -> bool {
        !self.delete_flag_property.is_empty() && name.eq_ignore_ascii_case(&self.delete_flag_property)
    }
}
