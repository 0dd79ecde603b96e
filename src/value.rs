//! Scalar values and field types.
//!
//! [`Value`] is what gets bound to statement parameters and read back from
//! rows. [`ColumnType`] connects a Rust field type to its [`FieldType`]
//! and nullability so mappings can be inferred without runtime reflection.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error converting between [`Value`] and a Rust field type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("Expected {expected} but found {found}")]
    TypeMismatch {
        expected: FieldType,
        found: &'static str,
    },

    #[error("Value {value} is out of range for {expected}")]
    OutOfRange { expected: FieldType, value: String },

    #[error("Cannot parse {value:?} as {expected}")]
    Parse { expected: FieldType, value: String },

    #[error("Column '{0}' is missing from the row")]
    MissingColumn(String),
}

/// Underlying type of a mapped field, with `Option` stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    /// Arbitrary-precision integer (i128 and wider).
    BigInt,
    F32,
    F64,
    String,
    Uuid,
    DateTime,
    Bytes,
}

impl FieldType {
    /// Integer family, including arbitrary-precision integers.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            FieldType::I8
                | FieldType::I16
                | FieldType::I32
                | FieldType::I64
                | FieldType::U8
                | FieldType::U16
                | FieldType::U32
                | FieldType::U64
                | FieldType::BigInt
        )
    }

    /// 8 and 16 bit integers, the types that commonly hold flag columns.
    pub fn is_small_integer(self) -> bool {
        matches!(
            self,
            FieldType::I8 | FieldType::I16 | FieldType::U8 | FieldType::U16
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldType::Bool => "bool",
            FieldType::I8 => "i8",
            FieldType::I16 => "i16",
            FieldType::I32 => "i32",
            FieldType::I64 => "i64",
            FieldType::U8 => "u8",
            FieldType::U16 => "u16",
            FieldType::U32 => "u32",
            FieldType::U64 => "u64",
            FieldType::BigInt => "bigint",
            FieldType::F32 => "f32",
            FieldType::F64 => "f64",
            FieldType::String => "string",
            FieldType::Uuid => "uuid",
            FieldType::DateTime => "datetime",
            FieldType::Bytes => "bytes",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A simple (scalar) value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short label of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Uuid(_) => "uuid",
            Value::DateTime(_) => "datetime",
            Value::Bytes(_) => "bytes",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view across the signed/unsigned variants.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::UInt(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::UInt(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Uuid(u) => write!(f, "{u}"),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

macro_rules! value_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(i64::from(v))
            }
        })*
    };
}

macro_rules! value_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::UInt(u64::from(v))
            }
        })*
    };
}

value_from_signed!(i8, i16, i32, i64);
value_from_unsigned!(u8, u16, u32, u64);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A Rust type that can be stored in a mapped column.
///
/// Implemented for the scalar types and for `Option<T>`, which marks the
/// field nullable while keeping the inner [`FieldType`].
pub trait ColumnType: Sized {
    const FIELD_TYPE: FieldType;
    const NULLABLE: bool = false;

    fn to_value(&self) -> Value;

    fn from_value(value: &Value) -> Result<Self, ValueError>;
}

fn mismatch<T>(expected: FieldType, value: &Value) -> Result<T, ValueError> {
    Err(ValueError::TypeMismatch {
        expected,
        found: value.kind(),
    })
}

macro_rules! integer_column {
    ($($t:ty => $ft:ident),*) => {
        $(impl ColumnType for $t {
            const FIELD_TYPE: FieldType = FieldType::$ft;

            fn to_value(&self) -> Value {
                Value::from(*self)
            }

            fn from_value(value: &Value) -> Result<Self, ValueError> {
                let out_of_range = |v: String| ValueError::OutOfRange {
                    expected: FieldType::$ft,
                    value: v,
                };
                match value {
                    Value::Int(n) => <$t>::try_from(*n).map_err(|_| out_of_range(n.to_string())),
                    Value::UInt(n) => <$t>::try_from(*n).map_err(|_| out_of_range(n.to_string())),
                    Value::Bool(b) => Ok(<$t>::from(*b)),
                    other => mismatch(FieldType::$ft, other),
                }
            }
        })*
    };
}

integer_column!(
    i8 => I8, i16 => I16, i32 => I32, i64 => I64,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64
);

impl ColumnType for i128 {
    const FIELD_TYPE: FieldType = FieldType::BigInt;

    fn to_value(&self) -> Value {
        match i64::try_from(*self) {
            Ok(n) => Value::Int(n),
            Err(_) => Value::String(self.to_string()),
        }
    }

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Int(n) => Ok(i128::from(*n)),
            Value::UInt(n) => Ok(i128::from(*n)),
            Value::String(s) => s.parse().map_err(|_| ValueError::Parse {
                expected: FieldType::BigInt,
                value: s.clone(),
            }),
            other => mismatch(FieldType::BigInt, other),
        }
    }
}

impl ColumnType for bool {
    const FIELD_TYPE: FieldType = FieldType::Bool;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(b) => Ok(*b),
            // SQLite and T-SQL hand booleans back as integers
            Value::Int(n) => Ok(*n != 0),
            Value::UInt(n) => Ok(*n != 0),
            other => mismatch(FieldType::Bool, other),
        }
    }
}

impl ColumnType for f64 {
    const FIELD_TYPE: FieldType = FieldType::F64;

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(x) => Ok(*x),
            Value::Int(n) => Ok(*n as f64),
            Value::UInt(n) => Ok(*n as f64),
            other => mismatch(FieldType::F64, other),
        }
    }
}

impl ColumnType for f32 {
    const FIELD_TYPE: FieldType = FieldType::F32;

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        f64::from_value(value).map(|x| x as f32)
    }
}

impl ColumnType for String {
    const FIELD_TYPE: FieldType = FieldType::String;

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Uuid(u) => Ok(u.to_string()),
            other => mismatch(FieldType::String, other),
        }
    }
}

impl ColumnType for Uuid {
    const FIELD_TYPE: FieldType = FieldType::Uuid;

    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        let parse_error = |v: String| ValueError::Parse {
            expected: FieldType::Uuid,
            value: v,
        };
        match value {
            Value::Uuid(u) => Ok(*u),
            Value::String(s) => Uuid::parse_str(s).map_err(|_| parse_error(s.clone())),
            Value::Bytes(b) => Uuid::from_slice(b).map_err(|_| parse_error(format!("{b:?}"))),
            other => mismatch(FieldType::Uuid, other),
        }
    }
}

impl ColumnType for DateTime<Utc> {
    const FIELD_TYPE: FieldType = FieldType::DateTime;

    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| ValueError::Parse {
                    expected: FieldType::DateTime,
                    value: s.clone(),
                }),
            Value::Int(secs) => {
                DateTime::from_timestamp(*secs, 0).ok_or_else(|| ValueError::OutOfRange {
                    expected: FieldType::DateTime,
                    value: secs.to_string(),
                })
            }
            other => mismatch(FieldType::DateTime, other),
        }
    }
}

impl ColumnType for Vec<u8> {
    const FIELD_TYPE: FieldType = FieldType::Bytes;

    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Bytes(b) => Ok(b.clone()),
            other => mismatch(FieldType::Bytes, other),
        }
    }
}

impl<T: ColumnType> ColumnType for Option<T> {
    const FIELD_TYPE: FieldType = T::FIELD_TYPE;
    const NULLABLE: bool = true;

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ColumnType::to_value)
    }

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
