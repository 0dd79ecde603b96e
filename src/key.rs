//! Primary key values.

use std::fmt;

use crate::value::Value;

/// Value(s) identifying one row.
///
/// A [`Key::Simple`] value applies to every key property. A
/// [`Key::Composite`] key is matched to key properties by exact name.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Simple(Value),
    Composite(Vec<(String, Value)>),
}

/// A type carrying named values for a composite key.
///
/// ```
/// use tablemap::{Key, KeyDescriptor, Value};
///
/// struct OrderLineKey {
///     order_id: i64,
///     line_no: i32,
/// }
///
/// impl KeyDescriptor for OrderLineKey {
///     fn key_values(&self) -> Vec<(String, Value)> {
///         vec![
///             ("order_id".into(), self.order_id.into()),
///             ("line_no".into(), self.line_no.into()),
///         ]
///     }
/// }
///
/// let key = Key::composite(&OrderLineKey { order_id: 5, line_no: 2 });
/// assert_eq!(key.to_string(), "{order_id: 5, line_no: 2}");
/// ```
pub trait KeyDescriptor {
    fn key_values(&self) -> Vec<(String, Value)>;
}

impl KeyDescriptor for [(&str, Value)] {
    fn key_values(&self) -> Vec<(String, Value)> {
        self.iter().map(|(n, v)| (n.to_string(), v.clone())).collect()
    }
}

impl<const N: usize> KeyDescriptor for [(&str, Value); N] {
    fn key_values(&self) -> Vec<(String, Value)> {
        self.as_slice().key_values()
    }
}

impl Key {
    pub fn composite(descriptor: &(impl KeyDescriptor + ?Sized)) -> Self {
        Key::Composite(descriptor.key_values())
    }

    /// Value for a key property: the simple value, or the composite entry
    /// whose name equals `property` exactly.
    pub fn value_for(&self, property: &str) -> Option<&Value> {
        match self {
            Key::Simple(value) => Some(value),
            Key::Composite(values) => values
                .iter()
                .find(|(name, _)| name == property)
                .map(|(_, value)| value),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Simple(value) => write!(f, "{value}"),
            Key::Composite(values) => {
                write!(f, "{{")?;
                for (i, (name, value)) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<Value> for Key {
    fn from(value: Value) -> Self {
        Key::Simple(value)
    }
}

macro_rules! key_from_scalar {
    ($($t:ty),*) => {
        $(impl From<$t> for Key {
            fn from(v: $t) -> Self {
                Key::Simple(Value::from(v))
            }
        })*
    };
}

key_from_scalar!(
    i8, i16, i32, i64, u8, u16, u32, u64, bool, &str, String,
    uuid::Uuid, chrono::DateTime<chrono::Utc>
);
