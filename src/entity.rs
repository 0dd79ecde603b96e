//! Entity metadata.
//!
//! An [`Entity`] exposes an ahead-of-time field table instead of runtime
//! reflection. The [`entity!`](crate::entity!) macro generates the struct,
//! the trait impl and one typed [`Prop`] constant per field:
//!
//! ```
//! use tablemap::entity;
//!
//! entity! {
//!     #[derive(Debug, Clone, Default, PartialEq)]
//!     pub struct Customer {
//!         pub id: i64,
//!         pub name: String,
//!         pub email: Option<String>,
//!     }
//! }
//!
//! let predicate = Customer::name.eq("Ada").and(Customer::email.is_not_null());
//! # let _ = predicate;
//! ```

use std::fmt;
use std::marker::PhantomData;

use crate::row::Row;
use crate::value::{FieldType, Value, ValueError};

/// One entry of an entity's field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: &'static str,
    pub field_type: FieldType,
    pub nullable: bool,
}

impl FieldInfo {
    pub const fn new(name: &'static str, field_type: FieldType, nullable: bool) -> Self {
        Self {
            name,
            field_type,
            nullable,
        }
    }
}

/// A plain data type representing one row of a mapped table.
pub trait Entity: Sized + 'static {
    /// Bare type name, the default table name.
    fn type_name() -> &'static str;

    /// Fields in declaration order.
    fn fields() -> &'static [FieldInfo];

    /// Current value of a field (case-insensitive name).
    fn field_value(&self, name: &str) -> Option<Value>;

    /// Materialize from a row labelled by property name.
    fn from_row(row: &Row) -> Result<Self, ValueError>;
}

/// Anything that names a property: a typed [`Prop`] or a string.
pub trait PropertyRef {
    fn property_name(&self) -> &str;
}

impl PropertyRef for str {
    fn property_name(&self) -> &str {
        self
    }
}

impl PropertyRef for String {
    fn property_name(&self) -> &str {
        self
    }
}

impl<E> PropertyRef for Prop<E> {
    fn property_name(&self) -> &str {
        self.name
    }
}

impl<T: PropertyRef + ?Sized> PropertyRef for &T {
    fn property_name(&self) -> &str {
        (**self).property_name()
    }
}

/// Collect property names from a list of references.
pub fn property_names<P: PropertyRef>(props: &[P]) -> Vec<String> {
    props.iter().map(|p| p.property_name().to_string()).collect()
}

/// Typed reference to a property of `E`.
///
/// Generated as associated constants by [`entity!`](crate::entity!), e.g.
/// `Customer::name`. Comparison builders live in [`crate::translate`].
pub struct Prop<E> {
    name: &'static str,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Prop<E> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _entity: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<E> Clone for Prop<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Prop<E> {}

impl<E> PartialEq for Prop<E> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<E> Eq for Prop<E> {}

impl<E> fmt::Debug for Prop<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Prop").field(&self.name).finish()
    }
}

/// Declare an entity struct together with its field table.
///
/// Every field type must implement [`ColumnType`](crate::ColumnType) and
/// `Default`; fields missing from a result row keep their default.
#[macro_export]
macro_rules! entity {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$field_meta:meta])* $field_vis:vis $field:ident : $field_ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$field_meta])* $field_vis $field: $field_ty, )*
        }

        #[allow(non_upper_case_globals)]
        impl $name {
            $(
                pub const $field: $crate::Prop<$name> = $crate::Prop::new(stringify!($field));
            )*
        }

        impl $crate::Entity for $name {
            fn type_name() -> &'static str {
                stringify!($name)
            }

            fn fields() -> &'static [$crate::FieldInfo] {
                const FIELDS: &[$crate::FieldInfo] = &[
                    $(
                        $crate::FieldInfo::new(
                            stringify!($field),
                            <$field_ty as $crate::ColumnType>::FIELD_TYPE,
                            <$field_ty as $crate::ColumnType>::NULLABLE,
                        ),
                    )*
                ];
                FIELDS
            }

            fn field_value(&self, name: &str) -> Option<$crate::Value> {
                $(
                    if name.eq_ignore_ascii_case(stringify!($field)) {
                        return Some($crate::ColumnType::to_value(&self.$field));
                    }
                )*
                None
            }

            fn from_row(row: &$crate::Row) -> Result<Self, $crate::ValueError> {
                Ok(Self {
                    $( $field: row.get_or_default::<$field_ty>(stringify!($field))?, )*
                })
            }
        }
    };
}
