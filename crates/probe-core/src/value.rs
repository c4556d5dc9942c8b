//! Borrowed view of an arbitrary runtime value, ready for serialization.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use crate::host::short_type_name;
use crate::math::{Color, Quaternion, Vector2, Vector3};
use crate::HostObject;

/// A runtime value as the serializer sees it.
///
/// Collections stay borrowed behind [`Sequence`] so an oversized one can be
/// summarised without touching its elements.
pub enum Value<'a> {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(Cow<'a, str>),
    /// Enumeration value, carried by its symbolic name.
    Enum {
        type_name: &'static str,
        variant: &'static str,
    },
    Vector2(Vector2),
    Vector3(Vector3),
    Quaternion(Quaternion),
    Color(Color),
    /// Reference to a host-managed object. Never expanded by the serializer.
    Object(Arc<dyn HostObject>),
    /// Ordered collection.
    Seq(&'a dyn Sequence),
    /// Anything without a dedicated encoding: type name plus display form.
    Opaque { type_name: String, display: String },
    /// An owned value produced on the fly (e.g. a computed property).
    Owned(Box<dyn ToValue + 'a>),
}

impl<'a> Value<'a> {
    /// Opaque value built from a `Debug` rendering.
    pub fn opaque<T: std::fmt::Debug + ?Sized>(value: &T) -> Self {
        Value::Opaque {
            type_name: short_type_name(std::any::type_name::<T>()),
            display: format!("{value:?}"),
        }
    }

    /// Wrap an owned value so it can outlive the expression that made it.
    pub fn owned<T: ToValue + 'a>(value: T) -> Self {
        Value::Owned(Box::new(value))
    }
}

/// An ordered, indexable collection.
pub trait Sequence {
    /// Short type name used in summary nodes.
    fn type_name(&self) -> String;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`; `index < len()`.
    fn item(&self, index: usize) -> Value<'_>;
}

/// Conversion into a [`Value`] view.
///
/// Implemented for scalars, strings, the geometric types, host object
/// references and the standard ordered collections. `#[derive(ToValue)]`
/// covers user enums (symbolic name) and plain structs (opaque `Debug` form).
pub trait ToValue {
    fn to_value(&self) -> Value<'_>;
}

macro_rules! int_to_value {
    ($($ty:ty),*) => {
        $(impl ToValue for $ty {
            fn to_value(&self) -> Value<'_> {
                Value::Int(i64::from(*self))
            }
        })*
    };
}

macro_rules! uint_to_value {
    ($($ty:ty),*) => {
        $(impl ToValue for $ty {
            fn to_value(&self) -> Value<'_> {
                Value::UInt(u64::from(*self))
            }
        })*
    };
}

int_to_value!(i8, i16, i32, i64);
uint_to_value!(u8, u16, u32, u64);

impl ToValue for isize {
    fn to_value(&self) -> Value<'_> {
        Value::Int(*self as i64)
    }
}

impl ToValue for usize {
    fn to_value(&self) -> Value<'_> {
        Value::UInt(*self as u64)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value<'_> {
        Value::Float(f64::from(*self))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value<'_> {
        Value::Float(*self)
    }
}

impl ToValue for char {
    fn to_value(&self) -> Value<'_> {
        Value::Str(Cow::Owned(self.to_string()))
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value<'_> {
        Value::Str(Cow::Borrowed(self))
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value<'_> {
        Value::Str(Cow::Borrowed(self.as_str()))
    }
}

impl ToValue for &str {
    fn to_value(&self) -> Value<'_> {
        Value::Str(Cow::Borrowed(self))
    }
}

impl ToValue for Vector2 {
    fn to_value(&self) -> Value<'_> {
        Value::Vector2(*self)
    }
}

impl ToValue for Vector3 {
    fn to_value(&self) -> Value<'_> {
        Value::Vector3(*self)
    }
}

impl ToValue for Quaternion {
    fn to_value(&self) -> Value<'_> {
        Value::Quaternion(*self)
    }
}

impl ToValue for Color {
    fn to_value(&self) -> Value<'_> {
        Value::Color(*self)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value<'_> {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: HostObject> ToValue for Arc<T> {
    fn to_value(&self) -> Value<'_> {
        let erased: Arc<dyn HostObject> = Arc::clone(self) as Arc<dyn HostObject>;
        Value::Object(erased)
    }
}

impl ToValue for Arc<dyn HostObject> {
    fn to_value(&self) -> Value<'_> {
        Value::Object(Arc::clone(self))
    }
}

/// A weak link whose target was finalized serializes as null.
impl<T: HostObject> ToValue for Weak<T> {
    fn to_value(&self) -> Value<'_> {
        match self.upgrade() {
            Some(strong) => Value::Object(strong as Arc<dyn HostObject>),
            None => Value::Null,
        }
    }
}

impl<T: ToValue> Sequence for Vec<T> {
    fn type_name(&self) -> String {
        short_type_name(std::any::type_name::<Self>())
    }

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn item(&self, index: usize) -> Value<'_> {
        self[index].to_value()
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value<'_> {
        Value::Seq(self)
    }
}

impl<T: ToValue> Sequence for VecDeque<T> {
    fn type_name(&self) -> String {
        short_type_name(std::any::type_name::<Self>())
    }

    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn item(&self, index: usize) -> Value<'_> {
        self[index].to_value()
    }
}

impl<T: ToValue> ToValue for VecDeque<T> {
    fn to_value(&self) -> Value<'_> {
        Value::Seq(self)
    }
}

impl<T: ToValue, const N: usize> Sequence for [T; N] {
    fn type_name(&self) -> String {
        short_type_name(std::any::type_name::<Self>())
    }

    fn len(&self) -> usize {
        N
    }

    fn item(&self, index: usize) -> Value<'_> {
        self[index].to_value()
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value<'_> {
        Value::Seq(self)
    }
}
