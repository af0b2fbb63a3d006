//! Single cell values.

use std::fmt;

use crate::temporal::{PackedDate, PackedDateTime, PackedInstant, PackedTime};

/// One cell, as read from or appended to a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Missing,
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Boolean(bool),
    String(String),
    Date(PackedDate),
    Time(PackedTime),
    DateTime(PackedDateTime),
    Instant(PackedInstant),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric and boolean values widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int8(v) => Some(f64::from(v)),
            Value::Int16(v) => Some(f64::from(v)),
            Value::Int32(v) => Some(f64::from(v)),
            Value::Int64(v) => Some(v as f64),
            Value::Float32(v) => Some(f64::from(v)),
            Value::Float64(v) => Some(v),
            Value::Boolean(v) => Some(if v { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Int8(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Date(v) => write!(f, "{v}"),
            Value::Time(v) => write!(f, "{v}"),
            Value::DateTime(v) => write!(f, "{v}"),
            Value::Instant(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Value::Missing
        } else {
            Value::String(value.to_string())
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Value::Missing
        } else {
            Value::String(value)
        }
    }
}

macro_rules! value_from {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::$variant(value)
            }
        }
    };
}

value_from!(i8, Int8);
value_from!(i16, Int16);
value_from!(i32, Int32);
value_from!(i64, Int64);
value_from!(f32, Float32);
value_from!(f64, Float64);
value_from!(bool, Boolean);
value_from!(PackedDate, Date);
value_from!(PackedTime, Time);
value_from!(PackedDateTime, DateTime);
value_from!(PackedInstant, Instant);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Missing, Into::into)
    }
}
