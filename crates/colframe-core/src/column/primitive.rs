//! Fixed-width columns: integers, floats and packed temporal values.

use std::cmp::Ordering;
use std::fmt::Debug;

use rustc_hash::FxHashSet;

use super::{ColumnType, Value};
use crate::error::{Error, Result};
use crate::selection::Selection;
use crate::temporal::{PackedDate, PackedDateTime, PackedInstant, PackedTime};

/// A value type that can live in a [`PrimitiveColumn`].
///
/// Each implementation reserves one value of its width as [`Primitive::MISSING`].
pub trait Primitive: Copy + PartialOrd + Debug + Send + Sync + 'static {
    const MISSING: Self;
    const COLUMN_TYPE: ColumnType;

    fn is_missing_value(self) -> bool;

    /// A grouping key. Equal values produce equal keys and the missing value has
    /// its own key.
    fn key_bits(self) -> u64;

    /// Order between two non-missing values.
    fn compare(&self, other: &Self) -> Ordering;

    fn to_value(self) -> Value;

    fn from_value(value: &Value) -> Option<Self>;

    fn parse(text: &str) -> Result<Self>;

    fn format(self) -> String;
}

/// Primitives that take part in arithmetic reductions.
pub trait Numeric: Primitive {
    fn to_f64(self) -> f64;
}

macro_rules! int_primitive {
    ($ty:ty, $variant:ident) => {
        impl Primitive for $ty {
            const MISSING: Self = <$ty>::MIN;
            const COLUMN_TYPE: ColumnType = ColumnType::$variant;

            fn is_missing_value(self) -> bool {
                self == <$ty>::MIN
            }

            fn key_bits(self) -> u64 {
                self as i64 as u64
            }

            fn compare(&self, other: &Self) -> Ordering {
                self.cmp(other)
            }

            fn to_value(self) -> Value {
                if self.is_missing_value() {
                    Value::Missing
                } else {
                    Value::$variant(self)
                }
            }

            fn from_value(value: &Value) -> Option<Self> {
                match *value {
                    Value::Int8(v) => <$ty>::try_from(v).ok(),
                    Value::Int16(v) => <$ty>::try_from(v).ok(),
                    Value::Int32(v) => <$ty>::try_from(v).ok(),
                    Value::Int64(v) => <$ty>::try_from(v).ok(),
                    _ => None,
                }
                .filter(|v| !v.is_missing_value())
            }

            fn parse(text: &str) -> Result<Self> {
                let value = text.trim().parse::<$ty>().map_err(|e| {
                    Error::invalid(format!("'{text}' is not a valid {}: {e}", stringify!($ty)))
                })?;
                if value.is_missing_value() {
                    return Err(Error::invalid(format!(
                        "{text} is reserved as the missing value"
                    )));
                }
                Ok(value)
            }

            fn format(self) -> String {
                if self.is_missing_value() {
                    String::new()
                } else {
                    self.to_string()
                }
            }
        }

        impl Numeric for $ty {
            fn to_f64(self) -> f64 {
                if self.is_missing_value() {
                    f64::NAN
                } else {
                    self as f64
                }
            }
        }
    };
}

macro_rules! float_primitive {
    ($ty:ty, $variant:ident) => {
        impl Primitive for $ty {
            const MISSING: Self = <$ty>::NAN;
            const COLUMN_TYPE: ColumnType = ColumnType::$variant;

            fn is_missing_value(self) -> bool {
                self.is_nan()
            }

            fn key_bits(self) -> u64 {
                if self.is_nan() {
                    u64::MAX
                } else if self == 0.0 {
                    0
                } else {
                    (self as f64).to_bits()
                }
            }

            fn compare(&self, other: &Self) -> Ordering {
                self.total_cmp(other)
            }

            fn to_value(self) -> Value {
                if self.is_nan() {
                    Value::Missing
                } else {
                    Value::$variant(self)
                }
            }

            fn from_value(value: &Value) -> Option<Self> {
                match *value {
                    Value::Float32(v) => Some(v as $ty),
                    Value::Float64(v) => Some(v as $ty),
                    Value::Int8(v) => Some(v as $ty),
                    Value::Int16(v) => Some(v as $ty),
                    Value::Int32(v) => Some(v as $ty),
                    Value::Int64(v) => Some(v as $ty),
                    _ => None,
                }
            }

            fn parse(text: &str) -> Result<Self> {
                text.trim().parse::<$ty>().map_err(|e| {
                    Error::invalid(format!("'{text}' is not a valid {}: {e}", stringify!($ty)))
                })
            }

            fn format(self) -> String {
                if self.is_nan() {
                    String::new()
                } else {
                    self.to_string()
                }
            }
        }

        impl Numeric for $ty {
            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

int_primitive!(i8, Int8);
int_primitive!(i16, Int16);
int_primitive!(i32, Int32);
int_primitive!(i64, Int64);
float_primitive!(f32, Float32);
float_primitive!(f64, Float64);

macro_rules! packed_primitive {
    ($ty:ty, $variant:ident) => {
        impl Primitive for $ty {
            const MISSING: Self = <$ty>::MISSING;
            const COLUMN_TYPE: ColumnType = ColumnType::$variant;

            fn is_missing_value(self) -> bool {
                self.is_missing()
            }

            fn key_bits(self) -> u64 {
                self.raw() as i64 as u64
            }

            fn compare(&self, other: &Self) -> Ordering {
                self.cmp(other)
            }

            fn to_value(self) -> Value {
                if self.is_missing() {
                    Value::Missing
                } else {
                    Value::$variant(self)
                }
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(*v),
                    _ => None,
                }
            }

            fn parse(text: &str) -> Result<Self> {
                text.trim().parse()
            }

            fn format(self) -> String {
                self.to_string()
            }
        }
    };
}

packed_primitive!(PackedDate, Date);
packed_primitive!(PackedTime, Time);
packed_primitive!(PackedDateTime, DateTime);
packed_primitive!(PackedInstant, Instant);

/// A named column of fixed-width values stored contiguously.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveColumn<T: Primitive> {
    name: String,
    values: Vec<T>,
}

/// A column of integers or floats.
pub type NumericColumn<T> = PrimitiveColumn<T>;

/// A column of packed temporal values.
pub type PackedColumn<P> = PrimitiveColumn<P>;

impl<T: Primitive> PrimitiveColumn<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_values(name, Vec::new())
    }

    /// Wrap existing values. Sentinel values are treated as missing.
    pub fn from_values(name: impl Into<String>, values: Vec<T>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        Self::from_values(name, Vec::with_capacity(capacity))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn column_type(&self) -> ColumnType {
        T::COLUMN_TYPE
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The raw buffer, sentinels included.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.values.iter().copied()
    }

    pub fn append(&mut self, value: T) -> &mut Self {
        self.values.push(value);
        self
    }

    pub fn append_missing(&mut self) -> &mut Self {
        self.values.push(T::MISSING);
        self
    }

    /// The value at `row`; the sentinel when the row is missing.
    pub fn get(&self, row: usize) -> Result<T> {
        self.values
            .get(row)
            .copied()
            .ok_or_else(|| Error::out_of_range(row, self.values.len()))
    }

    /// Whether `row` holds the missing sentinel. Rows past the end are not missing.
    pub fn is_missing(&self, row: usize) -> bool {
        self.values.get(row).is_some_and(|v| v.is_missing_value())
    }

    pub fn set(&mut self, row: usize, value: T) -> Result<()> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(row)
            .ok_or_else(|| Error::out_of_range(row, len))?;
        *slot = value;
        Ok(())
    }

    pub fn set_missing(&mut self, row: usize) -> Result<()> {
        self.set(row, T::MISSING)
    }

    pub fn count_missing(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing_value()).count()
    }

    pub fn remove(&mut self, row: usize) -> Result<T> {
        if row >= self.values.len() {
            return Err(Error::out_of_range(row, self.values.len()));
        }
        Ok(self.values.remove(row))
    }

    /// The rows of `selection`, in ascending order.
    pub fn subset(&self, selection: &Selection) -> Result<Self> {
        let mut values = Vec::with_capacity(selection.len());
        for row in selection {
            values.push(self.get(row as usize)?);
        }
        Ok(Self::from_values(self.name.clone(), values))
    }

    /// The given rows, in the given order. Rows may repeat.
    pub fn take(&self, rows: &[usize]) -> Result<Self> {
        let values = rows
            .iter()
            .map(|&row| self.get(row))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_values(self.name.clone(), values))
    }

    pub fn empty_copy(&self) -> Self {
        Self::new(self.name.clone())
    }

    /// Number of distinct non-missing values.
    pub fn unique_count(&self) -> usize {
        self.values
            .iter()
            .filter(|v| !v.is_missing_value())
            .map(|v| v.key_bits())
            .collect::<FxHashSet<_>>()
            .len()
    }

    pub fn get_string(&self, row: usize) -> Result<String> {
        Ok(self.get(row)?.format())
    }

    /// Order rows `a` and `b`; missing sorts first.
    pub fn compare_rows(&self, a: usize, b: usize) -> Ordering {
        match (self.values.get(a), self.values.get(b)) {
            (Some(x), Some(y)) => match (x.is_missing_value(), y.is_missing_value()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => x.compare(y),
            },
            _ => Ordering::Equal,
        }
    }
}

impl<T: Numeric> PrimitiveColumn<T> {
    /// Values widened to `f64`, with missing as NaN.
    pub fn as_f64_vec(&self) -> Vec<f64> {
        self.values.iter().map(|v| v.to_f64()).collect()
    }
}

impl<T: Primitive> FromIterator<T> for PrimitiveColumn<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_values(String::new(), iter.into_iter().collect())
    }
}

pub type Int8Column = PrimitiveColumn<i8>;
pub type Int16Column = PrimitiveColumn<i16>;
pub type Int32Column = PrimitiveColumn<i32>;
pub type Int64Column = PrimitiveColumn<i64>;
pub type Float32Column = PrimitiveColumn<f32>;
pub type Float64Column = PrimitiveColumn<f64>;
pub type DateColumn = PrimitiveColumn<PackedDate>;
pub type TimeColumn = PrimitiveColumn<PackedTime>;
pub type DateTimeColumn = PrimitiveColumn<PackedDateTime>;
pub type InstantColumn = PrimitiveColumn<PackedInstant>;
