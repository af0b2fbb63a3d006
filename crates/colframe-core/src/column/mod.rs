//! Typed columns and the missing-value model.
//!
//! Every column type reserves one value of its storage width to mean "missing":
//! the minimum integer for integer and packed temporal types, NaN for floats,
//! `i8::MIN` for booleans, and the empty string for strings. Checking a row for
//! missing is a single comparison.
//!
//! [`Column`] is a closed enum over the typed columns; operations that depend on
//! the type match on it exhaustively.

mod boolean;
mod primitive;
mod string;
mod value;

pub use boolean::BooleanColumn;
pub(crate) use boolean::parse_bool;
pub use primitive::{
    DateColumn, DateTimeColumn, Float32Column, Float64Column, InstantColumn, Int16Column,
    Int32Column, Int64Column, Int8Column, Numeric, NumericColumn, PackedColumn, Primitive,
    PrimitiveColumn, TimeColumn,
};
pub use string::StringColumn;
pub use value::Value;

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::selection::Selection;
use crate::temporal::{PackedDate, PackedDateTime, PackedInstant, PackedTime};

/// The closed set of column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Boolean,
    /// Dictionary-encoded strings.
    String,
    /// Plain strings.
    Text,
    Date,
    Time,
    DateTime,
    Instant,
}

impl ColumnType {
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ColumnType::Int8
                | ColumnType::Int16
                | ColumnType::Int32
                | ColumnType::Int64
                | ColumnType::Float32
                | ColumnType::Float64
        )
    }

    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            ColumnType::Date | ColumnType::Time | ColumnType::DateTime | ColumnType::Instant
        )
    }

    pub fn is_string(self) -> bool {
        matches!(self, ColumnType::String | ColumnType::Text)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A named column of any supported type.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Int8(Int8Column),
    Int16(Int16Column),
    Int32(Int32Column),
    Int64(Int64Column),
    Float32(Float32Column),
    Float64(Float64Column),
    Boolean(BooleanColumn),
    String(StringColumn),
    Date(DateColumn),
    Time(TimeColumn),
    DateTime(DateTimeColumn),
    Instant(InstantColumn),
}

/// Run `$body` with `$col` bound to the typed column, whatever its variant.
macro_rules! dispatch {
    ($value:expr, $col:ident => $body:expr) => {
        match $value {
            Column::Int8($col) => $body,
            Column::Int16($col) => $body,
            Column::Int32($col) => $body,
            Column::Int64($col) => $body,
            Column::Float32($col) => $body,
            Column::Float64($col) => $body,
            Column::Boolean($col) => $body,
            Column::String($col) => $body,
            Column::Date($col) => $body,
            Column::Time($col) => $body,
            Column::DateTime($col) => $body,
            Column::Instant($col) => $body,
        }
    };
}

/// Like `dispatch!`, but `$body` yields a typed column of the same variant.
macro_rules! map_column {
    ($value:expr, $col:ident => $body:expr) => {
        match $value {
            Column::Int8($col) => Column::Int8($body),
            Column::Int16($col) => Column::Int16($body),
            Column::Int32($col) => Column::Int32($body),
            Column::Int64($col) => Column::Int64($body),
            Column::Float32($col) => Column::Float32($body),
            Column::Float64($col) => Column::Float64($body),
            Column::Boolean($col) => Column::Boolean($body),
            Column::String($col) => Column::String($body),
            Column::Date($col) => Column::Date($body),
            Column::Time($col) => Column::Time($body),
            Column::DateTime($col) => Column::DateTime($body),
            Column::Instant($col) => Column::Instant($body),
        }
    };
}

macro_rules! column_from {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Column {
            fn from(column: $ty) -> Self {
                Column::$variant(column)
            }
        }
    };
}

column_from!(Int8Column, Int8);
column_from!(Int16Column, Int16);
column_from!(Int32Column, Int32);
column_from!(Int64Column, Int64);
column_from!(Float32Column, Float32);
column_from!(Float64Column, Float64);
column_from!(BooleanColumn, Boolean);
column_from!(StringColumn, String);
column_from!(DateColumn, Date);
column_from!(TimeColumn, Time);
column_from!(DateTimeColumn, DateTime);
column_from!(InstantColumn, Instant);

fn append_primitive<T: Primitive>(column: &mut PrimitiveColumn<T>, value: &Value) -> Result<()> {
    if value.is_missing() {
        column.append_missing();
        return Ok(());
    }
    let typed = T::from_value(value).ok_or_else(|| {
        Error::unsupported(format!(
            "cannot append {value:?} to {} column '{}'",
            T::COLUMN_TYPE,
            column.name()
        ))
    })?;
    column.append(typed);
    Ok(())
}

fn set_primitive<T: Primitive>(column: &mut PrimitiveColumn<T>, row: usize, value: &Value) -> Result<()> {
    if value.is_missing() {
        return column.set_missing(row);
    }
    let typed = T::from_value(value).ok_or_else(|| {
        Error::unsupported(format!(
            "cannot store {value:?} in {} column '{}'",
            T::COLUMN_TYPE,
            column.name()
        ))
    })?;
    column.set(row, typed)
}

fn append_parsed<T: Primitive>(column: &mut PrimitiveColumn<T>, text: &str) -> Result<()> {
    if text.is_empty() {
        column.append_missing();
    } else {
        column.append(T::parse(text)?);
    }
    Ok(())
}

impl Column {
    /// An empty column of the given type.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        let name = name.into();
        match column_type {
            ColumnType::Int8 => Column::Int8(Int8Column::new(name)),
            ColumnType::Int16 => Column::Int16(Int16Column::new(name)),
            ColumnType::Int32 => Column::Int32(Int32Column::new(name)),
            ColumnType::Int64 => Column::Int64(Int64Column::new(name)),
            ColumnType::Float32 => Column::Float32(Float32Column::new(name)),
            ColumnType::Float64 => Column::Float64(Float64Column::new(name)),
            ColumnType::Boolean => Column::Boolean(BooleanColumn::new(name)),
            ColumnType::String => Column::String(StringColumn::dictionary(name)),
            ColumnType::Text => Column::String(StringColumn::plain(name)),
            ColumnType::Date => Column::Date(DateColumn::new(name)),
            ColumnType::Time => Column::Time(TimeColumn::new(name)),
            ColumnType::DateTime => Column::DateTime(DateTimeColumn::new(name)),
            ColumnType::Instant => Column::Instant(InstantColumn::new(name)),
        }
    }

    pub fn int32(name: impl Into<String>, values: &[i32]) -> Self {
        Column::Int32(Int32Column::from_values(name, values.to_vec()))
    }

    pub fn int64(name: impl Into<String>, values: &[i64]) -> Self {
        Column::Int64(Int64Column::from_values(name, values.to_vec()))
    }

    pub fn float64(name: impl Into<String>, values: &[f64]) -> Self {
        Column::Float64(Float64Column::from_values(name, values.to_vec()))
    }

    pub fn boolean(name: impl Into<String>, values: &[Option<bool>]) -> Self {
        Column::Boolean(BooleanColumn::from_options(name, values))
    }

    /// A dictionary-encoded string column.
    pub fn string(name: impl Into<String>, values: &[&str]) -> Self {
        Column::String(StringColumn::from_strs(name, values))
    }

    /// A plain string column.
    pub fn text(name: impl Into<String>, values: &[&str]) -> Self {
        Column::String(StringColumn::plain_from_strs(name, values))
    }

    pub fn date(name: impl Into<String>, values: &[PackedDate]) -> Self {
        Column::Date(DateColumn::from_values(name, values.to_vec()))
    }

    pub fn time(name: impl Into<String>, values: &[PackedTime]) -> Self {
        Column::Time(TimeColumn::from_values(name, values.to_vec()))
    }

    pub fn datetime(name: impl Into<String>, values: &[PackedDateTime]) -> Self {
        Column::DateTime(DateTimeColumn::from_values(name, values.to_vec()))
    }

    pub fn instant(name: impl Into<String>, values: &[PackedInstant]) -> Self {
        Column::Instant(InstantColumn::from_values(name, values.to_vec()))
    }

    pub fn name(&self) -> &str {
        dispatch!(self, c => c.name())
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        dispatch!(self, c => c.set_name(name))
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Int8(_) => ColumnType::Int8,
            Column::Int16(_) => ColumnType::Int16,
            Column::Int32(_) => ColumnType::Int32,
            Column::Int64(_) => ColumnType::Int64,
            Column::Float32(_) => ColumnType::Float32,
            Column::Float64(_) => ColumnType::Float64,
            Column::Boolean(_) => ColumnType::Boolean,
            Column::String(c) => c.column_type(),
            Column::Date(_) => ColumnType::Date,
            Column::Time(_) => ColumnType::Time,
            Column::DateTime(_) => ColumnType::DateTime,
            Column::Instant(_) => ColumnType::Instant,
        }
    }

    pub fn len(&self) -> usize {
        dispatch!(self, c => c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_missing(&self, row: usize) -> bool {
        dispatch!(self, c => c.is_missing(row))
    }

    pub fn count_missing(&self) -> usize {
        dispatch!(self, c => c.count_missing())
    }

    pub fn unique_count(&self) -> usize {
        dispatch!(self, c => c.unique_count())
    }

    /// The cell at `row`; [`Value::Missing`] for missing rows.
    pub fn get(&self, row: usize) -> Result<Value> {
        Ok(match self {
            Column::Int8(c) => c.get(row)?.to_value(),
            Column::Int16(c) => c.get(row)?.to_value(),
            Column::Int32(c) => c.get(row)?.to_value(),
            Column::Int64(c) => c.get(row)?.to_value(),
            Column::Float32(c) => c.get(row)?.to_value(),
            Column::Float64(c) => c.get(row)?.to_value(),
            Column::Boolean(c) => c.get(row)?.map_or(Value::Missing, Value::Boolean),
            Column::String(c) => Value::from(c.get(row)?),
            Column::Date(c) => c.get(row)?.to_value(),
            Column::Time(c) => c.get(row)?.to_value(),
            Column::DateTime(c) => c.get(row)?.to_value(),
            Column::Instant(c) => c.get(row)?.to_value(),
        })
    }

    /// The cell at `row` formatted for output; empty for missing rows.
    pub fn get_string(&self, row: usize) -> Result<String> {
        dispatch!(self, c => c.get_string(row))
    }

    pub fn append_value(&mut self, value: &Value) -> Result<()> {
        match self {
            Column::Int8(c) => append_primitive(c, value),
            Column::Int16(c) => append_primitive(c, value),
            Column::Int32(c) => append_primitive(c, value),
            Column::Int64(c) => append_primitive(c, value),
            Column::Float32(c) => append_primitive(c, value),
            Column::Float64(c) => append_primitive(c, value),
            Column::Date(c) => append_primitive(c, value),
            Column::Time(c) => append_primitive(c, value),
            Column::DateTime(c) => append_primitive(c, value),
            Column::Instant(c) => append_primitive(c, value),
            Column::Boolean(c) => {
                match value {
                    Value::Missing => c.append_missing(),
                    Value::Boolean(v) => c.append(*v),
                    other => {
                        return Err(Error::unsupported(format!(
                            "cannot append {other:?} to Boolean column '{}'",
                            c.name()
                        )))
                    }
                };
                Ok(())
            }
            Column::String(c) => match value {
                Value::Missing => {
                    c.append_missing();
                    Ok(())
                }
                Value::String(v) => c.append(v).map(|_| ()),
                other => Err(Error::unsupported(format!(
                    "cannot append {other:?} to {} column '{}'",
                    c.column_type(),
                    c.name()
                ))),
            },
        }
    }

    /// Parse `text` according to the column type and append it. The empty
    /// string appends a missing value.
    pub fn append_str(&mut self, text: &str) -> Result<()> {
        match self {
            Column::Int8(c) => append_parsed(c, text),
            Column::Int16(c) => append_parsed(c, text),
            Column::Int32(c) => append_parsed(c, text),
            Column::Int64(c) => append_parsed(c, text),
            Column::Float32(c) => append_parsed(c, text),
            Column::Float64(c) => append_parsed(c, text),
            Column::Date(c) => append_parsed(c, text),
            Column::Time(c) => append_parsed(c, text),
            Column::DateTime(c) => append_parsed(c, text),
            Column::Instant(c) => append_parsed(c, text),
            Column::Boolean(c) => {
                if text.is_empty() {
                    c.append_missing();
                } else {
                    c.append(parse_bool(text)?);
                }
                Ok(())
            }
            Column::String(c) => c.append(text).map(|_| ()),
        }
    }

    pub fn append_missing(&mut self) {
        dispatch!(self, c => {
            c.append_missing();
        })
    }

    pub fn set_value(&mut self, row: usize, value: &Value) -> Result<()> {
        match self {
            Column::Int8(c) => set_primitive(c, row, value),
            Column::Int16(c) => set_primitive(c, row, value),
            Column::Int32(c) => set_primitive(c, row, value),
            Column::Int64(c) => set_primitive(c, row, value),
            Column::Float32(c) => set_primitive(c, row, value),
            Column::Float64(c) => set_primitive(c, row, value),
            Column::Date(c) => set_primitive(c, row, value),
            Column::Time(c) => set_primitive(c, row, value),
            Column::DateTime(c) => set_primitive(c, row, value),
            Column::Instant(c) => set_primitive(c, row, value),
            Column::Boolean(c) => match value {
                Value::Missing => c.set(row, None),
                Value::Boolean(v) => c.set(row, Some(*v)),
                other => Err(Error::unsupported(format!(
                    "cannot store {other:?} in Boolean column '{}'",
                    c.name()
                ))),
            },
            Column::String(c) => match value {
                Value::Missing => c.set_missing(row),
                Value::String(v) => c.set(row, v),
                other => Err(Error::unsupported(format!(
                    "cannot store {other:?} in {} column '{}'",
                    c.column_type(),
                    c.name()
                ))),
            },
        }
    }

    pub fn set_missing(&mut self, row: usize) -> Result<()> {
        dispatch!(self, c => c.set_missing(row))
    }

    /// Remove `row`, shifting later rows down, and return its value.
    pub fn remove(&mut self, row: usize) -> Result<Value> {
        let value = self.get(row)?;
        dispatch!(self, c => {
            c.remove(row)?;
        });
        Ok(value)
    }

    pub fn subset(&self, selection: &Selection) -> Result<Column> {
        Ok(map_column!(self, c => c.subset(selection)?))
    }

    pub fn take(&self, rows: &[usize]) -> Result<Column> {
        Ok(map_column!(self, c => c.take(rows)?))
    }

    pub fn empty_copy(&self) -> Column {
        map_column!(self, c => c.empty_copy())
    }

    /// Numeric and boolean columns widened to `f64`, with missing as NaN.
    pub fn as_f64_vec(&self) -> Result<Vec<f64>> {
        match self {
            Column::Int8(c) => Ok(c.as_f64_vec()),
            Column::Int16(c) => Ok(c.as_f64_vec()),
            Column::Int32(c) => Ok(c.as_f64_vec()),
            Column::Int64(c) => Ok(c.as_f64_vec()),
            Column::Float32(c) => Ok(c.as_f64_vec()),
            Column::Float64(c) => Ok(c.as_f64_vec()),
            Column::Boolean(c) => Ok(c.as_f64_vec()),
            Column::String(_)
            | Column::Date(_)
            | Column::Time(_)
            | Column::DateTime(_)
            | Column::Instant(_) => Err(Error::unsupported(format!(
                "{} column '{}' has no numeric representation",
                self.column_type(),
                self.name()
            ))),
        }
    }

    /// Order rows `a` and `b` by value; missing sorts first.
    pub fn compare_rows(&self, a: usize, b: usize) -> Ordering {
        dispatch!(self, c => c.compare_rows(a, b))
    }

    /// A grouping key for `row` that is stable within this column. Plain string
    /// columns have no fixed code and return `None`.
    pub(crate) fn key_bits(&self, row: usize) -> Option<u64> {
        Some(match self {
            Column::Int8(c) => c.get(row).ok()?.key_bits(),
            Column::Int16(c) => c.get(row).ok()?.key_bits(),
            Column::Int32(c) => c.get(row).ok()?.key_bits(),
            Column::Int64(c) => c.get(row).ok()?.key_bits(),
            Column::Float32(c) => c.get(row).ok()?.key_bits(),
            Column::Float64(c) => c.get(row).ok()?.key_bits(),
            Column::Boolean(c) => c.key_bits(row),
            Column::String(c) => c.code(row)? as u32 as u64,
            Column::Date(c) => c.get(row).ok()?.key_bits(),
            Column::Time(c) => c.get(row).ok()?.key_bits(),
            Column::DateTime(c) => c.get(row).ok()?.key_bits(),
            Column::Instant(c) => c.get(row).ok()?.key_bits(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_typed_columns() {
        for column_type in [
            ColumnType::Int8,
            ColumnType::Int16,
            ColumnType::Int32,
            ColumnType::Int64,
            ColumnType::Float32,
            ColumnType::Float64,
            ColumnType::Boolean,
            ColumnType::String,
            ColumnType::Text,
            ColumnType::Date,
            ColumnType::Time,
            ColumnType::DateTime,
            ColumnType::Instant,
        ] {
            let mut column = Column::new("c", column_type);
            assert_eq!(column.column_type(), column_type);
            column.append_missing();
            assert!(column.is_missing(0));
            assert_eq!(column.get(0).unwrap(), Value::Missing);
            assert_eq!(column.get_string(0).unwrap(), "");
            assert_eq!(column.empty_copy().len(), 0);
        }
    }

    #[test]
    fn test_append_str_parses_by_type() {
        let mut dates = Column::new("d", ColumnType::Date);
        dates.append_str("2024-02-29").unwrap();
        dates.append_str("").unwrap();
        assert_eq!(dates.get(0).unwrap(), Value::Date(PackedDate::of(2024, 2, 29).unwrap()));
        assert!(dates.is_missing(1));
        assert!(matches!(dates.append_str("2024-13-01"), Err(Error::InvalidData(_))));

        let mut flags = Column::new("f", ColumnType::Boolean);
        flags.append_str("yes").unwrap();
        assert_eq!(flags.get(0).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_append_value_type_checks() {
        let mut column = Column::new("n", ColumnType::Int32);
        column.append_value(&Value::Int32(4)).unwrap();
        column.append_value(&Value::Int8(2)).unwrap();
        column.append_value(&Value::Missing).unwrap();
        assert!(matches!(
            column.append_value(&Value::String("x".into())),
            Err(Error::UnsupportedOperation(_))
        ));
        assert_eq!(column.len(), 3);

        let mut text = Column::new("t", ColumnType::Text);
        assert!(text.append_value(&Value::Int32(1)).is_err());
        text.append_value(&Value::from("hello")).unwrap();
        assert_eq!(text.get_string(0).unwrap(), "hello");
    }

    #[test]
    fn test_as_f64_vec_by_type() {
        assert_eq!(Column::int32("n", &[1, 2]).as_f64_vec().unwrap(), vec![1.0, 2.0]);
        assert_eq!(
            Column::boolean("b", &[Some(true), Some(false)]).as_f64_vec().unwrap(),
            vec![1.0, 0.0]
        );
        assert!(matches!(
            Column::string("s", &["a"]).as_f64_vec(),
            Err(Error::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_remove_and_set_value() {
        let mut column = Column::string("s", &["a", "b", "c"]);
        assert_eq!(column.remove(1).unwrap(), Value::String("b".into()));
        column.set_value(0, &Value::Missing).unwrap();
        assert!(column.is_missing(0));
        assert_eq!(column.len(), 2);
        assert!(column.remove(5).is_err());
    }

    #[test]
    fn test_subset_preserves_type_and_name() {
        let column = Column::float64("x", &[1.0, 2.0, 3.0]);
        let subset = column.subset(&Selection::with(&[0, 2])).unwrap();
        assert_eq!(subset.name(), "x");
        assert_eq!(subset.column_type(), ColumnType::Float64);
        assert_eq!(subset.as_f64_vec().unwrap(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_column_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Column>();
        assert_send_sync::<Selection>();
    }
}
