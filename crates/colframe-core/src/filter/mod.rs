//! Predicate evaluation.
//!
//! Typed columns expose predicate methods that scan their rows once and return
//! a [`Selection`]. Apart from the missing-value predicates, no predicate ever
//! matches a missing row.
//!
//! [`Filter`] is the type-erased form used against a [`Table`]: a tree of
//! [`Predicate`]s on named columns combined with `AllOf`, `AnyOf` and `Not`.

mod boolean;
mod numeric;
mod string;
mod temporal;

pub use numeric::NumericPredicates;
pub use temporal::{DatePredicates, HasDate, HasTime, Temporal, TemporalPredicates, TimePredicates};

use time::Weekday;
use tracing::trace;

use crate::column::{Column, Numeric, Primitive, PrimitiveColumn, Value};
use crate::error::{Error, Result};
use crate::selection::Selection;
use crate::table::Table;

/// Rows `0..len` for which `matches` holds, with the backing picked by density.
pub(crate) fn scan(len: usize, mut matches: impl FnMut(usize) -> bool) -> Selection {
    let rows: Vec<u32> = (0..len).filter(|row| matches(*row)).map(|row| row as u32).collect();
    Selection::from_sorted_rows(&rows, len)
}

/// A binary comparison, used for scalar and column-to-column predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl Comparison {
    pub fn test<T: PartialOrd + ?Sized>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            Comparison::Equal => lhs == rhs,
            Comparison::NotEqual => lhs != rhs,
            Comparison::GreaterThan => lhs > rhs,
            Comparison::GreaterThanOrEqual => lhs >= rhs,
            Comparison::LessThan => lhs < rhs,
            Comparison::LessThanOrEqual => lhs <= rhs,
        }
    }
}

/// A single-column predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    IsMissing,
    IsNotMissing,

    /// Compare each row with a scalar. For temporal columns `LessThan` reads as
    /// "before" and `GreaterThan` as "after".
    Compare(Comparison, Value),
    BetweenInclusive(Value, Value),
    BetweenExclusive(Value, Value),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    /// Compare each row with the same row of another column.
    CompareColumn(Comparison, String),

    IsZero,
    IsPositive,
    IsNegative,
    IsNonNegative,
    /// Strictly within `margin` of `target`.
    IsCloseTo { target: f64, margin: f64 },

    IsTrue,
    IsFalse,

    StartsWith(String),
    EndsWith(String),
    ContainsString(String),
    MatchesRegex(String),
    EqualsIgnoreCase(String),
    IsLongerThan(usize),
    IsShorterThan(usize),
    LengthEquals(usize),
    IsUpperCase,
    IsLowerCase,
    IsAlpha,
    IsNumeric,
    IsAlphaNumeric,

    IsInYear(i32),
    IsInMonth(u8),
    IsInQuarter(u8),
    IsDayOfWeek(Weekday),
    IsWeekend,
    IsWeekday,
    IsFirstDayOfMonth,
    IsLastDayOfMonth,
    IsMidnight,
    IsNoon,
    IsBeforeNoon,
    IsAfterNoon,
}

impl Predicate {
    pub fn equal_to(value: impl Into<Value>) -> Self {
        Predicate::Compare(Comparison::Equal, value.into())
    }

    pub fn not_equal_to(value: impl Into<Value>) -> Self {
        Predicate::Compare(Comparison::NotEqual, value.into())
    }

    pub fn greater_than(value: impl Into<Value>) -> Self {
        Predicate::Compare(Comparison::GreaterThan, value.into())
    }

    pub fn greater_than_or_equal_to(value: impl Into<Value>) -> Self {
        Predicate::Compare(Comparison::GreaterThanOrEqual, value.into())
    }

    pub fn less_than(value: impl Into<Value>) -> Self {
        Predicate::Compare(Comparison::LessThan, value.into())
    }

    pub fn less_than_or_equal_to(value: impl Into<Value>) -> Self {
        Predicate::Compare(Comparison::LessThanOrEqual, value.into())
    }

    pub fn between_inclusive(low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Predicate::BetweenInclusive(low.into(), high.into())
    }

    /// Evaluate against `column`. `table` resolves the other side of
    /// column-to-column comparisons.
    pub fn evaluate(&self, column: &Column, table: &Table) -> Result<Selection> {
        match self {
            Predicate::IsMissing => Ok(scan(column.len(), |row| column.is_missing(row))),
            Predicate::IsNotMissing => Ok(scan(column.len(), |row| !column.is_missing(row))),
            Predicate::CompareColumn(op, other) => {
                let other = table.column(other)?;
                compare_columns(column, other, *op)
            }
            _ => match column {
                Column::Int8(c) => numeric_predicate(c, self),
                Column::Int16(c) => numeric_predicate(c, self),
                Column::Int32(c) => numeric_predicate(c, self),
                Column::Int64(c) => numeric_predicate(c, self),
                Column::Float32(c) => numeric_predicate(c, self),
                Column::Float64(c) => numeric_predicate(c, self),
                Column::Boolean(c) => boolean::evaluate(c, self),
                Column::String(c) => string::evaluate(c, self),
                Column::Date(c) => temporal::evaluate_date_like(c, self),
                Column::Time(c) => temporal::evaluate_time(c, self),
                Column::DateTime(c) => temporal::evaluate_date_time_like(c, self),
                Column::Instant(c) => temporal::evaluate_date_time_like(c, self),
            },
        }
    }
}

pub(crate) fn unsupported(predicate: &Predicate, column_type: impl std::fmt::Display) -> Error {
    Error::unsupported(format!("{predicate:?} is not defined for {column_type} columns"))
}

fn scalar_f64(value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| Error::unsupported(format!("{value:?} is not a numeric operand")))
}

fn numeric_predicate<T: Numeric>(column: &PrimitiveColumn<T>, predicate: &Predicate) -> Result<Selection> {
    Ok(match predicate {
        Predicate::Compare(op, value) => column.compare_to(*op, scalar_f64(value)?),
        Predicate::BetweenInclusive(low, high) => {
            column.is_between_inclusive(scalar_f64(low)?, scalar_f64(high)?)
        }
        Predicate::BetweenExclusive(low, high) => {
            column.is_between_exclusive(scalar_f64(low)?, scalar_f64(high)?)
        }
        Predicate::In(values) => {
            column.is_in(&values.iter().map(scalar_f64).collect::<Result<Vec<_>>>()?)
        }
        Predicate::NotIn(values) => {
            column.is_not_in(&values.iter().map(scalar_f64).collect::<Result<Vec<_>>>()?)
        }
        Predicate::IsZero => column.is_zero(),
        Predicate::IsPositive => column.is_positive(),
        Predicate::IsNegative => column.is_negative(),
        Predicate::IsNonNegative => column.is_non_negative(),
        Predicate::IsCloseTo { target, margin } => column.is_close_to(*target, *margin),
        other => return Err(unsupported(other, T::COLUMN_TYPE)),
    })
}

/// Row-wise comparison of two columns of compatible types.
pub fn compare_columns(lhs: &Column, rhs: &Column, op: Comparison) -> Result<Selection> {
    if lhs.len() != rhs.len() {
        return Err(Error::length_mismatch(lhs.len(), rhs.len()));
    }
    let both_present = |row: usize| !lhs.is_missing(row) && !rhs.is_missing(row);
    match (lhs, rhs) {
        (Column::String(a), Column::String(b)) => Ok(scan(lhs.len(), |row| {
            both_present(row) && op.test(a.get(row).unwrap_or(""), b.get(row).unwrap_or(""))
        })),
        (Column::Date(a), Column::Date(b)) => Ok(compare_primitive(a, b, op)),
        (Column::Time(a), Column::Time(b)) => Ok(compare_primitive(a, b, op)),
        (Column::DateTime(a), Column::DateTime(b)) => Ok(compare_primitive(a, b, op)),
        (Column::Instant(a), Column::Instant(b)) => Ok(compare_primitive(a, b, op)),
        _ => {
            let left_numeric = lhs.column_type().is_numeric() || matches!(lhs, Column::Boolean(_));
            let right_numeric = rhs.column_type().is_numeric() || matches!(rhs, Column::Boolean(_));
            if !(left_numeric && right_numeric) {
                return Err(Error::unsupported(format!(
                    "cannot compare {} column '{}' with {} column '{}'",
                    lhs.column_type(),
                    lhs.name(),
                    rhs.column_type(),
                    rhs.name()
                )));
            }
            let a = lhs.as_f64_vec()?;
            let b = rhs.as_f64_vec()?;
            Ok(scan(a.len(), |row| both_present(row) && op.test(&a[row], &b[row])))
        }
    }
}

fn compare_primitive<T: Primitive>(lhs: &PrimitiveColumn<T>, rhs: &PrimitiveColumn<T>, op: Comparison) -> Selection {
    let (a, b) = (lhs.values(), rhs.values());
    scan(a.len(), |row| {
        !a[row].is_missing_value() && !b[row].is_missing_value() && op.test(&a[row], &b[row])
    })
}

/// A tree of predicates over named columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Column { name: String, predicate: Predicate },
    /// Rows matching every child. Empty selects every row.
    AllOf(Vec<Filter>),
    /// Rows matching any child. Empty selects nothing.
    AnyOf(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn column(name: impl Into<String>, predicate: Predicate) -> Self {
        Filter::Column {
            name: name.into(),
            predicate,
        }
    }

    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::AllOf(mut children) => {
                children.push(other);
                Filter::AllOf(children)
            }
            first => Filter::AllOf(vec![first, other]),
        }
    }

    pub fn or(self, other: Filter) -> Self {
        match self {
            Filter::AnyOf(mut children) => {
                children.push(other);
                Filter::AnyOf(children)
            }
            first => Filter::AnyOf(vec![first, other]),
        }
    }

    pub fn negate(self) -> Self {
        Filter::Not(Box::new(self))
    }

    /// Evaluate against `table`, returning the matching rows.
    pub fn apply(&self, table: &Table) -> Result<Selection> {
        let rows = table.row_count() as u32;
        match self {
            Filter::Column { name, predicate } => {
                let column = table.column(name)?;
                let selection = predicate.evaluate(column, table)?;
                trace!(column = %name, ?predicate, matched = selection.len(), "Evaluated predicate");
                Ok(selection)
            }
            Filter::AllOf(children) => {
                let mut result = Selection::with_range(0, rows);
                for child in children {
                    result.and(&child.apply(table)?);
                }
                Ok(result)
            }
            Filter::AnyOf(children) => {
                let mut result = Selection::new();
                for child in children {
                    result.or(&child.apply(table)?);
                }
                Ok(result)
            }
            Filter::Not(child) => {
                let mut result = Selection::with_range(0, rows);
                result.and_not(&child.apply(table)?);
                Ok(result)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::with_columns(
            "people",
            vec![
                Column::string("who", &["A", "B", "", "C"]),
                Column::int32("score", &[10, 20, 30, i32::MIN]),
                Column::int32("target", &[10, 25, 5, 1]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_column_predicate() {
        let t = table();
        let selection = Filter::column("score", Predicate::greater_than(15)).apply(&t).unwrap();
        assert_eq!(selection.to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_missing_rows_never_match() {
        let t = table();
        let selection = Filter::column("score", Predicate::not_equal_to(10)).apply(&t).unwrap();
        assert_eq!(selection.to_vec(), vec![1, 2]);
        let missing = Filter::column("who", Predicate::IsMissing).apply(&t).unwrap();
        assert_eq!(missing.to_vec(), vec![2]);
    }

    #[test]
    fn test_all_of_any_of_not() {
        let t = table();
        let high = Filter::column("score", Predicate::greater_than(15));
        let named = Filter::column("who", Predicate::IsNotMissing);
        assert_eq!(high.clone().and(named.clone()).apply(&t).unwrap().to_vec(), vec![1]);
        assert_eq!(high.clone().or(named).apply(&t).unwrap().to_vec(), vec![0, 1, 2, 3]);
        assert_eq!(high.negate().apply(&t).unwrap().to_vec(), vec![0, 3]);
    }

    #[test]
    fn test_empty_composites() {
        let t = table();
        assert_eq!(Filter::AllOf(vec![]).apply(&t).unwrap().len(), 4);
        assert!(Filter::AnyOf(vec![]).apply(&t).unwrap().is_empty());
    }

    #[test]
    fn test_column_to_column() {
        let t = table();
        let filter = Filter::column("score", Predicate::CompareColumn(Comparison::GreaterThanOrEqual, "target".into()));
        assert_eq!(filter.apply(&t).unwrap().to_vec(), vec![0, 2]);
    }

    #[test]
    fn test_errors() {
        let t = table();
        assert!(matches!(
            Filter::column("nope", Predicate::IsMissing).apply(&t),
            Err(Error::UnknownColumn(_))
        ));
        assert!(matches!(
            Filter::column("who", Predicate::IsZero).apply(&t),
            Err(Error::UnsupportedOperation(_))
        ));
        assert!(matches!(
            Filter::column("score", Predicate::CompareColumn(Comparison::Equal, "who".into())).apply(&t),
            Err(Error::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_compare_columns_length_mismatch() {
        let a = Column::int32("a", &[1, 2]);
        let b = Column::int32("b", &[1]);
        assert!(matches!(
            compare_columns(&a, &b, Comparison::Equal),
            Err(Error::LengthMismatch { expected: 2, actual: 1 })
        ));
    }
}
