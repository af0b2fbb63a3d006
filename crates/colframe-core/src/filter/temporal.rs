//! Predicates over packed date, time, date-time and instant columns.
//!
//! Ordering predicates compare the packed representation directly; calendar
//! and clock predicates decode the relevant part of each row.

use time::Weekday;

use super::{scan, unsupported, Comparison, Predicate};
use crate::column::{Primitive, PrimitiveColumn, Value};
use crate::error::{Error, Result};
use crate::selection::Selection;
use crate::temporal::{PackedDate, PackedDateTime, PackedInstant, PackedTime};

/// A packed temporal value whose packed order is chronological.
pub trait Temporal: Primitive + Ord {}

impl Temporal for PackedDate {}
impl Temporal for PackedTime {}
impl Temporal for PackedDateTime {}
impl Temporal for PackedInstant {}

/// Temporal values that carry a calendar date.
pub trait HasDate: Temporal {
    fn date_part(self) -> PackedDate;
}

/// Temporal values that carry a time of day.
pub trait HasTime: Temporal {
    fn time_part(self) -> PackedTime;
}

impl HasDate for PackedDate {
    fn date_part(self) -> PackedDate {
        self
    }
}

impl HasDate for PackedDateTime {
    fn date_part(self) -> PackedDate {
        self.date()
    }
}

impl HasDate for PackedInstant {
    fn date_part(self) -> PackedDate {
        self.date()
    }
}

impl HasTime for PackedTime {
    fn time_part(self) -> PackedTime {
        self
    }
}

impl HasTime for PackedDateTime {
    fn time_part(self) -> PackedTime {
        self.time()
    }
}

impl HasTime for PackedInstant {
    fn time_part(self) -> PackedTime {
        self.time()
    }
}

fn scan_present<T: Primitive>(values: &[T], matches: impl Fn(T) -> bool) -> Selection {
    scan(values.len(), |row| !values[row].is_missing_value() && matches(values[row]))
}

pub trait TemporalPredicates<T: Temporal> {
    fn compare_to(&self, op: Comparison, value: T) -> Selection;

    fn is_equal_to(&self, value: T) -> Selection {
        self.compare_to(Comparison::Equal, value)
    }

    fn is_before(&self, value: T) -> Selection {
        self.compare_to(Comparison::LessThan, value)
    }

    fn is_after(&self, value: T) -> Selection {
        self.compare_to(Comparison::GreaterThan, value)
    }

    fn is_on_or_before(&self, value: T) -> Selection {
        self.compare_to(Comparison::LessThanOrEqual, value)
    }

    fn is_on_or_after(&self, value: T) -> Selection {
        self.compare_to(Comparison::GreaterThanOrEqual, value)
    }

    fn is_between_inclusive(&self, low: T, high: T) -> Selection;

    fn compare_column(&self, other: &PrimitiveColumn<T>, op: Comparison) -> Result<Selection>;

    fn is_equal_to_column(&self, other: &PrimitiveColumn<T>) -> Result<Selection> {
        self.compare_column(other, Comparison::Equal)
    }

    fn is_before_column(&self, other: &PrimitiveColumn<T>) -> Result<Selection> {
        self.compare_column(other, Comparison::LessThan)
    }

    fn is_after_column(&self, other: &PrimitiveColumn<T>) -> Result<Selection> {
        self.compare_column(other, Comparison::GreaterThan)
    }
}

impl<T: Temporal> TemporalPredicates<T> for PrimitiveColumn<T> {
    fn compare_to(&self, op: Comparison, value: T) -> Selection {
        if value.is_missing_value() {
            return Selection::new();
        }
        scan_present(self.values(), |v| op.test(&v, &value))
    }

    fn is_between_inclusive(&self, low: T, high: T) -> Selection {
        scan_present(self.values(), |v| v >= low && v <= high)
    }

    fn compare_column(&self, other: &PrimitiveColumn<T>, op: Comparison) -> Result<Selection> {
        if self.len() != other.len() {
            return Err(Error::length_mismatch(self.len(), other.len()));
        }
        let (lhs, rhs) = (self.values(), other.values());
        Ok(scan(lhs.len(), |row| {
            !lhs[row].is_missing_value() && !rhs[row].is_missing_value() && op.test(&lhs[row], &rhs[row])
        }))
    }
}

pub trait DatePredicates {
    fn scan_dates(&self, matches: impl Fn(PackedDate) -> bool) -> Selection;

    fn is_in_year(&self, year: i32) -> Selection {
        self.scan_dates(|d| d.year() == year)
    }

    fn is_in_month(&self, month: u8) -> Selection {
        self.scan_dates(|d| d.month() == month)
    }

    fn is_in_quarter(&self, quarter: u8) -> Selection {
        self.scan_dates(|d| d.quarter() == quarter)
    }

    fn is_day_of_week(&self, weekday: Weekday) -> Selection {
        self.scan_dates(|d| d.day_of_week() == weekday)
    }

    fn is_weekend(&self) -> Selection {
        self.scan_dates(|d| matches!(d.day_of_week(), Weekday::Saturday | Weekday::Sunday))
    }

    fn is_weekday(&self) -> Selection {
        self.scan_dates(|d| !matches!(d.day_of_week(), Weekday::Saturday | Weekday::Sunday))
    }

    fn is_first_day_of_month(&self) -> Selection {
        self.scan_dates(|d| d.is_first_day_of_month())
    }

    fn is_last_day_of_month(&self) -> Selection {
        self.scan_dates(|d| d.is_last_day_of_month())
    }
}

impl<T: HasDate> DatePredicates for PrimitiveColumn<T> {
    fn scan_dates(&self, matches: impl Fn(PackedDate) -> bool) -> Selection {
        scan_present(self.values(), |v| matches(v.date_part()))
    }
}

pub trait TimePredicates {
    fn scan_times(&self, matches: impl Fn(PackedTime) -> bool) -> Selection;

    fn is_midnight(&self) -> Selection {
        self.scan_times(|t| t.is_midnight())
    }

    fn is_noon(&self) -> Selection {
        self.scan_times(|t| t.is_noon())
    }

    fn is_before_noon(&self) -> Selection {
        self.scan_times(|t| t.is_am())
    }

    fn is_after_noon(&self) -> Selection {
        self.scan_times(|t| t.is_pm())
    }
}

impl<T: HasTime> TimePredicates for PrimitiveColumn<T> {
    fn scan_times(&self, matches: impl Fn(PackedTime) -> bool) -> Selection {
        scan_present(self.values(), |v| matches(v.time_part()))
    }
}

fn operand<T: Temporal>(predicate: &Predicate, value: &Value) -> Result<T> {
    T::from_value(value).ok_or_else(|| {
        Error::unsupported(format!(
            "{predicate:?} needs a {} operand, got {value:?}",
            T::COLUMN_TYPE
        ))
    })
}

/// Ordering, range and membership predicates shared by every temporal type.
fn evaluate_ordering<T: Temporal>(column: &PrimitiveColumn<T>, predicate: &Predicate) -> Result<Option<Selection>> {
    Ok(Some(match predicate {
        Predicate::Compare(op, value) => column.compare_to(*op, operand(predicate, value)?),
        Predicate::BetweenInclusive(low, high) => {
            column.is_between_inclusive(operand(predicate, low)?, operand(predicate, high)?)
        }
        Predicate::BetweenExclusive(low, high) => {
            let (low, high): (T, T) = (operand(predicate, low)?, operand(predicate, high)?);
            scan_present(column.values(), |v| v > low && v < high)
        }
        Predicate::In(values) => {
            let values = values.iter().map(|v| operand(predicate, v)).collect::<Result<Vec<T>>>()?;
            scan_present(column.values(), |v| values.contains(&v))
        }
        Predicate::NotIn(values) => {
            let values = values.iter().map(|v| operand(predicate, v)).collect::<Result<Vec<T>>>()?;
            scan_present(column.values(), |v| !values.contains(&v))
        }
        _ => return Ok(None),
    }))
}

fn evaluate_calendar<T: HasDate>(column: &PrimitiveColumn<T>, predicate: &Predicate) -> Option<Selection> {
    Some(match predicate {
        Predicate::IsInYear(year) => column.is_in_year(*year),
        Predicate::IsInMonth(month) => column.is_in_month(*month),
        Predicate::IsInQuarter(quarter) => column.is_in_quarter(*quarter),
        Predicate::IsDayOfWeek(weekday) => column.is_day_of_week(*weekday),
        Predicate::IsWeekend => column.is_weekend(),
        Predicate::IsWeekday => column.is_weekday(),
        Predicate::IsFirstDayOfMonth => column.is_first_day_of_month(),
        Predicate::IsLastDayOfMonth => column.is_last_day_of_month(),
        _ => return None,
    })
}

fn evaluate_clock<T: HasTime>(column: &PrimitiveColumn<T>, predicate: &Predicate) -> Option<Selection> {
    Some(match predicate {
        Predicate::IsMidnight => column.is_midnight(),
        Predicate::IsNoon => column.is_noon(),
        Predicate::IsBeforeNoon => column.is_before_noon(),
        Predicate::IsAfterNoon => column.is_after_noon(),
        _ => return None,
    })
}

pub(crate) fn evaluate_date_like<T: HasDate>(column: &PrimitiveColumn<T>, predicate: &Predicate) -> Result<Selection> {
    if let Some(selection) = evaluate_ordering(column, predicate)? {
        return Ok(selection);
    }
    evaluate_calendar(column, predicate).ok_or_else(|| unsupported(predicate, T::COLUMN_TYPE))
}

pub(crate) fn evaluate_time(column: &PrimitiveColumn<PackedTime>, predicate: &Predicate) -> Result<Selection> {
    if let Some(selection) = evaluate_ordering(column, predicate)? {
        return Ok(selection);
    }
    evaluate_clock(column, predicate).ok_or_else(|| unsupported(predicate, PackedTime::COLUMN_TYPE))
}

pub(crate) fn evaluate_date_time_like<T: HasDate + HasTime>(
    column: &PrimitiveColumn<T>,
    predicate: &Predicate,
) -> Result<Selection> {
    if let Some(selection) = evaluate_ordering(column, predicate)? {
        return Ok(selection);
    }
    evaluate_calendar(column, predicate)
        .or_else(|| evaluate_clock(column, predicate))
        .ok_or_else(|| unsupported(predicate, T::COLUMN_TYPE))
}
