//! Calendar dates packed into an `i32`.

use std::fmt;
use std::str::FromStr;

use time::{Date, Month, Weekday};

use super::{
    check_epoch_day, check_year, civil_from_epoch_day, epoch_day, length_of_month, overflow, parse_field,
};
use crate::error::{Error, Result};

/// A calendar date stored as `[year_hi, year_lo, month, day]`.
///
/// The year is a signed 16-bit value, so the packed integer orders exactly like
/// the calendar. [`PackedDate::MISSING`] is `i32::MIN`, which decodes to month 0
/// and therefore never collides with a real date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PackedDate(i32);

impl PackedDate {
    /// Missing-value sentinel.
    pub const MISSING: PackedDate = PackedDate(i32::MIN);

    /// Build a date from calendar fields, validating month and day.
    pub fn of(year: i32, month: u8, day: u8) -> Result<Self> {
        let year16 = check_year(i64::from(year))?;
        if !(1..=12).contains(&month) {
            return Err(Error::invalid(format!("month {month} out of range")));
        }
        let max = length_of_month(year, month);
        if day == 0 || day > max {
            return Err(Error::invalid(format!(
                "day {day} out of range for {year:04}-{month:02}"
            )));
        }
        Ok(Self::pack(year16, month, day))
    }

    pub(crate) const fn pack(year: i16, month: u8, day: u8) -> Self {
        PackedDate(((year as u16 as i32) << 16) | ((month as i32) << 8) | day as i32)
    }

    /// Wrap a raw packed value without validation.
    pub const fn from_raw(raw: i32) -> Self {
        PackedDate(raw)
    }

    /// The raw packed value.
    pub const fn raw(self) -> i32 {
        self.0
    }

    pub const fn is_missing(self) -> bool {
        self.0 == i32::MIN
    }

    pub const fn year(self) -> i32 {
        (self.0 >> 16) as i16 as i32
    }

    pub const fn month(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn day(self) -> u8 {
        self.0 as u8
    }

    /// Convert to a `time::Date`.
    pub fn to_date(self) -> Result<Date> {
        let month = Month::try_from(self.month())
            .map_err(|e| Error::invalid(format!("invalid packed date {}: {e}", self.0)))?;
        Date::from_calendar_date(self.year(), month, self.day())
            .map_err(|e| Error::invalid(format!("invalid packed date {}: {e}", self.0)))
    }

    /// Pack a `time::Date`.
    pub fn from_date(date: Date) -> Result<Self> {
        let year = check_year(i64::from(date.year()))?;
        Ok(Self::pack(year, date.month() as u8, date.day()))
    }

    pub fn to_epoch_day(self) -> i64 {
        epoch_day(self.year(), self.month(), self.day())
    }

    pub fn from_epoch_day(epoch_day: i64) -> Result<Self> {
        let (year, month, day) = civil_from_epoch_day(check_epoch_day(epoch_day)?);
        Ok(Self::pack(check_year(year)?, month, day))
    }

    pub fn is_leap_year(self) -> bool {
        super::is_leap_year(self.year())
    }

    pub fn length_of_month(self) -> u8 {
        length_of_month(self.year(), self.month())
    }

    pub fn length_of_year(self) -> u16 {
        if self.is_leap_year() {
            366
        } else {
            365
        }
    }

    /// Day of the year, 1-based.
    pub fn day_of_year(self) -> u16 {
        let start = epoch_day(self.year(), 1, 1);
        (self.to_epoch_day() - start + 1) as u16
    }

    pub fn day_of_week(self) -> Weekday {
        let index = (self.to_epoch_day() + 3).rem_euclid(7) as u8;
        Weekday::Monday.nth_next(index)
    }

    /// Quarter of the year, 1 through 4.
    pub fn quarter(self) -> u8 {
        (self.month() - 1) / 3 + 1
    }

    pub fn is_first_day_of_month(self) -> bool {
        self.day() == 1
    }

    pub fn is_last_day_of_month(self) -> bool {
        self.day() == self.length_of_month()
    }

    /// ISO 8601 week number.
    pub fn iso_week(self) -> Result<u8> {
        Ok(self.to_date()?.iso_week())
    }

    pub fn with_year(self, year: i32) -> Result<Self> {
        let year16 = check_year(i64::from(year))?;
        Ok(Self::resolve_previous_valid(year16, self.month(), self.day()))
    }

    pub fn with_month(self, month: u8) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::invalid(format!("month {month} out of range")));
        }
        Ok(Self::resolve_previous_valid(self.year() as i16, month, self.day()))
    }

    pub fn with_day_of_month(self, day: u8) -> Result<Self> {
        Self::of(self.year(), self.month(), day)
    }

    fn resolve_previous_valid(year: i16, month: u8, day: u8) -> Self {
        let day = day.min(length_of_month(i32::from(year), month));
        Self::pack(year, month, day)
    }

    /// Add days. Stays on the packed fields while the result is in the same or
    /// the following month; otherwise goes through the epoch day. Fails with
    /// `InvalidData` when the result leaves the packed year range.
    pub fn plus_days(self, days: i64) -> Result<Self> {
        if days == 0 {
            return Ok(self);
        }
        let (year, month, day) = (self.year(), self.month(), self.day());
        let dom = i64::from(day).checked_add(days).ok_or_else(|| overflow("day offset"))?;
        if dom > 0 {
            if dom <= 28 {
                return Ok(Self::pack(year as i16, month, dom as u8));
            }
            // Day 59 of January is the 28th of February, day 59 of February the 31st of March.
            if dom <= 59 {
                let month_len = i64::from(length_of_month(year, month));
                if dom <= month_len {
                    return Ok(Self::pack(year as i16, month, dom as u8));
                } else if month < 12 {
                    return Ok(Self::pack(year as i16, month + 1, (dom - month_len) as u8));
                } else {
                    return Ok(Self::pack(check_year(i64::from(year) + 1)?, 1, (dom - month_len) as u8));
                }
            }
        }
        let target = self
            .to_epoch_day()
            .checked_add(days)
            .ok_or_else(|| overflow("day offset"))?;
        Self::from_epoch_day(target)
    }

    pub fn minus_days(self, days: i64) -> Result<Self> {
        self.plus_days(days.checked_neg().ok_or_else(|| overflow("day offset"))?)
    }

    pub fn plus_weeks(self, weeks: i64) -> Result<Self> {
        self.plus_days(weeks.checked_mul(7).ok_or_else(|| overflow("week offset"))?)
    }

    pub fn minus_weeks(self, weeks: i64) -> Result<Self> {
        self.plus_weeks(weeks.checked_neg().ok_or_else(|| overflow("week offset"))?)
    }

    /// Add months, clamping the day to the end of the target month.
    pub fn plus_months(self, months: i64) -> Result<Self> {
        if months == 0 {
            return Ok(self);
        }
        let target = self
            .month_index()
            .checked_add(months)
            .ok_or_else(|| overflow("month offset"))?;
        let year = check_year(target.div_euclid(12))?;
        let month = target.rem_euclid(12) as u8 + 1;
        Ok(Self::resolve_previous_valid(year, month, self.day()))
    }

    pub fn minus_months(self, months: i64) -> Result<Self> {
        self.plus_months(months.checked_neg().ok_or_else(|| overflow("month offset"))?)
    }

    /// Add years, clamping February 29th to the 28th in non-leap years.
    pub fn plus_years(self, years: i64) -> Result<Self> {
        if years == 0 {
            return Ok(self);
        }
        let year = i64::from(self.year())
            .checked_add(years)
            .ok_or_else(|| overflow("year offset"))?;
        Ok(Self::resolve_previous_valid(check_year(year)?, self.month(), self.day()))
    }

    pub fn minus_years(self, years: i64) -> Result<Self> {
        self.plus_years(years.checked_neg().ok_or_else(|| overflow("year offset"))?)
    }

    pub fn days_until(self, end: PackedDate) -> i64 {
        end.to_epoch_day() - self.to_epoch_day()
    }

    pub fn weeks_until(self, end: PackedDate) -> i64 {
        self.days_until(end) / 7
    }

    /// Whole months from `self` to `end`, truncated toward zero.
    pub fn months_until(self, end: PackedDate) -> i64 {
        let start = self.month_index() * 32 + i64::from(self.day());
        let end = end.month_index() * 32 + i64::from(end.day());
        (end - start) / 32
    }

    pub fn years_until(self, end: PackedDate) -> i64 {
        self.months_until(end) / 12
    }

    fn month_index(self) -> i64 {
        i64::from(self.year()) * 12 + i64::from(self.month()) - 1
    }
}

impl fmt::Display for PackedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_missing() {
            return Ok(());
        }
        let year = self.year();
        if year < 0 {
            f.write_str("-")?;
        }
        write!(f, "{:04}-{:02}-{:02}", year.unsigned_abs(), self.month(), self.day())
    }
}

impl FromStr for PackedDate {
    type Err = Error;

    /// Parse `YYYY-MM-DD`. A leading `-` marks a negative year.
    fn from_str(text: &str) -> Result<Self> {
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let mut parts = body.split('-');
        let (Some(y), Some(m), Some(d), None) = (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::invalid(format!("invalid date '{text}'")));
        };
        let year: i32 = parse_field(text, y, "year")?;
        let month: u8 = parse_field(text, m, "month")?;
        let day: u8 = parse_field(text, d, "day")?;
        Self::of(if negative { -year } else { year }, month, day)
    }
}
