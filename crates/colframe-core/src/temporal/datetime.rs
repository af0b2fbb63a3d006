//! Local datetimes packed into an `i64`.

use std::fmt;
use std::str::FromStr;

use time::{PrimitiveDateTime, Weekday};

use super::{
    negated, overflow, scaled, PackedDate, PackedTime, MILLIS_PER_DAY, MILLIS_PER_HOUR,
    MILLIS_PER_MINUTE, MILLIS_PER_SECOND,
};
use crate::error::{Error, Result};

/// A local datetime stored as `(packed_date << 32) | packed_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PackedDateTime(i64);

impl PackedDateTime {
    pub const MISSING: PackedDateTime = PackedDateTime(i64::MIN);

    pub const fn of(date: PackedDate, time: PackedTime) -> Self {
        PackedDateTime(((date.raw() as i64) << 32) | (time.raw() as u32 as i64))
    }

    pub const fn from_raw(raw: i64) -> Self {
        PackedDateTime(raw)
    }

    pub const fn raw(self) -> i64 {
        self.0
    }

    pub const fn is_missing(self) -> bool {
        self.0 == i64::MIN
    }

    pub const fn date(self) -> PackedDate {
        PackedDate::from_raw((self.0 >> 32) as i32)
    }

    pub const fn time(self) -> PackedTime {
        PackedTime::from_raw(self.0 as i32)
    }

    pub fn year(self) -> i32 {
        self.date().year()
    }

    pub fn month(self) -> u8 {
        self.date().month()
    }

    pub fn day(self) -> u8 {
        self.date().day()
    }

    pub fn hour(self) -> u8 {
        self.time().hour()
    }

    pub fn minute(self) -> u8 {
        self.time().minute()
    }

    pub fn second(self) -> u8 {
        self.time().second()
    }

    pub fn millisecond(self) -> u16 {
        self.time().millisecond()
    }

    pub fn day_of_week(self) -> Weekday {
        self.date().day_of_week()
    }

    pub fn day_of_year(self) -> u16 {
        self.date().day_of_year()
    }

    pub fn quarter(self) -> u8 {
        self.date().quarter()
    }

    pub fn millis_of_day(self) -> i64 {
        self.time().millis_of_day()
    }

    /// Milliseconds since 1970-01-01T00:00 in the same local frame.
    pub fn to_epoch_millis(self) -> i64 {
        self.date().to_epoch_day() * MILLIS_PER_DAY + self.millis_of_day()
    }

    pub fn from_epoch_millis(millis: i64) -> Result<Self> {
        let day = millis.div_euclid(MILLIS_PER_DAY);
        let date = PackedDate::from_epoch_day(day)?;
        Ok(Self::of(date, PackedTime::from_millis_of_day(millis.rem_euclid(MILLIS_PER_DAY))))
    }

    pub fn to_primitive(self) -> Result<PrimitiveDateTime> {
        Ok(PrimitiveDateTime::new(self.date().to_date()?, self.time().to_time()?))
    }

    pub fn from_primitive(value: PrimitiveDateTime) -> Result<Self> {
        Ok(Self::of(
            PackedDate::from_date(value.date())?,
            PackedTime::from_time(value.time()),
        ))
    }

    /// Add milliseconds; overflow past midnight carries into the date. Fails
    /// with `InvalidData` when the date leaves the packed year range.
    pub fn plus_millis(self, millis: i64) -> Result<Self> {
        if millis == 0 {
            return Ok(self);
        }
        let total = self
            .millis_of_day()
            .checked_add(millis)
            .ok_or_else(|| overflow("millisecond offset"))?;
        let days = total.div_euclid(MILLIS_PER_DAY);
        let time = PackedTime::from_millis_of_day(total.rem_euclid(MILLIS_PER_DAY));
        Ok(Self::of(self.date().plus_days(days)?, time))
    }

    pub fn plus_seconds(self, seconds: i64) -> Result<Self> {
        self.plus_millis(scaled(seconds, MILLIS_PER_SECOND)?)
    }

    pub fn plus_minutes(self, minutes: i64) -> Result<Self> {
        self.plus_millis(scaled(minutes, MILLIS_PER_MINUTE)?)
    }

    pub fn plus_hours(self, hours: i64) -> Result<Self> {
        self.plus_millis(scaled(hours, MILLIS_PER_HOUR)?)
    }

    pub fn plus_days(self, days: i64) -> Result<Self> {
        Ok(Self::of(self.date().plus_days(days)?, self.time()))
    }

    pub fn plus_weeks(self, weeks: i64) -> Result<Self> {
        Ok(Self::of(self.date().plus_weeks(weeks)?, self.time()))
    }

    pub fn plus_months(self, months: i64) -> Result<Self> {
        Ok(Self::of(self.date().plus_months(months)?, self.time()))
    }

    pub fn plus_years(self, years: i64) -> Result<Self> {
        Ok(Self::of(self.date().plus_years(years)?, self.time()))
    }

    pub fn minus_millis(self, millis: i64) -> Result<Self> {
        self.plus_millis(negated(millis)?)
    }

    pub fn minus_seconds(self, seconds: i64) -> Result<Self> {
        self.plus_seconds(negated(seconds)?)
    }

    pub fn minus_minutes(self, minutes: i64) -> Result<Self> {
        self.plus_minutes(negated(minutes)?)
    }

    pub fn minus_hours(self, hours: i64) -> Result<Self> {
        self.plus_hours(negated(hours)?)
    }

    pub fn minus_days(self, days: i64) -> Result<Self> {
        self.date().minus_days(days).map(|date| Self::of(date, self.time()))
    }

    pub fn minus_weeks(self, weeks: i64) -> Result<Self> {
        self.date().minus_weeks(weeks).map(|date| Self::of(date, self.time()))
    }

    pub fn minus_months(self, months: i64) -> Result<Self> {
        self.date().minus_months(months).map(|date| Self::of(date, self.time()))
    }

    pub fn minus_years(self, years: i64) -> Result<Self> {
        self.date().minus_years(years).map(|date| Self::of(date, self.time()))
    }

    pub fn millis_until(self, end: PackedDateTime) -> i64 {
        end.to_epoch_millis() - self.to_epoch_millis()
    }

    pub fn seconds_until(self, end: PackedDateTime) -> i64 {
        self.millis_until(end) / MILLIS_PER_SECOND
    }

    pub fn minutes_until(self, end: PackedDateTime) -> i64 {
        self.millis_until(end) / MILLIS_PER_MINUTE
    }

    pub fn hours_until(self, end: PackedDateTime) -> i64 {
        self.millis_until(end) / MILLIS_PER_HOUR
    }

    /// Whole days, counting a partial final day only once its time of day is reached.
    pub fn days_until(self, end: PackedDateTime) -> i64 {
        self.millis_until(end) / MILLIS_PER_DAY
    }

    pub fn weeks_until(self, end: PackedDateTime) -> i64 {
        self.days_until(end) / 7
    }

    pub fn months_until(self, end: PackedDateTime) -> i64 {
        let months = self.date().months_until(end.date());
        // Same rule as for days: the final month counts only once its time is reached.
        if months > 0 && end.date().day() == self.date().day() && end.time() < self.time() {
            months - 1
        } else if months < 0 && end.date().day() == self.date().day() && end.time() > self.time() {
            months + 1
        } else {
            months
        }
    }

    pub fn years_until(self, end: PackedDateTime) -> i64 {
        self.months_until(end) / 12
    }
}

impl fmt::Display for PackedDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_missing() {
            return Ok(());
        }
        write!(f, "{}T{}", self.date(), self.time())
    }
}

impl FromStr for PackedDateTime {
    type Err = Error;

    /// Parse `YYYY-MM-DDTHH:MM[:SS[.mmm]]`; a space is accepted in place of `T`.
    fn from_str(text: &str) -> Result<Self> {
        let (date, time) = text
            .split_once('T')
            .or_else(|| text.split_once(' '))
            .ok_or_else(|| Error::invalid(format!("invalid datetime '{text}'")))?;
        Ok(Self::of(date.parse()?, time.parse()?))
    }
}
