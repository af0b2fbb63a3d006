//! Times of day packed into an `i32`.

use std::fmt;
use std::str::FromStr;

use time::Time;

use super::{parse_field, MILLIS_PER_DAY, MILLIS_PER_HOUR, MILLIS_PER_MINUTE, MILLIS_PER_SECOND};
use crate::error::{Error, Result};

/// Units accepted by [`PackedTime::truncated_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Millis,
    Seconds,
    Minutes,
    Hours,
    HalfDays,
    Days,
}

/// A time of day stored as `[hour, minute, millis_of_minute_hi, millis_of_minute_lo]`.
///
/// Millisecond precision. [`PackedTime::MISSING`] is `i32::MIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PackedTime(i32);

impl PackedTime {
    pub const MISSING: PackedTime = PackedTime(i32::MIN);
    pub const MIDNIGHT: PackedTime = PackedTime::pack(0, 0, 0);
    pub const NOON: PackedTime = PackedTime::pack(12, 0, 0);

    pub fn of(hour: u8, minute: u8, second: u8, millis: u16) -> Result<Self> {
        if hour > 23 || minute > 59 || second > 59 || millis > 999 {
            return Err(Error::invalid(format!(
                "invalid time {hour:02}:{minute:02}:{second:02}.{millis:03}"
            )));
        }
        Ok(Self::pack(hour, minute, u16::from(second) * 1_000 + millis))
    }

    const fn pack(hour: u8, minute: u8, millis_of_minute: u16) -> Self {
        PackedTime(((hour as i32) << 24) | ((minute as i32) << 16) | millis_of_minute as i32)
    }

    pub const fn from_raw(raw: i32) -> Self {
        PackedTime(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    pub const fn is_missing(self) -> bool {
        self.0 == i32::MIN
    }

    /// Build from milliseconds since midnight, wrapping into a single day.
    pub fn from_millis_of_day(millis: i64) -> Self {
        let millis = millis.rem_euclid(MILLIS_PER_DAY);
        let hour = (millis / MILLIS_PER_HOUR) as u8;
        let minute = ((millis / MILLIS_PER_MINUTE) % 60) as u8;
        Self::pack(hour, minute, (millis % MILLIS_PER_MINUTE) as u16)
    }

    pub const fn hour(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn minute(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn millis_of_minute(self) -> u16 {
        self.0 as u16
    }

    pub const fn second(self) -> u8 {
        (self.millis_of_minute() / 1_000) as u8
    }

    pub const fn millisecond(self) -> u16 {
        self.millis_of_minute() % 1_000
    }

    pub fn minute_of_day(self) -> i32 {
        i32::from(self.hour()) * 60 + i32::from(self.minute())
    }

    pub fn second_of_day(self) -> i32 {
        self.minute_of_day() * 60 + i32::from(self.second())
    }

    pub fn millis_of_day(self) -> i64 {
        i64::from(self.minute_of_day()) * MILLIS_PER_MINUTE + i64::from(self.millis_of_minute())
    }

    pub fn to_time(self) -> Result<Time> {
        Time::from_hms_milli(self.hour(), self.minute(), self.second(), self.millisecond())
            .map_err(|e| Error::invalid(format!("invalid packed time {}: {e}", self.0)))
    }

    pub fn from_time(time: Time) -> Self {
        Self::pack(
            time.hour(),
            time.minute(),
            u16::from(time.second()) * 1_000 + time.millisecond(),
        )
    }

    /// Zero every field smaller than `unit`. Sub-second precision is always dropped
    /// unless the unit is milliseconds.
    pub fn truncated_to(self, unit: TimeUnit) -> Self {
        let (mut hour, mut minute, mut second) = (self.hour(), self.minute(), self.second());
        match unit {
            TimeUnit::Millis => return self,
            TimeUnit::Seconds => {}
            TimeUnit::Minutes => second = 0,
            TimeUnit::Hours => {
                minute = 0;
                second = 0;
            }
            TimeUnit::HalfDays => {
                hour = if hour >= 12 { 12 } else { 0 };
                minute = 0;
                second = 0;
            }
            TimeUnit::Days => {
                hour = 0;
                minute = 0;
                second = 0;
            }
        }
        Self::pack(hour, minute, u16::from(second) * 1_000)
    }

    pub fn plus_hours(self, hours: i64) -> Self {
        self.plus_millis(hours.rem_euclid(24) * MILLIS_PER_HOUR)
    }

    pub fn plus_minutes(self, minutes: i64) -> Self {
        self.plus_millis(minutes.rem_euclid(24 * 60) * MILLIS_PER_MINUTE)
    }

    pub fn plus_seconds(self, seconds: i64) -> Self {
        self.plus_millis(seconds.rem_euclid(24 * 60 * 60) * MILLIS_PER_SECOND)
    }

    /// Add milliseconds, wrapping around midnight.
    pub fn plus_millis(self, millis: i64) -> Self {
        if millis == 0 {
            return self;
        }
        Self::from_millis_of_day(self.millis_of_day() + millis.rem_euclid(MILLIS_PER_DAY))
    }

    pub fn minus_hours(self, hours: i64) -> Self {
        self.plus_hours(-hours.rem_euclid(24))
    }

    pub fn minus_minutes(self, minutes: i64) -> Self {
        self.plus_minutes(-minutes.rem_euclid(24 * 60))
    }

    pub fn minus_seconds(self, seconds: i64) -> Self {
        self.plus_seconds(-seconds.rem_euclid(24 * 60 * 60))
    }

    pub fn minus_millis(self, millis: i64) -> Self {
        self.plus_millis(-millis.rem_euclid(MILLIS_PER_DAY))
    }

    pub fn is_midnight(self) -> bool {
        self == Self::MIDNIGHT
    }

    pub fn is_noon(self) -> bool {
        self == Self::NOON
    }

    /// Before noon. Midnight counts as AM.
    pub fn is_am(self) -> bool {
        !self.is_missing() && self < Self::NOON
    }

    /// Noon or later. Noon counts as PM.
    pub fn is_pm(self) -> bool {
        self >= Self::NOON
    }

    pub fn millis_until(self, end: PackedTime) -> i64 {
        end.millis_of_day() - self.millis_of_day()
    }

    pub fn seconds_until(self, end: PackedTime) -> i64 {
        i64::from(end.second_of_day() - self.second_of_day())
    }

    pub fn minutes_until(self, end: PackedTime) -> i64 {
        self.seconds_until(end) / 60
    }

    pub fn hours_until(self, end: PackedTime) -> i64 {
        self.seconds_until(end) / 3_600
    }
}

impl fmt::Display for PackedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_missing() {
            return Ok(());
        }
        write!(
            f,
            "{:02}:{:02}:{:02}.{:03}",
            self.hour(),
            self.minute(),
            self.second(),
            self.millisecond()
        )
    }
}

impl FromStr for PackedTime {
    type Err = Error;

    /// Parse `HH:MM`, `HH:MM:SS` or `HH:MM:SS.mmm`. Fractions shorter than three
    /// digits are scaled, longer ones truncated to milliseconds.
    fn from_str(text: &str) -> Result<Self> {
        let mut parts = text.split(':');
        let (Some(h), Some(m)) = (parts.next(), parts.next()) else {
            return Err(Error::invalid(format!("invalid time '{text}'")));
        };
        let rest = parts.next();
        if parts.next().is_some() {
            return Err(Error::invalid(format!("invalid time '{text}'")));
        }
        let hour: u8 = parse_field(text, h, "hour")?;
        let minute: u8 = parse_field(text, m, "minute")?;
        let (second, millis) = match rest {
            None => (0, 0),
            Some(sec) => match sec.split_once('.') {
                None => (parse_field(text, sec, "second")?, 0),
                Some((s, frac)) => (parse_field(text, s, "second")?, parse_fraction(text, frac)?),
            },
        };
        Self::of(hour, minute, second, millis)
    }
}

fn parse_fraction(text: &str, frac: &str) -> Result<u16> {
    if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::invalid(format!("invalid fraction in '{text}'")));
    }
    let digits: String = frac.chars().chain("000".chars()).take(3).collect();
    parse_field(text, &digits, "fraction")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u8, m: u8, s: u8, ms: u16) -> PackedTime {
        PackedTime::of(h, m, s, ms).unwrap()
    }

    #[test]
    fn test_fields() {
        let time = t(13, 45, 7, 250);
        assert_eq!(time.hour(), 13);
        assert_eq!(time.minute(), 45);
        assert_eq!(time.second(), 7);
        assert_eq!(time.millisecond(), 250);
        assert_eq!(time.millis_of_minute(), 7_250);
        assert_eq!(time.minute_of_day(), 825);
        assert_eq!(time.second_of_day(), 49_507);
        assert_eq!(time.millis_of_day(), 49_507_250);
        assert_eq!(PackedTime::from_millis_of_day(time.millis_of_day()), time);
    }

    #[test]
    fn test_invalid_times() {
        assert!(PackedTime::of(24, 0, 0, 0).is_err());
        assert!(PackedTime::of(0, 60, 0, 0).is_err());
        assert!(PackedTime::of(0, 0, 60, 0).is_err());
        assert!(PackedTime::of(0, 0, 0, 1_000).is_err());
        assert!(PackedTime::MISSING.is_missing());
        assert!(!PackedTime::MISSING.is_am());
    }

    #[test]
    fn test_ordering() {
        assert!(t(0, 0, 0, 0) < t(0, 0, 0, 1));
        assert!(t(9, 59, 59, 999) < t(10, 0, 0, 0));
        assert!(PackedTime::MISSING < PackedTime::MIDNIGHT);
    }

    #[test]
    fn test_arithmetic_wraps() {
        assert_eq!(t(23, 0, 0, 0).plus_hours(2), t(1, 0, 0, 0));
        assert_eq!(t(0, 30, 0, 0).minus_hours(1), t(23, 30, 0, 0));
        assert_eq!(t(23, 59, 0, 0).plus_minutes(2), t(0, 1, 0, 0));
        assert_eq!(t(0, 0, 1, 500).minus_seconds(2), t(23, 59, 59, 500));
        assert_eq!(t(23, 59, 59, 999).plus_millis(1), PackedTime::MIDNIGHT);
        assert_eq!(t(12, 0, 0, 0).plus_hours(48), t(12, 0, 0, 0));
        assert_eq!(t(12, 0, 0, 0).plus_millis(-MILLIS_PER_DAY * 3 - 1), t(11, 59, 59, 999));
    }

    #[test]
    fn test_extreme_offsets_wrap() {
        // 2^63 is 8 modulo 24.
        assert_eq!(PackedTime::MIDNIGHT.minus_hours(i64::MIN), t(8, 0, 0, 0));
        assert_eq!(PackedTime::MIDNIGHT.plus_hours(i64::MIN), t(16, 0, 0, 0));
        assert_eq!(PackedTime::MIDNIGHT.minus_millis(i64::MIN), t(7, 12, 55, 808));
        assert_eq!(t(6, 0, 0, 0).minus_seconds(i64::MAX), t(14, 29, 53, 0));
    }

    #[test]
    fn test_truncation() {
        let time = t(15, 42, 37, 123);
        assert_eq!(time.truncated_to(TimeUnit::Millis), time);
        assert_eq!(time.truncated_to(TimeUnit::Seconds), t(15, 42, 37, 0));
        assert_eq!(time.truncated_to(TimeUnit::Minutes), t(15, 42, 0, 0));
        assert_eq!(time.truncated_to(TimeUnit::Hours), t(15, 0, 0, 0));
        assert_eq!(time.truncated_to(TimeUnit::HalfDays), PackedTime::NOON);
        assert_eq!(time.truncated_to(TimeUnit::Days), PackedTime::MIDNIGHT);
    }

    #[test]
    fn test_noon_and_midnight() {
        assert!(PackedTime::MIDNIGHT.is_midnight());
        assert!(PackedTime::MIDNIGHT.is_am());
        assert!(PackedTime::NOON.is_noon());
        assert!(PackedTime::NOON.is_pm());
        assert!(!t(12, 0, 0, 1).is_noon());
        assert!(t(11, 59, 59, 999).is_am());
    }

    #[test]
    fn test_until() {
        let a = t(8, 15, 30, 0);
        let b = t(10, 14, 29, 500);
        assert_eq!(a.millis_until(b), 7_139_500);
        assert_eq!(a.seconds_until(b), 7_139);
        assert_eq!(a.minutes_until(b), 118);
        assert_eq!(a.hours_until(b), 1);
        assert_eq!(b.hours_until(a), -1);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("07:05".parse::<PackedTime>().unwrap(), t(7, 5, 0, 0));
        assert_eq!("07:05:09".parse::<PackedTime>().unwrap(), t(7, 5, 9, 0));
        assert_eq!("07:05:09.5".parse::<PackedTime>().unwrap(), t(7, 5, 9, 500));
        assert_eq!("07:05:09.123456".parse::<PackedTime>().unwrap(), t(7, 5, 9, 123));
        assert_eq!(t(7, 5, 9, 42).to_string(), "07:05:09.042");
        assert!("7".parse::<PackedTime>().is_err());
        assert!("25:00".parse::<PackedTime>().is_err());
        assert!("10:00:00.".parse::<PackedTime>().is_err());
    }

    #[test]
    fn test_time_crate_interop() {
        let time = t(6, 7, 8, 9);
        let converted = time.to_time().unwrap();
        assert_eq!(converted.millisecond(), 9);
        assert_eq!(PackedTime::from_time(converted), time);
    }
}
