//! UTC instants packed into an `i64`.

use std::fmt;
use std::str::FromStr;

use time::{OffsetDateTime, UtcOffset};

use super::{
    negated, overflow, scaled, PackedDate, PackedDateTime, PackedTime, MILLIS_PER_DAY,
    MILLIS_PER_HOUR, MILLIS_PER_MINUTE, MILLIS_PER_SECOND,
};
use crate::error::{Error, Result};

/// A point on the UTC timeline, using the [`PackedDateTime`] layout.
///
/// Arithmetic goes through epoch milliseconds, so there is no calendar clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PackedInstant(i64);

impl PackedInstant {
    pub const MISSING: PackedInstant = PackedInstant(i64::MIN);

    pub const fn from_raw(raw: i64) -> Self {
        PackedInstant(raw)
    }

    pub const fn raw(self) -> i64 {
        self.0
    }

    pub const fn is_missing(self) -> bool {
        self.0 == i64::MIN
    }

    /// The UTC calendar fields as a local datetime.
    pub const fn as_utc_datetime(self) -> PackedDateTime {
        PackedDateTime::from_raw(self.0)
    }

    pub const fn from_utc_datetime(value: PackedDateTime) -> Self {
        PackedInstant(value.raw())
    }

    pub fn date(self) -> PackedDate {
        self.as_utc_datetime().date()
    }

    pub fn time(self) -> PackedTime {
        self.as_utc_datetime().time()
    }

    pub fn to_epoch_millis(self) -> i64 {
        self.as_utc_datetime().to_epoch_millis()
    }

    pub fn from_epoch_millis(millis: i64) -> Result<Self> {
        Ok(Self::from_utc_datetime(PackedDateTime::from_epoch_millis(millis)?))
    }

    pub fn to_offset_date_time(self) -> Result<OffsetDateTime> {
        Ok(self.as_utc_datetime().to_primitive()?.assume_utc())
    }

    /// Pack an offset datetime, normalizing it to UTC first.
    pub fn from_offset_date_time(value: OffsetDateTime) -> Result<Self> {
        let utc = value.to_offset(UtcOffset::UTC);
        Ok(Self::from_utc_datetime(PackedDateTime::of(
            PackedDate::from_date(utc.date())?,
            PackedTime::from_time(utc.time()),
        )))
    }

    /// Add milliseconds. Fails with `InvalidData` when the year leaves the packed range.
    pub fn plus_millis(self, millis: i64) -> Result<Self> {
        let total = self
            .to_epoch_millis()
            .checked_add(millis)
            .ok_or_else(|| overflow("millisecond offset"))?;
        Self::from_epoch_millis(total)
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
        self.plus_millis(scaled(days, MILLIS_PER_DAY)?)
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
        self.plus_days(negated(days)?)
    }

    pub fn millis_until(self, end: PackedInstant) -> i64 {
        end.to_epoch_millis() - self.to_epoch_millis()
    }

    pub fn seconds_until(self, end: PackedInstant) -> i64 {
        self.millis_until(end) / MILLIS_PER_SECOND
    }

    pub fn minutes_until(self, end: PackedInstant) -> i64 {
        self.millis_until(end) / MILLIS_PER_MINUTE
    }

    pub fn hours_until(self, end: PackedInstant) -> i64 {
        self.millis_until(end) / MILLIS_PER_HOUR
    }

    pub fn days_until(self, end: PackedInstant) -> i64 {
        self.as_utc_datetime().days_until(end.as_utc_datetime())
    }
}

impl fmt::Display for PackedInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_missing() {
            return Ok(());
        }
        write!(f, "{}Z", self.as_utc_datetime())
    }
}

impl FromStr for PackedInstant {
    type Err = Error;

    /// Parse `YYYY-MM-DDTHH:MM[:SS[.mmm]]Z`.
    fn from_str(text: &str) -> Result<Self> {
        let body = text
            .strip_suffix('Z')
            .ok_or_else(|| Error::invalid(format!("instant '{text}' must end with 'Z'")))?;
        Ok(Self::from_utc_datetime(body.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_millis() {
        let instant = PackedInstant::from_epoch_millis(1_000_000_000_000).unwrap();
        assert_eq!(instant.to_string(), "2001-09-09T01:46:40.000Z");
        assert_eq!(instant.to_epoch_millis(), 1_000_000_000_000);
        assert_eq!(PackedInstant::from_epoch_millis(0).unwrap().to_string(), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_offset_date_time_normalizes_to_utc() {
        let offset = UtcOffset::from_hms(2, 0, 0).unwrap();
        let local = PackedInstant::from_epoch_millis(0)
            .unwrap()
            .to_offset_date_time()
            .unwrap()
            .to_offset(offset);
        assert_eq!(local.hour(), 2);
        let packed = PackedInstant::from_offset_date_time(local).unwrap();
        assert_eq!(packed.to_epoch_millis(), 0);
        assert_eq!(packed.time().hour(), 0);
    }

    #[test]
    fn test_arithmetic() {
        let start: PackedInstant = "2024-02-28T23:00:00Z".parse().unwrap();
        let later = start.plus_hours(25).unwrap();
        assert_eq!(later.to_string(), "2024-03-01T00:00:00.000Z");
        assert_eq!(start.hours_until(later), 25);
        assert_eq!(later.minus_days(1).unwrap().days_until(later), 1);
        assert_eq!(start.minutes_until(later), 1_500);
    }

    #[test]
    fn test_huge_offsets_fail_without_overflow() {
        let start: PackedInstant = "2024-02-28T23:00:00Z".parse().unwrap();
        assert!(matches!(start.plus_millis(i64::MAX), Err(Error::InvalidData(_))));
        assert!(matches!(start.minus_millis(i64::MIN), Err(Error::InvalidData(_))));
        assert!(matches!(start.plus_seconds(i64::MAX / 2), Err(Error::InvalidData(_))));
        assert!(matches!(start.plus_hours(i64::MIN), Err(Error::InvalidData(_))));
        assert!(matches!(start.plus_days(i64::MAX / 24), Err(Error::InvalidData(_))));
        assert!(matches!(start.plus_days(400_000_000), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_parse_requires_zone_marker() {
        assert!("2024-02-28T23:00:00".parse::<PackedInstant>().is_err());
        assert!(PackedInstant::MISSING.is_missing());
        assert_eq!(PackedInstant::MISSING.to_string(), "");
    }
}
