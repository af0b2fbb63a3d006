//! Packed temporal codec.
//!
//! Dates, times, datetimes and instants are stored as plain integers so columns
//! of them are flat primitive buffers and comparisons are integer comparisons.
//! Every packed layout is monotonic with the calendar order it encodes, and each
//! reserves the minimum value of its width as the missing sentinel.
//!
//! Calendar rules follow the proleptic Gregorian calendar. The `time` crate is
//! used at the edges (validation errors, interop); arithmetic stays on the packed
//! fields.

mod date;
mod datetime;
mod instant;
mod time_of_day;

pub use date::PackedDate;
pub use datetime::PackedDateTime;
pub use instant::PackedInstant;
pub use time_of_day::{PackedTime, TimeUnit};

use crate::error::{Error, Result};

pub(crate) const DAYS_PER_CYCLE: i64 = 146_097;
pub(crate) const DAYS_0000_TO_1970: i64 = DAYS_PER_CYCLE * 5 - (30 * 365 + 7);

pub(crate) const MILLIS_PER_SECOND: i64 = 1_000;
pub(crate) const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
pub(crate) const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
pub(crate) const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

pub(crate) fn is_leap_year(year: i32) -> bool {
    time::util::is_leap_year(year)
}

pub(crate) fn length_of_month(year: i32, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Days since 1970-01-01 for a valid calendar date.
pub(crate) fn epoch_day(year: i32, month: u8, day: u8) -> i64 {
    let y = i64::from(year);
    let m = i64::from(month);
    let mut total = 365 * y;
    if y >= 0 {
        total += (y + 3) / 4 - (y + 99) / 100 + (y + 399) / 400;
    } else {
        total -= y / -4 - y / -100 + y / -400;
    }
    total += (367 * m - 362) / 12;
    total += i64::from(day) - 1;
    if m > 2 {
        total -= 1;
        if !is_leap_year(year) {
            total -= 1;
        }
    }
    total - DAYS_0000_TO_1970
}

/// Calendar fields `(year, month, day)` for a count of days since 1970-01-01.
pub(crate) fn civil_from_epoch_day(epoch_day: i64) -> (i64, u8, u8) {
    // March-based years put the leap day at the end of the four year cycle.
    let mut zero_day = epoch_day + DAYS_0000_TO_1970 - 60;
    let mut adjust = 0;
    if zero_day < 0 {
        let adjust_cycles = (zero_day + 1) / DAYS_PER_CYCLE - 1;
        adjust = adjust_cycles * 400;
        zero_day -= adjust_cycles * DAYS_PER_CYCLE;
    }
    let mut year_est = (400 * zero_day + 591) / DAYS_PER_CYCLE;
    let mut doy_est = zero_day - (365 * year_est + year_est / 4 - year_est / 100 + year_est / 400);
    if doy_est < 0 {
        year_est -= 1;
        doy_est = zero_day - (365 * year_est + year_est / 4 - year_est / 100 + year_est / 400);
    }
    year_est += adjust;

    let march_month0 = (doy_est * 5 + 2) / 153;
    let month = (march_month0 + 2) % 12 + 1;
    let day = doy_est - (march_month0 * 306 + 5) / 10 + 1;
    year_est += march_month0 / 10;
    (year_est, month as u8, day as u8)
}

pub(crate) fn check_year(year: i64) -> Result<i16> {
    i16::try_from(year).map_err(|_| Error::invalid(format!("year {year} outside packed range")))
}

/// Accept a day count only if it lands on a date with a packable year.
pub(crate) fn check_epoch_day(day: i64) -> Result<i64> {
    let first = epoch_day(i32::from(i16::MIN), 1, 1);
    let last = epoch_day(i32::from(i16::MAX), 12, 31);
    if (first..=last).contains(&day) {
        Ok(day)
    } else {
        Err(Error::invalid(format!("epoch day {day} outside packed range")))
    }
}

/// Error for arithmetic whose intermediate value does not fit an `i64`.
pub(crate) fn overflow(what: &str) -> Error {
    Error::invalid(format!("{what} overflows"))
}

pub(crate) fn scaled(amount: i64, unit_millis: i64) -> Result<i64> {
    amount.checked_mul(unit_millis).ok_or_else(|| overflow("offset"))
}

pub(crate) fn negated(amount: i64) -> Result<i64> {
    amount.checked_neg().ok_or_else(|| overflow("offset"))
}

pub(crate) fn parse_field<T: std::str::FromStr>(text: &str, part: &str, what: &str) -> Result<T> {
    part.parse::<T>()
        .map_err(|_| Error::invalid(format!("invalid {what} in '{text}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_day_anchors() {
        assert_eq!(epoch_day(1970, 1, 1), 0);
        assert_eq!(epoch_day(2000, 3, 1), 11_017);
        assert_eq!(epoch_day(1969, 12, 31), -1);
        assert_eq!(civil_from_epoch_day(0), (1970, 1, 1));
        assert_eq!(civil_from_epoch_day(-1), (1969, 12, 31));
    }

    #[test]
    fn test_epoch_day_matches_time_crate() {
        let epoch = time::Date::from_calendar_date(1970, time::Month::January, 1).unwrap();
        for (y, m, d) in [(1, 1, 1), (1600, 2, 29), (2024, 12, 31), (-44, 3, 15), (9999, 6, 1)] {
            let month = time::Month::try_from(m).unwrap();
            let date = time::Date::from_calendar_date(y, month, d).unwrap();
            let expected = i64::from(date.to_julian_day() - epoch.to_julian_day());
            assert_eq!(epoch_day(y, m, d), expected);
            assert_eq!(civil_from_epoch_day(expected), (i64::from(y), m, d));
        }
    }

    #[test]
    fn test_check_epoch_day_bounds() {
        let last = epoch_day(32767, 12, 31);
        let first = epoch_day(-32768, 1, 1);
        assert_eq!(check_epoch_day(last).unwrap(), last);
        assert_eq!(check_epoch_day(first).unwrap(), first);
        assert!(matches!(check_epoch_day(last + 1), Err(Error::InvalidData(_))));
        assert!(matches!(check_epoch_day(first - 1), Err(Error::InvalidData(_))));
        assert!(check_epoch_day(i64::MAX).is_err());
        assert!(check_epoch_day(i64::MIN).is_err());
        assert!(matches!(scaled(i64::MAX, 2), Err(Error::InvalidData(_))));
        assert!(negated(i64::MIN).is_err());
    }

    #[test]
    fn test_length_of_month() {
        assert_eq!(length_of_month(2024, 2), 29);
        assert_eq!(length_of_month(1900, 2), 28);
        assert_eq!(length_of_month(2000, 2), 29);
        assert_eq!(length_of_month(2023, 4), 30);
        assert_eq!(length_of_month(2023, 12), 31);
    }
}
