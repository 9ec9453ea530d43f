//! Time module for Julian date conversions
//!
//! This module turns calendar instants into Astronomical Julian Dates (a
//! continuous count of days whose day boundary falls at noon UTC) and back.
//! It also provides the [`Clock`] capability used wherever "the current time"
//! is needed, so callers decide where "now" comes from.

use crate::constants::{DAY_S, UNIX_EPOCH_JD};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for time operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TimeError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    #[error("Time out of range: {0}")]
    OutOfRange(String),

    #[error("Calendar error: {0}")]
    CalendarError(String),
}

/// Result type for time operations
pub type Result<T> = std::result::Result<T, TimeError>;

/// Calendar tuple for representing a UTC date and time
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarTuple {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: f64,
}

impl CalendarTuple {
    /// Create a calendar tuple without validating it
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: f64) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Check that the tuple names a real instant on the proleptic Gregorian calendar
    ///
    /// Seconds up to (but excluding) 61 are accepted so that a leap second
    /// can be expressed.
    pub fn validate(&self) -> Result<()> {
        if NaiveDate::from_ymd_opt(self.year, self.month, self.day).is_none() {
            return Err(TimeError::CalendarError(format!(
                "{:04}-{:02}-{:02} is not a valid date",
                self.year, self.month, self.day
            )));
        }
        if self.hour >= 24 {
            return Err(TimeError::OutOfRange(format!("hour {}", self.hour)));
        }
        if self.minute >= 60 {
            return Err(TimeError::OutOfRange(format!("minute {}", self.minute)));
        }
        if !self.second.is_finite() || !(0.0..61.0).contains(&self.second) {
            return Err(TimeError::OutOfRange(format!("second {}", self.second)));
        }
        Ok(())
    }

    /// Fraction of the civil day (midnight to midnight) elapsed at this time
    fn day_fraction(&self) -> f64 {
        (self.hour as f64 + self.minute as f64 / 60.0 + self.second / 3600.0) / 24.0
    }
}

impl From<(i32, u32, u32, u32, u32, f64)> for CalendarTuple {
    fn from(t: (i32, u32, u32, u32, u32, f64)) -> Self {
        Self::new(t.0, t.1, t.2, t.3, t.4, t.5)
    }
}

impl From<(i32, u32, u32)> for CalendarTuple {
    fn from(date: (i32, u32, u32)) -> Self {
        Self::new(date.0, date.1, date.2, 0, 0, 0.0)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for CalendarTuple {
    fn from(dt: DateTime<Tz>) -> Self {
        let utc = dt.with_timezone(&Utc);
        Self::new(
            utc.year(),
            utc.month(),
            utc.day(),
            utc.hour(),
            utc.minute(),
            utc.second() as f64 + utc.nanosecond() as f64 / 1_000_000_000.0,
        )
    }
}

impl FromStr for CalendarTuple {
    type Err = TimeError;

    /// Parse `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[.fff]` or the same with a
    /// space separator. A trailing `Z` is accepted; all values are UTC.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_end_matches('Z');

        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(naive.and_utc().into());
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Ok((date.year(), date.month(), date.day()).into());
        }

        Err(TimeError::InvalidFormat(s.to_string()))
    }
}

impl fmt::Display for CalendarTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:06.3} UTC",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Largest Julian day number magnitude accepted when converting back to a calendar date
///
/// Keeps the intermediate products of the day-number algorithm inside `i64`;
/// years this far out already overflow `i32`.
const MAX_CALENDAR_JDN: f64 = 1e15;

/// Calculate the Julian day number of a proleptic Gregorian calendar date
///
/// This follows the algorithm in the Explanatory Supplement to the
/// Astronomical Almanac 15.11. The returned number labels the Julian day that
/// begins at noon of the given civil date. All divisions round toward
/// negative infinity, so years before -4716 are handled too.
pub fn julian_day(year: i32, month: u32, day: u32) -> i64 {
    let year = year as i64;
    let month = month as i64;
    let day = day as i64;

    let janfeb = month <= 2;
    let g = year + 4716 - if janfeb { 1 } else { 0 };
    let f = (month + 9).rem_euclid(12);
    let e = (1461 * g).div_euclid(4) + day - 1402;
    let j = e + (153 * f + 2).div_euclid(5);

    j + 38 - ((g + 184).div_euclid(100) * 3).div_euclid(4)
}

/// Convert a Julian day number back to a proleptic Gregorian calendar date
///
/// Fails with [`TimeError::OutOfRange`] when the year does not fit in `i32`.
pub fn julian_day_to_calendar_date(jd: i64) -> Result<(i32, u32, u32)> {
    if (jd as f64).abs() > MAX_CALENDAR_JDN {
        return Err(TimeError::OutOfRange(format!("Julian day number {}", jd)));
    }

    // See the Explanatory Supplement to the Astronomical Almanac 15.11.
    let f = jd + 1401 + ((4 * jd + 274_277).div_euclid(146_097) * 3).div_euclid(4) - 38;

    let e = 4 * f + 3;
    let g = e.rem_euclid(1461).div_euclid(4);
    let h = 5 * g + 2;

    let day = h.rem_euclid(153).div_euclid(5) + 1;
    let month = (h.div_euclid(153) + 2).rem_euclid(12) + 1;
    let year = e.div_euclid(1461) - 4716 + (12 + 2 - month).div_euclid(12);

    let year = i32::try_from(year)
        .map_err(|_| TimeError::OutOfRange(format!("year {} of Julian day number {}", year, jd)))?;

    // Month lies in 1..=12 and day in 1..=31 by construction
    Ok((year, month as u32, day as u32))
}

/// Convert a UTC calendar instant to an Astronomical Julian Date
///
/// Civil midnight of a date is half a day before its Julian day number.
/// The tuple is not validated; see [`CalendarTuple::validate`].
pub fn calendar_to_jd(cal: &CalendarTuple) -> f64 {
    let jdn = julian_day(cal.year, cal.month, cal.day);
    jdn as f64 - 0.5 + cal.day_fraction()
}

/// Convert an Astronomical Julian Date to a UTC calendar tuple
///
/// This is the inverse of [`calendar_to_jd`]. Non-finite dates and dates
/// whose year does not fit in `i32` fail with [`TimeError::OutOfRange`].
pub fn jd_to_calendar(jd: f64) -> Result<CalendarTuple> {
    if !jd.is_finite() {
        return Err(TimeError::OutOfRange(format!("Julian date {}", jd)));
    }

    // Shift to a midnight-based day so that the whole part names the civil date
    let jd_plus_half = jd + 0.5;
    let z = jd_plus_half.floor();
    let f = jd_plus_half - z;

    if z.abs() > MAX_CALENDAR_JDN {
        return Err(TimeError::OutOfRange(format!("Julian date {}", jd)));
    }
    let (year, month, day) = julian_day_to_calendar_date(z as i64)?;

    let seconds_in_day = f * DAY_S;
    let hour = (seconds_in_day / 3600.0).floor() as u32;
    let minute = ((seconds_in_day - hour as f64 * 3600.0) / 60.0).floor() as u32;
    let second = seconds_in_day - hour as f64 * 3600.0 - minute as f64 * 60.0;

    Ok(CalendarTuple {
        year,
        month,
        day,
        hour,
        minute,
        second,
    })
}

/// Convert a UTC datetime to an Astronomical Julian Date
///
/// Leap seconds are not counted, matching the POSIX timestamp underneath.
pub fn datetime_to_jd(dt: DateTime<Utc>) -> f64 {
    let seconds = dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 / 1_000_000_000.0;
    UNIX_EPOCH_JD + seconds / DAY_S
}

/// Convert an Astronomical Julian Date to a UTC datetime
pub fn jd_to_datetime(jd: f64) -> Result<DateTime<Utc>> {
    if !jd.is_finite() {
        return Err(TimeError::OutOfRange(format!("Julian date {}", jd)));
    }

    let seconds = (jd - UNIX_EPOCH_JD) * DAY_S;
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1_000_000_000.0).round().min(999_999_999.0) as u32;

    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return Err(TimeError::OutOfRange(format!("Julian date {}", jd)));
    }

    DateTime::<Utc>::from_timestamp(whole as i64, nanos)
        .ok_or_else(|| TimeError::OutOfRange(format!("Julian date {}", jd)))
}

/// An instant that can be expressed as an Astronomical Julian Date
pub trait ToJulianDate {
    /// Continuous Julian Date of this instant, in days
    fn to_julian_date(&self) -> Result<f64>;
}

/// A bare number is taken to already be a Julian date and is passed through
/// unchecked.
impl ToJulianDate for f64 {
    fn to_julian_date(&self) -> Result<f64> {
        Ok(*self)
    }
}

impl<Tz: TimeZone> ToJulianDate for DateTime<Tz> {
    fn to_julian_date(&self) -> Result<f64> {
        Ok(datetime_to_jd(self.with_timezone(&Utc)))
    }
}

/// Naive datetimes are interpreted as UTC
impl ToJulianDate for NaiveDateTime {
    fn to_julian_date(&self) -> Result<f64> {
        Ok(datetime_to_jd(self.and_utc()))
    }
}

impl ToJulianDate for CalendarTuple {
    fn to_julian_date(&self) -> Result<f64> {
        self.validate()?;
        Ok(calendar_to_jd(self))
    }
}

impl<T: ToJulianDate + ?Sized> ToJulianDate for &T {
    fn to_julian_date(&self) -> Result<f64> {
        (**self).to_julian_date()
    }
}

/// Source of the current instant
pub trait Clock {
    /// The current time in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that is stopped at a single instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Create a clock that always reports `instant`
    pub fn new<Tz: TimeZone>(instant: DateTime<Tz>) -> Self {
        Self(instant.with_timezone(&Utc))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{EPOCH_2010_JD, J2000};
    use approx::assert_abs_diff_eq;
    use chrono::{FixedOffset, TimeZone};
    use rstest::rstest;

    #[rstest]
    #[case(2000, 1, 1, 2_451_545)]
    #[case(2009, 12, 31, 2_455_197)]
    #[case(1970, 1, 1, 2_440_588)]
    #[case(1858, 11, 17, 2_400_001)]
    #[case(2024, 2, 29, 2_460_370)]
    fn test_julian_day(#[case] year: i32, #[case] month: u32, #[case] day: u32, #[case] jdn: i64) {
        assert_eq!(julian_day(year, month, day), jdn);
        assert_eq!(julian_day_to_calendar_date(jdn).unwrap(), (year, month, day));
    }

    #[test]
    fn test_calendar_to_jd_noon_and_midnight() {
        // J2000.0 is 2000-01-01T12:00:00
        let noon = CalendarTuple::new(2000, 1, 1, 12, 0, 0.0);
        assert_abs_diff_eq!(calendar_to_jd(&noon), J2000, epsilon = 1e-9);

        // 2010 January 0.0 is midnight starting 2009-12-31
        let epoch: CalendarTuple = (2009, 12, 31).into();
        assert_abs_diff_eq!(calendar_to_jd(&epoch), EPOCH_2010_JD, epsilon = 1e-9);
    }

    #[test]
    fn test_jd_to_calendar() {
        let cal = jd_to_calendar(J2000 + 0.25).unwrap();
        assert_eq!((cal.year, cal.month, cal.day), (2000, 1, 1));
        assert_eq!((cal.hour, cal.minute), (18, 0));
        assert_abs_diff_eq!(cal.second, 0.0, epsilon = 1e-4);

        // Just before the noon day boundary the civil date must not change
        let cal = jd_to_calendar(EPOCH_2010_JD + 0.499).unwrap();
        assert_eq!((cal.year, cal.month, cal.day, cal.hour), (2009, 12, 31, 11));
    }

    #[rstest]
    #[case(-5000, 3, 1)]
    #[case(-4717, 1, 1)]
    #[case(-4713, 11, 24)]
    #[case(-4713, 11, 23)]
    #[case(-1, 12, 31)]
    #[case(0, 2, 29)]
    #[case(-100_000, 7, 15)]
    #[case(200_000, 10, 4)]
    fn test_distant_dates_match_datetime(
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
    ) {
        let cal = CalendarTuple::new(year, month, day, 6, 0, 0.0);
        let dt = Utc.with_ymd_and_hms(year, month, day, 6, 0, 0).unwrap();

        let jd = cal.to_julian_date().unwrap();
        assert_abs_diff_eq!(jd, datetime_to_jd(dt), epsilon = 1e-6);

        let back = jd_to_calendar(jd).unwrap();
        assert_eq!((back.year, back.month, back.day, back.hour), (year, month, day, 6));
    }

    #[test]
    fn test_negative_julian_dates() {
        // JDN 0 begins at noon on -4713-11-24
        assert_eq!(julian_day(-4713, 11, 24), 0);
        assert_eq!(julian_day_to_calendar_date(-1).unwrap(), (-4713, 11, 23));

        let cal = jd_to_calendar(-1_000_000.5).unwrap();
        assert_eq!((cal.year, cal.month, cal.day), (-7451, 12, 28));
        assert_eq!((cal.hour, cal.minute), (0, 0));
        assert_abs_diff_eq!(calendar_to_jd(&cal), -1_000_000.5, epsilon = 1e-9);

        let cal = jd_to_calendar(-0.25).unwrap();
        assert_eq!((cal.year, cal.month, cal.day, cal.hour), (-4713, 11, 24, 6));
    }

    #[test]
    fn test_jd_to_calendar_out_of_range() {
        for jd in [1e15, -1e15, 1e300, f64::NAN, f64::INFINITY] {
            assert!(matches!(jd_to_calendar(jd), Err(TimeError::OutOfRange(_))));
        }
        assert!(matches!(
            julian_day_to_calendar_date(i64::MAX),
            Err(TimeError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_datetime_to_jd() {
        let dt = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert_abs_diff_eq!(datetime_to_jd(dt), J2000, epsilon = 1e-9);

        let unix = Utc.timestamp_opt(0, 0).unwrap();
        assert_abs_diff_eq!(datetime_to_jd(unix), UNIX_EPOCH_JD, epsilon = 1e-12);
    }

    #[test]
    fn test_time_zone_is_honored() {
        // 2009-12-31T05:30:00+05:30 is the 2010.0 epoch
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let local = ist.with_ymd_and_hms(2009, 12, 31, 5, 30, 0).unwrap();
        assert_abs_diff_eq!(local.to_julian_date().unwrap(), EPOCH_2010_JD, epsilon = 1e-9);
    }

    #[test]
    fn test_jd_to_datetime() {
        let dt = jd_to_datetime(J2000).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap());

        assert!(matches!(
            jd_to_datetime(f64::NAN),
            Err(TimeError::OutOfRange(_))
        ));
        assert!(jd_to_datetime(f64::MAX).is_err());
    }

    #[rstest]
    #[case(CalendarTuple::new(2010, 13, 1, 0, 0, 0.0))]
    #[case(CalendarTuple::new(2010, 2, 30, 0, 0, 0.0))]
    #[case(CalendarTuple::new(2010, 0, 1, 0, 0, 0.0))]
    fn test_invalid_calendar_date(#[case] cal: CalendarTuple) {
        assert!(matches!(
            cal.to_julian_date(),
            Err(TimeError::CalendarError(_))
        ));
    }

    #[rstest]
    #[case(CalendarTuple::new(2010, 1, 1, 24, 0, 0.0))]
    #[case(CalendarTuple::new(2010, 1, 1, 0, 60, 0.0))]
    #[case(CalendarTuple::new(2010, 1, 1, 0, 0, -1.0))]
    #[case(CalendarTuple::new(2010, 1, 1, 0, 0, f64::NAN))]
    fn test_time_of_day_out_of_range(#[case] cal: CalendarTuple) {
        assert!(matches!(cal.validate(), Err(TimeError::OutOfRange(_))));
    }

    #[test]
    fn test_leap_second_is_accepted() {
        let cal = CalendarTuple::new(2016, 12, 31, 23, 59, 60.5);
        assert!(cal.validate().is_ok());
    }

    #[test]
    fn test_parse_calendar_tuple() {
        let cal: CalendarTuple = "2010-06-21T12:30:15.5Z".parse().unwrap();
        assert_eq!(cal, CalendarTuple::new(2010, 6, 21, 12, 30, 15.5));

        let cal: CalendarTuple = "2009-12-31".parse().unwrap();
        assert_abs_diff_eq!(cal.to_julian_date().unwrap(), EPOCH_2010_JD, epsilon = 1e-9);

        let cal: CalendarTuple = "2009-12-31 06:00:00".parse().unwrap();
        assert_eq!(cal.hour, 6);

        assert!(matches!(
            "yesterday".parse::<CalendarTuple>(),
            Err(TimeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_naive_datetime_is_utc() {
        let naive = NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_abs_diff_eq!(naive.to_julian_date().unwrap(), J2000, epsilon = 1e-9);
    }

    #[test]
    fn test_fixed_clock() {
        let instant = Utc.with_ymd_and_hms(2021, 3, 20, 9, 37, 0).unwrap();
        let clock = FixedClock::new(instant);
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
