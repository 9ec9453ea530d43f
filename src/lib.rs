//! Solar longitude: where the Sun sits on the ecliptic
//!
//! This crate computes the ecliptic longitude of the Sun as seen from Earth
//! using a two-body Keplerian approximation anchored at epoch 2010 January 0.0.
//! It is a building block for almanac, sundial and basic ephemeris work where
//! an accuracy of about one degree is enough.
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use solar_longitude::SolarLongitudeCalculator;
//!
//! let solstice = Utc.with_ymd_and_hms(2010, 6, 21, 11, 28, 0).unwrap();
//! let sun = SolarLongitudeCalculator::from_instant(solstice).unwrap();
//! assert!((sun.longitude() - 90.0).abs() < 1.0);
//! ```

use thiserror::Error;

pub mod constants;
pub mod sun;
pub mod time;

// Re-export commonly used types
pub use sun::{normalize_degrees, SolarLongitude, SolarLongitudeCalculator};
pub use time::{CalendarTuple, Clock, FixedClock, SystemClock, TimeError, ToJulianDate};

/// Main error type for the solar longitude library
#[derive(Debug, Error)]
pub enum SolarError {
    #[error("Julian date is not finite: {0}")]
    NonFiniteJulianDate(f64),

    #[error("Time error: {0}")]
    Time(#[from] TimeError),
}

/// Result type for solar longitude operations
pub type Result<T> = std::result::Result<T, SolarError>;
