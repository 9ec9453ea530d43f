//! Ecliptic longitude of the Sun
//!
//! The Sun's apparent motion is modelled as a Keplerian orbit with the
//! elements it had at epoch 2010 January 0.0. The mean longitude advances
//! uniformly with the tropical year, and a first-order equation of center
//! corrects it for orbital eccentricity. No perturbations (Moon, planets,
//! nutation, aberration) are applied, so results are good to about a degree.
//!
//! ```rust
//! use solar_longitude::SolarLongitudeCalculator;
//!
//! // 2010 January 0.0
//! let sun = SolarLongitudeCalculator::new(2_455_196.5);
//! assert!((sun.longitude() - 279.4385).abs() < 1e-3);
//! ```

use crate::constants::{
    DEG2RAD, DEG360, ECLIPTIC_LONGITUDE_AT_EPOCH, EPOCH_2010_JD, LONGITUDE_OF_PERIGEE_AT_EPOCH,
    ORBITAL_ECCENTRICITY, TROPICAL_YEAR_DAYS,
};
use crate::time::{jd_to_datetime, Clock, ToJulianDate};
use crate::{Result, SolarError};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Reduce an angle in degrees to the range [0, 360)
///
/// `rem_euclid` can round a tiny negative input up to exactly 360, which is
/// folded back to 0. Non-finite input yields NaN.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let reduced = degrees.rem_euclid(DEG360);
    if reduced >= DEG360 {
        0.0
    } else {
        reduced
    }
}

/// Every intermediate quantity of one longitude evaluation, in degrees
/// except where noted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarLongitude {
    /// Astronomical Julian Date of the instant (days)
    pub julian_date: f64,
    /// Days elapsed since epoch 2010 January 0.0
    pub days_since_epoch: f64,
    /// Mean longitude advanced since epoch, N
    pub mean_motion: f64,
    /// Mean anomaly, M
    pub mean_anomaly: f64,
    /// Equation of center, Ec
    pub equation_of_center: f64,
    /// Ecliptic longitude of the Sun, λ
    pub longitude: f64,
}

/// Computes the Sun's ecliptic longitude for one fixed instant
///
/// The calculator holds nothing but the Julian date it was built for. Every
/// query is recomputed from that date and the epoch constants, so instances
/// are cheap to copy and safe to share between threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarLongitudeCalculator {
    julian_date: f64,
}

impl SolarLongitudeCalculator {
    /// Create a calculator for a Julian date
    ///
    /// The value is not checked: NaN or infinite dates produce NaN results.
    /// Use [`SolarLongitudeCalculator::try_new`] to reject them up front.
    pub fn new(julian_date: f64) -> Self {
        Self { julian_date }
    }

    /// Create a calculator for a Julian date, rejecting NaN and infinities
    pub fn try_new(julian_date: f64) -> Result<Self> {
        if !julian_date.is_finite() {
            warn!("Rejecting non-finite Julian date {}", julian_date);
            return Err(SolarError::NonFiniteJulianDate(julian_date));
        }
        Ok(Self::new(julian_date))
    }

    /// Create a calculator for any instant convertible to a Julian date
    ///
    /// Conversion failures are returned unchanged as [`SolarError::Time`].
    pub fn from_instant<T: ToJulianDate>(instant: T) -> Result<Self> {
        let julian_date = instant.to_julian_date()?;
        debug!("Solar longitude calculator at JD {:.6}", julian_date);
        Ok(Self::new(julian_date))
    }

    /// Create a calculator for the instant currently reported by `clock`
    pub fn now<C: Clock + ?Sized>(clock: &C) -> Result<Self> {
        let instant = clock.now();
        debug!("Reading current instant {} from clock", instant);
        Self::from_instant(instant)
    }

    /// The Astronomical Julian Date this calculator was built for
    pub fn julian_date(&self) -> f64 {
        self.julian_date
    }

    /// Days elapsed since epoch 2010 January 0.0
    pub fn days_since_epoch(&self) -> f64 {
        self.julian_date - EPOCH_2010_JD
    }

    /// Mean longitude advanced since epoch, N, in [0, 360)
    pub fn mean_motion(&self) -> f64 {
        normalize_degrees(DEG360 / TROPICAL_YEAR_DAYS * self.days_since_epoch())
    }

    /// Mean anomaly, M, in degrees
    ///
    /// A single +360 shift brings negative values into range. With N in
    /// [0, 360) the raw value lies in [-3.56, 356.44), so one shift is always
    /// enough; this bound depends on the epoch longitudes and must be
    /// re-derived if they change.
    pub fn mean_anomaly(&self) -> f64 {
        let mean_anomaly =
            self.mean_motion() + ECLIPTIC_LONGITUDE_AT_EPOCH - LONGITUDE_OF_PERIGEE_AT_EPOCH;
        if mean_anomaly < 0.0 {
            mean_anomaly + DEG360
        } else {
            mean_anomaly
        }
    }

    /// Equation of center, Ec, in degrees
    pub fn equation_of_center(&self) -> f64 {
        (DEG360 / PI) * ORBITAL_ECCENTRICITY * (self.mean_anomaly() * DEG2RAD).sin()
    }

    /// Ecliptic longitude of the Sun, λ, in degrees within [0, 360)
    pub fn longitude(&self) -> f64 {
        self.breakdown().longitude
    }

    /// Evaluate the whole pipeline once and return every intermediate value
    pub fn breakdown(&self) -> SolarLongitude {
        let days_since_epoch = self.days_since_epoch();
        let mean_motion = self.mean_motion();
        let mean_anomaly = self.mean_anomaly();
        let equation_of_center = self.equation_of_center();
        let longitude =
            normalize_degrees(mean_motion + equation_of_center + ECLIPTIC_LONGITUDE_AT_EPOCH);

        trace!(
            "JD {:.6}: D={:.6} N={:.6} M={:.6} Ec={:.6} λ={:.6}",
            self.julian_date,
            days_since_epoch,
            mean_motion,
            mean_anomaly,
            equation_of_center,
            longitude
        );

        SolarLongitude {
            julian_date: self.julian_date,
            days_since_epoch,
            mean_motion,
            mean_anomaly,
            equation_of_center,
            longitude,
        }
    }
}

impl From<f64> for SolarLongitudeCalculator {
    fn from(julian_date: f64) -> Self {
        Self::new(julian_date)
    }
}

impl fmt::Display for SolarLongitudeCalculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match jd_to_datetime(self.julian_date) {
            Ok(dt) => write!(
                f,
                "JD {:.6} ({}): λ☉ = {:.6}°",
                self.julian_date,
                dt.format("%Y-%m-%d %H:%M:%S UTC"),
                self.longitude()
            ),
            Err(_) => write!(f, "JD {}: λ☉ = {}°", self.julian_date, self.longitude()),
        }
    }
}
