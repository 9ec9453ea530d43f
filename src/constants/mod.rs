//! Constants module for solar longitude calculations

use std::f64::consts::PI;

// Time constants
/// Seconds in a day
pub const DAY_S: f64 = 86_400.0;
/// J2000.0 epoch as Julian date
pub const J2000: f64 = 2_451_545.0;
/// Unix epoch (1970-01-01T00:00:00Z) as Julian date
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// Length of the tropical year in days at epoch 2010.0
pub const TROPICAL_YEAR_DAYS: f64 = 365.242_191;

// Angles
/// Degrees in a complete circle
pub const DEG360: f64 = 360.0;
/// Degrees to radians conversion factor
pub const DEG2RAD: f64 = PI / 180.0;

// Orbital elements of the Sun's apparent orbit at epoch 2010 January 0.0
/// Epoch 2010 January 0.0 (2009-12-31T00:00:00) as Julian date
pub const EPOCH_2010_JD: f64 = 2_455_196.5;
/// Ecliptic longitude of the Sun at epoch, in degrees (εg)
pub const ECLIPTIC_LONGITUDE_AT_EPOCH: f64 = 279.557_208;
/// Ecliptic longitude of perigee at epoch, in degrees (ϖg)
pub const LONGITUDE_OF_PERIGEE_AT_EPOCH: f64 = 283.112_438;
/// Eccentricity of the orbit at epoch
pub const ORBITAL_ECCENTRICITY: f64 = 0.016_705;
