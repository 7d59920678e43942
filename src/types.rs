//! Core types and constants shared by the simulation engine.

use std::fmt;

use bevy::math::DVec3;
use chrono::DateTime;

/// Seconds per day
pub const SECONDS_PER_DAY: f64 = 86400.0;

/// Seconds per minute
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Radians to degrees conversion factor
pub const RAD_TO_DEG: f64 = 180.0 / std::f64::consts::PI;

/// WGS-84 equatorial radius in km
pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.137;

/// WGS-84 polar radius in km
pub const EARTH_POLAR_RADIUS_KM: f64 = 6356.7523142;

/// J2000.0 epoch as Unix timestamp (January 1, 2000, 12:00 UTC)
pub const J2000_UNIX: f64 = 946_728_000.0;

/// Position in the visualization coordinate system (scene units).
pub type ScenePosition = DVec3;

/// Stable identity of a tracked object within one loaded catalog.
///
/// Assigned sequentially at load time; catalog numbers are not unique
/// enough for this (analyst objects and duplicated entries share them).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Geodetic position relative to the WGS-84 ellipsoid.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Geodetic {
    /// Latitude in radians, positive north
    pub latitude: f64,
    /// Longitude in radians, in [-π, π], positive east
    pub longitude: f64,
    /// Height above the ellipsoid in km
    pub altitude_km: f64,
}

impl Geodetic {
    pub fn latitude_deg(&self) -> f64 {
        self.latitude * RAD_TO_DEG
    }

    pub fn longitude_deg(&self) -> f64 {
        self.longitude * RAD_TO_DEG
    }
}

/// Current wall-clock time as Unix seconds.
pub fn current_unix_seconds() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Days elapsed since the J2000 epoch for a Unix timestamp.
pub fn days_since_j2000(unix_seconds: f64) -> f64 {
    (unix_seconds - J2000_UNIX) / SECONDS_PER_DAY
}

/// Format Unix seconds as `YYYY-MM-DD HH:MM:SS UTC`.
///
/// Timestamps outside chrono's representable range fall back to the raw value.
pub fn unix_seconds_to_date_string(unix_seconds: f64) -> String {
    let secs = unix_seconds.floor();
    let nanos = ((unix_seconds - secs) * 1e9) as u32;
    match DateTime::from_timestamp(secs as i64, nanos) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("{unix_seconds:.0} s (unix)"),
    }
}
