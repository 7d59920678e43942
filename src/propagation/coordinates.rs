//! Coordinate mapping from inertial positions to the visualization scene.
//!
//! The scene projection is a visual convention, not a metric embedding:
//! the radius grows linearly with altitude on top of a fixed Earth radius,
//! and the vertical axis carries `r·sin(lat)`, so latitude and altitude are
//! mixed along it. Output compatibility depends on this exact mapping.

use std::f64::consts::{PI, TAU};

use bevy::math::DVec3;

use crate::types::{
    EARTH_EQUATORIAL_RADIUS_KM, EARTH_POLAR_RADIUS_KM, Geodetic, ScenePosition, days_since_j2000,
};

pub const DAYS_PER_JULIAN_CENTURY: f64 = 36525.0;
pub const GMST_BASE_DEG: f64 = 280.46061837;
pub const GMST_ROTATION_PER_DAY: f64 = 360.98564736629;
pub const GMST_CORRECTION: f64 = 0.000387933;

/// Iterations of the geodetic latitude fixed point.
const GEODETIC_ITERATIONS: usize = 20;

/// Greenwich mean sidereal angle in radians, in [0, 2π).
pub fn sidereal_angle(unix_seconds: f64) -> f64 {
    let days = days_since_j2000(unix_seconds);
    let centuries = days / DAYS_PER_JULIAN_CENTURY;
    let degrees = GMST_BASE_DEG + GMST_ROTATION_PER_DAY * days + GMST_CORRECTION * centuries * centuries
        - centuries * centuries * centuries / 38_710_000.0;
    degrees.rem_euclid(360.0).to_radians()
}

/// Rotate an inertial position into the Earth-fixed frame and derive the
/// WGS-84 geodetic position.
pub fn inertial_to_geodetic(position: DVec3, sidereal: f64) -> Geodetic {
    let a = EARTH_EQUATORIAL_RADIUS_KM;
    let b = EARTH_POLAR_RADIUS_KM;
    let f = (a - b) / a;
    let e2 = 2.0 * f - f * f;

    let r = (position.x * position.x + position.y * position.y).sqrt();

    let mut longitude = (position.y.atan2(position.x) - sidereal).rem_euclid(TAU);
    if longitude > PI {
        longitude -= TAU;
    }

    let mut latitude = position.z.atan2(r);
    let mut c = 1.0;
    for _ in 0..GEODETIC_ITERATIONS {
        let sin_lat = latitude.sin();
        c = 1.0 / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        latitude = (position.z + a * c * e2 * sin_lat).atan2(r);
    }

    Geodetic {
        latitude,
        longitude,
        altitude_km: r / latitude.cos() - a * c,
    }
}

/// Fixed projection from geodetic coordinates into scene units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneMapper {
    /// Scene radius of the Earth surface.
    pub base_radius: f64,
    /// Kilometres of altitude per scene unit.
    pub altitude_scale: f64,
}

impl SceneMapper {
    pub fn new(base_radius: f64, altitude_scale: f64) -> Self {
        Self {
            base_radius,
            altitude_scale,
        }
    }

    /// `r = base + alt/scale`, `x = r·cos(lat)·cos(lon)`, `y = r·sin(lat)`,
    /// `z = -r·cos(lat)·sin(lon)`.
    pub fn geodetic_to_scene(&self, geo: &Geodetic) -> ScenePosition {
        let r = self.base_radius + geo.altitude_km / self.altitude_scale;
        let (sin_lat, cos_lat) = geo.latitude.sin_cos();
        let (sin_lon, cos_lon) = geo.longitude.sin_cos();
        DVec3::new(r * cos_lat * cos_lon, r * sin_lat, -r * cos_lat * sin_lon)
    }

    /// Full chain: inertial position at a time to geodetic and scene.
    pub fn to_scene(&self, inertial: DVec3, unix_seconds: f64) -> (Geodetic, ScenePosition) {
        let geo = inertial_to_geodetic(inertial, sidereal_angle(unix_seconds));
        (geo, self.geodetic_to_scene(&geo))
    }
}
