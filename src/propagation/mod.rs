//! Propagation adapter.
//!
//! Turns an element record and an absolute time into an inertial (TEME)
//! position. Failure is an expected outcome for decayed or numerically
//! unstable element sets: callers keep the last known position and leave
//! the object out of that evaluation.

pub mod coordinates;

use bevy::math::DVec3;
use sgp4::MinutesSinceEpoch;

pub use coordinates::{SceneMapper, inertial_to_geodetic, sidereal_angle};

use crate::catalog::ElementRecord;
use crate::types::{EARTH_EQUATORIAL_RADIUS_KM, Geodetic, ScenePosition};

/// Radius beyond which a propagated position is treated as runaway.
pub const MAX_ORBIT_RADIUS_KM: f64 = 100.0 * EARTH_EQUATORIAL_RADIUS_KM;

/// Position in the Earth-centred inertial frame, in km.
pub type InertialPosition = DVec3;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PropagationFailure {
    #[error("SGP4 failed for {catalog_number} at {minutes:.1} min from epoch: {reason}")]
    Sgp4 {
        catalog_number: u64,
        minutes: f64,
        reason: String,
    },

    #[error("orbit of {catalog_number} has decayed at {minutes:.1} min from epoch")]
    Decayed { catalog_number: u64, minutes: f64 },

    #[error("non-finite or runaway position for {catalog_number} at {minutes:.1} min from epoch")]
    Diverged { catalog_number: u64, minutes: f64 },
}

/// Computes inertial positions from element records.
pub trait Propagator: Send + Sync + 'static {
    /// Position at `unix_seconds`. Never panics; failure is returned.
    fn propagate(
        &self,
        elements: &ElementRecord,
        unix_seconds: f64,
    ) -> Result<InertialPosition, PropagationFailure>;
}

/// SGP4/SDP4 propagation via the `sgp4` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sgp4Propagator;

impl Propagator for Sgp4Propagator {
    fn propagate(
        &self,
        elements: &ElementRecord,
        unix_seconds: f64,
    ) -> Result<InertialPosition, PropagationFailure> {
        let minutes = elements.minutes_since_epoch(unix_seconds);
        let prediction = elements
            .constants
            .propagate(MinutesSinceEpoch(minutes))
            .map_err(|e| PropagationFailure::Sgp4 {
                catalog_number: elements.catalog_number,
                minutes,
                reason: e.to_string(),
            })?;

        let position = DVec3::from_array(prediction.position);
        let radius = position.length();
        if !radius.is_finite() || radius > MAX_ORBIT_RADIUS_KM {
            return Err(PropagationFailure::Diverged {
                catalog_number: elements.catalog_number,
                minutes,
            });
        }
        // Below the surface: the element set is past its useful life.
        if radius < EARTH_EQUATORIAL_RADIUS_KM {
            return Err(PropagationFailure::Decayed {
                catalog_number: elements.catalog_number,
                minutes,
            });
        }
        Ok(position)
    }
}

/// Propagate and map to geodetic and scene coordinates in one step.
pub fn locate(
    propagator: &dyn Propagator,
    mapper: &SceneMapper,
    elements: &ElementRecord,
    unix_seconds: f64,
) -> Result<(Geodetic, ScenePosition), PropagationFailure> {
    let inertial = propagator.propagate(elements, unix_seconds)?;
    Ok(mapper.to_scene(inertial, unix_seconds))
}
