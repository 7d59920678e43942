//! Procedural debris.
//!
//! Decorative debris ring that does not come from the catalog. Each piece
//! moves along a circle by a fixed angular increment per tick, without any
//! propagation. Placement is drawn from a seeded generator so a given seed
//! always produces the same field.

use std::f64::consts::TAU;

use bevy::math::DVec3;
use rand::Rng;

use crate::types::ScenePosition;

/// Scene radii covered by the ring (low Earth orbit band).
const RADIUS_RANGE: std::ops::Range<f64> = 2.15..2.6;
/// Angular increment per tick, radians.
const SPEED_RANGE: std::ops::Range<f64> = 0.001..0.006;
/// Vertical spread around the equatorial plane.
const HEIGHT_RANGE: std::ops::Range<f64> = -0.3..0.3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebrisObject {
    pub angle: f64,
    pub radius: f64,
    /// Radians added per tick.
    pub angular_speed: f64,
    pub height: f64,
}

impl DebrisObject {
    pub fn position(&self) -> ScenePosition {
        let (sin, cos) = self.angle.sin_cos();
        DVec3::new(self.radius * cos, self.height, self.radius * sin)
    }

    pub fn advance(&mut self) {
        self.angle = (self.angle + self.angular_speed).rem_euclid(TAU);
    }
}

/// Spawn `count` debris pieces from `rng`.
pub fn spawn_debris(count: usize, rng: &mut impl Rng) -> Vec<DebrisObject> {
    (0..count)
        .map(|_| DebrisObject {
            angle: rng.gen_range(0.0..TAU),
            radius: rng.gen_range(RADIUS_RANGE),
            angular_speed: rng.gen_range(SPEED_RANGE),
            height: rng.gen_range(HEIGHT_RANGE),
        })
        .collect()
}
