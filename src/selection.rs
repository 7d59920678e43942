//! Object selection and nearest-neighbor lookup.
//!
//! Selection runs synchronously on pick events against the positions
//! cached by the last tick.

use bevy::math::DVec3;

use crate::catalog::TrackedObject;
use crate::types::{ObjectId, ScenePosition};

/// Distance reported when there is no other object to compare against.
pub const NO_NEIGHBOR_DISTANCE: f64 = 999.0;

/// Risk score reported for coincident objects instead of `1 / 0`.
pub const MAX_RISK_SCORE: f64 = 1.0e6;

/// What the user picked.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PickInput {
    /// Direct selection by id.
    Object(ObjectId),
    /// A ray in scene space, e.g. unprojected from a screen click.
    Ray { origin: DVec3, direction: DVec3 },
}

/// Result of a nearest-neighbor query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NearestNeighbor {
    /// Closest other object, `None` when there is none.
    pub nearest: Option<ObjectId>,
    /// Scene distance to it, [`NO_NEIGHBOR_DISTANCE`] when there is none.
    pub distance: f64,
    /// `1 / distance`, saturated at [`MAX_RISK_SCORE`]; 0 when there is none.
    pub risk_score: f64,
}

impl NearestNeighbor {
    pub const NONE: Self = Self {
        nearest: None,
        distance: NO_NEIGHBOR_DISTANCE,
        risk_score: 0.0,
    };
}

/// Risk score for a neighbor distance.
pub fn risk_score(distance: f64) -> f64 {
    if distance <= 1.0 / MAX_RISK_SCORE {
        MAX_RISK_SCORE
    } else {
        1.0 / distance
    }
}

/// Linear scan for the object closest to `selected`.
///
/// Objects that have never been positioned are ignored.
pub fn nearest_neighbor(objects: &[TrackedObject], selected: ObjectId) -> NearestNeighbor {
    let Some(origin) = objects
        .iter()
        .find(|o| o.id == selected)
        .and_then(|o| o.scene)
    else {
        return NearestNeighbor::NONE;
    };

    let mut best: Option<(ObjectId, f64)> = None;
    for other in objects.iter().filter(|o| o.id != selected) {
        let Some(pos) = other.scene else {
            continue;
        };
        let distance = origin.distance(pos);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((other.id, distance));
        }
    }

    match best {
        Some((id, distance)) => NearestNeighbor {
            nearest: Some(id),
            distance,
            risk_score: risk_score(distance),
        },
        None => NearestNeighbor::NONE,
    }
}

/// Object whose pick sphere the ray enters first, if any.
pub fn pick_by_ray(
    objects: &[TrackedObject],
    origin: DVec3,
    direction: DVec3,
    radius: f64,
) -> Option<ObjectId> {
    let dir = direction.try_normalize()?;
    objects
        .iter()
        .filter_map(|o| Some((o.id, ray_sphere_hit(origin, dir, o.scene?, radius)?)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Distance along a unit ray to the first intersection with a sphere.
fn ray_sphere_hit(origin: DVec3, dir: DVec3, center: ScenePosition, radius: f64) -> Option<f64> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let near = -b - sqrt_d;
    let far = -b + sqrt_d;
    if near >= 0.0 {
        Some(near)
    } else if far >= 0.0 {
        // Origin inside the sphere.
        Some(0.0)
    } else {
        None
    }
}
