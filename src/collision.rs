//! Collision risk detection between tracked objects.
//!
//! Exhaustive all-pairs scan over the positions refreshed this tick. The
//! catalog is capped at a few hundred objects, so no spatial partitioning is
//! used; squared distances are evaluated four candidates at a time.

use std::collections::BTreeSet;

use wide::f64x4;

use crate::types::{ObjectId, ScenePosition};

/// Risk status for one tick. Recomputed from scratch every tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollisionStatus {
    /// Whether any pair is closer than the threshold.
    pub risk: bool,
    /// Every object that is part of at least one at-risk pair.
    pub at_risk: BTreeSet<ObjectId>,
    /// At-risk pairs, lower index first, in scan order.
    pub pairs: Vec<(ObjectId, ObjectId)>,
}

impl CollisionStatus {
    pub fn is_at_risk(&self, id: ObjectId) -> bool {
        self.at_risk.contains(&id)
    }

    /// Whether the unordered pair `{a, b}` is at risk.
    pub fn pair_at_risk(&self, a: ObjectId, b: ObjectId) -> bool {
        self.pairs
            .iter()
            .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
    }
}

/// Flag every unordered pair closer than `threshold`.
///
/// `positions` holds only objects with a valid position this tick.
pub fn detect_collisions(positions: &[(ObjectId, ScenePosition)], threshold: f64) -> CollisionStatus {
    let threshold_sq = threshold * threshold;
    let mut status = CollisionStatus::default();

    for (i, &(id_a, a)) in positions.iter().enumerate() {
        let rest = &positions[i + 1..];
        let (ax, ay, az) = (f64x4::splat(a.x), f64x4::splat(a.y), f64x4::splat(a.z));

        let mut chunks = rest.chunks_exact(4);
        let mut offset = 0;
        for chunk in chunks.by_ref() {
            let bx = f64x4::new([chunk[0].1.x, chunk[1].1.x, chunk[2].1.x, chunk[3].1.x]);
            let by = f64x4::new([chunk[0].1.y, chunk[1].1.y, chunk[2].1.y, chunk[3].1.y]);
            let bz = f64x4::new([chunk[0].1.z, chunk[1].1.z, chunk[2].1.z, chunk[3].1.z]);
            let (dx, dy, dz) = (ax - bx, ay - by, az - bz);
            let dist_sq = (dx * dx + dy * dy + dz * dz).to_array();

            for (k, d) in dist_sq.iter().enumerate() {
                if *d < threshold_sq {
                    flag(&mut status, id_a, rest[offset + k].0);
                }
            }
            offset += 4;
        }

        for &(id_b, b) in chunks.remainder() {
            if a.distance_squared(b) < threshold_sq {
                flag(&mut status, id_a, id_b);
            }
        }
    }

    status
}

fn flag(status: &mut CollisionStatus, a: ObjectId, b: ObjectId) {
    status.risk = true;
    status.at_risk.insert(a);
    status.at_risk.insert(b);
    status.pairs.push((a, b));
}
