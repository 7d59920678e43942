//! Conjunction prediction.
//!
//! Periodic lookahead scan: every object is propagated to each future minute
//! `t = 1..=N` and the first pair found below the danger threshold, in
//! (increasing `t`, then pair) order, is reported. This is an early-exit
//! search. The reported pair is the first hit of that traversal, not the
//! global closest approach.
//!
//! The scan works on its own position buffer and never touches the
//! per-tick position cache.

use std::fmt;

use bevy::log::info;
use rand::Rng;

use crate::catalog::TrackedObject;
use crate::propagation::{Propagator, SceneMapper, locate};
use crate::types::{ObjectId, SECONDS_PER_MINUTE, ScenePosition};

/// Outcome of one prediction cycle. Replaced every cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConjunctionPrediction {
    /// No pair came within the threshold during the scanned window.
    NoDanger,
    /// First dangerous approach found.
    Danger {
        a: ObjectId,
        b: ObjectId,
        /// Minutes of simulated time from the scan start.
        minutes: u32,
    },
}

impl ConjunctionPrediction {
    pub fn is_danger(&self) -> bool {
        matches!(self, Self::Danger { .. })
    }
}

/// Parameters of a lookahead scan.
#[derive(Clone, Copy)]
pub struct LookaheadScan<'a> {
    pub propagator: &'a dyn Propagator,
    pub mapper: &'a SceneMapper,
    /// Number of one-minute steps.
    pub lookahead_minutes: u32,
    /// Scene distance counted as dangerous.
    pub threshold: f64,
}

impl fmt::Debug for LookaheadScan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookaheadScan")
            .field("mapper", self.mapper)
            .field("lookahead_minutes", &self.lookahead_minutes)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl LookaheadScan<'_> {
    /// Scan forward from simulated time `now` (Unix seconds).
    ///
    /// Objects whose propagation fails at a step are left out of that step.
    pub fn run(&self, objects: &[TrackedObject], now: f64) -> ConjunctionPrediction {
        if objects.len() < 2 {
            return ConjunctionPrediction::NoDanger;
        }

        let threshold_sq = self.threshold * self.threshold;
        let mut working: Vec<(ObjectId, ScenePosition)> = Vec::with_capacity(objects.len());

        for minutes in 1..=self.lookahead_minutes {
            let t = now + minutes as f64 * SECONDS_PER_MINUTE;

            working.clear();
            working.extend(objects.iter().filter_map(|object| {
                locate(self.propagator, self.mapper, &object.elements, t)
                    .ok()
                    .map(|(_, scene)| (object.id, scene))
            }));

            for (i, &(a, pos_a)) in working.iter().enumerate() {
                for &(b, pos_b) in &working[i + 1..] {
                    if pos_a.distance_squared(pos_b) < threshold_sq {
                        info!(
                            "Predicted conjunction: {} and {} in {} min",
                            a, b, minutes
                        );
                        return ConjunctionPrediction::Danger { a, b, minutes };
                    }
                }
            }
        }

        ConjunctionPrediction::NoDanger
    }
}

/// Sample one random pair of current positions.
///
/// Returns `None` when no pair can be sampled (fewer than two objects, the
/// same object drawn twice, or a drawn object without a position yet), in
/// which case the previous prediction stays in place.
pub fn spot_check(
    objects: &[TrackedObject],
    rng: &mut impl Rng,
    threshold: f64,
) -> Option<ConjunctionPrediction> {
    if objects.len() < 2 {
        return None;
    }

    let a = &objects[rng.gen_range(0..objects.len())];
    let b = &objects[rng.gen_range(0..objects.len())];
    if a.id == b.id {
        return None;
    }

    let distance = a.scene?.distance(b.scene?);
    Some(if distance < threshold {
        ConjunctionPrediction::Danger {
            a: a.id,
            b: b.id,
            minutes: 0,
        }
    } else {
        ConjunctionPrediction::NoDanger
    })
}
