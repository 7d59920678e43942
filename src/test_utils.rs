//! Test utilities for the simulation engine.
//!
//! Provides checksummed TLE fixtures and a scripted propagator whose
//! positions are chosen by the test instead of by SGP4.

use bevy::math::DVec3;

use crate::catalog::ElementRecord;
use crate::propagation::{InertialPosition, PropagationFailure, Propagator};

/// Fixtures for building element sets and catalogs.
pub mod fixtures {
    /// ISS element set at epoch 2020-07-12 21:16:01 UTC.
    pub const ISS_LINE1: &str =
        "1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992";
    pub const ISS_LINE2: &str =
        "2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";

    /// Unix timestamp of the ISS fixture epoch.
    pub const ISS_EPOCH_UNIX: f64 = 1_594_588_561.0;

    /// TLE checksum: digit sum over the first 68 columns, '-' counting as 1.
    pub fn checksum(line: &str) -> u32 {
        line.chars()
            .take(68)
            .map(|c| match c {
                '-' => 1,
                c => c.to_digit(10).unwrap_or(0),
            })
            .sum::<u32>()
            % 10
    }

    fn with_checksum(body: String) -> String {
        let sum = checksum(&body);
        format!("{body}{sum}")
    }

    /// ISS orbit relabelled with another catalog number.
    pub fn tle_pair(catalog_number: u32) -> (String, String) {
        tle_pair_with_anomaly(catalog_number, 280.4612)
    }

    /// ISS orbit relabelled with another catalog number and mean anomaly.
    pub fn tle_pair_with_anomaly(catalog_number: u32, mean_anomaly_deg: f64) -> (String, String) {
        assert!(catalog_number < 100_000);
        let id = format!("{catalog_number:05}");
        let line1 = format!("{}{}{}", &ISS_LINE1[..2], id, &ISS_LINE1[7..68]);
        let line2 = format!(
            "{}{}{}{:8.4}{}",
            &ISS_LINE2[..2],
            id,
            &ISS_LINE2[7..43],
            mean_anomaly_deg.rem_euclid(360.0),
            &ISS_LINE2[51..68]
        );
        (with_checksum(line1), with_checksum(line2))
    }

    /// A catalog of `count` valid groups named `OBJ-<n>`.
    pub fn catalog_text(count: u32) -> String {
        (0..count)
            .map(|n| {
                let (line1, line2) = tle_pair_with_anomaly(30000 + n, n as f64 * 7.0);
                format!("OBJ-{n}\n{line1}\n{line2}\n")
            })
            .collect()
    }
}

/// Position script: (catalog number, unix seconds) to inertial position,
/// `None` meaning the propagation fails.
pub type Script = dyn Fn(u64, f64) -> Option<DVec3> + Send + Sync;

/// Propagator driven by a closure, for deterministic engine scenarios.
pub struct ScriptedPropagator {
    script: Box<Script>,
}

impl ScriptedPropagator {
    pub fn new(script: impl Fn(u64, f64) -> Option<DVec3> + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
        }
    }
}

impl Propagator for ScriptedPropagator {
    fn propagate(
        &self,
        elements: &ElementRecord,
        unix_seconds: f64,
    ) -> Result<InertialPosition, PropagationFailure> {
        (self.script)(elements.catalog_number, unix_seconds).ok_or(PropagationFailure::Diverged {
            catalog_number: elements.catalog_number,
            minutes: elements.minutes_since_epoch(unix_seconds),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_checksum_matches_published_lines() {
        assert_eq!(checksum(ISS_LINE1), 2);
        assert_eq!(checksum(ISS_LINE2), 8);
    }

    #[test]
    fn test_relabelled_lines_keep_layout() {
        let (line1, line2) = tle_pair_with_anomaly(7, 12.5);
        assert_eq!(line1.len(), 69);
        assert_eq!(line2.len(), 69);
        assert_eq!(&line1[2..7], "00007");
        assert_eq!(&line2[43..51], " 12.5000");
    }
}
