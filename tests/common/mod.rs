//! Common test utilities for integration tests.

#![allow(dead_code)]

use bevy::math::DVec3;
use orbital_sentinel::catalog::ElementRecord;
use orbital_sentinel::propagation::{InertialPosition, PropagationFailure, Propagator};

/// ISS element set at epoch 2020-07-12 21:16:01 UTC.
pub const ISS_LINE1: &str = "1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992";
pub const ISS_LINE2: &str = "2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";

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

/// ISS orbit relabelled with another catalog number and mean anomaly.
pub fn tle_pair(catalog_number: u32, mean_anomaly_deg: f64) -> (String, String) {
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
    let (s1, s2) = (checksum(&line1), checksum(&line2));
    (format!("{line1}{s1}"), format!("{line2}{s2}"))
}

/// One three-line group.
pub fn group(name: &str, catalog_number: u32, mean_anomaly_deg: f64) -> String {
    let (line1, line2) = tle_pair(catalog_number, mean_anomaly_deg);
    format!("{name}\n{line1}\n{line2}\n")
}

/// `count` objects on the ISS orbit, spread 20° apart in mean anomaly.
pub fn spread_catalog(count: u32) -> String {
    (0..count)
        .map(|n| group(&format!("SAT-{n}"), 40000 + n, n as f64 * 20.0))
        .collect()
}

/// Propagator returning fixed inertial positions per catalog number.
pub struct FixedPropagator(pub fn(u64, f64) -> Option<DVec3>);

impl Propagator for FixedPropagator {
    fn propagate(
        &self,
        elements: &ElementRecord,
        unix_seconds: f64,
    ) -> Result<InertialPosition, PropagationFailure> {
        (self.0)(elements.catalog_number, unix_seconds).ok_or(PropagationFailure::Diverged {
            catalog_number: elements.catalog_number,
            minutes: elements.minutes_since_epoch(unix_seconds),
        })
    }
}
