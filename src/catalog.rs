//! Catalog loading.
//!
//! Turns a raw text blob of three-line element sets (name, line 1, line 2)
//! into [`TrackedObject`]s. Malformed groups are skipped without disturbing
//! the groups that follow them, and loading stops at the configured capacity.

use std::fmt;

use bevy::prelude::*;
use sgp4::{Constants, Elements};

use crate::types::{Geodetic, ObjectId, ScenePosition};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("malformed element set '{name}': {reason}")]
    MalformedGroup { name: String, reason: String },

    #[error("catalog fetch failed: {0}")]
    Fetch(String),

    #[error("catalog read failed: {0}")]
    Read(String),
}

/// Derived orbital elements, produced once at load time.
///
/// Only the propagation adapter looks inside; the rest of the engine treats
/// it as opaque.
#[derive(Clone)]
pub struct ElementRecord {
    pub(crate) constants: Constants,
    /// Element set epoch as Unix seconds.
    pub epoch_unix: f64,
    pub catalog_number: u64,
    pub inclination_deg: f64,
    pub eccentricity: f64,
    /// Revolutions per day
    pub mean_motion: f64,
}

impl fmt::Debug for ElementRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRecord")
            .field("catalog_number", &self.catalog_number)
            .field("epoch_unix", &self.epoch_unix)
            .field("inclination_deg", &self.inclination_deg)
            .field("eccentricity", &self.eccentricity)
            .field("mean_motion", &self.mean_motion)
            .finish()
    }
}

impl ElementRecord {
    /// Parse and initialise an element record from two TLE lines.
    pub fn from_tle(name: &str, line1: &str, line2: &str) -> Result<Self, CatalogError> {
        let malformed = |reason: String| CatalogError::MalformedGroup {
            name: name.to_string(),
            reason,
        };

        let elements = Elements::from_tle(
            Some(name.to_string()),
            line1.as_bytes(),
            line2.as_bytes(),
        )
        .map_err(|e| malformed(e.to_string()))?;

        let constants = Constants::from_elements(&elements).map_err(|e| malformed(e.to_string()))?;

        Ok(Self {
            constants,
            epoch_unix: elements.datetime.and_utc().timestamp_millis() as f64 / 1000.0,
            catalog_number: elements.norad_id,
            inclination_deg: elements.inclination,
            eccentricity: elements.eccentricity,
            mean_motion: elements.mean_motion,
        })
    }

    /// Minutes between the element epoch and a Unix timestamp.
    pub fn minutes_since_epoch(&self, unix_seconds: f64) -> f64 {
        (unix_seconds - self.epoch_unix) / 60.0
    }
}

/// A catalog object tracked by the engine.
#[derive(Clone, Debug)]
pub struct TrackedObject {
    pub id: ObjectId,
    pub name: String,
    pub line1: String,
    pub line2: String,
    pub elements: ElementRecord,
    /// Last successfully propagated geodetic position.
    pub geodetic: Option<Geodetic>,
    /// Last successfully propagated scene position.
    pub scene: Option<ScenePosition>,
    /// Whether `scene` was refreshed by the most recent propagation.
    pub fresh: bool,
    /// Cached future path, present while the path is toggled on.
    pub path: Option<Vec<ScenePosition>>,
}

impl TrackedObject {
    pub fn new(id: ObjectId, name: &str, line1: &str, line2: &str) -> Result<Self, CatalogError> {
        let elements = ElementRecord::from_tle(name, line1, line2)?;
        Ok(Self {
            id,
            name: name.to_string(),
            line1: line1.to_string(),
            line2: line2.to_string(),
            elements,
            geodetic: None,
            scene: None,
            fresh: false,
            path: None,
        })
    }

    /// Scene position usable for this tick's pairwise checks.
    pub fn fresh_position(&self) -> Option<ScenePosition> {
        if self.fresh { self.scene } else { None }
    }
}

/// Result of loading a catalog text blob.
#[derive(Debug, Default)]
pub struct CatalogLoad {
    pub objects: Vec<TrackedObject>,
    /// Groups rejected because their element lines did not parse.
    pub skipped: usize,
    /// Whether input remained after the capacity was reached.
    pub truncated: bool,
}

fn is_line1(line: &str) -> bool {
    line.starts_with("1 ")
}

fn is_line2(line: &str) -> bool {
    line.starts_with("2 ")
}

/// Parse a catalog of three-line element sets.
///
/// Blank lines are ignored. When the name/line 1/line 2 alignment is broken
/// (a truncated group) the parser advances one line at a time until it finds
/// the next aligned group.
pub fn parse_catalog(text: &str, max_objects: usize) -> CatalogLoad {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut load = CatalogLoad::default();
    let mut i = 0;

    while i < lines.len() {
        if load.objects.len() >= max_objects {
            load.truncated = true;
            break;
        }

        let name = lines[i];
        if is_line1(name) || is_line2(name) {
            // Leftover of a group already counted at its name line.
            i += 1;
            continue;
        }

        match (lines.get(i + 1), lines.get(i + 2)) {
            (Some(&line1), Some(&line2)) if is_line1(line1) && is_line2(line2) => {
                let id = ObjectId(load.objects.len() as u32);
                match TrackedObject::new(id, name, line1, line2) {
                    Ok(object) => load.objects.push(object),
                    Err(err) => {
                        debug!("Skipping group: {}", err);
                        load.skipped += 1;
                    }
                }
                i += 3;
            }
            _ => {
                debug!("Skipping incomplete group '{}'", name);
                load.skipped += 1;
                i += 1;
            }
        }
    }

    info!(
        "Catalog loaded: {} objects, {} skipped{}",
        load.objects.len(),
        load.skipped,
        if load.truncated { " (capacity reached)" } else { "" }
    );

    load
}

/// Fetch the raw catalog text, returned verbatim.
///
/// Any transport or status failure is reported as an opaque
/// [`CatalogError::Fetch`]; there is no retry.
#[cfg(feature = "fetch")]
pub fn fetch_catalog_text(url: &str) -> Result<String, CatalogError> {
    let response = ureq::get(url)
        .set("User-Agent", "orbital-sentinel")
        .call()
        .map_err(|e| CatalogError::Fetch(e.to_string()))?;

    response
        .into_string()
        .map_err(|e| CatalogError::Fetch(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::{ISS_LINE1, ISS_LINE2, catalog_text, tle_pair};

    #[test]
    fn test_parses_single_group() {
        let text = format!("ISS (ZARYA)\n{ISS_LINE1}\n{ISS_LINE2}\n");
        let load = parse_catalog(&text, 200);

        assert_eq!(load.objects.len(), 1);
        assert_eq!(load.skipped, 0);
        let iss = &load.objects[0];
        assert_eq!(iss.name, "ISS (ZARYA)");
        assert_eq!(iss.id, ObjectId(0));
        assert_eq!(iss.elements.catalog_number, 25544);
        assert!(iss.scene.is_none());
        assert!(!iss.fresh);
    }

    #[test]
    fn test_ignores_blank_and_padded_lines() {
        let text = format!("\n\n  ISS  \n   {ISS_LINE1}\n\n{ISS_LINE2}   \n\n\n");
        let load = parse_catalog(&text, 200);
        assert_eq!(load.objects.len(), 1);
        assert_eq!(load.objects[0].name, "ISS");
    }

    #[test]
    fn test_missing_line_does_not_shift_following_groups() {
        let (a1, a2) = tle_pair(10001);
        let (b1, _) = tle_pair(10002);
        let (c1, c2) = tle_pair(10003);
        let (d1, d2) = tle_pair(10004);
        let text = format!("A\n{a1}\n{a2}\nB\n{b1}\nC\n{c1}\n{c2}\nD\n{d1}\n{d2}\n");

        let load = parse_catalog(&text, 200);

        let names: Vec<&str> = load.objects.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["A", "C", "D"]);
        assert_eq!(load.skipped, 1);
        assert_eq!(load.objects[1].elements.catalog_number, 10003);
    }

    #[test]
    fn test_unparseable_group_is_skipped() {
        let (a1, a2) = tle_pair(20001);
        let (b1, b2) = tle_pair(20002);
        // Eccentricity field (columns 27-33) replaced with garbage.
        let bad = format!("{}XXXXXXX{}", &b2[..26], &b2[33..]);
        let text = format!("A\n{a1}\n{a2}\nB\n{b1}\n{bad}\n");

        let load = parse_catalog(&text, 200);
        assert_eq!(load.objects.len(), 1);
        assert_eq!(load.skipped, 1);
    }

    #[test]
    fn test_capacity_cap() {
        let text = catalog_text(250);
        let load = parse_catalog(&text, 200);
        assert_eq!(load.objects.len(), 200);
        assert!(load.truncated);
    }

    #[test]
    fn test_ids_are_sequential_over_accepted_objects() {
        let text = catalog_text(5);
        let load = parse_catalog(&text, 200);
        let ids: Vec<u32> = load.objects.iter().map(|o| o.id.0).collect();
        assert_eq!(ids, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_input() {
        let load = parse_catalog("", 200);
        assert!(load.objects.is_empty());
        assert_eq!(load.skipped, 0);
        assert!(!load.truncated);
    }

    #[test]
    fn test_epoch_conversion() {
        let record = ElementRecord::from_tle("ISS", ISS_LINE1, ISS_LINE2).unwrap();
        // Epoch 20194.88612269 = 2020-07-12 21:16:01 UTC
        let expected = 1_594_588_561.0;
        assert!((record.epoch_unix - expected).abs() < 1.0, "{}", record.epoch_unix);
        assert_eq!(record.minutes_since_epoch(record.epoch_unix + 120.0), 2.0);
    }
}
