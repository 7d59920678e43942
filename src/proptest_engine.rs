//! Property-based tests for the engine building blocks using proptest.
//!
//! These tests check the detector, clock, selection and mapping invariants
//! over a wide range of inputs.

use std::f64::consts::PI;

use bevy::math::DVec3;
use proptest::prelude::*;

use crate::catalog::parse_catalog;
use crate::clock::SimulationClock;
use crate::collision::detect_collisions;
use crate::config::EngineConfig;
use crate::propagation::{SceneMapper, inertial_to_geodetic};
use crate::selection::{MAX_RISK_SCORE, risk_score};
use crate::test_utils::fixtures::catalog_text;
use crate::types::{EARTH_EQUATORIAL_RADIUS_KM, ObjectId};

fn scene_points() -> impl Strategy<Value = Vec<(f64, f64, f64)>> {
    prop::collection::vec((-3.0f64..3.0, -3.0f64..3.0, -3.0f64..3.0), 0..24)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The vectorized detector flags exactly the pairs a plain scan flags.
    #[test]
    fn prop_detector_matches_brute_force(points in scene_points(), threshold in 0.01f64..1.5) {
        let positions: Vec<_> = points
            .iter()
            .enumerate()
            .map(|(i, &(x, y, z))| (ObjectId(i as u32), DVec3::new(x, y, z)))
            .collect();
        let status = detect_collisions(&positions, threshold);

        let mut expected = Vec::new();
        for i in 0..positions.len() {
            for j in i + 1..positions.len() {
                if positions[i].1.distance_squared(positions[j].1) < threshold * threshold {
                    expected.push((positions[i].0, positions[j].0));
                }
            }
        }
        prop_assert_eq!(status.risk, !expected.is_empty());
        prop_assert_eq!(status.pairs, expected);
    }

    /// Reordering the input never changes which objects are at risk.
    #[test]
    fn prop_detector_is_order_independent(points in scene_points(), threshold in 0.01f64..1.5) {
        let positions: Vec<_> = points
            .iter()
            .enumerate()
            .map(|(i, &(x, y, z))| (ObjectId(i as u32), DVec3::new(x, y, z)))
            .collect();
        let mut reversed = positions.clone();
        reversed.reverse();

        let forward = detect_collisions(&positions, threshold);
        let backward = detect_collisions(&reversed, threshold);
        prop_assert_eq!(forward.at_risk, backward.at_risk);
        prop_assert_eq!(forward.pairs.len(), backward.pairs.len());
    }

    /// Simulated advance is wall delta times speed times scale.
    #[test]
    fn prop_clock_advance_is_linear(
        speed in 1.0f64..500.0,
        scale in prop::sample::select(vec![1.0, 60.0]),
        wall_delta in 0.0f64..5.0,
    ) {
        let config = EngineConfig {
            speed_multiplier: speed,
            tick_time_scale: scale,
            ..Default::default()
        };
        let mut clock = SimulationClock::new(1.6e9, &config).unwrap();
        clock.tick(100.0);
        let advanced = clock.tick(100.0 + wall_delta);

        let expected = wall_delta * speed * scale;
        prop_assert!((advanced - expected).abs() <= 1e-9 * expected.max(1.0));
        prop_assert!((clock.current() - 1.6e9 - expected).abs() <= 1e-6);
    }

    /// A paused clock stays frozen whatever the wall clock does.
    #[test]
    fn prop_paused_clock_never_moves(walls in prop::collection::vec(-1e3f64..1e6, 1..20)) {
        let config = EngineConfig { paused: true, ..Default::default() };
        let mut clock = SimulationClock::new(1.6e9, &config).unwrap();
        for wall in walls {
            prop_assert_eq!(clock.tick(wall), 0.0);
        }
        prop_assert_eq!(clock.current(), 1.6e9);
    }

    /// Accepted speeds always land inside the configured bounds.
    #[test]
    fn prop_speed_is_clamped(speed in 1e-6f64..1e6) {
        let mut clock = SimulationClock::new(0.0, &EngineConfig::default()).unwrap();
        let applied = clock.set_speed(speed);
        prop_assert!(applied.is_ok());
        prop_assert!((1.0..=500.0).contains(&clock.speed()));
    }

    /// Risk score is finite, positive and never above the cap.
    #[test]
    fn prop_risk_score_is_bounded(distance in 0.0f64..1e4) {
        let score = risk_score(distance);
        prop_assert!(score.is_finite());
        prop_assert!(score > 0.0);
        prop_assert!(score <= MAX_RISK_SCORE);
    }

    /// Geodetic output stays in range and scene radius follows altitude.
    #[test]
    fn prop_geodetic_ranges(
        x in -8000.0f64..8000.0,
        y in -8000.0f64..8000.0,
        z in -8000.0f64..8000.0,
        sidereal in 0.0f64..(2.0 * PI),
    ) {
        let position = DVec3::new(x, y, z);
        prop_assume!(position.length() > EARTH_EQUATORIAL_RADIUS_KM + 100.0);
        prop_assume!(x.hypot(y) > 1.0);

        let geo = inertial_to_geodetic(position, sidereal);
        prop_assert!(geo.latitude.abs() <= PI / 2.0);
        prop_assert!((-PI..=PI).contains(&geo.longitude));

        let mapper = SceneMapper::new(2.0, 2000.0);
        let scene = mapper.geodetic_to_scene(&geo);
        let expected = 2.0 + geo.altitude_km / 2000.0;
        prop_assert!((scene.length() - expected.abs()).abs() < 1e-9);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// The loader never accepts more objects than the cap.
    #[test]
    fn prop_loader_respects_cap(count in 0u32..40, cap in 1usize..30) {
        let load = parse_catalog(&catalog_text(count), cap);
        prop_assert_eq!(load.objects.len(), (count as usize).min(cap));
        prop_assert_eq!(load.truncated, count as usize > cap);
        prop_assert_eq!(load.skipped, 0);
    }
}
