//! Engine configuration.
//!
//! The three historical engine variants differed only in constants
//! (thresholds, clock scale, debris). They are expressed here as presets
//! of one configuration table rather than as separate engines.

/// Default URL of the upstream catalog (CelesTrak active satellites, TLE format).
pub const DEFAULT_CATALOG_URL: &str =
    "https://celestrak.org/NORAD/elements/gp.php?GROUP=active&FORMAT=tle";

/// Shortest accepted interval between prediction cycles, in real seconds.
pub const MIN_PREDICTION_INTERVAL_SECONDS: f64 = 0.01;

/// What the collision detector does while the clock is paused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CollisionWhilePaused {
    /// Keep evaluating the frozen positions every tick.
    #[default]
    Evaluate,
    /// Do not run the detector; the last status stays visible.
    Skip,
}

/// Strategy used by the periodic conjunction predictor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PredictionMode {
    /// Propagate every object forward minute by minute and report the
    /// first pair that comes within the prediction threshold.
    #[default]
    Lookahead,
    /// Sample one random pair from the current positions per cycle.
    SpotCheck,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("speed bounds must satisfy 0 < min <= max (got {min}..={max})")]
    InvalidSpeedBounds { min: f64, max: f64 },

    #[error("speed multiplier {value} outside configured bounds {min}..={max}")]
    SpeedOutOfBounds { value: f64, min: f64, max: f64 },

    #[error("{name} must be a positive finite number (got {value})")]
    NotPositive { name: &'static str, value: f64 },

    #[error("{name} must be at least 1")]
    Zero { name: &'static str },

    #[error("{name} must be at least {min} (got {value})")]
    BelowMinimum {
        name: &'static str,
        value: f64,
        min: f64,
    },
}

/// Configuration for the simulation engine.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Simulated seconds per real second, before `tick_time_scale`.
    pub speed_multiplier: f64,
    /// Lower bound accepted for the speed multiplier.
    pub min_speed_multiplier: f64,
    /// Upper bound accepted for the speed multiplier.
    pub max_speed_multiplier: f64,
    /// Start with the clock paused.
    pub paused: bool,
    /// Extra factor applied to every clock advance (1 or 60 in practice).
    pub tick_time_scale: f64,
    /// Scene distance below which two objects are flagged at risk.
    pub collision_threshold: f64,
    /// Detector behavior while paused.
    pub collision_while_paused: CollisionWhilePaused,
    /// Number of one-minute lookahead steps per prediction cycle.
    pub prediction_lookahead_minutes: u32,
    /// Scene distance below which a future approach counts as dangerous.
    pub prediction_threshold: f64,
    /// Real seconds between prediction cycles.
    pub prediction_interval_seconds: f64,
    pub prediction_mode: PredictionMode,
    /// Scene distance used by [`PredictionMode::SpotCheck`].
    pub spot_check_threshold: f64,
    /// Catalog capacity; loading stops once this many objects are accepted.
    pub max_tracked_objects: usize,
    /// Scene radius of the Earth surface.
    pub base_radius: f64,
    /// Kilometres of altitude per scene unit.
    pub altitude_scale: f64,
    /// Radius of the sphere used for ray picking.
    pub pick_radius: f64,
    /// Time span covered by an orbit path polyline.
    pub path_minutes: f64,
    /// Spacing between orbit path samples.
    pub path_step_minutes: f64,
    /// Number of procedural debris objects.
    pub debris_count: usize,
    /// Seed for debris placement and spot-check sampling.
    pub rng_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            speed_multiplier: 50.0,
            min_speed_multiplier: 1.0,
            max_speed_multiplier: 500.0,
            paused: false,
            tick_time_scale: 1.0,
            collision_threshold: 0.25,
            collision_while_paused: CollisionWhilePaused::Evaluate,
            prediction_lookahead_minutes: 15,
            prediction_threshold: 0.12,
            prediction_interval_seconds: 5.0,
            prediction_mode: PredictionMode::Lookahead,
            spot_check_threshold: 1.0,
            max_tracked_objects: 200,
            base_radius: 2.0,
            altitude_scale: 2000.0,
            pick_radius: 0.05,
            path_minutes: 90.0,
            path_step_minutes: 1.0,
            debris_count: 0,
            rng_seed: 0x5EED,
        }
    }
}

impl EngineConfig {
    /// Variant whose clock advances one simulated minute per scaled second.
    pub fn minute_scale() -> Self {
        Self {
            speed_multiplier: 1.0,
            tick_time_scale: 60.0,
            collision_threshold: 0.15,
            collision_while_paused: CollisionWhilePaused::Skip,
            ..Self::default()
        }
    }

    /// Variant with a ring of procedural debris around the catalog objects.
    pub fn debris_field() -> Self {
        Self {
            debris_count: 300,
            collision_threshold: 0.2,
            ..Self::default()
        }
    }

    /// Check every option against its documented range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = (self.min_speed_multiplier, self.max_speed_multiplier);
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(ConfigError::InvalidSpeedBounds { min, max });
        }
        if !(min..=max).contains(&self.speed_multiplier) {
            return Err(ConfigError::SpeedOutOfBounds {
                value: self.speed_multiplier,
                min,
                max,
            });
        }

        for (name, value) in [
            ("tick_time_scale", self.tick_time_scale),
            ("collision_threshold", self.collision_threshold),
            ("prediction_threshold", self.prediction_threshold),
            ("prediction_interval_seconds", self.prediction_interval_seconds),
            ("spot_check_threshold", self.spot_check_threshold),
            ("base_radius", self.base_radius),
            ("altitude_scale", self.altitude_scale),
            ("pick_radius", self.pick_radius),
            ("path_minutes", self.path_minutes),
            ("path_step_minutes", self.path_step_minutes),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        if self.prediction_interval_seconds < MIN_PREDICTION_INTERVAL_SECONDS {
            return Err(ConfigError::BelowMinimum {
                name: "prediction_interval_seconds",
                value: self.prediction_interval_seconds,
                min: MIN_PREDICTION_INTERVAL_SECONDS,
            });
        }

        if self.prediction_lookahead_minutes == 0 {
            return Err(ConfigError::Zero {
                name: "prediction_lookahead_minutes",
            });
        }
        if self.max_tracked_objects == 0 {
            return Err(ConfigError::Zero {
                name: "max_tracked_objects",
            });
        }
        Ok(())
    }
}
