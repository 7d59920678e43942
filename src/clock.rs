//! Simulation clock.
//!
//! Maps wall-clock time onto simulated time with a speed multiplier and a
//! pause switch. The wall-clock anchor is refreshed on every tick, paused
//! or not, so resuming never applies the paused interval as one large step.

use bevy::prelude::*;

use crate::config::EngineConfig;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ClockError {
    #[error("speed multiplier must be a positive finite number (got {0})")]
    InvalidSpeed(f64),

    #[error("speed bounds must satisfy 0 < min <= max (got {min}..={max})")]
    InvalidBounds { min: f64, max: f64 },
}

/// Running/paused clock state.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationClock {
    /// Simulated time as Unix seconds.
    current: f64,
    /// Simulated seconds per real second, before `tick_scale`.
    speed: f64,
    paused: bool,
    tick_scale: f64,
    min_speed: f64,
    max_speed: f64,
    /// Wall-clock seconds at the previous tick.
    anchor: Option<f64>,
}

impl SimulationClock {
    /// Create a clock at `start` (Unix seconds) with the configured speed,
    /// bounds, scale and initial pause state.
    ///
    /// The initial speed is clamped into the bounds; the bounds themselves
    /// must be positive, finite and ordered.
    pub fn new(start: f64, config: &EngineConfig) -> Result<Self, ClockError> {
        let (min, max) = (config.min_speed_multiplier, config.max_speed_multiplier);
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(ClockError::InvalidBounds { min, max });
        }
        let speed = config.speed_multiplier;
        if !(speed.is_finite() && speed > 0.0) {
            return Err(ClockError::InvalidSpeed(speed));
        }

        Ok(Self {
            current: start,
            speed: speed.clamp(min, max),
            paused: config.paused,
            tick_scale: config.tick_time_scale,
            min_speed: min,
            max_speed: max,
            anchor: None,
        })
    }

    /// Current simulated time as Unix seconds.
    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn tick_scale(&self) -> f64 {
        self.tick_scale
    }

    /// Advance to wall-clock time `wall_now` (seconds on any monotonic base).
    ///
    /// Returns the simulated seconds added by this tick. The first tick only
    /// establishes the anchor.
    pub fn tick(&mut self, wall_now: f64) -> f64 {
        let wall_delta = match self.anchor {
            Some(previous) => (wall_now - previous).max(0.0),
            None => 0.0,
        };
        self.anchor = Some(wall_now);

        if self.paused {
            return 0.0;
        }

        let sim_delta = wall_delta * self.speed * self.tick_scale;
        self.current += sim_delta;
        sim_delta
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            self.paused = paused;
            info!("Simulation {}", if paused { "paused" } else { "running" });
        }
    }

    /// Flip the pause state, returning the new state.
    pub fn toggle_pause(&mut self) -> bool {
        self.set_paused(!self.paused);
        self.paused
    }

    /// Set the speed multiplier.
    ///
    /// Non-positive or non-finite input is rejected and leaves the speed
    /// unchanged; positive input is clamped into the configured bounds.
    /// Returns the speed actually applied.
    pub fn set_speed(&mut self, speed: f64) -> Result<f64, ClockError> {
        if !(speed.is_finite() && speed > 0.0) {
            warn!("Rejected speed multiplier {}", speed);
            return Err(ClockError::InvalidSpeed(speed));
        }
        let clamped = speed.clamp(self.min_speed, self.max_speed);
        if clamped != speed {
            warn!(
                "Speed multiplier {} clamped to {} (bounds {}..={})",
                speed, clamped, self.min_speed, self.max_speed
            );
        }
        self.speed = clamped;
        info!("Time scale: {}x", self.speed);
        Ok(clamped)
    }

    /// Jump simulated time, e.g. when a catalog is reloaded.
    pub fn set_current(&mut self, unix_seconds: f64) {
        self.current = unix_seconds;
    }
}
