//! Simulation engine controller.
//!
//! [`SimulationEngine`] owns all mutable simulation state: the clock, the
//! tracked objects with their cached positions, the collision status and the
//! last conjunction prediction. Consumers read owned [`EngineSnapshot`]s
//! instead of holding references into the engine.
//!
//! [`EnginePlugin`] drives the engine from bevy: the frame tick runs every
//! `Update`, the conjunction predictor runs off a repeating real-time timer.

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::catalog::{CatalogError, TrackedObject, parse_catalog};
use crate::clock::{ClockError, SimulationClock};
use crate::collision::{CollisionStatus, detect_collisions};
use crate::config::{
    CollisionWhilePaused, ConfigError, EngineConfig, MIN_PREDICTION_INTERVAL_SECONDS, PredictionMode,
};
use crate::debris::{DebrisObject, spawn_debris};
use crate::prediction::{ConjunctionPrediction, LookaheadScan, spot_check};
use crate::propagation::{Propagator, SceneMapper, Sgp4Propagator, locate, sidereal_angle};
use crate::selection::{NearestNeighbor, PickInput, nearest_neighbor, pick_by_ray};
use crate::types::{ObjectId, ScenePosition, SECONDS_PER_MINUTE, unix_seconds_to_date_string};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("unknown object {0}")]
    UnknownObject(ObjectId),

    #[error(transparent)]
    Clock(#[from] ClockError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("engine has been torn down")]
    TornDown,
}

/// Summary of a catalog (re)load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub accepted: usize,
    pub skipped: usize,
    pub truncated: bool,
}

/// Summary of one frame tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Simulated seconds added by this tick.
    pub sim_delta: f64,
    /// Objects whose position was refreshed.
    pub propagated: usize,
    /// Objects whose propagation failed and kept their previous position.
    pub failed: usize,
    /// Whether the collision detector ran.
    pub evaluated: bool,
    pub risk: bool,
}

/// Current telemetry of one tracked object.
#[derive(Clone, Debug, PartialEq)]
pub struct Telemetry {
    pub id: ObjectId,
    pub name: String,
    pub catalog_number: u64,
    pub latitude_deg: Option<f64>,
    pub longitude_deg: Option<f64>,
    pub altitude_km: Option<f64>,
    pub scene: Option<ScenePosition>,
    /// Position refreshed by the last propagation.
    pub fresh: bool,
    pub at_risk: bool,
}

/// Answer to a pick: the picked object and its closest neighbor.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub telemetry: Telemetry,
    pub nearest: NearestNeighbor,
    pub nearest_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectSnapshot {
    pub telemetry: Telemetry,
    pub path: Option<Vec<ScenePosition>>,
}

/// Read-only copy of the engine state for renderers and UI.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineSnapshot {
    /// Simulated time as Unix seconds.
    pub sim_time: f64,
    pub sim_time_label: String,
    pub speed: f64,
    pub paused: bool,
    /// Earth rotation angle at `sim_time`, radians.
    pub sidereal_angle: f64,
    pub objects: Vec<ObjectSnapshot>,
    pub collision: CollisionStatus,
    pub prediction: Option<ConjunctionPrediction>,
    pub prediction_message: String,
    pub debris: Vec<ScenePosition>,
}

/// The orbital simulation engine.
#[derive(Resource)]
pub struct SimulationEngine {
    config: EngineConfig,
    clock: SimulationClock,
    propagator: Box<dyn Propagator>,
    mapper: SceneMapper,
    objects: Vec<TrackedObject>,
    collision: CollisionStatus,
    prediction: Option<ConjunctionPrediction>,
    debris: Vec<DebrisObject>,
    rng: StdRng,
    torn_down: bool,
}

impl SimulationEngine {
    /// Engine using SGP4, starting at simulated time `start` (Unix seconds).
    pub fn new(config: EngineConfig, start: f64) -> Result<Self, EngineError> {
        Self::with_propagator(config, start, Sgp4Propagator)
    }

    pub fn with_propagator(
        config: EngineConfig,
        start: f64,
        propagator: impl Propagator,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(config.rng_seed);
        let debris = spawn_debris(config.debris_count, &mut rng);

        Ok(Self {
            clock: SimulationClock::new(start, &config)?,
            mapper: SceneMapper::new(config.base_radius, config.altitude_scale),
            propagator: Box::new(propagator),
            objects: Vec::new(),
            collision: CollisionStatus::default(),
            prediction: None,
            debris,
            rng,
            torn_down: false,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn objects(&self) -> &[TrackedObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&TrackedObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn collision_status(&self) -> &CollisionStatus {
        &self.collision
    }

    /// Result of the last prediction cycle, `None` before the first one.
    pub fn prediction(&self) -> Option<ConjunctionPrediction> {
        self.prediction
    }

    pub fn debris(&self) -> &[DebrisObject] {
        &self.debris
    }

    /// Whether the engine still accepts ticks and prediction cycles.
    pub fn is_running(&self) -> bool {
        !self.torn_down
    }

    /// Replace the tracked objects with the contents of a catalog text.
    ///
    /// All previous objects and their caches are dropped. Positions are
    /// computed immediately at the current simulated time.
    pub fn load_catalog(&mut self, text: &str) -> Result<LoadReport, EngineError> {
        if self.torn_down {
            return Err(EngineError::TornDown);
        }

        let load = parse_catalog(text, self.config.max_tracked_objects);
        self.objects = load.objects;
        self.prediction = None;
        self.refresh_positions();
        self.collision = self.evaluate_collisions();

        Ok(LoadReport {
            accepted: self.objects.len(),
            skipped: load.skipped,
            truncated: load.truncated,
        })
    }

    /// One frame: advance the clock, re-propagate, evaluate collisions.
    ///
    /// `wall_now` is wall-clock seconds on any monotonic base.
    pub fn tick(&mut self, wall_now: f64) -> TickReport {
        if self.torn_down {
            return TickReport::default();
        }

        let sim_delta = self.clock.tick(wall_now);
        let mut report = TickReport {
            sim_delta,
            ..Default::default()
        };

        let paused = self.clock.is_paused();
        if !paused {
            (report.propagated, report.failed) = self.refresh_positions();
            for debris in &mut self.debris {
                debris.advance();
            }
        }

        if !paused || self.config.collision_while_paused == CollisionWhilePaused::Evaluate {
            self.collision = self.evaluate_collisions();
            report.evaluated = true;
        }
        report.risk = self.collision.risk;
        report
    }

    /// Propagate every object to the current simulated time.
    ///
    /// Failed objects keep their last position but are marked stale.
    /// Returns (refreshed, failed) counts.
    fn refresh_positions(&mut self) -> (usize, usize) {
        let now = self.clock.current();
        let mut failed = 0;

        for object in &mut self.objects {
            match locate(self.propagator.as_ref(), &self.mapper, &object.elements, now) {
                Ok((geodetic, scene)) => {
                    object.geodetic = Some(geodetic);
                    object.scene = Some(scene);
                    object.fresh = true;
                }
                Err(err) => {
                    debug!("{} ({}): {}", object.name, object.id, err);
                    object.fresh = false;
                    failed += 1;
                }
            }
        }

        (self.objects.len() - failed, failed)
    }

    fn evaluate_collisions(&self) -> CollisionStatus {
        let positions: Vec<(ObjectId, ScenePosition)> = self
            .objects
            .iter()
            .filter_map(|o| Some((o.id, o.fresh_position()?)))
            .collect();
        detect_collisions(&positions, self.config.collision_threshold)
    }

    /// One prediction cycle, replacing the previous prediction.
    pub fn run_prediction(&mut self) -> Option<ConjunctionPrediction> {
        if self.torn_down {
            return self.prediction;
        }

        match self.config.prediction_mode {
            PredictionMode::Lookahead => {
                let scan = LookaheadScan {
                    propagator: self.propagator.as_ref(),
                    mapper: &self.mapper,
                    lookahead_minutes: self.config.prediction_lookahead_minutes,
                    threshold: self.config.prediction_threshold,
                };
                self.prediction = Some(scan.run(&self.objects, self.clock.current()));
            }
            PredictionMode::SpotCheck => {
                if let Some(prediction) =
                    spot_check(&self.objects, &mut self.rng, self.config.spot_check_threshold)
                {
                    self.prediction = Some(prediction);
                }
            }
        }
        self.prediction
    }

    /// Human-readable form of the last prediction.
    pub fn prediction_message(&self) -> String {
        match self.prediction {
            None => "Scanning orbits...".to_string(),
            Some(ConjunctionPrediction::NoDanger) => "No high-risk conjunction detected".to_string(),
            Some(ConjunctionPrediction::Danger { a, b, minutes }) => {
                let name = |id| self.object(id).map_or("?", |o| o.name.as_str());
                if minutes == 0 {
                    format!("Possible conjunction: {} ↔ {}", name(a), name(b))
                } else {
                    format!(
                        "Possible conjunction: {} ↔ {} in {} min",
                        name(a),
                        name(b),
                        minutes
                    )
                }
            }
        }
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<f64, EngineError> {
        Ok(self.clock.set_speed(speed)?)
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.clock.set_paused(paused);
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.clock.toggle_pause()
    }

    fn telemetry(&self, object: &TrackedObject) -> Telemetry {
        Telemetry {
            id: object.id,
            name: object.name.clone(),
            catalog_number: object.elements.catalog_number,
            latitude_deg: object.geodetic.map(|g| g.latitude_deg()),
            longitude_deg: object.geodetic.map(|g| g.longitude_deg()),
            altitude_km: object.geodetic.map(|g| g.altitude_km),
            scene: object.scene,
            fresh: object.fresh,
            at_risk: self.collision.is_at_risk(object.id),
        }
    }

    /// Resolve a pick to the object's telemetry and nearest neighbor.
    ///
    /// Returns `None` when the pick does not hit a tracked object.
    pub fn select(&self, pick: PickInput) -> Option<Selection> {
        let id = match pick {
            PickInput::Object(id) => id,
            PickInput::Ray { origin, direction } => {
                pick_by_ray(&self.objects, origin, direction, self.config.pick_radius)?
            }
        };
        let object = self.object(id)?;
        let nearest = nearest_neighbor(&self.objects, id);

        Some(Selection {
            telemetry: self.telemetry(object),
            nearest_name: nearest
                .nearest
                .and_then(|n| self.object(n))
                .map(|o| o.name.clone()),
            nearest,
        })
    }

    /// Toggle the future path of an object, computing it when turned on.
    ///
    /// Returns whether the path is now shown.
    pub fn toggle_path(&mut self, id: ObjectId) -> Result<bool, EngineError> {
        let now = self.clock.current();
        let step = self.config.path_step_minutes;
        let samples = (self.config.path_minutes / step).floor() as usize + 1;

        let object = self
            .objects
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(EngineError::UnknownObject(id))?;

        if object.path.take().is_some() {
            return Ok(false);
        }

        let points = (0..samples)
            .filter_map(|k| {
                let t = now + k as f64 * step * SECONDS_PER_MINUTE;
                locate(self.propagator.as_ref(), &self.mapper, &object.elements, t)
                    .ok()
                    .map(|(_, scene)| scene)
            })
            .collect();
        object.path = Some(points);
        Ok(true)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let now = self.clock.current();
        EngineSnapshot {
            sim_time: now,
            sim_time_label: unix_seconds_to_date_string(now),
            speed: self.clock.speed(),
            paused: self.clock.is_paused(),
            sidereal_angle: sidereal_angle(now),
            objects: self
                .objects
                .iter()
                .map(|o| ObjectSnapshot {
                    telemetry: self.telemetry(o),
                    path: o.path.clone(),
                })
                .collect(),
            collision: self.collision.clone(),
            prediction: self.prediction,
            prediction_message: self.prediction_message(),
            debris: self.debris.iter().map(DebrisObject::position).collect(),
        }
    }

    /// Stop the engine: drop all objects; further ticks and prediction
    /// cycles are no-ops.
    pub fn teardown(&mut self) {
        if !self.torn_down {
            info!("Simulation engine torn down ({} objects released)", self.objects.len());
        }
        self.torn_down = true;
        self.objects.clear();
        self.collision = CollisionStatus::default();
        self.prediction = None;
    }
}

/// Repeating real-time timer for the conjunction predictor.
#[derive(Resource)]
pub struct PredictionTimer(pub Timer);

impl PredictionTimer {
    /// Intervals shorter than [`MIN_PREDICTION_INTERVAL_SECONDS`] (or NaN)
    /// are raised to it so the timer never degenerates to firing every frame.
    pub fn new(interval_seconds: f64) -> Self {
        let interval = interval_seconds.max(MIN_PREDICTION_INTERVAL_SECONDS);
        Self(Timer::from_seconds(interval as f32, TimerMode::Repeating))
    }
}

/// Plugin driving a [`SimulationEngine`] resource.
///
/// Insert the engine before adding the plugin so the predictor timer picks
/// up its configured interval.
pub struct EnginePlugin;

impl Plugin for EnginePlugin {
    fn build(&self, app: &mut App) {
        let interval = app
            .world()
            .get_resource::<SimulationEngine>()
            .map_or(EngineConfig::default().prediction_interval_seconds, |engine| {
                engine.config().prediction_interval_seconds
            });

        app.insert_resource(PredictionTimer::new(interval)).add_systems(
            Update,
            (tick_engine, scan_conjunctions)
                .chain()
                .run_if(engine_running),
        );
    }
}

/// Run condition: an engine exists and has not been torn down.
pub fn engine_running(engine: Option<Res<SimulationEngine>>) -> bool {
    engine.is_some_and(|engine| engine.is_running())
}

/// Per-frame tick, fed by real (wall-clock) time.
fn tick_engine(mut engine: ResMut<SimulationEngine>, time: Res<Time<Real>>) {
    engine.tick(time.elapsed_secs_f64());
}

/// Conjunction scan on its own timer, independent of frame rate.
fn scan_conjunctions(
    mut engine: ResMut<SimulationEngine>,
    mut timer: ResMut<PredictionTimer>,
    time: Res<Time<Real>>,
) {
    timer.0.tick(time.delta());
    if timer.0.just_finished() {
        engine.run_prediction();
    }
}
