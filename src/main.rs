//! Orbital Sentinel - headless simulation runner
//!
//! Loads a catalog from a file (or a URL when built with the `fetch`
//! feature) and runs the engine at roughly 60 frames per second, logging a
//! status line every second.
//!
//! Usage: `orbital-sentinel <catalog-file-or-url> [frames]`

use std::process::ExitCode;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use orbital_sentinel::catalog::CatalogError;
use orbital_sentinel::engine::engine_running;
use orbital_sentinel::types::current_unix_seconds;
use orbital_sentinel::{EngineConfig, EnginePlugin, SimulationEngine};

const FRAME: Duration = Duration::from_nanos(16_666_667);

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(source) = args.next() else {
        eprintln!("usage: orbital-sentinel <catalog-file-or-url> [frames]");
        return ExitCode::FAILURE;
    };
    let frames = match args.next().map(|s| s.parse::<u64>()) {
        None => None,
        Some(Ok(n)) => Some(n),
        Some(Err(err)) => {
            eprintln!("invalid frame count: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(FRAME)),
        LogPlugin::default(),
    ));

    let text = match read_catalog(&source) {
        Ok(text) => text,
        Err(err) => {
            error!("Failed to load catalog from {}: {}", source, err);
            return ExitCode::FAILURE;
        }
    };

    let mut engine = match SimulationEngine::new(EngineConfig::default(), current_unix_seconds()) {
        Ok(engine) => engine,
        Err(err) => {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = engine.load_catalog(&text) {
        error!("{}", err);
        return ExitCode::FAILURE;
    }

    // Insert the engine before the plugin that drives it
    app.insert_resource(engine)
        .add_plugins(EnginePlugin)
        .add_systems(Update, report_status.run_if(engine_running));

    match frames {
        None => {
            app.run();
        }
        Some(frames) => {
            app.finish();
            app.cleanup();
            for _ in 0..frames {
                app.update();
                std::thread::sleep(FRAME);
            }
            let snapshot = app.world().resource::<SimulationEngine>().snapshot();
            info!(
                "Stopped at {} after {} frames: {}",
                snapshot.sim_time_label, frames, snapshot.prediction_message
            );
            app.world_mut().resource_mut::<SimulationEngine>().teardown();
        }
    }

    ExitCode::SUCCESS
}

fn read_catalog(source: &str) -> Result<String, CatalogError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        fetch(source)
    } else {
        std::fs::read_to_string(source).map_err(|e| CatalogError::Read(e.to_string()))
    }
}

#[cfg(feature = "fetch")]
fn fetch(url: &str) -> Result<String, CatalogError> {
    orbital_sentinel::catalog::fetch_catalog_text(url)
}

#[cfg(not(feature = "fetch"))]
fn fetch(_url: &str) -> Result<String, CatalogError> {
    Err(CatalogError::Fetch(
        "built without the `fetch` feature".to_string(),
    ))
}

/// Log one status line per real second.
fn report_status(engine: Res<SimulationEngine>, time: Res<Time<Real>>, mut last: Local<f64>) {
    let now = time.elapsed_secs_f64();
    if now - *last < 1.0 {
        return;
    }
    *last = now;

    let snapshot = engine.snapshot();
    let at_risk = snapshot.collision.at_risk.len();
    info!(
        "{} | {}x{} | {} objects | {} | {}",
        snapshot.sim_time_label,
        snapshot.speed,
        if snapshot.paused { " (paused)" } else { "" },
        snapshot.objects.len(),
        if snapshot.collision.risk {
            format!("COLLISION RISK ({at_risk} objects)")
        } else {
            "no collision risk".to_string()
        },
        snapshot.prediction_message
    );
}
