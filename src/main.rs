//! Headless runner: ticks a scene at a fixed rate, driven by a recorded
//! landmark stream and/or scheduled manual toggles, and logs what happens.
//!
//! ```text
//! evergreen [--config scene.json] [--frames hands.jsonl] [--ticks 600]
//!           [--tick-ms 16] [--toggle-at 120]...
//! ```
//!
//! Set `RUST_LOG=evergreen=debug` to see every transition as it is published.

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::Parser;
use evergreen::prelude::*;
use evergreen::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "evergreen",
    about = "Headless gesture-driven particle tree runner",
    version
)]
struct Args {
    /// Scene configuration (JSON); defaults apply to missing fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Landmark stream, one JSON array of 21 `[x, y, z]` points or `null` per line.
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Milliseconds between ticks; also the replay interval of `--frames`.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    /// Tick at which to fire a manual toggle. Repeatable.
    #[arg(long)]
    toggle_at: Vec<u64>,
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    let mut scene = Scene::new(config)?;
    let tick = Duration::from_millis(args.tick_ms);

    let source = match &args.frames {
        Some(path) => {
            let script = ScriptedSource::from_path(path)?.with_interval(tick);
            info!(frames = script.len(), path = %path.display(), "replaying landmark stream");
            spawn_gesture_source(script, scene.feed(), scene.classifier().clone())
        }
        None => spawn_gesture_source(
            UnavailableSource::new("no landmark stream given"),
            scene.feed(),
            scene.classifier().clone(),
        ),
    };

    let mut rig = OrbitRig::new(scene.config().camera.clone())?;
    let mut transitions = 0usize;

    for n in 0..args.ticks {
        if args.toggle_at.contains(&n) {
            match scene.toggle() {
                Some(t) => {
                    transitions += 1;
                    info!(tick = n, from = %t.from, to = %t.to, "manual toggle");
                }
                None => info!(tick = n, "manual toggle debounced"),
            }
        }

        let report = scene.tick(&rig.viewpoint());
        if let Some(t) = report.transition {
            transitions += 1;
            info!(tick = n, from = %t.from, to = %t.to, focus = ?report.snapshot.focus, "gesture transition");
        }
        if let Some(delta) = report.camera {
            rig.apply(delta);
        }

        thread::sleep(tick);
    }

    if source.join().is_err() {
        error!("gesture source thread panicked");
    }

    let snapshot = scene.snapshot();
    info!(
        ticks = args.ticks,
        transitions,
        state = %snapshot.state,
        focus = ?snapshot.focus,
        manual_only = scene.is_manual_only(),
        tree_yaw = scene.tree_yaw(),
        fps = scene.frame_clock().fps(),
        "run finished"
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
