//! # Voxel Streaming Headless Driver
//!
//! Builds the pipeline from an optional JSON configuration, fills the world
//! around the origin, then walks the focus along +X and logs pipeline stats.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json]
//! ```

use cgmath::Point3;
use log::{error, info};
use voxel_streaming::{EngineConfig, EngineState, RenderObjectPool};
use web_time::Instant;

/// Frames simulated after the initial fill.
const FRAMES: i32 = 600;

/// Blocks the focus advances per frame.
const FOCUS_SPEED: i32 = 1;

/// Frames between stats lines.
const STATS_INTERVAL: i32 = 60;

fn main() {
    voxel_streaming::init_logger();

    if let Err(err) = run() {
        error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };

    let pool = RenderObjectPool::new(config.max_presented_meshes);
    let mut engine = EngineState::new(config, pool)?;

    engine.initial_fill(Point3::new(0, 0, 0))?;

    let started = Instant::now();
    let mut presented = 0;
    for frame in 0..FRAMES {
        let focus = Point3::new(frame * FOCUS_SPEED, 0, 0);
        let report = engine.tick(focus)?;
        presented += report.presented;

        if frame % STATS_INTERVAL == 0 {
            let stats = engine.stats();
            info!(
                "frame {frame}: focus {:?}, loaded {}, meshed {}, queued data {}, queued mesh {}, phase {:?}",
                engine.focus(),
                stats.chunks_loaded,
                stats.chunks_meshed,
                stats.queued_data,
                stats.queued_mesh,
                stats.phase
            );
        }
    }

    info!(
        "{} frames in {:?}: {} meshes presented, {} live, {} quads, {} evictions",
        FRAMES,
        started.elapsed(),
        presented,
        engine.sink().len(),
        engine.sink().total_quads(),
        engine.sink().evictions()
    );
    Ok(())
}
