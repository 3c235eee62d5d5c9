#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Streaming
//!
//! A procedural voxel world that streams and meshes chunks around a moving focus.
//!
//! The crate generates chunk data from layered noise, stores it run-length
//! compressed, meshes the visible surface with a greedy mesher, and hands the
//! finished meshes to a host-supplied presentation layer. Work runs in batches on
//! worker threads and is driven cooperatively by one `tick` per frame.
//!
//! ## Key Modules
//!
//! * `config` - The JSON configuration surface
//! * `error` - Error types shared by every module
//! * `engine_state` - The pipeline: voxels, meshing, scheduling and task management
//!
//! ## Architecture
//!
//! ```text
//!   tick(focus) ─► view region diff ─► data scheduler ─► chunk store
//!                                                          │
//!                  presentation sink ◄─ mesh scheduler ◄───┘
//! ```
//!
//! A top-level state machine drives at most one of the two schedulers per tick.
//! The chunk store is only written on the tick thread, after a whole batch has
//! finished.
//!
//! ## Usage
//!
//! ```ignore
//! use voxel_streaming::{EngineConfig, EngineState, RenderObjectPool};
//!
//! voxel_streaming::init_logger();
//! let config = EngineConfig::default();
//! let mut engine = EngineState::new(config.clone(), RenderObjectPool::new(config.max_presented_meshes))?;
//! engine.initial_fill(cgmath::Point3::new(0, 0, 0))?;
//! loop {
//!     engine.tick(player_position)?;
//! }
//! ```

use log::info;

pub mod config;
pub mod engine_state;
pub mod error;

pub use config::{EngineConfig, NoiseConfig};
pub use engine_state::{
    rendering::{MeshBuffer, PresentationSink, RenderObjectPool, Vertex},
    scheduling::{PipelinePhase, TickReport},
    voxels::{
        block::{block_side::BlockSide, block_type::BlockType, Block},
        chunk::{Chunk, ChunkExtent, ChunkState, CompressedVoxelBuffer},
        coord::ChunkCoordinate,
        generation::WorldTheme,
    },
    EngineState, EngineStats,
};
pub use error::{ConfigError, EngineError};

/// Initializes `env_logger` on stdout, filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logger() {
    let mut log_builder = env_logger::Builder::new();
    let initialized = log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init()
        .is_ok();

    if initialized {
        info!("Logger initialized");
    }
}
