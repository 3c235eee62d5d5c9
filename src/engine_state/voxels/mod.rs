//! # Voxel Engine Core
//!
//! This module contains the voxel storage and generation side of the pipeline.
//!
//! ## Architecture
//!
//! The voxel system is organized into several key components:
//!
//! * **Block**: Defines individual voxel types and their optical properties
//! * **Chunk**: Fixed-size regions stored as run-length compressed buffers
//! * **Coord**: Chunk coordinates and neighbor arithmetic
//! * **Generation**: Layered-noise terrain and pluggable world themes
//! * **World**: The chunk store, sole owner of every loaded chunk
//! * **View Region**: Cubes of chunk coordinates and their enter/exit diffs
//! * **Tasks**: Chunk generation work items run on worker threads
//!
//! ## Thread Safety
//!
//! * Block buffers are immutable once generated and shared behind `Arc`
//! * The store is only mutated on the tick thread, between batches
//! * Worker tasks own everything they read

pub mod block;
pub mod chunk;
pub mod coord;
pub mod generation;
pub mod tasks;
pub mod view_region;
pub mod world;
