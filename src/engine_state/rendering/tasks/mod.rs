//! # Rendering Task System
//!
//! Tasks related to mesh generation. These run on the mesh scheduler's workers
//! so that meshing never blocks the tick thread.

pub mod chunk_mesh_generation_task;
