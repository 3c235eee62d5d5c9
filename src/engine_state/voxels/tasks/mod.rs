//! # Voxel Tasks
//!
//! Work items the data scheduler runs on its worker pool. Each task owns every
//! input it reads, so batches never touch the chunk store while in flight.

pub mod chunk_generation_task;
