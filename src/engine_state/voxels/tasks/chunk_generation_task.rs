//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which generates the block data
//! for one chunk coordinate on a worker thread. The data scheduler publishes one
//! task per coordinate in a batch and merges the results into the chunk store
//! once the whole batch has finished.

use std::sync::Arc;

use crate::engine_state::{
    task_management::task::Task,
    voxels::{
        block::block_type::BlockType,
        chunk::{ChunkExtent, CompressedVoxelBuffer},
        coord::ChunkCoordinate,
        generation::{generate_chunk, TerrainGenerator, WorldTheme},
    },
};

/// A task that generates chunk data asynchronously.
///
/// The task shares the generator and theme with every other task of its batch;
/// both are read-only, so no locking is involved.
pub struct ChunkGenerationTask {
    /// The coordinate of the chunk to generate
    position: ChunkCoordinate,
    /// Chunk size
    extent: ChunkExtent,
    /// Height and density source
    generator: Arc<TerrainGenerator>,
    /// Block classifier for the world
    theme: Arc<dyn WorldTheme>,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinate to generate
    /// * `extent` - Chunk size
    /// * `generator` - Shared terrain generator
    /// * `theme` - Shared world theme
    ///
    /// # Returns
    /// A new `ChunkGenerationTask` instance
    pub fn new(
        position: ChunkCoordinate,
        extent: ChunkExtent,
        generator: Arc<TerrainGenerator>,
        theme: Arc<dyn WorldTheme>,
    ) -> Self {
        ChunkGenerationTask {
            position,
            extent,
            generator,
            theme,
        }
    }
}

/// The result of a chunk generation task.
pub struct ChunkGenerationTaskResult {
    /// The coordinate that was generated
    pub position: ChunkCoordinate,
    /// The generated block data
    pub blocks: CompressedVoxelBuffer<BlockType>,
}

impl Task for ChunkGenerationTask {
    type Output = ChunkGenerationTaskResult;

    fn process(self) -> ChunkGenerationTaskResult {
        let blocks = generate_chunk(
            self.position,
            self.extent,
            &self.generator,
            self.theme.as_ref(),
        );
        ChunkGenerationTaskResult {
            position: self.position,
            blocks,
        }
    }
}
