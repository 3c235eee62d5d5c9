//! Task for generating mesh data for chunks in a background thread.
//!
//! This module contains the `ChunkMeshGenerationTask` which meshes one chunk on a
//! worker. The task owns a [`ChunkNeighborhood`] snapshot, so it never reads the
//! chunk store while the tick thread may be changing it.

use std::sync::Arc;

use crate::engine_state::{
    rendering::meshing::{mesh_chunk, ChunkNeighborhood, MeshBuffer},
    task_management::task::Task,
    voxels::{block::block_type::BlockType, coord::ChunkCoordinate, generation::WorldTheme},
};

/// A task that generates mesh data for a chunk in a background thread.
pub struct ChunkMeshGenerationTask {
    /// The chunk being meshed
    position: ChunkCoordinate,
    /// The chunk and its loaded face-neighbors
    neighborhood: ChunkNeighborhood<BlockType>,
    /// Supplies vertex colors
    theme: Arc<dyn WorldTheme>,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `position` - The chunk being meshed
    /// * `neighborhood` - Snapshot of the chunk and its neighbors
    /// * `theme` - Shared world theme
    ///
    /// # Returns
    /// A new `ChunkMeshGenerationTask` instance
    pub fn new(
        position: ChunkCoordinate,
        neighborhood: ChunkNeighborhood<BlockType>,
        theme: Arc<dyn WorldTheme>,
    ) -> Self {
        ChunkMeshGenerationTask {
            position,
            neighborhood,
            theme,
        }
    }
}

/// The result of a chunk mesh generation task.
pub struct ChunkMeshGenerationTaskResult {
    /// The chunk that was meshed
    pub position: ChunkCoordinate,
    /// Its geometry, handed to the presentation layer on merge
    pub mesh: MeshBuffer,
}

impl Task for ChunkMeshGenerationTask {
    type Output = ChunkMeshGenerationTaskResult;

    fn process(self) -> ChunkMeshGenerationTaskResult {
        let mesh = mesh_chunk(self.position, &self.neighborhood, self.theme.as_ref());
        ChunkMeshGenerationTaskResult {
            position: self.position,
            mesh,
        }
    }
}
