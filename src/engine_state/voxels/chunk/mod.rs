//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a chunk coordinate, its compressed
//! block storage, and its lifecycle state.
//!
//! ## Flatten Order
//!
//! Cells are flattened `y`-major, then `z`, then `x`:
//!
//! ```text
//! index = y * (extent.z * extent.x) + z * extent.x + x
//! ```
//!
//! Every producer (the generator, [`ChunkCreationIterator`]) and every consumer
//! ([`ChunkBlockIterator`], the mesher) walks cells in this order. A producer that
//! walks in any other order still yields a buffer of the right length, but with
//! the wrong blocks in the wrong places and far more runs than necessary.

use std::sync::Arc;

use cgmath::Point3;

use super::block::block_type::BlockType;
use super::coord::ChunkCoordinate;

pub use chunk_creation::ChunkCreationIterator;
pub use chunk_iteration::ChunkBlockIterator;
pub use voxel_buffer::{CompressedVoxelBuffer, VoxelRun};

mod chunk_creation;
pub mod chunk_iteration;
pub mod voxel_buffer;

/// Chunk size in blocks along each axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChunkExtent {
    /// Width along x.
    pub x: i32,
    /// Height along y.
    pub y: i32,
    /// Depth along z.
    pub z: i32,
}

impl ChunkExtent {
    /// Creates an extent; every component must be positive.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        ChunkExtent { x, y, z }
    }

    /// Builds an extent from the configuration's `[x, y, z]` triple.
    pub fn from_array(extent: [i32; 3]) -> Self {
        ChunkExtent::new(extent[0], extent[1], extent[2])
    }

    /// Extent along axis 0 = X, 1 = Y, 2 = Z.
    pub fn axis(&self, axis: usize) -> i32 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Number of cells in one chunk.
    pub fn cell_count(&self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }

    /// Flat index of a local position.
    pub fn flatten(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.z as usize + z) * self.x as usize + x
    }

    /// Local position of a flat index.
    pub fn unflatten(&self, index: usize) -> Point3<usize> {
        let sx = self.x as usize;
        let sz = self.z as usize;
        Point3::new(index % sx, index / (sx * sz), (index / sx) % sz)
    }

    /// Whether a signed local position lies inside the chunk.
    pub fn contains(&self, position: Point3<i32>) -> bool {
        (0..self.x).contains(&position.x)
            && (0..self.y).contains(&position.y)
            && (0..self.z).contains(&position.z)
    }
}

/// Lifecycle state of a chunk held in the store.
///
/// Only the schedulers move a chunk between states. `QueuedData` is tracked by the
/// store for coordinates that do not have a chunk yet; everything else lives on
/// the chunk itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// Not present anywhere in the pipeline.
    Unloaded,
    /// Waiting for, or undergoing, generation.
    QueuedData,
    /// Block data present, no mesh requested.
    Loaded,
    /// Waiting for, or undergoing, meshing.
    QueuedMesh,
    /// A mesh has been handed to the presentation layer.
    Meshed,
    /// Left the view region while its batch was in flight; dropped at merge.
    QueuedUnload,
}

impl ChunkState {
    /// Whether block data is available in this state.
    pub fn has_block_data(self) -> bool {
        matches!(
            self,
            ChunkState::Loaded | ChunkState::QueuedMesh | ChunkState::Meshed
        )
    }
}

/// A fixed-size region of the voxel grid.
///
/// The block buffer is shared behind an `Arc` so that mesh tasks can read a
/// chunk and its neighbors on worker threads while the store keeps ownership of
/// the chunk. The buffer is never mutated after generation.
#[derive(Clone, Debug)]
pub struct Chunk {
    /// The coordinate of this chunk's minimum corner.
    pub position: ChunkCoordinate,
    /// Compressed block storage in flatten order.
    pub blocks: Arc<CompressedVoxelBuffer<BlockType>>,
    /// Lifecycle state, driven by the schedulers.
    pub state: ChunkState,
}

impl Chunk {
    /// Wraps freshly generated blocks in a `Loaded` chunk.
    pub fn new(position: ChunkCoordinate, blocks: CompressedVoxelBuffer<BlockType>) -> Self {
        Chunk {
            position,
            blocks: Arc::new(blocks),
            state: ChunkState::Loaded,
        }
    }

    /// Creates a chunk filled with air.
    pub fn empty(position: ChunkCoordinate, extent: ChunkExtent) -> Self {
        Self::filled(position, extent, BlockType::AIR)
    }

    /// Creates a chunk filled with a single opaque block.
    pub fn solid(position: ChunkCoordinate, extent: ChunkExtent) -> Self {
        Self::filled(position, extent, BlockType::STONE)
    }

    /// Creates a chunk filled with `block`.
    pub fn filled(position: ChunkCoordinate, extent: ChunkExtent, block: BlockType) -> Self {
        let mut cci = ChunkCreationIterator::new(position, extent);
        cci.push_run(block, extent.cell_count() as u32);
        cci.return_chunk()
    }

    /// Creates a chunk with a 3D checkerboard of dirt and air.
    pub fn checkerboard(position: ChunkCoordinate, extent: ChunkExtent) -> Self {
        let mut cci = ChunkCreationIterator::new(position, extent);
        while let Some(local) = cci.cursor() {
            if (local.x + local.y + local.z) % 2 == 0 {
                cci.push_block_type(BlockType::DIRT);
            } else {
                cci.push_block_type(BlockType::AIR);
            }
        }
        cci.return_chunk()
    }

    /// Creates a chunk from a closure over local positions, walking flatten order.
    pub fn from_fn(
        position: ChunkCoordinate,
        extent: ChunkExtent,
        mut block_at: impl FnMut(Point3<usize>) -> BlockType,
    ) -> Self {
        let mut cci = ChunkCreationIterator::new(position, extent);
        while let Some(local) = cci.cursor() {
            cci.push_block_type(block_at(local));
        }
        cci.return_chunk()
    }

    /// Gets the block at the specified chunk-relative coordinates.
    ///
    /// # Panics
    /// Debug builds assert the coordinates are inside `extent`.
    pub fn get_block_at(&self, extent: ChunkExtent, x: usize, y: usize, z: usize) -> BlockType {
        self.blocks.get_unchecked(extent.flatten(x, y, z))
    }

    /// Iterates every block with its local position.
    pub fn iter_blocks(&self, extent: ChunkExtent) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(&self.blocks, extent)
    }
}
