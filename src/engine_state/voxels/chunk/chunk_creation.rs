//! # Chunk Creation Module
//!
//! A builder that fills a chunk's compressed buffer in flatten order while
//! tracking which local cell comes next.
//!
//! Producers ask [`ChunkCreationIterator::cursor`] for the next local position,
//! compute the block there, and push it. Pushing coalesces with the previous
//! run, so a producer that follows the cursor always yields the minimal run
//! sequence.

use cgmath::Point3;

use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::coord::ChunkCoordinate;

use super::{Chunk, ChunkExtent, CompressedVoxelBuffer};

/// A builder for populating a chunk cell by cell in flatten order.
pub struct ChunkCreationIterator {
    /// The coordinate of the chunk being created
    position: ChunkCoordinate,
    /// Chunk dimensions
    extent: ChunkExtent,
    /// Runs pushed so far
    blocks: CompressedVoxelBuffer<BlockType>,
    /// Current X position within the chunk
    local_x: usize,
    /// Current Y position within the chunk
    local_y: usize,
    /// Current Z position within the chunk
    local_z: usize,
}

impl ChunkCreationIterator {
    /// Creates a builder positioned at local `(0, 0, 0)`.
    pub fn new(position: ChunkCoordinate, extent: ChunkExtent) -> Self {
        ChunkCreationIterator {
            position,
            extent,
            blocks: CompressedVoxelBuffer::new(),
            local_x: 0,
            local_y: 0,
            local_z: 0,
        }
    }

    /// The local position the next pushed block will occupy, or `None` once the
    /// chunk is full.
    pub fn cursor(&self) -> Option<Point3<usize>> {
        if self.local_y >= self.extent.y as usize {
            return None;
        }
        Some(Point3::new(self.local_x, self.local_y, self.local_z))
    }

    /// Adds a block at the cursor and advances it.
    pub fn push_block_type(&mut self, block_type: BlockType) {
        self.push_run(block_type, 1);
    }

    /// Adds `count` copies of a block, advancing the cursor past all of them.
    /// Counts past the end of the chunk are truncated.
    pub fn push_run(&mut self, block_type: BlockType, count: u32) {
        let remaining = (self.extent.cell_count() - self.blocks.len()) as u32;
        let count = count.min(remaining);
        self.blocks.append_run(block_type, count);
        self.advance(count as usize);
    }

    fn advance(&mut self, cells: usize) {
        let index = self.blocks.len();
        debug_assert_eq!(
            index,
            self.extent.flatten(self.local_x, self.local_y, self.local_z) + cells
        );
        if index >= self.extent.cell_count() {
            self.local_x = 0;
            self.local_z = 0;
            self.local_y = self.extent.y as usize;
            return;
        }
        let next = self.extent.unflatten(index);
        self.local_x = next.x;
        self.local_y = next.y;
        self.local_z = next.z;
    }

    /// Consumes the builder and returns the compressed buffer.
    ///
    /// Any cells not pushed yet are filled with air.
    pub fn finish(mut self) -> CompressedVoxelBuffer<BlockType> {
        let remaining = (self.extent.cell_count() - self.blocks.len()) as u32;
        self.blocks.append_run(BlockType::AIR, remaining);
        self.blocks
    }

    /// Finalizes the chunk creation and returns the constructed `Chunk`.
    pub fn return_chunk(self) -> Chunk {
        let position = self.position;
        Chunk::new(position, self.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_walks_flatten_order() {
        let extent = ChunkExtent::new(2, 2, 2);
        let mut cci = ChunkCreationIterator::new(ChunkCoordinate::ORIGIN, extent);
        let mut visited = Vec::new();
        while let Some(p) = cci.cursor() {
            visited.push(extent.flatten(p.x, p.y, p.z));
            cci.push_block_type(BlockType::STONE);
        }
        assert_eq!(visited, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_unfinished_chunk_is_padded_with_air() {
        let extent = ChunkExtent::new(2, 2, 2);
        let mut cci = ChunkCreationIterator::new(ChunkCoordinate::ORIGIN, extent);
        cci.push_run(BlockType::STONE, 3);
        assert_eq!(cci.cursor(), Some(Point3::new(1, 0, 1)));
        let blocks = cci.finish();
        assert_eq!(blocks.len(), 8);
        assert_eq!(blocks.get(3), Ok(BlockType::AIR));
    }

    #[test]
    fn test_overlong_run_is_truncated() {
        let extent = ChunkExtent::new(2, 1, 1);
        let mut cci = ChunkCreationIterator::new(ChunkCoordinate::ORIGIN, extent);
        cci.push_run(BlockType::DIRT, 10);
        assert_eq!(cci.cursor(), None);
        assert_eq!(cci.finish().len(), 2);
    }
}
