//! # Chunk Iteration Module
//!
//! An iterator over every cell of a chunk with its local position, walking the
//! compressed runs directly instead of binary-searching each cell.

use cgmath::Point3;

use crate::engine_state::voxels::block::block_type::BlockType;

use super::{ChunkExtent, CompressedVoxelBuffer};

/// Iterates `(local position, block)` pairs in flatten order.
///
/// The iterator keeps a cursor into the run list and a running local position,
/// so a full pass costs O(cells) regardless of how fragmented the runs are.
pub struct ChunkBlockIterator<'a> {
    /// Buffer being iterated
    buffer: &'a CompressedVoxelBuffer<BlockType>,
    /// Chunk dimensions
    extent: ChunkExtent,
    /// Index of the run containing `index`
    run_index: usize,
    /// Flat index of the next cell
    index: usize,
    /// Current X position within the chunk
    local_x: usize,
    /// Current Y position within the chunk
    local_y: usize,
    /// Current Z position within the chunk
    local_z: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates an iterator positioned at the first cell.
    pub fn new(buffer: &'a CompressedVoxelBuffer<BlockType>, extent: ChunkExtent) -> Self {
        ChunkBlockIterator {
            buffer,
            extent,
            run_index: 0,
            index: 0,
            local_x: 0,
            local_y: 0,
            local_z: 0,
        }
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<usize>, BlockType);

    fn next(&mut self) -> Option<Self::Item> {
        let runs = self.buffer.runs();
        let run = runs.get(self.run_index)?;
        let item = (
            Point3::new(self.local_x, self.local_y, self.local_z),
            run.block,
        );

        self.index += 1;
        if self.index >= run.cumulative_count as usize {
            self.run_index += 1;
        }

        // Advance the local position: x fastest, then z, then y.
        self.local_x += 1;
        if self.local_x == self.extent.x as usize {
            self.local_x = 0;
            self.local_z += 1;
            if self.local_z == self.extent.z as usize {
                self.local_z = 0;
                self.local_y += 1;
            }
        }

        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}
