//! # Compressed Voxel Buffer
//!
//! Per-chunk block storage as a sequence of runs `(block, cumulative_count)`.
//!
//! ## Layout
//!
//! Runs are ordered by `cumulative_count`, which is strictly increasing; the last
//! run's cumulative count is the logical length of the buffer. The block at flat
//! index `i` belongs to the first run whose cumulative count is strictly greater
//! than `i`, found by binary search.
//!
//! For example `[(AIR, 3), (STONE, 5)]` decodes to `AIR AIR AIR STONE STONE`.
//!
//! ### Performance Characteristics
//! - **Append**: amortized O(1), coalesces with the previous run when equal
//! - **Point read**: O(log runs)
//! - **Sequential read**: O(cells) through [`CompressedVoxelBuffer::iter`]
//! - **Point write**: not supported; buffers are written once, at generation

use crate::engine_state::voxels::block::Block;
use crate::error::EngineError;

/// One run of identical blocks, closed at `cumulative_count`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoxelRun<B: Block> {
    /// The block repeated throughout this run.
    pub block: B,
    /// Total number of cells covered by this run and every run before it.
    pub cumulative_count: u32,
}

/// Run-length compressed block storage for one chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressedVoxelBuffer<B: Block> {
    runs: Vec<VoxelRun<B>>,
}

impl<B: Block> Default for CompressedVoxelBuffer<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Block> CompressedVoxelBuffer<B> {
    /// Creates an empty buffer of logical length zero.
    pub fn new() -> Self {
        Self { runs: Vec::new() }
    }

    /// Creates an empty buffer with room for `runs` runs.
    pub fn with_capacity(runs: usize) -> Self {
        Self {
            runs: Vec::with_capacity(runs),
        }
    }

    /// Compresses a flat block array, coalescing equal neighbors, so the
    /// resulting run count is the number of maximal same-value groups.
    pub fn from_blocks(blocks: &[B]) -> Self {
        let mut buffer = Self::new();
        for block in blocks {
            buffer.push(*block);
        }
        buffer
    }

    /// Appends `count` copies of `block`.
    ///
    /// Extends the last run instead of opening a new one when the block matches,
    /// which keeps the run sequence minimal. A zero count is a no-op.
    pub fn append_run(&mut self, block: B, count: u32) {
        if count == 0 {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.block == block => last.cumulative_count += count,
            _ => {
                let cumulative_count = self.len() as u32 + count;
                self.runs.push(VoxelRun {
                    block,
                    cumulative_count,
                });
            }
        }
    }

    /// Appends a single block.
    pub fn push(&mut self, block: B) {
        self.append_run(block, 1);
    }

    /// Logical length: the number of cells stored.
    pub fn len(&self) -> usize {
        self.runs
            .last()
            .map_or(0, |run| run.cumulative_count as usize)
    }

    /// Whether the buffer holds no cells.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Number of runs currently stored.
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// The raw run sequence.
    pub fn runs(&self) -> &[VoxelRun<B>] {
        &self.runs
    }

    /// Reads the block at flat index `index`.
    ///
    /// # Errors
    /// `OutOfRange` when `index >= len()`.
    pub fn get(&self, index: usize) -> Result<B, EngineError> {
        let len = self.len();
        if index >= len {
            return Err(EngineError::OutOfRange { index, len });
        }
        // First run whose cumulative count is strictly greater than `index`.
        let run = self
            .runs
            .partition_point(|run| (run.cumulative_count as usize) <= index);
        Ok(self.runs[run].block)
    }

    /// Reads a block whose index the caller has already bounds-checked.
    ///
    /// Debug builds still assert the bound.
    pub fn get_unchecked(&self, index: usize) -> B {
        debug_assert!(index < self.len(), "voxel index {index} out of range");
        let run = self
            .runs
            .partition_point(|run| (run.cumulative_count as usize) <= index);
        self.runs[run.min(self.runs.len().saturating_sub(1))].block
    }

    /// Iterates every cell in flatten order.
    pub fn iter(&self) -> impl Iterator<Item = B> + '_ {
        let mut start = 0u32;
        self.runs.iter().flat_map(move |run| {
            let count = run.cumulative_count - start;
            start = run.cumulative_count;
            std::iter::repeat(run.block).take(count as usize)
        })
    }

    /// Decompresses into a flat array.
    pub fn to_vec(&self) -> Vec<B> {
        let mut blocks = Vec::with_capacity(self.len());
        blocks.extend(self.iter());
        blocks
    }

    /// Approximate heap footprint of the run storage in bytes.
    pub fn memory_runs(&self) -> usize {
        self.runs.capacity() * std::mem::size_of::<VoxelRun<B>>()
    }

    /// Whether every cell is air.
    pub fn is_all_air(&self) -> bool {
        self.runs.iter().all(|run| run.block.is_air())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use crate::engine_state::voxels::block::BlockTypeSize;

    fn maximal_groups(blocks: &[BlockType]) -> usize {
        if blocks.is_empty() {
            return 0;
        }
        1 + blocks.windows(2).filter(|pair| pair[0] != pair[1]).count()
    }

    #[test]
    fn test_runs_decode_in_order() {
        let mut buffer = CompressedVoxelBuffer::new();
        buffer.append_run(BlockType::AIR, 3);
        buffer.append_run(BlockType::STONE, 2);

        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.run_count(), 2);
        assert_eq!(buffer.get(0), Ok(BlockType::AIR));
        assert_eq!(buffer.get(2), Ok(BlockType::AIR));
        assert_eq!(buffer.get(3), Ok(BlockType::STONE));
        assert_eq!(buffer.get(4), Ok(BlockType::STONE));
    }

    #[test]
    fn test_index_past_end_is_out_of_range() {
        let buffer = CompressedVoxelBuffer::from_blocks(&[BlockType::DIRT; 10]);
        for index in [10, 11, usize::MAX] {
            assert_eq!(
                buffer.get(index),
                Err(EngineError::OutOfRange { index, len: 10 })
            );
        }
        let empty: CompressedVoxelBuffer<BlockType> = CompressedVoxelBuffer::new();
        assert_eq!(
            empty.get(0),
            Err(EngineError::OutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn test_adjacent_equal_appends_coalesce() {
        let mut buffer = CompressedVoxelBuffer::new();
        buffer.append_run(BlockType::STONE, 4);
        buffer.append_run(BlockType::STONE, 4);
        buffer.append_run(BlockType::AIR, 0);
        buffer.push(BlockType::STONE);

        assert_eq!(buffer.run_count(), 1);
        assert_eq!(buffer.runs()[0].cumulative_count, 9);
    }

    #[test]
    fn test_random_sequences_roundtrip_minimally() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        for _ in 0..200 {
            let len = rng.usize(0..300);
            // Low cardinality so that runs actually form.
            let blocks: Vec<BlockType> = (0..len)
                .map(|_| {
                    let id = rng.u8(0..3) as BlockTypeSize;
                    BlockType::get_block_type_from_int(id).unwrap()
                })
                .collect();

            let buffer = CompressedVoxelBuffer::from_blocks(&blocks);
            assert_eq!(buffer.len(), blocks.len());
            assert_eq!(buffer.run_count(), maximal_groups(&blocks));
            for (index, block) in blocks.iter().enumerate() {
                assert_eq!(buffer.get(index), Ok(*block));
            }
            assert_eq!(buffer.to_vec(), blocks);
        }
    }

    #[test]
    fn test_cumulative_counts_strictly_increase() {
        let blocks = [
            BlockType::AIR,
            BlockType::GRASS,
            BlockType::GRASS,
            BlockType::DIRT,
            BlockType::AIR,
        ];
        let buffer = CompressedVoxelBuffer::from_blocks(&blocks);
        assert!(buffer
            .runs()
            .windows(2)
            .all(|pair| pair[0].cumulative_count < pair[1].cumulative_count));
        assert_eq!(buffer.runs().last().unwrap().cumulative_count, 5);
    }

    #[test]
    fn test_all_air_detection() {
        assert!(CompressedVoxelBuffer::from_blocks(&[BlockType::AIR; 8]).is_all_air());
        assert!(!CompressedVoxelBuffer::from_blocks(&[BlockType::AIR, BlockType::WOOD]).is_all_air());
    }

    #[test]
    fn test_run_memory_tracks_run_storage() {
        let uniform = CompressedVoxelBuffer::from_blocks(&[BlockType::STONE; 64]);
        let striped: Vec<_> = (0..64)
            .map(|i| if i % 2 == 0 { BlockType::STONE } else { BlockType::AIR })
            .collect();
        let striped = CompressedVoxelBuffer::from_blocks(&striped);
        assert!(uniform.memory_runs() >= std::mem::size_of::<VoxelRun<BlockType>>());
        assert!(striped.memory_runs() >= 64 * std::mem::size_of::<VoxelRun<BlockType>>());
        assert!(striped.memory_runs() > uniform.memory_runs());
    }
}
