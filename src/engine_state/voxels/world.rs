//! # World Module
//!
//! The chunk store: the single owner of every loaded chunk, keyed by chunk
//! coordinate. Schedulers and the mesher only ever hold coordinates or shared
//! read-only buffers; the chunk itself lives here until it is removed.
//!
//! ## Architecture
//!
//! The world is sparse. Only chunks inside the load region are kept, and
//! coordinates that are queued for generation but have no data yet are tracked
//! separately so [`World::state_of`] can report the full lifecycle.
//!
//! ## Performance Considerations
//!
//! - Chunk lookup is O(1) using a hash map
//! - Neighbor lookup is six hash lookups, no scanning

use std::collections::HashMap;

use super::block::block_side::BlockSide;
use super::chunk::{Chunk, ChunkExtent, ChunkState};
use super::coord::ChunkCoordinate;

/// Represents the loaded part of the voxel world.
///
/// # Examples
///
/// ```ignore
/// let mut world = World::new(ChunkExtent::new(16, 16, 16));
/// world.insert(Chunk::solid(ChunkCoordinate::ORIGIN, world.extent()));
/// assert!(world.contains(ChunkCoordinate::ORIGIN));
/// ```
pub struct World {
    /// Size of every chunk in this world.
    extent: ChunkExtent,
    /// A mapping from chunk coordinates to chunk data.
    chunks: HashMap<ChunkCoordinate, Chunk>,
    /// Coordinates without data yet: `QueuedData`, or `QueuedUnload` when the
    /// coordinate left the view region while its generation was in flight.
    pending: HashMap<ChunkCoordinate, ChunkState>,
}

impl World {
    /// Creates a new, empty world.
    pub fn new(extent: ChunkExtent) -> Self {
        World {
            extent,
            chunks: HashMap::new(),
            pending: HashMap::new(),
        }
    }

    /// The extent shared by every chunk.
    pub fn extent(&self) -> ChunkExtent {
        self.extent
    }

    /// Retrieves the chunk at `position`, if loaded.
    pub fn get(&self, position: ChunkCoordinate) -> Option<&Chunk> {
        self.chunks.get(&position)
    }

    /// Inserts a chunk under its own coordinate, replacing any previous chunk.
    ///
    /// Clears any pending marker for the coordinate.
    pub fn insert(&mut self, chunk: Chunk) -> Option<Chunk> {
        self.pending.remove(&chunk.position);
        self.chunks.insert(chunk.position, chunk)
    }

    /// Removes and returns the chunk at `position`.
    pub fn remove(&mut self, position: ChunkCoordinate) -> Option<Chunk> {
        self.chunks.remove(&position)
    }

    /// Whether a chunk with block data is present at `position`.
    pub fn contains(&self, position: ChunkCoordinate) -> bool {
        self.chunks.contains_key(&position)
    }

    /// Borrows the six face-neighbors of `position`, indexed by `BlockSide as usize`.
    pub fn neighbors(&self, position: ChunkCoordinate) -> [Option<&Chunk>; 6] {
        let mut neighbors = [None; 6];
        for side in BlockSide::all() {
            neighbors[side as usize] = self.get(position.neighbor(side, self.extent));
        }
        neighbors
    }

    /// Whether the chunk and all six face-neighbors have block data.
    pub fn has_loaded_neighborhood(&self, position: ChunkCoordinate) -> bool {
        self.contains(position)
            && position
                .neighbors(self.extent)
                .iter()
                .all(|neighbor| self.state_of(*neighbor).has_block_data())
    }

    /// Number of chunks holding block data.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether no chunk is loaded.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Coordinates of every loaded chunk, in no particular order.
    pub fn coordinates(&self) -> impl Iterator<Item = ChunkCoordinate> + '_ {
        self.chunks.keys().copied()
    }

    /// Full lifecycle state of a coordinate.
    pub fn state_of(&self, position: ChunkCoordinate) -> ChunkState {
        if let Some(chunk) = self.chunks.get(&position) {
            return chunk.state;
        }
        self.pending
            .get(&position)
            .copied()
            .unwrap_or(ChunkState::Unloaded)
    }

    /// Number of tracked coordinates in a given state.
    pub fn count_in_state(&self, state: ChunkState) -> usize {
        let pending = self.pending.values().filter(|s| **s == state).count();
        let loaded = self.chunks.values().filter(|c| c.state == state).count();
        pending + loaded
    }

    /// Moves a loaded chunk to `state`. Returns `false` if no chunk is loaded there.
    pub(crate) fn set_state(&mut self, position: ChunkCoordinate, state: ChunkState) -> bool {
        match self.chunks.get_mut(&position) {
            Some(chunk) => {
                chunk.state = state;
                true
            }
            None => false,
        }
    }

    /// Records that a coordinate without data is waiting in (or running through)
    /// the data phase, or has been asked to unload before it finished.
    pub(crate) fn set_pending(&mut self, position: ChunkCoordinate, state: ChunkState) {
        debug_assert!(matches!(
            state,
            ChunkState::QueuedData | ChunkState::QueuedUnload
        ));
        self.pending.insert(position, state);
    }

    /// Forgets a pending coordinate, returning the marker it had.
    pub(crate) fn clear_pending(&mut self, position: ChunkCoordinate) -> Option<ChunkState> {
        self.pending.remove(&position)
    }
}
