//! Mesh generation and hand-off to the presentation layer.
//!
//! # Architecture
//! - `mesh/`: the greedy mesher and mesh buffers
//! - [`PresentationSink`]: where finished meshes go and where releases are sent
//! - [`RenderObjectPool`]: an in-memory sink that keeps the most recently
//!   presented meshes, evicting the least recently presented one when full
//!
//! # Performance Considerations
//! - Greedy meshing minimizes vertex count
//! - Neighborhood snapshots share block buffers instead of copying them
//! - Meshes move into the sink; nothing is cloned on presentation

use std::num::NonZeroUsize;

use log::{debug, trace};
use lru::LruCache;

use crate::engine_state::voxels::{block::block_type::BlockType, coord::ChunkCoordinate, generation::WorldTheme};

mod mesh;

pub use mesh::*;

/// Meshes a chunk neighborhood.
///
/// # Arguments
/// * `position` - Coordinate of the center chunk
/// * `neighborhood` - The center chunk and whichever neighbors are loaded
/// * `theme` - Decides which faces merge and supplies vertex colors
pub fn mesh_chunk(
    position: ChunkCoordinate,
    neighborhood: &ChunkNeighborhood<BlockType>,
    theme: &dyn WorldTheme,
) -> MeshBuffer {
    let faces = greedy_mesh_with(neighborhood, |a, b| theme.same_block(a, b));
    MeshBuffer::from_faces(position, &faces, theme)
}

/// The external layer that turns meshes into render objects.
///
/// Ownership of a presented mesh moves to the sink. `release` is sent when a
/// chunk leaves the draw region; the sink may free its resources.
pub trait PresentationSink {
    /// Receives the finished mesh for a chunk, replacing any previous one.
    fn present(&mut self, position: ChunkCoordinate, mesh: MeshBuffer);

    /// Signals that a chunk's render resources may be freed.
    fn release(&mut self, position: ChunkCoordinate);

    /// Drains the chunks whose meshes the sink dropped on its own since the
    /// last call. Those chunks are no longer drawn and count as unmeshed.
    fn take_evicted(&mut self) -> Vec<ChunkCoordinate> {
        Vec::new()
    }
}

/// A bounded pool of render objects keyed by chunk coordinate.
///
/// When more than `capacity` meshes are live the least recently presented one
/// is evicted, so a runaway draw radius cannot grow memory without limit.
pub struct RenderObjectPool {
    /// Live meshes, most recently presented first
    meshes: LruCache<ChunkCoordinate, MeshBuffer>,
    /// Meshes dropped because the pool was full
    evictions: usize,
    /// Evicted coordinates not yet drained by `take_evicted`
    evicted: Vec<ChunkCoordinate>,
}

impl RenderObjectPool {
    /// Creates a pool holding at most `capacity` meshes (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        RenderObjectPool {
            meshes: LruCache::new(capacity),
            evictions: 0,
            evicted: Vec::new(),
        }
    }

    /// The mesh presented for `position`, if still live.
    pub fn get(&self, position: ChunkCoordinate) -> Option<&MeshBuffer> {
        self.meshes.peek(&position)
    }

    /// Whether a mesh is live for `position`.
    pub fn contains(&self, position: ChunkCoordinate) -> bool {
        self.meshes.contains(&position)
    }

    /// Number of live meshes.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Whether no mesh is live.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Number of meshes dropped because the pool was full.
    pub fn evictions(&self) -> usize {
        self.evictions
    }

    /// Coordinates of every live mesh, most recently presented first.
    pub fn positions(&self) -> impl Iterator<Item = ChunkCoordinate> + '_ {
        self.meshes.iter().map(|(position, _)| *position)
    }

    /// Total quads across every live mesh.
    pub fn total_quads(&self) -> usize {
        self.meshes.iter().map(|(_, mesh)| mesh.quad_count()).sum()
    }
}

impl PresentationSink for RenderObjectPool {
    fn present(&mut self, position: ChunkCoordinate, mesh: MeshBuffer) {
        trace!("Presenting {} quads for chunk {:?}", mesh.quad_count(), position);
        self.evicted.retain(|p| *p != position);
        if let Some((evicted, _)) = self.meshes.push(position, mesh) {
            if evicted != position {
                self.evictions += 1;
                self.evicted.push(evicted);
                debug!("Render object pool full, evicted chunk {:?}", evicted);
            }
        }
    }

    fn release(&mut self, position: ChunkCoordinate) {
        if self.meshes.pop(&position).is_some() {
            trace!("Released render object for chunk {:?}", position);
        }
    }

    fn take_evicted(&mut self) -> Vec<ChunkCoordinate> {
        std::mem::take(&mut self.evicted)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine_state::voxels::{
        block::block_side::BlockSide,
        chunk::{Chunk, ChunkExtent},
        generation::{generate_chunk, CheckerboardTheme, StoneTheme, TerrainGenerator},
    };

    const EXTENT: ChunkExtent = ChunkExtent::new(4, 4, 4);

    fn coord(i: i32) -> ChunkCoordinate {
        ChunkCoordinate::from_grid(i, 0, 0, EXTENT)
    }

    #[test]
    fn test_pool_evicts_least_recently_presented() {
        let mut pool = RenderObjectPool::new(2);
        pool.present(coord(0), MeshBuffer::new());
        pool.present(coord(1), MeshBuffer::new());
        pool.present(coord(0), MeshBuffer::new());
        pool.present(coord(2), MeshBuffer::new());

        assert_eq!(pool.len(), 2);
        assert!(pool.contains(coord(0)));
        assert!(!pool.contains(coord(1)));
        assert_eq!(pool.evictions(), 1);
        assert_eq!(pool.take_evicted(), vec![coord(1)]);
        assert!(pool.take_evicted().is_empty());

        pool.release(coord(0));
        pool.release(coord(9));
        assert_eq!(pool.positions().collect::<Vec<_>>(), vec![coord(2)]);
    }

    #[test]
    fn test_mesh_chunk_alone_emits_top_faces() {
        let floor = Chunk::from_fn(ChunkCoordinate::ORIGIN, EXTENT, |p| {
            if p.y == 0 {
                BlockType::STONE
            } else {
                BlockType::AIR
            }
        });
        let neighborhood = ChunkNeighborhood::new(EXTENT, Arc::clone(&floor.blocks));
        let mesh = mesh_chunk(ChunkCoordinate::ORIGIN, &neighborhood, &StoneTheme);
        assert_eq!(mesh.quad_count(), 1);
        assert_eq!(mesh.quads_on_side(BlockSide::TOP), 1);
        assert_eq!(mesh.opaque_indices.len(), 6);
    }

    #[test]
    fn test_represented_chunk_is_not_reported_evicted() {
        let mut pool = RenderObjectPool::new(1);
        pool.present(coord(0), MeshBuffer::new());
        pool.present(coord(1), MeshBuffer::new());
        pool.present(coord(0), MeshBuffer::new());
        assert_eq!(pool.take_evicted(), vec![coord(1)]);
        assert_eq!(pool.evictions(), 2);
    }

    #[test]
    fn test_theme_comparison_drives_merging() {
        let extent = ChunkExtent::new(4, 2, 4);
        let blocks = generate_chunk(
            ChunkCoordinate::ORIGIN,
            extent,
            &TerrainGenerator::flat(0),
            &CheckerboardTheme,
        );
        let neighborhood = ChunkNeighborhood::new(extent, Arc::new(blocks));

        let strict = MeshBuffer::from_faces(
            ChunkCoordinate::ORIGIN,
            &greedy_mesh(&neighborhood),
            &CheckerboardTheme,
        );
        assert_eq!(strict.quads_on_side(BlockSide::TOP), 16);

        let mesh = mesh_chunk(ChunkCoordinate::ORIGIN, &neighborhood, &CheckerboardTheme);
        assert_eq!(mesh.quads_on_side(BlockSide::TOP), 1);
        assert_eq!(mesh.quad_count(), 1);
    }
}
