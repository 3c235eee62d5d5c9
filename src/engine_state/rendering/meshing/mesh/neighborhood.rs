use std::sync::Arc;

use cgmath::Point3;

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::BlockType, Block},
    chunk::{ChunkExtent, CompressedVoxelBuffer},
    coord::ChunkCoordinate,
    world::World,
};

/// A read-only snapshot of a chunk and its six face-neighbors.
///
/// Buffers are shared with the chunk store through `Arc`, so building a
/// snapshot copies no block data and the snapshot can move to a worker thread.
/// A missing neighbor is `None`; the mesher treats that side as an opaque wall.
#[derive(Clone, Debug)]
pub struct ChunkNeighborhood<B: Block> {
    extent: ChunkExtent,
    center: Arc<CompressedVoxelBuffer<B>>,
    neighbors: [Option<Arc<CompressedVoxelBuffer<B>>>; 6],
}

impl<B: Block> ChunkNeighborhood<B> {
    /// A neighborhood with no neighbors loaded.
    pub fn new(extent: ChunkExtent, center: Arc<CompressedVoxelBuffer<B>>) -> Self {
        ChunkNeighborhood {
            extent,
            center,
            neighbors: Default::default(),
        }
    }

    /// Adds the neighbor across `side`.
    pub fn with_neighbor(mut self, side: BlockSide, buffer: Arc<CompressedVoxelBuffer<B>>) -> Self {
        self.neighbors[side as usize] = Some(buffer);
        self
    }

    /// Chunk size shared by all seven buffers.
    pub fn extent(&self) -> ChunkExtent {
        self.extent
    }

    /// The chunk being meshed.
    pub fn center(&self) -> &CompressedVoxelBuffer<B> {
        &self.center
    }

    /// Number of neighbors present.
    pub fn loaded_neighbors(&self) -> usize {
        self.neighbors.iter().filter(|n| n.is_some()).count()
    }

    /// Block at a position relative to the center chunk's minimum corner.
    ///
    /// Positions may leave the center across at most one face. Returns `None`
    /// when that neighbor is not loaded or the position is diagonal to the center.
    pub fn block_at(&self, position: Point3<i32>) -> Option<B> {
        let extent = self.extent;
        if extent.contains(position) {
            return Some(self.center.get_unchecked(flat_index(extent, position)));
        }

        let coords = [position.x, position.y, position.z];
        let mut outside = None;
        for (axis, &c) in coords.iter().enumerate() {
            let size = extent.axis(axis);
            if c < 0 || c >= size {
                if outside.is_some() {
                    return None;
                }
                outside = Some((axis, c >= size));
            }
        }
        let (axis, positive) = outside?;
        let side = side_for(axis, positive);
        let buffer = self.neighbors[side as usize].as_ref()?;

        let wrapped = Point3::new(
            position.x.rem_euclid(extent.x),
            position.y.rem_euclid(extent.y),
            position.z.rem_euclid(extent.z),
        );
        Some(buffer.get_unchecked(flat_index(extent, wrapped)))
    }
}

impl ChunkNeighborhood<BlockType> {
    /// Snapshots a chunk and whichever of its neighbors the store holds.
    ///
    /// Returns `None` if the center chunk itself is not loaded.
    pub fn from_world(world: &World, position: ChunkCoordinate) -> Option<Self> {
        let center = world.get(position)?;
        let mut neighborhood = ChunkNeighborhood::new(world.extent(), center.blocks.clone());
        for (index, neighbor) in world.neighbors(position).into_iter().enumerate() {
            if let Some(chunk) = neighbor {
                neighborhood.neighbors[index] = Some(chunk.blocks.clone());
            }
        }
        Some(neighborhood)
    }
}

fn flat_index(extent: ChunkExtent, position: Point3<i32>) -> usize {
    extent.flatten(
        position.x as usize,
        position.y as usize,
        position.z as usize,
    )
}

fn side_for(axis: usize, positive: bool) -> BlockSide {
    match (axis, positive) {
        (0, false) => BlockSide::LEFT,
        (0, true) => BlockSide::RIGHT,
        (1, false) => BlockSide::BOTTOM,
        (1, true) => BlockSide::TOP,
        (_, false) => BlockSide::BACK,
        (_, true) => BlockSide::FRONT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::Chunk;

    const EXTENT: ChunkExtent = ChunkExtent::new(2, 2, 2);

    #[test]
    fn test_lookups_cross_into_neighbors() {
        let center = Chunk::empty(ChunkCoordinate::ORIGIN, EXTENT);
        let above = Chunk::solid(ChunkCoordinate::ORIGIN, EXTENT);
        let neighborhood = ChunkNeighborhood::new(EXTENT, center.blocks.clone())
            .with_neighbor(BlockSide::TOP, above.blocks.clone());

        assert_eq!(neighborhood.block_at(Point3::new(1, 1, 1)), Some(BlockType::AIR));
        assert_eq!(neighborhood.block_at(Point3::new(1, 2, 0)), Some(BlockType::STONE));
        assert_eq!(neighborhood.block_at(Point3::new(-1, 0, 0)), None);
        assert_eq!(neighborhood.block_at(Point3::new(2, 2, 0)), None);
        assert_eq!(neighborhood.loaded_neighbors(), 1);
    }

    #[test]
    fn test_from_world_shares_buffers() {
        let mut world = World::new(EXTENT);
        world.insert(Chunk::solid(ChunkCoordinate::ORIGIN, EXTENT));
        let right = ChunkCoordinate::ORIGIN.neighbor(BlockSide::RIGHT, EXTENT);
        world.insert(Chunk::empty(right, EXTENT));

        let neighborhood =
            ChunkNeighborhood::from_world(&world, ChunkCoordinate::ORIGIN).expect("center loaded");
        assert_eq!(neighborhood.loaded_neighbors(), 1);
        assert_eq!(neighborhood.block_at(Point3::new(2, 0, 0)), Some(BlockType::AIR));
        assert!(ChunkNeighborhood::from_world(&world, ChunkCoordinate::from_grid(5, 5, 5, EXTENT)).is_none());
    }
}
