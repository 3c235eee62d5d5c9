//! # Chunk Coordinates
//!
//! A `ChunkCoordinate` is the world-space block position of a chunk's minimum
//! corner, so each component is always a multiple of the chunk extent on that
//! axis. It is the key for the chunk store, the scheduler queues and the
//! presentation layer.

use cgmath::Point3;

use super::block::block_side::BlockSide;
use super::chunk::ChunkExtent;

/// The unique key of a chunk: its minimum corner in block coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoordinate {
    /// X of the minimum corner, a multiple of the extent's x.
    pub x: i32,
    /// Y of the minimum corner, a multiple of the extent's y.
    pub y: i32,
    /// Z of the minimum corner, a multiple of the extent's z.
    pub z: i32,
}

impl ChunkCoordinate {
    /// The chunk containing the world origin.
    pub const ORIGIN: ChunkCoordinate = ChunkCoordinate { x: 0, y: 0, z: 0 };

    /// Builds the coordinate of the chunk with grid index `(i, j, k)`.
    pub fn from_grid(i: i32, j: i32, k: i32, extent: ChunkExtent) -> Self {
        ChunkCoordinate {
            x: i * extent.x,
            y: j * extent.y,
            z: k * extent.z,
        }
    }

    /// Resolves the chunk containing a world block position (floor division, so
    /// negative positions land in the chunk below rather than the one at zero).
    pub fn containing(world_position: Point3<i32>, extent: ChunkExtent) -> Self {
        ChunkCoordinate::from_grid(
            world_position.x.div_euclid(extent.x),
            world_position.y.div_euclid(extent.y),
            world_position.z.div_euclid(extent.z),
            extent,
        )
    }

    /// The chunk grid index `(i, j, k)` of this coordinate.
    pub fn grid(self, extent: ChunkExtent) -> Point3<i32> {
        Point3::new(
            self.x.div_euclid(extent.x),
            self.y.div_euclid(extent.y),
            self.z.div_euclid(extent.z),
        )
    }

    /// Offsets this coordinate by a number of whole chunks per axis.
    pub fn offset(self, di: i32, dj: i32, dk: i32, extent: ChunkExtent) -> Self {
        ChunkCoordinate {
            x: self.x + di * extent.x,
            y: self.y + dj * extent.y,
            z: self.z + dk * extent.z,
        }
    }

    /// The face-neighbor sharing the given side of this chunk.
    pub fn neighbor(self, side: BlockSide, extent: ChunkExtent) -> Self {
        let normal = side.normal();
        self.offset(normal.x, normal.y, normal.z, extent)
    }

    /// All six face-neighbors, indexed by `BlockSide as usize`.
    pub fn neighbors(self, extent: ChunkExtent) -> [ChunkCoordinate; 6] {
        let mut neighbors = [self; 6];
        for side in BlockSide::all() {
            neighbors[side as usize] = self.neighbor(side, extent);
        }
        neighbors
    }

    /// Chebyshev distance in whole chunks.
    pub fn chunk_distance(self, other: ChunkCoordinate, extent: ChunkExtent) -> i32 {
        let a = self.grid(extent);
        let b = other.grid(extent);
        (a.x - b.x).abs().max((a.y - b.y).abs()).max((a.z - b.z).abs())
    }

    /// The minimum corner as a point.
    pub fn origin(self) -> Point3<i32> {
        Point3::new(self.x, self.y, self.z)
    }
}
