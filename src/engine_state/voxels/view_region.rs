//! # View Region
//!
//! A view region is the axis-aligned cube of chunk coordinates within `radius`
//! chunks (Chebyshev distance) of a focus chunk. When the focus crosses a chunk
//! boundary the pipeline diffs the old and new cubes to learn which coordinates
//! entered and which left.
//!
//! The diff costs O(radius³), which is fine because it only runs on boundary
//! crossings, never on every frame.

use super::chunk::ChunkExtent;
use super::coord::ChunkCoordinate;

/// A cube of chunk coordinates centered on a focus chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ViewRegion {
    /// The focus chunk.
    pub center: ChunkCoordinate,
    /// Half-width of the cube in chunks.
    pub radius: i32,
}

impl ViewRegion {
    /// Creates a region of `radius` chunks around `center`.
    pub fn new(center: ChunkCoordinate, radius: i32) -> Self {
        ViewRegion { center, radius }
    }

    /// Number of coordinates in the cube, `(2r + 1)^3`.
    pub fn volume(&self) -> usize {
        let side = (2 * self.radius + 1).max(0) as usize;
        side * side * side
    }

    /// Whether `position` lies inside the cube.
    pub fn contains(&self, position: ChunkCoordinate, extent: ChunkExtent) -> bool {
        self.center.chunk_distance(position, extent) <= self.radius
    }

    /// Every coordinate in the cube, nearest to the center first.
    pub fn coordinates(&self, extent: ChunkExtent) -> Vec<ChunkCoordinate> {
        let r = self.radius;
        let mut coordinates = Vec::with_capacity(self.volume());
        for dj in -r..=r {
            for dk in -r..=r {
                for di in -r..=r {
                    coordinates.push(self.center.offset(di, dj, dk, extent));
                }
            }
        }
        sort_nearest_first(&mut coordinates, self.center, extent);
        coordinates
    }
}

/// The symmetric difference of two view regions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegionDiff {
    /// In the new cube but not the old one, nearest to the new center first.
    pub enter: Vec<ChunkCoordinate>,
    /// In the old cube but not the new one.
    pub exit: Vec<ChunkCoordinate>,
}

impl RegionDiff {
    /// Whether nothing entered or left.
    pub fn is_empty(&self) -> bool {
        self.enter.is_empty() && self.exit.is_empty()
    }
}

/// Computes `enter = cube(new) - cube(old)` and `exit = cube(old) - cube(new)`,
/// both cubes using the same `radius`.
///
/// Returns an empty diff without allocating when the centers are equal.
pub fn diff_regions(
    old_center: ChunkCoordinate,
    new_center: ChunkCoordinate,
    radius: i32,
    extent: ChunkExtent,
) -> RegionDiff {
    if old_center == new_center {
        return RegionDiff::default();
    }

    let old_region = ViewRegion::new(old_center, radius);
    let new_region = ViewRegion::new(new_center, radius);

    let enter = new_region
        .coordinates(extent)
        .into_iter()
        .filter(|coord| !old_region.contains(*coord, extent))
        .collect();
    let exit = old_region
        .coordinates(extent)
        .into_iter()
        .filter(|coord| !new_region.contains(*coord, extent))
        .collect();

    RegionDiff { enter, exit }
}

/// Orders coordinates by squared grid distance to `center`, ties broken by the
/// coordinate itself so the order is deterministic.
pub fn sort_nearest_first(
    coordinates: &mut [ChunkCoordinate],
    center: ChunkCoordinate,
    extent: ChunkExtent,
) {
    let c = center.grid(extent);
    coordinates.sort_by_key(|coord| {
        let g = coord.grid(extent);
        let (dx, dy, dz) = (g.x - c.x, g.y - c.y, g.z - c.z);
        (dx * dx + dy * dy + dz * dz, *coord)
    });
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    const EXTENT: ChunkExtent = ChunkExtent::new(16, 16, 16);

    fn cube(center: ChunkCoordinate, radius: i32) -> HashSet<ChunkCoordinate> {
        ViewRegion::new(center, radius)
            .coordinates(EXTENT)
            .into_iter()
            .collect()
    }

    #[test]
    fn test_same_center_is_empty() {
        let center = ChunkCoordinate::from_grid(3, -1, 2, EXTENT);
        let diff = diff_regions(center, center, 4, EXTENT);
        assert!(diff.is_empty());
        assert_eq!(diff.enter.capacity(), 0);
        assert_eq!(diff.exit.capacity(), 0);
    }

    #[test]
    fn test_one_step_along_x_moves_one_face_plane() {
        for r in 0..4 {
            let old = ChunkCoordinate::ORIGIN;
            let new = old.offset(1, 0, 0, EXTENT);
            let diff = diff_regions(old, new, r, EXTENT);
            let face = ((2 * r + 1) * (2 * r + 1)) as usize;

            assert_eq!(diff.enter.len(), face);
            assert_eq!(diff.exit.len(), face);
            assert!(diff.enter.iter().all(|c| c.grid(EXTENT).x == r + 1));
            assert!(diff.exit.iter().all(|c| c.grid(EXTENT).x == -r));
        }
    }

    #[test]
    fn test_diff_partitions_the_cubes() {
        let cases = [
            (ChunkCoordinate::ORIGIN, ChunkCoordinate::from_grid(2, -1, 1, EXTENT), 2),
            (ChunkCoordinate::ORIGIN, ChunkCoordinate::from_grid(10, 0, 0, EXTENT), 3),
            (ChunkCoordinate::from_grid(-4, 5, 0, EXTENT), ChunkCoordinate::from_grid(-3, 5, -1, EXTENT), 1),
        ];
        for (old, new, r) in cases {
            let diff = diff_regions(old, new, r, EXTENT);
            let enter: HashSet<_> = diff.enter.iter().copied().collect();
            let exit: HashSet<_> = diff.exit.iter().copied().collect();
            assert!(enter.is_disjoint(&exit));

            let old_kept: HashSet<_> = cube(old, r).difference(&exit).copied().collect();
            let new_kept: HashSet<_> = cube(new, r).difference(&enter).copied().collect();
            assert_eq!(old_kept, new_kept);
        }
    }

    #[test]
    fn test_coordinates_are_nearest_first() {
        let region = ViewRegion::new(ChunkCoordinate::ORIGIN, 2);
        let coords = region.coordinates(EXTENT);
        assert_eq!(coords.len(), region.volume());
        assert_eq!(coords[0], ChunkCoordinate::ORIGIN);
        assert!(coords[1..7]
            .iter()
            .all(|c| c.chunk_distance(ChunkCoordinate::ORIGIN, EXTENT) == 1));
    }
}
