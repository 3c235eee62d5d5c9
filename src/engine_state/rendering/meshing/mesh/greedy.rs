//! Greedy meshing implementation for voxel rendering.
//!
//! This module implements the greedy meshing algorithm which combines adjacent coplanar
//! faces of the same block into larger quads, significantly reducing the number of
//! vertices the presentation layer has to draw.
//!
//! For each of the six sides the chunk is swept slice by slice along that side's
//! normal. Each slice gets a visibility mask holding the block of every visible
//! face. The mask is scanned row-major; from each unconsumed visible cell a
//! rectangle grows along `u` while cells match, then along `v` while every cell of
//! the current width still matches. Consumed cells are marked in a visited bitset.

use bitvec::vec::BitVec;
use cgmath::Point3;

use crate::engine_state::voxels::block::{block_side::BlockSide, Block};

use super::{face::Face, neighborhood::ChunkNeighborhood};

/// Whether the face of `block` toward `neighbor` can be seen.
///
/// Air never has faces. A face is hidden behind an opaque neighbor, and two
/// identical non-opaque blocks (water against water) share no face.
pub fn face_visible<B: Block>(block: &B, neighbor: &B) -> bool {
    !block.is_air() && !neighbor.is_opaque() && (block.is_opaque() || block != neighbor)
}

/// Greedy-meshes the center chunk of a neighborhood, merging only identical blocks.
pub fn greedy_mesh<B: Block>(neighborhood: &ChunkNeighborhood<B>) -> Vec<Face<B>> {
    greedy_mesh_with(neighborhood, |a, b| a == b)
}

/// Greedy-meshes the center chunk of a neighborhood.
///
/// # Arguments
/// * `neighborhood` - The chunk and its face-neighbors
/// * `same_block` - Whether two visible faces may be merged into one quad
///
/// # Returns
/// The merged faces of all six sides. Faces on a side whose neighbor chunk is
/// missing are left out.
///
/// # Performance
/// The center is decompressed once; the sweep is O(cells) per side, with one
/// compressed lookup per boundary cell.
pub fn greedy_mesh_with<B: Block>(
    neighborhood: &ChunkNeighborhood<B>,
    same_block: impl Fn(&B, &B) -> bool,
) -> Vec<Face<B>> {
    let extent = neighborhood.extent();
    let blocks = neighborhood.center().to_vec();
    let mut faces = Vec::new();

    let mut mask: Vec<Option<B>> = Vec::new();
    let mut visited: BitVec = BitVec::new();

    for side in BlockSide::all() {
        let axis = side.axis();
        let (u_axis, v_axis) = side.plane_axes();
        let layers = extent.axis(axis) as usize;
        let nu = extent.axis(u_axis) as usize;
        let nv = extent.axis(v_axis) as usize;
        let normal = side.normal();

        for layer in 0..layers {
            mask.clear();
            mask.resize(nu * nv, None);
            visited.clear();
            visited.resize(nu * nv, false);

            for v in 0..nv {
                for u in 0..nu {
                    let mut p = [0usize; 3];
                    p[axis] = layer;
                    p[u_axis] = u;
                    p[v_axis] = v;
                    let block = blocks[extent.flatten(p[0], p[1], p[2])];
                    if block.is_air() {
                        continue;
                    }

                    let adjacent = Point3::new(
                        p[0] as i32 + normal.x,
                        p[1] as i32 + normal.y,
                        p[2] as i32 + normal.z,
                    );
                    let neighbor = if extent.contains(adjacent) {
                        Some(
                            blocks[extent.flatten(
                                adjacent.x as usize,
                                adjacent.y as usize,
                                adjacent.z as usize,
                            )],
                        )
                    } else {
                        neighborhood.block_at(adjacent)
                    };

                    if neighbor.is_some_and(|n| face_visible(&block, &n)) {
                        mask[v * nu + u] = Some(block);
                    }
                }
            }

            for v in 0..nv {
                for u in 0..nu {
                    let start = v * nu + u;
                    if visited[start] {
                        continue;
                    }
                    let Some(block) = mask[start] else {
                        continue;
                    };

                    let fits = |index: usize, visited: &BitVec| {
                        !visited[index] && mask[index].is_some_and(|other| same_block(&block, &other))
                    };

                    let mut width = 1;
                    while u + width < nu && fits(start + width, &visited) {
                        width += 1;
                    }

                    let mut height = 1;
                    'grow: while v + height < nv {
                        let row = (v + height) * nu + u;
                        for du in 0..width {
                            if !fits(row + du, &visited) {
                                break 'grow;
                            }
                        }
                        height += 1;
                    }

                    let mut mixed_opacity = false;
                    for dv in 0..height {
                        for du in 0..width {
                            let index = (v + dv) * nu + u + du;
                            visited.set(index, true);
                            mixed_opacity |= mask[index]
                                .is_some_and(|other| other.is_opaque() != block.is_opaque());
                        }
                    }

                    faces.push(Face {
                        side,
                        layer,
                        u,
                        v,
                        width,
                        height,
                        block,
                        mixed_opacity,
                    });
                }
            }
        }
    }

    faces
}
