use cgmath::Point3;

use crate::engine_state::voxels::block::{block_side::BlockSide, Block};

/// A merged rectangle of visible faces on one slice of a chunk.
///
/// The rectangle lives in the slice's `(u, v)` plane, see
/// [`BlockSide::plane_axes`]. `layer` is the slice index along the face normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face<B: Block> {
    /// Which side of the blocks this face covers
    pub side: BlockSide,
    /// Slice index along the normal axis
    pub layer: usize,
    /// Minimum corner along the u axis
    pub u: usize,
    /// Minimum corner along the v axis
    pub v: usize,
    /// Extent along the u axis, in blocks
    pub width: usize,
    /// Extent along the v axis, in blocks
    pub height: usize,
    /// The block of the first covered cell; the rest compare equal to it
    /// under the comparison the mesher was run with
    pub block: B,
    /// Whether the covered cells disagree on opacity
    pub mixed_opacity: bool,
}

impl<B: Block> Face<B> {
    /// Number of cells this face covers.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// The four corners in chunk-local coordinates, ordered lower-left,
    /// lower-right, upper-left, upper-right as seen from outside the block.
    ///
    /// Positive faces sit on the far plane of their layer.
    pub fn corners(&self) -> [Point3<i32>; 4] {
        let (u_axis, v_axis) = self.side.plane_axes();
        let plane = self.layer as i32 + i32::from(self.side.is_positive());
        let corner = |du: usize, dv: usize| {
            let mut p = [0i32; 3];
            p[self.side.axis()] = plane;
            p[u_axis] = (self.u + du) as i32;
            p[v_axis] = (self.v + dv) as i32;
            Point3::new(p[0], p[1], p[2])
        };
        [
            corner(0, 0),
            corner(self.width, 0),
            corner(0, self.height),
            corner(self.width, self.height),
        ]
    }
}
