//! # Block Side Module
//!
//! The six faces of a voxel block, used both for face visibility and to find the
//! face-neighbor chunk that shares a boundary.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// Each variant carries a stable integer value used to index per-side arrays.
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// The axis the face normal lies on: 0 = X, 1 = Y, 2 = Z.
    pub fn axis(self) -> usize {
        match self {
            BlockSide::LEFT | BlockSide::RIGHT => 0,
            BlockSide::BOTTOM | BlockSide::TOP => 1,
            BlockSide::FRONT | BlockSide::BACK => 2,
        }
    }

    /// Whether the normal points along the positive direction of its axis.
    pub fn is_positive(self) -> bool {
        matches!(self, BlockSide::RIGHT | BlockSide::TOP | BlockSide::FRONT)
    }

    /// The outward unit normal.
    pub fn normal(self) -> Vector3<i32> {
        let sign = if self.is_positive() { 1 } else { -1 };
        let mut normal = Vector3::new(0, 0, 0);
        normal[self.axis()] = sign;
        normal
    }

    /// The face on the other side of the shared boundary.
    pub fn opposite(self) -> BlockSide {
        match self {
            BlockSide::FRONT => BlockSide::BACK,
            BlockSide::BACK => BlockSide::FRONT,
            BlockSide::BOTTOM => BlockSide::TOP,
            BlockSide::TOP => BlockSide::BOTTOM,
            BlockSide::LEFT => BlockSide::RIGHT,
            BlockSide::RIGHT => BlockSide::LEFT,
        }
    }

    /// The two in-plane axes `(u, v)` swept by the mesher for this face, such that
    /// `u x v` points along the outward normal.
    pub fn plane_axes(self) -> (usize, usize) {
        let a = (self.axis() + 1) % 3;
        let b = (self.axis() + 2) % 3;
        if self.is_positive() {
            (a, b)
        } else {
            (b, a)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_involution() {
        for side in BlockSide::all() {
            assert_eq!(side.opposite().opposite(), side);
            assert_eq!(side.normal() + side.opposite().normal(), Vector3::new(0, 0, 0));
        }
    }

    #[test]
    fn test_plane_axes_are_right_handed() {
        for side in BlockSide::all() {
            let (u, v) = side.plane_axes();
            let mut eu = Vector3::new(0, 0, 0);
            let mut ev = Vector3::new(0, 0, 0);
            eu[u] = 1;
            ev[v] = 1;
            assert_eq!(eu.cross(ev), side.normal(), "{side:?}");
        }
    }
}
