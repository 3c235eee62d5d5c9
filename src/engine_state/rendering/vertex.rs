//! Vertex data structures for chunk meshes.
//!
//! This module defines the vertex format handed to the presentation layer. The
//! layout is `#[repr(C)]` and `Pod`, so a mesh's vertices can be uploaded as raw
//! bytes with `bytemuck::cast_slice`.

use cgmath::Point3;

use crate::engine_state::voxels::block::{block_side::BlockSide, block_type::BlockType};

/// A vertex of a merged quad.
///
/// # Memory Layout
/// - Position: 3x i32 (12 bytes)
/// - Side: u32 (4 bytes)
/// - Block: u32 (4 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Color: [f32; 4] (16 bytes)
///
/// Total size: 44 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in world block coordinates
    pub position: [i32; 3],
    /// `BlockSide` the quad faces
    pub side: u32,
    /// `BlockType` of the quad
    pub block: u32,
    /// Texture coordinates in blocks, so a texture repeats once per cell
    pub tex_coords: [f32; 2],
    /// RGBA tint chosen by the world theme
    pub color: [f32; 4],
}

impl Vertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `pos` - World position of the corner
    /// * `side` - Which face of the block the quad lies on
    /// * `block` - Block type of the quad
    /// * `u`, `v` - Texture coordinates in blocks
    /// * `color` - RGBA tint
    pub fn new(
        pos: Point3<i32>,
        side: BlockSide,
        block: BlockType,
        u: f32,
        v: f32,
        color: [f32; 4],
    ) -> Self {
        Vertex {
            position: [pos.x, pos.y, pos.z],
            side: side as u32,
            block: block as u32,
            tex_coords: [u, v],
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 44);
        let vertex = Vertex::new(
            Point3::new(1, -2, 3),
            BlockSide::TOP,
            BlockType::GRASS,
            2.0,
            1.0,
            [1.0; 4],
        );
        let bytes: &[u8] = bytemuck::bytes_of(&vertex);
        assert_eq!(bytes.len(), 44);
        assert_eq!(&bytes[0..4], &1i32.to_ne_bytes());
    }
}
