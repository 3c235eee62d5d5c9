//! Mesh data structures for voxel rendering.
//!
//! A [`MeshBuffer`] holds one chunk's merged quads as a shared vertex list and two
//! index lists: one for the opaque pass and one for the transparent pass. A quad
//! goes to the list matching the opacity of its block, or to both when the mesher
//! merged cells of differing opacity into it.

use cgmath::EuclideanSpace;

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::BlockType, Block},
    coord::ChunkCoordinate,
    generation::WorldTheme,
};
use crate::engine_state::rendering::Vertex;

use super::face::Face;

/// Vertex and index data for one chunk, ready to hand to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffer {
    /// Four vertices per quad, in world coordinates
    pub vertices: Vec<Vertex>,
    /// Triangles of quads whose block is opaque
    pub opaque_indices: Vec<u32>,
    /// Triangles of quads whose block is transparent or translucent
    pub transparent_indices: Vec<u32>,
    /// Number of quads per `BlockSide`
    side_quads: [u32; 6],
}

impl MeshBuffer {
    /// Creates a new, empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mesh from merged faces.
    ///
    /// # Arguments
    /// * `origin` - Chunk the faces belong to; corners are offset by its minimum corner
    /// * `faces` - Faces produced by the greedy mesher
    /// * `theme` - Supplies per-vertex colors
    pub fn from_faces(
        origin: ChunkCoordinate,
        faces: &[Face<BlockType>],
        theme: &dyn WorldTheme,
    ) -> Self {
        let mut mesh = MeshBuffer {
            vertices: Vec::with_capacity(faces.len() * 4),
            ..Self::default()
        };
        for face in faces {
            mesh.push_face(origin, face, theme);
        }
        mesh
    }

    /// Appends one quad.
    pub fn push_face(&mut self, origin: ChunkCoordinate, face: &Face<BlockType>, theme: &dyn WorldTheme) {
        let base = self.vertices.len() as u32;
        self.vertices
            .extend(Self::generate_face_vertices(origin, face, theme));
        let indices = Self::generate_face_indices(base);
        if face.mixed_opacity {
            self.opaque_indices.extend(indices);
            self.transparent_indices.extend(indices);
        } else if face.block.is_opaque() {
            self.opaque_indices.extend(indices);
        } else {
            self.transparent_indices.extend(indices);
        }
        self.side_quads[face.side as usize] += 1;
    }

    /// Generates the four corner vertices of a face.
    ///
    /// Texture coordinates run in blocks so a texture tiles once per cell across
    /// a merged quad.
    pub fn generate_face_vertices(
        origin: ChunkCoordinate,
        face: &Face<BlockType>,
        theme: &dyn WorldTheme,
    ) -> [Vertex; 4] {
        let (u_offset, v_offset) = (face.width as f32, face.height as f32);
        let uvs = [(0.0, v_offset), (u_offset, v_offset), (0.0, 0.0), (u_offset, 0.0)];
        let corners = face.corners();

        let mut vertices = [Vertex::default(); 4];
        for (vertex, (corner, (u, v))) in vertices.iter_mut().zip(corners.into_iter().zip(uvs)) {
            let world = origin.origin() + corner.to_vec();
            let color = theme.decorate_vertex(face.block, face.side, world);
            *vertex = Vertex::new(world, face.side, face.block, u, v, color);
        }
        vertices
    }

    /// Generates the two triangles of a quad whose first vertex is `base`.
    pub fn generate_face_indices(base: u32) -> [u32; 6] {
        [base, base + 1, base + 3, base, base + 3, base + 2]
    }

    /// Total number of quads.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Number of quads facing `side`.
    pub fn quads_on_side(&self, side: BlockSide) -> usize {
        self.side_quads[side as usize] as usize
    }

    /// Whether the mesh has no geometry.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Raw vertex bytes for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}
