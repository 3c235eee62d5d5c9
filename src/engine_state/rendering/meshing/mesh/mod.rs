//! Mesh generation for voxel rendering.
//!
//! This module converts a chunk and its face-neighbors into merged quads and
//! packs those quads into vertex and index buffers.
//!
//! # Architecture
//! - [`ChunkNeighborhood`]: read-only snapshot of a chunk plus its six neighbors
//! - [`greedy_mesh`]: the greedy merge over per-slice visibility masks
//! - [`Face`]: one merged rectangle
//! - [`MeshBuffer`]: vertices plus opaque and transparent index lists
//!
//! # Usage
//! ```ignore
//! let neighborhood = ChunkNeighborhood::from_world(&world, coord)?;
//! let faces = greedy_mesh(&neighborhood);
//! let mesh = MeshBuffer::from_faces(coord, &faces, theme.as_ref());
//! ```

mod face;
mod greedy;
mod mesh;
mod neighborhood;

pub use face::Face;
pub use greedy::{face_visible, greedy_mesh, greedy_mesh_with};
pub use mesh::MeshBuffer;
pub use neighborhood::ChunkNeighborhood;
