//! Rendering side of the voxel pipeline.
//!
//! This module turns loaded chunks into quad meshes and hands them to an
//! external [`PresentationSink`]. Uploading to a GPU and attaching meshes to
//! scene objects is the sink's business; this crate only produces the buffers.

pub mod meshing;
pub mod tasks;
mod vertex;

// Re-export commonly used types
pub use meshing::{MeshBuffer, PresentationSink, RenderObjectPool};
pub use vertex::Vertex;
