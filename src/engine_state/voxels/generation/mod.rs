//! # Procedural Generation
//!
//! Fills chunks from a [`TerrainGenerator`] and a [`WorldTheme`].
//!
//! Generation walks cells in exactly the order the compressed buffer flattens
//! them (`y`, then `z`, then `x`) and pushes each block through a
//! [`ChunkCreationIterator`], so equal neighbors in that order land in one run.
//! Column heights are computed once per `(x, z)` and reused for every `y`.

use cgmath::Point3;

use super::block::block_type::BlockType;
use super::chunk::{ChunkCreationIterator, ChunkExtent, CompressedVoxelBuffer};
use super::coord::ChunkCoordinate;

pub use terrain::TerrainGenerator;
pub use theme::{
    shade, theme_by_name, CavernTheme, CheckerboardTheme, LayeredTheme, StoneTheme,
    TerrainSample, WorldTheme,
};

pub mod terrain;
pub mod theme;

/// Generates the block data for one chunk.
///
/// # Arguments
/// * `position` - Minimum corner of the chunk
/// * `extent` - Chunk size
/// * `generator` - Height and density source
/// * `theme` - Block classifier
///
/// # Returns
/// A buffer holding exactly `extent.cell_count()` cells in flatten order.
pub fn generate_chunk(
    position: ChunkCoordinate,
    extent: ChunkExtent,
    generator: &TerrainGenerator,
    theme: &dyn WorldTheme,
) -> CompressedVoxelBuffer<BlockType> {
    let sx = extent.x as usize;
    let mut heights = Vec::with_capacity(sx * extent.z as usize);
    for z in 0..extent.z {
        for x in 0..extent.x {
            heights.push(generator.sample_height(position.x + x, position.z + z));
        }
    }

    let samples_density = theme.samples_density();
    let mut cci = ChunkCreationIterator::new(position, extent);
    while let Some(local) = cci.cursor() {
        let world = Point3::new(
            position.x + local.x as i32,
            position.y + local.y as i32,
            position.z + local.z as i32,
        );
        let density = if samples_density {
            generator.sample_density(world.x, world.y, world.z)
        } else {
            0.0
        };
        let sample = TerrainSample {
            height: heights[local.z * sx + local.x],
            density,
        };
        cci.push_block_type(theme.classify_block(world, sample));
    }
    cci.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NoiseConfig;

    #[test]
    fn test_flat_stone_chunk_fills_bottom_plane() {
        let extent = ChunkExtent::new(4, 4, 4);
        let buffer = generate_chunk(
            ChunkCoordinate::ORIGIN,
            extent,
            &TerrainGenerator::flat(0),
            &StoneTheme,
        );
        assert_eq!(buffer.len(), 64);
        assert_eq!(buffer.run_count(), 2);
        for (index, block) in buffer.iter().enumerate() {
            let p = extent.unflatten(index);
            let expected = if p.y == 0 { BlockType::STONE } else { BlockType::AIR };
            assert_eq!(block, expected, "at {p:?}");
        }
    }

    #[test]
    fn test_chunk_below_surface_is_single_run() {
        let extent = ChunkExtent::new(8, 8, 8);
        let below = ChunkCoordinate::from_grid(0, -2, 0, extent);
        let buffer = generate_chunk(below, extent, &TerrainGenerator::flat(0), &StoneTheme);
        assert_eq!(buffer.run_count(), 1);
        assert_eq!(buffer.get(0), Ok(BlockType::STONE));
    }

    #[test]
    fn test_generation_is_deterministic_and_minimal() {
        let extent = ChunkExtent::new(8, 8, 8);
        let generator = TerrainGenerator::new(&NoiseConfig {
            seed: 3,
            scale: 0.1,
            height_range: 16,
            ..NoiseConfig::default()
        });
        let theme = LayeredTheme::default();
        let coord = ChunkCoordinate::from_grid(1, 0, -1, extent);
        let a = generate_chunk(coord, extent, &generator, &theme);
        let b = generate_chunk(coord, extent, &generator, &theme);
        assert_eq!(a.to_vec(), b.to_vec());

        let recompressed = CompressedVoxelBuffer::from_blocks(&a.to_vec());
        assert_eq!(a.run_count(), recompressed.run_count());
    }
}
