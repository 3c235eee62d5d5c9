//! # Block Type Module
//!
//! The default block family: a compact `u8` enum with one air sentinel.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all block types in the default voxel world.
///
/// The `FromPrimitive` derive allows conversion from the stored integer id.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive)]
pub enum BlockType {
    /// An air block, non-solid and transparent. Never meshed.
    AIR,

    /// Bedrock-like filler below the surface layers.
    STONE,

    /// The few layers directly under the surface.
    DIRT,

    /// The surface layer of land columns.
    GRASS,

    /// Beach surface near sea level.
    SAND,

    /// Fills columns below sea level; translucent.
    WATER,

    /// Clear block used by test scenes; transparent.
    GLASS,

    /// A wooden block with a bark texture on all sides.
    WOOD,
}

impl BlockType {
    /// Number of variants in the family.
    pub const COUNT: usize = 8;

    /// Converts a stored `BlockTypeSize` back to a `BlockType`.
    ///
    /// # Returns
    /// `None` if the id does not correspond to a variant.
    pub fn get_block_type_from_int(btype: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(btype)
    }

    /// Base RGBA color used when no theme-specific tint applies.
    pub fn base_color(&self) -> [f32; 4] {
        match self {
            BlockType::AIR => [0.0, 0.0, 0.0, 0.0],
            BlockType::STONE => [0.50, 0.50, 0.52, 1.0],
            BlockType::DIRT => [0.45, 0.31, 0.18, 1.0],
            BlockType::GRASS => [0.30, 0.62, 0.22, 1.0],
            BlockType::SAND => [0.86, 0.80, 0.55, 1.0],
            BlockType::WATER => [0.15, 0.35, 0.80, 0.6],
            BlockType::GLASS => [0.85, 0.92, 0.95, 0.25],
            BlockType::WOOD => [0.55, 0.40, 0.22, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_conversion_covers_every_variant() {
        for id in 0..BlockType::COUNT as BlockTypeSize {
            let block = BlockType::get_block_type_from_int(id).expect("valid id");
            assert_eq!(block as BlockTypeSize, id);
        }
        assert!(BlockType::get_block_type_from_int(BlockType::COUNT as BlockTypeSize).is_none());
    }
}
