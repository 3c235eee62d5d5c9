//! # Block Module
//!
//! This module provides the block capability shared by every block family, the
//! default `BlockType` family used by the engine, and the six block faces.

use std::fmt::Debug;
use std::hash::Hash;

use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// The capability every storable block value provides.
///
/// A block family is a small `Copy` value type with exactly one air sentinel.
/// Blocks are compared by value; rendering passes are derived from the three
/// optical predicates below.
pub trait Block: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// The empty sentinel of this family.
    const AIR: Self;

    /// Width of the fixed byte representation.
    const BYTE_WIDTH: usize;

    /// Fully occludes whatever is behind it.
    fn is_opaque(&self) -> bool;

    /// Lets light through without tinting (glass, air).
    fn is_transparent(&self) -> bool;

    /// Lets light through with tinting (water).
    fn is_translucent(&self) -> bool;

    /// Writes the fixed-width representation into `out[..BYTE_WIDTH]`.
    fn write_bytes(&self, out: &mut [u8]);

    /// Reads a block back from its fixed-width representation.
    ///
    /// Returns `None` for byte patterns that do not name a block.
    fn from_bytes(bytes: &[u8]) -> Option<Self>;

    /// Convenience check against the air sentinel.
    fn is_air(&self) -> bool {
        *self == Self::AIR
    }
}

impl Block for BlockType {
    const AIR: Self = BlockType::AIR;
    const BYTE_WIDTH: usize = std::mem::size_of::<BlockTypeSize>();

    fn is_opaque(&self) -> bool {
        !matches!(self, BlockType::AIR | BlockType::WATER | BlockType::GLASS)
    }

    fn is_transparent(&self) -> bool {
        matches!(self, BlockType::AIR | BlockType::GLASS)
    }

    fn is_translucent(&self) -> bool {
        matches!(self, BlockType::WATER)
    }

    fn write_bytes(&self, out: &mut [u8]) {
        out[0] = *self as BlockTypeSize;
    }

    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        bytes
            .first()
            .and_then(|&id| BlockType::get_block_type_from_int(id))
    }
}
