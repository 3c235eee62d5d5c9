//! # World Themes
//!
//! A theme turns terrain samples into blocks and decides how each face is
//! tinted. Themes are chosen once, when the pipeline is built, and shared by
//! every generation and mesh task.

use std::sync::Arc;

use cgmath::Point3;

use crate::engine_state::voxels::block::block_side::BlockSide;
use crate::engine_state::voxels::block::block_type::BlockType;

/// What the generator knows about one cell before classification.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TerrainSample {
    /// Surface height of the cell's column.
    pub height: i32,
    /// 3D density at the cell, or `0.0` when the theme does not ask for it.
    pub density: f64,
}

/// Strategy for block classification and vertex coloring.
pub trait WorldTheme: Send + Sync {
    /// Name used in configuration files.
    fn name(&self) -> &'static str;

    /// Picks the block for a world position.
    fn classify_block(&self, position: Point3<i32>, sample: TerrainSample) -> BlockType;

    /// Whether [`TerrainSample::density`] must be computed for this theme.
    fn samples_density(&self) -> bool {
        false
    }

    /// RGBA color for a face vertex at a world position.
    fn decorate_vertex(&self, block: BlockType, side: BlockSide, _position: Point3<i32>) -> [f32; 4] {
        shade(block.base_color(), side)
    }

    /// Whether the mesher may merge visible faces of `a` and `b` into one quad.
    fn same_block(&self, a: &BlockType, b: &BlockType) -> bool {
        a == b
    }
}

/// Darkens a color by a fixed per-side factor so faces read as distinct.
pub fn shade(color: [f32; 4], side: BlockSide) -> [f32; 4] {
    let factor = match side {
        BlockSide::TOP => 1.0,
        BlockSide::BOTTOM => 0.5,
        BlockSide::LEFT | BlockSide::RIGHT => 0.8,
        BlockSide::FRONT | BlockSide::BACK => 0.7,
    };
    [color[0] * factor, color[1] * factor, color[2] * factor, color[3]]
}

/// Grass over dirt over stone, with water filling everything below sea level.
#[derive(Copy, Clone, Debug)]
pub struct LayeredTheme {
    /// Air cells at or below this height become water.
    pub sea_level: i32,
    /// Depth of the dirt layer under the surface block.
    pub dirt_depth: i32,
}

impl Default for LayeredTheme {
    fn default() -> Self {
        LayeredTheme {
            sea_level: -4,
            dirt_depth: 3,
        }
    }
}

impl WorldTheme for LayeredTheme {
    fn name(&self) -> &'static str {
        "layered"
    }

    fn classify_block(&self, position: Point3<i32>, sample: TerrainSample) -> BlockType {
        let y = position.y;
        let height = sample.height;
        if y > height {
            if y <= self.sea_level {
                BlockType::WATER
            } else {
                BlockType::AIR
            }
        } else if y == height {
            if height <= self.sea_level + 1 {
                BlockType::SAND
            } else {
                BlockType::GRASS
            }
        } else if y >= height - self.dirt_depth {
            BlockType::DIRT
        } else {
            BlockType::STONE
        }
    }
}

/// Solid stone up to and including the surface height, air above.
#[derive(Copy, Clone, Debug, Default)]
pub struct StoneTheme;

impl WorldTheme for StoneTheme {
    fn name(&self) -> &'static str {
        "stone"
    }

    fn classify_block(&self, position: Point3<i32>, sample: TerrainSample) -> BlockType {
        if position.y <= sample.height {
            BlockType::STONE
        } else {
            BlockType::AIR
        }
    }
}

/// Layered terrain with caves carved out wherever the 3D density is high.
#[derive(Copy, Clone, Debug)]
pub struct CavernTheme {
    /// Cells below the surface with density above this are hollow.
    pub threshold: f64,
    /// Surface layering outside the caves.
    pub layers: LayeredTheme,
}

impl Default for CavernTheme {
    fn default() -> Self {
        CavernTheme {
            threshold: 0.35,
            layers: LayeredTheme::default(),
        }
    }
}

impl WorldTheme for CavernTheme {
    fn name(&self) -> &'static str {
        "caverns"
    }

    fn samples_density(&self) -> bool {
        true
    }

    fn classify_block(&self, position: Point3<i32>, sample: TerrainSample) -> BlockType {
        if position.y < sample.height && sample.density > self.threshold {
            return BlockType::AIR;
        }
        self.layers.classify_block(position, sample)
    }
}

/// Alternating dirt and wood in a 3D checker pattern below the surface.
///
/// Dirt and wood faces merge into shared quads, so the pattern only shows
/// through the per-column vertex tint.
#[derive(Copy, Clone, Debug, Default)]
pub struct CheckerboardTheme;

impl WorldTheme for CheckerboardTheme {
    fn name(&self) -> &'static str {
        "checkerboard"
    }

    fn classify_block(&self, position: Point3<i32>, sample: TerrainSample) -> BlockType {
        if position.y > sample.height {
            BlockType::AIR
        } else if (position.x + position.y + position.z).rem_euclid(2) == 0 {
            BlockType::DIRT
        } else {
            BlockType::WOOD
        }
    }

    fn decorate_vertex(&self, block: BlockType, side: BlockSide, position: Point3<i32>) -> [f32; 4] {
        let mut color = shade(block.base_color(), side);
        if (position.x + position.z).rem_euclid(2) == 1 {
            color[0] *= 0.9;
            color[1] *= 0.9;
            color[2] *= 0.9;
        }
        color
    }

    fn same_block(&self, a: &BlockType, b: &BlockType) -> bool {
        let checker = |block: &BlockType| matches!(block, BlockType::DIRT | BlockType::WOOD);
        a == b || (checker(a) && checker(b))
    }
}

/// Looks up a theme by its configuration name.
pub fn theme_by_name(name: &str) -> Option<Arc<dyn WorldTheme>> {
    match name {
        "layered" => Some(Arc::new(LayeredTheme::default())),
        "stone" => Some(Arc::new(StoneTheme)),
        "caverns" => Some(Arc::new(CavernTheme::default())),
        "checkerboard" => Some(Arc::new(CheckerboardTheme)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(height: i32) -> TerrainSample {
        TerrainSample {
            height,
            density: 0.0,
        }
    }

    #[test]
    fn test_layered_columns() {
        let theme = LayeredTheme::default();
        let at = |y| theme.classify_block(Point3::new(0, y, 0), sample(5));
        assert_eq!(at(6), BlockType::AIR);
        assert_eq!(at(5), BlockType::GRASS);
        assert_eq!(at(4), BlockType::DIRT);
        assert_eq!(at(2), BlockType::DIRT);
        assert_eq!(at(1), BlockType::STONE);

        let low = |y| theme.classify_block(Point3::new(0, y, 0), sample(-8));
        assert_eq!(low(-4), BlockType::WATER);
        assert_eq!(low(-3), BlockType::AIR);
        assert_eq!(low(-8), BlockType::SAND);
    }

    #[test]
    fn test_stone_theme_includes_surface() {
        let theme = StoneTheme;
        assert_eq!(theme.classify_block(Point3::new(0, 0, 0), sample(0)), BlockType::STONE);
        assert_eq!(theme.classify_block(Point3::new(0, 1, 0), sample(0)), BlockType::AIR);
    }

    #[test]
    fn test_caverns_carve_below_surface_only() {
        let theme = CavernTheme::default();
        let dense = TerrainSample {
            height: 10,
            density: 0.9,
        };
        assert_eq!(theme.classify_block(Point3::new(0, 0, 0), dense), BlockType::AIR);
        assert_eq!(theme.classify_block(Point3::new(0, 10, 0), dense), BlockType::GRASS);
    }

    #[test]
    fn test_checker_blocks_compare_equal() {
        let theme = CheckerboardTheme;
        assert!(theme.same_block(&BlockType::DIRT, &BlockType::WOOD));
        assert!(!theme.same_block(&BlockType::DIRT, &BlockType::STONE));
        assert!(!StoneTheme.same_block(&BlockType::DIRT, &BlockType::WOOD));
    }

    #[test]
    fn test_theme_lookup() {
        for name in ["layered", "stone", "caverns", "checkerboard"] {
            assert_eq!(theme_by_name(name).map(|t| t.name()), Some(name));
        }
        assert!(theme_by_name("lava").is_none());
    }
}
