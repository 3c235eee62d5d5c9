//! # Engine Configuration
//!
//! The configuration surface consumed by [`EngineState`](crate::EngineState):
//! chunk extent, view radii, noise parameters, batch sizes and worker count.
//! Every field has a default so a partial JSON document is enough.
//!
//! ```json
//! { "load_radius": 4, "draw_radius": 3, "noise": { "seed": 7 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, EngineError};

/// Parameters for the layered noise used by the terrain generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Seed fed to every noise octave.
    pub seed: u32,
    /// Number of octaves summed. Zero yields a flat world at height 0.
    pub octaves: u32,
    /// Amplitude multiplier applied per octave.
    pub persistence: f64,
    /// Frequency multiplier applied per octave.
    pub lacunarity: f64,
    /// Base frequency in noise units per block.
    pub scale: f64,
    /// Total height range `H`; sampled heights are clamped to `[-H/2, H/2]`.
    pub height_range: i32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            scale: 0.01,
            height_range: 32,
        }
    }
}

/// Top-level configuration for the streaming pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Chunk size in blocks along x, y and z.
    pub chunk_extent: [i32; 3],
    /// Radius in chunks of the cube kept in the chunk store.
    pub load_radius: i32,
    /// Radius in chunks of the cube that gets meshed.
    pub draw_radius: i32,
    /// Terrain noise parameters.
    pub noise: NoiseConfig,
    /// Coordinates launched per data scheduler step.
    pub data_batch_size: usize,
    /// Coordinates launched per mesh scheduler step.
    pub mesh_batch_size: usize,
    /// Worker threads per scheduler.
    pub num_workers: usize,
    /// Name of the world theme, see [`theme_by_name`](crate::engine_state::voxels::generation::theme_by_name).
    pub theme: String,
    /// Upper bound on live meshes held by the presentation layer.
    pub max_presented_meshes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_extent: [16, 16, 16],
            load_radius: 3,
            draw_radius: 2,
            noise: NoiseConfig::default(),
            data_batch_size: 16,
            mesh_batch_size: 8,
            num_workers: 4,
            theme: "layered".to_string(),
            max_presented_meshes: 4096,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Checks the invariants the pipeline relies on.
    ///
    /// The load radius must exceed the draw radius by at least one so that every
    /// chunk eligible for meshing has its six face-neighbors inside the load cube.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.chunk_extent.iter().any(|&e| e <= 0) {
            return Err(EngineError::InvalidConfig(format!(
                "chunk extent must be positive, got {:?}",
                self.chunk_extent
            )));
        }
        let cells: u64 = self.chunk_extent.iter().map(|&e| e as u64).product();
        if cells > u64::from(u32::MAX) {
            return Err(EngineError::InvalidConfig(format!(
                "chunk extent {:?} holds {} cells, more than a run count can address",
                self.chunk_extent, cells
            )));
        }
        if self.draw_radius < 0 {
            return Err(EngineError::InvalidConfig(format!(
                "draw radius must be non-negative, got {}",
                self.draw_radius
            )));
        }
        if self.load_radius < self.draw_radius + 1 {
            return Err(EngineError::InvalidConfig(format!(
                "load radius {} must be at least draw radius {} + 1",
                self.load_radius, self.draw_radius
            )));
        }
        if self.data_batch_size == 0 || self.mesh_batch_size == 0 {
            return Err(EngineError::InvalidConfig(
                "batch sizes must be non-zero".to_string(),
            ));
        }
        if self.num_workers == 0 {
            return Err(EngineError::InvalidConfig(
                "at least one worker is required".to_string(),
            ));
        }
        if self.noise.height_range <= 0 {
            return Err(EngineError::InvalidConfig(format!(
                "height range must be positive, got {}",
                self.noise.height_range
            )));
        }
        Ok(())
    }

    /// Number of cells in one chunk.
    pub fn cells_per_chunk(&self) -> usize {
        self.chunk_extent.iter().map(|&e| e as usize).product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert_eq!(EngineConfig::default().cells_per_chunk(), 4096);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            EngineConfig::from_json_str(r#"{ "load_radius": 5, "noise": { "seed": 9 } }"#)
                .expect("valid config");
        assert_eq!(config.load_radius, 5);
        assert_eq!(config.draw_radius, 2);
        assert_eq!(config.noise.seed, 9);
        assert_eq!(config.noise.octaves, 4);
    }

    #[test]
    fn test_load_radius_must_cover_draw_neighbors() {
        let result = EngineConfig::from_json_str(r#"{ "load_radius": 2, "draw_radius": 2 }"#);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid(EngineError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn test_zero_extent_rejected() {
        let config = EngineConfig {
            chunk_extent: [16, 0, 16],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_extent_rejected() {
        let config = EngineConfig {
            chunk_extent: [65536, 65536, 1],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));

        let largest = EngineConfig {
            chunk_extent: [65536, 65535, 1],
            ..Default::default()
        };
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result = EngineConfig::from_json_str("{ load_radius: ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = EngineConfig::from_path("/definitely/not/here.json");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
