//! # Terrain Generator
//!
//! A deterministic height and density field built from layered Perlin noise.
//! Every sample is a pure function of the seed, the noise parameters and the
//! integer world position, so any chunk can be regenerated identically on any
//! worker thread.

use noise::{NoiseFn, Perlin};

use crate::config::NoiseConfig;

/// Fractal noise sampler shared read-only by every generation task.
#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    /// The base noise function; each octave samples it at a higher frequency.
    perlin: Perlin,
    /// Number of octaves summed.
    octaves: u32,
    /// Amplitude multiplier per octave.
    persistence: f64,
    /// Frequency multiplier per octave.
    lacunarity: f64,
    /// Base frequency in noise units per block.
    scale: f64,
    /// Half of the height range; heights are clamped to `[-half, half]`.
    half_range: i32,
    /// Constant added to the noise term before clamping.
    base_height: i32,
}

impl TerrainGenerator {
    /// Creates a generator from noise parameters.
    pub fn new(config: &NoiseConfig) -> Self {
        TerrainGenerator {
            perlin: Perlin::new(config.seed),
            octaves: config.octaves,
            persistence: config.persistence,
            lacunarity: config.lacunarity,
            scale: config.scale,
            half_range: config.height_range / 2,
            base_height: 0,
        }
    }

    /// Creates a generator whose height is `height` everywhere.
    pub fn flat(height: i32) -> Self {
        TerrainGenerator {
            perlin: Perlin::new(0),
            octaves: 0,
            persistence: 0.5,
            lacunarity: 2.0,
            scale: 1.0,
            half_range: height.abs(),
            base_height: height,
        }
    }

    /// Surface height of the column at world `(x, z)`.
    ///
    /// Octaves are summed with decaying amplitude and growing frequency, the sum is
    /// normalized to `[-1, 1]`, scaled to half the height range, rounded, and
    /// clamped to `[-H/2, H/2]`.
    pub fn sample_height(&self, x: i32, z: i32) -> i32 {
        let noise = self.fractal(|frequency| {
            self.perlin.get([
                x as f64 * self.scale * frequency,
                z as f64 * self.scale * frequency,
            ])
        });
        let height = self.base_height + (noise * self.half_range as f64).round() as i32;
        height.clamp(-self.half_range, self.half_range)
    }

    /// Normalized 3D density in `[-1, 1]` at a world position.
    pub fn sample_density(&self, x: i32, y: i32, z: i32) -> f64 {
        self.fractal(|frequency| {
            self.perlin.get([
                x as f64 * self.scale * frequency,
                y as f64 * self.scale * frequency,
                z as f64 * self.scale * frequency,
            ])
        })
    }

    fn fractal(&self, sample: impl Fn(f64) -> f64) -> f64 {
        if self.octaves == 0 {
            return 0.0;
        }
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut total = 0.0;
        let mut max_amplitude = 0.0;
        for _ in 0..self.octaves {
            total += sample(frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= self.persistence;
            frequency *= self.lacunarity;
        }
        (total / max_amplitude).clamp(-1.0, 1.0)
    }

    /// Half of the configured height range.
    pub fn half_range(&self) -> i32 {
        self.half_range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u32) -> NoiseConfig {
        NoiseConfig {
            seed,
            scale: 0.05,
            ..NoiseConfig::default()
        }
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let a = TerrainGenerator::new(&config(42));
        let b = TerrainGenerator::new(&config(42));
        for x in -20..20 {
            for z in -20..20 {
                assert_eq!(a.sample_height(x, z), b.sample_height(x, z));
            }
        }
        assert_eq!(a.sample_density(3, -4, 5), b.sample_density(3, -4, 5));
    }

    #[test]
    fn test_heights_stay_in_range() {
        let generator = TerrainGenerator::new(&config(7));
        let half = generator.half_range();
        assert_eq!(half, 16);
        for x in (-500..500).step_by(7) {
            for z in (-500..500).step_by(11) {
                let h = generator.sample_height(x, z);
                assert!((-half..=half).contains(&h), "height {h} at ({x}, {z})");
            }
        }
    }

    #[test]
    fn test_zero_octaves_is_flat() {
        let generator = TerrainGenerator::new(&NoiseConfig {
            octaves: 0,
            ..NoiseConfig::default()
        });
        assert_eq!(generator.sample_height(123, -77), 0);
        assert_eq!(generator.sample_density(1, 2, 3), 0.0);

        let flat = TerrainGenerator::flat(3);
        assert_eq!(flat.sample_height(-1000, 1000), 3);
    }
}
