//! Procedural world generation.
//!
//! Three independent noise channels (elevation, moisture, temperature) are
//! sampled per tile and classified into a terrain kind. After a chunk is
//! filled, a structure pass seeded from the chunk position may drop ruins on
//! walkable tiles. Everything is reproducible from the world seed and config.

use serde::{Deserialize, Serialize};
use survival_common::{LocalCoord, WorldCoord};
use tracing::{debug, info, trace, warn};

use crate::chunk::Chunk;
use crate::noise::CoherentNoise;
use crate::terrain::TerrainKind;
use crate::tile::Tile;

/// Seed offset of the moisture channel.
const MOISTURE_SEED_OFFSET: u64 = 1000;
/// Seed offset of the temperature channel.
const TEMPERATURE_SEED_OFFSET: u64 = 2000;

/// Temperature loss per tile of distance from the equator (y = 0).
const LATITUDE_FACTOR: f64 = 0.0001;
/// Fraction of temperature lost at maximum elevation.
const ALTITUDE_COOLING: f64 = 0.5;

/// Chance that a chunk contains ruins.
const RUINS_CHANCE: f64 = 0.05;
/// Maximum ruin tiles placed in one chunk.
const MAX_RUINS_PER_CHUNK: u32 = 3;

/// Rings searched by [`WorldGenerator::find_valid_spawn_point`].
const SPAWN_SEARCH_RADIUS: i32 = 100;
/// Angular step of the spawn search, in degrees.
const SPAWN_SEARCH_ANGLE_STEP: usize = 10;

/// Parameters of one noise channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseChannelConfig {
    /// Number of fractal octaves
    pub octaves: u32,
    /// Amplitude multiplier per octave
    pub persistence: f64,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
    /// World-to-noise coordinate scale (smaller = larger features)
    pub scale: f64,
    /// Added to the normalized sample before clamping to [0, 1]
    pub offset: f64,
}

impl NoiseChannelConfig {
    /// Creates a channel config with zero offset.
    #[must_use]
    pub const fn new(octaves: u32, persistence: f64, lacunarity: f64, scale: f64) -> Self {
        Self {
            octaves,
            persistence,
            lacunarity,
            scale,
            offset: 0.0,
        }
    }

    /// Returns a copy with the given offset.
    #[must_use]
    pub const fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }
}

impl Default for NoiseChannelConfig {
    fn default() -> Self {
        Self::new(4, 0.5, 2.0, 0.02)
    }
}

/// World generation parameters for the three noise channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldGenerationConfig {
    /// Elevation channel
    pub elevation: NoiseChannelConfig,
    /// Moisture channel
    pub moisture: NoiseChannelConfig,
    /// Temperature channel
    pub temperature: NoiseChannelConfig,
}

impl Default for WorldGenerationConfig {
    fn default() -> Self {
        Self {
            elevation: NoiseChannelConfig::new(4, 0.5, 2.0, 0.02),
            moisture: NoiseChannelConfig::new(3, 0.5, 2.0, 0.03),
            temperature: NoiseChannelConfig::new(2, 0.5, 2.0, 0.025),
        }
    }
}

/// A spawn location in world tile coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// X position
    pub x: f32,
    /// Y position
    pub y: f32,
}

impl SpawnPoint {
    /// The world origin, used when no valid spawn is found.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Whether this is the origin fallback.
    #[must_use]
    pub fn is_origin(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// The tile containing this point.
    #[must_use]
    pub fn tile_coords(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

/// Procedural world generator.
///
/// Stateless with respect to chunks: it only writes into the chunk it is
/// handed and never keeps it.
#[derive(Debug, Clone)]
pub struct WorldGenerator {
    /// World seed
    seed: u64,
    /// Generation parameters
    config: WorldGenerationConfig,
    /// Elevation noise (seed)
    elevation_noise: CoherentNoise,
    /// Moisture noise (seed + 1000)
    moisture_noise: CoherentNoise,
    /// Temperature noise (seed + 2000)
    temperature_noise: CoherentNoise,
}

impl WorldGenerator {
    /// Creates a new generator with the given seed and config.
    #[must_use]
    pub fn new(seed: u64, config: WorldGenerationConfig) -> Self {
        info!("Creating world generator with seed={seed}");
        Self {
            seed,
            config,
            elevation_noise: CoherentNoise::new(seed),
            moisture_noise: CoherentNoise::new(seed.wrapping_add(MOISTURE_SEED_OFFSET)),
            temperature_noise: CoherentNoise::new(seed.wrapping_add(TEMPERATURE_SEED_OFFSET)),
        }
    }

    /// Creates a generator with default config.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::new(seed, WorldGenerationConfig::default())
    }

    /// Returns the world seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the generator configuration.
    #[must_use]
    pub const fn config(&self) -> &WorldGenerationConfig {
        &self.config
    }

    fn sample_channel(
        noise: &CoherentNoise,
        channel: &NoiseChannelConfig,
        world_x: i32,
        world_y: i32,
    ) -> f64 {
        let raw = noise.sample_normalized(
            f64::from(world_x) * channel.scale,
            f64::from(world_y) * channel.scale,
            channel.octaves,
            channel.persistence,
            channel.lacunarity,
        );
        (raw + channel.offset).clamp(0.0, 1.0)
    }

    /// Generates the tile at the given world coordinates.
    ///
    /// Pure: the same seed, config and coordinates always give the same tile.
    #[must_use]
    pub fn generate_tile(&self, world_x: i32, world_y: i32) -> Tile {
        let elevation = Self::sample_channel(
            &self.elevation_noise,
            &self.config.elevation,
            world_x,
            world_y,
        );
        let moisture = Self::sample_channel(
            &self.moisture_noise,
            &self.config.moisture,
            world_x,
            world_y,
        );
        let base_temperature = Self::sample_channel(
            &self.temperature_noise,
            &self.config.temperature,
            world_x,
            world_y,
        );

        // Colder away from the equator and higher up
        let latitude_effect = 1.0 - (f64::from(world_y) * LATITUDE_FACTOR).abs();
        let elevation_effect = 1.0 - elevation * ALTITUDE_COOLING;
        let temperature = base_temperature * latitude_effect * elevation_effect;

        Tile::from_climate(
            world_x,
            world_y,
            elevation as f32,
            moisture as f32,
            temperature as f32,
        )
    }

    /// Fills every tile of `chunk` and runs the structure pass.
    ///
    /// Does nothing if the chunk is already generated.
    pub fn generate_chunk(&self, chunk: &mut Chunk) {
        if chunk.is_generated() {
            return;
        }

        let coord = chunk.coord();
        let size = chunk.size();
        for local_y in 0..size {
            for local_x in 0..size {
                let local = LocalCoord::new(local_x, local_y);
                // cells past the edge of the i32 grid stay empty
                let Some(world) = WorldCoord::checked_from_parts(coord, local, size) else {
                    continue;
                };
                let tile = self.generate_tile(world.x, world.y);
                chunk.set_tile(local_x as i32, local_y as i32, tile);
            }
        }

        self.place_ruins(chunk);
        chunk.mark_generated();

        debug!("Generated chunk {}", chunk.coord());
    }

    /// Seed of the structure pass for one chunk.
    ///
    /// `17, ×31` accumulator over `(chunk_x, chunk_y, seed)` with wrapping
    /// 32-bit arithmetic; the world seed contributes its low 32 bits.
    #[must_use]
    pub fn chunk_seed(&self, chunk_x: i32, chunk_y: i32) -> i32 {
        let mut hash: i32 = 17;
        hash = hash.wrapping_mul(31).wrapping_add(chunk_x);
        hash = hash.wrapping_mul(31).wrapping_add(chunk_y);
        hash = hash.wrapping_mul(31).wrapping_add(self.seed as i32);
        hash
    }

    /// Overlays 1-3 ruin tiles on walkable land in 5% of chunks.
    fn place_ruins(&self, chunk: &mut Chunk) {
        let coord = chunk.coord();
        // fresh per chunk so generation order never matters
        let mut rng = fastrand::Rng::with_seed(self.chunk_seed(coord.x, coord.y) as u64);

        if rng.f64() > RUINS_CHANCE {
            return;
        }

        let size = chunk.size() as i32;
        if size == 0 {
            return;
        }
        let count = rng.u32(1..=MAX_RUINS_PER_CHUNK);
        for _ in 0..count {
            let local_x = rng.i32(0..size);
            let local_y = rng.i32(0..size);
            if let Some(tile) = chunk.tile_mut(local_x, local_y) {
                if tile.is_walkable() {
                    tile.kind = TerrainKind::Ruins;
                    trace!("Ruins at ({}, {}) in chunk {coord}", tile.x, tile.y);
                }
            }
        }
    }

    /// Searches outward from the origin for a walkable, dry tile.
    ///
    /// Rings of radius 0..100 are sampled every 10°. Falls back to the
    /// origin if nothing qualifies.
    #[must_use]
    pub fn find_valid_spawn_point(&self) -> SpawnPoint {
        for radius in 0..SPAWN_SEARCH_RADIUS {
            for angle in (0..360).step_by(SPAWN_SEARCH_ANGLE_STEP) {
                let radians = (angle as f32).to_radians();
                let x = radius as f32 * radians.cos();
                let y = radius as f32 * radians.sin();

                let tile = self.generate_tile(x as i32, y as i32);
                if tile.is_walkable() && tile.kind != TerrainKind::ShallowWater {
                    info!("Spawn point found at ({x:.1}, {y:.1}) on {:?}", tile.kind);
                    return SpawnPoint { x, y };
                }
            }
        }

        warn!("No valid spawn point within {SPAWN_SEARCH_RADIUS} tiles, using origin");
        SpawnPoint::ORIGIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survival_common::ChunkCoord;

    /// Regression fixtures for seed 12345 with the default config.
    const GOLDEN_TILES: &[(i32, i32, f32, f32, f32, TerrainKind)] = &[
        (17, -42, 0.306_044_52, 0.454_579_32, 0.422_281_38, TerrainKind::Grass),
        (-1000, 333, 0.430_366_07, 0.508_520_07, 0.426_057_96, TerrainKind::SparseForest),
        (250, 1000, 0.5, 0.357_142_87, 0.269_604_5, TerrainKind::Dirt),
        (-77, -1234, 0.404_959_47, 0.654_748_14, 0.276_483_36, TerrainKind::Grass),
        (31, 31, 0.559_990_9, 0.526_470_84, 0.451_410_83, TerrainKind::SparseForest),
        (-64, 96, 0.337_483_64, 0.474_778_77, 0.488_846_66, TerrainKind::Grass),
        // far from the equator the latitude term goes negative
        (5000, -20000, 0.5, 0.5, -0.375, TerrainKind::Grass),
    ];

    fn bits(tile: &Tile) -> (TerrainKind, u32, u32, u32) {
        (
            tile.kind,
            tile.elevation.to_bits(),
            tile.moisture.to_bits(),
            tile.temperature.to_bits(),
        )
    }

    #[test]
    fn test_generate_tile_deterministic() {
        let gen1 = WorldGenerator::with_seed(42);
        let gen2 = WorldGenerator::with_seed(42);
        for (x, y) in [(0, 0), (17, -42), (-1000, 333), (123_456, -98_765)] {
            let a = gen1.generate_tile(x, y);
            let b = gen2.generate_tile(x, y);
            assert_eq!(bits(&a), bits(&b));
            assert_eq!(bits(&a), bits(&gen1.generate_tile(x, y)));
        }
    }

    #[test]
    fn test_golden_origin_tile() {
        let generator = WorldGenerator::with_seed(12345);
        let tile = generator.generate_tile(0, 0);
        // lattice point: every channel samples exactly 0.5
        assert_eq!(tile.elevation, 0.5);
        assert_eq!(tile.moisture, 0.5);
        assert_eq!(tile.temperature, 0.375);
        assert_eq!(tile.kind, TerrainKind::Grass);
        assert_eq!((tile.x, tile.y), (0, 0));
    }

    #[test]
    fn test_golden_off_lattice_tiles() {
        let generator = WorldGenerator::with_seed(12345);
        for &(x, y, elevation, moisture, temperature, kind) in GOLDEN_TILES {
            let tile = generator.generate_tile(x, y);
            assert_eq!(
                bits(&tile),
                (kind, elevation.to_bits(), moisture.to_bits(), temperature.to_bits()),
                "tile at ({x}, {y}): {tile:?}"
            );
        }
    }

    #[test]
    fn test_different_seeds_different_terrain() {
        let gen1 = WorldGenerator::with_seed(42);
        let gen2 = WorldGenerator::with_seed(999);
        let differs = (0..64).any(|i| {
            let a = gen1.generate_tile(i * 7 + 3, i * 5 + 1);
            let b = gen2.generate_tile(i * 7 + 3, i * 5 + 1);
            a.elevation != b.elevation
        });
        assert!(differs);
    }

    #[test]
    fn test_tile_fields_in_range() {
        let generator = WorldGenerator::with_seed(7);
        for y in (-200..200).step_by(13) {
            for x in (-200..200).step_by(11) {
                let tile = generator.generate_tile(x, y);
                assert!((0.0..=1.0).contains(&tile.elevation));
                assert!((0.0..=1.0).contains(&tile.moisture));
                assert!((-1.0..=1.0).contains(&tile.temperature));
                assert!(tile.is_naturally_classified());
            }
        }
    }

    #[test]
    fn test_generate_chunk_fills_every_tile() {
        let generator = WorldGenerator::with_seed(12345);
        let mut chunk = Chunk::new(ChunkCoord::new(-2, 3), 32);
        generator.generate_chunk(&mut chunk);

        assert!(chunk.is_generated());
        assert_eq!(chunk.tiles().count(), 32 * 32);
        let tile = chunk.get_tile(5, 7).expect("generated");
        assert_eq!((tile.x, tile.y), (-64 + 5, 96 + 7));

        let fresh = generator.generate_tile(-64 + 5, 96 + 7);
        assert_eq!(tile.elevation.to_bits(), fresh.elevation.to_bits());
    }

    #[test]
    fn test_generate_chunk_skips_generated() {
        let generator = WorldGenerator::with_seed(1);
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), 8);
        chunk.mark_generated();
        generator.generate_chunk(&mut chunk);
        assert_eq!(chunk.tiles().count(), 0);
    }

    #[test]
    fn test_chunk_generation_reproducible() {
        let generator = WorldGenerator::with_seed(2024);
        for cx in -10..10 {
            let mut a = Chunk::new(ChunkCoord::new(cx, 4), 16);
            let mut b = Chunk::new(ChunkCoord::new(cx, 4), 16);
            generator.generate_chunk(&mut a);
            generator.generate_chunk(&mut b);
            let kinds_a: Vec<_> = a.tiles().map(|t| t.kind).collect();
            let kinds_b: Vec<_> = b.tiles().map(|t| t.kind).collect();
            assert_eq!(kinds_a, kinds_b);
        }
    }

    #[test]
    fn test_ruins_only_on_walkable_tiles() {
        let generator = WorldGenerator::with_seed(12345);
        let mut chunks_with_ruins = 0;
        for cy in -10..10 {
            for cx in -10..10 {
                let mut chunk = Chunk::new(ChunkCoord::new(cx, cy), 16);
                generator.generate_chunk(&mut chunk);
                let mut has_ruins = false;
                for tile in chunk.tiles() {
                    if tile.kind == TerrainKind::Ruins {
                        has_ruins = true;
                        let natural = generator.generate_tile(tile.x, tile.y);
                        assert!(natural.is_walkable());
                    } else {
                        assert!(tile.is_naturally_classified());
                    }
                }
                if has_ruins {
                    chunks_with_ruins += 1;
                }
            }
        }
        // 5% of 400 chunks, minus the odd roll landing on water
        assert!(chunks_with_ruins > 0);
        assert!(chunks_with_ruins < 80, "{chunks_with_ruins} chunks had ruins");
    }

    #[test]
    fn test_chunk_seed_hash() {
        let generator = WorldGenerator::with_seed(12345);
        let expected = ((17i32 * 31 + 2) * 31 + 3) * 31 + 12345;
        assert_eq!(generator.chunk_seed(2, 3), expected);
        // large seeds wrap instead of overflowing
        let wide = WorldGenerator::with_seed(u64::MAX);
        let _ = wide.chunk_seed(i32::MAX, i32::MIN);
    }

    #[test]
    fn test_spawn_point_is_walkable() {
        for seed in [1, 42, 12345, 987_654_321] {
            let generator = WorldGenerator::with_seed(seed);
            let spawn = generator.find_valid_spawn_point();
            let (x, y) = spawn.tile_coords();
            let tile = generator.generate_tile(x, y);
            assert!(tile.is_walkable());
            assert_ne!(tile.kind, TerrainKind::ShallowWater);
        }
    }

    #[test]
    fn test_spawn_search_leaves_flooded_origin() {
        // origin sits at 0.29: shallow water
        let config = WorldGenerationConfig {
            elevation: NoiseChannelConfig::default().with_offset(-0.21),
            ..WorldGenerationConfig::default()
        };
        let generator = WorldGenerator::new(12345, config);
        assert_eq!(generator.generate_tile(0, 0).kind, TerrainKind::ShallowWater);

        let spawn = generator.find_valid_spawn_point();
        if !spawn.is_origin() {
            let (x, y) = spawn.tile_coords();
            let tile = generator.generate_tile(x, y);
            assert!(tile.is_walkable());
            assert_ne!(tile.kind, TerrainKind::ShallowWater);
        }
    }

    #[test]
    fn test_spawn_point_falls_back_to_origin() {
        // elevation pinned to 1.0 everywhere: snow peaks only
        let config = WorldGenerationConfig {
            elevation: NoiseChannelConfig::default().with_offset(1.0),
            ..WorldGenerationConfig::default()
        };
        let generator = WorldGenerator::new(5, config);
        assert_eq!(generator.generate_tile(10, 10).kind, TerrainKind::SnowPeak);
        let spawn = generator.find_valid_spawn_point();
        assert!(spawn.is_origin());
    }

    #[test]
    fn test_zero_octaves_does_not_crash() {
        let config = WorldGenerationConfig {
            elevation: NoiseChannelConfig::new(0, 0.5, 2.0, 0.02),
            moisture: NoiseChannelConfig::new(0, 0.5, 2.0, 0.03),
            temperature: NoiseChannelConfig::new(0, 0.5, 2.0, 0.025),
        };
        let generator = WorldGenerator::new(9, config);
        let tile = generator.generate_tile(123, 456);
        assert_eq!(tile.elevation, 0.5);
        assert_eq!(tile.moisture, 0.5);
    }

    #[test]
    fn test_config_clone_is_independent() {
        let config = WorldGenerationConfig::default();
        let mut copy = config;
        copy.elevation.octaves = 8;
        assert_eq!(config.elevation.octaves, 4);
        assert_eq!(config.moisture.octaves, 3);
        assert_eq!(config.temperature.octaves, 2);
    }
}
