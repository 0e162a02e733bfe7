//! World streaming and chunk management.
//!
//! The [`ChunkManager`] owns every resident chunk. Chunks are generated on
//! first request and published fully generated; idle chunks are evicted by
//! [`ChunkManager::unload_inactive_chunks`], which must be called
//! periodically to keep memory bounded.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use survival_common::{ChunkCoord, WorldCoord, WorldError, WorldResult};
use tracing::{debug, info};

use crate::chunk::{Chunk, DEFAULT_CHUNK_SIZE};
use crate::generation::{SpawnPoint, WorldGenerationConfig, WorldGenerator};
use crate::tile::Tile;

/// Largest supported chunk side length.
pub const MAX_CHUNK_SIZE: u32 = 1024;

/// Default view distance in chunks.
pub const DEFAULT_VIEW_DISTANCE: u32 = 3;

/// Default idle time before a chunk is evicted.
pub const DEFAULT_UNLOAD_DELAY: Duration = Duration::from_secs(5 * 60);

/// Chunk manager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Chunk side length in tiles
    pub chunk_size: u32,
    /// Radius, in chunks, kept resident around the reference position
    pub view_distance: u32,
    /// Idle time after which a chunk is evicted
    pub unload_delay: Duration,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            view_distance: DEFAULT_VIEW_DISTANCE,
            unload_delay: DEFAULT_UNLOAD_DELAY,
        }
    }
}

impl StreamingConfig {
    /// Checks that the chunk size is usable.
    pub fn validate(&self) -> WorldResult<()> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(WorldError::InvalidChunkSize {
                size: self.chunk_size,
                max: MAX_CHUNK_SIZE,
            });
        }
        Ok(())
    }
}

/// Materializes chunks on demand and evicts idle ones.
///
/// Safe to share across threads: lookups, get-or-create and eviction may run
/// concurrently. A chunk is generated at most once per residency.
#[derive(Debug)]
pub struct ChunkManager {
    /// Configuration
    config: StreamingConfig,
    /// Resident chunks
    chunks: DashMap<ChunkCoord, Arc<Chunk>>,
    /// World generator
    generator: WorldGenerator,
    /// Number of chunks generated so far
    generated: AtomicUsize,
}

impl ChunkManager {
    /// Creates a chunk manager for the given seed with the default
    /// generation config.
    pub fn new(seed: u64, config: StreamingConfig) -> WorldResult<Self> {
        Self::with_generator(WorldGenerator::new(seed, WorldGenerationConfig::default()), config)
    }

    /// Creates a chunk manager around an existing generator.
    pub fn with_generator(generator: WorldGenerator, config: StreamingConfig) -> WorldResult<Self> {
        config.validate()?;
        info!(
            "Creating chunk manager with chunk_size={}, view_distance={}, unload_delay={:?}",
            config.chunk_size, config.view_distance, config.unload_delay
        );
        Ok(Self {
            config,
            chunks: DashMap::new(),
            generator,
            generated: AtomicUsize::new(0),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &StreamingConfig {
        &self.config
    }

    /// Returns the world generator.
    #[must_use]
    pub const fn generator(&self) -> &WorldGenerator {
        &self.generator
    }

    /// Returns the chunk size.
    #[must_use]
    pub const fn chunk_size(&self) -> u32 {
        self.config.chunk_size
    }

    /// Returns the chunk at the given coordinate, generating it if absent.
    ///
    /// Concurrent callers for the same coordinate all receive the same chunk,
    /// generated exactly once; no caller ever sees a partially generated
    /// chunk.
    pub fn get_or_create_chunk(&self, chunk_x: i32, chunk_y: i32) -> Arc<Chunk> {
        let coord = ChunkCoord::new(chunk_x, chunk_y);

        // Fast path: shared shard lock only
        if let Some(chunk) = self.chunks.get(&coord) {
            chunk.touch();
            return Arc::clone(chunk.value());
        }

        // The entry holds the shard's write lock, so the factory runs at most
        // once per absent key.
        let chunk = self
            .chunks
            .entry(coord)
            .or_insert_with(|| {
                let mut chunk = Chunk::new(coord, self.config.chunk_size);
                self.generator.generate_chunk(&mut chunk);
                self.generated.fetch_add(1, Ordering::Relaxed);
                Arc::new(chunk)
            })
            .value()
            .clone();
        chunk.touch();
        chunk
    }

    /// Returns the tile at world coordinates, generating its chunk if needed.
    #[must_use]
    pub fn get_tile(&self, world_x: i32, world_y: i32) -> Option<Tile> {
        let world = WorldCoord::new(world_x, world_y);
        let coord = world.to_chunk_coord(self.config.chunk_size);
        let local = world.to_local_coord(self.config.chunk_size);

        let chunk = self.get_or_create_chunk(coord.x, coord.y);
        chunk.get_tile(local.x as i32, local.y as i32)
    }

    /// Ensures every chunk within the view distance of a world position is
    /// resident.
    pub fn load_chunks_around_position(&self, world_x: f32, world_y: f32) {
        self.load_chunks_in_radius(world_x, world_y, self.config.view_distance);
    }

    /// Ensures every chunk within `radius` chunks (square) of a world position
    /// is resident. Returns the number of chunks visited.
    pub fn load_chunks_in_radius(&self, world_x: f32, world_y: f32, radius: u32) -> usize {
        let center = WorldCoord::new(world_x as i32, world_y as i32)
            .to_chunk_coord(self.config.chunk_size);
        let radius = radius.min(i32::MAX as u32) as i32;

        let mut visited = 0;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                self.get_or_create_chunk(center.x.saturating_add(dx), center.y.saturating_add(dy));
                visited += 1;
            }
        }
        visited
    }

    /// Loads chunks around a position on a background thread.
    ///
    /// The handle yields the number of chunks visited.
    pub fn preload_chunks_async(
        self: &Arc<Self>,
        world_x: f32,
        world_y: f32,
        radius: u32,
    ) -> std::io::Result<JoinHandle<usize>> {
        let manager = Arc::clone(self);
        std::thread::Builder::new()
            .name("chunk-preload".into())
            .spawn(move || {
                let visited = manager.load_chunks_in_radius(world_x, world_y, radius);
                debug!("Preloaded {visited} chunks around ({world_x}, {world_y})");
                visited
            })
    }

    /// Evicts chunks idle for longer than the unload delay.
    ///
    /// Returns the number of chunks evicted.
    pub fn unload_inactive_chunks(&self) -> usize {
        self.unload_inactive_chunks_at(Instant::now())
    }

    /// Evicts chunks idle for longer than the unload delay as of `now`.
    ///
    /// Removal is per entry; a chunk touched between the scan and its removal
    /// is kept.
    pub fn unload_inactive_chunks_at(&self, now: Instant) -> usize {
        let delay = self.config.unload_delay;
        let idle: Vec<ChunkCoord> = self
            .chunks
            .iter()
            .filter(|entry| entry.value().is_idle(now, delay))
            .map(|entry| *entry.key())
            .collect();

        let unloaded = idle
            .into_iter()
            .filter(|coord| {
                self.chunks
                    .remove_if(coord, |_, chunk| chunk.is_idle(now, delay))
                    .is_some()
            })
            .count();

        if unloaded > 0 {
            debug!(
                "Unloaded {unloaded} inactive chunks, {} still loaded",
                self.chunks.len()
            );
        }
        unloaded
    }

    /// Drops every resident chunk.
    pub fn unload_all_chunks(&self) {
        let count = self.chunks.len();
        self.chunks.clear();
        info!("Unloaded all {count} chunks");
    }

    /// Returns the resident chunks inside an inclusive chunk rectangle
    /// without generating missing ones.
    #[must_use]
    pub fn loaded_chunks_in_area(&self, min: ChunkCoord, max: ChunkCoord) -> Vec<Arc<Chunk>> {
        let mut found = Vec::new();
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                if let Some(chunk) = self.chunks.get(&ChunkCoord::new(x, y)) {
                    found.push(Arc::clone(chunk.value()));
                }
            }
        }
        found
    }

    /// Finds a spawn point near the origin.
    #[must_use]
    pub fn find_spawn_point(&self) -> SpawnPoint {
        self.generator.find_valid_spawn_point()
    }

    /// Checks if a chunk is loaded.
    #[must_use]
    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Returns the number of loaded chunks.
    #[must_use]
    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Returns how many chunks have been generated since creation,
    /// including ones later evicted.
    #[must_use]
    pub fn generated_count(&self) -> usize {
        self.generated.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;

    fn manager(unload_delay: Duration) -> ChunkManager {
        let config = StreamingConfig {
            chunk_size: 16,
            view_distance: 1,
            unload_delay,
        };
        ChunkManager::new(12345, config).expect("valid config")
    }

    #[test]
    fn test_invalid_chunk_size_rejected() {
        let config = StreamingConfig {
            chunk_size: 0,
            ..StreamingConfig::default()
        };
        assert!(matches!(
            ChunkManager::new(1, config),
            Err(WorldError::InvalidChunkSize { size: 0, .. })
        ));
    }

    #[test]
    fn test_get_or_create_generates_once() {
        let manager = manager(DEFAULT_UNLOAD_DELAY);
        let a = manager.get_or_create_chunk(2, -3);
        let b = manager.get_or_create_chunk(2, -3);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.is_generated());
        assert_eq!(manager.generated_count(), 1);
        assert_eq!(manager.loaded_chunk_count(), 1);
    }

    #[test]
    fn test_concurrent_get_or_create_generates_once() {
        let manager = manager(DEFAULT_UNLOAD_DELAY);
        let threads = 16;
        let barrier = Barrier::new(threads);

        let chunks: Vec<Arc<Chunk>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        manager.get_or_create_chunk(5, 5)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("thread panicked"))
                .collect()
        });

        assert_eq!(manager.generated_count(), 1);
        for chunk in &chunks {
            assert!(chunk.is_generated());
            assert_eq!(chunk.tiles().count(), 16 * 16);
            assert!(Arc::ptr_eq(chunk, &chunks[0]));
        }
    }

    #[test]
    fn test_get_tile_matches_generator() {
        let manager = manager(DEFAULT_UNLOAD_DELAY);
        for (x, y) in [(0, 0), (-1, -1), (15, 16), (-17, 40)] {
            let tile = manager.get_tile(x, y).expect("tile");
            assert_eq!((tile.x, tile.y), (x, y));
            if tile.kind != crate::terrain::TerrainKind::Ruins {
                let fresh = manager.generator().generate_tile(x, y);
                assert_eq!(tile.kind, fresh.kind);
            }
        }
        assert!(manager.is_loaded(ChunkCoord::new(-1, -1)));
        assert!(manager.is_loaded(ChunkCoord::new(-2, 2)));
    }

    #[test]
    fn test_get_tile_at_grid_edges_with_odd_chunk_size() {
        let config = StreamingConfig {
            chunk_size: 33,
            view_distance: 1,
            unload_delay: DEFAULT_UNLOAD_DELAY,
        };
        let manager = ChunkManager::new(12345, config).expect("valid config");

        for (x, y) in [(i32::MAX, 0), (i32::MIN, 0), (0, i32::MAX), (i32::MIN, i32::MIN)] {
            let tile = manager.get_tile(x, y).expect("tile on the grid");
            assert_eq!((tile.x, tile.y), (x, y));
        }

        // the edge chunks keep only the cells that exist on the i32 grid
        let high = manager.get_or_create_chunk(i32::MAX / 33, 0);
        assert!(high.get_tile(1, 0).is_some());
        assert!(high.get_tile(2, 0).is_none());
        let low = manager.get_or_create_chunk((i32::MIN / 33) - 1, 0);
        assert!(low.get_tile(31, 0).is_some());
        assert!(low.get_tile(30, 0).is_none());

        // chunks wholly off the grid are empty rather than wrapped
        assert_eq!(manager.get_or_create_chunk(i32::MAX, 0).tiles().count(), 0);
    }

    #[test]
    fn test_load_chunks_around_position() {
        let manager = manager(DEFAULT_UNLOAD_DELAY);
        manager.load_chunks_around_position(20.0, -5.0);
        // view distance 1 around chunk (1, -1)
        assert_eq!(manager.loaded_chunk_count(), 9);
        for y in -2..=0 {
            for x in 0..=2 {
                assert!(manager.is_loaded(ChunkCoord::new(x, y)));
            }
        }
        // steady-state call does not regenerate
        manager.load_chunks_around_position(20.0, -5.0);
        assert_eq!(manager.generated_count(), 9);
    }

    #[test]
    fn test_idle_eviction() {
        let delay = Duration::from_secs(60);
        let manager = manager(delay);
        let chunk = manager.get_or_create_chunk(0, 0);
        let t0 = chunk.last_accessed();
        drop(chunk);

        let epsilon = Duration::from_millis(10);
        assert_eq!(manager.unload_inactive_chunks_at(t0 + delay - epsilon), 0);
        assert!(manager.is_loaded(ChunkCoord::new(0, 0)));

        assert_eq!(manager.unload_inactive_chunks_at(t0 + delay + epsilon), 1);
        assert!(!manager.is_loaded(ChunkCoord::new(0, 0)));

        // next request regenerates a fresh chunk
        let again = manager.get_or_create_chunk(0, 0);
        assert!(again.is_generated());
        assert_eq!(manager.generated_count(), 2);
    }

    #[test]
    fn test_eviction_keeps_recent_chunks() {
        let delay = Duration::from_secs(60);
        let manager = manager(delay);
        let old = manager.get_or_create_chunk(0, 0);
        let t0 = old.last_accessed();
        std::thread::sleep(Duration::from_millis(5));
        let recent = manager.get_or_create_chunk(1, 0);
        let t1 = recent.last_accessed();
        assert!(t1 > t0);

        // between the two deadlines: only the older chunk goes
        let now = t0 + delay + (t1 - t0) / 2;
        assert_eq!(manager.unload_inactive_chunks_at(now), 1);
        assert!(!manager.is_loaded(ChunkCoord::new(0, 0)));
        assert!(manager.is_loaded(ChunkCoord::new(1, 0)));
    }

    #[test]
    fn test_eviction_races_with_lookups() {
        let manager = manager(Duration::ZERO);
        std::thread::scope(|s| {
            s.spawn(|| {
                for i in 0..200 {
                    let _ = manager.get_tile(i % 40, -(i % 25));
                }
            });
            s.spawn(|| {
                for _ in 0..200 {
                    let _ = manager.unload_inactive_chunks();
                }
            });
        });
        // every chunk still resident is whole
        for chunk in manager.loaded_chunks_in_area(ChunkCoord::new(-5, -5), ChunkCoord::new(5, 5)) {
            assert!(chunk.is_generated());
            assert_eq!(chunk.tiles().count(), 16 * 16);
        }
    }

    #[test]
    fn test_unload_all() {
        let manager = manager(DEFAULT_UNLOAD_DELAY);
        manager.load_chunks_around_position(0.0, 0.0);
        assert!(manager.loaded_chunk_count() > 0);
        manager.unload_all_chunks();
        assert_eq!(manager.loaded_chunk_count(), 0);
    }

    #[test]
    fn test_loaded_chunks_in_area_does_not_generate() {
        let manager = manager(DEFAULT_UNLOAD_DELAY);
        manager.get_or_create_chunk(0, 0);
        manager.get_or_create_chunk(3, 3);
        let found = manager.loaded_chunks_in_area(ChunkCoord::new(-1, -1), ChunkCoord::new(1, 1));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].coord(), ChunkCoord::new(0, 0));
        assert_eq!(manager.generated_count(), 2);
    }

    #[test]
    fn test_preload_async() {
        let manager = Arc::new(manager(DEFAULT_UNLOAD_DELAY));
        let handle = manager
            .preload_chunks_async(0.0, 0.0, 2)
            .expect("spawn preload thread");
        let visited = handle.join().expect("preload panicked");
        assert_eq!(visited, 25);
        assert_eq!(manager.loaded_chunk_count(), 25);
    }

    #[test]
    fn test_find_spawn_point_delegates() {
        let manager = manager(DEFAULT_UNLOAD_DELAY);
        assert_eq!(
            manager.find_spawn_point(),
            manager.generator().find_valid_spawn_point()
        );
    }
}
