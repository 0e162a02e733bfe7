//! World session: chunk streaming around a walking player.
//!
//! Owns the shared [`ChunkManager`], the player position and the background
//! eviction worker.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use survival_common::{ChunkCoord, WorldCoord};
use survival_world::{ChunkManager, SpawnPoint, TerrainKind, WorldGenerator};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{SurvivalError, SurvivalResult};

/// Unit steps for east, south, west, north.
const HEADINGS: [(f32, f32); 4] = [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)];

/// Ticks walked in one direction before turning.
const TICKS_PER_LEG: u32 = 120;

/// Tile counts per terrain kind, indexed by kind id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerrainHistogram {
    counts: [usize; TerrainKind::ALL.len()],
}

impl TerrainHistogram {
    /// Counts one tile.
    pub fn record(&mut self, kind: TerrainKind) {
        self.counts[kind.id() as usize] += 1;
    }

    /// Number of tiles of a kind.
    #[must_use]
    pub fn count(&self, kind: TerrainKind) -> usize {
        self.counts[kind.id() as usize]
    }

    /// Total tiles counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Kinds with a non-zero count, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (TerrainKind, usize)> + '_ {
        TerrainKind::ALL
            .into_iter()
            .map(|kind| (kind, self.count(kind)))
            .filter(|(_, count)| *count > 0)
    }
}

/// Background thread evicting idle chunks on a fixed interval.
#[derive(Debug)]
pub struct EvictionWorker {
    stop: Sender<()>,
    handle: JoinHandle<()>,
    evicted: Arc<AtomicUsize>,
}

impl EvictionWorker {
    /// Starts sweeping `manager` every `interval`.
    pub fn spawn(manager: Arc<ChunkManager>, interval: Duration) -> SurvivalResult<Self> {
        let (stop, stopped) = mpsc::channel::<()>();
        let evicted = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&evicted);

        let handle = std::thread::Builder::new()
            .name("chunk-eviction".into())
            .spawn(move || loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let unloaded = manager.unload_inactive_chunks();
                        counter.fetch_add(unloaded, Ordering::Relaxed);
                    },
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .map_err(|source| SurvivalError::Spawn {
                name: "chunk-eviction",
                source,
            })?;

        debug!("Eviction worker started, interval {interval:?}");
        Ok(Self {
            stop,
            handle,
            evicted,
        })
    }

    /// Chunks evicted so far.
    #[must_use]
    pub fn evicted(&self) -> usize {
        self.evicted.load(Ordering::Relaxed)
    }

    /// Stops the worker and returns the total number of chunks it evicted.
    pub fn shutdown(self) -> SurvivalResult<usize> {
        // A send error means the worker already exited.
        let _ = self.stop.send(());
        self.handle
            .join()
            .map_err(|_| SurvivalError::WorkerPanicked("chunk-eviction"))?;
        Ok(self.evicted.load(Ordering::Relaxed))
    }
}

/// The streamed world and the player walking through it.
#[derive(Debug)]
pub struct WorldSession {
    manager: Arc<ChunkManager>,
    spawn: SpawnPoint,
    position: (f32, f32),
    heading: usize,
    ticks_on_leg: u32,
    walk_speed: f32,
}

impl WorldSession {
    /// Builds the world from engine config and places the player at spawn.
    pub fn new(seed: u64, config: &EngineConfig) -> SurvivalResult<Self> {
        let generator = WorldGenerator::new(seed, config.generation);
        let manager = Arc::new(ChunkManager::with_generator(generator, config.streaming())?);

        let spawn = manager.find_spawn_point();
        if spawn.is_origin() {
            info!("Spawning at world origin");
        } else {
            info!("Spawning at ({}, {})", spawn.x, spawn.y);
        }

        // centre of the spawn tile
        let (tile_x, tile_y) = spawn.tile_coords();
        Ok(Self {
            manager,
            spawn,
            position: (tile_x as f32 + 0.5, tile_y as f32 + 0.5),
            heading: 0,
            ticks_on_leg: 0,
            walk_speed: config.walk_speed,
        })
    }

    /// Shared chunk manager.
    #[must_use]
    pub fn manager(&self) -> &Arc<ChunkManager> {
        &self.manager
    }

    /// Spawn point chosen at startup.
    #[must_use]
    pub const fn spawn(&self) -> SpawnPoint {
        self.spawn
    }

    /// Current player position in tiles.
    #[must_use]
    pub const fn position(&self) -> (f32, f32) {
        self.position
    }

    /// Loads chunks around spawn on a worker thread and waits for it.
    pub fn preload(&self, radius: u32) -> SurvivalResult<usize> {
        let handle = self
            .manager
            .preload_chunks_async(self.spawn.x, self.spawn.y, radius)
            .map_err(|source| SurvivalError::Spawn {
                name: "chunk-preload",
                source,
            })?;
        let visited = handle
            .join()
            .map_err(|_| SurvivalError::WorkerPanicked("chunk-preload"))?;
        info!(
            "Preloaded {visited} chunks around spawn, {} loaded",
            self.manager.loaded_chunk_count()
        );
        Ok(visited)
    }

    /// Advances the player one tick and streams chunks around them.
    ///
    /// The player walks in fixed-length legs, turning clockwise at the end
    /// of each leg or when the next tile is not walkable.
    pub fn tick(&mut self) {
        if self.ticks_on_leg >= TICKS_PER_LEG {
            self.turn();
        }

        for _ in 0..HEADINGS.len() {
            let (dx, dy) = HEADINGS[self.heading];
            let next = (
                self.position.0 + dx * self.walk_speed,
                self.position.1 + dy * self.walk_speed,
            );
            if self.is_walkable(next) {
                self.position = next;
                break;
            }
            self.turn();
        }
        self.ticks_on_leg += 1;

        self.manager
            .load_chunks_around_position(self.position.0, self.position.1);
    }

    fn turn(&mut self) {
        self.heading = (self.heading + 1) % HEADINGS.len();
        self.ticks_on_leg = 0;
    }

    fn is_walkable(&self, (x, y): (f32, f32)) -> bool {
        self.manager
            .get_tile(x.floor() as i32, y.floor() as i32)
            .is_some_and(|tile| tile.is_walkable())
    }

    /// Counts the tiles of resident chunks within `radius` chunks of spawn.
    #[must_use]
    pub fn spawn_area_histogram(&self, radius: u32) -> TerrainHistogram {
        let center = WorldCoord::new(self.spawn.x as i32, self.spawn.y as i32)
            .to_chunk_coord(self.manager.chunk_size());
        let radius = radius.min(i32::MAX as u32) as i32;
        let min = ChunkCoord::new(center.x.saturating_sub(radius), center.y.saturating_sub(radius));
        let max = ChunkCoord::new(center.x.saturating_add(radius), center.y.saturating_add(radius));

        let mut histogram = TerrainHistogram::default();
        for chunk in self.manager.loaded_chunks_in_area(min, max) {
            for tile in chunk.tiles() {
                histogram.record(tile.kind);
            }
        }
        if histogram.total() == 0 {
            warn!("No resident chunks around spawn");
        }
        histogram
    }
}
