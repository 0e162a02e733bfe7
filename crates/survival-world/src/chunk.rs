//! Chunk data structure.

use std::time::Instant;

use parking_lot::Mutex;
use survival_common::{ChunkCoord, LocalCoord, WorldCoord};

use crate::tile::Tile;

/// Default chunk side length in tiles.
pub const DEFAULT_CHUNK_SIZE: u32 = 32;

/// A square page of the world holding `size × size` tiles.
///
/// Cells hold `None` until the chunk is generated, and cells past the edge of
/// the `i32` world grid stay `None` after. Tile access is bounds
/// checked: reads outside the chunk return `None` and writes are ignored.
/// Every read or write bumps the last-accessed timestamp.
#[derive(Debug)]
pub struct Chunk {
    /// Chunk coordinate
    coord: ChunkCoord,
    /// Chunk size (width and height in tiles)
    size: u32,
    /// Tile data, row-major
    tiles: Vec<Option<Tile>>,
    /// Whether the generator has populated this chunk
    generated: bool,
    /// Last read or write, used for idle eviction
    last_accessed: Mutex<Instant>,
}

impl Chunk {
    /// Creates a new empty chunk.
    #[must_use]
    pub fn new(coord: ChunkCoord, size: u32) -> Self {
        let tile_count = (size as usize) * (size as usize);
        Self {
            coord,
            size,
            tiles: vec![None; tile_count],
            generated: false,
            last_accessed: Mutex::new(Instant::now()),
        }
    }

    /// Returns the chunk coordinate.
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Returns the chunk size.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Returns the world coordinate of the top-left tile.
    #[must_use]
    pub const fn origin(&self) -> WorldCoord {
        self.coord.to_world_coord(self.size)
    }

    /// Whether the chunk has been generated.
    #[must_use]
    pub const fn is_generated(&self) -> bool {
        self.generated
    }

    pub(crate) fn mark_generated(&mut self) {
        self.generated = true;
    }

    /// When the chunk was last read or written.
    #[must_use]
    pub fn last_accessed(&self) -> Instant {
        *self.last_accessed.lock()
    }

    /// Marks the chunk as accessed now.
    pub fn touch(&self) {
        *self.last_accessed.lock() = Instant::now();
    }

    /// Whether the chunk has gone unaccessed for longer than `idle` as of `now`.
    #[must_use]
    pub fn is_idle(&self, now: Instant, idle: std::time::Duration) -> bool {
        now.saturating_duration_since(self.last_accessed()) > idle
    }

    fn index(&self, local_x: i32, local_y: i32) -> Option<usize> {
        if local_x < 0 || local_y < 0 {
            return None;
        }
        let local = LocalCoord::new(local_x as u32, local_y as u32);
        local.in_bounds(self.size).then(|| local.to_index(self.size))
    }

    /// Gets the tile at local coordinates.
    ///
    /// Returns `None` when out of range or not yet generated.
    #[must_use]
    pub fn get_tile(&self, local_x: i32, local_y: i32) -> Option<Tile> {
        let index = self.index(local_x, local_y)?;
        self.touch();
        self.tiles[index]
    }

    /// Sets the tile at local coordinates. Out-of-range writes are ignored.
    pub fn set_tile(&mut self, local_x: i32, local_y: i32, tile: Tile) {
        let Some(index) = self.index(local_x, local_y) else {
            return;
        };
        self.tiles[index] = Some(tile);
        self.touch();
    }

    /// Mutable access to a populated tile.
    pub(crate) fn tile_mut(&mut self, local_x: i32, local_y: i32) -> Option<&mut Tile> {
        let index = self.index(local_x, local_y)?;
        self.touch();
        self.tiles[index].as_mut()
    }

    /// Gets a tile by world coordinate if it lies inside this chunk.
    #[must_use]
    pub fn tile_at_world(&self, world_x: i32, world_y: i32) -> Option<Tile> {
        let world = WorldCoord::new(world_x, world_y);
        if world.to_chunk_coord(self.size) != self.coord {
            return None;
        }
        let local = world.to_local_coord(self.size);
        self.get_tile(local.x as i32, local.y as i32)
    }

    /// Iterates over populated tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().flatten()
    }

    /// Number of tile slots (always `size²`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the chunk has no tile slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
