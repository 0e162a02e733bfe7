//! Coordinate types for world, chunk, and local positions.
//!
//! World space is an unbounded integer tile grid. It is paged into square
//! chunks of `chunk_size` tiles; a local coordinate addresses a tile inside
//! its chunk and is always in `[0, chunk_size)`, including for negative world
//! coordinates (conversions floor instead of truncating toward zero).

use std::fmt;
use std::str::FromStr;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// World coordinate in tiles (global position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct WorldCoord {
    /// X coordinate in world space
    pub x: i32,
    /// Y coordinate in world space
    pub y: i32,
}

impl WorldCoord {
    /// Creates a new world coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Converts to chunk coordinate given chunk size.
    #[must_use]
    pub const fn to_chunk_coord(self, chunk_size: u32) -> ChunkCoord {
        let (x, y) = world_to_chunk(self.x, self.y, chunk_size);
        ChunkCoord { x, y }
    }

    /// Converts to local coordinate within a chunk.
    #[must_use]
    pub const fn to_local_coord(self, chunk_size: u32) -> LocalCoord {
        let (x, y) = world_to_local(self.x, self.y, chunk_size);
        LocalCoord { x, y }
    }

    /// Recomposes a world coordinate from its chunk and local parts.
    ///
    /// Saturates at the `i32` bounds; see [`Self::checked_from_parts`].
    #[must_use]
    pub const fn from_parts(chunk: ChunkCoord, local: LocalCoord, chunk_size: u32) -> Self {
        let origin = chunk.to_world_coord(chunk_size);
        Self {
            x: origin.x.saturating_add(local.x as i32),
            y: origin.y.saturating_add(local.y as i32),
        }
    }

    /// Recomposes a world coordinate, or `None` if it lies outside the `i32`
    /// grid. Only edge chunks of a non power-of-two size can reach past it.
    #[must_use]
    pub const fn checked_from_parts(
        chunk: ChunkCoord,
        local: LocalCoord,
        chunk_size: u32,
    ) -> Option<Self> {
        let size = chunk_size as i64;
        let x = chunk.x as i64 * size + local.x as i64;
        let y = chunk.y as i64 * size + local.y as i64;
        if !fits_i32(x) || !fits_i32(y) {
            return None;
        }
        Some(Self {
            x: x as i32,
            y: y as i32,
        })
    }
}

/// Chunk coordinate (identifies a chunk in the world grid).
///
/// Renders as the canonical key `"x,y"` and parses back from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct ChunkCoord {
    /// X coordinate in chunk space
    pub x: i32,
    /// Y coordinate in chunk space
    pub y: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Converts to world coordinate (top-left corner of chunk).
    #[must_use]
    pub const fn to_world_coord(self, chunk_size: u32) -> WorldCoord {
        let (x, y) = chunk_to_world(self.x, self.y, chunk_size);
        WorldCoord { x, y }
    }

    /// Returns the canonical string key for this chunk.
    #[must_use]
    pub fn key(self) -> String {
        self.to_string()
    }

    /// Chebyshev distance to another chunk, in chunks.
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for ChunkCoord {
    type Err = WorldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WorldError::InvalidChunkKey(s.to_string());
        let (x, y) = s.split_once(',').ok_or_else(invalid)?;
        let x = x.trim().parse().map_err(|_| invalid())?;
        let y = y.trim().parse().map_err(|_| invalid())?;
        Ok(Self { x, y })
    }
}

/// Local coordinate within a chunk (0 to chunk_size-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct LocalCoord {
    /// X coordinate within chunk
    pub x: u32,
    /// Y coordinate within chunk
    pub y: u32,
}

impl LocalCoord {
    /// Creates a new local coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Returns true if this coordinate lies inside a chunk of the given size.
    #[must_use]
    pub const fn in_bounds(self, chunk_size: u32) -> bool {
        self.x < chunk_size && self.y < chunk_size
    }

    /// Converts to linear index for array access.
    #[must_use]
    pub const fn to_index(self, chunk_size: u32) -> usize {
        (self.y as usize) * (chunk_size as usize) + (self.x as usize)
    }

    /// Creates from linear index.
    #[must_use]
    pub const fn from_index(index: usize, chunk_size: u32) -> Self {
        let size = chunk_size as usize;
        Self {
            x: (index % size) as u32,
            y: (index / size) as u32,
        }
    }
}

const fn fits_i32(value: i64) -> bool {
    value >= i32::MIN as i64 && value <= i32::MAX as i64
}

/// Floor division of one world axis by the chunk size.
const fn axis_to_chunk(world: i32, size: i32) -> i32 {
    if world >= 0 {
        world / size
    } else {
        (world + 1) / size - 1
    }
}

/// Position of one world axis inside its chunk, always in `[0, size)`.
const fn axis_to_local(world: i32, size: i32) -> u32 {
    if world >= 0 {
        (world % size) as u32
    } else {
        // -(world + 1) == -world - 1 without overflowing at i32::MIN
        (size - 1 - (-(world + 1) % size)) as u32
    }
}

/// Converts world tile coordinates to the coordinates of the containing chunk.
#[must_use]
pub const fn world_to_chunk(world_x: i32, world_y: i32, chunk_size: u32) -> (i32, i32) {
    let size = chunk_size as i32;
    (axis_to_chunk(world_x, size), axis_to_chunk(world_y, size))
}

/// Converts world tile coordinates to local coordinates inside their chunk.
#[must_use]
pub const fn world_to_local(world_x: i32, world_y: i32, chunk_size: u32) -> (u32, u32) {
    let size = chunk_size as i32;
    (axis_to_local(world_x, size), axis_to_local(world_y, size))
}

/// Returns the world coordinates of a chunk's top-left tile.
///
/// Saturates at the `i32` bounds for the edge chunks of a non power-of-two
/// chunk size.
#[must_use]
pub const fn chunk_to_world(chunk_x: i32, chunk_y: i32, chunk_size: u32) -> (i32, i32) {
    let size = chunk_size as i32;
    (chunk_x.saturating_mul(size), chunk_y.saturating_mul(size))
}
