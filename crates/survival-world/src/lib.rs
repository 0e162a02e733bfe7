//! # Survival World
//!
//! The procedural world of Tiny Survival World.
//!
//! This crate handles:
//! - Deterministic coherent noise
//! - Terrain classification and per-terrain gameplay properties
//! - Seeded world generation and spawn search
//! - Chunk storage, on-demand streaming and idle eviction

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod chunk;
pub mod definitions;
pub mod generation;
pub mod noise;
pub mod streaming;
pub mod terrain;
pub mod tile;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::chunk::*;
    pub use crate::definitions::{get_properties, TerrainProperties};
    pub use crate::generation::*;
    pub use crate::noise::CoherentNoise;
    pub use crate::streaming::*;
    pub use crate::terrain::{classify, TerrainKind};
    pub use crate::tile::*;
}

pub use prelude::*;
