//! Terrain kinds and biome classification.

use serde::{Deserialize, Serialize};

/// Biome thresholds used by [`classify`].
///
/// Elevation and moisture are in `[0, 1]`, temperature roughly in `[-1, 1]`.
pub mod thresholds {
    /// Below this elevation: deep water.
    pub const DEEP_WATER_ELEVATION: f32 = 0.15;
    /// Below this elevation: shallow water.
    pub const SHALLOW_WATER_ELEVATION: f32 = 0.30;
    /// Above this elevation: snow peak.
    pub const SNOW_PEAK_ELEVATION: f32 = 0.90;
    /// Above this elevation: mountain.
    pub const MOUNTAIN_ELEVATION: f32 = 0.80;
    /// Above this elevation: hill.
    pub const HILL_ELEVATION: f32 = 0.65;
    /// Beaches sit below this elevation.
    pub const BEACH_ELEVATION: f32 = 0.35;
    /// Swamps sit below this elevation.
    pub const SWAMP_ELEVATION: f32 = 0.40;
    /// Below this moisture the land is dry (beach, desert).
    pub const DRY_MOISTURE: f32 = 0.30;
    /// Above this moisture the land is wet (swamp, dense forest).
    pub const WET_MOISTURE: f32 = 0.70;
    /// Above this moisture forests can grow.
    pub const FOREST_MOISTURE: f32 = 0.50;
    /// Forests need at least this temperature.
    pub const FOREST_TEMPERATURE: f32 = 0.30;
    /// Below this moisture: bare dirt.
    pub const DIRT_MOISTURE: f32 = 0.40;
}

/// Discrete terrain category of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TerrainKind {
    /// Ocean or deep lake.
    DeepWater = 0,
    /// Coastal or shallow water.
    ShallowWater = 1,
    /// Beach or desert.
    Sand = 2,
    /// Plains.
    Grass = 3,
    /// Bare soil.
    Dirt = 4,
    /// Dense forest.
    Forest = 5,
    /// Sparse forest.
    SparseForest = 6,
    /// Hills.
    Hill = 7,
    /// Mountain.
    Mountain = 8,
    /// Snow-capped peak.
    SnowPeak = 9,
    /// Swamp.
    Swamp = 10,
    /// Ruined structures, placed over walkable land after classification.
    Ruins = 11,
    /// Contaminated land.
    Toxic = 12,
}

impl TerrainKind {
    /// Every terrain kind, in id order.
    pub const ALL: [Self; 13] = [
        Self::DeepWater,
        Self::ShallowWater,
        Self::Sand,
        Self::Grass,
        Self::Dirt,
        Self::Forest,
        Self::SparseForest,
        Self::Hill,
        Self::Mountain,
        Self::SnowPeak,
        Self::Swamp,
        Self::Ruins,
        Self::Toxic,
    ];

    /// Returns the raw id of this kind.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Looks up a kind by raw id.
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// Whether units can stand on this terrain.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Self::DeepWater | Self::Mountain | Self::SnowPeak)
    }

    /// Movement cost multiplier; `f32::INFINITY` when impassable.
    #[must_use]
    pub const fn movement_cost(self) -> f32 {
        match self {
            Self::ShallowWater | Self::Toxic => 1.5,
            Self::Sand | Self::Ruins => 1.2,
            Self::Grass | Self::Dirt => 1.0,
            Self::Forest => 1.3,
            Self::SparseForest => 1.1,
            Self::Hill => 1.4,
            Self::Swamp => 2.0,
            Self::DeepWater | Self::Mountain | Self::SnowPeak => f32::INFINITY,
        }
    }

    /// Whether harvestable resources can appear on this terrain.
    #[must_use]
    pub const fn can_have_resources(self) -> bool {
        matches!(
            self,
            Self::Forest | Self::SparseForest | Self::Mountain | Self::Hill | Self::Ruins
        )
    }

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::DeepWater => "Deep Water",
            Self::ShallowWater => "Shallow Water",
            Self::Sand => "Sand",
            Self::Grass => "Grass",
            Self::Dirt => "Dirt",
            Self::Forest => "Forest",
            Self::SparseForest => "Sparse Forest",
            Self::Hill => "Hill",
            Self::Mountain => "Mountain",
            Self::SnowPeak => "Snow Peak",
            Self::Swamp => "Swamp",
            Self::Ruins => "Ruins",
            Self::Toxic => "Toxic Zone",
        }
    }
}

/// Classifies terrain from elevation, moisture and temperature.
///
/// Rules are checked in order and the first match wins. Never yields
/// [`TerrainKind::Ruins`] or [`TerrainKind::Toxic`]; those are overlays.
#[must_use]
pub fn classify(elevation: f32, moisture: f32, temperature: f32) -> TerrainKind {
    use thresholds::*;

    if elevation < SHALLOW_WATER_ELEVATION {
        return if elevation < DEEP_WATER_ELEVATION {
            TerrainKind::DeepWater
        } else {
            TerrainKind::ShallowWater
        };
    }

    if elevation > MOUNTAIN_ELEVATION {
        return if elevation > SNOW_PEAK_ELEVATION {
            TerrainKind::SnowPeak
        } else {
            TerrainKind::Mountain
        };
    }

    if elevation > HILL_ELEVATION {
        return TerrainKind::Hill;
    }

    if elevation < BEACH_ELEVATION && moisture < DRY_MOISTURE {
        return TerrainKind::Sand;
    }

    if elevation < SWAMP_ELEVATION && moisture > WET_MOISTURE {
        return TerrainKind::Swamp;
    }

    if moisture > FOREST_MOISTURE && temperature > FOREST_TEMPERATURE {
        return if moisture > WET_MOISTURE {
            TerrainKind::Forest
        } else {
            TerrainKind::SparseForest
        };
    }

    if moisture < DRY_MOISTURE {
        return TerrainKind::Sand;
    }

    if moisture < DIRT_MOISTURE {
        return TerrainKind::Dirt;
    }

    TerrainKind::Grass
}
