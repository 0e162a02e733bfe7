//! Single-tile terrain state.

use serde::{Deserialize, Serialize};

use crate::definitions::{self, TerrainProperties};
use crate::terrain::{self, TerrainKind};

/// One grid cell of the world.
///
/// `kind` is derived from the three climate fields by [`terrain::classify`],
/// except for overlay kinds placed after classification (ruins).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Terrain kind
    pub kind: TerrainKind,
    /// World X coordinate
    pub x: i32,
    /// World Y coordinate
    pub y: i32,
    /// Elevation in [0, 1]
    pub elevation: f32,
    /// Moisture in [0, 1]
    pub moisture: f32,
    /// Temperature, roughly [-1, 1] after latitude and altitude attenuation
    pub temperature: f32,
}

impl Tile {
    /// Creates a tile and classifies it from its climate fields.
    #[must_use]
    pub fn from_climate(x: i32, y: i32, elevation: f32, moisture: f32, temperature: f32) -> Self {
        Self {
            kind: terrain::classify(elevation, moisture, temperature),
            x,
            y,
            elevation,
            moisture,
            temperature,
        }
    }

    /// Whether units can stand on this tile.
    #[must_use]
    pub const fn is_walkable(&self) -> bool {
        self.kind.is_walkable()
    }

    /// Movement cost multiplier; infinite when impassable.
    #[must_use]
    pub const fn movement_cost(&self) -> f32 {
        self.kind.movement_cost()
    }

    /// Whether resources can appear on this tile.
    #[must_use]
    pub const fn can_have_resources(&self) -> bool {
        self.kind.can_have_resources()
    }

    /// Gameplay properties of this tile's terrain.
    #[must_use]
    pub fn properties(&self) -> TerrainProperties {
        definitions::get_properties(self.kind)
    }

    /// Whether the kind still matches the climate fields.
    ///
    /// False for overlays such as ruins.
    #[must_use]
    pub fn is_naturally_classified(&self) -> bool {
        self.kind == terrain::classify(self.elevation, self.moisture, self.temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_climate_classifies() {
        let tile = Tile::from_climate(3, -4, 0.5, 0.8, 0.5);
        assert_eq!(tile.kind, TerrainKind::Forest);
        assert!(tile.is_walkable());
        assert!(tile.can_have_resources());
        assert!((tile.movement_cost() - 1.3).abs() < f32::EPSILON);
        assert!(tile.is_naturally_classified());
    }

    #[test]
    fn test_overlay_breaks_natural_classification() {
        let mut tile = Tile::from_climate(0, 0, 0.5, 0.5, 0.5);
        tile.kind = TerrainKind::Ruins;
        assert!(!tile.is_naturally_classified());
        assert!((tile.properties().item_spawn_probability - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_deep_water_is_impassable() {
        let tile = Tile::from_climate(0, 0, 0.05, 0.5, 0.5);
        assert!(!tile.is_walkable());
        assert!(tile.movement_cost().is_infinite());
    }
}
