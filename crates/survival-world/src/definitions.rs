//! Static gameplay properties per terrain kind.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::terrain::TerrainKind;

/// Gameplay properties of one terrain kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainProperties {
    /// Chance that a mob spawns on a tile of this terrain (0.0 - 1.0).
    pub mob_spawn_probability: f32,
    /// Chance that a resource node spawns (0.0 - 1.0).
    pub resource_spawn_probability: f32,
    /// Chance that a loose item spawns (0.0 - 1.0).
    pub item_spawn_probability: f32,
    /// Standing here poisons.
    pub is_toxic: bool,
    /// Slows movement and combat footing.
    pub is_difficult_terrain: bool,
    /// Limits sight range.
    pub has_reduced_visibility: bool,
    /// Makes sneaking harder.
    pub has_reduced_stealth: bool,
    /// Offers little protection from ranged attacks.
    pub has_poor_cover: bool,
}

impl TerrainProperties {
    /// All-zero, all-false properties used for kinds without a definition.
    pub const DEFAULT: Self = Self {
        mob_spawn_probability: 0.0,
        resource_spawn_probability: 0.0,
        item_spawn_probability: 0.0,
        is_toxic: false,
        is_difficult_terrain: false,
        has_reduced_visibility: false,
        has_reduced_stealth: false,
        has_poor_cover: false,
    };

    /// Creates properties with the given spawn chances, each clamped to `[0, 1]`.
    #[must_use]
    pub fn new(mob: f32, resource: f32, item: f32) -> Self {
        Self {
            mob_spawn_probability: clamp_probability(mob),
            resource_spawn_probability: clamp_probability(resource),
            item_spawn_probability: clamp_probability(item),
            ..Self::DEFAULT
        }
    }

    /// Marks the terrain toxic.
    pub fn toxic(mut self) -> Self {
        self.is_toxic = true;
        self
    }

    /// Marks the terrain as difficult to cross.
    pub fn difficult(mut self) -> Self {
        self.is_difficult_terrain = true;
        self
    }

    /// Marks the terrain as limiting sight.
    pub fn reduced_visibility(mut self) -> Self {
        self.has_reduced_visibility = true;
        self
    }

    /// Marks the terrain as hard to sneak on.
    pub fn reduced_stealth(mut self) -> Self {
        self.has_reduced_stealth = true;
        self
    }

    /// Marks the terrain as offering poor cover.
    pub fn poor_cover(mut self) -> Self {
        self.has_poor_cover = true;
        self
    }
}

impl Default for TerrainProperties {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// NaN counts as zero.
fn clamp_probability(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

static DEFINITIONS: OnceLock<Vec<(TerrainKind, TerrainProperties)>> = OnceLock::new();

fn definitions() -> &'static [(TerrainKind, TerrainProperties)] {
    DEFINITIONS.get_or_init(|| {
        use crate::definitions::TerrainProperties as P;
        use crate::terrain::TerrainKind as K;
        vec![
            // unreachable for ground spawns
            (K::DeepWater, P::new(0.0, 0.0, 0.0)),
            (
                K::ShallowWater,
                P::new(0.2, 0.1, 0.05).difficult().reduced_stealth().poor_cover(),
            ),
            (K::Sand, P::new(0.2, 0.1, 0.1).reduced_stealth().poor_cover()),
            (K::Grass, P::new(0.4, 0.3, 0.2).poor_cover()),
            (K::Dirt, P::new(0.3, 0.2, 0.1).reduced_stealth().poor_cover()),
            (K::Forest, P::new(0.6, 0.8, 0.3).reduced_visibility()),
            (K::SparseForest, P::new(0.4, 0.5, 0.2)),
            (K::Hill, P::new(0.3, 0.4, 0.1).difficult()),
            (K::Mountain, P::new(0.2, 0.7, 0.2).difficult()),
            (K::SnowPeak, P::new(0.0, 0.0, 0.0)),
            (
                K::Swamp,
                P::new(0.7, 0.4, 0.3).difficult().reduced_visibility(),
            ),
            (K::Ruins, P::new(0.8, 0.2, 0.7).reduced_visibility()),
            (K::Toxic, P::new(0.7, 0.3, 0.5).toxic().difficult()),
        ]
    })
}

/// Returns the properties of a terrain kind, or [`TerrainProperties::DEFAULT`]
/// if the kind has no definition.
#[must_use]
pub fn get_properties(kind: TerrainKind) -> TerrainProperties {
    definitions()
        .iter()
        .find(|(k, _)| *k == kind)
        .map_or(TerrainProperties::DEFAULT, |(_, p)| *p)
}

/// Returns the properties for a raw terrain id; unknown ids get the default.
#[must_use]
pub fn properties_for_id(id: u8) -> TerrainProperties {
    TerrainKind::from_id(id).map_or(TerrainProperties::DEFAULT, get_properties)
}

/// Whether a kind has an explicit definition.
#[must_use]
pub fn has_properties(kind: TerrainKind) -> bool {
    definitions().iter().any(|(k, _)| *k == kind)
}

/// Every defined kind with its properties.
#[must_use]
pub fn all() -> &'static [(TerrainKind, TerrainProperties)] {
    definitions()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_is_defined() {
        for kind in TerrainKind::ALL {
            assert!(has_properties(kind), "{kind:?} missing");
        }
        assert_eq!(all().len(), TerrainKind::ALL.len());
    }

    #[test]
    fn test_probabilities_in_unit_range() {
        for (kind, props) in all() {
            for p in [
                props.mob_spawn_probability,
                props.resource_spawn_probability,
                props.item_spawn_probability,
            ] {
                assert!((0.0..=1.0).contains(&p), "{kind:?} has {p}");
            }
        }
    }

    #[test]
    fn test_construction_clamps() {
        let props = TerrainProperties::new(1.5, -0.2, f32::NAN);
        assert_eq!(props.mob_spawn_probability, 1.0);
        assert_eq!(props.resource_spawn_probability, 0.0);
        assert_eq!(props.item_spawn_probability, 0.0);
    }

    #[test]
    fn test_known_values() {
        let forest = get_properties(TerrainKind::Forest);
        assert!((forest.resource_spawn_probability - 0.8).abs() < f32::EPSILON);
        assert!(forest.has_reduced_visibility);

        let ruins = get_properties(TerrainKind::Ruins);
        assert!((ruins.mob_spawn_probability - 0.8).abs() < f32::EPSILON);
        assert!((ruins.item_spawn_probability - 0.7).abs() < f32::EPSILON);

        assert!(get_properties(TerrainKind::Toxic).is_toxic);
        assert_eq!(get_properties(TerrainKind::DeepWater).mob_spawn_probability, 0.0);
    }

    #[test]
    fn test_unknown_id_gets_default() {
        assert_eq!(properties_for_id(200), TerrainProperties::DEFAULT);
        assert_eq!(TerrainProperties::default(), TerrainProperties::DEFAULT);
        assert_eq!(properties_for_id(5), get_properties(TerrainKind::Forest));
    }
}
