use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::BiomeThresholds;
use crate::grid::neighbors;
use crate::terrain::TerrainFields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Ocean,
    Coast,
    Plains,
    Forest,
    Hills,
    Mountains,
    Desert,
    Tundra,
    Swamp,
}

impl Biome {
    pub const ALL: [Biome; 9] = [
        Biome::Ocean,
        Biome::Coast,
        Biome::Plains,
        Biome::Forest,
        Biome::Hills,
        Biome::Mountains,
        Biome::Desert,
        Biome::Tundra,
        Biome::Swamp,
    ];

    #[must_use]
    pub fn to_rgb(&self) -> [u8; 3] {
        match self {
            Biome::Ocean => [0, 64, 128],
            Biome::Coast => [230, 215, 160],
            Biome::Plains => [150, 200, 100],
            Biome::Forest => [60, 120, 60],
            Biome::Hills => [160, 150, 100],
            Biome::Mountains => [150, 150, 150],
            Biome::Desert => [200, 180, 120],
            Biome::Tundra => [200, 220, 180],
            Biome::Swamp => [80, 100, 60],
        }
    }

    /// Символ для ASCII-превью
    #[must_use]
    pub fn glyph(&self) -> char {
        match self {
            Biome::Ocean => '~',
            Biome::Coast => ',',
            Biome::Plains => '.',
            Biome::Forest => '♣',
            Biome::Hills => 'n',
            Biome::Mountains => '^',
            Biome::Desert => ':',
            Biome::Tundra => '*',
            Biome::Swamp => '%',
        }
    }

    /// Надбавка к стоимости продвижения фронтира государства через биом
    #[must_use]
    pub fn frontier_cost(&self) -> u32 {
        match self {
            Biome::Ocean | Biome::Coast | Biome::Plains => 0,
            Biome::Forest => 6,
            Biome::Desert => 8,
            Biome::Tundra => 10,
            Biome::Swamp => 12,
            Biome::Hills => 15,
            Biome::Mountains => 40,
        }
    }
}

/// Классификация одного тайла — чистая функция без истории.
///
/// Порядок правил: океан, побережье, горы, холмы/тундра, болото, пустыня
/// (у реки — равнина), равнина, лес. Каждая комбинация входов получает ровно один биом.
#[must_use]
pub fn classify(
    elevation: f32,
    moisture: f32,
    river_adjacent: bool,
    sea_level: f32,
    t: &BiomeThresholds,
) -> Biome {
    if elevation < sea_level {
        return Biome::Ocean;
    }
    if elevation < sea_level + t.coast_band {
        return Biome::Coast;
    }
    if elevation >= t.mountains {
        return Biome::Mountains;
    }
    if elevation >= t.hills {
        return if moisture < t.dry {
            Biome::Tundra
        } else {
            Biome::Hills
        };
    }

    let swamp_moisture = if river_adjacent { t.wet } else { t.swamp_moisture };
    if elevation < t.swamp_max_elevation && moisture >= swamp_moisture {
        Biome::Swamp
    } else if moisture < t.dry {
        // реки орошают засушливые земли
        if river_adjacent {
            Biome::Plains
        } else {
            Biome::Desert
        }
    } else if moisture < t.wet {
        Biome::Plains
    } else {
        Biome::Forest
    }
}

/// Назначает биомы всем тайлам. Соседство с рекой — сам тайл или любой из
/// четырёх соседей является рекой.
#[must_use]
pub fn classify_grid(
    fields: &TerrainFields,
    river: &[bool],
    sea_level: f32,
    thresholds: &BiomeThresholds,
) -> Vec<Biome> {
    let width = fields.width;
    let height = fields.height;
    let classify_one = |i: usize| {
        let river_adjacent = river[i] || neighbors(width, height, i).any(|n| river[n]);
        classify(
            fields.elevation[i],
            fields.moisture[i],
            river_adjacent,
            sea_level,
            thresholds,
        )
    };

    #[cfg(feature = "parallel")]
    let biomes = (0..fields.elevation.len())
        .into_par_iter()
        .map(classify_one)
        .collect();

    #[cfg(not(feature = "parallel"))]
    let biomes = (0..fields.elevation.len()).map(classify_one).collect();

    biomes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t() -> BiomeThresholds {
        BiomeThresholds::default()
    }

    #[test]
    fn below_sea_level_is_always_ocean() {
        for &m in &[0.0, 0.5, 1.0] {
            for &r in &[false, true] {
                assert_eq!(classify(0.39, m, r, 0.4, &t()), Biome::Ocean);
            }
        }
    }

    #[test]
    fn decision_table_examples() {
        let th = t();
        assert_eq!(classify(0.41, 0.5, false, 0.4, &th), Biome::Coast);
        assert_eq!(classify(0.95, 0.5, false, 0.4, &th), Biome::Mountains);
        assert_eq!(classify(0.75, 0.1, false, 0.4, &th), Biome::Tundra);
        assert_eq!(classify(0.75, 0.5, false, 0.4, &th), Biome::Hills);
        assert_eq!(classify(0.45, 0.8, false, 0.4, &th), Biome::Swamp);
        assert_eq!(classify(0.45, 0.65, true, 0.4, &th), Biome::Swamp);
        assert_eq!(classify(0.45, 0.65, false, 0.4, &th), Biome::Forest);
        assert_eq!(classify(0.6, 0.1, false, 0.4, &th), Biome::Desert);
        assert_eq!(classify(0.6, 0.1, true, 0.4, &th), Biome::Plains);
        assert_eq!(classify(0.6, 0.4, false, 0.4, &th), Biome::Plains);
        assert_eq!(classify(0.6, 0.9, false, 0.4, &th), Biome::Forest);
    }

    #[test]
    fn table_is_total_and_land_never_ocean() {
        let th = t();
        for ei in 0..=100 {
            for mi in 0..=100 {
                for r in [false, true] {
                    let e = ei as f32 / 100.0;
                    let m = mi as f32 / 100.0;
                    let b = classify(e, m, r, 0.4, &th);
                    assert!(Biome::ALL.contains(&b));
                    assert_eq!(b == Biome::Ocean, e < 0.4);
                }
            }
        }
    }

    #[test]
    fn river_adjacency_includes_neighbours() {
        let fields = TerrainFields {
            width: 3,
            height: 1,
            elevation: vec![0.6, 0.6, 0.6],
            moisture: vec![0.1, 0.1, 0.1],
        };
        let river = vec![true, false, false];
        let biomes = classify_grid(&fields, &river, 0.4, &t());
        assert_eq!(biomes, vec![Biome::Plains, Biome::Plains, Biome::Desert]);
    }
}
