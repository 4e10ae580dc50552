// src/realm/mod.rs
//! Раскраска государств
//!
//! Конвейер: столицы → рост территорий от всех столиц сразу → раздача
//! недостижимых островов → сглаживание границ → сводка по каждому государству.
//! Всё последовательно и зависит только от сетки, числа государств и сида.

pub mod capitals;
pub mod graph;
pub mod growth;
pub mod smoothing;
pub mod territory;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::RealmSettings;
use crate::error::{Result, WorldError};
use crate::grid::{Coord, Grid};
use crate::seed::stage_rng;

pub use capitals::{CapitalPick, auto_min_distance, pick_capitals};
pub use graph::{build_realm_graph, realm_neighbors};
pub use growth::{assign_unreached, grow_territories, step_cost};
pub use smoothing::stabilize_borders;
pub use territory::{TerritorySurvey, survey};

/// Тег схемы результата раскраски
pub const REALM_SCHEMA: &str = "realms.v1";

const DEFAULT_NAMES: [&str; 10] = [
    "Aldoria",
    "Kethran",
    "Velmoor",
    "Thessalia",
    "Orwyn",
    "Myrr",
    "Drakovar",
    "Selene Vale",
    "Norcrest",
    "Ilyrion",
];

/// Имя государства: сначала из запасного списка, затем `Realm N` (N с единицы)
#[must_use]
pub fn realm_name(index: usize) -> String {
    DEFAULT_NAMES
        .get(index)
        .map_or_else(|| format!("Realm {}", index + 1), |name| (*name).to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Realm {
    pub id: u32,
    pub name: String,
    pub capital: Coord,
    /// Столица выбрана запасным правилом, минимальное расстояние не выдержано
    pub capital_fallback: bool,
    /// Все тайлы государства, построчно
    pub territory: Vec<Coord>,
    pub border: Vec<Coord>,
    pub area: usize,
    /// Число связных кусков территории; больше одного — есть эксклавы
    pub component_count: usize,
    /// Id соседних государств по возрастанию
    pub neighbors: Vec<u32>,
}

/// Результат раскраски в виде, пригодном для отдельного файла
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealmPartition {
    pub schema: String,
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    pub realm_count: usize,
    pub realms: Vec<Realm>,
    /// Владелец каждого тайла, построчно
    pub owners: Vec<Option<u32>>,
}

impl RealmPartition {
    #[must_use]
    pub fn new(seed: u64, painted: &Grid, realms: Vec<Realm>) -> Self {
        Self {
            schema: REALM_SCHEMA.to_string(),
            seed,
            width: painted.width,
            height: painted.height,
            realm_count: realms.len(),
            realms,
            owners: painted.tiles.iter().map(|t| t.realm).collect(),
        }
    }
}

/// Раскраска с настройками по умолчанию
pub fn paint_realms(grid: &Grid, realm_count: usize, seed: u64) -> Result<(Grid, Vec<Realm>)> {
    paint_realms_with(grid, realm_count, seed, &RealmSettings::default())
}

/// Делит сушу сетки между `realm_count` государствами.
///
/// Возвращает копию сетки с заполненным `realm` у каждого тайла суши и список
/// государств. Исходная сетка не меняется. Сетка с нарушенной раскладкой
/// (число тайлов, координаты) отклоняется до начала раскраски.
pub fn paint_realms_with(
    grid: &Grid,
    realm_count: usize,
    seed: u64,
    settings: &RealmSettings,
) -> Result<(Grid, Vec<Realm>)> {
    grid.validate_layout()?;
    let land_tiles = grid.land_count();
    if realm_count == 0 || realm_count > land_tiles {
        return Err(WorldError::InvalidRealmCount {
            requested: realm_count,
            land_tiles,
        });
    }
    settings.validate()?;

    let min_distance = settings
        .min_capital_distance
        .unwrap_or_else(|| auto_min_distance(land_tiles, realm_count));
    let mut rng = stage_rng(seed, "realms.capitals");
    let picks = pick_capitals(
        grid,
        realm_count,
        min_distance,
        settings.max_capital_attempts,
        &mut rng,
    );
    let capitals: Vec<usize> = picks.iter().map(|p| grid.index(p.coord)).collect();
    debug!(count = capitals.len(), min_distance, "столицы выбраны");

    let mut owner = grow_territories(grid, &capitals, settings);
    let islands = assign_unreached(grid, &mut owner, &capitals);
    let smoothed = stabilize_borders(
        grid,
        &mut owner,
        &capitals,
        settings.smoothing_passes,
        settings.majority_ratio,
    );

    let mut painted = grid.clone();
    for (tile, realm) in painted.tiles.iter_mut().zip(&owner) {
        tile.realm = *realm;
    }

    let graph = build_realm_graph(grid, &owner, realm_count);
    let surveys = survey(grid, &owner, realm_count);

    let realms: Vec<Realm> = picks
        .iter()
        .zip(surveys)
        .enumerate()
        .map(|(i, (pick, s))| {
            let id = i as u32;
            if s.components > 1 {
                warn!(realm = id, components = s.components, "территория государства разорвана");
            }
            Realm {
                id,
                name: realm_name(i),
                capital: pick.coord,
                capital_fallback: pick.fallback,
                area: s.tiles.len(),
                territory: s.tiles.iter().map(|&t| grid.coord_of(t)).collect(),
                border: s.border.iter().map(|&t| grid.coord_of(t)).collect(),
                component_count: s.components,
                neighbors: realm_neighbors(&graph, id),
            }
        })
        .collect();

    info!(
        realms = realms.len(),
        land_tiles,
        islands,
        smoothed,
        "государства раскрашены"
    );
    Ok((painted, realms))
}


#[cfg(test)]
mod tests {
    use super::testing::grid_from;
    use super::*;

    #[test]
    fn rejects_bad_realm_counts() {
        let grid = grid_from(&["~##", "~~#"]);
        for count in [0, 4, 999] {
            match paint_realms(&grid, count, 1) {
                Err(WorldError::InvalidRealmCount {
                    requested,
                    land_tiles,
                }) => {
                    assert_eq!(requested, count);
                    assert_eq!(land_tiles, 3);
                }
                other => panic!("ожидалась ошибка числа государств, получено {other:?}"),
            }
        }
    }

    #[test]
    fn every_land_tile_is_owned_exactly_once() {
        let grid = grid_from(&[
            "~~########",
            "~#########",
            "~####~~###",
            "~~~~~~~###",
            "##~~~~~~~~",
        ]);
        let (painted, realms) = paint_realms(&grid, 3, 7).unwrap();
        assert_eq!(realms.len(), 3);

        for tile in &painted.tiles {
            assert_eq!(tile.realm.is_some(), tile.is_land());
        }
        let total: usize = realms.iter().map(|r| r.area).sum();
        assert_eq!(total, grid.land_count());

        for realm in &realms {
            assert_eq!(realm.area, realm.territory.len());
            assert!(realm.territory.windows(2).all(|w| w[0] < w[1]));
            for c in &realm.territory {
                assert_eq!(painted.get(*c).unwrap().realm, Some(realm.id));
            }
            assert_eq!(painted.get(realm.capital).unwrap().realm, Some(realm.id));
        }
        // исходная сетка не тронута
        assert!(grid.tiles.iter().all(|t| t.realm.is_none()));
    }

    #[test]
    fn detached_island_becomes_reported_exclave() {
        // остров (4,0..1) отрезан от материка; столиц два, на материке места хватает
        let grid = grid_from(&[
            "##########",
            "##########",
            "##########",
            "~~~~~~~~~~",
            "##~~~~~~~~",
        ]);
        let settings = RealmSettings {
            min_capital_distance: Some(25),
            max_capital_attempts: 0,
            ..RealmSettings::default()
        };
        let (painted, realms) = paint_realms_with(&grid, 2, 3, &settings).unwrap();
        assert!(painted.tiles.iter().all(|t| t.realm.is_some() == t.is_land()));
        // обе столицы на материке: первая — (0,0), вторая — самая дальняя от неё
        assert_eq!(realms[0].capital, Coord::new(0, 0));
        assert_eq!(realms[1].capital, Coord::new(2, 9));
        assert!(realms[1].capital_fallback);
        // остров ближе к столице 0
        assert_eq!(painted.get(Coord::new(4, 0)).unwrap().realm, Some(0));
        assert_eq!(realms[0].component_count, 2);
        assert_eq!(realms[1].component_count, 1);
        assert_eq!(realms[0].neighbors, vec![1]);
    }

    #[test]
    fn same_inputs_same_partition() {
        let grid = grid_from(&["########", "###~~###", "########", "##~~~~##"]);
        let a = paint_realms(&grid, 4, 99).unwrap();
        let b = paint_realms(&grid, 4, 99).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn malformed_grid_is_an_error_not_a_panic() {
        let mut grid = grid_from(&["####", "####", "####"]);
        grid.tiles.truncate(6);
        assert!(matches!(
            paint_realms(&grid, 2, 1),
            Err(WorldError::InvalidParameter { name: "grid.tiles", .. })
        ));

        let mut grid = grid_from(&["####", "####"]);
        grid.tiles[2].col = 7;
        assert!(paint_realms(&grid, 2, 1).is_err());
    }

    #[test]
    fn names_fall_back_to_numbered() {
        assert_eq!(realm_name(0), "Aldoria");
        assert_eq!(realm_name(9), "Ilyrion");
        assert_eq!(realm_name(10), "Realm 11");
    }

    #[test]
    fn partition_carries_schema_and_owners() {
        let grid = grid_from(&["#~#"]);
        let (painted, realms) = paint_realms(&grid, 2, 5).unwrap();
        let partition = RealmPartition::new(5, &painted, realms);
        assert_eq!(partition.schema, REALM_SCHEMA);
        assert_eq!(partition.realm_count, 2);
        assert_eq!(partition.owners[1], None);
        assert!(partition.owners[0].is_some() && partition.owners[2].is_some());
    }
}
