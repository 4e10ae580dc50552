// src/realm/growth.rs
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use crate::config::RealmSettings;
use crate::grid::{Grid, Tile};

/// Стоимость входа фронтира на тайл: база, высота, биом, переправа через реку
#[must_use]
pub fn step_cost(tile: &Tile, settings: &RealmSettings) -> u32 {
    let elevation = (tile.elevation * settings.elevation_cost as f32).round() as u32;
    let river = if tile.river {
        settings.river_crossing_cost
    } else {
        0
    };
    settings.base_step_cost + elevation + tile.biome.frontier_cost() + river
}

/// Одновременный рост территорий от всех столиц (многоисточниковый Дейкстра).
///
/// Тайл достаётся государству, чей фронтир дошёл до него с наименьшей
/// накопленной стоимостью; при равной стоимости — государству с меньшим id.
/// Куча упорядочена по `(стоимость, id государства, индекс тайла)`, так что
/// первое извлечение тайла и есть окончательное. Растёт только по суше.
///
/// `capitals[i]` — индекс столицы государства `i`.
#[must_use]
pub fn grow_territories(grid: &Grid, capitals: &[usize], settings: &RealmSettings) -> Vec<Option<u32>> {
    let total = grid.len();
    let mut owner: Vec<Option<u32>> = vec![None; total];
    let mut best_cost = vec![u32::MAX; total];
    let mut frontier = BinaryHeap::new();

    for (realm_id, &idx) in capitals.iter().enumerate() {
        best_cost[idx] = 0;
        frontier.push(Reverse((0u32, realm_id as u32, idx)));
    }

    while let Some(Reverse((cost, realm_id, idx))) = frontier.pop() {
        if owner[idx].is_some() {
            continue;
        }
        owner[idx] = Some(realm_id);

        for n in grid.neighbors(idx) {
            let tile = &grid.tiles[n];
            if !tile.is_land() || owner[n].is_some() {
                continue;
            }
            let next = cost.saturating_add(step_cost(tile, settings));
            // равная стоимость тоже попадает в кучу: ничью решит id государства
            if next <= best_cost[n] {
                best_cost[n] = next;
                frontier.push(Reverse((next, realm_id, n)));
            }
        }
    }

    owner
}

/// Раздаёт сушу, недостижимую ни из одной столицы (острова без столицы).
///
/// Каждая связная компонента такой суши целиком уходит государству с ближайшей
/// столицей (манхэттенское расстояние от любого тайла компоненты; при равенстве —
/// меньший id). Такие куски становятся эксклавами. Возвращает число компонент.
pub fn assign_unreached(grid: &Grid, owner: &mut [Option<u32>], capitals: &[usize]) -> usize {
    let total = grid.len();
    let mut visited = vec![false; total];
    let mut components = 0;

    for start in 0..total {
        if visited[start] || owner[start].is_some() || !grid.tiles[start].is_land() {
            continue;
        }

        let mut component = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        visited[start] = true;

        while let Some(idx) = queue.pop_front() {
            component.push(idx);
            for n in grid.neighbors(idx) {
                if !visited[n] && owner[n].is_none() && grid.tiles[n].is_land() {
                    visited[n] = true;
                    queue.push_back(n);
                }
            }
        }

        let nearest = capitals
            .iter()
            .enumerate()
            .map(|(realm_id, &cap)| {
                let cap = grid.coord_of(cap);
                let d = component
                    .iter()
                    .map(|&i| grid.coord_of(i).manhattan(cap))
                    .min()
                    .unwrap_or(u32::MAX);
                (d, realm_id as u32)
            })
            .min();

        if let Some((_, realm_id)) = nearest {
            for idx in component {
                owner[idx] = Some(realm_id);
            }
            components += 1;
        }
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::Biome;
    use crate::realm::testing::grid_from;

    #[test]
    fn equal_distance_ties_go_to_lower_realm_id() {
        // 1×5: столицы на краях, середина на равном расстоянии
        let grid = grid_from(&["#####"]);
        let owner = grow_territories(&grid, &[0, 4], &RealmSettings::default());
        assert_eq!(
            owner,
            vec![Some(0), Some(0), Some(0), Some(1), Some(1)]
        );

        // та же карта, столицы поменяны местами
        let owner = grow_territories(&grid, &[4, 0], &RealmSettings::default());
        assert_eq!(
            owner,
            vec![Some(1), Some(1), Some(0), Some(0), Some(0)]
        );
    }

    #[test]
    fn mountains_slow_the_frontier() {
        // 1×7: гора рядом со столицей 0 отдаёт большую часть полосы столице 1
        let mut grid = grid_from(&["#######"]);
        grid.tiles[1].biome = Biome::Mountains;
        grid.tiles[1].elevation = 0.95;
        let owner = grow_territories(&grid, &[0, 6], &RealmSettings::default());
        let realm1 = owner.iter().filter(|o| **o == Some(1)).count();
        assert!(realm1 >= 5, "{owner:?}");
    }

    #[test]
    fn growth_never_crosses_ocean() {
        let grid = grid_from(&["##~##"]);
        let owner = grow_territories(&grid, &[0], &RealmSettings::default());
        assert_eq!(owner, vec![Some(0), Some(0), None, None, None]);
    }

    #[test]
    fn islands_go_to_nearest_capital() {
        let grid = grid_from(&["##~~#", "~~~~~", "##~~~"]);
        // столица 0 в (0,0), столица 1 в (2,0)
        let mut owner = grow_territories(&grid, &[0, 10], &RealmSettings::default());
        let assigned = assign_unreached(&grid, &mut owner, &[0, 10]);
        assert_eq!(assigned, 1);
        // остров (0,4): до (0,0) — 4, до (2,0) — 6
        assert_eq!(owner[4], Some(0));
        assert!(owner.iter().enumerate().all(|(i, o)| o.is_some() == grid.tiles[i].is_land()));
    }
}
