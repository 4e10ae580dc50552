// src/realm/capitals.rs
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::grid::{Coord, Grid};
use crate::seed::StageRng;

/// Выбранная столица
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalPick {
    pub coord: Coord,
    /// Сколько случайных кандидатов было просмотрено
    pub attempts: u32,
    /// Столица взята запасным правилом (самый удалённый тайл суши)
    pub fallback: bool,
}

/// Минимальное расстояние между столицами, если оно не задано явно
#[must_use]
pub fn auto_min_distance(land_tiles: usize, realm_count: usize) -> u32 {
    let per_realm = land_tiles as f32 / realm_count.max(1) as f32;
    ((per_realm.sqrt() / 2.0).round() as u32).max(1)
}

fn distance_to_chosen(grid: &Grid, idx: usize, chosen: &[usize]) -> u32 {
    let c = grid.coord_of(idx);
    chosen
        .iter()
        .map(|&other| c.manhattan(grid.coord_of(other)))
        .min()
        .unwrap_or(u32::MAX)
}

/// Выбирает `count` столиц на суше.
///
/// Кандидат берётся случайно из тайлов суши; если он ближе `min_distance` к уже
/// выбранной столице (или совпадает с ней), он отбрасывается. После
/// `max_attempts` неудач берётся тайл суши, максимально удалённый от выбранных
/// (при равенстве — первый в построчном порядке). Вызывающий гарантирует
/// `count <= число тайлов суши`, поэтому запасной кандидат всегда есть.
pub fn pick_capitals(
    grid: &Grid,
    count: usize,
    min_distance: u32,
    max_attempts: u32,
    rng: &mut StageRng,
) -> Vec<CapitalPick> {
    let land: Vec<usize> = (0..grid.len()).filter(|&i| grid.tiles[i].is_land()).collect();
    if land.is_empty() {
        return Vec::new();
    }
    let mut chosen: Vec<usize> = Vec::with_capacity(count);
    let mut picks = Vec::with_capacity(count);

    for _ in 0..count {
        let mut accepted = None;
        let mut attempts = 0;
        while attempts < max_attempts {
            attempts += 1;
            let candidate = land[rng.gen_range(0..land.len())];
            if chosen.contains(&candidate) {
                continue;
            }
            if distance_to_chosen(grid, candidate, &chosen) >= min_distance {
                accepted = Some(candidate);
                break;
            }
        }

        let (idx, fallback) = match accepted {
            Some(idx) => (idx, false),
            None => {
                let mut best: Option<(usize, u32)> = None;
                for &i in &land {
                    if chosen.contains(&i) {
                        continue;
                    }
                    let d = distance_to_chosen(grid, i, &chosen);
                    if best.is_none_or(|(_, bd)| d > bd) {
                        best = Some((i, d));
                    }
                }
                let Some((idx, d)) = best else {
                    break;
                };
                warn!(
                    capital = chosen.len(),
                    attempts,
                    min_distance,
                    distance = d,
                    "столица выбрана запасным правилом"
                );
                (idx, true)
            }
        };

        chosen.push(idx);
        picks.push(CapitalPick {
            coord: grid.coord_of(idx),
            attempts,
            fallback,
        });
    }

    picks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realm::testing::grid_from;
    use crate::seed::stage_rng;

    #[test]
    fn capitals_respect_minimum_distance() {
        let grid = grid_from(&["##########"; 10]);
        let mut rng = stage_rng(42, "realms.capitals");
        let picks = pick_capitals(&grid, 4, 4, 500, &mut rng);
        assert_eq!(picks.len(), 4);
        for (i, a) in picks.iter().enumerate() {
            assert!(!a.fallback);
            for b in &picks[i + 1..] {
                assert!(a.coord.manhattan(b.coord) >= 4);
            }
        }
    }

    #[test]
    fn impossible_spacing_falls_back_to_farthest_tile() {
        // 1×5 полоса: три столицы на расстоянии 10 не помещаются
        let grid = grid_from(&["#####"]);
        let mut rng = stage_rng(1, "realms.capitals");
        let picks = pick_capitals(&grid, 3, 10, 8, &mut rng);
        assert_eq!(picks.len(), 3);
        // первая столица всегда принимается сразу
        assert!(!picks[0].fallback);
        assert!(picks[1].fallback && picks[2].fallback);
        assert_eq!(picks[1].attempts, 8);

        let mut coords: Vec<Coord> = picks.iter().map(|p| p.coord).collect();
        coords.sort();
        coords.dedup();
        assert_eq!(coords.len(), 3);
    }

    #[test]
    fn zero_attempts_still_terminates() {
        let grid = grid_from(&["~##", "##~"]);
        let mut rng = stage_rng(3, "realms.capitals");
        let picks = pick_capitals(&grid, 4, 1, 0, &mut rng);
        assert_eq!(picks.len(), 4);
        assert!(picks.iter().all(|p| p.fallback));
        // первый запасной выбор — первый тайл суши
        assert_eq!(picks[0].coord, Coord::new(0, 1));
    }

    #[test]
    fn capitals_are_only_on_land() {
        let grid = grid_from(&["~~~~~", "~##~~", "~~~#~"]);
        let mut rng = stage_rng(9, "realms.capitals");
        for p in pick_capitals(&grid, 3, 1, 64, &mut rng) {
            assert!(grid.get(p.coord).unwrap().is_land());
        }
    }

    #[test]
    fn auto_distance_scales_with_land() {
        assert_eq!(auto_min_distance(100, 4), 3);
        assert_eq!(auto_min_distance(3, 3), 1);
        assert_eq!(auto_min_distance(10_000, 1), 50);
    }
}
