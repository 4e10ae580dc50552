// src/climate.rs
use std::collections::VecDeque;

use crate::config::ClimateSettings;
use crate::grid::neighbors;
use crate::terrain::TerrainFields;

/// Сила дождевой тени в тайле `(row, col)`: самая высокая гора против ветра
/// в пределах `shadow_distance` тайлов.
fn rain_shadow(fields: &TerrainFields, row: u32, col: u32, climate: &ClimateSettings) -> f32 {
    let Some((dr, dc)) = climate.prevailing_wind.upwind_step() else {
        return 0.0;
    };

    let mut max_blocking = 0.0f32;
    for step in 1..=climate.shadow_distance as i32 {
        let r = row as i32 + dr * step;
        let c = col as i32 + dc * step;
        if r < 0 || r >= fields.height as i32 || c < 0 || c >= fields.width as i32 {
            break;
        }
        let e = fields.get_elevation(r as u32, c as u32);
        if e > climate.shadow_elevation {
            max_blocking = max_blocking.max((e - climate.shadow_elevation) * climate.shadow_strength);
        }
    }
    max_blocking
}

/// Досчитывает влажность по уже перенормированной высоте:
/// шумовая база + орографический подъём − дождевая тень, с обрезкой в `[0, 1]`.
pub fn shape_moisture(fields: &mut TerrainFields, climate: &ClimateSettings) {
    let width = fields.width;
    let shaped: Vec<f32> = (0..fields.moisture.len())
        .map(|i| {
            let row = i as u32 / width;
            let col = i as u32 % width;
            let base = fields.moisture[i];
            let lift = fields.elevation[i] * climate.orographic_lift;
            let shadow = rain_shadow(fields, row, col, climate);
            (base + lift - shadow).clamp(0.0, 1.0)
        })
        .collect();
    fields.moisture = shaped;
}

/// Расстояние (в шагах по четырём направлениям) от каждого тайла до ближайшей
/// воды; `None`, если воды на карте нет.
fn water_distance(width: u32, height: u32, water: &[bool]) -> Vec<Option<u32>> {
    let mut distance = vec![None; water.len()];
    let mut queue = VecDeque::new();
    for (idx, &w) in water.iter().enumerate() {
        if w {
            distance[idx] = Some(0);
            queue.push_back(idx);
        }
    }
    while let Some(idx) = queue.pop_front() {
        let next = distance[idx].map_or(0, |d: u32| d + 1);
        for n in neighbors(width, height, idx) {
            if distance[n].is_none() {
                distance[n] = Some(next);
                queue.push_back(n);
            }
        }
    }
    distance
}

/// Подмешивает к влажности близость воды. Водой считаются океан
/// (`elevation < sea_level`) и речные тайлы, поэтому вызывается после гидрологии.
///
/// `влажность = (1 − w) × влажность + w × max(0, 1 − d / water_reach)`,
/// где `w = water_proximity`, `d` — расстояние до воды.
pub fn apply_water_proximity(
    fields: &mut TerrainFields,
    river: &[bool],
    sea_level: f32,
    climate: &ClimateSettings,
) {
    let weight = climate.water_proximity;
    if weight <= 0.0 {
        return;
    }
    let water: Vec<bool> = fields
        .elevation
        .iter()
        .zip(river)
        .map(|(&e, &r)| e < sea_level || r)
        .collect();
    let distance = water_distance(fields.width, fields.height, &water);
    let reach = climate.water_reach.max(1) as f32;

    for (m, d) in fields.moisture.iter_mut().zip(distance) {
        let proximity = d.map_or(0.0, |d| (1.0 - d as f32 / reach).max(0.0));
        *m = ((1.0 - weight) * *m + weight * proximity).clamp(0.0, 1.0);
    }
}
