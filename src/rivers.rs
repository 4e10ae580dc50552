// src/rivers.rs
use serde::{Deserialize, Serialize};

use crate::grid::{Coord, coord_of, neighbors};

/// Результат накопления стока
#[derive(Debug, Clone, PartialEq)]
pub struct FlowField {
    /// Накопленный объём на тайл
    pub volume: Vec<f32>,
    /// Индекс тайла, куда уходит вода; `None` — океан или бессточная впадина
    pub downstream: Vec<Option<usize>>,
}

/// Куда впадает река
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiverOutlet {
    Ocean,
    /// Бессточная впадина: ниже соседей нет
    Basin,
    /// Приток: дальше русло уже занято ранее прослеженной рекой
    Confluence { at: Coord },
}

/// Река от истока до устья
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct River {
    pub id: String,
    pub source: Coord,
    pub mouth: Coord,
    pub path: Vec<Coord>,
    pub length: usize,
    pub outlet: RiverOutlet,
}

/// Накопление стока (Flow Accumulation) за один последовательный проход.
///
/// Тайлы обходятся от вершин к низинам; при равной высоте — в построчном порядке.
/// Тайл суши отдаёт свою единицу воды вместе с притоком самому низкому соседу,
/// который строго ниже его; среди равных соседей побеждает меньший индекс.
/// Если ниже никого нет — вода остаётся во впадине (заполнения озёр нет).
/// Океан только принимает воду.
#[must_use]
pub fn accumulate_flow(width: u32, height: u32, elevation: &[f32], sea_level: f32) -> FlowField {
    let total = elevation.len();
    let mut volume: Vec<f32> = elevation
        .iter()
        .map(|&e| if e < sea_level { 0.0 } else { 1.0 })
        .collect();
    let mut downstream = vec![None; total];

    // Сортируем индексы от вершин к низинам
    let mut order: Vec<usize> = (0..total).collect();
    order.sort_by(|&a, &b| elevation[b].total_cmp(&elevation[a]).then(a.cmp(&b)));

    for idx in order {
        let current = elevation[idx];
        if current < sea_level {
            continue;
        }

        let mut target: Option<usize> = None;
        let mut min_h = current;
        // соседи идут по возрастанию индекса, строгое `<` оставляет меньший индекс при равенстве
        for n in neighbors(width, height, idx) {
            if elevation[n] < min_h {
                min_h = elevation[n];
                target = Some(n);
            }
        }

        if let Some(t) = target {
            downstream[idx] = Some(t);
            volume[t] += volume[idx];
        }
    }

    FlowField { volume, downstream }
}

/// Флаги рек: суша с накопленным стоком строго выше порога
#[must_use]
pub fn mark_rivers(flow: &FlowField, elevation: &[f32], sea_level: f32, threshold: f32) -> Vec<bool> {
    flow.volume
        .iter()
        .zip(elevation)
        .map(|(&v, &e)| e >= sea_level && v > threshold)
        .collect()
}

/// Прослеживает реки по графу стока.
///
/// Исток — речной тайл, в который не втекает ни один речной тайл. Истоки
/// обходятся построчно; русло, уже занятое ранее прослеженной рекой, завершает
/// текущую как приток. Короче `min_length` — флаги остаются, в список не попадает.
#[must_use]
pub fn trace_rivers(width: u32, flow: &FlowField, river: &[bool], min_length: usize) -> Vec<River> {
    let total = river.len();
    let mut has_river_inflow = vec![false; total];
    for (idx, down) in flow.downstream.iter().enumerate() {
        if river[idx]
            && let Some(d) = *down
        {
            has_river_inflow[d] = true;
        }
    }

    let mut claimed = vec![false; total];
    let mut rivers = Vec::new();

    for source in (0..total).filter(|&i| river[i] && !has_river_inflow[i]) {
        let mut path = vec![source];
        claimed[source] = true;
        let mut current = source;

        let outlet = loop {
            match flow.downstream[current] {
                None => break RiverOutlet::Basin,
                Some(next) if !river[next] => break RiverOutlet::Ocean,
                Some(next) if claimed[next] => {
                    break RiverOutlet::Confluence {
                        at: coord_of(width, next),
                    };
                }
                Some(next) => {
                    claimed[next] = true;
                    path.push(next);
                    current = next;
                }
            }
        };

        if path.len() >= min_length {
            let path: Vec<Coord> = path.into_iter().map(|i| coord_of(width, i)).collect();
            rivers.push(River {
                id: format!("river_{:03}", rivers.len()),
                source: path[0],
                mouth: path[path.len() - 1],
                length: path.len(),
                path,
                outlet,
            });
        }
    }

    rivers
}
