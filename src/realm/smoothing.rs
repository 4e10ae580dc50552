// src/realm/smoothing.rs
use tracing::debug;

use crate::grid::Grid;

/// Сглаживание границ: убирает одиночные анклавы и выступы шириной в один тайл.
///
/// Проходы синхронные: решения принимаются по снимку владения на начало прохода,
/// поэтому порядок обхода на результат не влияет. Тайл (кроме столиц) переходит
/// к государству `r`, если `r` владеет строго больше чем `majority_ratio` его
/// соседей-суши (океан в знаменатель не входит). Если проход ничего не поменял,
/// остальные пропускаются.
/// Возвращает общее число переназначенных тайлов.
pub fn stabilize_borders(
    grid: &Grid,
    owner: &mut [Option<u32>],
    capitals: &[usize],
    passes: u32,
    majority_ratio: f32,
) -> usize {
    let mut is_capital = vec![false; owner.len()];
    for &c in capitals {
        is_capital[c] = true;
    }

    let mut total_changes = 0;
    for pass in 0..passes {
        let snapshot = owner.to_vec();
        let mut changes = 0;

        for idx in 0..snapshot.len() {
            let Some(current) = snapshot[idx] else {
                continue;
            };
            if is_capital[idx] {
                continue;
            }

            let mut owned_neighbors = 0u32;
            let mut tally: Vec<(u32, u32)> = Vec::with_capacity(4);
            for n in grid.neighbors(idx) {
                if let Some(r) = snapshot[n] {
                    owned_neighbors += 1;
                    match tally.iter_mut().find(|(id, _)| *id == r) {
                        Some((_, count)) => *count += 1,
                        None => tally.push((r, 1)),
                    }
                }
            }

            // больше соседей, при равенстве — меньший id
            let challenger = tally
                .into_iter()
                .filter(|&(r, _)| r != current)
                .min_by_key(|&(r, count)| (std::cmp::Reverse(count), r));

            if let Some((r, count)) = challenger
                && count as f32 > majority_ratio * owned_neighbors as f32
            {
                owner[idx] = Some(r);
                changes += 1;
            }
        }

        debug!(pass, changes, "проход сглаживания границ");
        total_changes += changes;
        if changes == 0 {
            break;
        }
    }

    total_changes
}
