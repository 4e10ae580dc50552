// src/realm/territory.rs
use std::collections::VecDeque;

use crate::grid::Grid;

/// Сводка по территории одного государства (индексы тайлов, построчно)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerritorySurvey {
    pub tiles: Vec<usize>,
    /// Тайлы, у которых хотя бы один сосед принадлежит другому владельцу или океану
    pub border: Vec<usize>,
    /// Число связных кусков; больше одного — есть эксклавы
    pub components: usize,
}

/// Собирает территории, границы и связность всех `realm_count` государств за один обход
#[must_use]
pub fn survey(grid: &Grid, owner: &[Option<u32>], realm_count: usize) -> Vec<TerritorySurvey> {
    let mut surveys = vec![TerritorySurvey::default(); realm_count];
    let mut visited = vec![false; owner.len()];

    for idx in 0..owner.len() {
        let Some(realm) = owner[idx] else {
            continue;
        };
        let Some(entry) = surveys.get_mut(realm as usize) else {
            continue;
        };

        entry.tiles.push(idx);
        if grid.neighbors(idx).any(|n| owner[n] != Some(realm)) {
            entry.border.push(idx);
        }

        if visited[idx] {
            continue;
        }
        entry.components += 1;
        let mut queue = VecDeque::new();
        queue.push_back(idx);
        visited[idx] = true;
        while let Some(cur) = queue.pop_front() {
            for n in grid.neighbors(cur) {
                if !visited[n] && owner[n] == Some(realm) {
                    visited[n] = true;
                    queue.push_back(n);
                }
            }
        }
    }

    surveys
}
