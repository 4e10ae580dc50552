// src/grid.rs
//! Сетка тайлов
//!
//! Сетка владеет всеми тайлами карты `width × height` без дыр. Индекс тайла —
//! `row * width + col`, обход всегда построчный: на этом порядке держится
//! детерминированный разбор ничьих в гидрологии и при раскраске государств.

use serde::{Deserialize, Serialize};

use crate::biome::Biome;
use crate::config::TerrainSettings;
use crate::error::{Result, WorldError};
use crate::rivers::River;

/// Тег схемы сетки рельефа
pub const TERRAIN_SCHEMA: &str = "terrain.v1";

/// Четыре направления `(d_row, d_col)` в фиксированном порядке
pub const DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

/// Координата тайла; порядок сравнения — построчный
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: u32,
    pub col: u32,
}

impl Coord {
    #[must_use]
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    #[must_use]
    pub fn manhattan(self, other: Coord) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

/// Один тайл карты
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub row: u32,
    pub col: u32,
    /// Высота, `[0, 1]`
    pub elevation: f32,
    /// Влажность, `[0, 1]`
    pub moisture: f32,
    pub biome: Biome,
    pub river: bool,
    /// Накопленный сток (единица собственной воды плюс приток)
    pub flow: f32,
    /// Куда стекает вода; `None` — океан или бессточная впадина
    pub drains_to: Option<Coord>,
    /// Государство-владелец; `None` до раскраски и всегда для океана
    pub realm: Option<u32>,
}

impl Tile {
    #[must_use]
    pub fn coord(&self) -> Coord {
        Coord::new(self.row, self.col)
    }

    #[must_use]
    pub fn is_land(&self) -> bool {
        self.biome != Biome::Ocean
    }
}

/// Сетка рельефа
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub schema: String,
    pub width: u32,
    pub height: u32,
    /// Сид стадии рельефа
    pub seed: u64,
    pub sea_level: f32,
    /// Настройки рельефа, с которыми сетка построена (спад, шумы, уровень моря)
    #[serde(default)]
    pub terrain: TerrainSettings,
    /// Тайлы в построчном порядке
    pub tiles: Vec<Tile>,
    #[serde(default)]
    pub rivers: Vec<River>,
}

impl Grid {
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[must_use]
    pub fn index(&self, coord: Coord) -> usize {
        coord.row as usize * self.width as usize + coord.col as usize
    }

    #[must_use]
    pub fn coord_of(&self, idx: usize) -> Coord {
        coord_of(self.width, idx)
    }

    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&Tile> {
        if coord.row < self.height && coord.col < self.width {
            self.tiles.get(self.index(coord))
        } else {
            None
        }
    }

    /// Индексы соседей по четырём направлениям (без выхода за края)
    pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + use<> {
        neighbors(self.width, self.height, idx)
    }

    #[must_use]
    pub fn land_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_land()).count()
    }

    /// Проверяет раскладку сетки, пришедшей извне (например, из JSON):
    /// ненулевые размеры, ровно `width × height` тайлов, и у каждого тайла
    /// `row`/`col` совпадают с его позицией.
    pub fn validate_layout(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(WorldError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self.width as usize * self.height as usize;
        if self.tiles.len() != expected {
            return Err(WorldError::InvalidParameter {
                name: "grid.tiles",
                reason: format!(
                    "{}x{} grid needs {expected} tiles, found {}",
                    self.width,
                    self.height,
                    self.tiles.len()
                ),
            });
        }
        if let Some((idx, tile)) = self
            .tiles
            .iter()
            .enumerate()
            .find(|(idx, tile)| tile.coord() != self.coord_of(*idx))
        {
            return Err(WorldError::InvalidParameter {
                name: "grid.tiles",
                reason: format!(
                    "tile {idx} is at ({}, {}), expected {:?}",
                    tile.row,
                    tile.col,
                    self.coord_of(idx)
                ),
            });
        }
        Ok(())
    }
}

#[must_use]
pub fn coord_of(width: u32, idx: usize) -> Coord {
    let width = width as usize;
    Coord::new((idx / width) as u32, (idx % width) as u32)
}

/// Соседи тайла `idx` на сетке `width × height`; края карты не зацикливаются.
pub fn neighbors(width: u32, height: u32, idx: usize) -> impl Iterator<Item = usize> {
    let w = width as i32;
    let h = height as i32;
    let row = (idx / width as usize) as i32;
    let col = (idx % width as usize) as i32;
    DIRECTIONS.iter().filter_map(move |&(dr, dc)| {
        let nr = row + dr;
        let nc = col + dc;
        (nr >= 0 && nr < h && nc >= 0 && nc < w).then(|| (nr * w + nc) as usize)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_stay_inside_and_keep_row_major_order() {
        // 3×3, центр — индекс 4
        let around_center: Vec<usize> = neighbors(3, 3, 4).collect();
        assert_eq!(around_center, vec![1, 3, 5, 7]);

        let corner: Vec<usize> = neighbors(3, 3, 0).collect();
        assert_eq!(corner, vec![1, 3]);

        let single: Vec<usize> = neighbors(1, 1, 0).collect();
        assert!(single.is_empty());
    }

    #[test]
    fn coords_order_row_major() {
        let mut coords = vec![Coord::new(1, 0), Coord::new(0, 5), Coord::new(0, 1)];
        coords.sort();
        assert_eq!(
            coords,
            vec![Coord::new(0, 1), Coord::new(0, 5), Coord::new(1, 0)]
        );
        assert_eq!(Coord::new(2, 3).manhattan(Coord::new(0, 7)), 6);
        assert_eq!(coord_of(4, 9), Coord::new(2, 1));
    }

    fn flat_grid(width: u32, height: u32) -> Grid {
        let tiles = (0..(width * height) as usize)
            .map(|i| {
                let c = coord_of(width, i);
                Tile {
                    row: c.row,
                    col: c.col,
                    elevation: 0.6,
                    moisture: 0.5,
                    biome: Biome::Plains,
                    river: false,
                    flow: 1.0,
                    drains_to: None,
                    realm: None,
                }
            })
            .collect();
        Grid {
            schema: TERRAIN_SCHEMA.to_string(),
            width,
            height,
            seed: 0,
            sea_level: 0.4,
            terrain: TerrainSettings::default(),
            tiles,
            rivers: Vec::new(),
        }
    }

    #[test]
    fn layout_check_catches_foreign_grids() {
        let grid = flat_grid(4, 3);
        assert!(grid.validate_layout().is_ok());

        let mut short = grid.clone();
        short.tiles.truncate(7);
        assert!(matches!(
            short.validate_layout(),
            Err(WorldError::InvalidParameter { name: "grid.tiles", .. })
        ));

        let mut shuffled = grid.clone();
        shuffled.tiles.swap(1, 5);
        assert!(shuffled.validate_layout().is_err());

        let mut empty = grid;
        empty.width = 0;
        assert!(matches!(
            empty.validate_layout(),
            Err(WorldError::InvalidDimensions { width: 0, height: 3 })
        ));
    }
}
