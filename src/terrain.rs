// src/terrain.rs
//! Синтез рельефа
//!
//! Высота и влажность сэмплируются из независимых шумовых полей в нормализованном
//! центре каждого тайла, высота смешивается с правилом спада к краям карты и
//! перенормируется так, чтобы минимум был ровно 0, а максимум ровно 1. Это делает
//! пороги биомов независимыми от размера карты. Затем запускаются гидрология и
//! классификация биомов, и из всего собирается [`Grid`].

use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::biome::classify_grid;
use crate::climate::{apply_water_proximity, shape_moisture};
use crate::config::{FalloffMode, TerrainSettings, WorldGenerationParams};
use crate::error::{Result, WorldError};
use crate::grid::{Grid, TERRAIN_SCHEMA, Tile, coord_of};
use crate::noise::{NoiseField, to_unit};
use crate::rivers::{accumulate_flow, mark_rivers, trace_rivers};
use crate::seed::{StageRng, derive_seed, stage_rng};

/// Поля высоты и влажности до гидрологии: значения в `[0, 1]`, построчно
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainFields {
    pub width: u32,
    pub height: u32,
    pub elevation: Vec<f32>,
    pub moisture: Vec<f32>,
}

impl TerrainFields {
    #[must_use]
    pub fn get_elevation(&self, row: u32, col: u32) -> f32 {
        self.elevation[(row * self.width + col) as usize]
    }
}

/// Центр островка архипелага в нормализованных координатах
#[derive(Debug, Clone, Copy)]
struct Island {
    x: f32,
    y: f32,
}

/// Маска спада: множитель в `[0, 1]` для нормализованной точки `(nx, ny)`
struct Falloff {
    mode: FalloffMode,
    islands: Vec<Island>,
}

impl Falloff {
    fn new(mode: FalloffMode, rng: &mut StageRng) -> Self {
        let islands = if mode == FalloffMode::Archipelago {
            let count = 5 + rng.gen_range(0..=3);
            (0..count)
                .map(|_| Island {
                    x: rng.gen_range(0.0..1.0),
                    y: rng.gen_range(0.0..1.0),
                })
                .collect()
        } else {
            Vec::new()
        };
        Self { mode, islands }
    }

    fn mask(&self, nx: f32, ny: f32) -> f32 {
        let dx = nx - 0.5;
        let dy = ny - 0.5;
        match self.mode {
            FalloffMode::None => 1.0,
            FalloffMode::Radial => {
                // 0 в центре, ≈0.88 в углах
                let d = (dx * dx + dy * dy).sqrt() / 0.8;
                (1.0 - d * d * 1.6).max(0.0)
            }
            FalloffMode::Edge => {
                let to_edge = nx.min(1.0 - nx).min(ny).min(1.0 - ny) * 2.0;
                let inv = 1.0 - to_edge.clamp(0.0, 1.0);
                1.0 - inv * inv
            }
            FalloffMode::InlandSea => {
                let d = (dx * dx + dy * dy).sqrt() * 2.0;
                (d * 1.25).clamp(0.0, 1.0)
            }
            FalloffMode::Archipelago => self
                .islands
                .iter()
                .map(|island| {
                    let ix = nx - island.x;
                    let iy = ny - island.y;
                    (1.0 - (ix * ix + iy * iy).sqrt() * 3.0).max(0.0)
                })
                .fold(0.0, f32::max),
        }
    }
}

/// Нормализованный центр тайла
fn normalized(width: u32, height: u32, idx: usize) -> (f32, f32) {
    let c = coord_of(width, idx);
    (
        (c.col as f32 + 0.5) / width as f32,
        (c.row as f32 + 0.5) / height as f32,
    )
}

fn sample_tiles<F>(width: u32, height: u32, f: F) -> Vec<f32>
where
    F: Fn(f32, f32) -> f32 + Sync + Send,
{
    let total = width as usize * height as usize;

    #[cfg(feature = "parallel")]
    let values = (0..total)
        .into_par_iter()
        .map(|i| {
            let (nx, ny) = normalized(width, height, i);
            f(nx, ny)
        })
        .collect();

    #[cfg(not(feature = "parallel"))]
    let values = (0..total)
        .map(|i| {
            let (nx, ny) = normalized(width, height, i);
            f(nx, ny)
        })
        .collect();

    values
}

/// Перенормирует значения так, чтобы минимум стал 0, а максимум 1.
///
/// На вырожденной карте (все значения равны, в том числе 1×1) значения
/// остаются как есть: делить не на что.
pub fn renormalize(values: &mut [f32]) {
    let min_v = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max_v = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max_v > min_v {
        let range = max_v - min_v;
        for v in values.iter_mut() {
            *v = ((*v - min_v) / range).clamp(0.0, 1.0);
        }
    }
}

/// Генерирует поля высоты и влажности (без гидрологии и биомов)
pub fn generate_fields(
    width: u32,
    height: u32,
    seed: u64,
    params: &WorldGenerationParams,
) -> Result<TerrainFields> {
    if width == 0 || height == 0 {
        return Err(WorldError::InvalidDimensions { width, height });
    }
    let terrain: &TerrainSettings = &params.terrain;

    let elevation_noise = NoiseField::new(derive_seed(seed, "terrain.elevation"), &terrain.elevation);
    let moisture_noise = NoiseField::new(derive_seed(seed, "terrain.moisture"), &terrain.moisture);
    let mut rng = stage_rng(seed, "terrain.islands");
    let falloff = Falloff::new(terrain.falloff, &mut rng);

    let strength = terrain.falloff_strength;
    let warp = terrain.warp_strength;

    let mut elevation = sample_tiles(width, height, |nx, ny| {
        let e = to_unit(elevation_noise.sample_warped(nx, ny, warp));
        (e * (1.0 - strength + strength * falloff.mask(nx, ny))).clamp(0.0, 1.0)
    });
    renormalize(&mut elevation);

    let moisture = sample_tiles(width, height, |nx, ny| to_unit(moisture_noise.sample(nx, ny)));

    let mut fields = TerrainFields {
        width,
        height,
        elevation,
        moisture,
    };
    shape_moisture(&mut fields, &params.climate);

    debug!(width, height, seed, falloff = ?terrain.falloff, "поля высоты и влажности готовы");
    Ok(fields)
}

/// Синтез рельефа с параметрами по умолчанию.
///
/// Ошибка `InvalidDimensions`, если ширина или высота равна нулю.
pub fn synthesize_terrain(width: u32, height: u32, seed: u64) -> Result<Grid> {
    synthesize_terrain_with(width, height, seed, &WorldGenerationParams::default())
}

/// Синтез рельефа с полной конфигурацией: поля → гидрология → близость воды →
/// биомы → сетка.
pub fn synthesize_terrain_with(
    width: u32,
    height: u32,
    seed: u64,
    params: &WorldGenerationParams,
) -> Result<Grid> {
    if width == 0 || height == 0 {
        return Err(WorldError::InvalidDimensions { width, height });
    }
    params.validate()?;

    let sea_level = params.terrain.sea_level;
    let mut fields = generate_fields(width, height, seed, params)?;

    let flow = accumulate_flow(width, height, &fields.elevation, sea_level);
    let river = mark_rivers(&flow, &fields.elevation, sea_level, params.hydrology.flow_threshold);
    apply_water_proximity(&mut fields, &river, sea_level, &params.climate);
    let biomes = classify_grid(&fields, &river, sea_level, &params.biomes);
    let rivers = trace_rivers(width, &flow, &river, params.hydrology.min_river_length);

    let tiles = (0..fields.elevation.len())
        .map(|i| {
            let c = coord_of(width, i);
            Tile {
                row: c.row,
                col: c.col,
                elevation: fields.elevation[i],
                moisture: fields.moisture[i],
                biome: biomes[i],
                river: river[i],
                flow: flow.volume[i],
                drains_to: flow.downstream[i].map(|d| coord_of(width, d)),
                realm: None,
            }
        })
        .collect();

    debug!(
        rivers = rivers.len(),
        river_tiles = river.iter().filter(|&&r| r).count(),
        "рельеф собран"
    );

    Ok(Grid {
        schema: TERRAIN_SCHEMA.to_string(),
        width,
        height,
        seed,
        sea_level,
        terrain: params.terrain.clone(),
        tiles,
        rivers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::Biome;
    use crate::config::WorldType;

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            synthesize_terrain(0, 10, 1),
            Err(WorldError::InvalidDimensions { width: 0, height: 10 })
        ));
        assert!(matches!(
            synthesize_terrain(10, 0, 1),
            Err(WorldError::InvalidDimensions { width: 10, height: 0 })
        ));
    }

    #[test]
    fn elevation_spans_exact_unit_range() {
        let grid = synthesize_terrain(24, 16, 42).unwrap();
        let min = grid.tiles.iter().map(|t| t.elevation).fold(f32::INFINITY, f32::min);
        let max = grid.tiles.iter().map(|t| t.elevation).fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(min, 0.0);
        assert_eq!(max, 1.0);
        for t in &grid.tiles {
            assert!((0.0..=1.0).contains(&t.moisture));
        }
    }

    #[test]
    fn single_tile_grid_keeps_sampled_value() {
        let grid = synthesize_terrain(1, 1, 5).unwrap();
        assert_eq!(grid.tiles.len(), 1);
        let e = grid.tiles[0].elevation;
        assert!((0.0..=1.0).contains(&e));
        assert!(e.is_finite());
    }

    #[test]
    fn renormalize_leaves_flat_input_alone() {
        let mut flat = vec![0.3; 6];
        renormalize(&mut flat);
        assert_eq!(flat, vec![0.3; 6]);

        let mut ramp = vec![0.2, 0.4, 0.6];
        renormalize(&mut ramp);
        assert_eq!(ramp[0], 0.0);
        assert_eq!(ramp[2], 1.0);
        assert!((ramp[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn tiles_are_row_major_and_ocean_below_sea_level() {
        let grid = synthesize_terrain(12, 9, 3).unwrap();
        assert_eq!(grid.tiles.len(), 12 * 9);
        for (i, t) in grid.tiles.iter().enumerate() {
            assert_eq!(grid.index(t.coord()), i);
            if t.elevation < grid.sea_level {
                assert_eq!(t.biome, Biome::Ocean);
            } else {
                assert_ne!(t.biome, Biome::Ocean);
            }
            assert!(t.realm.is_none());
        }
    }

    #[test]
    fn radial_falloff_keeps_borders_lower_than_centre() {
        let params = WorldGenerationParams {
            terrain: TerrainSettings {
                falloff_strength: 1.0,
                ..TerrainSettings::default()
            },
            ..WorldGenerationParams::default()
        };
        let fields = generate_fields(40, 40, 8, &params).unwrap();
        let border: f32 = (0..40).map(|c| fields.get_elevation(0, c)).sum::<f32>() / 40.0;
        let centre: f32 = (15..25).map(|c| fields.get_elevation(20, c)).sum::<f32>() / 10.0;
        assert!(centre > border);
    }

    #[test]
    fn world_type_presets_synthesize() {
        for world_type in [WorldType::Archipelago, WorldType::Highlands, WorldType::InlandSea] {
            let params = WorldGenerationParams::for_world_type(17, world_type);
            let grid = synthesize_terrain_with(20, 20, 17, &params).unwrap();
            assert_eq!(grid.tiles.len(), 400);
        }
    }

    #[test]
    fn highlands_have_more_land_than_archipelago() {
        let high = WorldGenerationParams::for_world_type(4, WorldType::Highlands);
        let arch = WorldGenerationParams::for_world_type(4, WorldType::Archipelago);
        let high_land = synthesize_terrain_with(30, 30, 4, &high).unwrap().land_count();
        let arch_land = synthesize_terrain_with(30, 30, 4, &arch).unwrap().land_count();
        assert!(high_land > arch_land);
    }

    #[test]
    fn grid_records_the_terrain_settings_used() {
        let params = WorldGenerationParams::for_world_type(9, WorldType::Archipelago);
        let grid = synthesize_terrain_with(16, 12, 9, &params).unwrap();
        assert_eq!(grid.terrain, params.terrain);
        assert_eq!(grid.terrain.falloff, FalloffMode::Archipelago);

        let back: Grid = serde_json::from_str(&serde_json::to_string(&grid).unwrap()).unwrap();
        assert_eq!(back.terrain.falloff, FalloffMode::Archipelago);
    }

    #[test]
    fn coastal_land_is_wetter_on_average() {
        let dry_params = WorldGenerationParams {
            climate: crate::config::ClimateSettings {
                water_proximity: 0.0,
                ..Default::default()
            },
            ..WorldGenerationParams::default()
        };
        let dry = synthesize_terrain_with(32, 24, 6, &dry_params).unwrap();
        let wet = synthesize_terrain_with(32, 24, 6, &WorldGenerationParams::default()).unwrap();

        // прибрежная суша: хотя бы один сосед — океан
        let coastal: Vec<usize> = (0..wet.len())
            .filter(|&i| wet.tiles[i].is_land())
            .filter(|&i| wet.neighbors(i).any(|n| !wet.tiles[n].is_land()))
            .collect();
        assert!(!coastal.is_empty());
        let gain: f32 = coastal
            .iter()
            .map(|&i| wet.tiles[i].moisture - dry.tiles[i].moisture)
            .sum::<f32>()
            / coastal.len() as f32;
        assert!(gain > 0.0, "{gain}");
    }
}
