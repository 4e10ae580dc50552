// src/world.rs
//! Снимок мира
//!
//! Собирается один раз в конце конвейера и дальше только читается. Следующие
//! стадии (поселения, история) могут лишь добавлять свои поля верхнего уровня
//! через [`WorldSnapshot::attach`]; они сохраняются рядом с основными полями JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::config::WorldGenerationParams;
use crate::error::{Result, WorldError, check_schema};
use crate::grid::Grid;
use crate::realm::{Realm, paint_realms_with};
use crate::seed::ComponentSeeds;
use crate::terrain::synthesize_terrain_with;

/// Тег схемы снимка мира
pub const WORLD_SCHEMA: &str = "world.v1";

const RESERVED_FIELDS: [&str; 7] = [
    "schema",
    "master_seed",
    "component_seeds",
    "width",
    "height",
    "grid",
    "realms",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    schema: String,
    master_seed: u64,
    component_seeds: BTreeMap<String, u64>,
    width: u32,
    height: u32,
    grid: Grid,
    realms: Vec<Realm>,
    #[serde(flatten)]
    extensions: BTreeMap<String, Value>,
}

impl WorldSnapshot {
    #[must_use]
    pub fn new(master_seed: u64, seeds: &ComponentSeeds, grid: Grid, realms: Vec<Realm>) -> Self {
        Self {
            schema: WORLD_SCHEMA.to_string(),
            master_seed,
            component_seeds: seeds.to_map(),
            width: grid.width,
            height: grid.height,
            grid,
            realms,
            extensions: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    #[must_use]
    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    #[must_use]
    pub fn component_seeds(&self) -> &BTreeMap<String, u64> {
        &self.component_seeds
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn realms(&self) -> &[Realm] {
        &self.realms
    }

    #[must_use]
    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }

    #[must_use]
    pub fn extensions(&self) -> &BTreeMap<String, Value> {
        &self.extensions
    }

    /// Добавляет поле верхнего уровня от следующей стадии.
    ///
    /// Основные поля снимка перезаписать нельзя: такой ключ даёт `InvalidParameter`.
    /// Повторный `attach` с тем же ключом заменяет значение.
    pub fn attach(mut self, key: impl Into<String>, value: Value) -> Result<Self> {
        let key = key.into();
        if RESERVED_FIELDS.contains(&key.as_str()) {
            return Err(WorldError::InvalidParameter {
                name: "extensions",
                reason: format!("`{key}` is a reserved snapshot field"),
            });
        }
        self.extensions.insert(key, value);
        Ok(self)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Читает снимок и проверяет тег схемы
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        check_schema(&snapshot.schema, WORLD_SCHEMA)?;
        Ok(snapshot)
    }
}

/// Полный конвейер: сиды → рельеф → государства → снимок
pub fn generate_world(params: &WorldGenerationParams) -> Result<WorldSnapshot> {
    let seeds = ComponentSeeds::derive(params.seed);
    let terrain = synthesize_terrain_with(params.width, params.height, seeds.terrain, params)?;
    let (grid, realms) =
        paint_realms_with(&terrain, params.realm_count, seeds.realms, &params.realms)?;

    info!(
        seed = params.seed,
        width = params.width,
        height = params.height,
        land = grid.land_count(),
        rivers = grid.rivers.len(),
        realms = realms.len(),
        "мир сгенерирован"
    );
    Ok(WorldSnapshot::new(params.seed, &seeds, grid, realms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn small_params() -> WorldGenerationParams {
        WorldGenerationParams {
            seed: 42,
            width: 24,
            height: 18,
            realm_count: 3,
            ..WorldGenerationParams::default()
        }
    }

    #[test]
    fn snapshot_records_seeds_and_schema() {
        let world = generate_world(&small_params()).unwrap();
        assert_eq!(world.schema(), WORLD_SCHEMA);
        assert_eq!(world.master_seed(), 42);
        let seeds = ComponentSeeds::derive(42);
        assert_eq!(world.component_seeds()["terrain"], seeds.terrain);
        assert_eq!(world.component_seeds()["realms"], seeds.realms);
        assert_eq!(world.grid().seed, seeds.terrain);
        assert_eq!((world.width(), world.height()), (24, 18));
        assert_eq!(world.realms().len(), 3);
    }

    #[test]
    fn attached_fields_survive_json() {
        let world = generate_world(&small_params())
            .unwrap()
            .attach("settlements", json!([{ "name": "Harrow", "row": 3, "col": 4 }]))
            .unwrap();
        let json = world.to_json().unwrap();

        let raw: Value = serde_json::from_str(&json).unwrap();
        assert!(raw.get("settlements").is_some());
        assert!(raw.get("extensions").is_none());

        let back = WorldSnapshot::from_json(&json).unwrap();
        assert_eq!(back.extension("settlements"), world.extension("settlements"));
        assert_eq!(back.realms(), world.realms());
    }

    #[test]
    fn core_fields_cannot_be_overwritten() {
        let world = generate_world(&small_params()).unwrap();
        let err = world.attach("grid", json!(null)).unwrap_err();
        assert!(matches!(err, WorldError::InvalidParameter { name: "extensions", .. }));
    }

    #[test]
    fn foreign_schema_is_rejected() {
        let world = generate_world(&small_params()).unwrap();
        let mut raw: Value = serde_json::from_str(&world.to_json().unwrap()).unwrap();
        raw["schema"] = json!("world.v0");
        let err = WorldSnapshot::from_json(&raw.to_string()).unwrap_err();
        assert!(matches!(err, WorldError::SchemaMismatch { .. }));
    }

    #[test]
    fn realm_count_errors_propagate() {
        let params = WorldGenerationParams {
            realm_count: 999,
            ..small_params()
        };
        assert!(matches!(
            generate_world(&params),
            Err(WorldError::InvalidRealmCount { requested: 999, .. })
        ));
    }
}
