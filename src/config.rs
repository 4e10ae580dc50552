// src/config.rs
//! Конфигурация генерации мира
//!
//! Этот модуль определяет все параметры, управляющие процедурной генерацией:
//! - Типы миров (континент, архипелаг, нагорье и т.д.)
//! - Параметры шумовых полей высоты и влажности
//! - Климатические модификаторы влажности (орографический подъём, дождевая тень)
//! - Пороги гидрологии и классификации биомов
//! - Параметры раскраски государств (столицы, рост территорий, сглаживание границ)
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки через конфигурационные файлы.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, WorldError};

/// Тип генерируемого мира
///
/// Определяет глобальную форму суши: правило спада высоты к краям карты и уровень моря.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum WorldType {
    /// Один крупный материк в центре карты, океан по краям
    #[default]
    Continent,
    /// Несколько островов, разбросанных по карте
    Archipelago,
    /// Высокогорье: низкий уровень моря, суша почти везде
    Highlands,
    /// Внутреннее море, окружённое кольцом суши
    InlandSea,
    /// Без формирования: только шум
    Open,
}

impl WorldType {
    /// Возвращает настройки рельефа по умолчанию для данного типа мира.
    ///
    /// # Особенности
    /// - `Archipelago` использует больше октав и более высокий уровень моря
    /// - `Highlands` опускает уровень моря, так что большая часть карты — суша
    /// - `InlandSea` поднимает края карты вместо того, чтобы опускать их
    #[must_use]
    pub fn default_terrain(self) -> TerrainSettings {
        match self {
            WorldType::Continent => TerrainSettings::default(),
            WorldType::Archipelago => TerrainSettings {
                elevation: NoiseSettings {
                    octaves: 6,
                    ..NoiseSettings::elevation()
                },
                falloff: FalloffMode::Archipelago,
                sea_level: 0.45,
                ..TerrainSettings::default()
            },
            WorldType::Highlands => TerrainSettings {
                falloff: FalloffMode::None,
                sea_level: 0.2,
                ..TerrainSettings::default()
            },
            WorldType::InlandSea => TerrainSettings {
                falloff: FalloffMode::InlandSea,
                ..TerrainSettings::default()
            },
            WorldType::Open => TerrainSettings {
                falloff: FalloffMode::None,
                ..TerrainSettings::default()
            },
        }
    }
}

/// Правило спада высоты относительно краёв карты
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum FalloffMode {
    /// Высота не меняется
    None,
    /// Радиальный спад от центра: суша тянется к середине карты
    #[default]
    Radial,
    /// Спад по расстоянию до ближайшего края (квадратная форма материка)
    Edge,
    /// Обратный спад: края поднимаются, центр опускается
    InlandSea,
    /// Несколько островных центров, выбранных ГСЧ стадии
    Archipelago,
}

/// Параметры одного многооктавного шумового поля
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoiseSettings {
    /// Количество октав (слоёв шума)
    #[serde(default = "default_octaves")]
    pub octaves: u32,

    /// Базовая частота в нормализованных координатах карты (число «волн» на всю карту)
    #[serde(default = "default_frequency")]
    pub frequency: f32,

    /// Множитель амплитуды на каждую следующую октаву (обычно 0.4–0.6)
    #[serde(default = "default_persistence")]
    pub persistence: f32,

    /// Множитель частоты на каждую следующую октаву (обычно 2.0)
    #[serde(default = "default_lacunarity")]
    pub lacunarity: f32,
}

fn default_octaves() -> u32 {
    5
}
fn default_frequency() -> f32 {
    3.0
}
fn default_persistence() -> f32 {
    0.5
}
fn default_lacunarity() -> f32 {
    2.0
}

impl NoiseSettings {
    /// Поле высот: крупные формы суши
    #[must_use]
    pub fn elevation() -> Self {
        Self {
            octaves: 5,
            frequency: 3.0,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }

    /// Поле влажности: меньше октав, более плавные пятна
    #[must_use]
    pub fn moisture() -> Self {
        Self {
            octaves: 3,
            frequency: 2.0,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self::elevation()
    }
}

/// Настройки рельефа
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TerrainSettings {
    /// Шум высот
    #[serde(default = "NoiseSettings::elevation")]
    pub elevation: NoiseSettings,

    /// Шум влажности (независимый подсид, общее состояние с высотами не разделяется)
    #[serde(default = "NoiseSettings::moisture")]
    pub moisture: NoiseSettings,

    /// Правило спада высоты к краям карты
    #[serde(default)]
    pub falloff: FalloffMode,

    /// Доля высоты, подчиняющаяся правилу спада:
    /// - `0.0` — спад не влияет,
    /// - `1.0` — высота полностью умножается на маску.
    #[serde(default = "default_falloff_strength")]
    pub falloff_strength: f32,

    /// Сила искажения координат (domain warping) в долях карты; `0.0` отключает
    #[serde(default = "default_warp_strength")]
    pub warp_strength: f32,

    /// Уровень моря: тайлы ниже него — океан
    #[serde(default = "default_sea_level")]
    pub sea_level: f32,
}

fn default_falloff_strength() -> f32 {
    0.7
}
fn default_warp_strength() -> f32 {
    0.05
}
fn default_sea_level() -> f32 {
    0.4
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            elevation: NoiseSettings::elevation(),
            moisture: NoiseSettings::moisture(),
            falloff: FalloffMode::Radial,
            falloff_strength: 0.7,
            warp_strength: 0.05,
            sea_level: 0.4,
        }
    }
}

/// Направление преобладающего ветра (откуда дует)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum PrevailingWind {
    #[default]
    West,
    East,
    North,
    South,
    /// Безветрие: дождевой тени нет
    Calm,
}

impl PrevailingWind {
    /// Смещение `(d_row, d_col)` в сторону, откуда приходит воздух
    #[must_use]
    pub fn upwind_step(self) -> Option<(i32, i32)> {
        match self {
            PrevailingWind::West => Some((0, -1)),
            PrevailingWind::East => Some((0, 1)),
            PrevailingWind::North => Some((-1, 0)),
            PrevailingWind::South => Some((1, 0)),
            PrevailingWind::Calm => None,
        }
    }
}

/// Климатические модификаторы влажности
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClimateSettings {
    /// Направление ветра для дождевой тени
    #[serde(default)]
    pub prevailing_wind: PrevailingWind,

    /// Орографический подъём: прибавка влажности `elevation × orographic_lift`
    #[serde(default = "default_orographic_lift")]
    pub orographic_lift: f32,

    /// Высота, начиная с которой тайл отбрасывает дождевую тень
    #[serde(default = "default_shadow_elevation")]
    pub shadow_elevation: f32,

    /// Сколько тайлов против ветра просматривается при поиске гор
    #[serde(default = "default_shadow_distance")]
    pub shadow_distance: u32,

    /// Сила тени: `(высота горы − shadow_elevation) × shadow_strength`
    #[serde(default = "default_shadow_strength")]
    pub shadow_strength: f32,

    /// Вес близости воды (океан и реки) при смешивании с шумовой влажностью:
    /// `0.0` отключает, `1.0` — влажность целиком по расстоянию до воды
    #[serde(default = "default_water_proximity")]
    pub water_proximity: f32,

    /// Расстояние в тайлах, на котором влияние воды спадает до нуля
    #[serde(default = "default_water_reach")]
    pub water_reach: u32,
}

fn default_orographic_lift() -> f32 {
    0.15
}
fn default_shadow_elevation() -> f32 {
    0.7
}
fn default_shadow_distance() -> u32 {
    15
}
fn default_shadow_strength() -> f32 {
    0.5
}
fn default_water_proximity() -> f32 {
    0.35
}
fn default_water_reach() -> u32 {
    30
}

impl Default for ClimateSettings {
    fn default() -> Self {
        Self {
            prevailing_wind: PrevailingWind::West,
            orographic_lift: 0.15,
            shadow_elevation: 0.7,
            shadow_distance: 15,
            shadow_strength: 0.5,
            water_proximity: 0.35,
            water_reach: 30,
        }
    }
}

/// Настройки гидрологии
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HydrologySettings {
    /// Порог накопленного стока: тайлы суши с потоком строго выше порога — реки
    #[serde(default = "default_flow_threshold")]
    pub flow_threshold: f32,

    /// Минимальная длина реки (в тайлах) для попадания в список рек
    #[serde(default = "default_min_river_length")]
    pub min_river_length: usize,
}

fn default_flow_threshold() -> f32 {
    8.0
}
fn default_min_river_length() -> usize {
    3
}

impl Default for HydrologySettings {
    fn default() -> Self {
        Self {
            flow_threshold: 8.0,
            min_river_length: 3,
        }
    }
}

/// Пороги таблицы биомов (высоты — в нормализованной шкале `[0, 1]`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BiomeThresholds {
    /// Ширина прибрежной полосы над уровнем моря
    #[serde(default = "default_coast_band")]
    pub coast_band: f32,

    /// Нижняя граница холмов
    #[serde(default = "default_hills")]
    pub hills: f32,

    /// Нижняя граница гор
    #[serde(default = "default_mountains")]
    pub mountains: f32,

    /// Влажность ниже этого порога — засушливая зона (пустыня, тундра на высоте)
    #[serde(default = "default_dry")]
    pub dry: f32,

    /// Влажность от этого порога — лес
    #[serde(default = "default_wet")]
    pub wet: f32,

    /// Влажность болота (у рек болото начинается с `wet`)
    #[serde(default = "default_swamp_moisture")]
    pub swamp_moisture: f32,

    /// Болота только в низинах ниже этой высоты
    #[serde(default = "default_swamp_max_elevation")]
    pub swamp_max_elevation: f32,
}

fn default_coast_band() -> f32 {
    0.03
}
fn default_hills() -> f32 {
    0.7
}
fn default_mountains() -> f32 {
    0.8
}
fn default_dry() -> f32 {
    0.25
}
fn default_wet() -> f32 {
    0.6
}
fn default_swamp_moisture() -> f32 {
    0.75
}
fn default_swamp_max_elevation() -> f32 {
    0.5
}

impl Default for BiomeThresholds {
    fn default() -> Self {
        Self {
            coast_band: 0.03,
            hills: 0.7,
            mountains: 0.8,
            dry: 0.25,
            wet: 0.6,
            swamp_moisture: 0.75,
            swamp_max_elevation: 0.5,
        }
    }
}

/// Настройки раскраски государств
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RealmSettings {
    /// Минимальное манхэттенское расстояние между столицами.
    /// `None` — вычисляется из площади суши: `round(sqrt(суша / число государств) / 2)`, не меньше 1.
    #[serde(default)]
    pub min_capital_distance: Option<u32>,

    /// Сколько раз можно перевыбрать слишком близкую столицу, прежде чем взять
    /// самый удалённый тайл суши
    #[serde(default = "default_max_capital_attempts")]
    pub max_capital_attempts: u32,

    /// Число проходов сглаживания границ (`0` — без сглаживания)
    #[serde(default = "default_smoothing_passes")]
    pub smoothing_passes: u32,

    /// Доля соседей, которую должно удерживать чужое государство, чтобы забрать тайл.
    /// Допустимо `[0.5, 1.0)`; `0.5` — строгое большинство.
    #[serde(default = "default_majority_ratio")]
    pub majority_ratio: f32,

    /// Базовая стоимость шага фронтира
    #[serde(default = "default_base_step_cost")]
    pub base_step_cost: u32,

    /// Надбавка за высоту: `elevation × elevation_cost`
    #[serde(default = "default_elevation_cost")]
    pub elevation_cost: u32,

    /// Надбавка за вход на тайл с рекой
    #[serde(default = "default_river_crossing_cost")]
    pub river_crossing_cost: u32,
}

fn default_max_capital_attempts() -> u32 {
    64
}
fn default_smoothing_passes() -> u32 {
    2
}
fn default_majority_ratio() -> f32 {
    0.5
}
fn default_base_step_cost() -> u32 {
    10
}
fn default_elevation_cost() -> u32 {
    20
}
fn default_river_crossing_cost() -> u32 {
    4
}

impl Default for RealmSettings {
    fn default() -> Self {
        Self {
            min_capital_distance: None,
            max_capital_attempts: 64,
            smoothing_passes: 2,
            majority_ratio: 0.5,
            base_step_cost: 10,
            elevation_cost: 20,
            river_crossing_cost: 4,
        }
    }
}

/// Основные параметры генерации мира
///
/// Полная конфигурация для генерации одного мира. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldGenerationParams {
    /// Мастер-сид (из него выводятся сиды всех стадий)
    pub seed: u64,

    /// Ширина карты в тайлах (по умолчанию 80)
    #[serde(default = "default_width")]
    pub width: u32,

    /// Высота карты в тайлах (по умолчанию 60)
    #[serde(default = "default_height")]
    pub height: u32,

    /// Количество государств (по умолчанию 5)
    #[serde(default = "default_realm_count")]
    pub realm_count: usize,

    /// Настройки рельефа (по умолчанию — континент)
    #[serde(default)]
    pub terrain: TerrainSettings,

    /// Климатические модификаторы влажности
    #[serde(default)]
    pub climate: ClimateSettings,

    /// Настройки гидрологии
    #[serde(default)]
    pub hydrology: HydrologySettings,

    /// Пороги классификации биомов
    #[serde(default)]
    pub biomes: BiomeThresholds,

    /// Настройки раскраски государств
    #[serde(default)]
    pub realms: RealmSettings,
}

fn default_width() -> u32 {
    80
}
fn default_height() -> u32 {
    60
}
fn default_realm_count() -> usize {
    5
}

impl Default for WorldGenerationParams {
    fn default() -> Self {
        Self {
            seed: 0,
            width: 80,
            height: 60,
            realm_count: 5,
            terrain: TerrainSettings::default(),
            climate: ClimateSettings::default(),
            hydrology: HydrologySettings::default(),
            biomes: BiomeThresholds::default(),
            realms: RealmSettings::default(),
        }
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> WorldError {
    WorldError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

fn check_unit(name: &'static str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(name, format!("{value} is outside [0, 1]")))
    }
}

impl NoiseSettings {
    fn validate(&self, name: &'static str) -> Result<()> {
        if self.octaves == 0 {
            return Err(invalid(name, "at least one octave is required"));
        }
        if !(self.frequency > 0.0) {
            return Err(invalid(name, "frequency must be positive"));
        }
        if !(self.persistence > 0.0 && self.persistence <= 1.0) {
            return Err(invalid(name, "persistence must be in (0, 1]"));
        }
        if !(self.lacunarity >= 1.0) {
            return Err(invalid(name, "lacunarity must be at least 1"));
        }
        Ok(())
    }
}

impl WorldGenerationParams {
    /// Параметры с пресетом рельефа для данного типа мира
    #[must_use]
    pub fn for_world_type(seed: u64, world_type: WorldType) -> Self {
        Self {
            seed,
            terrain: world_type.default_terrain(),
            ..Self::default()
        }
    }

    /// Загружает параметры из TOML-файла
    ///
    /// # Ошибки
    /// Возвращает ошибку, если файл не найден, содержит недопустимый формат
    /// или значения вне допустимых диапазонов.
    ///
    /// # Пример
    /// ```toml
    /// # world.toml
    /// seed = 42
    /// width = 120
    /// height = 80
    /// realm_count = 6
    ///
    /// [terrain]
    /// falloff = "Archipelago"
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let params: Self = toml::from_str(contents)?;
        params.validate()?;
        Ok(params)
    }

    /// Проверяет диапазоны параметров (но не размеры карты и число государств —
    /// это ошибки `InvalidDimensions`/`InvalidRealmCount` соответствующих стадий).
    pub fn validate(&self) -> Result<()> {
        let terrain = &self.terrain;
        terrain.elevation.validate("terrain.elevation")?;
        terrain.moisture.validate("terrain.moisture")?;
        check_unit("terrain.falloff_strength", terrain.falloff_strength)?;
        check_unit("terrain.warp_strength", terrain.warp_strength)?;
        if !(terrain.sea_level > 0.0 && terrain.sea_level < 1.0) {
            return Err(invalid("terrain.sea_level", "must be in (0, 1)"));
        }

        check_unit("climate.orographic_lift", self.climate.orographic_lift)?;
        check_unit("climate.shadow_elevation", self.climate.shadow_elevation)?;
        check_unit("climate.shadow_strength", self.climate.shadow_strength)?;
        check_unit("climate.water_proximity", self.climate.water_proximity)?;
        if self.climate.water_reach == 0 {
            return Err(invalid("climate.water_reach", "must be positive"));
        }

        if !(self.hydrology.flow_threshold >= 0.0) {
            return Err(invalid("hydrology.flow_threshold", "must be non-negative"));
        }

        let b = &self.biomes;
        for (name, value) in [
            ("biomes.coast_band", b.coast_band),
            ("biomes.hills", b.hills),
            ("biomes.mountains", b.mountains),
            ("biomes.dry", b.dry),
            ("biomes.wet", b.wet),
            ("biomes.swamp_moisture", b.swamp_moisture),
            ("biomes.swamp_max_elevation", b.swamp_max_elevation),
        ] {
            check_unit(name, value)?;
        }
        if b.hills > b.mountains {
            return Err(invalid("biomes.hills", "must not exceed biomes.mountains"));
        }
        if b.dry > b.wet {
            return Err(invalid("biomes.dry", "must not exceed biomes.wet"));
        }

        self.realms.validate()
    }
}

impl RealmSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.majority_ratio >= 0.5 && self.majority_ratio < 1.0) {
            return Err(invalid("realms.majority_ratio", "must be in [0.5, 1)"));
        }
        if self.base_step_cost == 0 {
            return Err(invalid("realms.base_step_cost", "must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(WorldGenerationParams::default().validate().is_ok());
        for world_type in [
            WorldType::Continent,
            WorldType::Archipelago,
            WorldType::Highlands,
            WorldType::InlandSea,
            WorldType::Open,
        ] {
            let params = WorldGenerationParams::for_world_type(1, world_type);
            assert!(params.validate().is_ok(), "{world_type:?}");
        }
    }

    #[test]
    fn minimal_toml_fills_defaults() {
        let params = WorldGenerationParams::from_toml_str("seed = 42").unwrap();
        assert_eq!(params.seed, 42);
        assert_eq!(params.width, 80);
        assert_eq!(params.terrain, TerrainSettings::default());
        assert_eq!(params.realms.smoothing_passes, 2);
    }

    #[test]
    fn nested_tables_override_fields() {
        let params = WorldGenerationParams::from_toml_str(
            r#"
            seed = 7
            width = 32
            realm_count = 4

            [terrain]
            falloff = "Edge"
            sea_level = 0.35

            [terrain.elevation]
            octaves = 3

            [climate]
            prevailing_wind = "North"

            [realms]
            min_capital_distance = 6
            smoothing_passes = 4
            "#,
        )
        .unwrap();
        assert_eq!(params.width, 32);
        assert_eq!(params.height, 60);
        assert_eq!(params.terrain.falloff, FalloffMode::Edge);
        assert_eq!(params.terrain.elevation.octaves, 3);
        assert!((params.terrain.elevation.lacunarity - 2.0).abs() < f32::EPSILON);
        assert_eq!(params.climate.prevailing_wind, PrevailingWind::North);
        assert_eq!(params.realms.min_capital_distance, Some(6));
        assert_eq!(params.realms.smoothing_passes, 4);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = WorldGenerationParams::from_toml_str(
            "seed = 1\n[realms]\nmajority_ratio = 0.3\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WorldError::InvalidParameter {
                name: "realms.majority_ratio",
                ..
            }
        ));

        let mut params = WorldGenerationParams::default();
        params.terrain.elevation.octaves = 0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn reads_config_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.toml");
        std::fs::write(&path, "seed = 9\nheight = 24\n").unwrap();
        let params = WorldGenerationParams::from_toml_file(&path).unwrap();
        assert_eq!(params.seed, 9);
        assert_eq!(params.height, 24);
    }
}
