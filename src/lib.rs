pub mod biome;
pub mod climate;
pub mod config;
pub mod error;
pub mod grid;
pub mod noise;
pub mod realm;
pub mod render;
pub mod rivers;
pub mod seed;
pub mod terrain;
pub mod world;

pub use biome::Biome;
pub use config::{
    BiomeThresholds, ClimateSettings, FalloffMode, HydrologySettings, NoiseSettings,
    PrevailingWind, RealmSettings, TerrainSettings, WorldGenerationParams, WorldType,
};
pub use error::{Result, WorldError, check_schema};
pub use grid::{Coord, Grid, TERRAIN_SCHEMA, Tile};
pub use realm::{REALM_SCHEMA, Realm, RealmPartition, paint_realms, paint_realms_with};
pub use rivers::{River, RiverOutlet};
pub use seed::{ComponentSeeds, derive_seed, parse_seed};
pub use terrain::{synthesize_terrain, synthesize_terrain_with};
pub use world::{WORLD_SCHEMA, WorldSnapshot, generate_world};
