use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use realmforge::render::{biome_ascii, realm_ascii, render_biomes, render_realms, save_png};
use realmforge::{
    ComponentSeeds, Grid, RealmPartition, TERRAIN_SCHEMA, WorldGenerationParams, WorldType,
    check_schema, generate_world, paint_realms_with, parse_seed, synthesize_terrain_with,
};
use tracing_subscriber::EnvFilter;

/// Генератор миров: рельеф, реки, биомы и государства из одного сида
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Полный мир (world.v1): рельеф и государства
    Generate {
        #[command(flatten)]
        world: WorldArgs,

        /// Количество государств (перекрывает конфиг)
        #[arg(short, long)]
        realms: Option<usize>,

        /// Путь для сохранения снимка мира
        #[arg(short, long, default_value = "world.json")]
        output: PathBuf,

        #[command(flatten)]
        preview: PreviewArgs,
    },

    /// Только рельеф (terrain.v1)
    Terrain {
        #[command(flatten)]
        world: WorldArgs,

        /// Путь для сохранения сетки рельефа
        #[arg(short, long, default_value = "terrain.json")]
        output: PathBuf,

        #[command(flatten)]
        preview: PreviewArgs,
    },

    /// Раскраска государств поверх готового файла terrain.v1
    Paint {
        /// Файл рельефа в формате terrain.v1
        #[arg(short, long)]
        input: PathBuf,

        /// Количество государств
        #[arg(short, long, default_value_t = 6)]
        realms: usize,

        /// Сид раскраски (десятичный или 0x-шестнадцатеричный); по умолчанию — из сида рельефа
        #[arg(short, long, value_parser = parse_seed)]
        seed: Option<u64>,

        /// Путь к TOML-конфигу (используется секция [realms])
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Путь для сохранения разбиения realms.v1
        #[arg(short, long, default_value = "realms.json")]
        output: PathBuf,

        #[command(flatten)]
        preview: PreviewArgs,
    },
}

#[derive(clap::Args, Debug)]
struct WorldArgs {
    /// Путь к конфигурационному файлу в формате TOML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Мастер-сид (десятичный или 0x-шестнадцатеричный)
    #[arg(short, long, value_parser = parse_seed)]
    seed: Option<u64>,

    /// Пресет рельефа: continent, archipelago, highlands, inland-sea, open
    #[arg(long, value_parser = parse_world_type)]
    world_type: Option<WorldType>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,
}

#[derive(clap::Args, Debug)]
struct PreviewArgs {
    /// Каталог для PNG-превью
    #[arg(long)]
    png_dir: Option<PathBuf>,

    /// Пикселей на тайл в PNG-превью
    #[arg(long, default_value_t = 8)]
    scale: u32,

    /// Напечатать ASCII-превью
    #[arg(long)]
    ascii: bool,

    /// ASCII-превью без ANSI-цветов
    #[arg(long)]
    no_color: bool,
}

fn parse_world_type(s: &str) -> Result<WorldType, String> {
    match s.to_ascii_lowercase().as_str() {
        "continent" => Ok(WorldType::Continent),
        "archipelago" => Ok(WorldType::Archipelago),
        "highlands" => Ok(WorldType::Highlands),
        "inland-sea" | "inland_sea" | "inlandsea" => Ok(WorldType::InlandSea),
        "open" => Ok(WorldType::Open),
        other => Err(format!("unknown world type `{other}`")),
    }
}

impl WorldArgs {
    fn load_params(&self) -> realmforge::Result<WorldGenerationParams> {
        let mut params = match &self.config {
            Some(path) => {
                println!("🔍 Загрузка конфигурации из {}...", path.display());
                WorldGenerationParams::from_toml_file(path)?
            }
            None => WorldGenerationParams::default(),
        };
        if let Some(world_type) = self.world_type {
            params.terrain = world_type.default_terrain();
        }
        if let Some(seed) = self.seed {
            params.seed = seed;
        }
        if let Some(width) = self.width {
            params.width = width;
        }
        if let Some(height) = self.height {
            params.height = height;
        }
        Ok(params)
    }
}

fn write_json<T: serde::Serialize>(value: &T, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    println!("Сохранение в {}", path.display());
    Ok(())
}

fn write_previews(
    grid: &Grid,
    realms: Option<&[realmforge::Realm]>,
    preview: &PreviewArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = &preview.png_dir {
        fs::create_dir_all(dir)?;
        let biomes = dir.join("biomes.png");
        save_png(&render_biomes(grid, preview.scale)?, &biomes)?;
        println!("Карта биомов: {}", biomes.display());
        if let Some(realms) = realms {
            let political = dir.join("realms.png");
            save_png(&render_realms(grid, realms, preview.scale)?, &political)?;
            println!("Политическая карта: {}", political.display());
        }
    }
    if preview.ascii {
        println!("\n{}", biome_ascii(grid));
        if realms.is_some() {
            println!("\n{}", realm_ascii(grid, !preview.no_color));
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            world,
            realms,
            output,
            preview,
        } => {
            let mut params = world.load_params()?;
            if let Some(realms) = realms {
                params.realm_count = realms;
            }
            println!(
                "Генерация мира (размер: {}×{}, сид: {}, государств: {})...",
                params.width, params.height, params.seed, params.realm_count
            );
            let snapshot = generate_world(&params)?;
            fs::write(&output, snapshot.to_json()?)?;
            println!("Сохранение в {}", output.display());

            write_previews(snapshot.grid(), Some(snapshot.realms()), &preview)?;
            for realm in snapshot.realms() {
                println!(
                    "  {:>2} {:<12} столица ({}, {}), тайлов: {}, соседей: {}",
                    realm.id,
                    realm.name,
                    realm.capital.row,
                    realm.capital.col,
                    realm.area,
                    realm.neighbors.len()
                );
            }
        }

        Command::Terrain {
            world,
            output,
            preview,
        } => {
            let params = world.load_params()?;
            println!(
                "Генерация рельефа (размер: {}×{}, сид: {})...",
                params.width, params.height, params.seed
            );
            let seeds = ComponentSeeds::derive(params.seed);
            let grid = synthesize_terrain_with(params.width, params.height, seeds.terrain, &params)?;
            write_json(&grid, &output)?;
            write_previews(&grid, None, &preview)?;
            println!("Суша: {} тайлов, рек: {}", grid.land_count(), grid.rivers.len());
        }

        Command::Paint {
            input,
            realms,
            seed,
            config,
            output,
            preview,
        } => {
            println!("🔍 Загрузка рельефа из {}...", input.display());
            let grid: Grid = serde_json::from_str(&fs::read_to_string(&input)?)?;
            check_schema(&grid.schema, TERRAIN_SCHEMA)?;

            let settings = match &config {
                Some(path) => WorldGenerationParams::from_toml_file(path)?.realms,
                None => realmforge::RealmSettings::default(),
            };
            let seed = seed.unwrap_or(grid.seed);
            println!("Раскраска {realms} государств (сид: {seed})...");
            let (painted, realm_list) = paint_realms_with(&grid, realms, seed, &settings)?;

            write_previews(&painted, Some(realm_list.as_slice()), &preview)?;
            write_json(&RealmPartition::new(seed, &painted, realm_list), &output)?;
        }
    }

    println!("\nГотово!");
    Ok(())
}
