// src/error.rs
//! Ошибки генерации мира
//!
//! Все ошибки ядра невосстановимы в точке возникновения: генерация — чистое
//! вычисление над фиксированными входами, повторять нечего. Варианты `Io`,
//! `Toml`, `Json` и `Image` возникают только на внешних слоях (конфиг, CLI, превью).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("invalid dimensions {width}x{height}: width and height must be positive")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("invalid realm count {requested}: the map has {land_tiles} land tiles")]
    InvalidRealmCount { requested: usize, land_tiles: usize },

    #[error("invalid seed {input:?}: {reason}")]
    InvalidSeed { input: String, reason: String },

    #[error("schema mismatch: expected {expected}, found {found}")]
    SchemaMismatch { expected: String, found: String },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, WorldError>;

/// Проверка тега схемы на границе потребителя.
///
/// Ядро само схемы не проверяет: это делают стадии, которые читают готовый
/// снимок (поселения, история, CLI при загрузке файла).
pub fn check_schema(found: &str, expected: &str) -> Result<()> {
    if found == expected {
        Ok(())
    } else {
        Err(WorldError::SchemaMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }
}
