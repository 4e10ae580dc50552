// src/seed.rs
//! Вывод подсидов из мастер-сида
//!
//! Каждая стадия генерации получает собственный сид, вычисленный из пары
//! `(мастер-сид, имя стадии)`. Хеш фиксирован: FNV-1a (64 бита) по байтам имени
//! стадии, XOR с мастер-сидом и финализатор SplitMix64. Глобального состояния ГСЧ
//! нет — генераторы создаются по одному на стадию и передаются явно.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldError};

/// Генератор случайных чисел одной стадии
pub type StageRng = ChaCha8Rng;

pub const STAGE_TERRAIN: &str = "terrain";
pub const STAGE_REALMS: &str = "realms";

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Детерминированно выводит подсид стадии.
///
/// ```
/// use realmforge::seed::derive_seed;
/// assert_eq!(derive_seed(42, "terrain"), derive_seed(42, "terrain"));
/// assert_ne!(derive_seed(42, "terrain"), derive_seed(42, "realms"));
/// ```
#[must_use]
pub fn derive_seed(master_seed: u64, stage: &str) -> u64 {
    splitmix64(master_seed ^ fnv1a(stage.as_bytes()))
}

/// ГСЧ стадии, построенный из выведенного подсида
#[must_use]
pub fn stage_rng(seed: u64, stage: &str) -> StageRng {
    ChaCha8Rng::seed_from_u64(derive_seed(seed, stage))
}

/// Сворачивает 64-битный сид в `i32` для `FastNoiseLite`.
#[must_use]
pub fn fold_to_i32(seed: u64) -> i32 {
    (seed ^ (seed >> 32)) as u32 as i32
}

/// Сиды компонентов мира, выведенные из одного мастер-сида
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSeeds {
    pub terrain: u64,
    pub realms: u64,
}

impl ComponentSeeds {
    #[must_use]
    pub fn derive(master_seed: u64) -> Self {
        Self {
            terrain: derive_seed(master_seed, STAGE_TERRAIN),
            realms: derive_seed(master_seed, STAGE_REALMS),
        }
    }

    /// Представление для снимка мира: имя стадии → сид
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, u64> {
        BTreeMap::from([
            (STAGE_TERRAIN.to_string(), self.terrain),
            (STAGE_REALMS.to_string(), self.realms),
        ])
    }
}

/// Разбирает сид из текста: десятичное число или `0x`-шестнадцатеричное.
pub fn parse_seed(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    let invalid = |reason: &str| WorldError::InvalidSeed {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    if trimmed.is_empty() {
        return Err(invalid("seed is empty"));
    }

    let parsed = if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16)
    } else {
        trimmed.parse::<u64>()
    };

    parsed.map_err(|e| invalid(&format!("expected an unsigned 64-bit integer ({e})")))
}
