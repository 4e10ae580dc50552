// src/noise.rs
//! Многооктавное шумовое поле
//!
//! Каждая октава — отдельный экземпляр OpenSimplex2 из `FastNoiseLite` со своим
//! смещением сида. Октавы суммируются с ростом частоты (`lacunarity`) и
//! затуханием амплитуды (`persistence`), сумма нормируется на сумму амплитуд.
//! Поле не имеет изменяемого состояния: `sample` можно звать из любых потоков в
//! любом порядке.

use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};

use crate::config::NoiseSettings;
use crate::seed::fold_to_i32;

/// Смещение сида между октавами
const OCTAVE_SEED_STEP: i32 = 31_337;

/// Смещения координат для двух каналов искажения
const WARP_OFFSET_X: (f32, f32) = (5.2, 1.3);
const WARP_OFFSET_Y: (f32, f32) = (1.7, 9.2);

struct Octave {
    noise: FastNoiseLite,
    frequency: f32,
    amplitude: f32,
}

/// Детерминированное 2D-поле шума со значениями в `[-1, 1]`
pub struct NoiseField {
    octaves: Vec<Octave>,
    total_amplitude: f32,
}

impl NoiseField {
    #[must_use]
    pub fn new(seed: u64, settings: &NoiseSettings) -> Self {
        let base_seed = fold_to_i32(seed);
        let mut octaves = Vec::with_capacity(settings.octaves as usize);
        let mut frequency = settings.frequency;
        let mut amplitude = 1.0f32;
        let mut total_amplitude = 0.0f32;

        for i in 0..settings.octaves.max(1) {
            let mut noise = FastNoiseLite::new();
            noise.set_seed(Some(
                base_seed.wrapping_add((i as i32).wrapping_mul(OCTAVE_SEED_STEP)),
            ));
            noise.set_noise_type(Some(NoiseType::OpenSimplex2));
            noise.set_fractal_type(Some(FractalType::None));
            noise.set_frequency(Some(1.0));

            octaves.push(Octave {
                noise,
                frequency,
                amplitude,
            });
            total_amplitude += amplitude;
            amplitude *= settings.persistence;
            frequency *= settings.lacunarity;
        }

        Self {
            octaves,
            total_amplitude,
        }
    }

    /// Значение поля в точке `(x, y)`, `[-1, 1]`
    #[must_use]
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let sum: f32 = self
            .octaves
            .iter()
            .map(|o| o.noise.get_noise_2d(x * o.frequency, y * o.frequency) * o.amplitude)
            .sum();
        (sum / self.total_amplitude).clamp(-1.0, 1.0)
    }

    /// Значение с искажением координат (domain warping): точка выборки сдвигается
    /// на величину, взятую из того же поля в смещённых координатах.
    #[must_use]
    pub fn sample_warped(&self, x: f32, y: f32, strength: f32) -> f32 {
        if strength <= 0.0 {
            return self.sample(x, y);
        }
        let wx = self.sample(x + WARP_OFFSET_X.0, y + WARP_OFFSET_X.1);
        let wy = self.sample(x + WARP_OFFSET_Y.0, y + WARP_OFFSET_Y.1);
        self.sample(x + wx * strength, y + wy * strength)
    }

    #[must_use]
    pub fn octave_count(&self) -> usize {
        self.octaves.len()
    }
}

/// Переводит значение шума из `[-1, 1]` в `[0, 1]`
#[must_use]
pub fn to_unit(value: f32) -> f32 {
    ((value + 1.0) * 0.5).clamp(0.0, 1.0)
}
