// src/render.rs
//! Превью карт: PNG (биомы с реками, государства со столицами) и ASCII для терминала.
//!
//! Один тайл рисуется квадратом `scale × scale` пикселей. Цвета биомов берутся из
//! [`Biome::to_rgb`], цвета государств выводятся из id, так что одинаковые
//! снимки дают одинаковые картинки.

use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

use crate::biome::Biome;
use crate::error::{Result, WorldError};
use crate::grid::Grid;
use crate::realm::Realm;

const RIVER_RGB: [u8; 3] = [40, 110, 220];
const CAPITAL_RGB: [u8; 3] = [20, 20, 20];
const REALM_GLYPHS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const ANSI_COLORS: [&str; 7] = [
    "\x1b[91m", "\x1b[92m", "\x1b[93m", "\x1b[94m", "\x1b[95m", "\x1b[96m", "\x1b[90m",
];
const ANSI_RESET: &str = "\x1b[0m";
/// Предел холста: 2^28 пикселей (около 800 МБ RGB)
const MAX_CANVAS_PIXELS: u64 = 1 << 28;

/// Размер холста в пикселях; ноль, переполнение и слишком большой холст —
/// ошибка параметра `scale`
fn canvas_size(grid: &Grid, scale: u32) -> Result<(u32, u32)> {
    let invalid = |reason: String| WorldError::InvalidParameter {
        name: "scale",
        reason,
    };
    if scale == 0 {
        return Err(invalid("must be positive".to_string()));
    }
    match (grid.width.checked_mul(scale), grid.height.checked_mul(scale)) {
        (Some(w), Some(h)) if u64::from(w) * u64::from(h) <= MAX_CANVAS_PIXELS => Ok((w, h)),
        _ => Err(invalid(format!(
            "{}x{} tiles at scale {scale} exceed the image size limit",
            grid.width, grid.height
        ))),
    }
}

fn fill_tile(img: &mut RgbImage, row: u32, col: u32, scale: u32, rgb: [u8; 3]) {
    let rect = Rect::at((col * scale) as i32, (row * scale) as i32).of_size(scale, scale);
    draw_filled_rect_mut(img, rect, Rgb(rgb));
}

/// Цвет государства: оттенки по золотому сечению, насыщенность и яркость постоянны
#[must_use]
pub fn realm_color(id: u32) -> [u8; 3] {
    let hue = (id as f32 * 0.618_034).fract() * 6.0;
    let (s, v) = (0.55_f32, 0.85_f32);
    let c = v * s;
    let x = c * (1.0 - (hue % 2.0 - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match hue as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_byte = |channel: f32| ((channel + m) * 255.0).round() as u8;
    [to_byte(r), to_byte(g), to_byte(b)]
}

fn darken(rgb: [u8; 3]) -> [u8; 3] {
    rgb.map(|c| (u16::from(c) * 3 / 5) as u8)
}

/// Карта биомов; реки — полоса по центру тайла
pub fn render_biomes(grid: &Grid, scale: u32) -> Result<RgbImage> {
    let (w, h) = canvas_size(grid, scale)?;
    let mut img = RgbImage::new(w, h);

    for tile in &grid.tiles {
        fill_tile(&mut img, tile.row, tile.col, scale, tile.biome.to_rgb());
        if tile.river && tile.is_land() {
            let inset = scale / 4;
            let size = (scale - 2 * inset).max(1);
            let rect = Rect::at(
                (tile.col * scale + inset) as i32,
                (tile.row * scale + inset) as i32,
            )
            .of_size(size, size);
            draw_filled_rect_mut(&mut img, rect, Rgb(RIVER_RGB));
        }
    }
    Ok(img)
}

/// Политическая карта: территории, затемнённые границы, кружки столиц
pub fn render_realms(grid: &Grid, realms: &[Realm], scale: u32) -> Result<RgbImage> {
    let (w, h) = canvas_size(grid, scale)?;
    let mut img = RgbImage::new(w, h);

    for tile in &grid.tiles {
        let rgb = match tile.realm {
            Some(id) => realm_color(id),
            None => Biome::Ocean.to_rgb(),
        };
        fill_tile(&mut img, tile.row, tile.col, scale, rgb);
    }

    for realm in realms {
        let border = darken(realm_color(realm.id));
        for c in &realm.border {
            fill_tile(&mut img, c.row, c.col, scale, border);
        }
    }

    let radius = (scale / 2).max(1) as i32;
    for realm in realms {
        let center = (
            (realm.capital.col * scale + scale / 2) as i32,
            (realm.capital.row * scale + scale / 2) as i32,
        );
        draw_filled_circle_mut(&mut img, center, radius, Rgb(CAPITAL_RGB));
    }
    Ok(img)
}

pub fn save_png(img: &RgbImage, path: impl AsRef<Path>) -> Result<()> {
    img.save(path)?;
    Ok(())
}

/// ASCII-карта биомов, строка на ряд; тайлы с рекой — `≈`
#[must_use]
pub fn biome_ascii(grid: &Grid) -> String {
    grid.tiles
        .chunks(grid.width.max(1) as usize)
        .map(|row| {
            row.iter()
                .map(|t| {
                    if t.river && t.is_land() {
                        '≈'
                    } else {
                        t.biome.glyph()
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// ASCII-карта государств: буква по id, океан — `~`; цвет — ANSI-коды
#[must_use]
pub fn realm_ascii(grid: &Grid, use_color: bool) -> String {
    let glyphs: Vec<char> = REALM_GLYPHS.chars().collect();
    grid.tiles
        .chunks(grid.width.max(1) as usize)
        .map(|row| {
            let mut line = String::new();
            for tile in row {
                match tile.realm {
                    None => line.push('~'),
                    Some(id) => {
                        let ch = glyphs[id as usize % glyphs.len()];
                        if use_color {
                            line.push_str(ANSI_COLORS[id as usize % ANSI_COLORS.len()]);
                            line.push(ch);
                            line.push_str(ANSI_RESET);
                        } else {
                            line.push(ch);
                        }
                    }
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
