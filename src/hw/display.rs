//! Software display
//!
//! Walks the sprite control tables and the fix map in [`Vram`] and decodes
//! them into an RGBA frame, one full screen per call. Higher sprite numbers
//! paint over lower ones, and the fix layer paints over everything, which is
//! the priority order games rely on when they park UI sprites at the top of
//! the table.
//!
//! Tile pixels and palettes are not part of VRAM. They come from a
//! [`TileArt`] implementation, so the decode stays the same whether a game
//! ships real artwork or runs on the built-in procedural patterns.
//!
//! A chained sprite (sticky bit set) takes its vertical placement from the
//! most recent unchained sprite; horizontal placement always comes from its
//! own position word, which every writer in this crate fills in.

use super::font;
use super::scb::{SpriteX, SpriteY, TileAttr};
use super::vram::{self, Vram};
use super::{SCREEN_HEIGHT, SCREEN_WIDTH, SPRITE_FIRST, SPRITE_MAX, TILE_SIZE};

/// Art source for the display decoder.
///
/// Sprite tiles are 16x16 texels of 4-bit color indices. Index 0 is always
/// transparent; what the other fifteen indices of each palette look like is
/// up to the implementation.
pub trait TileArt {
    /// Color index of one texel of a sprite tile, 0..16
    fn tile_pixel(&self, tile: u16, x: usize, y: usize) -> u8;

    /// RGBA for a palette entry, index in 1..16
    fn color(&self, palette: u8, index: u8) -> [u8; 4];

    /// RGBA shown where nothing is drawn
    fn backdrop(&self) -> [u8; 4] {
        [10, 8, 22, 255]
    }

    /// RGBA for fix-layer glyph pixels
    fn fix_color(&self, palette: u8) -> [u8; 4] {
        self.color(palette, 15)
    }
}

fn hash(v: u32) -> u32 {
    let mut h = v.wrapping_mul(0x9E37_79B9);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85EB_CA6B);
    h ^ (h >> 13)
}

/// Built-in art source that derives a pattern from the tile index alone.
///
/// Lets demos and tests run without shipping any artwork. Tile 0 is blank,
/// everything else gets a deterministic bordered, striped or checkered
/// pattern and a palette-keyed color ramp.
pub struct ProceduralArt;

impl TileArt for ProceduralArt {
    fn tile_pixel(&self, tile: u16, x: usize, y: usize) -> u8 {
        if tile == 0 {
            return 0;
        }
        let h = hash(tile as u32);
        let border = x == 0 || y == 0 || x == 15 || y == 15;
        match h & 3 {
            0 => {
                if border {
                    15
                } else {
                    8 + (((x / 4 + y / 4) & 1) as u8) * 4
                }
            }
            1 => 1 + (((x + y) / 2) & 7) as u8,
            2 => {
                if (x / 2 + y / 2) % 2 == 0 {
                    12
                } else {
                    6
                }
            }
            _ => {
                if border {
                    4
                } else {
                    10
                }
            }
        }
    }

    fn color(&self, palette: u8, index: u8) -> [u8; 4] {
        let h = hash(palette as u32 ^ 0x00C0_FFEE);
        let base = [
            96 + (h & 0x7F) as i32,
            96 + ((h >> 8) & 0x7F) as i32,
            96 + ((h >> 16) & 0x7F) as i32,
        ];
        let scale = 40 + index as i32 * 14;
        let channel = |c: i32| ((c * scale) / 255).clamp(0, 255) as u8;
        [channel(base[0]), channel(base[1]), channel(base[2]), 255]
    }
}

/// Decoded screen, RGBA with 4 bytes per pixel
pub struct Display {
    pub pixels: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl Display {
    pub fn new() -> Display {
        let width = SCREEN_WIDTH as usize;
        let height = SCREEN_HEIGHT as usize;
        Display {
            pixels: vec![0; width * height * 4],
            width,
            height,
        }
    }

    /// Decode the whole of VRAM into the frame
    pub fn render(&mut self, vram: &Vram, art: &dyn TileArt) {
        self.clear(art.backdrop());
        self.draw_sprites(vram, art);
        self.draw_fix(vram, art);
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let idx = (y * self.width + x) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    fn clear(&mut self, color: [u8; 4]) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    fn put(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        self.pixels[idx..idx + 4].copy_from_slice(&color);
    }

    fn draw_sprites(&mut self, vram: &Vram, art: &dyn TileArt) {
        let tile = TILE_SIZE as usize;
        let mut chain_top = 0i32;
        let mut chain_rows = 0u8;
        for sprite in SPRITE_FIRST..=SPRITE_MAX {
            let y_word = SpriteY(vram.read(vram::SCB3_BASE + sprite));
            let (top, rows) = if y_word.is_sticky() {
                (chain_top, chain_rows)
            } else {
                chain_top = y_word.screen_y() as i32;
                chain_rows = y_word.height();
                (chain_top, chain_rows)
            };
            if rows == 0 {
                continue;
            }
            let shrink = vram.read(vram::SCB2_BASE + sprite);
            let h_nibble = ((shrink >> 8) & 0xF) as usize;
            let v_byte = (shrink & 0xFF) as u32;
            let left = SpriteX(vram.read(vram::SCB4_BASE + sprite)).screen_x() as i32;
            let out_w = h_nibble + 1;
            let out_h = rows as u32 * tile as u32;
            let scb1 = vram::SCB1_BASE + sprite * vram::SCB1_SPRITE_WORDS;

            for dy in 0..out_h {
                let py = top + dy as i32;
                if py < 0 || py >= self.height as i32 {
                    continue;
                }
                // The writer already folded vertical shrink into the row
                // count, so sampling walks back out across the full strip.
                let src_line = ((dy << 8) / (v_byte + 1)) as usize;
                let row = (src_line / tile).min(31) as u16;
                let art_tile = vram.read(scb1 + row * 2);
                let attr = TileAttr(vram.read(scb1 + row * 2 + 1));
                let ty = if attr.v_flip() {
                    tile - 1 - src_line % tile
                } else {
                    src_line % tile
                };
                for dx in 0..out_w {
                    let px = left + dx as i32;
                    let tx = if attr.h_flip() {
                        tile - 1 - dx * tile / out_w
                    } else {
                        dx * tile / out_w
                    };
                    let index = art.tile_pixel(art_tile, tx, ty);
                    if index != 0 {
                        self.put(px, py, art.color(attr.palette(), index));
                    }
                }
            }
        }
    }

    fn draw_fix(&mut self, vram: &Vram, art: &dyn TileArt) {
        for cx in 0..super::fix::FIX_WIDTH as u16 {
            for cy in 0..super::fix::FIX_HEIGHT as u16 {
                let word = vram.read(vram::FIX_BASE + cx * 32 + cy);
                let glyph = match font::glyph(word & 0x0FFF) {
                    Some(g) => g,
                    None => continue,
                };
                let color = art.fix_color((word >> 12) as u8);
                let base_x = cx as i32 * 8;
                // Rows 0-1 and 30-31 sit outside the 224-line output window
                let base_y = cy as i32 * 8 - 16;
                for (gy, bits) in glyph.iter().enumerate() {
                    for gx in 0..8 {
                        if bits & (0x80 >> gx) != 0 {
                            self.put(base_x + gx, base_y + gy as i32, color);
                        }
                    }
                }
            }
        }
    }
}

impl Default for Display {
    fn default() -> Display {
        Display::new()
    }
}
