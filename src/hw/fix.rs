//! Fix (text) layer
//!
//! A 40×32 grid of 8×8 cells drawn over every sprite, meant for HUDs and
//! debug readouts. Cells live in VRAM column-major (`addr = base + x*32 + y`)
//! and pack a 4-bit palette with a 12-bit tile index. Tiles 0x20..=0x7E are
//! the console's built-in ASCII glyphs, so text writes are just character
//! bytes.
//!
//! CRT overscan eats the outer cells; [`Layout`] aligns text within the safe
//! region instead of making every caller remember the margins.

use super::vram::FIX_BASE;
use super::Vram;

pub const FIX_WIDTH: u8 = 40;
pub const FIX_HEIGHT: u8 = 32;

/// Overscan-safe region, inclusive cell coordinates
pub const FIX_SAFE_LEFT: u8 = 1;
pub const FIX_SAFE_RIGHT: u8 = 38;
pub const FIX_SAFE_TOP: u8 = 2;
pub const FIX_SAFE_BOTTOM: u8 = 29;

/// Pack a fix cell word
#[inline]
pub const fn cell(palette: u8, tile: u16) -> u16 {
    (((palette & 0x0F) as u16) << 12) | (tile & 0x0FFF)
}

#[inline]
const fn cell_addr(x: u8, y: u8) -> u16 {
    FIX_BASE + ((x as u16) << 5) + y as u16
}

/// Write one cell. Out-of-grid coordinates are dropped.
pub fn put(vram: &mut Vram, x: u8, y: u8, tile: u16, palette: u8) {
    if x >= FIX_WIDTH || y >= FIX_HEIGHT {
        return;
    }
    vram.write_at(cell_addr(x, y), cell(palette, tile));
}

/// Clear a rectangle of cells
pub fn clear_rect(vram: &mut Vram, x: u8, y: u8, w: u8, h: u8) {
    if x >= FIX_WIDTH {
        return;
    }
    let w = w.min(FIX_WIDTH - x);
    for row in 0..h {
        let cy = y + row;
        if cy >= FIX_HEIGHT {
            break;
        }
        // Step 32 words to walk one row across columns
        vram.setup(cell_addr(x, cy), 32);
        vram.clear(w as usize);
    }
}

/// Clear the whole layer
pub fn clear_all(vram: &mut Vram) {
    vram.setup(FIX_BASE, 1);
    vram.clear(FIX_WIDTH as usize * FIX_HEIGHT as usize);
}

/// Write a string starting at a cell, one glyph per cell, clipped at the
/// right edge. Non-ASCII bytes render as '?'.
pub fn text(vram: &mut Vram, x: u8, y: u8, s: &str, palette: u8) {
    if y >= FIX_HEIGHT {
        return;
    }
    let mut cx = x;
    for byte in s.bytes() {
        if cx >= FIX_WIDTH {
            break;
        }
        let glyph = if (0x20..=0x7E).contains(&byte) {
            byte as u16
        } else {
            b'?' as u16
        };
        vram.write_at(cell_addr(cx, y), cell(palette, glyph));
        cx += 1;
    }
}

// ============================================================
// Aligned text layout
// ============================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

/// Where to place a string within the safe region
#[derive(Clone, Copy, Debug)]
pub struct Layout {
    pub h_align: HAlign,
    pub v_align: VAlign,
    pub offset_x: i8,
    pub offset_y: i8,
}

impl Layout {
    pub fn align(h_align: HAlign, v_align: VAlign) -> Layout {
        Layout {
            h_align,
            v_align,
            offset_x: 0,
            offset_y: 0,
        }
    }

    pub fn offset(h_align: HAlign, v_align: VAlign, offset_x: i8, offset_y: i8) -> Layout {
        Layout {
            h_align,
            v_align,
            offset_x,
            offset_y,
        }
    }

    /// Absolute cell position, expressed as a safe-area offset
    pub fn at(x: u8, y: u8) -> Layout {
        Layout {
            h_align: HAlign::Left,
            v_align: VAlign::Top,
            offset_x: x as i8 - FIX_SAFE_LEFT as i8,
            offset_y: y as i8 - FIX_SAFE_TOP as i8,
        }
    }

    fn resolve(&self, text_len: u8) -> (u8, u8) {
        let mut x = match self.h_align {
            HAlign::Left => FIX_SAFE_LEFT as i16,
            HAlign::Center => (FIX_SAFE_LEFT + FIX_SAFE_RIGHT + 1 - text_len) as i16 / 2,
            HAlign::Right => (FIX_SAFE_RIGHT + 1 - text_len) as i16,
        };
        let mut y = match self.v_align {
            VAlign::Top => FIX_SAFE_TOP as i16,
            VAlign::Middle => (FIX_SAFE_TOP + FIX_SAFE_BOTTOM) as i16 / 2,
            VAlign::Bottom => FIX_SAFE_BOTTOM as i16,
        };
        x += self.offset_x as i16;
        y += self.offset_y as i16;
        (
            x.clamp(0, FIX_WIDTH as i16 - 1) as u8,
            y.clamp(0, FIX_HEIGHT as i16 - 1) as u8,
        )
    }
}

/// Write an aligned string
pub fn print(vram: &mut Vram, layout: Layout, palette: u8, s: &str) {
    let (x, y) = layout.resolve(s.len().min(FIX_WIDTH as usize) as u8);
    text(vram, x, y, s, palette);
}
