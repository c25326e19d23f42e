//! Range-oriented sprite table writers
//!
//! Renderers deal in contiguous sprite ranges: a multi-column entity writes
//! one tile column per sprite, chains the columns with the sticky bit so Y,
//! height and vertical shrink come from the first column, and spaces X by
//! the zoom-scaled tile width. Everything here is a thin, ordered series of
//! cursor writes into [`Vram`].

use super::scb::{spread_shrink, Shrink, SpriteX, SpriteY, TileAttr};
use super::vram::{SCB1_SPRITE_WORDS, SCB1_BASE, SCB2_BASE, SCB3_BASE, SCB4_BASE};
use super::{Vram, SPRITE_FIRST, SPRITE_MAX, SPRITE_MAX_HEIGHT};

/// Write one sprite's tile column: `rows` (tile, attr) pairs, zero-padding
/// the remaining rows so stale garbage can't show through when the height
/// later grows.
pub fn write_tiles(vram: &mut Vram, sprite: u16, rows: u8, tiles: &[u16], attrs: &[TileAttr]) {
    let rows = (rows as usize).min(tiles.len()).min(attrs.len());
    vram.setup(SCB1_BASE + sprite * SCB1_SPRITE_WORDS, 1);
    for row in 0..rows {
        vram.write(tiles[row]);
        vram.write(attrs[row].0);
    }
    for _ in rows..SPRITE_MAX_HEIGHT as usize {
        vram.write(0);
        vram.write(0);
    }
}

/// Overwrite a single tile row of one sprite
pub fn write_tile(vram: &mut Vram, sprite: u16, row: u8, tile: u16, attr: TileAttr) {
    vram.setup(SCB1_BASE + sprite * SCB1_SPRITE_WORDS + (row as u16) * 2, 1);
    vram.write(tile);
    vram.write(attr.0);
}

/// Uniform shrink for a range
pub fn write_shrink(vram: &mut Vram, first: u16, count: u8, shrink: Shrink) {
    if count == 0 {
        return;
    }
    vram.setup(SCB2_BASE + first, 1);
    vram.fill(shrink.0, count as usize);
}

/// Shrink for a range at 8-bit horizontal precision, Bresenham-spread
/// across the columns (see [`spread_shrink`])
pub fn write_shrink_spread(vram: &mut Vram, first: u16, count: u8, h8: u8, v: u8) {
    if count == 0 {
        return;
    }
    vram.setup(SCB2_BASE + first, 1);
    for word in spread_shrink(h8, v, count) {
        vram.write(word.0);
    }
}

/// Y/height for a chained range: the first column carries position and
/// height, the rest only the sticky bit
pub fn write_y_chain(vram: &mut Vram, first: u16, count: u8, screen_y: i16, height: u8) {
    if count == 0 {
        return;
    }
    vram.setup(SCB3_BASE + first, 1);
    vram.write(SpriteY::new(screen_y, height).0);
    if count > 1 {
        vram.fill(SpriteY::STICKY.0, count as usize - 1);
    }
}

/// Same Y/height word for every column (ring layers position columns
/// independently, so they cannot use the sticky chain)
pub fn write_y_uniform(vram: &mut Vram, first: u16, count: u8, screen_y: i16, height: u8) {
    if count == 0 {
        return;
    }
    vram.setup(SCB3_BASE + first, 1);
    vram.fill(SpriteY::new(screen_y, height).0, count as usize);
}

/// X for a single sprite
pub fn write_x(vram: &mut Vram, sprite: u16, screen_x: i16) {
    vram.write_at(SCB4_BASE + sprite, SpriteX::new(screen_x).0);
}

/// X for a range, stepping `spacing` pixels per column. At zoom `z` a
/// 16-pixel tile covers exactly `z` screen pixels, so callers pass the
/// zoom factor as the spacing.
pub fn write_x_spaced(vram: &mut Vram, first: u16, count: u8, base_x: i16, spacing: i16) {
    if count == 0 {
        return;
    }
    vram.setup(SCB4_BASE + first, 1);
    let mut x = base_x;
    for _ in 0..count {
        vram.write(SpriteX::new(x).0);
        x = x.wrapping_add(spacing);
    }
}

/// Read back a sprite's current X word (the parallax ring relocates columns
/// by read-modify-write of this word)
pub fn read_x(vram: &Vram, sprite: u16) -> SpriteX {
    SpriteX(vram.read(SCB4_BASE + sprite))
}

/// Read back a sprite's current Y/height word
pub fn read_y(vram: &Vram, sprite: u16) -> SpriteY {
    SpriteY(vram.read(SCB3_BASE + sprite))
}

/// Hide a range by zeroing its Y/height words (height 0 draws nothing)
pub fn hide(vram: &mut Vram, first: u16, count: u16) {
    if count == 0 {
        return;
    }
    vram.setup(SCB3_BASE + first, 1);
    vram.clear(count as usize);
}

/// Hide every sprite in the table
pub fn hide_all(vram: &mut Vram) {
    hide(vram, 0, SPRITE_FIRST + SPRITE_MAX);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_tiles_pads_to_32() {
        let mut vram = Vram::new();
        let tiles = [0x100, 0x101, 0x102];
        let attrs = [TileAttr::new(5, false, false); 3];
        write_tiles(&mut vram, 10, 3, &tiles, &attrs);

        let base = SCB1_BASE + 10 * SCB1_SPRITE_WORDS;
        assert_eq!(vram.read(base), 0x100);
        assert_eq!(vram.read(base + 1), 0x0500);
        assert_eq!(vram.read(base + 4), 0x102);
        // Padded rows zeroed
        assert_eq!(vram.read(base + 6), 0);
        assert_eq!(vram.read(base + 63), 0);
    }

    #[test]
    fn test_y_chain_sticky_tail() {
        let mut vram = Vram::new();
        write_y_chain(&mut vram, 20, 4, 48, 6);
        assert_eq!(read_y(&vram, 20), SpriteY::new(48, 6));
        for col in 1..4 {
            assert_eq!(read_y(&vram, 20 + col), SpriteY::STICKY);
        }
    }

    #[test]
    fn test_y_uniform() {
        let mut vram = Vram::new();
        write_y_uniform(&mut vram, 30, 3, 100, 14);
        for col in 0..3 {
            assert_eq!(read_y(&vram, 30 + col), SpriteY::new(100, 14));
        }
    }

    #[test]
    fn test_x_spacing_follows_zoom() {
        let mut vram = Vram::new();
        write_x_spaced(&mut vram, 5, 3, 40, 12); // zoom 12: columns 12px apart
        assert_eq!(read_x(&vram, 5).screen_x(), 40);
        assert_eq!(read_x(&vram, 6).screen_x(), 52);
        assert_eq!(read_x(&vram, 7).screen_x(), 64);
    }

    #[test]
    fn test_hide_zeroes_scb3() {
        let mut vram = Vram::new();
        write_y_uniform(&mut vram, 50, 4, 10, 8);
        hide(&mut vram, 51, 2);
        assert_eq!(read_y(&vram, 50).height(), 8);
        assert_eq!(read_y(&vram, 51), SpriteY::HIDDEN);
        assert_eq!(read_y(&vram, 52), SpriteY::HIDDEN);
        assert_eq!(read_y(&vram, 53).height(), 8);
    }

    #[test]
    fn test_shrink_uniform_and_spread() {
        let mut vram = Vram::new();
        write_shrink(&mut vram, 60, 2, Shrink::new(9, 0xA0));
        assert_eq!(vram.read(SCB2_BASE + 60), 0x09A0);
        assert_eq!(vram.read(SCB2_BASE + 61), 0x09A0);

        write_shrink_spread(&mut vram, 70, 16, 0x88, 0x55);
        let bumped = (0..16)
            .filter(|i| Shrink(vram.read(SCB2_BASE + 70 + i)).h() == 9)
            .count();
        assert_eq!(bumped, 8);
    }
}
