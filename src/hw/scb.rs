//! Sprite control-word value types
//!
//! Every per-sprite register is one packed 16-bit word. These newtypes own
//! the field layout — widths, the inverted/wrapping Y encoding, the sticky
//! chain bit — so call sites never shift bits by hand. The raw words are an
//! external contract: they must match what the display chip decodes, bit for
//! bit.
//!
//! - SCB1 attr: `palette << 8 | v_flip << 1 | h_flip`
//! - SCB2 shrink: `h_nibble << 8 | v_byte`, `0x0FFF` = unscaled
//! - SCB3: `hw_y << 7 | sticky << 6 | height`, hw_y inverted, wraps mod 512
//! - SCB4: `x << 7`, 9-bit X

use super::SPRITE_MAX_HEIGHT;

// ============================================================
// SCB1: tile attribute word
// ============================================================

/// Tile attribute word: palette in the high byte, flip bits in the low two.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TileAttr(pub u16);

impl TileAttr {
    #[inline]
    pub const fn new(palette: u8, h_flip: bool, v_flip: bool) -> TileAttr {
        TileAttr(((palette as u16) << 8) | ((v_flip as u16) << 1) | (h_flip as u16))
    }

    #[inline]
    pub const fn palette(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn h_flip(self) -> bool {
        self.0 & 0x01 != 0
    }

    #[inline]
    pub const fn v_flip(self) -> bool {
        self.0 & 0x02 != 0
    }
}

// ============================================================
// SCB2: shrink word
// ============================================================

/// Shrink word: 4-bit horizontal scale (high nibble of the high byte),
/// 8-bit vertical scale. Maximum field value means no scaling.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Shrink(pub u16);

impl Shrink {
    /// Full size, no scaling
    pub const FULL: Shrink = Shrink(0x0FFF);

    #[inline]
    pub const fn new(h: u8, v: u8) -> Shrink {
        Shrink((((h & 0x0F) as u16) << 8) | v as u16)
    }

    /// Horizontal scale step, 0-15 (15 = full width)
    #[inline]
    pub const fn h(self) -> u8 {
        ((self.0 >> 8) & 0x0F) as u8
    }

    /// Vertical scale, 0-255 (255 = full height)
    #[inline]
    pub const fn v(self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

impl Default for Shrink {
    fn default() -> Self {
        Shrink::FULL
    }
}

/// Spread an 8-bit horizontal scale across `count` adjacent sprite columns.
///
/// The hardware only has 16 horizontal steps per sprite, so a group scaled
/// by `h8/256` is approximated by giving each column the base nibble and
/// bumping `error`-selected columns by one step. Error accumulation (rather
/// than rounding each column independently) keeps the bumps evenly
/// interleaved, which is what avoids visible banding on wide layers.
///
/// `h8` is 0-255 with 255 = full width. Yields one [`Shrink`] per column.
pub fn spread_shrink(h8: u8, v: u8, count: u8) -> ShrinkSpread {
    ShrinkSpread {
        base: h8 >> 4,
        frac: h8 & 0x0F,
        error: count >> 1,
        count,
        emitted: 0,
        v,
    }
}

pub struct ShrinkSpread {
    base: u8,
    frac: u8,
    error: u8,
    count: u8,
    emitted: u8,
    v: u8,
}

impl Iterator for ShrinkSpread {
    type Item = Shrink;

    fn next(&mut self) -> Option<Shrink> {
        if self.emitted >= self.count {
            return None;
        }
        self.emitted += 1;

        // Single column: plain truncation, nothing to distribute
        if self.count == 1 {
            return Some(Shrink::new(self.base, self.v));
        }

        let mut h = self.base;
        self.error += self.frac;
        if self.error >= self.count {
            self.error -= self.count;
            if h < 15 {
                h += 1;
            }
        }
        Some(Shrink::new(h, self.v))
    }
}

// ============================================================
// SCB3: Y position and height
// ============================================================

/// Hardware Y reference: this raw value places a sprite's top at screen Y 0.
pub const HARDWARE_Y_TOP: i16 = 496;

/// Convert screen Y (0 = top, increasing downward) to the chip's inverted
/// 9-bit Y value, wrapping at 512.
#[inline]
pub const fn screen_to_hardware_y(screen_y: i16) -> u16 {
    let mut y = HARDWARE_Y_TOP - screen_y;
    if y < 0 {
        y += 512;
    }
    (y & 0x1FF) as u16
}

/// Visible tile rows after vertical shrink.
///
/// A sprite shrunk to `v_shrink/255` of its height shows proportionally
/// fewer source rows; ceiling division keeps the last partial row on.
/// Clamped to 1..=32.
#[inline]
pub const fn adjusted_height(rows: u8, v_shrink: u8) -> u8 {
    let adjusted = ((rows as u16 * v_shrink as u16) + 254) / 255;
    if adjusted < 1 {
        1
    } else if adjusted > SPRITE_MAX_HEIGHT as u16 {
        SPRITE_MAX_HEIGHT
    } else {
        adjusted as u8
    }
}

/// Y/height word: 9-bit inverted Y, sticky chain bit, 6-bit row count.
///
/// The zero word doubles as "hidden" (height 0 draws nothing), which is how
/// whole ranges get cleared.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SpriteY(pub u16);

impl SpriteY {
    /// Height 0: sprite draws nothing
    pub const HIDDEN: SpriteY = SpriteY(0);

    /// Sticky bit only: inherit Y/height/v-shrink from the sprite to the left
    pub const STICKY: SpriteY = SpriteY(0x40);

    #[inline]
    pub const fn new(screen_y: i16, height: u8) -> SpriteY {
        SpriteY((screen_to_hardware_y(screen_y) << 7) | (height & 0x3F) as u16)
    }

    /// Raw 9-bit hardware Y field
    #[inline]
    pub const fn hardware_y(self) -> u16 {
        self.0 >> 7
    }

    /// Decode back to screen Y. Values in the top quarter of the wrap range
    /// fold negative so off-top parking positions read back as such.
    #[inline]
    pub const fn screen_y(self) -> i16 {
        let y = (HARDWARE_Y_TOP - self.hardware_y() as i16) & 0x1FF;
        if y >= 384 {
            y - 512
        } else {
            y
        }
    }

    #[inline]
    pub const fn height(self) -> u8 {
        (self.0 & 0x3F) as u8
    }

    #[inline]
    pub const fn is_sticky(self) -> bool {
        self.0 & 0x40 != 0
    }
}

// ============================================================
// SCB4: X position
// ============================================================

/// X word: 9-bit X in the high bits, low 7 unused.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SpriteX(pub u16);

impl SpriteX {
    #[inline]
    pub const fn new(screen_x: i16) -> SpriteX {
        SpriteX(((screen_x & 0x1FF) as u16) << 7)
    }

    /// Raw 9-bit hardware X field
    #[inline]
    pub const fn hardware_x(self) -> u16 {
        (self.0 >> 7) & 0x1FF
    }

    /// Decode back to screen X, folding the top of the wrap range negative
    /// (ring columns parked one tile off the left edge read back as -16).
    #[inline]
    pub const fn screen_x(self) -> i16 {
        let x = self.hardware_x() as i16;
        if x >= 384 {
            x - 512
        } else {
            x
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_attr_fields() {
        let attr = TileAttr::new(0x2A, true, false);
        assert_eq!(attr.0, 0x2A01);
        assert_eq!(attr.palette(), 0x2A);
        assert!(attr.h_flip());
        assert!(!attr.v_flip());

        let attr = TileAttr::new(3, false, true);
        assert_eq!(attr.0, 0x0302);
        assert!(attr.v_flip());
    }

    #[test]
    fn test_hardware_y_inversion() {
        assert_eq!(screen_to_hardware_y(0), 496);
        assert_eq!(screen_to_hardware_y(1), 495);
        assert_eq!(screen_to_hardware_y(223), 273);
        // Wrap on underflow: one tile above the top
        assert_eq!(screen_to_hardware_y(496), 0);
        assert_eq!(screen_to_hardware_y(-16), 0);
        assert_eq!(screen_to_hardware_y(-1), 497);
    }

    #[test]
    fn test_sprite_y_word() {
        let w = SpriteY::new(0, 32);
        assert_eq!(w.0, (496 << 7) | 32);
        assert_eq!(w.height(), 32);
        assert_eq!(w.screen_y(), 0);
        assert!(!w.is_sticky());

        assert_eq!(SpriteY::STICKY.0, 0x40);
        assert!(SpriteY::STICKY.is_sticky());
        assert_eq!(SpriteY::HIDDEN.height(), 0);
    }

    #[test]
    fn test_sprite_y_roundtrip() {
        for y in [-16i16, -1, 0, 100, 223, 300] {
            assert_eq!(SpriteY::new(y, 2).screen_y(), y, "y={}", y);
        }
    }

    #[test]
    fn test_sprite_x_word() {
        assert_eq!(SpriteX::new(0).0, 0);
        assert_eq!(SpriteX::new(100).0, 100 << 7);
        assert_eq!(SpriteX::new(100).screen_x(), 100);
        // Negative parks wrap into the 9-bit field
        assert_eq!(SpriteX::new(-16).hardware_x(), 496);
        assert_eq!(SpriteX::new(-16).screen_x(), -16);
    }

    #[test]
    fn test_adjusted_height() {
        assert_eq!(adjusted_height(32, 255), 32);
        assert_eq!(adjusted_height(32, 127), 16);
        assert_eq!(adjusted_height(14, 255), 14);
        assert_eq!(adjusted_height(1, 0), 1); // never fully vanishes
        assert_eq!(adjusted_height(2, 128), 2); // ceiling keeps partial row
    }

    #[test]
    fn test_shrink_fields() {
        assert_eq!(Shrink::FULL.h(), 15);
        assert_eq!(Shrink::FULL.v(), 255);
        let s = Shrink::new(9, 0xA7);
        assert_eq!(s.0, 0x09A7);
        assert_eq!(s.h(), 9);
        assert_eq!(s.v(), 0xA7);
    }

    #[test]
    fn test_spread_full_scale() {
        let cols: Vec<u8> = spread_shrink(255, 255, 6).map(|s| s.h()).collect();
        assert_eq!(cols, vec![15; 6]);
    }

    #[test]
    fn test_spread_exact_nibble() {
        // No fractional part: every column gets the base step
        let cols: Vec<u8> = spread_shrink(0x80, 200, 5).map(|s| s.h()).collect();
        assert_eq!(cols, vec![8; 5]);
    }

    #[test]
    fn test_spread_distributes_evenly() {
        // 0x88 over 16 columns: half the columns bump to 9, interleaved
        let cols: Vec<u8> = spread_shrink(0x88, 0, 16).map(|s| s.h()).collect();
        assert_eq!(cols.len(), 16);
        assert_eq!(cols.iter().filter(|&&h| h == 9).count(), 8);
        assert_eq!(cols.iter().filter(|&&h| h == 8).count(), 8);
        // Interleaved, not front-loaded
        assert_ne!(&cols[0..8], &[9; 8]);
    }

    #[test]
    fn test_spread_single_column_truncates() {
        let cols: Vec<u8> = spread_shrink(0x9F, 3, 1).map(|s| s.h()).collect();
        assert_eq!(cols, vec![9]);
    }

    #[test]
    fn test_spread_vertical_passthrough() {
        for s in spread_shrink(0x40, 0x55, 4) {
            assert_eq!(s.v(), 0x55);
        }
    }
}
