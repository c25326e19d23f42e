//! VRAM word table and write cursor
//!
//! One flat 16-bit address space holding every control bank the display chip
//! reads. Writes go through the same cursor interface the real chip exposes:
//! set an address, set a signed auto-increment, then stream data words. The
//! streaming engines lean on the cursor (and on read-modify-write of single
//! words) exactly the way they would on hardware.
//!
//! Map:
//! - `0x0000..0x7000` SCB1: 64 words per sprite, 32 rows × (tile, attr)
//! - `0x7000..0x7500` fix layer: 40×32 cells, column-major
//! - `0x8000..0x8200` SCB2: shrink words
//! - `0x8200..0x8400` SCB3: Y/height words
//! - `0x8400..0x8600` SCB4: X words

/// Total mapped words
pub const VRAM_WORDS: usize = 0x8800;

pub const SCB1_BASE: u16 = 0x0000;
pub const FIX_BASE: u16 = 0x7000;
pub const SCB2_BASE: u16 = 0x8000;
pub const SCB3_BASE: u16 = 0x8200;
pub const SCB4_BASE: u16 = 0x8400;

/// Words per sprite in SCB1 (32 rows × tile word + attr word)
pub const SCB1_SPRITE_WORDS: u16 = 64;

/// The display chip's video memory plus its write cursor.
pub struct Vram {
    words: Vec<u16>,
    addr: u16,
    step: i16,
}

impl Vram {
    pub fn new() -> Vram {
        Vram {
            words: vec![0; VRAM_WORDS],
            addr: 0,
            step: 1,
        }
    }

    /// Position the write cursor
    #[inline]
    pub fn set_addr(&mut self, addr: u16) {
        self.addr = addr;
    }

    /// Set the signed auto-increment applied after each `write`
    #[inline]
    pub fn set_step(&mut self, step: i16) {
        self.step = step;
    }

    /// Position the cursor and set the increment in one call
    #[inline]
    pub fn setup(&mut self, addr: u16, step: i16) {
        self.addr = addr;
        self.step = step;
    }

    /// Write one word at the cursor, then advance by the increment.
    ///
    /// Addresses past the mapped range hit open bus and are dropped.
    #[inline]
    pub fn write(&mut self, value: u16) {
        let i = self.addr as usize;
        if i < VRAM_WORDS {
            self.words[i] = value;
        }
        self.addr = self.addr.wrapping_add(self.step as u16);
    }

    /// Write the same word `count` times through the cursor
    pub fn fill(&mut self, value: u16, count: usize) {
        for _ in 0..count {
            self.write(value);
        }
    }

    /// Zero `count` words through the cursor
    pub fn clear(&mut self, count: usize) {
        self.fill(0, count);
    }

    /// Read a word directly (no cursor movement)
    #[inline]
    pub fn read(&self, addr: u16) -> u16 {
        let i = addr as usize;
        if i < VRAM_WORDS {
            self.words[i]
        } else {
            0
        }
    }

    /// Write a word directly (no cursor movement)
    #[inline]
    pub fn write_at(&mut self, addr: u16, value: u16) {
        let i = addr as usize;
        if i < VRAM_WORDS {
            self.words[i] = value;
        }
    }

    /// Zero the whole table
    pub fn reset(&mut self) {
        self.words.fill(0);
        self.addr = 0;
        self.step = 1;
    }
}

impl Default for Vram {
    fn default() -> Self {
        Vram::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_step() {
        let mut vram = Vram::new();
        vram.setup(0x0100, 1);
        vram.write(0xAAAA);
        vram.write(0xBBBB);
        assert_eq!(vram.read(0x0100), 0xAAAA);
        assert_eq!(vram.read(0x0101), 0xBBBB);
    }

    #[test]
    fn test_cursor_wide_step() {
        // Fix layer updates step 32 words to move one cell right
        let mut vram = Vram::new();
        vram.setup(FIX_BASE, 32);
        vram.write(1);
        vram.write(2);
        vram.write(3);
        assert_eq!(vram.read(FIX_BASE), 1);
        assert_eq!(vram.read(FIX_BASE + 32), 2);
        assert_eq!(vram.read(FIX_BASE + 64), 3);
    }

    #[test]
    fn test_negative_step() {
        let mut vram = Vram::new();
        vram.setup(0x0010, -1);
        vram.write(7);
        vram.write(8);
        assert_eq!(vram.read(0x0010), 7);
        assert_eq!(vram.read(0x000F), 8);
    }

    #[test]
    fn test_open_bus_write_dropped() {
        let mut vram = Vram::new();
        vram.setup(0x87FF, 1);
        vram.write(1); // last mapped word
        vram.write(2); // open bus
        assert_eq!(vram.read(0x87FF), 1);
        assert_eq!(vram.read(0x8800), 0);
    }

    #[test]
    fn test_fill_and_reset() {
        let mut vram = Vram::new();
        vram.setup(SCB3_BASE, 1);
        vram.fill(0x1234, 4);
        assert_eq!(vram.read(SCB3_BASE + 3), 0x1234);
        vram.reset();
        assert_eq!(vram.read(SCB3_BASE + 3), 0);
    }
}
