//! Hardware model
//!
//! The NOVA-380's display chip composites everything from a fixed table of
//! 380 tile-sprites plus a 40×32 fix (text) layer, all driven by 16-bit
//! control words in VRAM. This module is the software model of that chip:
//! [`Vram`] is the word table with the real address/modulo write cursor,
//! [`scb`] holds the packed control-word value types, [`sprite`] the
//! range-oriented writers the renderers use, and [`display`] decodes the
//! whole table into an RGBA frame for the shell.
//!
//! Game-facing code never touches pixels; it writes the same words the real
//! silicon would read.

pub mod display;
pub mod fix;
pub mod font;
pub mod scb;
pub mod sprite;
pub mod vram;

pub use display::{Display, TileArt};
pub use scb::{Shrink, SpriteX, SpriteY, TileAttr};
pub use vram::Vram;

/// Visible screen size in pixels
pub const SCREEN_WIDTH: i32 = 320;
pub const SCREEN_HEIGHT: i32 = 224;

/// Tile edge length in pixels
pub const TILE_SIZE: i32 = 16;

/// First usable sprite entry (entry 0 stays blank)
pub const SPRITE_FIRST: u16 = 1;

/// Number of usable sprite entries
pub const SPRITE_MAX: u16 = 380;

/// Maximum tile rows a single sprite can show
pub const SPRITE_MAX_HEIGHT: u8 = 32;
