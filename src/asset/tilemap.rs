//! Tile grid descriptors

use serde::{Deserialize, Serialize};

use super::AssetError;
use crate::hw::TILE_SIZE;

/// Collision flag bits stored per cell of a tilemap grid
pub mod tile_flags {
    /// Blocks movement from every side
    pub const SOLID: u8 = 0x01;
    /// One-way platform, solid only when falling onto it from above
    pub const PLATFORM: u8 = 0x02;
    /// Left-to-right slope
    pub const SLOPE_L: u8 = 0x04;
    /// Right-to-left slope
    pub const SLOPE_R: u8 = 0x08;
    /// Damages on contact
    pub const HAZARD: u8 = 0x10;
    /// Fires a gameplay trigger on contact
    pub const TRIGGER: u8 = 0x20;
    /// Climbable
    pub const LADDER: u8 = 0x40;
}

/// A large scrollable tile grid.
///
/// `tiles` holds one byte per cell, row-major, each an offset from
/// `base_tile` into tile memory. `collision` mirrors the grid with
/// [`tile_flags`] bits and may be empty for purely decorative maps.
/// `tile_palettes` maps tile offsets (not cells) to palettes; empty means
/// `default_palette` everywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TilemapAsset {
    pub name: String,
    pub width_tiles: u16,
    pub height_tiles: u16,
    pub base_tile: u16,
    pub default_palette: u8,
    pub tiles: Vec<u8>,
    #[serde(default)]
    pub tile_palettes: Vec<u8>,
    #[serde(default)]
    pub collision: Vec<u8>,
}

impl TilemapAsset {
    pub fn new(
        name: &str,
        width_tiles: u16,
        height_tiles: u16,
        base_tile: u16,
        default_palette: u8,
        tiles: Vec<u8>,
    ) -> Result<TilemapAsset, AssetError> {
        let asset = TilemapAsset {
            name: name.to_string(),
            width_tiles,
            height_tiles,
            base_tile,
            default_palette,
            tiles,
            tile_palettes: Vec::new(),
            collision: Vec::new(),
        };
        asset.validate()?;
        Ok(asset)
    }

    /// Attach a collision grid, builder style
    pub fn with_collision(mut self, collision: Vec<u8>) -> Result<TilemapAsset, AssetError> {
        self.collision = collision;
        self.validate()?;
        Ok(self)
    }

    /// Attach a tile-to-palette table, builder style
    pub fn with_tile_palettes(mut self, tile_palettes: Vec<u8>) -> TilemapAsset {
        self.tile_palettes = tile_palettes;
        self
    }

    pub fn cells(&self) -> usize {
        self.width_tiles as usize * self.height_tiles as usize
    }

    pub fn width_pixels(&self) -> i32 {
        self.width_tiles as i32 * TILE_SIZE
    }

    pub fn height_pixels(&self) -> i32 {
        self.height_tiles as i32 * TILE_SIZE
    }

    /// Tile offset at a cell, `None` outside the grid
    pub fn tile_at(&self, col: i32, row: i32) -> Option<u8> {
        if col < 0 || row < 0 || col >= self.width_tiles as i32 || row >= self.height_tiles as i32 {
            return None;
        }
        Some(self.tiles[row as usize * self.width_tiles as usize + col as usize])
    }

    /// Collision flags at a cell, zero outside the grid or without
    /// collision data
    pub fn collision_at(&self, col: i32, row: i32) -> u8 {
        if self.collision.is_empty() {
            return 0;
        }
        if col < 0 || row < 0 || col >= self.width_tiles as i32 || row >= self.height_tiles as i32 {
            return 0;
        }
        self.collision[row as usize * self.width_tiles as usize + col as usize]
    }

    pub fn has_collision(&self) -> bool {
        !self.collision.is_empty()
    }

    /// Palette for a tile offset
    pub fn palette_of(&self, tile: u8) -> u8 {
        self.tile_palettes
            .get(tile as usize)
            .copied()
            .unwrap_or(self.default_palette)
    }

    pub fn validate(&self) -> Result<(), AssetError> {
        if self.width_tiles == 0 || self.height_tiles == 0 {
            return Err(AssetError::Validation(format!(
                "{}: zero grid dimensions",
                self.name
            )));
        }
        if self.tiles.len() != self.cells() {
            return Err(AssetError::Validation(format!(
                "{}: {} tiles for a {}x{} grid",
                self.name,
                self.tiles.len(),
                self.width_tiles,
                self.height_tiles
            )));
        }
        if !self.collision.is_empty() && self.collision.len() != self.cells() {
            return Err(AssetError::Validation(format!(
                "{}: {} collision cells for a {}x{} grid",
                self.name,
                self.collision.len(),
                self.width_tiles,
                self.height_tiles
            )));
        }
        Ok(())
    }

    /// Load from a RON file, plain or compressed
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<TilemapAsset, AssetError> {
        let asset: TilemapAsset = super::load_file(path)?;
        asset.validate()?;
        Ok(asset)
    }

    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), AssetError> {
        super::save_file(self, path)
    }
}
