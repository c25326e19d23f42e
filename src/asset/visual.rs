//! Sprite artwork descriptors

use serde::{Deserialize, Serialize};

use super::AssetError;
use crate::hw::{SPRITE_MAX_HEIGHT, TILE_SIZE};

/// One named animation inside a visual asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimDef {
    pub name: String,
    /// First frame of the sequence, relative to the asset's frame list
    pub first_frame: u16,
    pub frame_count: u16,
    /// Engine ticks each frame stays on screen
    pub speed: u8,
    #[serde(default)]
    pub looping: bool,
}

/// Sprite artwork already resident in tile memory.
///
/// Frames sit consecutively from `base_tile`, and within a frame tiles run
/// column by column, top to bottom. The tile for a given frame, column and
/// row is `base_tile + frame * tiles_per_frame + col * height_tiles + row`,
/// which matches how hardware sprites consume their tile strips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualAsset {
    pub name: String,
    pub base_tile: u16,
    pub width_tiles: u8,
    pub height_tiles: u8,
    pub frame_count: u16,
    pub palette: u8,
    #[serde(default)]
    pub anims: Vec<AnimDef>,
}

impl VisualAsset {
    pub fn new(
        name: &str,
        base_tile: u16,
        width_tiles: u8,
        height_tiles: u8,
        frame_count: u16,
        palette: u8,
    ) -> VisualAsset {
        VisualAsset {
            name: name.to_string(),
            base_tile,
            width_tiles,
            height_tiles,
            frame_count,
            palette,
            anims: Vec::new(),
        }
    }

    /// Add an animation, builder style
    pub fn anim(
        mut self,
        name: &str,
        first_frame: u16,
        frame_count: u16,
        speed: u8,
        looping: bool,
    ) -> VisualAsset {
        self.anims.push(AnimDef {
            name: name.to_string(),
            first_frame,
            frame_count,
            speed,
            looping,
        });
        self
    }

    pub fn tiles_per_frame(&self) -> u16 {
        self.width_tiles as u16 * self.height_tiles as u16
    }

    pub fn width_pixels(&self) -> u16 {
        self.width_tiles as u16 * TILE_SIZE as u16
    }

    pub fn height_pixels(&self) -> u16 {
        self.height_tiles as u16 * TILE_SIZE as u16
    }

    /// Tile index for one cell of one frame
    pub fn frame_tile(&self, frame: u16, col: u8, row: u8) -> u16 {
        self.base_tile
            + frame * self.tiles_per_frame()
            + col as u16 * self.height_tiles as u16
            + row as u16
    }

    pub fn find_anim(&self, name: &str) -> Option<usize> {
        self.anims.iter().position(|a| a.name == name)
    }

    pub fn validate(&self) -> Result<(), AssetError> {
        if self.width_tiles == 0 || self.height_tiles == 0 {
            return Err(AssetError::Validation(format!(
                "{}: zero frame dimensions",
                self.name
            )));
        }
        if self.height_tiles > SPRITE_MAX_HEIGHT {
            return Err(AssetError::Validation(format!(
                "{}: {} rows exceeds the {} tile sprite strip",
                self.name, self.height_tiles, SPRITE_MAX_HEIGHT
            )));
        }
        if self.frame_count == 0 {
            return Err(AssetError::Validation(format!(
                "{}: no frames",
                self.name
            )));
        }
        for anim in &self.anims {
            if anim.frame_count == 0 {
                return Err(AssetError::Validation(format!(
                    "{}: animation '{}' has no frames",
                    self.name, anim.name
                )));
            }
            let last = anim.first_frame + anim.frame_count - 1;
            if last >= self.frame_count {
                return Err(AssetError::Validation(format!(
                    "{}: animation '{}' references frame {} of {}",
                    self.name, anim.name, last, self.frame_count
                )));
            }
        }
        Ok(())
    }

    /// Load from a RON file, plain or compressed
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<VisualAsset, AssetError> {
        let asset: VisualAsset = super::load_file(path)?;
        asset.validate()?;
        Ok(asset)
    }

    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), AssetError> {
        super::save_file(self, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_tile_column_major() {
        let asset = VisualAsset::new("hero", 0x100, 2, 3, 4, 5);
        assert_eq!(asset.tiles_per_frame(), 6);
        assert_eq!(asset.frame_tile(0, 0, 0), 0x100);
        assert_eq!(asset.frame_tile(0, 0, 2), 0x102);
        assert_eq!(asset.frame_tile(0, 1, 0), 0x103);
        assert_eq!(asset.frame_tile(2, 1, 2), 0x100 + 2 * 6 + 3 + 2);
    }

    #[test]
    fn test_anim_builder_and_lookup() {
        let asset = VisualAsset::new("hero", 0, 1, 1, 8, 0)
            .anim("idle", 0, 2, 8, true)
            .anim("walk", 2, 4, 4, true)
            .anim("hit", 6, 2, 6, false);
        assert_eq!(asset.find_anim("walk"), Some(1));
        assert_eq!(asset.find_anim("dash"), None);
        assert!(asset.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_anim() {
        let asset = VisualAsset::new("hero", 0, 1, 1, 4, 0).anim("broken", 2, 4, 4, true);
        assert!(asset.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_tall_strip() {
        let asset = VisualAsset::new("tower", 0, 1, 33, 1, 0);
        assert!(asset.validate().is_err());
    }
}
