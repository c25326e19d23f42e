//! Asset file IO
//!
//! RON on disk, brotli compressed when written by this crate, plain text
//! accepted when hand-authored. Reading sniffs the first byte: RON starts
//! with '(' or whitespace, anything else is treated as a brotli stream.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::AssetError;

pub fn load_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, AssetError> {
    let bytes = fs::read(path.as_ref())?;

    let is_plain_ron = bytes
        .first()
        .map(|&b| b == b'(' || b == b' ' || b == b'\n' || b == b'\r' || b == b'\t')
        .unwrap_or(false);

    let contents = if is_plain_ron {
        String::from_utf8(bytes).map_err(|e| {
            AssetError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid UTF-8: {}", e),
            ))
        })?
    } else {
        let mut decompressed = Vec::new();
        brotli::BrotliDecompress(&mut Cursor::new(&bytes), &mut decompressed).map_err(|e| {
            AssetError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("brotli decompression failed: {}", e),
            ))
        })?;
        String::from_utf8(decompressed).map_err(|e| {
            AssetError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid UTF-8 after decompression: {}", e),
            ))
        })?
    };

    Ok(ron::from_str(&contents)?)
}

/// Serialize to pretty RON and write brotli compressed
pub fn save_file<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<(), AssetError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());
    let ron_string = ron::ser::to_string_pretty(value, config)?;

    // Quality 6, window 22: good balance of speed and ratio
    let mut compressed = Vec::new();
    brotli::BrotliCompress(
        &mut Cursor::new(ron_string.as_bytes()),
        &mut compressed,
        &brotli::enc::BrotliEncoderParams {
            quality: 6,
            lgwin: 22,
            ..Default::default()
        },
    )
    .map_err(|e| {
        AssetError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("brotli compression failed: {}", e),
        ))
    })?;

    fs::write(path, compressed)?;
    Ok(())
}

/// Parse from a RON string, for embedded assets and tests
pub fn from_ron<T: DeserializeOwned>(s: &str) -> Result<T, AssetError> {
    Ok(ron::from_str(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{TilemapAsset, VisualAsset};

    #[test]
    fn test_compressed_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hero.ron");

        let asset = VisualAsset::new("hero", 0x100, 2, 2, 4, 1).anim("idle", 0, 2, 8, true);
        asset.save(&path).unwrap();

        // Written form is binary, not text
        let raw = std::fs::read(&path).unwrap();
        assert_ne!(raw.first(), Some(&b'('));

        let loaded = VisualAsset::load(&path).unwrap();
        assert_eq!(loaded.name, "hero");
        assert_eq!(loaded.base_tile, 0x100);
        assert_eq!(loaded.anims.len(), 1);
        assert!(loaded.anims[0].looping);
    }

    #[test]
    fn test_plain_ron_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.ron");

        let map = TilemapAsset::new("flat", 4, 2, 0x40, 2, vec![1; 8]).unwrap();
        let text = ron::ser::to_string_pretty(&map, ron::ser::PrettyConfig::new()).unwrap();
        std::fs::write(&path, text).unwrap();

        let loaded = TilemapAsset::load(&path).unwrap();
        assert_eq!(loaded.width_tiles, 4);
        assert_eq!(loaded.tiles, vec![1; 8]);
    }

    #[test]
    fn test_load_rejects_invalid_grid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ron");

        // Hand-written file with a mismatched grid
        let text = r#"(
  name: "bad",
  width_tiles: 4,
  height_tiles: 4,
  base_tile: 0,
  default_palette: 0,
  tiles: [1, 2, 3],
)"#;
        std::fs::write(&path, text).unwrap();
        assert!(TilemapAsset::load(&path).is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = VisualAsset::load("/nonexistent/nowhere.ron").unwrap_err();
        assert!(matches!(err, crate::asset::AssetError::Io(_)));
    }
}
