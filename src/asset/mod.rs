//! Game asset definitions
//!
//! Visual assets describe sprite artwork already resident in tile memory:
//! where it starts, how frames are laid out, which animations it carries.
//! Tilemap assets describe large tile grids with optional per-tile collision
//! flags. Both are plain data, serialized as RON and compressed on disk.

mod io;
mod tilemap;
mod visual;

pub use io::{from_ron, load_file, save_file};
pub use tilemap::{tile_flags, TilemapAsset};
pub use visual::{AnimDef, VisualAsset};

/// Error type for asset loading and validation
#[derive(Debug)]
pub enum AssetError {
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
    Serialize(ron::Error),
    Validation(String),
}

impl From<std::io::Error> for AssetError {
    fn from(e: std::io::Error) -> Self {
        AssetError::Io(e)
    }
}

impl From<ron::error::SpannedError> for AssetError {
    fn from(e: ron::error::SpannedError) -> Self {
        AssetError::Parse(e)
    }
}

impl From<ron::Error> for AssetError {
    fn from(e: ron::Error) -> Self {
        AssetError::Serialize(e)
    }
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetError::Io(e) => write!(f, "I/O error: {}", e),
            AssetError::Parse(e) => write!(f, "Parse error: {}", e),
            AssetError::Serialize(e) => write!(f, "Serialize error: {}", e),
            AssetError::Validation(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for AssetError {}
