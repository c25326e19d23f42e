//! NOVA-380: a fantasy console core for arcade-era 2D tile-sprite games
//!
//! Everything on screen is one of 380 hardware tile-sprites: a vertical
//! strip of 16x16 tiles with its own position, scale and palette, read
//! out by the display once per raster frame. This crate models that
//! sprite table bit-exactly and builds a scene compositor on top of it:
//! - Actors: animated multi-column characters and props
//! - Parallax layers: seamlessly repeating backdrops scrolled at a
//!   fraction of the camera rate
//! - Tilemap layers: bounded tile grids streamed through a ring of
//!   sprite columns as the camera moves, with tile collision queries
//! - A camera with discrete zoom, screen shake and dead-zone follow
//!
//! The scene multiplexes all of the above onto the sprite table every
//! frame in z order, streaming only what changed.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod actor;
pub mod asset;
pub mod camera;
pub mod fixed;
pub mod hw;
pub mod parallax;
pub mod pool;
pub mod scene;
pub mod tilemap;

pub use actor::Actor;
pub use camera::Camera;
pub use fixed::Fix;
pub use parallax::ParallaxLayer;
pub use scene::{ActorId, ParallaxId, Scene, TilemapId};
pub use tilemap::{Body, TilemapLayer};
