//! Streamed tile grids
//!
//! A [`TilemapLayer`] shows a window of a [`TilemapAsset`] grid much larger
//! than the sprite table could hold at once. The window is a ring of sprite
//! columns covering the visible span plus a two-column margin; panning
//! recycles columns across the trailing edge instead of reloading the
//! window, so steady scrolling costs one column of tile words per crossed
//! tile boundary. Collision queries against the same grid live in
//! [`collision`].

mod collision;
mod stream;

pub use collision::{hit, Body};

use std::rc::Rc;

use crate::asset::TilemapAsset;
use crate::camera::Camera;
use crate::fixed::Fix;
use crate::hw::{SCREEN_WIDTH, TILE_SIZE};

/// Most sprite columns a single layer may occupy
pub(crate) const MAX_COLUMNS: u8 = 42;

/// Sprite allocation sentinel: not loaded yet
const HW_NONE: u16 = 0xFFFF;

/// Columns needed to cover the view at a zoom level, with a one-column
/// margin on each side
pub(crate) fn view_cols(zoom: u8) -> u8 {
    let view_width = (SCREEN_WIDTH * 16) / zoom as i32;
    ((view_width / TILE_SIZE) + 2).min(MAX_COLUMNS as i32) as u8
}

pub struct TilemapLayer {
    asset: Rc<TilemapAsset>,
    world_x: Fix,
    world_y: Fix,
    pub(crate) z: u8,
    visible: bool,

    tiles_loaded: bool,
    pub(crate) hw_first: u16,
    pub(crate) hw_count: u8,
    last_zoom: u8,
    last_scb3: u16,
    /// Leftmost loaded grid column
    viewport_col: i32,
    /// Topmost loaded grid row
    pub(crate) viewport_row: i32,
    last_viewport_col: i32,
    last_viewport_row: i32,
    last_cols: u8,
    last_rows: u8,
    /// Ring offset of the sprite holding the leftmost column
    leftmost_offset: u8,
}

impl TilemapLayer {
    pub fn new(asset: Rc<TilemapAsset>) -> TilemapLayer {
        TilemapLayer {
            asset,
            world_x: Fix::ZERO,
            world_y: Fix::ZERO,
            z: 0,
            visible: true,
            tiles_loaded: false,
            hw_first: HW_NONE,
            hw_count: 0,
            last_zoom: 0,
            last_scb3: 0xFFFF,
            viewport_col: 0,
            viewport_row: 0,
            last_viewport_col: 0,
            last_viewport_row: 0,
            last_cols: 0,
            last_rows: 0,
            leftmost_offset: 0,
        }
    }

    pub fn asset(&self) -> &TilemapAsset {
        &self.asset
    }

    /// Position the grid in the world. Called by the scene when the layer
    /// is added.
    pub fn place(&mut self, world_x: Fix, world_y: Fix, z: u8) {
        self.world_x = world_x;
        self.world_y = world_y;
        self.z = z;
        self.tiles_loaded = false;
    }

    pub fn set_pos(&mut self, world_x: Fix, world_y: Fix) {
        self.world_x = world_x;
        self.world_y = world_y;
    }

    /// World position of the grid's top-left corner
    pub fn origin(&self) -> (Fix, Fix) {
        (self.world_x, self.world_y)
    }

    pub fn z(&self) -> u8 {
        self.z
    }

    pub fn width_pixels(&self) -> i32 {
        self.asset.width_pixels()
    }

    pub fn height_pixels(&self) -> i32 {
        self.asset.height_pixels()
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        if visible && !self.visible {
            // sprites may have been hidden or reused while we were out
            self.tiles_loaded = false;
        }
        self.visible = visible;
    }

    /// Hardware sprites this layer needs at the camera's current zoom.
    /// Wider at low zoom, zero when invisible.
    pub fn sprite_count(&self, camera: &Camera) -> u8 {
        if !self.visible {
            return 0;
        }
        view_cols(camera.zoom())
    }
}
