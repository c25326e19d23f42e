//! Scrolling background layers
//!
//! A [`ParallaxLayer`] covers the screen with a strip of sprite columns that
//! scrolls at a fraction of the camera's speed. Infinite-width layers run as
//! a ring buffer: the strip is allocated two columns wider than the screen,
//! parked one tile off the left edge, and whenever the scroll crosses a tile
//! boundary the leftmost column is relocated to the right end (or the
//! rightmost back to the left) by rewriting a single X word. Tiles are
//! written once at load; steady-state scrolling costs one X word per column
//! per frame.
//!
//! Layer movement is measured against the camera position captured when the
//! layer was placed, scaled by the layer's rate. Rate 1 pins the layer to
//! the world, rate 0 pins it to the screen.

use std::rc::Rc;

use crate::asset::VisualAsset;
use crate::camera::Camera;
use crate::fixed::Fix;
use crate::hw::scb::adjusted_height;
use crate::hw::{sprite, SpriteY, TileAttr, Vram, SCREEN_WIDTH, SPRITE_MAX_HEIGHT, TILE_SIZE};

/// Most columns a single layer may occupy
const MAX_COLUMNS: u8 = 42;

/// Scroll phase fraction bits (sub-pixel ring bookkeeping)
const SCROLL_FRAC_BITS: u32 = 4;

/// Sprite allocation sentinel: not loaded yet
const HW_NONE: u16 = 0xFFFF;

pub struct ParallaxLayer {
    asset: Rc<VisualAsset>,
    /// Display width in pixels: 0 = asset width, [`ParallaxLayer::INFINITE_WIDTH`]
    /// wraps forever
    width: u16,
    /// Display height in pixels: 0 = asset height, taller repeats vertically
    height: u16,
    rate_x: Fix,
    rate_y: Fix,
    viewport_x: i16,
    viewport_y: i16,
    anchor_x: Fix,
    anchor_y: Fix,
    pub(crate) z: u8,
    palette: u8,
    visible: bool,

    tiles_loaded: bool,
    pub(crate) hw_first: u16,
    pub(crate) hw_count: u8,
    last_zoom: u8,
    last_scb3: u16,
    /// Absolute sprite index of the ring's leftmost column
    leftmost: u16,
    /// Distance until the leftmost column wraps, in 1/16 pixel
    scroll_offset: i16,
    last_scroll_px: i16,
    last_base_x: i16,
}

impl ParallaxLayer {
    /// Width value for layers that repeat horizontally without end
    pub const INFINITE_WIDTH: u16 = 0xFFFF;

    pub fn new(
        asset: Rc<VisualAsset>,
        width: u16,
        height: u16,
        rate_x: Fix,
        rate_y: Fix,
    ) -> ParallaxLayer {
        let palette = asset.palette;
        ParallaxLayer {
            asset,
            width,
            height,
            rate_x,
            rate_y,
            viewport_x: 0,
            viewport_y: 0,
            anchor_x: Fix::ZERO,
            anchor_y: Fix::ZERO,
            z: 0,
            palette,
            visible: true,
            tiles_loaded: false,
            hw_first: HW_NONE,
            hw_count: 0,
            last_zoom: 0,
            last_scb3: 0xFFFF,
            leftmost: 0,
            scroll_offset: 0,
            last_scroll_px: 0,
            last_base_x: i16::MAX,
        }
    }

    /// Endlessly wrapping layer at the asset's natural height
    pub fn infinite(asset: Rc<VisualAsset>, rate_x: Fix, rate_y: Fix) -> ParallaxLayer {
        ParallaxLayer::new(asset, ParallaxLayer::INFINITE_WIDTH, 0, rate_x, rate_y)
    }

    pub fn asset(&self) -> &VisualAsset {
        &self.asset
    }

    pub fn z(&self) -> u8 {
        self.z
    }

    pub fn rate(&self) -> (Fix, Fix) {
        (self.rate_x, self.rate_y)
    }

    pub fn is_infinite(&self) -> bool {
        self.width == ParallaxLayer::INFINITE_WIDTH
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

    pub fn palette(&self) -> u8 {
        self.palette
    }

    /// Palette swaps rewrite every tile attribute, so the strip reloads
    pub fn set_palette(&mut self, palette: u8) {
        if self.palette != palette {
            self.palette = palette;
            self.tiles_loaded = false;
        }
    }

    /// Position the layer and capture the camera as its movement reference.
    /// Called by the scene when the layer is added.
    pub fn place(&mut self, viewport_x: i16, viewport_y: i16, z: u8, camera: &Camera) {
        self.viewport_x = viewport_x;
        self.viewport_y = viewport_y;
        self.z = z;
        self.anchor_x = camera.x();
        self.anchor_y = camera.y();
        self.tiles_loaded = false;
        self.last_base_x = i16::MAX;
    }

    /// Move the layer's screen anchor, re-referencing camera movement from
    /// here on
    pub fn set_viewport_pos(&mut self, viewport_x: i16, viewport_y: i16, camera: &Camera) {
        self.viewport_x = viewport_x;
        self.viewport_y = viewport_y;
        self.anchor_x = camera.x();
        self.anchor_y = camera.y();
    }

    fn num_cols(&self) -> u8 {
        if self.is_infinite() {
            let screen_cols = (SCREEN_WIDTH / TILE_SIZE) as u8 + 2;
            self.asset.width_tiles.max(screen_cols).min(MAX_COLUMNS)
        } else {
            let disp_w = if self.width != 0 {
                self.width
            } else {
                self.asset.width_pixels()
            };
            (((disp_w as i32 + TILE_SIZE - 1) / TILE_SIZE) as u8).min(MAX_COLUMNS)
        }
    }

    fn num_rows(&self) -> u8 {
        let disp_h = if self.height != 0 {
            self.height
        } else {
            self.asset.height_pixels()
        };
        let rows = if !self.is_infinite() && disp_h > self.asset.height_pixels() {
            ((disp_h as i32 + TILE_SIZE - 1) / TILE_SIZE) as u8
        } else {
            self.asset.height_tiles
        };
        rows.clamp(1, SPRITE_MAX_HEIGHT)
    }

    /// Hardware sprites this layer needs. Invisible layers need none.
    pub fn sprite_count(&self) -> u8 {
        if !self.visible {
            return 0;
        }
        self.num_cols()
    }

    /// Park every column at its home position, one tile left of the
    /// viewport, and reset the ring bookkeeping
    fn layout_ring(
        &mut self,
        vram: &mut Vram,
        first_sprite: u16,
        num_cols: u8,
        tile_w: i16,
        scroll_px: i16,
    ) {
        sprite::write_x_spaced(vram, first_sprite, num_cols, -tile_w, tile_w);
        self.leftmost = first_sprite;
        self.scroll_offset = tile_w << SCROLL_FRAC_BITS;
        self.last_scroll_px = scroll_px;
    }

    /// Write the layer into VRAM starting at `first_sprite`. Tiles load only
    /// when the strip is new or moved; scrolling touches X words only.
    pub fn draw(&mut self, vram: &mut Vram, camera: &Camera, first_sprite: u16) {
        if !self.visible {
            return;
        }

        let offset_x = (camera.x() - self.anchor_x).mul(self.rate_x);
        let offset_y = (camera.y() - self.anchor_y).mul(self.rate_y);
        let base_y = self.viewport_y - offset_y.to_int() as i16;

        let asset_cols = self.asset.width_tiles.max(1);
        let asset_rows = self.asset.height_tiles.max(1);
        let num_cols = self.num_cols();
        let num_rows = self.num_rows();

        let zoom = camera.zoom();
        let zoom_changed = zoom != self.last_zoom;
        let tile_w = ((TILE_SIZE * zoom as i32) >> 4) as i16;
        let scroll_px = offset_x.to_int() as i16;

        // the scene may hand out a different range after queue changes
        if self.tiles_loaded && self.hw_first != first_sprite {
            self.tiles_loaded = false;
        }

        if !self.tiles_loaded {
            let mut tiles = [0u16; SPRITE_MAX_HEIGHT as usize];
            let mut attrs = [TileAttr(0); SPRITE_MAX_HEIGHT as usize];
            let attr = TileAttr::new(self.palette, false, false);

            for col in 0..num_cols {
                let asset_col = col % asset_cols;
                for row in 0..num_rows {
                    let asset_row = row % asset_rows;
                    // column-major: a column is height_tiles sequential tiles
                    tiles[row as usize] = self.asset.base_tile
                        + asset_col as u16 * asset_rows as u16
                        + asset_row as u16;
                    attrs[row as usize] = attr;
                }
                sprite::write_tiles(vram, first_sprite + col as u16, num_rows, &tiles, &attrs);
            }

            sprite::write_shrink(vram, first_sprite, num_cols, camera.shrink());
            self.layout_ring(vram, first_sprite, num_cols, tile_w, scroll_px);

            self.hw_first = first_sprite;
            self.hw_count = num_cols;
            self.tiles_loaded = true;
            self.last_zoom = zoom;
            self.last_scb3 = 0xFFFF;
            self.last_base_x = i16::MAX;
        }

        if zoom_changed {
            sprite::write_shrink(vram, first_sprite, num_cols, camera.shrink());
            if self.is_infinite() {
                // column spacing changed, so the whole ring re-parks
                self.layout_ring(vram, first_sprite, num_cols, tile_w, scroll_px);
            }
            self.last_zoom = zoom;
        }

        // uniform Y/height word; ring columns move independently, so no
        // sticky chain
        let height_bits = adjusted_height(num_rows, camera.shrink().v());
        let scb3 = SpriteY::new(base_y, height_bits).0;
        if scb3 != self.last_scb3 {
            sprite::write_y_uniform(vram, first_sprite, num_cols, base_y, height_bits);
            self.last_scb3 = scb3;
        }

        if self.is_infinite() {
            let pixel_diff = scroll_px.wrapping_sub(self.last_scroll_px);
            self.last_scroll_px = scroll_px;

            if pixel_diff != 0 {
                let total_width = num_cols as i16 * tile_w;
                let tile_w_fixed = tile_w << SCROLL_FRAC_BITS;

                if (pixel_diff as i32).abs() >= total_width as i32 {
                    // jumped past the whole ring; park fresh instead of
                    // walking the wrap loop through every column
                    self.layout_ring(vram, first_sprite, num_cols, tile_w, scroll_px);
                } else {
                    self.scroll_offset -= pixel_diff << SCROLL_FRAC_BITS;

                    // scrolling right: leftmost column wraps to the right end
                    while self.scroll_offset <= 0 {
                        let x = sprite::read_x(vram, self.leftmost).screen_x();
                        sprite::write_x(vram, self.leftmost, x + total_width);
                        self.leftmost += 1;
                        if self.leftmost >= first_sprite + num_cols as u16 {
                            self.leftmost = first_sprite;
                        }
                        self.scroll_offset += tile_w_fixed;
                    }

                    // scrolling left: rightmost column wraps back to the left
                    while self.scroll_offset > tile_w_fixed * 2 {
                        if self.leftmost <= first_sprite {
                            self.leftmost = first_sprite + num_cols as u16;
                        }
                        self.leftmost -= 1;
                        let x = sprite::read_x(vram, self.leftmost).screen_x();
                        sprite::write_x(vram, self.leftmost, x - total_width);
                        self.scroll_offset -= tile_w_fixed;
                    }

                    for col in 0..num_cols {
                        let spr = first_sprite + col as u16;
                        let x = sprite::read_x(vram, spr).screen_x();
                        sprite::write_x(vram, spr, x - pixel_diff);
                    }
                }
            }
        } else {
            let base_x = self.viewport_x - scroll_px;
            if base_x != self.last_base_x || zoom_changed {
                sprite::write_x_spaced(vram, first_sprite, num_cols, base_x, tile_w);
                self.last_base_x = base_x;
            }
        }
    }
}
