//! Animated sprite strips
//!
//! An [`Actor`] is one visual asset placed in the scene: a vertical strip of
//! hardware sprites, one per 16-pixel column, chained so the whole strip
//! moves and shrinks as a unit. Drawing is change-tracked against the words
//! already in VRAM: tiles are rewritten only when the frame, palette or flip
//! state changed, shrink only when the zoom changed, position only when the
//! projected screen coordinates moved. A fresh sprite allocation forces a
//! full rewrite.

use std::rc::Rc;

use crate::asset::VisualAsset;
use crate::camera::Camera;
use crate::fixed::Fix;
use crate::hw::scb::adjusted_height;
use crate::hw::{sprite, Shrink, TileAttr, Vram, SPRITE_MAX_HEIGHT, TILE_SIZE};

/// Sprite allocation sentinel: not drawn yet
const HW_NONE: u16 = 0xFFFF;

pub struct Actor {
    asset: Rc<VisualAsset>,
    /// Scene position of the strip's top-left corner
    pub x: Fix,
    pub y: Fix,
    pub(crate) z: u8,
    /// Display size override in pixels, 0 = asset size. Larger sizes tile
    /// the asset.
    width: u16,
    height: u16,
    palette: u8,
    visible: bool,
    h_flip: bool,
    v_flip: bool,
    screen_space: bool,

    anim_index: usize,
    anim_frame: u16,
    anim_counter: u8,

    // change tracking against the words last written to VRAM
    tiles_dirty: bool,
    pub(crate) hw_first: u16,
    pub(crate) hw_count: u8,
    last_anim_frame: u16,
    last_h_flip: bool,
    last_v_flip: bool,
    last_palette: u8,
    last_zoom: u8,
    last_screen_x: i16,
    last_screen_y: i16,
    last_cols: u8,
}

impl Actor {
    pub fn new(asset: Rc<VisualAsset>) -> Actor {
        let palette = asset.palette;
        Actor {
            asset,
            x: Fix::ZERO,
            y: Fix::ZERO,
            z: 0,
            width: 0,
            height: 0,
            palette,
            visible: true,
            h_flip: false,
            v_flip: false,
            screen_space: false,
            anim_index: 0,
            anim_frame: 0,
            anim_counter: 0,
            tiles_dirty: true,
            hw_first: HW_NONE,
            hw_count: 0,
            last_anim_frame: u16::MAX,
            last_h_flip: false,
            last_v_flip: false,
            last_palette: u8::MAX,
            last_zoom: u8::MAX,
            last_screen_x: i16::MAX,
            last_screen_y: i16::MAX,
            last_cols: 0,
        }
    }

    /// Actor with a display size different from the asset's natural size.
    /// The asset tiles to fill the requested rectangle.
    pub fn with_size(asset: Rc<VisualAsset>, width: u16, height: u16) -> Actor {
        let mut actor = Actor::new(asset);
        actor.width = width;
        actor.height = height;
        actor
    }

    pub fn asset(&self) -> &VisualAsset {
        &self.asset
    }

    pub fn set_pos(&mut self, x: Fix, y: Fix) {
        self.x = x;
        self.y = y;
    }

    pub fn move_by(&mut self, dx: Fix, dy: Fix) {
        self.x = self.x + dx;
        self.y = self.y + dy;
    }

    pub fn z(&self) -> u8 {
        self.z
    }

    /// Display width in pixels, override applied
    pub fn width_pixels(&self) -> u16 {
        if self.width != 0 {
            self.width
        } else {
            self.asset.width_pixels()
        }
    }

    /// Display height in pixels, override applied
    pub fn height_pixels(&self) -> u16 {
        if self.height != 0 {
            self.height
        } else {
            self.asset.height_pixels()
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        if visible && !self.visible {
            // Sprites were hidden or reused while we were out; force a
            // full rewrite even if the allocation comes back unchanged.
            self.hw_first = HW_NONE;
        }
        self.visible = visible;
    }

    pub fn palette(&self) -> u8 {
        self.palette
    }

    pub fn set_palette(&mut self, palette: u8) {
        if self.palette != palette {
            self.palette = palette;
            self.tiles_dirty = true;
        }
    }

    pub fn h_flip(&self) -> bool {
        self.h_flip
    }

    pub fn v_flip(&self) -> bool {
        self.v_flip
    }

    pub fn set_flip(&mut self, h_flip: bool, v_flip: bool) {
        if self.h_flip != h_flip || self.v_flip != v_flip {
            self.h_flip = h_flip;
            self.v_flip = v_flip;
            self.tiles_dirty = true;
        }
    }

    /// Screen-space actors ignore the camera entirely: position is taken as
    /// screen pixels, zoom is pinned to 16. For HUD and menu art.
    pub fn is_screen_space(&self) -> bool {
        self.screen_space
    }

    pub fn set_screen_space(&mut self, screen_space: bool) {
        self.screen_space = screen_space;
    }

    pub fn anim_index(&self) -> usize {
        self.anim_index
    }

    pub fn anim_frame(&self) -> u16 {
        self.anim_frame
    }

    /// Switch animation by table index. Out-of-range indices are ignored.
    /// Restarts from the first frame when the animation actually changes.
    pub fn set_anim(&mut self, index: usize) {
        if index >= self.asset.anims.len() {
            return;
        }
        if self.anim_index != index {
            self.anim_index = index;
            self.anim_frame = 0;
            self.anim_counter = 0;
            self.tiles_dirty = true;
        }
    }

    /// Switch animation by name. Returns false when no animation matches.
    pub fn play_anim(&mut self, name: &str) -> bool {
        match self.asset.find_anim(name) {
            Some(index) => {
                self.set_anim(index);
                true
            }
            None => false,
        }
    }

    /// Pin a frame directly. For assets without animation tables this is
    /// the only way to select a frame other than the first.
    pub fn set_frame(&mut self, frame: u16) {
        if frame >= self.asset.frame_count {
            return;
        }
        if self.anim_frame != frame {
            self.anim_frame = frame;
            self.anim_counter = 0;
            self.tiles_dirty = true;
        }
    }

    /// True once a non-looping animation reached its last frame. Looping
    /// animations never finish.
    pub fn anim_done(&self) -> bool {
        match self.asset.anims.get(self.anim_index) {
            Some(anim) => !anim.looping && self.anim_frame + 1 >= anim.frame_count,
            None => true,
        }
    }

    /// Advance the animation clock by one frame
    pub fn update(&mut self) {
        let (speed, frames, looping) = match self.asset.anims.get(self.anim_index) {
            Some(anim) => (anim.speed, anim.frame_count, anim.looping),
            None => return,
        };
        if frames == 0 {
            return;
        }

        self.anim_counter += 1;
        if self.anim_counter >= speed {
            self.anim_counter = 0;

            let old_frame = self.anim_frame;
            self.anim_frame += 1;
            if self.anim_frame >= frames {
                self.anim_frame = if looping { 0 } else { frames - 1 };
            }

            if self.anim_frame != old_frame {
                self.tiles_dirty = true;
            }
        }
    }

    /// Hardware sprites this actor needs. Invisible actors need none.
    pub fn sprite_count(&self) -> u8 {
        if !self.visible {
            return 0;
        }
        ((self.width_pixels() as i32 + TILE_SIZE - 1) / TILE_SIZE) as u8
    }

    /// Write the strip into VRAM starting at `first_sprite`, touching only
    /// the control words whose inputs changed since the last draw.
    pub fn draw(&mut self, vram: &mut Vram, camera: &Camera, first_sprite: u16) {
        if !self.visible {
            return;
        }

        let width_tiles = self.asset.width_tiles.max(1);
        let height_tiles = self.asset.height_tiles.max(1);
        let tiles_per_frame = self.asset.tiles_per_frame();

        let cols = ((self.width_pixels() as i32 + TILE_SIZE - 1) / TILE_SIZE) as u8;
        let rows = (((self.height_pixels() as i32 + TILE_SIZE - 1) / TILE_SIZE) as u8)
            .min(SPRITE_MAX_HEIGHT);

        let frame_offset = match self.asset.anims.get(self.anim_index) {
            Some(anim) => (anim.first_frame + self.anim_frame) * tiles_per_frame,
            None => self.anim_frame * tiles_per_frame,
        };

        let (screen_x, screen_y, zoom, shrink) = if self.screen_space {
            (self.x.to_int() as i16, self.y.to_int() as i16, 16, Shrink::FULL)
        } else {
            let (sx, sy) = camera.world_to_screen(self.x, self.y);
            (sx, sy, camera.zoom(), camera.shrink())
        };

        let first_draw = self.hw_first != first_sprite || self.last_cols != cols;
        let zoom_changed = zoom != self.last_zoom;
        let position_changed =
            screen_x != self.last_screen_x || screen_y != self.last_screen_y;

        if self.h_flip != self.last_h_flip
            || self.v_flip != self.last_v_flip
            || self.palette != self.last_palette
            || self.anim_frame != self.last_anim_frame
        {
            self.tiles_dirty = true;
        }

        if first_draw || self.tiles_dirty {
            let mut tiles = [0u16; SPRITE_MAX_HEIGHT as usize];
            let mut attrs = [TileAttr(0); SPRITE_MAX_HEIGHT as usize];
            let attr = TileAttr::new(self.palette, self.h_flip, self.v_flip);
            let base = self.asset.base_tile + frame_offset;

            for col in 0..cols {
                let src_col = col % width_tiles;
                let tile_col = if self.h_flip {
                    width_tiles - 1 - src_col
                } else {
                    src_col
                };

                for row in 0..rows {
                    let src_row = row % height_tiles;
                    let tile_row = if self.v_flip {
                        height_tiles - 1 - src_row
                    } else {
                        src_row
                    };

                    // column-major: a frame column is height_tiles
                    // sequential tiles
                    tiles[row as usize] =
                        base + tile_col as u16 * height_tiles as u16 + tile_row as u16;
                    attrs[row as usize] = attr;
                }

                sprite::write_tiles(vram, first_sprite + col as u16, rows, &tiles, &attrs);
            }

            self.last_anim_frame = self.anim_frame;
            self.last_h_flip = self.h_flip;
            self.last_v_flip = self.v_flip;
            self.last_palette = self.palette;
            self.tiles_dirty = false;
        }

        if first_draw || zoom_changed {
            sprite::write_shrink(vram, first_sprite, cols, shrink);
        }

        if first_draw || zoom_changed || position_changed {
            // Shrunk strips cover fewer scanlines, so the row count in the
            // position word shrinks with the zoom.
            let height = adjusted_height(rows, shrink.v());
            sprite::write_y_chain(vram, first_sprite, cols, screen_y, height);
            sprite::write_x_spaced(vram, first_sprite, cols, screen_x, zoom as i16);

            self.last_screen_x = screen_x;
            self.last_screen_y = screen_y;
        }

        self.last_zoom = zoom;
        self.hw_first = first_sprite;
        self.hw_count = cols;
        self.last_cols = cols;
    }
}
