//! Window streaming: column recycling against camera movement
//!
//! The loaded window tracks the camera in whole tiles. Panning right
//! reloads the leftmost ring sprite with the column entering on the right
//! and advances the ring offset; panning left runs the mirror image.
//! Vertical movement reloads every column at its current ring slot, since
//! a sprite is one whole column of rows. Sub-tile movement only moves the
//! X/Y position words.

use super::{view_cols, TilemapLayer};
use crate::camera::Camera;
use crate::hw::scb::adjusted_height;
use crate::hw::{sprite, SpriteY, TileAttr, Vram, SCREEN_HEIGHT, SPRITE_MAX_HEIGHT, TILE_SIZE};

impl TilemapLayer {
    /// Load one grid column's tile words into one sprite. Cells outside the
    /// grid stay zero, so the window may hang off any map edge.
    fn load_column(&self, vram: &mut Vram, sprite: u16, map_col: i32, num_rows: u8) {
        let mut tiles = [0u16; SPRITE_MAX_HEIGHT as usize];
        let mut attrs = [TileAttr(0); SPRITE_MAX_HEIGHT as usize];

        for row in 0..num_rows {
            let map_row = self.viewport_row + row as i32;
            if let Some(offset) = self.asset.tile_at(map_col, map_row) {
                tiles[row as usize] = self.asset.base_tile + offset as u16;
                attrs[row as usize] =
                    TileAttr::new(self.asset.palette_of(offset), false, false);
            }
        }

        sprite::write_tiles(vram, sprite, num_rows, &tiles, &attrs);
    }

    /// Write the window into VRAM starting at `first_sprite`, streaming in
    /// only the columns the camera movement exposed.
    pub fn draw(&mut self, vram: &mut Vram, camera: &Camera, first_sprite: u16) {
        if !self.visible {
            return;
        }

        let zoom = camera.zoom();
        let zi = zoom as i32;
        let view_height = (SCREEN_HEIGHT * 16) / zi;

        let view_left = (camera.x() - self.world_x).to_int();
        let view_top = (camera.y() - self.world_y).to_int();
        let first_col = view_left / TILE_SIZE;
        let first_row = view_top / TILE_SIZE;

        let num_cols = view_cols(zoom);
        let num_rows = (((view_height / TILE_SIZE) + 2) as u8).min(SPRITE_MAX_HEIGHT);

        // reload from scratch when the scene hands out a different range or
        // a zoom change resized the window
        if self.tiles_loaded
            && (self.hw_first != first_sprite
                || self.last_cols != num_cols
                || self.last_rows != num_rows)
        {
            self.tiles_loaded = false;
        }

        let zoom_changed = zoom != self.last_zoom;

        if !self.tiles_loaded {
            self.viewport_col = first_col;
            self.viewport_row = first_row;
            self.leftmost_offset = 0;

            for col in 0..num_cols {
                self.load_column(
                    vram,
                    first_sprite + col as u16,
                    first_col + col as i32,
                    num_rows,
                );
            }
            sprite::write_shrink(vram, first_sprite, num_cols, camera.shrink());

            self.hw_first = first_sprite;
            self.hw_count = num_cols;
            self.tiles_loaded = true;
            self.last_zoom = zoom;
            self.last_scb3 = 0xFFFF;
            self.last_cols = num_cols;
            self.last_rows = num_rows;
            self.last_viewport_col = first_col;
            self.last_viewport_row = first_row;
        } else if zoom_changed {
            sprite::write_shrink(vram, first_sprite, num_cols, camera.shrink());
            self.last_zoom = zoom;
        }

        let col_delta = first_col - self.last_viewport_col;
        if col_delta != 0 {
            if col_delta.abs() >= num_cols as i32 {
                // jumped past the whole window; reload every ring slot
                for col in 0..num_cols {
                    let offset = (self.leftmost_offset + col) % num_cols;
                    self.load_column(
                        vram,
                        first_sprite + offset as u16,
                        first_col + col as i32,
                        num_rows,
                    );
                }
            } else if col_delta > 0 {
                // columns enter on the right, recycled from the left edge
                for i in 0..col_delta {
                    let spr = first_sprite + self.leftmost_offset as u16;
                    let new_col = self.viewport_col + num_cols as i32 + i;
                    self.load_column(vram, spr, new_col, num_rows);
                    self.leftmost_offset = (self.leftmost_offset + 1) % num_cols;
                }
            } else {
                // columns enter on the left, recycled from the right edge
                for k in 1..=(-col_delta) {
                    if self.leftmost_offset == 0 {
                        self.leftmost_offset = num_cols;
                    }
                    self.leftmost_offset -= 1;
                    let spr = first_sprite + self.leftmost_offset as u16;
                    self.load_column(vram, spr, self.viewport_col - k, num_rows);
                }
            }
            self.viewport_col = first_col;
            self.last_viewport_col = first_col;
        }

        let row_delta = first_row - self.last_viewport_row;
        if row_delta != 0 {
            // every sprite holds a full column of rows, so all reload
            self.viewport_row = first_row;
            for col in 0..num_cols {
                let offset = (self.leftmost_offset + col) % num_cols;
                self.load_column(
                    vram,
                    first_sprite + offset as u16,
                    first_col + col as i32,
                    num_rows,
                );
            }
            self.last_viewport_row = first_row;
        }

        let height_bits = adjusted_height(num_rows, camera.shrink().v());
        let base_screen_y = {
            let y = (self.world_y - camera.y()).to_int() + first_row * TILE_SIZE;
            ((y * zi) >> 4) as i16
        };
        let scb3 = SpriteY::new(base_screen_y, height_bits).0;
        if scb3 != self.last_scb3 {
            sprite::write_y_uniform(vram, first_sprite, num_cols, base_screen_y, height_bits);
            self.last_scb3 = scb3;
        }

        let tile_w = ((TILE_SIZE * zi) >> 4) as i16;
        let base_screen_x = {
            let x = (self.world_x - camera.x()).to_int() + first_col * TILE_SIZE;
            ((x * zi) >> 4) as i16
        };
        for col in 0..num_cols {
            let offset = (self.leftmost_offset + col) % num_cols;
            sprite::write_x(
                vram,
                first_sprite + offset as u16,
                base_screen_x + col as i16 * tile_w,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::TilemapAsset;
    use crate::fixed::Fix;
    use crate::hw::display::ProceduralArt;
    use crate::hw::vram::{SCB1_BASE, SCB1_SPRITE_WORDS, SCB3_BASE};
    use crate::hw::Display;
    use std::rc::Rc;

    /// 64x32 grid with locally distinct tiles so column swaps show up
    fn big_map() -> TilemapAsset {
        let cells = 64usize * 32;
        let tiles: Vec<u8> = (0..cells).map(|i| (i % 251) as u8).collect();
        TilemapAsset::new("terrain", 64, 32, 400, 1, tiles).unwrap()
    }

    fn render(vram: &Vram) -> Vec<u8> {
        let mut display = Display::new();
        display.render(vram, &ProceduralArt);
        display.pixels.clone()
    }

    #[test]
    fn test_fresh_window_loads_visible_columns() {
        let mut vram = Vram::new();
        let mut camera = Camera::new();
        camera.set_pos(Fix::from_int(64), Fix::from_int(32));

        let mut layer = TilemapLayer::new(Rc::new(big_map()));
        layer.place(Fix::ZERO, Fix::ZERO, 2);
        assert_eq!(layer.sprite_count(&camera), 22);

        layer.draw(&mut vram, &camera, 30);

        // sprite 30 holds grid column 4 from row 2 down
        let base = SCB1_BASE + 30 * SCB1_SPRITE_WORDS;
        let expected = 400 + ((2 * 64 + 4) % 251) as u16;
        assert_eq!(vram.read(base), expected);

        // whole tiles off-screen: base position is at the window corner
        assert_eq!(sprite::read_x(&vram, 30).screen_x(), 0);
        assert_eq!(sprite::read_x(&vram, 31).screen_x(), 16);
        assert_eq!(SpriteY(vram.read(SCB3_BASE + 30)).screen_y(), 0);
    }

    #[test]
    fn test_pan_walk_matches_fresh_load() {
        let asset = Rc::new(big_map());
        let mut vram = Vram::new();
        let mut camera = Camera::new();
        camera.set_pos(Fix::from_int(64), Fix::from_int(32));

        let mut layer = TilemapLayer::new(Rc::clone(&asset));
        layer.place(Fix::ZERO, Fix::ZERO, 2);
        layer.draw(&mut vram, &camera, 30);

        // pan in bursts both directions, including multi-column jumps
        let steps: [(i32, i32); 6] =
            [(40, 0), (-100, 0), (24, 16), (0, -20), (-3, 5), (200, 40)];
        for (dx, dy) in steps {
            camera.move_by(Fix::from_int(dx), Fix::from_int(dy));
            layer.draw(&mut vram, &camera, 30);
        }

        // a fresh layer at the final camera must paint the same picture
        let mut fresh_vram = Vram::new();
        let mut fresh = TilemapLayer::new(asset);
        fresh.place(Fix::ZERO, Fix::ZERO, 2);
        fresh.draw(&mut fresh_vram, &camera, 30);

        assert_eq!(render(&vram), render(&fresh_vram));
    }

    #[test]
    fn test_window_hangs_off_map_edge() {
        let mut vram = Vram::new();
        let mut camera = Camera::new();
        camera.set_pos(Fix::from_int(-40), Fix::ZERO);

        let mut layer = TilemapLayer::new(Rc::new(big_map()));
        layer.place(Fix::ZERO, Fix::ZERO, 2);
        layer.draw(&mut vram, &camera, 30);

        // first two columns are left of the grid and stay blank
        assert_eq!(vram.read(SCB1_BASE + 30 * SCB1_SPRITE_WORDS), 0);
        assert_eq!(vram.read(SCB1_BASE + 31 * SCB1_SPRITE_WORDS), 0);
        // the third holds grid column 0
        assert_eq!(vram.read(SCB1_BASE + 32 * SCB1_SPRITE_WORDS), 400);
    }

    #[test]
    fn test_position_words_cached_until_subtile_move() {
        let mut vram = Vram::new();
        let mut camera = Camera::new();
        let mut layer = TilemapLayer::new(Rc::new(big_map()));
        layer.place(Fix::ZERO, Fix::ZERO, 2);
        layer.draw(&mut vram, &camera, 30);

        vram.write_at(SCB3_BASE + 30, 0x1234);
        layer.draw(&mut vram, &camera, 30);
        assert_eq!(vram.read(SCB3_BASE + 30), 0x1234);

        camera.move_by(Fix::ZERO, Fix::from_int(8));
        layer.draw(&mut vram, &camera, 30);
        let word = SpriteY(vram.read(SCB3_BASE + 30));
        assert_eq!(word.screen_y(), -8);
        assert_eq!(word.height(), 16);
    }

    #[test]
    fn test_zoom_change_rebuilds_window() {
        let asset = Rc::new(big_map());
        let mut vram = Vram::new();
        let mut camera = Camera::new();
        camera.set_pos(Fix::from_int(100), Fix::from_int(50));

        let mut layer = TilemapLayer::new(Rc::clone(&asset));
        layer.place(Fix::ZERO, Fix::ZERO, 2);
        layer.draw(&mut vram, &camera, 30);

        camera.set_zoom(8);
        assert_eq!(layer.sprite_count(&camera), 42);
        layer.draw(&mut vram, &camera, 30);

        let mut fresh_vram = Vram::new();
        let mut fresh = TilemapLayer::new(asset);
        fresh.place(Fix::ZERO, Fix::ZERO, 2);
        fresh.draw(&mut fresh_vram, &camera, 30);

        assert_eq!(render(&vram), render(&fresh_vram));
    }

    #[test]
    fn test_invisible_layer_needs_no_sprites() {
        let camera = Camera::new();
        let mut layer = TilemapLayer::new(Rc::new(big_map()));
        assert_eq!(layer.sprite_count(&camera), 22);
        layer.set_visible(false);
        assert_eq!(layer.sprite_count(&camera), 0);
    }
}
