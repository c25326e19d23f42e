//! Camera
//!
//! World-space viewport with smooth zoom, screen shake and dead-zone
//! target tracking. Zoom is kept as an index 0..=128 that maps to integer
//! zoom factors 8..=16 (50% to 100%), which keeps every transform in
//! integer math and gives a direct lookup for the hardware shrink word.
//!
//! Shake perturbs only the render position. The logical position that
//! gameplay and input queries see stays put, so a shaking screen never
//! changes what a click hits.

use crate::fixed::Fix;
use crate::hw::scb::Shrink;
use crate::hw::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Smallest zoom factor, everything at half size
pub const ZOOM_MIN: u8 = 8;
/// Largest zoom factor, native pixels
pub const ZOOM_MAX: u8 = 16;

const ZOOM_INDEX_MAX: u8 = 128;

/// Worlds taller than this clamp as if they ended here. Vertical sprite
/// coordinates wrap at 512, so a taller scroll range would alias.
const WORLD_HEIGHT_CAP: i32 = 512;

const fn zoom_to_index(zoom: u8) -> u8 {
    let z = if zoom < ZOOM_MIN {
        ZOOM_MIN
    } else if zoom > ZOOM_MAX {
        ZOOM_MAX
    } else {
        zoom
    };
    (z - ZOOM_MIN) << 4
}

const fn index_to_zoom(index: u8) -> u8 {
    ZOOM_MIN + (index >> 4)
}

/// Hardware shrink word for a zoom index.
///
/// The horizontal nibble steps once per 16 index ticks while the vertical
/// byte steps every tick, so both reach full scale together at index 128.
const fn shrink_for_index(index: u8) -> Shrink {
    Shrink(((7 + (index >> 4) as u16) << 8) | (0x7F + index as u16))
}

pub struct Camera {
    x: Fix,
    y: Fix,

    zoom_index: u8,
    zoom_target: u8,
    zoom_step: u8,

    shake_intensity: u8,
    shake_duration: u8,
    shake_timer: u8,
    shake_offset_x: i8,
    shake_offset_y: i8,
    shake_rand_state: u16,

    deadzone_w: u16,
    deadzone_h: u16,
    follow_speed: Fix,
    bounds_w: i32,
    bounds_h: i32,
    track_offset_x: i16,
    track_offset_y: i16,
}

impl Camera {
    pub fn new() -> Camera {
        Camera {
            x: Fix::ZERO,
            y: Fix::ZERO,
            zoom_index: ZOOM_INDEX_MAX,
            zoom_target: ZOOM_INDEX_MAX,
            zoom_step: 16,
            shake_intensity: 0,
            shake_duration: 0,
            shake_timer: 0,
            shake_offset_x: 0,
            shake_offset_y: 0,
            shake_rand_state: 0x1234,
            deadzone_w: 64,
            deadzone_h: 32,
            follow_speed: Fix(9830), // 0.15
            bounds_w: 0,
            bounds_h: 0,
            track_offset_x: 0,
            track_offset_y: 0,
        }
    }

    pub fn set_pos(&mut self, x: Fix, y: Fix) {
        self.x = x;
        self.y = y;
    }

    pub fn move_by(&mut self, dx: Fix, dy: Fix) {
        self.x += dx;
        self.y += dy;
    }

    pub fn x(&self) -> Fix {
        self.x
    }

    pub fn y(&self) -> Fix {
        self.y
    }

    /// Logical position plus the current shake offset
    pub fn render_x(&self) -> Fix {
        self.x + Fix::from_int(self.shake_offset_x as i32)
    }

    pub fn render_y(&self) -> Fix {
        self.y + Fix::from_int(self.shake_offset_y as i32)
    }

    /// Snap to a zoom factor, cancelling any glide
    pub fn set_zoom(&mut self, zoom: u8) {
        let idx = zoom_to_index(zoom);
        self.zoom_index = idx;
        self.zoom_target = idx;
    }

    /// Glide toward a zoom factor over the following updates
    pub fn set_target_zoom(&mut self, zoom: u8) {
        self.zoom_target = zoom_to_index(zoom);
    }

    /// Zoom glide rate in index ticks per update, from a fixed-point speed
    pub fn set_zoom_speed(&mut self, speed: Fix) {
        self.zoom_step = (speed.0 >> 14).clamp(1, 32) as u8;
    }

    pub fn zoom(&self) -> u8 {
        index_to_zoom(self.zoom_index)
    }

    /// Zoom with the fractional glide position included
    pub fn zoom_fixed(&self) -> Fix {
        Fix::from_int(ZOOM_MIN as i32) + Fix((self.zoom_index as i32) << 12)
    }

    pub fn is_zooming(&self) -> bool {
        self.zoom_index != self.zoom_target
    }

    pub fn target_zoom(&self) -> u8 {
        index_to_zoom(self.zoom_target)
    }

    /// Hardware shrink word for the current zoom
    pub fn shrink(&self) -> Shrink {
        shrink_for_index(self.zoom_index)
    }

    pub fn visible_width(&self) -> i32 {
        (SCREEN_WIDTH * 16) / self.zoom() as i32
    }

    pub fn visible_height(&self) -> i32 {
        (SCREEN_HEIGHT * 16) / self.zoom() as i32
    }

    /// Advance zoom glide, track a target point if one is given, then
    /// advance shake. Call once per frame.
    pub fn update(&mut self, track: Option<(Fix, Fix)>) {
        if self.zoom_index != self.zoom_target {
            if self.zoom_index < self.zoom_target {
                self.zoom_index = self.zoom_index.saturating_add(self.zoom_step);
                if self.zoom_index > self.zoom_target {
                    self.zoom_index = self.zoom_target;
                }
            } else {
                self.zoom_index = self.zoom_index.saturating_sub(self.zoom_step);
                if self.zoom_index < self.zoom_target {
                    self.zoom_index = self.zoom_target;
                }
            }
        }

        if let Some((tx, ty)) = track {
            self.update_tracking(tx, ty);
        }

        self.update_shake();
    }

    fn update_tracking(&mut self, target_x: Fix, target_y: Fix) {
        let center_x = self.x + Fix::from_int(self.visible_width() / 2);
        let center_y = self.y + Fix::from_int(self.visible_height() / 2);

        let dist_x = target_x + Fix::from_int(self.track_offset_x as i32) - center_x;
        let dist_y = target_y + Fix::from_int(self.track_offset_y as i32) - center_y;

        let half_w = Fix::from_int(self.deadzone_w as i32 / 2);
        let half_h = Fix::from_int(self.deadzone_h as i32 / 2);

        let mut move_x = Fix::ZERO;
        let mut move_y = Fix::ZERO;

        if dist_x > half_w {
            move_x = dist_x - half_w;
        } else if dist_x < -half_w {
            move_x = dist_x + half_w;
        }

        if dist_y > half_h {
            move_y = dist_y - half_h;
        } else if dist_y < -half_h {
            move_y = dist_y + half_h;
        }

        self.x += move_x.mul(self.follow_speed);
        self.y += move_y.mul(self.follow_speed);

        if self.bounds_w > 0 || self.bounds_h > 0 {
            let (w, h) = (self.bounds_w, self.bounds_h);
            self.clamp_to_bounds(w, h);
        }
    }

    /// Keep the viewport inside a world of the given pixel size
    pub fn clamp_to_bounds(&mut self, world_width: i32, world_height: i32) {
        let world_height = world_height.min(WORLD_HEIGHT_CAP);

        if self.x < Fix::ZERO {
            self.x = Fix::ZERO;
        }
        let max_x = (world_width - self.visible_width()).max(0);
        if self.x > Fix::from_int(max_x) {
            self.x = Fix::from_int(max_x);
        }

        if self.y < Fix::ZERO {
            self.y = Fix::ZERO;
        }
        let max_y = (world_height - self.visible_height()).max(0);
        if self.y > Fix::from_int(max_y) {
            self.y = Fix::from_int(max_y);
        }
    }

    /// Project a world position through the render position and zoom
    pub fn world_to_screen(&self, world_x: Fix, world_y: Fix) -> (i16, i16) {
        let rel_x = world_x - self.render_x();
        let rel_y = world_y - self.render_y();

        let zoom = self.zoom() as i32;
        let sx = (rel_x.to_int() * zoom) >> 4;
        let sy = (rel_y.to_int() * zoom) >> 4;
        (sx as i16, sy as i16)
    }

    /// Invert the projection. Uses the logical position, so results stay
    /// stable while the screen shakes.
    pub fn screen_to_world(&self, screen_x: i16, screen_y: i16) -> (Fix, Fix) {
        let zoom = self.zoom() as i32;
        let wx = ((screen_x as i32) << 4) / zoom;
        let wy = ((screen_y as i32) << 4) / zoom;
        (Fix::from_int(wx) + self.x, Fix::from_int(wy) + self.y)
    }

    pub fn shake(&mut self, intensity: u8, duration: u8) {
        self.shake_intensity = intensity;
        self.shake_duration = duration;
        self.shake_timer = duration;
    }

    pub fn is_shaking(&self) -> bool {
        self.shake_timer > 0
    }

    pub fn shake_stop(&mut self) {
        self.shake_timer = 0;
        self.shake_offset_x = 0;
        self.shake_offset_y = 0;
    }

    fn shake_random(&mut self) -> i8 {
        self.shake_rand_state = (self.shake_rand_state as u32)
            .wrapping_mul(1103515245)
            .wrapping_add(12345) as u16;
        ((self.shake_rand_state >> 8) & 0xFF) as u8 as i8
    }

    fn update_shake(&mut self) {
        if self.shake_timer > 0 {
            self.shake_timer -= 1;

            let mut current =
                (self.shake_intensity as i32 * self.shake_timer as i32) / self.shake_duration as i32;
            if current < 1 && self.shake_timer > 0 {
                current = 1;
            }

            let span = current * 2 + 1;
            self.shake_offset_x = ((self.shake_random() as i32) % span - current) as i8;
            self.shake_offset_y = ((self.shake_random() as i32) % span - current) as i8;
        } else {
            self.shake_offset_x = 0;
            self.shake_offset_y = 0;
        }
    }

    pub fn set_deadzone(&mut self, width: u16, height: u16) {
        self.deadzone_w = width;
        self.deadzone_h = height;
    }

    pub fn set_follow_speed(&mut self, speed: Fix) {
        self.follow_speed = speed;
    }

    /// World size for tracking clamp, zero disables
    pub fn set_bounds(&mut self, world_width: i32, world_height: i32) {
        self.bounds_w = world_width;
        self.bounds_h = world_height;
    }

    pub fn set_track_offset(&mut self, offset_x: i16, offset_y: i16) {
        self.track_offset_x = offset_x;
        self.track_offset_y = offset_y;
    }
}

impl Default for Camera {
    fn default() -> Camera {
        Camera::new()
    }
}
