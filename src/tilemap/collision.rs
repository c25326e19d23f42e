//! Tile collision queries
//!
//! Point and box queries read the collision grid attached to the layer's
//! asset; the resolver moves a box through the grid one axis at a time,
//! vertical first so a jump can clear the ground before the horizontal
//! check runs. All math is in world coordinates relative to the layer's
//! origin.

use super::TilemapLayer;
use crate::asset::tile_flags;
use crate::fixed::Fix;
use crate::hw::TILE_SIZE;

/// Sides of a [`Body`] that made contact during a resolve
pub mod hit {
    pub const NONE: u8 = 0;
    pub const LEFT: u8 = 0x01;
    pub const RIGHT: u8 = 0x02;
    pub const TOP: u8 = 0x04;
    pub const BOTTOM: u8 = 0x08;
}

/// A moving box: center position, half extents, velocity per frame
#[derive(Clone, Copy, Debug)]
pub struct Body {
    pub x: Fix,
    pub y: Fix,
    pub half_w: Fix,
    pub half_h: Fix,
    pub vel_x: Fix,
    pub vel_y: Fix,
}

impl Body {
    pub fn new(x: Fix, y: Fix, half_w: Fix, half_h: Fix) -> Body {
        Body {
            x,
            y,
            half_w,
            half_h,
            vel_x: Fix::ZERO,
            vel_y: Fix::ZERO,
        }
    }
}

impl TilemapLayer {
    /// Collision flags at a world position
    pub fn collision_at(&self, world_x: Fix, world_y: Fix) -> u8 {
        let (origin_x, origin_y) = self.origin();
        let tile_x = (world_x - origin_x).to_int() / TILE_SIZE;
        let tile_y = (world_y - origin_y).to_int() / TILE_SIZE;
        self.asset().collision_at(tile_x, tile_y)
    }

    /// Tile offset at a grid cell, zero outside the grid
    pub fn tile_at(&self, col: i32, row: i32) -> u8 {
        self.asset().tile_at(col, row).unwrap_or(0)
    }

    /// Union of collision flags under a box, clamped to the grid. The
    /// caller masks for the bits it cares about.
    pub fn test_aabb(&self, x: Fix, y: Fix, half_w: Fix, half_h: Fix) -> u8 {
        let asset = self.asset();
        if !asset.has_collision() {
            return 0;
        }
        let (origin_x, origin_y) = self.origin();

        let left = ((x - half_w - origin_x).to_int() / TILE_SIZE).max(0);
        let right =
            ((x + half_w - origin_x).to_int() / TILE_SIZE).min(asset.width_tiles as i32 - 1);
        let top = ((y - half_h - origin_y).to_int() / TILE_SIZE).max(0);
        let bottom =
            ((y + half_h - origin_y).to_int() / TILE_SIZE).min(asset.height_tiles as i32 - 1);

        let mut flags = 0;
        for ty in top..=bottom {
            for tx in left..=right {
                flags |= asset.collision_at(tx, ty);
            }
        }
        flags
    }

    /// Move a box by its velocity, stopping it at solid tiles. Vertical
    /// movement resolves first, then horizontal against the settled Y.
    /// Returns [`hit`] flags for the sides that made contact; a blocked
    /// axis has its velocity zeroed and the box snapped flush against the
    /// blocking tile.
    pub fn resolve_aabb(&self, body: &mut Body) -> u8 {
        if !self.asset().has_collision() {
            body.x += body.vel_x;
            body.y += body.vel_y;
            return hit::NONE;
        }
        let (origin_x, origin_y) = self.origin();
        let grid_w = self.asset().width_tiles as i32;
        let grid_h = self.asset().height_tiles as i32;

        let mut result = hit::NONE;
        let mut new_x = body.x;
        let mut new_y = body.y + body.vel_y;

        if body.vel_y != Fix::ZERO {
            let left = ((body.x - body.half_w - origin_x).to_int() / TILE_SIZE).max(0);
            let right = ((body.x + body.half_w - origin_x).to_int() / TILE_SIZE).min(grid_w - 1);
            let top = ((new_y - body.half_h - origin_y).to_int() / TILE_SIZE).max(0);
            let bottom = ((new_y + body.half_h - origin_y).to_int() / TILE_SIZE).min(grid_h - 1);

            let falling = body.vel_y > Fix::ZERO;
            let old_bottom = (body.y + body.half_h - origin_y).to_int() / TILE_SIZE;

            let row_blocks = |ty: i32| {
                for tx in left..=right {
                    let coll = self.asset().collision_at(tx, ty);
                    if coll & tile_flags::SOLID != 0 {
                        return true;
                    }
                    // one-way platforms stop only a fall that started
                    // wholly above them
                    if falling && coll & tile_flags::PLATFORM != 0 && old_bottom < ty {
                        return true;
                    }
                }
                false
            };

            // falling stops at the topmost blocking row in the swept span,
            // rising at the bottommost
            let hit_row = if falling {
                (top..=bottom).find(|&ty| row_blocks(ty))
            } else {
                (top..=bottom).rev().find(|&ty| row_blocks(ty))
            };

            if let Some(ty) = hit_row {
                if falling {
                    result |= hit::BOTTOM;
                    let tile_top = ty * TILE_SIZE + origin_y.to_int();
                    // one sub-pixel unit keeps the next query on the open side
                    new_y = Fix::from_int(tile_top) - body.half_h - Fix(1);
                } else {
                    result |= hit::TOP;
                    let tile_bottom = (ty + 1) * TILE_SIZE + origin_y.to_int();
                    new_y = Fix::from_int(tile_bottom) + body.half_h + Fix(1);
                }
                body.vel_y = Fix::ZERO;
            }
        }

        if body.vel_x != Fix::ZERO {
            new_x = body.x + body.vel_x;

            // 2px skin keeps the box from catching tile seams in the
            // floor or ceiling it slides along
            let skin = Fix::from_int(2);
            let left = ((new_x - body.half_w - origin_x).to_int() / TILE_SIZE).max(0);
            let right = ((new_x + body.half_w - origin_x).to_int() / TILE_SIZE).min(grid_w - 1);
            let top = ((new_y - body.half_h + skin - origin_y).to_int() / TILE_SIZE).max(0);
            let bottom =
                ((new_y + body.half_h - skin - origin_y).to_int() / TILE_SIZE).min(grid_h - 1);

            let col_blocks = |tx: i32| {
                (top..=bottom)
                    .any(|ty| self.asset().collision_at(tx, ty) & tile_flags::SOLID != 0)
            };

            let moving_right = body.vel_x > Fix::ZERO;
            let hit_col = if moving_right {
                (left..=right).find(|&tx| col_blocks(tx))
            } else {
                (left..=right).rev().find(|&tx| col_blocks(tx))
            };

            if let Some(tx) = hit_col {
                if moving_right {
                    result |= hit::RIGHT;
                    let tile_left = tx * TILE_SIZE + origin_x.to_int();
                    new_x = Fix::from_int(tile_left) - body.half_w - Fix(1);
                } else {
                    result |= hit::LEFT;
                    let tile_right = (tx + 1) * TILE_SIZE + origin_x.to_int();
                    new_x = Fix::from_int(tile_right) + body.half_w + Fix(1);
                }
                body.vel_x = Fix::ZERO;
            }
        }

        body.x = new_x;
        body.y = new_y;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::TilemapAsset;
    use std::rc::Rc;

    /// 10x8 arena: solid floor on row 6, solid wall on column 7 rows 3..6,
    /// one-way platform on row 4 columns 1..4, hazard at (5,5)
    fn arena() -> TilemapLayer {
        let mut coll = vec![0u8; 80];
        for x in 0..10 {
            coll[6 * 10 + x] = tile_flags::SOLID;
        }
        for y in 3..6 {
            coll[y * 10 + 7] = tile_flags::SOLID;
        }
        for x in 1..4 {
            coll[4 * 10 + x] = tile_flags::PLATFORM;
        }
        coll[5 * 10 + 5] = tile_flags::HAZARD;

        let asset = TilemapAsset::new("arena", 10, 8, 0, 0, vec![0; 80])
            .unwrap()
            .with_collision(coll)
            .unwrap();
        TilemapLayer::new(Rc::new(asset))
    }

    #[test]
    fn test_point_query() {
        let layer = arena();
        // inside the wall
        assert_eq!(
            layer.collision_at(Fix::from_int(7 * 16 + 4), Fix::from_int(5 * 16 + 2)),
            tile_flags::SOLID
        );
        // open air
        assert_eq!(layer.collision_at(Fix::from_int(8), Fix::from_int(8)), 0);
        // outside the grid
        assert_eq!(layer.collision_at(Fix::from_int(-20), Fix::from_int(8)), 0);
    }

    #[test]
    fn test_aabb_collects_flags() {
        let layer = arena();
        // box over the hazard tile
        let flags = layer.test_aabb(
            Fix::from_int(88),
            Fix::from_int(88),
            Fix::from_int(8),
            Fix::from_int(8),
        );
        assert_ne!(flags & tile_flags::HAZARD, 0);
        assert_eq!(flags & tile_flags::SOLID, 0);
    }

    #[test]
    fn test_walk_into_wall_stops() {
        let layer = arena();
        let mut body = Body::new(
            Fix::from_int(96),
            Fix::from_int(88),
            Fix::from_int(8),
            Fix::from_int(8),
        );
        body.vel_x = Fix::from_int(20);

        let result = layer.resolve_aabb(&mut body);

        assert_eq!(result, hit::RIGHT);
        assert_eq!(body.vel_x, Fix::ZERO);
        // flush against the wall at x=112, right edge just inside
        assert!(body.x + body.half_w < Fix::from_int(112));
        assert!(body.x + body.half_w >= Fix::from_int(111));

        // pushing again stays put
        body.vel_x = Fix::from_int(20);
        layer.resolve_aabb(&mut body);
        assert!(body.x + body.half_w < Fix::from_int(112));
    }

    #[test]
    fn test_fall_lands_on_floor() {
        let layer = arena();
        let mut body = Body::new(
            Fix::from_int(40),
            Fix::from_int(80),
            Fix::from_int(8),
            Fix::from_int(8),
        );
        body.vel_y = Fix::from_int(12);

        let result = layer.resolve_aabb(&mut body);

        assert_eq!(result, hit::BOTTOM);
        assert_eq!(body.vel_y, Fix::ZERO);
        // resting just above the floor at y=96
        assert!(body.y + body.half_h < Fix::from_int(96));

        // gravity next frame leaves it resting
        body.vel_y = Fix::from_int(4);
        let again = layer.resolve_aabb(&mut body);
        assert_eq!(again, hit::BOTTOM);
        assert!(body.y + body.half_h < Fix::from_int(96));
    }

    #[test]
    fn test_platform_lands_from_above_only() {
        let layer = arena();

        // falling from above the platform row lands on it
        let mut falling = Body::new(
            Fix::from_int(32),
            Fix::from_int(40),
            Fix::from_int(8),
            Fix::from_int(8),
        );
        falling.vel_y = Fix::from_int(20);
        let result = layer.resolve_aabb(&mut falling);
        assert_eq!(result, hit::BOTTOM);
        assert!(falling.y + falling.half_h < Fix::from_int(64));

        // jumping up through it passes freely
        let mut rising = Body::new(
            Fix::from_int(32),
            Fix::from_int(88),
            Fix::from_int(8),
            Fix::from_int(8),
        );
        rising.vel_y = Fix::from_int(-30);
        let result = layer.resolve_aabb(&mut rising);
        assert_eq!(result, hit::NONE);
        assert_eq!(rising.y, Fix::from_int(58));
        assert_eq!(rising.vel_y, Fix::from_int(-30));
    }

    #[test]
    fn test_skin_slides_along_floor() {
        let layer = arena();
        let mut body = Body::new(
            Fix::from_int(40),
            Fix::from_int(80),
            Fix::from_int(8),
            Fix::from_int(8),
        );
        body.vel_y = Fix::from_int(12);
        layer.resolve_aabb(&mut body);

        // resting on the floor, walking right must not catch tile seams
        let before = body.x;
        body.vel_x = Fix::from_int(5);
        let result = layer.resolve_aabb(&mut body);
        assert_eq!(result, hit::NONE);
        assert_eq!(body.x, before + Fix::from_int(5));
    }

    #[test]
    fn test_corner_hits_both_axes() {
        let layer = arena();
        // moving down-right into the floor/wall corner
        let mut body = Body::new(
            Fix::from_int(96),
            Fix::from_int(80),
            Fix::from_int(8),
            Fix::from_int(8),
        );
        body.vel_x = Fix::from_int(20);
        body.vel_y = Fix::from_int(20);

        let result = layer.resolve_aabb(&mut body);

        assert_eq!(result, hit::BOTTOM | hit::RIGHT);
        assert_eq!(body.vel_x, Fix::ZERO);
        assert_eq!(body.vel_y, Fix::ZERO);
    }

    #[test]
    fn test_no_collision_grid_moves_freely() {
        let asset = TilemapAsset::new("backdrop", 4, 4, 0, 0, vec![0; 16]).unwrap();
        let layer = TilemapLayer::new(Rc::new(asset));

        let mut body = Body::new(Fix::ZERO, Fix::ZERO, Fix::ONE, Fix::ONE);
        body.vel_x = Fix::from_int(7);
        body.vel_y = Fix::from_int(-3);

        assert_eq!(layer.resolve_aabb(&mut body), hit::NONE);
        assert_eq!(body.x, Fix::from_int(7));
        assert_eq!(body.y, Fix::from_int(-3));
    }
}
