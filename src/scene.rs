//! Scene composition and hardware sprite allocation
//!
//! A [`Scene`] owns the camera plus fixed-capacity pools of actors,
//! parallax layers and tilemap layers, and multiplexes all of them onto
//! the one hardware sprite table each frame. Draw order comes from a
//! lazily rebuilt render queue sorted by z; the allocator then walks that
//! queue handing each visible layer a contiguous sprite range.
//!
//! Two allocation cursors keep screen-space actors independent of world
//! churn: world layers grow from the bottom of the table while
//! screen-space actors use a reserved pool at the top, so a HUD never
//! shifts (and never rewrites its tiles) when gameplay entities come and
//! go. Every layer records the range it was handed and treats a different
//! range next frame as a signal to rewrite itself from scratch.
//!
//! Capacity problems are never fatal: full pools return `None` from the
//! `add_*` calls, stale handles make mutators no-ops and accessors return
//! neutral values, and a layer that does not fit in the remaining sprite
//! budget is skipped for that frame.

use crate::actor::Actor;
use crate::camera::Camera;
use crate::fixed::Fix;
use crate::hw::{sprite, Vram, SPRITE_FIRST, SPRITE_MAX};
use crate::parallax::ParallaxLayer;
use crate::pool::{self, Pool};
use crate::tilemap::{hit, Body, TilemapLayer};

/// Actor pool capacity
pub const MAX_ACTORS: usize = 64;
/// Parallax layer pool capacity
pub const MAX_PARALLAX_LAYERS: usize = 4;
/// Tilemap layer pool capacity
pub const MAX_TILEMAP_LAYERS: usize = 4;

/// Sprites reserved at the top of the table for screen-space actors
const UI_POOL_SPRITES: u16 = 30;
/// First sprite of the reserved screen-space pool
const UI_SPRITE_FIRST: u16 = SPRITE_MAX + 1 - UI_POOL_SPRITES;

/// Handle to an [`Actor`] in a scene
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct ActorId(pool::Id);

/// Handle to a [`ParallaxLayer`] in a scene
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct ParallaxId(pool::Id);

/// Handle to a [`TilemapLayer`] in a scene
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct TilemapId(pool::Id);

impl ActorId {
    pub const NULL: ActorId = ActorId(pool::Id::NULL);

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

impl ParallaxId {
    pub const NULL: ParallaxId = ParallaxId(pool::Id::NULL);

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

impl TilemapId {
    pub const NULL: TilemapId = TilemapId(pool::Id::NULL);

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

#[derive(Clone, Copy)]
enum LayerKind {
    Actor,
    Parallax,
    Tilemap,
}

/// One draw-order slot, built fresh on every queue rebuild
struct RenderEntry {
    kind: LayerKind,
    id: pool::Id,
    z: u8,
}

pub struct Scene {
    camera: Camera,

    actors: Pool<Actor>,
    parallax_layers: Pool<ParallaxLayer>,
    tilemap_layers: Pool<TilemapLayer>,

    tracked: Option<ActorId>,
    terrain: Option<TilemapId>,

    queue: Vec<RenderEntry>,
    queue_dirty: bool,

    world_high_water: u16,
    ui_high_water: u16,
}

impl Scene {
    pub fn new() -> Scene {
        Scene {
            camera: Camera::new(),
            actors: Pool::with_capacity(MAX_ACTORS),
            parallax_layers: Pool::with_capacity(MAX_PARALLAX_LAYERS),
            tilemap_layers: Pool::with_capacity(MAX_TILEMAP_LAYERS),
            tracked: None,
            terrain: None,
            queue: Vec::new(),
            queue_dirty: true,
            world_high_water: SPRITE_FIRST,
            ui_high_water: UI_SPRITE_FIRST,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Add an actor at a world position and z order. `None` when the
    /// actor pool is full.
    pub fn add_actor(&mut self, mut actor: Actor, x: Fix, y: Fix, z: u8) -> Option<ActorId> {
        actor.set_pos(x, y);
        actor.z = z;
        let id = self.actors.insert(actor)?;
        self.queue_dirty = true;
        Some(ActorId(id))
    }

    /// Remove an actor. Its sprites are released on the next draw.
    pub fn remove_actor(&mut self, id: ActorId) {
        if self.actors.remove(id.0).is_some() {
            self.queue_dirty = true;
            if self.tracked == Some(id) {
                self.tracked = None;
            }
        }
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id.0)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(id.0)
    }

    pub fn set_actor_z(&mut self, id: ActorId, z: u8) {
        if let Some(actor) = self.actors.get_mut(id.0) {
            if actor.z != z {
                actor.z = z;
                self.queue_dirty = true;
            }
        }
    }

    /// Point the camera's dead-zone follower at an actor
    pub fn track_actor(&mut self, id: ActorId) {
        self.tracked = Some(id);
    }

    pub fn stop_tracking(&mut self) {
        self.tracked = None;
    }

    /// Add a parallax layer anchored at a viewport position and the
    /// camera's current position. `None` when the layer pool is full.
    pub fn add_parallax(
        &mut self,
        mut layer: ParallaxLayer,
        viewport_x: i16,
        viewport_y: i16,
        z: u8,
    ) -> Option<ParallaxId> {
        layer.place(viewport_x, viewport_y, z, &self.camera);
        let id = self.parallax_layers.insert(layer)?;
        self.queue_dirty = true;
        Some(ParallaxId(id))
    }

    pub fn remove_parallax(&mut self, id: ParallaxId) {
        if self.parallax_layers.remove(id.0).is_some() {
            self.queue_dirty = true;
        }
    }

    pub fn parallax(&self, id: ParallaxId) -> Option<&ParallaxLayer> {
        self.parallax_layers.get(id.0)
    }

    pub fn parallax_mut(&mut self, id: ParallaxId) -> Option<&mut ParallaxLayer> {
        self.parallax_layers.get_mut(id.0)
    }

    pub fn set_parallax_z(&mut self, id: ParallaxId, z: u8) {
        if let Some(layer) = self.parallax_layers.get_mut(id.0) {
            if layer.z != z {
                layer.z = z;
                self.queue_dirty = true;
            }
        }
    }

    /// Add a tilemap layer with its grid origin at a world position.
    /// `None` when the layer pool is full.
    pub fn add_tilemap(
        &mut self,
        mut layer: TilemapLayer,
        world_x: Fix,
        world_y: Fix,
        z: u8,
    ) -> Option<TilemapId> {
        layer.place(world_x, world_y, z);
        let id = self.tilemap_layers.insert(layer)?;
        self.queue_dirty = true;
        Some(TilemapId(id))
    }

    pub fn remove_tilemap(&mut self, id: TilemapId) {
        if self.tilemap_layers.remove(id.0).is_some() {
            self.queue_dirty = true;
            if self.terrain == Some(id) {
                self.terrain = None;
            }
        }
    }

    pub fn tilemap(&self, id: TilemapId) -> Option<&TilemapLayer> {
        self.tilemap_layers.get(id.0)
    }

    pub fn tilemap_mut(&mut self, id: TilemapId) -> Option<&mut TilemapLayer> {
        self.tilemap_layers.get_mut(id.0)
    }

    pub fn set_tilemap_z(&mut self, id: TilemapId, z: u8) {
        if let Some(layer) = self.tilemap_layers.get_mut(id.0) {
            if layer.z != z {
                layer.z = z;
                self.queue_dirty = true;
            }
        }
    }

    /// Mark one tilemap layer as the terrain the collision queries below
    /// run against, or `None` to detach.
    pub fn set_terrain(&mut self, id: Option<TilemapId>) {
        self.terrain = id;
    }

    pub fn terrain(&self) -> Option<TilemapId> {
        self.terrain
    }

    fn terrain_layer(&self) -> Option<&TilemapLayer> {
        self.terrain.and_then(|id| self.tilemap_layers.get(id.0))
    }

    /// Collision flags at a world point, zero without terrain
    pub fn collision_at(&self, world_x: Fix, world_y: Fix) -> u8 {
        match self.terrain_layer() {
            Some(layer) => layer.collision_at(world_x, world_y),
            None => 0,
        }
    }

    /// Union of collision flags under a box, zero without terrain
    pub fn test_aabb(&self, x: Fix, y: Fix, half_w: Fix, half_h: Fix) -> u8 {
        match self.terrain_layer() {
            Some(layer) => layer.test_aabb(x, y, half_w, half_h),
            None => 0,
        }
    }

    /// Move a body against the terrain. Without terrain the body moves
    /// unobstructed, same as a map with no collision grid.
    pub fn resolve_aabb(&self, body: &mut Body) -> u8 {
        match self.terrain_layer() {
            Some(layer) => layer.resolve_aabb(body),
            None => {
                body.x += body.vel_x;
                body.y += body.vel_y;
                hit::NONE
            }
        }
    }

    /// Advance the camera (following the tracked actor, if any live one
    /// is set) and every actor's animation. Call once per frame, before
    /// [`Scene::draw`].
    pub fn update(&mut self) {
        let track = self
            .tracked
            .and_then(|id| self.actors.get(id.0))
            .map(|actor| (actor.x, actor.y));
        self.camera.update(track);

        for (_, actor) in self.actors.iter_mut() {
            actor.update();
        }
    }

    /// Allocate sprites to every visible layer in z order and write the
    /// frame into VRAM. Slots claimed last frame but not this frame are
    /// hidden afterwards.
    pub fn draw(&mut self, vram: &mut Vram) {
        if self.queue_dirty {
            self.rebuild_queue();
        }

        let mut world_cursor = SPRITE_FIRST;
        let mut ui_cursor = UI_SPRITE_FIRST;

        for entry in &self.queue {
            match entry.kind {
                LayerKind::Actor => {
                    if let Some(actor) = self.actors.get_mut(entry.id) {
                        let count = actor.sprite_count() as u16;
                        if count == 0 {
                            continue;
                        }
                        if actor.is_screen_space() {
                            if ui_cursor + count > SPRITE_MAX + 1 {
                                continue;
                            }
                            actor.draw(vram, &self.camera, ui_cursor);
                            ui_cursor += count;
                        } else {
                            if world_cursor + count > UI_SPRITE_FIRST {
                                continue;
                            }
                            actor.draw(vram, &self.camera, world_cursor);
                            world_cursor += count;
                        }
                    }
                }
                LayerKind::Parallax => {
                    if let Some(layer) = self.parallax_layers.get_mut(entry.id) {
                        let count = layer.sprite_count() as u16;
                        if count == 0 || world_cursor + count > UI_SPRITE_FIRST {
                            continue;
                        }
                        layer.draw(vram, &self.camera, world_cursor);
                        world_cursor += count;
                    }
                }
                LayerKind::Tilemap => {
                    if let Some(layer) = self.tilemap_layers.get_mut(entry.id) {
                        let count = layer.sprite_count(&self.camera) as u16;
                        if count == 0 || world_cursor + count > UI_SPRITE_FIRST {
                            continue;
                        }
                        layer.draw(vram, &self.camera, world_cursor);
                        world_cursor += count;
                    }
                }
            }
        }

        if world_cursor < self.world_high_water {
            sprite::hide(vram, world_cursor, self.world_high_water - world_cursor);
        }
        self.world_high_water = world_cursor;

        if ui_cursor < self.ui_high_water {
            sprite::hide(vram, ui_cursor, self.ui_high_water - ui_cursor);
        }
        self.ui_high_water = ui_cursor;
    }

    /// Collect live layers and sort by z. The sort is stable, so equal z
    /// draws in scan order: actors, then parallax, then tilemaps, each in
    /// slot order.
    fn rebuild_queue(&mut self) {
        self.queue.clear();
        for (id, actor) in self.actors.iter() {
            self.queue.push(RenderEntry {
                kind: LayerKind::Actor,
                id,
                z: actor.z,
            });
        }
        for (id, layer) in self.parallax_layers.iter() {
            self.queue.push(RenderEntry {
                kind: LayerKind::Parallax,
                id,
                z: layer.z,
            });
        }
        for (id, layer) in self.tilemap_layers.iter() {
            self.queue.push(RenderEntry {
                kind: LayerKind::Tilemap,
                id,
                z: layer.z,
            });
        }
        self.queue.sort_by_key(|entry| entry.z);
        self.queue_dirty = false;
    }

    /// Drop every layer, invalidate all handles and hide the whole sprite
    /// table. The camera keeps its position and zoom.
    pub fn clear(&mut self, vram: &mut Vram) {
        sprite::hide_all(vram);
        self.actors.clear();
        self.parallax_layers.clear();
        self.tilemap_layers.clear();
        self.tracked = None;
        self.terrain = None;
        self.queue.clear();
        self.queue_dirty = true;
        self.world_high_water = SPRITE_FIRST;
        self.ui_high_water = UI_SPRITE_FIRST;
    }
}

impl Default for Scene {
    fn default() -> Scene {
        Scene::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{tile_flags, TilemapAsset, VisualAsset};
    use crate::hw::vram::SCB3_BASE;
    use std::rc::Rc;

    fn sprite_asset(width_tiles: u8) -> Rc<VisualAsset> {
        Rc::new(VisualAsset::new("blob", 100, width_tiles, 2, 1, 3))
    }

    fn map_asset() -> Rc<TilemapAsset> {
        Rc::new(TilemapAsset::new("floor", 8, 6, 400, 1, vec![7; 48]).unwrap())
    }

    fn walled_asset() -> Rc<TilemapAsset> {
        let mut collision = vec![0u8; 16];
        collision[4 + 2] = tile_flags::SOLID;
        Rc::new(
            TilemapAsset::new("walls", 4, 4, 0, 0, vec![0; 16])
                .unwrap()
                .with_collision(collision)
                .unwrap(),
        )
    }

    #[test]
    fn test_draw_order_z_then_attach_order() {
        let mut scene = Scene::new();
        let mut vram = Vram::new();

        let tm = scene
            .add_tilemap(TilemapLayer::new(map_asset()), Fix::ZERO, Fix::ZERO, 0)
            .unwrap();
        let a = scene
            .add_actor(
                Actor::new(sprite_asset(2)),
                Fix::from_int(50),
                Fix::from_int(60),
                5,
            )
            .unwrap();
        let b = scene
            .add_actor(
                Actor::new(sprite_asset(2)),
                Fix::from_int(90),
                Fix::from_int(60),
                1,
            )
            .unwrap();
        let p = scene
            .add_parallax(
                ParallaxLayer::infinite(sprite_asset(1), Fix::ONE, Fix::ZERO),
                0,
                0,
                1,
            )
            .unwrap();
        let c = scene
            .add_actor(
                Actor::new(sprite_asset(2)),
                Fix::from_int(130),
                Fix::from_int(60),
                5,
            )
            .unwrap();

        scene.draw(&mut vram);

        // z 0 tilemap first: 22 view columns at native zoom
        assert_eq!(scene.tilemap(tm).unwrap().hw_first, 1);
        assert_eq!(scene.tilemap(tm).unwrap().hw_count, 22);
        // z 1: actor scans before parallax
        assert_eq!(scene.actor(b).unwrap().hw_first, 23);
        assert_eq!(scene.parallax(p).unwrap().hw_first, 25);
        assert_eq!(scene.parallax(p).unwrap().hw_count, 22);
        // z 5 ties draw in attach order
        assert_eq!(scene.actor(a).unwrap().hw_first, 47);
        assert_eq!(scene.actor(c).unwrap().hw_first, 49);
    }

    #[test]
    fn test_allocator_shrink_hides_stale_sprites() {
        let mut scene = Scene::new();
        let mut vram = Vram::new();

        let a = scene
            .add_actor(
                Actor::new(sprite_asset(5)),
                Fix::from_int(50),
                Fix::from_int(60),
                0,
            )
            .unwrap();
        let b = scene
            .add_actor(
                Actor::new(sprite_asset(3)),
                Fix::from_int(90),
                Fix::from_int(60),
                1,
            )
            .unwrap();
        let c = scene
            .add_actor(
                Actor::new(sprite_asset(3)),
                Fix::from_int(130),
                Fix::from_int(60),
                2,
            )
            .unwrap();

        scene.draw(&mut vram);
        assert_eq!(scene.actor(a).unwrap().hw_first, 1);
        assert_eq!(scene.actor(b).unwrap().hw_first, 6);
        assert_eq!(scene.actor(c).unwrap().hw_first, 9);

        scene.actor_mut(b).unwrap().set_visible(false);
        scene.draw(&mut vram);

        // Counts {5, 0, 3} pack into [1,6) and [6,9)
        assert_eq!(scene.actor(a).unwrap().hw_first, 1);
        assert_eq!(scene.actor(b).unwrap().sprite_count(), 0);
        assert_eq!(scene.actor(c).unwrap().hw_first, 6);
        assert_ne!(vram.read(SCB3_BASE + 6), 0);

        // Slots up to last frame's high-water mark were cleared
        for sprite in 9..12 {
            assert_eq!(
                vram.read(SCB3_BASE + sprite),
                0,
                "sprite {} still set",
                sprite
            );
        }
    }

    #[test]
    fn test_screen_space_actors_use_reserved_pool() {
        let mut scene = Scene::new();
        let mut vram = Vram::new();

        let mut hud = Actor::new(sprite_asset(2));
        hud.set_screen_space(true);
        let hud_id = scene
            .add_actor(hud, Fix::from_int(8), Fix::from_int(8), 200)
            .unwrap();
        let world_id = scene
            .add_actor(
                Actor::new(sprite_asset(2)),
                Fix::from_int(50),
                Fix::from_int(60),
                0,
            )
            .unwrap();

        scene.draw(&mut vram);
        assert_eq!(scene.actor(world_id).unwrap().hw_first, 1);
        assert_eq!(scene.actor(hud_id).unwrap().hw_first, UI_SPRITE_FIRST);

        // World churn leaves the reserved pool untouched
        scene
            .add_actor(
                Actor::new(sprite_asset(2)),
                Fix::from_int(90),
                Fix::from_int(60),
                1,
            )
            .unwrap();
        let mut meter = Actor::new(sprite_asset(2));
        meter.set_screen_space(true);
        let meter_id = scene
            .add_actor(meter, Fix::from_int(280), Fix::from_int(8), 201)
            .unwrap();
        scene.draw(&mut vram);
        assert_eq!(scene.actor(hud_id).unwrap().hw_first, UI_SPRITE_FIRST);
        assert_eq!(scene.actor(meter_id).unwrap().hw_first, UI_SPRITE_FIRST + 2);

        // Removing the first widget compacts the pool and clears the tail
        scene.remove_actor(hud_id);
        scene.draw(&mut vram);
        assert_eq!(scene.actor(meter_id).unwrap().hw_first, UI_SPRITE_FIRST);
        assert_eq!(vram.read(SCB3_BASE + UI_SPRITE_FIRST + 2), 0);
        assert_eq!(vram.read(SCB3_BASE + UI_SPRITE_FIRST + 3), 0);
    }

    #[test]
    fn test_z_change_reorders_next_draw() {
        let mut scene = Scene::new();
        let mut vram = Vram::new();

        let a = scene
            .add_actor(
                Actor::new(sprite_asset(2)),
                Fix::from_int(50),
                Fix::from_int(60),
                0,
            )
            .unwrap();
        let b = scene
            .add_actor(
                Actor::new(sprite_asset(2)),
                Fix::from_int(90),
                Fix::from_int(60),
                1,
            )
            .unwrap();

        scene.draw(&mut vram);
        assert_eq!(scene.actor(a).unwrap().hw_first, 1);
        assert_eq!(scene.actor(b).unwrap().hw_first, 3);

        scene.set_actor_z(a, 5);
        scene.draw(&mut vram);
        assert_eq!(scene.actor(b).unwrap().hw_first, 1);
        assert_eq!(scene.actor(a).unwrap().hw_first, 3);
    }

    #[test]
    fn test_remove_actor_compacts_and_hides() {
        let mut scene = Scene::new();
        let mut vram = Vram::new();

        let a = scene
            .add_actor(
                Actor::new(sprite_asset(2)),
                Fix::from_int(50),
                Fix::from_int(60),
                0,
            )
            .unwrap();
        let b = scene
            .add_actor(
                Actor::new(sprite_asset(2)),
                Fix::from_int(90),
                Fix::from_int(60),
                1,
            )
            .unwrap();
        scene.draw(&mut vram);

        scene.remove_actor(a);
        scene.draw(&mut vram);
        assert_eq!(scene.actor(b).unwrap().hw_first, 1);
        assert_eq!(vram.read(SCB3_BASE + 3), 0);
        assert_eq!(vram.read(SCB3_BASE + 4), 0);

        // Stale handle: accessors answer nothing, mutators no-op
        assert!(scene.actor(a).is_none());
        scene.set_actor_z(a, 9);
        scene.remove_actor(a);
    }

    #[test]
    fn test_tracked_actor_drives_camera() {
        let mut scene = Scene::new();

        let a = scene
            .add_actor(
                Actor::new(sprite_asset(2)),
                Fix::from_int(400),
                Fix::from_int(300),
                0,
            )
            .unwrap();
        scene.track_actor(a);

        scene.update();
        assert!(scene.camera().x() > Fix::ZERO);
        assert!(scene.camera().y() > Fix::ZERO);

        // Removing the tracked actor stops the follower cold
        scene.remove_actor(a);
        let (cx, cy) = (scene.camera().x(), scene.camera().y());
        scene.update();
        assert_eq!(scene.camera().x(), cx);
        assert_eq!(scene.camera().y(), cy);
    }

    #[test]
    fn test_pool_capacity_returns_none() {
        let mut scene = Scene::new();

        for i in 0..MAX_ACTORS {
            assert!(
                scene
                    .add_actor(Actor::new(sprite_asset(1)), Fix::ZERO, Fix::ZERO, 0)
                    .is_some(),
                "actor {} failed",
                i
            );
        }
        assert!(scene
            .add_actor(Actor::new(sprite_asset(1)), Fix::ZERO, Fix::ZERO, 0)
            .is_none());

        for _ in 0..MAX_PARALLAX_LAYERS {
            let layer = ParallaxLayer::infinite(sprite_asset(1), Fix::ONE, Fix::ZERO);
            assert!(scene.add_parallax(layer, 0, 0, 0).is_some());
        }
        let layer = ParallaxLayer::infinite(sprite_asset(1), Fix::ONE, Fix::ZERO);
        assert!(scene.add_parallax(layer, 0, 0, 0).is_none());

        for _ in 0..MAX_TILEMAP_LAYERS {
            let layer = TilemapLayer::new(map_asset());
            assert!(scene.add_tilemap(layer, Fix::ZERO, Fix::ZERO, 0).is_some());
        }
        let layer = TilemapLayer::new(map_asset());
        assert!(scene.add_tilemap(layer, Fix::ZERO, Fix::ZERO, 0).is_none());
    }

    #[test]
    fn test_collision_queries_forward_to_terrain() {
        let mut scene = Scene::new();

        // No terrain: everything reads as open space
        assert_eq!(scene.collision_at(Fix::from_int(36), Fix::from_int(20)), 0);
        let mut body = Body::new(
            Fix::from_int(10),
            Fix::from_int(10),
            Fix::from_int(4),
            Fix::from_int(4),
        );
        body.vel_x = Fix::from_int(3);
        assert_eq!(scene.resolve_aabb(&mut body), hit::NONE);
        assert_eq!(body.x, Fix::from_int(13));

        let tm = scene
            .add_tilemap(TilemapLayer::new(walled_asset()), Fix::ZERO, Fix::ZERO, 0)
            .unwrap();
        scene.set_terrain(Some(tm));

        // Solid cell at tile (2, 1)
        assert_eq!(
            scene.collision_at(Fix::from_int(36), Fix::from_int(20)),
            tile_flags::SOLID
        );
        assert_eq!(
            scene.test_aabb(
                Fix::from_int(36),
                Fix::from_int(20),
                Fix::from_int(2),
                Fix::from_int(2)
            ),
            tile_flags::SOLID
        );

        // Removing the terrain layer detaches the queries
        scene.remove_tilemap(tm);
        assert!(scene.terrain().is_none());
        assert_eq!(scene.collision_at(Fix::from_int(36), Fix::from_int(20)), 0);
    }

    #[test]
    fn test_sprite_budget_exhaustion_skips_layer() {
        let mut scene = Scene::new();
        let mut vram = Vram::new();

        for i in 0..MAX_TILEMAP_LAYERS {
            scene
                .add_tilemap(TilemapLayer::new(map_asset()), Fix::ZERO, Fix::ZERO, i as u8)
                .unwrap();
        }
        for _ in 0..MAX_PARALLAX_LAYERS {
            let layer = ParallaxLayer::infinite(sprite_asset(1), Fix::ONE, Fix::ZERO);
            scene.add_parallax(layer, 0, 0, 10).unwrap();
        }
        let mut last_wide = ActorId::NULL;
        for i in 0..8 {
            last_wide = scene
                .add_actor(
                    Actor::new(sprite_asset(20)),
                    Fix::from_int(i * 40),
                    Fix::from_int(60),
                    20 + i as u8,
                )
                .unwrap();
        }
        // 4*22 + 4*22 + 8*20 = 336 sprites so far; 20 more will not fit
        let skipped = scene
            .add_actor(Actor::new(sprite_asset(20)), Fix::ZERO, Fix::ZERO, 99)
            .unwrap();
        // ...but a single column still does
        let small = scene
            .add_actor(Actor::new(sprite_asset(1)), Fix::ZERO, Fix::ZERO, 100)
            .unwrap();

        scene.draw(&mut vram);

        assert_eq!(scene.actor(last_wide).unwrap().hw_first, 317);
        assert_eq!(scene.actor(skipped).unwrap().hw_count, 0);
        assert_eq!(scene.actor(small).unwrap().hw_first, 337);
    }

    #[test]
    fn test_update_advances_actor_animations() {
        let mut scene = Scene::new();

        let asset =
            Rc::new(VisualAsset::new("runner", 64, 1, 1, 4, 0).anim("run", 0, 4, 1, true));
        let mut actor = Actor::new(asset);
        assert!(actor.play_anim("run"));
        let id = scene
            .add_actor(actor, Fix::from_int(50), Fix::from_int(60), 0)
            .unwrap();

        assert_eq!(scene.actor(id).unwrap().anim_frame(), 0);
        scene.update();
        assert_eq!(scene.actor(id).unwrap().anim_frame(), 1);
        scene.update();
        assert_eq!(scene.actor(id).unwrap().anim_frame(), 2);
    }
}
