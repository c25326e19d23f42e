//! Demo cart: a side-scrolling platformer scene that exercises the whole
//! compositor. Run with arrows + space, Z/X to zoom, S to shake the camera.

use macroquad::prelude::*;
use nova380::asset::{tile_flags, AssetError, TilemapAsset, VisualAsset};
use nova380::hw::display::ProceduralArt;
use nova380::hw::fix::{self, HAlign, Layout, VAlign};
use nova380::hw::{Display, Vram};
use nova380::{Actor, Body, Fix, ParallaxLayer, Scene, TilemapLayer, VERSION};
use std::rc::Rc;

const LEVEL_COLS: u16 = 64;
const LEVEL_ROWS: u16 = 28;

/// Zoom targets the demo cycles through. 16 is pixel-perfect, lower values
/// pull the camera back.
const ZOOM_NEAR: u8 = 16;
const ZOOM_FAR: u8 = 12;

const PLAYER_HALF_W: Fix = Fix::from_int(10);
const PLAYER_HALF_H: Fix = Fix::from_int(14);

// Jump tuning: lighter gravity on the way up, an early release cuts the
// arc short, and grounded state is forgiven for a few frames either way
const COYOTE_FRAMES: u8 = 6;
const JUMP_BUFFER_FRAMES: u8 = 6;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("NOVA-380 v{}", VERSION),
        // 3x the console resolution, still resizable for odd displays
        window_width: 960,
        window_height: 672,
        window_resizable: true,
        high_dpi: true,
        #[cfg(not(target_arch = "wasm32"))]
        fullscreen: false,
        ..Default::default()
    }
}

/// Built-in level: a long runway with a pit, one-way platforms, a wall to
/// bump into and a raised ledge at the far end.
fn demo_level() -> Result<TilemapAsset, AssetError> {
    let cols = LEVEL_COLS as usize;
    let rows = LEVEL_ROWS as usize;
    let mut tiles = vec![0u8; cols * rows];
    let mut coll = vec![0u8; cols * rows];

    let mut block = |x: usize, y: usize, tile: u8, flags: u8| {
        tiles[y * cols + x] = tile;
        coll[y * cols + x] = flags;
    };

    // ground slab with a pit at columns 24..28
    for x in 0..cols {
        if (24..28).contains(&x) {
            continue;
        }
        block(x, 24, 2, tile_flags::SOLID);
        for y in 25..rows {
            block(x, y, 1, tile_flags::SOLID);
        }
    }

    // one-way platforms, each within a full jump of the step before it
    for x in 10..15 {
        block(x, 21, 3, tile_flags::PLATFORM);
    }
    for x in 17..22 {
        block(x, 18, 3, tile_flags::PLATFORM);
    }
    for x in 30..35 {
        block(x, 21, 3, tile_flags::PLATFORM);
    }
    for x in 36..40 {
        block(x, 18, 3, tile_flags::PLATFORM);
    }

    // wall column, crossed from the platform beside it
    for y in 18..24 {
        block(40, y, 4, tile_flags::SOLID);
    }

    // raised ledge before the right edge
    for x in 46..cols {
        block(x, 21, 2, tile_flags::SOLID);
        for y in 22..24 {
            block(x, y, 1, tile_flags::SOLID);
        }
    }

    TilemapAsset::new("runway", LEVEL_COLS, LEVEL_ROWS, 512, 1, tiles)?.with_collision(coll)
}

fn player_asset() -> Rc<VisualAsset> {
    Rc::new(
        VisualAsset::new("pilot", 64, 2, 2, 6, 2)
            .anim("idle", 0, 1, 0, true)
            .anim("run", 1, 4, 6, true)
            .anim("jump", 5, 1, 0, false),
    )
}

struct Player {
    body: Body,
    on_ground: bool,
    facing_left: bool,
    coyote_timer: u8,
    jump_buffer: u8,
    jumping: bool,
}

impl Player {
    fn new(x: Fix, y: Fix) -> Player {
        Player {
            body: Body::new(x, y, PLAYER_HALF_W, PLAYER_HALF_H),
            on_ground: false,
            facing_left: false,
            coyote_timer: 0,
            jump_buffer: 0,
            jumping: false,
        }
    }

    fn respawn(&mut self, x: Fix, y: Fix) {
        self.body.x = x;
        self.body.y = y;
        self.body.vel_x = Fix::ZERO;
        self.body.vel_y = Fix::ZERO;
        self.on_ground = false;
        self.coyote_timer = 0;
        self.jump_buffer = 0;
        self.jumping = false;
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    let mut vram = Vram::new();
    let mut display = Display::new();
    let art = ProceduralArt;
    let mut scene = Scene::new();

    // Level geometry: prefer the RON map from `cargo xtask gen-map`, fall
    // back to the built-in layout (WASM always uses the built-in one).
    #[cfg(not(target_arch = "wasm32"))]
    let level = match TilemapAsset::load("assets/demo/runway.ron") {
        Ok(asset) => Ok(asset),
        Err(_) => demo_level(),
    };
    #[cfg(target_arch = "wasm32")]
    let level = demo_level();

    let terrain_asset = match level {
        Ok(asset) => Rc::new(asset),
        Err(e) => {
            println!("Failed to build demo level: {}", e);
            return;
        }
    };
    let world_w = terrain_asset.width_pixels();
    let world_h = terrain_asset.height_pixels();

    // background strips, world geometry, then the player on top
    let haze = Rc::new(VisualAsset::new("haze", 256, 4, 6, 1, 5));
    let ridge = Rc::new(VisualAsset::new("ridge", 280, 4, 4, 1, 6));
    let quarter = Fix::from_f32(0.25);
    let half = Fix::from_f32(0.5);
    scene.add_parallax(ParallaxLayer::infinite(haze, quarter, Fix::ZERO), 0, 40, 0);
    scene.add_parallax(ParallaxLayer::infinite(ridge, half, Fix::ZERO), 0, 120, 1);

    let terrain = scene.add_tilemap(TilemapLayer::new(terrain_asset), Fix::ZERO, Fix::ZERO, 2);
    scene.set_terrain(terrain);

    let spawn = (Fix::from_int(64), Fix::from_int(352));
    let mut player = Player::new(spawn.0, spawn.1);
    let mut actor = Actor::new(player_asset());
    actor.play_anim("idle");
    let Some(player_id) = scene.add_actor(actor, spawn.0, spawn.1, 5) else {
        println!("Actor pool exhausted at startup");
        return;
    };
    scene.track_actor(player_id);

    // HUD: a screen-space badge plus fix-layer text
    let badge = Rc::new(VisualAsset::new("badge", 240, 4, 1, 1, 7));
    let mut badge_actor = Actor::new(badge);
    badge_actor.set_screen_space(true);
    scene.add_actor(badge_actor, Fix::from_int(8), Fix::from_int(8), 200);

    fix::print(
        &mut vram,
        Layout::align(HAlign::Center, VAlign::Top),
        0,
        "NOVA-380 DEMO CART",
    );
    fix::print(
        &mut vram,
        Layout::offset(HAlign::Left, VAlign::Bottom, 0, -1),
        0,
        "ARROWS:RUN SPACE:JUMP Z/X:ZOOM S:SHAKE",
    );

    {
        let camera = scene.camera_mut();
        camera.set_bounds(world_w, world_h);
        camera.set_deadzone(80, 40);
        camera.set_follow_speed(Fix::from_f32(0.12));
        camera.set_pos(spawn.0, spawn.1);
    }

    let run_speed = Fix::from_int(2);
    let gravity_up = Fix::from_f32(0.35);
    let gravity_down = Fix::from_f32(0.55);
    let max_fall = Fix::from_int(10);
    let jump_kick = Fix::from_f32(-6.5);
    let jump_cut = Fix::from_f32(0.4);

    loop {
        // input
        let left = is_key_down(KeyCode::Left) || is_key_down(KeyCode::A);
        let right = is_key_down(KeyCode::Right) || is_key_down(KeyCode::D);
        let jump = is_key_pressed(KeyCode::Space) || is_key_pressed(KeyCode::Up);

        if is_key_pressed(KeyCode::Z) {
            scene.camera_mut().set_target_zoom(ZOOM_FAR);
        }
        if is_key_pressed(KeyCode::X) {
            scene.camera_mut().set_target_zoom(ZOOM_NEAR);
        }
        if is_key_pressed(KeyCode::S) {
            scene.camera_mut().shake(3, 24);
        }
        if is_key_pressed(KeyCode::R) {
            player.respawn(spawn.0, spawn.1);
        }

        // one physics tick per frame, console style
        player.body.vel_x = if left && !right {
            player.facing_left = true;
            -run_speed
        } else if right && !left {
            player.facing_left = false;
            run_speed
        } else {
            Fix::ZERO
        };
        // buffered jumps and coyote time, so edge-of-platform inputs land
        if jump {
            player.jump_buffer = JUMP_BUFFER_FRAMES;
        } else if player.jump_buffer > 0 {
            player.jump_buffer -= 1;
        }
        if player.on_ground {
            player.coyote_timer = COYOTE_FRAMES;
        } else if player.coyote_timer > 0 {
            player.coyote_timer -= 1;
        }
        if player.jump_buffer > 0 && (player.on_ground || player.coyote_timer > 0) {
            player.body.vel_y = jump_kick;
            player.jumping = true;
            player.coyote_timer = 0;
            player.jump_buffer = 0;
        }

        // releasing jump early cuts the arc short
        let jump_held = is_key_down(KeyCode::Space) || is_key_down(KeyCode::Up);
        if player.jumping && player.body.vel_y < Fix::ZERO && !jump_held {
            player.body.vel_y = player.body.vel_y * jump_cut;
            player.jumping = false;
        }
        if player.body.vel_y >= Fix::ZERO {
            player.jumping = false;
        }

        // lighter gravity rising than falling
        let gravity = if player.body.vel_y < Fix::ZERO {
            gravity_up
        } else {
            gravity_down
        };
        player.body.vel_y = (player.body.vel_y + gravity).min(max_fall);

        let hit = scene.resolve_aabb(&mut player.body);
        player.on_ground = hit & nova380::tilemap::hit::BOTTOM != 0;

        // the level edge is a wall even where no tiles are
        let right_lim = Fix::from_int(world_w) - PLAYER_HALF_W;
        if player.body.x < PLAYER_HALF_W {
            player.body.x = PLAYER_HALF_W;
            player.body.vel_x = Fix::ZERO;
        }
        if player.body.x > right_lim {
            player.body.x = right_lim;
            player.body.vel_x = Fix::ZERO;
        }

        if player.body.y.to_int() > world_h + 64 {
            player.respawn(spawn.0, spawn.1);
        }

        if let Some(actor) = scene.actor_mut(player_id) {
            actor.set_pos(
                player.body.x - Fix::from_int(16),
                player.body.y - Fix::from_int(16),
            );
            actor.set_flip(player.facing_left, false);
            let anim = if !player.on_ground {
                "jump"
            } else if player.body.vel_x != Fix::ZERO {
                "run"
            } else {
                "idle"
            };
            actor.play_anim(anim);
        }

        scene.update();

        // live zoom readout, top right
        fix::clear_rect(&mut vram, 32, 2, 7, 1);
        let zoom = format!("ZOOM {:2}", scene.camera().zoom());
        fix::print(&mut vram, Layout::align(HAlign::Right, VAlign::Top), 0, &zoom);

        scene.draw(&mut vram);
        display.render(&vram, &art);

        #[cfg(not(target_arch = "wasm32"))]
        if is_key_pressed(KeyCode::F12) {
            save_screenshot(&display);
        }

        // integer-scale the console frame onto the window
        clear_background(Color::from_rgba(18, 18, 24, 255));
        let texture = Texture2D::from_rgba8(
            display.width as u16,
            display.height as u16,
            &display.pixels,
        );
        texture.set_filter(FilterMode::Nearest);

        let scale = (screen_width() / display.width as f32)
            .min(screen_height() / display.height as f32)
            .floor()
            .max(1.0);
        let draw_w = display.width as f32 * scale;
        let draw_h = display.height as f32 * scale;
        draw_texture_ex(
            &texture,
            ((screen_width() - draw_w) / 2.0).floor(),
            ((screen_height() - draw_h) / 2.0).floor(),
            WHITE,
            DrawTextureParams {
                dest_size: Some(Vec2::new(draw_w, draw_h)),
                ..Default::default()
            },
        );

        next_frame().await
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn save_screenshot(display: &Display) {
    let Some(shot) = image::RgbaImage::from_raw(
        display.width as u32,
        display.height as u32,
        display.pixels.clone(),
    ) else {
        println!("Screenshot failed: frame buffer size mismatch");
        return;
    };
    match shot.save("nova-380-frame.png") {
        Ok(()) => println!("Saved nova-380-frame.png"),
        Err(e) => println!("Screenshot failed: {}", e),
    }
}
