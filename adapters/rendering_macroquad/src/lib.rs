#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Viper Patrol.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature; sound is routed through the rendering crate's
//! [`AudioSink`](viper_patrol_rendering::AudioSink) contract instead.
//!
//! The adapter owns the frame loop: it polls the keyboard into a
//! [`FrameInput`], hands it to the simulation closure, and then draws the
//! declarative [`Scene`] the closure produced. A missing sprite is never
//! fatal mid-frame; each draw falls back to a flat placeholder shape.

mod sprites;
mod starfield;

pub use self::sprites::{DrawParams, SpriteAtlas};
pub use self::starfield::Starfield;

use anyhow::{Context, Result};
use glam::Vec2;
use macroquad::{
    input::{is_key_down, is_key_pressed, KeyCode},
    math::Vec2 as MacroquadVec2,
    shapes::{draw_circle, draw_line, draw_rectangle, draw_triangle},
    text::{draw_text, measure_text},
};
use std::{sync::mpsc, time::Duration};
use viper_patrol_core::{GameState, InputSnapshot};
use viper_patrol_rendering::{
    BlastPresentation, Color, EnemyPresentation, ExplosionPresentation, FrameInput,
    OverlayPresentation, PlayerPresentation, PowerUpPresentation, Presentation, RenderingBackend,
    Scene, ShotPresentation, ShotStyle, SpriteKey, StargateEffectPresentation,
};

const STARFIELD_SEED: u64 = 0x5354_4152;
const TERRAIN_BASE: Color = Color::from_rgb_u8(0x2a, 0x2a, 0x2a);
const HUD_BLUE: Color = Color::from_rgb_u8(0x00, 0xc4, 0xff);

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    skip_sprites: bool,
}

impl MacroquadBackend {
    /// Requests a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: i32) -> Self {
        self.swap_interval = Some(swap_interval);
        self
    }

    /// Shows a frames-per-second readout in the corner.
    #[must_use]
    pub fn with_fps_overlay(mut self) -> Self {
        self.show_fps = true;
        self
    }

    /// Skips sprite loading entirely; everything renders as flat shapes.
    #[must_use]
    pub fn without_sprites(mut self) -> Self {
        self.skip_sprites = true;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            skip_sprites,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: scene.play_field.width() as i32,
            window_height: scene.play_field.height() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (init_sender, init_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let mut init_sender = Some(init_sender);
            let mut scene = scene;

            let sprite_atlas = if skip_sprites {
                None
            } else {
                match SpriteAtlas::from_default_manifest()
                    .context("failed to initialise sprite atlas")
                {
                    Ok(atlas) => Some(atlas),
                    Err(error) => {
                        if let Some(sender) = init_sender.take() {
                            let _ = sender.send(Err(error));
                        }
                        return;
                    }
                }
            };
            if let Some(sender) = init_sender.take() {
                let _ = sender.send(Ok(()));
            }

            let mut starfield = Starfield::new(
                STARFIELD_SEED,
                scene.play_field.width(),
                scene.play_field.height(),
            );
            let background = to_macroquad_color(clear_color);

            loop {
                let frame_input = gather_frame_input();
                if frame_input.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let dt_seconds = macroquad::time::get_frame_time().max(0.0);
                let frame_dt = Duration::from_secs_f32(dt_seconds);
                update_scene(frame_dt, frame_input, &mut scene);

                starfield.update(dt_seconds);
                draw_scene(&scene, sprite_atlas.as_ref(), &starfield);

                if show_fps {
                    draw_text(
                        &format!("{} FPS", macroquad::time::get_fps()),
                        scene.play_field.width() - 90.0,
                        20.0,
                        20.0,
                        to_macroquad_color(HUD_BLUE),
                    );
                }

                macroquad::window::next_frame().await;
            }
        });

        init_receiver.recv().unwrap_or(Ok(()))
    }
}

/// Polls the keyboard into the frame's immutable input snapshot.
fn gather_frame_input() -> FrameInput {
    let input = InputSnapshot {
        move_up: is_key_down(KeyCode::W) || is_key_down(KeyCode::Up),
        move_down: is_key_down(KeyCode::S) || is_key_down(KeyCode::Down),
        move_left: is_key_down(KeyCode::A) || is_key_down(KeyCode::Left),
        move_right: is_key_down(KeyCode::D) || is_key_down(KeyCode::Right),
        fire: is_key_down(KeyCode::Space) || is_key_down(KeyCode::LeftShift),
        reverse: is_key_pressed(KeyCode::X),
        start: is_key_pressed(KeyCode::Space) || is_key_pressed(KeyCode::Enter),
        restart: is_key_pressed(KeyCode::R),
    };

    FrameInput {
        input,
        quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
        toggle_mute: is_key_pressed(KeyCode::M),
    }
}

pub(crate) fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

fn draw_scene(scene: &Scene, atlas: Option<&SpriteAtlas>, starfield: &Starfield) {
    starfield.draw();

    // The content of a freshly-entered state fades in over the cross-fade
    // window; cuts into and out of the start screen arrive with no fade.
    let fade = scene.transition.map_or(1.0, |transition| transition.progress);

    if scene.state != GameState::Start {
        draw_terrain(scene);
    }

    for power_up in &scene.power_ups {
        draw_power_up(power_up, atlas);
    }
    for enemy in &scene.enemies {
        draw_enemy(enemy, atlas);
    }
    for shot in &scene.enemy_shots {
        draw_shot(shot);
    }
    for shot in &scene.player_shots {
        draw_shot(shot);
    }
    for blast in &scene.blasts {
        draw_blast(blast);
    }
    if let Some(explosion) = &scene.explosion {
        draw_explosion(explosion);
    }
    if let Some(effect) = &scene.stargate_effect {
        draw_stargate_effect(scene, effect, atlas);
    }
    if let Some(player) = &scene.player {
        draw_player(player, atlas);
    }

    draw_hud(scene, atlas);
    draw_overlay(scene, atlas, fade);
}

fn draw_sprite_or(
    atlas: Option<&SpriteAtlas>,
    key: SpriteKey,
    params: DrawParams,
    fallback: impl FnOnce(),
) {
    let drawn = atlas.is_some_and(|atlas| atlas.draw(key, params).is_ok());
    if !drawn {
        fallback();
    }
}

fn draw_terrain(scene: &Scene) {
    let floor = scene.play_field.height();
    let base = to_macroquad_color(TERRAIN_BASE);
    let ridge = to_macroquad_color(TERRAIN_BASE.lighten(0.25));

    for pair in scene.terrain.windows(2) {
        let (left, right) = (pair[0], pair[1]);
        let top_left = MacroquadVec2::new(left.screen_x, floor - left.height);
        let top_right = MacroquadVec2::new(right.screen_x, floor - right.height);
        let bottom_left = MacroquadVec2::new(left.screen_x, floor);
        let bottom_right = MacroquadVec2::new(right.screen_x, floor);

        draw_triangle(top_left, top_right, bottom_left, base);
        draw_triangle(top_right, bottom_right, bottom_left, base);
        draw_line(top_left.x, top_left.y, top_right.x, top_right.y, 2.0, ridge);
    }
}

fn draw_player(player: &PlayerPresentation, atlas: Option<&SpriteAtlas>) {
    if !player.visible {
        return;
    }

    let mut alpha = player.fade;
    if player.respawn_grace {
        // Blink the craft during the respawn grace window.
        let blink = (macroquad::time::get_time() as f32 * 10.0).sin() * 0.5 + 0.5;
        alpha *= 0.4 + 0.6 * blink;
    }

    let size = player.size;
    let center = player.position + size / 2.0;

    if player.thrust > 0.0 {
        draw_thrust(player, alpha);
    }

    draw_sprite_or(
        atlas,
        SpriteKey::Viper,
        DrawParams::new(player.position, size)
            .with_tint(Color::new(1.0, 1.0, 1.0, alpha))
            .with_flip_x(player.facing == viper_patrol_core::Facing::Left),
        || {
            draw_rectangle(
                player.position.x,
                player.position.y,
                size.x,
                size.y,
                macroquad::color::Color::new(0.8, 0.8, 0.9, alpha),
            );
        },
    );

    if player.shield_active {
        let radius = size.x * 0.8;
        draw_circle(
            center.x,
            center.y,
            radius,
            macroquad::color::Color::new(0.0, 1.0, 1.0, 0.15 * alpha),
        );
        draw_circle(
            center.x,
            center.y,
            radius * 0.6,
            macroquad::color::Color::new(0.0, 1.0, 1.0, 0.25 * alpha),
        );
    }
}

fn draw_thrust(player: &PlayerPresentation, alpha: f32) {
    let size = player.size;
    let full = player.thrust >= 1.0;
    let length = if full { size.x * 0.7 } else { size.x * 0.4 };
    let base_width = size.y * 0.3;
    let sign = player.facing.sign();

    // Engine sits a little inside the trailing edge of the sprite.
    let engine_x = if sign > 0.0 {
        player.position.x + size.x * 0.15
    } else {
        player.position.x + size.x * 0.85
    };
    let mid_y = player.position.y + size.y / 2.0;
    let tip_x = engine_x - length * sign;

    let outer = macroquad::color::Color::new(1.0, 0.4, 0.0, 0.6 * player.thrust * alpha);
    let inner = macroquad::color::Color::new(1.0, 0.85, 0.2, 0.9 * player.thrust * alpha);

    draw_triangle(
        MacroquadVec2::new(engine_x, mid_y - base_width / 2.0),
        MacroquadVec2::new(engine_x, mid_y + base_width / 2.0),
        MacroquadVec2::new(tip_x, mid_y),
        outer,
    );
    draw_triangle(
        MacroquadVec2::new(engine_x, mid_y - base_width / 4.0),
        MacroquadVec2::new(engine_x, mid_y + base_width / 4.0),
        MacroquadVec2::new(engine_x - length * 0.7 * sign, mid_y),
        inner,
    );
}

fn draw_enemy(enemy: &EnemyPresentation, atlas: Option<&SpriteAtlas>) {
    let key = SpriteKey::for_enemy(enemy.kind);
    let params = if enemy.kind.spins() {
        DrawParams::new(enemy.position, enemy.size).with_rotation(enemy.spin)
    } else {
        DrawParams::new(enemy.position, enemy.size)
            .with_flip_x(enemy.facing == viper_patrol_core::Facing::Right)
    };

    draw_sprite_or(atlas, key, params, || {
        let tint = match enemy.kind {
            viper_patrol_core::EnemyKind::Drone => macroquad::color::Color::new(1.0, 0.2, 0.2, 1.0),
            viper_patrol_core::EnemyKind::Killer => {
                macroquad::color::Color::new(1.0, 0.2, 1.0, 1.0)
            }
            viper_patrol_core::EnemyKind::Spike => macroquad::color::Color::new(0.2, 1.0, 0.2, 1.0),
            viper_patrol_core::EnemyKind::Striker => {
                macroquad::color::Color::new(0.3, 0.3, 1.0, 1.0)
            }
        };
        draw_rectangle(
            enemy.position.x,
            enemy.position.y,
            enemy.size.x,
            enemy.size.y,
            tint,
        );
    });
}

fn draw_shot(shot: &ShotPresentation) {
    let (bolt, glow): (macroquad::color::Color, macroquad::color::Color) = match shot.style {
        ShotStyle::CyanBolt => (
            macroquad::color::Color::new(0.0, 1.0, 1.0, 1.0),
            macroquad::color::Color::new(0.0, 1.0, 1.0, 0.4),
        ),
        ShotStyle::GreenPlasma => (
            macroquad::color::Color::new(0.0, 1.0, 0.0, 1.0),
            macroquad::color::Color::new(0.0, 1.0, 0.0, 0.4),
        ),
        ShotStyle::YellowBolt => (
            macroquad::color::Color::new(1.0, 1.0, 0.0, 1.0),
            macroquad::color::Color::new(1.0, 1.0, 0.0, 0.0),
        ),
    };

    let trail_len = shot.trail.len().max(1) as f32;
    for (index, position) in shot.trail.iter().enumerate() {
        let alpha = index as f32 / trail_len * 0.5;
        let mut segment = bolt;
        segment.a = alpha;
        draw_line(
            position.x,
            position.y,
            position.x + 12.0,
            position.y,
            4.0,
            segment,
        );
    }

    draw_rectangle(shot.position.x, shot.position.y - 3.0, 12.0, 6.0, bolt);
    if glow.a > 0.0 {
        draw_circle(shot.position.x + 6.0, shot.position.y, 12.0, glow);
    }
}

fn draw_blast(blast: &BlastPresentation) {
    draw_circle(
        blast.center.x,
        blast.center.y,
        blast.radius,
        macroquad::color::Color::new(1.0, 0.78, 0.0, blast.opacity),
    );
    draw_circle(
        blast.center.x,
        blast.center.y,
        blast.radius * 0.6,
        macroquad::color::Color::new(1.0, 0.39, 0.0, blast.opacity),
    );
}

fn draw_explosion(explosion: &ExplosionPresentation) {
    let opacity = explosion.opacity;
    if explosion.is_final {
        draw_circle(
            explosion.center.x,
            explosion.center.y,
            explosion.radius,
            macroquad::color::Color::new(1.0, 0.0, 0.0, opacity * 0.5),
        );
        draw_circle(
            explosion.center.x,
            explosion.center.y,
            explosion.radius * 0.7,
            macroquad::color::Color::new(1.0, 0.39, 0.0, opacity),
        );
        draw_circle(
            explosion.center.x,
            explosion.center.y,
            explosion.radius * 0.4,
            macroquad::color::Color::new(1.0, 0.78, 0.0, opacity),
        );
        draw_circle(
            explosion.center.x,
            explosion.center.y,
            explosion.radius * 0.15,
            macroquad::color::Color::new(1.0, 1.0, 1.0, opacity),
        );
    } else {
        draw_circle(
            explosion.center.x,
            explosion.center.y,
            explosion.radius,
            macroquad::color::Color::new(1.0, 0.39, 0.0, opacity),
        );
        draw_circle(
            explosion.center.x,
            explosion.center.y,
            explosion.radius * 0.5,
            macroquad::color::Color::new(1.0, 0.78, 0.0, opacity),
        );
    }

    for burst in &explosion.bursts {
        draw_circle(
            burst.center.x,
            burst.center.y,
            burst.radius,
            macroquad::color::Color::new(1.0, 0.2, 0.0, burst.opacity * 0.5),
        );
        draw_circle(
            burst.center.x,
            burst.center.y,
            burst.radius * 0.5,
            macroquad::color::Color::new(1.0, 0.9, 0.78, burst.opacity),
        );
    }
}

fn draw_power_up(power_up: &PowerUpPresentation, atlas: Option<&SpriteAtlas>) {
    let size = Vec2::splat(power_up.size);
    match power_up.kind {
        viper_patrol_core::PowerUpKind::Stargate => {
            draw_sprite_or(
                atlas,
                SpriteKey::Vortex,
                DrawParams::new(power_up.position, size).with_rotation(power_up.vortex_rotation),
                || {},
            );
            draw_sprite_or(
                atlas,
                SpriteKey::Stargate,
                DrawParams::new(power_up.position, size).with_rotation(power_up.rotation),
                || {
                    let center = power_up.position + size / 2.0;
                    draw_circle(
                        center.x,
                        center.y,
                        power_up.size / 2.0,
                        macroquad::color::Color::new(0.0, 0.5, 1.0, 0.6),
                    );
                    draw_circle(
                        center.x,
                        center.y,
                        power_up.size / 4.0,
                        macroquad::color::Color::new(0.0, 0.77, 1.0, 0.8),
                    );
                },
            );
        }
        kind => {
            let key = SpriteKey::for_power_up(kind);
            draw_sprite_or(atlas, key, DrawParams::new(power_up.position, size), || {
                let center = power_up.position + size / 2.0;
                let tint = if kind == viper_patrol_core::PowerUpKind::Shield {
                    macroquad::color::Color::new(0.0, 1.0, 1.0, 0.9)
                } else {
                    macroquad::color::Color::new(0.2, 1.0, 0.4, 0.9)
                };
                draw_circle(center.x, center.y, power_up.size / 2.0, tint);
            });
        }
    }
}

fn draw_stargate_effect(
    scene: &Scene,
    effect: &StargateEffectPresentation,
    atlas: Option<&SpriteAtlas>,
) {
    // Layered discs stand in for the radial halo gradient.
    let halo = [
        (1.0, 0.0, 0.25, 1.0, 0.15),
        (0.6, 0.0, 0.5, 1.0, 0.3),
        (0.3, 0.0, 0.77, 1.0, 0.5),
    ];
    for (fraction, red, green, blue, strength) in halo {
        draw_circle(
            effect.center.x,
            effect.center.y,
            effect.radius * fraction,
            macroquad::color::Color::new(red, green, blue, strength * effect.opacity),
        );
    }

    let size = Vec2::splat(effect.size);
    let corner = effect.center - size / 2.0;
    let tint = Color::new(1.0, 1.0, 1.0, effect.opacity);
    draw_sprite_or(
        atlas,
        SpriteKey::Vortex,
        DrawParams::new(corner, size)
            .with_rotation(effect.vortex_rotation)
            .with_tint(tint),
        || {},
    );
    draw_sprite_or(
        atlas,
        SpriteKey::Stargate,
        DrawParams::new(corner, size)
            .with_rotation(effect.rotation)
            .with_tint(tint),
        || {},
    );

    if effect.banner_visible {
        let pulse = 1.0 + (effect.pulse * 5.0).sin() * 0.1;
        let banner_width = scene.play_field.width() * 0.3 * pulse;
        let banner_size = Vec2::new(banner_width, banner_width * 0.25);
        let banner_corner = Vec2::new(
            scene.play_field.width() / 2.0 - banner_size.x / 2.0,
            scene.play_field.height() / 2.0 - banner_size.y / 2.0,
        );
        draw_sprite_or(
            atlas,
            SpriteKey::LevelUpBanner,
            DrawParams::new(banner_corner, banner_size).with_tint(tint),
            || {
                draw_centered_text(
                    "LEVEL UP",
                    scene.play_field.width() / 2.0,
                    scene.play_field.height() / 2.0,
                    48.0,
                    macroquad::color::Color::new(1.0, 1.0, 1.0, effect.opacity),
                );
            },
        );
    }
}

fn draw_hud(scene: &Scene, atlas: Option<&SpriteAtlas>) {
    if !scene.hud.visible {
        return;
    }

    let pulse = (macroquad::time::get_time() * 5.0).sin() as f32;
    let blue = macroquad::color::Color::new(0.0, (196.0 + pulse * 59.0) / 255.0, 1.0, 1.0);

    draw_text(
        &format!("S: {:03}    L: {}", scene.hud.score, scene.hud.level),
        20.0,
        30.0,
        24.0,
        blue,
    );

    // Banked lives as miniature craft along the top-right edge.
    let miniature = Vec2::new(30.0, 15.0);
    for index in 0..scene.hud.lives {
        let x = scene.play_field.width() - 20.0 - (index + 1) as f32 * (miniature.x + 8.0);
        let position = Vec2::new(x, 20.0);
        draw_sprite_or(
            atlas,
            SpriteKey::Viper,
            DrawParams::new(position, miniature),
            || {
                draw_triangle(
                    MacroquadVec2::new(position.x, position.y + miniature.y),
                    MacroquadVec2::new(position.x + miniature.x, position.y + miniature.y / 2.0),
                    MacroquadVec2::new(position.x, position.y),
                    macroquad::color::Color::new(0.8, 0.8, 0.9, 1.0),
                );
            },
        );
    }

    if scene.hud.shield_fraction > 0.0 {
        let meter_width = 200.0;
        let meter_height = 25.0;
        let meter_x = scene.play_field.width() / 2.0 - meter_width / 2.0;
        draw_rectangle(
            meter_x,
            10.0,
            meter_width,
            meter_height,
            macroquad::color::Color::new(0.0, 0.0, 0.0, 0.5),
        );
        draw_rectangle(
            meter_x,
            10.0,
            meter_width * scene.hud.shield_fraction,
            meter_height,
            blue,
        );
        draw_centered_text(
            "SHIELD",
            scene.play_field.width() / 2.0,
            30.0,
            24.0,
            macroquad::color::WHITE,
        );
    }
}

fn draw_overlay(scene: &Scene, atlas: Option<&SpriteAtlas>, fade: f32) {
    let center_x = scene.play_field.width() / 2.0;
    let center_y = scene.play_field.height() / 2.0;

    match scene.overlay {
        OverlayPresentation::None => {}
        OverlayPresentation::StartScreen {
            splash_alpha,
            title_pulse,
            emblem_angle,
        } => {
            let emblem_size = scene.play_field.width() / 3.0;
            let corner = Vec2::new(center_x - emblem_size / 2.0, center_y - emblem_size / 2.0);
            draw_sprite_or(
                atlas,
                SpriteKey::Vortex,
                DrawParams::new(corner, Vec2::splat(emblem_size)).with_rotation(emblem_angle * 3.0),
                || {},
            );
            draw_sprite_or(
                atlas,
                SpriteKey::Stargate,
                DrawParams::new(corner, Vec2::splat(emblem_size)).with_rotation(emblem_angle),
                || {
                    draw_circle(
                        center_x,
                        center_y,
                        emblem_size / 2.0,
                        macroquad::color::Color::new(0.0, 0.5, 1.0, 0.4),
                    );
                },
            );
            draw_circle(
                center_x,
                center_y,
                emblem_size / 2.0,
                macroquad::color::Color::new(0.0, 1.0, 1.0, 0.12),
            );

            let craft_size = Vec2::new(emblem_size * 1.25, emblem_size * 0.625);
            draw_sprite_or(
                atlas,
                SpriteKey::Viper,
                DrawParams::new(
                    Vec2::new(center_x - craft_size.x / 2.0, center_y - craft_size.y / 2.0),
                    craft_size,
                ),
                || {},
            );

            let title_scale = 1.0 + title_pulse.sin() * 0.05;
            let title_size = Vec2::new(
                scene.play_field.width() * 0.4 * title_scale,
                scene.play_field.width() * 0.1 * title_scale,
            );
            draw_sprite_or(
                atlas,
                SpriteKey::Title,
                DrawParams::new(
                    Vec2::new(center_x - title_size.x / 2.0, center_y - 200.0 - title_size.y / 2.0),
                    title_size,
                ),
                || {
                    draw_centered_text(
                        "VIPER PATROL",
                        center_x,
                        center_y - 200.0,
                        64.0,
                        macroquad::color::WHITE,
                    );
                },
            );

            draw_centered_text(
                "PRESS SPACE TO START",
                center_x,
                center_y + 250.0,
                24.0,
                macroquad::color::Color::new(1.0, 1.0, 1.0, splash_alpha * fade),
            );
        }
        OverlayPresentation::GetReady { banner_alpha } => {
            let banner_size = Vec2::new(
                scene.play_field.width() * 0.3,
                scene.play_field.width() * 0.075,
            );
            let tint = Color::new(1.0, 1.0, 1.0, banner_alpha * fade);
            draw_sprite_or(
                atlas,
                SpriteKey::GetReadyBanner,
                DrawParams::new(
                    Vec2::new(center_x - banner_size.x / 2.0, center_y - banner_size.y / 2.0),
                    banner_size,
                )
                .with_tint(tint),
                || {
                    draw_centered_text(
                        "GET READY",
                        center_x,
                        center_y,
                        48.0,
                        macroquad::color::Color::new(1.0, 1.0, 1.0, banner_alpha * fade),
                    );
                },
            );
        }
        OverlayPresentation::GameOver { prompt_alpha } => {
            let pulse = 1.0 + ((macroquad::time::get_time() * 5.0).sin() as f32) * 0.1;
            let banner_size = Vec2::new(
                scene.play_field.width() * 0.4 * pulse,
                scene.play_field.width() * 0.1 * pulse,
            );
            draw_sprite_or(
                atlas,
                SpriteKey::GameOverBanner,
                DrawParams::new(
                    Vec2::new(center_x - banner_size.x / 2.0, center_y - banner_size.y / 2.0),
                    banner_size,
                ),
                || {
                    draw_centered_text(
                        "GAME OVER",
                        center_x,
                        center_y,
                        64.0,
                        macroquad::color::WHITE,
                    );
                },
            );
            draw_centered_text(
                "Press R to Restart",
                center_x,
                scene.play_field.height() - 100.0,
                24.0,
                macroquad::color::Color::new(1.0, 1.0, 1.0, prompt_alpha * fade),
            );
        }
    }
}

fn draw_centered_text(text: &str, x: f32, y: f32, font_size: f32, color: macroquad::color::Color) {
    let dimensions = measure_text(text, None, font_size as u16, 1.0);
    draw_text(text, x - dimensions.width / 2.0, y, font_size, color);
}
