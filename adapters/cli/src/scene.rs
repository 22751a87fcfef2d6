//! Composes the declarative scene presented each frame from world queries.
//!
//! This is the render-dispatch half of the state machine: the active state
//! decides which layers are present, mirroring the update dispatch inside
//! the world. The starfield background is always drawn by the backend; a
//! state only contributes the layers it owns.

use glam::Vec2;
use viper_patrol_core::{GameState, Position, PLAYER_FOOTPRINT};
use viper_patrol_rendering::{
    BlastPresentation, EnemyPresentation, ExplosionPresentation, HudPresentation,
    OverlayPresentation, PlayerPresentation, PowerUpPresentation, Scene, ShotPresentation,
    ShotStyle, StargateEffectPresentation, TerrainSpanPresentation, TransitionPresentation,
};
use viper_patrol_world::{query, World};

fn vec2(position: Position) -> Vec2 {
    Vec2::new(position.x(), position.y())
}

/// Rebuilds the scene from the world's current state.
pub(crate) fn refresh(world: &World, scene: &mut Scene) {
    let state = query::game_state(world);
    scene.play_field = query::play_field(world);
    scene.state = state;

    scene.transition = match (
        query::transition_progress(world),
        query::previous_state(world),
    ) {
        (Some(progress), Some(from)) => Some(TransitionPresentation { from, progress }),
        _ => None,
    };

    scene.terrain = if state == GameState::Start {
        Vec::new()
    } else {
        terrain_spans(world)
    };

    scene.player = match state {
        GameState::Start | GameState::GameOver => None,
        GameState::GetReady | GameState::Playing | GameState::LevelUp => {
            Some(player_presentation(world))
        }
    };

    let combat = state == GameState::Playing;
    scene.enemies = if combat { enemy_layer(world) } else { Vec::new() };
    scene.player_shots = if combat {
        player_shot_layer(world)
    } else {
        Vec::new()
    };
    scene.enemy_shots = if combat {
        enemy_shot_layer(world)
    } else {
        Vec::new()
    };
    scene.power_ups = if combat {
        power_up_layer(world)
    } else {
        Vec::new()
    };
    scene.blasts = if combat { blast_layer(world) } else { Vec::new() };
    scene.explosion = if combat { explosion_layer(world) } else { None };

    scene.stargate_effect = if state == GameState::LevelUp {
        query::stargate_effect(world).map(|effect| StargateEffectPresentation {
            center: vec2(effect.center),
            size: effect.size,
            radius: effect.radius,
            opacity: effect.opacity,
            rotation: effect.rotation,
            vortex_rotation: effect.vortex_rotation,
            banner_visible: effect.banner_visible,
            pulse: effect.pulse,
        })
    } else {
        None
    };

    scene.hud = HudPresentation {
        score: query::score(world),
        lives: query::lives(world),
        level: query::level(world),
        shield_fraction: query::shield_fraction(world),
        visible: combat,
    };

    scene.overlay = match state {
        GameState::Start => OverlayPresentation::StartScreen {
            splash_alpha: query::splash_alpha(world),
            title_pulse: query::title_pulse(world),
            emblem_angle: query::emblem_angle(world),
        },
        GameState::GetReady => OverlayPresentation::GetReady {
            banner_alpha: query::get_ready_alpha(world),
        },
        GameState::GameOver => OverlayPresentation::GameOver {
            prompt_alpha: query::restart_prompt_alpha(world),
        },
        GameState::Playing | GameState::LevelUp => OverlayPresentation::None,
    };
}

fn terrain_spans(world: &World) -> Vec<TerrainSpanPresentation> {
    query::terrain_profile(world)
        .into_iter()
        .map(|span| TerrainSpanPresentation {
            screen_x: span.screen_x,
            height: span.height,
        })
        .collect()
}

fn player_presentation(world: &World) -> PlayerPresentation {
    let player = query::player(world);
    PlayerPresentation {
        position: vec2(player.position),
        size: Vec2::new(PLAYER_FOOTPRINT.0, PLAYER_FOOTPRINT.1),
        facing: player.facing,
        thrust: player.thrust,
        fade: player.fade,
        shield_active: player.shield_active,
        visible: !player.is_dead,
        respawn_grace: player.is_respawned,
    }
}

fn player_shot_layer(world: &World) -> Vec<ShotPresentation> {
    query::player(world)
        .shots
        .into_iter()
        .map(|shot| ShotPresentation {
            position: vec2(shot.position),
            facing: shot.facing,
            trail: shot.trail.into_iter().map(vec2).collect(),
            style: ShotStyle::CyanBolt,
        })
        .collect()
}

fn enemy_shot_layer(world: &World) -> Vec<ShotPresentation> {
    query::enemy_shots(world)
        .into_iter()
        .map(|shot| ShotPresentation {
            position: vec2(shot.position),
            facing: shot.facing,
            trail: shot.trail.into_iter().map(vec2).collect(),
            style: if shot.plasma {
                ShotStyle::GreenPlasma
            } else {
                ShotStyle::YellowBolt
            },
        })
        .collect()
}

fn enemy_layer(world: &World) -> Vec<EnemyPresentation> {
    query::enemy_view(world)
        .into_vec()
        .into_iter()
        .map(|enemy| EnemyPresentation {
            kind: enemy.kind,
            position: Vec2::new(enemy.bounds.x(), enemy.bounds.y()),
            size: Vec2::new(enemy.bounds.width(), enemy.bounds.height()),
            facing: enemy.facing,
            spin: enemy.spin,
        })
        .collect()
}

fn power_up_layer(world: &World) -> Vec<PowerUpPresentation> {
    query::power_up_view(world)
        .into_vec()
        .into_iter()
        .map(|drop| PowerUpPresentation {
            kind: drop.kind,
            position: vec2(drop.position),
            size: drop.size,
            rotation: drop.rotation,
            vortex_rotation: drop.vortex_rotation,
        })
        .collect()
}

fn blast_layer(world: &World) -> Vec<BlastPresentation> {
    query::blasts(world)
        .into_iter()
        .map(|blast| BlastPresentation {
            center: vec2(blast.center),
            radius: blast.radius,
            opacity: blast.opacity,
        })
        .collect()
}

fn explosion_layer(world: &World) -> Option<ExplosionPresentation> {
    query::player(world).explosion.map(|explosion| {
        ExplosionPresentation {
            center: vec2(explosion.center),
            radius: explosion.radius,
            opacity: explosion.opacity,
            is_final: explosion.is_final,
            bursts: explosion
                .bursts
                .into_iter()
                .filter(|burst| burst.started)
                .map(|burst| BlastPresentation {
                    center: vec2(burst.center),
                    radius: burst.radius,
                    opacity: burst.opacity,
                })
                .collect(),
        }
    })
}
