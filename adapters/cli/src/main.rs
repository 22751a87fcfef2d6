#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Viper Patrol experience.
//!
//! The binary is the composition root: it wires the authoritative world,
//! the pure spawning systems, the audio cue sink and the macroquad backend
//! into one frame loop. Each frame the previous tick's events feed the
//! systems, their commands are applied, the world ticks with the polled
//! input, and the scene is rebuilt from queries.

mod scene;

use anyhow::Result;
use clap::Parser;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

use viper_patrol_core::{Command, Event, GAME_TITLE};
use viper_patrol_rendering::{
    audio_cues_for_events, AudioCue, AudioSink, Color, NullAudioSink, Presentation,
    RenderingBackend, Scene,
};
use viper_patrol_rendering_macroquad::MacroquadBackend;
use viper_patrol_system_power_drops::{
    Config as PowerDropsConfig, PowerDrops, BASE_DROP_INTERVAL, STARGATE_THRESHOLD,
};
use viper_patrol_system_spawning::{Config as SpawningConfig, Spawning, BASE_SPAWN_INTERVAL};
use viper_patrol_world::{self as world, query, World};

const CLEAR_COLOR: Color = Color::from_rgb_u8(0x05, 0x06, 0x12);

/// Command-line options for the Viper Patrol session.
#[derive(Debug, Parser)]
#[command(name = "viper-patrol", about = "Defender-style arcade shooter")]
struct Args {
    /// Window and play-field width in pixels.
    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    /// Window and play-field height in pixels.
    #[arg(long, default_value_t = 720.0)]
    height: f32,

    /// Seed for terrain and spawn randomness; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Disable sprite loading and render flat placeholder shapes.
    #[arg(long)]
    no_sprites: bool,

    /// Start with audio muted.
    #[arg(long)]
    muted: bool,

    /// Request a specific swap interval from the platform.
    #[arg(long)]
    swap_interval: Option<i32>,

    /// Show a frames-per-second readout.
    #[arg(long)]
    show_fps: bool,
}

/// Entry point for the Viper Patrol command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();

    // One master seed fans out into independent streams so the terrain,
    // enemy cadence and drop cadence stay decorrelated but reproducible.
    let master_seed = args.seed.unwrap_or_else(|| rand::thread_rng().next_u64());
    let mut seed_stream = ChaCha8Rng::seed_from_u64(master_seed);
    let world_seed = seed_stream.next_u64();
    let spawn_seed = seed_stream.next_u64();
    let drop_seed = seed_stream.next_u64();

    let mut world = World::new();
    let mut pending_events: Vec<Event> = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigurePlayField {
            width: args.width,
            height: args.height,
            seed: world_seed,
        },
        &mut pending_events,
    );

    let mut spawning = Spawning::new(SpawningConfig::new(BASE_SPAWN_INTERVAL, spawn_seed));
    let mut power_drops = PowerDrops::new(PowerDropsConfig::new(
        BASE_DROP_INTERVAL,
        STARGATE_THRESHOLD,
        drop_seed,
    ));

    let mut audio = NullAudioSink;
    let mut muted = args.muted;
    audio.set_muted(muted);
    audio.play(AudioCue::StartMusic);

    let mut initial_scene = Scene::empty(query::play_field(&world))?;
    scene::refresh(&world, &mut initial_scene);
    let presentation = Presentation::new(GAME_TITLE, CLEAR_COLOR, initial_scene);

    let mut backend = MacroquadBackend::default();
    if let Some(swap_interval) = args.swap_interval {
        backend = backend.with_swap_interval(swap_interval);
    }
    if args.show_fps {
        backend = backend.with_fps_overlay();
    }
    if args.no_sprites {
        backend = backend.without_sprites();
    }

    backend.run(presentation, move |dt: Duration, frame_input, scene| {
        let state = query::game_state(&world);
        let level = query::level(&world);

        let mut commands = Vec::new();
        spawning.handle(&pending_events, state, level, &mut commands);
        power_drops.handle(
            &pending_events,
            state,
            level,
            query::stargate_open(&world),
            &mut commands,
        );

        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        world::apply(
            &mut world,
            Command::Tick {
                dt,
                input: frame_input.input,
            },
            &mut events,
        );

        if frame_input.toggle_mute {
            muted = !muted;
            audio.set_muted(muted);
        }
        for cue in audio_cues_for_events(&events) {
            audio.play(cue);
        }

        scene::refresh(&world, scene);
        pending_events = events;
    })
}
