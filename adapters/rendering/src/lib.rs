#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering and audio contracts for Viper Patrol adapters.
//!
//! The simulation is presented through a declarative [`Scene`] rebuilt every
//! frame from world queries; backends only draw what the scene describes and
//! never reach back into the world. Audio is driven the same way: the event
//! stream is translated into [`AudioCue`] values handed to an [`AudioSink`].

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::{error::Error, fmt, time::Duration};
use viper_patrol_core::{
    EnemyKind, Event, Facing, GameState, InputSnapshot, PlayField, PowerUpKind, ShotSource,
};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the color with its alpha scaled by the provided factor.
    #[must_use]
    pub fn faded(self, factor: f32) -> Self {
        Self {
            alpha: self.alpha * factor.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Logical game input forwarded to the simulation.
    pub input: InputSnapshot,
    /// Whether the adapter detected a quit request this frame.
    pub quit_requested: bool,
    /// Whether the adapter detected a mute toggle this frame.
    pub toggle_mute: bool,
}

/// Keys identifying the sprites adapters may draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    /// The player's craft.
    Viper,
    /// Drone enemy.
    Drone,
    /// Killer enemy.
    Killer,
    /// Spike enemy.
    Spike,
    /// Striker enemy.
    Striker,
    /// Shield power-up drop.
    Shield,
    /// Free-life power-up drop.
    FreeLife,
    /// Stargate ring.
    Stargate,
    /// Stargate vortex.
    Vortex,
    /// Title banner on the start screen.
    Title,
    /// Get-Ready banner.
    GetReadyBanner,
    /// Level-Up banner.
    LevelUpBanner,
    /// Game-Over banner.
    GameOverBanner,
}

impl SpriteKey {
    /// Every sprite key, in manifest order.
    pub const ALL: [Self; 13] = [
        Self::Viper,
        Self::Drone,
        Self::Killer,
        Self::Spike,
        Self::Striker,
        Self::Shield,
        Self::FreeLife,
        Self::Stargate,
        Self::Vortex,
        Self::Title,
        Self::GetReadyBanner,
        Self::LevelUpBanner,
        Self::GameOverBanner,
    ];

    /// Name identifying the sprite in the asset manifest.
    #[must_use]
    pub const fn manifest_name(self) -> &'static str {
        match self {
            Self::Viper => "viper",
            Self::Drone => "drone",
            Self::Killer => "killer",
            Self::Spike => "spike",
            Self::Striker => "striker",
            Self::Shield => "shield",
            Self::FreeLife => "free_life",
            Self::Stargate => "stargate",
            Self::Vortex => "vortex",
            Self::Title => "title",
            Self::GetReadyBanner => "get_ready",
            Self::LevelUpBanner => "level_up",
            Self::GameOverBanner => "game_over",
        }
    }

    /// Sprite drawn for the provided enemy variant.
    #[must_use]
    pub const fn for_enemy(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Drone => Self::Drone,
            EnemyKind::Killer => Self::Killer,
            EnemyKind::Spike => Self::Spike,
            EnemyKind::Striker => Self::Striker,
        }
    }

    /// Sprite drawn for the provided power-up variant.
    #[must_use]
    pub const fn for_power_up(kind: PowerUpKind) -> Self {
        match kind {
            PowerUpKind::Shield => Self::Shield,
            PowerUpKind::FreeLife => Self::FreeLife,
            PowerUpKind::Stargate => Self::Stargate,
        }
    }
}

/// Audio trigger points derived from the event stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioCue {
    /// Switch the background track to the start-screen music.
    StartMusic,
    /// Switch the background track to the gameplay music.
    GameplayMusic,
    /// Switch the background track to the game-over music.
    GameOverMusic,
    /// One player cannon shot.
    PlayerShot,
    /// One enemy cannon shot.
    EnemyShot,
    /// One explosion, player or enemy.
    Explosion,
    /// One power-up collection chime.
    PowerUpChime,
}

/// Sink for audio cues; playback backends live outside the core.
pub trait AudioSink {
    /// Plays the provided cue. Background-music cues replace the current
    /// track; effect cues layer on top of it.
    fn play(&mut self, cue: AudioCue);

    /// Stops every playing sound including the background track.
    fn stop_all(&mut self);

    /// Toggles whether subsequent cues are audible.
    fn set_muted(&mut self, muted: bool);
}

/// Audio sink that swallows every cue.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn play(&mut self, _cue: AudioCue) {}

    fn stop_all(&mut self) {}

    fn set_muted(&mut self, _muted: bool) {}
}

/// Translates a frame's event batch into the audio cues it implies.
#[must_use]
pub fn audio_cues_for_events(events: &[Event]) -> Vec<AudioCue> {
    let mut cues = Vec::new();
    for event in events {
        match event {
            Event::StateChanged { from, to } => match (from, to) {
                (_, GameState::Start) => cues.push(AudioCue::StartMusic),
                (GameState::Start, GameState::GetReady) => cues.push(AudioCue::GameplayMusic),
                (_, GameState::GameOver) => cues.push(AudioCue::GameOverMusic),
                _ => {}
            },
            Event::ShotFired { source } => cues.push(match source {
                ShotSource::Player => AudioCue::PlayerShot,
                ShotSource::Enemy { .. } => AudioCue::EnemyShot,
            }),
            Event::PlayerDied { .. } => cues.push(AudioCue::Explosion),
            Event::EnemyDestroyed { points, .. } => {
                if *points > 0 {
                    cues.push(AudioCue::Explosion);
                }
            }
            Event::PowerUpCollected { .. } => cues.push(AudioCue::PowerUpChime),
            _ => {}
        }
    }
    cues
}

/// One unit-width slice of the terrain profile in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainSpanPresentation {
    /// Screen-space x coordinate of the span's left edge.
    pub screen_x: f32,
    /// Ground height measured up from the bottom edge.
    pub height: f32,
}

/// Styling of a projectile bolt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShotStyle {
    /// The player's cyan plasma bolt with a long trail.
    CyanBolt,
    /// Plain yellow enemy shot.
    YellowBolt,
    /// Fast green plasma fired by strikers.
    GreenPlasma,
}

/// A projectile with its fading trail.
#[derive(Clone, Debug, PartialEq)]
pub struct ShotPresentation {
    /// Leading point of the bolt.
    pub position: Vec2,
    /// Travel direction of the bolt.
    pub facing: Facing,
    /// Past positions, oldest first.
    pub trail: Vec<Vec2>,
    /// Styling of the bolt.
    pub style: ShotStyle,
}

/// The player's craft as presented to backends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerPresentation {
    /// Top-left corner of the craft.
    pub position: Vec2,
    /// Drawn size of the craft sprite.
    pub size: Vec2,
    /// Current heading of the craft.
    pub facing: Facing,
    /// Cosmetic thrust intensity in [0, 1].
    pub thrust: f32,
    /// Craft opacity in [0, 1].
    pub fade: f32,
    /// Whether the shield aura is drawn.
    pub shield_active: bool,
    /// Whether the craft itself is drawn (false while exploding).
    pub visible: bool,
    /// Whether the respawn grace is active; backends blink the craft.
    pub respawn_grace: bool,
}

/// A single enemy craft as presented to backends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyPresentation {
    /// Variant of the craft.
    pub kind: EnemyKind,
    /// Top-left corner of the craft.
    pub position: Vec2,
    /// Size of the craft sprite.
    pub size: Vec2,
    /// Travel direction of the craft.
    pub facing: Facing,
    /// Cosmetic spin angle for spinning variants.
    pub spin: f32,
}

/// A power-up drop as presented to backends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PowerUpPresentation {
    /// Variant of the drop.
    pub kind: PowerUpKind,
    /// Top-left corner of the drop.
    pub position: Vec2,
    /// Side length of the square drop sprite.
    pub size: f32,
    /// Ring rotation for spinning drops.
    pub rotation: f32,
    /// Vortex rotation for spinning drops.
    pub vortex_rotation: f32,
}

/// A small expanding blast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlastPresentation {
    /// Centre of the blast.
    pub center: Vec2,
    /// Current blast radius.
    pub radius: f32,
    /// Current blast opacity.
    pub opacity: f32,
}

/// The player's explosion animation.
#[derive(Clone, Debug, PartialEq)]
pub struct ExplosionPresentation {
    /// Centre of the main blast.
    pub center: Vec2,
    /// Current blast radius.
    pub radius: f32,
    /// Current blast opacity.
    pub opacity: f32,
    /// Whether this is the dramatic final-life variant.
    pub is_final: bool,
    /// Secondary bursts whose stagger delay has elapsed.
    pub bursts: Vec<BlastPresentation>,
}

/// The open stargate vortex and its banner beat.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StargateEffectPresentation {
    /// Centre of the vortex.
    pub center: Vec2,
    /// Sprite size carried over from the collected stargate.
    pub size: f32,
    /// Current halo radius.
    pub radius: f32,
    /// Current vortex opacity.
    pub opacity: f32,
    /// Ring rotation angle.
    pub rotation: f32,
    /// Vortex rotation angle.
    pub vortex_rotation: f32,
    /// Whether the level-up banner is shown.
    pub banner_visible: bool,
    /// Seconds since the vortex opened, drives the banner pulse.
    pub pulse: f32,
}

/// Session readouts drawn along the top of the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HudPresentation {
    /// Accumulated score.
    pub score: u32,
    /// Lives remaining, drawn as miniature craft.
    pub lives: u32,
    /// Level currently playing.
    pub level: u32,
    /// Remaining shield time as a fraction of the full duration.
    pub shield_fraction: f32,
    /// Whether the dashboard is drawn at all.
    pub visible: bool,
}

/// State-specific overlay drawn above the play field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OverlayPresentation {
    /// No overlay this frame.
    None,
    /// Splash screen with emblem, title and the press-start prompt.
    StartScreen {
        /// Opacity of the press-start prompt.
        splash_alpha: f32,
        /// Phase angle of the title pulse.
        title_pulse: f32,
        /// Rotation of the stargate emblem.
        emblem_angle: f32,
    },
    /// Flashing Get-Ready banner.
    GetReady {
        /// Opacity of the banner.
        banner_alpha: f32,
    },
    /// Game-over banner with the flashing restart prompt.
    GameOver {
        /// Opacity of the restart prompt.
        prompt_alpha: f32,
    },
}

/// Cross-fade between the previous and current state's frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionPresentation {
    /// State being faded out underneath.
    pub from: GameState,
    /// Fade progress in [0, 1].
    pub progress: f32,
}

/// Scene description consumed by rendering backends, rebuilt every frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Dimensions of the play field.
    pub play_field: PlayField,
    /// State the session is presenting.
    pub state: GameState,
    /// Screen-space terrain profile.
    pub terrain: Vec<TerrainSpanPresentation>,
    /// The player's craft, absent on the start screen.
    pub player: Option<PlayerPresentation>,
    /// Live enemy craft.
    pub enemies: Vec<EnemyPresentation>,
    /// Live player shots.
    pub player_shots: Vec<ShotPresentation>,
    /// Live enemy shots.
    pub enemy_shots: Vec<ShotPresentation>,
    /// Live power-up drops.
    pub power_ups: Vec<PowerUpPresentation>,
    /// Small blasts from destroyed craft.
    pub blasts: Vec<BlastPresentation>,
    /// The player's explosion animation, while dead.
    pub explosion: Option<ExplosionPresentation>,
    /// The open stargate vortex, during the level-up cinematic.
    pub stargate_effect: Option<StargateEffectPresentation>,
    /// Dashboard readouts.
    pub hud: HudPresentation,
    /// State-specific overlay.
    pub overlay: OverlayPresentation,
    /// Cross-fade against the previous state, when one is running.
    pub transition: Option<TransitionPresentation>,
}

impl Scene {
    /// Creates an empty scene for the provided play field.
    ///
    /// Returns an error when the field has a non-positive or non-finite
    /// dimension.
    pub fn empty(play_field: PlayField) -> Result<Self, SceneError> {
        let width = play_field.width();
        let height = play_field.height();
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(SceneError::InvalidPlayField { width, height });
        }

        Ok(Self {
            play_field,
            state: GameState::Start,
            terrain: Vec::new(),
            player: None,
            enemies: Vec::new(),
            player_shots: Vec::new(),
            enemy_shots: Vec::new(),
            power_ups: Vec::new(),
            blasts: Vec::new(),
            explosion: None,
            stargate_effect: None,
            hud: HudPresentation {
                score: 0,
                lives: 0,
                level: 1,
                shield_fraction: 0.0,
                visible: false,
            },
            overlay: OverlayPresentation::None,
            transition: None,
        })
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Viper Patrol scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and rebuilds the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum SceneError {
    /// Play-field dimensions must be positive and finite.
    InvalidPlayField {
        /// Width that failed validation.
        width: f32,
        /// Height that failed validation.
        height: f32,
    },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPlayField { width, height } => {
                write!(
                    f,
                    "play field dimensions must be positive and finite (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for SceneError {}

#[cfg(test)]
mod tests {
    use super::{
        audio_cues_for_events, AudioCue, Color, Scene, SceneError, SpriteKey,
    };
    use std::time::Duration;
    use viper_patrol_core::{
        EnemyFate, EnemyId, EnemyKind, Event, GameState, PlayField, ShotSource,
    };

    #[test]
    fn scene_accepts_a_positive_play_field() {
        let scene = Scene::empty(PlayField::new(1280.0, 720.0)).expect("valid field");
        assert_eq!(scene.state, GameState::Start);
        assert!(scene.terrain.is_empty());
        assert!(scene.player.is_none());
    }

    #[test]
    fn scene_rejects_degenerate_play_fields_without_panicking() {
        let error = Scene::empty(PlayField::new(0.0, 720.0)).expect_err("zero width");
        assert!(matches!(error, SceneError::InvalidPlayField { .. }));
        assert!(Scene::empty(PlayField::new(f32::NAN, 720.0)).is_err());
        assert!(Scene::empty(PlayField::new(1280.0, -1.0)).is_err());
    }

    #[test]
    fn state_entries_switch_the_background_track() {
        let cues = audio_cues_for_events(&[
            Event::StateChanged {
                from: GameState::Start,
                to: GameState::GetReady,
            },
            Event::StateChanged {
                from: GameState::Playing,
                to: GameState::GameOver,
            },
            Event::StateChanged {
                from: GameState::GameOver,
                to: GameState::Start,
            },
        ]);
        assert_eq!(
            cues,
            vec![
                AudioCue::GameplayMusic,
                AudioCue::GameOverMusic,
                AudioCue::StartMusic,
            ]
        );
    }

    #[test]
    fn level_transitions_keep_the_gameplay_track() {
        let cues = audio_cues_for_events(&[
            Event::StateChanged {
                from: GameState::Playing,
                to: GameState::LevelUp,
            },
            Event::StateChanged {
                from: GameState::LevelUp,
                to: GameState::GetReady,
            },
        ]);
        assert!(cues.is_empty());
    }

    #[test]
    fn combat_events_map_to_effect_cues() {
        let cues = audio_cues_for_events(&[
            Event::ShotFired {
                source: ShotSource::Player,
            },
            Event::ShotFired {
                source: ShotSource::Enemy {
                    kind: EnemyKind::Striker,
                },
            },
            Event::PlayerDied { final_life: false },
            Event::EnemyDestroyed {
                enemy: EnemyId::new(1),
                kind: EnemyKind::Drone,
                fate: EnemyFate::ShotDown,
                points: 100,
            },
            Event::EnemyDestroyed {
                enemy: EnemyId::new(2),
                kind: EnemyKind::Drone,
                fate: EnemyFate::LeftField,
                points: 0,
            },
            Event::TimeAdvanced {
                dt: Duration::from_millis(16),
            },
        ]);
        assert_eq!(
            cues,
            vec![
                AudioCue::PlayerShot,
                AudioCue::EnemyShot,
                AudioCue::Explosion,
                AudioCue::Explosion,
            ]
        );
    }

    #[test]
    fn every_sprite_key_has_a_unique_manifest_name() {
        let mut names = std::collections::HashSet::new();
        for key in SpriteKey::ALL {
            assert!(names.insert(key.manifest_name()));
        }
    }

    #[test]
    fn faded_scales_only_the_alpha() {
        let color = Color::from_rgb_u8(0, 196, 255).faded(0.5);
        assert_eq!(color.alpha, 0.5);
        assert_eq!(color.blue, 1.0);
    }

    #[test]
    fn lighten_moves_channels_towards_white() {
        let color = Color::from_rgb_u8(0, 0, 0).lighten(0.5);
        assert_eq!(color.red, 0.5);
        assert_eq!(color.alpha, 1.0);
    }
}
