#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Viper Patrol engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! adapters to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical title presented by adapters when the experience boots.
pub const GAME_TITLE: &str = "Viper Patrol";

/// Number of lives a fresh session starts with.
pub const STARTING_LIVES: u32 = 3;

/// Hard cap on banked lives; free-life pickups beyond this are no-ops.
pub const MAX_LIVES: u32 = 5;

/// Collision footprint of the player's craft in field units.
pub const PLAYER_FOOTPRINT: (f32, f32) = (64.0, 32.0);

/// Describes the active phase of the session state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// Splash screen awaiting the start input.
    Start,
    /// Banner flash sequence gating entry into active play.
    GetReady,
    /// Active gameplay with full entity simulation.
    Playing,
    /// Stargate cinematic between levels.
    LevelUp,
    /// Terminal screen awaiting the restart input.
    GameOver,
}

/// Horizontal heading shared by the player, enemies and projectiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Movement toward decreasing x coordinates.
    Left,
    /// Movement toward increasing x coordinates.
    Right,
}

impl Facing {
    /// Signed unit factor applied to horizontal velocities.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// Returns the opposite heading.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Unique identifier assigned to an enemy by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a power-up drop by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PowerUpId(u32);

impl PowerUpId {
    /// Creates a new power-up identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Hostile craft variants fielded against the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Spinning mine that homes tightly on the player's altitude.
    Drone,
    /// Armed fighter that tracks a drifting offset from the player.
    Killer,
    /// Fast spinning hazard with drone-style pursuit.
    Spike,
    /// Heavy fighter with faster plasma fire and cruise speed.
    Striker,
}

impl EnemyKind {
    /// Every enemy variant in spawn-table order.
    pub const ALL: [Self; 4] = [Self::Drone, Self::Killer, Self::Spike, Self::Striker];

    /// Score awarded when the craft is destroyed.
    #[must_use]
    pub const fn points(self) -> u32 {
        match self {
            Self::Drone => 100,
            Self::Killer => 200,
            Self::Spike => 250,
            Self::Striker => 300,
        }
    }

    /// Horizontal cruise speed in field units per second.
    #[must_use]
    pub const fn cruise_speed(self) -> f32 {
        match self {
            Self::Drone => 150.0,
            Self::Killer => 200.0,
            Self::Spike => 225.0,
            Self::Striker => 300.0,
        }
    }

    /// Vertical acceleration applied while pursuing the player.
    #[must_use]
    pub const fn vertical_acceleration(self) -> f32 {
        match self {
            Self::Drone | Self::Spike => 300.0,
            Self::Killer | Self::Striker => 400.0,
        }
    }

    /// Ceiling on the vertical pursuit speed.
    #[must_use]
    pub const fn max_vertical_speed(self) -> f32 {
        match self {
            Self::Drone | Self::Spike => 200.0,
            Self::Killer | Self::Striker => 300.0,
        }
    }

    /// Whether the craft carries a cannon.
    #[must_use]
    pub const fn fires(self) -> bool {
        matches!(self, Self::Killer | Self::Striker)
    }

    /// Muzzle speed of the craft's shots, when armed.
    #[must_use]
    pub const fn shot_speed(self) -> f32 {
        match self {
            Self::Striker => 500.0,
            Self::Drone | Self::Killer | Self::Spike => 300.0,
        }
    }

    /// Whether the sprite spins instead of banking toward its heading.
    #[must_use]
    pub const fn spins(self) -> bool {
        matches!(self, Self::Drone | Self::Spike)
    }

    /// Cosmetic spin rate in radians per second for spinning variants.
    #[must_use]
    pub const fn spin_rate(self) -> f32 {
        match self {
            Self::Spike => 16.0,
            Self::Drone => 2.0,
            Self::Killer | Self::Striker => 0.0,
        }
    }

    /// Collision footprint of the craft in field units.
    #[must_use]
    pub const fn footprint(self) -> (f32, f32) {
        match self {
            Self::Drone => (48.0, 24.0),
            Self::Killer => (44.0, 22.0),
            Self::Spike => (40.0, 40.0),
            Self::Striker => (60.0, 30.0),
        }
    }
}

/// Collectible drop variants released into the play field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Grants temporary invulnerability on pickup.
    Shield,
    /// Banks one extra life, capped at [`MAX_LIVES`].
    FreeLife,
    /// Opens the level-transition vortex instead of a stat change.
    Stargate,
}

impl PowerUpKind {
    /// Horizontal drift speed of the drop in field units per second.
    #[must_use]
    pub const fn drift_speed(self) -> f32 {
        match self {
            Self::Shield | Self::FreeLife => 150.0,
            Self::Stargate => 100.0,
        }
    }

    /// Whether the drop's sprite rotates while drifting.
    #[must_use]
    pub const fn spins(self) -> bool {
        matches!(self, Self::Stargate)
    }
}

/// Origin of a fired projectile, used for audio and presentation cues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShotSource {
    /// Fired by the player's cannon.
    Player,
    /// Fired by an enemy craft of the given kind.
    Enemy {
        /// Variant of the craft that fired.
        kind: EnemyKind,
    },
}

/// How an enemy left the play field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyFate {
    /// Destroyed by a player shot; awards points.
    ShotDown,
    /// Collided with the player; awards points and costs a life.
    RammedPlayer,
    /// Flew into the terrain; awards points.
    TerrainImpact,
    /// Crossed far off-screen horizontally; no score.
    LeftField,
}

impl EnemyFate {
    /// Whether the fate awards the craft's point value.
    #[must_use]
    pub const fn scores(self) -> bool {
        !matches!(self, Self::LeftField)
    }
}

/// Position within the play field expressed in field units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new position from explicit coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate in field units.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate in field units.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Returns the position translated by the provided deltas.
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned rectangle used for broad-phase collision checks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Bounds {
    /// Constructs a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Horizontal coordinate of the left edge.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate of the top edge.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Width of the rectangle.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the rectangle.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Vertical coordinate of the bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Vertical coordinate of the right edge.
    #[must_use]
    pub const fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Centre point of the rectangle.
    #[must_use]
    pub const fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Reports whether two rectangles overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Dimensions of the play field in field units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayField {
    width: f32,
    height: f32,
}

impl PlayField {
    /// Creates a new play field description.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Horizontal extent of the field.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent of the field.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Length of the field's diagonal, used to cap radial effects.
    #[must_use]
    pub fn diagonal(&self) -> f32 {
        (self.width * self.width + self.height * self.height).sqrt()
    }
}

/// Immutable per-frame snapshot of the polled input state.
///
/// Adapters capture key events asynchronously but hand the simulation one
/// frozen snapshot per tick, so an event arriving mid-frame takes effect on
/// the next tick rather than corrupting the current pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct InputSnapshot {
    /// Upward movement axis is held.
    pub move_up: bool,
    /// Downward movement axis is held.
    pub move_down: bool,
    /// Leftward movement axis is held.
    pub move_left: bool,
    /// Rightward movement axis is held.
    pub move_right: bool,
    /// Fire control is held.
    pub fire: bool,
    /// Reverse-direction control was pressed this frame (edge, not level).
    pub reverse: bool,
    /// Start control was pressed this frame (edge, not level).
    pub start: bool,
    /// Restart control was pressed this frame (edge, not level).
    pub restart: bool,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the play field and reseeds the session from scratch.
    ConfigurePlayField {
        /// Horizontal extent of the field in field units.
        width: f32,
        /// Vertical extent of the field in field units.
        height: f32,
        /// Seed driving terrain generation and in-world randomness.
        seed: u64,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
        /// Input snapshot captured by the adapter for this frame.
        input: InputSnapshot,
    },
    /// Requests that an enemy craft enter the field.
    SpawnEnemy {
        /// Variant of craft to spawn.
        kind: EnemyKind,
        /// Normalised [0, 1) vertical placement within the spawn band.
        altitude: f32,
    },
    /// Requests that a power-up drop enter the field.
    SpawnPowerUp {
        /// Variant of drop to spawn.
        kind: PowerUpKind,
        /// Normalised [0, 1) vertical placement within the spawn band.
        altitude: f32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces a completed state-machine transition.
    StateChanged {
        /// State that was active before the transition.
        from: GameState,
        /// State that became active after the transition.
        to: GameState,
    },
    /// Confirms that an enemy craft entered the field.
    EnemySpawned {
        /// Identifier assigned to the craft by the world.
        enemy: EnemyId,
        /// Variant of the spawned craft.
        kind: EnemyKind,
    },
    /// Confirms that an enemy craft left the field.
    EnemyDestroyed {
        /// Identifier of the destroyed craft.
        enemy: EnemyId,
        /// Variant of the destroyed craft.
        kind: EnemyKind,
        /// How the craft was destroyed.
        fate: EnemyFate,
        /// Points awarded to the session, zero for scoreless fates.
        points: u32,
    },
    /// Reports that a projectile was fired.
    ShotFired {
        /// Whose cannon fired the projectile.
        source: ShotSource,
    },
    /// Reports that the player's craft was destroyed.
    PlayerDied {
        /// Whether this death consumed the final life.
        final_life: bool,
    },
    /// Reports that the player respawned after a non-final death.
    PlayerRespawned,
    /// Reports that a life was deducted from the session.
    LifeLost {
        /// Lives remaining after the deduction.
        remaining: u32,
    },
    /// Confirms that a power-up drop entered the field.
    PowerUpSpawned {
        /// Identifier assigned to the drop by the world.
        power_up: PowerUpId,
        /// Variant of the spawned drop.
        kind: PowerUpKind,
    },
    /// Reports that the player collected a power-up drop.
    PowerUpCollected {
        /// Identifier of the collected drop.
        power_up: PowerUpId,
        /// Variant of the collected drop.
        kind: PowerUpKind,
    },
    /// Announces that the session advanced to the next level.
    LevelAdvanced {
        /// Level that became active.
        level: u32,
    },
    /// Announces that the session was reset by the restart input.
    SessionRestarted,
}

#[cfg(test)]
mod tests {
    use super::{
        Bounds, EnemyFate, EnemyId, EnemyKind, Facing, GameState, PlayField, Position, PowerUpId,
        PowerUpKind,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn game_state_round_trips_through_bincode() {
        assert_round_trip(&GameState::LevelUp);
    }

    #[test]
    fn enemy_kind_round_trips_through_bincode() {
        assert_round_trip(&EnemyKind::Striker);
    }

    #[test]
    fn power_up_kind_round_trips_through_bincode() {
        assert_round_trip(&PowerUpKind::Stargate);
    }

    #[test]
    fn identifiers_round_trip_through_bincode() {
        assert_round_trip(&EnemyId::new(42));
        assert_round_trip(&PowerUpId::new(7));
    }

    #[test]
    fn facing_sign_matches_heading() {
        assert_eq!(Facing::Right.sign(), 1.0);
        assert_eq!(Facing::Left.sign(), -1.0);
        assert_eq!(Facing::Left.flipped(), Facing::Right);
        assert_eq!(Facing::Right.flipped(), Facing::Left);
    }

    #[test]
    fn enemy_points_scale_with_threat() {
        assert_eq!(EnemyKind::Drone.points(), 100);
        assert_eq!(EnemyKind::Killer.points(), 200);
        assert_eq!(EnemyKind::Spike.points(), 250);
        assert_eq!(EnemyKind::Striker.points(), 300);
    }

    #[test]
    fn only_fighters_carry_cannons() {
        for kind in EnemyKind::ALL {
            assert_eq!(
                kind.fires(),
                matches!(kind, EnemyKind::Killer | EnemyKind::Striker)
            );
        }
    }

    #[test]
    fn off_screen_exit_is_scoreless() {
        assert!(!EnemyFate::LeftField.scores());
        assert!(EnemyFate::ShotDown.scores());
        assert!(EnemyFate::TerrainImpact.scores());
    }

    #[test]
    fn bounds_overlap_detects_intersection() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(5.0, 5.0, 10.0, 10.0);
        let c = Bounds::new(20.0, 20.0, 4.0, 4.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn bounds_edges_touching_do_not_overlap() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn bounds_center_is_midpoint() {
        let bounds = Bounds::new(10.0, 20.0, 4.0, 8.0);
        assert_eq!(bounds.center(), Position::new(12.0, 24.0));
    }

    #[test]
    fn play_field_diagonal_matches_pythagoras() {
        let field = PlayField::new(3.0, 4.0);
        assert!((field.diagonal() - 5.0).abs() < f32::EPSILON);
    }
}
