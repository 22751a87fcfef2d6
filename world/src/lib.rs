#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for Viper Patrol.
//!
//! A single [`World`] owns the game state machine, the scrolling terrain,
//! the player's craft, the enemy force and the power-up drops. All mutation
//! flows through [`apply`], which executes one [`Command`] deterministically
//! and broadcasts [`Event`] values describing what happened. Reads go
//! through the [`query`] module, which returns immutable snapshots.

mod anim;
mod collision;
mod enemies;
mod player;
mod power_ups;
mod state;
mod terrain;

use std::time::Duration;

use viper_patrol_core::{
    Bounds, Command, Event, GameState, InputSnapshot, PlayField, PowerUpKind, MAX_LIVES,
    STARTING_LIVES,
};

use crate::enemies::EnemyForce;
use crate::player::Player;
use crate::power_ups::PowerUpDrops;
use crate::state::{StateMachine, DEATH_DELAY, GAME_OVER_DELAY, READY_DELAY};
use crate::terrain::Terrain;

const DEFAULT_FIELD_WIDTH: f32 = 1280.0;
const DEFAULT_FIELD_HEIGHT: f32 = 720.0;
const DEFAULT_SEED: u64 = 0x5649_5045_525f_3031;
/// Invulnerability window granted by a shield pickup.
const SHIELD_DURATION: Duration = Duration::from_secs(10);

const RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const RNG_INCREMENT: u64 = 1;

/// Deterministic linear-congruential generator for in-world randomness.
#[derive(Debug)]
pub(crate) struct Rng {
    state: u64,
}

impl Rng {
    pub(crate) const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(RNG_MULTIPLIER)
            .wrapping_add(RNG_INCREMENT);
        self.state
    }

    /// Uniform fraction in [0, 1).
    pub(crate) fn next_fraction(&mut self) -> f32 {
        (self.next() >> 40) as f32 / (1u64 << 24) as f32
    }
}

/// Represents the authoritative Viper Patrol session state.
#[derive(Debug)]
pub struct World {
    play_field: PlayField,
    seed: u64,
    score: u32,
    level: u32,
    lives: u32,
    shield_time: Duration,
    epoch: u64,
    state: StateMachine,
    terrain: Terrain,
    player: Player,
    enemies: EnemyForce,
    power_ups: PowerUpDrops,
    rng: Rng,
}

impl World {
    /// Creates a new session resting on the start screen.
    #[must_use]
    pub fn new() -> Self {
        let play_field = PlayField::new(DEFAULT_FIELD_WIDTH, DEFAULT_FIELD_HEIGHT);
        Self {
            play_field,
            seed: DEFAULT_SEED,
            score: 0,
            level: 1,
            lives: STARTING_LIVES,
            shield_time: Duration::ZERO,
            epoch: 0,
            state: StateMachine::new(),
            terrain: Terrain::new(play_field, DEFAULT_SEED),
            player: Player::new(play_field),
            enemies: EnemyForce::default(),
            power_ups: PowerUpDrops::default(),
            rng: Rng::new(DEFAULT_SEED),
        }
    }

    fn set_state(&mut self, next: GameState, out: &mut Vec<Event>) {
        if !self.state.accepts(next) {
            return;
        }
        let from = self.state.current();
        self.on_exit(from);
        self.state.begin(next);
        self.on_enter(next);
        out.push(Event::StateChanged { from, to: next });
    }

    fn on_exit(&mut self, state: GameState) {
        if state == GameState::Playing {
            self.enemies.clear();
            self.power_ups.clear_drops();
        }
    }

    fn on_enter(&mut self, state: GameState) {
        match state {
            GameState::Start => self.state.reset_start_screen(),
            GameState::GetReady => {
                self.state.reset_get_ready();
                self.player.reset(self.play_field);
                self.enemies.clear();
                self.power_ups.clear_drops();
                self.power_ups.clear_effect();
            }
            GameState::Playing => {
                self.state.reset_level_up();
                self.state.reset_death_sequence();
                self.power_ups.clear_effect();
            }
            GameState::LevelUp => self.state.reset_level_up(),
            GameState::GameOver => self.state.reset_restart_prompt(),
        }
    }

    fn tick(&mut self, dt: Duration, input: &InputSnapshot, out: &mut Vec<Event>) {
        let dtf = dt.as_secs_f32();
        self.state.tick_transition(dtf);

        if let Some(target) = self.state.poll_deferred(dt, self.epoch) {
            self.set_state(target, out);
        }

        match self.state.current() {
            GameState::Start => {
                self.state.update_start(dtf);
                if input.start {
                    self.set_state(GameState::GetReady, out);
                }
            }
            GameState::GetReady => {
                self.terrain.advance(dtf, self.player.facing());
                if self.state.update_get_ready(dtf) {
                    self.set_state(GameState::Playing, out);
                }
            }
            GameState::Playing => self.update_playing(dt, input, out),
            GameState::LevelUp => self.update_level_up(dt, out),
            GameState::GameOver => {
                self.state.update_game_over(dtf);
                if input.restart && !self.state.in_transition() {
                    self.restart(out);
                }
            }
        }
    }

    fn update_playing(&mut self, dt: Duration, input: &InputSnapshot, out: &mut Vec<Event>) {
        let dtf = dt.as_secs_f32();
        self.player.update(dt, input, self.play_field, out);

        if !self.player.is_dead() {
            self.terrain.advance(dtf, self.player.facing());
            let impact_points = self.enemies.advance(
                dt,
                self.player.position().y(),
                &self.terrain,
                self.play_field,
                &mut self.rng,
                out,
            );
            self.score = self.score.saturating_add(impact_points);
            self.power_ups.advance(dtf, &self.terrain, self.play_field);
            self.resolve_collisions(out);
        }

        if !self.shield_time.is_zero() {
            self.shield_time = self.shield_time.saturating_sub(dt);
        }

        if self.player.is_dead() {
            self.update_death_sequence(dt, out);
        } else if self.player.is_respawned() {
            self.update_respawn_grace(dt);
        }
    }

    fn resolve_collisions(&mut self, out: &mut Vec<Event>) {
        let bounds = self.player.bounds();

        if self.terrain.collides(&bounds) {
            self.kill_player(out);
            return;
        }

        let (rammed, ram_points) = self.enemies.collide_player(&bounds, out);
        self.score = self.score.saturating_add(ram_points);
        let shot_hit = self.enemies.shots_hit_player(&bounds);
        let kill_points = self
            .enemies
            .absorb_player_shots(self.player.shots_mut(), out);
        self.score = self.score.saturating_add(kill_points);

        if rammed || shot_hit {
            self.kill_player(out);
            return;
        }

        self.collect_power_ups(&bounds, out);
    }

    fn collect_power_ups(&mut self, bounds: &Bounds, out: &mut Vec<Event>) {
        for collected in self.power_ups.collect(bounds, out) {
            match collected.kind {
                PowerUpKind::Shield => self.shield_time = SHIELD_DURATION,
                PowerUpKind::FreeLife => self.lives = (self.lives + 1).min(MAX_LIVES),
                PowerUpKind::Stargate => {
                    self.power_ups.open_stargate(collected);
                    self.player.start_fade_out();
                    self.set_state(GameState::LevelUp, out);
                }
            }
        }
    }

    /// Resolves a fatal collision. The life is deducted first and the
    /// already-decremented count decides the explosion variant, so the
    /// final-life determination never depends on read ordering.
    fn kill_player(&mut self, out: &mut Vec<Event>) {
        if self.player.is_dead()
            || !self.shield_time.is_zero()
            || self.power_ups.effect().is_some()
        {
            return;
        }

        self.lives = self.lives.saturating_sub(1);
        let final_life = self.lives == 0;
        self.player.die(final_life);
        self.enemies.clear();
        self.power_ups.clear_drops();
        self.state.reset_death_sequence();
        out.push(Event::LifeLost {
            remaining: self.lives,
        });
        out.push(Event::PlayerDied { final_life });

        if final_life {
            self.state
                .arm_deferred(GameState::GameOver, GAME_OVER_DELAY, self.epoch);
        }
    }

    fn update_death_sequence(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let death = self.state.death_mut();
        death.death_elapsed = death.death_elapsed.saturating_add(dt);
        let delay_elapsed = death.death_elapsed >= DEATH_DELAY;

        if delay_elapsed && self.lives > 0 && !self.player.is_respawned() {
            self.player.reset(self.play_field);
            self.player.set_respawned(true);
            out.push(Event::PlayerRespawned);
        }
    }

    fn update_respawn_grace(&mut self, dt: Duration) {
        let death = self.state.death_mut();
        death.ready_elapsed = death.ready_elapsed.saturating_add(dt);
        if death.ready_elapsed >= READY_DELAY {
            self.state.reset_death_sequence();
            self.player.set_respawned(false);
        }
    }

    fn update_level_up(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let dtf = dt.as_secs_f32();
        // Keeps the craft's stargate fade animating while gameplay is frozen.
        self.player
            .update(dt, &InputSnapshot::default(), self.play_field, out);
        self.power_ups.advance_effect(dtf, self.play_field);

        if self.state.advance_level_up(dt) {
            self.power_ups.clear_effect();
            self.level = self.level.saturating_add(1);
            out.push(Event::LevelAdvanced { level: self.level });
            self.set_state(GameState::GetReady, out);
        }
    }

    fn restart(&mut self, out: &mut Vec<Event>) {
        self.epoch = self.epoch.wrapping_add(1);
        self.state.cancel_deferred();
        self.score = 0;
        self.level = 1;
        self.lives = STARTING_LIVES;
        self.shield_time = Duration::ZERO;
        self.terrain = Terrain::new(self.play_field, self.seed);
        self.player = Player::new(self.play_field);
        self.enemies.clear();
        self.power_ups.clear_drops();
        self.power_ups.clear_effect();
        out.push(Event::SessionRestarted);
        self.set_state(GameState::Start, out);
    }

    fn reconfigure(&mut self, width: f32, height: f32, seed: u64) {
        self.play_field = PlayField::new(width.max(1.0), height.max(1.0));
        self.seed = seed;
        self.epoch = self.epoch.wrapping_add(1);
        self.score = 0;
        self.level = 1;
        self.lives = STARTING_LIVES;
        self.shield_time = Duration::ZERO;
        self.state = StateMachine::new();
        self.terrain = Terrain::new(self.play_field, seed);
        self.player = Player::new(self.play_field);
        self.enemies.clear();
        self.power_ups.clear_drops();
        self.power_ups.clear_effect();
        self.rng = Rng::new(seed);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Invalid or stale commands (a spawn arriving outside active play, a
/// duplicate transition) are dropped silently; `apply` never panics.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigurePlayField {
            width,
            height,
            seed,
        } => world.reconfigure(width, height, seed),
        Command::Tick { dt, input } => {
            out_events.push(Event::TimeAdvanced { dt });
            world.tick(dt, &input, out_events);
        }
        Command::SpawnEnemy { kind, altitude } => {
            if world.state.current() == GameState::Playing && !world.player.is_dead() {
                let _ = world.enemies.spawn(
                    kind,
                    altitude,
                    world.player.facing(),
                    world.play_field,
                    &mut world.rng,
                    out_events,
                );
            }
        }
        Command::SpawnPowerUp { kind, altitude } => {
            if world.state.current() == GameState::Playing && !world.player.is_dead() {
                let _ = world.power_ups.spawn(
                    kind,
                    altitude,
                    world.player.facing(),
                    world.play_field,
                    out_events,
                );
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use viper_patrol_core::{
        Bounds, EnemyId, EnemyKind, Facing, GameState, PlayField, Position, PowerUpId, PowerUpKind,
    };

    use super::{player, World, SHIELD_DURATION};

    /// Currently active state of the session state machine.
    #[must_use]
    pub fn game_state(world: &World) -> GameState {
        world.state.current()
    }

    /// State active before the most recent transition, if any.
    #[must_use]
    pub fn previous_state(world: &World) -> Option<GameState> {
        world.state.previous()
    }

    /// Progress of the active cross-fade in [0, 1], when one is running.
    #[must_use]
    pub fn transition_progress(world: &World) -> Option<f32> {
        world.state.transition_progress()
    }

    /// Accumulated session score.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Lives remaining in the session.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Level the session is currently playing.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.level
    }

    /// Remaining shield time as a fraction of the full duration.
    #[must_use]
    pub fn shield_fraction(world: &World) -> f32 {
        (world.shield_time.as_secs_f32() / SHIELD_DURATION.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Dimensions of the play field.
    #[must_use]
    pub fn play_field(world: &World) -> PlayField {
        world.play_field
    }

    /// Captures a read-only snapshot of the player's craft.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        let p = &world.player;
        PlayerSnapshot {
            position: p.position(),
            facing: p.facing(),
            thrust: p.thrust(),
            fade: p.fade(),
            is_dead: p.is_dead(),
            is_respawned: p.is_respawned(),
            shield_active: !world.shield_time.is_zero(),
            shots: p
                .shots()
                .iter()
                .map(|shot| ShotSnapshot {
                    position: shot.position,
                    facing: shot.facing,
                    trail: shot.trail.iter().copied().collect(),
                })
                .collect(),
            explosion: p.explosion().map(explosion_snapshot),
        }
    }

    fn explosion_snapshot(explosion: &player::Explosion) -> ExplosionSnapshot {
        let (is_final, bursts) = match &explosion.variant {
            player::ExplosionVariant::Standard => (false, Vec::new()),
            player::ExplosionVariant::Final { bursts } => (
                true,
                bursts
                    .iter()
                    .map(|burst| BurstSnapshot {
                        center: burst.center,
                        radius: burst.radius,
                        opacity: burst.opacity,
                        started: burst.elapsed > 0.0,
                    })
                    .collect(),
            ),
        };
        ExplosionSnapshot {
            center: explosion.center,
            radius: explosion.radius,
            opacity: explosion.opacity,
            is_final,
            bursts,
        }
    }

    /// Captures a read-only view of the enemy force in deterministic order.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let mut snapshots: Vec<EnemySnapshot> = world
            .enemies
            .enemies()
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                kind: enemy.kind,
                bounds: enemy.bounds(),
                facing: enemy.facing,
                spin: enemy.spin,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        EnemyView { snapshots }
    }

    /// Snapshots of every live enemy shot.
    #[must_use]
    pub fn enemy_shots(world: &World) -> Vec<EnemyShotSnapshot> {
        world
            .enemies
            .shots()
            .iter()
            .map(|shot| EnemyShotSnapshot {
                position: shot.position,
                facing: shot.facing,
                plasma: shot.plasma,
                trail: shot.trail.iter().copied().collect(),
            })
            .collect()
    }

    /// Snapshots of every expanding blast left by destroyed craft.
    #[must_use]
    pub fn blasts(world: &World) -> Vec<BlastSnapshot> {
        world
            .enemies
            .blasts()
            .iter()
            .map(|blast| BlastSnapshot {
                center: blast.center,
                radius: blast.radius,
                opacity: blast.opacity,
            })
            .collect()
    }

    /// Captures a read-only view of the live power-up drops.
    #[must_use]
    pub fn power_up_view(world: &World) -> PowerUpView {
        let mut snapshots: Vec<PowerUpSnapshot> = world
            .power_ups
            .drops()
            .iter()
            .map(|drop| PowerUpSnapshot {
                id: drop.id,
                kind: drop.kind,
                position: drop.position,
                size: drop.size,
                facing: drop.facing,
                rotation: drop.rotation,
                vortex_rotation: drop.vortex_rotation,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        PowerUpView { snapshots }
    }

    /// Snapshot of the open stargate vortex, if one exists.
    #[must_use]
    pub fn stargate_effect(world: &World) -> Option<StargateEffectSnapshot> {
        world.power_ups.effect().map(|effect| StargateEffectSnapshot {
            center: effect.center,
            size: effect.size,
            radius: effect.radius,
            opacity: effect.opacity,
            rotation: effect.rotation,
            vortex_rotation: effect.vortex_rotation,
            banner_visible: effect.level_up_started,
            pulse: effect.elapsed,
        })
    }

    /// Whether a stargate drop or an open vortex is already present.
    #[must_use]
    pub fn stargate_open(world: &World) -> bool {
        world.power_ups.stargate_open()
    }

    /// Screen-space spans of the windowed terrain segments.
    #[must_use]
    pub fn terrain_profile(world: &World) -> Vec<TerrainSpan> {
        world
            .terrain
            .profile()
            .into_iter()
            .map(|(screen_x, height)| TerrainSpan { screen_x, height })
            .collect()
    }

    /// Interpolated ground height at the provided screen-space x coordinate.
    #[must_use]
    pub fn terrain_height_at(world: &World, screen_x: f32) -> f32 {
        world.terrain.height_at(screen_x)
    }

    /// Opacity of the start-screen press-start prompt.
    #[must_use]
    pub fn splash_alpha(world: &World) -> f32 {
        world.state.splash_alpha()
    }

    /// Phase angle of the start-screen title pulse.
    #[must_use]
    pub fn title_pulse(world: &World) -> f32 {
        world.state.title_pulse()
    }

    /// Rotation of the start-screen stargate emblem.
    #[must_use]
    pub fn emblem_angle(world: &World) -> f32 {
        world.state.emblem_angle()
    }

    /// Opacity of the Get-Ready banner flash.
    #[must_use]
    pub fn get_ready_alpha(world: &World) -> f32 {
        world.state.get_ready_alpha()
    }

    /// Opacity of the game-over restart prompt.
    #[must_use]
    pub fn restart_prompt_alpha(world: &World) -> f32 {
        world.state.restart_prompt_alpha()
    }

    /// Immutable representation of the player's craft used for queries.
    #[derive(Clone, Debug)]
    pub struct PlayerSnapshot {
        /// Top-left corner of the craft.
        pub position: Position,
        /// Current heading of the craft.
        pub facing: Facing,
        /// Cosmetic thrust intensity in [0, 1].
        pub thrust: f32,
        /// Craft opacity in [0, 1]; below one during the stargate fade.
        pub fade: f32,
        /// Whether the craft is currently destroyed.
        pub is_dead: bool,
        /// Whether the respawn grace overlay is showing.
        pub is_respawned: bool,
        /// Whether shield invulnerability is active.
        pub shield_active: bool,
        /// Live plasma bolts fired by the craft.
        pub shots: Vec<ShotSnapshot>,
        /// Explosion animation while the craft is destroyed.
        pub explosion: Option<ExplosionSnapshot>,
    }

    /// Immutable representation of a player shot.
    #[derive(Clone, Debug)]
    pub struct ShotSnapshot {
        /// Leading point of the bolt.
        pub position: Position,
        /// Travel direction of the bolt.
        pub facing: Facing,
        /// Past positions, oldest first, for trail rendering.
        pub trail: Vec<Position>,
    }

    /// Immutable representation of the player's explosion animation.
    #[derive(Clone, Debug)]
    pub struct ExplosionSnapshot {
        /// Centre of the blast.
        pub center: Position,
        /// Current blast radius.
        pub radius: f32,
        /// Current blast opacity.
        pub opacity: f32,
        /// Whether this is the larger final-life variant.
        pub is_final: bool,
        /// Staggered secondary bursts around a final-life blast.
        pub bursts: Vec<BurstSnapshot>,
    }

    /// Immutable representation of one secondary burst.
    #[derive(Clone, Copy, Debug)]
    pub struct BurstSnapshot {
        /// Centre of the burst.
        pub center: Position,
        /// Current burst radius.
        pub radius: f32,
        /// Current burst opacity.
        pub opacity: f32,
        /// Whether the stagger delay has elapsed.
        pub started: bool,
    }

    /// Read-only view of the enemy force in deterministic order.
    #[derive(Clone, Debug, Default)]
    pub struct EnemyView {
        snapshots: Vec<EnemySnapshot>,
    }

    impl EnemyView {
        /// Iterator over the captured enemy snapshots.
        pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<EnemySnapshot> {
            self.snapshots
        }

        /// Number of live enemy craft.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Whether the force is empty.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }
    }

    /// Immutable representation of a single enemy craft.
    #[derive(Clone, Copy, Debug)]
    pub struct EnemySnapshot {
        /// Identifier assigned by the world.
        pub id: EnemyId,
        /// Variant of the craft.
        pub kind: EnemyKind,
        /// Collision box of the craft.
        pub bounds: Bounds,
        /// Travel direction of the craft.
        pub facing: Facing,
        /// Cosmetic spin angle for spinning variants.
        pub spin: f32,
    }

    /// Immutable representation of an enemy shot.
    #[derive(Clone, Debug)]
    pub struct EnemyShotSnapshot {
        /// Leading point of the shot.
        pub position: Position,
        /// Travel direction of the shot.
        pub facing: Facing,
        /// Whether this is the fast plasma variant.
        pub plasma: bool,
        /// Past positions, oldest first, for trail rendering.
        pub trail: Vec<Position>,
    }

    /// Immutable representation of a small expanding blast.
    #[derive(Clone, Copy, Debug)]
    pub struct BlastSnapshot {
        /// Centre of the blast.
        pub center: Position,
        /// Current blast radius.
        pub radius: f32,
        /// Current blast opacity.
        pub opacity: f32,
    }

    /// Read-only view of the live power-up drops in deterministic order.
    #[derive(Clone, Debug, Default)]
    pub struct PowerUpView {
        snapshots: Vec<PowerUpSnapshot>,
    }

    impl PowerUpView {
        /// Iterator over the captured drop snapshots.
        pub fn iter(&self) -> impl Iterator<Item = &PowerUpSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<PowerUpSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single power-up drop.
    #[derive(Clone, Copy, Debug)]
    pub struct PowerUpSnapshot {
        /// Identifier assigned by the world.
        pub id: PowerUpId,
        /// Variant of the drop.
        pub kind: PowerUpKind,
        /// Top-left corner of the drop.
        pub position: Position,
        /// Side length of the (square) drop sprite.
        pub size: f32,
        /// Drift direction of the drop.
        pub facing: Facing,
        /// Ring rotation for spinning drops.
        pub rotation: f32,
        /// Vortex rotation for spinning drops.
        pub vortex_rotation: f32,
    }

    /// Immutable representation of the open stargate vortex.
    #[derive(Clone, Copy, Debug)]
    pub struct StargateEffectSnapshot {
        /// Centre of the vortex.
        pub center: Position,
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
        /// Whether the level-up banner has appeared.
        pub banner_visible: bool,
        /// Seconds since the vortex opened, drives the banner pulse.
        pub pulse: f32,
    }

    /// One unit-width slice of the terrain profile in screen space.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct TerrainSpan {
        /// Screen-space x coordinate of the span's left edge.
        pub screen_x: f32,
        /// Ground height measured up from the bottom edge.
        pub height: f32,
    }
}

#[cfg(test)]
mod tests {
    use super::{apply, query, World};
    use std::time::Duration;
    use viper_patrol_core::{
        Command, EnemyKind, Event, GameState, InputSnapshot, Position, PowerUpKind,
    };

    const STEP: Duration = Duration::from_millis(50);

    fn tick(world: &mut World, input: InputSnapshot) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::Tick { dt: STEP, input }, &mut events);
        events
    }

    fn idle(world: &mut World, seconds: f32) -> Vec<Event> {
        let mut events = Vec::new();
        let steps = (seconds / STEP.as_secs_f32()).ceil() as usize;
        for _ in 0..steps {
            events.extend(tick(world, InputSnapshot::default()));
        }
        events
    }

    fn press_start(world: &mut World) -> Vec<Event> {
        tick(
            world,
            InputSnapshot {
                start: true,
                ..InputSnapshot::default()
            },
        )
    }

    fn enter_playing(world: &mut World) {
        let _ = press_start(world);
        assert_eq!(query::game_state(world), GameState::GetReady);
        for _ in 0..400 {
            if query::game_state(world) == GameState::Playing {
                return;
            }
            let _ = tick(world, InputSnapshot::default());
        }
        panic!("get-ready sequence never completed");
    }

    fn spawn_enemy_on_player(world: &mut World, kind: EnemyKind) {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnEnemy {
                kind,
                altitude: 0.5,
            },
            &mut events,
        );
        let player = query::player(world);
        world.enemies.enemies_mut()[0].position = player.position;
    }

    fn spawn_power_up_on_player(world: &mut World, kind: PowerUpKind) {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnPowerUp {
                kind,
                altitude: 0.5,
            },
            &mut events,
        );
        let player = query::player(world);
        let center = player.position;
        let drops = world.power_ups.drops_mut();
        let drop = drops.last_mut().expect("drop spawned");
        // Centre the drop on the player so even the vortex hot-zone overlaps.
        drop.position = Position::new(
            center.x() + 32.0 - drop.size / 2.0,
            center.y() + 16.0 - drop.size / 2.0,
        );
    }

    #[test]
    fn fresh_session_rests_on_the_start_screen() {
        let world = World::new();
        assert_eq!(query::game_state(&world), GameState::Start);
        assert_eq!(query::score(&world), 0);
        assert_eq!(query::level(&world), 1);
        assert_eq!(query::lives(&world), 3);
    }

    #[test]
    fn start_input_runs_the_flash_sequence_into_playing() {
        let mut world = World::new();
        let events = press_start(&mut world);
        assert_eq!(query::game_state(&world), GameState::GetReady);
        assert!(events.iter().any(|event| matches!(
            event,
            Event::StateChanged {
                from: GameState::Start,
                to: GameState::GetReady,
            }
        )));

        // Three flashes of fade-in, hold and fade-out gate entry into play.
        let events = idle(&mut world, 6.0);
        assert_eq!(query::game_state(&world), GameState::Playing);
        assert!(events.iter().any(|event| matches!(
            event,
            Event::StateChanged {
                from: GameState::GetReady,
                to: GameState::Playing,
            }
        )));
    }

    #[test]
    fn terrain_scrolls_during_get_ready() {
        let mut world = World::new();
        let _ = press_start(&mut world);
        let before = query::terrain_profile(&world)[0].screen_x;
        let _ = idle(&mut world, 0.3);
        let after = query::terrain_profile(&world)[0].screen_x;
        assert!(
            (before - after).abs() > f32::EPSILON,
            "terrain froze during get-ready"
        );
    }

    #[test]
    fn spawn_commands_are_dropped_outside_playing() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Drone,
                altitude: 0.5,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnPowerUp {
                kind: PowerUpKind::Shield,
                altitude: 0.5,
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert!(query::enemy_view(&world).is_empty());
        assert!(query::power_up_view(&world).into_vec().is_empty());
    }

    #[test]
    fn enemy_collision_costs_a_life_and_stays_in_playing() {
        let mut world = World::new();
        enter_playing(&mut world);
        spawn_enemy_on_player(&mut world, EnemyKind::Drone);

        let events = tick(&mut world, InputSnapshot::default());

        assert_eq!(query::lives(&world), 2);
        assert_eq!(query::game_state(&world), GameState::Playing);
        assert_eq!(query::score(&world), EnemyKind::Drone.points());
        assert!(query::player(&world).is_dead);
        assert!(query::enemy_view(&world).is_empty());
        assert!(events.iter().any(|event| matches!(
            event,
            Event::PlayerDied { final_life: false }
        )));
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::LifeLost { remaining: 2 })));
    }

    #[test]
    fn shield_blocks_the_fatal_collision() {
        let mut world = World::new();
        enter_playing(&mut world);
        world.shield_time = Duration::from_secs(5);
        spawn_enemy_on_player(&mut world, EnemyKind::Killer);

        let _ = tick(&mut world, InputSnapshot::default());

        assert_eq!(query::lives(&world), 3);
        assert!(!query::player(&world).is_dead);
        assert_eq!(query::game_state(&world), GameState::Playing);
        // The craft that rammed the shield is still destroyed for points.
        assert_eq!(query::score(&world), EnemyKind::Killer.points());
    }

    #[test]
    fn shield_pickup_overwrites_the_remaining_duration() {
        let mut world = World::new();
        enter_playing(&mut world);
        world.shield_time = Duration::from_secs(3);
        spawn_power_up_on_player(&mut world, PowerUpKind::Shield);

        let _ = tick(&mut world, InputSnapshot::default());

        // Reset to the full ten seconds (minus the tick), not 3 + 10.
        assert!(query::shield_fraction(&world) > 0.9);
        assert!(query::shield_fraction(&world) <= 1.0);
    }

    #[test]
    fn free_life_is_a_no_op_at_the_cap() {
        let mut world = World::new();
        enter_playing(&mut world);
        world.lives = 5;
        spawn_power_up_on_player(&mut world, PowerUpKind::FreeLife);
        let _ = tick(&mut world, InputSnapshot::default());
        assert_eq!(query::lives(&world), 5);

        world.lives = 3;
        spawn_power_up_on_player(&mut world, PowerUpKind::FreeLife);
        let _ = tick(&mut world, InputSnapshot::default());
        assert_eq!(query::lives(&world), 4);
    }

    #[test]
    fn player_shot_removes_enemy_and_scores() {
        let mut world = World::new();
        enter_playing(&mut world);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Drone,
                altitude: 0.5,
            },
            &mut events,
        );
        let player = query::player(&world);
        world.enemies.enemies_mut()[0].position =
            Position::new(player.position.x() + 80.0, player.position.y() + 4.0);

        let events = tick(
            &mut world,
            InputSnapshot {
                fire: true,
                ..InputSnapshot::default()
            },
        );

        assert_eq!(query::score(&world), EnemyKind::Drone.points());
        assert!(query::enemy_view(&world).is_empty());
        assert_eq!(query::blasts(&world).len(), 1);
        assert_eq!(query::lives(&world), 3);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::EnemyDestroyed { .. })));
    }

    #[test]
    fn terrain_collision_is_fatal_without_shield() {
        let mut world = World::new();
        enter_playing(&mut world);
        // Park the craft inside the ground surface.
        world
            .player
            .set_position(Position::new(320.0, query::play_field(&world).height() - 50.0));

        let _ = tick(&mut world, InputSnapshot::default());

        assert_eq!(query::lives(&world), 2);
        assert!(query::player(&world).is_dead);
    }

    #[test]
    fn non_final_death_respawns_after_the_delays() {
        let mut world = World::new();
        enter_playing(&mut world);
        spawn_enemy_on_player(&mut world, EnemyKind::Drone);
        let _ = tick(&mut world, InputSnapshot::default());
        assert!(query::player(&world).is_dead);

        // Still dead before the death delay elapses.
        let _ = idle(&mut world, 1.5);
        assert!(query::player(&world).is_dead);

        let events = idle(&mut world, 0.7);
        let player = query::player(&world);
        assert!(!player.is_dead);
        assert!(player.is_respawned);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::PlayerRespawned)));

        // The grace overlay clears after the ready delay.
        let _ = idle(&mut world, 2.1);
        assert!(!query::player(&world).is_respawned);
        assert_eq!(query::game_state(&world), GameState::Playing);
    }

    #[test]
    fn final_life_death_reaches_game_over_only_after_the_delay() {
        let mut world = World::new();
        enter_playing(&mut world);
        world.lives = 1;
        spawn_enemy_on_player(&mut world, EnemyKind::Striker);

        let events = tick(&mut world, InputSnapshot::default());
        assert_eq!(query::lives(&world), 0);
        assert_eq!(query::game_state(&world), GameState::Playing);
        assert!(events.iter().any(|event| matches!(
            event,
            Event::PlayerDied { final_life: true }
        )));
        assert!(query::player(&world)
            .explosion
            .as_ref()
            .is_some_and(|explosion| explosion.is_final));

        let _ = idle(&mut world, 2.5);
        assert_eq!(query::game_state(&world), GameState::Playing);

        let _ = idle(&mut world, 0.7);
        assert_eq!(query::game_state(&world), GameState::GameOver);
    }

    #[test]
    fn lives_never_go_below_zero() {
        let mut world = World::new();
        enter_playing(&mut world);
        world.lives = 1;
        spawn_enemy_on_player(&mut world, EnemyKind::Drone);
        let _ = tick(&mut world, InputSnapshot::default());
        let _ = idle(&mut world, 1.0);
        assert_eq!(query::lives(&world), 0);
    }

    #[test]
    fn stargate_runs_the_full_level_up_pipeline() {
        let mut world = World::new();
        enter_playing(&mut world);
        spawn_power_up_on_player(&mut world, PowerUpKind::Stargate);

        let events = tick(&mut world, InputSnapshot::default());
        assert_eq!(query::game_state(&world), GameState::LevelUp);
        assert!(query::stargate_effect(&world).is_some());
        assert!(events.iter().any(|event| matches!(
            event,
            Event::PowerUpCollected {
                kind: PowerUpKind::Stargate,
                ..
            }
        )));

        // The player fades while the vortex expands.
        let _ = idle(&mut world, 1.0);
        assert!(query::player(&world).fade < 1.0);

        let events = idle(&mut world, 3.0);
        assert_eq!(query::game_state(&world), GameState::GetReady);
        assert_eq!(query::level(&world), 2);
        assert!(query::stargate_effect(&world).is_none());
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::LevelAdvanced { level: 2 })));

        let _ = idle(&mut world, 6.0);
        assert_eq!(query::game_state(&world), GameState::Playing);
        assert_eq!(query::player(&world).fade, 1.0);
    }

    #[test]
    fn stargate_collection_ignores_lives_and_never_detours_to_game_over() {
        let mut world = World::new();
        enter_playing(&mut world);
        world.lives = 1;
        spawn_power_up_on_player(&mut world, PowerUpKind::Stargate);
        let _ = tick(&mut world, InputSnapshot::default());

        let _ = idle(&mut world, 10.0);
        assert_ne!(query::game_state(&world), GameState::GameOver);
        assert_eq!(query::level(&world), 2);
        assert_eq!(query::lives(&world), 1);
    }

    #[test]
    fn collision_during_stargate_effect_is_harmless() {
        let mut world = World::new();
        enter_playing(&mut world);
        spawn_power_up_on_player(&mut world, PowerUpKind::Stargate);
        let _ = tick(&mut world, InputSnapshot::default());
        assert_eq!(query::game_state(&world), GameState::LevelUp);
        // Entity simulation is frozen; lives cannot change during the
        // cinematic no matter how long it runs.
        let lives_before = query::lives(&world);
        let _ = idle(&mut world, 1.0);
        assert_eq!(query::lives(&world), lives_before);
    }

    #[test]
    fn restart_is_refused_outside_game_over() {
        let mut world = World::new();
        enter_playing(&mut world);
        world.score = 500;
        let _ = tick(
            &mut world,
            InputSnapshot {
                restart: true,
                ..InputSnapshot::default()
            },
        );
        assert_eq!(query::game_state(&world), GameState::Playing);
        assert_eq!(query::score(&world), 500);
    }

    #[test]
    fn restart_from_game_over_resets_the_session() {
        let mut world = World::new();
        enter_playing(&mut world);
        world.lives = 1;
        world.score = 1200;
        world.level = 4;
        spawn_enemy_on_player(&mut world, EnemyKind::Drone);
        let _ = tick(&mut world, InputSnapshot::default());
        let _ = idle(&mut world, 3.5);
        assert_eq!(query::game_state(&world), GameState::GameOver);

        let events = tick(
            &mut world,
            InputSnapshot {
                restart: true,
                ..InputSnapshot::default()
            },
        );

        assert_eq!(query::game_state(&world), GameState::Start);
        assert_eq!(query::score(&world), 0);
        assert_eq!(query::level(&world), 1);
        assert_eq!(query::lives(&world), 3);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::SessionRestarted)));
    }

    #[test]
    fn duplicate_stargates_are_refused_by_the_world() {
        let mut world = World::new();
        enter_playing(&mut world);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnPowerUp {
                kind: PowerUpKind::Stargate,
                altitude: 0.2,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnPowerUp {
                kind: PowerUpKind::Stargate,
                altitude: 0.8,
            },
            &mut events,
        );
        assert_eq!(query::power_up_view(&world).into_vec().len(), 1);
    }

    #[test]
    fn time_advanced_is_broadcast_every_tick() {
        let mut world = World::new();
        let events = tick(&mut world, InputSnapshot::default());
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. })));
    }
}
