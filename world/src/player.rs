//! The player's craft: movement, shooting, fades and death animation.
//!
//! The craft runs its own small life-cycle (alive, dying with an animating
//! explosion, respawning) orthogonal to the global state machine, which
//! decides *when* these steps happen.

use std::collections::VecDeque;
use std::f32::consts::TAU;
use std::time::Duration;

use viper_patrol_core::{
    Bounds, Event, Facing, InputSnapshot, PlayField, Position, ShotSource, PLAYER_FOOTPRINT,
};

/// Collision width of the craft.
pub(crate) const PLAYER_WIDTH: f32 = PLAYER_FOOTPRINT.0;
/// Collision height of the craft.
pub(crate) const PLAYER_HEIGHT: f32 = PLAYER_FOOTPRINT.1;
/// Movement speed in field units per second.
const PLAYER_SPEED: f32 = 300.0;
/// Minimum delay between consecutive shots.
const FIRE_COOLDOWN: Duration = Duration::from_millis(200);
/// Muzzle speed of player shots.
const SHOT_SPEED: f32 = 500.0;
/// Width of a player shot's collision box.
pub(crate) const SHOT_WIDTH: f32 = 12.0;
/// Height of a player shot's collision box.
pub(crate) const SHOT_HEIGHT: f32 = 6.0;
/// Longest trail retained behind a shot.
const SHOT_TRAIL_LENGTH: usize = 40;
/// Seconds for thrust to ramp from idle to full.
const THRUST_RAMP: f32 = 2.0;
/// Thrust intensity shown while coasting.
const THRUST_IDLE: f32 = 0.4;
/// Opacity lost per second during the stargate fade-out.
const FADE_RATE: f32 = 0.5;

/// Plasma bolt fired by the player's cannon.
#[derive(Clone, Debug)]
pub(crate) struct Shot {
    pub(crate) position: Position,
    pub(crate) facing: Facing,
    pub(crate) trail: VecDeque<Position>,
}

impl Shot {
    fn new(position: Position, facing: Facing) -> Self {
        Self {
            position,
            facing,
            trail: VecDeque::with_capacity(SHOT_TRAIL_LENGTH),
        }
    }

    /// Collision box of the bolt.
    pub(crate) fn bounds(&self) -> Bounds {
        Bounds::new(
            self.position.x(),
            self.position.y() - SHOT_HEIGHT / 2.0,
            SHOT_WIDTH,
            SHOT_HEIGHT,
        )
    }
}

/// Secondary burst staggered around a final-life explosion.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Burst {
    pub(crate) center: Position,
    pub(crate) radius: f32,
    pub(crate) opacity: f32,
    /// Negative until the stagger delay elapses.
    pub(crate) elapsed: f32,
}

const BURST_COUNT: usize = 8;
const BURST_DISTANCE: f32 = 30.0;
const BURST_GROWTH: f32 = 200.0;
const BURST_STAGGER: f32 = 0.1;

/// Explosion variants chosen by whether the death consumed the final life.
#[derive(Clone, Debug)]
pub(crate) enum ExplosionVariant {
    /// Single small, fast-fading blast.
    Standard,
    /// Larger, slower blast ringed by staggered secondary bursts.
    Final { bursts: Vec<Burst> },
}

/// Expanding blast animated while the craft is dead.
#[derive(Clone, Debug)]
pub(crate) struct Explosion {
    pub(crate) center: Position,
    pub(crate) radius: f32,
    pub(crate) opacity: f32,
    pub(crate) variant: ExplosionVariant,
    growth_rate: f32,
    elapsed: f32,
}

impl Explosion {
    fn standard(center: Position) -> Self {
        Self {
            center,
            radius: 5.0,
            opacity: 1.0,
            variant: ExplosionVariant::Standard,
            growth_rate: 150.0,
            elapsed: 0.0,
        }
    }

    fn final_blast(center: Position) -> Self {
        let bursts = (0..BURST_COUNT)
            .map(|i| {
                let angle = i as f32 / BURST_COUNT as f32 * TAU;
                Burst {
                    center: center
                        .offset(angle.cos() * BURST_DISTANCE, angle.sin() * BURST_DISTANCE),
                    radius: 5.0,
                    opacity: 1.0,
                    elapsed: -(i as f32) * BURST_STAGGER,
                }
            })
            .collect();
        Self {
            center,
            radius: 10.0,
            opacity: 1.0,
            variant: ExplosionVariant::Final { bursts },
            growth_rate: 300.0,
            elapsed: 0.0,
        }
    }

    /// Advances the animation, returning `true` once fully faded.
    fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.radius += self.growth_rate * dt;

        match &mut self.variant {
            ExplosionVariant::Standard => {
                self.opacity = (1.0 - self.elapsed).max(0.0);
                self.opacity <= 0.0
            }
            ExplosionVariant::Final { bursts } => {
                // The final blast fades over three seconds while the ring of
                // secondary bursts plays out around it.
                self.opacity = (1.0 - self.elapsed / 3.0).max(0.0);
                for burst in bursts.iter_mut() {
                    burst.elapsed += dt;
                    if burst.elapsed > 0.0 {
                        burst.radius += BURST_GROWTH * dt;
                        burst.opacity = (1.0 - burst.elapsed / 2.0).max(0.0);
                    }
                }
                bursts.retain(|burst| burst.opacity > 0.0);
                bursts.is_empty() && self.opacity <= 0.0
            }
        }
    }
}

/// The player's craft.
#[derive(Debug)]
pub(crate) struct Player {
    position: Position,
    facing: Facing,
    is_dead: bool,
    is_respawned: bool,
    fading: bool,
    fade: f32,
    thrust: f32,
    fire_elapsed: Duration,
    shots: Vec<Shot>,
    explosion: Option<Explosion>,
}

impl Player {
    /// Creates a craft parked at the start position for the field.
    pub(crate) fn new(field: PlayField) -> Self {
        Self {
            position: start_position(field),
            facing: Facing::Right,
            is_dead: false,
            is_respawned: false,
            fading: false,
            fade: 1.0,
            thrust: THRUST_IDLE,
            fire_elapsed: FIRE_COOLDOWN,
            shots: Vec::new(),
            explosion: None,
        }
    }

    /// Per-frame update: explosion animation while dead, fade while leaving
    /// through a stargate, otherwise movement, shooting and shot advancement.
    pub(crate) fn update(
        &mut self,
        dt: Duration,
        input: &InputSnapshot,
        field: PlayField,
        out: &mut Vec<Event>,
    ) {
        let dtf = dt.as_secs_f32();

        if self.is_dead {
            if let Some(explosion) = &mut self.explosion {
                if explosion.advance(dtf) {
                    self.explosion = None;
                }
            }
            return;
        }

        if self.fading {
            self.fade = safe_unit(self.fade - FADE_RATE * dtf);
            return;
        }

        if input.reverse {
            self.facing = self.facing.flipped();
        }

        let forward = match self.facing {
            Facing::Right => input.move_right,
            Facing::Left => input.move_left,
        };
        let backward = match self.facing {
            Facing::Right => input.move_left,
            Facing::Left => input.move_right,
        };
        if forward {
            self.thrust = safe_unit(self.thrust + THRUST_RAMP * dtf);
        } else if backward {
            self.thrust = 0.0;
        } else {
            self.thrust = THRUST_IDLE;
        }

        let step = PLAYER_SPEED * dtf;
        let mut dx = 0.0;
        let mut dy = 0.0;
        if input.move_up {
            dy -= step;
        }
        if input.move_down {
            dy += step;
        }
        if input.move_left {
            dx -= step;
        }
        if input.move_right {
            dx += step;
        }
        self.position = Position::new(
            (self.position.x() + dx).clamp(0.0, field.width() - PLAYER_WIDTH),
            (self.position.y() + dy).clamp(0.0, field.height() - PLAYER_HEIGHT),
        );

        self.fire_elapsed = self.fire_elapsed.saturating_add(dt);
        if input.fire && self.fire_elapsed >= FIRE_COOLDOWN {
            self.fire_elapsed = Duration::ZERO;
            let muzzle_x = match self.facing {
                Facing::Right => self.position.x() + PLAYER_WIDTH,
                Facing::Left => self.position.x(),
            };
            self.shots.push(Shot::new(
                Position::new(muzzle_x, self.position.y() + PLAYER_HEIGHT / 2.0),
                self.facing,
            ));
            out.push(Event::ShotFired {
                source: ShotSource::Player,
            });
        }

        for shot in &mut self.shots {
            shot.trail.push_back(shot.position);
            while shot.trail.len() > SHOT_TRAIL_LENGTH {
                let _ = shot.trail.pop_front();
            }
            shot.position = shot
                .position
                .offset(SHOT_SPEED * dtf * shot.facing.sign(), 0.0);
        }
        self.shots
            .retain(|shot| shot.position.x() > -SHOT_WIDTH && shot.position.x() < field.width());
    }

    /// Marks the craft dead and spawns the matching explosion variant.
    ///
    /// `final_life` is decided by the caller from the already-decremented
    /// life count, so the variant never depends on read ordering. Repeated
    /// calls while already dead are no-ops.
    pub(crate) fn die(&mut self, final_life: bool) {
        if self.is_dead {
            return;
        }
        self.is_dead = true;
        let center = self.bounds().center();
        self.explosion = Some(if final_life {
            Explosion::final_blast(center)
        } else {
            Explosion::standard(center)
        });
    }

    /// Returns the craft to the start position with all flags cleared.
    pub(crate) fn reset(&mut self, field: PlayField) {
        self.position = start_position(field);
        self.shots.clear();
        self.is_dead = false;
        self.is_respawned = false;
        self.explosion = None;
        self.fade = 1.0;
        self.fading = false;
        self.thrust = THRUST_IDLE;
        self.fire_elapsed = FIRE_COOLDOWN;
    }

    /// Starts the stargate fade-out; movement stops until the next reset.
    pub(crate) fn start_fade_out(&mut self) {
        self.fading = true;
        self.fade = 1.0;
    }

    /// Collision box of the craft.
    pub(crate) fn bounds(&self) -> Bounds {
        Bounds::new(
            self.position.x(),
            self.position.y(),
            PLAYER_WIDTH,
            PLAYER_HEIGHT,
        )
    }

    pub(crate) const fn position(&self) -> Position {
        self.position
    }

    pub(crate) const fn facing(&self) -> Facing {
        self.facing
    }

    pub(crate) const fn is_dead(&self) -> bool {
        self.is_dead
    }

    pub(crate) const fn is_respawned(&self) -> bool {
        self.is_respawned
    }

    pub(crate) fn set_respawned(&mut self, respawned: bool) {
        self.is_respawned = respawned;
    }

    pub(crate) const fn fade(&self) -> f32 {
        self.fade
    }

    pub(crate) const fn thrust(&self) -> f32 {
        self.thrust
    }

    pub(crate) fn shots(&self) -> &[Shot] {
        &self.shots
    }

    pub(crate) fn shots_mut(&mut self) -> &mut Vec<Shot> {
        &mut self.shots
    }

    pub(crate) const fn explosion(&self) -> Option<&Explosion> {
        self.explosion.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}

fn start_position(field: PlayField) -> Position {
    Position::new(field.width() / 4.0, field.height() / 3.0)
}

fn safe_unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Player, FIRE_COOLDOWN, PLAYER_HEIGHT, THRUST_IDLE};
    use std::time::Duration;
    use viper_patrol_core::{Event, Facing, InputSnapshot, PlayField, ShotSource};

    fn field() -> PlayField {
        PlayField::new(1280.0, 720.0)
    }

    fn tick(player: &mut Player, input: InputSnapshot, out: &mut Vec<Event>) {
        player.update(Duration::from_millis(16), &input, field(), out);
    }

    #[test]
    fn movement_is_clamped_to_the_field() {
        let mut player = Player::new(field());
        let mut out = Vec::new();
        let input = InputSnapshot {
            move_up: true,
            ..InputSnapshot::default()
        };
        for _ in 0..10_000 {
            tick(&mut player, input, &mut out);
        }
        assert_eq!(player.position().y(), 0.0);

        let input = InputSnapshot {
            move_down: true,
            ..InputSnapshot::default()
        };
        for _ in 0..10_000 {
            tick(&mut player, input, &mut out);
        }
        assert_eq!(player.position().y(), field().height() - PLAYER_HEIGHT);
    }

    #[test]
    fn fire_is_cooldown_gated() {
        let mut player = Player::new(field());
        let mut out = Vec::new();
        let input = InputSnapshot {
            fire: true,
            ..InputSnapshot::default()
        };

        tick(&mut player, input, &mut out);
        assert_eq!(player.shots().len(), 1);
        assert!(matches!(
            out.as_slice(),
            [Event::ShotFired {
                source: ShotSource::Player
            }]
        ));

        // 16ms later the cooldown has not elapsed.
        tick(&mut player, input, &mut out);
        assert_eq!(player.shots().len(), 1);

        player.update(FIRE_COOLDOWN, &input, field(), &mut out);
        assert_eq!(player.shots().len(), 2);
    }

    #[test]
    fn shots_expire_off_the_horizontal_bounds() {
        let mut player = Player::new(field());
        let mut out = Vec::new();
        let fire = InputSnapshot {
            fire: true,
            ..InputSnapshot::default()
        };
        tick(&mut player, fire, &mut out);

        let idle = InputSnapshot::default();
        for _ in 0..300 {
            tick(&mut player, idle, &mut out);
        }
        assert!(player.shots().is_empty());
    }

    #[test]
    fn reverse_input_flips_facing_on_the_edge() {
        let mut player = Player::new(field());
        let mut out = Vec::new();
        assert_eq!(player.facing(), Facing::Right);

        let reverse = InputSnapshot {
            reverse: true,
            ..InputSnapshot::default()
        };
        tick(&mut player, reverse, &mut out);
        assert_eq!(player.facing(), Facing::Left);
        tick(&mut player, reverse, &mut out);
        assert_eq!(player.facing(), Facing::Right);
    }

    #[test]
    fn thrust_ramps_forward_and_drops_backward() {
        let mut player = Player::new(field());
        let mut out = Vec::new();

        let forward = InputSnapshot {
            move_right: true,
            ..InputSnapshot::default()
        };
        for _ in 0..120 {
            tick(&mut player, forward, &mut out);
        }
        assert_eq!(player.thrust(), 1.0);

        let backward = InputSnapshot {
            move_left: true,
            ..InputSnapshot::default()
        };
        tick(&mut player, backward, &mut out);
        assert_eq!(player.thrust(), 0.0);

        tick(&mut player, InputSnapshot::default(), &mut out);
        assert_eq!(player.thrust(), THRUST_IDLE);
    }

    #[test]
    fn die_is_idempotent_and_picks_the_variant() {
        let mut player = Player::new(field());
        player.die(true);
        assert!(player.is_dead());
        let first = format!("{:?}", player.explosion());

        // A duplicate death notification must not restart the animation.
        player.die(false);
        assert_eq!(format!("{:?}", player.explosion()), first);
    }

    #[test]
    fn final_explosion_outlives_the_standard_one() {
        let mut standard = Player::new(field());
        standard.die(false);
        let mut finale = Player::new(field());
        finale.die(true);

        let mut out = Vec::new();
        let idle = InputSnapshot::default();
        for _ in 0..80 {
            standard.update(Duration::from_millis(16), &idle, field(), &mut out);
            finale.update(Duration::from_millis(16), &idle, field(), &mut out);
        }

        assert!(standard.explosion().is_none());
        assert!(finale.explosion().is_some());
    }

    #[test]
    fn fade_out_freezes_movement_and_reaches_zero() {
        let mut player = Player::new(field());
        let mut out = Vec::new();
        player.start_fade_out();
        let before = player.position();

        let input = InputSnapshot {
            move_right: true,
            fire: true,
            ..InputSnapshot::default()
        };
        for _ in 0..200 {
            tick(&mut player, input, &mut out);
        }

        assert_eq!(player.position(), before);
        assert_eq!(player.fade(), 0.0);
        assert!(out.is_empty());
    }

    #[test]
    fn reset_clears_death_state() {
        let mut player = Player::new(field());
        player.die(false);
        player.reset(field());
        assert!(!player.is_dead());
        assert!(player.explosion().is_none());
        assert_eq!(player.fade(), 1.0);
        assert!(player.shots().is_empty());
    }
}
