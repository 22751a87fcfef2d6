//! Hostile craft: spawn placement, pursuit AI, cannons and small blasts.

use std::collections::VecDeque;
use std::f32::consts::TAU;
use std::time::Duration;

use viper_patrol_core::{
    Bounds, EnemyFate, EnemyId, EnemyKind, Event, Facing, PlayField, Position, ShotSource,
};

use crate::player::{Shot, PLAYER_HEIGHT};
use crate::terrain::Terrain;
use crate::Rng;

/// Distance past the field edge where craft spawn.
const SPAWN_MARGIN: f32 = 50.0;
/// Distance past the field edge where craft are silently removed.
const OFFSCREEN_MARGIN: f32 = 100.0;
/// Buffer from the top and bottom of the field that craft never enter.
const VERTICAL_BAND: f32 = 50.0;
/// Clearance above the ground below which a craft counts as crashed.
const TERRAIN_CLEARANCE: f32 = 50.0;
/// Delay between consecutive cannon shots.
const FIRE_INTERVAL: Duration = Duration::from_millis(500);
/// Pursuit deadzone for tight direct homing.
const DIRECT_DEADZONE: f32 = 2.0;
/// Pursuit deadzone for loose offset tracking.
const OFFSET_DEADZONE: f32 = 5.0;
/// Per-frame damping applied inside the direct-homing deadzone.
const DIRECT_DAMPING: f32 = 0.95;
/// Per-frame damping applied inside the offset-tracking deadzone.
const OFFSET_DAMPING: f32 = 0.8;
/// Full width of the randomised tracking offset band.
const OFFSET_RANGE: f32 = 100.0;
/// Shortest interval before the tracking offset re-randomises.
const RETARGET_MIN: f32 = 1.0;
/// Additional random span added to the retarget interval.
const RETARGET_SPAN: f32 = 2.0;
/// Width of an enemy shot's collision box.
const SHOT_WIDTH: f32 = 8.0;
/// Height of an enemy shot's collision box.
const SHOT_HEIGHT: f32 = 6.0;
/// Longest trail retained behind a plasma shot.
const SHOT_TRAIL_LENGTH: usize = 10;
/// Blast growth in field units per second.
const BLAST_GROWTH: f32 = 100.0;

/// Vertical pursuit behaviour, discriminated per craft kind.
#[derive(Clone, Copy, Debug)]
enum Tracking {
    /// Homes directly on the player's vertical centre.
    Direct,
    /// Tracks a drifting offset from the player, re-randomised periodically.
    Offset {
        offset: f32,
        elapsed: f32,
        interval: f32,
    },
}

/// A single hostile craft.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) position: Position,
    pub(crate) facing: Facing,
    pub(crate) spin: f32,
    vertical_speed: f32,
    tracking: Tracking,
    fire_elapsed: Duration,
}

impl Enemy {
    /// Collision box of the craft.
    pub(crate) fn bounds(&self) -> Bounds {
        let (width, height) = self.kind.footprint();
        Bounds::new(self.position.x(), self.position.y(), width, height)
    }
}

/// Projectile fired by an enemy cannon.
#[derive(Clone, Debug)]
pub(crate) struct EnemyShot {
    pub(crate) position: Position,
    pub(crate) facing: Facing,
    pub(crate) plasma: bool,
    pub(crate) trail: VecDeque<Position>,
    speed: f32,
}

impl EnemyShot {
    fn bounds(&self) -> Bounds {
        Bounds::new(
            self.position.x(),
            self.position.y() - SHOT_HEIGHT / 2.0,
            SHOT_WIDTH,
            SHOT_HEIGHT,
        )
    }
}

/// Small expanding blast left behind by a destroyed craft.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Blast {
    pub(crate) center: Position,
    pub(crate) radius: f32,
    pub(crate) opacity: f32,
}

/// The population of hostile craft, their shots and blasts.
#[derive(Debug, Default)]
pub(crate) struct EnemyForce {
    enemies: Vec<Enemy>,
    shots: Vec<EnemyShot>,
    blasts: Vec<Blast>,
    next_id: u32,
}

impl EnemyForce {
    /// Places a craft just off-screen on the side opposite the player's
    /// heading, moving across the field, in the upper spawn band.
    pub(crate) fn spawn(
        &mut self,
        kind: EnemyKind,
        altitude: f32,
        player_facing: Facing,
        field: PlayField,
        rng: &mut Rng,
        out: &mut Vec<Event>,
    ) -> EnemyId {
        let (width, height) = kind.footprint();
        let x = match player_facing {
            Facing::Right => field.width() + SPAWN_MARGIN,
            Facing::Left => -width - SPAWN_MARGIN,
        };
        let band = (field.height() / 2.0 - height - VERTICAL_BAND).max(0.0);
        let y = VERTICAL_BAND + altitude.clamp(0.0, 1.0) * band;

        let tracking = if kind.spins() {
            Tracking::Direct
        } else {
            Tracking::Offset {
                offset: (rng.next_fraction() - 0.5) * OFFSET_RANGE,
                elapsed: 0.0,
                interval: RETARGET_MIN + rng.next_fraction() * RETARGET_SPAN,
            }
        };

        let id = EnemyId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.enemies.push(Enemy {
            id,
            kind,
            position: Position::new(x, y),
            facing: player_facing.flipped(),
            spin: 0.0,
            vertical_speed: 0.0,
            tracking,
            fire_elapsed: Duration::ZERO,
        });
        out.push(Event::EnemySpawned { enemy: id, kind });
        id
    }

    /// Advances every craft, shot and blast; returns points scored by
    /// terrain impacts.
    pub(crate) fn advance(
        &mut self,
        dt: Duration,
        player_y: f32,
        terrain: &Terrain,
        field: PlayField,
        rng: &mut Rng,
        out: &mut Vec<Event>,
    ) -> u32 {
        let dtf = dt.as_secs_f32();
        let mut points = 0;
        let Self {
            enemies,
            shots,
            blasts,
            ..
        } = self;

        enemies.retain_mut(|enemy| {
            let (width, height) = enemy.kind.footprint();
            enemy.position = enemy
                .position
                .offset(enemy.kind.cruise_speed() * dtf * enemy.facing.sign(), 0.0);

            let (target_y, deadzone, damping) = match &mut enemy.tracking {
                Tracking::Direct => (
                    player_y + PLAYER_HEIGHT / 2.0 - height / 2.0,
                    DIRECT_DEADZONE,
                    DIRECT_DAMPING,
                ),
                Tracking::Offset {
                    offset,
                    elapsed,
                    interval,
                } => {
                    *elapsed += dtf;
                    if *elapsed >= *interval {
                        *offset = (rng.next_fraction() - 0.5) * OFFSET_RANGE;
                        *elapsed = 0.0;
                        *interval = RETARGET_MIN + rng.next_fraction() * RETARGET_SPAN;
                    }
                    (player_y + *offset, OFFSET_DEADZONE, OFFSET_DAMPING)
                }
            };

            let dy = target_y - enemy.position.y();
            if dy.abs() > deadzone {
                enemy.vertical_speed += dy.signum() * enemy.kind.vertical_acceleration() * dtf;
                enemy.vertical_speed = enemy.vertical_speed.clamp(
                    -enemy.kind.max_vertical_speed(),
                    enemy.kind.max_vertical_speed(),
                );
                enemy.position = enemy.position.offset(0.0, enemy.vertical_speed * dtf);
            } else {
                enemy.vertical_speed *= damping;
            }

            let max_y = field.height() - height - VERTICAL_BAND;
            enemy.position = Position::new(
                enemy.position.x(),
                enemy.position.y().clamp(VERTICAL_BAND, max_y.max(VERTICAL_BAND)),
            );

            if enemy.kind.spins() {
                enemy.spin = (enemy.spin - enemy.kind.spin_rate() * dtf) % TAU;
            }

            let center_x = enemy.position.x() + width / 2.0;
            let ground = field.height() - terrain.height_at(center_x) - TERRAIN_CLEARANCE;
            if enemy.position.y() + height > ground {
                blasts.push(Blast {
                    center: enemy.bounds().center(),
                    radius: 5.0,
                    opacity: 1.0,
                });
                points += enemy.kind.points();
                out.push(Event::EnemyDestroyed {
                    enemy: enemy.id,
                    kind: enemy.kind,
                    fate: EnemyFate::TerrainImpact,
                    points: enemy.kind.points(),
                });
                return false;
            }

            if enemy.kind.fires() {
                enemy.fire_elapsed = enemy.fire_elapsed.saturating_add(dt);
                if enemy.fire_elapsed >= FIRE_INTERVAL {
                    enemy.fire_elapsed = Duration::ZERO;
                    let muzzle_x = match enemy.facing {
                        Facing::Right => enemy.position.x() + width,
                        Facing::Left => enemy.position.x(),
                    };
                    shots.push(EnemyShot {
                        position: Position::new(muzzle_x, enemy.position.y() + height / 2.0),
                        facing: enemy.facing,
                        plasma: enemy.kind == EnemyKind::Striker,
                        trail: VecDeque::with_capacity(SHOT_TRAIL_LENGTH),
                        speed: enemy.kind.shot_speed(),
                    });
                    out.push(Event::ShotFired {
                        source: ShotSource::Enemy { kind: enemy.kind },
                    });
                }
            }

            let gone = match enemy.facing {
                Facing::Right => enemy.position.x() > field.width() + width + OFFSCREEN_MARGIN,
                Facing::Left => enemy.position.x() < -width - OFFSCREEN_MARGIN,
            };
            if gone {
                out.push(Event::EnemyDestroyed {
                    enemy: enemy.id,
                    kind: enemy.kind,
                    fate: EnemyFate::LeftField,
                    points: 0,
                });
                return false;
            }
            true
        });

        shots.retain_mut(|shot| {
            shot.trail.push_back(shot.position);
            while shot.trail.len() > SHOT_TRAIL_LENGTH {
                let _ = shot.trail.pop_front();
            }
            shot.position = shot.position.offset(shot.speed * dtf * shot.facing.sign(), 0.0);
            shot.position.x() > -SHOT_WIDTH - OFFSCREEN_MARGIN
                && shot.position.x() < field.width() + OFFSCREEN_MARGIN
        });

        blasts.retain_mut(|blast| {
            blast.radius += BLAST_GROWTH * dtf;
            blast.opacity -= dtf;
            blast.opacity > 0.0
        });

        points
    }

    /// Removes craft overlapping the player; returns whether any hit and the
    /// points scored.
    pub(crate) fn collide_player(
        &mut self,
        player_bounds: &Bounds,
        out: &mut Vec<Event>,
    ) -> (bool, u32) {
        let mut hit = false;
        let mut points = 0;
        let Self {
            enemies, blasts, ..
        } = self;

        enemies.retain(|enemy| {
            if enemy.bounds().overlaps(player_bounds) {
                hit = true;
                points += enemy.kind.points();
                blasts.push(Blast {
                    center: enemy.bounds().center(),
                    radius: 5.0,
                    opacity: 1.0,
                });
                out.push(Event::EnemyDestroyed {
                    enemy: enemy.id,
                    kind: enemy.kind,
                    fate: EnemyFate::RammedPlayer,
                    points: enemy.kind.points(),
                });
                return false;
            }
            true
        });

        (hit, points)
    }

    /// Removes enemy shots overlapping the player; returns whether any hit.
    pub(crate) fn shots_hit_player(&mut self, player_bounds: &Bounds) -> bool {
        let mut hit = false;
        self.shots.retain(|shot| {
            if shot.bounds().overlaps(player_bounds) {
                hit = true;
                return false;
            }
            true
        });
        hit
    }

    /// Resolves player shots against craft, removing both on impact.
    /// Returns the points scored.
    pub(crate) fn absorb_player_shots(
        &mut self,
        player_shots: &mut Vec<Shot>,
        out: &mut Vec<Event>,
    ) -> u32 {
        let mut points = 0;
        let Self {
            enemies, blasts, ..
        } = self;

        player_shots.retain(|shot| {
            let shot_bounds = shot.bounds();
            let mut absorbed = false;
            enemies.retain(|enemy| {
                if !absorbed && enemy.bounds().overlaps(&shot_bounds) {
                    absorbed = true;
                    points += enemy.kind.points();
                    blasts.push(Blast {
                        center: enemy.bounds().center(),
                        radius: 5.0,
                        opacity: 1.0,
                    });
                    out.push(Event::EnemyDestroyed {
                        enemy: enemy.id,
                        kind: enemy.kind,
                        fate: EnemyFate::ShotDown,
                        points: enemy.kind.points(),
                    });
                    return false;
                }
                true
            });
            !absorbed
        });

        points
    }

    /// Removes every craft, shot and blast.
    pub(crate) fn clear(&mut self) {
        self.enemies.clear();
        self.shots.clear();
        self.blasts.clear();
    }

    pub(crate) fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub(crate) fn shots(&self) -> &[EnemyShot] {
        &self.shots
    }

    pub(crate) fn blasts(&self) -> &[Blast] {
        &self.blasts
    }

    #[cfg(test)]
    pub(crate) fn enemies_mut(&mut self) -> &mut Vec<Enemy> {
        &mut self.enemies
    }
}
