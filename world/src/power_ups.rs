//! Power-up drops and the stargate level-transition effect.

use std::f32::consts::{PI, TAU};

use viper_patrol_core::{Bounds, Event, Facing, PlayField, Position, PowerUpId, PowerUpKind};

use crate::collision::circle_overlaps_rect;
use crate::terrain::Terrain;

/// Side length of a shield or free-life drop.
const DROP_SIZE: f32 = 48.0;
/// Stargate sprite size as a fraction of the field width.
const STARGATE_SCALE: f32 = 0.15;
/// Distance past the field edge where drops spawn.
const SPAWN_MARGIN: f32 = 50.0;
/// Distance past the field edge where drops are silently removed.
const OFFSCREEN_MARGIN: f32 = 100.0;
/// Buffer from the top of the field for stargate placement.
const VERTICAL_BAND: f32 = 50.0;
/// Fraction of the stargate sprite that acts as the vortex hot-zone.
const VORTEX_CORE_FRACTION: f32 = 0.35;
/// Stargate ring rotation in radians per second.
const STARGATE_SPIN: f32 = PI;
/// Vortex rotation in radians per second.
const VORTEX_SPIN: f32 = TAU;
/// Radial growth of the open vortex in field units per second.
const EFFECT_GROWTH: f32 = 600.0;
/// Seconds into the effect when the level-up banner appears.
const BANNER_DELAY: f32 = 2.0;
/// Seconds into the effect when the visuals start fading.
const FADE_DELAY: f32 = 3.0;
/// Opacity lost per second once the fade starts.
const FADE_RATE: f32 = 0.7;

/// A collectible drop drifting across the field.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PowerUp {
    pub(crate) id: PowerUpId,
    pub(crate) kind: PowerUpKind,
    pub(crate) position: Position,
    pub(crate) size: f32,
    pub(crate) facing: Facing,
    pub(crate) rotation: f32,
    pub(crate) vortex_rotation: f32,
}

impl PowerUp {
    /// Collision box of the drop.
    pub(crate) fn bounds(&self) -> Bounds {
        Bounds::new(self.position.x(), self.position.y(), self.size, self.size)
    }
}

/// Geometry captured from a drop at the moment of collection.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Collected {
    pub(crate) kind: PowerUpKind,
    pub(crate) center: Position,
    pub(crate) size: f32,
    pub(crate) rotation: f32,
    pub(crate) vortex_rotation: f32,
}

/// Transient vortex visual between stargate collection and the next level.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StargateEffect {
    pub(crate) center: Position,
    pub(crate) size: f32,
    pub(crate) radius: f32,
    pub(crate) opacity: f32,
    pub(crate) rotation: f32,
    pub(crate) vortex_rotation: f32,
    pub(crate) elapsed: f32,
    pub(crate) level_up_started: bool,
}

/// The population of drops plus the optional stargate effect.
#[derive(Debug, Default)]
pub(crate) struct PowerUpDrops {
    drops: Vec<PowerUp>,
    effect: Option<StargateEffect>,
    next_id: u32,
}

impl PowerUpDrops {
    /// Places a drop just off-screen on the side opposite the player's
    /// heading. A stargate is refused while another stargate or an open
    /// vortex is already present.
    pub(crate) fn spawn(
        &mut self,
        kind: PowerUpKind,
        altitude: f32,
        player_facing: Facing,
        field: PlayField,
        out: &mut Vec<Event>,
    ) -> Option<PowerUpId> {
        if kind == PowerUpKind::Stargate && self.stargate_open() {
            return None;
        }

        let size = match kind {
            PowerUpKind::Stargate => field.width() * STARGATE_SCALE,
            PowerUpKind::Shield | PowerUpKind::FreeLife => DROP_SIZE,
        };
        let x = match player_facing {
            Facing::Right => field.width() + SPAWN_MARGIN,
            Facing::Left => -size - SPAWN_MARGIN,
        };
        let band = (field.height() / 2.0 - size - VERTICAL_BAND).max(0.0);
        let y = VERTICAL_BAND + altitude.clamp(0.0, 1.0) * band;

        let id = PowerUpId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.drops.push(PowerUp {
            id,
            kind,
            position: Position::new(x, y),
            size,
            facing: player_facing.flipped(),
            rotation: 0.0,
            vortex_rotation: 0.0,
        });
        out.push(Event::PowerUpSpawned { power_up: id, kind });
        Some(id)
    }

    /// Drifts every drop across the field, culling ground impacts and
    /// off-screen exits.
    pub(crate) fn advance(&mut self, dt: f32, terrain: &Terrain, field: PlayField) {
        self.drops.retain_mut(|drop| {
            drop.position = drop
                .position
                .offset(drop.kind.drift_speed() * dt * drop.facing.sign(), 0.0);

            if drop.kind.spins() {
                drop.rotation = (drop.rotation + STARGATE_SPIN * dt) % TAU;
                drop.vortex_rotation = (drop.vortex_rotation + VORTEX_SPIN * dt) % TAU;
            }

            // Stargates hover over the terrain; ordinary drops crash into it.
            if drop.kind != PowerUpKind::Stargate {
                let ground = field.height() - terrain.height_at(drop.position.x() + drop.size / 2.0);
                if drop.position.y() + drop.size > ground {
                    return false;
                }
            }

            match drop.facing {
                Facing::Right => drop.position.x() <= field.width() + drop.size + OFFSCREEN_MARGIN,
                Facing::Left => drop.position.x() >= -drop.size - OFFSCREEN_MARGIN,
            }
        });
    }

    /// Removes drops touched by the player, using the reduced vortex
    /// hot-zone for stargates, and reports what was collected.
    pub(crate) fn collect(&mut self, player_bounds: &Bounds, out: &mut Vec<Event>) -> Vec<Collected> {
        let mut collected = Vec::new();
        self.drops.retain(|drop| {
            let touched = match drop.kind {
                PowerUpKind::Stargate => {
                    let core = drop.size / 2.0 * VORTEX_CORE_FRACTION;
                    circle_overlaps_rect(drop.bounds().center(), core, player_bounds)
                }
                PowerUpKind::Shield | PowerUpKind::FreeLife => {
                    drop.bounds().overlaps(player_bounds)
                }
            };
            if touched {
                collected.push(Collected {
                    kind: drop.kind,
                    center: drop.bounds().center(),
                    size: drop.size,
                    rotation: drop.rotation,
                    vortex_rotation: drop.vortex_rotation,
                });
                out.push(Event::PowerUpCollected {
                    power_up: drop.id,
                    kind: drop.kind,
                });
                return false;
            }
            true
        });
        collected
    }

    /// Opens the vortex from a collected stargate, freezing out every other
    /// drop.
    pub(crate) fn open_stargate(&mut self, collected: Collected) {
        self.drops.clear();
        self.effect = Some(StargateEffect {
            center: collected.center,
            size: collected.size,
            radius: collected.size / 2.0,
            opacity: 1.0,
            rotation: collected.rotation,
            vortex_rotation: collected.vortex_rotation,
            elapsed: 0.0,
            level_up_started: false,
        });
    }

    /// Advances the open vortex: expansion, spin, the banner beat, and the
    /// fade that only starts after the banner has visibly appeared.
    pub(crate) fn advance_effect(&mut self, dt: f32, field: PlayField) {
        let Some(effect) = &mut self.effect else {
            return;
        };

        effect.elapsed += dt;
        effect.rotation = (effect.rotation + STARGATE_SPIN * dt) % TAU;
        effect.vortex_rotation = (effect.vortex_rotation + VORTEX_SPIN * dt) % TAU;
        effect.radius = (effect.radius + EFFECT_GROWTH * dt).min(field.diagonal() / 2.0);

        if effect.elapsed >= BANNER_DELAY {
            effect.level_up_started = true;
        }
        if effect.elapsed >= FADE_DELAY {
            effect.opacity = (effect.opacity - FADE_RATE * dt).max(0.0);
        }
    }

    /// Whether a stargate drop or an open vortex is already present.
    pub(crate) fn stargate_open(&self) -> bool {
        self.effect.is_some()
            || self
                .drops
                .iter()
                .any(|drop| drop.kind == PowerUpKind::Stargate)
    }

    /// Removes every drop without touching the effect.
    pub(crate) fn clear_drops(&mut self) {
        self.drops.clear();
    }

    /// Tears down the stargate effect.
    pub(crate) fn clear_effect(&mut self) {
        self.effect = None;
    }

    pub(crate) fn drops(&self) -> &[PowerUp] {
        &self.drops
    }

    pub(crate) const fn effect(&self) -> Option<&StargateEffect> {
        self.effect.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn drops_mut(&mut self) -> &mut Vec<PowerUp> {
        &mut self.drops
    }
}

#[cfg(test)]
mod tests {
    use super::{PowerUpDrops, BANNER_DELAY, FADE_DELAY};
    use crate::terrain::Terrain;
    use std::time::Duration;
    use viper_patrol_core::{Bounds, Event, Facing, PlayField, Position, PowerUpKind};

    const SEED: u64 = 0x5eed;

    fn field() -> PlayField {
        PlayField::new(1280.0, 720.0)
    }

    fn spawn(drops: &mut PowerUpDrops, kind: PowerUpKind) -> Vec<Event> {
        let mut out = Vec::new();
        let _ = drops.spawn(kind, 0.5, Facing::Right, field(), &mut out);
        out
    }

    #[test]
    fn drops_spawn_opposite_the_player_heading() {
        let mut drops = PowerUpDrops::default();
        let out = spawn(&mut drops, PowerUpKind::Shield);
        let drop = drops.drops()[0];
        assert!(drop.position.x() > field().width());
        assert_eq!(drop.facing, Facing::Left);
        assert!(matches!(out.as_slice(), [Event::PowerUpSpawned { .. }]));
    }

    #[test]
    fn second_stargate_is_refused_while_one_is_live() {
        let mut drops = PowerUpDrops::default();
        let mut out = Vec::new();
        assert!(drops
            .spawn(PowerUpKind::Stargate, 0.2, Facing::Right, field(), &mut out)
            .is_some());
        assert!(drops
            .spawn(PowerUpKind::Stargate, 0.8, Facing::Right, field(), &mut out)
            .is_none());
        assert_eq!(drops.drops().len(), 1);
    }

    #[test]
    fn stargate_collection_uses_the_reduced_hot_zone() {
        let mut drops = PowerUpDrops::default();
        let _ = spawn(&mut drops, PowerUpKind::Stargate);
        let size = drops.drops()[0].size;
        drops.drops_mut()[0].position = Position::new(400.0, 200.0);

        // Touching only the sprite's outer rim must not collect.
        let rim = Bounds::new(400.0 - 20.0, 200.0, 20.0, 20.0);
        let mut out = Vec::new();
        assert!(drops.collect(&rim, &mut out).is_empty());

        // Reaching the vortex core does.
        let core = Bounds::new(400.0 + size / 2.0 - 10.0, 200.0 + size / 2.0 - 10.0, 20.0, 20.0);
        let collected = drops.collect(&core, &mut out);
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].kind, PowerUpKind::Stargate);
    }

    #[test]
    fn opening_the_stargate_clears_other_drops() {
        let mut drops = PowerUpDrops::default();
        let _ = spawn(&mut drops, PowerUpKind::Shield);
        let _ = spawn(&mut drops, PowerUpKind::FreeLife);
        let _ = spawn(&mut drops, PowerUpKind::Stargate);
        drops.drops_mut().retain(|d| d.kind == PowerUpKind::Stargate);
        let stargate = drops.drops()[0];
        drops.drops_mut()[0].position = Position::new(400.0, 200.0);

        let core = Bounds::new(
            400.0 + stargate.size / 2.0 - 5.0,
            200.0 + stargate.size / 2.0 - 5.0,
            10.0,
            10.0,
        );
        let mut out = Vec::new();
        let collected = drops.collect(&core, &mut out);
        drops.open_stargate(collected[0]);

        assert!(drops.drops().is_empty());
        assert!(drops.effect().is_some());
        assert!(drops.stargate_open());
    }

    #[test]
    fn effect_fades_only_after_the_banner_beat() {
        let mut drops = PowerUpDrops::default();
        let _ = spawn(&mut drops, PowerUpKind::Stargate);
        drops.drops_mut()[0].position = Position::new(400.0, 200.0);
        let size = drops.drops()[0].size;
        let core = Bounds::new(
            400.0 + size / 2.0 - 5.0,
            200.0 + size / 2.0 - 5.0,
            10.0,
            10.0,
        );
        let mut out = Vec::new();
        let collected = drops.collect(&core, &mut out);
        drops.open_stargate(collected[0]);

        let step = 0.1;
        let mut elapsed = 0.0;
        while elapsed < BANNER_DELAY - step {
            drops.advance_effect(step, field());
            elapsed += step;
            let effect = drops.effect().expect("effect alive");
            assert!(!effect.level_up_started);
            assert_eq!(effect.opacity, 1.0);
        }
        while elapsed < FADE_DELAY - step {
            drops.advance_effect(step, field());
            elapsed += step;
            assert_eq!(drops.effect().expect("effect alive").opacity, 1.0);
        }
        drops.advance_effect(0.5, field());
        let effect = drops.effect().expect("effect alive");
        assert!(effect.level_up_started);
        assert!(effect.opacity < 1.0);
        assert!(effect.radius <= field().diagonal() / 2.0);
    }

    #[test]
    fn ordinary_drops_crash_into_terrain_but_stargates_hover() {
        let mut drops = PowerUpDrops::default();
        let _ = spawn(&mut drops, PowerUpKind::Shield);
        let _ = spawn(&mut drops, PowerUpKind::Stargate);
        for drop in drops.drops_mut().iter_mut() {
            drop.position = Position::new(600.0, 700.0);
        }

        let terrain = Terrain::new(field(), SEED);
        drops.advance(Duration::from_millis(16).as_secs_f32(), &terrain, field());

        assert_eq!(drops.drops().len(), 1);
        assert_eq!(drops.drops()[0].kind, PowerUpKind::Stargate);
    }
}
