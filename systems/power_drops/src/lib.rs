#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic power-up drop system.
//!
//! Two independent spawn tracks: a periodic, level-scaled shield/free-life
//! cadence, and a once-per-level stargate released after the play clock
//! passes a fixed threshold. The system owns the per-level clock so the
//! world never carries a redundant copy; it learns about level changes and
//! restarts from the event stream.

use std::time::Duration;

use viper_patrol_core::{Command, Event, GameState, PowerUpKind};

const RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const RNG_INCREMENT: u64 = 1;

/// Default cadence between periodic drops on level one.
pub const BASE_DROP_INTERVAL: Duration = Duration::from_secs(15);
/// Per-level play time after which the stargate is released.
pub const STARGATE_THRESHOLD: Duration = Duration::from_secs(30);
/// Fractional cadence speed-up applied per level beyond the first.
const LEVEL_RAMP: f32 = 0.1;
/// Probability that a periodic drop is a shield rather than a free life.
const SHIELD_CHANCE: f32 = 0.7;

/// Configuration parameters required to construct the drop system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    drop_interval: Duration,
    stargate_threshold: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided cadence, threshold
    /// and seed.
    #[must_use]
    pub const fn new(drop_interval: Duration, stargate_threshold: Duration, rng_seed: u64) -> Self {
        Self {
            drop_interval,
            stargate_threshold,
            rng_seed,
        }
    }
}

/// Pure system that deterministically emits power-up spawn commands.
#[derive(Debug)]
pub struct PowerDrops {
    drop_interval: Duration,
    stargate_threshold: Duration,
    drop_accumulator: Duration,
    level_clock: Duration,
    rng_state: u64,
}

impl PowerDrops {
    /// Creates a new drop system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            drop_interval: config.drop_interval,
            stargate_threshold: config.stargate_threshold,
            drop_accumulator: Duration::ZERO,
            level_clock: Duration::ZERO,
            rng_state: config.rng_seed,
        }
    }

    /// Play time accumulated toward the stargate threshold this level.
    #[must_use]
    pub const fn level_clock(&self) -> Duration {
        self.level_clock
    }

    /// Consumes events and read-only session values to emit spawn commands.
    ///
    /// `stargate_open` reports whether a stargate drop or vortex is already
    /// live in the world; while it is, the threshold track stays silent.
    pub fn handle(
        &mut self,
        events: &[Event],
        state: GameState,
        level: u32,
        stargate_open: bool,
        out: &mut Vec<Command>,
    ) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    accumulated = accumulated.saturating_add(*dt);
                }
                Event::LevelAdvanced { .. } | Event::SessionRestarted => {
                    self.level_clock = Duration::ZERO;
                    self.drop_accumulator = Duration::ZERO;
                }
                Event::StateChanged { .. } => {
                    self.drop_accumulator = Duration::ZERO;
                }
                _ => {}
            }
        }

        if state != GameState::Playing || accumulated.is_zero() {
            return;
        }

        self.level_clock = self.level_clock.saturating_add(accumulated);
        self.drop_accumulator = self.drop_accumulator.saturating_add(accumulated);

        let interval = self.scaled_interval(level);
        if !interval.is_zero() {
            while self.drop_accumulator >= interval {
                self.drop_accumulator -= interval;
                let kind = self.next_drop_kind();
                let altitude = self.next_fraction();
                out.push(Command::SpawnPowerUp { kind, altitude });
            }
        }

        if self.level_clock >= self.stargate_threshold && !stargate_open {
            let altitude = self.next_fraction();
            out.push(Command::SpawnPowerUp {
                kind: PowerUpKind::Stargate,
                altitude,
            });
        }
    }

    fn scaled_interval(&self, level: u32) -> Duration {
        let divisor = 1.0 + level.saturating_sub(1) as f32 * LEVEL_RAMP;
        Duration::from_secs_f32(self.drop_interval.as_secs_f32() / divisor)
    }

    fn advance_rng(&mut self) -> u64 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(RNG_MULTIPLIER)
            .wrapping_add(RNG_INCREMENT);
        self.rng_state
    }

    fn next_fraction(&mut self) -> f32 {
        (self.advance_rng() >> 40) as f32 / (1u64 << 24) as f32
    }

    fn next_drop_kind(&mut self) -> PowerUpKind {
        if self.next_fraction() < SHIELD_CHANCE {
            PowerUpKind::Shield
        } else {
            PowerUpKind::FreeLife
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, PowerDrops, BASE_DROP_INTERVAL, STARGATE_THRESHOLD};
    use std::time::Duration;

    #[test]
    fn interval_scales_with_level() {
        let drops = PowerDrops::new(Config::new(BASE_DROP_INTERVAL, STARGATE_THRESHOLD, 1));
        assert_eq!(drops.scaled_interval(1), BASE_DROP_INTERVAL);
        assert_eq!(drops.scaled_interval(6), Duration::from_secs(10));
    }

    #[test]
    fn shield_chance_dominates_the_draw() {
        let mut drops = PowerDrops::new(Config::new(BASE_DROP_INTERVAL, STARGATE_THRESHOLD, 77));
        let mut shields = 0;
        for _ in 0..1000 {
            if drops.next_drop_kind() == viper_patrol_core::PowerUpKind::Shield {
                shields += 1;
            }
        }
        assert!((550..850).contains(&shields), "draw far from 70%: {shields}");
    }
}
