#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that converts elapsed play time into enemy
//! spawn commands.
//!
//! The system never touches the world: it consumes the event stream plus a
//! few read-only session values and emits [`Command::SpawnEnemy`] batches.
//! The world decides placement; this system decides cadence and variant.

use std::time::Duration;

use viper_patrol_core::{Command, EnemyKind, Event, GameState};

const RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const RNG_INCREMENT: u64 = 1;

/// Default cadence between spawns on level one.
pub const BASE_SPAWN_INTERVAL: Duration = Duration::from_secs(2);
/// Hard floor the level scaling can never push the cadence below.
const MIN_INTERVAL: Duration = Duration::from_millis(500);
/// Fractional cadence speed-up applied per level beyond the first.
const LEVEL_RAMP: f32 = 0.1;

/// Relative spawn weights per craft variant.
const SPAWN_WEIGHTS: [(EnemyKind, u64); 4] = [
    (EnemyKind::Drone, 40),
    (EnemyKind::Killer, 30),
    (EnemyKind::Spike, 15),
    (EnemyKind::Striker, 15),
];

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    base_interval: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided cadence and seed.
    #[must_use]
    pub const fn new(base_interval: Duration, rng_seed: u64) -> Self {
        Self {
            base_interval,
            rng_seed,
        }
    }
}

/// Pure system that deterministically emits enemy spawn commands.
#[derive(Debug)]
pub struct Spawning {
    base_interval: Duration,
    accumulator: Duration,
    rng_state: u64,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            base_interval: config.base_interval,
            accumulator: Duration::ZERO,
            rng_state: config.rng_seed,
        }
    }

    /// Consumes events and read-only session values to emit spawn commands.
    ///
    /// Time only accrues while the session is in active play; any other
    /// state drains the accumulator so a long menu pause cannot burst-spawn
    /// on re-entry.
    pub fn handle(
        &mut self,
        events: &[Event],
        state: GameState,
        level: u32,
        out: &mut Vec<Command>,
    ) {
        if state != GameState::Playing {
            self.accumulator = Duration::ZERO;
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }
        if accumulated.is_zero() {
            return;
        }

        let interval = self.scaled_interval(level);
        if interval.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        while self.accumulator >= interval {
            self.accumulator -= interval;
            let kind = self.next_kind();
            let altitude = self.next_fraction();
            out.push(Command::SpawnEnemy { kind, altitude });
        }
    }

    /// Cadence after level scaling: strictly decreasing with level, floored.
    fn scaled_interval(&self, level: u32) -> Duration {
        let divisor = 1.0 + level.saturating_sub(1) as f32 * LEVEL_RAMP;
        let scaled = self.base_interval.as_secs_f32() / divisor;
        Duration::from_secs_f32(scaled.max(MIN_INTERVAL.as_secs_f32()))
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

    fn next_kind(&mut self) -> EnemyKind {
        let total: u64 = SPAWN_WEIGHTS.iter().map(|(_, weight)| weight).sum();
        let mut roll = self.advance_rng() % total;
        for (kind, weight) in SPAWN_WEIGHTS {
            if roll < weight {
                return kind;
            }
            roll -= weight;
        }
        EnemyKind::Drone
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, Spawning, BASE_SPAWN_INTERVAL};
    use std::time::Duration;

    #[test]
    fn interval_floors_at_half_a_second() {
        let spawning = Spawning::new(Config::new(BASE_SPAWN_INTERVAL, 1));
        assert_eq!(spawning.scaled_interval(1), BASE_SPAWN_INTERVAL);
        assert!(spawning.scaled_interval(5) < spawning.scaled_interval(2));
        assert_eq!(spawning.scaled_interval(1000), Duration::from_millis(500));
    }

    #[test]
    fn altitude_fractions_stay_in_the_unit_range() {
        let mut spawning = Spawning::new(Config::new(BASE_SPAWN_INTERVAL, 0xfeed));
        for _ in 0..1000 {
            let fraction = spawning.next_fraction();
            assert!((0.0..1.0).contains(&fraction));
        }
    }
}
