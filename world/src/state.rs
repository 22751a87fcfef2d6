//! The session state machine: transition guard, per-state timers and
//! epoch-guarded deferred transitions.
//!
//! Only the world mutates the active state, and only through
//! [`StateMachine::begin`] behind the transition guard, so no other
//! component can corrupt the transition graph.

use std::time::Duration;

use viper_patrol_core::GameState;

use crate::anim::{FadeOscillator, FlashSequence, Spin};

/// Length of the cross-fade window between two states.
const TRANSITION_FADE: f32 = 0.5;
/// Splash prompt oscillation bounds and speed on the start screen.
const SPLASH_MIN: f32 = 0.3;
const SPLASH_MAX: f32 = 1.0;
const SPLASH_SPEED: f32 = 0.5;
/// Title pulse speed in radians per second.
const TITLE_PULSE_RATE: f32 = 1.0;
/// Start-screen stargate emblem spin in radians per second.
const EMBLEM_SPIN_RATE: f32 = 0.785;
/// Get-Ready banner flash timing.
const GET_READY_FADE_SPEED: f32 = 2.0;
const GET_READY_HOLD: f32 = 0.5;
const GET_READY_FLASHES: u32 = 3;
/// Restart prompt oscillation speed on the game-over screen.
const RESTART_SPEED: f32 = 0.5;
/// Total length of the level-up cinematic.
pub(crate) const LEVEL_UP_DURATION: Duration = Duration::from_millis(3500);
/// Delay after a death before the craft respawns.
pub(crate) const DEATH_DELAY: Duration = Duration::from_secs(2);
/// Length of the respawn grace overlay.
pub(crate) const READY_DELAY: Duration = Duration::from_secs(2);
/// Delay between the final explosion starting and the game-over screen.
pub(crate) const GAME_OVER_DELAY: Duration = Duration::from_secs(3);

/// Accumulating timers that pace the death-and-respawn sequence.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct DeathSequence {
    pub(crate) death_elapsed: Duration,
    pub(crate) ready_elapsed: Duration,
}

/// A state change armed to fire after a fixed delay, tied to the epoch that
/// armed it so a restart can never be interrupted by a stale timer.
#[derive(Clone, Copy, Debug)]
struct DeferredTransition {
    target: GameState,
    remaining: Duration,
    epoch: u64,
}

/// Owns the authoritative state and every cross-cutting timer.
#[derive(Debug)]
pub(crate) struct StateMachine {
    current: GameState,
    previous: Option<GameState>,
    transition_elapsed: f32,
    transition_fades: bool,
    splash: FadeOscillator,
    title_pulse: Spin,
    emblem_spin: Spin,
    get_ready: FlashSequence,
    restart_prompt: FadeOscillator,
    level_up_elapsed: Duration,
    death: DeathSequence,
    deferred: Option<DeferredTransition>,
}

impl StateMachine {
    /// Creates a machine resting in [`GameState::Start`].
    pub(crate) fn new() -> Self {
        Self {
            current: GameState::Start,
            previous: None,
            transition_elapsed: TRANSITION_FADE,
            transition_fades: false,
            splash: FadeOscillator::new(SPLASH_MIN, SPLASH_MAX, SPLASH_SPEED),
            title_pulse: Spin::new(TITLE_PULSE_RATE),
            emblem_spin: Spin::new(EMBLEM_SPIN_RATE),
            get_ready: FlashSequence::new(GET_READY_FADE_SPEED, GET_READY_HOLD, GET_READY_FLASHES),
            restart_prompt: FadeOscillator::new(SPLASH_MIN, SPLASH_MAX, RESTART_SPEED),
            level_up_elapsed: Duration::ZERO,
            death: DeathSequence::default(),
            deferred: None,
        }
    }

    /// Currently active state.
    pub(crate) const fn current(&self) -> GameState {
        self.current
    }

    /// State active before the most recent transition, if any.
    pub(crate) const fn previous(&self) -> Option<GameState> {
        self.previous
    }

    /// Whether a transition cross-fade is still in flight. While it is,
    /// further transition requests are silently ignored.
    pub(crate) fn in_transition(&self) -> bool {
        self.transition_elapsed < TRANSITION_FADE
    }

    /// Progress of the active cross-fade in [0, 1], or `None` when settled
    /// or when the transition cuts (into or out of the start screen).
    pub(crate) fn transition_progress(&self) -> Option<f32> {
        if self.transition_fades && self.in_transition() {
            Some(self.transition_elapsed / TRANSITION_FADE)
        } else {
            None
        }
    }

    /// Reports whether a transition to `next` may proceed right now.
    pub(crate) fn accepts(&self, next: GameState) -> bool {
        self.current != next && !self.in_transition()
    }

    /// Switches to `next`, recording the previous state and starting the
    /// cross-fade. Transitions into or out of the start screen cut directly.
    pub(crate) fn begin(&mut self, next: GameState) {
        self.transition_fades =
            self.current != GameState::Start && next != GameState::Start;
        self.previous = Some(self.current);
        self.current = next;
        self.transition_elapsed = 0.0;
    }

    /// Advances the cross-fade clock.
    pub(crate) fn tick_transition(&mut self, dt: f32) {
        if self.in_transition() {
            self.transition_elapsed += dt.max(0.0);
        }
    }

    /// Arms a deferred transition tied to the given epoch.
    pub(crate) fn arm_deferred(&mut self, target: GameState, delay: Duration, epoch: u64) {
        self.deferred = Some(DeferredTransition {
            target,
            remaining: delay,
            epoch,
        });
    }

    /// Counts an armed deferred transition down, returning the target once
    /// the delay elapses. A timer armed under a different epoch is dropped
    /// without firing.
    pub(crate) fn poll_deferred(&mut self, dt: Duration, epoch: u64) -> Option<GameState> {
        let deferred = self.deferred?;
        if deferred.epoch != epoch {
            self.deferred = None;
            return None;
        }

        let remaining = deferred.remaining.saturating_sub(dt);
        if remaining.is_zero() {
            self.deferred = None;
            Some(deferred.target)
        } else {
            self.deferred = Some(DeferredTransition {
                remaining,
                ..deferred
            });
            None
        }
    }

    /// Discards any armed deferred transition.
    pub(crate) fn cancel_deferred(&mut self) {
        self.deferred = None;
    }

    /// Animates the start screen: splash prompt, title pulse, emblem spin.
    pub(crate) fn update_start(&mut self, dt: f32) {
        self.splash.update(dt);
        self.title_pulse.update(dt);
        self.emblem_spin.update(dt);
    }

    /// Advances the Get-Ready flashes, returning `true` once the sequence
    /// completes.
    pub(crate) fn update_get_ready(&mut self, dt: f32) -> bool {
        self.get_ready.update(dt)
    }

    /// Animates the restart prompt on the game-over screen.
    pub(crate) fn update_game_over(&mut self, dt: f32) {
        self.restart_prompt.update(dt);
    }

    /// Accumulates the level-up clock, returning `true` once the cinematic
    /// has run its full length.
    pub(crate) fn advance_level_up(&mut self, dt: Duration) -> bool {
        self.level_up_elapsed = self.level_up_elapsed.saturating_add(dt);
        self.level_up_elapsed >= LEVEL_UP_DURATION
    }

    pub(crate) fn reset_start_screen(&mut self) {
        self.splash.reset();
        self.title_pulse.reset();
        self.emblem_spin.reset();
    }

    pub(crate) fn reset_get_ready(&mut self) {
        self.get_ready.reset();
    }

    pub(crate) fn reset_restart_prompt(&mut self) {
        self.restart_prompt.reset();
    }

    pub(crate) fn reset_level_up(&mut self) {
        self.level_up_elapsed = Duration::ZERO;
    }

    pub(crate) fn reset_death_sequence(&mut self) {
        self.death = DeathSequence::default();
    }

    pub(crate) fn death_mut(&mut self) -> &mut DeathSequence {
        &mut self.death
    }

    pub(crate) const fn splash_alpha(&self) -> f32 {
        self.splash.value()
    }

    pub(crate) const fn title_pulse(&self) -> f32 {
        self.title_pulse.angle()
    }

    pub(crate) const fn emblem_angle(&self) -> f32 {
        self.emblem_spin.angle()
    }

    pub(crate) const fn get_ready_alpha(&self) -> f32 {
        self.get_ready.alpha()
    }

    pub(crate) const fn restart_prompt_alpha(&self) -> f32 {
        self.restart_prompt.value()
    }
}

#[cfg(test)]
mod tests {
    use super::{StateMachine, GAME_OVER_DELAY, TRANSITION_FADE};
    use std::time::Duration;
    use viper_patrol_core::GameState;

    #[test]
    fn duplicate_transitions_are_refused() {
        let machine = StateMachine::new();
        assert!(!machine.accepts(GameState::Start));
        assert!(machine.accepts(GameState::GetReady));
    }

    #[test]
    fn transitions_are_guarded_while_a_fade_is_in_flight() {
        let mut machine = StateMachine::new();
        machine.begin(GameState::GetReady);
        assert!(machine.in_transition());
        assert!(!machine.accepts(GameState::Playing));

        machine.tick_transition(TRANSITION_FADE);
        assert!(!machine.in_transition());
        assert!(machine.accepts(GameState::Playing));
    }

    #[test]
    fn transitions_touching_the_start_screen_cut_directly() {
        let mut machine = StateMachine::new();
        machine.begin(GameState::GetReady);
        assert_eq!(machine.transition_progress(), None);

        machine.tick_transition(TRANSITION_FADE);
        machine.begin(GameState::Playing);
        assert!(machine.transition_progress().is_some());
    }

    #[test]
    fn deferred_transition_fires_after_its_delay() {
        let mut machine = StateMachine::new();
        machine.arm_deferred(GameState::GameOver, GAME_OVER_DELAY, 7);

        assert_eq!(machine.poll_deferred(Duration::from_secs(1), 7), None);
        assert_eq!(machine.poll_deferred(Duration::from_secs(1), 7), None);
        assert_eq!(
            machine.poll_deferred(Duration::from_secs(1), 7),
            Some(GameState::GameOver)
        );
        assert_eq!(machine.poll_deferred(Duration::from_secs(1), 7), None);
    }

    #[test]
    fn stale_epoch_timers_are_dropped_without_firing() {
        let mut machine = StateMachine::new();
        machine.arm_deferred(GameState::GameOver, Duration::from_millis(1), 1);

        // The session restarted: epoch moved on before the timer elapsed.
        assert_eq!(machine.poll_deferred(Duration::from_secs(10), 2), None);
        assert_eq!(machine.poll_deferred(Duration::from_secs(10), 1), None);
    }
}
