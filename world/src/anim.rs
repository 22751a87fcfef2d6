//! Reusable fade, flash and spin counters shared by the state machine and
//! transient visual effects.
//!
//! Every primitive clamps non-finite values back to a safe default so a bad
//! delta time can never propagate NaN into rendering.

use std::f32::consts::TAU;

/// Oscillates an opacity value between two bounds, reversing at each clamp.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FadeOscillator {
    value: f32,
    rising: bool,
    speed: f32,
    min: f32,
    max: f32,
}

impl FadeOscillator {
    /// Creates an oscillator starting at its maximum and fading downward.
    pub(crate) const fn new(min: f32, max: f32, speed: f32) -> Self {
        Self {
            value: max,
            rising: false,
            speed,
            min,
            max,
        }
    }

    /// Advances the oscillation by `dt` seconds.
    pub(crate) fn update(&mut self, dt: f32) {
        if !self.value.is_finite() {
            self.value = self.max;
        }

        let delta = self.speed * dt.max(0.0);
        self.value += if self.rising { delta } else { -delta };

        if self.value <= self.min {
            self.value = self.min;
            self.rising = true;
        } else if self.value >= self.max {
            self.value = self.max;
            self.rising = false;
        }
    }

    /// Current oscillation value.
    pub(crate) const fn value(&self) -> f32 {
        self.value
    }

    /// Restores the oscillator to its initial descending phase.
    pub(crate) fn reset(&mut self) {
        self.value = self.max;
        self.rising = false;
    }
}

/// Continuously wrapping rotation counter.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Spin {
    angle: f32,
    rate: f32,
}

impl Spin {
    /// Creates a spin counter advancing at `rate` radians per second.
    pub(crate) const fn new(rate: f32) -> Self {
        Self { angle: 0.0, rate }
    }

    /// Advances the rotation by `dt` seconds, wrapping at a full turn.
    pub(crate) fn update(&mut self, dt: f32) {
        if !self.angle.is_finite() {
            self.angle = 0.0;
        }
        self.angle = (self.angle + self.rate * dt.max(0.0)) % TAU;
    }

    /// Current angle in radians.
    pub(crate) const fn angle(&self) -> f32 {
        self.angle
    }

    /// Rewinds the rotation to zero.
    pub(crate) fn reset(&mut self) {
        self.angle = 0.0;
    }
}

/// Phase of a single banner flash.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FlashPhase {
    FadeIn,
    Hold,
    FadeOut,
}

/// Drives a fixed number of fade-in, hold, fade-out banner flashes.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FlashSequence {
    phase: FlashPhase,
    alpha: f32,
    elapsed: f32,
    completed: u32,
    fade_speed: f32,
    hold: f32,
    flashes: u32,
}

impl FlashSequence {
    /// Creates a sequence of `flashes` repetitions with the provided timing.
    pub(crate) const fn new(fade_speed: f32, hold: f32, flashes: u32) -> Self {
        Self {
            phase: FlashPhase::FadeIn,
            alpha: 0.0,
            elapsed: 0.0,
            completed: 0,
            fade_speed,
            hold,
            flashes,
        }
    }

    /// Advances the sequence, returning `true` once every flash has played.
    pub(crate) fn update(&mut self, dt: f32) -> bool {
        if !self.alpha.is_finite() {
            self.alpha = 0.0;
        }

        let dt = dt.max(0.0);
        match self.phase {
            FlashPhase::FadeIn => {
                self.alpha += self.fade_speed * dt;
                if self.alpha >= 1.0 {
                    self.alpha = 1.0;
                    self.phase = FlashPhase::Hold;
                    self.elapsed = 0.0;
                }
            }
            FlashPhase::Hold => {
                self.elapsed += dt;
                if self.elapsed >= self.hold {
                    self.phase = FlashPhase::FadeOut;
                    self.elapsed = 0.0;
                }
            }
            FlashPhase::FadeOut => {
                self.alpha -= self.fade_speed * dt;
                if self.alpha <= 0.0 {
                    self.alpha = 0.0;
                    self.phase = FlashPhase::FadeIn;
                    self.completed += 1;
                }
            }
        }

        self.completed >= self.flashes
    }

    /// Current banner opacity.
    pub(crate) const fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Rewinds the sequence to its first fade-in.
    pub(crate) fn reset(&mut self) {
        self.phase = FlashPhase::FadeIn;
        self.alpha = 0.0;
        self.elapsed = 0.0;
        self.completed = 0;
    }
}
