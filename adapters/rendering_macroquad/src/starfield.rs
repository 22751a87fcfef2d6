use glam::Vec2;
use macroquad::shapes::draw_circle;

const STAR_COUNT: usize = 200;
const RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const RNG_INCREMENT: u64 = 1;

#[derive(Clone, Copy, Debug)]
struct Star {
    position: Vec2,
    size: f32,
    twinkle_speed: f32,
    phase: f32,
}

/// Twinkling background star layer, continuous across every game state.
#[derive(Debug)]
pub struct Starfield {
    stars: Vec<Star>,
    time: f32,
}

impl Starfield {
    /// Scatters stars deterministically across the given extent.
    #[must_use]
    pub fn new(seed: u64, width: f32, height: f32) -> Self {
        let mut state = seed;
        let mut next_fraction = move || {
            state = state.wrapping_mul(RNG_MULTIPLIER).wrapping_add(RNG_INCREMENT);
            (state >> 40) as f32 / (1u64 << 24) as f32
        };

        let stars = (0..STAR_COUNT)
            .map(|_| Star {
                position: Vec2::new(next_fraction() * width, next_fraction() * height),
                size: 1.0 + next_fraction() * 2.0,
                twinkle_speed: 0.5 + next_fraction() * 2.0,
                phase: next_fraction() * std::f32::consts::TAU,
            })
            .collect();

        Self { stars, time: 0.0 }
    }

    /// Advances the twinkle clock.
    pub fn update(&mut self, dt: f32) {
        if !self.time.is_finite() {
            self.time = 0.0;
        }
        self.time += dt.max(0.0);
    }

    /// Draws every star with its current twinkle brightness.
    pub fn draw(&self) {
        for star in &self.stars {
            let brightness =
                (self.time * star.twinkle_speed + star.phase).sin() * 0.5 + 0.5;
            let glow = macroquad::color::Color::new(1.0, 1.0, 1.0, brightness * 0.3);
            draw_circle(star.position.x, star.position.y, star.size * 2.0, glow);
            let core = macroquad::color::Color::new(1.0, 1.0, 1.0, brightness);
            draw_circle(star.position.x, star.position.y, star.size, core);
        }
    }

    #[cfg(test)]
    fn positions(&self) -> Vec<Vec2> {
        self.stars.iter().map(|star| star.position).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Starfield, STAR_COUNT};

    #[test]
    fn generation_is_deterministic_for_a_seed() {
        let first = Starfield::new(42, 1280.0, 720.0);
        let second = Starfield::new(42, 1280.0, 720.0);
        assert_eq!(first.positions(), second.positions());
    }

    #[test]
    fn stars_cover_the_requested_extent() {
        let field = Starfield::new(7, 1280.0, 720.0);
        assert_eq!(field.positions().len(), STAR_COUNT);
        for position in field.positions() {
            assert!((0.0..=1280.0).contains(&position.x));
            assert!((0.0..=720.0).contains(&position.y));
        }
    }
}
