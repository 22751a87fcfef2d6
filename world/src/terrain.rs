//! Procedurally generated, horizontally infinite scrolling height-field.
//!
//! Segment heights are a pure function of the segment index and the world
//! seed, so ground revisited after scrolling away comes back with the same
//! profile. The live window of segments always covers the visible span plus
//! one segment of buffer on each side.

use std::collections::VecDeque;

use viper_patrol_core::{Bounds, Facing, PlayField};

use crate::collision::lerp;

/// Width of a single terrain segment in field units.
pub(crate) const SEGMENT_WIDTH: f32 = 100.0;
/// Lowest ground height measured up from the bottom edge.
pub(crate) const MIN_HEIGHT: f32 = 100.0;
/// Tallest ground height measured up from the bottom edge.
pub(crate) const MAX_HEIGHT: f32 = 300.0;
/// Horizontal scroll speed in field units per second.
const SCROLL_SPEED: f32 = 200.0;
/// Grace distance an entity may sink below the surface before colliding.
const COLLISION_BUFFER: f32 = 20.0;
/// Segments starting at the spawn point that are forced flat.
const FLAT_SPAWN_SEGMENTS: i64 = 3;

/// One unit-width slice of the scrolling ground height-field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Segment {
    pub(crate) index: i64,
    pub(crate) height: f32,
}

/// Scrolling ground windowed around the visible span.
#[derive(Debug)]
pub(crate) struct Terrain {
    field: PlayField,
    seed: u64,
    scroll_offset: f32,
    segments: VecDeque<Segment>,
}

impl Terrain {
    /// Creates terrain for the provided field, seeded deterministically.
    pub(crate) fn new(field: PlayField, seed: u64) -> Self {
        let mut terrain = Self {
            field,
            seed,
            scroll_offset: 0.0,
            segments: VecDeque::new(),
        };
        terrain.refill_window();
        terrain
    }

    /// Deterministic ground height for the segment at `index`.
    ///
    /// The same index always yields the same height; the first few segments
    /// from the spawn point stay flat to guarantee a safe start.
    pub(crate) fn generate_height_at(seed: u64, index: i64) -> f32 {
        if (0..FLAT_SPAWN_SEGMENTS).contains(&index) {
            return MIN_HEIGHT;
        }

        let fraction = (mix(seed, index) >> 40) as f32 / (1u64 << 24) as f32;
        MIN_HEIGHT + fraction * (MAX_HEIGHT - MIN_HEIGHT)
    }

    /// Scrolls the window opposite the player's heading and refills coverage.
    pub(crate) fn advance(&mut self, dt: f32, facing: Facing) {
        if !self.scroll_offset.is_finite() {
            self.scroll_offset = 0.0;
        }
        self.scroll_offset -= SCROLL_SPEED * dt.max(0.0) * facing.sign();
        self.refill_window();
    }

    /// Interpolated ground height at the provided screen-space x coordinate.
    pub(crate) fn height_at(&self, screen_x: f32) -> f32 {
        let world_x = screen_x - self.scroll_offset;
        let index = (world_x / SEGMENT_WIDTH).floor();
        let t = world_x / SEGMENT_WIDTH - index;
        let index = index as i64;
        lerp(
            Self::generate_height_at(self.seed, index),
            Self::generate_height_at(self.seed, index + 1),
            t,
        )
    }

    /// Reports whether the entity's bottom edge is below the ground surface.
    pub(crate) fn collides(&self, bounds: &Bounds) -> bool {
        let height = self.height_at(bounds.center().x());
        bounds.bottom() > self.field.height() - height + COLLISION_BUFFER
    }

    /// Screen-space profile of the windowed segments for presentation.
    pub(crate) fn profile(&self) -> Vec<(f32, f32)> {
        self.segments
            .iter()
            .map(|segment| (self.screen_x(segment.index), segment.height))
            .collect()
    }

    fn screen_x(&self, index: i64) -> f32 {
        index as f32 * SEGMENT_WIDTH + self.scroll_offset
    }

    fn refill_window(&mut self) {
        let lo = ((-SEGMENT_WIDTH - self.scroll_offset) / SEGMENT_WIDTH).floor() as i64;
        let hi =
            ((self.field.width() + SEGMENT_WIDTH - self.scroll_offset) / SEGMENT_WIDTH).ceil()
                as i64;

        while self.segments.front().is_some_and(|s| s.index < lo) {
            let _ = self.segments.pop_front();
        }
        while self.segments.back().is_some_and(|s| s.index > hi) {
            let _ = self.segments.pop_back();
        }

        if self.segments.is_empty() {
            for index in lo..=hi {
                self.segments.push_back(self.segment_at(index));
            }
            return;
        }

        while let Some(front) = self.segments.front().copied() {
            if front.index <= lo {
                break;
            }
            self.segments.push_front(self.segment_at(front.index - 1));
        }
        while let Some(back) = self.segments.back().copied() {
            if back.index >= hi {
                break;
            }
            self.segments.push_back(self.segment_at(back.index + 1));
        }
    }

    fn segment_at(&self, index: i64) -> Segment {
        Segment {
            index,
            height: Self::generate_height_at(self.seed, index),
        }
    }

    #[cfg(test)]
    fn covers_visible_span(&self) -> bool {
        let Some(front) = self.segments.front() else {
            return false;
        };
        let Some(back) = self.segments.back() else {
            return false;
        };
        let contiguous = self
            .segments
            .iter()
            .zip(self.segments.iter().skip(1))
            .all(|(a, b)| b.index == a.index + 1);
        contiguous
            && self.screen_x(front.index) <= 0.0
            && self.screen_x(back.index) + SEGMENT_WIDTH >= self.field.width()
    }
}

fn mix(seed: u64, index: i64) -> u64 {
    let mut z = seed ^ (index as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::{Segment, Terrain, MAX_HEIGHT, MIN_HEIGHT, SEGMENT_WIDTH};
    use viper_patrol_core::{Bounds, Facing, PlayField};

    const SEED: u64 = 0x42f0_e1eb_d4a5_3c21;

    fn field() -> PlayField {
        PlayField::new(1280.0, 720.0)
    }

    #[test]
    fn generated_heights_are_deterministic() {
        for index in -200..200 {
            let first = Terrain::generate_height_at(SEED, index);
            let second = Terrain::generate_height_at(SEED, index);
            assert_eq!(first, second);
            assert!(first >= MIN_HEIGHT);
            assert!(first <= MAX_HEIGHT);
        }
    }

    #[test]
    fn spawn_segments_are_flat() {
        for index in 0..3 {
            assert_eq!(Terrain::generate_height_at(SEED, index), MIN_HEIGHT);
        }
    }

    #[test]
    fn window_covers_visible_span_after_scrolling() {
        let mut terrain = Terrain::new(field(), SEED);
        assert!(terrain.covers_visible_span());

        for _ in 0..500 {
            terrain.advance(0.13, Facing::Right);
            assert!(terrain.covers_visible_span());
        }
        for _ in 0..900 {
            terrain.advance(0.07, Facing::Left);
            assert!(terrain.covers_visible_span());
        }
    }

    #[test]
    fn ground_is_stable_when_revisited() {
        let mut terrain = Terrain::new(field(), SEED);
        let before = terrain.height_at(640.0);

        // Scroll far away and come back by reversing for the same duration.
        for _ in 0..100 {
            terrain.advance(0.1, Facing::Right);
        }
        for _ in 0..100 {
            terrain.advance(0.1, Facing::Left);
        }

        let after = terrain.height_at(640.0);
        assert!((before - after).abs() < 1e-3);
    }

    #[test]
    fn height_interpolates_between_segments() {
        let terrain = Terrain::new(field(), SEED);
        let left = Terrain::generate_height_at(SEED, 4);
        let right = Terrain::generate_height_at(SEED, 5);
        let midpoint = terrain.height_at(4.5 * SEGMENT_WIDTH);
        assert!((midpoint - (left + right) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn collision_requires_sinking_past_the_buffer() {
        let terrain = Terrain::new(field(), SEED);
        let surface = field().height() - terrain.height_at(150.0);

        let above = Bounds::new(140.0, surface - 60.0, 20.0, 20.0);
        assert!(!terrain.collides(&above));

        let grazing = Bounds::new(140.0, surface - 10.0, 20.0, 20.0);
        assert!(!terrain.collides(&grazing));

        let buried = Bounds::new(140.0, surface + 10.0, 20.0, 20.0);
        assert!(terrain.collides(&buried));
    }

    #[test]
    fn negative_dt_does_not_scroll() {
        let mut terrain = Terrain::new(field(), SEED);
        let before: Vec<Segment> = terrain.segments.iter().copied().collect();
        terrain.advance(-1.0, Facing::Right);
        let after: Vec<Segment> = terrain.segments.iter().copied().collect();
        assert_eq!(before, after);
    }
}
