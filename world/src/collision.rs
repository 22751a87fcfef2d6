//! Broad-phase intersection helpers shared by the collision passes.
//!
//! Rectangle-vs-rectangle overlap lives on [`Bounds`] in the core crate; this
//! module adds the circular tests needed for the stargate vortex hot-zone.

use viper_patrol_core::{Bounds, Position};

/// Reports whether a circle intersects an axis-aligned rectangle.
pub(crate) fn circle_overlaps_rect(center: Position, radius: f32, rect: &Bounds) -> bool {
    let nearest_x = center.x().clamp(rect.x(), rect.right());
    let nearest_y = center.y().clamp(rect.y(), rect.bottom());
    let dx = center.x() - nearest_x;
    let dy = center.y() - nearest_y;
    dx * dx + dy * dy <= radius * radius
}

/// Linear interpolation between two heights.
pub(crate) fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::{circle_overlaps_rect, lerp};
    use viper_patrol_core::{Bounds, Position};

    #[test]
    fn circle_inside_rect_overlaps() {
        let rect = Bounds::new(0.0, 0.0, 100.0, 100.0);
        assert!(circle_overlaps_rect(Position::new(50.0, 50.0), 5.0, &rect));
    }

    #[test]
    fn circle_far_from_rect_does_not_overlap() {
        let rect = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(!circle_overlaps_rect(Position::new(50.0, 50.0), 5.0, &rect));
    }

    #[test]
    fn circle_touching_corner_overlaps() {
        let rect = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(circle_overlaps_rect(Position::new(13.0, 14.0), 5.0, &rect));
        assert!(!circle_overlaps_rect(Position::new(14.0, 14.0), 5.0, &rect));
    }

    #[test]
    fn lerp_hits_endpoints_and_midpoint() {
        assert_eq!(lerp(100.0, 300.0, 0.0), 100.0);
        assert_eq!(lerp(100.0, 300.0, 1.0), 300.0);
        assert_eq!(lerp(100.0, 300.0, 0.5), 200.0);
    }
}
