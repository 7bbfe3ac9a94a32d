use crate::geometry::{Rect, Vec2};

/// Clearance added beyond the obstacle's half extent for a detour waypoint.
pub const DETOUR_MARGIN_PX: f32 = 50.0;

/// Cheap one-bend route used for cosmetic wandering.
///
/// Returns `[end]` when the straight segment misses every obstacle edge.
/// Otherwise returns `[detour, end]`, where the detour sits beside the
/// obstacle's center, pushed perpendicular to the dominant travel axis and
/// clamped into `bounds`. Not guaranteed to be obstacle-free; user-directed
/// movement goes through [`super::PathPlanner`] instead.
pub fn simple_detour_path(start: Vec2, end: Vec2, obstacle: Rect, bounds: Rect) -> Vec<Vec2> {
    if !obstacle.segment_crosses_edges(start, end) {
        return vec![end];
    }

    let center = obstacle.center();
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let detour = if dx.abs() > dy.abs() {
        let side = if dy > 0.0 { 1.0 } else { -1.0 };
        Vec2 {
            x: (start.x + end.x) / 2.0,
            y: center.y + (obstacle.height / 2.0 + DETOUR_MARGIN_PX) * side,
        }
    } else {
        let side = if dx > 0.0 { 1.0 } else { -1.0 };
        Vec2 {
            x: center.x + (obstacle.width / 2.0 + DETOUR_MARGIN_PX) * side,
            y: (start.y + end.y) / 2.0,
        }
    };

    vec![bounds.clamp_point(detour), end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> (Rect, Rect) {
        let bounds = Rect::from_size(800.0, 600.0);
        let obstacle = Rect::new(275.0, 175.0, 250.0, 250.0);
        (bounds, obstacle)
    }

    #[test]
    fn clear_segments_go_direct() {
        let (bounds, obstacle) = scene();
        let cases = [
            (Vec2::new(10.0, 500.0), Vec2::new(790.0, 520.0)),
            (Vec2::new(100.0, 100.0), Vec2::new(100.0, 590.0)),
            (Vec2::new(600.0, 50.0), Vec2::new(700.0, 580.0)),
            (Vec2::new(300.0, 200.0), Vec2::new(400.0, 300.0)),
        ];
        for (start, end) in cases {
            assert_eq!(
                simple_detour_path(start, end, obstacle, bounds),
                vec![end],
                "{start:?} -> {end:?}"
            );
        }
    }

    #[test]
    fn crossing_segments_get_one_detour_outside_obstacle() {
        let (bounds, obstacle) = scene();
        let cases = [
            (Vec2::new(10.0, 300.0), Vec2::new(790.0, 310.0)),
            (Vec2::new(790.0, 320.0), Vec2::new(10.0, 290.0)),
            (Vec2::new(400.0, 20.0), Vec2::new(410.0, 590.0)),
            (Vec2::new(390.0, 590.0), Vec2::new(380.0, 10.0)),
            (Vec2::new(200.0, 150.0), Vec2::new(600.0, 450.0)),
        ];
        for (start, end) in cases {
            let path = simple_detour_path(start, end, obstacle, bounds);
            assert_eq!(path.len(), 2, "{start:?} -> {end:?}");
            assert_eq!(path[1], end);
            let detour = path[0];
            assert!(!obstacle.contains_inclusive(detour), "detour {detour:?} inside");
            assert!(bounds.contains_inclusive(detour), "detour {detour:?} out of bounds");
        }
    }

    #[test]
    fn horizontal_travel_detours_by_vertical_offset() {
        let (bounds, obstacle) = scene();
        let path = simple_detour_path(
            Vec2::new(10.0, 290.0),
            Vec2::new(790.0, 310.0),
            obstacle,
            bounds,
        );
        assert_eq!(path[0], Vec2::new(400.0, 300.0 + 125.0 + DETOUR_MARGIN_PX));
    }

    #[test]
    fn detour_is_clamped_into_bounds() {
        let bounds = Rect::from_size(400.0, 300.0);
        let obstacle = Rect::new(100.0, 20.0, 200.0, 260.0);
        let path = simple_detour_path(
            Vec2::new(50.0, 150.0),
            Vec2::new(350.0, 140.0),
            obstacle,
            bounds,
        );
        assert_eq!(path[0], Vec2::new(200.0, 0.0));
    }
}
