//! Planar geometry shared by perception, collision and rendering contracts.
//!
//! World space uses screen conventions: `x` grows to the right and `y` grows
//! downward. Rotations are expressed in degrees and turn counter-clockwise on
//! screen, so a rotation of `90.0` faces toward decreasing `y`.

use std::cmp::Ordering;

use glam::Vec2;

/// Straight line segment between two points in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// First endpoint of the segment.
    pub start: Vec2,
    /// Second endpoint of the segment.
    pub end: Vec2,
}

impl Segment {
    /// Creates a segment spanning the provided endpoints.
    #[must_use]
    pub const fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// Reports whether both endpoints coincide.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    fn contains_in_bounds(&self, x: f32, y: f32) -> bool {
        self.start.x.min(self.end.x) <= x
            && x <= self.start.x.max(self.end.x)
            && self.start.y.min(self.end.y) <= y
            && y <= self.start.y.max(self.end.y)
    }
}

/// Infinite line in slope/intercept form.
///
/// Vertical lines carry an infinite slope and store their `x` coordinate as the
/// intercept.
#[derive(Clone, Copy, Debug)]
struct Line {
    slope: f32,
    intercept: f32,
}

impl Line {
    fn through(segment: &Segment) -> Self {
        let run = segment.end.x - segment.start.x;
        if run != 0.0 {
            let slope = (segment.end.y - segment.start.y) / run;
            if slope.is_finite() {
                return Self {
                    slope,
                    intercept: segment.start.y - slope * segment.start.x,
                };
            }
        }

        Self {
            slope: f32::INFINITY,
            intercept: segment.start.x,
        }
    }

    fn is_vertical(&self) -> bool {
        self.slope.is_infinite()
    }

    fn precedes(&self, other: &Self) -> bool {
        self.slope
            .total_cmp(&other.slope)
            .then(self.intercept.total_cmp(&other.intercept))
            == Ordering::Less
    }
}

/// Reports whether two segments cross.
///
/// Segments with equal slopes never intersect, including collinear segments
/// that overlap. Zero-length segments never intersect anything. The crossing
/// point of the two infinite lines must lie inside both segments' bounding
/// boxes, boundaries included.
#[must_use]
pub fn segments_intersect(first: &Segment, second: &Segment) -> bool {
    if first.is_degenerate() || second.is_degenerate() {
        return false;
    }

    let mut a = Line::through(first);
    let mut b = Line::through(second);

    if a.slope == b.slope {
        return false;
    }

    // Solve in a canonical order so swapping the arguments cannot change rounding.
    if b.precedes(&a) {
        std::mem::swap(&mut a, &mut b);
    }

    let (x, y) = if a.is_vertical() {
        (a.intercept, b.slope * a.intercept + b.intercept)
    } else if b.is_vertical() {
        (b.intercept, a.slope * b.intercept + a.intercept)
    } else {
        let x = (b.intercept - a.intercept) / (a.slope - b.slope);
        (x, a.slope * x + a.intercept)
    };

    first.contains_in_bounds(x, y) && second.contains_in_bounds(x, y)
}

/// Returns `true` when the segment crosses any of the provided edges.
///
/// Stops at the first crossing edge.
#[must_use]
pub fn crosses_any(segment: &Segment, edges: &[Segment]) -> bool {
    edges.iter().any(|edge| segments_intersect(edge, segment))
}

/// Axis-aligned collision rectangle, independent from any sprite bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitBox {
    center: Vec2,
    half_extents: Vec2,
}

impl HitBox {
    /// Creates a hit-box of the given full size centered on `center`.
    #[must_use]
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half_extents: size.abs() * 0.5,
        }
    }

    /// Center of the rectangle.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Half of the rectangle's width and height.
    #[must_use]
    pub const fn half_extents(&self) -> Vec2 {
        self.half_extents
    }

    /// Full width and height of the rectangle.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.half_extents * 2.0
    }

    /// Upper-left corner.
    #[must_use]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    /// Lower-right corner.
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    /// Returns the same rectangle moved to a new center.
    #[must_use]
    pub const fn with_center(self, center: Vec2) -> Self {
        Self {
            center,
            half_extents: self.half_extents,
        }
    }

    /// Reports whether the interiors of two rectangles overlap.
    ///
    /// Rectangles that only share an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &HitBox) -> bool {
        let delta = (self.center - other.center).abs();
        let reach = self.half_extents + other.half_extents;
        delta.x < reach.x && delta.y < reach.y
    }

    /// Depth of the overlap along the horizontal axis, zero when disjoint.
    #[must_use]
    pub fn penetration_x(&self, other: &HitBox) -> f32 {
        let reach = self.half_extents.x + other.half_extents.x;
        (reach - (self.center.x - other.center.x).abs()).max(0.0)
    }

    /// Depth of the overlap along the vertical axis, zero when disjoint.
    #[must_use]
    pub fn penetration_y(&self, other: &HitBox) -> f32 {
        let reach = self.half_extents.y + other.half_extents.y;
        (reach - (self.center.y - other.center.y).abs()).max(0.0)
    }
}

/// Wraps an angle into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Unit direction faced at the provided rotation.
#[must_use]
pub fn heading_vector(rotation_degrees: f32) -> Vec2 {
    let radians = rotation_degrees.to_radians();
    Vec2::new(radians.cos(), -radians.sin())
}

/// Rotation that faces along `delta`.
#[must_use]
pub fn rotation_towards(delta: Vec2) -> f32 {
    normalize_degrees(-delta.y.atan2(delta.x).to_degrees())
}

/// Rounds a rotation to the nearest multiple of `step` degrees.
///
/// A non-positive step leaves the rotation continuous.
#[must_use]
pub fn snap_heading(rotation_degrees: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return normalize_degrees(rotation_degrees);
    }
    normalize_degrees((rotation_degrees / step).round() * step)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(ax: f32, ay: f32, bx: f32, by: f32) -> Segment {
        Segment::new(Vec2::new(ax, ay), Vec2::new(bx, by))
    }

    #[test]
    fn crossing_diagonals_intersect() {
        let a = segment(0.0, 0.0, 10.0, 10.0);
        let b = segment(0.0, 10.0, 10.0, 0.0);
        assert!(segments_intersect(&a, &b));
    }

    #[test]
    fn ray_through_vertical_wall_edge_is_blocked() {
        let ray = segment(0.0, 5.0, 20.0, 7.0);
        let edge = segment(10.0, 0.0, 10.0, 32.0);
        assert!(segments_intersect(&ray, &edge));
        assert!(segments_intersect(&edge, &ray));
    }

    #[test]
    fn ray_stopping_short_of_edge_is_clear() {
        let ray = segment(0.0, 5.0, 9.0, 6.0);
        let edge = segment(10.0, 0.0, 10.0, 32.0);
        assert!(!segments_intersect(&ray, &edge));
    }

    #[test]
    fn touching_endpoint_counts_as_intersection() {
        let ray = segment(0.0, 16.0, 32.0, 16.0);
        let edge = segment(32.0, 0.0, 32.0, 32.0);
        assert!(segments_intersect(&ray, &edge));
    }

    #[test]
    fn collinear_overlap_is_not_detected() {
        let a = segment(0.0, 0.0, 10.0, 0.0);
        let b = segment(5.0, 0.0, 15.0, 0.0);
        assert!(!segments_intersect(&a, &b));

        let vertical_a = segment(3.0, 0.0, 3.0, 10.0);
        let vertical_b = segment(3.0, 5.0, 3.0, 15.0);
        assert!(!segments_intersect(&vertical_a, &vertical_b));
    }

    #[test]
    fn degenerate_segments_never_intersect() {
        let point = segment(5.0, 5.0, 5.0, 5.0);
        let through = segment(0.0, 0.0, 10.0, 10.0);
        assert!(!segments_intersect(&point, &through));
        assert!(!segments_intersect(&through, &point));
    }

    #[test]
    fn intersection_is_symmetric_against_wall_edges() {
        let edges = [
            segment(32.0, 32.0, 64.0, 32.0),
            segment(64.0, 32.0, 64.0, 64.0),
            segment(64.0, 64.0, 32.0, 64.0),
            segment(32.0, 64.0, 32.0, 32.0),
        ];
        let rays = [
            segment(0.0, 0.0, 100.0, 100.0),
            segment(10.0, 48.0, 90.0, 48.0),
            segment(48.0, 0.0, 48.0, 100.0),
            segment(0.0, 31.0, 200.0, 33.0),
            segment(64.0, 0.0, 64.0, 20.0),
            segment(5.0, 90.0, 70.0, 10.0),
        ];

        for edge in &edges {
            for other in edges.iter().chain(rays.iter()) {
                assert_eq!(
                    segments_intersect(edge, other),
                    segments_intersect(other, edge),
                    "asymmetric result for {edge:?} and {other:?}"
                );
            }
        }
    }

    #[test]
    fn crosses_any_short_circuits_on_first_blocking_edge() {
        let edges = [
            segment(100.0, 0.0, 100.0, 10.0),
            segment(10.0, 0.0, 10.0, 32.0),
        ];
        assert!(crosses_any(&segment(0.0, 5.0, 20.0, 5.0), &edges));
        assert!(!crosses_any(&segment(0.0, 50.0, 20.0, 50.0), &edges));
    }

    #[test]
    fn hit_boxes_sharing_an_edge_do_not_overlap() {
        let a = HitBox::new(Vec2::new(16.0, 16.0), Vec2::splat(32.0));
        let b = HitBox::new(Vec2::new(48.0, 16.0), Vec2::splat(32.0));
        assert!(!a.overlaps(&b));

        let c = b.with_center(Vec2::new(47.0, 16.0));
        assert!(a.overlaps(&c));
        assert!((a.penetration_x(&c) - 1.0).abs() < f32::EPSILON);
        assert!((a.penetration_y(&c) - 32.0).abs() < f32::EPSILON);
    }

    #[test]
    fn headings_follow_screen_rotation() {
        let east = heading_vector(0.0);
        let up = heading_vector(90.0);
        assert!((east - Vec2::X).length() < 1e-5);
        assert!((up - Vec2::new(0.0, -1.0)).length() < 1e-5);

        assert!((rotation_towards(Vec2::new(0.0, -5.0)) - 90.0).abs() < 1e-4);
        assert!((rotation_towards(Vec2::new(0.0, 5.0)) - 270.0).abs() < 1e-4);
        assert!((rotation_towards(Vec2::new(-1.0, 0.0)) - 180.0).abs() < 1e-4);
    }

    #[test]
    fn snap_heading_rounds_to_grid() {
        assert_eq!(snap_heading(30.0, 45.0), 45.0);
        assert_eq!(snap_heading(20.0, 45.0), 0.0);
        assert_eq!(snap_heading(-90.0, 90.0), 270.0);
        assert_eq!(snap_heading(359.0, 90.0), 0.0);
        assert_eq!(snap_heading(12.5, 0.0), 12.5);
    }
}
