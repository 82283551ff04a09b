//! Shared geometry utilities.

use kurbo::{BezPath, PathSeg, Point, Vec2};

use crate::model::Path;

/// Signed area of a path's on-curve polygon.
pub fn node_area(path: &Path) -> f64 {
    polygon_area(&path.on_curve_points())
}

/// Signed area of a closed polygon. Positive = CCW.
pub fn polygon_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            points[i].x * points[j].y - points[j].x * points[i].y
        })
        .sum::<f64>()
        / 2.0
}

/// Direction a segment leaves its start point, skipping coincident handles.
pub fn start_tangent(seg: PathSeg) -> Vec2 {
    match seg {
        PathSeg::Line(l) => l.p1 - l.p0,
        PathSeg::Quad(q) => first_nonzero(&[q.p1 - q.p0, q.p2 - q.p0]),
        PathSeg::Cubic(c) => first_nonzero(&[c.p1 - c.p0, c.p2 - c.p0, c.p3 - c.p0]),
    }
}

/// Direction a segment arrives at its end point, skipping coincident handles.
pub fn end_tangent(seg: PathSeg) -> Vec2 {
    match seg {
        PathSeg::Line(l) => l.p1 - l.p0,
        PathSeg::Quad(q) => first_nonzero(&[q.p2 - q.p1, q.p2 - q.p0]),
        PathSeg::Cubic(c) => first_nonzero(&[c.p3 - c.p2, c.p3 - c.p1, c.p3 - c.p0]),
    }
}

fn first_nonzero(candidates: &[Vec2]) -> Vec2 {
    candidates
        .iter()
        .copied()
        .find(|v| v.hypot2() > 1e-18)
        .unwrap_or(Vec2::ZERO)
}

/// Unsigned angle between two vectors, in radians [0, pi].
pub fn angle_between(a: Vec2, b: Vec2) -> f64 {
    a.cross(b).atan2(a.dot(b)).abs()
}

/// Append a segment to a path that already ends at the segment's start.
pub fn push_seg(path: &mut BezPath, seg: PathSeg) {
    match seg {
        PathSeg::Line(l) => path.line_to(l.p1),
        PathSeg::Quad(q) => path.quad_to(q.p1, q.p2),
        PathSeg::Cubic(c) => path.curve_to(c.p1, c.p2, c.p3),
    }
}
