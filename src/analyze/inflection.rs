//! Inflection insertion for cubic bezier curves.

use kurbo::Point;

use crate::model::Path;

/// Roots at or below this time collapse onto the segment start.
const T_MIN: f64 = 0.001;
/// Roots at or above this time collapse onto the segment end.
const T_MAX: f64 = 0.99;

/// Insert an on-curve node at the inflection of every cubic segment that
/// has exactly one inflection inside (0.001, 0.99).
///
/// Segments with two inflections are left alone, like segments with none.
pub fn add_inflection_points(path: &Path) -> Path {
    super::split_cubics(path, |cubic| {
        let roots = compute_inflection(cubic.p0, cubic.p1, cubic.p2, cubic.p3);
        if roots.len() == 1 {
            roots
        } else {
            Vec::new()
        }
    })
}

/// Inflection times of the cubic `p1 p2 p3 p4`, restricted to (0.001, 0.99).
///
/// Built from successive differences of the control points; the inflection
/// condition is the quadratic `c2 t² + c1 t + c0 = 0` in their cross terms.
pub fn compute_inflection(p1: Point, p2: Point, p3: Point, p4: Point) -> Vec<f64> {
    let a = p2 - p1;
    let b = p3 - p2 - a;
    let c = p4 - p3 - a - b - b;

    let c0 = a.cross(b);
    let c1 = a.cross(c);
    let c2 = b.cross(c);

    let mut roots = Vec::with_capacity(2);
    if c2.abs() > 1e-5 {
        let discr = c1 * c1 - 4.0 * c0 * c2;
        let denom = 2.0 * c2;
        if discr.abs() < 1e-6 {
            roots.push(-c1 / denom);
        } else if discr > 0.0 {
            let sqrt_discr = discr.sqrt();
            roots.push((-c1 - sqrt_discr) / denom);
            roots.push((-c1 + sqrt_discr) / denom);
        }
    } else if c1 != 0.0 {
        roots.push(-c0 / c1);
    }

    roots.retain(|&t| t > T_MIN && t < T_MAX);
    roots
}
