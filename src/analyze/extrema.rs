//! Extrema insertion for cubic bezier curves.
//!
//! Inserts on-curve points at horizontal and vertical extrema
//! so that bounding boxes are tight and offsetting stays well behaved.

use kurbo::CubicBez;

use crate::model::Path;

/// Margin from t=0 and t=1. Extrema closer to endpoints than this are
/// already represented by the endpoint itself.
const ENDPOINT_MARGIN: f64 = 0.01;

/// Insert on-curve points at H/V extrema of every cubic segment.
///
/// Idempotent: a second pass finds every extremum sitting on a node.
pub fn add_extreme_points(path: &Path) -> Path {
    super::split_cubics(path, extrema_t_values)
}

/// Find t-values of H/V extrema on a cubic.
fn extrema_t_values(cubic: &CubicBez) -> Vec<f64> {
    let mut t_values = Vec::new();
    for axis in 0..2 {
        let (v0, v1, v2, v3) = if axis == 0 {
            (cubic.p0.x, cubic.p1.x, cubic.p2.x, cubic.p3.x)
        } else {
            (cubic.p0.y, cubic.p1.y, cubic.p2.y, cubic.p3.y)
        };

        // Derivative coefficients: At² + Bt + C = 0
        let coeff_a = -3.0 * v0 + 9.0 * v1 - 9.0 * v2 + 3.0 * v3;
        let coeff_b = 6.0 * v0 - 12.0 * v1 + 6.0 * v2;
        let coeff_c = -3.0 * v0 + 3.0 * v1;

        t_values.extend(
            solve_quadratic(coeff_a, coeff_b, coeff_c)
                .into_iter()
                .filter(|&t| t > ENDPOINT_MARGIN && t < 1.0 - ENDPOINT_MARGIN),
        );
    }

    t_values.sort_by(f64::total_cmp);
    t_values.dedup_by(|a, b| (*a - *b).abs() < 0.001);
    t_values
}

/// Solve At² + Bt + C = 0, returning real roots.
fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < 1e-10 {
        if b.abs() > 1e-10 {
            return vec![-c / b];
        }
        return vec![];
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return vec![];
    }
    let sqrt_disc = disc.sqrt();
    vec![(-b + sqrt_disc) / (2.0 * a), (-b - sqrt_disc) / (2.0 * a)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, NodeKind};
    use kurbo::Point;

    fn arch() -> Path {
        Path::new(
            vec![
                Node::line(0.0, 0.0),
                Node::off(0.0, 100.0),
                Node::off(100.0, 100.0),
                Node::curve(100.0, 0.0),
            ],
            false,
        )
    }

    #[test]
    fn arch_gets_its_top_extremum() {
        let path = add_extreme_points(&arch());
        assert_eq!(path.len(), 7);
        let top = path.nodes[3];
        assert_eq!(top.kind, NodeKind::Curve);
        assert!((top.pt - Point::new(50.0, 75.0)).hypot() < 1e-9);
        // Handles around the extremum are horizontal.
        assert!((path.nodes[2].pt.y - 75.0).abs() < 1e-9);
        assert!((path.nodes[4].pt.y - 75.0).abs() < 1e-9);
    }

    #[test]
    fn adding_extremes_twice_changes_nothing() {
        let once = add_extreme_points(&arch());
        let twice = add_extreme_points(&once);
        assert_eq!(once.len(), twice.len());
        for (a, b) in once.nodes.iter().zip(&twice.nodes) {
            assert_eq!(a.kind, b.kind);
            assert!((a.pt - b.pt).hypot() < 1e-9);
        }
    }

    #[test]
    fn closed_circle_like_path_is_stable() {
        let circle = crate::caps::draw_circle(Point::new(0.0, 0.0), 10.0);
        let again = add_extreme_points(&circle);
        assert_eq!(again.len(), 12);
    }

    #[test]
    fn s_curve_gets_both_extrema() {
        let path = Path::new(
            vec![
                Node::line(0.0, 0.0),
                Node::off(0.0, 100.0),
                Node::off(100.0, -100.0),
                Node::curve(100.0, 0.0),
            ],
            false,
        );
        let split = add_extreme_points(&path);
        let on_curve = split.nodes.iter().filter(|n| n.is_on_curve()).count();
        assert_eq!(on_curve, 4, "expected two inserted extrema");
    }
}
