//! Corner rounding with circular arcs.
//!
//! Replaces tangent breaks with cubic arcs of a given radius, the way a
//! chamfer replaces them with a straight bevel.

use std::f64::consts::PI;

use kurbo::{BezPath, ParamCurve, ParamCurveArclen, PathSeg, Point, Vec2};

use super::CornerRounder;
use crate::error::NoodleError;
use crate::geom::{angle_between, end_tangent, push_seg, start_tangent};
use crate::model::{Layer, Path};

/// Turning angles closer to a full reversal than this are cusps and
/// cannot take an arc.
const CUSP_MARGIN: f64 = 0.01;

/// Segments shorter than this are ignored when looking for corners.
const MIN_SEGMENT: f64 = 1e-9;

/// Largest share of a segment one join may trim, so two joins never
/// consume a whole segment between them.
const MAX_TRIM_SHARE: f64 = 0.45;

#[derive(Debug, Clone, Copy)]
pub struct ArcRounder {
    /// Turning angle (radians) below which a join counts as smooth.
    pub min_angle: f64,
}

impl Default for ArcRounder {
    fn default() -> Self {
        Self { min_angle: 0.25 }
    }
}

impl CornerRounder for ArcRounder {
    fn round(&self, layer: &Layer, radius: f64, tolerance: f64) -> Result<Layer, NoodleError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(NoodleError::Round(format!("invalid radius {}", radius)));
        }
        if radius == 0.0 {
            return Ok(layer.clone());
        }
        let paths: Vec<Path> = layer
            .paths
            .iter()
            .map(|p| self.round_path(p, radius, tolerance))
            .collect();
        let non_finite = paths
            .iter()
            .flat_map(|p| &p.nodes)
            .filter(|n| !n.pt.is_finite())
            .count();
        if non_finite > 0 {
            return Err(NoodleError::Round(format!(
                "{} non-finite nodes after rounding",
                non_finite
            )));
        }
        Ok(layer.with_paths(paths))
    }
}

impl ArcRounder {
    fn round_path(&self, path: &Path, radius: f64, tolerance: f64) -> Path {
        let accuracy = tolerance * 0.1;
        let segs: Vec<PathSeg> = path
            .to_bez_path()
            .segments()
            .filter(|s| (s.end() - s.start()).hypot() > MIN_SEGMENT || !is_line(s))
            .collect();
        let n = segs.len();
        if n < 2 {
            return path.clone();
        }
        let lens: Vec<f64> = segs.iter().map(|s| s.arclen(accuracy)).collect();

        // trims[j]: length cut from both sides of the join after segment j.
        let mut trims = vec![0.0; n];
        let joins = if path.closed { n } else { n - 1 };
        for j in 0..joins {
            let k = (j + 1) % n;
            let phi = angle_between(end_tangent(segs[j]), start_tangent(segs[k]));
            if phi < self.min_angle || phi > PI - CUSP_MARGIN {
                continue;
            }
            let d = (radius * (phi / 2.0).tan())
                .min(MAX_TRIM_SHARE * lens[j])
                .min(MAX_TRIM_SHARE * lens[k]);
            if d.is_finite() && d > tolerance {
                trims[j] = d;
            }
        }
        if trims.iter().all(|&d| d == 0.0) {
            return path.clone();
        }

        let trimmed: Vec<PathSeg> = (0..n)
            .map(|i| {
                let seg = segs[i];
                let head = trims[(i + n - 1) % n];
                let tail = trims[i];
                let t0 = if head > 0.0 { seg.inv_arclen(head, accuracy) } else { 0.0 };
                let t1 = if tail > 0.0 {
                    seg.inv_arclen(lens[i] - tail, accuracy)
                } else {
                    1.0
                };
                if t0.is_finite() && t1.is_finite() && t0 < t1 {
                    seg.subsegment(t0..t1)
                } else {
                    seg
                }
            })
            .collect();

        let mut out = BezPath::new();
        out.move_to(trimmed[0].start());
        for i in 0..n {
            push_seg(&mut out, trimmed[i]);
            if trims[i] > 0.0 {
                let next = trimmed[(i + 1) % n];
                arc_to(
                    &mut out,
                    trimmed[i].end(),
                    end_tangent(trimmed[i]),
                    next.start(),
                    start_tangent(next),
                );
            }
        }
        if path.closed {
            out.close_path();
        }
        let mut rounded = Path::from_bez_path(&out).into_iter().next().unwrap_or_default();
        rounded.closed = path.closed;
        rounded
    }
}

fn is_line(seg: &PathSeg) -> bool {
    matches!(seg, PathSeg::Line(_))
}

/// Circular cubic arc from `from` to `to`, tangent to both directions.
///
/// Falls back to a straight line when either tangent is degenerate.
fn arc_to(out: &mut BezPath, from: Point, dir_in: Vec2, to: Point, dir_out: Vec2) {
    let usable = |v: Vec2| v.is_finite() && v.hypot2() > MIN_SEGMENT * MIN_SEGMENT;
    if !usable(dir_in) || !usable(dir_out) {
        out.line_to(to);
        return;
    }
    let psi = angle_between(dir_in, dir_out);
    let chord = (to - from).hypot();
    if psi < 1e-6 || psi > PI - CUSP_MARGIN || chord < MIN_SEGMENT {
        out.line_to(to);
        return;
    }
    let r = chord / (2.0 * (psi / 2.0).sin());
    let handle = 4.0 / 3.0 * (psi / 4.0).tan() * r;
    out.curve_to(
        from + dir_in.normalize() * handle,
        to - dir_out.normalize() * handle,
        to,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, NodeKind};
    use kurbo::Shape;

    fn square() -> Path {
        Path::new(
            vec![
                Node::line(0.0, 0.0),
                Node::line(100.0, 0.0),
                Node::line(100.0, 100.0),
                Node::line(0.0, 100.0),
            ],
            true,
        )
    }

    #[test]
    fn square_corners_become_quarter_circles() {
        let layer = Layer::new(vec![square()]);
        let rounded = ArcRounder::default().round(&layer, 10.0, 0.01).unwrap();
        let path = &rounded.paths[0];
        assert!(path.closed);
        assert_eq!(path.on_curve_points().len(), 8);
        let outline = rounded.to_bez_path();
        assert!(!outline.contains(Point::new(1.0, 1.0)));
        assert!(outline.contains(Point::new(5.0, 5.0)));
        let b = outline.bounding_box();
        assert!(b.x0.abs() < 1e-6 && (b.x1 - 100.0).abs() < 1e-6, "{:?}", b);
        // Trimmed ends sit one radius away from each corner.
        assert_eq!(path.nodes[0].kind, NodeKind::Line);
        assert!((path.nodes[0].pt - Point::new(0.0, 10.0)).hypot() < 1e-6);
        assert_eq!(path.nodes[3].kind, NodeKind::Curve);
        assert!((path.nodes[3].pt - Point::new(10.0, 0.0)).hypot() < 1e-6);
    }

    #[test]
    fn open_path_keeps_its_ends() {
        let path = Path::open_polyline(&[
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
        ]);
        let rounded = ArcRounder::default()
            .round(&Layer::new(vec![path]), 10.0, 0.01)
            .unwrap();
        let p = &rounded.paths[0];
        assert!(!p.closed);
        assert_eq!(p.nodes[0].pt, Point::new(0.0, 0.0));
        assert_eq!(p.nodes.last().map(|n| n.pt), Some(Point::new(100.0, 100.0)));
        assert_eq!(p.len(), 6);
        assert_eq!(p.nodes[4].kind, NodeKind::Curve);
        assert!((p.nodes[1].pt - Point::new(90.0, 0.0)).hypot() < 1e-6);
        assert!((p.nodes[4].pt - Point::new(100.0, 10.0)).hypot() < 1e-6);
    }

    #[test]
    fn smooth_paths_are_untouched() {
        let circle = crate::caps::draw_circle(Point::new(0.0, 0.0), 10.0);
        let rounded = ArcRounder::default()
            .round(&Layer::new(vec![circle.clone()]), 5.0, 0.01)
            .unwrap();
        assert_eq!(rounded.paths[0], circle);
    }

    #[test]
    fn radius_is_clamped_to_half_the_shortest_side() {
        let thin = Path::new(
            vec![
                Node::line(0.0, 0.0),
                Node::line(100.0, 0.0),
                Node::line(100.0, 4.0),
                Node::line(0.0, 4.0),
            ],
            true,
        );
        let rounded = ArcRounder::default()
            .round(&Layer::new(vec![thin]), 10.0, 0.01)
            .unwrap();
        let b = rounded.to_bez_path().bounding_box();
        assert!((b.y1 - 4.0).abs() < 1e-6 && b.y0.abs() < 1e-6, "{:?}", b);
        assert!(rounded.paths[0]
            .nodes
            .iter()
            .all(|n| n.pt.x >= -1e-9 && n.pt.x <= 100.0 + 1e-9));
    }

    #[test]
    fn short_sides_between_sharp_joins_stay_finite() {
        // Both joins of the 0.5-unit side want far more than half of it.
        let sliver = Path::new(
            vec![
                Node::line(0.0, 0.0),
                Node::line(100.0, 0.0),
                Node::line(100.0, 0.5),
                Node::line(0.0, 0.5),
            ],
            true,
        );
        let spike = Path::new(
            vec![
                Node::line(0.0, 0.0),
                Node::line(50.0, 0.0),
                Node::line(50.0, 1e-6),
                Node::line(50.0, 1e-6),
                Node::line(0.0, 20.0),
            ],
            true,
        );
        let rounded = ArcRounder::default()
            .round(&Layer::new(vec![sliver, spike]), 20.0, 0.001)
            .unwrap();
        assert_eq!(rounded.paths.len(), 2);
        for path in &rounded.paths {
            assert!(path.closed);
            assert!(path.nodes.iter().all(|n| n.pt.is_finite()), "{:?}", path);
        }
    }
}
