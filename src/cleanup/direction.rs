//! Contour winding direction correction.
//!
//! Outer contours wind CCW and counters (holes) wind CW, the PostScript/CFF
//! convention with y pointing up.

use kurbo::{BezPath, ParamCurve, ParamCurveDeriv, PathSeg, Point, Shape, Vec2};

use crate::model::Layer;

/// How far inside its own boundary a contour is sampled.
const INSET: f64 = 1e-3;

/// Ensure outer contours are CCW, counters are CW.
///
/// Nesting comes from winding tests at a point just inside each contour
/// and at its nodes: contours nested inside an even number of others are
/// outer (CCW), odd = hole (CW). Open paths are neither tested nor counted.
pub fn correct_path_direction(layer: &mut Layer) {
    let outlines: Vec<Option<BezPath>> = layer
        .paths
        .iter()
        .map(|p| p.closed.then(|| p.to_bez_path()))
        .collect();

    for i in 0..layer.paths.len() {
        let Some(outline) = &outlines[i] else {
            continue;
        };
        let area = outline.area();
        if area == 0.0 {
            continue;
        }
        let Some(test_point) = interior_point(outline, area > 0.0) else {
            continue;
        };
        // Only contours that enclose this one entirely count; ones that
        // merely overlap it (kept overlaps) do not.
        let nodes = layer.paths[i].on_curve_points();
        let depth = outlines
            .iter()
            .enumerate()
            .filter(|&(j, other)| {
                j != i
                    && other.as_ref().is_some_and(|o| {
                        o.winding(test_point) != 0 && nodes.iter().all(|&p| o.winding(p) != 0)
                    })
            })
            .count();

        let should_be_ccw = depth % 2 == 0;
        if should_be_ccw != (area > 0.0) {
            layer.paths[i] = layer.paths[i].reversed();
        }
    }
}

/// A point inside `outline`, a short step off the middle of one of its
/// segments.
fn interior_point(outline: &BezPath, ccw: bool) -> Option<Point> {
    outline.segments().find_map(|seg| {
        let tangent = mid_tangent(seg);
        let length = tangent.hypot();
        if length < 1e-9 {
            return None;
        }
        let left = Vec2::new(-tangent.y, tangent.x) / length;
        let inward = if ccw { left } else { -left };
        let step = INSET.min(0.01 * (seg.end() - seg.start()).hypot().max(INSET));
        let candidate = seg.eval(0.5) + inward * step;
        (outline.winding(candidate) != 0).then_some(candidate)
    })
}

fn mid_tangent(seg: PathSeg) -> Vec2 {
    match seg {
        PathSeg::Line(l) => l.p1 - l.p0,
        PathSeg::Quad(q) => q.deriv().eval(0.5).to_vec2(),
        PathSeg::Cubic(c) => c.deriv().eval(0.5).to_vec2(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caps::draw_circle;
    use crate::geom::node_area;
    use crate::model::{Node, Path};

    fn square(x0: f64, y0: f64, size: f64, ccw: bool) -> Path {
        let mut pts = vec![
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
        ];
        if !ccw {
            pts.reverse();
        }
        Path::new(pts.into_iter().map(|(x, y)| Node::line(x, y)).collect(), true)
    }

    #[test]
    fn outer_ccw_hole_cw() {
        let mut layer = Layer::new(vec![
            square(0.0, 0.0, 100.0, false),
            square(25.0, 25.0, 50.0, true),
        ]);
        correct_path_direction(&mut layer);
        assert!(node_area(&layer.paths[0]) > 0.0, "outer should be CCW");
        assert!(node_area(&layer.paths[1]) < 0.0, "hole should be CW");
    }

    #[test]
    fn separate_contours_are_all_outer() {
        let mut layer = Layer::new(vec![
            square(0.0, 0.0, 10.0, false),
            square(20.0, 0.0, 10.0, true),
        ]);
        correct_path_direction(&mut layer);
        assert!(layer.paths.iter().all(|p| node_area(p) > 0.0));
    }

    #[test]
    fn island_inside_hole_is_outer() {
        let mut layer = Layer::new(vec![
            square(0.0, 0.0, 100.0, true),
            square(10.0, 10.0, 80.0, true),
            square(40.0, 40.0, 20.0, false),
        ]);
        correct_path_direction(&mut layer);
        assert!(node_area(&layer.paths[0]) > 0.0);
        assert!(node_area(&layer.paths[1]) < 0.0);
        assert!(node_area(&layer.paths[2]) > 0.0);
    }

    #[test]
    fn ring_counter_is_a_hole() {
        // The outer circle's centre lies in its own counter.
        let mut layer = Layer::new(vec![
            draw_circle(Point::new(0.0, 0.0), 50.0).reversed(),
            draw_circle(Point::new(0.0, 0.0), 30.0),
        ]);
        correct_path_direction(&mut layer);
        assert!(layer.paths[0].to_bez_path().area() > 0.0);
        assert!(layer.paths[1].to_bez_path().area() < 0.0);
        let outline = layer.to_bez_path();
        assert_eq!(outline.winding(Point::new(0.0, 0.0)), 0);
        assert_ne!(outline.winding(Point::new(40.0, 0.0)), 0);
    }

    #[test]
    fn open_paths_are_left_alone() {
        let open = Path::open_polyline(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        let mut layer = Layer::new(vec![open.clone(), square(-5.0, -5.0, 20.0, false)]);
        correct_path_direction(&mut layer);
        assert_eq!(layer.paths[0], open);
        assert!(node_area(&layer.paths[1]) > 0.0);
    }

    #[test]
    fn overlapping_contours_are_both_outer() {
        let mut layer = Layer::new(vec![
            square(0.0, 0.0, 100.0, true),
            draw_circle(Point::new(100.0, 50.0), 20.0).reversed(),
        ]);
        correct_path_direction(&mut layer);
        assert!(node_area(&layer.paths[0]) > 0.0);
        assert!(node_area(&layer.paths[1]) > 0.0);
    }
}
