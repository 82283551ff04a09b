//! Round end caps for open skeleton ends.
//!
//! Ends are recorded before the skeleton is expanded, because the stroke
//! outline no longer has them. After expansion each recorded end that is
//! really exposed gets a closed circle of the stroke radius.

use std::f64::consts::SQRT_2;

use kurbo::{Affine, BezPath, Point, Vec2};

use crate::capability::ContainmentOracle;
use crate::model::{Layer, Node, NodeKind, Path};

/// Handle length of a quarter circle, as a fraction of its radius.
pub const KAPPA: f64 = 4.0 * (SQRT_2 - 1.0) / 3.0;

/// An open-path terminus and the node next to it.
///
/// The neighbour gives the direction the stroke arrives from, which
/// orients the cap when orientation matters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndpointRecord {
    pub position: Point,
    pub neighbor: Point,
}

impl EndpointRecord {
    /// Direction from the neighbour out through the terminus, in radians.
    /// `None` when the two coincide.
    pub fn angle(&self) -> Option<f64> {
        let dir: Vec2 = self.position - self.neighbor;
        (dir.hypot2() > 1e-18).then(|| dir.atan2())
    }
}

/// Both ends of every open path with more than one node.
pub fn endpoint_records(layer: &Layer) -> Vec<EndpointRecord> {
    let mut records = Vec::new();
    for path in layer.paths.iter().filter(|p| !p.closed) {
        let n = path.nodes.len();
        if n < 2 {
            continue;
        }
        records.push(EndpointRecord {
            position: path.nodes[0].pt,
            neighbor: path.nodes[1].pt,
        });
        records.push(EndpointRecord {
            position: path.nodes[n - 1].pt,
            neighbor: path.nodes[n - 2].pt,
        });
    }
    records
}

/// Whether `point` is a real, exposed end of the filled `reference` outline.
///
/// Tests the four diagonal neighbours one unit away. If any of them falls
/// outside the filled region the end is exposed and needs a cap. This is a
/// heuristic: an end buried inside another stroke has all four test points
/// covered.
pub fn is_open_end<O>(point: Point, reference: &BezPath, oracle: &O) -> bool
where
    O: ContainmentOracle + ?Sized,
{
    [(-1.0, -1.0), (-1.0, 1.0), (1.0, -1.0), (1.0, 1.0)]
        .iter()
        .any(|&(dx, dy)| !oracle.contains(reference, point + Vec2::new(dx, dy)))
}

/// A closed circle of four cubic quadrants, 12 nodes.
///
/// On-curve nodes sit at the west, south, east and north points, in
/// that order; the path runs counter-clockwise and starts at north.
pub fn draw_circle(center: Point, radius: f64) -> Path {
    let handle = KAPPA * radius;
    let Point { x, y } = center;
    let (left, right) = (x - radius, x + radius);
    let (top, bottom) = (y + radius, y - radius);

    let quadrants = [
        [(x - handle, top), (left, y + handle), (left, y)],
        [(left, y - handle), (x - handle, bottom), (x, bottom)],
        [(x + handle, bottom), (right, y - handle), (right, y)],
        [(right, y + handle), (x + handle, top), (x, top)],
    ];

    let mut nodes = Vec::with_capacity(12);
    for [a, b, end] in quadrants {
        nodes.push(Node::new(a.into(), NodeKind::OffCurve));
        nodes.push(Node::new(b.into(), NodeKind::OffCurve));
        nodes.push(Node::new(end.into(), NodeKind::Curve));
    }
    Path::new(nodes, true)
}

/// A cap for `record`, rotated so its nodes follow the stroke direction.
pub fn oriented_circle(record: &EndpointRecord, radius: f64) -> Path {
    let mut circle = draw_circle(record.position, radius);
    if let Some(angle) = record.angle() {
        let around = Affine::translate(record.position.to_vec2())
            * Affine::rotate(angle)
            * Affine::translate(-record.position.to_vec2());
        circle.transform(around);
    }
    circle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::WindingOracle;
    use kurbo::Rect;
    use kurbo::Shape;

    #[test]
    fn circle_has_twelve_nodes_on_the_radius() {
        let circle = draw_circle(Point::ZERO, 10.0);
        assert_eq!(circle.len(), 12);
        assert!(circle.closed);
        let on_curve: Vec<Point> = circle.on_curve_points();
        assert_eq!(on_curve.len(), 4);
        for p in &on_curve {
            assert!((p.distance(Point::ZERO) - 10.0).abs() < 1e-6);
        }
        assert_eq!(
            on_curve,
            vec![
                Point::new(-10.0, 0.0),
                Point::new(0.0, -10.0),
                Point::new(10.0, 0.0),
                Point::new(0.0, 10.0),
            ]
        );
        for (i, node) in circle.nodes.iter().enumerate() {
            let expected = if i % 3 == 2 { NodeKind::Curve } else { NodeKind::OffCurve };
            assert_eq!(node.kind, expected);
        }
    }

    #[test]
    fn circle_handles_use_the_quarter_circle_constant() {
        let circle = draw_circle(Point::new(5.0, 5.0), 10.0);
        assert!((circle.nodes[0].pt.x - (5.0 - KAPPA * 10.0)).abs() < 1e-12);
        assert!((KAPPA - 0.5523).abs() < 1e-4);
        let bounds = circle.to_bez_path().bounding_box();
        assert!((bounds.width() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn both_ends_of_a_bare_line_are_open() {
        let layer = Layer::new(vec![Path::open_polyline(&[
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        ])]);
        let reference = Rect::new(0.0, -10.0, 100.0, 10.0).to_path(0.1);
        let records = endpoint_records(&layer);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].neighbor, Point::new(0.0, 0.0));
        for r in &records {
            assert!(is_open_end(r.position, &reference, &WindingOracle));
        }
    }

    #[test]
    fn buried_end_is_not_open() {
        let reference = Rect::new(-50.0, -50.0, 50.0, 50.0).to_path(0.1);
        assert!(!is_open_end(Point::ZERO, &reference, &WindingOracle));
    }

    #[test]
    fn closed_and_single_node_paths_have_no_ends() {
        let mut layer = Layer::new(vec![draw_circle(Point::ZERO, 5.0)]);
        layer.paths.push(Path::open_polyline(&[Point::new(1.0, 1.0)]));
        assert!(endpoint_records(&layer).is_empty());
    }

    #[test]
    fn oriented_cap_turns_with_the_stroke() {
        let record = EndpointRecord {
            position: Point::new(0.0, 0.0),
            neighbor: Point::new(-10.0, -10.0),
        };
        let cap = oriented_circle(&record, 10.0);
        let east = cap.on_curve_points()[2];
        let expected = Point::new(10.0 / SQRT_2, 10.0 / SQRT_2);
        assert!((east - expected).hypot() < 1e-9, "{:?}", east);

        let degenerate = EndpointRecord {
            position: Point::ZERO,
            neighbor: Point::ZERO,
        };
        assert_eq!(oriented_circle(&degenerate, 10.0), draw_circle(Point::ZERO, 10.0));
    }
}
