//! Redundant node removal.
//!
//! Drops segments too short to matter, converts near-straight curves to
//! lines and merges collinear line segments.

use kurbo::{BezPath, PathEl, Point, Vec2};

use crate::model::{NodeKind, Path};

/// Run all three passes over one path. Paths left without a segment are
/// dropped.
pub fn tidy_path(path: &Path, tolerance: f64) -> Option<Path> {
    if path.len() < 2 {
        return None;
    }
    let bez = path.to_bez_path();
    let bez = remove_tiny(&bez, tolerance);
    let bez = curves_to_lines(&bez, tolerance);
    let bez = merge_collinear(&bez, tolerance);
    let mut out = Path::from_bez_path(&bez).into_iter().next()?;
    if out.closed {
        drop_closing_duplicate(&mut out, tolerance);
    }
    let min_nodes = if out.closed { 3 } else { 2 };
    (out.len() >= min_nodes).then_some(out)
}

/// The closing line appended on import may duplicate a node that sits
/// within `tolerance` of the start point.
fn drop_closing_duplicate(path: &mut Path, tolerance: f64) {
    let n = path.len();
    if n < 3 {
        return;
    }
    let last = path.nodes[n - 1];
    let before = path.nodes[n - 2];
    if last.kind == NodeKind::Line
        && before.is_on_curve()
        && (last.pt - before.pt).hypot() < tolerance
    {
        path.nodes.pop();
    }
}

/// Convert curves where both handles hug the chord.
pub fn curves_to_lines(path: &BezPath, tolerance: f64) -> BezPath {
    let mut output = BezPath::new();
    let mut current = Point::ZERO;

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                output.move_to(p);
                current = p;
            }
            PathEl::CurveTo(a, b, p) => {
                let d1 = point_to_line_dist(a, current, p);
                let d2 = point_to_line_dist(b, current, p);
                if d1 < tolerance && d2 < tolerance && within_chord(a, b, current, p) {
                    output.line_to(p);
                } else {
                    output.curve_to(a, b, p);
                }
                current = p;
            }
            PathEl::LineTo(p) => {
                output.line_to(p);
                current = p;
            }
            PathEl::QuadTo(a, p) => {
                output.quad_to(a, p);
                current = p;
            }
            PathEl::ClosePath => output.close_path(),
        }
    }
    output
}

/// Merge consecutive collinear line segments.
pub fn merge_collinear(path: &BezPath, tolerance: f64) -> BezPath {
    let mut output = BezPath::new();
    let mut anchor = Point::ZERO;
    let mut pending: Option<Point> = None;

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                flush(&mut output, &mut pending);
                output.move_to(p);
                anchor = p;
            }
            PathEl::LineTo(p) => match pending {
                Some(mid)
                    if point_to_line_dist(mid, anchor, p) < tolerance
                        && (mid - anchor).dot(p - mid) > 0.0 =>
                {
                    pending = Some(p);
                }
                Some(mid) => {
                    output.line_to(mid);
                    anchor = mid;
                    pending = Some(p);
                }
                None => pending = Some(p),
            },
            PathEl::CurveTo(a, b, p) => {
                flush(&mut output, &mut pending);
                output.curve_to(a, b, p);
                anchor = p;
            }
            PathEl::QuadTo(a, p) => {
                flush(&mut output, &mut pending);
                output.quad_to(a, p);
                anchor = p;
            }
            PathEl::ClosePath => {
                flush(&mut output, &mut pending);
                output.close_path();
            }
        }
    }
    flush(&mut output, &mut pending);
    output
}

/// Remove segments shorter than `tolerance`.
pub fn remove_tiny(path: &BezPath, tolerance: f64) -> BezPath {
    let mut output = BezPath::new();
    let mut current = Point::ZERO;
    let tolerance_sq = tolerance * tolerance;

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                output.move_to(p);
                current = p;
            }
            PathEl::LineTo(p) => {
                if dist_sq(current, p) >= tolerance_sq {
                    output.line_to(p);
                    current = p;
                }
            }
            PathEl::CurveTo(a, b, p) => {
                let span = dist_sq(current, p).max(dist_sq(current, a)).max(dist_sq(current, b));
                if span >= tolerance_sq {
                    output.curve_to(a, b, p);
                    current = p;
                }
            }
            PathEl::QuadTo(a, p) => {
                if dist_sq(current, p).max(dist_sq(current, a)) >= tolerance_sq {
                    output.quad_to(a, p);
                    current = p;
                }
            }
            PathEl::ClosePath => output.close_path(),
        }
    }
    output
}

/// Distance from point P to line through A→B.
fn point_to_line_dist(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let ap = p - a;
    let len_sq = ab.hypot2();
    if len_sq < 1e-10 {
        return ap.hypot();
    }
    ab.cross(ap).abs() / len_sq.sqrt()
}

/// Both handles project inside the chord, so the curve never doubles back.
fn within_chord(a: Point, b: Point, p0: Point, p1: Point) -> bool {
    let chord: Vec2 = p1 - p0;
    let len_sq = chord.hypot2();
    if len_sq < 1e-10 {
        return false;
    }
    [a, b].iter().all(|&h| {
        let t = (h - p0).dot(chord) / len_sq;
        (0.0..=1.0).contains(&t)
    })
}

fn flush(output: &mut BezPath, pending: &mut Option<Point>) {
    if let Some(p) = pending.take() {
        output.line_to(p);
    }
}

fn dist_sq(a: Point, b: Point) -> f64 {
    (a - b).hypot2()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;

    #[test]
    fn collinear_lines_merge() {
        let path = Path::new(
            vec![
                Node::line(0.0, 0.0),
                Node::line(5.0, 0.0),
                Node::line(10.0, 0.0),
                Node::line(10.0, 10.0),
                Node::line(0.0, 10.0),
            ],
            true,
        );
        let tidy = tidy_path(&path, 0.01).unwrap();
        assert_eq!(tidy.on_curve_points().len(), 4, "got {:?}", tidy.nodes);
        assert!(!tidy.nodes.iter().any(|n| n.pt == Point::new(5.0, 0.0)));
    }

    #[test]
    fn flat_curve_becomes_line() {
        let path = Path::new(
            vec![
                Node::line(0.0, 0.0),
                Node::off(3.0, 0.0),
                Node::off(7.0, 0.0),
                Node::curve(10.0, 0.0),
            ],
            false,
        );
        let tidy = tidy_path(&path, 0.01).unwrap();
        assert_eq!(tidy.len(), 2);
        assert_eq!(tidy.nodes[1].kind, NodeKind::Line);
    }

    #[test]
    fn tiny_segment_is_dropped() {
        let path = Path::open_polyline(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 0.0001),
            Point::new(10.0, 10.0),
        ]);
        let tidy = tidy_path(&path, 0.01).unwrap();
        assert_eq!(tidy.len(), 3);
    }

    #[test]
    fn real_curve_survives() {
        let path = Path::new(
            vec![
                Node::line(0.0, 0.0),
                Node::off(0.0, 10.0),
                Node::off(10.0, 10.0),
                Node::curve(10.0, 0.0),
            ],
            false,
        );
        assert_eq!(tidy_path(&path, 0.01).unwrap(), path);
    }

    #[test]
    fn degenerate_path_disappears() {
        let path = Path::open_polyline(&[Point::new(0.0, 0.0), Point::new(0.0, 0.0)]);
        assert!(tidy_path(&path, 0.01).is_none());
    }
}
