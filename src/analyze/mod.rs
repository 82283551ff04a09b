//! Curve analysis: extra on-curve nodes at extrema and inflections.
//!
//! Both passes find split times per cubic segment first, then rebuild the
//! node list once. Splitting never changes the visual shape of the path.

mod extrema;
mod inflection;

pub use extrema::add_extreme_points;
pub use inflection::{add_inflection_points, compute_inflection};

use kurbo::{CubicBez, Point};

use crate::model::{Layer, Node, NodeKind, Path};

/// Add extreme points, then inflection points, to every path of a layer.
pub fn add_extremes_and_inflections(layer: &mut Layer) {
    for path in &mut layer.paths {
        *path = add_inflection_points(&add_extreme_points(path));
    }
}

/// Split every cubic segment of `path` at the times returned by `split_times`.
///
/// `split_times` receives each cubic and returns sorted times in (0, 1).
fn split_cubics<F>(path: &Path, split_times: F) -> Path
where
    F: Fn(&CubicBez) -> Vec<f64>,
{
    let n = path.nodes.len();
    // Replacement nodes keyed by the index of the segment's end node.
    let mut replaced: Vec<Option<Vec<Node>>> = vec![None; n];
    let mut skip = vec![false; n];

    for i in 0..n {
        let Some([p0, p1, p2]) = segment_nodes(path, i) else {
            continue;
        };
        let cubic = CubicBez::new(
            path.nodes[p0].pt,
            path.nodes[p1].pt,
            path.nodes[p2].pt,
            path.nodes[i].pt,
        );
        let ts = split_times(&cubic);
        if ts.is_empty() {
            continue;
        }
        replaced[i] = Some(split_at_ts(&cubic, &ts));
        skip[p1] = true;
        skip[p2] = true;
    }

    if replaced.iter().all(Option::is_none) {
        return path.clone();
    }

    let mut nodes = Vec::with_capacity(n + 3 * replaced.iter().flatten().count());
    for (i, node) in path.nodes.iter().enumerate() {
        if let Some(pieces) = replaced[i].take() {
            nodes.extend(pieces);
        } else if !skip[i] {
            nodes.push(*node);
        }
    }
    Path::new(nodes, path.closed)
}

/// Indices of the start node and both handles of the cubic ending at `i`.
fn segment_nodes(path: &Path, i: usize) -> Option<[usize; 3]> {
    let n = path.nodes.len();
    if path.nodes[i].kind != NodeKind::Curve || n < 4 {
        return None;
    }
    if !path.closed && i < 3 {
        return None;
    }
    let idx = |back: usize| (i + n - back) % n;
    let (h2, h1, start) = (idx(1), idx(2), idx(3));
    let is_cubic = path.nodes[h1].kind == NodeKind::OffCurve
        && path.nodes[h2].kind == NodeKind::OffCurve
        && path.nodes[start].is_on_curve();
    is_cubic.then_some([start, h1, h2])
}

/// Split a cubic at sorted t-values, returning the replacement nodes.
///
/// The final on-curve node keeps the original end point exactly.
fn split_at_ts(cubic: &CubicBez, ts: &[f64]) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(3 * (ts.len() + 1));
    let mut rest = *cubic;
    let mut prev_t = 0.0;

    for &t in ts {
        let local = (t - prev_t) / (1.0 - prev_t);
        let (left, right) = subdivide(rest, local);
        push_cubic(&mut nodes, &left);
        rest = right;
        prev_t = t;
    }
    push_cubic(&mut nodes, &rest);
    if let Some(last) = nodes.last_mut() {
        last.pt = cubic.p3;
    }
    nodes
}

fn push_cubic(nodes: &mut Vec<Node>, c: &CubicBez) {
    nodes.push(Node::new(c.p1, NodeKind::OffCurve));
    nodes.push(Node::new(c.p2, NodeKind::OffCurve));
    nodes.push(Node::new(c.p3, NodeKind::Curve));
}

/// De Casteljau subdivision at parameter t.
fn subdivide(c: CubicBez, t: f64) -> (CubicBez, CubicBez) {
    let ab = c.p0.lerp(c.p1, t);
    let bc = c.p1.lerp(c.p2, t);
    let cd = c.p2.lerp(c.p3, t);
    let abc = ab.lerp(bc, t);
    let bcd = bc.lerp(cd, t);
    let mid: Point = abc.lerp(bcd, t);
    (
        CubicBez::new(c.p0, ab, abc, mid),
        CubicBez::new(mid, bcd, cd, c.p3),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keeps_line_segments_and_wraps_closed_handles() {
        // Closed path whose only cubic ends at node 0, handles at the tail.
        let path = Path::new(
            vec![
                Node::curve(0.0, 0.0),
                Node::line(100.0, 0.0),
                Node::off(100.0, 100.0),
                Node::off(0.0, 100.0),
            ],
            true,
        );
        let split = split_cubics(&path, |_| vec![0.5]);
        assert_eq!(split.len(), 7);
        assert_eq!(split.nodes[0].kind, NodeKind::OffCurve);
        assert_eq!(split.nodes[2].kind, NodeKind::Curve);
        assert_eq!(split.nodes[5].kind, NodeKind::Curve);
        assert_eq!(split.nodes[5].pt, Point::new(0.0, 0.0));
        assert_eq!(split.nodes[6].pt, Point::new(100.0, 0.0));
        // Midpoint of the cubic sits on the new node.
        assert!((split.nodes[2].pt - Point::new(50.0, 75.0)).hypot() < 1e-9);
    }

    #[test]
    fn open_path_curve_too_close_to_start_is_ignored() {
        let path = Path::new(vec![Node::off(0.0, 0.0), Node::curve(1.0, 1.0)], false);
        let split = split_cubics(&path, |_| vec![0.5]);
        assert_eq!(split, path);
    }
}
