//! Layer, path and node types.
//!
//! Node lists follow the font-editor convention: the kind of an on-curve
//! node describes the segment that arrives at it, and the off-curve nodes
//! directly before a `Curve` node are its handles. A closed path is
//! cyclic, so its first segment starts at the last on-curve node.

use std::collections::BTreeSet;

use kurbo::{Affine, BezPath, PathEl, Point, QuadBez, Rect, Shape, Vec2};

/// Coordinates closer than this are treated as the same point.
const SAME_POINT: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// On-curve node reached by a straight segment.
    Line,
    /// On-curve node reached by a cubic segment.
    Curve,
    /// Bezier handle.
    OffCurve,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub pt: Point,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(pt: Point, kind: NodeKind) -> Self {
        Self { pt, kind }
    }

    pub fn line(x: f64, y: f64) -> Self {
        Self::new(Point::new(x, y), NodeKind::Line)
    }

    pub fn curve(x: f64, y: f64) -> Self {
        Self::new(Point::new(x, y), NodeKind::Curve)
    }

    pub fn off(x: f64, y: f64) -> Self {
        Self::new(Point::new(x, y), NodeKind::OffCurve)
    }

    pub fn is_on_curve(&self) -> bool {
        self.kind != NodeKind::OffCurve
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub nodes: Vec<Node>,
    pub closed: bool,
}

impl Path {
    pub fn new(nodes: Vec<Node>, closed: bool) -> Self {
        Self { nodes, closed }
    }

    /// An open path through `points`, all joined by straight segments.
    pub fn open_polyline(points: &[Point]) -> Self {
        let nodes = points.iter().map(|&p| Node::new(p, NodeKind::Line)).collect();
        Self::new(nodes, false)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn on_curve_points(&self) -> Vec<Point> {
        self.nodes
            .iter()
            .filter(|n| n.is_on_curve())
            .map(|n| n.pt)
            .collect()
    }

    /// Build a `BezPath` with one subpath. Closed paths get a `ClosePath`.
    pub fn to_bez_path(&self) -> BezPath {
        let mut out = BezPath::new();
        let n = self.nodes.len();
        if n == 0 {
            return out;
        }
        let start = if self.closed {
            match self.nodes.iter().rposition(Node::is_on_curve) {
                Some(i) => i,
                None => return out,
            }
        } else {
            0
        };
        out.move_to(self.nodes[start].pt);

        let steps = if self.closed { n } else { n - 1 };
        let mut handles: Vec<Point> = Vec::with_capacity(2);
        for k in 1..=steps {
            let node = self.nodes[(start + k) % n];
            if node.kind == NodeKind::OffCurve {
                handles.push(node.pt);
                continue;
            }
            match handles.as_slice() {
                [] => out.line_to(node.pt),
                [a] => out.quad_to(*a, node.pt),
                [a, .., b] => out.curve_to(*a, *b, node.pt),
            }
            handles.clear();
        }
        if self.closed {
            out.close_path();
        }
        out
    }

    /// Split a `BezPath` into paths, one per subpath.
    ///
    /// Quadratic segments are raised to cubics. A closed subpath whose last
    /// segment does not return to its start gets an explicit closing line.
    pub fn from_bez_path(bez: &BezPath) -> Vec<Path> {
        let mut paths = Vec::new();
        let mut current: Option<(Point, Vec<Node>)> = None;
        let mut last = Point::ZERO;

        for el in bez.elements() {
            match *el {
                PathEl::MoveTo(p) => {
                    if let Some((start, nodes)) = current.take() {
                        paths.push(finish_open(start, nodes));
                    }
                    current = Some((p, Vec::new()));
                    last = p;
                }
                PathEl::LineTo(p) => {
                    if let Some((_, nodes)) = current.as_mut() {
                        nodes.push(Node::new(p, NodeKind::Line));
                    }
                    last = p;
                }
                PathEl::QuadTo(a, p) => {
                    let cubic = QuadBez::new(last, a, p).raise();
                    if let Some((_, nodes)) = current.as_mut() {
                        nodes.push(Node::new(cubic.p1, NodeKind::OffCurve));
                        nodes.push(Node::new(cubic.p2, NodeKind::OffCurve));
                        nodes.push(Node::new(p, NodeKind::Curve));
                    }
                    last = p;
                }
                PathEl::CurveTo(a, b, p) => {
                    if let Some((_, nodes)) = current.as_mut() {
                        nodes.push(Node::new(a, NodeKind::OffCurve));
                        nodes.push(Node::new(b, NodeKind::OffCurve));
                        nodes.push(Node::new(p, NodeKind::Curve));
                    }
                    last = p;
                }
                PathEl::ClosePath => {
                    if let Some((start, mut nodes)) = current.take() {
                        let returns = nodes
                            .last()
                            .is_some_and(|n| (n.pt - start).hypot() < SAME_POINT);
                        if !returns {
                            nodes.push(Node::new(start, NodeKind::Line));
                        }
                        paths.push(Path::new(nodes, true));
                        last = start;
                    }
                }
            }
        }
        if let Some((start, nodes)) = current.take() {
            paths.push(finish_open(start, nodes));
        }
        paths
    }

    pub fn translate(&mut self, offset: Vec2) {
        for node in &mut self.nodes {
            node.pt += offset;
        }
    }

    pub fn transform(&mut self, affine: Affine) {
        for node in &mut self.nodes {
            node.pt = affine * node.pt;
        }
    }

    /// The path with its direction reversed.
    pub fn reversed(&self) -> Path {
        let reversed = self.to_bez_path().reverse_subpaths();
        Path::from_bez_path(&reversed)
            .into_iter()
            .next()
            .unwrap_or_default()
    }
}

fn finish_open(start: Point, mut nodes: Vec<Node>) -> Path {
    nodes.insert(0, Node::new(start, NodeKind::Line));
    Path::new(nodes, false)
}

/// Index of a node inside a layer: the owning path, then the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    pub path: usize,
    pub node: usize,
}

/// A reference to another glyph, carried with its resolved outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub base: String,
    pub transform: Affine,
    /// Outline of the base glyph in the base glyph's own coordinates.
    pub paths: Vec<Path>,
}

impl Component {
    /// The base outline placed by this component's transform.
    pub fn outline(&self) -> BezPath {
        let mut out = BezPath::new();
        for path in &self.paths {
            out.extend(path.to_bez_path().elements().iter().copied());
        }
        out.apply_affine(self.transform);
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    pub paths: Vec<Path>,
    pub components: Vec<Component>,
    pub selection: BTreeSet<NodeId>,
}

impl Layer {
    pub fn new(paths: Vec<Path>) -> Self {
        Self {
            paths,
            ..Self::default()
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.paths.get(id.path)?.nodes.get(id.node)
    }

    /// Bounding box of the paths; components are not included.
    pub fn bounds(&self) -> Option<Rect> {
        self.paths
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| p.to_bez_path().bounding_box())
            .reduce(|a, b| a.union(b))
    }

    pub fn translate(&mut self, offset: Vec2) {
        for path in &mut self.paths {
            path.translate(offset);
        }
    }

    /// All paths as one `BezPath`.
    pub fn to_bez_path(&self) -> BezPath {
        let mut out = BezPath::new();
        for path in &self.paths {
            out.extend(path.to_bez_path().elements().iter().copied());
        }
        out
    }

    /// Paths plus placed component outlines, as one `BezPath`.
    pub fn to_bez_path_with_components(&self) -> BezPath {
        let mut out = self.to_bez_path();
        for component in &self.components {
            out.extend(component.outline().elements().iter().copied());
        }
        out
    }

    /// Same components, different paths. The selection is dropped since
    /// its node ids point into the old paths.
    pub fn with_paths(&self, paths: Vec<Path>) -> Layer {
        Layer {
            paths,
            components: self.components.clone(),
            selection: BTreeSet::new(),
        }
    }
}
