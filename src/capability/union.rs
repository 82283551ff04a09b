//! Overlap removal on flattened contours.
//!
//! 1. Flatten every closed contour to a polygon ring
//! 2. Resolve all rings at once under the non-zero fill rule
//! 3. Refit cubic curves through the smooth runs between corners

use std::panic::{catch_unwind, AssertUnwindSafe};

use geo::{LineString, Simplify};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use kurbo::{fit_to_bezpath_opt, flatten, simplify::SimplifyBezPath, BezPath, PathEl, Point};

use super::OutlineUnifier;
use crate::error::NoodleError;
use crate::geom::{angle_between, polygon_area};
use crate::model::{Layer, Path};

type Ring = Vec<[f64; 2]>;

/// Unions contours with `i_overlay` (geo's boolean backend) and refits
/// curves with kurbo.
///
/// The result is the region the layer fills under the non-zero rule:
/// self-overlapping loops stay filled and oppositely wound contours cut
/// holes.
#[derive(Debug, Clone, Copy)]
pub struct GeoUnifier {
    /// Turning angle (radians) above which a ring vertex is kept as a
    /// corner instead of being smoothed over by the curve fit.
    pub corner_angle: f64,
    /// Curve fit accuracy as a multiple of the flattening tolerance.
    pub fit_factor: f64,
}

impl Default for GeoUnifier {
    fn default() -> Self {
        Self {
            corner_angle: 0.5,
            fit_factor: 4.0,
        }
    }
}

impl OutlineUnifier for GeoUnifier {
    fn unite(&self, layer: &Layer, tolerance: f64) -> Result<Layer, NoodleError> {
        let (closed, open): (Vec<&Path>, Vec<&Path>) = layer.paths.iter().partition(|p| p.closed);

        let rings: Vec<Ring> = closed
            .iter()
            .flat_map(|p| flatten_rings(&p.to_bez_path(), tolerance))
            .collect();
        if rings.iter().flatten().any(|p| !p[0].is_finite() || !p[1].is_finite()) {
            return Err(NoodleError::Union("non-finite coordinates".into()));
        }

        let shapes = catch_unwind(AssertUnwindSafe(|| {
            let clip: Vec<Ring> = Vec::new();
            rings.overlay(&clip, OverlayRule::Subject, FillRule::NonZero)
        }))
        .map_err(|_| NoodleError::Union("boolean backend panicked".into()))?;

        let accuracy = tolerance * self.fit_factor;
        let mut paths = Vec::new();
        for shape in &shapes {
            // First contour is the exterior, the rest are its holes.
            for (k, contour) in shape.iter().enumerate() {
                let ring = oriented(contour_points(contour), k == 0);
                paths.push(self.refit(&ring, tolerance, accuracy));
            }
        }
        paths.retain(|p| !p.is_empty());
        paths.extend(open.into_iter().cloned());
        Ok(layer.with_paths(paths))
    }
}

impl GeoUnifier {
    /// Fit cubics through a closed ring, keeping sharp vertices as corners.
    fn refit(&self, ring: &[Point], tolerance: f64, accuracy: f64) -> Path {
        let n = ring.len();
        if n < 3 {
            return Path::default();
        }
        let corners: Vec<usize> = (0..n)
            .filter(|&i| {
                let prev = ring[(i + n - 1) % n];
                let next = ring[(i + 1) % n];
                angle_between(ring[i] - prev, next - ring[i]) > self.corner_angle
            })
            .collect();

        let mut path = BezPath::new();
        if corners.is_empty() {
            let simplified = rdp_simplify(ring, tolerance * 0.5);
            let fitted = two_pass_fit(&points_to_path(&simplified, true), accuracy);
            path.extend(fitted.elements().iter().copied());
        } else {
            path.move_to(ring[corners[0]]);
            let count = corners.len();
            for ci in 0..count {
                let start = corners[ci];
                let end = corners[(ci + 1) % count];
                let segment = extract_segment(ring, start, end);
                if segment.len() <= 2 {
                    path.line_to(ring[end]);
                    continue;
                }
                let simplified = rdp_simplify(&segment, tolerance * 0.5);
                if simplified.len() <= 2 {
                    path.line_to(ring[end]);
                    continue;
                }
                let fitted = two_pass_fit(&points_to_path(&simplified, false), accuracy);
                path.extend(fitted.elements().iter().skip(1).copied());
            }
        }
        path.close_path();

        Path::from_bez_path(&path).into_iter().next().unwrap_or_default()
    }
}

/// Flatten a path into closed rings, one per subpath.
fn flatten_rings(path: &BezPath, tolerance: f64) -> Vec<Ring> {
    let mut rings = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    flatten(path.iter(), tolerance, |el| match el {
        PathEl::MoveTo(p) => {
            finish_ring(&mut rings, std::mem::take(&mut current));
            current.push(p);
        }
        PathEl::LineTo(p) => {
            if current.last() != Some(&p) {
                current.push(p);
            }
        }
        PathEl::ClosePath => finish_ring(&mut rings, std::mem::take(&mut current)),
        // flatten only emits lines
        PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => current.push(p),
    });
    finish_ring(&mut rings, current);
    rings
}

fn finish_ring(rings: &mut Vec<Ring>, mut ring: Vec<Point>) {
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    // A self-crossing ring can fill area with zero net area, so only
    // degenerate rings are dropped here.
    if ring.len() >= 3 {
        rings.push(ring.iter().map(|p| [p.x, p.y]).collect());
    }
}

fn contour_points(contour: &[[f64; 2]]) -> Vec<Point> {
    let mut points: Vec<Point> = contour.iter().map(|&[x, y]| Point::new(x, y)).collect();
    points.dedup();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

/// Orient a ring counter-clockwise (`ccw`) or clockwise.
fn oriented(mut ring: Vec<Point>, ccw: bool) -> Vec<Point> {
    if (polygon_area(&ring) > 0.0) != ccw {
        ring.reverse();
    }
    ring
}

/// Extract a cyclic sub-sequence from `start` to `end`, both included.
fn extract_segment(points: &[Point], start: usize, end: usize) -> Vec<Point> {
    let total = points.len();
    let mut result = Vec::new();
    let mut i = start;
    loop {
        result.push(points[i]);
        if i == end && result.len() > 1 {
            break;
        }
        i = (i + 1) % total;
    }
    result
}

/// RDP polyline simplification.
fn rdp_simplify(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() <= 2 || epsilon <= 0.0 {
        return points.to_vec();
    }
    LineString::from(points.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>())
        .simplify(&epsilon)
        .into_inner()
        .into_iter()
        .map(|coord| Point::new(coord.x, coord.y))
        .collect()
}

/// Two-pass fitting: polyline → curves → minimal curves.
fn two_pass_fit(path: &BezPath, accuracy: f64) -> BezPath {
    let pass1 = fit_to_bezpath_opt(&SimplifyBezPath::new(path.iter()), accuracy);
    fit_to_bezpath_opt(&SimplifyBezPath::new(pass1.iter()), accuracy)
}

/// Convert points to a line-segment BezPath.
fn points_to_path(points: &[Point], closed: bool) -> BezPath {
    let mut path = BezPath::new();
    if let Some((&first, rest)) = points.split_first() {
        path.move_to(first);
        for &p in rest {
            path.line_to(p);
        }
        if closed {
            path.close_path();
        }
    }
    path
}
