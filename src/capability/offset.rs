//! Monoline expansion with kurbo's stroker.

use kurbo::{stroke, Affine, Cap, Join, Stroke, StrokeOpts};

use super::StrokeOffsetter;
use crate::error::NoodleError;
use crate::geom::node_area;
use crate::model::{Layer, Path};

/// Strokes each skeleton path with butt ends and miter joins.
///
/// Ends are left flat because round caps are synthesized separately,
/// and only where a skeleton end is really exposed.
#[derive(Debug, Clone, Copy)]
pub struct KurboOffsetter {
    /// Miter length limit, as a multiple of the stroke width.
    pub miter_limit: f64,
}

impl Default for KurboOffsetter {
    fn default() -> Self {
        Self { miter_limit: 4.0 }
    }
}

impl StrokeOffsetter for KurboOffsetter {
    fn offset(
        &self,
        layer: &Layer,
        half_width_x: f64,
        half_width_y: f64,
        make_closed_stroke: bool,
        tolerance: f64,
    ) -> Result<Layer, NoodleError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(half_width_x) || !valid(half_width_y) {
            return Err(NoodleError::Offset(format!(
                "half-widths must be positive, got {} x {}",
                half_width_x, half_width_y
            )));
        }

        // Unequal half-widths: stroke in a space where they are equal.
        let squash = half_width_y / half_width_x;
        let to_round = Affine::scale_non_uniform(1.0, 1.0 / squash);
        let from_round = Affine::scale_non_uniform(1.0, squash);
        let style = Stroke::new(2.0 * half_width_x)
            .with_caps(Cap::Butt)
            .with_join(Join::Miter)
            .with_miter_limit(self.miter_limit);
        let opts = StrokeOpts::default();

        let mut paths = Vec::with_capacity(layer.paths.len() * 2);
        for path in &layer.paths {
            if path.len() < 2 {
                continue;
            }
            let mut skeleton = path.to_bez_path();
            skeleton.apply_affine(to_round);
            let mut outline = stroke(skeleton.iter(), &style, &opts, tolerance);
            outline.apply_affine(from_round);

            let non_finite = outline
                .elements()
                .iter()
                .flat_map(|el| el.end_point())
                .any(|p| !p.is_finite());
            if non_finite {
                return Err(NoodleError::Offset(
                    "stroke produced non-finite coordinates".into(),
                ));
            }

            let mut contours = Path::from_bez_path(&outline);
            for contour in &mut contours {
                contour.closed = true;
            }
            if !make_closed_stroke && path.closed {
                contours = outward_only(contours);
            }
            paths.extend(contours);
        }
        Ok(layer.with_paths(paths))
    }
}

/// Keep the largest contour of a closed path's stroke: its outward side.
fn outward_only(contours: Vec<Path>) -> Vec<Path> {
    contours
        .into_iter()
        .max_by(|a, b| node_area(a).abs().total_cmp(&node_area(b).abs()))
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Rect, Shape};

    fn line(from: (f64, f64), to: (f64, f64)) -> Layer {
        Layer::new(vec![Path::open_polyline(&[from.into(), to.into()])])
    }

    fn bounds(layer: &Layer) -> Rect {
        layer.bounds().unwrap_or(Rect::ZERO)
    }

    #[test]
    fn straight_line_becomes_a_flat_ended_bar() {
        let out = KurboOffsetter::default()
            .offset(&line((0.0, 0.0), (100.0, 0.0)), 10.0, 10.0, true, 0.01)
            .unwrap();
        assert_eq!(out.paths.len(), 1);
        assert!(out.paths[0].closed);
        let b = bounds(&out);
        assert!((b.x0 - 0.0).abs() < 1e-6 && (b.x1 - 100.0).abs() < 1e-6);
        assert!((b.y0 + 10.0).abs() < 1e-6 && (b.y1 - 10.0).abs() < 1e-6);
    }

    #[test]
    fn unequal_half_widths_stretch_the_stroke() {
        let out = KurboOffsetter::default()
            .offset(&line((0.0, 0.0), (100.0, 0.0)), 10.0, 5.0, true, 0.01)
            .unwrap();
        let b = bounds(&out);
        assert!((b.y1 - 5.0).abs() < 1e-6, "got {:?}", b);
    }

    #[test]
    fn closed_skeleton_becomes_a_ring() {
        let square = Path::new(
            [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]
                .iter()
                .map(|&(x, y)| crate::model::Node::line(x, y))
                .collect(),
            true,
        );
        let layer = Layer::new(vec![square]);
        let ring = KurboOffsetter::default()
            .offset(&layer, 10.0, 10.0, true, 0.01)
            .unwrap();
        assert_eq!(ring.paths.len(), 2);
        let outline = ring.to_bez_path();
        assert!(outline.winding(Point::new(0.0, 50.0)) != 0);
        assert_eq!(outline.winding(Point::new(50.0, 50.0)), 0);

        let grown = KurboOffsetter::default()
            .offset(&layer, 10.0, 10.0, false, 0.01)
            .unwrap();
        assert_eq!(grown.paths.len(), 1);
        assert!((bounds(&grown).x0 + 10.0).abs() < 1e-6);
    }

    #[test]
    fn zero_half_width_is_rejected() {
        let err = KurboOffsetter::default().offset(&line((0.0, 0.0), (1.0, 0.0)), 0.0, 0.0, true, 0.01);
        assert!(matches!(err, Err(NoodleError::Offset(_))));
    }

    #[test]
    fn lone_nodes_vanish() {
        let layer = Layer::new(vec![Path::open_polyline(&[Point::new(3.0, 3.0)])]);
        let out = KurboOffsetter::default().offset(&layer, 5.0, 5.0, true, 0.01).unwrap();
        assert!(out.paths.is_empty());
    }
}
