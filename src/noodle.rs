//! The noodle pipeline: open skeleton strokes to capped monoline outlines.
//!
//! Per width, in this order: record ends, add extremes and inflections,
//! expand, cap the exposed ends, remove overlap, round corners, tidy.
//! Cap decisions for every width are made against one outline expanded at
//! the thinnest width, so all widths agree on which ends are exposed.

use kurbo::{BezPath, Vec2};
use tracing::{debug, warn};

use crate::analyze::add_extremes_and_inflections;
use crate::capability::{
    ArcRounder, ContainmentOracle, CornerRounder, GeoUnifier, KurboOffsetter, OutlineUnifier,
    StrokeOffsetter, WindingOracle,
};
use crate::caps::{draw_circle, endpoint_records, is_open_end, oriented_circle};
use crate::cleanup::{correct_path_direction, tidy};
use crate::config::NoodleConfig;
use crate::error::{NoodleError, Stage, StageError, Warning};
use crate::geom::node_area;
use crate::model::Layer;

/// Outcome of one pipeline run: the outline plus whatever went wrong on
/// the way. Failed stages are skipped, so `layer` is always usable.
#[derive(Debug)]
pub struct NoodleReport {
    pub layer: Layer,
    pub errors: Vec<StageError>,
    pub warnings: Vec<Warning>,
}

impl NoodleReport {
    fn new(layer: Layer) -> Self {
        Self {
            layer,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// No stage failed and nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    fn record(&mut self, stage: Stage, width: f64, error: NoodleError) {
        warn!(%stage, width, %error, "noodle stage failed, continuing");
        self.errors.push(StageError {
            stage,
            width,
            error,
        });
    }

    fn absorb(&mut self, other: NoodleReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Runs the pipeline with a fixed set of geometry capabilities.
#[derive(Debug, Clone)]
pub struct Noodler<O = KurboOffsetter, U = GeoUnifier, R = ArcRounder, C = WindingOracle> {
    config: NoodleConfig,
    offsetter: O,
    unifier: U,
    rounder: R,
    oracle: C,
}

impl Noodler {
    /// A noodler backed by the built-in kurbo and geo capabilities.
    pub fn new(config: NoodleConfig) -> Self {
        let unifier = GeoUnifier {
            corner_angle: config.corner_angle_threshold,
            ..GeoUnifier::default()
        };
        Self::with_capabilities(
            config,
            KurboOffsetter::default(),
            unifier,
            ArcRounder::default(),
            WindingOracle,
        )
    }
}

impl Default for Noodler {
    fn default() -> Self {
        Self::new(NoodleConfig::default())
    }
}

impl<O, U, R, C> Noodler<O, U, R, C>
where
    O: StrokeOffsetter,
    U: OutlineUnifier,
    R: CornerRounder,
    C: ContainmentOracle,
{
    pub fn with_capabilities(
        config: NoodleConfig,
        offsetter: O,
        unifier: U,
        rounder: R,
        oracle: C,
    ) -> Self {
        Self {
            config,
            offsetter,
            unifier,
            rounder,
            oracle,
        }
    }

    pub fn config(&self) -> &NoodleConfig {
        &self.config
    }

    /// Parameters can change between runs, e.g. while previewing.
    pub fn config_mut(&mut self) -> &mut NoodleConfig {
        &mut self.config
    }

    /// Noodle `skeleton` at every configured width and merge the results.
    ///
    /// Zero widths are skipped; negative or non-finite ones are reported
    /// and skipped. The merged layer has its selection cleared and its
    /// contours wound by nesting depth.
    pub fn noodle(&self, skeleton: &Layer) -> NoodleReport {
        let mut report = NoodleReport::new(skeleton.clone());
        let (widths, invalid): (Vec<f64>, Vec<f64>) = self
            .config
            .usable_widths()
            .into_iter()
            .partition(|w| w.is_finite() && *w > 0.0);
        for &width in &invalid {
            report.record(Stage::Offset, width, invalid_width(width));
        }
        if widths.is_empty() {
            warn!("no usable width, leaving skeleton untouched");
            report.warnings.push(Warning::NoUsableWidth);
            return report;
        }
        if skeleton.paths.is_empty() {
            debug!("nothing to noodle");
            return report;
        }

        let thinnest = widths.iter().copied().fold(f64::INFINITY, f64::min);
        let reference = match self.thinnest_reference(skeleton, thinnest) {
            Ok(reference) => reference,
            Err(error) => {
                report.record(Stage::Reference, thinnest, error);
                skeleton.with_paths(Vec::new()).to_bez_path_with_components()
            }
        };

        let mut paths = Vec::new();
        for &width in &widths {
            let mut noodled = self.noodle_layer(skeleton, width, &reference);
            paths.append(&mut noodled.layer.paths);
            report.absorb(noodled);
        }

        report.layer = skeleton.with_paths(paths);
        correct_path_direction(&mut report.layer);
        debug!(
            widths = widths.len(),
            paths = report.layer.paths.len(),
            errors = report.errors.len(),
            "noodled layer"
        );
        report
    }

    /// Noodle `skeleton` at a single width, with its own reference outline.
    pub fn noodle_width(&self, skeleton: &Layer, width: f64) -> NoodleReport {
        if let Err(error) = self.effective_width(width) {
            let mut report = NoodleReport::new(skeleton.with_paths(Vec::new()));
            report.record(Stage::Offset, width, error);
            return report;
        }
        match self.thinnest_reference(skeleton, width) {
            Ok(reference) => self.noodle_layer(skeleton, width, &reference),
            Err(error) => {
                let reference = skeleton.with_paths(Vec::new()).to_bez_path_with_components();
                let mut report = self.noodle_layer(skeleton, width, &reference);
                report.record(Stage::Reference, width, error);
                report
            }
        }
    }

    /// The filled outline that decides which skeleton ends get caps.
    ///
    /// Always has extremes and inflections added, whatever the
    /// configuration says, and includes component outlines.
    pub fn thinnest_reference(&self, skeleton: &Layer, width: f64) -> Result<BezPath, NoodleError> {
        let width = self.effective_width(width)?;
        let radius = width * 0.5;
        let mut thin = skeleton.clone();
        add_extremes_and_inflections(&mut thin);
        let expanded = self.offsetter.offset(
            &thin,
            radius,
            radius,
            true,
            self.config.tolerance_for(radius),
        )?;
        Ok(expanded.to_bez_path_with_components())
    }

    /// One width through the whole pipeline. The direction of the result
    /// is not corrected; [`Noodler::noodle`] does that after merging.
    ///
    /// An invalid width yields an empty layer and an error.
    pub fn noodle_layer(&self, skeleton: &Layer, width: f64, reference: &BezPath) -> NoodleReport {
        let mut report = NoodleReport::new(skeleton.with_paths(Vec::new()));
        let width = match self.effective_width(width) {
            Ok(width) => width,
            Err(error) => {
                report.record(Stage::Offset, width, error);
                return report;
            }
        };
        if skeleton.paths.is_empty() {
            return report;
        }
        let radius = width * 0.5;
        let tolerance = self.config.tolerance_for(radius);

        // ── Ends ──────────────────────────────────────────────
        let ends = endpoint_records(skeleton);
        let mut layer = skeleton.clone();
        if self.config.extremes_and_inflections {
            add_extremes_and_inflections(&mut layer);
        }

        // ── Expand ────────────────────────────────────────────
        match self.offsetter.offset(&layer, radius, radius, true, tolerance) {
            Ok(expanded) => layer = expanded,
            Err(error) => report.record(Stage::Offset, width, error),
        }

        // ── Caps ──────────────────────────────────────────────
        // Caps take the stroke's winding so non-zero fill adds them.
        let stroke_ccw = layer.paths.iter().map(node_area).sum::<f64>() >= 0.0;
        let mut caps = 0;
        for end in ends.iter().filter(|e| is_open_end(e.position, reference, &self.oracle)) {
            let cap = if self.config.orient_caps {
                oriented_circle(end, radius)
            } else {
                draw_circle(end.position, radius)
            };
            layer.paths.push(if stroke_ccw { cap } else { cap.reversed() });
            caps += 1;
        }
        debug!(width, paths = layer.paths.len(), caps, ends = ends.len(), "expanded");

        // ── Overlap ───────────────────────────────────────────
        if self.config.remove_overlap {
            if let Some(united) = self.remove_overlap(&layer, width, tolerance, &mut report) {
                layer = united;
            }
        }

        // ── Corners ───────────────────────────────────────────
        match self.rounder.round(&layer, radius, tolerance) {
            Ok(rounded) => layer = rounded,
            Err(error) => report.record(Stage::Round, width, error),
        }

        report.layer = tidy(&layer, tolerance);
        report.layer.selection.clear();
        debug!(width, paths = report.layer.paths.len(), "cleaned up");
        report
    }

    /// Union inside the coordinate range the backend is trusted with.
    ///
    /// An outline reaching past the limit on the right is shifted so its
    /// horizontal centre sits on the origin, then shifted back. If that
    /// centre is left of the origin the union is skipped.
    fn remove_overlap(
        &self,
        layer: &Layer,
        width: f64,
        tolerance: f64,
        report: &mut NoodleReport,
    ) -> Option<Layer> {
        let shift = match layer.bounds() {
            Some(bounds) if bounds.x1 > self.config.coordinate_limit => {
                let center = bounds.center().x;
                if center < 0.0 {
                    let warning = Warning::TooWideForOverlapRemoval {
                        width,
                        extent: bounds.width(),
                    };
                    warn!(%warning, "keeping overlaps");
                    report.warnings.push(warning);
                    return None;
                }
                Vec2::new(-center, 0.0)
            }
            _ => Vec2::ZERO,
        };

        let mut shifted = layer.clone();
        shifted.translate(shift);
        match self.unifier.unite(&shifted, tolerance) {
            Ok(mut united) => {
                united.translate(-shift);
                Some(united)
            }
            Err(error) => {
                report.record(Stage::Union, width, error);
                None
            }
        }
    }

    /// Zero becomes the minimum width; negative or non-finite is an error.
    fn effective_width(&self, width: f64) -> Result<f64, NoodleError> {
        if width == 0.0 {
            return Ok(self.config.min_width);
        }
        if !width.is_finite() || width < 0.0 {
            return Err(invalid_width(width));
        }
        Ok(width)
    }
}

fn invalid_width(width: f64) -> NoodleError {
    NoodleError::InvalidWidths(format!("{} is not a usable width", width))
}
