//! Geometry capabilities the noodle pipeline is built on.
//!
//! Each capability is a trait with one implementation in this crate. The
//! orchestrator is generic over them so hosts with their own geometry
//! engine can plug theirs in.

mod contain;
mod offset;
mod round;
mod union;

pub use contain::WindingOracle;
pub use offset::KurboOffsetter;
pub use round::ArcRounder;
pub use union::GeoUnifier;

use kurbo::{BezPath, Point};

use crate::error::NoodleError;
use crate::model::Layer;

/// Expands skeleton paths into filled stroke outlines.
pub trait StrokeOffsetter {
    /// Offset every path of `layer` by the given half-widths.
    ///
    /// With `make_closed_stroke`, both sides of each path are kept and
    /// joined into a closed outline; otherwise closed paths keep only their
    /// outward offset.
    fn offset(
        &self,
        layer: &Layer,
        half_width_x: f64,
        half_width_y: f64,
        make_closed_stroke: bool,
        tolerance: f64,
    ) -> Result<Layer, NoodleError>;
}

/// Merges overlapping contours into non-overlapping ones.
pub trait OutlineUnifier {
    fn unite(&self, layer: &Layer, tolerance: f64) -> Result<Layer, NoodleError>;
}

/// Replaces sharp corners with circular arcs.
pub trait CornerRounder {
    fn round(&self, layer: &Layer, radius: f64, tolerance: f64) -> Result<Layer, NoodleError>;
}

/// Point-in-filled-region test.
pub trait ContainmentOracle {
    fn contains(&self, outline: &BezPath, point: Point) -> bool;
}
