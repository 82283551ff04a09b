use kurbo::{BezPath, Point, Shape};

use super::ContainmentOracle;

/// Non-zero winding containment, as font rasterizers fill outlines.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindingOracle;

impl ContainmentOracle for WindingOracle {
    fn contains(&self, outline: &BezPath, point: Point) -> bool {
        outline.winding(point) != 0
    }
}
