//! Final passes over a noodled outline: redundant node removal and
//! winding direction correction.

mod direction;
mod simplify;

pub use direction::correct_path_direction;

use crate::model::Layer;

/// Remove redundant and degenerate nodes from every path.
pub fn tidy(layer: &Layer, tolerance: f64) -> Layer {
    let paths = layer
        .paths
        .iter()
        .filter_map(|p| simplify::tidy_path(p, tolerance))
        .collect();
    layer.with_paths(paths)
}
