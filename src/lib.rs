//! noodler: open skeleton strokes → monoline outlines with round caps.
//!
//! Expands the center-line paths of a glyph into a filled stroke of one
//! or more widths. Exposed ends get circular caps, overlaps are merged,
//! corners are rounded and contours are wound for PostScript fill.
//!
//! # Example
//!
//! ```
//! use noodler::{Layer, NoodleConfig, Noodler, Path};
//!
//! let skeleton = Layer::new(vec![Path::open_polyline(&[
//!     (0.0, 0.0).into(),
//!     (50.0, 0.0).into(),
//! ])]);
//! let noodler = Noodler::new(NoodleConfig::default());
//! let report = noodler.noodle(&skeleton);
//! assert!(report.is_clean());
//! assert!(report.layer.paths.iter().all(|p| p.closed));
//! ```

#![forbid(unsafe_code)]

mod analyze;
mod cleanup;
mod geom;

pub mod batch;
pub mod capability;
pub mod caps;
pub mod config;
pub mod error;
pub mod model;
pub mod noodle;

#[cfg(feature = "ufo")]
pub mod ufo;

// Re-export kurbo so downstream users build points and transforms with
// the same version the layer types use.
pub use kurbo;

pub use analyze::{
    add_extreme_points, add_extremes_and_inflections, add_inflection_points, compute_inflection,
};
pub use batch::{noodle_glyphs, GlyphOutcome};
pub use caps::{draw_circle, is_open_end, EndpointRecord};
pub use cleanup::correct_path_direction;
pub use config::{GlyphFilter, NoodleConfig};
pub use error::{NoodleError, Stage, StageError, Warning};
pub use model::{Component, Layer, Node, NodeId, NodeKind, Path};
pub use noodle::{NoodleReport, Noodler};
