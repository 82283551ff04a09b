use std::fmt;

use thiserror::Error;

/// Errors that can occur while noodling a layer.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NoodleError {
    #[error("stroke offset failed: {0}")]
    Offset(String),

    #[error("overlap removal failed: {0}")]
    Union(String),

    #[error("corner rounding failed: {0}")]
    Round(String),

    #[error("invalid width list: {0}")]
    InvalidWidths(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("glyph '{0}' not found")]
    GlyphNotFound(String),

    #[cfg(feature = "ufo")]
    #[error("norad error: {0}")]
    Norad(#[from] norad::error::FontLoadError),

    #[cfg(feature = "ufo")]
    #[error("norad write error: {0}")]
    NoradWrite(#[from] norad::error::FontWriteError),
}

/// A step of the noodle pipeline, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Reference,
    Offset,
    Union,
    Round,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Reference => "reference outline",
            Stage::Offset => "offset",
            Stage::Union => "overlap removal",
            Stage::Round => "round corners",
        };
        f.write_str(name)
    }
}

/// A failed stage, recorded by the orchestrator while the rest of the
/// pipeline keeps running on the last good layer.
#[derive(Error, Debug)]
#[error("{stage} (width {width}): {error}")]
pub struct StageError {
    pub stage: Stage,
    pub width: f64,
    #[source]
    pub error: NoodleError,
}

/// Non-fatal conditions worth reporting back to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// The outline is too wide to be re-centred into the range the
    /// boolean backend handles reliably, so overlaps were kept.
    TooWideForOverlapRemoval { width: f64, extent: f64 },
    /// Every requested width was zero; the skeleton was left untouched.
    NoUsableWidth,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::TooWideForOverlapRemoval { width, extent } => write!(
                f,
                "outline at width {} spans {:.0} units, too wide for overlap removal",
                width, extent
            ),
            Warning::NoUsableWidth => f.write_str("no non-zero width requested"),
        }
    }
}
