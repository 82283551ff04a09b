//! Parallel noodling of many glyphs.

use rayon::prelude::*;

use crate::capability::{ContainmentOracle, CornerRounder, OutlineUnifier, StrokeOffsetter};
use crate::model::Layer;
use crate::noodle::{NoodleReport, Noodler};

/// The result for one glyph of a batch.
#[derive(Debug)]
pub struct GlyphOutcome {
    pub name: String,
    pub report: NoodleReport,
}

/// Noodle every glyph the configured filter allows, in parallel.
///
/// Each glyph is an independent run: a glyph with errors still yields an
/// outcome and never stops the others. Outcomes keep the input order.
pub fn noodle_glyphs<O, U, R, C>(
    noodler: &Noodler<O, U, R, C>,
    glyphs: &[(String, Layer)],
) -> Vec<GlyphOutcome>
where
    O: StrokeOffsetter + Sync,
    U: OutlineUnifier + Sync,
    R: CornerRounder + Sync,
    C: ContainmentOracle + Sync,
{
    let filter = &noodler.config().glyphs;
    glyphs
        .par_iter()
        .filter(|(name, _)| filter.allows(name))
        .map(|(name, skeleton)| {
            let report = noodler.noodle(skeleton);
            if !report.errors.is_empty() {
                tracing::warn!(glyph = %name, errors = report.errors.len(), "glyph noodled with errors");
            }
            GlyphOutcome {
                name: name.clone(),
                report,
            }
        })
        .collect()
}
