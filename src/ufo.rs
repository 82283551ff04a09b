//! UFO host adapter: skeleton glyphs in, noodled glyphs out.

use std::path::Path as FsPath;

use kurbo::Affine;
use norad::{Contour, ContourPoint, Font, Glyph, PointType};

use crate::batch::{noodle_glyphs, GlyphOutcome};
use crate::capability::{ContainmentOracle, CornerRounder, OutlineUnifier, StrokeOffsetter};
use crate::error::NoodleError;
use crate::model::{Component, Layer, NodeKind, Path};
use crate::noodle::Noodler;

/// Nesting depth at which component references stop being followed.
const MAX_COMPONENT_DEPTH: usize = 8;

/// Read a glyph of `layer` into a [`Layer`], resolving its components.
pub fn read_glyph(layer: &norad::Layer, glyph: &Glyph) -> Result<Layer, NoodleError> {
    let paths = contours_to_paths(&glyph.contours)?;
    let mut components = Vec::with_capacity(glyph.components.len());
    for component in &glyph.components {
        let base = component.base.as_str();
        components.push(Component {
            base: base.to_string(),
            transform: to_affine(&component.transform),
            paths: resolve(layer, base, 1)?,
        });
    }
    Ok(Layer {
        paths,
        components,
        ..Layer::default()
    })
}

/// Flattened outline of glyph `name` in its own coordinates.
fn resolve(layer: &norad::Layer, name: &str, depth: usize) -> Result<Vec<Path>, NoodleError> {
    if depth > MAX_COMPONENT_DEPTH {
        tracing::warn!(glyph = name, "component nesting too deep, ignoring");
        return Ok(Vec::new());
    }
    let glyph = layer
        .get_glyph(name)
        .ok_or_else(|| NoodleError::GlyphNotFound(name.to_string()))?;
    let mut paths = contours_to_paths(&glyph.contours)?;
    for component in &glyph.components {
        let affine = to_affine(&component.transform);
        for mut path in resolve(layer, component.base.as_str(), depth + 1)? {
            path.transform(affine);
            paths.push(path);
        }
    }
    Ok(paths)
}

fn contours_to_paths(contours: &[Contour]) -> Result<Vec<Path>, NoodleError> {
    let mut paths = Vec::with_capacity(contours.len());
    for contour in contours {
        let bez = contour
            .to_kurbo()
            .map_err(|e| NoodleError::InvalidPath(e.to_string()))?;
        paths.extend(Path::from_bez_path(&bez));
    }
    Ok(paths)
}

fn to_affine(t: &norad::AffineTransform) -> Affine {
    Affine::new([
        t.x_scale, t.xy_scale, t.yx_scale, t.y_scale, t.x_offset, t.y_offset,
    ])
}

/// Convert a [`Path`] to a `norad::Contour`.
///
/// Node kinds map one to one; an open path starts with a `move` point.
pub fn to_contour(path: &Path) -> Contour {
    let points = path
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let typ = match node.kind {
                _ if i == 0 && !path.closed => PointType::Move,
                NodeKind::Line => PointType::Line,
                NodeKind::Curve => PointType::Curve,
                NodeKind::OffCurve => PointType::OffCurve,
            };
            ContourPoint::new(node.pt.x, node.pt.y, typ, false, None, None)
        })
        .collect();
    Contour::new(points, None)
}

/// Replace a glyph's contours with the paths of `layer`. Components stay.
pub fn write_glyph(glyph: &mut Glyph, layer: &Layer) {
    glyph.contours = layer
        .paths
        .iter()
        .filter(|p| !p.is_empty())
        .map(to_contour)
        .collect();
}

/// Noodle every glyph of a UFO's default layer and save the result.
///
/// Glyphs that cannot be read are reported and left alone. `output`
/// defaults to overwriting `input`.
pub fn noodle_font<O, U, R, C>(
    noodler: &Noodler<O, U, R, C>,
    input: &FsPath,
    output: Option<&FsPath>,
) -> Result<Vec<GlyphOutcome>, NoodleError>
where
    O: StrokeOffsetter + Sync,
    U: OutlineUnifier + Sync,
    R: CornerRounder + Sync,
    C: ContainmentOracle + Sync,
{
    let mut font = Font::load(input)?;

    let mut skeletons = Vec::new();
    {
        let layer = font.default_layer();
        for glyph in layer.iter() {
            let name = glyph.name().to_string();
            match read_glyph(layer, glyph) {
                Ok(skeleton) => skeletons.push((name, skeleton)),
                Err(err) => tracing::warn!(glyph = %name, %err, "skipping unreadable glyph"),
            }
        }
    }
    skeletons.sort_by(|a, b| a.0.cmp(&b.0));

    let outcomes = noodle_glyphs(noodler, &skeletons);

    let layer = font.default_layer_mut();
    for outcome in &outcomes {
        if let Some(glyph) = layer.get_glyph_mut(&outcome.name) {
            write_glyph(glyph, &outcome.report.layer);
        }
    }
    font.save(output.unwrap_or(input))?;
    Ok(outcomes)
}
