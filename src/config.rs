use crate::error::NoodleError;

/// Widths used when none are given or the stored list is unreadable.
pub const DEFAULT_WIDTHS: [f64; 1] = [20.0];

/// All noodling parameters in one struct.
/// Adjustable at runtime (for live previews) and round-trippable through
/// the custom-parameter string used at export.
#[derive(Debug, Clone, PartialEq)]
pub struct NoodleConfig {
    // -- Outline --
    /// Stroke widths. Each non-zero width produces its own noodle; the
    /// results are merged into one layer.
    pub widths: Vec<f64>,
    /// Insert nodes at extrema and inflections before expanding.
    pub extremes_and_inflections: bool,
    /// Merge the stroke, its caps and overlapping strokes into one outline.
    pub remove_overlap: bool,
    /// Rotate each cap so its nodes follow the stroke direction.
    pub orient_caps: bool,

    // -- Numerics --
    /// Stand-in for a zero width, which would collapse the geometry.
    pub min_width: f64,
    /// Horizontal extent (font units from the origin) the boolean backend
    /// is trusted with. Wider outlines are re-centred first.
    pub coordinate_limit: f64,
    /// Upper bound for flattening and fitting tolerance, in font units.
    /// The per-width tolerance shrinks with the stroke radius.
    pub tolerance: f64,
    /// Turning angle (radians) above which a vertex of a merged outline
    /// stays a corner.
    pub corner_angle_threshold: f64,

    // -- Batch --
    /// Which glyphs a batch run touches.
    pub glyphs: GlyphFilter,
}

impl Default for NoodleConfig {
    fn default() -> Self {
        Self {
            widths: DEFAULT_WIDTHS.to_vec(),
            extremes_and_inflections: true,
            remove_overlap: true,
            orient_caps: false,
            min_width: 1.0,
            coordinate_limit: 8190.0,
            tolerance: 0.05,
            corner_angle_threshold: 0.5,
            glyphs: GlyphFilter::All,
        }
    }
}

/// Glyph selection for batch runs.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GlyphFilter {
    #[default]
    All,
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl GlyphFilter {
    pub fn allows(&self, name: &str) -> bool {
        match self {
            GlyphFilter::All => true,
            GlyphFilter::Include(names) => names.iter().any(|n| n == name),
            GlyphFilter::Exclude(names) => !names.iter().any(|n| n == name),
        }
    }

    /// Parse `include: a, b` or `exclude: a, b`. Anything else is `None`.
    pub fn parse(s: &str) -> Option<GlyphFilter> {
        let s = s.trim();
        let (kind, rest) = s.split_once(':')?;
        let names = name_list(rest);
        match kind.trim() {
            "include" => Some(GlyphFilter::Include(names)),
            "exclude" => Some(GlyphFilter::Exclude(names)),
            _ => None,
        }
    }
}

fn name_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
        .collect()
}

/// Parse a comma-separated width list such as `"20, 40"`.
///
/// Negative or non-finite entries make the whole list invalid.
pub fn parse_widths(s: &str) -> Result<Vec<f64>, NoodleError> {
    let mut widths = Vec::new();
    for item in s.split(',') {
        let item = item.trim();
        let width: f64 = item
            .parse()
            .map_err(|_| NoodleError::InvalidWidths(format!("'{}' is not a number", item)))?;
        if !width.is_finite() || width < 0.0 {
            return Err(NoodleError::InvalidWidths(format!(
                "{} is not a usable width",
                item
            )));
        }
        widths.push(width);
    }
    Ok(widths)
}

/// Like [`parse_widths`], falling back to [`DEFAULT_WIDTHS`] with a warning.
pub fn widths_or_default(s: &str) -> Vec<f64> {
    parse_widths(s).unwrap_or_else(|err| {
        tracing::warn!(input = s, %err, "falling back to default widths");
        DEFAULT_WIDTHS.to_vec()
    })
}

/// Format widths the way [`parse_widths`] reads them.
pub fn format_widths(widths: &[f64]) -> String {
    let parts: Vec<String> = widths.iter().map(|w| w.to_string()).collect();
    parts.join(", ")
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

impl NoodleConfig {
    /// Read an export custom parameter:
    /// `Noodler; 20, 40; 1; 1; exclude: a, b`.
    ///
    /// The leading filter name is optional. Missing or unreadable fields
    /// keep their defaults; an unreadable width list falls back to
    /// [`DEFAULT_WIDTHS`].
    pub fn from_custom_parameter(s: &str) -> NoodleConfig {
        let mut config = NoodleConfig::default();
        let mut fields: Vec<&str> = s.split(';').map(str::trim).collect();

        if let Some(filter) = fields.last().and_then(|f| GlyphFilter::parse(f)) {
            config.glyphs = filter;
            fields.pop();
        }
        if fields
            .first()
            .is_some_and(|f| f.eq_ignore_ascii_case("noodler"))
        {
            fields.remove(0);
        }

        let mut fields = fields.into_iter();
        if let Some(widths) = fields.next().filter(|f| !f.is_empty()) {
            config.widths = widths_or_default(widths);
        }
        if let Some(flag) = fields.next().and_then(parse_flag) {
            config.extremes_and_inflections = flag;
        }
        if let Some(flag) = fields.next().and_then(parse_flag) {
            config.remove_overlap = flag;
        }
        config
    }

    /// The custom-parameter string that reproduces this configuration.
    pub fn to_custom_parameter(&self) -> String {
        let mut out = format!(
            "Noodler; {}; {}; {}",
            format_widths(&self.widths),
            self.extremes_and_inflections as u8,
            self.remove_overlap as u8,
        );
        match &self.glyphs {
            GlyphFilter::All => {}
            GlyphFilter::Include(names) => {
                out.push_str(&format!("; include: {}", names.join(", ")));
            }
            GlyphFilter::Exclude(names) => {
                out.push_str(&format!("; exclude: {}", names.join(", ")));
            }
        }
        out
    }

    /// Widths that actually produce a noodle.
    pub fn usable_widths(&self) -> Vec<f64> {
        self.widths.iter().copied().filter(|&w| w != 0.0).collect()
    }

    /// Flattening and fitting tolerance for a stroke of this radius.
    pub fn tolerance_for(&self, radius: f64) -> f64 {
        let ceiling = self.tolerance.max(1e-3);
        (radius * 0.005).clamp(1e-3, ceiling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_parse_with_spaces() {
        assert_eq!(parse_widths("10, 20.5,30").unwrap(), vec![10.0, 20.5, 30.0]);
        assert_eq!(parse_widths(" 0 ").unwrap(), vec![0.0]);
    }

    #[test]
    fn malformed_widths_fall_back() {
        assert!(parse_widths("10, abc").is_err());
        assert!(parse_widths("-5").is_err());
        assert!(parse_widths("").is_err());
        assert_eq!(widths_or_default("twenty"), vec![20.0]);
    }

    #[test]
    fn custom_parameter_with_exclusions() {
        let config = NoodleConfig::from_custom_parameter("Noodler; 12, 24; 0; 1; exclude: a, b.sc");
        assert_eq!(config.widths, vec![12.0, 24.0]);
        assert!(!config.extremes_and_inflections);
        assert!(config.remove_overlap);
        assert_eq!(
            config.glyphs,
            GlyphFilter::Exclude(vec!["a".into(), "b.sc".into()])
        );
        assert!(config.glyphs.allows("c"));
        assert!(!config.glyphs.allows("b.sc"));
    }

    #[test]
    fn custom_parameter_missing_fields_keep_defaults() {
        let config = NoodleConfig::from_custom_parameter("Noodler; 30");
        assert_eq!(config.widths, vec![30.0]);
        assert!(config.extremes_and_inflections);
        assert!(config.remove_overlap);

        let config = NoodleConfig::from_custom_parameter("Noodler; oops; 1; 0; include: x");
        assert_eq!(config.widths, vec![20.0]);
        assert!(!config.remove_overlap);
        assert_eq!(config.glyphs, GlyphFilter::Include(vec!["x".into()]));
    }

    #[test]
    fn generated_parameter_reads_back() {
        let config = NoodleConfig {
            widths: vec![10.0, 25.5],
            remove_overlap: false,
            glyphs: GlyphFilter::Include(vec!["n".into(), "o".into()]),
            ..NoodleConfig::default()
        };
        let text = config.to_custom_parameter();
        assert_eq!(text, "Noodler; 10, 25.5; 1; 0; include: n, o");
        assert_eq!(NoodleConfig::from_custom_parameter(&text), config);

        let config = NoodleConfig {
            glyphs: GlyphFilter::Exclude(vec!["space".into()]),
            ..NoodleConfig::default()
        };
        assert_eq!(config.to_custom_parameter(), "Noodler; 20; 1; 1; exclude: space");
    }

    #[test]
    fn tolerance_shrinks_with_radius() {
        let config = NoodleConfig::default();
        assert_eq!(config.tolerance_for(100.0), 0.05);
        assert!((config.tolerance_for(2.0) - 0.01).abs() < 1e-12);
        assert_eq!(config.tolerance_for(0.0), 1e-3);
    }
}
