use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use noodler::{config, GlyphFilter, NoodleConfig, Noodler};

#[derive(Parser)]
#[command(name = "noodler", about = "Open skeleton strokes to monoline outlines with round caps")]
struct Cli {
    /// Input UFO with skeleton glyphs
    #[arg(short, long)]
    input: PathBuf,

    /// Output UFO path (defaults to rewriting the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Comma-separated stroke widths, e.g. "20, 40"
    #[arg(short, long, default_value = "20")]
    widths: String,

    /// Do not add nodes at extremes and inflections before expanding
    #[arg(long)]
    no_extremes: bool,

    /// Keep the stroke, caps and widths as overlapping contours
    #[arg(long)]
    keep_overlap: bool,

    /// Rotate caps to follow the stroke direction
    #[arg(long)]
    orient_caps: bool,

    /// Only noodle these glyphs (comma-separated)
    #[arg(long, conflicts_with = "exclude")]
    include: Option<String>,

    /// Noodle every glyph except these (comma-separated)
    #[arg(long)]
    exclude: Option<String>,

    /// Full custom parameter, e.g. "Noodler; 20, 40; 1; 1; exclude: a, b".
    /// Overrides the individual options above.
    #[arg(short, long)]
    parameter: Option<String>,
}

impl Cli {
    fn config(&self) -> NoodleConfig {
        let mut config = match &self.parameter {
            Some(parameter) => NoodleConfig::from_custom_parameter(parameter),
            None => {
                let glyphs = match (&self.include, &self.exclude) {
                    (Some(names), _) => GlyphFilter::Include(split_names(names)),
                    (None, Some(names)) => GlyphFilter::Exclude(split_names(names)),
                    (None, None) => GlyphFilter::All,
                };
                NoodleConfig {
                    widths: config::widths_or_default(&self.widths),
                    extremes_and_inflections: !self.no_extremes,
                    remove_overlap: !self.keep_overlap,
                    glyphs,
                    ..NoodleConfig::default()
                }
            }
        };
        config.orient_caps = self.orient_caps;
        config
    }
}

fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.config();
    let t_start = Instant::now();

    // Header
    eprintln!();
    eprintln!("  noodler \u{00b7} {}", cli.input.display());
    eprintln!("  Settings    {}", config.to_custom_parameter());
    eprintln!();

    let noodler = Noodler::new(config);
    let output = cli.output.as_deref();
    let outcomes = noodler::ufo::noodle_font(&noodler, &cli.input, output)?;

    for outcome in &outcomes {
        for error in &outcome.report.errors {
            eprintln!("  \u{2717} {:<10} {}", outcome.name, error);
        }
        for warning in &outcome.report.warnings {
            eprintln!("  ! {:<10} {}", outcome.name, warning);
        }
    }

    // Footer
    let failed = outcomes.iter().filter(|o| !o.report.errors.is_empty()).count();
    let contours: usize = outcomes.iter().map(|o| o.report.layer.paths.len()).sum();
    eprintln!(
        "  Result      {} glyphs \u{00b7} {} contours \u{00b7} {} with errors  ({}ms)",
        outcomes.len(),
        contours,
        failed,
        t_start.elapsed().as_millis(),
    );
    eprintln!("  \u{2713} {}", output.unwrap_or(cli.input.as_path()).display());
    eprintln!();

    Ok(())
}
