//! CSMA Performance Plotter - renders a TCP vs UDP comparison dashboard.
//!
//! Loads per-protocol counters recorded by a CSMA simulation (or generates
//! deterministic sample data), derives loss and efficiency, and draws a
//! 3x3 grid of charts with a summary table into a single image.

mod config;
mod derive;
mod display;
mod export;
mod fonts;
mod plot;
mod source;
mod summary;
mod table;

use anyhow::Result;
use clap::Parser;
use config::RenderConfig;
use source::{CsvSource, MetricsSource, SyntheticSource};
use std::path::PathBuf;
use summary::Summary;

/// Plot TCP vs UDP performance metrics from a CSMA simulation
#[derive(Parser, Debug)]
#[command(name = "csmaplot")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Metrics CSV written by the simulation (omit to use synthetic sample data)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output image (.png or .svg)
    #[arg(short, long, default_value = config::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Seed for synthetic sample data
    #[arg(long, default_value_t = config::DEFAULT_SEED)]
    seed: u64,

    /// Start of the synthetic time range (seconds)
    #[arg(long, default_value_t = config::DEFAULT_START)]
    start: f64,

    /// End of the synthetic time range (seconds)
    #[arg(long, default_value_t = config::DEFAULT_END)]
    end: f64,

    /// Number of synthetic samples
    #[arg(long, default_value_t = config::DEFAULT_POINTS)]
    points: usize,

    /// Figure width in inches
    #[arg(long, default_value_t = config::DEFAULT_WIDTH_IN)]
    width_in: f64,

    /// Figure height in inches
    #[arg(long, default_value_t = config::DEFAULT_HEIGHT_IN)]
    height_in: f64,

    /// Output resolution
    #[arg(long, default_value_t = config::DEFAULT_DPI)]
    dpi: u32,

    /// TrueType font for chart text (default: search system font paths)
    #[arg(long)]
    font: Option<PathBuf>,

    /// Also write the metrics table as CSV
    #[arg(long)]
    export_csv: Option<PathBuf>,

    /// Also write summary statistics as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Skip the comparison report on stdout
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn render_config(&self) -> RenderConfig {
        RenderConfig {
            output: self.output.clone(),
            width_in: self.width_in,
            height_in: self.height_in,
            dpi: self.dpi,
            font: self.font.clone(),
        }
    }

    fn source(&self) -> Result<Box<dyn MetricsSource>> {
        match &self.input {
            Some(path) => Ok(Box::new(CsvSource::new(path))),
            None => {
                config::validate_range(self.start, self.end, self.points)?;
                Ok(Box::new(SyntheticSource {
                    seed: self.seed,
                    start: self.start,
                    end: self.end,
                    points: self.points,
                }))
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // Reject bad options before touching any data
    let render_cfg = args.render_config();
    let format = render_cfg.validate()?;
    let source = args.source()?;

    let font = fonts::register(render_cfg.font.as_deref())?;
    log::info!("Using font {}", font.display());
    let (width, height) = render_cfg.pixel_size();
    log::debug!("Output {:?} at {}x{} px", format, width, height);

    let description = source.describe();
    log::info!("Loading metrics from {}", description);
    let table = source.load()?;
    log::info!("Loaded {} samples", table.len());

    let analysis = derive::derive(&table);
    let summary = Summary::from_table(&analysis);

    plot::render(&analysis, &summary, &render_cfg)?;

    if let Some(ref path) = args.export_csv {
        export::write_table_csv(&table, path)?;
    }
    if let Some(ref path) = args.summary_json {
        export::write_summary_json(&summary, &description, path)?;
    }

    if !args.quiet {
        display::print_report(&summary, &description);
    }
    println!("✓ Chart saved: {}", render_cfg.output.display());
    Ok(())
}
