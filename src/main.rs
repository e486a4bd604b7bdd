//! # Pallet Label CLI
//!
//! Command-line interface for batch pallet label generation.
//!
//! ## Usage
//!
//! ```bash
//! # Default 4×6 in layout at 203 DPI
//! pallet-label --csv pallets.csv --output-dir labels
//!
//! # Custom template, 300 DPI, rows rendered in parallel
//! pallet-label --csv pallets.csv --output-dir labels \
//!     --template layout.json --dpi 300 --parallel
//!
//! # JSON Lines records, extra font directory, verbose logging
//! pallet-label --records pallets.jsonl --output-dir labels \
//!     --font-dir ./fonts --log-level debug
//! ```

use clap::Parser;
use std::path::PathBuf;

use pallet_label::{
    LabelError, LayoutResolver,
    batch::{self, BatchOptions},
    config::{DEFAULT_DPI, FontConfig},
    logging,
};

/// Exit status when some rows produced no label.
const EXIT_ROWS_FAILED: i32 = 2;

/// Pallet Label - QR and text labels for thermal printers
#[derive(Parser, Debug)]
#[command(name = "pallet-label")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Pallet records: CSV with a header row, or .json/.jsonl
    #[arg(long, visible_alias = "csv", value_name = "FILE")]
    records: PathBuf,

    /// Directory for the generated PNG and PDF files
    #[arg(long, value_name = "DIR")]
    output_dir: PathBuf,

    /// JSON layout template (built-in layout when omitted)
    #[arg(long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Output resolution in dots per inch
    #[arg(long, default_value_t = DEFAULT_DPI)]
    dpi: u32,

    /// Extra directory searched for font files (repeatable)
    #[arg(long = "font-dir", value_name = "DIR")]
    font_dirs: Vec<PathBuf>,

    /// Render rows in parallel
    #[arg(long)]
    parallel: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[arg(long, default_value = logging::default_level())]
    log_level: String,

    /// Only log errors
    #[arg(long, short)]
    quiet: bool,

    /// Prefix log lines with local time
    #[arg(long)]
    timestamps: bool,
}

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_ROWS_FAILED),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Returns whether every row produced a label.
fn run() -> Result<bool, LabelError> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.quiet, cli.timestamps);

    // --font-dir flags are searched in the order given, before the built-in dirs
    let fonts = cli
        .font_dirs
        .iter()
        .rev()
        .fold(FontConfig::default(), |fonts, dir| fonts.with_search_dir(dir));

    // Layout and records problems abort before any label is written
    let layout = LayoutResolver::new(cli.dpi)?
        .with_fonts(fonts)
        .resolve(cli.template.as_deref())?;
    let rows = batch::load_records(&cli.records)?;

    let options = BatchOptions {
        parallel: cli.parallel,
    };
    let report = batch::process_records(rows, &layout, &cli.output_dir, &options)?;

    // Per-row outcomes were logged as they happened
    println!("{}", report.summary());

    Ok(report.is_success())
}
