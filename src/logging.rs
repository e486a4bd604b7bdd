//! Logging setup for the command-line tool.
//!
//! The library only emits through the `log` facade; this module wires it to
//! `env_logger` on stderr, leaving stdout for the batch summary.
//!
//! ```text
//! 14:02:11 WARN  Skipping row 3: missing pallet_id column     (--timestamps)
//! ERROR Row 4 (PAL-004): QR code generation failed: data too long
//! ```
//!
//! `RUST_LOG` overrides the level given on the command line.

use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Level used when none is given: chattier in debug builds.
#[cfg(debug_assertions)]
pub fn default_level() -> &'static str {
    "debug"
}

#[cfg(not(debug_assertions))]
pub fn default_level() -> &'static str {
    "info"
}

/// Map a level name (`off`, `error` .. `trace`, any case) to a filter.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    level.trim().parse().ok()
}

/// Install the global logger. `quiet` limits output to errors.
///
/// Calling this twice leaves the first logger in place.
pub fn init_logging(level: &str, quiet: bool, timestamps: bool) {
    let filter = if quiet {
        LevelFilter::Error
    } else {
        parse_level(level).unwrap_or_else(|| {
            eprintln!("Invalid log level '{}', using 'info'", level);
            LevelFilter::Info
        })
    };

    let mut builder = Builder::new();
    builder.filter_level(filter);
    builder.format(move |buf, record| {
        if timestamps {
            write!(buf, "{} ", chrono::Local::now().format("%H:%M:%S"))?;
        }
        let style = buf.default_level_style(record.level());
        writeln!(buf, "{style}{:<5}{style:#} {}", record.level(), record.args())
    });

    if let Ok(rust_log) = std::env::var("RUST_LOG") {
        builder.parse_filters(&rust_log);
    }

    // A logger may already be installed by an embedding program or a test
    let _ = builder.try_init();
}
