//! # Pallet Label - Label Rendering Library
//!
//! Pallet Label turns rows of pallet data into printable labels for 203 DPI
//! thermal printers. It provides:
//!
//! - **Geometry**: inch- or pixel-based templates resolved to pixel layouts
//! - **Text**: lenient `{field}` substitution and glyph-width word wrapping
//! - **QR codes**: level-M encoding scaled with hard module edges
//! - **Export**: grayscale PNG and single-page PDF, both tagged with the DPI
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use pallet_label::{LayoutResolver, Record, export_label, render_label};
//!
//! // Resolve the built-in 4×6 in layout once
//! let layout = LayoutResolver::new(203)?.resolve(None)?;
//!
//! // Render one row
//! let record = Record::from_row([
//!     ("pallet_id", "PAL-001"),
//!     ("destination", "Dock 7"),
//!     ("contents", "20x Widget A"),
//! ])?;
//! let label = render_label(&record, &layout)?;
//!
//! // Writes labels/PAL-001.png and labels/PAL-001.pdf
//! export_label(&label, &Path::new("labels").join(record.output_stem()))?;
//!
//! # Ok::<(), pallet_label::LabelError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`layout`] | Template schema and geometry resolution |
//! | [`template`] | Placeholder substitution |
//! | [`wrap`] | Word wrapping to a pixel width |
//! | [`font`] | Outline and bitmap faces behind one metrics trait |
//! | [`qr`] | QR payload choice and bitmap generation |
//! | [`render`] | Label composition |
//! | [`export`] | PNG and PDF output |
//! | [`batch`] | Many rows, one layout, failures collected |
//! | [`record`] | Row normalisation and output naming |
//! | [`config`] | DPI and layout defaults |
//! | [`error`] | Error types |

pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod font;
pub mod layout;
pub mod logging;
pub mod qr;
pub mod record;
pub mod render;
pub mod template;
pub mod wrap;

// Re-exports for convenience
pub use error::LabelError;
pub use export::export_label;
pub use layout::{Layout, LayoutResolver};
pub use record::Record;
pub use render::{RenderedLabel, render_label};
