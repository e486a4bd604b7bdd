//! # Label Fonts
//!
//! Font resolution and the metrics capability used by wrapping and drawing.
//!
//! ## Resolution Order
//!
//! ```text
//! block font_path ─┐
//!                  ├─→ as given ─→ each search dir ─→ TtfFace
//! default face ────┘                                   │ (missing / unreadable)
//!                                                      └─→ BitmapFace (Spleen)
//! ```
//!
//! A missing or broken font file is never fatal: it is logged and replaced by
//! the built-in bitmap face.

pub mod bitmap;
pub mod ttf;

use std::path::{Path, PathBuf};

use image::GrayImage;
use thiserror::Error;

use crate::config::FontConfig;

pub use bitmap::BitmapFace;
pub use ttf::TtfFace;

/// Why a font file could not be used.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("font '{0}' not found")]
    NotFound(String),

    #[error("cannot read font {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid font {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

/// Metrics a face exposes to the wrapper and the text drawer.
///
/// Each backend answers these from whatever its format offers; the choice of
/// strategy is made once when the face is built, never per call.
pub trait GlyphMetrics {
    /// Pixel width of a single glyph, used as the wrapping reference.
    fn glyph_width(&self, ch: char) -> f32;

    /// Pixel advance of a whole line of text.
    fn text_width(&self, text: &str) -> f32;

    /// Distance from the top of a line to its baseline.
    fn ascent(&self) -> f32;

    /// Distance from the baseline to the bottom of a line (positive).
    fn descent(&self) -> f32;

    /// Distance from the baseline up to the highest inked pixel of `text`.
    ///
    /// Faces that cannot see their glyph outlines report the ascent.
    fn ink_top(&self, _text: &str) -> f32 {
        self.ascent()
    }

    /// Nominal pixel size, if the face is scalable.
    fn size(&self) -> Option<u32>;
}

/// A face ready to measure and draw text.
#[derive(Debug, Clone)]
pub enum LabelFont {
    Ttf(TtfFace),
    Bitmap(BitmapFace),
}

impl LabelFont {
    /// Resolve a block's font, falling back to the bitmap face on any failure.
    pub fn resolve(font_path: Option<&str>, size: u32, fonts: &FontConfig) -> Self {
        let name = font_path.unwrap_or(&fonts.default_face);
        match load_ttf(name, size, fonts) {
            Ok(face) => {
                log::debug!("Loaded font {} at {}px", face.source().display(), size);
                Self::Ttf(face)
            }
            Err(e) => {
                log::warn!("{}; using built-in bitmap font", e);
                Self::Bitmap(BitmapFace::for_size(size))
            }
        }
    }

    /// Draw one line with its baseline at `baseline_y`, blending toward `fill`.
    pub fn draw_line(&self, canvas: &mut GrayImage, x: f32, baseline_y: f32, text: &str, fill: u8) {
        match self {
            Self::Ttf(face) => face.draw_line(canvas, x, baseline_y, text, fill),
            Self::Bitmap(face) => face.draw_line(canvas, x, baseline_y, text, fill),
        }
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(self, Self::Bitmap(_))
    }
}

impl GlyphMetrics for LabelFont {
    fn glyph_width(&self, ch: char) -> f32 {
        match self {
            Self::Ttf(f) => f.glyph_width(ch),
            Self::Bitmap(f) => f.glyph_width(ch),
        }
    }

    fn text_width(&self, text: &str) -> f32 {
        match self {
            Self::Ttf(f) => f.text_width(text),
            Self::Bitmap(f) => f.text_width(text),
        }
    }

    fn ascent(&self) -> f32 {
        match self {
            Self::Ttf(f) => f.ascent(),
            Self::Bitmap(f) => f.ascent(),
        }
    }

    fn descent(&self) -> f32 {
        match self {
            Self::Ttf(f) => f.descent(),
            Self::Bitmap(f) => f.descent(),
        }
    }

    fn ink_top(&self, text: &str) -> f32 {
        match self {
            Self::Ttf(f) => f.ink_top(text),
            Self::Bitmap(f) => f.ink_top(text),
        }
    }

    fn size(&self) -> Option<u32> {
        match self {
            Self::Ttf(f) => f.size(),
            Self::Bitmap(f) => f.size(),
        }
    }
}

/// Paths tried for a font name, in order.
fn candidate_paths(name: &str, fonts: &FontConfig) -> Vec<PathBuf> {
    let path = Path::new(name);
    let mut candidates = vec![path.to_path_buf()];
    if path.is_relative() {
        candidates.extend(fonts.search_dirs.iter().map(|dir| dir.join(path)));
    }
    candidates
}

fn load_ttf(name: &str, size: u32, fonts: &FontConfig) -> Result<TtfFace, FontError> {
    let path = candidate_paths(name, fonts)
        .into_iter()
        .find(|p| p.is_file())
        .ok_or_else(|| FontError::NotFound(name.to_string()))?;
    TtfFace::load(&path, size)
}
