//! TrueType/OpenType faces loaded from disk.
//!
//! Measures and rasterizes text with ab_glyph, blending anti-aliased coverage
//! into an 8-bit grayscale canvas.

use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont};
use image::GrayImage;

use super::{FontError, GlyphMetrics};

/// How a face reports the width of the wrapping reference glyph.
///
/// Picked once at load time from what the font actually provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthStrategy {
    /// Horizontal advance from the font's metrics table
    Advance,
    /// Width of the glyph's outline bounding box
    Bounds,
    /// Em size, for faces that give neither
    EmSize,
}

/// A scalable face at a fixed pixel size.
#[derive(Clone)]
pub struct TtfFace {
    font: FontArc,
    scale: PxScale,
    size: u32,
    strategy: WidthStrategy,
    source: PathBuf,
}

impl std::fmt::Debug for TtfFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtfFace")
            .field("source", &self.source)
            .field("size", &self.size)
            .field("strategy", &self.strategy)
            .finish()
    }
}

impl TtfFace {
    /// Load a font file and size it so one em spans `size` pixels.
    pub fn load(path: &Path, size: u32) -> Result<Self, FontError> {
        let bytes = std::fs::read(path).map_err(|source| FontError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(bytes, size, path.to_path_buf())
    }

    /// Parse font data already in memory. `source` names it in logs and errors.
    pub fn from_bytes(bytes: Vec<u8>, size: u32, source: PathBuf) -> Result<Self, FontError> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| FontError::Invalid {
            path: source.clone(),
            message: e.to_string(),
        })?;

        let size = size.max(1);
        // PxScale is ascent-to-descent height, so convert from em size
        let units_per_em = font.units_per_em().unwrap_or(1000.0);
        let scale = PxScale::from(size as f32 * font.height_unscaled() / units_per_em);
        let strategy = strategy_for(&font, scale);
        Ok(Self {
            font,
            scale,
            size,
            strategy,
            source,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn strategy(&self) -> WidthStrategy {
        self.strategy
    }

    fn glyph_id(&self, ch: char) -> GlyphId {
        self.font.glyph_id(ch)
    }

    /// Rasterize `text` with its baseline at `baseline_y`.
    ///
    /// Coverage blends each pixel from its current value toward `fill`;
    /// anything outside the canvas is dropped.
    pub fn draw_line(&self, canvas: &mut GrayImage, x: f32, baseline_y: f32, text: &str, fill: u8) {
        let scaled = self.font.as_scaled(self.scale);
        let (width, height) = canvas.dimensions();
        let mut caret_x = x;
        let mut previous: Option<GlyphId> = None;

        for ch in text.chars() {
            let glyph_id = self.glyph_id(ch);
            if let Some(prev) = previous {
                caret_x += scaled.kern(prev, glyph_id);
            }
            let glyph = glyph_id.with_scale_and_position(self.scale, ab_glyph::point(caret_x, baseline_y));
            caret_x += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);

            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = gx as i64 + bounds.min.x as i64;
                let py = gy as i64 + bounds.min.y as i64;
                if px < 0 || py < 0 || px >= width as i64 || py >= height as i64 {
                    return;
                }
                let pixel = canvas.get_pixel_mut(px as u32, py as u32);
                pixel.0[0] = blend(pixel.0[0], fill, coverage);
            });
        }
    }
}

impl GlyphMetrics for TtfFace {
    fn glyph_width(&self, ch: char) -> f32 {
        let scaled = self.font.as_scaled(self.scale);
        let id = self.glyph_id(ch);
        match self.strategy {
            WidthStrategy::Advance => scaled.h_advance(id),
            WidthStrategy::Bounds => {
                let glyph = id.with_scale(self.scale);
                self.font
                    .outline_glyph(glyph)
                    .map(|g| g.px_bounds().width())
                    .unwrap_or(self.size as f32)
            }
            WidthStrategy::EmSize => self.size as f32,
        }
    }

    fn text_width(&self, text: &str) -> f32 {
        let scaled = self.font.as_scaled(self.scale);
        let mut width = 0.0;
        let mut previous: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = self.glyph_id(ch);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width
    }

    fn ascent(&self) -> f32 {
        self.font.as_scaled(self.scale).ascent()
    }

    fn descent(&self) -> f32 {
        -self.font.as_scaled(self.scale).descent()
    }

    fn ink_top(&self, text: &str) -> f32 {
        text.chars()
            .filter_map(|ch| self.font.outline_glyph(self.glyph_id(ch).with_scale(self.scale)))
            .map(|glyph| -glyph.px_bounds().min.y)
            .reduce(f32::max)
            .unwrap_or_else(|| self.ascent())
    }

    fn size(&self) -> Option<u32> {
        Some(self.size)
    }
}

/// Choose the best width source the font supports, measured on "M".
fn strategy_for(font: &FontArc, scale: PxScale) -> WidthStrategy {
    let id = font.glyph_id('M');
    let advance = font.as_scaled(scale).h_advance(id);
    let has_outline = font.outline_glyph(id.with_scale(scale)).is_some();
    pick_strategy(advance, has_outline)
}

fn pick_strategy(advance: f32, has_outline: bool) -> WidthStrategy {
    if advance > 0.0 {
        WidthStrategy::Advance
    } else if has_outline {
        WidthStrategy::Bounds
    } else {
        WidthStrategy::EmSize
    }
}

/// Move `under` toward `fill` by `coverage` (0.0..=1.0).
#[inline]
fn blend(under: u8, fill: u8, coverage: f32) -> u8 {
    let c = coverage.clamp(0.0, 1.0);
    (under as f32 + (fill as f32 - under as f32) * c).round() as u8
}

/// DejaVu Sans, for tests that need real outlines.
#[cfg(test)]
pub(crate) const DEJAVU_SANS: &[u8] = include_bytes!("fonts/DejaVuSans.ttf");
