//! Anchored multi-line text drawing.
//!
//! ## Line Placement
//!
//! ```text
//! advance = ascent + spacing
//!
//! top  = y - shift × (lines - 1) × advance     shift: 0 (a/t/s), ½ (m), 1 (b/d)
//! left = x - k × widest_line                    k: 0 (l), ½ (m), 1 (r)
//! ```
//!
//! Lines are left-aligned inside the block; the anchor moves the block.
//! A `t` anchor measures the ink of the first non-empty line and keeps that
//! baseline offset for every line below it.

use image::GrayImage;

use crate::font::{GlyphMetrics, LabelFont};
use crate::layout::{Anchor, VerticalAnchor};

/// How a block of text is placed and painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub anchor: Anchor,
    /// Gray value of the glyphs
    pub fill: u8,
    /// Extra pixels between lines
    pub spacing: u32,
}

/// Draw `text`, one line per `\n`, anchored at (`x`, `y`).
pub fn draw_multiline_text(
    canvas: &mut GrayImage,
    font: &LabelFont,
    (x, y): (i64, i64),
    text: &str,
    style: TextStyle,
) {
    let TextStyle {
        anchor,
        fill,
        spacing,
    } = style;
    if text.is_empty() {
        return;
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let widths: Vec<f32> = lines.iter().map(|line| font.text_width(line)).collect();
    let block_width = widths.iter().copied().fold(0.0f32, f32::max);

    let ascent = font.ascent();
    let descent = font.descent();
    let advance = ascent + spacing as f32;
    let ink_top = match anchor.vertical {
        VerticalAnchor::Top => lines
            .iter()
            .find(|line| !line.is_empty())
            .map(|line| font.ink_top(line))
            .unwrap_or(ascent),
        _ => ascent,
    };

    let left = x as f32 + anchor.x_offset(block_width);
    let mut top = y as f32 - anchor.stack_shift() * (lines.len() - 1) as f32 * advance;

    for line in lines {
        if !line.is_empty() {
            let baseline = top + anchor.baseline_offset(ascent, descent, ink_top);
            font.draw_line(canvas, left, baseline, line, fill);
        }
        top += advance;
    }
}
