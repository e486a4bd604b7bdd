//! Built-in bitmap face used when no outline font can be loaded.
//!
//! Uses the Spleen bitmap font family. The cell closest to the requested size
//! is picked and scaled by a whole number, so glyph edges stay hard.

use image::GrayImage;
use spleen_font::{FONT_6X12, FONT_8X16, FONT_12X24, PSF2Font};

use super::GlyphMetrics;

/// Spleen cells available to the fallback face: (width, height, data).
const CELLS: [(u32, u32, &[u8]); 3] = [
    (6, 12, FONT_6X12),
    (8, 16, FONT_8X16),
    (12, 24, FONT_12X24),
];

/// A fixed-pitch Spleen face with an integer scale factor.
#[derive(Debug, Clone)]
pub struct BitmapFace {
    cell_width: u32,
    cell_height: u32,
    scale: u32,
    data: &'static [u8],
}

impl BitmapFace {
    /// Pick the largest Spleen cell no taller than `size` and scale it up
    /// by however many whole cells fit.
    ///
    /// ```text
    /// size 12 → 6x12  ×1
    /// size 20 → 8x16  ×1
    /// size 61 → 12x24 ×2
    /// ```
    pub fn for_size(size: u32) -> Self {
        let (cell_width, cell_height, data) = CELLS
            .iter()
            .rev()
            .find(|(_, h, _)| *h <= size)
            .copied()
            .unwrap_or(CELLS[0]);
        let scale = (size / cell_height).max(1);
        Self {
            cell_width,
            cell_height,
            scale,
            data,
        }
    }

    /// Rendered glyph cell (width, height) in pixels.
    pub fn cell(&self) -> (u32, u32) {
        (self.cell_width * self.scale, self.cell_height * self.scale)
    }

    /// Draw `text` with the bottom of each cell on `baseline_y`.
    ///
    /// Pixels that are set in the glyph are overwritten with `fill`.
    pub fn draw_line(&self, canvas: &mut GrayImage, x: f32, baseline_y: f32, text: &str, fill: u8) {
        let (cw, ch) = self.cell();
        let top = baseline_y.round() as i64 - ch as i64;
        let mut left = x.round() as i64;

        let mut font = PSF2Font::new(self.data).ok();
        for c in text.chars() {
            let bits = self.glyph_bits(font.as_mut(), c);
            self.blit(canvas, &bits, left, top, fill);
            left += cw as i64;
        }
    }

    /// One cell of 1-bit pixels, row-major. Characters Spleen lacks get a
    /// box outline; whitespace stays blank.
    fn glyph_bits(&self, font: Option<&mut PSF2Font<'_>>, c: char) -> Vec<bool> {
        let (width, height) = (self.cell_width as usize, self.cell_height as usize);
        let mut bits = vec![false; width * height];

        let utf8 = c.to_string();
        let found = match font.and_then(|f| f.glyph_for_utf8(utf8.as_bytes())) {
            Some(glyph) => {
                for (row_y, row) in glyph.enumerate() {
                    for (col_x, on) in row.enumerate() {
                        let idx = row_y * width + col_x;
                        if col_x < width && idx < bits.len() {
                            bits[idx] = on;
                        }
                    }
                }
                true
            }
            None => false,
        };
        if !found && !c.is_whitespace() {
            draw_box(&mut bits, width, height);
        }
        bits
    }

    /// Copy a 1-bit glyph onto the canvas, scaling by nearest neighbor.
    fn blit(&self, canvas: &mut GrayImage, bits: &[bool], left: i64, top: i64, fill: u8) {
        let (width, height) = canvas.dimensions();
        for gy in 0..self.cell_height {
            for gx in 0..self.cell_width {
                if !bits[(gy * self.cell_width + gx) as usize] {
                    continue;
                }
                for sy in 0..self.scale {
                    for sx in 0..self.scale {
                        let px = left + (gx * self.scale + sx) as i64;
                        let py = top + (gy * self.scale + sy) as i64;
                        if px >= 0 && py >= 0 && px < width as i64 && py < height as i64 {
                            canvas.get_pixel_mut(px as u32, py as u32).0[0] = fill;
                        }
                    }
                }
            }
        }
    }
}

impl GlyphMetrics for BitmapFace {
    fn glyph_width(&self, _ch: char) -> f32 {
        (self.cell_width * self.scale) as f32
    }

    fn text_width(&self, text: &str) -> f32 {
        (text.chars().count() as u32 * self.cell_width * self.scale) as f32
    }

    fn ascent(&self) -> f32 {
        (self.cell_height * self.scale) as f32
    }

    fn descent(&self) -> f32 {
        0.0
    }

    fn ink_top(&self, text: &str) -> f32 {
        let width = self.cell_width as usize;
        let mut font = PSF2Font::new(self.data).ok();
        text.chars()
            .filter_map(|c| {
                let bits = self.glyph_bits(font.as_mut(), c);
                let first_row = bits.iter().position(|&on| on)? / width;
                Some(((self.cell_height as usize - first_row) as u32 * self.scale) as f32)
            })
            .reduce(f32::max)
            .unwrap_or_else(|| self.ascent())
    }

    fn size(&self) -> Option<u32> {
        None
    }
}

/// Outline the cell for characters Spleen has no glyph for.
fn draw_box(bits: &mut [bool], width: usize, height: usize) {
    for x in 0..width {
        bits[x] = true;
        bits[(height - 1) * width + x] = true;
    }
    for y in 0..height {
        bits[y * width] = true;
        bits[y * width + width - 1] = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_cell_selection() {
        assert_eq!(BitmapFace::for_size(4).cell(), (6, 12));
        assert_eq!(BitmapFace::for_size(12).cell(), (6, 12));
        assert_eq!(BitmapFace::for_size(20).cell(), (8, 16));
        assert_eq!(BitmapFace::for_size(24).cell(), (12, 24));
        assert_eq!(BitmapFace::for_size(61).cell(), (24, 48));
    }

    #[test]
    fn test_fixed_pitch_metrics() {
        let face = BitmapFace::for_size(24);
        assert_eq!(face.glyph_width('M'), 12.0);
        assert_eq!(face.glyph_width('i'), 12.0);
        assert_eq!(face.text_width("abcd"), 48.0);
        assert_eq!(face.size(), None);
    }

    #[test]
    fn test_draw_marks_pixels() {
        let mut canvas = GrayImage::from_pixel(100, 40, Luma([255]));
        BitmapFace::for_size(24).draw_line(&mut canvas, 2.0, 30.0, "HI", 0);
        assert!(canvas.pixels().any(|p| p.0[0] == 0));
        // Nothing drawn below the baseline
        assert!((30..40).all(|y| (0..100).all(|x| canvas.get_pixel(x, y).0[0] == 255)));
    }

    #[test]
    fn test_draw_clips_at_canvas_edge() {
        let mut canvas = GrayImage::from_pixel(10, 10, Luma([255]));
        BitmapFace::for_size(24).draw_line(&mut canvas, -5.0, 20.0, "WWWW", 0);
    }

    #[test]
    fn test_ink_top_below_cell_top() {
        let face = BitmapFace::for_size(24);
        let capital = face.ink_top("H");
        assert!(capital > 0.0 && capital <= face.ascent());
        assert!(face.ink_top("x") < capital);
        assert_eq!(face.ink_top(" "), face.ascent());

        // Drawn ink starts exactly ink_top above the baseline
        let mut canvas = GrayImage::from_pixel(40, 40, Luma([255]));
        face.draw_line(&mut canvas, 0.0, 30.0, "H", 0);
        let top_row = (0..40)
            .find(|&y| (0..40).any(|x| canvas.get_pixel(x, y).0[0] == 0))
            .unwrap();
        assert_eq!(top_row as f32, 30.0 - capital);
    }

    #[test]
    fn test_space_draws_nothing() {
        let mut canvas = GrayImage::from_pixel(40, 30, Luma([255]));
        BitmapFace::for_size(24).draw_line(&mut canvas, 0.0, 24.0, "  ", 0);
        assert!(canvas.pixels().all(|p| p.0[0] == 255));
    }
}
