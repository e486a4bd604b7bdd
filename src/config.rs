//! # Label Configuration
//!
//! Defaults used by the geometry resolver and the font loader.
//!
//! ## Default Label
//!
//! | Property | Value |
//! |----------|-------|
//! | Resolution | 203 DPI (common 4x6 thermal printers) |
//! | Label size | 4in x 6in (812 x 1218 dots at 203 DPI) |
//! | Background | 255 (white) |
//! | QR module | 10 px box, 4 module border |
//!
//! ## Limits
//!
//! | Property | Largest accepted |
//! |----------|------------------|
//! | Resolution | 2400 DPI |
//! | Canvas, QR or font side | 16384 px |
//! | QR module box | 100 px |
//! | QR border | 100 modules |
//!
//! ## Usage
//!
//! ```
//! use pallet_label::config::{LayoutDefaults, DEFAULT_DPI};
//!
//! let defaults = LayoutDefaults::default();
//! assert_eq!(defaults.inches_to_px(defaults.label_width_in, DEFAULT_DPI), 812);
//! ```

use std::path::PathBuf;

/// Output resolution used when the caller does not choose one.
pub const DEFAULT_DPI: u32 = 203;

/// Highest resolution a resolver accepts.
pub const MAX_DPI: u32 = 2400;

/// Largest side, in pixels, of any raster a layout asks for: the canvas,
/// the QR code before and after scaling, or a font's em.
pub const MAX_SIDE_PX: u32 = 16_384;

pub const MAX_QR_BOX_SIZE: u32 = 100;

pub const MAX_QR_BORDER: u32 = 100;

/// Convert inches to whole dots, rounding half to even.
///
/// ```text
/// pixels = round(inches × dpi)
///
/// 4.0in  @ 203 DPI = 812
/// 2.4in  @ 203 DPI = 487.2 → 487
/// ```
#[inline]
pub fn inches_to_px(inches: f64, dpi: u32) -> i64 {
    (inches * dpi as f64).round_ties_even() as i64
}

/// Convert inches to whole dots, truncating toward zero.
///
/// Used for offsets where a fractional dot is dropped rather than rounded.
#[inline]
pub fn inches_to_px_floor(inches: f64, dpi: u32) -> i64 {
    (inches * dpi as f64).trunc() as i64
}

/// # Layout Defaults
///
/// Every inch measurement and pixel floor the resolver falls back on.
/// Handed to [`crate::layout::LayoutResolver`] and never
/// mutated, so one value can be shared across runs and threads.
///
/// ## Two Families
///
/// - **template_***: fallbacks for fields a layout template omits
/// - **default_***: geometry of the built-in three-line layout
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutDefaults {
    pub label_width_in: f64,
    pub label_height_in: f64,
    /// Canvas fill (0 = black, 255 = white)
    pub background: u8,
    pub qr_box_size: u32,
    pub qr_border: u32,

    pub template_qr_size_in: f64,
    /// Distance of a template's QR code from the bottom-right corner
    pub template_qr_margin_in: f64,
    /// Position of a text block that gives none
    pub template_text_offset_in: f64,
    pub template_font_size_in: f64,

    pub default_margin_in: f64,
    pub default_qr_size_in: f64,
    pub default_destination_offset_in: f64,
    pub default_contents_offset_in: f64,
    pub default_identifier_font_in: f64,
    pub default_destination_font_in: f64,
    pub default_contents_font_in: f64,
    pub default_identifier_font_floor: u32,
    pub default_destination_font_floor: u32,
    pub default_contents_font_floor: u32,
    pub default_contents_spacing_in: f64,

    /// Smallest line spacing used when a block gives none
    pub min_line_spacing: u32,
    /// Share of the font size used as line spacing when a block gives none
    pub line_spacing_factor: f64,
}

impl LayoutDefaults {
    /// Convert inches to dots (see [`inches_to_px`]).
    #[inline]
    pub fn inches_to_px(&self, inches: f64, dpi: u32) -> i64 {
        inches_to_px(inches, dpi)
    }

    /// Line spacing for a block of `font_size` px that does not set one.
    pub fn line_spacing_for(&self, font_size: u32) -> u32 {
        let derived = (font_size as f64 * self.line_spacing_factor) as u32;
        derived.max(self.min_line_spacing)
    }
}

impl Default for LayoutDefaults {
    fn default() -> Self {
        Self {
            label_width_in: 4.0,
            label_height_in: 6.0,
            background: 255,
            qr_box_size: 10,
            qr_border: 4,

            template_qr_size_in: 2.5,
            template_qr_margin_in: 0.25,
            template_text_offset_in: 0.25,
            template_font_size_in: 0.3,

            default_margin_in: 0.3,
            default_qr_size_in: 2.4,
            default_destination_offset_in: 0.7,
            default_contents_offset_in: 1.2,
            default_identifier_font_in: 0.45,
            default_destination_font_in: 0.28,
            default_contents_font_in: 0.26,
            default_identifier_font_floor: 24,
            default_destination_font_floor: 18,
            default_contents_font_floor: 16,
            default_contents_spacing_in: 0.1,

            min_line_spacing: 4,
            line_spacing_factor: 0.2,
        }
    }
}

// ============================================================================
// FONTS
// ============================================================================

/// Where text blocks look for their font files.
///
/// A block's `font_path` (or `default_face` when it has none) is tried as
/// given first, then, if relative, inside each of `search_dirs` in order.
#[derive(Debug, Clone, PartialEq)]
pub struct FontConfig {
    pub default_face: String,
    pub search_dirs: Vec<PathBuf>,
}

impl FontConfig {
    /// Put `dir` ahead of the built-in search directories.
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.insert(0, dir.into());
        self
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            default_face: "DejaVuSans.ttf".to_string(),
            search_dirs: [
                "/usr/share/fonts/truetype/dejavu",
                "/usr/share/fonts/dejavu",
                "/usr/share/fonts/TTF",
                "/usr/local/share/fonts",
                "/Library/Fonts",
                "C:\\Windows\\Fonts",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_label_at_203_dpi() {
        let d = LayoutDefaults::default();
        assert_eq!(d.inches_to_px(d.label_width_in, DEFAULT_DPI), 812);
        assert_eq!(d.inches_to_px(d.label_height_in, DEFAULT_DPI), 1218);
    }

    #[test]
    fn test_inches_to_px_rounds_half_to_even() {
        // 0.5in @ 1 DPI and 2.5in @ 1 DPI sit exactly on .5
        assert_eq!(inches_to_px(0.5, 1), 0);
        assert_eq!(inches_to_px(2.5, 1), 2);
        assert_eq!(inches_to_px(1.5, 1), 2);
    }

    #[test]
    fn test_inches_to_px_floor_truncates() {
        // 0.25 × 203 = 50.75
        assert_eq!(inches_to_px_floor(0.25, 203), 50);
        assert_eq!(inches_to_px(0.25, 203), 51);
    }

    #[test]
    fn test_line_spacing_floor() {
        let d = LayoutDefaults::default();
        assert_eq!(d.line_spacing_for(10), 4);
        assert_eq!(d.line_spacing_for(91), 18);
    }

    #[test]
    fn test_font_search_dir_precedence() {
        let fonts = FontConfig::default().with_search_dir("/opt/fonts");
        assert_eq!(fonts.search_dirs[0], PathBuf::from("/opt/fonts"));
        assert_eq!(fonts.default_face, "DejaVuSans.ttf");
    }
}
