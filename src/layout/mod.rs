//! # Label Layout
//!
//! Resolves a declarative template (inches or pixels) into absolute pixel
//! geometry for the canvas, the QR code and every text block.
//!
//! ## Architecture
//!
//! ```text
//! template JSON ─→ TemplateDocument ─┐
//!                                    ├─→ LayoutResolver (dpi, defaults) ─→ Layout
//! (no template) ─────────────────────┘
//! ```
//!
//! A [`Layout`] is built once per run and shared read-only by every row.
//!
//! ## Example
//!
//! ```
//! use pallet_label::layout::LayoutResolver;
//!
//! let layout = LayoutResolver::new(203).unwrap().default_layout();
//! assert_eq!((layout.width, layout.height), (812, 1218));
//! assert_eq!(layout.text_blocks.len(), 3);
//! ```

mod anchor;
pub mod schema;

use std::path::Path;
use std::sync::OnceLock;

pub use anchor::{Anchor, HorizontalAnchor, VerticalAnchor};
pub use schema::TemplateDocument;

use crate::config::{
    FontConfig, LayoutDefaults, MAX_DPI, MAX_QR_BORDER, MAX_QR_BOX_SIZE, MAX_SIDE_PX,
    inches_to_px, inches_to_px_floor,
};
use crate::error::{LabelError, Result};
use crate::font::{GlyphMetrics, LabelFont};
use crate::template::Template;

/// QR code placement and module geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrGeometry {
    /// Pixels per module before the final resize
    pub box_size: u32,
    /// Light modules around the symbol
    pub border: u32,
    /// Side of the rendered square in pixels
    pub size: u32,
    /// Top-left corner
    pub x: i64,
    pub y: i64,
}

/// One positioned text block.
///
/// The block's font is loaded on first use and kept for the life of the
/// layout; blocks never share a loaded face.
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub template: Template,
    pub x: i64,
    pub y: i64,
    pub font_size: u32,
    pub anchor: Anchor,
    pub fill: u8,
    /// Wrap width in pixels; wrapping only happens when set
    pub max_width: Option<u32>,
    pub line_spacing: Option<u32>,
    pub font_path: Option<String>,
    font: OnceLock<LabelFont>,
}

impl TextBlock {
    /// A left/ascender-anchored black block with no wrapping.
    pub fn new(text: &str, x: i64, y: i64, font_size: u32) -> Self {
        Self {
            template: Template::parse(text),
            x,
            y,
            font_size,
            anchor: Anchor::LEFT_ASCENDER,
            fill: 0,
            max_width: None,
            line_spacing: None,
            font_path: None,
            font: OnceLock::new(),
        }
    }

    pub fn with_max_width(mut self, max_width: u32) -> Self {
        self.max_width = Some(max_width);
        self
    }

    pub fn with_line_spacing(mut self, spacing: u32) -> Self {
        self.line_spacing = Some(spacing);
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_fill(mut self, fill: u8) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_font_path(mut self, path: impl Into<String>) -> Self {
        self.font_path = Some(path.into());
        self
    }

    /// The block's font, loading it on first call.
    pub fn font(&self, fonts: &FontConfig) -> &LabelFont {
        self.font
            .get_or_init(|| LabelFont::resolve(self.font_path.as_deref(), self.font_size, fonts))
    }

    /// Gap between lines: the explicit spacing when non-zero, otherwise a
    /// share of the font size with a floor. Faces without a size get the floor.
    pub fn spacing(&self, font: &impl GlyphMetrics, defaults: &LayoutDefaults) -> u32 {
        match self.line_spacing {
            Some(spacing) if spacing > 0 => spacing,
            _ => font
                .size()
                .map(|size| defaults.line_spacing_for(size))
                .unwrap_or(defaults.min_line_spacing),
        }
    }
}

/// Fully resolved label geometry.
#[derive(Debug, Clone)]
pub struct Layout {
    pub dpi: u32,
    pub width: u32,
    pub height: u32,
    pub background: u8,
    pub qr: QrGeometry,
    pub text_blocks: Vec<TextBlock>,
    pub defaults: LayoutDefaults,
    pub fonts: FontConfig,
}

/// Turns templates into [`Layout`]s at a fixed resolution.
#[derive(Debug, Clone)]
pub struct LayoutResolver {
    dpi: u32,
    defaults: LayoutDefaults,
    fonts: FontConfig,
}

impl LayoutResolver {
    /// Resolver at `dpi` with stock defaults. Fails unless `1 <= dpi <= MAX_DPI`.
    pub fn new(dpi: u32) -> Result<Self> {
        if dpi == 0 || dpi > MAX_DPI {
            return Err(LabelError::Configuration(format!(
                "DPI must be between 1 and {} (got {})",
                MAX_DPI, dpi
            )));
        }
        Ok(Self {
            dpi,
            defaults: LayoutDefaults::default(),
            fonts: FontConfig::default(),
        })
    }

    pub fn with_defaults(mut self, defaults: LayoutDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_fonts(mut self, fonts: FontConfig) -> Self {
        self.fonts = fonts;
        self
    }

    /// Resolve `template` if given, otherwise build the default layout.
    pub fn resolve(&self, template: Option<&Path>) -> Result<Layout> {
        let layout = match template {
            Some(path) => self.from_file(path)?,
            None => self.default_layout(),
        };
        log::debug!(
            "Resolved layout: {}x{} px @ {} DPI, QR {}px at ({}, {}), {} text blocks",
            layout.width,
            layout.height,
            layout.dpi,
            layout.qr.size,
            layout.qr.x,
            layout.qr.y,
            layout.text_blocks.len()
        );
        Ok(layout)
    }

    /// Read and resolve a JSON template file.
    pub fn from_file(&self, path: &Path) -> Result<Layout> {
        let json = std::fs::read_to_string(path)?;
        self.from_json(&json)
    }

    /// Resolve a JSON template string.
    pub fn from_json(&self, json: &str) -> Result<Layout> {
        let doc: TemplateDocument = serde_json::from_str(json)?;
        self.from_template(&doc)
    }

    /// Resolve a parsed template, filling omitted fields from the defaults.
    pub fn from_template(&self, doc: &TemplateDocument) -> Result<Layout> {
        let d = &self.defaults;
        let dpi = self.dpi;

        let width_in = doc.label.width_in.unwrap_or(d.label_width_in);
        let height_in = doc.label.height_in.unwrap_or(d.label_height_in);
        let width = canvas_dimension(width_in, dpi, "label.width_in")?;
        let height = canvas_dimension(height_in, dpi, "label.height_in")?;
        let background = match doc.label.background {
            Some(v) => channel(v, "label.background")?,
            None => d.background,
        };

        let box_size = match doc.qr.box_size {
            Some(v) => whole(v, "qr.box_size", 1, MAX_QR_BOX_SIZE)?,
            None => d.qr_box_size,
        };
        let border = match doc.qr.border {
            Some(v) => whole(v, "qr.border", 0, MAX_QR_BORDER)?,
            None => d.qr_border,
        };
        let size = match (doc.qr.size_in, doc.qr.size_px) {
            (Some(inches), _) => {
                let px = inches_to_px(finite(inches, "qr.size_in")?, dpi) as f64;
                whole(px, "qr.size_in", 1, MAX_SIDE_PX)?
            }
            (None, Some(px)) => whole(px, "qr.size_px", 1, MAX_SIDE_PX)?,
            (None, None) => inches_to_px(d.template_qr_size_in, dpi) as u32,
        };
        let (x, y) = match doc.qr.position {
            Some(pos) => point(pos, "qr.position")?,
            None => {
                let margin = inches_to_px_floor(d.template_qr_margin_in, dpi);
                (
                    width as i64 - size as i64 - margin,
                    height as i64 - size as i64 - margin,
                )
            }
        };
        let qr = QrGeometry {
            box_size,
            border,
            size,
            x,
            y,
        };

        let offset = inches_to_px_floor(d.template_text_offset_in, dpi);
        let font_size_default = inches_to_px_floor(d.template_font_size_in, dpi).max(1) as u32;
        let text_blocks = doc
            .text_blocks
            .iter()
            .enumerate()
            .map(|(i, block)| -> Result<TextBlock> {
                let field = |name: &str| format!("text_blocks[{}].{}", i, name);
                let (x, y) = match block.position {
                    Some(pos) => point(pos, &field("position"))?,
                    None => (offset, offset),
                };
                let font_size = match block.font_size {
                    Some(v) => whole(v, &field("font_size"), 1, MAX_SIDE_PX)?,
                    None => font_size_default,
                };
                let anchor = match block.anchor.as_deref() {
                    Some(a) => a.parse::<Anchor>()?,
                    None => Anchor::LEFT_ASCENDER,
                };
                let fill = match block.fill {
                    Some(v) => channel(v, &field("fill"))?,
                    None => 0,
                };
                let mut text_block =
                    TextBlock::new(block.text.as_deref().unwrap_or(""), x, y, font_size)
                        .with_anchor(anchor)
                        .with_fill(fill);
                if let Some(v) = block.max_width {
                    text_block =
                        text_block.with_max_width(whole(v, &field("max_width"), 0, u32::MAX)?);
                }
                if let Some(v) = block.line_spacing {
                    text_block = text_block
                        .with_line_spacing(whole(v, &field("line_spacing"), 0, MAX_SIDE_PX)?);
                }
                if let Some(path) = &block.font_path {
                    text_block = text_block.with_font_path(path.as_str());
                }
                Ok(text_block)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.layout(width, height, background, qr, text_blocks))
    }

    /// The built-in three-line layout with the QR code in the bottom-right.
    ///
    /// ```text
    /// ┌──────────────────────────┐
    /// │ Pallet: {pallet_id}      │  identifier
    /// │ Destination: {dest…}     │  capped to stop short of the QR column
    /// │ Contents: {contents}     │  wrapped across the full width
    /// │ …                        │
    /// │              ┌───────┐   │
    /// │              │  QR   │   │
    /// │              └───────┘   │
    /// └──────────────────────────┘
    /// ```
    pub fn default_layout(&self) -> Layout {
        let d = &self.defaults;
        let dpi = self.dpi;
        let px = |inches: f64| inches_to_px(inches, dpi);
        let font = |inches: f64, floor: u32| (px(inches).max(0) as u32).max(floor);

        let width = px(d.label_width_in).max(1) as u32;
        let height = px(d.label_height_in).max(1) as u32;
        let margin = px(d.default_margin_in);
        let qr_size = px(d.default_qr_size_in).max(1);

        let qr = QrGeometry {
            box_size: d.qr_box_size,
            border: d.qr_border,
            size: qr_size as u32,
            x: width as i64 - qr_size - margin,
            y: height as i64 - qr_size - margin,
        };

        let destination_width = width as i64 - (2 * margin + qr_size + margin);
        let contents_width = width as i64 - 2 * margin;

        let text_blocks = vec![
            TextBlock::new(
                "Pallet: {pallet_id}",
                margin,
                margin,
                font(d.default_identifier_font_in, d.default_identifier_font_floor),
            ),
            TextBlock::new(
                "Destination: {destination}",
                margin,
                margin + px(d.default_destination_offset_in),
                font(d.default_destination_font_in, d.default_destination_font_floor),
            )
            .with_max_width(destination_width.max(1) as u32),
            TextBlock::new(
                "Contents: {contents}",
                margin,
                margin + px(d.default_contents_offset_in),
                font(d.default_contents_font_in, d.default_contents_font_floor),
            )
            .with_max_width(contents_width.max(1) as u32)
            .with_line_spacing(px(d.default_contents_spacing_in).max(0) as u32),
        ];

        self.layout(width, height, d.background, qr, text_blocks)
    }

    fn layout(
        &self,
        width: u32,
        height: u32,
        background: u8,
        qr: QrGeometry,
        text_blocks: Vec<TextBlock>,
    ) -> Layout {
        Layout {
            dpi: self.dpi,
            width,
            height,
            background,
            qr,
            text_blocks,
            defaults: self.defaults.clone(),
            fonts: self.fonts.clone(),
        }
    }
}

// ============================================================================
// FIELD VALIDATION
// ============================================================================

fn config_error(field: &str, message: &str, value: f64) -> LabelError {
    LabelError::Configuration(format!("{} {} (got {})", field, message, value))
}

fn finite(value: f64, field: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(config_error(field, "must be a finite number", value))
    }
}

/// Canvas side in pixels; must come out between 1 and [`MAX_SIDE_PX`].
fn canvas_dimension(inches: f64, dpi: u32, field: &str) -> Result<u32> {
    let px = inches_to_px(finite(inches, field)?, dpi);
    if px <= 0 || px > MAX_SIDE_PX as i64 {
        let message = format!("must give between 1 and {} pixels", MAX_SIDE_PX);
        return Err(config_error(field, &message, inches));
    }
    Ok(px as u32)
}

/// Truncate to a whole number within `min..=max`.
fn whole(value: f64, field: &str, min: u32, max: u32) -> Result<u32> {
    let v = finite(value, field)?.trunc();
    if v < min as f64 || v > max as f64 {
        let message = format!("must be between {} and {}", min, max);
        return Err(config_error(field, &message, value));
    }
    Ok(v as u32)
}

fn channel(value: f64, field: &str) -> Result<u8> {
    let v = finite(value, field)?.trunc();
    if !(0.0..=255.0).contains(&v) {
        return Err(config_error(field, "must be between 0 and 255", value));
    }
    Ok(v as u8)
}

fn point(pos: [f64; 2], field: &str) -> Result<(i64, i64)> {
    let x = finite(pos[0], field)?.trunc() as i64;
    let y = finite(pos[1], field)?.trunc() as i64;
    Ok((x, y))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolver() -> LayoutResolver {
        LayoutResolver::new(203).unwrap()
    }

    #[test]
    fn test_default_layout_at_203_dpi() {
        let layout = resolver().default_layout();
        assert_eq!((layout.width, layout.height), (812, 1218));
        assert_eq!(layout.background, 255);
        // margin 61, QR 487
        assert_eq!(
            layout.qr,
            QrGeometry {
                box_size: 10,
                border: 4,
                size: 487,
                x: 812 - 487 - 61,
                y: 1218 - 487 - 61,
            }
        );

        let blocks = &layout.text_blocks;
        assert_eq!(blocks[0].template.source(), "Pallet: {pallet_id}");
        assert_eq!((blocks[0].x, blocks[0].y, blocks[0].font_size), (61, 61, 91));
        assert_eq!((blocks[1].y, blocks[1].font_size), (61 + 142, 57));
        assert_eq!(blocks[1].max_width, Some(812 - (2 * 61 + 487 + 61)));
        assert_eq!((blocks[2].y, blocks[2].font_size), (61 + 244, 53));
        assert_eq!(blocks[2].max_width, Some(812 - 122));
        assert_eq!(blocks[2].line_spacing, Some(20));
    }

    #[test]
    fn test_default_layout_font_floors_at_low_dpi() {
        let layout = LayoutResolver::new(20).unwrap().default_layout();
        let sizes: Vec<u32> = layout.text_blocks.iter().map(|b| b.font_size).collect();
        assert_eq!(sizes, vec![24, 18, 16]);
    }

    #[test]
    fn test_default_layout_scales_with_dpi() {
        let layout = LayoutResolver::new(300).unwrap().default_layout();
        assert_eq!((layout.width, layout.height), (1200, 1800));
        assert_eq!(layout.qr.size, 720);
        assert_eq!(layout.qr.x, 1200 - 720 - 90);
    }

    #[test]
    fn test_dpi_out_of_range_rejected() {
        assert!(matches!(LayoutResolver::new(0), Err(LabelError::Configuration(_))));
        assert!(matches!(LayoutResolver::new(MAX_DPI + 1), Err(LabelError::Configuration(_))));
        let layout = LayoutResolver::new(MAX_DPI).unwrap().default_layout();
        assert!(layout.height <= MAX_SIDE_PX);
    }

    #[test]
    fn test_oversized_geometry_rejected() {
        let cases = [
            (r#"{"qr": {"border": 3000000000, "size_px": 100, "position": [0, 0]}}"#, "qr.border"),
            (r#"{"qr": {"border": 101}}"#, "qr.border"),
            (r#"{"qr": {"box_size": 4294967295}}"#, "qr.box_size"),
            (r#"{"qr": {"size_px": 100000}}"#, "qr.size_px"),
            (r#"{"qr": {"size_in": 1e12}}"#, "qr.size_in"),
            (r#"{"label": {"width_in": 1000}}"#, "label.width_in"),
            (r#"{"text_blocks": [{"font_size": 1e9}]}"#, "text_blocks[0].font_size"),
        ];
        for (json, field) in cases {
            let err = resolver().from_json(json).unwrap_err();
            assert!(matches!(err, LabelError::Configuration(_)), "{json}: {err}");
            assert!(err.to_string().contains(field), "{json}: {err}");
        }
    }

    #[test]
    fn test_largest_qr_geometry_accepted() {
        let layout = resolver()
            .from_json(r#"{"qr": {"box_size": 100, "border": 100, "size_px": 16384}}"#)
            .unwrap();
        assert_eq!((layout.qr.box_size, layout.qr.border, layout.qr.size), (100, 100, 16384));
    }

    #[test]
    fn test_empty_template_uses_defaults() {
        let layout = resolver().from_json("{}").unwrap();
        assert_eq!((layout.width, layout.height), (812, 1218));
        assert_eq!(layout.qr.size, 508); // 2.5 × 203 = 507.5, ties to even
        // Bottom-right, 50px margin (0.25in truncated)
        assert_eq!((layout.qr.x, layout.qr.y), (812 - 508 - 50, 1218 - 508 - 50));
        assert!(layout.text_blocks.is_empty());
    }

    #[test]
    fn test_template_geometry() {
        let json = r#"{
            "label": {"width_in": 3, "height_in": 2, "background": 200},
            "qr": {"box_size": 6, "border": 2, "size_in": 1.0, "position": [10, 12.9]},
            "text_blocks": [
                {"text": "ID {pallet_id}", "position": [5, 6], "font_size": 30,
                 "anchor": "mm", "fill": 40, "max_width": 250, "line_spacing": 3,
                 "font_path": "Mono.ttf"},
                {"text": "bare"}
            ]
        }"#;
        let layout = resolver().from_json(json).unwrap();
        assert_eq!((layout.width, layout.height, layout.background), (609, 406, 200));
        assert_eq!(
            layout.qr,
            QrGeometry {
                box_size: 6,
                border: 2,
                size: 203,
                x: 10,
                y: 12,
            }
        );

        let a = &layout.text_blocks[0];
        assert_eq!((a.x, a.y, a.font_size, a.fill), (5, 6, 30, 40));
        assert_eq!(a.anchor.to_string(), "mm");
        assert_eq!((a.max_width, a.line_spacing), (Some(250), Some(3)));
        assert_eq!(a.font_path.as_deref(), Some("Mono.ttf"));

        let b = &layout.text_blocks[1];
        assert_eq!((b.x, b.y, b.font_size), (50, 50, 60));
        assert_eq!(b.anchor, Anchor::LEFT_ASCENDER);
        assert_eq!((b.max_width, b.line_spacing, b.fill), (None, None, 0));
    }

    #[test]
    fn test_size_in_wins_over_size_px() {
        let layout = resolver()
            .from_json(r#"{"qr": {"size_in": 1, "size_px": 50}}"#)
            .unwrap();
        assert_eq!(layout.qr.size, 203);
        let layout = resolver().from_json(r#"{"qr": {"size_px": 50}}"#).unwrap();
        assert_eq!(layout.qr.size, 50);
    }

    #[test]
    fn test_malformed_templates_rejected() {
        let cases = [
            "not json",
            r#"{"label": {"width_in": "four"}}"#,
            r#"{"label": {"width_in": 0}}"#,
            r#"{"label": {"background": 300}}"#,
            r#"{"qr": {"box_size": 0}}"#,
            r#"{"qr": {"border": -1}}"#,
            r#"{"qr": {"position": [1]}}"#,
            r#"{"text_blocks": [{"anchor": "zz"}]}"#,
            r#"{"text_blocks": [{"font_size": 0}]}"#,
            r#"{"text_blocks": [{"fill": -3}]}"#,
            r#"{"text_blocks": [{"max_width": -10}]}"#,
            r#"{"text_blocks": "none"}"#,
        ];
        for json in cases {
            let err = resolver().from_json(json).unwrap_err();
            assert!(
                matches!(err, LabelError::Configuration(_) | LabelError::Template(_)),
                "{json}: {err}"
            );
            assert!(!err.is_row_fatal());
        }
    }

    #[test]
    fn test_error_names_offending_field() {
        let err = resolver()
            .from_json(r#"{"text_blocks": [{}, {"fill": 999}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("text_blocks[1].fill"), "{err}");
    }

    #[test]
    fn test_pixel_size_property() {
        for dpi in [1u32, 72, 96, 150, 203, 300, 600] {
            for (w, h) in [(4.0, 6.0), (2.25, 1.25), (0.8, 10.0)] {
                let json = format!(r#"{{"label": {{"width_in": {w}, "height_in": {h}}}}}"#);
                if let Ok(layout) = LayoutResolver::new(dpi).unwrap().from_json(&json) {
                    assert_eq!(layout.width as i64, inches_to_px(w, dpi));
                    assert_eq!(layout.height as i64, inches_to_px(h, dpi));
                }
            }
        }
    }

    #[test]
    fn test_missing_template_file_is_io_error() {
        let err = resolver()
            .resolve(Some(Path::new("/nonexistent/template.json")))
            .unwrap_err();
        assert!(matches!(err, LabelError::Io(_)));
    }

    #[test]
    fn test_spacing_rules() {
        let defaults = LayoutDefaults::default();
        let bitmap = crate::font::BitmapFace::for_size(24);
        let block = TextBlock::new("x", 0, 0, 24);
        assert_eq!(block.spacing(&bitmap, &defaults), 4);
        let block = block.with_line_spacing(0);
        assert_eq!(block.spacing(&bitmap, &defaults), 4);
        let block = block.with_line_spacing(9);
        assert_eq!(block.spacing(&bitmap, &defaults), 9);
    }
}
