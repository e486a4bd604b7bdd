//! JSON schema types for layout templates.
//!
//! Every field is optional; the resolver fills gaps from
//! [`crate::config::LayoutDefaults`]. Numbers are read as `f64` so `10` and
//! `10.0` are equally accepted; integer fields drop any fraction.

use serde::Deserialize;

/// Top-level layout template.
#[derive(Debug, Default, Deserialize)]
pub struct TemplateDocument {
    #[serde(default)]
    pub label: LabelSection,
    #[serde(default)]
    pub qr: QrSection,
    #[serde(default)]
    pub text_blocks: Vec<TextBlockSection>,
}

/// Physical label size and background.
#[derive(Debug, Default, Deserialize)]
pub struct LabelSection {
    #[serde(default)]
    pub width_in: Option<f64>,
    #[serde(default)]
    pub height_in: Option<f64>,
    /// Canvas fill, 0-255.
    #[serde(default)]
    pub background: Option<f64>,
}

/// QR code geometry.
#[derive(Debug, Default, Deserialize)]
pub struct QrSection {
    /// Pixels per module before the final resize.
    #[serde(default)]
    pub box_size: Option<f64>,
    /// Light modules around the symbol.
    #[serde(default)]
    pub border: Option<f64>,
    /// Rendered size in inches; wins over `size_px` when both are given.
    #[serde(default)]
    pub size_in: Option<f64>,
    #[serde(default)]
    pub size_px: Option<f64>,
    /// Top-left corner in pixels.
    #[serde(default)]
    pub position: Option<[f64; 2]>,
}

/// One positioned text block.
#[derive(Debug, Default, Deserialize)]
pub struct TextBlockSection {
    /// Text with `{field}` placeholders.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub position: Option<[f64; 2]>,
    #[serde(default)]
    pub font_size: Option<f64>,
    /// Two-letter anchor such as "la" or "mm".
    #[serde(default)]
    pub anchor: Option<String>,
    /// Text value, 0-255.
    #[serde(default)]
    pub fill: Option<f64>,
    /// Wrap width in pixels; no wrapping when absent.
    #[serde(default)]
    pub max_width: Option<f64>,
    #[serde(default)]
    pub line_spacing: Option<f64>,
    #[serde(default)]
    pub font_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_parses() {
        let doc: TemplateDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.text_blocks.is_empty());
        assert!(doc.label.width_in.is_none());
    }

    #[test]
    fn test_full_template_parses() {
        let json = r#"{
            "label": {"width_in": 4, "height_in": 3.5, "background": 255},
            "qr": {"box_size": 8, "border": 2, "size_px": 300, "position": [10, 20]},
            "text_blocks": [
                {"text": "ID {pallet_id}", "position": [5, 5], "font_size": 40,
                 "anchor": "lt", "fill": 0, "max_width": 400, "line_spacing": 6,
                 "font_path": "Mono.ttf"}
            ]
        }"#;
        let doc: TemplateDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.label.height_in, Some(3.5));
        assert_eq!(doc.qr.position, Some([10.0, 20.0]));
        assert_eq!(doc.text_blocks[0].font_path.as_deref(), Some("Mono.ttf"));
    }

    #[test]
    fn test_non_numeric_geometry_rejected() {
        let json = r#"{"label": {"width_in": "wide"}}"#;
        assert!(serde_json::from_str::<TemplateDocument>(json).is_err());
    }

    #[test]
    fn test_position_needs_two_numbers() {
        let json = r#"{"qr": {"position": [1, 2, 3]}}"#;
        assert!(serde_json::from_str::<TemplateDocument>(json).is_err());
    }
}
