//! # Label Compositor
//!
//! Draws one record onto a fresh canvas using a resolved [`Layout`].
//!
//! ## Pipeline
//!
//! ```text
//! canvas (background) ─→ paste QR at (qr.x, qr.y)
//!                     ─→ for each text block, in order:
//!                          substitute ─→ wrap (max_width) ─→ draw (anchor, fill, spacing)
//! ```
//!
//! Later elements overwrite earlier ones; nothing is clipped or blended
//! except glyph coverage against what is already on the canvas.
//!
//! ## Example
//!
//! ```no_run
//! use pallet_label::layout::LayoutResolver;
//! use pallet_label::record::Record;
//! use pallet_label::render::render_label;
//!
//! let layout = LayoutResolver::new(203).unwrap().default_layout();
//! let record = Record::new([("pallet_id", "PAL-001"), ("destination", "Dock 7")]);
//! let label = render_label(&record, &layout).unwrap();
//! assert_eq!(label.image.dimensions(), (812, 1218));
//! ```

pub mod text;

use image::{GrayImage, Luma, imageops};

use crate::error::Result;
use crate::layout::{Layout, TextBlock};
use crate::qr::{build_qr_image, qr_payload};
use crate::record::Record;
use crate::wrap::wrap_text_to_width;

pub use text::{TextStyle, draw_multiline_text};

/// A composed label, ready for export.
#[derive(Debug, Clone)]
pub struct RenderedLabel {
    pub image: GrayImage,
    /// Resolution the geometry was resolved at
    pub dpi: u32,
}

impl RenderedLabel {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Compose `record` onto a new canvas.
///
/// Fails only when the QR payload cannot be encoded.
pub fn render_label(record: &Record, layout: &Layout) -> Result<RenderedLabel> {
    let mut canvas = GrayImage::from_pixel(layout.width, layout.height, Luma([layout.background]));

    let qr = &layout.qr;
    let code = build_qr_image(qr_payload(record), qr.box_size, qr.border, qr.size)?;
    imageops::replace(&mut canvas, &code, qr.x, qr.y);

    for block in &layout.text_blocks {
        let font = block.font(&layout.fonts);
        let text = block_text(block, record, layout);
        let style = TextStyle {
            anchor: block.anchor,
            fill: block.fill,
            spacing: block.spacing(font, &layout.defaults),
        };
        draw_multiline_text(&mut canvas, font, (block.x, block.y), &text, style);
    }

    Ok(RenderedLabel {
        image: canvas,
        dpi: layout.dpi,
    })
}

/// The text a block prints for `record`: substituted, then wrapped when the
/// block has a maximum width.
pub fn block_text(block: &TextBlock, record: &Record, layout: &Layout) -> String {
    let font = block.font(&layout.fonts);
    let text = block.template.render(record);
    wrap_text_to_width(&text, font, block.max_width)
}
