//! # Label Export
//!
//! Writes a [`RenderedLabel`] as `<base>.png` and `<base>.pdf`, both
//! carrying the label's DPI so print tooling sees the right physical size.
//!
//! ## Outputs
//!
//! ```text
//! RenderedLabel ─┬─→ encode_png ─→ 8-bit grayscale PNG, pHYs = dpi (pixels per metre)
//!                └─→ encode_pdf ─→ one page, width × height at dpi, image placed at origin
//! ```
//!
//! Existing files are overwritten. PNG output is byte-for-byte deterministic;
//! PDF output embeds document metadata and is not. A label is exported whole
//! or not at all: when the PDF cannot be written the fresh PNG is removed.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::{ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px};

use crate::error::{LabelError, Result};
use crate::render::RenderedLabel;

const MM_PER_INCH: f32 = 25.4;
const METRES_PER_INCH: f64 = 0.0254;

/// Paths written for one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedLabel {
    pub png: PathBuf,
    pub pdf: PathBuf,
}

/// Write `label` to `<base>.png` and `<base>.pdf`.
///
/// The extensions are appended, so dots already in `base` are kept.
pub fn export_label(label: &RenderedLabel, base: &Path) -> Result<ExportedLabel> {
    let png = with_suffix(base, ".png");
    let pdf = with_suffix(base, ".pdf");

    let png_bytes = encode_png(label).map_err(|e| LabelError::export(&png, e))?;
    std::fs::write(&png, png_bytes).map_err(|e| LabelError::export(&png, e))?;

    let title = base
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "label".to_string());
    let written = encode_pdf(label, &title)
        .map_err(|e| LabelError::export(&pdf, e))
        .and_then(|bytes| std::fs::write(&pdf, bytes).map_err(|e| LabelError::export(&pdf, e)));
    if let Err(error) = written {
        if let Err(e) = std::fs::remove_file(&png) {
            log::warn!("Could not remove {}: {}", png.display(), e);
        }
        return Err(error);
    }

    log::debug!("Wrote {} and {}", png.display(), pdf.display());
    Ok(ExportedLabel { png, pdf })
}

/// Encode as an 8-bit grayscale PNG with a pHYs chunk for the label's DPI.
pub fn encode_png(label: &RenderedLabel) -> std::result::Result<Vec<u8>, png::EncodingError> {
    let (width, height) = label.image.dimensions();
    let ppm = pixels_per_metre(label.dpi);

    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, width, height);
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }));
        let mut writer = encoder.write_header()?;
        writer.write_image_data(label.image.as_raw())?;
        writer.finish()?;
    }
    Ok(bytes)
}

/// Encode as a single-page PDF sized so the image prints at the label's DPI.
pub fn encode_pdf(label: &RenderedLabel, title: &str) -> std::result::Result<Vec<u8>, printpdf::Error> {
    let (width, height) = label.image.dimensions();
    let dpi = label.dpi as f32;
    let page_width = Mm(width as f32 / dpi * MM_PER_INCH);
    let page_height = Mm(height as f32 / dpi * MM_PER_INCH);

    let (doc, page, layer) = PdfDocument::new(title, page_width, page_height, "Label");
    let layer = doc.get_page(page).get_layer(layer);

    let image = Image::from(ImageXObject {
        width: Px(width as usize),
        height: Px(height as usize),
        color_space: ColorSpace::Greyscale,
        bits_per_component: ColorBits::Bit8,
        interpolate: false,
        image_data: label.image.as_raw().clone(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    });
    image.add_to_layer(
        layer,
        ImageTransform {
            dpi: Some(dpi),
            ..Default::default()
        },
    );

    let mut bytes = Vec::new();
    doc.save(&mut BufWriter::new(&mut bytes))?;
    Ok(bytes)
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// PNG stores density in pixels per metre.
fn pixels_per_metre(dpi: u32) -> u32 {
    (dpi as f64 / METRES_PER_INCH).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn label(dpi: u32) -> RenderedLabel {
        let mut image = GrayImage::from_pixel(40, 60, Luma([255]));
        image.put_pixel(3, 4, Luma([0]));
        RenderedLabel { image, dpi }
    }

    #[test]
    fn test_pixels_per_metre() {
        assert_eq!(pixels_per_metre(203), 7992);
        assert_eq!(pixels_per_metre(300), 11811);
    }

    #[test]
    fn test_png_carries_dpi_and_pixels() {
        let bytes = encode_png(&label(203)).unwrap();
        let decoder = png::Decoder::new(bytes.as_slice());
        let mut reader = decoder.read_info().unwrap();
        let dims = reader.info().pixel_dims.unwrap();
        assert_eq!((dims.xppu, dims.yppu), (7992, 7992));
        assert_eq!(dims.unit, png::Unit::Meter);

        let mut buf = vec![0; reader.output_buffer_size()];
        let frame = reader.next_frame(&mut buf).unwrap();
        assert_eq!((frame.width, frame.height), (40, 60));
        assert_eq!(frame.color_type, png::ColorType::Grayscale);
        assert_eq!(buf[4 * 40 + 3], 0);
        assert_eq!(buf[0], 255);
    }

    #[test]
    fn test_png_is_deterministic() {
        assert_eq!(encode_png(&label(203)).unwrap(), encode_png(&label(203)).unwrap());
    }

    #[test]
    fn test_pdf_header() {
        let bytes = encode_pdf(&label(203), "test").unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_export_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = export_label(&label(203), &dir.path().join("PAL-001")).unwrap();
        assert_eq!(out.png, dir.path().join("PAL-001.png"));
        assert_eq!(out.pdf, dir.path().join("PAL-001.pdf"));
        assert!(out.png.exists() && out.pdf.exists());
    }

    #[test]
    fn test_dotted_base_keeps_its_name() {
        let dir = tempfile::tempdir().unwrap();
        let out = export_label(&label(203), &dir.path().join("LOT-4.2")).unwrap();
        assert_eq!(out.png, dir.path().join("LOT-4.2.png"));
        assert_eq!(out.pdf, dir.path().join("LOT-4.2.pdf"));
    }

    #[test]
    fn test_export_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("dup");
        std::fs::write(dir.path().join("dup.png"), b"stale").unwrap();
        export_label(&label(203), &base).unwrap();
        let bytes = std::fs::read(dir.path().join("dup.png")).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_failed_pdf_removes_png() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("PAL-001");
        // A directory where the PDF should go makes the write fail
        std::fs::create_dir(dir.path().join("PAL-001.pdf")).unwrap();

        let err = export_label(&label(203), &base).unwrap_err();
        match &err {
            LabelError::Export { path, .. } => assert_eq!(path, &dir.path().join("PAL-001.pdf")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.path().join("PAL-001.png").exists());
    }

    #[test]
    fn test_unwritable_destination_is_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("missing").join("PAL-001");
        let err = export_label(&label(203), &base).unwrap_err();
        match &err {
            LabelError::Export { path, .. } => {
                assert_eq!(path, &dir.path().join("missing").join("PAL-001.png"))
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_row_fatal());
    }
}
