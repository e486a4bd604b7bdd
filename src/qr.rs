//! # QR Encoding
//!
//! Encodes a payload into a grayscale QR bitmap sized for the label.
//!
//! ## Pipeline
//!
//! ```text
//! payload ─→ QrCode (EC level M, smallest version that fits)
//!         ─→ modules drawn at box_size px each, border modules of white around
//!         ─→ nearest-neighbor resize to render_size × render_size
//! ```
//!
//! Nearest-neighbor keeps module edges hard; smoothing would grey them out
//! and hurt scanning at 203 DPI.
//!
//! Neither the module raster nor the output may exceed
//! [`MAX_SIDE_PX`](crate::config::MAX_SIDE_PX) on a side; larger requests fail
//! with [`LabelError::Encoding`] for that record only.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use qrcode::{Color, EcLevel, QrCode};

use crate::config::MAX_SIDE_PX;
use crate::error::{LabelError, Result};
use crate::record::Record;

/// Error correction used for every label.
pub const EC_LEVEL: EcLevel = EcLevel::M;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Pick what a record's QR code encodes.
///
/// The identifier when present, otherwise the first non-empty field value
/// in key order, otherwise the empty string.
pub fn qr_payload(record: &Record) -> &str {
    record
        .identifier()
        .or_else(|| record.iter().map(|(_, v)| v).find(|v| !v.is_empty()))
        .unwrap_or("")
}

/// Encode `data` and render it as a square `target_size` bitmap.
///
/// Fails with [`LabelError::Encoding`] when the payload exceeds what a
/// version 40 symbol holds at level M, or when either raster would be
/// larger than [`MAX_SIDE_PX`].
pub fn build_qr_image(data: &str, box_size: u32, border: u32, target_size: u32) -> Result<GrayImage> {
    if target_size > MAX_SIDE_PX {
        return Err(LabelError::Encoding(format!(
            "QR size {}px exceeds the {}px limit",
            target_size, MAX_SIDE_PX
        )));
    }
    let code = QrCode::with_error_correction_level(data.as_bytes(), EC_LEVEL)
        .map_err(|e| LabelError::Encoding(format!("QR code generation failed: {}", e)))?;

    let modules = render_modules(&code, box_size.max(1), border)?;
    if modules.width() == target_size {
        return Ok(modules);
    }
    Ok(imageops::resize(
        &modules,
        target_size.max(1),
        target_size.max(1),
        FilterType::Nearest,
    ))
}

/// Draw every module as a `box_size` square with `border` light modules around.
fn render_modules(code: &QrCode, box_size: u32, border: u32) -> Result<GrayImage> {
    let width = code.width() as u32;
    let side = border
        .checked_mul(2)
        .and_then(|b| b.checked_add(width))
        .and_then(|modules| modules.checked_mul(box_size))
        .filter(|&side| side <= MAX_SIDE_PX)
        .ok_or_else(|| {
            LabelError::Encoding(format!(
                "QR raster of {} modules, border {}, {}px per module exceeds the {}px limit",
                width, border, box_size, MAX_SIDE_PX
            ))
        })?;
    let mut img = GrayImage::from_pixel(side, side, LIGHT);

    for qy in 0..width {
        for qx in 0..width {
            if code[(qx as usize, qy as usize)] != Color::Dark {
                continue;
            }
            let x0 = (qx + border) * box_size;
            let y0 = (qy + border) * box_size;
            for cy in 0..box_size {
                for cx in 0..box_size {
                    img.put_pixel(x0 + cx, y0 + cy, DARK);
                }
            }
        }
    }

    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_is_square_at_target_size() {
        let img = build_qr_image("PAL-001", 10, 4, 507).unwrap();
        assert_eq!(img.dimensions(), (507, 507));
    }

    #[test]
    fn test_only_pure_black_and_white() {
        let img = build_qr_image("PAL-001", 10, 4, 333).unwrap();
        assert!(img.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn test_native_size_skips_resize() {
        // "PAL-001" fits version 1: 21 modules + 2×4 border = 29 → 290px
        let code = QrCode::with_error_correction_level(b"PAL-001", EC_LEVEL).unwrap();
        assert_eq!(code.width(), 21);
        let img = build_qr_image("PAL-001", 10, 4, 290).unwrap();
        assert_eq!(img.dimensions(), (290, 290));
        // Border stays light, first finder module is dark
        assert_eq!(img.get_pixel(39, 39).0[0], 255);
        assert_eq!(img.get_pixel(40, 40).0[0], 0);
    }

    #[test]
    fn test_zero_border() {
        let img = build_qr_image("X", 1, 0, 21).unwrap();
        // Top-left corner is part of the finder pattern
        assert_eq!(img.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn test_oversized_payload_is_encoding_error() {
        let payload = "9".repeat(8000);
        let err = build_qr_image(&payload, 10, 4, 100).unwrap_err();
        assert!(matches!(err, LabelError::Encoding(_)));
    }

    #[test]
    fn test_overflowing_geometry_is_encoding_error() {
        for (box_size, border) in [(10, 3_000_000_000), (u32::MAX, 4), (100, 100)] {
            let err = build_qr_image("PAL-001", box_size, border, 100).unwrap_err();
            assert!(matches!(err, LabelError::Encoding(_)), "{box_size}/{border}: {err}");
            assert!(err.is_row_fatal());
        }
    }

    #[test]
    fn test_oversized_target_is_encoding_error() {
        let err = build_qr_image("PAL-001", 10, 4, MAX_SIDE_PX + 1).unwrap_err();
        assert!(matches!(err, LabelError::Encoding(_)));
    }

    #[test]
    fn test_payload_prefers_identifier() {
        let r = Record::new([("pallet_id", "PAL-001"), ("a", "first")]);
        assert_eq!(qr_payload(&r), "PAL-001");
    }

    #[test]
    fn test_payload_falls_back_to_first_value() {
        let r = Record::new([("destination", "Dock 7"), ("contents", ""), ("batch", "B-3")]);
        assert_eq!(qr_payload(&r), "B-3");
        assert_eq!(qr_payload(&Record::default()), "");
    }
}
